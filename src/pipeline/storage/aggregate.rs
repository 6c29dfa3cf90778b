use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use tracing::trace;
use uuid::Uuid;

use crate::domain::{Gender, GenderMethod, StandardRecord, Tier};

/// Gender counters for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub male: u64,
    pub female: u64,
    pub unknown: u64,
}

impl AggregateBucket {
    pub fn total(&self) -> u64 {
        self.male + self.female + self.unknown
    }

    /// Female share of the known-gender headcount, one decimal place.
    /// Zero when nobody in the bucket has a known gender.
    pub fn female_pct(&self) -> f64 {
        let known = self.male + self.female;
        if known == 0 {
            return 0.0;
        }
        let pct = self.female as f64 / known as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }

    fn increment(&mut self, gender: Gender) {
        match gender {
            Gender::Male => self.male += 1,
            Gender::Female => self.female += 1,
            Gender::Unknown => self.unknown += 1,
        }
    }
}

/// One persisted report row per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierReportRow {
    pub tier_number: u8,
    pub tier_name: String,
    pub male: u64,
    pub female: u64,
    pub unknown: u64,
    pub total: u64,
    pub female_pct: f64,
}

impl TierReportRow {
    pub fn new(tier: Tier, bucket: &AggregateBucket) -> Self {
        Self {
            tier_number: tier.number(),
            tier_name: tier.name().to_string(),
            male: bucket.male,
            female: bucket.female,
            unknown: bucket.unknown,
            total: bucket.total(),
            female_pct: bucket.female_pct(),
        }
    }
}

/// Immutable, count-only view of a collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    run_id: Uuid,
    collected_at: DateTime<Utc>,
    total_processed: u64,
    buckets: BTreeMap<Tier, AggregateBucket>,
    gender_methods: BTreeSet<GenderMethod>,
}

impl AggregateSnapshot {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn total_processed(&self) -> u64 {
        self.total_processed
    }

    pub fn bucket(&self, tier: Tier) -> AggregateBucket {
        self.buckets.get(&tier).copied().unwrap_or_default()
    }

    /// Buckets in tier order, most senior first.
    pub fn buckets(&self) -> impl Iterator<Item = (Tier, &AggregateBucket)> {
        self.buckets.iter().map(|(tier, bucket)| (*tier, bucket))
    }

    pub fn gender_methods(&self) -> &BTreeSet<GenderMethod> {
        &self.gender_methods
    }

    /// True when declared and estimated gender values were counted together.
    /// Their accuracy differs, and the counts do not say which is which.
    pub fn mixes_gender_methods(&self) -> bool {
        self.gender_methods.len() > 1
    }

    pub fn rows(&self) -> Vec<TierReportRow> {
        Tier::ALL
            .iter()
            .map(|tier| TierReportRow::new(*tier, &self.bucket(*tier)))
            .collect()
    }
}

#[derive(Default)]
struct StoreState {
    buckets: [AggregateBucket; 6],
    total_processed: u64,
    gender_methods: BTreeSet<GenderMethod>,
}

/// Per-tier, per-gender counters for one collection run.
///
/// `add` consumes the record and keeps nothing but the increment, so no
/// individual-level data outlives this call. All mutation goes through one
/// mutex, which keeps `total_processed` equal to the sum of the buckets at
/// every observable point.
pub struct AggregationStore {
    run_id: Uuid,
    collected_at: DateTime<Utc>,
    state: Mutex<StoreState>,
}

impl Default for AggregationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    pub fn with_timestamp(collected_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            collected_at,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Every critical section is a plain increment, so a poisoned lock
        // still guards consistent counters
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, record: StandardRecord) {
        let tier = record.tier();
        let gender = record.gender();
        drop(record);

        let mut state = self.lock();
        state.buckets[tier.index()].increment(gender);
        state.total_processed += 1;
        trace!(tier = tier.number(), gender = gender.symbol(), "record counted");
    }

    pub fn record_gender_method(&self, method: GenderMethod) {
        self.lock().gender_methods.insert(method);
    }

    pub fn total_processed(&self) -> u64 {
        self.lock().total_processed
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        let state = self.lock();
        AggregateSnapshot {
            run_id: self.run_id,
            collected_at: self.collected_at,
            total_processed: state.total_processed,
            buckets: Tier::ALL
                .iter()
                .map(|tier| (*tier, state.buckets[tier.index()]))
                .collect(),
            gender_methods: state.gender_methods.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn record(gender: Gender, tier: Tier) -> StandardRecord {
        StandardRecord::new(gender, tier, true, None, None)
    }

    #[test]
    fn add_increments_one_cell() {
        let store = AggregationStore::new();
        store.add(record(Gender::Female, Tier::EntryLevel));
        store.add(record(Gender::Male, Tier::CSuite));
        store.add(record(Gender::Unknown, Tier::CSuite));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_processed(), 3);
        assert_eq!(
            snapshot.bucket(Tier::CSuite),
            AggregateBucket { male: 1, female: 0, unknown: 1 }
        );
        assert_eq!(snapshot.bucket(Tier::EntryLevel).female, 1);
        assert_eq!(snapshot.bucket(Tier::Board).total(), 0);
    }

    #[test]
    fn empty_bucket_has_zero_female_pct() {
        assert_eq!(AggregateBucket::default().female_pct(), 0.0);
        let only_unknown = AggregateBucket { male: 0, female: 0, unknown: 4 };
        assert_eq!(only_unknown.female_pct(), 0.0);
    }

    #[test]
    fn female_pct_ignores_unknown_and_rounds() {
        let bucket = AggregateBucket { male: 2, female: 1, unknown: 10 };
        assert_eq!(bucket.female_pct(), 33.3);
        assert_eq!(bucket.total(), 13);
    }

    #[test]
    fn snapshot_reads_are_repeatable() {
        let store = AggregationStore::new();
        store.add(record(Gender::Male, Tier::Board));
        let first = store.snapshot();
        let second = store.snapshot();
        assert_eq!(first, second);

        store.add(record(Gender::Male, Tier::Board));
        assert_ne!(store.snapshot(), first);
        // the earlier copy is unaffected
        assert_eq!(first.total_processed(), 1);
    }

    #[test]
    fn snapshot_lists_every_tier_in_order() {
        let snapshot = AggregationStore::new().snapshot();
        let tiers: Vec<Tier> = snapshot.buckets().map(|(t, _)| t).collect();
        assert_eq!(tiers, Tier::ALL.to_vec());
        let rows = snapshot.rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].tier_name, "C-Suite");
    }

    #[test]
    fn mixed_gender_methods_are_flagged() {
        let store = AggregationStore::new();
        store.record_gender_method(GenderMethod::Declared);
        assert!(!store.snapshot().mixes_gender_methods());
        store.record_gender_method(GenderMethod::Estimated);
        assert!(store.snapshot().mixes_gender_methods());
    }

    #[test]
    fn concurrent_adds_are_never_lost() {
        let store = Arc::new(AggregationStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    let tier = Tier::ALL[i % 6];
                    for n in 0..1_000 {
                        let gender = if n % 2 == 0 { Gender::Female } else { Gender::Male };
                        store.add(record(gender, tier));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total_processed(), 8_000);
        let sum: u64 = snapshot.buckets().map(|(_, b)| b.total()).sum();
        assert_eq!(sum, 8_000);
        assert_eq!(snapshot.bucket(Tier::Board).total(), 2_000);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let store = AggregationStore::new();
        store.add(record(Gender::Female, Tier::MiddleManagement));
        store.record_gender_method(GenderMethod::Declared);
        let snapshot = store.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: AggregateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    fn gender_strategy() -> impl Strategy<Value = Gender> {
        prop_oneof![Just(Gender::Male), Just(Gender::Female), Just(Gender::Unknown)]
    }

    proptest! {
        #[test]
        fn bucket_totals_sum_to_total_processed(
            entries in proptest::collection::vec((1u8..=6, gender_strategy()), 0..200)
        ) {
            let store = AggregationStore::new();
            for (tier, gender) in &entries {
                store.add(record(*gender, Tier::from_number(*tier).unwrap()));
            }
            let snapshot = store.snapshot();
            let sum: u64 = snapshot.buckets().map(|(_, b)| b.total()).sum();
            prop_assert_eq!(snapshot.total_processed(), entries.len() as u64);
            prop_assert_eq!(sum, entries.len() as u64);
        }
    }
}
