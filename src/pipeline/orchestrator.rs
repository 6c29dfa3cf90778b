use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::classify::Classifiers;
use crate::domain::StandardRecord;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::RecordNormalizer;
use crate::pipeline::storage::{AggregateSnapshot, AggregationStore};
use crate::types::SourceAdapter;

const RECORD_CHANNEL_CAPACITY: usize = 1024;

/// Result of a complete collection run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub snapshot: AggregateSnapshot,
    pub rows_seen: usize,
    pub records_accepted: usize,
    pub records_dropped: usize,
    pub failed_sources: Vec<String>,
}

#[derive(Debug, Default)]
struct SourceOutcome {
    source_id: String,
    rows_seen: usize,
    accepted: usize,
    dropped: usize,
    failed: bool,
}

/// Drives sources through normalization into one aggregation store.
///
/// Each source runs in its own task and normalizes its rows in parallel with
/// the others. Accepted records travel over a channel to a single aggregation
/// task, which is the only caller of [`AggregationStore::add`] during a run.
pub struct Pipeline {
    classifiers: Classifiers,
}

impl Pipeline {
    pub fn new(classifiers: Classifiers) -> Self {
        Self { classifiers }
    }

    #[instrument(skip_all, fields(sources = sources.len()))]
    pub async fn run(
        &self,
        sources: Vec<Box<dyn SourceAdapter>>,
        store: Arc<AggregationStore>,
    ) -> PipelineResult {
        let started = Instant::now();
        info!("🚀 Starting collection run over {} source(s)", sources.len());

        let (tx, mut rx) = mpsc::channel::<StandardRecord>(RECORD_CHANNEL_CAPACITY);

        let writer_store = store.clone();
        let aggregator = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                writer_store.add(record);
            }
        });

        let mut tasks = JoinSet::new();
        for source in sources {
            tasks.spawn(run_source(source, self.classifiers.clone(), store.clone(), tx.clone()));
        }
        // The aggregator stops once every source task has dropped its sender
        drop(tx);

        let mut result = PipelineResult {
            snapshot: store.snapshot(),
            rows_seen: 0,
            records_accepted: 0,
            records_dropped: 0,
            failed_sources: Vec::new(),
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    result.rows_seen += outcome.rows_seen;
                    result.records_accepted += outcome.accepted;
                    result.records_dropped += outcome.dropped;
                    if outcome.failed {
                        result.failed_sources.push(outcome.source_id);
                    }
                }
                Err(e) => {
                    error!("Source task aborted: {}", e);
                    result.failed_sources.push("<aborted>".to_string());
                }
            }
        }

        if let Err(e) = aggregator.await {
            error!("Aggregation task aborted: {}", e);
        }

        result.failed_sources.sort();
        result.snapshot = store.snapshot();

        if result.snapshot.mixes_gender_methods() {
            warn!(
                "Run mixes declared and name-estimated gender values; per-tier counts do not distinguish them"
            );
        }

        let elapsed = started.elapsed().as_secs_f64();
        metrics::aggregate::run_completed(elapsed);
        info!(
            rows = result.rows_seen,
            accepted = result.records_accepted,
            dropped = result.records_dropped,
            failed_sources = result.failed_sources.len(),
            "✅ Collection run finished in {:.2}s",
            elapsed
        );

        result
    }
}

#[instrument(skip_all, fields(source_id = %source.source_id()))]
async fn run_source(
    mut source: Box<dyn SourceAdapter>,
    classifiers: Classifiers,
    store: Arc<AggregationStore>,
    tx: mpsc::Sender<StandardRecord>,
) -> SourceOutcome {
    let source_id = source.source_id().to_string();
    let mut outcome = SourceOutcome {
        source_id: source_id.clone(),
        ..SourceOutcome::default()
    };

    if !source.connect().await {
        warn!("⚠️  Could not connect to source, skipping it");
        metrics::sources::connect_error(&source_id);
        outcome.failed = true;
        return outcome;
    }
    metrics::sources::connect_success(&source_id);

    // Adapters may settle their field mapping while connecting
    let normalizer = RecordNormalizer::new(classifiers, source.normalizer_config().clone());

    let rows = match source.fetch_raw_records().await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch rows: {}", e);
            metrics::sources::fetch_error(&source_id);
            outcome.failed = true;
            return outcome;
        }
    };
    outcome.rows_seen = rows.len();
    metrics::sources::rows_fetched(&source_id, rows.len());
    info!("📡 Fetched {} raw rows", rows.len());

    for row in &rows {
        match normalizer.normalize(row) {
            Some(record) => {
                if tx.send(record).await.is_err() {
                    error!("Aggregation channel closed early");
                    outcome.failed = true;
                    break;
                }
                outcome.accepted += 1;
            }
            None => outcome.dropped += 1,
        }
    }

    // Provenance only matters for records that were actually counted
    if outcome.accepted > 0 {
        if let Some(method) = source.gender_method() {
            store.record_gender_method(method);
        }
    }

    metrics::normalize::records_accepted(outcome.accepted);
    metrics::normalize::records_dropped(outcome.dropped);
    debug!(
        accepted = outcome.accepted,
        dropped = outcome.dropped,
        "Source normalized"
    );

    outcome
}
