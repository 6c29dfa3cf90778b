use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::GenderMethod;
use crate::error::{CollectorError, Result};
use crate::infra::csv_format;
use crate::pipeline::storage::{AggregateSnapshot, TierReportRow};

pub const CSV_HEADER: [&str; 7] = [
    "tier_number",
    "tier_name",
    "male",
    "female",
    "unknown",
    "total",
    "female_pct",
];

/// The persisted form of one collection run. Counts only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub label: String,
    pub collected_at: DateTime<Utc>,
    pub total_processed: u64,
    pub methodology_notes: String,
    pub gender_methods: BTreeSet<GenderMethod>,
    pub tiers: Vec<TierReportRow>,
}

impl AggregateReport {
    pub fn from_snapshot(label: &str, snapshot: &AggregateSnapshot) -> Self {
        Self {
            label: label.to_string(),
            collected_at: snapshot.collected_at(),
            total_processed: snapshot.total_processed(),
            methodology_notes: methodology_notes(snapshot.gender_methods()),
            gender_methods: snapshot.gender_methods().clone(),
            tiers: snapshot.rows(),
        }
    }

    /// Console table, most senior tier first.
    pub fn render_summary(&self) -> String {
        let rule = "=".repeat(68);
        let mut out = String::new();
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "📊 {}", self.label);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Collected at: {}", self.collected_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "Records aggregated: {}", self.total_processed);
        if !self.methodology_notes.is_empty() {
            let _ = writeln!(out, "Method: {}", self.methodology_notes);
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<25} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "Tier", "Male", "Female", "Unknown", "Total", "%Female"
        );
        let _ = writeln!(out, "{}", "-".repeat(68));
        for row in &self.tiers {
            let _ = writeln!(
                out,
                "{:<25} {:>8} {:>8} {:>8} {:>8} {:>7.1}%",
                row.tier_name, row.male, row.female, row.unknown, row.total, row.female_pct
            );
        }
        out
    }
}

fn methodology_notes(methods: &BTreeSet<GenderMethod>) -> String {
    let declared = methods.contains(&GenderMethod::Declared);
    let estimated = methods.contains(&GenderMethod::Estimated);
    match (declared, estimated) {
        (true, true) => "Mixed run: declared gender fields combined with first-name estimates. \
                         Counts do not distinguish the two."
            .to_string(),
        (true, false) => "Gender taken from declared HR fields.".to_string(),
        (false, true) => "Gender estimated from first names with a lexicon and suffix heuristics; \
                          female endings are checked first."
            .to_string(),
        (false, false) => "No gender field available; every record counted as unknown.".to_string(),
    }
}

pub fn write_json(report: &AggregateReport, path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn read_json(path: &Path) -> Result<AggregateReport> {
    let body = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

pub fn write_csv(rows: &[TierReportRow], path: &Path) -> Result<()> {
    let mut body = csv_format::format_row(CSV_HEADER);
    for row in rows {
        body.push_str(&csv_format::format_row([
            row.tier_number.to_string(),
            row.tier_name.clone(),
            row.male.to_string(),
            row.female.to_string(),
            row.unknown.to_string(),
            row.total.to_string(),
            format!("{:.1}", row.female_pct),
        ]));
    }
    fs::write(path, body)?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<TierReportRow>> {
    let text = fs::read_to_string(path)?;
    let mut rows = csv_format::parse(&text)?.into_iter();

    match rows.next() {
        Some(header) if header == CSV_HEADER => {}
        Some(header) => {
            return Err(CollectorError::Report(format!(
                "unexpected CSV header: {}",
                header.join(",")
            )))
        }
        None => return Ok(Vec::new()),
    }

    rows.enumerate()
        .map(|(i, fields)| parse_row(&fields).map_err(|e| {
            CollectorError::Report(format!("row {}: {}", i + 2, e))
        }))
        .collect()
}

fn parse_row(fields: &[String]) -> std::result::Result<TierReportRow, String> {
    if fields.len() != CSV_HEADER.len() {
        return Err(format!("expected {} fields, found {}", CSV_HEADER.len(), fields.len()));
    }
    fn num<T: std::str::FromStr>(field: &str, column: &str) -> std::result::Result<T, String> {
        field
            .trim()
            .parse()
            .map_err(|_| format!("invalid {}: '{}'", column, field))
    }

    Ok(TierReportRow {
        tier_number: num(&fields[0], CSV_HEADER[0])?,
        tier_name: fields[1].clone(),
        male: num(&fields[2], CSV_HEADER[2])?,
        female: num(&fields[3], CSV_HEADER[3])?,
        unknown: num(&fields[4], CSV_HEADER[4])?,
        total: num(&fields[5], CSV_HEADER[5])?,
        female_pct: num(&fields[6], CSV_HEADER[6])?,
    })
}

/// Paths written by [`save_report`].
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Writes `<label>_<YYYYmmdd_HHMMSS>.json` and `.csv` under `output_dir`.
pub fn save_report(report: &AggregateReport, output_dir: &Path) -> Result<SavedReport> {
    fs::create_dir_all(output_dir)?;

    let stem = format!(
        "{}_{}",
        file_label(&report.label),
        report.collected_at.format("%Y%m%d_%H%M%S")
    );
    let json_path = output_dir.join(format!("{}.json", stem));
    let csv_path = output_dir.join(format!("{}.csv", stem));

    write_json(report, &json_path)?;
    write_csv(&report.tiers, &csv_path)?;
    info!("💾 Report saved to {} and {}", json_path.display(), csv_path.display());

    Ok(SavedReport { json_path, csv_path })
}

fn file_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}
