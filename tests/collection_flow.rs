use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use equiverse_collector::apis::create_adapter;
use equiverse_collector::apis::in_memory::InMemoryAdapter;
use equiverse_collector::classify::Classifiers;
use equiverse_collector::config::Config;
use equiverse_collector::demo;
use equiverse_collector::domain::{GenderMethod, Tier};
use equiverse_collector::infra::report_output::{read_csv, read_json};
use equiverse_collector::infra::{save_report, AggregateReport};
use equiverse_collector::pipeline::processing::normalize::{FieldMapping, NormalizerConfig};
use equiverse_collector::pipeline::storage::AggregationStore;
use equiverse_collector::pipeline::Pipeline;
use equiverse_collector::types::{RawRecord, SourceAdapter};

fn row(pairs: &[(&str, &str)]) -> RawRecord {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn three_rows_yield_two_counted_records() -> anyhow::Result<()> {
    let mapping = FieldMapping {
        gender: Some("gender".to_string()),
        title: Some("title".to_string()),
        ..FieldMapping::default()
    };
    let source = InMemoryAdapter::new(
        "hr",
        NormalizerConfig::with_mapping(mapping),
        vec![
            row(&[("title", "Software Engineer"), ("gender", "F")]),
            row(&[("title", "CEO"), ("gender", "M")]),
            row(&[("title", "Xyz Unknown Role"), ("gender", "M")]),
        ],
    );

    let result = Pipeline::new(Classifiers::default())
        .run(vec![Box::new(source)], Arc::new(AggregationStore::new()))
        .await;

    let snapshot = &result.snapshot;
    assert_eq!(result.records_dropped, 1);
    assert_eq!(snapshot.total_processed(), 2);
    assert_eq!(snapshot.bucket(Tier::CSuite).male, 1);
    assert_eq!(snapshot.bucket(Tier::CSuite).total(), 1);
    assert_eq!(snapshot.bucket(Tier::EntryLevel).female, 1);
    assert_eq!(snapshot.bucket(Tier::EntryLevel).total(), 1);
    for tier in [Tier::Board, Tier::SeniorManagement, Tier::MiddleManagement, Tier::JuniorManagement] {
        assert_eq!(snapshot.bucket(tier).total(), 0);
    }
    Ok(())
}

#[tokio::test]
async fn demo_export_lands_in_expected_tiers() -> anyhow::Result<()> {
    let result = Pipeline::new(Classifiers::default())
        .run(vec![Box::new(demo::sample_source()?)], Arc::new(AggregationStore::new()))
        .await;

    let s = &result.snapshot;
    assert_eq!(s.total_processed(), 10);
    assert_eq!(s.bucket(Tier::CSuite).male, 1);
    // "Director" at grade M4 is lifted to tier 3 by the grade
    assert_eq!(s.bucket(Tier::SeniorManagement).male, 2);
    assert_eq!(s.bucket(Tier::MiddleManagement).female, 1);
    assert_eq!(s.bucket(Tier::MiddleManagement).male, 1);
    assert_eq!(s.bucket(Tier::JuniorManagement).female, 2);
    assert_eq!(s.bucket(Tier::EntryLevel).female, 2);
    assert_eq!(s.bucket(Tier::EntryLevel).male, 1);
    assert!(!s.mixes_gender_methods());
    Ok(())
}

#[tokio::test]
async fn configured_file_sources_feed_a_saved_report() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let hr_path = dir.path().join("acme_hr.csv");
    fs::write(
        &hr_path,
        "Sex,Designation,Band,Status\n\
         W,\"Director, Finance\",,Y\n\
         M,Analyst,A1,Y\n\
         F,Analyst,A1,N\n\
         M,Receptionist,,Y\n",
    )?;

    let profiles_path = dir.path().join("profiles.json");
    fs::write(
        &profiles_path,
        json!([
            {"name": "Lakshmi Rao", "title": "Chief Financial Officer"},
            {"name": "LinkedIn Member", "title": "Vice President"},
            {"name": "Ganesh Pillai", "title": "Senior Engineer"}
        ])
        .to_string(),
    )?;

    let output_dir = dir.path().join("reports");
    let config_path = dir.path().join("collector.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[collection]
label = "acme"
output_dir = "{out}"

[[sources]]
kind = "tabular_file"
path = "{hr}"
active_values = ["Y"]

[sources.field_mapping]
gender = "Sex"
title = "Designation"
grade = "Band"
status = "Status"

[sources.gender_values]
male = ["M"]
female = ["F", "W"]

[[sources]]
id = "public_profiles"
kind = "profile_list"
path = "{profiles}"

[[sources]]
id = "gone"
kind = "tabular_file"
path = "{missing}"
"#,
            out = output_dir.display(),
            hr = hr_path.display(),
            profiles = profiles_path.display(),
            missing = dir.path().join("missing.csv").display(),
        ),
    )?;

    let config = Config::load_from(&config_path)?;
    let sources = config
        .sources
        .iter()
        .map(create_adapter)
        .collect::<Result<Vec<Box<dyn SourceAdapter>>, _>>()?;

    let result = Pipeline::new(Classifiers::default())
        .run(sources, Arc::new(AggregationStore::new()))
        .await;

    assert_eq!(result.failed_sources, vec!["gone".to_string()]);
    assert_eq!(result.rows_seen, 6);
    assert_eq!(result.records_accepted, 5);
    assert_eq!(result.records_dropped, 1);

    let s = &result.snapshot;
    assert_eq!(s.bucket(Tier::MiddleManagement).female, 1);
    // inactive rows are still counted; activity is a record attribute
    assert_eq!(s.bucket(Tier::EntryLevel).male, 1);
    assert_eq!(s.bucket(Tier::EntryLevel).female, 1);
    assert_eq!(s.bucket(Tier::CSuite).female, 1);
    assert_eq!(s.bucket(Tier::JuniorManagement).male, 1);
    assert!(s.mixes_gender_methods());
    assert!(s.gender_methods().contains(&GenderMethod::Declared));

    let report = AggregateReport::from_snapshot(&config.collection.label, s);
    let saved = save_report(&report, &config.collection.output_dir)?;
    assert_eq!(read_json(&saved.json_path)?, report);
    assert_eq!(read_csv(&saved.csv_path)?, report.tiers);
    assert!(saved
        .json_path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("acme_")));
    Ok(())
}

#[tokio::test]
async fn swapped_rule_book_changes_tiers_without_code_changes() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let rules_path = dir.path().join("rules.json");
    fs::write(
        &rules_path,
        json!({
            "tiers": [
                {"tier": 1, "keywords": ["trustee"]},
                {"tier": 6, "keywords": ["ceo"]}
            ]
        })
        .to_string(),
    )?;
    let classifiers = equiverse_collector::classify::RuleBook::load(&rules_path)?.into_classifiers();

    let mapping = FieldMapping {
        gender: Some("gender".to_string()),
        title: Some("title".to_string()),
        ..FieldMapping::default()
    };
    let source = InMemoryAdapter::new(
        "hr",
        NormalizerConfig::with_mapping(mapping),
        vec![
            row(&[("title", "Trustee"), ("gender", "F")]),
            row(&[("title", "CEO"), ("gender", "M")]),
            row(&[("title", "Software Engineer"), ("gender", "M")]),
        ],
    );

    let result = Pipeline::new(classifiers)
        .run(vec![Box::new(source)], Arc::new(AggregationStore::new()))
        .await;

    assert_eq!(result.snapshot.bucket(Tier::Board).female, 1);
    assert_eq!(result.snapshot.bucket(Tier::EntryLevel).male, 1);
    assert_eq!(result.snapshot.bucket(Tier::CSuite).total(), 0);
    assert_eq!(result.records_dropped, 1);
    Ok(())
}

#[tokio::test]
async fn source_without_field_mapping_uses_detected_columns() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let hr_path = dir.path().join("export.csv");
    fs::write(&hr_path, "Gender,Designation,Grade\nF,Analyst,A1\nM,CEO,E1\n")?;

    let config_path = dir.path().join("collector.toml");
    fs::write(
        &config_path,
        format!(
            "[[sources]]\nkind = \"tabular_file\"\npath = \"{}\"\n",
            hr_path.display()
        ),
    )?;

    let config = Config::load_from(&config_path)?;
    assert!(config.sources[0].field_mapping.is_none());
    let source = create_adapter(&config.sources[0])?;

    let result = Pipeline::new(Classifiers::default())
        .run(vec![source], Arc::new(AggregationStore::new()))
        .await;

    assert_eq!(result.rows_seen, 2);
    assert_eq!(result.records_accepted, 2);
    assert_eq!(result.records_dropped, 0);
    assert!(result.failed_sources.is_empty());
    assert_eq!(result.snapshot.bucket(Tier::EntryLevel).female, 1);
    assert_eq!(result.snapshot.bucket(Tier::CSuite).male, 1);
    assert_eq!(
        result.snapshot.gender_methods().iter().copied().collect::<Vec<_>>(),
        vec![GenderMethod::Declared]
    );
    Ok(())
}
