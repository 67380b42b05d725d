//! Quality inspector scenarios over curated artifacts.

use chrono::{TimeZone, Utc};
use ic_common::{Error, OutputFormat};
use ic_config::QualityThresholds;
use ic_core::alert::AlertSink;
use ic_core::inspect::ALERT_SUBJECT;
use ic_core::{
    FixedClock, MemoryAlertSink, MemoryStore, Notification, Pipeline, QualityInspector,
    QualityMetrics,
};
use std::sync::Arc;

const CURATED: &str = "curated";

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()))
}

fn inspector(
    store: &Arc<MemoryStore>,
    alerts: Option<Arc<MemoryAlertSink>>,
) -> QualityInspector {
    QualityInspector::new(
        store.clone(),
        alerts.map(|sink| sink as Arc<dyn AlertSink>),
        clock(),
        QualityThresholds::default(),
    )
}

fn event(keys: &[&str]) -> Notification {
    let mut event = Notification::default();
    for key in keys {
        event.records.extend(Notification::single(CURATED, *key).records);
    }
    event
}

#[test]
fn test_duplicate_ids_are_counted() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        CURATED,
        "validated/year=2024/month=01/day=15/a.json",
        r#"[{"id": 7, "value": 10.0}, {"id": 7, "value": 20.0}]"#,
    );
    let metrics = inspector(&store, None)
        .inspect(&event(&["validated/year=2024/month=01/day=15/a.json"]))
        .unwrap();
    assert_eq!(
        metrics,
        QualityMetrics {
            total_files: 1,
            total_records: 2,
            null_values: 0,
            out_of_range: 0,
            duplicates: 1,
        }
    );
}

#[test]
fn test_equal_numeric_ids_and_missing_ids_are_duplicates() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        CURATED,
        "validated/year=2024/month=01/day=15/b.json",
        r#"[{"id": 7, "value": 1.0}, {"id": 7.0, "value": 2.0}, {"value": 3.0}, {"value": 4.0}]"#,
    );
    let metrics = inspector(&store, None)
        .inspect(&event(&["validated/year=2024/month=01/day=15/b.json"]))
        .unwrap();
    assert_eq!(metrics.total_records, 4);
    assert_eq!(metrics.duplicates, 2);
}

#[test]
fn test_out_of_range_and_null_values() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        CURATED,
        "validated/a.json",
        r#"[{"id": 1, "value": -5.0}, {"id": 2, "value": null}, {"id": 3, "value": 50.0}]"#,
    );
    let metrics = inspector(&store, None)
        .inspect(&event(&["validated/a.json"]))
        .unwrap();
    assert_eq!(metrics.out_of_range, 1);
    assert_eq!(metrics.null_values, 1);
    assert_eq!(metrics.duplicates, 0);
}

#[test]
fn test_counts_sum_across_artifacts() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        CURATED,
        "validated/a.json",
        r#"[{"id": 1, "value": 101.0}, {"id": 2, "value": 1.0}]"#,
    );
    store.insert(
        CURATED,
        "validated/b.json",
        r#"[{"id": 1, "value": null}, {"id": 2, "value": -1.0}, {"id": 3, "value": 2.0}]"#,
    );
    let metrics = inspector(&store, None)
        .inspect(&event(&["validated/a.json", "validated/b.json"]))
        .unwrap();
    assert_eq!(metrics.total_files, 2);
    assert_eq!(metrics.total_records, 5);
    assert_eq!(metrics.out_of_range, 2);
    assert_eq!(metrics.null_values, 1);
}

#[test]
fn test_duplicates_do_not_span_artifacts() {
    let store = Arc::new(MemoryStore::new());
    store.insert(CURATED, "validated/a.json", r#"[{"id": 1, "value": 1.0}]"#);
    store.insert(CURATED, "validated/b.json", r#"[{"id": 1, "value": 1.0}]"#);
    let metrics = inspector(&store, None)
        .inspect(&event(&["validated/a.json", "validated/b.json"]))
        .unwrap();
    assert_eq!(metrics.duplicates, 0);
    assert_eq!(metrics.total_files, 2);
}

#[test]
fn test_keys_outside_validated_prefix_are_skipped() {
    let store = Arc::new(MemoryStore::new());
    let metrics = inspector(&store, None)
        .inspect(&event(&["raw/a.json", "tmp/validated/b.json"]))
        .unwrap();
    assert_eq!(metrics, QualityMetrics::default());
}

#[test]
fn test_alert_published_once_when_issues_found() {
    let store = Arc::new(MemoryStore::new());
    store.insert(CURATED, "validated/a.json", r#"[{"id": 1, "value": 500.0}]"#);
    store.insert(CURATED, "validated/b.json", r#"[{"id": 2, "value": null}]"#);
    let sink = Arc::new(MemoryAlertSink::new());

    inspector(&store, Some(sink.clone()))
        .inspect(&event(&["validated/a.json", "validated/b.json"]))
        .unwrap();

    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].subject, ALERT_SUBJECT);
    assert!(published[0].message.contains("2024-01-15T10:00:00Z"));
    assert!(published[0]
        .message
        .contains("Files: validated/a.json, validated/b.json"));
    assert!(published[0].message.contains("- Null values: 1"));
    assert!(published[0].message.contains("- Out of range: 1"));
    assert!(published[0].message.contains("- Duplicates: 0"));
}

#[test]
fn test_no_alert_for_clean_artifacts() {
    let store = Arc::new(MemoryStore::new());
    store.insert(
        CURATED,
        "validated/a.json",
        r#"[{"id": 1, "value": 0.0}, {"id": 2, "value": 100.0}]"#,
    );
    let sink = Arc::new(MemoryAlertSink::new());
    let metrics = inspector(&store, Some(sink.clone()))
        .inspect(&event(&["validated/a.json"]))
        .unwrap();
    assert!(!metrics.has_issues());
    assert!(sink.published().is_empty());
}

#[test]
fn test_issues_without_alert_channel_still_succeed() {
    let store = Arc::new(MemoryStore::new());
    store.insert(CURATED, "validated/a.json", r#"[{"id": 1, "value": -1.0}]"#);
    let result = inspector(&store, None)
        .handle(&event(&["validated/a.json"]))
        .unwrap();
    assert_eq!(result.status_code, 200);
    assert_eq!(result.metrics.map(|m| m.out_of_range), Some(1));
}

#[test]
fn test_failure_aborts_inspection() {
    let store = Arc::new(MemoryStore::new());
    store.insert(CURATED, "validated/a.json", r#"[{"id": 1, "value": -1.0}]"#);
    store.insert(CURATED, "validated/b.csv.gz", "not gzip");
    let sink = Arc::new(MemoryAlertSink::new());

    let err = inspector(&store, Some(sink.clone()))
        .inspect(&event(&["validated/a.json", "validated/b.csv.gz"]))
        .unwrap_err();
    match err {
        Error::MalformedInput { key, .. } => assert_eq!(key, "validated/b.csv.gz"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.published().is_empty());
}

#[test]
fn test_inspects_artifacts_written_by_pipeline() {
    for format in OutputFormat::ALL {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "raw",
            "batch.json",
            r#"[
                {"id": 1, "ts": "2024-01-15T08:00:00Z", "value": 42.5},
                {"id": 1, "ts": "2024-01-15T08:05:00Z", "value": 120.0},
                {"id": 2, "ts": "2024-01-15T08:10:00Z", "value": 7.0}
            ]"#,
        );
        let stored = Pipeline::new(store.clone(), clock(), format, CURATED)
            .process_object("raw", "batch.json")
            .unwrap();

        let metrics = inspector(&store, None)
            .inspect(&event(&[stored.key.as_str()]))
            .unwrap();
        assert_eq!(metrics.total_records, 3, "{format}");
        assert_eq!(metrics.duplicates, 1, "{format}");
        assert_eq!(metrics.out_of_range, 1, "{format}");
        assert_eq!(metrics.null_values, 0, "{format}");
    }
}
