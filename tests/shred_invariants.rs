//! Shred Invariant Tests
//!
//! - A rejected record leaves no entries behind
//! - Columns stay record-aligned under both error policies
//! - Values the schema cannot hold are rejected with a stable code

use dremel::batch::{BatchShredder, ErrorPolicy};
use dremel::observability::MetricsRegistry;
use dremel::shred::ShredErrorCode;
use dremel::{assemble_all, Fsm, Schema, Shredder, StripedColumns};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn links_schema() -> Schema {
    Schema::parse(["doc.links[*].url", "doc.links[*].language"]).unwrap()
}

fn shred_code(schema: &Schema, record: Value) -> ShredErrorCode {
    Shredder::new(schema).shred_record(&record).unwrap_err().code()
}

// =============================================================================
// Rejected Values
// =============================================================================

#[test]
fn test_rejection_codes() {
    let schema = links_schema();
    assert_eq!(shred_code(&schema, json!(5)), ShredErrorCode::DremelShredNotAnObject);
    assert_eq!(
        shred_code(&schema, json!({"doc": "text"})),
        ShredErrorCode::DremelShredNotAnObject
    );
    assert_eq!(
        shred_code(&schema, json!({"doc": {"links": {"url": "a.com"}}})),
        ShredErrorCode::DremelShredExpectedArray
    );
    assert_eq!(
        shred_code(&schema, json!({"doc": [{"links": []}]})),
        ShredErrorCode::DremelShredUnexpectedArray
    );
    assert_eq!(
        shred_code(&schema, json!({"doc": {"links": [{"url": {"host": "a"}}]}})),
        ShredErrorCode::DremelShredNotAScalar
    );
    assert_eq!(
        shred_code(&schema, json!({"doc": {"links": [{"url": "a.com"}, null]}})),
        ShredErrorCode::DremelShredNullElement
    );
}

#[test]
fn test_error_names_offending_path() {
    let schema = links_schema();
    let err = Shredder::new(&schema)
        .shred_record(&json!({"doc": {"links": [{"url": ["a"]}]}}))
        .unwrap_err();
    assert_eq!(err.path(), "doc.links[*].url");
}

#[test]
fn test_undeclared_keys_only_rejected_when_strict() {
    let schema = links_schema();
    let record = json!({"doc": {"links": [{"url": "a.com", "rank": 3}]}});

    let lenient = Shredder::new(&schema).shred_record(&record).unwrap();
    assert_eq!(lenient.total_entries(), 2);

    let err = Shredder::new(&schema)
        .strict(true)
        .shred_record(&record)
        .unwrap_err();
    assert_eq!(err.code(), ShredErrorCode::DremelShredUndeclaredField);
}

// =============================================================================
// Rollback
// =============================================================================

/// A record failing deep inside its second element leaves nothing behind.
#[test]
fn test_failed_record_rolls_back() {
    let schema = links_schema();
    let shredder = Shredder::new(&schema);
    let mut columns = StripedColumns::new(&schema);

    shredder
        .shred(&json!({"doc": {"links": [{"url": "a.com"}]}}), &mut columns)
        .unwrap();
    let before = columns.clone();

    let bad = json!({"doc": {"links": [{"url": "b.com", "language": "en"}, {"url": 1, "language": []}]}});
    assert!(shredder.shred(&bad, &mut columns).is_err());
    assert_eq!(columns, before);

    columns.validate(&schema).unwrap();
}

// =============================================================================
// Batch Policies
// =============================================================================

#[test]
fn test_abort_policy_keeps_earlier_records() {
    let schema = links_schema();
    let records = vec![json!({"doc": {}}), json!({"doc": 1}), json!({})];
    let batch = BatchShredder::new(Shredder::new(&schema), ErrorPolicy::Abort);

    let mut columns = StripedColumns::new(&schema);
    let err = batch.shred_into(&records, &mut columns).unwrap_err();
    assert_eq!(err.record(), Some(1));
    assert_eq!(columns.record_count(), 1);
    columns.validate(&schema).unwrap();
}

#[test]
fn test_skip_policy_keeps_columns_aligned() {
    let schema = links_schema();
    let records = vec![
        json!({"doc": {"links": [{"url": "a.com", "language": "en"}]}}),
        json!({"doc": {"links": [{"url": "b.com"}, null]}}),
        json!({"doc": {"links": [{"language": "fr"}, {"url": "c.com"}]}}),
        json!({"doc": {"links": "none"}}),
        json!({}),
    ];

    let metrics = MetricsRegistry::new();
    let batch =
        BatchShredder::new(Shredder::new(&schema), ErrorPolicy::Skip).with_metrics(&metrics);
    let (columns, report) = batch.shred(&records).unwrap();

    assert_eq!(report.records_seen, 5);
    assert_eq!(report.records_shredded, 3);
    assert_eq!(report.skipped, vec![1, 3]);
    assert_eq!(report.entries_written, columns.total_entries());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.records_shredded, 3);
    assert_eq!(snapshot.records_skipped, 2);

    columns.validate(&schema).unwrap();
    let fsm = Fsm::build(&schema);
    let kept = vec![records[0].clone(), records[2].clone(), records[4].clone()];
    assert_eq!(assemble_all(&schema, &fsm, &columns).unwrap(), kept);
}
