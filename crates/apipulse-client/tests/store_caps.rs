//! Distinct-key cap enforcement for the error tables.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use apipulse_client::store::MetricsStore;

#[test]
fn same_validation_error_counts_up() {
    let store = MetricsStore::new(100, 100);
    store.record_validation_error(None, "POST", "/items", &["body", "name"], "field required", "missing");
    store.record_validation_error(None, "POST", "/items", &["body", "name"], "field required", "missing");

    let snap = store.snapshot_and_reset();
    assert_eq!(snap.validation_errors.len(), 1);
    let row = &snap.validation_errors[0];
    assert_eq!(row.error_count, 2);
    assert_eq!(row.loc, vec!["body".to_string(), "name".to_string()]);
    assert_eq!(row.error_type, "missing");
    assert_eq!(snap.overflow.validation_errors_dropped, 0);
}

#[test]
fn validation_errors_beyond_cap_overflow() {
    let store = MetricsStore::new(100, 100);
    for i in 0..101 {
        let field = format!("field_{i}");
        store.record_validation_error(None, "POST", "/items", &["body", &field], "field required", "missing");
    }

    let snap = store.snapshot_and_reset();
    assert_eq!(snap.validation_errors.len(), 100);
    assert_eq!(snap.overflow.validation_errors_dropped, 1);
}

#[test]
fn existing_keys_keep_counting_at_cap() {
    let store = MetricsStore::new(2, 100);
    store.record_validation_error(None, "POST", "/items", &["body", "a"], "field required", "missing");
    store.record_validation_error(None, "POST", "/items", &["body", "b"], "field required", "missing");
    // Table is full; a new signature is dropped, a known one still counts.
    store.record_validation_error(None, "POST", "/items", &["body", "c"], "field required", "missing");
    store.record_validation_error(None, "POST", "/items", &["body", "a"], "field required", "missing");

    let snap = store.snapshot_and_reset();
    assert_eq!(snap.validation_errors.len(), 2);
    let a = snap.validation_errors.iter().find(|r| r.loc[1] == "a").unwrap();
    assert_eq!(a.error_count, 2);
    assert_eq!(snap.overflow.validation_errors_dropped, 1);
}

#[test]
fn cap_resets_with_the_window() {
    let store = MetricsStore::new(1, 100);
    store.record_validation_error(None, "POST", "/items", &["body", "a"], "field required", "missing");
    store.record_validation_error(None, "POST", "/items", &["body", "b"], "field required", "missing");
    let snap = store.snapshot_and_reset();
    assert_eq!(snap.overflow.validation_errors_dropped, 1);

    // Fresh window: new distinct keys fit again and the overflow counter
    // starts from zero.
    store.record_validation_error(None, "POST", "/items", &["body", "c"], "field required", "missing");
    let snap = store.snapshot_and_reset();
    assert_eq!(snap.validation_errors.len(), 1);
    assert_eq!(snap.overflow.validation_errors_dropped, 0);
}

#[test]
fn server_errors_capped_independently() {
    let store = MetricsStore::new(100, 2);
    for i in 0..3 {
        let msg = format!("boom {i}");
        store.record_server_error(None, "GET", "/items", "db::Error", &msg, "trace");
    }
    store.record_validation_error(None, "POST", "/items", &["body", "a"], "field required", "missing");

    let snap = store.snapshot_and_reset();
    assert_eq!(snap.server_errors.len(), 2);
    assert_eq!(snap.overflow.server_errors_dropped, 1);
    // The validation table has its own budget.
    assert_eq!(snap.validation_errors.len(), 1);
    assert_eq!(snap.overflow.validation_errors_dropped, 0);
}

#[test]
fn server_error_rows_carry_grouping_detail() {
    let store = MetricsStore::new(100, 100);
    store.record_server_error(Some("key-1".into()), "get", "/items", "db::Error", "boom", "frame a\nframe b");

    let snap = store.snapshot_and_reset();
    let row = &snap.server_errors[0];
    assert_eq!(row.consumer.as_deref(), Some("key-1"));
    assert_eq!(row.method, "GET");
    assert_eq!(row.error_type, "db::Error");
    assert_eq!(row.stacktrace, "frame a\nframe b");
    assert_eq!(row.error_count, 1);
}
