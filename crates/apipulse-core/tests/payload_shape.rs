//! Wire payload shape tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use apipulse_core::payload::{
    ConsumerRow, OverflowCounts, PathInfo, RequestRow, Snapshot, StartupPayload, SyncPayload,
    ValidationErrorRow,
};

fn empty_snapshot() -> Snapshot {
    Snapshot {
        window_start_ms: 1_000,
        window_end_ms: 61_000,
        requests: vec![],
        validation_errors: vec![],
        server_errors: vec![],
        consumers: vec![],
        overflow: OverflowCounts::default(),
    }
}

#[test]
fn empty_snapshot_is_empty() {
    assert!(empty_snapshot().is_empty());
}

#[test]
fn snapshot_with_consumer_update_is_not_empty() {
    let mut snap = empty_snapshot();
    snap.consumers.push(ConsumerRow {
        identifier: "key-1".into(),
        name: Some("Name".into()),
        group: None,
    });
    assert!(!snap.is_empty());
}

#[test]
fn sync_payload_flattens_snapshot() {
    let mut snap = empty_snapshot();
    snap.requests.push(RequestRow {
        consumer: None,
        method: "GET".into(),
        path: "/items".into(),
        status_code: 200,
        request_count: 3,
        response_time_sum_ms: 60.0,
        request_size_sum: 0,
        response_size_sum: 0,
        response_times: BTreeMap::from([(10, 1), (20, 1), (30, 1)]),
        request_sizes: BTreeMap::new(),
        response_sizes: BTreeMap::new(),
    });
    let payload = SyncPayload {
        instance_uuid: "i-uuid".into(),
        message_uuid: "m-uuid".into(),
        snapshot: snap,
    };

    let v = serde_json::to_value(&payload).unwrap();
    // Snapshot fields sit at the top level next to the uuids.
    assert_eq!(v["instance_uuid"], "i-uuid");
    assert_eq!(v["window_start_ms"], 1_000);
    assert_eq!(v["requests"][0]["request_count"], 3);
    assert_eq!(v["requests"][0]["response_time_sum_ms"], 60.0);
    assert_eq!(v["requests"][0]["response_times"]["20"], 1);
    assert_eq!(v["overflow"]["validation_errors_dropped"], 0);
}

#[test]
fn validation_error_row_renames_type() {
    let row = ValidationErrorRow {
        consumer: None,
        method: "POST".into(),
        path: "/items".into(),
        loc: vec!["body".into(), "name".into()],
        msg: "field required".into(),
        error_type: "missing".into(),
        error_count: 2,
    };
    let v = serde_json::to_value(&row).unwrap();
    assert_eq!(v["type"], "missing");
    assert!(v.get("error_type").is_none());
}

#[test]
fn startup_payload_shape() {
    let payload = StartupPayload {
        instance_uuid: "i-uuid".into(),
        message_uuid: "m-uuid".into(),
        client: "rust:apipulse".into(),
        versions: BTreeMap::from([("apipulse".to_string(), "0.1.0".to_string())]),
        paths: vec![PathInfo::new("get", "/items")],
    };
    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v["client"], "rust:apipulse");
    assert_eq!(v["paths"][0]["method"], "GET");
    assert_eq!(v["versions"]["apipulse"], "0.1.0");
}
