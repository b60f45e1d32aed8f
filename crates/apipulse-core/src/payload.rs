//! Wire payload value objects.
//!
//! A [`Snapshot`] is the immutable point-in-time copy produced by
//! `snapshot_and_reset`; [`SyncPayload`] and [`StartupPayload`] are the two
//! message shapes posted to the collector. Exact wire encoding (JSON) is the
//! transport's concern; this module only fixes field presence and names.

use std::collections::BTreeMap;

use serde::Serialize;

/// One request counter row.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRow {
    pub consumer: Option<String>,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub request_count: u64,
    /// Sum of response times in ms; divide by `request_count` for the mean.
    pub response_time_sum_ms: f64,
    pub request_size_sum: u64,
    pub response_size_sum: u64,
    /// Response time histogram: 10 ms floor bin -> count.
    pub response_times: BTreeMap<u64, u64>,
    /// Request size histogram: 1 KB floor bin -> count.
    pub request_sizes: BTreeMap<u64, u64>,
    /// Response size histogram: 1 KB floor bin -> count.
    pub response_sizes: BTreeMap<u64, u64>,
}

/// One client validation failure row.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorRow {
    pub consumer: Option<String>,
    pub method: String,
    pub path: String,
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub error_count: u64,
}

/// One server error (5xx) row.
#[derive(Debug, Clone, Serialize)]
pub struct ServerErrorRow {
    pub consumer: Option<String>,
    pub method: String,
    pub path: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub msg: String,
    pub stacktrace: String,
    pub error_count: u64,
}

/// One consumer registry update. Represents current state, not a delta.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumerRow {
    pub identifier: String,
    pub name: Option<String>,
    pub group: Option<String>,
}

/// Distinct keys silently dropped this window, per capped table.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OverflowCounts {
    pub validation_errors_dropped: u64,
    pub server_errors_dropped: u64,
}

/// Immutable point-in-time copy of all aggregated counters for one window.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Window start, unix epoch ms.
    pub window_start_ms: u64,
    /// Window end, unix epoch ms.
    pub window_end_ms: u64,
    pub requests: Vec<RequestRow>,
    pub validation_errors: Vec<ValidationErrorRow>,
    pub server_errors: Vec<ServerErrorRow>,
    pub consumers: Vec<ConsumerRow>,
    pub overflow: OverflowCounts,
}

impl Snapshot {
    /// True when the window saw nothing worth sending.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
            && self.validation_errors.is_empty()
            && self.server_errors.is_empty()
            && self.consumers.is_empty()
    }
}

/// Periodic sync message.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPayload {
    /// Stable per-process identity.
    pub instance_uuid: String,
    /// Fresh per message; lets the collector deduplicate.
    pub message_uuid: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// One known endpoint (method + route template).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathInfo {
    pub method: String,
    pub path: String,
}

impl PathInfo {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
        }
    }
}

/// One-time handshake message establishing the client's identity and endpoint
/// inventory with the collector.
#[derive(Debug, Clone, Serialize)]
pub struct StartupPayload {
    pub instance_uuid: String,
    pub message_uuid: String,
    /// Client library identifier, e.g. `"rust:apipulse"`.
    pub client: String,
    /// Library and application versions.
    pub versions: BTreeMap<String, String>,
    /// Known endpoints (method + path templates).
    pub paths: Vec<PathInfo>,
}
