//! In-memory aggregation store.
//!
//! One [`MetricsStore`] per process. Record paths touch only in-memory
//! structures, never perform I/O, and lock only their own sub-table, so they
//! are safe to call inline on the request path from any number of tasks or
//! threads. The sync loop is the only other party, through
//! [`MetricsStore::snapshot_and_reset`].

mod consumers;
mod errors;
mod requests;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use apipulse_core::keys::{Consumer, RequestKey, ServerErrorKey, ValidationErrorKey};
use apipulse_core::observe::{RequestInfo, ResponseInfo};
use apipulse_core::payload::{OverflowCounts, ServerErrorRow, Snapshot, ValidationErrorRow};

use consumers::ConsumerRegistry;
use errors::CappedCountTable;
use requests::RequestTable;

pub struct MetricsStore {
    requests: RequestTable,
    validation_errors: CappedCountTable<ValidationErrorKey>,
    server_errors: CappedCountTable<ServerErrorKey>,
    consumers: ConsumerRegistry,
    window_start_ms: AtomicU64,
}

impl MetricsStore {
    pub fn new(validation_error_cap: usize, server_error_cap: usize) -> Self {
        Self {
            requests: RequestTable::default(),
            validation_errors: CappedCountTable::new(validation_error_cap),
            server_errors: CappedCountTable::new(server_error_cap),
            consumers: ConsumerRegistry::default(),
            window_start_ms: AtomicU64::new(now_ms()),
        }
    }

    pub fn record_request(&self, request: RequestInfo, response: ResponseInfo) {
        let key = RequestKey::new(
            request.consumer,
            &request.method,
            &request.path,
            response.status_code,
        );
        self.requests.add(
            key,
            response.response_time_ms,
            request.size_bytes,
            response.size_bytes,
        );
    }

    pub fn record_validation_error(
        &self,
        consumer: Option<String>,
        method: &str,
        path: &str,
        loc: &[&str],
        msg: &str,
        error_type: &str,
    ) {
        self.validation_errors
            .add(ValidationErrorKey::new(consumer, method, path, loc, msg, error_type));
    }

    pub fn record_server_error(
        &self,
        consumer: Option<String>,
        method: &str,
        path: &str,
        error_type: &str,
        msg: &str,
        stacktrace: &str,
    ) {
        self.server_errors
            .add(ServerErrorKey::new(consumer, method, path, error_type, msg, stacktrace));
    }

    pub fn set_consumer(&self, consumer: Consumer) {
        self.consumers.add_or_update(consumer);
    }

    /// Atomically copy out all accumulated data and reset counters to
    /// zero-state. The consumer registry keeps its state; only its
    /// updated-set drains.
    pub fn snapshot_and_reset(&self) -> Snapshot {
        let window_end_ms = now_ms();
        let window_start_ms = self.window_start_ms.swap(window_end_ms, Ordering::Relaxed);

        let requests = self.requests.snapshot_and_reset();
        let (validation_errors, validation_errors_dropped) = self.validation_errors.drain();
        let (server_errors, server_errors_dropped) = self.server_errors.drain();
        let consumers = self.consumers.drain_updated();

        Snapshot {
            window_start_ms,
            window_end_ms,
            requests,
            validation_errors: validation_errors
                .into_iter()
                .map(|(key, count)| ValidationErrorRow {
                    consumer: key.consumer,
                    method: key.method,
                    path: key.path,
                    loc: key.loc,
                    msg: key.msg,
                    error_type: key.error_type,
                    error_count: count,
                })
                .collect(),
            server_errors: server_errors
                .into_iter()
                .map(|(key, count)| ServerErrorRow {
                    consumer: key.consumer,
                    method: key.method,
                    path: key.path,
                    error_type: key.error_type,
                    msg: key.msg,
                    stacktrace: key.stacktrace,
                    error_count: count,
                })
                .collect(),
            consumers,
            overflow: OverflowCounts {
                validation_errors_dropped,
                server_errors_dropped,
            },
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
