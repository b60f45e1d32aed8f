//! Request counter table.

use std::collections::{BTreeMap, HashMap};
use std::mem;
use std::sync::Mutex;

use apipulse_core::keys::RequestKey;
use apipulse_core::payload::RequestRow;

/// Per-key accumulator: count, sums, and fixed-bin histograms.
#[derive(Debug, Default)]
struct RequestStats {
    request_count: u64,
    response_time_sum_ms: f64,
    request_size_sum: u64,
    response_size_sum: u64,
    response_times: BTreeMap<u64, u64>,
    request_sizes: BTreeMap<u64, u64>,
    response_sizes: BTreeMap<u64, u64>,
}

/// Request counter table: one mutual-exclusion domain.
///
/// The reset is a map swap under the lock, so record calls racing a snapshot
/// land entirely in one window or the other and are never held up for longer
/// than one entry update.
#[derive(Debug, Default)]
pub(crate) struct RequestTable {
    entries: Mutex<HashMap<RequestKey, RequestStats>>,
}

impl RequestTable {
    pub fn add(
        &self,
        key: RequestKey,
        response_time_ms: f64,
        request_size: Option<u64>,
        response_size: Option<u64>,
    ) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let stats = entries.entry(key).or_default();
        stats.request_count += 1;
        stats.response_time_sum_ms += response_time_ms;
        *stats.response_times.entry(response_time_bin(response_time_ms)).or_insert(0) += 1;
        if let Some(size) = request_size {
            stats.request_size_sum += size;
            *stats.request_sizes.entry(size_kb_bin(size)).or_insert(0) += 1;
        }
        if let Some(size) = response_size {
            stats.response_size_sum += size;
            *stats.response_sizes.entry(size_kb_bin(size)).or_insert(0) += 1;
        }
    }

    pub fn snapshot_and_reset(&self) -> Vec<RequestRow> {
        let drained = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            mem::take(&mut *entries)
        };
        drained
            .into_iter()
            .map(|(key, stats)| RequestRow {
                consumer: key.consumer,
                method: key.method,
                path: key.path,
                status_code: key.status_code,
                request_count: stats.request_count,
                response_time_sum_ms: stats.response_time_sum_ms,
                request_size_sum: stats.request_size_sum,
                response_size_sum: stats.response_size_sum,
                response_times: stats.response_times,
                request_sizes: stats.request_sizes,
                response_sizes: stats.response_sizes,
            })
            .collect()
    }
}

/// Floor to the nearest 10 ms.
fn response_time_bin(ms: f64) -> u64 {
    ((ms / 10.0).floor() * 10.0).max(0.0) as u64
}

/// Floor to the nearest 1 KB.
fn size_kb_bin(bytes: u64) -> u64 {
    bytes / 1000
}
