//! Sender boundary to the collector transport.
//!
//! The sync loop only knows the [`Sender`] trait; the production
//! implementation is [`HttpSender`]. Retry behavior is part of the contract:
//! transient failures are retried with bounded exponential backoff, permanent
//! rejections surface immediately so the loop can log and move on.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use apipulse_core::payload::{StartupPayload, SyncPayload};

pub use http::HttpSender;

/// Terminal send failure, after the sender's own retry budget.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("transient failure after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },
    #[error("permanent rejection: http {status}")]
    Permanent { status: u16 },
    #[error("collector does not know this client id")]
    InvalidClientId,
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ships payloads to the collector.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send_startup(&self, payload: &StartupPayload) -> Result<(), SendError>;
    async fn send_sync(&self, payload: &SyncPayload) -> Result<(), SendError>;
}

/// Exponential backoff policy.
///
/// Delays are non-decreasing over attempts and saturate at `cap`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    factor: u32,
    cap: Duration,
}

impl Backoff {
    pub fn new(base: Duration, factor: u32, cap: Duration) -> Self {
        Self { base, factor, cap }
    }

    /// Delay before retrying after the given zero-based failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(attempt.min(32));
        self.base.saturating_mul(multiplier).min(self.cap)
    }
}
