//! HTTP sender over reqwest.

use std::time::Duration;

use async_trait::async_trait;

use apipulse_core::error::ApiPulseError;
use apipulse_core::payload::{StartupPayload, SyncPayload};

use crate::config::ClientConfig;
use crate::transport::{Backoff, SendError, Sender};

const HUB_VERSION: &str = "v2";

/// Posts JSON payloads to `{base_url}/v2/{client_id}/{env}/{endpoint}`.
///
/// Transient failures (connect errors, timeouts, 5xx, 429) are retried with
/// exponential backoff up to `max_send_attempts`. With the default tuning
/// (3 attempts, 10 s request timeout, 1 s base delay) the worst case stays
/// well below the sync interval, so sends cannot pile up. Other 4xx responses
/// are permanent and never retried.
pub struct HttpSender {
    http: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    backoff: Backoff,
}

impl HttpSender {
    pub fn new(cfg: &ClientConfig) -> Result<Self, ApiPulseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| ApiPulseError::Internal(format!("http client build failed: {e}")))?;
        let base_url = format!(
            "{}/{HUB_VERSION}/{}/{}",
            cfg.base_url.trim_end_matches('/'),
            cfg.client_id,
            cfg.env,
        );
        Ok(Self {
            http,
            base_url,
            max_attempts: cfg.max_send_attempts,
            backoff: Backoff::new(
                Duration::from_millis(cfg.retry_base_delay_ms),
                2,
                Duration::from_millis(cfg.sync_interval_ms),
            ),
        })
    }

    async fn post_json(&self, endpoint: &str, body: Vec<u8>) -> Result<(), SendError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut last_reason = String::new();
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.backoff.delay(attempt - 1)).await;
            }
            match self
                .http
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(());
                    }
                    match status.as_u16() {
                        404 => return Err(SendError::InvalidClientId),
                        422 => {
                            let detail = response.text().await.unwrap_or_default();
                            tracing::error!(%detail, "collector rejected payload as invalid");
                            return Err(SendError::Permanent { status: 422 });
                        }
                        429 => last_reason = format!("http {status}"),
                        s if status.is_client_error() => {
                            return Err(SendError::Permanent { status: s });
                        }
                        _ => last_reason = format!("http {status}"),
                    }
                }
                Err(e) => last_reason = e.to_string(),
            }
            tracing::debug!(%url, attempt, reason = %last_reason, "send attempt failed");
        }
        Err(SendError::RetriesExhausted {
            attempts: self.max_attempts,
            reason: last_reason,
        })
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send_startup(&self, payload: &StartupPayload) -> Result<(), SendError> {
        let body = serde_json::to_vec(payload)?;
        self.post_json("startup", body).await
    }

    async fn send_sync(&self, payload: &SyncPayload) -> Result<(), SendError> {
        let body = serde_json::to_vec(payload)?;
        self.post_json("sync", body).await
    }
}
