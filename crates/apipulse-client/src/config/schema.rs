use serde::Deserialize;
use uuid::Uuid;

use apipulse_core::error::{ApiPulseError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Client identity issued by the collector (UUID).
    pub client_id: String,
    /// Deployment environment label, e.g. "prod".
    pub env: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,

    /// Faster cadence used while the process is young, so fresh deploys show
    /// up quickly.
    #[serde(default = "default_initial_sync_interval_ms")]
    pub initial_sync_interval_ms: u64,

    /// How long after startup the initial cadence applies. Zero disables it.
    #[serde(default = "default_initial_sync_period_ms")]
    pub initial_sync_period_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Send attempts per payload, transient failures only.
    #[serde(default = "default_max_send_attempts")]
    pub max_send_attempts: u32,

    /// Base delay of the exponential backoff between attempts.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Distinct validation error signatures tracked per window.
    #[serde(default = "default_validation_error_cap")]
    pub validation_error_cap: usize,

    /// Distinct server error signatures tracked per window.
    #[serde(default = "default_server_error_cap")]
    pub server_error_cap: usize,
}

impl ClientConfig {
    /// Config with default tuning for the given identity.
    pub fn new(client_id: &str, env: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            env: env.to_string(),
            base_url: default_base_url(),
            sync_interval_ms: default_sync_interval_ms(),
            initial_sync_interval_ms: default_initial_sync_interval_ms(),
            initial_sync_period_ms: default_initial_sync_period_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            max_send_attempts: default_max_send_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            validation_error_cap: default_validation_error_cap(),
            server_error_cap: default_server_error_cap(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if Uuid::parse_str(&self.client_id).is_err() {
            return Err(ApiPulseError::InvalidClientId(self.client_id.clone()));
        }
        if self.env.is_empty()
            || self.env.len() > 32
            || !self.env.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ApiPulseError::InvalidEnv(self.env.clone()));
        }
        if self.base_url.is_empty() {
            return Err(ApiPulseError::InvalidConfig("base_url must not be empty".into()));
        }
        if self.sync_interval_ms == 0 || self.initial_sync_interval_ms == 0 {
            return Err(ApiPulseError::InvalidConfig(
                "sync_interval_ms and initial_sync_interval_ms must be greater than zero".into(),
            ));
        }
        if self.request_timeout_ms == 0 || self.drain_timeout_ms == 0 {
            return Err(ApiPulseError::InvalidConfig(
                "request_timeout_ms and drain_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.max_send_attempts == 0 {
            return Err(ApiPulseError::InvalidConfig(
                "max_send_attempts must be at least 1".into(),
            ));
        }
        if self.retry_base_delay_ms == 0 {
            return Err(ApiPulseError::InvalidConfig(
                "retry_base_delay_ms must be greater than zero".into(),
            ));
        }
        if self.validation_error_cap == 0 || self.server_error_cap == 0 {
            return Err(ApiPulseError::InvalidConfig(
                "error signature caps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://hub.apipulse.io".into()
}
fn default_sync_interval_ms() -> u64 {
    60_000
}
fn default_initial_sync_interval_ms() -> u64 {
    10_000
}
fn default_initial_sync_period_ms() -> u64 {
    3_600_000
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_drain_timeout_ms() -> u64 {
    5_000
}
fn default_max_send_attempts() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    1_000
}
fn default_validation_error_cap() -> usize {
    500
}
fn default_server_error_cap() -> usize {
    500
}
