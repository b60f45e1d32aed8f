//! Shared error type across apiPulse crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, ApiPulseError>;

/// Unified error type used by core and client.
///
/// Errors here cover construction and configuration only. The record paths are
/// total by design and transport failures carry their own error type at the
/// sender boundary.
#[derive(Debug, Error)]
pub enum ApiPulseError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid client id '{0}' (expecting hexadecimal UUID format)")]
    InvalidClientId(String),
    #[error("invalid env '{0}' (expecting 1-32 alphanumeric characters, hyphens and underscores)")]
    InvalidEnv(String),
    #[error("internal: {0}")]
    Internal(String),
}
