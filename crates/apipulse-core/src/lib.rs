//! apiPulse core: telemetry contracts shared by the client runtime and
//! framework adapters.
//!
//! This crate defines the composite keys that identify aggregated rows, the
//! observation inputs adapters hand to the client, and the payload value
//! objects shipped to the collector. It intentionally carries no transport or
//! runtime dependencies so adapters can depend on it alone.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Telemetry runs inside other people's request handlers; all fallible paths
//! must surface as `ApiPulseError`/`Result`, never crash the host process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod keys;
pub mod observe;
pub mod payload;

/// Shared result type.
pub use error::{ApiPulseError, Result};
