//! Top-level facade crate for apiPulse.
//!
//! Re-exports core contracts and the client runtime so adapters can depend on
//! a single crate.

pub mod core {
    pub use apipulse_core::*;
}

pub mod client {
    pub use apipulse_client::*;
}
