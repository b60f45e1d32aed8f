//! apiPulse client runtime.
//!
//! This crate wires the aggregation store, config, transport, and background
//! sync loop into the client object framework adapters talk to. It is
//! intended to be consumed through [`client::ApiPulseClient`] and by
//! integration tests.

pub mod client;
pub mod config;
pub mod startup;
pub mod store;
pub mod sync;
pub mod transport;
