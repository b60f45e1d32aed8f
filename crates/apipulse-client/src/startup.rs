//! Handshake payload assembly.

use std::collections::BTreeMap;

use uuid::Uuid;

use apipulse_core::payload::{PathInfo, StartupPayload};

/// Static application metadata registered before the loop starts, sent once
/// per process lifetime in the handshake.
#[derive(Debug, Clone, Default)]
pub struct StartupData {
    /// Endpoint inventory (method + path templates), supplied by the adapter.
    pub paths: Vec<PathInfo>,
    /// Host application version, if the adapter knows one.
    pub app_version: Option<String>,
}

impl StartupData {
    pub(crate) fn to_payload(&self, instance_uuid: &str) -> StartupPayload {
        let mut versions = BTreeMap::new();
        versions.insert("apipulse".to_string(), env!("CARGO_PKG_VERSION").to_string());
        if let Some(app_version) = &self.app_version {
            versions.insert("app".to_string(), app_version.clone());
        }
        StartupPayload {
            instance_uuid: instance_uuid.to_string(),
            message_uuid: Uuid::new_v4().to_string(),
            client: "rust:apipulse".to_string(),
            versions,
            paths: self.paths.clone(),
        }
    }
}
