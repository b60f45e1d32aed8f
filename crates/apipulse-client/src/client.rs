//! The apiPulse client object.
//!
//! One client per process, constructed explicitly and passed by reference to
//! framework adapters (no global singleton). Record methods are total: they
//! touch only in-memory state and cannot fail observably, so adapters may call
//! them inline on the request path. The background sync loop is the only part
//! that performs I/O.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use apipulse_core::error::Result;
use apipulse_core::keys::Consumer;
use apipulse_core::observe::{RequestInfo, ResponseInfo};
use apipulse_core::payload::PathInfo;

use crate::config::ClientConfig;
use crate::startup::StartupData;
use crate::store::MetricsStore;
use crate::sync::SyncLoop;
use crate::transport::{HttpSender, Sender};

#[derive(Clone)]
pub struct ApiPulseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    cfg: ClientConfig,
    store: Arc<MetricsStore>,
    sender: Arc<dyn Sender>,
    instance_uuid: String,
    startup: Mutex<StartupData>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ApiPulseClient {
    /// Build a client with the production HTTP sender.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        cfg.validate()?;
        let sender: Arc<dyn Sender> = Arc::new(HttpSender::new(&cfg)?);
        Self::with_sender(cfg, sender)
    }

    /// Build a client with a custom sender. Used by tests and by deployments
    /// with their own transport.
    pub fn with_sender(cfg: ClientConfig, sender: Arc<dyn Sender>) -> Result<Self> {
        cfg.validate()?;
        let store = Arc::new(MetricsStore::new(cfg.validation_error_cap, cfg.server_error_cap));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            inner: Arc::new(ClientInner {
                cfg,
                store,
                sender,
                instance_uuid: Uuid::new_v4().to_string(),
                startup: Mutex::new(StartupData::default()),
                shutdown_tx,
                shutdown_rx,
                loop_handle: Mutex::new(None),
            }),
        })
    }

    /// Register the endpoint inventory and app version sent in the handshake.
    /// Call before [`start`](Self::start).
    pub fn set_startup_data(&self, paths: Vec<PathInfo>, app_version: Option<String>) {
        let mut startup = self.inner.startup.lock().unwrap_or_else(|e| e.into_inner());
        startup.paths = paths;
        startup.app_version = app_version;
    }

    /// Spawn the background sync loop. Idempotent; a second call is a no-op.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut handle = self.inner.loop_handle.lock().unwrap_or_else(|e| e.into_inner());
        if handle.is_some() {
            tracing::warn!("sync loop already started");
            return;
        }
        let startup = self.inner.startup.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let sync_loop = SyncLoop::new(
            self.inner.cfg.clone(),
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.sender),
            self.inner.instance_uuid.clone(),
            startup,
            self.inner.shutdown_rx.clone(),
        );
        *handle = Some(tokio::spawn(sync_loop.run()));
        tracing::info!(env = %self.inner.cfg.env, "apipulse client started");
    }

    /// Signal shutdown and wait for the loop to finish its bounded final
    /// drain. Terminal: the client records no further syncs afterwards.
    pub async fn stop(&self) {
        let _ = self.inner.shutdown_tx.send(true);
        let handle = self.inner.loop_handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                tracing::warn!("sync loop task aborted before finishing its drain");
            }
        }
        tracing::info!("apipulse client stopped");
    }

    /// Record one request/response pair.
    pub fn record_request(&self, request: RequestInfo, response: ResponseInfo) {
        self.inner.store.record_request(request, response);
    }

    /// Record client validation failures for a request, one per offending
    /// field.
    pub fn record_validation_error(
        &self,
        consumer: Option<&str>,
        method: &str,
        path: &str,
        loc: &[&str],
        msg: &str,
        error_type: &str,
    ) {
        self.inner.store.record_validation_error(
            consumer.map(str::to_string),
            method,
            path,
            loc,
            msg,
            error_type,
        );
    }

    /// Record a server error (5xx) with enough detail for grouping.
    pub fn record_server_error(
        &self,
        consumer: Option<&str>,
        method: &str,
        path: &str,
        error_type: &str,
        msg: &str,
        stacktrace: &str,
    ) {
        self.inner.store.record_server_error(
            consumer.map(str::to_string),
            method,
            path,
            error_type,
            msg,
            stacktrace,
        );
    }

    /// Register or refresh consumer metadata.
    pub fn set_consumer(&self, consumer: Consumer) {
        self.inner.store.set_consumer(consumer);
    }
}
