//! Background sync loop.
//!
//! One task per process, spawned by the client. Lifecycle:
//!
//! ```text
//! Init -> HandshakePending -> Running -> Draining -> Stopped
//! ```
//!
//! The handshake is retried with exponential backoff until it succeeds, the
//! collector rejects the client identity, or shutdown is requested. While
//! running, each timer tick snapshots the store and hands the window to the
//! sender; ticks never overlap because the send is awaited in the loop body.
//! A failed send is logged and the snapshot discarded (at-most-once
//! delivery). Shutdown cancels the timer wait immediately and performs one
//! final flush bounded by the drain timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

use apipulse_core::payload::{Snapshot, SyncPayload};

use crate::config::ClientConfig;
use crate::startup::StartupData;
use crate::store::MetricsStore;
use crate::transport::{Backoff, SendError, Sender};

/// Sync loop lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Init,
    HandshakePending,
    Running,
    Draining,
    Stopped,
}

impl SyncState {
    fn as_str(self) -> &'static str {
        match self {
            SyncState::Init => "init",
            SyncState::HandshakePending => "handshake_pending",
            SyncState::Running => "running",
            SyncState::Draining => "draining",
            SyncState::Stopped => "stopped",
        }
    }
}

enum HandshakeOutcome {
    Established,
    Rejected,
    ShutdownRequested,
}

enum SyncOutcome {
    Sent,
    SkippedEmpty,
    Failed,
    Rejected,
}

pub(crate) struct SyncLoop {
    cfg: ClientConfig,
    store: Arc<MetricsStore>,
    sender: Arc<dyn Sender>,
    instance_uuid: String,
    startup: StartupData,
    shutdown: watch::Receiver<bool>,
    started_at: Instant,
    state: SyncState,
}

impl SyncLoop {
    pub fn new(
        cfg: ClientConfig,
        store: Arc<MetricsStore>,
        sender: Arc<dyn Sender>,
        instance_uuid: String,
        startup: StartupData,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            cfg,
            store,
            sender,
            instance_uuid,
            startup,
            shutdown,
            started_at: Instant::now(),
            state: SyncState::Init,
        }
    }

    pub async fn run(mut self) {
        self.transition(SyncState::HandshakePending);
        match self.handshake().await {
            HandshakeOutcome::Established => {
                self.transition(SyncState::Running);
                if self.run_until_shutdown().await {
                    self.drain().await;
                }
            }
            HandshakeOutcome::ShutdownRequested => {
                self.drain().await;
            }
            HandshakeOutcome::Rejected => {}
        }
        self.transition(SyncState::Stopped);
    }

    /// Retry the one-time handshake on its own backoff schedule, independent
    /// of the sync cadence.
    async fn handshake(&mut self) -> HandshakeOutcome {
        let backoff = Backoff::new(
            Duration::from_millis(self.cfg.retry_base_delay_ms),
            2,
            Duration::from_millis(self.cfg.sync_interval_ms),
        );
        let mut attempt: u32 = 0;
        loop {
            if *self.shutdown.borrow() {
                return HandshakeOutcome::ShutdownRequested;
            }
            let payload = self.startup.to_payload(&self.instance_uuid);
            match self.sender.send_startup(&payload).await {
                Ok(()) => {
                    tracing::info!("handshake with collector established");
                    return HandshakeOutcome::Established;
                }
                Err(SendError::InvalidClientId) => {
                    self.log_rejected();
                    return HandshakeOutcome::Rejected;
                }
                Err(err) => {
                    let delay = backoff.delay(attempt);
                    attempt = attempt.saturating_add(1);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "handshake failed; backing off",
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.shutdown.changed() => return HandshakeOutcome::ShutdownRequested,
                    }
                }
            }
        }
    }

    /// Returns true when shutdown was requested, false when the collector
    /// rejected the client identity mid-run.
    async fn run_until_shutdown(&mut self) -> bool {
        let mut shutdown = self.shutdown.clone();
        let mut period = self.current_interval();
        let mut tick = new_interval(period);
        loop {
            let ticked = tokio::select! {
                _ = tick.tick() => true,
                _ = shutdown.changed() => false,
            };
            if !ticked {
                return true;
            }
            if let SyncOutcome::Rejected = self.sync_once().await {
                self.log_rejected();
                return false;
            }
            // Cadence settles from the initial interval to the regular one
            // once the process is no longer young.
            let want = self.current_interval();
            if want != period {
                period = want;
                tick = new_interval(period);
            }
        }
    }

    async fn sync_once(&self) -> SyncOutcome {
        let snapshot = self.store.snapshot_and_reset();
        if snapshot.is_empty() {
            tracing::debug!("window empty; skipping sync");
            return SyncOutcome::SkippedEmpty;
        }
        let payload = self.wrap(snapshot);
        match self.sender.send_sync(&payload).await {
            Ok(()) => {
                tracing::debug!(
                    requests = payload.snapshot.requests.len(),
                    "synced window with collector",
                );
                SyncOutcome::Sent
            }
            Err(SendError::InvalidClientId) => SyncOutcome::Rejected,
            Err(err) => {
                tracing::warn!(error = %err, "sync failed; discarding window snapshot");
                SyncOutcome::Failed
            }
        }
    }

    /// One best-effort final flush, bounded by the drain timeout.
    async fn drain(&mut self) {
        self.transition(SyncState::Draining);
        let timeout = Duration::from_millis(self.cfg.drain_timeout_ms);
        if tokio::time::timeout(timeout, self.sync_once()).await.is_err() {
            tracing::warn!("final flush timed out; discarding remainder");
        }
    }

    fn wrap(&self, snapshot: Snapshot) -> SyncPayload {
        SyncPayload {
            instance_uuid: self.instance_uuid.clone(),
            message_uuid: Uuid::new_v4().to_string(),
            snapshot,
        }
    }

    fn current_interval(&self) -> Duration {
        let initial_period = Duration::from_millis(self.cfg.initial_sync_period_ms);
        if self.started_at.elapsed() < initial_period {
            Duration::from_millis(self.cfg.initial_sync_interval_ms)
        } else {
            Duration::from_millis(self.cfg.sync_interval_ms)
        }
    }

    fn log_rejected(&self) {
        tracing::error!(
            client_id = %self.cfg.client_id,
            "collector rejected client id; telemetry disabled",
        );
    }

    fn transition(&mut self, next: SyncState) {
        tracing::debug!(from = self.state.as_str(), to = next.as_str(), "sync loop state change");
        self.state = next;
    }
}

fn new_interval(period: Duration) -> Interval {
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // An interval's first tick completes immediately; push it out so the
    // first sync happens one full period from now.
    tick.reset();
    tick
}
