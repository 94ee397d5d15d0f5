// ── Gateway session ──
//
// Single owner of one adapter. Every adapter call goes through the mutex,
// so a poll and a command never interleave on the same gateway. Sessions
// share nothing with each other.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::command::Command;
use crate::config::GatewayConfig;
use crate::error::CoreError;
use crate::gateway::{GatewayAdapter, SessionState, TransportProvider, create_gateway};
use crate::model::{DeviceId, GatewayKind, Snapshot};

/// A configured gateway plus its serialized adapter.
pub struct GatewaySession {
    config: GatewayConfig,
    kind: GatewayKind,
    adapter: Mutex<Box<dyn GatewayAdapter>>,
    state: watch::Sender<SessionState>,
}

impl GatewaySession {
    pub fn new(config: GatewayConfig, adapter: Box<dyn GatewayAdapter>) -> Self {
        let kind = adapter.kind();
        let (state, _) = watch::channel(adapter.state());
        Self {
            config,
            kind,
            adapter: Mutex::new(adapter),
            state,
        }
    }

    /// Build the adapter selected by `config` and wrap it.
    pub fn from_config(config: GatewayConfig, transports: &dyn TransportProvider) -> Self {
        let adapter = create_gateway(&config, transports);
        Self::new(config, adapter)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn kind(&self) -> GatewayKind {
        self.kind
    }

    /// Current lifecycle state, without waiting for in-flight calls.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut adapter = self.adapter.lock().await;
        let result = adapter.connect().await;
        self.publish_state(adapter.state());
        result
    }

    /// Release the adapter. Idempotent.
    pub async fn close(&self) {
        let mut adapter = self.adapter.lock().await;
        adapter.close().await;
        self.publish_state(adapter.state());
    }

    // ── Data ─────────────────────────────────────────────────────

    pub async fn poll(&self) -> Result<Arc<Snapshot>, CoreError> {
        self.poll_then(|_| ()).await.map(|(snapshot, ())| snapshot)
    }

    /// Poll and run `on_success` before the adapter lock is released, so
    /// whatever it publishes is ordered with respect to other calls.
    pub(crate) async fn poll_then<T>(
        &self,
        on_success: impl FnOnce(&Arc<Snapshot>) -> T + Send,
    ) -> Result<(Arc<Snapshot>, T), CoreError> {
        let mut adapter = self.adapter.lock().await;
        let snapshot = adapter.poll().await?;
        let published = on_success(&snapshot);
        Ok((snapshot, published))
    }

    pub async fn command(&self, device_id: &DeviceId, command: &Command) -> Result<(), CoreError> {
        let mut adapter = self.adapter.lock().await;
        adapter.command(device_id, command).await
    }

    /// Snapshot of the last successful poll, if any.
    pub async fn last_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.adapter.lock().await.last_snapshot()
    }

    fn publish_state(&self, state: SessionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(gateway = %self.kind, from = %previous, to = %state, "session state changed");
        }
    }
}

impl std::fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("gateway", &self.kind)
            .field("unique_id", &self.config.unique_id())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
