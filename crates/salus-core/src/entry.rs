// ── Integration entries ──
//
// One `GatewayEntry` per configured gateway: session, cache and dispatcher
// wired together. The host owns a `GatewayRegistry` of them instead of a
// process-wide dictionary.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{CachedSnapshot, PollingCache};
use crate::command::CommandRequest;
use crate::config::GatewayConfig;
use crate::dispatch::{CommandDispatcher, PendingRefresh};
use crate::error::CoreError;
use crate::gateway::{SessionState, TransportProvider};
use crate::model::Snapshot;
use crate::session::GatewaySession;

/// Prefix of coordinator names, as the host knows this integration.
pub const DOMAIN: &str = "salus_enhanced_integration";

// ── GatewayEntry ─────────────────────────────────────────────────

#[derive(Debug)]
pub struct GatewayEntry {
    session: Arc<GatewaySession>,
    cache: Arc<PollingCache>,
    dispatcher: CommandDispatcher,
}

impl GatewayEntry {
    /// Connect and take the first snapshot.
    ///
    /// Any failure closes the adapter and comes back as
    /// [`CoreError::NotReady`]: the host should retry setup later.
    pub async fn setup(
        config: GatewayConfig,
        transports: &dyn TransportProvider,
    ) -> Result<Self, CoreError> {
        let entry = Self::from_session(Arc::new(GatewaySession::from_config(config, transports)));

        if let Err(e) = entry.start().await {
            warn!(entry = %entry.unique_id(), error = %e, "gateway setup failed");
            entry.session.close().await;
            return Err(CoreError::NotReady {
                message: e.to_string(),
            });
        }

        let devices = entry.snapshot().map_or(0, |s| s.device_count());
        info!(entry = %entry.unique_id(), devices, "gateway ready");
        Ok(entry)
    }

    /// Wrap an existing session without connecting it.
    pub fn from_session(session: Arc<GatewaySession>) -> Self {
        let cache = Arc::new(PollingCache::new(Arc::clone(&session)));
        let dispatcher = CommandDispatcher::new(Arc::clone(&cache));
        Self {
            session,
            cache,
            dispatcher,
        }
    }

    async fn start(&self) -> Result<(), CoreError> {
        self.session.connect().await?;
        self.cache.refresh().await?;
        Ok(())
    }

    /// Called by the host scheduler every [`scan_interval`](Self::scan_interval).
    pub async fn refresh(&self) -> Result<Arc<CachedSnapshot>, CoreError> {
        self.cache.refresh().await
    }

    pub async fn command(
        &self,
        device_id: &str,
        category: &str,
        operation: &str,
        args: &Value,
    ) -> Result<PendingRefresh, CoreError> {
        self.dispatcher
            .dispatch_raw(device_id, category, operation, args)
            .await
    }

    pub async fn send(&self, request: CommandRequest) -> Result<PendingRefresh, CoreError> {
        self.dispatcher.dispatch(request).await
    }

    /// Cancel pending refreshes and close the gateway. Idempotent.
    pub async fn unload(&self) {
        self.dispatcher.cancel_pending();
        self.session.close().await;
        info!(entry = %self.unique_id(), "gateway unloaded");
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn unique_id(&self) -> String {
        self.session.config().unique_id()
    }

    pub fn title(&self) -> String {
        self.session.config().title()
    }

    pub fn coordinator_name(&self) -> String {
        format!("{DOMAIN}_{}", self.session.config().identifier())
    }

    pub fn scan_interval(&self) -> Duration {
        self.session.config().scan_interval
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cache.snapshot()
    }

    pub fn session(&self) -> &Arc<GatewaySession> {
        &self.session
    }

    pub fn cache(&self) -> &Arc<PollingCache> {
        &self.cache
    }
}

// ── GatewayRegistry ──────────────────────────────────────────────

/// Host-owned set of loaded entries, keyed by entry id.
#[derive(Debug, Default)]
pub struct GatewayRegistry {
    entries: DashMap<Uuid, Arc<GatewayEntry>>,
    unique_ids: DashMap<String, Uuid>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set up a gateway and register it.
    ///
    /// A gateway that is already configured is rejected before any
    /// connection is attempted.
    pub async fn setup(
        &self,
        config: GatewayConfig,
        transports: &dyn TransportProvider,
    ) -> Result<Uuid, CoreError> {
        let unique_id = config.unique_id();
        if self.is_configured(&unique_id) {
            return Err(CoreError::AlreadyConfigured { unique_id });
        }

        let entry = GatewayEntry::setup(config, transports).await?;
        self.register(entry).await
    }

    /// Add a loaded entry. A second entry for the same gateway is unloaded
    /// and rejected.
    pub async fn register(&self, entry: GatewayEntry) -> Result<Uuid, CoreError> {
        let unique_id = entry.unique_id();
        let rejected = match self.unique_ids.entry(unique_id.clone()) {
            Entry::Occupied(_) => entry,
            Entry::Vacant(slot) => {
                let id = Uuid::new_v4();
                self.entries.insert(id, Arc::new(entry));
                slot.insert(id);
                info!(%id, entry = %unique_id, "entry registered");
                return Ok(id);
            }
        };

        rejected.unload().await;
        Err(CoreError::AlreadyConfigured { unique_id })
    }

    pub fn is_configured(&self, unique_id: &str) -> bool {
        self.unique_ids.contains_key(unique_id)
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<GatewayEntry>> {
        self.entries.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Look an entry up by its gateway's unique id.
    pub fn find(&self, unique_id: &str) -> Option<Arc<GatewayEntry>> {
        let id = *self.unique_ids.get(unique_id)?;
        self.get(&id)
    }

    /// Remove and unload an entry. Returns `false` if it was not loaded.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let Some((_, entry)) = self.entries.remove(id) else {
            return false;
        };
        self.unique_ids.remove(&entry.unique_id());
        entry.unload().await;
        true
    }

    pub async fn unload_all(&self) {
        for id in self.ids() {
            self.remove(&id).await;
        }
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
