// ── Polling cache ──
//
// Last good snapshot plus a poll sequence number. Readers load lock-free
// through `ArcSwapOption`; the sequence is also broadcast on a watch
// channel so consumers can wait for a newer poll. A failed refresh leaves
// both untouched.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::Snapshot;
use crate::session::GatewaySession;

/// A snapshot tagged with the poll that produced it.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub sequence: u64,
    pub snapshot: Arc<Snapshot>,
}

impl CachedSnapshot {
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.snapshot.taken_at()
    }
}

pub struct PollingCache {
    session: Arc<GatewaySession>,
    current: ArcSwapOption<CachedSnapshot>,
    sequence: watch::Sender<u64>,
}

impl PollingCache {
    /// Empty cache at sequence 0. Nothing is served until the first
    /// successful refresh.
    pub fn new(session: Arc<GatewaySession>) -> Self {
        let (sequence, _) = watch::channel(0);
        Self {
            session,
            current: ArcSwapOption::empty(),
            sequence,
        }
    }

    pub fn session(&self) -> &Arc<GatewaySession> {
        &self.session
    }

    /// Poll the gateway and swap in the result.
    ///
    /// The swap and the sequence bump happen while the adapter is still
    /// locked, so two refreshes publish in the order they polled.
    pub async fn refresh(&self) -> Result<Arc<CachedSnapshot>, CoreError> {
        let result = self
            .session
            .poll_then(|snapshot| {
                let sequence = *self.sequence.borrow() + 1;
                let cached = Arc::new(CachedSnapshot {
                    sequence,
                    snapshot: Arc::clone(snapshot),
                });
                self.current.store(Some(Arc::clone(&cached)));
                self.sequence.send_replace(sequence);
                cached
            })
            .await;

        match result {
            Ok((_, cached)) => {
                debug!(
                    sequence = cached.sequence,
                    devices = cached.snapshot.device_count(),
                    "cache refreshed"
                );
                Ok(cached)
            }
            Err(e) => {
                warn!(error = %e, sequence = self.sequence(), "refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    // ── Readers ──────────────────────────────────────────────────

    pub fn current(&self) -> Option<Arc<CachedSnapshot>> {
        self.current.load_full()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current().map(|cached| Arc::clone(&cached.snapshot))
    }

    /// Number of successful refreshes so far.
    pub fn sequence(&self) -> u64 {
        *self.sequence.borrow()
    }

    /// The current snapshot if it is newer than `sequence`.
    pub fn changed_since(&self, sequence: u64) -> Option<Arc<CachedSnapshot>> {
        self.current().filter(|cached| cached.sequence > sequence)
    }

    /// Wait until a refresh at or past `sequence` has been published.
    pub async fn wait_for(&self, sequence: u64) -> Option<Arc<CachedSnapshot>> {
        let mut rx = self.sequence.subscribe();
        rx.wait_for(|published| *published >= sequence).await.ok()?;
        self.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sequence.subscribe()
    }
}

impl std::fmt::Debug for PollingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingCache")
            .field("session", &self.session)
            .field("sequence", &self.sequence())
            .finish_non_exhaustive()
    }
}
