// ── Adapter lifecycle bookkeeping ──
//
// Shared by both variants: the state machine and the last good snapshot.

use std::sync::Arc;

use super::SessionState;
use crate::error::CoreError;
use crate::model::Snapshot;

#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: SessionState,
    last: Option<Arc<Snapshot>>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            last: None,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn ensure_can_connect(&self) -> Result<(), CoreError> {
        match self.state {
            SessionState::Disconnected => Ok(()),
            state => Err(CoreError::State {
                operation: "connect",
                state,
            }),
        }
    }

    pub(crate) fn ensure_connected(&self, operation: &'static str) -> Result<(), CoreError> {
        match self.state {
            SessionState::Connected => Ok(()),
            state => Err(CoreError::State { operation, state }),
        }
    }

    pub(crate) fn mark_connected(&mut self) {
        self.state = SessionState::Connected;
    }

    /// Move to `Closed`, returning the state we left. `None` if already
    /// closed.
    pub(crate) fn close(&mut self) -> Option<SessionState> {
        match self.state {
            SessionState::Closed => None,
            previous => {
                self.state = SessionState::Closed;
                Some(previous)
            }
        }
    }

    /// Record a successful poll.
    pub(crate) fn publish(&mut self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.last = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub(crate) fn last_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.last.clone()
    }
}
