// ── Command dispatcher ──
//
// Validates a request against the latest cached snapshot, forwards it to
// the session and schedules a follow-up refresh. The refresh runs in the
// background: a command's effect is only visible once the gateway reports
// it on a later poll.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::PollingCache;
use crate::command::{Command, CommandRequest, Operation};
use crate::error::CoreError;
use crate::gateway::SessionState;
use crate::model::{Category, DeviceId};
use crate::session::GatewaySession;

pub struct CommandDispatcher {
    session: Arc<GatewaySession>,
    cache: Arc<PollingCache>,
    cancel: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(cache: Arc<PollingCache>) -> Self {
        Self::with_cancellation(cache, CancellationToken::new())
    }

    /// Tie pending refreshes to an externally owned token.
    pub fn with_cancellation(cache: Arc<PollingCache>, cancel: CancellationToken) -> Self {
        Self {
            session: Arc::clone(cache.session()),
            cache,
            cancel,
        }
    }

    /// Validate and forward a typed request.
    ///
    /// Checks run in order: the device must be in the latest snapshot, then
    /// the operation must be legal for the category. Adapter errors,
    /// including unsupported operations, are returned unchanged.
    pub async fn dispatch(&self, request: CommandRequest) -> Result<PendingRefresh, CoreError> {
        let CommandRequest {
            device_id,
            category,
            command,
        } = request;

        self.ensure_known(category, &device_id)?;
        let operation = command.operation();
        ensure_legal(operation, category)?;

        self.session.command(&device_id, &command).await?;
        info!(device = %device_id, %category, %operation, "command sent");

        Ok(self.schedule_refresh())
    }

    /// Validate and forward an untyped request, as it arrives from a host
    /// service call.
    pub async fn dispatch_raw(
        &self,
        device_id: &str,
        category: &str,
        operation: &str,
        args: &Value,
    ) -> Result<PendingRefresh, CoreError> {
        let category = Category::from_str(category).map_err(|_| CoreError::Validation {
            message: format!("unrecognized device category '{category}'"),
        })?;
        let device_id = DeviceId::new(device_id)?;
        self.ensure_known(category, &device_id)?;

        let operation =
            Operation::from_str(operation).map_err(|_| CoreError::InvalidOperation {
                operation: operation.to_owned(),
                category,
            })?;
        ensure_legal(operation, category)?;

        let command = Command::from_parts(operation, args)?;
        self.dispatch(CommandRequest::new(device_id, category, command))
            .await
    }

    /// Cancel every refresh this dispatcher has scheduled and not yet run.
    pub fn cancel_pending(&self) {
        self.cancel.cancel();
    }

    fn ensure_known(&self, category: Category, device_id: &DeviceId) -> Result<(), CoreError> {
        let known = self
            .cache
            .snapshot()
            .is_some_and(|snapshot| snapshot.contains(category, device_id.as_str()));
        if known {
            Ok(())
        } else {
            Err(CoreError::UnknownDevice {
                category,
                device_id: device_id.to_string(),
            })
        }
    }

    fn schedule_refresh(&self) -> PendingRefresh {
        let cache = Arc::clone(&self.cache);
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("post-command refresh cancelled");
                    None
                }
                result = cache.refresh() => Some(result.map(|cached| cached.sequence)),
            }
        });

        PendingRefresh { handle }
    }
}

fn ensure_legal(operation: Operation, category: Category) -> Result<(), CoreError> {
    if operation.applies_to(category) {
        Ok(())
    } else {
        Err(CoreError::InvalidOperation {
            operation: operation.to_string(),
            category,
        })
    }
}

// ── PendingRefresh ───────────────────────────────────────────────

/// Handle to the refresh scheduled after a successful command.
///
/// Dropping it detaches the refresh; it still runs.
#[derive(Debug)]
pub struct PendingRefresh {
    handle: JoinHandle<Option<Result<u64, CoreError>>>,
}

impl PendingRefresh {
    /// Wait for the refresh and return the sequence it published.
    pub async fn wait(self) -> Result<u64, CoreError> {
        match self.handle.await {
            Ok(Some(result)) => result,
            Ok(None) => Err(CoreError::State {
                operation: "refresh",
                state: SessionState::Closed,
            }),
            Err(e) => {
                warn!(error = %e, "refresh task did not complete");
                Err(CoreError::Poll {
                    message: format!("refresh task failed: {e}"),
                })
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("session", &self.session)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
