// ── Core error types ──
//
// User-facing errors from salus-core. Consumers never see raw transport
// failures: `salus_api::Error` values are folded into the kind that matches
// the lifecycle step they happened in (connect, poll or command).

use strum::Display;
use thiserror::Error;

use crate::command::Operation;
use crate::gateway::SessionState;
use crate::model::{Category, GatewayKind};

/// Why a connect attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectCause {
    Authentication,
    Network,
    Timeout,
    Configuration,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {gateway} gateway ({cause}): {message}")]
    Connect {
        gateway: GatewayKind,
        cause: ConnectCause,
        message: String,
    },

    /// Setup failed in a way the host should retry later.
    #[error("Gateway not ready, try again later: {message}")]
    NotReady { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Cannot {operation} while the session is {state}")]
    State {
        operation: &'static str,
        state: SessionState,
    },

    // ── Data errors ──────────────────────────────────────────────────
    /// Fetch failed; the previous snapshot is still in place.
    #[error("Poll failed: {message}")]
    Poll { message: String },

    #[error("Unknown {category} device: {device_id}")]
    UnknownDevice {
        category: Category,
        device_id: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// The adapter has no wiring for this operation. Permanent.
    #[error("Operation {operation} is not supported by the {gateway} gateway")]
    UnsupportedOperation {
        operation: Operation,
        gateway: GatewayKind,
    },

    #[error("Operation '{operation}' is not valid for {category} devices")]
    InvalidOperation {
        operation: String,
        category: Category,
    },

    #[error("Command {operation} failed: {message}")]
    Command {
        operation: Operation,
        message: String,
    },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Registry errors ──────────────────────────────────────────────
    #[error("Gateway already configured: {unique_id}")]
    AlreadyConfigured { unique_id: String },
}

impl CoreError {
    /// Fold a transport failure raised while connecting.
    pub(crate) fn connect(gateway: GatewayKind, err: salus_api::Error) -> Self {
        let cause = match &err {
            salus_api::Error::Authentication { .. } | salus_api::Error::SessionExpired => {
                ConnectCause::Authentication
            }
            salus_api::Error::Timeout { .. } => ConnectCause::Timeout,
            salus_api::Error::InvalidConfig(_) => ConnectCause::Configuration,
            salus_api::Error::Connection { .. }
            | salus_api::Error::Upstream { .. }
            | salus_api::Error::Deserialization { .. }
            | salus_api::Error::UnsupportedOperation(_) => ConnectCause::Network,
        };
        Self::Connect {
            gateway,
            cause,
            message: err.to_string(),
        }
    }

    /// Fold a transport failure raised while fetching status.
    pub(crate) fn poll(err: &salus_api::Error) -> Self {
        Self::Poll {
            message: err.to_string(),
        }
    }

    /// Fold a transport failure raised while executing a command.
    pub(crate) fn command(
        gateway: GatewayKind,
        operation: Operation,
        err: &salus_api::Error,
    ) -> Self {
        match err {
            salus_api::Error::UnsupportedOperation(_) => Self::UnsupportedOperation {
                operation,
                gateway,
            },
            other => Self::Command {
                operation,
                message: other.to_string(),
            },
        }
    }

    /// `true` when the host should simply try again on its next cycle.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Poll { .. } | Self::NotReady { .. } => true,
            Self::Connect { cause, .. } => {
                matches!(cause, ConnectCause::Network | ConnectCause::Timeout)
            }
            _ => false,
        }
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_classifies_transport_errors() {
        let err = CoreError::connect(
            GatewayKind::Cloud,
            salus_api::Error::Authentication {
                message: "bad password".into(),
            },
        );
        assert!(matches!(
            err,
            CoreError::Connect {
                cause: ConnectCause::Authentication,
                ..
            }
        ));
        assert!(!err.is_retryable());

        let err = CoreError::connect(
            GatewayKind::Local,
            salus_api::Error::Timeout { timeout_secs: 10 },
        );
        assert!(matches!(
            err,
            CoreError::Connect {
                cause: ConnectCause::Timeout,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn unsupported_transport_command_surfaces_as_unsupported() {
        let err = CoreError::command(
            GatewayKind::Local,
            Operation::Stop,
            &salus_api::Error::UnsupportedOperation("stop_cover"),
        );
        assert!(matches!(
            err,
            CoreError::UnsupportedOperation {
                operation: Operation::Stop,
                gateway: GatewayKind::Local,
            }
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn messages_are_readable() {
        let err = CoreError::State {
            operation: "poll",
            state: SessionState::Disconnected,
        };
        assert_eq!(err.to_string(), "Cannot poll while the session is disconnected");

        let err = CoreError::UnsupportedOperation {
            operation: Operation::SetTemperature,
            gateway: GatewayKind::Cloud,
        };
        assert_eq!(
            err.to_string(),
            "Operation set_temperature is not supported by the it500 gateway"
        );
    }
}
