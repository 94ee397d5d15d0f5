use thiserror::Error;

/// Top-level error type for the `salus-api` crate.
///
/// Every transport implementation reports failures through this enum,
/// whether it talks to a local gateway or the cloud service.
/// `salus-core` maps these into lifecycle-aware error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, locked account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session was invalidated by the remote side.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// The gateway could not be reached (refused, DNS failure, etc.)
    #[error("Connection failed: {reason}")]
    Connection { reason: String },

    /// Request did not complete in time.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Transport was built from unusable settings.
    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),

    // ── Gateway responses ───────────────────────────────────────────
    /// The gateway answered but refused or failed the request.
    #[error("Gateway error: {message}")]
    Upstream { message: String },

    /// Response body could not be decoded, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Operation not offered by this transport.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    /// Returns `true` if this error indicates the credentials were refused
    /// or the session lapsed.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next scheduled cycle.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::SessionExpired
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization {
            message: err.to_string(),
            body: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn transient_classification() {
        assert!(Error::Timeout { timeout_secs: 10 }.is_transient());
        assert!(
            Error::Connection {
                reason: "refused".into()
            }
            .is_transient()
        );
        assert!(!Error::InvalidConfig("host".into()).is_transient());
        assert!(!Error::UnsupportedOperation("set_preset").is_transient());
    }

    #[test]
    fn auth_classification() {
        assert!(
            Error::Authentication {
                message: "bad password".into()
            }
            .is_auth()
        );
        assert!(Error::SessionExpired.is_auth());
        assert!(!Error::Timeout { timeout_secs: 1 }.is_auth());
    }
}
