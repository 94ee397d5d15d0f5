// ── Runtime gateway configuration ──
//
// These types describe *which* gateway to talk to and how patiently.
// They carry credential data but never touch disk; the host (or
// salus-config) builds a `GatewayConfig` and hands it in. Immutable once
// a session is constructed.

use std::time::Duration;

use secrecy::SecretString;

use crate::model::GatewayKind;

/// Default per-call timeout for connect, poll and command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default interval at which the host scheduler calls `refresh()`.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// EUID the local gateway accepts when none is printed on the unit.
pub const DEFAULT_EUID: &str = "0000000000000000";

/// IT600 gateway on the local network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
    pub host: String,
    pub euid: String,
}

/// IT500 cloud account and thermostat.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub username: String,
    pub password: SecretString,
    /// Numeric thermostat id (the `devId` of the vendor portal).
    pub device_id: String,
}

/// Gateway-specific settings.
#[derive(Debug, Clone)]
pub enum GatewaySettings {
    Local(LocalConfig),
    Cloud(CloudConfig),
}

/// Configuration for a single integration instance.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub gateway: GatewaySettings,
    /// Upper bound on each connect, poll and command call.
    pub timeout: Duration,
    /// Refresh interval for the host scheduler. The core runs no timer.
    pub scan_interval: Duration,
}

impl GatewayConfig {
    pub fn local(host: impl Into<String>, euid: impl Into<String>) -> Self {
        Self::with_settings(GatewaySettings::Local(LocalConfig {
            host: host.into(),
            euid: euid.into(),
        }))
    }

    pub fn cloud(
        username: impl Into<String>,
        password: SecretString,
        device_id: impl Into<String>,
    ) -> Self {
        Self::with_settings(GatewaySettings::Cloud(CloudConfig {
            username: username.into(),
            password,
            device_id: device_id.into(),
        }))
    }

    fn with_settings(gateway: GatewaySettings) -> Self {
        Self {
            gateway,
            timeout: DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_scan_interval(mut self, scan_interval: Duration) -> Self {
        self.scan_interval = scan_interval;
        self
    }

    pub fn kind(&self) -> GatewayKind {
        match self.gateway {
            GatewaySettings::Local(_) => GatewayKind::Local,
            GatewaySettings::Cloud(_) => GatewayKind::Cloud,
        }
    }

    /// EUID for local gateways, device id for cloud thermostats.
    pub fn identifier(&self) -> &str {
        match &self.gateway {
            GatewaySettings::Local(local) => &local.euid,
            GatewaySettings::Cloud(cloud) => &cloud.device_id,
        }
    }

    /// Stable id used to reject duplicate entries, e.g. `it600_<euid>`.
    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.kind(), self.identifier())
    }

    /// Human-readable entry title.
    pub fn title(&self) -> String {
        match &self.gateway {
            GatewaySettings::Local(local) => format!("Salus IT600 Gateway {}", local.euid),
            GatewaySettings::Cloud(cloud) => format!("Salus IT500 Device {}", cloud.device_id),
        }
    }
}
