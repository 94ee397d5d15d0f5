// ── Local gateway (IT600 / UGE600) contract ──
//
// The local gateway speaks an encrypted LAN protocol. This crate does not
// implement it; a host plugs a real client in by implementing
// `LocalTransport`. The gateway already groups devices by category, so
// `fetch_status` hands back one map per category keyed by device id.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Client for one local gateway, identified by host and EUID.
#[async_trait]
pub trait LocalTransport: Send + Sync {
    /// Open the session with the gateway.
    async fn connect(&self) -> Result<(), Error>;

    /// Fetch the current state of every paired device.
    async fn fetch_status(&self) -> Result<LocalStatus, Error>;

    // ── Climate ──────────────────────────────────────────────────────

    async fn set_climate_temperature(&self, device_id: &str, temperature: f64)
    -> Result<(), Error>;

    /// `mode` is one of `"off"`, `"heat"`, `"auto"`.
    async fn set_climate_mode(&self, device_id: &str, mode: &str) -> Result<(), Error>;

    async fn set_climate_preset(&self, device_id: &str, preset: &str) -> Result<(), Error>;

    // ── Switches ─────────────────────────────────────────────────────

    async fn turn_on_switch(&self, device_id: &str) -> Result<(), Error>;

    async fn turn_off_switch(&self, device_id: &str) -> Result<(), Error>;

    // ── Covers ───────────────────────────────────────────────────────

    async fn open_cover(&self, device_id: &str) -> Result<(), Error>;

    async fn close_cover(&self, device_id: &str) -> Result<(), Error>;

    async fn stop_cover(&self, device_id: &str) -> Result<(), Error>;

    async fn set_cover_position(&self, device_id: &str, position: u8) -> Result<(), Error>;

    /// Release the session. Transports without explicit teardown keep the
    /// default no-op.
    async fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

// ── Raw payloads ────────────────────────────────────────────────────

/// Full device listing as reported by the local gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalStatus {
    pub climate: HashMap<String, LocalClimateDevice>,
    pub binary_sensor: HashMap<String, LocalBinarySensor>,
    pub sensor: HashMap<String, LocalSensor>,
    pub switch: HashMap<String, LocalSwitch>,
    pub cover: HashMap<String, LocalCover>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalClimateDevice {
    pub model: Option<String>,
    pub name: Option<String>,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    /// `"off"`, `"heat"` or `"auto"`.
    pub hvac_mode: Option<String>,
    /// `"heating"`, `"idle"` or `"off"`.
    pub hvac_action: Option<String>,
    pub preset_mode: Option<String>,
    pub battery_level: Option<i64>,
    pub current_humidity: Option<f64>,
    pub window_open: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBinarySensor {
    pub model: Option<String>,
    pub name: Option<String>,
    pub is_on: Option<bool>,
    pub device_class: Option<String>,
    pub battery_level: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSensor {
    pub model: Option<String>,
    pub name: Option<String>,
    pub state: Option<f64>,
    pub unit_of_measurement: Option<String>,
    pub device_class: Option<String>,
    pub battery_level: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSwitch {
    pub model: Option<String>,
    pub name: Option<String>,
    pub is_on: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalCover {
    pub model: Option<String>,
    pub name: Option<String>,
    /// 0 (closed) through 100 (open).
    pub current_cover_position: Option<i64>,
    pub is_closed: Option<bool>,
}
