// ── Cloud gateway (IT500) contract ──
//
// The IT500 service exposes one thermostat per device id as a flat bag of
// vendor fields (`CH1currentTemperature`, `CH1heatOffOn`, ...). Reads and
// writes are split into two traits: a host that only scraped the read
// endpoint provides a `CloudTransport` and nothing else.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::Error;

/// Vendor field: measured room temperature.
pub const FIELD_CURRENT_TEMPERATURE: &str = "CH1currentTemperature";
/// Vendor field: active set point.
pub const FIELD_SET_POINT: &str = "CH1currentSetPoint";
/// Vendor field: heating enabled flag (0 = off).
pub const FIELD_HEAT_ENABLE: &str = "CH1heatOffOn";
/// Vendor field: boiler output flag (1 = currently heating).
pub const FIELD_HEAT_OUTPUT: &str = "CH1heatOnOff";
/// Vendor field: schedule mode (`"auto"`, `"manual"`, ...).
pub const FIELD_SCHEDULE_MODE: &str = "CH1autoOff";
/// Vendor field: product/model name.
pub const FIELD_PRODUCT: &str = "product";

/// Read path of the cloud service.
#[async_trait]
pub trait CloudTransport: Send + Sync {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error>;

    /// Raw vendor field set for one thermostat.
    async fn device_data(&self, device_id: &str) -> Result<serde_json::Value, Error>;

    /// Release the session. Defaults to a no-op.
    async fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Write path of the cloud service.
#[async_trait]
pub trait CloudWriter: Send + Sync {
    async fn set_temperature(&self, device_id: &str, temperature: f64) -> Result<(), Error>;

    /// `mode` is the vendor heat-enable flag: 1 = on, 0 = off.
    async fn set_mode(&self, device_id: &str, mode: u8) -> Result<(), Error>;

    async fn set_preset(&self, device_id: &str, preset: &str) -> Result<(), Error>;
}
