// ── Cloud gateway adapter (IT500) ──
//
// One thermostat per configured device id. The vendor hands back a flat
// field set which is reduced to a single climate device; every other
// category is always empty.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use salus_api::cloud::{
    FIELD_CURRENT_TEMPERATURE, FIELD_HEAT_ENABLE, FIELD_HEAT_OUTPUT, FIELD_PRODUCT,
    FIELD_SCHEDULE_MODE, FIELD_SET_POINT,
};
use salus_api::{CloudTransport, CloudWriter};

use super::{GatewayAdapter, Lifecycle, SessionState, bounded};
use crate::command::{Command, Operation};
use crate::config::CloudConfig;
use crate::error::CoreError;
use crate::model::{
    Attributes, Category, DEFAULT_PRESET, DeviceId, DeviceStatus, GatewayKind, HvacMode, Snapshot,
};

/// Model reported when the payload carries no product name.
const DEFAULT_PRODUCT: &str = "IT500";

/// Adapter for an IT500 thermostat behind the vendor cloud.
pub struct CloudGateway {
    config: CloudConfig,
    timeout: Duration,
    transport: Box<dyn CloudTransport>,
    writer: Option<Box<dyn CloudWriter>>,
    lifecycle: Lifecycle,
}

impl CloudGateway {
    pub fn new(config: CloudConfig, timeout: Duration, transport: Box<dyn CloudTransport>) -> Self {
        Self {
            config,
            timeout,
            transport,
            writer: None,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Wire climate writes. Without a writer every command is unsupported.
    #[must_use]
    pub fn with_writer(mut self, writer: Box<dyn CloudWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn supports_writes(&self) -> bool {
        self.writer.is_some()
    }

    fn unsupported(operation: Operation) -> CoreError {
        CoreError::UnsupportedOperation {
            operation,
            gateway: GatewayKind::Cloud,
        }
    }
}

#[async_trait]
impl GatewayAdapter for CloudGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Cloud
    }

    fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    fn last_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.lifecycle.last_snapshot()
    }

    async fn connect(&mut self) -> Result<(), CoreError> {
        self.lifecycle.ensure_can_connect()?;
        validate(&self.config).map_err(|e| CoreError::connect(GatewayKind::Cloud, e))?;

        debug!(device = %self.config.device_id, "logging in to cloud service");
        bounded(
            self.timeout,
            self.transport
                .login(&self.config.username, &self.config.password),
        )
        .await
        .map_err(|e| CoreError::connect(GatewayKind::Cloud, e))?;

        self.lifecycle.mark_connected();
        info!(device = %self.config.device_id, "connected to cloud service");
        Ok(())
    }

    async fn poll(&mut self) -> Result<Arc<Snapshot>, CoreError> {
        self.lifecycle.ensure_connected("poll")?;

        let payload = bounded(self.timeout, self.transport.device_data(&self.config.device_id))
            .await
            .map_err(|e| CoreError::poll(&e))?;
        let device_id =
            DeviceId::new(self.config.device_id.as_str()).map_err(|e| CoreError::Poll {
                message: e.to_string(),
            })?;
        let snapshot = normalize_cloud_payload(&device_id, &payload)?;

        debug!(device = %device_id, "cloud poll complete");
        Ok(self.lifecycle.publish(snapshot))
    }

    async fn command(&mut self, device_id: &DeviceId, command: &Command) -> Result<(), CoreError> {
        self.lifecycle.ensure_connected("command")?;

        let operation = command.operation();
        let Some(writer) = self.writer.as_deref() else {
            return Err(Self::unsupported(operation));
        };

        let id = device_id.as_str();
        let call = match command {
            Command::SetTemperature { temperature } => writer.set_temperature(id, *temperature),
            Command::SetMode { mode } => writer.set_mode(id, heat_flag(*mode)),
            Command::SetPreset { preset } => writer.set_preset(id, preset),
            Command::TurnOn
            | Command::TurnOff
            | Command::Open
            | Command::Close
            | Command::Stop
            | Command::SetPosition { .. } => return Err(Self::unsupported(operation)),
        };

        debug!(device = %device_id, %operation, "sending cloud command");
        bounded(self.timeout, call)
            .await
            .map_err(|e| CoreError::command(GatewayKind::Cloud, operation, &e))
    }

    async fn close(&mut self) {
        match self.lifecycle.close() {
            Some(SessionState::Connected) => {
                if let Err(e) = bounded(self.timeout, self.transport.close()).await {
                    warn!(error = %e, "cloud logout failed (non-fatal)");
                }
                debug!(device = %self.config.device_id, "cloud session closed");
            }
            Some(_) => debug!("cloud session closed before connecting"),
            None => {}
        }
    }
}

/// Reject settings the cloud service would refuse anyway.
fn validate(config: &CloudConfig) -> Result<(), salus_api::Error> {
    if config.username.trim().is_empty() {
        return Err(salus_api::Error::InvalidConfig(
            "username must not be empty".into(),
        ));
    }
    if config.password.expose_secret().is_empty() {
        return Err(salus_api::Error::InvalidConfig(
            "password must not be empty".into(),
        ));
    }
    if config.device_id.is_empty() || !config.device_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(salus_api::Error::InvalidConfig(format!(
            "device id '{}' must be numeric",
            config.device_id
        )));
    }
    Ok(())
}

/// Vendor heat-enable flag for a mode. Auto keeps heating enabled.
fn heat_flag(mode: HvacMode) -> u8 {
    match mode {
        HvacMode::Off => 0,
        HvacMode::Heat | HvacMode::Auto => 1,
    }
}

// ── Normalization ────────────────────────────────────────────────

/// Reduce the vendor field set to one climate device keyed by `device_id`.
///
/// A payload that is not a JSON object fails the poll. Individual fields
/// of an unexpected shape are reported as unknown.
pub fn normalize_cloud_payload(device_id: &DeviceId, payload: &Value) -> Result<Snapshot, CoreError> {
    let Value::Object(fields) = payload else {
        return Err(CoreError::Poll {
            message: format!("expected a JSON object for device {device_id}, got {payload}"),
        });
    };

    let model = match fields.get(FIELD_PRODUCT) {
        Some(Value::String(product)) => product.clone(),
        _ => DEFAULT_PRODUCT.to_owned(),
    };

    let attributes = Attributes {
        current_temperature: temperature(fields, FIELD_CURRENT_TEMPERATURE),
        target_temperature: temperature(fields, FIELD_SET_POINT),
        hvac_mode: Some(hvac_mode(fields)),
        is_heating: Some(fields.get(FIELD_HEAT_OUTPUT).is_some_and(|v| is_number(v, 1))),
        preset_mode: Some(preset(fields)),
        ..Attributes::default()
    };

    let device = DeviceStatus::new(device_id.as_str(), Category::Climate)?
        .with_model(Some(model))
        .with_attributes(attributes);

    Ok(Snapshot::builder(GatewayKind::Cloud).with(device)?.build())
}

/// Off overrides auto, auto overrides heat.
fn hvac_mode(fields: &Map<String, Value>) -> HvacMode {
    if fields.get(FIELD_HEAT_ENABLE).is_some_and(|v| is_number(v, 0)) {
        HvacMode::Off
    } else if fields.get(FIELD_SCHEDULE_MODE).and_then(Value::as_str) == Some("auto") {
        HvacMode::Auto
    } else {
        HvacMode::Heat
    }
}

fn preset(fields: &Map<String, Value>) -> String {
    match fields.get(FIELD_SCHEDULE_MODE) {
        Some(Value::String(mode)) => mode.clone(),
        None | Some(Value::Null) => DEFAULT_PRESET.to_owned(),
        Some(other) => {
            warn!(field = FIELD_SCHEDULE_MODE, value = %other, "unexpected schedule mode");
            DEFAULT_PRESET.to_owned()
        }
    }
}

/// Exact numeric match: `1` and `1.0` count, `"1"` and `true` do not.
fn is_number(value: &Value, expected: i32) -> bool {
    value
        .as_f64()
        .is_some_and(|v| (v - f64::from(expected)).abs() < f64::EPSILON)
}

/// Numbers and numeric strings; anything else is unknown.
fn temperature(fields: &Map<String, Value>, field: &str) -> Option<f64> {
    let value = match fields.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => None,
        other => {
            debug!(field, value = %other, "ignoring non-numeric temperature");
            None
        }
    };
    value.filter(|t| t.is_finite())
}
