// ── Local gateway adapter (IT600) ──
//
// The local gateway already groups devices by category. Normalization is
// field renaming plus range checks; nothing is derived.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use salus_api::{LocalStatus, LocalTransport};

use super::{GatewayAdapter, Lifecycle, SessionState, bounded};
use crate::command::Command;
use crate::config::LocalConfig;
use crate::error::CoreError;
use crate::model::{
    Attributes, Category, DeviceId, DeviceStatus, GatewayKind, HvacMode, Snapshot,
    SnapshotBuilder,
};

/// Adapter for an IT600 gateway on the local network.
pub struct LocalGateway {
    config: LocalConfig,
    timeout: Duration,
    transport: Box<dyn LocalTransport>,
    lifecycle: Lifecycle,
}

impl LocalGateway {
    pub fn new(config: LocalConfig, timeout: Duration, transport: Box<dyn LocalTransport>) -> Self {
        Self {
            config,
            timeout,
            transport,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }
}

#[async_trait]
impl GatewayAdapter for LocalGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Local
    }

    fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    fn last_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.lifecycle.last_snapshot()
    }

    async fn connect(&mut self) -> Result<(), CoreError> {
        self.lifecycle.ensure_can_connect()?;
        if self.config.host.trim().is_empty() {
            return Err(CoreError::connect(
                GatewayKind::Local,
                salus_api::Error::InvalidConfig("host must not be empty".into()),
            ));
        }

        debug!(host = %self.config.host, euid = %self.config.euid, "connecting to local gateway");
        bounded(self.timeout, self.transport.connect())
            .await
            .map_err(|e| CoreError::connect(GatewayKind::Local, e))?;

        self.lifecycle.mark_connected();
        info!(host = %self.config.host, "connected to local gateway");
        Ok(())
    }

    async fn poll(&mut self) -> Result<Arc<Snapshot>, CoreError> {
        self.lifecycle.ensure_connected("poll")?;

        let status = bounded(self.timeout, self.transport.fetch_status())
            .await
            .map_err(|e| CoreError::poll(&e))?;
        let snapshot = normalize_local_status(status)?;

        debug!(devices = snapshot.device_count(), "local poll complete");
        Ok(self.lifecycle.publish(snapshot))
    }

    async fn command(&mut self, device_id: &DeviceId, command: &Command) -> Result<(), CoreError> {
        self.lifecycle.ensure_connected("command")?;

        let operation = command.operation();
        debug!(device = %device_id, %operation, "sending local command");

        let transport = self.transport.as_ref();
        let id = device_id.as_str();
        let call = async move {
            match command {
                Command::SetTemperature { temperature } => {
                    transport.set_climate_temperature(id, *temperature).await
                }
                Command::SetMode { mode } => {
                    let mode: &'static str = (*mode).into();
                    transport.set_climate_mode(id, mode).await
                }
                Command::SetPreset { preset } => transport.set_climate_preset(id, preset).await,
                Command::TurnOn => transport.turn_on_switch(id).await,
                Command::TurnOff => transport.turn_off_switch(id).await,
                Command::Open => transport.open_cover(id).await,
                Command::Close => transport.close_cover(id).await,
                Command::Stop => transport.stop_cover(id).await,
                Command::SetPosition { position } => {
                    transport.set_cover_position(id, *position).await
                }
            }
        };

        bounded(self.timeout, call)
            .await
            .map_err(|e| CoreError::command(GatewayKind::Local, operation, &e))
    }

    async fn close(&mut self) {
        match self.lifecycle.close() {
            Some(SessionState::Connected) => {
                if let Err(e) = bounded(self.timeout, self.transport.close()).await {
                    warn!(error = %e, "local gateway close failed (non-fatal)");
                }
                debug!(host = %self.config.host, "local gateway closed");
            }
            Some(_) => debug!("local gateway closed before connecting"),
            None => {}
        }
    }
}

// ── Normalization ────────────────────────────────────────────────

/// Rename the local gateway's fields into the canonical schema.
///
/// Every category is present in the result, empty or not. An empty device
/// id fails the whole poll.
pub fn normalize_local_status(status: LocalStatus) -> Result<Snapshot, CoreError> {
    let mut builder = Snapshot::builder(GatewayKind::Local);

    for (id, raw) in status.climate {
        let attributes = Attributes {
            current_temperature: raw.current_temperature,
            target_temperature: raw.target_temperature,
            hvac_mode: raw.hvac_mode.as_deref().and_then(|m| parse_mode(&id, m)),
            is_heating: raw.hvac_action.as_deref().map(|a| a == "heating"),
            preset_mode: raw.preset_mode,
            battery: percent(raw.battery_level),
            humidity: raw.current_humidity,
            window_open: raw.window_open,
            ..Attributes::default()
        };
        add(&mut builder, id, Category::Climate, raw.model, raw.name, attributes)?;
    }

    for (id, raw) in status.binary_sensor {
        let attributes = Attributes {
            is_on: raw.is_on,
            battery: percent(raw.battery_level),
            ..Attributes::default()
        };
        add(&mut builder, id, Category::BinarySensor, raw.model, raw.name, attributes)?;
    }

    for (id, raw) in status.sensor {
        let attributes = Attributes {
            value: raw.state,
            unit: raw.unit_of_measurement,
            battery: percent(raw.battery_level),
            ..Attributes::default()
        };
        add(&mut builder, id, Category::Sensor, raw.model, raw.name, attributes)?;
    }

    for (id, raw) in status.switch {
        let attributes = Attributes {
            is_on: raw.is_on,
            ..Attributes::default()
        };
        add(&mut builder, id, Category::Switch, raw.model, raw.name, attributes)?;
    }

    for (id, raw) in status.cover {
        let attributes = Attributes {
            position: percent(raw.current_cover_position),
            is_closed: raw.is_closed,
            ..Attributes::default()
        };
        add(&mut builder, id, Category::Cover, raw.model, raw.name, attributes)?;
    }

    Ok(builder.build())
}

fn add(
    builder: &mut SnapshotBuilder,
    id: String,
    category: Category,
    model: Option<String>,
    name: Option<String>,
    attributes: Attributes,
) -> Result<(), CoreError> {
    let status = DeviceStatus::new(id, category)
        .map_err(|e| CoreError::Poll {
            message: format!("malformed {category} entry: {e}"),
        })?
        .with_model(model)
        .with_name(name)
        .with_attributes(attributes);
    builder.insert(status).map_err(|e| CoreError::Poll {
        message: e.to_string(),
    })
}

fn parse_mode(id: &str, raw: &str) -> Option<HvacMode> {
    let mode = HvacMode::from_str(raw).ok();
    if mode.is_none() {
        warn!(device = id, mode = raw, "unrecognized hvac mode");
    }
    mode
}

/// 0..=100, anything else is unknown.
fn percent(raw: Option<i64>) -> Option<u8> {
    raw.and_then(|v| u8::try_from(v).ok()).filter(|v| *v <= 100)
}
