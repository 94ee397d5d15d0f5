#![allow(clippy::unwrap_used, dead_code)]
// In-memory transports shared by the integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Value, json};

use salus_api::{
    CloudTransport, CloudWriter, Error, LocalClimateDevice, LocalCover, LocalStatus, LocalSwitch,
    LocalTransport,
};
use salus_core::{CloudConfig, GatewayConfig, LocalConfig, TransportProvider};

pub const THERMOSTAT: &str = "001e5e0d32";
pub const COVER: &str = "c1";
pub const PLUG: &str = "p1";
pub const CLOUD_DEVICE: &str = "12345";

// ── Call recording ──────────────────────────────────────────────────

/// Knobs and call log behind one mock transport.
#[derive(Default)]
pub struct Script {
    calls: Mutex<Vec<String>>,
    pub fail_connect: AtomicBool,
    pub fail_poll: AtomicBool,
    pub fail_command: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Script {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Highest number of calls that were ever running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    async fn enter(&self, call: String, fail: &AtomicBool) -> Result<(), Error> {
        self.calls.lock().unwrap().push(call);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if fail.load(Ordering::SeqCst) {
            return Err(Error::Connection {
                reason: "gateway unreachable".into(),
            });
        }
        Ok(())
    }

    async fn command(&self, call: String) -> Result<(), Error> {
        self.enter(call, &self.fail_command).await
    }
}

// ── Local transport ─────────────────────────────────────────────────

pub struct LocalMock {
    pub script: Arc<Script>,
    pub status: Arc<Mutex<LocalStatus>>,
}

impl LocalMock {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script::default()),
            status: Arc::new(Mutex::new(local_status())),
        }
    }

    pub fn handle(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            status: Arc::clone(&self.status),
        }
    }
}

#[async_trait]
impl LocalTransport for LocalMock {
    async fn connect(&self) -> Result<(), Error> {
        self.script
            .enter("connect".into(), &self.script.fail_connect)
            .await
    }

    async fn fetch_status(&self) -> Result<LocalStatus, Error> {
        self.script
            .enter("fetch_status".into(), &self.script.fail_poll)
            .await?;
        Ok(self.status.lock().unwrap().clone())
    }

    async fn set_climate_temperature(&self, id: &str, temperature: f64) -> Result<(), Error> {
        self.script
            .command(format!("set_climate_temperature {id} {temperature}"))
            .await
    }

    async fn set_climate_mode(&self, id: &str, mode: &str) -> Result<(), Error> {
        self.script.command(format!("set_climate_mode {id} {mode}")).await
    }

    async fn set_climate_preset(&self, id: &str, preset: &str) -> Result<(), Error> {
        self.script
            .command(format!("set_climate_preset {id} {preset}"))
            .await
    }

    async fn turn_on_switch(&self, id: &str) -> Result<(), Error> {
        self.script.command(format!("turn_on_switch {id}")).await
    }

    async fn turn_off_switch(&self, id: &str) -> Result<(), Error> {
        self.script.command(format!("turn_off_switch {id}")).await
    }

    async fn open_cover(&self, id: &str) -> Result<(), Error> {
        self.script.command(format!("open_cover {id}")).await
    }

    async fn close_cover(&self, id: &str) -> Result<(), Error> {
        self.script.command(format!("close_cover {id}")).await
    }

    async fn stop_cover(&self, id: &str) -> Result<(), Error> {
        self.script.calls.lock().unwrap().push(format!("stop_cover {id}"));
        Err(Error::UnsupportedOperation("stop_cover"))
    }

    async fn set_cover_position(&self, id: &str, position: u8) -> Result<(), Error> {
        self.script
            .command(format!("set_cover_position {id} {position}"))
            .await
    }

    async fn close(&self) -> Result<(), Error> {
        self.script.calls.lock().unwrap().push("close".into());
        Ok(())
    }
}

// ── Cloud transport ─────────────────────────────────────────────────

pub struct CloudMock {
    pub script: Arc<Script>,
    pub payload: Arc<Mutex<Value>>,
}

impl CloudMock {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script::default()),
            payload: Arc::new(Mutex::new(cloud_payload())),
        }
    }

    pub fn handle(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            payload: Arc::clone(&self.payload),
        }
    }
}

#[async_trait]
impl CloudTransport for CloudMock {
    async fn login(&self, username: &str, _password: &SecretString) -> Result<(), Error> {
        self.script
            .enter(format!("login {username}"), &self.script.fail_connect)
            .await
    }

    async fn device_data(&self, device_id: &str) -> Result<Value, Error> {
        self.script
            .enter(format!("device_data {device_id}"), &self.script.fail_poll)
            .await?;
        Ok(self.payload.lock().unwrap().clone())
    }

    async fn close(&self) -> Result<(), Error> {
        self.script.calls.lock().unwrap().push("close".into());
        Ok(())
    }
}

pub struct WriterMock {
    pub script: Arc<Script>,
}

impl WriterMock {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script::default()),
        }
    }

    pub fn handle(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
        }
    }
}

#[async_trait]
impl CloudWriter for WriterMock {
    async fn set_temperature(&self, id: &str, temperature: f64) -> Result<(), Error> {
        self.script
            .command(format!("set_temperature {id} {temperature}"))
            .await
    }

    async fn set_mode(&self, id: &str, mode: u8) -> Result<(), Error> {
        self.script.command(format!("set_mode {id} {mode}")).await
    }

    async fn set_preset(&self, id: &str, preset: &str) -> Result<(), Error> {
        self.script.command(format!("set_preset {id} {preset}")).await
    }
}

// ── Provider ────────────────────────────────────────────────────────

/// Hands out handles onto the same mocks, so a test keeps its view of the
/// call log after the adapter takes ownership.
pub struct Transports {
    pub local: LocalMock,
    pub cloud: CloudMock,
    pub writer: Option<WriterMock>,
}

impl Transports {
    pub fn new() -> Self {
        Self {
            local: LocalMock::new(),
            cloud: CloudMock::new(),
            writer: None,
        }
    }

    pub fn with_writer() -> Self {
        Self {
            writer: Some(WriterMock::new()),
            ..Self::new()
        }
    }
}

impl TransportProvider for Transports {
    fn local(&self, _config: &LocalConfig) -> Box<dyn LocalTransport> {
        Box::new(self.local.handle())
    }

    fn cloud(&self, _config: &CloudConfig) -> Box<dyn CloudTransport> {
        Box::new(self.cloud.handle())
    }

    fn cloud_writer(&self, _config: &CloudConfig) -> Option<Box<dyn CloudWriter>> {
        self.writer
            .as_ref()
            .map(|w| Box::new(w.handle()) as Box<dyn CloudWriter>)
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn local_config() -> GatewayConfig {
    GatewayConfig::local("10.0.0.5", "ABC123")
}

pub fn cloud_config() -> GatewayConfig {
    let password: SecretString = "hunter2".to_string().into();
    GatewayConfig::cloud("me@example.com", password, CLOUD_DEVICE)
}

pub fn local_status() -> LocalStatus {
    let mut status = LocalStatus::default();
    status.climate.insert(
        THERMOSTAT.into(),
        LocalClimateDevice {
            model: Some("VS10WRF".into()),
            name: Some("Living room".into()),
            current_temperature: Some(20.5),
            target_temperature: Some(21.0),
            hvac_mode: Some("heat".into()),
            hvac_action: Some("idle".into()),
            preset_mode: Some("home".into()),
            battery_level: Some(90),
            ..LocalClimateDevice::default()
        },
    );
    status.cover.insert(
        COVER.into(),
        LocalCover {
            model: Some("RS600".into()),
            current_cover_position: Some(100),
            is_closed: Some(false),
            ..LocalCover::default()
        },
    );
    status.switch.insert(
        PLUG.into(),
        LocalSwitch {
            model: Some("SP600".into()),
            is_on: Some(false),
            ..LocalSwitch::default()
        },
    );
    status
}

pub fn cloud_payload() -> Value {
    json!({
        "product": "IT500",
        "CH1currentTemperature": "19.5",
        "CH1currentSetPoint": 21.0,
        "CH1heatOffOn": 1,
        "CH1heatOnOff": 1,
        "CH1autoOff": "auto"
    })
}
