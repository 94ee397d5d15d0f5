// ── Gateway adapters ──
//
// One contract, two vendor variants. An adapter owns its transport, its
// lifecycle state and the last snapshot it produced. Every operation takes
// `&mut self`; `GatewaySession` puts the adapter behind a mutex so only
// one call is in flight per gateway.

mod cloud;
mod lifecycle;
mod local;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use strum::Display;

use salus_api::{CloudTransport, CloudWriter, LocalTransport};

use crate::command::Command;
use crate::config::{CloudConfig, GatewayConfig, GatewaySettings, LocalConfig};
use crate::error::CoreError;
use crate::model::{DeviceId, GatewayKind, Snapshot};

pub use cloud::{CloudGateway, normalize_cloud_payload};
pub use local::{LocalGateway, normalize_local_status};

pub(crate) use lifecycle::Lifecycle;

// ── SessionState ─────────────────────────────────────────────────

/// Adapter lifecycle: `Disconnected → Connected → Closed`. `Closed` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Disconnected,
    Connected,
    Closed,
}

// ── GatewayAdapter ───────────────────────────────────────────────

/// Capability set shared by every gateway variant.
///
/// `poll` and `command` are only valid while `Connected`; anything else
/// fails with [`CoreError::State`]. A variant that has no wiring for an
/// operation fails with [`CoreError::UnsupportedOperation`].
#[async_trait]
pub trait GatewayAdapter: Send + Sync {
    fn kind(&self) -> GatewayKind;

    fn state(&self) -> SessionState;

    /// Last snapshot produced by a successful poll.
    fn last_snapshot(&self) -> Option<Arc<Snapshot>>;

    /// Establish the underlying session. Only valid while `Disconnected`.
    async fn connect(&mut self) -> Result<(), CoreError>;

    /// Fetch and normalize the current state of every device. On failure
    /// the last snapshot is left untouched.
    async fn poll(&mut self) -> Result<Arc<Snapshot>, CoreError>;

    async fn command(&mut self, device_id: &DeviceId, command: &Command) -> Result<(), CoreError>;

    /// Release the transport. Safe from any state, never fails.
    async fn close(&mut self);
}

// ── Construction ─────────────────────────────────────────────────

/// Host-supplied transport clients.
///
/// The core never opens sockets itself: the host builds a client for the
/// gateway described by the config and hands it over here.
pub trait TransportProvider: Send + Sync {
    fn local(&self, config: &LocalConfig) -> Box<dyn LocalTransport>;

    fn cloud(&self, config: &CloudConfig) -> Box<dyn CloudTransport>;

    /// Write path for cloud thermostats. Without one, the cloud adapter
    /// rejects climate writes as unsupported.
    fn cloud_writer(&self, _config: &CloudConfig) -> Option<Box<dyn CloudWriter>> {
        None
    }
}

/// Build the adapter variant selected by `config`.
pub fn create_gateway(
    config: &GatewayConfig,
    transports: &dyn TransportProvider,
) -> Box<dyn GatewayAdapter> {
    match &config.gateway {
        GatewaySettings::Local(local) => Box::new(LocalGateway::new(
            local.clone(),
            config.timeout,
            transports.local(local),
        )),
        GatewaySettings::Cloud(cloud) => {
            let gateway =
                CloudGateway::new(cloud.clone(), config.timeout, transports.cloud(cloud));
            match transports.cloud_writer(cloud) {
                Some(writer) => Box::new(gateway.with_writer(writer)),
                None => Box::new(gateway),
            }
        }
    }
}

/// Run a transport call, turning an overrun into `Error::Timeout`.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, salus_api::Error>> + Send,
) -> Result<T, salus_api::Error> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(salus_api::Error::Timeout {
            timeout_secs: limit.as_secs(),
        }))
}
