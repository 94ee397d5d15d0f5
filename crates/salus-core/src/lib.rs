// salus-core: Device status normalization and command dispatch between
// salus-api transports and a home-automation host.

pub mod cache;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod model;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CachedSnapshot, PollingCache};
pub use command::{Command, CommandRequest, Operation};
pub use config::{
    CloudConfig, DEFAULT_EUID, DEFAULT_SCAN_INTERVAL, DEFAULT_TIMEOUT, GatewayConfig,
    GatewaySettings, LocalConfig,
};
pub use dispatch::{CommandDispatcher, PendingRefresh};
pub use entry::{DOMAIN, GatewayEntry, GatewayRegistry};
pub use error::{ConnectCause, CoreError};
pub use gateway::{
    CloudGateway, GatewayAdapter, LocalGateway, SessionState, TransportProvider, create_gateway,
};
pub use session::GatewaySession;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AttributeValue, Attributes, Category, DEFAULT_PRESET, DeviceId, DeviceStatus, GatewayKind,
    HvacAction, HvacMode, PRESET_MODES, Snapshot, SnapshotBuilder,
};
