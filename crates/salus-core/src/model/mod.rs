// ── Domain model ──
//
// Canonical, vendor-independent device types shared by both gateways.

pub mod catalog;
pub mod common;
pub mod device;
pub mod snapshot;

pub use common::{Category, GatewayKind};
pub use device::{
    AttributeValue, Attributes, DEFAULT_PRESET, DeviceId, DeviceStatus, HvacAction, HvacMode,
    PRESET_MODES,
};
pub use snapshot::{Snapshot, SnapshotBuilder};
