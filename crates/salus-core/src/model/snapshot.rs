// ── Point-in-time device snapshot ──
//
// A snapshot is produced whole by one poll cycle and never mutated
// afterwards. All five categories are always present; a gateway that
// cannot report a category leaves its map empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::catalog;
use super::common::{Category, GatewayKind};
use super::device::{DeviceId, DeviceStatus};
use crate::error::CoreError;

static EMPTY: BTreeMap<DeviceId, DeviceStatus> = BTreeMap::new();

/// Immutable view of every device category as of one poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    gateway: GatewayKind,
    taken_at: DateTime<Utc>,
    devices: BTreeMap<Category, BTreeMap<DeviceId, DeviceStatus>>,
}

impl Snapshot {
    pub fn builder(gateway: GatewayKind) -> SnapshotBuilder {
        SnapshotBuilder {
            gateway,
            devices: Category::iter().map(|c| (c, BTreeMap::new())).collect(),
        }
    }

    /// Snapshot with all categories present and empty.
    pub fn empty(gateway: GatewayKind) -> Self {
        Self::builder(gateway).build()
    }

    pub fn gateway(&self) -> GatewayKind {
        self.gateway
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Devices of one category, keyed by id.
    pub fn devices(&self, category: Category) -> &BTreeMap<DeviceId, DeviceStatus> {
        self.devices.get(&category).unwrap_or(&EMPTY)
    }

    pub fn device(&self, category: Category, id: &str) -> Option<&DeviceStatus> {
        self.devices(category).get(id)
    }

    pub fn contains(&self, category: Category, id: &str) -> bool {
        self.devices(category).contains_key(id)
    }

    /// Total number of devices across all categories.
    pub fn device_count(&self) -> usize {
        self.devices.values().map(BTreeMap::len).sum()
    }

    /// Friendly entity name, e.g. `"Salus VS10 White Thermostat 001e5e"`.
    pub fn display_name(&self, category: Category, id: &str) -> Option<String> {
        let status = self.device(category, id)?;
        Some(catalog::display_name(
            self.gateway,
            category,
            status.model.as_deref(),
            status.id(),
        ))
    }
}

/// Collects devices for a snapshot, rejecting duplicate ids per category.
#[derive(Debug)]
pub struct SnapshotBuilder {
    gateway: GatewayKind,
    devices: BTreeMap<Category, BTreeMap<DeviceId, DeviceStatus>>,
}

impl SnapshotBuilder {
    pub fn insert(&mut self, status: DeviceStatus) -> Result<(), CoreError> {
        let category = status.category();
        let bucket = self.devices.entry(category).or_default();
        if bucket.contains_key(status.id()) {
            return Err(CoreError::Validation {
                message: format!("duplicate {category} device id '{}'", status.id()),
            });
        }
        bucket.insert(status.id().clone(), status);
        Ok(())
    }

    pub fn with(mut self, status: DeviceStatus) -> Result<Self, CoreError> {
        self.insert(status)?;
        Ok(self)
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            gateway: self.gateway,
            taken_at: Utc::now(),
            devices: self.devices,
        }
    }
}
