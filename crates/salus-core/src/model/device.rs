// ── Device domain types ──

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::common::Category;
use crate::error::CoreError;

/// Preset names understood by the climate entities.
pub const PRESET_MODES: [&str; 4] = ["home", "away", "sleep", "manual"];

/// Preset reported when the gateway does not name one.
pub const DEFAULT_PRESET: &str = "manual";

// ── DeviceId ────────────────────────────────────────────────────────

/// Gateway-scoped device identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "device id must not be empty".into(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ── Climate enums ───────────────────────────────────────────────────

/// Operating mode of a thermostat.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Auto,
}

/// What the thermostat is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HvacAction {
    Heating,
    Idle,
    Off,
}

// ── Attributes ──────────────────────────────────────────────────────

/// A single attribute value, as handed out by name-based lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Mode(HvacMode),
}

/// Normalized device attributes. `None` means "unknown", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hvac_mode: Option<HvacMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_heating: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_mode: Option<String>,
    /// Battery charge in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    /// Sensor reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Cover position, 0 (closed) through 100 (open).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
}

impl Attributes {
    /// Every attribute name, in display order.
    pub const NAMES: [&'static str; 13] = [
        "current_temperature",
        "target_temperature",
        "hvac_mode",
        "is_heating",
        "preset_mode",
        "battery",
        "humidity",
        "window_open",
        "is_on",
        "value",
        "unit",
        "position",
        "is_closed",
    ];

    /// Look an attribute up by name. Unknown names and unknown values both
    /// yield `None`.
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        match name {
            "current_temperature" => self.current_temperature.map(AttributeValue::Float),
            "target_temperature" => self.target_temperature.map(AttributeValue::Float),
            "hvac_mode" => self.hvac_mode.map(AttributeValue::Mode),
            "is_heating" => self.is_heating.map(AttributeValue::Bool),
            "preset_mode" => self.preset_mode.clone().map(AttributeValue::Text),
            "battery" => self.battery.map(|b| AttributeValue::Int(i64::from(b))),
            "humidity" => self.humidity.map(AttributeValue::Float),
            "window_open" => self.window_open.map(AttributeValue::Bool),
            "is_on" => self.is_on.map(AttributeValue::Bool),
            "value" => self.value.map(AttributeValue::Float),
            "unit" => self.unit.clone().map(AttributeValue::Text),
            "position" => self.position.map(|p| AttributeValue::Int(i64::from(p))),
            "is_closed" => self.is_closed.map(AttributeValue::Bool),
            _ => None,
        }
    }

    /// All known attributes as `(name, value)` pairs.
    pub fn known(&self) -> Vec<(&'static str, AttributeValue)> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
            .collect()
    }
}

// ── DeviceStatus ────────────────────────────────────────────────────

/// Vendor-independent state of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    id: DeviceId,
    category: Category,
    pub model: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl DeviceStatus {
    pub fn new(id: impl Into<String>, category: Category) -> Result<Self, CoreError> {
        Ok(Self {
            id: DeviceId::new(id)?,
            category,
            model: None,
            name: None,
            attributes: Attributes::default(),
        })
    }

    /// Build from untyped identity fields, rejecting unknown categories.
    pub fn parse(id: &str, category: &str) -> Result<Self, CoreError> {
        let category = Category::from_str(category).map_err(|_| CoreError::Validation {
            message: format!("unrecognized device category '{category}'"),
        })?;
        Self::new(id, category)
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Current activity of a climate device; `None` for other categories.
    ///
    /// An unknown mode reads as off.
    pub fn hvac_action(&self) -> Option<HvacAction> {
        if self.category != Category::Climate {
            return None;
        }
        if self.attributes.is_heating == Some(true) {
            return Some(HvacAction::Heating);
        }
        match self.attributes.hvac_mode {
            None | Some(HvacMode::Off) => Some(HvacAction::Off),
            Some(_) => Some(HvacAction::Idle),
        }
    }

    /// Battery, humidity and window state, present only when known.
    pub fn extra_state_attributes(&self) -> BTreeMap<&'static str, AttributeValue> {
        ["battery", "humidity", "window_open"]
            .into_iter()
            .filter_map(|name| self.attributes.get(name).map(|value| (name, value)))
            .collect()
    }
}
