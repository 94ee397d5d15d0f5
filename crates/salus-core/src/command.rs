// ── Command API ──
//
// All write operations flow through a unified `Command` enum. Each variant
// carries its own argument, so an adapter never sees a half-parsed
// request. Generic requests (operation name + JSON args) are parsed here
// before they reach a gateway.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::CoreError;
use crate::model::{Category, DeviceId, HvacMode};

/// Operation names, independent of their arguments.
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
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    SetTemperature,
    SetMode,
    SetPreset,
    TurnOn,
    TurnOff,
    Open,
    Close,
    Stop,
    SetPosition,
}

impl Operation {
    /// Whether this operation makes sense for devices of `category`.
    pub fn applies_to(self, category: Category) -> bool {
        Self::for_category(category).contains(&self)
    }

    /// Operations a device of `category` accepts.
    pub fn for_category(category: Category) -> &'static [Operation] {
        match category {
            Category::Climate => &[Self::SetTemperature, Self::SetMode, Self::SetPreset],
            Category::Switch => &[Self::TurnOn, Self::TurnOff],
            Category::Cover => &[Self::Open, Self::Close, Self::Stop, Self::SetPosition],
            Category::BinarySensor | Category::Sensor => &[],
        }
    }
}

/// A fully parsed write operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetTemperature { temperature: f64 },
    SetMode { mode: HvacMode },
    SetPreset { preset: String },
    TurnOn,
    TurnOff,
    Open,
    Close,
    Stop,
    SetPosition { position: u8 },
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Self::SetTemperature { .. } => Operation::SetTemperature,
            Self::SetMode { .. } => Operation::SetMode,
            Self::SetPreset { .. } => Operation::SetPreset,
            Self::TurnOn => Operation::TurnOn,
            Self::TurnOff => Operation::TurnOff,
            Self::Open => Operation::Open,
            Self::Close => Operation::Close,
            Self::Stop => Operation::Stop,
            Self::SetPosition { .. } => Operation::SetPosition,
        }
    }

    /// Parse the argument payload for `operation`.
    ///
    /// `args` may be the bare value (`21.5`, `"auto"`) or an object keyed by
    /// the argument name (`{"temperature": 21.5}`). Operations without an
    /// argument ignore `args`.
    pub fn from_parts(operation: Operation, args: &Value) -> Result<Self, CoreError> {
        match operation {
            Operation::SetTemperature => {
                let temperature = argument(args, "temperature")
                    .and_then(Value::as_f64)
                    .filter(|t| t.is_finite())
                    .ok_or_else(|| invalid_argument(operation, "a finite temperature", args))?;
                Ok(Self::SetTemperature { temperature })
            }
            Operation::SetMode => {
                let mode = argument(args, "hvac_mode")
                    .and_then(Value::as_str)
                    .and_then(|m| HvacMode::from_str(m).ok())
                    .ok_or_else(|| invalid_argument(operation, "one of off, heat, auto", args))?;
                Ok(Self::SetMode { mode })
            }
            Operation::SetPreset => {
                let preset = argument(args, "preset_mode")
                    .and_then(Value::as_str)
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| invalid_argument(operation, "a preset name", args))?;
                Ok(Self::SetPreset {
                    preset: preset.to_owned(),
                })
            }
            Operation::SetPosition => {
                let position = argument(args, "position")
                    .and_then(Value::as_u64)
                    .filter(|p| *p <= 100)
                    .and_then(|p| u8::try_from(p).ok())
                    .ok_or_else(|| invalid_argument(operation, "a position from 0 to 100", args))?;
                Ok(Self::SetPosition { position })
            }
            Operation::TurnOn => Ok(Self::TurnOn),
            Operation::TurnOff => Ok(Self::TurnOff),
            Operation::Open => Ok(Self::Open),
            Operation::Close => Ok(Self::Close),
            Operation::Stop => Ok(Self::Stop),
        }
    }
}

/// A command addressed to one device in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub device_id: DeviceId,
    pub category: Category,
    pub command: Command,
}

impl CommandRequest {
    pub fn new(device_id: DeviceId, category: Category, command: Command) -> Self {
        Self {
            device_id,
            category,
            command,
        }
    }
}

fn argument<'a>(args: &'a Value, key: &str) -> Option<&'a Value> {
    match args {
        Value::Object(map) => map.get(key),
        other => Some(other),
    }
}

fn invalid_argument(operation: Operation, expected: &str, got: &Value) -> CoreError {
    CoreError::Validation {
        message: format!("{operation} expects {expected}, got {got}"),
    }
}
