// ── Known Salus models ──
//
// Maps vendor model codes to friendly names per gateway and category.
// Unknown models fall back to a generic name.

use super::common::{Category, GatewayKind};
use super::device::DeviceId;

type ModelTable = &'static [(&'static str, &'static str)];

const IT600_CLIMATE: ModelTable = &[
    ("HTRP-RF", "Salus HTRP-RF Thermostat"),
    ("HTRP-RF50", "Salus HTRP-RF50 Thermostat"),
    ("TS600", "Salus TS600 Thermostat"),
    ("VS10WRF", "Salus VS10 White Thermostat"),
    ("VS10BRF", "Salus VS10 Black Thermostat"),
    ("VS20WRF", "Salus VS20 White Thermostat"),
    ("VS20BRF", "Salus VS20 Black Thermostat"),
    ("SQ610", "Salus SQ610 Thermostat"),
    ("SQ610RF", "Salus SQ610RF Thermostat"),
    ("FC600", "Salus FC600 Fan Coil Thermostat"),
];

const IT600_BINARY_SENSOR: ModelTable = &[
    ("SW600", "Salus SW600 Window Sensor"),
    ("WLS600", "Salus WLS600 Water Leak Sensor"),
    ("OS600", "Salus OS600 Occupancy Sensor"),
    ("SD600", "Salus SD600 Smoke Detector"),
    ("TRV10RFM", "Salus TRV10RFM Radiator Valve"),
    ("RX10RF", "Salus RX10RF Receiver"),
    ("MS600", "Salus MS600 Motion Sensor"),
];

const IT600_SENSOR: ModelTable = &[("PS600", "Salus PS600 Temperature Sensor")];

const IT600_SWITCH: ModelTable = &[
    ("SPE600", "Salus SPE600 Smart Plug"),
    ("RS600", "Salus RS600 Relay Switch"),
    ("SR600", "Salus SR600 Switching Receiver"),
    ("SP600", "Salus SP600 Smart Plug"),
];

const IT600_COVER: ModelTable = &[("RS600", "Salus RS600 Shutter Controller")];

const IT500_CLIMATE: ModelTable = &[
    ("IT500", "Salus IT500 Thermostat"),
    ("RT310i", "Salus RT310i Thermostat"),
    ("RT310", "Salus RT310 Thermostat"),
    ("RT510", "Salus RT510 Thermostat"),
    ("RT520", "Salus RT520 Thermostat"),
    ("XT500", "Salus XT500 Thermostat"),
];

fn table(gateway: GatewayKind, category: Category) -> ModelTable {
    match (gateway, category) {
        (GatewayKind::Local, Category::Climate) => IT600_CLIMATE,
        (GatewayKind::Local, Category::BinarySensor) => IT600_BINARY_SENSOR,
        (GatewayKind::Local, Category::Sensor) => IT600_SENSOR,
        (GatewayKind::Local, Category::Switch) => IT600_SWITCH,
        (GatewayKind::Local, Category::Cover) => IT600_COVER,
        (GatewayKind::Cloud, Category::Climate) => IT500_CLIMATE,
        (GatewayKind::Cloud, _) => &[],
    }
}

/// Friendly name for a model code, if the model is known.
pub fn model_name(gateway: GatewayKind, category: Category, model: &str) -> Option<&'static str> {
    table(gateway, category)
        .iter()
        .find(|(code, _)| *code == model)
        .map(|(_, name)| *name)
}

/// Entity name: the model's friendly name followed by the device id.
pub fn display_name(
    gateway: GatewayKind,
    category: Category,
    model: Option<&str>,
    id: &DeviceId,
) -> String {
    let base = model
        .and_then(|m| model_name(gateway, category, m))
        .unwrap_or(match category {
            Category::Climate => "Salus Thermostat",
            _ => "Salus Device",
        });
    format!("{base} {id}")
}
