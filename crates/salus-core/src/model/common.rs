// ── Shared enums ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The five device kinds a gateway can report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Climate,
    BinarySensor,
    Sensor,
    Switch,
    Cover,
}

/// Which vendor ecosystem a gateway belongs to.
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
pub enum GatewayKind {
    /// IT600 gateway on the local network.
    #[serde(rename = "it600")]
    #[strum(serialize = "it600")]
    Local,
    /// IT500 cloud service.
    #[serde(rename = "it500")]
    #[strum(serialize = "it500")]
    Cloud,
}
