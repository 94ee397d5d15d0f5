//! Transport contracts for Salus heating gateways.
//!
//! Two ecosystems are covered:
//!
//! - **[`LocalTransport`]**: the IT600 gateway on the LAN, addressed by host
//!   and EUID. Devices arrive pre-grouped by category ([`LocalStatus`]).
//! - **[`CloudTransport`]** / **[`CloudWriter`]**: the IT500 cloud service,
//!   addressed by account credentials and a numeric device id. Status is a
//!   flat JSON field set (see the `FIELD_*` constants in [`cloud`]).
//!
//! No wire protocol lives here. Hosts implement these traits on top of
//! their vendor clients and hand them to `salus-core`.

pub mod cloud;
pub mod error;
pub mod local;

pub use cloud::{CloudTransport, CloudWriter};
pub use error::Error;
pub use local::{
    LocalBinarySensor, LocalClimateDevice, LocalCover, LocalSensor, LocalStatus, LocalSwitch,
    LocalTransport,
};
