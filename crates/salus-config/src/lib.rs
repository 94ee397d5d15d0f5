//! Gateway entry configuration for Salus integrations.
//!
//! TOML entries (one per gateway), a `SALUS_` environment overlay,
//! password resolution (env var, then plaintext), and translation to
//! `salus_core::GatewayConfig` with the same checks the setup form applies.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use salus_core::{DEFAULT_EUID, GatewayConfig, GatewayKind};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for gateway '{gateway}'")]
    NoCredentials { gateway: String },

    #[error("no gateway named '{name}' in config")]
    UnknownGateway { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway entries.
    #[serde(default)]
    pub gateways: HashMap<String, GatewayProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Host refresh interval in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    salus_core::DEFAULT_TIMEOUT.as_secs()
}
fn default_scan_interval() -> u64 {
    salus_core::DEFAULT_SCAN_INTERVAL.as_secs()
}

/// One configured gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayProfile {
    /// `"it600"` (local) or `"it500"` (cloud).
    pub gateway_type: GatewayKind,

    /// Local gateway address.
    pub host: Option<String>,

    /// Local gateway EUID, printed under the unit.
    pub euid: Option<String>,

    /// Cloud account login.
    pub username: Option<String>,

    /// Cloud password (plaintext -- prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the cloud password.
    pub password_env: Option<String>,

    /// Cloud thermostat id (`devId` in the portal URL).
    pub device_id: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override scan interval.
    pub scan_interval: Option<u64>,
}

impl Config {
    /// Build the runtime config for one named entry.
    pub fn gateway(&self, name: &str) -> Result<GatewayConfig, ConfigError> {
        let profile = self
            .gateways
            .get(name)
            .ok_or_else(|| ConfigError::UnknownGateway { name: name.into() })?;
        profile_to_gateway_config(profile, name, &self.defaults)
    }

    /// Runtime configs for every entry, by name. Stops at the first
    /// invalid entry.
    pub fn gateway_configs(&self) -> Result<BTreeMap<String, GatewayConfig>, ConfigError> {
        self.gateways
            .iter()
            .map(|(name, profile)| {
                profile_to_gateway_config(profile, name, &self.defaults)
                    .map(|config| (name.clone(), config))
            })
            .collect()
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "salus", "salus-gateway").map_or_else(
        || PathBuf::from(".").join("salus-gateway.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, overlaid with `SALUS_` variables
/// (e.g. `SALUS_GATEWAYS__HOME__HOST`). A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SALUS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the cloud password: `password_env` first, then plaintext.
pub fn resolve_password(profile: &GatewayProfile, name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, name, |var| std::env::var(var).ok())
}

/// [`resolve_password`] with a caller-supplied environment lookup.
pub fn resolve_password_with(
    profile: &GatewayProfile,
    name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let from_env = profile.password_env.as_deref().and_then(lookup);
    from_env
        .or_else(|| profile.password.clone())
        .filter(|pw| !pw.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            gateway: name.into(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate an entry and build its `GatewayConfig`.
///
/// Local entries need a host; a blank EUID falls back to the factory
/// default. Cloud entries need a username, a password and an all-digit
/// device id.
pub fn profile_to_gateway_config(
    profile: &GatewayProfile,
    name: &str,
    defaults: &Defaults,
) -> Result<GatewayConfig, ConfigError> {
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    if timeout.is_zero() {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }
    let scan_interval =
        Duration::from_secs(profile.scan_interval.unwrap_or(defaults.scan_interval));
    if scan_interval.is_zero() {
        return Err(ConfigError::Validation {
            field: "scan_interval".into(),
            reason: "must be at least one second".into(),
        });
    }

    let config = match profile.gateway_type {
        GatewayKind::Local => {
            let host = non_blank(profile.host.as_deref()).ok_or_else(|| {
                ConfigError::Validation {
                    field: "host".into(),
                    reason: format!("required for it600 gateway '{name}'"),
                }
            })?;
            let euid = non_blank(profile.euid.as_deref()).unwrap_or(DEFAULT_EUID);
            GatewayConfig::local(host, euid)
        }
        GatewayKind::Cloud => {
            let username = non_blank(profile.username.as_deref()).ok_or_else(|| {
                ConfigError::NoCredentials {
                    gateway: name.into(),
                }
            })?;
            let password = resolve_password(profile, name)?;
            let device_id = non_blank(profile.device_id.as_deref()).unwrap_or_default();
            if device_id.is_empty() || !device_id.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Validation {
                    field: "device_id".into(),
                    reason: format!("expected digits only, got '{device_id}'"),
                });
            }
            GatewayConfig::cloud(username, password, device_id)
        }
    };

    Ok(config
        .with_timeout(timeout)
        .with_scan_interval(scan_interval))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use salus_core::GatewaySettings;

    use super::*;

    const SAMPLE: &str = r#"
[defaults]
timeout = 5

[gateways.house]
gateway_type = "it600"
host = "10.0.0.5"
euid = "ABC123"

[gateways.cottage]
gateway_type = "it500"
username = " me@example.com "
password = "hunter2"
device_id = "12345"
scan_interval = 60
"#;

    fn cloud_profile(device_id: &str) -> GatewayProfile {
        GatewayProfile {
            gateway_type: GatewayKind::Cloud,
            host: None,
            euid: None,
            username: Some("me@example.com".into()),
            password: Some("hunter2".into()),
            password_env: None,
            device_id: Some(device_id.into()),
            timeout: None,
            scan_interval: None,
        }
    }

    fn local_profile(host: Option<&str>, euid: Option<&str>) -> GatewayProfile {
        GatewayProfile {
            gateway_type: GatewayKind::Local,
            host: host.map(Into::into),
            euid: euid.map(Into::into),
            username: None,
            password: None,
            password_env: None,
            device_id: None,
            timeout: None,
            scan_interval: None,
        }
    }

    #[test]
    fn loads_entries_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).expect("write config");

        let config = load_config_from(&path).expect("valid config");
        assert_eq!(config.defaults.timeout, 5);
        assert_eq!(config.defaults.scan_interval, 30);

        let house = config.gateway("house").expect("house entry");
        assert_eq!(house.unique_id(), "it600_ABC123");
        assert_eq!(house.timeout, Duration::from_secs(5));

        let cottage = config.gateway("cottage").expect("cottage entry");
        assert_eq!(cottage.unique_id(), "it500_12345");
        assert_eq!(cottage.scan_interval, Duration::from_secs(60));
        let GatewaySettings::Cloud(cloud) = &cottage.gateway else {
            panic!("expected a cloud entry");
        };
        assert_eq!(cloud.username, "me@example.com");
        assert_eq!(cloud.password.expose_secret(), "hunter2");

        let all = config.gateway_configs().expect("all valid");
        assert_eq!(all.keys().collect::<Vec<_>>(), ["cottage", "house"]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("absent.toml")).expect("defaults");
        assert!(config.gateways.is_empty());
        assert_eq!(config.defaults.timeout, 10);
        assert!(matches!(
            config.gateway("house"),
            Err(ConfigError::UnknownGateway { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config
            .gateways
            .insert("house".into(), local_profile(Some("10.0.0.5"), None));
        save_config_to(&path, &config).expect("save");

        let loaded = load_config_from(&path).expect("load");
        let house = loaded.gateway("house").expect("house entry");
        assert_eq!(house.identifier(), DEFAULT_EUID);
    }

    #[test]
    fn local_entries_need_a_host() {
        let defaults = Defaults::default();
        let result = profile_to_gateway_config(&local_profile(Some("  "), None), "house", &defaults);
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "host"
        ));

        let config =
            profile_to_gateway_config(&local_profile(Some("10.0.0.5"), Some("")), "house", &defaults)
                .expect("valid entry");
        assert_eq!(config.identifier(), DEFAULT_EUID);
    }

    #[test]
    fn cloud_device_id_must_be_numeric() {
        let defaults = Defaults::default();
        for device_id in ["", "12a45", "-1"] {
            let result = profile_to_gateway_config(&cloud_profile(device_id), "cottage", &defaults);
            assert!(
                matches!(result, Err(ConfigError::Validation { ref field, .. }) if field == "device_id"),
                "{device_id:?} accepted"
            );
        }
    }

    #[test]
    fn cloud_entries_need_credentials() {
        let defaults = Defaults::default();

        let mut profile = cloud_profile("12345");
        profile.username = None;
        assert!(matches!(
            profile_to_gateway_config(&profile, "cottage", &defaults),
            Err(ConfigError::NoCredentials { .. })
        ));

        let mut profile = cloud_profile("12345");
        profile.password = Some(String::new());
        assert!(matches!(
            profile_to_gateway_config(&profile, "cottage", &defaults),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn password_env_takes_precedence() {
        let mut profile = cloud_profile("12345");
        profile.password_env = Some("COTTAGE_PASSWORD".into());

        let password = resolve_password_with(&profile, "cottage", |var| {
            (var == "COTTAGE_PASSWORD").then(|| "from-env".to_string())
        })
        .expect("resolved");
        assert_eq!(password.expose_secret(), "from-env");

        let password =
            resolve_password_with(&profile, "cottage", |_| None).expect("falls back to plaintext");
        assert_eq!(password.expose_secret(), "hunter2");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut profile = cloud_profile("12345");
        profile.timeout = Some(0);
        assert!(matches!(
            profile_to_gateway_config(&profile, "cottage", &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "timeout"
        ));
    }
}
