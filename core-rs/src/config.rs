//! Engine configuration
//!
//! YAML format (all keys optional):
//! ```yaml
//! enabled: true
//! catchPanics: true
//! logViolations: true
//! ```
//!
//! Environment overrides: `DBC_CONTRACTS`, `DBC_CONTRACTS_CATCH_PANICS`,
//! `DBC_CONTRACTS_LOG` (`on`/`off`, `true`/`false`, `1`/`0`).
//!
//! The configuration is process-wide. Install it once at startup with
//! [`ContractConfig::install`]; until then [`current`] falls back to the
//! environment.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;

static CONTRACT_CONFIG: OnceCell<ContractConfig> = OnceCell::new();

pub const ENV_ENABLED: &str = "DBC_CONTRACTS";
pub const ENV_CATCH_PANICS: &str = "DBC_CONTRACTS_CATCH_PANICS";
pub const ENV_LOG_VIOLATIONS: &str = "DBC_CONTRACTS_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractConfig {
    /// When false every check is a no-op; scopes are still tracked
    pub enabled: bool,
    /// Turn panics inside condition bodies into `NotVerifiable`
    pub catch_panics: bool,
    /// Emit a `warn!` event for every failed check
    pub log_violations: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            catch_panics: true,
            log_violations: true,
        }
    }
}

impl ContractConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Defaults overridden by the `DBC_CONTRACTS*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENABLED) {
            config.enabled = parse_switch(ENV_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_CATCH_PANICS) {
            config.catch_panics = parse_switch(ENV_CATCH_PANICS, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_VIOLATIONS) {
            config.log_violations = parse_switch(ENV_LOG_VIOLATIONS, &value)?;
        }

        Ok(config)
    }

    /// Make this the process-wide configuration. Fails if one is already in use.
    pub fn install(self) -> Result<(), ConfigError> {
        CONTRACT_CONFIG
            .set(self)
            .map_err(|_| ConfigError::AlreadyInstalled)
    }
}

/// The configuration checks run under.
///
/// First use without a prior [`ContractConfig::install`] fixes the
/// environment-derived configuration; malformed variables fall back to the
/// defaults.
pub fn current() -> &'static ContractConfig {
    CONTRACT_CONFIG.get_or_init(|| from_lookup_or_default(|key| std::env::var(key).ok()))
}

fn from_lookup_or_default<F>(lookup: F) -> ContractConfig
where
    F: Fn(&str) -> Option<String>,
{
    ContractConfig::from_lookup(lookup).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring contract configuration from environment");
        ContractConfig::default()
    })
}

fn parse_switch(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
