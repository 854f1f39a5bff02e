//! Bootstrap configuration loading
//!
//! Configuration is fixed at process start. Each field resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; it is logged and the
//! remaining tiers apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Default relay base for the low-latency (WebRTC/WHEP) delivery mode
pub const DEFAULT_PRIMARY_BASE: &str = "http://localhost:8889";

/// Default relay base for the segment-based (HLS) delivery mode
pub const DEFAULT_FALLBACK_BASE: &str = "http://localhost:8888";

/// Default delay before an automatic recovery attempt after both modes failed
pub const DEFAULT_RECOVERY_DELAY_SECS: u64 = 30;

/// Default HTTP port for camview-player
pub const DEFAULT_PORT: u16 = 5730;

pub const ENV_PRIMARY_BASE: &str = "CAMVIEW_PRIMARY_BASE";
pub const ENV_FALLBACK_BASE: &str = "CAMVIEW_FALLBACK_BASE";
pub const ENV_RECOVERY_DELAY_SECS: &str = "CAMVIEW_RECOVERY_DELAY_SECS";
pub const ENV_PORT: &str = "CAMVIEW_PORT";

/// Configuration as written in `config.toml`
///
/// Every field is optional; absent fields fall through to compiled defaults.
///
/// ```toml
/// port = 5730
///
/// [relay]
/// primary_base = "http://relay:8889"
/// fallback_base = "http://relay:8888"
/// recovery_delay_secs = 30
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Relay addresses and recovery timing
    #[serde(default)]
    pub relay: RelayToml,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[relay]` table
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RelayToml {
    pub primary_base: Option<String>,
    pub fallback_base: Option<String>,
    pub recovery_delay_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub primary_base: Option<String>,
    pub fallback_base: Option<String>,
    pub recovery_delay_secs: Option<u64>,
    /// Explicit config file path
    pub config_file: Option<PathBuf>,
}

/// Fully resolved configuration for camview-player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub port: u16,
    pub primary_base: String,
    pub fallback_base: String,
    pub recovery_delay: Duration,
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            primary_base: DEFAULT_PRIMARY_BASE.to_string(),
            fallback_base: DEFAULT_FALLBACK_BASE.to_string(),
            recovery_delay: Duration::from_secs(DEFAULT_RECOVERY_DELAY_SECS),
            log_level: default_log_level(),
        }
    }
}

impl PlayerConfig {
    /// Resolve configuration from CLI, environment, TOML file and defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let toml_config = match cli.config_file.clone().or_else(default_config_path) {
            Some(path) => load_toml_or_default(&path)?,
            None => {
                info!("No config file found, using defaults");
                TomlConfig::default()
            }
        };
        Self::resolve_with(cli, &toml_config)
    }

    /// Resolve against an already loaded TOML config
    pub fn resolve_with(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let port = match cli.port {
            Some(port) => port,
            None => match env_parsed::<u16>(ENV_PORT)? {
                Some(port) => port,
                None => toml_config.port.unwrap_or(defaults.port),
            },
        };

        let primary_base = cli
            .primary_base
            .clone()
            .or_else(|| env_string(ENV_PRIMARY_BASE))
            .or_else(|| toml_config.relay.primary_base.clone())
            .unwrap_or(defaults.primary_base);

        let fallback_base = cli
            .fallback_base
            .clone()
            .or_else(|| env_string(ENV_FALLBACK_BASE))
            .or_else(|| toml_config.relay.fallback_base.clone())
            .unwrap_or(defaults.fallback_base);

        let recovery_delay_secs = match cli.recovery_delay_secs {
            Some(secs) => secs,
            None => match env_parsed::<u64>(ENV_RECOVERY_DELAY_SECS)? {
                Some(secs) => secs,
                None => toml_config
                    .relay
                    .recovery_delay_secs
                    .unwrap_or(DEFAULT_RECOVERY_DELAY_SECS),
            },
        };

        let config = Self {
            port,
            primary_base,
            fallback_base,
            recovery_delay: Duration::from_secs(recovery_delay_secs),
            log_level: toml_config.logging.level.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check relay addresses and recovery delay
    pub fn validate(&self) -> Result<()> {
        validate_base("primary_base", &self.primary_base)?;
        validate_base("fallback_base", &self.fallback_base)?;
        if self.recovery_delay.is_zero() {
            return Err(Error::Config(
                "recovery_delay_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_base(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("{} '{}' is not a valid URL: {}", field, value, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(format!(
            "{} '{}' must be an absolute http(s) address",
            field, value
        )));
    }
    Ok(())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_string(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{}='{}' is not a valid value", name, raw))),
        None => Ok(None),
    }
}

fn load_toml_or_default(path: &Path) -> Result<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            info!("Loading config file: {}", path.display());
            TomlConfig::parse(&content)
        }
        Err(e) => {
            warn!(
                "Config file {} could not be read ({}), using defaults",
                path.display(),
                e
            );
            Ok(TomlConfig::default())
        }
    }
}

/// Locate the default configuration file for the platform
///
/// Linux checks `~/.config/camview/config.toml` then `/etc/camview/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("camview").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/camview/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
