//! Configuration module for the exporter.
//!
//! Flags select the YAML file; environment variables override single keys.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use clap::Parser;
use config::{File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "steam-exporter.yml";
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9791";
pub const DEFAULT_DATA_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can not read configuration file: {0}")]
    Load(#[from] config::ConfigError),
    #[error("no servers configured")]
    NoTargetsConfigured,
    #[error("invalid timeout {0:?}")]
    InvalidTimeout(String),
}

/// Command line flags.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Prometheus exporter for Steam game servers")]
pub struct Args {
    /// Path to configuration file.
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,
    /// Show debugging output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One game server to query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub address: String,
}

/// Exporter configuration read from the YAML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server listens on; `:port` binds all interfaces.
    #[serde(rename = "listenAddress", alias = "listenaddress", default = "default_listen_address")]
    pub listen_address: String,
    /// How long to wait for each server to answer.
    #[serde(
        rename = "dataTimeout",
        alias = "datatimeout",
        default = "default_data_timeout",
        deserialize_with = "deserialize_timeout"
    )]
    pub data_timeout: Duration,
    #[serde(default)]
    pub servers: Vec<Target>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            data_timeout: DEFAULT_DATA_TIMEOUT,
            servers: Vec::new(),
        }
    }
}

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

fn default_data_timeout() -> Duration {
    DEFAULT_DATA_TIMEOUT
}

impl Config {
    /// Load and validate the configuration file.
    ///
    /// Environment variables:
    /// - `STEAM_EXPORTER_LISTEN_ADDRESS`: overrides `listenAddress`
    /// - `STEAM_EXPORTER_DATA_TIMEOUT`: overrides `dataTimeout`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .build()?;

        let mut cfg: Self = source.try_deserialize()?;

        if let Ok(addr) = env::var("STEAM_EXPORTER_LISTEN_ADDRESS") {
            cfg.listen_address = addr;
        }

        if let Ok(timeout) = env::var("STEAM_EXPORTER_DATA_TIMEOUT") {
            cfg.data_timeout = parse_duration(&timeout)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::NoTargetsConfigured);
        }
        if self.data_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!("{:?}", self.data_timeout)));
        }
        Ok(())
    }

    /// Listen address with a bare `:port` expanded to all interfaces.
    pub fn bind_address(&self) -> String {
        if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        }
    }
}

/// Parse a duration such as `500ms`, `1s`, `1.5s`, `2m`, `1h` or bare seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    static DURATION_RE: OnceLock<Regex> = OnceLock::new();
    let re = DURATION_RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?)\s*(ns|us|µs|ms|s|m|h)?$").expect("valid duration regex")
    });

    let invalid = || ConfigError::InvalidTimeout(s.to_string());
    let caps = re.captures(s.trim()).ok_or_else(invalid)?;
    let value: f64 = caps[1].parse().map_err(|_| invalid())?;

    let seconds = match caps.get(2).map(|m| m.as_str()) {
        Some("ns") => value / 1e9,
        Some("us") | Some("µs") => value / 1e6,
        Some("ms") => value / 1e3,
        Some("m") => value * 60.0,
        Some("h") => value * 3600.0,
        _ => value,
    };

    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(f64),
    Text(String),
}

fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Duration::try_from_secs_f64(secs)
            .map_err(|_| serde::de::Error::custom(format!("invalid timeout {}", secs))),
        RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
