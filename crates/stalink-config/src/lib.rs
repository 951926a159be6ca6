//! Configuration for the stalink daemon.
//!
//! Layered loading (built-in defaults, then a TOML file, then `STALINK_*`
//! environment variables) and translation into
//! `stalink_core::SupplicantConfig`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stalink_core::{DEFAULT_MAX_ANQP_ELEMENTS, SupplicantConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Station interfaces to attach at start.
    #[serde(default)]
    pub interfaces: Vec<String>,

    /// Depth of the command channel feeding the serial processor.
    #[serde(default = "default_command_channel_size")]
    pub command_channel_size: usize,

    /// Upper bound on info ids plus subtypes in one ANQP query.
    #[serde(default = "default_max_anqp_elements")]
    pub max_anqp_elements: usize,

    /// Default log filter when neither `-v` nor `RUST_LOG` says otherwise.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            command_channel_size: default_command_channel_size(),
            max_anqp_elements: default_max_anqp_elements(),
            log_level: default_log_level(),
        }
    }
}

fn default_command_channel_size() -> usize {
    64
}
fn default_max_anqp_elements() -> usize {
    DEFAULT_MAX_ANQP_ELEMENTS
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Validate and convert into the core's runtime configuration.
    pub fn to_supplicant_config(&self) -> Result<SupplicantConfig, ConfigError> {
        let mut seen = HashSet::new();
        for name in &self.interfaces {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: "interfaces".into(),
                    reason: "interface name is empty".into(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Validation {
                    field: "interfaces".into(),
                    reason: format!("'{name}' listed more than once"),
                });
            }
        }
        if self.command_channel_size == 0 {
            return Err(ConfigError::Validation {
                field: "command_channel_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.max_anqp_elements == 0 {
            return Err(ConfigError::Validation {
                field: "max_anqp_elements".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(SupplicantConfig {
            interfaces: self.interfaces.clone(),
            command_channel_size: self.command_channel_size,
            max_anqp_elements: self.max_anqp_elements,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "stalink", "stalink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stalink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path` (or the platform default) plus environment.
/// A missing file is not an error; defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config_from(&config_path()),
    }
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STALINK_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg.command_channel_size, 64);
        assert_eq!(cfg.max_anqp_elements, DEFAULT_MAX_ANQP_ELEMENTS);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "interfaces = [\"wlan0\", \"wlan1\"]\nmax_anqp_elements = 16\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.interfaces, vec!["wlan0".to_owned(), "wlan1".to_owned()]);
        assert_eq!(cfg.max_anqp_elements, 16);
        assert_eq!(cfg.command_channel_size, 64);
    }

    #[test]
    fn malformed_file_is_a_figment_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "interfaces = \"wlan0\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            interfaces: vec!["wlan0".into()],
            log_level: "debug".into(),
            ..Config::default()
        };
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn translation_validates_interfaces() {
        let dup = Config {
            interfaces: vec!["wlan0".into(), "wlan0".into()],
            ..Config::default()
        };
        assert!(matches!(
            dup.to_supplicant_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "interfaces"
        ));

        let blank = Config {
            interfaces: vec![" ".into()],
            ..Config::default()
        };
        assert!(blank.to_supplicant_config().is_err());
    }

    #[test]
    fn translation_rejects_zero_sizes() {
        let cfg = Config {
            command_channel_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_supplicant_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "command_channel_size"
        ));
    }

    #[test]
    fn translation_carries_values() {
        let cfg = Config {
            interfaces: vec!["wlan0".into()],
            command_channel_size: 8,
            max_anqp_elements: 12,
            log_level: "warn".into(),
        };
        let sup = cfg.to_supplicant_config().unwrap();
        assert_eq!(
            sup,
            SupplicantConfig {
                interfaces: vec!["wlan0".into()],
                command_channel_size: 8,
                max_anqp_elements: 12,
            }
        );
    }
}
