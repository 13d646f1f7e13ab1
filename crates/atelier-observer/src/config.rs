//! Typed configuration for the observer binary.
//!
//! The canonical configuration lives in `atelier-config.yaml` next to the
//! binary. Every section is optional; a missing file yields the defaults.
//! `ATELIER_HOST` and `ATELIER_PORT` override the server section from the
//! environment for containerized deployments.

use std::path::Path;

use atelier_types::SimParams;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// An environment override carried an unusable value.
    #[error("invalid environment override {name}: {reason}")]
    Env {
        /// The offending variable.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level configuration for the observer binary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Network settings.
    pub server: ServerSection,
    /// Continuous-mode driver settings.
    pub driver: DriverSection,
    /// Parameters for the run started at boot, so the service has a
    /// frame to serve before any explicit `init`.
    pub defaults: SimParams,
}

/// The `server` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// The host address to bind to.
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
        }
    }
}

/// The `driver` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverSection {
    /// Delay between continuous-mode ticks, in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
        }
    }
}

impl ObserverConfig {
    /// Load configuration from a YAML file, falling back to defaults
    /// when the file does not exist, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file cannot be read or
    /// parsed, or an environment override is unusable.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_yml::from_str(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `ATELIER_HOST` / `ATELIER_PORT` overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("ATELIER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("ATELIER_PORT") {
            self.server.port = port.parse().map_err(|e| ConfigError::Env {
                name: String::from("ATELIER_PORT"),
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: ObserverConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, ObserverConfig::default());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.driver.tick_interval_ms, 200);
        assert_eq!(config.defaults, SimParams::default());
    }

    #[test]
    fn partial_yaml_overrides_selected_fields() {
        let yaml = r"
server:
  port: 9001
defaults:
  num_artists: 50
  seed: 7
";
        let config: ObserverConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.defaults.num_artists, 50);
        assert_eq!(config.defaults.seed, 7);
        // Untouched defaults survive.
        assert_eq!(config.defaults.style_dim, 8);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = ObserverConfig::load(Path::new("does-not-exist.yaml")).unwrap();
        assert_eq!(config.driver.tick_interval_ms, 200);
    }
}
