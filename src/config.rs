// SPDX-License-Identifier: PMPL-1.0-or-later

//! Service configuration
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. YAML config file (`--config`)
//! 3. Environment variables (`SNIPPET_AUDIT_CATALOG`, `SNIPPET_AUDIT_PORT`)
//! 4. CLI flags (applied by the caller through [`ConfigOverrides`])

use crate::catalog::default_catalog_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_CATALOG: &str = "SNIPPET_AUDIT_CATALOG";
pub const ENV_PORT: &str = "SNIPPET_AUDIT_PORT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub catalog_path: PathBuf,
    /// Re-read the catalog on every request instead of once at startup
    pub reload_catalog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            catalog_path: default_catalog_path(),
            reload_catalog: false,
        }
    }
}

/// Values supplied on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub catalog_path: Option<PathBuf>,
    pub reload_catalog: bool,
}

impl AppConfig {
    /// Parse a YAML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the full configuration stack.
    pub fn load(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Apply environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CATALOG).filter(|v| !v.is_empty()) {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", ENV_PORT, port))?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(path) = overrides.catalog_path {
            self.catalog_path = path;
        }
        if overrides.reload_catalog {
            self.reload_catalog = true;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert!(config.catalog_path.is_absolute());
        assert!(config.catalog_path.ends_with("datasets/vulnerabilities.csv"));
        assert!(!config.reload_catalog);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("port: 8080\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_env_beats_file_and_flags_beat_env() {
        let mut config = AppConfig::from_yaml("catalog_path: file.csv\nport: 7000\n").unwrap();
        let env: HashMap<&str, &str> = [(ENV_CATALOG, "env.csv"), (ENV_PORT, "7100")].into();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("env.csv"));
        assert_eq!(config.port, 7100);

        config.apply_overrides(ConfigOverrides {
            port: Some(7200),
            reload_catalog: true,
            ..Default::default()
        });
        assert_eq!(config.port, 7200);
        assert_eq!(config.catalog_path, PathBuf::from("env.csv"));
        assert!(config.reload_catalog);
    }

    #[test]
    fn test_bad_env_port() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|k| (k == ENV_PORT).then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_yaml_type_rejected() {
        assert!(AppConfig::from_yaml("port: not-a-number\n").is_err());
    }

    #[test]
    fn test_default_catalog_ignores_working_directory() {
        let config = AppConfig::from_yaml("port: 8080\n").unwrap();
        assert_eq!(config.catalog_path, default_catalog_path());
        assert!(config.catalog_path.is_file());
    }
}
