//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "tier": "pro",
//!   "record_limits": {"free": 100, "pro": 1000, "enterprise": 10000},
//!   "default_page_limit": 10,
//!   "unknown_keys": "strip",
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::collection::MAX_PAGE_LIMIT;
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::validation::UnknownKeys;

/// Account tier, which decides the collection record cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }
}

/// Record cap per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLimits {
    #[serde(default = "default_free_limit")]
    pub free: usize,
    #[serde(default = "default_pro_limit")]
    pub pro: usize,
    #[serde(default = "default_enterprise_limit")]
    pub enterprise: usize,
}

impl Default for RecordLimits {
    fn default() -> Self {
        Self {
            free: default_free_limit(),
            pro: default_pro_limit(),
            enterprise: default_enterprise_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    #[serde(default)]
    pub tier: Tier,

    #[serde(default)]
    pub record_limits: RecordLimits,

    /// Page size used when a listing gives no limit
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,

    /// Policy for undeclared record keys
    #[serde(default)]
    pub unknown_keys: UnknownKeys,

    /// Lowest severity written to the log
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_free_limit() -> usize {
    100
}
fn default_pro_limit() -> usize {
    1000
}
fn default_enterprise_limit() -> usize {
    10000
}
fn default_page_limit() -> usize {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("data_dir", config.data_dir.as_str()),
                ("tier", config.tier.as_str()),
            ],
        );

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        let limits = &self.record_limits;
        if limits.free == 0 || limits.pro == 0 || limits.enterprise == 0 {
            return Err(CliError::config_error("record_limits must all be > 0"));
        }

        if self.default_page_limit == 0 || self.default_page_limit > MAX_PAGE_LIMIT {
            return Err(CliError::config_error(format!(
                "default_page_limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Record cap for the configured tier
    pub fn tier_limit(&self) -> usize {
        match self.tier {
            Tier::Free => self.record_limits.free,
            Tier::Pro => self.record_limits.pro,
            Tier::Enterprise => self.record_limits.enterprise,
        }
    }

    pub fn min_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, config: serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join("fauxbase.json");
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, json!({"data_dir": "./data"}));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.tier, Tier::Free);
        assert_eq!(config.tier_limit(), 100);
        assert_eq!(config.default_page_limit, 10);
        assert_eq!(config.unknown_keys, UnknownKeys::Strip);
        assert_eq!(config.min_severity(), Severity::Info);
    }

    #[test]
    fn test_tier_selects_limit() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            json!({"data_dir": "./data", "tier": "pro", "record_limits": {"pro": 5}}),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.tier_limit(), 5);
        assert_eq!(config.record_limits.enterprise, 10000);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let dir = TempDir::new().unwrap();
        for bad in [
            json!({"data_dir": ""}),
            json!({"data_dir": "./d", "tier": "gold"}),
            json!({"data_dir": "./d", "default_page_limit": 0}),
            json!({"data_dir": "./d", "default_page_limit": 500}),
            json!({"data_dir": "./d", "record_limits": {"free": 0}}),
            json!({"data_dir": "./d", "log_level": "loud"}),
            json!({"tier": "free"}),
        ] {
            let path = write_config(&dir, bad.clone());
            assert!(Config::load(&path).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code_str(), "FAUX_CLI_CONFIG_ERROR");
    }
}
