//! Configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation

use crate::error::StatsError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that supplies the hook event type explicitly.
pub const HOOK_EVENT_ENV: &str = "CLAUDE_HOOK_EVENT";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Paths configuration
    #[serde(default)]
    pub paths: PathsConfig,

    /// Report configuration
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the Claude data directory; `~/.claude` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_home: Option<PathBuf>,
    pub log_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub project_limit: usize,
    pub tool_limit: usize,
    pub daily_days: u32,
    /// Trailing window of the events timeline, in minutes
    pub events_minutes: u32,
    pub events_limit: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            claude_home: None,
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            project_limit: 10,
            tool_limit: 10,
            daily_days: 30,
            events_minutes: 60,
            events_limit: 200,
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            Some(PathBuf::from("ccstats.toml")),
            Some(PathBuf::from(".ccstats.toml")),
            dirs::config_dir().map(|d| d.join("ccstats").join("config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("CLAUDE_HOME") {
            if !val.is_empty() {
                self.paths.claude_home = Some(PathBuf::from(val));
            }
        }
        if let Ok(val) = env::var("CCSTATS_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        if let Ok(val) = env::var("CCSTATS_PROJECT_LIMIT") {
            self.report.project_limit = val.parse().context("Invalid CCSTATS_PROJECT_LIMIT")?;
        }
        if let Ok(val) = env::var("CCSTATS_TOOL_LIMIT") {
            self.report.tool_limit = val.parse().context("Invalid CCSTATS_TOOL_LIMIT")?;
        }
        if let Ok(val) = env::var("CCSTATS_DAILY_DAYS") {
            self.report.daily_days = val.parse().context("Invalid CCSTATS_DAILY_DAYS")?;
        }
        if let Ok(val) = env::var("CCSTATS_EVENTS_MINUTES") {
            self.report.events_minutes = val.parse().context("Invalid CCSTATS_EVENTS_MINUTES")?;
        }
        if let Ok(val) = env::var("CCSTATS_EVENTS_LIMIT") {
            self.report.events_limit = val.parse().context("Invalid CCSTATS_EVENTS_LIMIT")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "Log format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            );
        }

        if !matches!(self.logging.output.as_str(), "console" | "file") {
            anyhow::bail!(
                "Log output must be 'console' or 'file', got '{}'",
                self.logging.output
            );
        }

        if !(1..=365).contains(&self.report.daily_days) {
            anyhow::bail!(
                "Daily report window must be between 1 and 365 days, got {}",
                self.report.daily_days
            );
        }

        if self.report.events_minutes == 0 {
            anyhow::bail!("Events window must be at least one minute");
        }

        if self.report.events_limit == 0 {
            anyhow::bail!("Events limit must be at least 1");
        }

        Ok(())
    }

    /// Resolve the Claude data directory
    pub fn claude_home(&self) -> std::result::Result<PathBuf, StatsError> {
        match &self.paths.claude_home {
            Some(path) => Ok(path.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".claude"))
                .ok_or(StatsError::HomeDirUnavailable),
        }
    }

    /// Directory containing the per-day hook event logs
    pub fn hooks_dir(&self) -> std::result::Result<PathBuf, StatsError> {
        Ok(self.claude_home()?.join("hooks"))
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Glob, relative to the Claude home, matching every usage log.
pub const PROJECTS_GLOB: &str = "projects/**/*.jsonl";

/// Glob, relative to the hooks directory, matching the daily hook logs.
pub const HOOKS_GLOB: &str = "*.jsonl";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.report.project_limit, 10);
        assert_eq!(config.report.tool_limit, 10);
        assert_eq!(config.report.daily_days, 30);
        assert!(config.paths.claude_home.is_none());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.report.daily_days = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_claude_home_wins() {
        let mut config = Config::default();
        config.paths.claude_home = Some(PathBuf::from("/tmp/claude-test"));
        assert_eq!(
            config.hooks_dir().unwrap(),
            PathBuf::from("/tmp/claude-test/hooks")
        );
    }
}
