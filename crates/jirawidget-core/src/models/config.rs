//! Application configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub jira: JiraSettings,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracked_issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JiraSettings {
    pub base_url: Option<String>,
    pub project_key: String,
    pub username: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.jira.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            jira: JiraSettings::default(),
            logging: LoggingConfig::default(),
            tracked_issues: Vec::new(),
        }
    }
}

impl JiraSettings {
    const MAX_TIMEOUT_SECS: u64 = 300;

    /// Validate Jira connection settings
    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.base_url {
            let url = url.trim();
            if url.is_empty() {
                return Err(Error::Validation("Jira URL cannot be empty".to_string()));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Validation(
                    "Jira URL must start with http:// or https://".to_string(),
                ));
            }
        }

        let project = self.project_key.trim();
        if project.is_empty() || !project.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Validation(format!(
                "Invalid project key '{}'",
                self.project_key
            )));
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > Self::MAX_TIMEOUT_SECS {
            return Err(Error::Validation(format!(
                "Request timeout must be between 1 and {} seconds",
                Self::MAX_TIMEOUT_SECS
            )));
        }

        Ok(())
    }
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            project_key: "PC".to_string(),
            username: None,
            request_timeout_secs: 30,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
