//! Configuration manager

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use jirawidget_core::{
    models::{Config, IssueKey},
    storage::{init_config_dir, ConfigStorage},
    Result as CoreResult,
};

/// Config manager error
#[derive(Debug, thiserror::Error)]
pub enum ConfigManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] jirawidget_core::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigManagerError>;

/// Manages application configuration
pub struct ConfigManager {
    storage: ConfigStorage,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    pub fn new() -> CoreResult<Self> {
        Self::with_dir(init_config_dir()?)
    }

    pub fn with_dir(config_dir: PathBuf) -> CoreResult<Self> {
        let storage = ConfigStorage::new(config_dir);

        // Load or create default config
        let config = storage.load()?;

        Ok(Self {
            storage,
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.storage.path()
    }

    pub async fn get(&self) -> Config {
        self.config.read().await.clone()
    }

    pub async fn update(&self, config: Config) -> Result<Config> {
        config
            .validate()
            .map_err(|e| ConfigManagerError::Invalid(e.to_string()))?;

        self.storage.save(&config)?;

        {
            let mut current = self.config.write().await;
            *current = config.clone();
        }

        Ok(config)
    }

    pub async fn update_jira_settings(
        &self,
        base_url: Option<String>,
        username: Option<String>,
        project_key: Option<String>,
        request_timeout_secs: Option<u64>,
    ) -> Result<Config> {
        let mut config = self.get().await;

        if let Some(url) = base_url {
            config.jira.base_url = Some(url.trim().to_string());
        }

        if let Some(user) = username {
            config.jira.username = Some(user.trim().to_string()).filter(|u| !u.is_empty());
        }

        if let Some(project) = project_key {
            config.jira.project_key = project.trim().to_uppercase();
        }

        if let Some(timeout) = request_timeout_secs {
            config.jira.request_timeout_secs = timeout;
        }

        self.update(config).await
    }

    /// Record a successful login. Unlike `update_jira_settings`, a `None`
    /// username clears any saved one, since bearer and cookie logins must
    /// not fall back to basic auth on the next start.
    pub async fn set_login(&self, base_url: &str, username: Option<&str>) -> Result<Config> {
        let mut config = self.get().await;
        config.jira.base_url = Some(base_url.trim().to_string());
        config.jira.username = username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self.update(config).await
    }

    pub async fn set_log_level(&self, log_level: &str) -> Result<Config> {
        let mut config = self.get().await;
        config.logging.log_level = log_level.to_string();
        self.update(config).await
    }

    /// Persist a newly tracked key. Returns false if it was already saved.
    pub async fn add_tracked_issue(&self, key: &IssueKey) -> Result<bool> {
        let mut config = self.get().await;
        if config.tracked_issues.iter().any(|k| k == key.as_str()) {
            return Ok(false);
        }
        config.tracked_issues.push(key.to_string());
        self.update(config).await?;
        Ok(true)
    }

    /// Returns false if the key was not saved
    pub async fn remove_tracked_issue(&self, key: &str) -> Result<bool> {
        let key = IssueKey::normalize(key);
        let mut config = self.get().await;
        let before = config.tracked_issues.len();
        config.tracked_issues.retain(|k| *k != key);
        if config.tracked_issues.len() == before {
            return Ok(false);
        }
        self.update(config).await?;
        Ok(true)
    }

    pub async fn clear_tracked_issues(&self) -> Result<Config> {
        let mut config = self.get().await;
        config.tracked_issues.clear();
        self.update(config).await
    }

    pub async fn reset_to_default(&self) -> Result<Config> {
        self.update(Config::default()).await
    }
}
