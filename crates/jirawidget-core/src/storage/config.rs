//! Persistence of `config.json`

use crate::models::{Config, IssueKey};
use crate::Result;
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";
const TEMP_SUFFIX: &str = "tmp";

/// Reads and writes the widget config in one directory
pub struct ConfigStorage {
    config_dir: PathBuf,
}

impl ConfigStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Load the config, writing a default one on first run.
    ///
    /// Tracked keys from a hand-edited file are normalized and deduplicated
    /// so the loaded list satisfies the same rules as `add_tracked_issue`.
    pub fn load(&self) -> Result<Config> {
        let content = match fs::read_to_string(self.path()) {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => return self.write_default(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return self.write_default(),
            Err(e) => return Err(e.into()),
        };

        let mut config: Config = serde_json::from_str(&content)?;
        config.tracked_issues = dedup_keys(config.tracked_issues);
        Ok(config)
    }

    /// Replace the file atomically so an interrupted save keeps the old one
    pub fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.config_dir)?;

        let target = self.path();
        let temp = target.with_extension(TEMP_SUFFIX);
        fs::write(&temp, serde_json::to_string_pretty(config)?)?;
        fs::rename(&temp, &target)?;

        Ok(())
    }

    fn write_default(&self) -> Result<Config> {
        let config = Config::default();
        self.save(&config)?;
        Ok(config)
    }
}

fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(keys.len());
    for key in keys {
        let key = IssueKey::normalize(&key);
        if !key.is_empty() && !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen
}
