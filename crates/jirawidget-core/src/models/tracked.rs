//! Tracked issue display state

use crate::progress::ActivityProgress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message shown when a fetch fails without a reason
pub const DEFAULT_ERROR_MESSAGE: &str = "Not Found";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedIssue {
    pub key: String,
    pub state: IssueState,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IssueState {
    Loading,
    Loaded {
        done: usize,
        total: usize,
        percent: u8,
    },
    Errored {
        message: String,
    },
}

impl From<ActivityProgress> for IssueState {
    fn from(progress: ActivityProgress) -> Self {
        IssueState::Loaded {
            done: progress.done,
            total: progress.total,
            percent: progress.percent,
        }
    }
}

impl TrackedIssue {
    /// A freshly added issue waiting for its first fetch
    pub fn loading(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: IssueState::Loading,
            updated_at: Utc::now(),
        }
    }

    pub fn set_loaded(&mut self, progress: ActivityProgress) {
        self.state = progress.into();
        self.updated_at = Utc::now();
    }

    pub fn set_errored(&mut self, message: Option<String>) {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        self.state = IssueState::Errored { message };
        self.updated_at = Utc::now();
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, IssueState::Loading)
    }

    /// Progress bar value; errored and loading issues show 0
    pub fn percent(&self) -> u8 {
        match self.state {
            IssueState::Loaded { percent, .. } => percent,
            _ => 0,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self.state {
            IssueState::Loading => "Loading...",
            IssueState::Loaded { .. } => "Loaded",
            IssueState::Errored { .. } => "Error",
        }
    }

    pub fn display_text(&self) -> String {
        match &self.state {
            IssueState::Loading => self.key.clone(),
            IssueState::Loaded { done, total, .. } => {
                format!("{} ({}/{} Done)", self.key, done, total)
            }
            IssueState::Errored { message } => format!("{} ({})", self.key, message),
        }
    }
}
