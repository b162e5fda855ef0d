use chrono::{DateTime, Utc};
use jirawidget_core::models::TrackedIssue;
use serde::{Deserialize, Serialize};

/// A change to the tracked-issue registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub event_type: RegistryEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<TrackedIssue>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEventType {
    Added,
    Updated,
    Removed { key: String },
    Cleared,
}

impl RegistryEvent {
    pub fn added(issue: TrackedIssue) -> Self {
        Self {
            event_type: RegistryEventType::Added,
            issue: Some(issue),
            timestamp: Utc::now(),
        }
    }

    pub fn updated(issue: TrackedIssue) -> Self {
        Self {
            event_type: RegistryEventType::Updated,
            issue: Some(issue),
            timestamp: Utc::now(),
        }
    }

    pub fn removed(key: String) -> Self {
        Self {
            event_type: RegistryEventType::Removed { key },
            issue: None,
            timestamp: Utc::now(),
        }
    }

    pub fn cleared() -> Self {
        Self {
            event_type: RegistryEventType::Cleared,
            issue: None,
            timestamp: Utc::now(),
        }
    }
}
