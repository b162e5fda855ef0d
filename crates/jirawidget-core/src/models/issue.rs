//! Issue data model

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link type whose targets drive the progress percentage
pub const ACTIVITIES_LINK_TYPE: &str = "Activities";

/// Status name counted as complete
pub const DONE_STATUS: &str = "Done";

/// The slice of a Jira issue the widget cares about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub summary: Option<String>,
    pub links: Vec<IssueLink>,
}

/// A remote issue link reduced to what progress needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IssueLink {
    pub link_type_name: Option<String>,
    pub linked_status_name: Option<String>,
}

impl IssueLink {
    pub fn new(link_type_name: Option<&str>, linked_status_name: Option<&str>) -> Self {
        Self {
            link_type_name: link_type_name.map(str::to_string),
            linked_status_name: linked_status_name.map(str::to_string),
        }
    }

    /// An "Activities" link whose target has a known status
    pub fn is_activity(&self) -> bool {
        self.link_type_name.as_deref() == Some(ACTIVITIES_LINK_TYPE)
            && self.linked_status_name.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.linked_status_name.as_deref() == Some(DONE_STATUS)
    }
}

impl Issue {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: None,
            links: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_link(mut self, link: IssueLink) -> Self {
        self.links.push(link);
        self
    }

    /// Links that count toward progress
    pub fn activity_links(&self) -> impl Iterator<Item = &IssueLink> {
        self.links.iter().filter(|link| link.is_activity())
    }
}

/// A validated `<PROJECT>-<digits>` issue key, always uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    /// Normalize a user-supplied key to its canonical uppercase form
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Parse a key, requiring the given project prefix
    pub fn parse(raw: &str, project_key: &str) -> Result<Self> {
        let key = Self::normalize(raw);
        let project = project_key.trim().to_uppercase();

        let digits = key
            .strip_prefix(project.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or("");

        if project.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation(format!(
                "Invalid format '{}'. Please use {}-XXXXX format.",
                raw.trim(),
                project
            )));
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
