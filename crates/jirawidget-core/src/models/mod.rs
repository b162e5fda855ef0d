pub mod config;
pub mod issue;
pub mod tracked;

pub use config::{Config, JiraSettings, LoggingConfig};
pub use issue::{Issue, IssueKey, IssueLink, ACTIVITIES_LINK_TYPE, DONE_STATUS};
pub use tracked::{IssueState, TrackedIssue};
