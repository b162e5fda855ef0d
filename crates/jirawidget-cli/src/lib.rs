//! JiraWidget
//!
//! Tracks Jira issues and their "Activities" completion percentage on top
//! of the `jirawidget-jira` connectivity core.

pub mod config;
pub mod event_manager;
pub mod events;
pub mod logging;
pub mod registry;
pub mod session;

pub use config::ConfigManager;
pub use event_manager::EventManager;
pub use events::{RegistryEvent, RegistryEventType};
pub use registry::{IssueRegistry, RegistryError};
pub use session::SessionStore;
