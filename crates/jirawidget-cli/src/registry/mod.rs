pub mod manager;

pub use manager::{IssueRegistry, RegistryError};
