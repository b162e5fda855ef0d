//! Personal access token storage in the OS keyring

use crate::{Error, Result};

const DEFAULT_SERVICE: &str = "jirawidget";

/// Keeps one token per Jira base URL
pub struct CredentialStore {
    service: String,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn save_token(&self, base_url: &str, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Config("Refusing to store an empty token".to_string()));
        }
        self.entry(base_url)?.set_password(token)?;
        tracing::info!(account = %account_name(base_url), "Stored Jira token in keyring");
        Ok(())
    }

    pub fn load_token(&self, base_url: &str) -> Result<Option<String>> {
        match self.entry(base_url)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns false when there was nothing to delete
    pub fn delete_token(&self, base_url: &str) -> Result<bool> {
        match self.entry(base_url)?.delete_credential() {
            Ok(()) => {
                tracing::info!(account = %account_name(base_url), "Removed Jira token from keyring");
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn entry(&self, base_url: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, &account_name(base_url))?)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyring account for a base URL; trailing slashes and case do not matter
fn account_name(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_lowercase()
}
