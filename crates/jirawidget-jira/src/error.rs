//! Error types for Jira integration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not connected.")]
    NotConnected,

    #[error("Request was redirected to a login page (likely Okta/SSO); token/cookie auth is not valid for this flow.")]
    Redirected { location: Option<String> },

    #[error("Received non-JSON response from Jira (likely SSO/permission HTML page). Please verify Jira API access for this issue.")]
    NonJson { status: u16, content_type: String },

    #[error("Jira returned an unexpected response format.")]
    UnexpectedFormat(#[source] serde_json::Error),

    #[error("Issue not found.")]
    NotFound,

    /// Non-2xx response, message already prefixed with the status code
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("exception: {0}")]
    Transport(String),

    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl Error {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Error::Redirected { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
