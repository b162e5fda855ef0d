//! JIRA authentication

use crate::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials attached to every request of a session
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Personal access token sent as `Authorization: Bearer`
    Bearer { token: String },
    Basic { username: String, api_token: String },
    /// Cookies captured from a browser SSO login
    Cookies(Vec<SessionCookie>),
}

/// A browser cookie replayed against the Jira host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_cookie_path(),
            secure: false,
            http_only: false,
        }
    }

    /// Whether a browser would send this cookie to `url`
    pub fn matches(&self, url: &Url) -> bool {
        if self.secure && url.scheme() != "https" {
            return false;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let domain = self.domain.trim().trim_start_matches('.').to_ascii_lowercase();

        let domain_ok =
            domain.is_empty() || host == domain || host.ends_with(&format!(".{domain}"));
        let path = if self.path.is_empty() { "/" } else { self.path.as_str() };

        domain_ok && url.path().starts_with(path)
    }
}

impl Auth {
    pub fn bearer(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Config("Personal access token cannot be empty".to_string()));
        }
        Ok(Auth::Bearer {
            token: token.to_string(),
        })
    }

    pub fn basic(username: &str, api_token: &str) -> Result<Self> {
        let username = username.trim();
        let api_token = api_token.trim();
        if username.is_empty() || api_token.is_empty() {
            return Err(Error::Config(
                "Username and API token cannot be empty".to_string(),
            ));
        }
        Ok(Auth::Basic {
            username: username.to_string(),
            api_token: api_token.to_string(),
        })
    }

    pub fn cookies(cookies: Vec<SessionCookie>) -> Result<Self> {
        let cookies: Vec<SessionCookie> = cookies
            .into_iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|mut c| {
                c.name = c.name.trim().to_string();
                c.value = c.value.trim().to_string();
                c
            })
            .collect();

        if cookies.is_empty() {
            return Err(Error::Config(
                "No session cookies were captured from the browser login".to_string(),
            ));
        }
        Ok(Auth::Cookies(cookies))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer { .. } => "bearer",
            Auth::Basic { .. } => "basic",
            Auth::Cookies(_) => "cookies",
        }
    }

    /// Value for the `Authorization` header, if this mode uses one
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Auth::Bearer { token } => Some(format!("Bearer {token}")),
            Auth::Basic {
                username,
                api_token,
            } => {
                use base64::Engine;
                let credentials = format!("{}:{}", username, api_token);
                Some(format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(credentials)
                ))
            }
            Auth::Cookies(_) => None,
        }
    }

    /// Value for the `Cookie` header of a request to `url`
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let Auth::Cookies(cookies) = self else {
            return None;
        };

        let header = cookies
            .iter()
            .filter(|c| c.matches(url))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        (!header.is_empty()).then_some(header)
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Bearer { .. } => f.write_str("Auth::Bearer(<redacted>)"),
            Auth::Basic { username, .. } => write!(f, "Auth::Basic({username}, <redacted>)"),
            Auth::Cookies(cookies) => write!(f, "Auth::Cookies({} cookies)", cookies.len()),
        }
    }
}
