//! Session configuration: base URL plus one authentication mode

use crate::auth::{Auth, SessionCookie};
use crate::{Error, Result};
use reqwest::Url;

/// Browser entry point that lands on the current-user endpoint after SSO
const LOGIN_PATH: &str = "login.jsp?os_destination=%2Frest%2Fapi%2F3%2Fmyself";

#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    auth: Auth,
    redirects_allowed: bool,
}

impl Session {
    /// Build a session, normalizing the base URL so endpoints join under it.
    ///
    /// Redirect following stays disabled for every auth mode: a 3xx from Jira
    /// means the credential was bounced to a login page.
    pub fn new(base_url: &str, auth: Auth) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            auth,
            redirects_allowed: false,
        })
    }

    pub fn bearer(base_url: &str, token: &str) -> Result<Self> {
        Self::new(base_url, Auth::bearer(token)?)
    }

    pub fn basic(base_url: &str, username: &str, api_token: &str) -> Result<Self> {
        Self::new(base_url, Auth::basic(username, api_token)?)
    }

    pub fn cookies(base_url: &str, cookies: Vec<SessionCookie>) -> Result<Self> {
        Self::new(base_url, Auth::cookies(cookies)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn redirects_allowed(&self) -> bool {
        self.redirects_allowed
    }

    /// Resolve an API path relative to the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid request path '{}': {}", path, e)))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url =
        Url::parse(raw).map_err(|e| Error::Config(format!("Invalid Jira URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(format!(
            "Jira URL must be an http(s) address with a host: '{}'",
            raw
        )));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// URL to open in a browser for an Okta/SSO login whose cookies are later
/// handed to [`Session::cookies`]
pub fn login_url(base_url: &str) -> Result<Url> {
    parse_base_url(base_url)?
        .join(LOGIN_PATH)
        .map_err(|e| Error::Config(e.to_string()))
}
