//! HTTP transport seam over reqwest

use crate::session::Session;
use crate::{Error, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, StatusCode, Url};
use std::future::Future;
use std::time::Duration;

/// What the client needs to see of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub location: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: None,
            location: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Canonical reason phrase for the status code, empty when unknown
    pub fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
    }
}

/// Issues GET requests for the Jira client.
///
/// Implementations must not follow redirects and must bound every request
/// with a timeout.
pub trait Transport: Send + Sync {
    fn get(&self, url: Url) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// reqwest-backed transport configured from a [`Session`]
pub struct HttpTransport {
    client: reqwest::Client,
    session: Session,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(session: Session, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(value) = session.auth().authorization_header() {
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| Error::Config(format!("Invalid credential characters: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let policy = if session.redirects_allowed() {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(policy)
            .timeout(timeout)
            .user_agent(concat!("jirawidget/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %session.base_url(),
            auth = session.auth().kind(),
            timeout_secs = timeout.as_secs(),
            "Configured Jira client with auto-redirect disabled"
        );

        Ok(Self { client, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse> {
        let mut request = self.client.get(url.clone());
        if let Some(cookies) = self.session.auth().cookie_header(&url) {
            request = request.header(header::COOKIE, cookies);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = header_string(response.headers(), header::CONTENT_TYPE);
        let location = header_string(response.headers(), header::LOCATION);
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            content_type,
            location,
            body,
        })
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
