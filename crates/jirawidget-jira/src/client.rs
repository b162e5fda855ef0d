//! Jira REST client: connection validation and issue lookup with
//! v3 to v2 fallback

use crate::response::{extract_error, looks_like_json, snippet};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};
use crate::types::{JiraIssue, JiraSearchResult, ISSUE_FIELDS};
use crate::{Error, Result};
use jirawidget_core::models::Issue;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;

const MYSELF_PATH: &str = "rest/api/3/myself";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V3,
    V2,
}

impl ApiVersion {
    /// Lookup order: v3 serves Cloud, v2 remains for Server/Data Center
    pub const FALLBACK_ORDER: [ApiVersion; 2] = [ApiVersion::V3, ApiVersion::V2];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V3 => "3",
            ApiVersion::V2 => "2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api/{}", self.as_str())
    }
}

pub struct JiraClient<T = HttpTransport> {
    session: Session,
    transport: T,
}

impl JiraClient<HttpTransport> {
    /// Build a client backed by reqwest for the given session
    pub fn connect(session: Session, timeout: Duration) -> Result<Self> {
        let transport = HttpTransport::new(session.clone(), timeout).map_err(|e| {
            tracing::error!(error = %e, "Failed to configure Jira client");
            e
        })?;
        Ok(Self { session, transport })
    }
}

impl<T: Transport> JiraClient<T> {
    pub fn with_transport(session: Session, transport: T) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check that the session's credentials reach the current-user endpoint
    pub async fn validate(&self) -> Result<()> {
        let url = self.session.endpoint(MYSELF_PATH)?;

        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Exception during Jira connection validation");
                return Err(e);
            }
        };

        if response.is_success() {
            tracing::info!("Jira connection validation succeeded");
            return Ok(());
        }

        if response.is_redirect() {
            tracing::error!(
                status = response.status,
                location = response.location.as_deref().unwrap_or("<unknown>"),
                "Connection validation redirected"
            );
            return Err(Error::Redirected {
                location: response.location,
            });
        }

        let message = extract_error(&response);
        tracing::error!("Jira connection validation failed: {}", message);
        Err(Error::Http {
            status: response.status,
            message,
        })
    }

    /// Fetch an issue with summary, status and links.
    ///
    /// The key is URL-encoded but its format is not checked here.
    pub async fn fetch_issue(&self, key: &str) -> Result<Issue> {
        let encoded = urlencoding::encode(key);
        let target = format!("issue '{}'", key);

        let raw: JiraIssue = self
            .with_fallback(&target, |version| {
                let path = format!(
                    "rest/api/{}/issue/{}?fields={}",
                    version.as_str(),
                    encoded,
                    ISSUE_FIELDS
                );
                let target = target.as_str();
                async move {
                    self.get_json::<Option<JiraIssue>>(&path, target, version)
                        .await?
                        .ok_or(Error::NotFound)
                }
            })
            .await?;

        Ok(raw.into())
    }

    /// Run a JQL search, returning at most `max_results` issues
    pub async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        let encoded = urlencoding::encode(jql);
        let target = format!("search '{}'", jql);

        let result: JiraSearchResult = self
            .with_fallback(&target, |version| {
                let path = format!(
                    "rest/api/{}/search?jql={}&fields={}&maxResults={}",
                    version.as_str(),
                    encoded,
                    ISSUE_FIELDS,
                    max_results
                );
                let target = target.as_str();
                async move { self.get_json(&path, target, version).await }
            })
            .await?;

        Ok(result.issues.into_iter().map(Issue::from).collect())
    }

    /// Try each API version in order, strictly one after another. The last
    /// version's outcome is returned whether or not it succeeds.
    async fn with_fallback<D, F, Fut>(&self, target: &str, attempt: F) -> Result<D>
    where
        F: Fn(ApiVersion) -> Fut,
        Fut: Future<Output = Result<D>>,
    {
        let [first, second] = ApiVersion::FALLBACK_ORDER;

        match attempt(first).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::info!(
                    "{} lookup failed for {}. Trying {}. Reason: {}",
                    first,
                    target,
                    second,
                    e
                );
                attempt(second).await
            }
        }
    }

    /// One GET with redirect, status, content-type and parse checks
    async fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        target: &str,
        version: ApiVersion,
    ) -> Result<D> {
        let url = self.session.endpoint(path)?;

        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Exception while fetching {} ({})", target, version);
                return Err(e);
            }
        };

        if response.is_redirect() {
            tracing::error!(
                status = response.status,
                location = response.location.as_deref().unwrap_or("<unknown>"),
                "Lookup redirected for {} ({})",
                target,
                version
            );
            return Err(Error::Redirected {
                location: response.location,
            });
        }

        if !response.is_success() {
            let message = extract_error(&response);
            tracing::error!("Lookup failed for {} ({}): {}", target, version, message);
            return Err(Error::Http {
                status: response.status,
                message,
            });
        }

        if !looks_like_json(&response) {
            let content_type = response
                .content_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(
                status = response.status,
                content_type = %content_type,
                snippet = %snippet(&response.body),
                "Non-JSON success response for {} ({})",
                target,
                version
            );
            return Err(Error::NonJson {
                status: response.status,
                content_type,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(
                error = %e,
                snippet = %snippet(&response.body),
                "Failed to parse Jira response for {} ({})",
                target,
                version
            );
            Error::UnexpectedFormat(e)
        })
    }
}
