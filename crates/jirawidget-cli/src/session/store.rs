//! Holder of the single active Jira session

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use jirawidget_core::models::Issue;
use jirawidget_jira::{
    Error, HttpTransport, JiraClient, Result, Session, SessionCookie, Transport,
};

/// Owns at most one configured client. Reconfiguring replaces it.
///
/// Operations clone the client `Arc` before awaiting the network, so
/// `clear()` never tears a transport out from under an in-flight request;
/// such a request still completes and is then reported as stale.
pub struct SessionStore<T: Transport = HttpTransport> {
    client: RwLock<Option<Arc<JiraClient<T>>>>,
    timeout: Duration,
}

impl<T: Transport> SessionStore<T> {
    pub fn new() -> Self {
        Self::with_timeout(HttpTransport::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: RwLock::new(None),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make `client` the active session, dropping any previous one
    pub async fn install(&self, client: JiraClient<T>) -> Session {
        let session = client.session().clone();
        let previous = self.client.write().await.replace(Arc::new(client));
        if previous.is_some() {
            tracing::info!("Replaced existing Jira session");
        }
        session
    }

    /// Disconnect. Returns false if nothing was connected.
    pub async fn clear(&self) -> bool {
        let previous = self.client.write().await.take();
        if previous.is_some() {
            tracing::info!("Disconnected Jira client");
        }
        previous.is_some()
    }

    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    pub async fn session(&self) -> Option<Session> {
        self.client
            .read()
            .await
            .as_ref()
            .map(|client| client.session().clone())
    }

    /// The active client, or `NotConnected`
    pub async fn client(&self) -> Result<Arc<JiraClient<T>>> {
        self.client.read().await.clone().ok_or(Error::NotConnected)
    }

    async fn is_current(&self, client: &Arc<JiraClient<T>>) -> bool {
        self.client
            .read()
            .await
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, client))
    }

    pub async fn validate(&self) -> Result<()> {
        let client = self.client().await?;
        client.validate().await
    }

    /// Fetch an issue with the active session. A result that lands after
    /// the session was cleared or replaced is reported as `NotConnected`.
    pub async fn fetch_issue(&self, key: &str) -> Result<Issue> {
        let client = self.client().await?;
        let result = client.fetch_issue(key).await;

        if !self.is_current(&client).await {
            tracing::debug!("Discarding result for '{}' from a stale session", key);
            return Err(Error::NotConnected);
        }
        result
    }

    pub async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        let client = self.client().await?;
        client.search_issues(jql, max_results).await
    }
}

impl SessionStore<HttpTransport> {
    pub async fn configure_bearer(&self, base_url: &str, token: &str) -> Result<Session> {
        self.configure(Session::bearer(base_url, token)).await
    }

    pub async fn configure_basic(
        &self,
        base_url: &str,
        username: &str,
        api_token: &str,
    ) -> Result<Session> {
        self.configure(Session::basic(base_url, username, api_token))
            .await
    }

    pub async fn configure_cookies(
        &self,
        base_url: &str,
        cookies: Vec<SessionCookie>,
    ) -> Result<Session> {
        self.configure(Session::cookies(base_url, cookies)).await
    }

    async fn configure(&self, session: Result<Session>) -> Result<Session> {
        let session = session.map_err(|e| {
            tracing::error!(error = %e, "Failed to configure Jira client");
            e
        })?;
        let client = JiraClient::connect(session, self.timeout)?;
        Ok(self.install(client).await)
    }
}

impl<T: Transport> Default for SessionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
