//! Tracked-issue registry

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::event_manager::EventManager;
use crate::events::RegistryEvent;
use crate::session::SessionStore;
use jirawidget_core::models::{Issue, IssueKey, TrackedIssue};
use jirawidget_core::ActivityProgress;
use jirawidget_jira::Transport;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("This issue is already being tracked: {0}")]
    Duplicate(String),

    #[error("Issue is not tracked: {0}")]
    NotTracked(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Ordered set of tracked issues and their fetch state.
///
/// The lock is only held to read or write entries, never across a fetch,
/// so refreshes of different keys proceed independently.
pub struct IssueRegistry {
    issues: Arc<RwLock<Vec<TrackedIssue>>>,
    event_manager: Arc<EventManager>,
}

impl IssueRegistry {
    pub fn new(event_manager: Arc<EventManager>) -> Self {
        Self {
            issues: Arc::new(RwLock::new(Vec::new())),
            event_manager,
        }
    }

    /// Start tracking `key` in the loading state
    pub async fn add(&self, key: &str) -> Result<TrackedIssue> {
        let key = IssueKey::normalize(key);

        let tracked = {
            let mut issues = self.issues.write().await;
            if issues.iter().any(|issue| issue.key == key) {
                return Err(RegistryError::Duplicate(key));
            }
            let tracked = TrackedIssue::loading(key);
            issues.push(tracked.clone());
            tracked
        };

        tracing::info!("Added issue '{}' to tracked list", tracked.key);
        self.event_manager.emit(RegistryEvent::added(tracked.clone()));
        Ok(tracked)
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = IssueKey::normalize(key);

        {
            let mut issues = self.issues.write().await;
            let index = issues
                .iter()
                .position(|issue| issue.key == key)
                .ok_or_else(|| RegistryError::NotTracked(key.clone()))?;
            issues.remove(index);
        }

        tracing::info!("Removed issue '{}' from tracked list", key);
        self.event_manager.emit(RegistryEvent::removed(key));
        Ok(())
    }

    /// Drop every tracked issue, as on logout
    pub async fn clear(&self) {
        self.issues.write().await.clear();
        self.event_manager.emit(RegistryEvent::cleared());
    }

    pub async fn get(&self, key: &str) -> Option<TrackedIssue> {
        let key = IssueKey::normalize(key);
        self.issues
            .read()
            .await
            .iter()
            .find(|issue| issue.key == key)
            .cloned()
    }

    /// Snapshot in insertion order
    pub async fn list(&self) -> Vec<TrackedIssue> {
        self.issues.read().await.clone()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.issues
            .read()
            .await
            .iter()
            .map(|issue| issue.key.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.issues.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.issues.read().await.is_empty()
    }

    /// Fetch `key` and record the outcome. Returns the updated entry, or
    /// `None` if the key is not tracked or was removed while in flight.
    ///
    /// Refreshing a key that is already loading issues a second fetch; the
    /// caller decides whether to avoid that.
    pub async fn refresh<T: Transport>(
        &self,
        key: &str,
        store: &SessionStore<T>,
    ) -> Option<TrackedIssue> {
        let key = IssueKey::normalize(key);
        if self.get(&key).await.is_none() {
            return None;
        }

        let outcome = store.fetch_issue(&key).await;
        self.complete(&key, outcome).await
    }

    /// Refresh every tracked issue concurrently
    pub async fn refresh_all<T: Transport>(&self, store: &SessionStore<T>) -> Vec<TrackedIssue> {
        let keys = self.keys().await;
        futures::future::join_all(keys.iter().map(|key| self.refresh(key, store)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Refresh everything every `interval` until `shutdown` resolves.
    ///
    /// `shutdown` is polled during refreshes as well as between them, so an
    /// interrupt never waits for slow requests. Returns the number of
    /// completed refresh rounds.
    pub async fn watch<T, F>(&self, store: &SessionStore<T>, interval: Duration, shutdown: F) -> usize
    where
        T: Transport,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut rounds = 0;

        loop {
            tokio::select! {
                _ = self.refresh_all(store) => rounds += 1,
                _ = &mut shutdown => break,
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Stopped watching after {} refresh rounds", rounds);
        rounds
    }

    /// Apply a finished fetch to its entry, exactly once
    async fn complete(
        &self,
        key: &str,
        outcome: jirawidget_jira::Result<Issue>,
    ) -> Option<TrackedIssue> {
        let updated = {
            let mut issues = self.issues.write().await;
            let Some(entry) = issues.iter_mut().find(|issue| issue.key == key) else {
                tracing::debug!("Discarding fetch result for untracked issue '{}'", key);
                return None;
            };

            match outcome {
                Ok(issue) => entry.set_loaded(ActivityProgress::from_issue(&issue)),
                Err(e) => {
                    tracing::warn!("Failed to load '{}': {}", key, e);
                    entry.set_errored(Some(e.to_string()));
                }
            }
            entry.clone()
        };

        self.event_manager.emit(RegistryEvent::updated(updated.clone()));
        Some(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegistryEventType;
    use jirawidget_core::models::IssueState;
    use jirawidget_jira::testing::ScriptedTransport;
    use jirawidget_jira::{HttpResponse, JiraClient, Session};
    use tokio::sync::oneshot;

    fn registry() -> IssueRegistry {
        IssueRegistry::new(Arc::new(EventManager::new()))
    }

    fn issue_body(key: &str, statuses: &[&str]) -> HttpResponse {
        let links: Vec<String> = statuses
            .iter()
            .map(|s| {
                format!(
                    r#"{{"type":{{"name":"Activities"}},"outwardIssue":{{"fields":{{"status":{{"name":"{}"}}}}}}}}"#,
                    s
                )
            })
            .collect();
        HttpResponse::new(
            200,
            format!(
                r#"{{"key":"{}","fields":{{"summary":"s","issuelinks":[{}]}}}}"#,
                key,
                links.join(",")
            ),
        )
        .with_content_type("application/json")
    }

    async fn store_with(transport: ScriptedTransport) -> SessionStore<ScriptedTransport> {
        let store = SessionStore::new();
        let session = Session::bearer("https://jira.example.com", "pat").unwrap();
        store
            .install(JiraClient::with_transport(session, transport))
            .await;
        store
    }

    #[tokio::test]
    async fn test_add_normalizes_and_starts_loading() {
        let registry = registry();
        let tracked = registry.add(" pc-12 ").await.unwrap();

        assert_eq!(tracked.key, "PC-12");
        assert_eq!(tracked.state, IssueState::Loading);
        assert_eq!(registry.keys().await, vec!["PC-12"]);
    }

    #[tokio::test]
    async fn test_duplicate_rejected_without_mutation() {
        let registry = registry();
        registry.add("PC-1").await.unwrap();
        registry.add("PC-2").await.unwrap();
        let before = registry.list().await;

        let err = registry.add("pc-1").await.unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(ref key) if key == "PC-1"));
        assert_eq!(registry.list().await, before);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let registry = registry();
        registry.add("PC-1").await.unwrap();
        registry.add("PC-2").await.unwrap();

        registry.remove("pc-1").await.unwrap();
        assert_eq!(registry.keys().await, vec!["PC-2"]);
        assert!(matches!(
            registry.remove("PC-1").await,
            Err(RegistryError::NotTracked(_))
        ));

        registry.clear().await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_success_sets_loaded() {
        let registry = registry();
        registry.add("PC-5").await.unwrap();
        let store = store_with(
            ScriptedTransport::new().on("/issue/PC-5", issue_body("PC-5", &["Done", "Open", "Open"])),
        )
        .await;

        let updated = registry.refresh("PC-5", &store).await.unwrap();

        assert_eq!(
            updated.state,
            IssueState::Loaded {
                done: 1,
                total: 3,
                percent: 33
            }
        );
        assert_eq!(updated.display_text(), "PC-5 (1/3 Done)");
        assert_eq!(registry.get("PC-5").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_errored() {
        let registry = registry();
        registry.add("PC-404").await.unwrap();
        let store = store_with(ScriptedTransport::new()).await;

        let updated = registry.refresh("PC-404", &store).await.unwrap();

        assert_eq!(
            updated.state,
            IssueState::Errored {
                message: "404: Issue does not exist".to_string()
            }
        );
        assert_eq!(updated.display_text(), "PC-404 (404: Issue does not exist)");
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let registry = registry();
        registry.add("PC-1").await.unwrap();
        let store: SessionStore<ScriptedTransport> = SessionStore::new();

        let updated = registry.refresh("PC-1", &store).await.unwrap();
        assert_eq!(updated.display_text(), "PC-1 (Not connected.)");
    }

    #[tokio::test]
    async fn test_refresh_untracked_key_is_noop() {
        let registry = registry();
        let store = store_with(ScriptedTransport::new()).await;

        assert!(registry.refresh("PC-9", &store).await.is_none());
        assert!(store.client().await.unwrap().transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_removed_mid_flight_is_discarded() {
        let registry = Arc::new(registry());
        registry.add("PC-8").await.unwrap();
        let store = Arc::new(
            store_with(
                ScriptedTransport::new()
                    .on("/issue/PC-8", issue_body("PC-8", &["Done"]))
                    .with_delay(Duration::from_millis(200)),
            )
            .await,
        );

        let refresh = {
            let registry = registry.clone();
            let store = store.clone();
            tokio::spawn(async move { registry.refresh("PC-8", &*store).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        registry.remove("PC-8").await.unwrap();

        assert!(refresh.await.unwrap().is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_all_is_independent_per_key() {
        let registry = registry();
        for key in ["PC-1", "PC-2", "PC-3"] {
            registry.add(key).await.unwrap();
        }
        let store = store_with(
            ScriptedTransport::new()
                .on("/issue/PC-1", issue_body("PC-1", &["Done", "Done", "Done", "Open"]))
                .on("/issue/PC-2", issue_body("PC-2", &[]))
                .with_delay(Duration::from_millis(20)),
        )
        .await;

        let updated = registry.refresh_all(&store).await;
        assert_eq!(updated.len(), 3);

        let list = registry.list().await;
        assert_eq!(list[0].percent(), 75);
        assert_eq!(list[1].display_text(), "PC-2 (0/0 Done)");
        assert_eq!(list[1].status_text(), "Loaded");
        assert_eq!(list[2].status_text(), "Error");
    }

    #[tokio::test]
    async fn test_watch_stops_during_slow_refresh() {
        let registry = registry();
        registry.add("PC-1").await.unwrap();
        let store = store_with(
            ScriptedTransport::new()
                .on("/issue/PC-1", issue_body("PC-1", &["Done"]))
                .with_delay(Duration::from_secs(30)),
        )
        .await;

        let (stop, stopped) = oneshot::channel::<()>();
        let started = std::time::Instant::now();
        let watch = registry.watch(&store, Duration::from_secs(60), async {
            let _ = stopped.await;
        });
        let interrupt = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = stop.send(());
        };

        let (rounds, ()) = tokio::join!(watch, interrupt);

        assert_eq!(rounds, 0);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(registry.get("PC-1").await.unwrap().is_loading());
    }

    #[tokio::test]
    async fn test_watch_refreshes_until_shutdown() {
        let registry = registry();
        registry.add("PC-1").await.unwrap();
        let store = store_with(
            ScriptedTransport::new().on("/issue/PC-1", issue_body("PC-1", &["Done", "Open"])),
        )
        .await;

        let rounds = registry
            .watch(
                &store,
                Duration::from_millis(10),
                tokio::time::sleep(Duration::from_millis(100)),
            )
            .await;

        assert!(rounds >= 2);
        assert_eq!(registry.get("PC-1").await.unwrap().percent(), 50);
    }

    #[tokio::test]
    async fn test_transitions_are_broadcast() {
        let events = Arc::new(EventManager::new());
        let mut receiver = events.subscribe();
        let registry = IssueRegistry::new(events);
        let store = store_with(
            ScriptedTransport::new().on("/issue/PC-1", issue_body("PC-1", &["Done"])),
        )
        .await;

        registry.add("PC-1").await.unwrap();
        registry.refresh("PC-1", &store).await.unwrap();
        registry.remove("PC-1").await.unwrap();

        let added = receiver.recv().await.unwrap();
        assert_eq!(added.event_type, RegistryEventType::Added);

        let updated = receiver.recv().await.unwrap();
        assert_eq!(updated.event_type, RegistryEventType::Updated);
        assert_eq!(updated.issue.unwrap().percent(), 100);

        let removed = receiver.recv().await.unwrap();
        assert_eq!(
            removed.event_type,
            RegistryEventType::Removed {
                key: "PC-1".to_string()
            }
        );
    }
}
