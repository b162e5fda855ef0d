//! Broadcasting of registry state transitions

use tokio::sync::broadcast;

use crate::events::RegistryEvent;

/// Fans registry events out to any number of subscribers (the UI layer)
pub struct EventManager {
    event_tx: broadcast::Sender<RegistryEvent>,
}

impl EventManager {
    /// Create a new event manager with a broadcast channel
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.event_tx.subscribe()
    }

    /// Fire-and-forget; having no subscribers is not an error
    pub fn emit(&self, event: RegistryEvent) {
        if let Err(e) = self.event_tx.send(event) {
            tracing::trace!("No subscribers for registry event: {:?}", e.0.event_type);
        }
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegistryEventType;
    use jirawidget_core::models::TrackedIssue;

    #[test]
    fn test_emit_without_subscribers() {
        let manager = EventManager::new();
        manager.emit(RegistryEvent::cleared());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let manager = EventManager::new();
        let mut receiver1 = manager.subscribe();
        let mut receiver2 = manager.subscribe();

        manager.emit(RegistryEvent::added(TrackedIssue::loading("PC-1")));

        let received1 = receiver1.recv().await.unwrap();
        let received2 = receiver2.recv().await.unwrap();
        assert_eq!(received1.event_type, RegistryEventType::Added);
        assert_eq!(received2.event_type, RegistryEventType::Added);
    }
}
