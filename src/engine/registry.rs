//! Participant registry
//!
//! Tracks which participant ids are currently reachable and the delivery
//! handle for each. One handle per id: a later registration for the same
//! id replaces the earlier one, so there is no multi-device fan-out per
//! participant.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::sink::ClientSink;

/// Registry of currently reachable participants
///
/// Thread-safe via `RwLock`. Broadcasts iterate a point-in-time snapshot,
/// so concurrent register/unregister calls never disturb an in-flight
/// fan-out.
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Arc<dyn ClientSink>>>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the delivery handle for a participant
    ///
    /// Returns true if an earlier registration was replaced.
    pub async fn register(&self, participant_id: &str, sink: Arc<dyn ClientSink>) -> bool {
        let mut clients = self.clients.write().await;
        let replaced = clients.insert(participant_id.to_string(), sink).is_some();

        tracing::info!(
            participant = participant_id,
            replaced = replaced,
            online = clients.len(),
            "Client registered"
        );

        replaced
    }

    /// Remove a participant's registration
    ///
    /// Removing an absent id is a no-op, not an error. Returns true if a
    /// registration was actually removed.
    pub async fn unregister(&self, participant_id: &str) -> bool {
        let mut clients = self.clients.write().await;
        let removed = clients.remove(participant_id).is_some();

        if removed {
            tracing::info!(
                participant = participant_id,
                online = clients.len(),
                "Client unregistered"
            );
        }

        removed
    }

    /// Point-in-time snapshot of all registrations
    ///
    /// Handles are `Arc`-cloned, so the snapshot stays valid while
    /// concurrent mutations proceed. Iteration order is container order;
    /// no recipient ordering is guaranteed.
    pub async fn snapshot(&self) -> Vec<(String, Arc<dyn ClientSink>)> {
        self.clients
            .read()
            .await
            .iter()
            .map(|(id, sink)| (id.clone(), Arc::clone(sink)))
            .collect()
    }

    /// Sorted list of currently registered participant ids
    pub async fn participants(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.clients.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether a participant is currently registered
    pub async fn contains(&self, participant_id: &str) -> bool {
        self.clients.read().await.contains_key(participant_id)
    }

    /// Number of registered participants
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Whether no participants are registered
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;

    fn sink() -> Arc<dyn ClientSink> {
        let (sink, _rx) = ChannelSink::bounded(4);
        // Receiver dropped: fine for registry-only tests
        Arc::new(sink)
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let registry = ClientRegistry::new();

        assert!(!registry.register("alice", sink()).await);
        assert!(registry.contains("alice").await);
        assert_eq!(registry.len().await, 1);

        assert!(registry.unregister("alice").await);
        assert!(!registry.contains("alice").await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_replaces() {
        let registry = ClientRegistry::new();

        registry.register("alice", sink()).await;
        // Last registration wins; still one entry
        assert!(registry.register("alice", sink()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_absent_is_noop() {
        let registry = ClientRegistry::new();
        assert!(!registry.unregister("ghost").await);
    }

    #[tokio::test]
    async fn test_participants_sorted() {
        let registry = ClientRegistry::new();
        registry.register("karen", sink()).await;
        registry.register("alice", sink()).await;
        registry.register("bob", sink()).await;

        assert_eq!(registry.participants().await, vec!["alice", "bob", "karen"]);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_last_operation() {
        let registry = ClientRegistry::new();
        registry.register("alice", sink()).await;
        registry.register("bob", sink()).await;
        registry.unregister("alice").await;

        let snap = registry.snapshot().await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].0, "bob");
    }

    #[tokio::test]
    async fn test_snapshot_survives_concurrent_mutation() {
        let registry = ClientRegistry::new();
        registry.register("alice", sink()).await;

        let snap = registry.snapshot().await;
        registry.unregister("alice").await;

        // The snapshot is a consistent copy, unaffected by the removal
        assert_eq!(snap.len(), 1);
    }
}
