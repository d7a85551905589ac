//! Scoped message history
//!
//! Append-only, in-memory logs of delivered messages, partitioned by
//! scope. User and group histories live in physically separate maps even
//! though both are keyed by a string id: a group id and a user id may
//! coincide and must never be conflated.
//!
//! Per-key logs are individually locked, so concurrent appends to
//! different keys do not contend; appends to the same key serialize and
//! no update is lost.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::message::{Message, Scope};

type Log = Arc<RwLock<Vec<Message>>>;

/// In-memory, per-scope message history
///
/// Order within a log is append order (store time), not wall-clock
/// timestamp order; two racing senders land in whichever order their
/// appends win the per-key lock.
pub struct HistoryStore {
    users: RwLock<HashMap<String, Log>>,
    groups: RwLock<HashMap<String, Log>>,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
        }
    }

    fn partition(&self, scope: Scope) -> &RwLock<HashMap<String, Log>> {
        match scope {
            Scope::User => &self.users,
            Scope::Group => &self.groups,
        }
    }

    /// Append a message to the log for (scope, scope_id), creating the
    /// log if absent
    pub async fn append(&self, scope: Scope, scope_id: &str, message: Message) {
        let log = self.log_for(scope, scope_id).await;
        let mut entries = log.write().await;
        entries.push(message);

        tracing::debug!(
            scope = %scope,
            id = scope_id,
            len = entries.len(),
            "Message appended to history"
        );
    }

    /// Full ordered log for (scope, scope_id)
    ///
    /// Returns a point-in-time copy, not a live view; an untouched key
    /// yields an empty Vec, never an error.
    pub async fn fetch(&self, scope: Scope, scope_id: &str) -> Vec<Message> {
        let partition = self.partition(scope).read().await;

        match partition.get(scope_id) {
            Some(log) => log.read().await.clone(),
            None => Vec::new(),
        }
    }

    /// Ensure an (empty) group log exists
    ///
    /// Idempotent; returns true if the log was newly created.
    pub async fn create_group(&self, group_id: &str) -> bool {
        let mut groups = self.groups.write().await;
        let created = !groups.contains_key(group_id);

        if created {
            groups.insert(group_id.to_string(), Arc::new(RwLock::new(Vec::new())));
            tracing::info!(group = group_id, "Group created");
        }

        created
    }

    /// Get or create the shared log handle for a key
    ///
    /// Fast path takes only the partition read lock; the write lock is
    /// taken just long enough to insert a missing entry.
    async fn log_for(&self, scope: Scope, scope_id: &str) -> Log {
        let partition = self.partition(scope);

        if let Some(log) = partition.read().await.get(scope_id) {
            return Arc::clone(log);
        }

        let mut map = partition.write().await;
        Arc::clone(
            map.entry(scope_id.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(Vec::new()))),
        )
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
