use std::sync::Arc;

use sqlchat_types::ConversationState;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Whole-state snapshots of a [`ConversationState`] under a single key
///
/// `save`/`load` never fail: faults are logged, a write failure leaves the
/// in-memory state authoritative, and an unreadable entry is purged so the
/// next start does not trip over it again.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Serialize and overwrite the stored snapshot
    pub fn try_save(&self, state: &ConversationState) -> Result<()> {
        let text = serde_json::to_string(state)?;
        self.store.set(&self.key, &text)
    }

    /// Returns `true` if the snapshot was written
    pub fn save(&self, state: &ConversationState) -> bool {
        match self.try_save(state) {
            Ok(()) => {
                tracing::debug!(
                    key = %self.key,
                    threads = state.threads.len(),
                    "Conversation snapshot saved"
                );
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, "Failed to save conversation snapshot: {}", e);
                false
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<ConversationState>> {
        match self.store.get(&self.key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Load the stored snapshot, or `None` if it is absent or unreadable
    pub fn load(&self) -> Option<ConversationState> {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    "Discarding unreadable conversation snapshot: {}",
                    e
                );
                if let Err(e) = self.store.remove(&self.key) {
                    tracing::error!(key = %self.key, "Failed to purge snapshot: {}", e);
                }
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}
