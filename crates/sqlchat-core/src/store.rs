use std::cmp::Ordering;

use sqlchat_types::{next_thread_id, ConversationState, Thread};

use crate::error::{CoreError, Result};

/// Owns the thread map and the active-thread pointer
///
/// Whenever at least one thread exists the active id points at one of them.
/// The store never persists anything itself; the controller snapshots after
/// each mutation.
#[derive(Debug, Clone, Default)]
pub struct ThreadStore {
    state: ConversationState,
}

/// What a delete resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: String,
    /// Active thread after the delete
    pub active: String,
    /// Set when the deleted thread was the last one and a fresh thread replaced it
    pub recreated: Option<String>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a loaded state. Entries filed under a key other than their own
    /// id are re-keyed (or dropped if that id is taken) and a missing or
    /// dangling active id is pointed at the newest thread. The flag is `true`
    /// when anything had to be repaired.
    pub fn from_state(state: ConversationState) -> (Self, bool) {
        let mut store = Self { state };
        let rekeyed = store.rekey();
        let repointed = store.repair_active();
        (store, rekeyed || repointed)
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.threads.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Thread> {
        self.state.threads.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Thread> {
        self.state.threads.get_mut(id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.current_thread_id.as_deref()
    }

    pub fn active(&self) -> Option<&Thread> {
        self.state.current_thread()
    }

    /// Insert an empty "New Chat" thread and make it active
    pub fn create(&mut self) -> String {
        let id = next_thread_id();
        self.state.threads.insert(id.clone(), Thread::new(id.clone()));
        self.state.current_thread_id = Some(id.clone());
        id
    }

    /// The active thread, creating one first if there is none.
    /// The flag is `true` when a thread was created.
    pub(crate) fn active_or_create(&mut self) -> (&mut Thread, bool) {
        let has_active = self
            .active_id()
            .map_or(false, |id| self.state.threads.contains_key(id));
        if !has_active {
            self.create();
        }
        let created = !has_active;
        let id = self.state.current_thread_id.clone().unwrap_or_default();
        let thread = self
            .state
            .threads
            .entry(id.clone())
            .or_insert_with(|| Thread::new(id));
        (thread, created)
    }

    pub fn switch(&mut self, id: &str) -> Result<()> {
        if !self.state.threads.contains_key(id) {
            return Err(CoreError::ThreadNotFound(id.to_string()));
        }
        self.state.current_thread_id = Some(id.to_string());
        Ok(())
    }

    /// Remove a thread; if it was active, fall back to the most recently
    /// created survivor, or to a fresh thread when none survive.
    pub fn delete(&mut self, id: &str) -> Result<DeleteResult> {
        if self.state.threads.remove(id).is_none() {
            return Err(CoreError::ThreadNotFound(id.to_string()));
        }

        let was_active = self.active_id() == Some(id);
        let mut recreated = None;
        if was_active {
            match self.most_recent_id() {
                Some(next) => self.state.current_thread_id = Some(next),
                None => recreated = Some(self.create()),
            }
        }

        let active = self.state.current_thread_id.clone().unwrap_or_default();
        Ok(DeleteResult {
            deleted: id.to_string(),
            active,
            recreated,
        })
    }

    /// Threads newest first. The iterator can be cloned to restart it.
    pub fn list(&self) -> impl Iterator<Item = &Thread> + Clone + '_ {
        let mut threads: Vec<&Thread> = self.state.threads.values().collect();
        threads.sort_by(|a, b| by_recency(a, b));
        threads.into_iter()
    }

    fn most_recent_id(&self) -> Option<String> {
        self.list().next().map(|t| t.id().to_string())
    }

    fn rekey(&mut self) -> bool {
        if self.state.threads.iter().all(|(key, t)| key == t.id()) {
            return false;
        }

        let entries = std::mem::take(&mut self.state.threads);
        let (matching, misfiled): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|(key, t)| key == t.id());
        self.state.threads.extend(matching);

        for (key, thread) in misfiled {
            let id = thread.id().to_string();
            if self.state.threads.contains_key(&id) {
                tracing::warn!(key = %key, thread_id = %id, "Dropping duplicate thread from loaded state");
                continue;
            }
            tracing::warn!(key = %key, thread_id = %id, "Re-keying misfiled thread from loaded state");
            if self.state.current_thread_id.as_deref() == Some(key.as_str()) {
                self.state.current_thread_id = Some(id.clone());
            }
            self.state.threads.insert(id, thread);
        }
        true
    }

    fn repair_active(&mut self) -> bool {
        if self.state.is_consistent() {
            return false;
        }
        let fallback = self.most_recent_id();
        tracing::warn!(
            current = ?self.state.current_thread_id,
            fallback = ?fallback,
            "Active thread missing from loaded state"
        );
        self.state.current_thread_id = fallback;
        true
    }
}

/// Newest first; equal timestamps fall back to the id, which is time-ordered too
fn by_recency(a: &Thread, b: &Thread) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| compare_ids(b.id(), a.id()))
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
