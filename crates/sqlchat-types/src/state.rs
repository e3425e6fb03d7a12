use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::thread::Thread;

/// Persisted root: every thread plus the id of the active one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub threads: BTreeMap<String, Thread>,
    pub current_thread_id: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_thread(&self) -> Option<&Thread> {
        self.current_thread_id
            .as_ref()
            .and_then(|id| self.threads.get(id))
    }

    /// `true` when the current id points at an existing thread, or there are
    /// no threads and no current id.
    pub fn is_consistent(&self) -> bool {
        match &self.current_thread_id {
            Some(id) => self.threads.contains_key(id),
            None => self.threads.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn test_wire_shape() {
        let mut thread = Thread::new("1700000000000");
        thread.push(Message::user("Show me the available tables"));

        let mut state = ConversationState::new();
        state.current_thread_id = Some(thread.id().to_string());
        state.threads.insert(thread.id().to_string(), thread);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentThreadId"], "1700000000000");
        let stored = &json["threads"]["1700000000000"];
        assert_eq!(stored["title"], "Show me the available tables");
        assert_eq!(stored["messages"][0]["role"], "user");
    }

    #[test]
    fn test_consistency() {
        let mut state = ConversationState::new();
        assert!(state.is_consistent());

        state.threads.insert("1".into(), Thread::new("1"));
        assert!(!state.is_consistent());

        state.current_thread_id = Some("2".into());
        assert!(!state.is_consistent());

        state.current_thread_id = Some("1".into());
        assert!(state.is_consistent());
        assert_eq!(state.current_thread().map(Thread::id), Some("1"));
    }
}
