use serde::{Deserialize, Serialize};

use crate::message::MessageRole;

/// State-changed notifications emitted by the conversation controller
///
/// Presenters subscribe to these and redraw; the core never renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    /// A thread was added to the store
    ThreadCreated {
        thread_id: String,
    },

    /// A thread and all of its messages were removed
    ThreadDeleted {
        thread_id: String,
    },

    /// A different thread is now current
    ActiveThreadChanged {
        thread_id: String,
    },

    /// Thread list projection is stale (e.g. a title was rewritten)
    ThreadListChanged,

    /// A message was appended to a thread, not necessarily the active one
    MessageAppended {
        thread_id: String,
        message_id: String,
        role: MessageRole,
    },

    /// The send lifecycle entered or left the in-flight state
    SendStateChanged {
        sending: bool,
    },
}
