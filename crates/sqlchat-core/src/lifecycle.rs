use std::sync::atomic::{AtomicBool, Ordering};

use sqlchat_agent::{AgentReply, AgentRequest, GatewayError};
use sqlchat_types::{Message, MessageRole, StateEvent};

use crate::attachment::AttachmentGate;
use crate::store::ThreadStore;

/// Assistant text recorded when the agent call fails
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Sending,
}

/// Why a send request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty after trimming
    Blank,
    /// Another send from this controller is still in flight
    Busy,
}

/// Result of one `send` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Ignored(IgnoreReason),
    /// The agent answered; `message` is the appended assistant reply
    Replied { thread_id: String, message: Message },
    /// The agent call failed; `message` carries the apology text
    Failed { thread_id: String, message: Message },
    /// The originating thread was deleted before the reply arrived
    Discarded { thread_id: String },
}

impl SendOutcome {
    pub fn reply(&self) -> Option<&Message> {
        match self {
            SendOutcome::Replied { message, .. } | SendOutcome::Failed { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// In-flight guard for the send state machine: `Idle -> Sending -> Idle`
#[derive(Debug, Default)]
pub struct MessageLifecycle {
    sending: AtomicBool,
}

impl MessageLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        if self.sending.load(Ordering::Acquire) {
            LifecycleState::Sending
        } else {
            LifecycleState::Idle
        }
    }

    /// Enter `Sending`, or `None` if a send is already in flight.
    /// Dropping the guard returns to `Idle`.
    pub fn try_begin(&self) -> Option<SendGuard<'_>> {
        self.sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SendGuard { lifecycle: self })
    }
}

pub struct SendGuard<'a> {
    lifecycle: &'a MessageLifecycle,
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.sending.store(false, Ordering::Release);
    }
}

/// Everything decided before the agent is called
pub(crate) struct PreparedTurn {
    pub thread_id: String,
    pub request: AgentRequest,
    pub events: Vec<StateEvent>,
}

/// Optimistic half of a turn: make sure a thread is active, append the user
/// message (rewriting the title on the first one) and bind the pending
/// attachment to the request.
pub(crate) fn prepare_turn(
    store: &mut ThreadStore,
    gate: &mut AttachmentGate,
    query: &str,
) -> PreparedTurn {
    let mut events = Vec::new();

    let (thread, created) = store.active_or_create();
    let thread_id = thread.id().to_string();
    if created {
        events.push(StateEvent::ThreadCreated {
            thread_id: thread_id.clone(),
        });
        events.push(StateEvent::ActiveThreadChanged {
            thread_id: thread_id.clone(),
        });
    }

    let message = Message::user(query);
    let message_id = message.id.clone();
    if thread.push(message) {
        events.push(StateEvent::ThreadListChanged);
    }
    events.push(StateEvent::MessageAppended {
        thread_id: thread_id.clone(),
        message_id,
        role: MessageRole::User,
    });

    let mut request = AgentRequest::new(query);
    if let Some(attachment) = gate.take() {
        request = request.with_attachment(attachment);
    }

    PreparedTurn {
        thread_id,
        request,
        events,
    }
}

/// Settling half of a turn: exactly one assistant message lands in the
/// originating thread, whether the agent answered or not.
pub(crate) fn commit_reply(
    store: &mut ThreadStore,
    thread_id: &str,
    result: Result<AgentReply, GatewayError>,
) -> (SendOutcome, Vec<StateEvent>) {
    let (content, failed) = match result {
        Ok(reply) => (reply.text, false),
        Err(e) => {
            tracing::error!(thread_id = %thread_id, "Agent request failed: {}", e);
            (APOLOGY_MESSAGE.to_string(), true)
        }
    };

    let Some(thread) = store.get_mut(thread_id) else {
        tracing::warn!(
            thread_id = %thread_id,
            "Thread deleted while its request was in flight; dropping reply"
        );
        return (
            SendOutcome::Discarded {
                thread_id: thread_id.to_string(),
            },
            Vec::new(),
        );
    };

    let message = Message::assistant(content);
    thread.push(message.clone());

    let events = vec![StateEvent::MessageAppended {
        thread_id: thread_id.to_string(),
        message_id: message.id.clone(),
        role: MessageRole::Assistant,
    }];
    let thread_id = thread_id.to_string();
    let outcome = if failed {
        SendOutcome::Failed { thread_id, message }
    } else {
        SendOutcome::Replied { thread_id, message }
    };
    (outcome, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlchat_agent::Attachment;

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let lifecycle = MessageLifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Idle);

        let guard = lifecycle.try_begin().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Sending);
        assert!(lifecycle.try_begin().is_none());

        drop(guard);
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        assert!(lifecycle.try_begin().is_some());
    }

    #[test]
    fn test_prepare_turn_creates_thread_when_none_active() {
        let mut store = ThreadStore::new();
        let mut gate = AttachmentGate::new();

        let turn = prepare_turn(&mut store, &mut gate, "Show me the available tables");

        assert_eq!(store.active_id(), Some(turn.thread_id.as_str()));
        assert!(matches!(turn.events[0], StateEvent::ThreadCreated { .. }));
        assert!(turn.events.contains(&StateEvent::ThreadListChanged));
        assert_eq!(store.active().unwrap().title(), "Show me the available tables");
    }

    #[test]
    fn test_prepare_turn_binds_attachment_once() {
        let mut store = ThreadStore::new();
        store.create();
        let mut gate = AttachmentGate::new();
        gate.accept(Attachment::new("chinook.db", vec![1, 2])).unwrap();

        let turn = prepare_turn(&mut store, &mut gate, "List tables");

        assert_eq!(turn.request.attachment.unwrap().name, "chinook.db");
        assert!(gate.pending().is_none());
        assert_eq!(store.active().unwrap().messages()[0].content, "List tables");
    }

    #[test]
    fn test_commit_failure_appends_apology() {
        let mut store = ThreadStore::new();
        let id = store.create();

        let (outcome, events) = commit_reply(
            &mut store,
            &id,
            Err(GatewayError::Decode("missing field".into())),
        );

        assert!(matches!(outcome, SendOutcome::Failed { .. }));
        assert_eq!(outcome.reply().unwrap().content, APOLOGY_MESSAGE);
        assert_eq!(events.len(), 1);
        assert_eq!(store.get(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_commit_to_deleted_thread_is_discarded() {
        let mut store = ThreadStore::new();
        store.create();

        let (outcome, events) = commit_reply(&mut store, "gone", Ok(AgentReply::new("late")));

        assert_eq!(
            outcome,
            SendOutcome::Discarded {
                thread_id: "gone".to_string()
            }
        );
        assert!(events.is_empty());
    }
}
