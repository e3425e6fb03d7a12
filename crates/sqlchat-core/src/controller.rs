use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sqlchat_agent::{AgentGateway, Attachment};
use sqlchat_persist::Persistence;
use sqlchat_types::{ConversationState, ControllerConfig, Message, StateEvent, Thread, ThreadSummary};

use crate::attachment::{AttachmentGate, PendingAttachment};
use crate::error::{CoreError, Result};
use crate::lifecycle::{self, IgnoreReason, LifecycleState, MessageLifecycle, SendOutcome};
use crate::observer::{Observers, StateObserver};
use crate::store::{DeleteResult, ThreadStore};

struct Inner {
    store: ThreadStore,
    gate: AttachmentGate,
}

/// Owns the conversation state and drives every mutation of it
///
/// Each mutation runs under a short lock, is snapshotted to storage before the
/// lock is released, and is then announced to observers. The lock is never
/// held across the agent call, so threads can be switched, created or deleted
/// while a send is outstanding.
pub struct ConversationController {
    inner: Mutex<Inner>,
    lifecycle: MessageLifecycle,
    persistence: Persistence,
    gateway: Arc<dyn AgentGateway>,
    observers: Observers,
    config: ControllerConfig,
}

impl ConversationController {
    pub fn builder() -> crate::builder::ConversationControllerBuilder {
        crate::builder::ConversationControllerBuilder::new()
    }

    /// Restore from storage, or start with a single fresh thread
    pub(crate) fn open(
        persistence: Persistence,
        gateway: Arc<dyn AgentGateway>,
        config: ControllerConfig,
        observers: Vec<Arc<dyn StateObserver>>,
    ) -> Self {
        let (mut store, repaired) = match persistence.load() {
            Some(state) => ThreadStore::from_state(state),
            None => (ThreadStore::new(), false),
        };

        if store.is_empty() {
            let id = store.create();
            tracing::info!(thread_id = %id, "No saved conversations; starting a new thread");
            persistence.save(store.state());
        } else {
            tracing::info!(
                threads = store.len(),
                current = ?store.active_id(),
                "Restored conversations"
            );
            if repaired {
                persistence.save(store.state());
            }
        }

        let registry = Observers::default();
        for observer in observers {
            registry.add(observer);
        }

        Self {
            inner: Mutex::new(Inner {
                store,
                gate: AttachmentGate::new(),
            }),
            lifecycle: MessageLifecycle::new(),
            persistence,
            gateway,
            observers: registry,
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) {
        self.observers.add(observer);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: &[StateEvent]) {
        self.observers.notify(events);
    }

    // ---- queries ----

    pub fn current_thread_id(&self) -> Option<String> {
        self.lock().store.active_id().map(str::to_string)
    }

    /// Messages of the active thread, read straight from the thread itself
    pub fn active_messages(&self) -> Vec<Message> {
        self.lock()
            .store
            .active()
            .map(|t| t.messages().to_vec())
            .unwrap_or_default()
    }

    pub fn thread(&self, id: &str) -> Option<Thread> {
        self.lock().store.get(id).cloned()
    }

    /// Thread list, newest first
    pub fn threads(&self) -> Vec<ThreadSummary> {
        let inner = self.lock();
        let active = inner.store.active_id();
        inner
            .store
            .list()
            .map(|t| t.summary(Some(t.id()) == active))
            .collect()
    }

    pub fn snapshot(&self) -> ConversationState {
        self.lock().store.state().clone()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_sending(&self) -> bool {
        self.lifecycle.state() == LifecycleState::Sending
    }

    // ---- thread operations ----

    /// "New chat": create an empty thread and make it active
    pub fn new_thread(&self) -> String {
        let id = {
            let mut inner = self.lock();
            let id = inner.store.create();
            self.persistence.save(inner.store.state());
            id
        };
        tracing::info!(thread_id = %id, "Created thread");
        self.emit(&[
            StateEvent::ThreadCreated {
                thread_id: id.clone(),
            },
            StateEvent::ActiveThreadChanged {
                thread_id: id.clone(),
            },
        ]);
        id
    }

    pub fn switch_thread(&self, id: &str) -> Result<()> {
        {
            let mut inner = self.lock();
            inner.store.switch(id)?;
            self.persistence.save(inner.store.state());
        }
        tracing::debug!(thread_id = %id, "Switched thread");
        self.emit(&[StateEvent::ActiveThreadChanged {
            thread_id: id.to_string(),
        }]);
        Ok(())
    }

    /// Delete a thread. The store always ends up with an active thread.
    pub fn delete_thread(&self, id: &str) -> Result<DeleteResult> {
        let (result, active_changed) = {
            let mut inner = self.lock();
            let was_active = inner.store.active_id() == Some(id);
            let result = inner.store.delete(id)?;
            self.persistence.save(inner.store.state());
            (result, was_active)
        };
        tracing::info!(
            thread_id = %id,
            active = %result.active,
            recreated = result.recreated.is_some(),
            "Deleted thread"
        );

        let mut events = vec![StateEvent::ThreadDeleted {
            thread_id: result.deleted.clone(),
        }];
        if let Some(fresh) = &result.recreated {
            events.push(StateEvent::ThreadCreated {
                thread_id: fresh.clone(),
            });
        }
        if active_changed {
            events.push(StateEvent::ActiveThreadChanged {
                thread_id: result.active.clone(),
            });
        }
        self.emit(&events);
        Ok(result)
    }

    /// Snapshot regardless of whether anything changed; used by autosave
    pub fn save_now(&self) -> bool {
        let inner = self.lock();
        self.persistence.save(inner.store.state())
    }

    // ---- attachments ----

    /// Stage a database file for the next send. A rejected file also drops
    /// whatever was pending.
    pub fn attach(&self, attachment: Attachment) -> Result<()> {
        self.lock().gate.accept(attachment).map_err(|e| {
            tracing::debug!("Attachment rejected: {}", e);
            CoreError::from(e)
        })
    }

    pub fn clear_attachment(&self) {
        self.lock().gate.clear();
    }

    pub fn pending_attachment(&self) -> Option<PendingAttachment> {
        self.lock().gate.pending()
    }

    // ---- send ----

    /// Run one conversational turn
    ///
    /// Blank input and sends issued while another is in flight are ignored.
    /// Otherwise the user message is appended and saved before the agent is
    /// called, and exactly one assistant message (the answer, or an apology
    /// if the call failed) is appended to the same thread afterwards, even if
    /// the user has switched to another thread in the meantime.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let query = text.trim();
        if query.is_empty() {
            return SendOutcome::Ignored(IgnoreReason::Blank);
        }

        let Some(guard) = self.lifecycle.try_begin() else {
            tracing::debug!("Send ignored: a request is already in flight");
            return SendOutcome::Ignored(IgnoreReason::Busy);
        };
        self.emit(&[StateEvent::SendStateChanged { sending: true }]);

        let turn = {
            let mut inner = self.lock();
            let Inner { store, gate } = &mut *inner;
            let turn = lifecycle::prepare_turn(store, gate, query);
            self.persistence.save(store.state());
            turn
        };
        self.emit(&turn.events);

        tracing::info!(
            thread_id = %turn.thread_id,
            has_attachment = turn.request.attachment.is_some(),
            "Sending query to agent"
        );
        let result = self.gateway.ask(turn.request).await;

        let (outcome, events) = {
            let mut inner = self.lock();
            let (outcome, events) = lifecycle::commit_reply(&mut inner.store, &turn.thread_id, result);
            if !events.is_empty() {
                self.persistence.save(inner.store.state());
            }
            (outcome, events)
        };
        self.emit(&events);

        // Idle is announced before the guard is released
        self.emit(&[StateEvent::SendStateChanged { sending: false }]);
        drop(guard);
        outcome
    }
}
