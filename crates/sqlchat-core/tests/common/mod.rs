#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlchat_agent::{AgentGateway, AgentReply, AgentRequest, GatewayError};
use sqlchat_core::{ConversationController, StateObserver};
use sqlchat_persist::MemoryStore;
use sqlchat_types::{ConversationState, StateEvent};
use tokio::sync::{oneshot, Notify};

/// Gateway double: replays queued results (echoing the query when the queue
/// is empty), records every request, and can hold a call open until released.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<AgentReply, GatewayError>>>,
    requests: Mutex<Vec<AgentRequest>>,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
    pub started: Notify,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(AgentReply::new(text)));
    }

    pub fn fail(&self, error: GatewayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Make the next call wait until the returned sender fires
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.lock().unwrap() = Some(rx);
        tx
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn ask(&self, request: AgentRequest) -> Result<AgentReply, GatewayError> {
        let query = request.query.clone();
        self.requests.lock().unwrap().push(request);
        self.started.notify_one();

        let hold = self.hold.lock().unwrap().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(AgentReply::new(format!("echo: {}", query))))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StateEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<StateEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl StateObserver for RecordingObserver {
    fn on_event(&self, event: &StateEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn controller(store: &Arc<MemoryStore>, gateway: &Arc<ScriptedGateway>) -> ConversationController {
    ConversationController::builder()
        .store(store.clone())
        .gateway(gateway.clone())
        .build()
        .unwrap()
}

/// What is currently on "disk" for the default key
pub fn stored_state(store: &MemoryStore) -> ConversationState {
    use sqlchat_persist::KeyValueStore;
    let raw = store
        .get(sqlchat_types::config::DEFAULT_STORAGE_KEY)
        .unwrap()
        .expect("state should be stored");
    serde_json::from_str(&raw).unwrap()
}
