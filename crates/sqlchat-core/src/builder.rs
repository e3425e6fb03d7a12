use std::sync::Arc;

use sqlchat_agent::AgentGateway;
use sqlchat_persist::{KeyValueStore, Persistence};
use sqlchat_types::ControllerConfig;

use crate::controller::ConversationController;
use crate::error::{CoreError, Result};
use crate::observer::StateObserver;

pub struct ConversationControllerBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    gateway: Option<Arc<dyn AgentGateway>>,
    config: ControllerConfig,
    observers: Vec<Arc<dyn StateObserver>>,
}

impl ConversationControllerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            gateway: None,
            config: ControllerConfig::default(),
            observers: Vec::new(),
        }
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn AgentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Registered before the initial load, so it sees nothing from it;
    /// use [`ConversationController::subscribe`] for later additions.
    pub fn observer(mut self, observer: Arc<dyn StateObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Result<ConversationController> {
        let store = self.store.ok_or(CoreError::MissingComponent("store"))?;
        let gateway = self.gateway.ok_or(CoreError::MissingComponent("gateway"))?;

        let persistence = Persistence::new(store, self.config.storage_key.clone());
        Ok(ConversationController::open(
            persistence,
            gateway,
            self.config,
            self.observers,
        ))
    }
}

impl Default for ConversationControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
