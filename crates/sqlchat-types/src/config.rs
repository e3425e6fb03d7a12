use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_STORAGE_KEY: &str = "sqlchat_conversations";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Key the whole conversation state is written under
    pub storage_key: String,
    /// Period of the safety-net snapshot
    pub autosave_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_interval: Duration::from_secs(30),
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }
}
