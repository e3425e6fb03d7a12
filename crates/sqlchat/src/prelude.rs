//! Prelude module for convenient imports
//!
//! ```rust
//! use sqlchat::prelude::*;
//! ```

pub use crate::{
    spawn_autosave, AgentGateway, Attachment, ChannelObserver, ConversationController,
    ControllerConfig, FileStore, HttpAgentGateway, IntervalTicker, KeyValueStore, MemoryStore,
    Message, MessageRole, SendOutcome, StateEvent, StateObserver, ThreadSummary,
};
