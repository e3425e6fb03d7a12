//! # SQLChat
//!
//! Conversation manager for a natural-language-to-SQL agent.
//!
//! SQLChat keeps any number of chat threads, sends each user question to a
//! remote agent (optionally together with a SQLite database file), appends
//! the agent's answer to the thread the question came from, and snapshots
//! everything to durable storage so a restart picks up where you left off.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlchat::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = HttpAgentGateway::builder()
//!         .endpoint("http://127.0.0.1:8000/query")
//!         .build()?;
//!
//!     let chat = ConversationController::builder()
//!         .store(Arc::new(FileStore::open(".sqlchat")?))
//!         .gateway(Arc::new(gateway))
//!         .build()?;
//!
//!     let outcome = chat.send("How many customers are from Brazil?").await;
//!     if let Some(reply) = outcome.reply() {
//!         println!("{}", reply.content);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`sqlchat-types`**: messages, threads, the persisted state and change events
//! - **`sqlchat-persist`**: key-value storage backends and the state snapshot codec
//! - **`sqlchat-agent`**: the agent port and its multipart HTTP implementation
//! - **`sqlchat-core`**: thread store, attachment gate, send lifecycle and the controller
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use sqlchat_types::{
    next_message_id, next_thread_id, ControllerConfig, ConversationState, Message, MessageRole,
    StateEvent, Thread, ThreadSummary, DEFAULT_THREAD_TITLE, TITLE_MAX_CHARS,
};

pub use sqlchat_persist::{FileStore, KeyValueStore, MemoryStore, PersistError, Persistence};

pub use sqlchat_agent::{
    AgentGateway, AgentReply, AgentRequest, Attachment, GatewayError, HttpAgentGateway,
    HttpAgentGatewayBuilder,
};

pub use sqlchat_core::{
    spawn_autosave, AttachmentError, AttachmentGate, ChannelObserver, ConversationController,
    ConversationControllerBuilder, CoreError, DeleteResult, IgnoreReason, IntervalTicker,
    LifecycleState, ManualTicker, PendingAttachment, SendOutcome, StateObserver, TickHandle,
    ThreadStore, Ticker, APOLOGY_MESSAGE, DATABASE_EXTENSION, MAX_ATTACHMENT_BYTES,
};
