pub mod config;
pub mod events;
pub mod ids;
pub mod message;
pub mod state;
pub mod thread;

pub use config::ControllerConfig;
pub use events::StateEvent;
pub use ids::{next_message_id, next_thread_id};
pub use message::{Message, MessageRole};
pub use state::ConversationState;
pub use thread::{Thread, ThreadSummary, DEFAULT_THREAD_TITLE, TITLE_MAX_CHARS};
