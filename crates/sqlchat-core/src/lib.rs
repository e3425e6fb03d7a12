pub mod attachment;
pub mod builder;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod observer;
pub mod store;
pub mod ticker;

pub use attachment::{
    AttachmentError, AttachmentGate, PendingAttachment, DATABASE_EXTENSION, MAX_ATTACHMENT_BYTES,
};
pub use builder::ConversationControllerBuilder;
pub use controller::ConversationController;
pub use error::CoreError;
pub use lifecycle::{IgnoreReason, LifecycleState, MessageLifecycle, SendOutcome, APOLOGY_MESSAGE};
pub use observer::{ChannelObserver, StateObserver};
pub use store::{DeleteResult, ThreadStore};
pub use ticker::{spawn_autosave, IntervalTicker, ManualTicker, TickHandle, Ticker};
