use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

pub const DEFAULT_THREAD_TITLE: &str = "New Chat";

/// Titles taken from the first message are cut to this many characters
pub const TITLE_MAX_CHARS: usize = 30;

const TITLE_ELLIPSIS: &str = "...";

/// A named conversation: an append-only, send-ordered list of messages
///
/// The title starts as [`DEFAULT_THREAD_TITLE`] and is rewritten exactly once,
/// when the first message arrives. Messages can only be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    id: String,
    title: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_created_at(id, Utc::now())
    }

    pub fn with_created_at(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_THREAD_TITLE.to_string(),
            messages: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message. Returns `true` when this was the first message and
    /// the title was rewritten from it.
    pub fn push(&mut self, message: Message) -> bool {
        let first = self.messages.is_empty();
        if first {
            self.title = title_from(&message.content);
        }
        self.messages.push(message);
        first
    }

    pub fn summary(&self, is_active: bool) -> ThreadSummary {
        ThreadSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            message_count: self.messages.len(),
            is_active,
        }
    }
}

/// Title derived from a first message: at most [`TITLE_MAX_CHARS`] characters,
/// followed by an ellipsis when the content was longer.
pub fn title_from(content: &str) -> String {
    match content.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TITLE_ELLIPSIS),
        None => content.to_string(),
    }
}

/// Read-only projection of a thread for list views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub is_active: bool,
}
