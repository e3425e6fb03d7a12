use async_trait::async_trait;

use crate::error::Result;

/// Boundary to the remote query agent
///
/// One call is one request: implementations do not retry.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn ask(&self, request: AgentRequest) -> Result<AgentReply>;
}

#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub query: String,
    pub attachment: Option<Attachment>,
}

impl AgentRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
}

impl AgentReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A database file riding along with one query
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Raw bytes can be tens of megabytes; keep them out of logs
impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("byte_size", &self.byte_size())
            .finish()
    }
}
