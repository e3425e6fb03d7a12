pub mod error;
pub mod http;
pub mod traits;

pub use error::GatewayError;
pub use http::{HttpAgentGateway, HttpAgentGatewayBuilder};
pub use traits::{AgentGateway, AgentReply, AgentRequest, Attachment};
