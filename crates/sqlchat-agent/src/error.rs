use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Agent returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed agent response: {0}")]
    Decode(String),

    #[error("Gateway configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
