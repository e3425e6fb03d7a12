use thiserror::Error;

use crate::attachment::AttachmentError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error("{0} is required")]
    MissingComponent(&'static str),
}

pub type Result<T> = std::result::Result<T, CoreError>;
