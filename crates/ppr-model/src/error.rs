use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown schema epoch tag: {0}")]
    UnknownEpoch(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
