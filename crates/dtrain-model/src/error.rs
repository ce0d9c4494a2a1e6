use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid cluster descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("failed to decode cluster descriptor: {0}")]
    Decode(#[from] serde_json::Error),
}
