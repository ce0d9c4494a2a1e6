use dtrain_core::LaunchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("control plane rejected daemon notification: {0}")]
    Rejected(String),

    #[error("invalid master endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<NotifyError> for LaunchError {
    fn from(e: NotifyError) -> Self {
        LaunchError::Coordination(e.to_string())
    }
}
