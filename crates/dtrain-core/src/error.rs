use dtrain_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("unable to reach remote-shell daemon on peer {addr}:{port} before the deadline")]
    Connectivity { addr: String, port: u16 },
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("kill failed: {0}")]
    Kill(String),
    #[error("missing program")]
    MissingProgram,
    #[error("cluster info unavailable: {0}")]
    ClusterInfo(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("DET_RESOURCES_ID is not set; worker cannot report daemon readiness")]
    MissingResourcesId,
    #[error("coordination service call failed: {0}")]
    Coordination(String),
    #[error("io error: {0}")]
    Io(String),
}

impl LaunchError {
    /// `true` for a peer that never answered before the readiness deadline.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, LaunchError::Connectivity { .. })
    }
}

impl From<std::io::Error> for LaunchError {
    fn from(e: std::io::Error) -> Self {
        LaunchError::Io(e.to_string())
    }
}
