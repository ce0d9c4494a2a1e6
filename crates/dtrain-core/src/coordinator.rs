use std::{fs, path::PathBuf};

use async_trait::async_trait;
use dtrain_model::ClusterDescriptor;
use tracing::debug;

use crate::LaunchError;

/// Control-plane endpoint a worker reports to once its daemon is up.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Single notification; callers do not retry.
    async fn notify_daemon_ready(
        &self,
        descriptor: &ClusterDescriptor,
        resources_id: &str,
    ) -> Result<(), LaunchError>;
}

/// Where the cluster assignment comes from.
pub trait ClusterSource: Send + Sync {
    fn load(&self) -> Result<ClusterDescriptor, LaunchError>;
}

/// Reads the descriptor from the JSON document the control plane mounts into the container.
#[derive(Debug, Clone)]
pub struct FileClusterSource {
    path: PathBuf,
}

impl FileClusterSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClusterSource for FileClusterSource {
    fn load(&self) -> Result<ClusterDescriptor, LaunchError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| LaunchError::ClusterInfo(format!("{}: {e}", self.path.display())))?;
        let descriptor = ClusterDescriptor::from_json(&raw)?;
        debug!(
            target: "dtrain.core.source",
            path = %self.path.display(),
            allocation = %descriptor.allocation_id,
            "cluster descriptor loaded"
        );
        Ok(descriptor)
    }
}
