use std::sync::Arc;

use dtrain_model::ExitCode;
use tracing::{info, instrument};

use crate::{ClusterSource, LaunchConfig, LaunchDeps, LaunchError, Orchestrator};

/// Entry point of a launch on one node.
pub struct RoleController {
    cfg: LaunchConfig,
    source: Arc<dyn ClusterSource>,
    deps: LaunchDeps,
}

impl RoleController {
    pub fn new(cfg: LaunchConfig, source: Arc<dyn ClusterSource>, deps: LaunchDeps) -> Self {
        Self { cfg, source, deps }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.cfg
    }

    /// Launch `entrypoint` in the role this node was assigned.
    ///
    /// Returns the exit code of the supervised process unchanged, non-zero included;
    /// only launch failures (unreachable peer, spawn errors, ...) surface as `Err`.
    #[instrument(level = "info", skip(self))]
    pub async fn main(&self, entrypoint: &str) -> Result<ExitCode, LaunchError> {
        let descriptor = self.source.load()?;
        info!(
            role = %descriptor.role(),
            rank = descriptor.rank(),
            nodes = descriptor.container_addrs().len(),
            slots = descriptor.slot_count(),
            allocation = %descriptor.allocation_id,
            "resolved launch role"
        );

        Orchestrator::new(&self.deps, &self.cfg, &descriptor)
            .run(entrypoint)
            .await
    }
}
