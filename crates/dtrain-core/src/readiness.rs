use async_trait::async_trait;
use tracing::debug;

use crate::{Deadline, LaunchError};

/// Answers whether the remote-shell daemon of a peer accepts connections.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Retry until the daemon at `addr:port` greets, or fail with
    /// [`LaunchError::Connectivity`] once `deadline` passed.
    async fn check(&self, addr: &str, deadline: Deadline, port: u16) -> Result<(), LaunchError>;
}

/// Check every peer once, in address order, against the same deadline.
///
/// Stops at the first peer that does not answer.
pub async fn wait_for_peers(
    probe: &dyn ReadinessProbe,
    addrs: &[String],
    deadline: Deadline,
    port: u16,
) -> Result<(), LaunchError> {
    for addr in addrs {
        probe.check(addr, deadline, port).await?;
        debug!(target: "dtrain.core.readiness", peer = %addr, port, "peer daemon is ready");
    }
    Ok(())
}
