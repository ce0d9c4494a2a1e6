use dtrain_model::Role;
use tracing::{debug, error, info, trace};

/// Steps a launch goes through on one node.
///
/// Chief, multi-node: `Init → DaemonStarted → PeersReady → MainRunning → MainExited → CleanedUp`,
/// or `Init → DaemonStarted → PeersReadyFailed → CleanedUp` when a peer never answers.
/// Chief, single node: `Init → MainRunning → MainExited`.
/// Worker: `Init → DaemonStarted → Notified → MainExited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    Init,
    DaemonStarted,
    PeersReady,
    PeersReadyFailed,
    MainRunning,
    MainExited,
    Notified,
    CleanedUp,
}

impl LaunchPhase {
    pub fn message(&self) -> &'static str {
        match self {
            LaunchPhase::Init => "launch environment computed",
            LaunchPhase::DaemonStarted => "remote-shell daemon started",
            LaunchPhase::PeersReady => "all peer daemons answered",
            LaunchPhase::PeersReadyFailed => "peer daemon unreachable before deadline",
            LaunchPhase::MainRunning => "main job spawned",
            LaunchPhase::MainExited => "main job exited",
            LaunchPhase::Notified => "coordination service notified",
            LaunchPhase::CleanedUp => "remote-shell daemon killed and reaped",
        }
    }

    pub(crate) fn log(&self, role: Role) {
        let msg = self.message();
        let role = role.as_str();
        match self {
            LaunchPhase::Init => debug!(target: "dtrain.core.phase", role, "{msg}"),
            LaunchPhase::PeersReadyFailed => error!(target: "dtrain.core.phase", role, "{msg}"),
            LaunchPhase::CleanedUp => trace!(target: "dtrain.core.phase", role, "{msg}"),
            _ => info!(target: "dtrain.core.phase", role, "{msg}"),
        }
    }
}
