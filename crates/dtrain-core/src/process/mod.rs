//! Process seam: how a launch starts, waits on and terminates OS processes.
use async_trait::async_trait;
use dtrain_model::{CommandLine, ExitCode, LaunchEnv};

use crate::LaunchError;

mod guard;
pub(crate) use guard::kill_and_reap;
pub use guard::DaemonGuard;

/// A running process exclusively owned by whoever spawned it.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Block until the process exits; a signal `n` is reported as `128 + n`.
    async fn wait(&mut self) -> Result<ExitCode, LaunchError>;

    /// Terminate the process. Does not reap it; call [`ProcessHandle::wait`] afterwards.
    async fn kill(&mut self) -> Result<(), LaunchError>;

    /// Synchronous kill request for drop paths where awaiting is impossible.
    fn start_kill(&mut self) -> Result<(), LaunchError>;
}

pub type BoxedHandle = Box<dyn ProcessHandle>;

/// Starts processes with the launch environment applied on top of the inherited one.
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(&self, cmd: &CommandLine, env: &LaunchEnv) -> Result<BoxedHandle, LaunchError>;
}
