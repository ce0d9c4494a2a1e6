use std::process::Stdio;

use async_trait::async_trait;
use dtrain_core::{BoxedHandle, LaunchError, ProcessHandle, ProcessSpawner};
use dtrain_model::{CommandLine, ExitCode, LaunchEnv};
use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::util::{command, exit_code, terminate};

/// Spawns children that inherit stdio and the launcher environment, with the launch env on top.
///
/// Cancelling `shutdown` makes every handle still waiting forward SIGTERM to its child once.
#[derive(Clone, Default)]
pub struct TokioSpawner {
    shutdown: CancellationToken,
}

impl TokioSpawner {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }
}

#[async_trait]
impl ProcessSpawner for TokioSpawner {
    async fn spawn(&self, cmd: &CommandLine, env: &LaunchEnv) -> Result<BoxedHandle, LaunchError> {
        let mut command = command(cmd).ok_or(LaunchError::MissingProgram)?;
        command
            .envs(env.resolved())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        trace!(target: "dtrain.exec.proc", %cmd, "spawn");
        let child = command
            .spawn()
            .map_err(|e| LaunchError::Spawn(format!("{}: {e}", cmd.program().unwrap_or_default())))?;
        debug!(target: "dtrain.exec.proc", pid = ?child.id(), program = cmd.program(), "spawned");

        Ok(Box::new(TokioHandle::new(child, self.shutdown.clone())))
    }
}

pub struct TokioHandle {
    child: Child,
    shutdown: CancellationToken,
    forwarded: bool,
}

impl TokioHandle {
    pub fn new(child: Child, shutdown: CancellationToken) -> Self {
        Self {
            child,
            shutdown,
            forwarded: false,
        }
    }

    fn forward_termination(&mut self) {
        self.forwarded = true;
        let Some(pid) = self.child.id() else {
            return;
        };
        match terminate(pid) {
            Ok(()) => debug!(target: "dtrain.exec.proc", pid, "forwarded SIGTERM to child"),
            Err(e) => warn!(target: "dtrain.exec.proc", pid, error = %e, "failed to forward SIGTERM"),
        }
    }
}

#[async_trait]
impl ProcessHandle for TokioHandle {
    async fn wait(&mut self) -> Result<ExitCode, LaunchError> {
        let shutdown = self.shutdown.clone();
        loop {
            tokio::select! {
                status = self.child.wait() => {
                    let status = status.map_err(|e| LaunchError::Wait(e.to_string()))?;
                    let code = exit_code(status);
                    debug!(target: "dtrain.exec.proc", code, "child exited");
                    return Ok(code);
                }
                _ = shutdown.cancelled(), if !self.forwarded => {
                    self.forward_termination();
                }
            }
        }
    }

    async fn kill(&mut self) -> Result<(), LaunchError> {
        if let Ok(Some(_)) = self.child.try_wait() {
            trace!(target: "dtrain.exec.proc", "child already exited; nothing to kill");
            return Ok(());
        }
        self.child
            .start_kill()
            .map_err(|e| LaunchError::Kill(e.to_string()))
    }

    fn start_kill(&mut self) -> Result<(), LaunchError> {
        self.child
            .start_kill()
            .map_err(|e| LaunchError::Kill(e.to_string()))
    }
}
