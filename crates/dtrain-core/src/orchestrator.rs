use std::sync::Arc;

use dtrain_model::{ClusterDescriptor, CommandLine, ExitCode, LaunchEnv, Role};
use tracing::{error, info, instrument, warn};

use crate::{
    BoxedHandle, CommandBuilder, Coordinator, DaemonGuard, Deadline, LaunchConfig, LaunchError, LaunchPhase,
    ProcessSpawner, ReadinessProbe, env::launch_env, files, process::kill_and_reap, readiness::wait_for_peers,
};

/// Side-effecting collaborators of a launch.
#[derive(Clone)]
pub struct LaunchDeps {
    pub spawner: Arc<dyn ProcessSpawner>,
    pub probe: Arc<dyn ReadinessProbe>,
    pub coordinator: Arc<dyn Coordinator>,
}

/// Runs the role-specific process sequence of one node and records the phases it went through.
pub struct Orchestrator<'a> {
    deps: &'a LaunchDeps,
    cfg: &'a LaunchConfig,
    descriptor: &'a ClusterDescriptor,
    env: LaunchEnv,
    trace: Vec<LaunchPhase>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(deps: &'a LaunchDeps, cfg: &'a LaunchConfig, descriptor: &'a ClusterDescriptor) -> Self {
        let mut this = Self {
            deps,
            cfg,
            descriptor,
            env: launch_env(descriptor, cfg),
            trace: Vec::new(),
        };
        this.enter(LaunchPhase::Init);
        this
    }

    /// Phases entered so far, in order.
    pub fn trace(&self) -> &[LaunchPhase] {
        &self.trace
    }

    pub async fn run(&mut self, entrypoint: &str) -> Result<ExitCode, LaunchError> {
        match self.descriptor.role() {
            Role::Chief => self.run_chief(entrypoint).await,
            Role::Worker => self.run_worker().await,
        }
    }

    #[instrument(level = "debug", skip(self), fields(nodes = self.descriptor.container_addrs().len()))]
    pub async fn run_chief(&mut self, entrypoint: &str) -> Result<ExitCode, LaunchError> {
        if !self.descriptor.is_multi_node() {
            return self.run_main(entrypoint).await;
        }

        files::write_hostfile(&self.cfg.hostfile_path, self.descriptor)?;
        files::write_runtime_env(&self.cfg.runtime_env_path, &self.env, &self.cfg.forwarded_env)?;

        let sshd = CommandBuilder::new(self.cfg).sshd();
        let daemon = DaemonGuard::new("sshd", self.spawn(&sshd).await?);
        self.enter(LaunchPhase::DaemonStarted);

        let outcome = self.peers_then_main(entrypoint).await;

        daemon.release().await;
        self.enter(LaunchPhase::CleanedUp);
        outcome
    }

    #[instrument(level = "debug", skip(self), fields(rank = self.descriptor.rank()))]
    pub async fn run_worker(&mut self) -> Result<ExitCode, LaunchError> {
        let cfg = self.cfg;
        let resources_id = cfg
            .resources_id
            .as_deref()
            .ok_or(LaunchError::MissingResourcesId)?;

        let cmd = CommandBuilder::new(cfg).worker_daemon(self.descriptor);
        let daemon = DaemonGuard::new("sshd", self.spawn(&cmd).await?);
        self.enter(LaunchPhase::DaemonStarted);

        if let Err(e) = self
            .deps
            .coordinator
            .notify_daemon_ready(self.descriptor, resources_id)
            .await
        {
            error!(target: "dtrain.core.orchestrator", error = %e, "daemon readiness notification failed");
            daemon.release().await;
            self.enter(LaunchPhase::CleanedUp);
            return Err(e);
        }
        self.enter(LaunchPhase::Notified);

        // Termination comes from the chief's lifecycle tearing the rendezvous down.
        let code = daemon.wait().await?;
        self.enter(LaunchPhase::MainExited);
        Ok(code)
    }

    async fn peers_then_main(&mut self, entrypoint: &str) -> Result<ExitCode, LaunchError> {
        let deadline = Deadline::starting_now(self.cfg.readiness_timeout);
        if let Err(e) = wait_for_peers(
            self.deps.probe.as_ref(),
            self.descriptor.container_addrs(),
            deadline,
            self.cfg.ssh_port,
        )
        .await
        {
            self.enter(LaunchPhase::PeersReadyFailed);
            return Err(e);
        }
        self.enter(LaunchPhase::PeersReady);

        self.run_main(entrypoint).await
    }

    async fn run_main(&mut self, entrypoint: &str) -> Result<ExitCode, LaunchError> {
        let cmd = CommandBuilder::new(self.cfg).main_job(self.descriptor, entrypoint);
        let mut main = self.spawn(&cmd).await?;
        self.enter(LaunchPhase::MainRunning);

        let code = match main.wait().await {
            Ok(code) => code,
            Err(e) => {
                error!(target: "dtrain.core.orchestrator", error = %e, "waiting on main job failed; killing it");
                kill_and_reap("main", main.as_mut()).await;
                return Err(e);
            }
        };
        self.enter(LaunchPhase::MainExited);

        if code != 0 {
            warn!(target: "dtrain.core.orchestrator", code, "main job exited non-zero");
        } else {
            info!(target: "dtrain.core.orchestrator", "main job succeeded");
        }
        Ok(code)
    }

    async fn spawn(&self, cmd: &CommandLine) -> Result<BoxedHandle, LaunchError> {
        if cmd.program().is_none() {
            return Err(LaunchError::MissingProgram);
        }
        self.deps.spawner.spawn(cmd, &self.env).await
    }

    fn enter(&mut self, phase: LaunchPhase) {
        phase.log(self.descriptor.role());
        self.trace.push(phase);
    }
}
