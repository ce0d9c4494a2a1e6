//! Argv construction for every process a launch starts.
//!
//! All builders are pure: the same config and inputs always give the same tokens.
//! The main job is composed as
//! `pid_server + runtime + pid_client + log_redirect + harness`:
//! the rendezvous server wraps everything so it sees the exit status of every rank,
//! the client runs after the real work, and log redirection wraps only the harness.
use std::path::Path;

use dtrain_model::{ClusterDescriptor, CommandLine};

use crate::LaunchConfig;

const PID_SERVER_MODULE: &str = "determined.exec.pid_server";
const PID_CLIENT_MODULE: &str = "determined.exec.pid_client";
const LOG_REDIRECT_MODULE: &str = "determined.launch.wrap_rank";
const HARNESS_MODULE: &str = "determined.exec.harness";

/// Runtime address used when the whole job lives in one container.
pub const LOCAL_CHIEF_ADDR: &str = "localhost";

#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    cfg: &'a LaunchConfig,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(cfg: &'a LaunchConfig) -> Self {
        Self { cfg }
    }

    /// Remote-shell daemon in the foreground on the well-known port.
    pub fn sshd(&self) -> CommandLine {
        [
            self.cfg.sshd_bin.display().to_string(),
            "-p".to_string(),
            self.cfg.ssh_port.to_string(),
            "-f".to_string(),
            self.cfg.sshd_config.display().to_string(),
            "-D".to_string(),
        ]
        .into_iter()
        .collect()
    }

    /// Rendezvous server: holds the wrapped command until `peer_count` clients registered
    /// and reports their exit status through the socket keyed by `allocation_id`.
    pub fn pid_server(&self, allocation_id: &str, peer_count: usize) -> CommandLine {
        let mut cmd = self.python_module(PID_SERVER_MODULE);
        for token in ["--on-fail", "SIGTERM", "--on-exit", "WAIT"] {
            cmd.push(token);
        }
        cmd.push(self.pid_server_socket(allocation_id));
        cmd.push(peer_count.to_string());
        cmd.push("--");
        cmd
    }

    /// Rendezvous client: signals the server keyed by `allocation_id` once the wrapped job ends.
    pub fn pid_client(&self, allocation_id: &str) -> CommandLine {
        let mut cmd = self.python_module(PID_CLIENT_MODULE);
        cmd.push(self.pid_server_socket(allocation_id));
        cmd.push("--");
        cmd
    }

    /// Distributed-runtime launcher pointed at the chief and, on multi-node runs, the hostfile.
    pub fn runtime(&self, chief_addr: &str, hostfile: Option<&Path>) -> CommandLine {
        let mut cmd: CommandLine = [
            self.cfg.runtime_bin.as_str(),
            "--master_addr",
            chief_addr,
            "--no_python",
            "--no_local_rank",
        ]
        .into_iter()
        .collect();
        if let Some(path) = hostfile {
            cmd.push("-H");
            cmd.push(path.display().to_string());
        }
        cmd.push("--");
        cmd
    }

    /// Tags every output line of the wrapped command with its rank.
    pub fn log_redirect(&self) -> CommandLine {
        let mut cmd = self.python_module(LOG_REDIRECT_MODULE);
        cmd.push("RANK");
        cmd.push("--");
        cmd
    }

    /// Loads and runs the user entrypoint (`module:Class` or script reference).
    pub fn harness(&self, entrypoint: &str) -> CommandLine {
        let mut cmd = self.python_module(HARNESS_MODULE);
        cmd.push(entrypoint);
        cmd
    }

    /// Full supervised job the chief runs.
    pub fn main_job(&self, descriptor: &ClusterDescriptor, entrypoint: &str) -> CommandLine {
        let (chief_addr, hostfile) = if descriptor.is_multi_node() {
            (descriptor.chief_addr(), Some(self.cfg.hostfile_path.as_path()))
        } else {
            (LOCAL_CHIEF_ADDR, None)
        };

        CommandLine::compose([
            &self.pid_server(&descriptor.allocation_id, descriptor.slot_count()),
            &self.runtime(chief_addr, hostfile),
            &self.pid_client(&descriptor.allocation_id),
            &self.log_redirect(),
            &self.harness(entrypoint),
        ])
    }

    /// What a worker runs: the daemon, registered with the rendezvous server.
    pub fn worker_daemon(&self, descriptor: &ClusterDescriptor) -> CommandLine {
        self.pid_server(&descriptor.allocation_id, descriptor.slot_count()) + &self.sshd()
    }

    fn python_module(&self, module: &str) -> CommandLine {
        [self.cfg.python.as_str(), "-m", module].into_iter().collect()
    }

    fn pid_server_socket(&self, allocation_id: &str) -> String {
        self.cfg
            .pid_server_dir
            .join(format!("pid_server-{allocation_id}"))
            .display()
            .to_string()
    }
}
