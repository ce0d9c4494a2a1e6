use std::{path::PathBuf, time::Duration};

use dtrain_model::LaunchEnv;

/// Port the remote-shell daemon listens on inside every container.
pub const DTRAIN_SSH_PORT: u16 = 12350;

/// Window within which every peer daemon must answer.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(20);

/// Everything a launch needs besides the cluster descriptor.
///
/// Built once at the process boundary and passed down by reference;
/// nothing below the binary reads the ambient process environment.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Remote-shell daemon port, shared by the daemon, the probe and `PDSH_SSH_ARGS`.
    pub ssh_port: u16,
    /// Total budget for all peer readiness checks of one launch.
    pub readiness_timeout: Duration,
    /// Per-attempt limit for connecting to a peer and reading its greeting.
    pub connect_timeout: Duration,
    /// Pause between two failed attempts against the same peer.
    pub probe_backoff: Duration,

    pub sshd_bin: PathBuf,
    pub sshd_config: PathBuf,
    /// Interpreter used for the rendezvous wrappers and the harness.
    pub python: String,
    /// Distributed-runtime launcher executable.
    pub runtime_bin: String,
    /// Directory holding the rendezvous server sockets.
    pub pid_server_dir: PathBuf,
    /// Where the chief writes the hostfile on multi-node runs.
    pub hostfile_path: PathBuf,
    /// Where the chief writes the environment the runtime re-exports on peers.
    pub runtime_env_path: PathBuf,

    /// Resources identifier assigned by the control plane (`DET_RESOURCES_ID`).
    pub resources_id: Option<String>,
    /// `DET_*` variables captured at the boundary, forwarded to peers through the runtime env file.
    pub forwarded_env: LaunchEnv,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            ssh_port: DTRAIN_SSH_PORT,
            readiness_timeout: READINESS_TIMEOUT,
            connect_timeout: Duration::from_secs(1),
            probe_backoff: Duration::from_millis(100),
            sshd_bin: PathBuf::from("/usr/sbin/sshd"),
            sshd_config: PathBuf::from("/run/determined/ssh/sshd_config"),
            python: "python3".to_string(),
            runtime_bin: "deepspeed".to_string(),
            pid_server_dir: PathBuf::from("/tmp"),
            hostfile_path: PathBuf::from("/tmp/hostfile.txt"),
            runtime_env_path: PathBuf::from(".deepspeed_env"),
            resources_id: None,
            forwarded_env: LaunchEnv::new(),
        }
    }
}

impl LaunchConfig {
    /// Check values that would otherwise only fail deep inside a launch.
    pub fn validate(&self) -> Result<(), String> {
        if self.ssh_port == 0 {
            return Err("ssh_port must be non-zero".into());
        }
        if self.readiness_timeout.is_zero() {
            return Err("readiness_timeout must be positive".into());
        }
        if self.connect_timeout.is_zero() {
            return Err("connect_timeout must be positive".into());
        }
        if self.python.trim().is_empty() || self.runtime_bin.trim().is_empty() {
            return Err("python and runtime_bin must be set".into());
        }
        Ok(())
    }
}
