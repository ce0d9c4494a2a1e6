//! Environment published to every process a launch spawns.
use dtrain_model::{ClusterDescriptor, LaunchEnv};

use crate::LaunchConfig;

/// Address of the chief container.
pub const CHIEF_IP_VAR: &str = "DET_CHIEF_IP";
/// Marks the job as driven by the distributed runtime.
pub const DISTRIBUTED_FLAG_VAR: &str = "USE_DEEPSPEED";
/// Remote-shell arguments the runtime uses to reach peers.
pub const REMOTE_SHELL_ARGS_VAR: &str = "PDSH_SSH_ARGS";

/// Resources identifier assigned by the control plane; input only.
pub const RESOURCES_ID_VAR: &str = "DET_RESOURCES_ID";
/// Path of the cluster descriptor document; input only.
pub const CLUSTER_INFO_VAR: &str = "DET_CLUSTER_INFO";
/// Prefix of the variables forwarded to peers through the runtime env file.
pub const FORWARDED_PREFIX: &str = "DET_";

/// `DET_*` variables naming the local container; every peer has its own value.
pub const CONTAINER_LOCAL_VARS: &[&str] = &[
    RESOURCES_ID_VAR,
    "DET_AGENT_ID",
    "DET_SLOT_IDS",
    "DET_CONTAINER_ID",
];

/// Remote-shell argument string: no password auth, no host-key checks, fixed port.
pub fn remote_shell_args(port: u16) -> String {
    format!("-o PasswordAuthentication=no -o StrictHostKeyChecking=no -p {port} -2 -a -x %h")
}

/// Variables every role publishes before anything is spawned.
///
/// Identical on chief and worker so that any process of the run sees the same values.
pub fn launch_env(descriptor: &ClusterDescriptor, cfg: &LaunchConfig) -> LaunchEnv {
    LaunchEnv::new()
        .with(CHIEF_IP_VAR, descriptor.chief_addr())
        .with(DISTRIBUTED_FLAG_VAR, "1")
        .with(REMOTE_SHELL_ARGS_VAR, remote_shell_args(cfg.ssh_port))
}

/// `true` for a variable that should follow the job onto peers.
pub fn is_forwarded(key: &str) -> bool {
    key.starts_with(FORWARDED_PREFIX) && !CONTAINER_LOCAL_VARS.contains(&key)
}
