use std::{path::PathBuf, time::Duration};

use clap::Parser;
use dtrain_core::{
    LaunchConfig,
    config::{DTRAIN_SSH_PORT, READINESS_TIMEOUT},
    env::{CLUSTER_INFO_VAR, RESOURCES_ID_VAR, is_forwarded},
};
use dtrain_observe::{LoggerConfig, LoggerFormat, LoggerLevel};

const DEFAULT_CLUSTER_INFO: &str = "/run/determined/info/cluster_info.json";

#[derive(Parser, Debug)]
#[command(name = "dtrain-launch")]
#[command(version)]
#[command(about = "Launch a distributed training job on every node of an allocation")]
pub struct Args {
    /// Training entrypoint handed to the harness (e.g. "model_def:MyTrial")
    pub entrypoint: String,

    /// Cluster descriptor document mounted by the control plane
    #[arg(long, env = CLUSTER_INFO_VAR, default_value = DEFAULT_CLUSTER_INFO)]
    pub cluster_info: PathBuf,

    /// Port of the remote-shell daemon on every node
    #[arg(long, env = "DTRAIN_SSH_PORT", default_value_t = DTRAIN_SSH_PORT)]
    pub ssh_port: u16,

    /// Seconds every peer daemon gets to answer, all peers together
    #[arg(long, default_value_t = READINESS_TIMEOUT.as_secs())]
    pub readiness_timeout_secs: u64,

    /// Where the chief writes the hostfile on multi-node runs
    #[arg(long, default_value = "/tmp/hostfile.txt")]
    pub hostfile: PathBuf,

    /// Where the chief writes the environment re-exported on peers
    #[arg(long, default_value = ".deepspeed_env")]
    pub runtime_env_file: PathBuf,

    #[arg(long, default_value = "/usr/sbin/sshd")]
    pub sshd_bin: PathBuf,

    #[arg(long, default_value = "/run/determined/ssh/sshd_config")]
    pub sshd_config: PathBuf,

    /// Interpreter running the rendezvous wrappers and the harness
    #[arg(long, env = "DTRAIN_PYTHON", default_value = "python3")]
    pub python: String,

    /// Distributed runtime launcher
    #[arg(long, default_value = "deepspeed")]
    pub runtime_bin: String,

    /// Timeout of the worker's call to the master
    #[arg(long, default_value_t = 30)]
    pub notify_timeout_secs: u64,

    /// Log filter (e.g. "info" or "info,dtrain.exec=trace")
    #[arg(long, env = "DTRAIN_LOG", default_value = "info")]
    pub log_level: LoggerLevel,

    /// Log output: text, json or journald
    #[arg(long, env = "DTRAIN_LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,
}

impl Args {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::new(self.log_format, self.log_level.clone())
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    /// Build the launch configuration, capturing what it needs from `vars` (the process environment).
    pub fn launch_config(&self, vars: impl IntoIterator<Item = (String, String)>) -> LaunchConfig {
        let mut resources_id = None;
        let mut forwarded = Vec::new();
        for (key, value) in vars {
            if key == RESOURCES_ID_VAR {
                resources_id = Some(value).filter(|v| !v.is_empty());
            } else if is_forwarded(&key) {
                forwarded.push((key, value));
            }
        }
        forwarded.sort();

        LaunchConfig {
            ssh_port: self.ssh_port,
            readiness_timeout: Duration::from_secs(self.readiness_timeout_secs),
            sshd_bin: self.sshd_bin.clone(),
            sshd_config: self.sshd_config.clone(),
            python: self.python.clone(),
            runtime_bin: self.runtime_bin.clone(),
            hostfile_path: self.hostfile.clone(),
            runtime_env_path: self.runtime_env_file.clone(),
            resources_id,
            forwarded_env: forwarded.into_iter().collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_launch_constants() {
        let args = Args::try_parse_from(["dtrain-launch", "--cluster-info", "/x.json", "model:Trial"]).unwrap();
        let cfg = args.launch_config(Vec::new());

        assert_eq!(args.entrypoint, "model:Trial");
        assert_eq!(args.cluster_info, PathBuf::from("/x.json"));
        assert_eq!(cfg.ssh_port, 12350);
        assert_eq!(cfg.readiness_timeout, Duration::from_secs(20));
        assert_eq!(cfg.resources_id, None);
        assert!(cfg.forwarded_env.is_empty());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "dtrain-launch",
            "--ssh-port",
            "2222",
            "--readiness-timeout-secs",
            "5",
            "--hostfile",
            "/work/hosts",
            "--log-format",
            "json",
            "--log-level",
            "debug",
            "model:Trial",
        ])
        .unwrap();
        let cfg = args.launch_config(Vec::new());

        assert_eq!(cfg.ssh_port, 2222);
        assert_eq!(cfg.readiness_timeout, Duration::from_secs(5));
        assert_eq!(cfg.hostfile_path, PathBuf::from("/work/hosts"));
        assert_eq!(args.logger_config().format, LoggerFormat::Json);
        assert_eq!(args.logger_config().level.as_str(), "debug");
    }

    #[test]
    fn captures_resources_id_and_det_variables() {
        let args = Args::try_parse_from(["dtrain-launch", "model:Trial"]).unwrap();
        let cfg = args.launch_config(vars(&[
            ("PATH", "/usr/bin"),
            ("DET_TASK_ID", "taskId"),
            ("DET_RESOURCES_ID", "containerId"),
            ("DET_AGENT_ID", "agentId"),
        ]));

        assert_eq!(cfg.resources_id.as_deref(), Some("containerId"));
        assert_eq!(cfg.forwarded_env.get("DET_TASK_ID"), Some("taskId"));
        assert_eq!(cfg.forwarded_env.get("PATH"), None);
        assert_eq!(cfg.forwarded_env.get("DET_RESOURCES_ID"), None);
        assert_eq!(cfg.forwarded_env.get("DET_AGENT_ID"), None);
        assert_eq!(cfg.forwarded_env.len(), 1);
    }

    #[test]
    fn rejects_bad_log_format_and_missing_entrypoint() {
        assert!(Args::try_parse_from(["dtrain-launch", "--log-format", "yaml", "model:Trial"]).is_err());
        assert!(Args::try_parse_from(["dtrain-launch"]).is_err());
    }
}
