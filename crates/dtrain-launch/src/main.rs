use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dtrain_core::{FileClusterSource, LaunchDeps, RoleController};
use dtrain_exec::{SshdProbe, TokioSpawner};
use dtrain_notify::MasterCoordinator;
use dtrain_observe::logger_init;
use tracing::{error, info};

mod args;
mod shutdown;

use args::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(target: "dtrain.launch", "launch failed: {e:#}");
            eprintln!("dtrain-launch: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(args: Args) -> anyhow::Result<i32> {
    logger_init(&args.logger_config()).context("initialize logger")?;

    let cfg = args.launch_config(std::env::vars());
    cfg.validate()
        .map_err(anyhow::Error::msg)
        .context("invalid launch configuration")?;

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(
        target: "dtrain.launch",
        host = %host,
        entrypoint = %args.entrypoint,
        cluster_info = %args.cluster_info.display(),
        ssh_port = cfg.ssh_port,
        "starting launcher"
    );

    let shutdown = shutdown::install_shutdown_handler().context("install signal handlers")?;
    let deps = LaunchDeps {
        spawner: Arc::new(TokioSpawner::new(shutdown)),
        probe: Arc::new(SshdProbe::from_config(&cfg)),
        coordinator: Arc::new(
            MasterCoordinator::new(args.notify_timeout()).context("build master client")?,
        ),
    };
    let source = Arc::new(FileClusterSource::new(&args.cluster_info));

    let code = RoleController::new(cfg, source, deps)
        .main(&args.entrypoint)
        .await?;
    info!(target: "dtrain.launch", code, "launcher exiting");
    Ok(code)
}
