//! Launch logic of a multi-node training job.
//!
//! The crate decides what every node runs and in which order; the actual OS work (spawning, signalling, probing sockets,
//! talking to the control plane) sits behind the traits in [`process`], [`readiness`] and [`coordinator`] so it can be swapped.

pub mod error;
pub use error::LaunchError;

pub mod config;
pub use config::LaunchConfig;

pub mod command;
pub use command::CommandBuilder;

pub mod env;
pub use env::launch_env;

pub mod files;

mod deadline;
pub use deadline::Deadline;

pub mod process;
pub use process::{BoxedHandle, DaemonGuard, ProcessHandle, ProcessSpawner};

pub mod readiness;
pub use readiness::{ReadinessProbe, wait_for_peers};

pub mod coordinator;
pub use coordinator::{ClusterSource, Coordinator, FileClusterSource};

mod phase;
pub use phase::LaunchPhase;

mod orchestrator;
pub use orchestrator::{LaunchDeps, Orchestrator};

mod role;
pub use role::RoleController;

#[cfg(test)]
mod fake;
