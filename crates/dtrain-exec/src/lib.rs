//! Tokio-backed implementations of the process and readiness seams of `dtrain-core`.

#[cfg(not(unix))]
compile_error!("dtrain-exec forwards POSIX signals and only builds for unix targets");

mod util;

pub mod proc;
pub use proc::{TokioHandle, TokioSpawner};

pub mod probe;
pub use probe::SshdProbe;
