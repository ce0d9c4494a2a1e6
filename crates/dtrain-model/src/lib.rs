//! Plain data shared by every dtrain crate.
//!
//! Nothing in here spawns processes or touches the network: the cluster descriptor handed over by the control plane,
//! the argv type commands are composed from, and the environment a launch publishes to its children.

mod error;
pub use error::ModelError;

mod cluster;
pub use cluster::{ClusterDescriptor, RendezvousInfo, Role};

mod domain;
pub use domain::{CommandLine, KeyValue, LaunchEnv};

/// Zero-based position of a container inside the rendezvous address list.
pub type Rank = usize;

/// Process exit status as reported to the caller of the launcher.
pub type ExitCode = i32;
