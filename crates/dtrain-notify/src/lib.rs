//! Client side of the control-plane calls a launch makes.

mod errors;
pub use errors::NotifyError;

mod master;
pub use master::{MasterCoordinator, daemon_ready_url};
