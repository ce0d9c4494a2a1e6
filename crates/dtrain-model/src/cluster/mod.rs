mod descriptor;
pub use descriptor::{ClusterDescriptor, RendezvousInfo};

mod role;
pub use role::Role;
