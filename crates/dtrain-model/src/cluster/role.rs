use std::fmt;

use crate::Rank;

/// Part a node plays in a distributed run.
///
/// Resolved once from the container rank; the lowest rank coordinates the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Rank 0: hosts the distributed runtime and supervises the whole job.
    Chief,
    /// Any other rank: only hosts the remote-shell daemon.
    Worker,
}

impl Role {
    pub fn from_rank(rank: Rank) -> Self {
        if rank == 0 { Role::Chief } else { Role::Worker }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Chief => "chief",
            Role::Worker => "worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
