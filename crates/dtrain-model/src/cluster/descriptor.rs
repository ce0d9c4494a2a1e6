use serde::{Deserialize, Serialize};

use crate::{ModelError, Rank, Role};

/// Addresses of every container in the run and the position of this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendezvousInfo {
    /// Container addresses ordered by rank; index 0 is the chief.
    pub container_addrs: Vec<String>,
    /// Rank of the local container.
    pub container_rank: Rank,
}

impl RendezvousInfo {
    pub fn new<I, S>(container_addrs: I, container_rank: Rank) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            container_addrs: container_addrs.into_iter().map(Into::into).collect(),
            container_rank,
        }
    }
}

/// Cluster assignment handed over by the control plane.
///
/// Read once before the launch and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub master_url: String,
    pub cluster_id: String,
    pub agent_id: String,
    pub slot_ids: Vec<u32>,
    pub task_id: String,
    pub allocation_id: String,
    pub session_token: String,
    pub task_type: String,
    #[serde(rename = "rendezvous_info")]
    pub rendezvous: RendezvousInfo,
}

impl ClusterDescriptor {
    /// Decode a descriptor from its JSON document and check it.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let descriptor: ClusterDescriptor = serde_json::from_str(raw)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the rendezvous invariants: at least one address, rank within bounds.
    pub fn validate(&self) -> Result<(), ModelError> {
        let addrs = &self.rendezvous.container_addrs;
        if addrs.is_empty() {
            return Err(ModelError::InvalidDescriptor(
                "rendezvous_info.container_addrs is empty".into(),
            ));
        }
        if self.rendezvous.container_rank >= addrs.len() {
            return Err(ModelError::InvalidDescriptor(format!(
                "container_rank {} out of range for {} container address(es)",
                self.rendezvous.container_rank,
                addrs.len()
            )));
        }
        if self.allocation_id.trim().is_empty() {
            return Err(ModelError::InvalidDescriptor("allocation_id is empty".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn container_addrs(&self) -> &[String] {
        &self.rendezvous.container_addrs
    }

    #[inline]
    pub fn rank(&self) -> Rank {
        self.rendezvous.container_rank
    }

    #[inline]
    pub fn role(&self) -> Role {
        Role::from_rank(self.rank())
    }

    /// Address of the chief container (lowest rank).
    ///
    /// Empty when the descriptor has not been validated and carries no address.
    pub fn chief_addr(&self) -> &str {
        self.container_addrs()
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// `true` when the run spans more than one container.
    #[inline]
    pub fn is_multi_node(&self) -> bool {
        self.container_addrs().len() > 1
    }

    /// Number of slots (processes) each container runs.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_ids.len()
    }
}
