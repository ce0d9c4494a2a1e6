use std::time::Duration;

use async_trait::async_trait;
use dtrain_core::{Coordinator, LaunchError};
use dtrain_model::ClusterDescriptor;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::NotifyError;

/// `POST {master}/api/v1/allocations/{allocation}/resources/{resources}/daemon`.
pub fn daemon_ready_url(master_url: &str, allocation_id: &str, resources_id: &str) -> Result<Url, NotifyError> {
    let base = Url::parse(master_url).map_err(|e| NotifyError::InvalidEndpoint(format!("{master_url}: {e}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(NotifyError::InvalidEndpoint(format!(
            "{master_url}: unsupported scheme {}",
            base.scheme()
        )));
    }

    let path = format!(
        "{}/api/v1/allocations/{allocation_id}/resources/{resources_id}/daemon",
        base.path().trim_end_matches('/')
    );
    let mut url = base;
    url.set_path(&path);
    Ok(url)
}

/// Reports worker daemons to the control plane master.
#[derive(Debug, Clone)]
pub struct MasterCoordinator {
    client: Client,
}

impl MasterCoordinator {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn post_daemon_ready(&self, descriptor: &ClusterDescriptor, resources_id: &str) -> Result<(), NotifyError> {
        let url = daemon_ready_url(&descriptor.master_url, &descriptor.allocation_id, resources_id)?;
        debug!(target: "dtrain.notify", %url, "notifying master of daemon readiness");

        let response = self
            .client
            .post(url)
            .bearer_auth(&descriptor.session_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Coordinator for MasterCoordinator {
    async fn notify_daemon_ready(&self, descriptor: &ClusterDescriptor, resources_id: &str) -> Result<(), LaunchError> {
        match self.post_daemon_ready(descriptor, resources_id).await {
            Ok(()) => {
                debug!(target: "dtrain.notify", allocation = %descriptor.allocation_id, "daemon readiness acknowledged");
                Ok(())
            }
            Err(e) => {
                warn!(target: "dtrain.notify", error = %e, "daemon readiness notification failed");
                Err(e.into())
            }
        }
    }
}
