use std::sync::Arc;

use shared::domain::HealthStatus;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::remote::RemoteService;

/// Side-channel backend probe. Results are logged and never reach the workflow.
#[derive(Clone)]
pub struct HealthMonitor {
    remote: Arc<dyn RemoteService>,
}

impl HealthMonitor {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    pub async fn check(&self) -> HealthStatus {
        match self.remote.health().await {
            Ok(response) => {
                info!(
                    checked_at = ?response.checked_at(),
                    token_configured = ?response.hf_token_configured,
                    "backend is healthy"
                );
                HealthStatus::Healthy
            }
            Err(err) => {
                warn!("health check failed: {err}");
                HealthStatus::Unreachable
            }
        }
    }

    /// Overlapping checks are fine; each one only logs.
    pub fn spawn_check(&self) -> JoinHandle<HealthStatus> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.check().await })
    }
}
