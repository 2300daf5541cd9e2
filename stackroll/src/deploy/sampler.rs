//! Point-in-time health sampling of a target's containers

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deploy::api::{ContainerDetail, ControlPlane};
use crate::errors::DeployError;
use crate::models::deployment::DeploymentTarget;

/// Health classification of a single container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Starting,
    /// The container has no health check configured
    Missing,
    /// The control plane reported a status outside the known vocabulary
    Unknown,
}

impl HealthStatus {
    /// Classify the status string of a health-check block
    pub fn from_health(health: Option<&str>) -> Self {
        match health {
            None => HealthStatus::Missing,
            Some("healthy") => HealthStatus::Healthy,
            Some("unhealthy") => HealthStatus::Unhealthy,
            Some("starting") => HealthStatus::Starting,
            Some(_) => HealthStatus::Unknown,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Starting => "starting",
            HealthStatus::Missing => "missing",
            HealthStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One container's health at a sampling instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerObservation {
    pub id: String,
    pub name: String,
    pub status: HealthStatus,
    pub runtime_status: String,
}

impl ContainerObservation {
    fn from_detail(id: &str, fallback_name: &str, detail: ContainerDetail) -> Self {
        let name = detail.name.trim_start_matches('/');
        let name = if name.is_empty() { fallback_name } else { name };
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: HealthStatus::from_health(detail.health.as_deref()),
            runtime_status: detail.runtime_status,
        }
    }
}

/// Reads the current health of every container of a target
pub struct HealthSampler<'a> {
    api: &'a dyn ControlPlane,
}

impl<'a> HealthSampler<'a> {
    pub fn new(api: &'a dyn ControlPlane) -> Self {
        Self { api }
    }

    /// Take one sample
    ///
    /// Fails with `TargetNotFound` when the target has no containers, and
    /// with `TransportError` when any single container cannot be inspected:
    /// a round never reports a subset of the target.
    pub async fn sample(
        &self,
        target: &DeploymentTarget,
    ) -> Result<Vec<ContainerObservation>, DeployError> {
        let containers = self.api.list_containers(target).await?;
        if containers.is_empty() {
            return Err(DeployError::TargetNotFound(format!(
                "no containers found for {}",
                target
            )));
        }

        let mut observations = Vec::with_capacity(containers.len());
        for container in containers {
            let detail = self
                .api
                .inspect_container(target, &container.id)
                .await
                .map_err(|e| {
                    DeployError::TransportError(format!(
                        "failed to inspect container {}: {}",
                        container.name, e
                    ))
                })?;
            let observation = ContainerObservation::from_detail(&container.id, &container.name, detail);
            debug!(
                "Container {} is {} ({})",
                observation.name, observation.status, observation.runtime_status
            );
            observations.push(observation);
        }

        Ok(observations)
    }
}
