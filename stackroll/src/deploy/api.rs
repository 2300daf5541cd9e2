//! Control plane operations consumed by the deployment core

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DeployError;
use crate::models::deployment::{DeploymentTarget, Manifest};

/// Result of a manifest submission
///
/// A non-2xx answer is not an error at this level: the executor decides
/// what a rejected submission means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub status_code: u16,
    pub body: String,

    /// Update time reported back for an accepted submission
    pub updated_at: Option<DateTime<Utc>>,
}

/// A container associated with a deployment target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

/// Detailed state of a single container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDetail {
    pub name: String,

    /// Status of the health-check block, `None` when the container has none
    pub health: Option<String>,

    /// Runtime status such as `running`, `restarting` or `exited`
    pub runtime_status: String,
}

/// The control plane operations the health gate and rollback logic need
///
/// Implemented over HTTP by [`crate::deploy::portainer::PortainerControlPlane`]
/// and by in-memory fakes in tests.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Apply a manifest to the target's stack
    async fn submit_manifest(
        &self,
        target: &DeploymentTarget,
        manifest: &Manifest,
    ) -> Result<SubmitResponse, DeployError>;

    /// List every container of the target, stopped ones included
    async fn list_containers(
        &self,
        target: &DeploymentTarget,
    ) -> Result<Vec<ContainerRef>, DeployError>;

    /// Inspect a single container
    async fn inspect_container(
        &self,
        target: &DeploymentTarget,
        id: &str,
    ) -> Result<ContainerDetail, DeployError>;

    /// Fetch the last `tail_lines` lines of a container's output
    async fn fetch_logs(
        &self,
        target: &DeploymentTarget,
        id: &str,
        tail_lines: u32,
    ) -> Result<String, DeployError>;
}
