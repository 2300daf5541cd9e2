//! Control plane backed by the Portainer HTTP API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portainer_models::models::{Pair, Stack, UpdateStackRequest};
use tracing::debug;

use crate::deploy::api::{ContainerDetail, ContainerRef, ControlPlane, SubmitResponse};
use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::models::deployment::{DeploymentTarget, Manifest};

/// Stack update flags sent with every submission
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Remove services no longer present in the manifest
    pub prune: bool,

    /// Pull images even when a local copy exists
    pub pull_image: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            prune: true,
            pull_image: true,
        }
    }
}

/// [`ControlPlane`] over an authenticated [`HttpClient`]
pub struct PortainerControlPlane {
    client: HttpClient,
    options: SubmitOptions,
}

impl PortainerControlPlane {
    pub fn new(client: HttpClient, options: SubmitOptions) -> Self {
        Self { client, options }
    }
}

/// `UpdateDate` of the stack echoed back by an accepted update
fn update_time(body: &str) -> Option<DateTime<Utc>> {
    let stack: Stack = serde_json::from_str(body).ok()?;
    DateTime::from_timestamp(stack.update_date, 0).filter(|_| stack.update_date > 0)
}

#[async_trait]
impl ControlPlane for PortainerControlPlane {
    async fn submit_manifest(
        &self,
        target: &DeploymentTarget,
        manifest: &Manifest,
    ) -> Result<SubmitResponse, DeployError> {
        let request = UpdateStackRequest {
            stack_file_content: manifest.content.clone(),
            env: manifest.env.iter().map(Pair::from).collect(),
            prune: self.options.prune,
            pull_image: self.options.pull_image,
        };
        let (status, body) = self
            .client
            .update_stack(target.stack_id, target.endpoint_id, &request)
            .await?;
        debug!("Stack update answered {}", status);

        let updated_at = if status.is_success() {
            update_time(&body)
        } else {
            None
        };
        Ok(SubmitResponse {
            success: status.is_success(),
            status_code: status.as_u16(),
            body,
            updated_at,
        })
    }

    async fn list_containers(
        &self,
        target: &DeploymentTarget,
    ) -> Result<Vec<ContainerRef>, DeployError> {
        let containers = self
            .client
            .list_containers(target.endpoint_id, &target.label_filters())
            .await?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerRef {
                name: c
                    .names
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_else(|| c.id.clone()),
                id: c.id,
            })
            .collect())
    }

    async fn inspect_container(
        &self,
        target: &DeploymentTarget,
        id: &str,
    ) -> Result<ContainerDetail, DeployError> {
        let inspect = self.client.inspect_container(target.endpoint_id, id).await?;
        Ok(ContainerDetail {
            name: inspect.name,
            health: inspect.state.health.map(|h| h.status),
            runtime_status: inspect.state.status,
        })
    }

    async fn fetch_logs(
        &self,
        target: &DeploymentTarget,
        id: &str,
        tail_lines: u32,
    ) -> Result<String, DeployError> {
        let inspect = self.client.inspect_container(target.endpoint_id, id).await?;
        let tty = inspect.config.map(|c| c.tty).unwrap_or(false);
        self.client
            .container_logs(target.endpoint_id, id, tail_lines, tty)
            .await
    }
}
