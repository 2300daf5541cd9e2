//! Target resolution and previous manifest snapshot

use tracing::{debug, info};

use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::models::deployment::{DeploymentTarget, EnvVar, Manifest};

/// Target as named by the operator
#[derive(Debug, Clone)]
pub struct TargetSpec {
    /// Environment name or numeric id
    pub environment: String,
    pub stack: String,
    pub service: Option<String>,
}

/// A resolved target with the stack state read before any change
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub target: DeploymentTarget,

    /// Manifest in place before the run, the rollback payload
    pub previous: Manifest,

    /// Unix timestamp of the stack's last update
    pub update_date: i64,
}

/// Resolve names to ids and snapshot the stack's current manifest
pub async fn resolve(client: &HttpClient, spec: &TargetSpec) -> Result<ResolvedTarget, DeployError> {
    let endpoint_id = resolve_endpoint(client, &spec.environment).await?;
    debug!("Environment {} resolved to {}", spec.environment, endpoint_id);

    let stack = client
        .list_stacks()
        .await?
        .into_iter()
        .find(|s| s.name == spec.stack && s.endpoint_id == endpoint_id)
        .ok_or_else(|| {
            DeployError::ResolveError(format!(
                "Stack {} not found in environment {}",
                spec.stack, spec.environment
            ))
        })?;

    let content = client.get_stack_file(stack.id).await?;
    if content.trim().is_empty() {
        return Err(DeployError::ManifestError(format!(
            "Stack {} has an empty stack file",
            stack.name
        )));
    }
    let env = stack
        .env
        .unwrap_or_default()
        .into_iter()
        .map(EnvVar::from)
        .collect();

    info!("Resolved stack {} (id {}) on endpoint {}", stack.name, stack.id, endpoint_id);

    Ok(ResolvedTarget {
        target: DeploymentTarget {
            endpoint_id,
            stack_id: stack.id,
            stack_name: stack.name,
            service: spec.service.clone(),
        },
        previous: Manifest::new(content, env),
        update_date: stack.update_date,
    })
}

async fn resolve_endpoint(client: &HttpClient, environment: &str) -> Result<i64, DeployError> {
    if let Ok(id) = environment.parse::<i64>() {
        return Ok(id);
    }
    client
        .list_endpoints()
        .await?
        .into_iter()
        .find(|e| e.name == environment)
        .map(|e| e.id)
        .ok_or_else(|| DeployError::ResolveError(format!("Environment {} not found", environment)))
}
