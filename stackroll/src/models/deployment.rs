//! Deployment models

use serde::{Deserialize, Serialize};

/// Compose label carrying the stack (project) name
pub const PROJECT_LABEL: &str = "com.docker.compose.project";

/// Compose label carrying the service name
pub const SERVICE_LABEL: &str = "com.docker.compose.service";

/// The stack a deployment run acts on
///
/// Built once by resolving environment and stack names, then shared read-only
/// by every component for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    /// Environment (Portainer endpoint) id
    pub endpoint_id: i64,

    /// Stack id
    pub stack_id: i64,

    /// Stack name, which is also the compose project name
    pub stack_name: String,

    /// Restrict the run to a single service of the stack
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl DeploymentTarget {
    /// Label filters selecting the target's containers
    pub fn label_filters(&self) -> Vec<String> {
        let mut labels = vec![format!("{}={}", PROJECT_LABEL, self.stack_name)];
        if let Some(service) = &self.service {
            labels.push(format!("{}={}", SERVICE_LABEL, service));
        }
        labels
    }
}

impl std::fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.service {
            Some(service) => write!(f, "{}/{} (endpoint {})", self.stack_name, service, self.endpoint_id),
            None => write!(f, "{} (endpoint {})", self.stack_name, self.endpoint_id),
        }
    }
}

/// Stack environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// A declarative stack definition and its environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Compose file content, opaque to the deployment core
    pub content: String,

    /// Environment variables submitted with the file
    pub env: Vec<EnvVar>,
}

impl Manifest {
    pub fn new(content: impl Into<String>, env: Vec<EnvVar>) -> Self {
        Self {
            content: content.into(),
            env,
        }
    }
}

impl From<portainer_models::models::Pair> for EnvVar {
    fn from(pair: portainer_models::models::Pair) -> Self {
        Self {
            name: pair.name,
            value: pair.value,
        }
    }
}

impl From<&EnvVar> for portainer_models::models::Pair {
    fn from(var: &EnvVar) -> Self {
        Self {
            name: var.name.clone(),
            value: var.value.clone(),
        }
    }
}
