//! API models

use serde::{Deserialize, Serialize};

// ================================== AUTH ======================================= //

/// Login request for `POST /api/auth`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
}

// ================================= ENDPOINTS =================================== //

/// A Portainer environment (called an endpoint by the API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    pub id: i64,
    pub name: String,
}

// ================================== STACKS ===================================== //

/// Stack environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub name: String,
    pub value: String,
}

/// A stack as returned by `GET /api/stacks`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stack {
    pub id: i64,
    pub name: String,
    pub endpoint_id: i64,
    #[serde(default)]
    pub env: Option<Vec<Pair>>,
    /// Unix timestamp of the last update, zero when never updated
    #[serde(default)]
    pub update_date: i64,
}

/// Response of `GET /api/stacks/{id}/file`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackFileResponse {
    pub stack_file_content: String,
}

/// Body of `PUT /api/stacks/{id}?endpointId={endpoint}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStackRequest {
    pub stack_file_content: String,
    pub env: Vec<Pair>,
    pub prune: bool,
    pub pull_image: bool,
}

// ================================ CONTAINERS =================================== //

/// Entry of `GET /api/endpoints/{id}/docker/containers/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
}

/// Response of `GET /api/endpoints/{id}/docker/containers/{cid}/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInspect {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub state: ContainerState,
    #[serde(default)]
    pub config: Option<ContainerConfig>,
}

/// Runtime state block of an inspected container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    #[serde(default)]
    pub status: String,
    /// Absent when the image defines no health check
    #[serde(default)]
    pub health: Option<ContainerHealth>,
}

/// Health-check block of an inspected container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerHealth {
    pub status: String,
}

/// Container configuration subset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    /// Started with a terminal, so logs are not multiplexed
    #[serde(default)]
    pub tty: bool,
}
