//! Stack and environment API client

use portainer_models::models::{Endpoint, Stack, StackFileResponse, UpdateStackRequest};
use reqwest::StatusCode;

use crate::errors::DeployError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List environments
    pub async fn list_endpoints(&self) -> Result<Vec<Endpoint>, DeployError> {
        self.get("/api/endpoints", &[]).await
    }

    /// List stacks across all environments
    pub async fn list_stacks(&self) -> Result<Vec<Stack>, DeployError> {
        self.get("/api/stacks", &[]).await
    }

    /// Get a stack's compose file
    pub async fn get_stack_file(&self, stack_id: i64) -> Result<String, DeployError> {
        let path = format!("/api/stacks/{}/file", stack_id);
        let response: StackFileResponse = self.get(&path, &[]).await?;
        Ok(response.stack_file_content)
    }

    /// Replace a stack's compose file and environment
    pub async fn update_stack(
        &self,
        stack_id: i64,
        endpoint_id: i64,
        request: &UpdateStackRequest,
    ) -> Result<(StatusCode, String), DeployError> {
        let path = format!("/api/stacks/{}", stack_id);
        self.put_unchecked(&path, &[("endpointId", endpoint_id.to_string())], request)
            .await
    }
}
