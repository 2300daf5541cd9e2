//! Authentication API client

use portainer_models::models::{AuthRequest, AuthResponse};

use crate::errors::DeployError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Exchange a username and password for a JWT
    pub async fn login(&self, username: &str, password: &str) -> Result<String, DeployError> {
        let body = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .post("/api/auth", &body)
            .await
            .map_err(|e| DeployError::AuthError(format!("Login failed: {}", e)))?;
        Ok(response.jwt)
    }
}
