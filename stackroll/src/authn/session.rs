//! Session acquisition

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::errors::DeployError;
use crate::http::client::HttpClient;

/// Credentials supplied by the operator
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Username and password exchanged for a JWT
    Password {
        username: String,
        password: SecretString,
    },
    /// Access token sent as is on every request
    ApiKey(SecretString),
}

/// Authentication attached to API requests
#[derive(Debug, Clone)]
pub enum ApiAuth {
    Bearer(SecretString),
    ApiKey(SecretString),
}

/// Open an authenticated session
///
/// Password credentials trigger a login call on the unauthenticated
/// `client`; API keys are used directly.
pub async fn authenticate(
    client: &HttpClient,
    credentials: &Credentials,
) -> Result<ApiAuth, DeployError> {
    match credentials {
        Credentials::Password { username, password } => {
            info!("Logging in to {} as {}", client.base_url(), username);
            let jwt = client.login(username, password.expose_secret()).await?;
            if jwt.is_empty() {
                return Err(DeployError::AuthError(
                    "Login succeeded but no token was returned".to_string(),
                ));
            }
            debug!("Login succeeded");
            Ok(ApiAuth::Bearer(SecretString::from(jwt)))
        }
        Credentials::ApiKey(key) => {
            debug!("Using API key authentication");
            Ok(ApiAuth::ApiKey(key.clone()))
        }
    }
}
