//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::authn::session::ApiAuth;
use crate::errors::DeployError;

/// Header used by Portainer access tokens
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for control plane communication
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth: Option<ApiAuth>,
}

impl HttpClient {
    /// Create a new unauthenticated HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeployError> {
        let parsed = Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DeployError::ConfigError(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: None,
        })
    }

    /// Attach credentials used by every subsequent request
    pub fn with_auth(mut self, auth: ApiAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let request = self.client.request(method, &url);
        match &self.auth {
            Some(ApiAuth::Bearer(jwt)) => request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", jwt.expose_secret()),
            ),
            Some(ApiAuth::ApiKey(key)) => request.header(API_KEY_HEADER, key.expose_secret()),
            None => request,
        }
    }

    async fn ensure_success(method: Method, response: Response) -> Result<Response, DeployError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("HTTP {} failed: {} - {}", method, status, body);
        Err(DeployError::TransportError(format!("{}: {}", status, body)))
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DeployError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        let response = Self::ensure_success(Method::GET, response).await?;
        Ok(response.json().await?)
    }

    /// Make a GET request and return the raw body
    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<u8>, DeployError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        let response = Self::ensure_success(Method::GET, response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DeployError> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        let response = Self::ensure_success(Method::POST, response).await?;
        Ok(response.json().await?)
    }

    /// Make a PUT request, handing back the status and body whatever the status
    pub async fn put_unchecked<B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<(StatusCode, String), DeployError> {
        let response = self
            .request(Method::PUT, path)
            .query(query)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            error!("HTTP PUT failed: {} - {}", status, body);
        }
        Ok((status, body))
    }
}
