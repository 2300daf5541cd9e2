//! Docker proxy API client

use portainer_models::models::{ContainerInspect, ContainerSummary};

use crate::errors::DeployError;
use crate::http::client::HttpClient;

/// Size of a Docker stream frame header
const FRAME_HEADER_LEN: usize = 8;

impl HttpClient {
    /// List the containers matching every label filter, stopped ones included
    pub async fn list_containers(
        &self,
        endpoint_id: i64,
        labels: &[String],
    ) -> Result<Vec<ContainerSummary>, DeployError> {
        let path = format!("/api/endpoints/{}/docker/containers/json", endpoint_id);
        let filters = serde_json::json!({ "label": labels }).to_string();
        self.get(&path, &[("all", "1".to_string()), ("filters", filters)])
            .await
    }

    /// Inspect a container
    pub async fn inspect_container(
        &self,
        endpoint_id: i64,
        container_id: &str,
    ) -> Result<ContainerInspect, DeployError> {
        let path = format!(
            "/api/endpoints/{}/docker/containers/{}/json",
            endpoint_id, container_id
        );
        self.get(&path, &[]).await
    }

    /// Fetch the last `tail` lines of stdout and stderr
    ///
    /// `tty` tells whether the container was started with a terminal, in
    /// which case the stream carries no frame headers.
    pub async fn container_logs(
        &self,
        endpoint_id: i64,
        container_id: &str,
        tail: u32,
        tty: bool,
    ) -> Result<String, DeployError> {
        let path = format!(
            "/api/endpoints/{}/docker/containers/{}/logs",
            endpoint_id, container_id
        );
        let raw = self
            .get_bytes(
                &path,
                &[
                    ("stdout", "1".to_string()),
                    ("stderr", "1".to_string()),
                    ("tail", tail.to_string()),
                ],
            )
            .await?;
        if tty {
            Ok(String::from_utf8_lossy(&raw).into_owned())
        } else {
            Ok(demux_log_stream(&raw))
        }
    }
}

/// Strip the frame headers of a multiplexed Docker log stream
pub fn demux_log_stream(raw: &[u8]) -> String {
    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while rest.len() >= FRAME_HEADER_LEN {
        let size = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let end = (FRAME_HEADER_LEN + size).min(rest.len());
        out.extend_from_slice(&rest[FRAME_HEADER_LEN..end]);
        rest = &rest[end..];
    }
    String::from_utf8_lossy(&out).into_owned()
}
