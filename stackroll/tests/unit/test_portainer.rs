//! Portainer client tests against a mocked API

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stackroll::authn::session::{authenticate, Credentials};
use stackroll::deploy::api::ControlPlane;
use stackroll::deploy::portainer::{PortainerControlPlane, SubmitOptions};
use stackroll::deploy::target::{resolve, TargetSpec};
use stackroll::errors::DeployError;
use stackroll::http::client::HttpClient;
use stackroll::models::deployment::{DeploymentTarget, EnvVar, Manifest};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn logged_in(server: &MockServer) -> HttpClient {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_partial_json(json!({ "username": "ci", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jwt": "token-123" })))
        .mount(server)
        .await;

    let client = HttpClient::new(&server.uri(), TIMEOUT).unwrap();
    let credentials = Credentials::Password {
        username: "ci".to_string(),
        password: SecretString::from("hunter2".to_string()),
    };
    let auth = authenticate(&client, &credentials).await.unwrap();
    client.with_auth(auth)
}

fn target() -> DeploymentTarget {
    DeploymentTarget {
        endpoint_id: 3,
        stack_id: 14,
        stack_name: "shop".to_string(),
        service: Some("api".to_string()),
    }
}

#[tokio::test]
async fn test_login_failure_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Invalid credentials"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), TIMEOUT).unwrap();
    let credentials = Credentials::Password {
        username: "ci".to_string(),
        password: SecretString::from("wrong".to_string()),
    };
    let result = authenticate(&client, &credentials).await;
    assert!(matches!(result, Err(DeployError::AuthError(_))));
}

#[tokio::test]
async fn test_resolve_by_name_snapshots_previous_manifest() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .and(header("Authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id": 1, "Name": "staging" },
            { "Id": 3, "Name": "production" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stacks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id": 9, "Name": "shop", "EndpointId": 1 },
            { "Id": 14, "Name": "shop", "EndpointId": 3, "UpdateDate": 1718000000,
              "Env": [{ "name": "LOG_LEVEL", "value": "info" }] }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stacks/14/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "StackFileContent": "services:\n  api:\n    image: shop/api:1.9\n"
        })))
        .mount(&server)
        .await;

    let spec = TargetSpec {
        environment: "production".to_string(),
        stack: "shop".to_string(),
        service: None,
    };
    let resolved = resolve(&client, &spec).await.unwrap();

    assert_eq!(resolved.target.endpoint_id, 3);
    assert_eq!(resolved.target.stack_id, 14);
    assert_eq!(resolved.update_date, 1718000000);
    assert!(resolved.previous.content.contains("shop/api:1.9"));
    assert_eq!(
        resolved.previous.env,
        vec![EnvVar {
            name: "LOG_LEVEL".to_string(),
            value: "info".to_string()
        }]
    );
}

#[tokio::test]
async fn test_resolve_unknown_stack() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/stacks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let spec = TargetSpec {
        environment: "3".to_string(),
        stack: "shop".to_string(),
        service: None,
    };
    let result = resolve(&client, &spec).await;
    assert!(matches!(result, Err(DeployError::ResolveError(_))));
}

#[tokio::test]
async fn test_submit_passes_rejection_through() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/stacks/14"))
        .and(query_param("endpointId", "3"))
        .and(body_partial_json(json!({ "prune": true, "pullImage": true })))
        .respond_with(ResponseTemplate::new(500).set_body_string("failed to deploy a stack"))
        .mount(&server)
        .await;

    let api = PortainerControlPlane::new(client, SubmitOptions::default());
    let manifest = Manifest::new("services: {}", vec![]);
    let response = api.submit_manifest(&target(), &manifest).await.unwrap();

    assert!(!response.success);
    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, "failed to deploy a stack");
    assert!(response.updated_at.is_none());
}

#[tokio::test]
async fn test_submit_reads_update_date() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/stacks/14"))
        .and(query_param("endpointId", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": 14, "Name": "shop", "EndpointId": 3, "UpdateDate": 1718000300
        })))
        .mount(&server)
        .await;

    let api = PortainerControlPlane::new(client, SubmitOptions::default());
    let manifest = Manifest::new("services: {}", vec![]);
    let response = api.submit_manifest(&target(), &manifest).await.unwrap();

    assert!(response.success);
    assert_eq!(response.updated_at.map(|t| t.timestamp()), Some(1718000300));
}

#[tokio::test]
async fn test_list_and_inspect_containers() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    let filters = json!({
        "label": ["com.docker.compose.project=shop", "com.docker.compose.service=api"]
    })
    .to_string();
    Mock::given(method("GET"))
        .and(path("/api/endpoints/3/docker/containers/json"))
        .and(query_param("all", "1"))
        .and(query_param("filters", filters.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id": "c0ffee", "Names": ["/shop-api-1"], "State": "running", "Status": "Up 3 seconds (health: starting)" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/endpoints/3/docker/containers/c0ffee/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "c0ffee",
            "Name": "/shop-api-1",
            "State": { "Status": "running", "Running": true, "Health": { "Status": "starting", "FailingStreak": 0 } }
        })))
        .mount(&server)
        .await;

    let api = PortainerControlPlane::new(client, SubmitOptions::default());
    let containers = api.list_containers(&target()).await.unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].name, "shop-api-1");

    let detail = api.inspect_container(&target(), "c0ffee").await.unwrap();
    assert_eq!(detail.health.as_deref(), Some("starting"));
    assert_eq!(detail.runtime_status, "running");
}

#[tokio::test]
async fn test_inspect_error_is_transport_error() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/endpoints/3/docker/containers/gone/json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No such container"))
        .mount(&server)
        .await;

    let api = PortainerControlPlane::new(client, SubmitOptions::default());
    let result = api.inspect_container(&target(), "gone").await;
    assert!(matches!(result, Err(DeployError::TransportError(_))));
}

async fn mount_inspect(server: &MockServer, tty: bool) {
    Mock::given(method("GET"))
        .and(path("/api/endpoints/3/docker/containers/c0ffee/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "c0ffee",
            "Name": "/shop-api-1",
            "State": { "Status": "running", "Health": { "Status": "unhealthy" } },
            "Config": { "Tty": tty }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_logs_demultiplexes() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    mount_inspect(&server, false).await;
    let mut body = vec![2u8, 0, 0, 0, 0, 0, 0, 12];
    body.extend_from_slice(b"fatal: boom\n");
    Mock::given(method("GET"))
        .and(path("/api/endpoints/3/docker/containers/c0ffee/logs"))
        .and(query_param("tail", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let api = PortainerControlPlane::new(client, SubmitOptions::default());
    let logs = api.fetch_logs(&target(), "c0ffee", 20).await.unwrap();
    assert_eq!(logs, "fatal: boom\n");
}

#[tokio::test]
async fn test_fetch_logs_of_tty_container_is_raw() {
    let server = MockServer::start().await;
    let client = logged_in(&server).await;

    mount_inspect(&server, true).await;
    // starts like a frame header but the container has a terminal
    let body = b"\x01\x00\x00\x00ready\n".to_vec();
    Mock::given(method("GET"))
        .and(path("/api/endpoints/3/docker/containers/c0ffee/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let api = PortainerControlPlane::new(client, SubmitOptions::default());
    let logs = api.fetch_logs(&target(), "c0ffee", 20).await.unwrap();
    assert_eq!(logs.as_bytes(), body.as_slice());
}

#[tokio::test]
async fn test_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .and(header("X-API-Key", "ptr_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "Id": 5, "Name": "edge" }])))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), TIMEOUT).unwrap();
    let auth = authenticate(&client, &Credentials::ApiKey(SecretString::from("ptr_abc".to_string())))
        .await
        .unwrap();
    let endpoints = client.with_auth(auth).list_endpoints().await.unwrap();
    assert_eq!(endpoints[0].id, 5);
}

#[test]
fn test_rejects_non_http_url() {
    assert!(matches!(
        HttpClient::new("ftp://portainer.local", TIMEOUT),
        Err(DeployError::ConfigError(_))
    ));
    assert!(HttpClient::new("not a url", TIMEOUT).is_err());
}
