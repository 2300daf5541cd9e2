//! Deployment run orchestration

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Instrument};

use crate::app::options::{AppOptions, ManifestSource};
use crate::authn::session::authenticate;
use crate::deploy::executor::DeploymentExecutor;
use crate::deploy::gate::HealthGate;
use crate::deploy::manifest::rewrite_images;
use crate::deploy::outcome::DeploymentReport;
use crate::deploy::portainer::PortainerControlPlane;
use crate::deploy::target::{resolve, ResolvedTarget};
use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::models::deployment::{DeploymentTarget, Manifest};

/// Everything the console needs to report on a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub target: DeploymentTarget,
    pub report: DeploymentReport,

    /// Last update of the stack before this run
    pub previous_update: Option<DateTime<Utc>>,

    pub finished_at: DateTime<Utc>,
}

/// Run a single deployment attempt
///
/// Errors are setup failures (login, resolution, manifest preparation)
/// raised before anything was submitted. Once the new manifest is sent every
/// path ends in a [`DeploymentReport`].
pub async fn run(options: &AppOptions) -> Result<RunSummary, DeployError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let span = info_span!("deploy", run_id = %run_id, stack = %options.target.stack);

    async move {
        let (api, resolved) = init(options).await?;
        let current = build_manifest(&options.manifest_source, &resolved).await?;
        if current == resolved.previous {
            warn!("New manifest is identical to the deployed one");
        }

        let gate = HealthGate::new(&api, options.gate.clone());
        let executor = DeploymentExecutor::new(&api, gate, options.executor.clone());
        let report = executor
            .run(&resolved.target, &current, &resolved.previous, &tokio::time::sleep)
            .await;
        info!("Run finished: {:?}", report.outcome);

        Ok(RunSummary {
            run_id,
            target: resolved.target,
            report,
            previous_update: DateTime::from_timestamp(resolved.update_date, 0)
                .filter(|_| resolved.update_date > 0),
            finished_at: Utc::now(),
        })
    }
    .instrument(span)
    .await
}

// =============================== INITIALIZATION ================================== //

async fn init(options: &AppOptions) -> Result<(PortainerControlPlane, ResolvedTarget), DeployError> {
    let client = HttpClient::new(&options.url, options.request_timeout)?;
    let auth = authenticate(&client, &options.credentials).await?;
    let client = client.with_auth(auth);

    let resolved = resolve(&client, &options.target).await?;
    let api = PortainerControlPlane::new(client, options.submit.clone());
    Ok((api, resolved))
}

async fn build_manifest(
    source: &ManifestSource,
    resolved: &ResolvedTarget,
) -> Result<Manifest, DeployError> {
    let previous = &resolved.previous;
    let content = match source {
        ManifestSource::File(path) => {
            info!("Using manifest from {}", path.display());
            tokio::fs::read_to_string(path).await.map_err(|e| {
                DeployError::ManifestError(format!("Unable to read {}: {}", path.display(), e))
            })?
        }
        ManifestSource::Rewrite(change) => rewrite_images(
            &previous.content,
            change,
            resolved.target.service.as_deref(),
        )?,
    };
    Ok(Manifest::new(content, previous.env.clone()))
}
