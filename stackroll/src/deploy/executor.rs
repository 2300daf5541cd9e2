//! Forward deployment: submit, gate, hand over to rollback

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::deploy::api::{ControlPlane, SubmitResponse};
use crate::deploy::gate::{GateOutcome, HealthGate};
use crate::deploy::outcome::{DeploymentOutcome, DeploymentReport};
use crate::deploy::rollback::RollbackController;
use crate::errors::DeployError;
use crate::models::deployment::{DeploymentTarget, Manifest};

/// Executor options
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Time allowed to each health gate session
    pub budget: Duration,

    /// Restore the previous manifest when the new one fails
    pub rollback_enabled: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(300),
            rollback_enabled: true,
        }
    }
}

/// Submit a manifest, turning a refused submission into `SubmissionRejected`
pub(crate) async fn submit(
    api: &dyn ControlPlane,
    target: &DeploymentTarget,
    manifest: &Manifest,
) -> Result<SubmitResponse, DeployError> {
    let response = api.submit_manifest(target, manifest).await?;
    if !response.success {
        return Err(DeployError::SubmissionRejected(format!(
            "{}: {}",
            response.status_code, response.body
        )));
    }
    Ok(response)
}

/// Drives one deployment attempt
pub struct DeploymentExecutor<'a> {
    api: &'a dyn ControlPlane,
    gate: HealthGate<'a>,
    options: ExecutorOptions,
}

impl<'a> DeploymentExecutor<'a> {
    pub fn new(api: &'a dyn ControlPlane, gate: HealthGate<'a>, options: ExecutorOptions) -> Self {
        Self { api, gate, options }
    }

    /// Apply `current`, falling back to `previous` when it does not take hold
    ///
    /// `previous` must be the snapshot read before any submission of this run.
    pub async fn run<S, F>(
        &self,
        target: &DeploymentTarget,
        current: &Manifest,
        previous: &Manifest,
        sleep_fn: &S,
    ) -> DeploymentReport
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        info!("Submitting new manifest for {}", target);

        let mut forward = None;
        let mut stack_updated_at = None;
        let submission = submit(self.api, target, current).await;

        match &submission {
            Ok(response) => {
                stack_updated_at = response.updated_at;
                let report = self.gate.evaluate(target, self.options.budget, sleep_fn).await;
                let outcome = report.outcome;
                forward = Some(report);

                if outcome == GateOutcome::Healthy {
                    info!("Deployment of {} succeeded", target);
                    return DeploymentReport {
                        outcome: DeploymentOutcome::Succeeded,
                        forward,
                        rollback: None,
                        stack_updated_at,
                    };
                }
                warn!("New manifest did not pass the health gate: {}", outcome);
            }
            Err(e) => {
                error!("Manifest submission failed: {}", e);
            }
        }

        if !self.options.rollback_enabled {
            warn!("Rollback disabled, leaving {} as is", target);
            return DeploymentReport {
                outcome: DeploymentOutcome::Failed,
                forward,
                rollback: None,
                stack_updated_at,
            };
        }

        let rollback = RollbackController::new(self.api, &self.gate);
        let mut report = rollback
            .rollback(target, previous, self.options.budget, sleep_fn)
            .await;

        // the new state never took hold, so a healthy rollback only confirms
        // the previous state rather than recovering from the new one
        if submission.is_err() && report.outcome == DeploymentOutcome::SucceededAfterRollback {
            report.outcome = DeploymentOutcome::FailedRollbackSucceeded;
        }

        report.forward = forward;
        report.stack_updated_at = report.stack_updated_at.or(stack_updated_at);
        report
    }
}
