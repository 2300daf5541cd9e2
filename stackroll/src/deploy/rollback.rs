//! Rollback to the manifest captured before the run

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::deploy::api::ControlPlane;
use crate::deploy::executor::submit;
use crate::deploy::gate::{GateOutcome, HealthGate};
use crate::deploy::outcome::{DeploymentOutcome, DeploymentReport};
use crate::errors::DeployError;
use crate::models::deployment::{DeploymentTarget, Manifest};

/// Resubmits the previous manifest and verifies the target recovers
pub struct RollbackController<'a> {
    api: &'a dyn ControlPlane,
    gate: &'a HealthGate<'a>,
}

impl<'a> RollbackController<'a> {
    pub fn new(api: &'a dyn ControlPlane, gate: &'a HealthGate<'a>) -> Self {
        Self { api, gate }
    }

    /// Restore `previous` and gate it with the same budget as the forward run
    pub async fn rollback<S, F>(
        &self,
        target: &DeploymentTarget,
        previous: &Manifest,
        budget: Duration,
        sleep_fn: &S,
    ) -> DeploymentReport
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        info!("Rolling back {} to the previous manifest", target);

        let response = match submit(self.api, target, previous).await {
            Ok(response) => response,
            Err(e) => {
                let e = DeployError::RollbackFailed(e.to_string());
                error!("{}", e);
                return DeploymentReport {
                    outcome: DeploymentOutcome::FailedRollbackFailed,
                    forward: None,
                    rollback: None,
                    stack_updated_at: None,
                };
            }
        };

        let report = self.gate.evaluate(target, budget, sleep_fn).await;
        let outcome = match report.outcome {
            GateOutcome::Healthy => {
                info!("Rollback of {} is healthy", target);
                DeploymentOutcome::SucceededAfterRollback
            }
            other => {
                warn!(
                    "{}",
                    DeployError::RollbackFailed(format!("previous manifest is {}", other))
                );
                DeploymentOutcome::FailedRollbackFailed
            }
        };

        DeploymentReport {
            outcome,
            forward: None,
            rollback: Some(report),
            stack_updated_at: response.updated_at,
        }
    }
}
