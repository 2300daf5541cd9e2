//! Final outcome of a deployment run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deploy::gate::GateReport;

/// Composite result of a full run, mapped to the process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentOutcome {
    /// The new manifest was applied and passed the health gate
    Succeeded,
    /// The new manifest failed the gate, the previous one was restored and is healthy
    SucceededAfterRollback,
    /// The new manifest was refused, the previous one was resubmitted and is healthy
    FailedRollbackSucceeded,
    /// The deployment failed and the rollback did not restore a healthy state
    FailedRollbackFailed,
    /// The deployment failed and rollback was disabled
    Failed,
}

impl DeploymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Succeeded)
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            DeploymentOutcome::Succeeded => 0,
            DeploymentOutcome::SucceededAfterRollback | DeploymentOutcome::FailedRollbackSucceeded => 1,
            DeploymentOutcome::Failed => 2,
            DeploymentOutcome::FailedRollbackFailed => 3,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DeploymentOutcome::Succeeded => "Deployment succeeded",
            DeploymentOutcome::SucceededAfterRollback => {
                "Deployment failed, rolled back to the previous version successfully"
            }
            DeploymentOutcome::FailedRollbackSucceeded => {
                "Deployment was rejected, the previous version was restored successfully"
            }
            DeploymentOutcome::FailedRollbackFailed => {
                "Deployment failed and the rollback also failed, manual intervention required"
            }
            DeploymentOutcome::Failed => "Deployment failed, rollback is disabled",
        }
    }
}

/// Outcome of a run together with the health gate sessions it went through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    pub outcome: DeploymentOutcome,

    /// Gate session of the new manifest, absent when its submission failed
    pub forward: Option<GateReport>,

    /// Gate session of the restored manifest, absent when no rollback was
    /// gated
    pub rollback: Option<GateReport>,

    /// Update time of the last manifest the control plane accepted
    pub stack_updated_at: Option<DateTime<Utc>>,
}
