//! Health gate: repeated sampling until the target settles

use std::future::Future;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::deploy::api::ControlPlane;
use crate::deploy::sampler::{ContainerObservation, HealthSampler, HealthStatus};
use crate::models::deployment::DeploymentTarget;

/// How to judge a container that has no health check configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingHealthCheck {
    /// The container can never be confirmed healthy, so the round fails
    #[default]
    Fail,
    /// Fall back to the runtime status: running is healthy, created or
    /// restarting is still starting, anything else is unhealthy
    RuntimeStatus,
}

/// Gate settings
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Delay between two sampling rounds
    pub poll_interval: Duration,

    /// Policy for containers without a health check
    pub missing_health_check: MissingHealthCheck,

    /// Lines of logs fetched for each unhealthy container
    pub log_tail_lines: u32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            missing_health_check: MissingHealthCheck::Fail,
            log_tail_lines: 50,
        }
    }
}

/// Terminal result of a polling session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Healthy,
    Unhealthy,
    TimedOut,
    TargetNotFound,
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GateOutcome::Healthy => "healthy",
            GateOutcome::Unhealthy => "unhealthy",
            GateOutcome::TimedOut => "timed out",
            GateOutcome::TargetNotFound => "target not found",
        };
        f.write_str(s)
    }
}

/// Verdict over a single sampling round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundVerdict {
    /// Every container is healthy
    Healthy,
    /// At least one container is still starting and none has failed
    Pending,
    /// At least one container is unhealthy, unmonitored or unrecognized
    Failed,
    /// The round observed no container at all
    Empty,
}

/// Health status of an observation once the missing-health-check policy
/// has been applied
pub fn effective_status(observation: &ContainerObservation, policy: MissingHealthCheck) -> HealthStatus {
    match (observation.status, policy) {
        (HealthStatus::Missing, MissingHealthCheck::RuntimeStatus) => {
            match observation.runtime_status.as_str() {
                "running" => HealthStatus::Healthy,
                "created" | "restarting" => HealthStatus::Starting,
                _ => HealthStatus::Unhealthy,
            }
        }
        (status, _) => status,
    }
}

/// Classify a round by its worst observation
///
/// Unhealthy, missing and unknown dominate starting, which dominates healthy.
pub fn classify_round(observations: &[ContainerObservation], policy: MissingHealthCheck) -> RoundVerdict {
    if observations.is_empty() {
        return RoundVerdict::Empty;
    }

    let mut verdict = RoundVerdict::Healthy;
    for observation in observations {
        match effective_status(observation, policy) {
            HealthStatus::Unhealthy | HealthStatus::Missing | HealthStatus::Unknown => {
                return RoundVerdict::Failed;
            }
            HealthStatus::Starting => verdict = RoundVerdict::Pending,
            HealthStatus::Healthy => {}
        }
    }
    verdict
}

/// A container that failed the gate, with the tail of its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedContainer {
    pub observation: ContainerObservation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// Result of one polling session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub outcome: GateOutcome,

    /// Number of sampling rounds taken
    pub rounds: u32,

    /// Containers that made the gate fail, empty unless `outcome` is unhealthy
    pub failed: Vec<FailedContainer>,
}

impl GateReport {
    fn new(outcome: GateOutcome, rounds: u32) -> Self {
        Self {
            outcome,
            rounds,
            failed: Vec::new(),
        }
    }
}

/// Drives the sampler until the target is healthy, failed or out of time
pub struct HealthGate<'a> {
    api: &'a dyn ControlPlane,
    sampler: HealthSampler<'a>,
    settings: GateSettings,
}

impl<'a> HealthGate<'a> {
    pub fn new(api: &'a dyn ControlPlane, settings: GateSettings) -> Self {
        Self {
            api,
            sampler: HealthSampler::new(api),
            settings,
        }
    }

    /// Poll the target until it reaches a terminal state or `budget` runs out
    ///
    /// The deadline is fixed on entry and checked before each new round. Only
    /// a pending round leads to another one; sampling errors end the session
    /// at once as `TargetNotFound`.
    pub async fn evaluate<S, F>(
        &self,
        target: &DeploymentTarget,
        budget: Duration,
        sleep_fn: &S,
    ) -> GateReport
    where
        S: Fn(Duration) -> F,
        F: Future<Output = ()>,
    {
        let deadline = Instant::now() + budget;
        let policy = self.settings.missing_health_check;
        let mut rounds = 0;

        info!("Waiting up to {:?} for {} to become healthy", budget, target);

        loop {
            rounds += 1;

            let observations = match self.sampler.sample(target).await {
                Ok(observations) => observations,
                Err(e) => {
                    warn!("Health sampling failed: {}", e);
                    return GateReport::new(GateOutcome::TargetNotFound, rounds);
                }
            };

            match classify_round(&observations, policy) {
                RoundVerdict::Healthy => {
                    info!("All {} containers healthy after {} round(s)", observations.len(), rounds);
                    return GateReport::new(GateOutcome::Healthy, rounds);
                }
                RoundVerdict::Empty => {
                    warn!("No containers running for {}", target);
                    return GateReport::new(GateOutcome::TargetNotFound, rounds);
                }
                RoundVerdict::Failed => {
                    let mut report = GateReport::new(GateOutcome::Unhealthy, rounds);
                    report.failed = self.collect_failures(target, &observations).await;
                    return report;
                }
                RoundVerdict::Pending => {
                    let starting = observations
                        .iter()
                        .filter(|o| effective_status(o, policy) == HealthStatus::Starting)
                        .count();
                    debug!(
                        "Round {}: {}/{} containers still starting",
                        rounds,
                        starting,
                        observations.len()
                    );
                }
            }

            sleep_fn(self.settings.poll_interval).await;

            if Instant::now() >= deadline {
                warn!("Health check budget of {:?} exhausted after {} round(s)", budget, rounds);
                return GateReport::new(GateOutcome::TimedOut, rounds);
            }
        }
    }

    async fn collect_failures(
        &self,
        target: &DeploymentTarget,
        observations: &[ContainerObservation],
    ) -> Vec<FailedContainer> {
        let policy = self.settings.missing_health_check;
        let mut failed = Vec::new();

        for observation in observations {
            let logs = match effective_status(observation, policy) {
                HealthStatus::Unhealthy => {
                    match self
                        .api
                        .fetch_logs(target, &observation.id, self.settings.log_tail_lines)
                        .await
                    {
                        Ok(logs) => {
                            warn!(
                                container = %observation.name,
                                "Container is unhealthy, last log lines:\n{}",
                                logs
                            );
                            Some(logs)
                        }
                        Err(e) => {
                            warn!("Unable to fetch logs of {}: {}", observation.name, e);
                            None
                        }
                    }
                }
                HealthStatus::Missing => {
                    warn!("Container {} has no health check configured", observation.name);
                    None
                }
                HealthStatus::Unknown => {
                    warn!("Container {} reports an unrecognized health status", observation.name);
                    None
                }
                HealthStatus::Healthy | HealthStatus::Starting => continue,
            };

            failed.push(FailedContainer {
                observation: observation.clone(),
                logs,
            });
        }

        failed
    }
}
