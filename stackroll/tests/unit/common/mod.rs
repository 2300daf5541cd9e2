//! Scripted control plane shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stackroll::deploy::api::{ContainerDetail, ContainerRef, ControlPlane, SubmitResponse};
use stackroll::errors::DeployError;
use stackroll::models::deployment::{DeploymentTarget, Manifest};

/// Update time the fake reports for its `n`th accepted submission
pub fn submitted_at(n: usize) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + n as i64 * 60, 0).unwrap()
}

/// A container as seen by one round: id, health-check status, runtime status
pub type Observed = (&'static str, Option<&'static str>, &'static str);

/// Control plane replaying scripted rounds
///
/// Each `list_containers` call consumes the next round; the last round keeps
/// being replayed once the script is exhausted.
pub struct FakeControlPlane {
    rounds: Mutex<VecDeque<Vec<Observed>>>,
    current: Mutex<Vec<Observed>>,
    submit_results: Mutex<VecDeque<bool>>,
    pub submissions: Mutex<Vec<Manifest>>,
    pub list_calls: AtomicU32,
    pub log_calls: AtomicU32,
    pub fail_inspect: bool,
}

impl FakeControlPlane {
    pub fn new(rounds: Vec<Vec<Observed>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            current: Mutex::new(Vec::new()),
            submit_results: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(Vec::new()),
            list_calls: AtomicU32::new(0),
            log_calls: AtomicU32::new(0),
            fail_inspect: false,
        }
    }

    /// Script the success of successive submissions, later ones succeed
    pub fn with_submit_results(self, results: Vec<bool>) -> Self {
        *self.submit_results.lock().unwrap() = results.into();
        self
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn list_count(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn submit_manifest(
        &self,
        _target: &DeploymentTarget,
        manifest: &Manifest,
    ) -> Result<SubmitResponse, DeployError> {
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(manifest.clone());
        let success = self.submit_results.lock().unwrap().pop_front().unwrap_or(true);
        Ok(SubmitResponse {
            success,
            status_code: if success { 200 } else { 500 },
            body: if success { "{}".to_string() } else { "stack update failed".to_string() },
            updated_at: success.then(|| submitted_at(submissions.len())),
        })
    }

    async fn list_containers(
        &self,
        _target: &DeploymentTarget,
    ) -> Result<Vec<ContainerRef>, DeployError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut current = self.current.lock().unwrap();
        if let Some(next) = self.rounds.lock().unwrap().pop_front() {
            *current = next;
        }
        Ok(current
            .iter()
            .map(|(id, _, _)| ContainerRef {
                id: id.to_string(),
                name: format!("shop-{}", id),
            })
            .collect())
    }

    async fn inspect_container(
        &self,
        _target: &DeploymentTarget,
        id: &str,
    ) -> Result<ContainerDetail, DeployError> {
        if self.fail_inspect {
            return Err(DeployError::TransportError("502 Bad Gateway".to_string()));
        }
        let current = self.current.lock().unwrap();
        let (_, health, runtime) = current
            .iter()
            .find(|(cid, _, _)| *cid == id)
            .ok_or_else(|| DeployError::TransportError(format!("404: no such container {}", id)))?;
        Ok(ContainerDetail {
            name: format!("/shop-{}", id),
            health: health.map(str::to_string),
            runtime_status: runtime.to_string(),
        })
    }

    async fn fetch_logs(
        &self,
        _target: &DeploymentTarget,
        id: &str,
        tail_lines: u32,
    ) -> Result<String, DeployError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("last {} lines of {}\nerror: connection refused\n", tail_lines, id))
    }
}

pub fn target() -> DeploymentTarget {
    DeploymentTarget {
        endpoint_id: 2,
        stack_id: 14,
        stack_name: "shop".to_string(),
        service: None,
    }
}

pub fn healthy(id: &'static str) -> Observed {
    (id, Some("healthy"), "running")
}

pub fn unhealthy(id: &'static str) -> Observed {
    (id, Some("unhealthy"), "running")
}

pub fn starting(id: &'static str) -> Observed {
    (id, Some("starting"), "running")
}

/// Counts the sleeps requested by the gate while advancing paused time
pub struct SleepCounter {
    count: AtomicU32,
}

impl SleepCounter {
    pub fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn sleep(&self, duration: Duration) -> tokio::time::Sleep {
        self.count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(duration)
    }
}
