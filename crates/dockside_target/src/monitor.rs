use crate::config::HealthConfig;

use dockside_core::constants::{JOB_NAME_PREFIX, labels, routes::METRICS};
use dockside_core::prelude::*;
use dockside_health::read_last_call_timestamp;

use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Default number of log lines attached to a failed readiness check.
pub const RECENT_LOGS_TAIL: usize = 20;

/// Stand-in deadline for waits too long to represent.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or(now + FAR_FUTURE)
}

/// Discovers job containers and judges their health.
///
/// Nothing is cached: every call asks the runtime and the jobs again.
#[derive(Clone)]
pub struct Monitor<R, P> {
    runtime: R,
    probe: P,
    health: HealthConfig,
}

impl<R: ContainerRuntime, P: HealthProbe> Monitor<R, P> {
    pub fn new(runtime: R, probe: P, health: HealthConfig) -> Self {
        Self {
            runtime,
            probe,
            health,
        }
    }

    /// Lists every job deployed on the runtime.
    ///
    /// The container listing happens up front; each job is probed only when
    /// the stream reaches it. A job failing its probes is yielded with
    /// [`JobStatus::Error`] instead of ending the stream.
    pub async fn list_jobs(&self) -> Result<BoxStream<'_, JobRecord>, RuntimeError> {
        let containers = self
            .runtime
            .list_containers(ContainerFilter::NamePrefix(JOB_NAME_PREFIX.to_string()))
            .await?;

        let jobs: Vec<(String, JobIdentity)> = containers
            .into_iter()
            .filter_map(|container| {
                let identity = JobIdentity::new(
                    container.label(labels::JOB_NAME)?,
                    container.label(labels::JOB_VERSION)?,
                );
                // Auxiliary containers share the labels of their primary.
                (container.name == identity.resource_name()).then_some((container.name, identity))
            })
            .collect();

        tracing::debug!(jobs = jobs.len(), "discovered job containers");

        Ok(stream::iter(jobs)
            .map(move |(resource_name, identity)| self.inspect_job(resource_name, identity))
            .buffered(self.health.discovery_concurrency.max(1))
            .boxed())
    }

    async fn inspect_job(&self, resource_name: String, identity: JobIdentity) -> JobRecord {
        let now = Utc::now().timestamp();
        let mut job = JobRecord {
            internal_name: internal_address(&resource_name),
            ..JobRecord::running(&identity, now)
        };

        match self.probe_job(&job.base_url()).await {
            Ok(last_call_time) => job.last_call_time = last_call_time,
            Err(e) => {
                tracing::warn!(job = %identity, error = %e, "job is in bad condition");
                job.status = JobStatus::Error;
                job.error = Some(e.to_string());
            }
        }
        job
    }

    async fn probe_job(&self, base_url: &str) -> Result<Option<i64>, HealthError> {
        self.probe.quick_check(base_url).await?;
        let metrics = self
            .probe
            .scrape_metrics(&format!("{base_url}{METRICS}"))
            .await?;
        Ok(read_last_call_timestamp(&metrics))
    }

    /// Blocks until the job is operational and runs the instance deployed at
    /// `deployment_timestamp` or later.
    ///
    /// `on_alive` fires on every poll that finds the job alive but not yet
    /// qualifying. With `logs_on_error` the error carries the job's recent logs.
    pub async fn check_job_condition(
        &self,
        job: &JobRecord,
        deployment_timestamp: i64,
        on_alive: impl FnMut() + Send,
        logs_on_error: bool,
    ) -> Result<(), MonitorError> {
        let cause = match self
            .wait_until_operational(&job.base_url(), deployment_timestamp, on_alive)
            .await
        {
            Ok(()) => return Ok(()),
            Err(cause) => cause,
        };

        let logs = if logs_on_error {
            Some(
                self.read_recent_logs(&job.identity(), RECENT_LOGS_TAIL)
                    .await
                    .unwrap_or_else(|e| format!("<logs unavailable: {e}>")),
            )
        } else {
            None
        };
        Err(MonitorError::NotOperational { cause, logs })
    }

    async fn wait_until_operational(
        &self,
        base_url: &str,
        deployment_timestamp: i64,
        mut on_alive: impl FnMut() + Send,
    ) -> Result<(), HealthError> {
        let deadline = deadline_after(self.health.timeout);
        let mut last_state: String;

        loop {
            match self.probe.liveness(base_url).await {
                Ok(LivenessReport {
                    error: Some(error), ..
                }) => return Err(HealthError::Unhealthy(error)),
                Ok(report) if report.live => {
                    let fresh = deployment_timestamp == 0
                        || report
                            .deployment_timestamp
                            .is_some_and(|ts| ts >= deployment_timestamp);

                    if !fresh {
                        last_state = format!(
                            "job still runs a previous deployment (deployed at {:?}, expected {})",
                            report.deployment_timestamp, deployment_timestamp
                        );
                    } else {
                        match self.probe.readiness(base_url).await {
                            Ok(true) => {
                                tracing::info!(base_url, "job is operational");
                                return Ok(());
                            }
                            Ok(false) => last_state = "job is alive but not ready".into(),
                            Err(HealthError::Unhealthy(error)) => {
                                return Err(HealthError::Unhealthy(error));
                            }
                            Err(e) => last_state = e.to_string(),
                        }
                    }
                    on_alive();
                }
                Ok(_) => last_state = "job is not live yet".into(),
                Err(HealthError::Unhealthy(error)) => return Err(HealthError::Unhealthy(error)),
                Err(e) => last_state = e.to_string(),
            }

            tracing::debug!(base_url, state = %last_state, "waiting for job");
            if deadline_after(self.health.interval) > deadline {
                return Err(HealthError::Timeout(format!(
                    "job did not become operational within {}s: {}",
                    self.health.timeout.as_secs(),
                    last_state
                )));
            }
            sleep(self.health.interval).await;
        }
    }

    /// Last `tail` lines of the job's primary container.
    pub async fn read_recent_logs(
        &self,
        identity: &JobIdentity,
        tail: usize,
    ) -> Result<String, RuntimeError> {
        self.runtime
            .read_logs(&container_name(&identity.resource_name(), 0), tail)
            .await
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
