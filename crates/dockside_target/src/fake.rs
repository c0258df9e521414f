//! In-process fakes of the runtime and probe seams.

use dockside_core::constants::labels;
use dockside_core::prelude::*;

use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

/// Recorded runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Run(String),
    Remove(String),
    List(ContainerFilter),
    ReadLogs { name: String, tail: usize },
    Follow { name: String, tail: usize },
}

#[derive(Default)]
struct FakeRuntimeState {
    containers: BTreeMap<String, ContainerInfo>,
    specs: Vec<ContainerSpec>,
    calls: Vec<RuntimeCall>,
    logs: HashMap<String, String>,
    fail_run: Option<String>,
    fail_list: bool,
    followers: HashMap<String, Vec<UnboundedSender<Result<String, RuntimeError>>>>,
}

#[derive(Clone, Default)]
pub struct FakeRuntime {
    state: Arc<Mutex<FakeRuntimeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container as if it had been started outside the fake.
    pub fn add_container(&self, info: ContainerInfo) {
        self.state.lock().containers.insert(info.name.clone(), info);
    }

    /// Adds a job container carrying the discovery labels.
    pub fn add_job_container(&self, name: &str, job_name: &str, job_version: &str) {
        self.add_container(ContainerInfo {
            name: name.to_string(),
            labels: HashMap::from([
                (labels::JOB_NAME.to_string(), job_name.to_string()),
                (labels::JOB_VERSION.to_string(), job_version.to_string()),
            ]),
            ports: Vec::new(),
            running: true,
        });
    }

    pub fn container_names(&self) -> Vec<String> {
        self.state.lock().containers.keys().cloned().collect()
    }

    pub fn specs(&self) -> Vec<ContainerSpec> {
        self.state.lock().specs.clone()
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state.lock().calls.clone()
    }

    pub fn set_logs(&self, name: &str, logs: &str) {
        self.state.lock().logs.insert(name.to_string(), logs.to_string());
    }

    /// Makes creating the container with this name fail.
    pub fn fail_run_of(&self, name: &str) {
        self.state.lock().fail_run = Some(name.to_string());
    }

    pub fn fail_list(&self) {
        self.state.lock().fail_list = true;
    }

    pub fn follower_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .followers
            .get(name)
            .map(|f| f.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Pushes a line to every follower of the container.
    pub fn emit_line(&self, name: &str, line: &str) {
        if let Some(followers) = self.state.lock().followers.get(name) {
            for tx in followers {
                let _ = tx.unbounded_send(Ok(line.to_string()));
            }
        }
    }

    /// Breaks every follow stream of the container.
    pub fn fail_follow(&self, name: &str, reason: &str) {
        if let Some(followers) = self.state.lock().followers.remove(name) {
            for tx in followers {
                let _ = tx.unbounded_send(Err(RuntimeError::Command(reason.to_string())));
            }
        }
    }

    /// Ends every follow stream of the container.
    pub fn end_follow(&self, name: &str) {
        self.state.lock().followers.remove(name);
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn run_container(&self, spec: ContainerSpec) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::Run(spec.name.clone()));
        if state.fail_run.as_deref() == Some(spec.name.as_str()) {
            return Err(RuntimeError::Command(format!("pull access denied for {}", spec.image)));
        }
        if state.containers.contains_key(&spec.name) {
            return Err(RuntimeError::Command(format!(
                "container name {} is already in use",
                spec.name
            )));
        }
        state.containers.insert(
            spec.name.clone(),
            ContainerInfo {
                name: spec.name.clone(),
                labels: spec.labels.clone(),
                ports: Vec::new(),
                running: true,
            },
        );
        state.specs.push(spec);
        Ok(())
    }

    async fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> Result<Vec<ContainerInfo>, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::List(filter.clone()));
        if state.fail_list {
            return Err(RuntimeError::System("Cannot connect to the Docker daemon".into()));
        }
        Ok(state
            .containers
            .values()
            .filter(|c| filter.matches(&c.name))
            .cloned()
            .collect())
    }

    async fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::Remove(name.to_string()));
        state.containers.remove(name);
        state.followers.remove(name);
        Ok(())
    }

    async fn read_logs(&self, name: &str, tail: usize) -> Result<String, RuntimeError> {
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::ReadLogs {
            name: name.to_string(),
            tail,
        });
        let logs = state
            .logs
            .get(name)
            .ok_or_else(|| RuntimeError::NotFound(name.to_string()))?;
        let lines: Vec<&str> = logs.lines().collect();
        Ok(lines[lines.len().saturating_sub(tail)..].join("\n"))
    }

    fn follow_logs(
        &self,
        name: &str,
        tail: usize,
    ) -> BoxStream<'static, Result<String, RuntimeError>> {
        let (tx, rx) = unbounded();
        let mut state = self.state.lock();
        state.calls.push(RuntimeCall::Follow {
            name: name.to_string(),
            tail,
        });
        if let Some(logs) = state.logs.get(name) {
            let lines: Vec<&str> = logs.lines().collect();
            for line in &lines[lines.len().saturating_sub(tail)..] {
                let _ = tx.unbounded_send(Ok(line.to_string()));
            }
        }
        state.followers.entry(name.to_string()).or_default().push(tx);
        rx.boxed()
    }
}

/// What a scripted job answers on its probes.
#[derive(Debug, Clone, PartialEq)]
pub enum JobBehavior {
    /// Answers liveness; `ready` decides the readiness probe.
    Live {
        deployment_timestamp: Option<i64>,
        ready: bool,
    },
    /// Nothing listening.
    Unreachable,
    /// Reports a startup error.
    Crashed(String),
}

struct JobScript {
    upcoming: VecDeque<JobBehavior>,
    current: JobBehavior,
    polled: bool,
    metrics: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeProbe {
    jobs: Arc<Mutex<HashMap<String, JobScript>>>,
    liveness_calls: Arc<Mutex<usize>>,
    quick_checks: Arc<Mutex<usize>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the job at `base_url`: each liveness poll moves to the next
    /// behavior, the last one repeats forever.
    pub fn script(&self, base_url: &str, behaviors: Vec<JobBehavior>) {
        let mut upcoming: VecDeque<JobBehavior> = behaviors.into();
        let current = upcoming.pop_front().unwrap_or(JobBehavior::Unreachable);
        let metrics = self.jobs.lock().remove(base_url).and_then(|s| s.metrics);
        self.jobs.lock().insert(
            base_url.to_string(),
            JobScript {
                upcoming,
                current,
                polled: false,
                metrics,
            },
        );
    }

    pub fn set_metrics(&self, base_url: &str, metrics: &str) {
        let mut jobs = self.jobs.lock();
        let script = jobs.entry(base_url.to_string()).or_insert_with(|| JobScript {
            upcoming: VecDeque::new(),
            current: JobBehavior::Unreachable,
            polled: false,
            metrics: None,
        });
        script.metrics = Some(metrics.to_string());
    }

    pub fn liveness_calls(&self) -> usize {
        *self.liveness_calls.lock()
    }

    pub fn quick_checks(&self) -> usize {
        *self.quick_checks.lock()
    }

    fn current(&self, base_url: &str) -> JobBehavior {
        self.jobs
            .lock()
            .get(base_url)
            .map(|s| s.current.clone())
            .unwrap_or(JobBehavior::Unreachable)
    }

    fn advance(&self, base_url: &str) -> JobBehavior {
        let mut jobs = self.jobs.lock();
        match jobs.get_mut(base_url) {
            Some(script) => {
                if script.polled {
                    if let Some(next) = script.upcoming.pop_front() {
                        script.current = next;
                    }
                }
                script.polled = true;
                script.current.clone()
            }
            None => JobBehavior::Unreachable,
        }
    }
}

impl HealthProbe for FakeProbe {
    async fn quick_check(&self, base_url: &str) -> Result<(), HealthError> {
        *self.quick_checks.lock() += 1;
        match self.current(base_url) {
            JobBehavior::Live { .. } => Ok(()),
            JobBehavior::Unreachable => Err(HealthError::Unreachable(format!(
                "{base_url}/live: connection refused"
            ))),
            JobBehavior::Crashed(error) => Err(HealthError::Unhealthy(error)),
        }
    }

    async fn liveness(&self, base_url: &str) -> Result<LivenessReport, HealthError> {
        *self.liveness_calls.lock() += 1;
        match self.advance(base_url) {
            JobBehavior::Live {
                deployment_timestamp,
                ..
            } => Ok(LivenessReport {
                live: true,
                deployment_timestamp,
                error: None,
            }),
            JobBehavior::Unreachable => Err(HealthError::Unreachable(format!(
                "{base_url}/live: connection refused"
            ))),
            JobBehavior::Crashed(error) => Ok(LivenessReport {
                live: false,
                deployment_timestamp: None,
                error: Some(error),
            }),
        }
    }

    async fn readiness(&self, base_url: &str) -> Result<bool, HealthError> {
        match self.current(base_url) {
            JobBehavior::Live { ready, .. } => Ok(ready),
            _ => Ok(false),
        }
    }

    async fn scrape_metrics(&self, url: &str) -> Result<String, HealthError> {
        let base_url = url.trim_end_matches(dockside_core::constants::routes::METRICS);
        self.jobs
            .lock()
            .get(base_url)
            .and_then(|s| s.metrics.clone())
            .ok_or_else(|| HealthError::InvalidResponse(format!("status 404 Not Found: {url}")))
    }
}
