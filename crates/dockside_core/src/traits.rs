use crate::container::{ContainerFilter, ContainerInfo, ContainerSpec};
use crate::env::EnvVars;
use crate::error::*;

use futures::stream::BoxStream;

/// Command surface over the container engine.
pub trait ContainerRuntime: Send + Sync + 'static + Clone {
    /// Creates and starts a detached container.
    fn run_container(
        &self,
        spec: ContainerSpec,
    ) -> impl Future<Output = Result<(), RuntimeError>> + Send;

    /// Lists containers, running or stopped, matching the filter.
    fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> impl Future<Output = Result<Vec<ContainerInfo>, RuntimeError>> + Send;

    /// Force-removes a container. Removing an absent container is not an error.
    fn remove_container(&self, name: &str) -> impl Future<Output = Result<(), RuntimeError>> + Send;

    /// Returns the last `tail` lines of the container's logs.
    fn read_logs(
        &self,
        name: &str,
        tail: usize,
    ) -> impl Future<Output = Result<String, RuntimeError>> + Send;

    /// Streams the last `tail` lines, then keeps following until dropped.
    fn follow_logs(&self, name: &str, tail: usize)
    -> BoxStream<'static, Result<String, RuntimeError>>;

    /// Checks whether a container with exactly this name exists.
    fn container_exists(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<bool, RuntimeError>> + Send {
        let filter = ContainerFilter::Exact(name.to_string());
        async move {
            let containers = self.list_containers(filter).await?;
            Ok(!containers.is_empty())
        }
    }
}

/// Self-reported state of a job, answered on its liveness endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LivenessReport {
    #[serde(default)]
    pub live: bool,
    /// When the running instance was deployed (Unix seconds).
    #[serde(default)]
    pub deployment_timestamp: Option<i64>,
    /// Set when the job failed to initialize.
    #[serde(default)]
    pub error: Option<String>,
}

/// HTTP probes against a job's internal address.
pub trait HealthProbe: Send + Sync + 'static + Clone {
    /// Single fast check that the job is up and not reporting an error.
    fn quick_check(&self, base_url: &str) -> impl Future<Output = Result<(), HealthError>> + Send;

    /// Reads the job's liveness report.
    fn liveness(
        &self,
        base_url: &str,
    ) -> impl Future<Output = Result<LivenessReport, HealthError>> + Send;

    /// Whether the job is ready to serve.
    fn readiness(&self, base_url: &str) -> impl Future<Output = Result<bool, HealthError>> + Send;

    /// Fetches the raw text exposition from `url`.
    fn scrape_metrics(&self, url: &str) -> impl Future<Output = Result<String, HealthError>> + Send;
}

/// Resolves the auth subject a job runs as.
pub trait AuthSubjectProvider: Send + Sync + 'static + Clone {
    /// Returns the token of the auth subject owning `family`.
    fn job_family_token(&self, family: &str)
    -> impl Future<Output = Result<String, AuthError>> + Send;
}

/// Extension point contributing extra runtime env vars at deploy time.
pub trait EnvVarsProvider: Send + Sync + 'static {
    fn job_runtime_env_vars(&self) -> Option<EnvVars>;
}

impl<F> EnvVarsProvider for F
where
    F: Fn() -> Option<EnvVars> + Send + Sync + 'static,
{
    fn job_runtime_env_vars(&self) -> Option<EnvVars> {
        self()
    }
}
