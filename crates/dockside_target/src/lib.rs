//! # Dockside Target
//!
//! The engine behind the `docker` infrastructure target.
//!
//! - **[`Deployer`]**: (re)deploys a job as one or more named containers.
//! - **[`Monitor`]**: discovers running jobs, probes them and waits for fresh deployments to come up.
//! - **[`LogsStreamer`]**: live log tailing sessions.
//! - **[`PortAllocator`]**: host port bookkeeping for job containers.
//! - **[`EphemeralSecretsStore`]**: process-lifetime secrets, lost on restart.
//!
//! All of them are generic over the [`ContainerRuntime`] and [`HealthProbe`]
//! seams. [`DockerTarget::connect_local`] wires up the production ones.
//!
//! ## Example
//!
//! ```no_run
//! use dockside_auth_static::StaticAuthSubjects;
//! use dockside_core::prelude::*;
//! use dockside_target::{DockerTarget, HealthConfig, TargetConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let target = DockerTarget::connect_local(
//!     TargetConfig::default(),
//!     HealthConfig::default(),
//!     StaticAuthSubjects::new("dev-token"),
//! )?;
//!
//! let request = DeployRequest::new(JobIdentity::new("sentiment", "1.0"), "latest");
//! let job = target.deployer.deploy(request).await?;
//! target
//!     .monitor
//!     .check_job_condition(&job, job.create_time, || {}, true)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deployer;
pub mod logs;
pub mod monitor;
pub mod ports;
pub mod secrets;

#[cfg(test)]
mod fake;

pub use config::{HealthConfig, TargetConfig};
pub use deployer::Deployer;
pub use logs::{LogSessionRequest, LogsStreamer};
pub use monitor::Monitor;
pub use ports::{PortAllocator, first_free_port};
pub use secrets::EphemeralSecretsStore;

use dockside_core::constants::INFRASTRUCTURE_NAME;
use dockside_core::prelude::*;
use dockside_docker::DockerRuntime;
use dockside_health::HttpHealthProbe;

/// Deployer, monitor and log streamer sharing one runtime.
#[derive(Clone)]
pub struct DockerTarget<R, P, A> {
    pub deployer: Deployer<R, A>,
    pub monitor: Monitor<R, P>,
    pub logs: LogsStreamer<R>,
    pub ports: PortAllocator<R>,
}

impl<R, P, A> DockerTarget<R, P, A>
where
    R: ContainerRuntime,
    P: HealthProbe,
    A: AuthSubjectProvider,
{
    pub fn new(
        runtime: R,
        probe: P,
        auth: A,
        config: TargetConfig,
        health: HealthConfig,
        secrets: EphemeralSecretsStore,
    ) -> Self {
        Self {
            deployer: Deployer::new(runtime.clone(), auth, config, secrets),
            monitor: Monitor::new(runtime.clone(), probe, health),
            logs: LogsStreamer::new(runtime.clone()),
            ports: PortAllocator::new(runtime),
        }
    }

    pub fn name(&self) -> &'static str {
        INFRASTRUCTURE_NAME
    }
}

impl<A: AuthSubjectProvider> DockerTarget<DockerRuntime, HttpHealthProbe, A> {
    /// Local Docker daemon, HTTP probes and a fresh ephemeral secrets store.
    pub fn connect_local(
        config: TargetConfig,
        health: HealthConfig,
        auth: A,
    ) -> Result<Self, RuntimeError> {
        let runtime = DockerRuntime::connect_local()?;
        let probe = HttpHealthProbe::new(health.quick_check_timeout);
        Ok(Self::new(
            runtime,
            probe,
            auth,
            config,
            health,
            EphemeralSecretsStore::new(),
        ))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
