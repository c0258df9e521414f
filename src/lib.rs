//! # Dockside
//!
//! A single-host Docker infrastructure target for job platforms.
//!
//! Deploys jobs as named containers, discovers and health-checks them, waits
//! for fresh deployments to become operational and streams their logs.
//!
//! This crate re-exports the core types and, behind feature flags, the
//! runtime, probe and engine implementations.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`docker`** | Docker Engine runtime over `bollard` (`dockside_docker`). |
//! | **`health`** | HTTP health probes and metrics parsing (`dockside_health`). |
//! | **`target`** | Deployer, monitor, log streamer and port allocator (`dockside_target`). |
//! | **`auth_static`** | Fixed-token auth subjects for development (`dockside_auth_static`). |
//! | **`full`** | All of the above. |
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! dockside = { version = "0.3", features = ["full"] }
//! ```
//!
//! ```rust,ignore
//! use dockside::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = DockerTarget::connect_local(
//!         TargetConfig::default(),
//!         HealthConfig::default(),
//!         StaticAuthSubjects::new("dev-token"), // Don't use this in production!
//!     )?;
//!
//!     let job = target
//!         .deployer
//!         .deploy(DeployRequest::new(JobIdentity::new("sentiment", "1.0"), "latest"))
//!         .await?;
//!     target.monitor.check_job_condition(&job, job.create_time, || {}, true).await?;
//!     Ok(())
//! }
//! ```

pub use dockside_core::*;

#[cfg(feature = "docker")]
pub mod docker {
    pub use dockside_docker::*;
}

#[cfg(feature = "health")]
pub mod health {
    pub use dockside_health::*;
}

#[cfg(feature = "target")]
pub mod target {
    pub use dockside_target::*;
}

#[cfg(feature = "auth_static")]
pub mod auth_static {
    pub use dockside_auth_static::*;
}

pub mod prelude {
    pub use dockside_core::prelude::*;

    #[cfg(feature = "docker")]
    pub use dockside_docker::DockerRuntime;

    #[cfg(feature = "health")]
    pub use dockside_health::HttpHealthProbe;

    #[cfg(feature = "target")]
    pub use dockside_target::{
        Deployer, DockerTarget, EphemeralSecretsStore, HealthConfig, LogSessionRequest,
        LogsStreamer, Monitor, PortAllocator, TargetConfig,
    };

    #[cfg(feature = "auth_static")]
    pub use dockside_auth_static::StaticAuthSubjects;
}
