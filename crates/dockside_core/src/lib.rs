//! # Dockside Core
//!
//! Types and traits shared by the dockside crates.
//!
//! - **[`JobIdentity`](job::JobIdentity)** / **[`JobRecord`](job::JobRecord)**: what a job is and how it was last observed.
//! - **[`ContainerRuntime`](traits::ContainerRuntime)**: command surface over the container engine.
//! - **[`HealthProbe`](traits::HealthProbe)**: HTTP probes against a running job.
//! - **[`AuthSubjectProvider`](traits::AuthSubjectProvider)**: token lookup for a job family.
//! - **[`EnvVarsProvider`](traits::EnvVarsProvider)**: extension hooks adding runtime env vars.

pub mod constants;
pub mod container;
pub mod env;
pub mod error;
pub mod job;
pub mod traits;

pub mod prelude {
    pub use super::constants;
    pub use super::container::*;
    pub use super::env::*;
    pub use super::error::*;
    pub use super::job::*;
    pub use super::traits::*;
}
