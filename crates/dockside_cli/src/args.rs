use dockside_core::prelude::*;
use dockside_target::{HealthConfig, TargetConfig};

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "dockside", version, about = "Run and watch jobs on the local Docker daemon")]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy (or redeploy) a job and print its record
    Deploy {
        #[command(flatten)]
        job: JobArgs,
        /// Image tag to deploy
        #[arg(long)]
        tag: String,
        /// Job family used to look up the auth subject. Defaults to the job name.
        #[arg(long)]
        family: Option<String>,
        /// Runtime env var, KEY=VALUE. Repeatable.
        #[arg(long = "env", value_parser = parse_env)]
        env: Vec<(String, String)>,
        /// Number of containers (2 adds the user-module sidecar)
        #[arg(long, default_value_t = 1)]
        containers: usize,
        /// Block until the job is operational
        #[arg(long)]
        wait: bool,
    },
    /// Remove a job's containers
    Delete {
        #[command(flatten)]
        job: JobArgs,
    },
    /// Exit with 0 if the job exists, 1 otherwise
    Exists {
        #[command(flatten)]
        job: JobArgs,
    },
    /// List deployed jobs with their health, one JSON record per line
    List,
    /// Wait until a job is operational
    Wait {
        #[command(flatten)]
        job: JobArgs,
        /// Only accept instances deployed at or after this Unix timestamp
        #[arg(long, default_value_t = 0)]
        deployment_timestamp: i64,
        /// Do not attach recent logs on failure
        #[arg(long)]
        no_logs: bool,
    },
    /// Print the last lines of a job's logs
    Logs {
        #[command(flatten)]
        job: JobArgs,
        #[arg(long, default_value_t = 20)]
        tail: usize,
    },
    /// Follow a job's logs until interrupted
    Follow {
        #[command(flatten)]
        job: JobArgs,
        #[arg(long, default_value_t = 20)]
        tail: usize,
    },
    /// Print the next free host port for a job
    NextPort,
}

#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Job name
    #[arg(long)]
    pub name: String,
    /// Job version
    #[arg(long)]
    pub job_version: String,
}

impl JobArgs {
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::new(&self.name, &self.job_version)
    }
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    #[arg(long, env = "DOCKSIDE_PUB_URL", default_value = "http://pub:7005/pub", global = true)]
    pub pub_url: String,

    #[arg(long, env = "DOCKSIDE_REGISTRY", default_value = "localhost:5000", global = true)]
    pub registry: String,

    #[arg(long, env = "DOCKSIDE_REGISTRY_NAMESPACE", default_value = "jobs", global = true)]
    pub registry_namespace: String,

    #[arg(long, env = "DOCKSIDE_NETWORK", default_value = "dockside_default", global = true)]
    pub network: String,

    #[arg(long, env = "DOCKSIDE_OTEL_ENDPOINT", global = true)]
    pub otel_endpoint: Option<String>,

    #[arg(
        long,
        env = "DOCKSIDE_TRACING_HEADER",
        default_value = dockside_core::constants::DEFAULT_TRACING_HEADER,
        global = true
    )]
    pub tracing_header: String,

    /// Token handed to every job. Development only.
    #[arg(long, env = "DOCKSIDE_AUTH_TOKEN", default_value = "dev-token", global = true)]
    pub auth_token: String,

    /// Seconds to wait for a job to become operational
    #[arg(long, env = "DOCKSIDE_WAIT_TIMEOUT", default_value_t = 900, global = true)]
    pub wait_timeout: u64,
}

impl TargetArgs {
    pub fn target_config(&self) -> TargetConfig {
        TargetConfig {
            internal_pub_url: self.pub_url.clone(),
            docker_registry: self.registry.clone(),
            registry_namespace: self.registry_namespace.clone(),
            network: self.network.clone(),
            open_telemetry_endpoint: self.otel_endpoint.clone(),
            tracing_header_name: self.tracing_header.clone(),
        }
    }

    pub fn health_config(&self) -> HealthConfig {
        HealthConfig {
            timeout: Duration::from_secs(self.wait_timeout),
            ..Default::default()
        }
    }
}

fn parse_env(pair: &str) -> Result<(String, String), String> {
    parse_env_pair(pair).ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))
}
