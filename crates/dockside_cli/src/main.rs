mod args;

use args::{Cli, Command};
use dockside_auth_static::StaticAuthSubjects;
use dockside_core::prelude::*;
use dockside_target::{DockerTarget, LogSessionRequest};

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let target = DockerTarget::connect_local(
        cli.target.target_config(),
        cli.target.health_config(),
        StaticAuthSubjects::new(cli.target.auth_token.clone()),
    )
    .context("Failed to connect to Docker")?;

    match cli.command {
        Command::Deploy {
            job,
            tag,
            family,
            env,
            containers,
            wait,
        } => {
            let identity = job.identity();
            let request = DeployRequest {
                family: family.unwrap_or_else(|| identity.name.clone()),
                runtime_env_vars: env.into_iter().collect(),
                containers_num: containers,
                ..DeployRequest::new(identity, tag)
            };
            let record = target.deployer.deploy(request).await?;
            if wait {
                target
                    .monitor
                    .check_job_condition(
                        &record,
                        record.create_time,
                        || tracing::info!("job is alive, waiting until it is ready"),
                        true,
                    )
                    .await?;
            }
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Delete { job } => {
            target.deployer.delete(&job.identity()).await?;
        }
        Command::Exists { job } => {
            if !target.deployer.exists(&job.identity()).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::List => {
            let mut jobs = target.monitor.list_jobs().await?;
            while let Some(job) = jobs.next().await {
                println!("{}", serde_json::to_string(&job)?);
            }
        }
        Command::Wait {
            job,
            deployment_timestamp,
            no_logs,
        } => {
            let record = JobRecord::running(&job.identity(), deployment_timestamp);
            target
                .monitor
                .check_job_condition(&record, deployment_timestamp, || {}, !no_logs)
                .await?;
            tracing::info!(job = %job.identity(), "job is operational");
        }
        Command::Logs { job, tail } => {
            let logs = target
                .monitor
                .read_recent_logs(&job.identity(), tail)
                .await?;
            println!("{logs}");
        }
        Command::Follow { job, tail } => {
            let session_id = "cli";
            target.logs.create_session(
                session_id,
                &LogSessionRequest::new(&job.identity(), tail),
                |_, line| println!("{line}"),
            )?;
            // Runs until Ctrl-C or until the container goes away.
            loop {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        res?;
                        match target.logs.close_session(session_id) {
                            Ok(()) | Err(LogsError::UnknownSession(_)) => break,
                            Err(e) => return Err(e.into()),
                        }
                    }
                    _ = tokio::time::sleep(Duration::from_secs(1)) => {
                        if !target.logs.is_open(session_id) {
                            break;
                        }
                    }
                }
            }
        }
        Command::NextPort => {
            println!("{}", target.ports.next_free_port().await?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
