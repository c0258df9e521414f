use super::*;
use crate::fake::{FakeProbe, FakeRuntime, JobBehavior};
use dockside_auth_static::StaticAuthSubjects;
use futures::StreamExt;
use std::time::Duration;

type TestTarget = DockerTarget<FakeRuntime, FakeProbe, StaticAuthSubjects>;

fn target(runtime: &FakeRuntime, probe: &FakeProbe) -> TestTarget {
    DockerTarget::new(
        runtime.clone(),
        probe.clone(),
        StaticAuthSubjects::new("token"),
        TargetConfig::default(),
        HealthConfig {
            timeout: Duration::from_millis(200),
            interval: Duration::from_millis(5),
            ..Default::default()
        },
        EphemeralSecretsStore::new(),
    )
}

async fn listed_names(target: &TestTarget) -> Vec<String> {
    target
        .monitor
        .list_jobs()
        .await
        .unwrap()
        .map(|job| format!("{}@{}", job.name, job.version))
        .collect()
        .await
}

#[tokio::test]
async fn deploy_list_delete() {
    let runtime = FakeRuntime::new();
    let probe = FakeProbe::new();
    let target = target(&runtime, &probe);
    let id = JobIdentity::new("sentiment", "1.0");

    let job = target
        .deployer
        .deploy(DeployRequest::new(id.clone(), "v1"))
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Running);
    assert_eq!(job.internal_name, "job-sentiment-1-0:7000");
    assert!(target.deployer.exists(&id).await.unwrap());

    assert_eq!(listed_names(&target).await, vec!["sentiment@1.0"]);

    target.deployer.delete(&id).await.unwrap();
    assert!(!target.deployer.exists(&id).await.unwrap());
    assert!(listed_names(&target).await.is_empty());
}

#[tokio::test]
async fn deploy_then_wait_for_the_fresh_instance() {
    let runtime = FakeRuntime::new();
    let probe = FakeProbe::new();
    let target = target(&runtime, &probe);

    let job = target
        .deployer
        .deploy(DeployRequest::new(JobIdentity::new("sentiment", "1.0"), "v1"))
        .await
        .unwrap();
    probe.script(
        &job.base_url(),
        vec![
            JobBehavior::Live {
                deployment_timestamp: Some(job.create_time - 60),
                ready: true,
            },
            JobBehavior::Live {
                deployment_timestamp: Some(job.create_time),
                ready: true,
            },
        ],
    );

    target
        .monitor
        .check_job_condition(&job, job.create_time, || {}, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn ports_follow_published_job_ports() {
    let runtime = FakeRuntime::new();
    runtime.add_container(ContainerInfo {
        name: "job-a-1".into(),
        ports: vec![
            PortMapping {
                host_port: Some(7000),
                container_port: 7000,
            },
            PortMapping {
                host_port: Some(7000),
                container_port: 7000,
            },
        ],
        ..Default::default()
    });
    let target = target(&runtime, &FakeProbe::new());

    assert_eq!(target.ports.next_free_port().await.unwrap(), 7010);
    assert_eq!(target.name(), "docker");
}
