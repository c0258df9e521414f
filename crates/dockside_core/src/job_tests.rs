use super::*;
use yare::parameterized;

#[parameterized(
    dotted_version = { "sentiment", "1.0", "job-sentiment-1-0" },
    upper_case = { "Sentiment", "2.1.3", "job-sentiment-2-1-3" },
    underscores = { "my_model", "0.0.1-dev", "job-my-model-0-0-1-dev" },
)]
fn resource_names(name: &str, version: &str, expected: &str) {
    assert_eq!(job_resource_name(name, version), expected);
}

#[test]
fn resource_name_is_stable() {
    let id = JobIdentity::new("sentiment", "1.0");
    assert_eq!(id.resource_name(), id.clone().resource_name());
}

#[parameterized(
    primary = { 0, "job-a-1" },
    sidecar = { 1, "job-a-1-1" },
    third = { 2, "job-a-1-2" },
)]
fn container_names(index: usize, expected: &str) {
    assert_eq!(container_name("job-a-1", index), expected);
}

#[parameterized(
    entrypoint = { 0, "reg.local/jobs/job-entrypoint:adder-abc" },
    user_module = { 1, "reg.local/jobs/job-user-module:adder-abc" },
    extra = { 2, "reg.local/jobs/job-user-module-2:adder-abc" },
)]
fn images_per_index(index: usize, expected: &str) {
    assert_eq!(job_image("reg.local", "jobs", "adder", "abc", index), expected);
}

#[test]
fn running_record() {
    let record = JobRecord::running(&JobIdentity::new("sentiment", "1.0"), 1_700_000_000);

    assert_eq!(record.status, JobStatus::Running);
    assert_eq!(record.create_time, 1_700_000_000);
    assert_eq!(record.update_time, 1_700_000_000);
    assert_eq!(record.internal_name, "job-sentiment-1-0:7000");
    assert_eq!(record.base_url(), "http://job-sentiment-1-0:7000");
    assert_eq!(record.infrastructure_target, "docker");
}

#[test]
fn secrets_key() {
    assert_eq!(JobIdentity::new("adder", "0.1").key(), "adder.0.1");
}

#[test]
fn status_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&JobStatus::Error).unwrap(),
        "\"error\""
    );
}
