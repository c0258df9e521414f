use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The container does not exist.
    #[error("Container {0} not found")]
    NotFound(String),

    /// The engine rejected or failed a command (create, remove, logs, ...).
    #[error("Container command failed: {0}")]
    Command(String),

    /// The engine itself is unreachable or misbehaving.
    #[error("Container runtime failure: {0}")]
    System(String),
}

#[derive(Error, Debug)]
pub enum HealthError {
    /// Nothing answered at the job's address (connection refused, DNS, ...).
    #[error("Job unreachable: {0}")]
    Unreachable(String),

    /// The job answered and reported itself broken.
    #[error("Job is unhealthy: {0}")]
    Unhealthy(String),

    /// The job answered with something that could not be understood.
    #[error("Invalid response from job: {0}")]
    InvalidResponse(String),

    /// The job did not become operational in time.
    #[error("Timeout: {0}")]
    Timeout(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// No auth subject is registered for the job family.
    #[error("No auth subject for job family {0}")]
    UnknownFamily(String),

    /// Generic provider failure.
    #[error("Auth system failure: {0}")]
    System(String),
}

#[derive(Error, Debug)]
pub enum DeployError {
    /// Caller-supplied env vars shadow names reserved by the platform.
    /// Raised before any container is touched.
    #[error(
        "found illegal runtime env vars, which conflict with reserved names: {}",
        .0.join(", ")
    )]
    ReservedEnvVars(Vec<String>),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[derive(Error, Debug)]
pub enum MonitorError {
    /// The job did not become operational. Carries the tail of its logs when
    /// diagnostics were requested.
    #[error("{cause}{}", .logs.as_ref().map(|l| format!("\nJob logs:\n{l}")).unwrap_or_default())]
    NotOperational {
        cause: HealthError,
        logs: Option<String>,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[derive(Error, Debug)]
pub enum LogsError {
    /// A session with this id is already streaming.
    #[error("Log session {0} is already open")]
    SessionExists(String),

    #[error("Log session {0} not found")]
    UnknownSession(String),
}

#[derive(Error, Debug)]
pub enum SecretsError {
    /// The target has no durable secret backing for this job.
    #[error("Feature not supported: {0}")]
    Unsupported(String),
}
