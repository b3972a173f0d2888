use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Core error type for TaskForge.
///
/// These are submission-time and configuration failures; task-level failures
/// travel as data inside a [`crate::TaskExecution`] record instead.
#[derive(Debug, Error)]
pub enum TaskForgeError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),
    #[error("dependency validation failed: {0}")]
    InvalidDependencies(String),
    #[error("planning error: {0}")]
    Planning(String),
    #[error("unknown execution: {0}")]
    UnknownExecution(String),
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    #[error("chain error: {0}")]
    Chain(String),
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
    #[error("I/O error while reading {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskForgeError {
    pub fn config_io(path: PathBuf, source: std::io::Error) -> Self {
        Self::ConfigIo { path, source }
    }
}

/// Failure classes assigned to task errors.
///
/// Retryability is a static property of the class: transient conditions
/// (network, timeout, unknown) are worth another attempt, while validation
/// and dependency failures will fail the same way every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    Dependency,
    Unknown,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Unknown => true,
            ErrorKind::Validation | ErrorKind::Dependency => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network_error",
            ErrorKind::Timeout => "timeout_error",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Dependency => "dependency_error",
            ErrorKind::Unknown => "unknown_error",
        }
    }
}

/// Pluggable message-to-kind classifier used by the orchestrator.
pub type ErrorClassifier = dyn Fn(&str) -> ErrorKind + Send + Sync;

/// Default classifier: case-sensitive keyword heuristics over the message.
///
/// Tables are checked in order; a message matching several classes takes the
/// first ("fetch timed out" is a network failure, not a timeout).
pub fn classify_message(message: &str) -> ErrorKind {
    const NETWORK: [&str; 5] = ["network", "fetch", "connection", "ECONNREFUSED", "ETIMEDOUT"];
    const TIMEOUT: [&str; 3] = ["timeout", "TIMEOUT", "timed out"];
    const VALIDATION: [&str; 4] = ["validation", "invalid", "required", "missing"];
    const DEPENDENCY: [&str; 2] = ["dependency", "not found"];

    if NETWORK.iter().any(|kw| message.contains(kw)) {
        ErrorKind::Network
    } else if TIMEOUT.iter().any(|kw| message.contains(kw)) {
        ErrorKind::Timeout
    } else if VALIDATION.iter().any(|kw| message.contains(kw)) {
        ErrorKind::Validation
    } else if DEPENDENCY.iter().any(|kw| message.contains(kw)) {
        ErrorKind::Dependency
    } else {
        ErrorKind::Unknown
    }
}

/// Error representing a single task failure inside the orchestration loop.
#[derive(Debug, Clone)]
pub struct TaskError {
    pub reason: String,
    pub kind: ErrorKind,
}

impl TaskError {
    pub fn new(reason: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            reason: reason.into(),
            kind,
        }
    }

    /// Build a task error by classifying the message.
    pub fn from_message(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let kind = classify_message(&reason);
        Self { reason, kind }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let retry = if self.is_retryable() {
            "retryable"
        } else {
            "terminal"
        };
        write!(f, "{retry} {} failure: {}", self.kind.as_str(), self.reason)
    }
}

impl std::error::Error for TaskError {}
