//! Error types for failure handling across the solver team
//!
//! The taxonomy separates environment failures (the sandbox runtime cannot
//! start at all) from program-level failures (the generated code misbehaved).
//! Only the former propagates out of a submission; everything the generated
//! program does wrong is folded into an `ExecutionResult` and relayed back
//! into the conversation as ordinary content for the solver to react to.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KataError {
    #[error("LLM interaction failed: {0}")]
    Llm(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
    #[error("Submission aborted")]
    Aborted,
}

/// Failures of the sandbox itself, as opposed to the program it ran.
///
/// A time-budget overrun is not an error here: the executor reports it as
/// `ExecutionResult { timed_out: true, .. }` so the loop can relay it. The
/// same goes for a non-zero exit code.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// The container runtime is unreachable or the image cannot be used.
    /// Fatal for the submission, never retried.
    #[error("execution environment unavailable: {0}")]
    EnvironmentUnavailable(String),
    #[error("no language profile registered for '{0}'")]
    UnsupportedLanguage(String),
    #[error("container runtime error: {0}")]
    Bollard(#[from] bollard::errors::Error),
    #[error("I/O error during sandbox operation: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not create scoped working directory: {0}")]
    TempDir(String),
    /// The caller's abort signal fired while the container was running.
    #[error("sandbox run cancelled")]
    Cancelled,
}

impl SandboxError {
    /// Whether this failure should abort the whole submission.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SandboxError::EnvironmentUnavailable(_))
    }
}
