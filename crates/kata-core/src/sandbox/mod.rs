//! Sandboxed execution of generated source code.
//!
//! Wraps a container runtime to run one materialized script inside an
//! isolated, resource- and time-bounded environment, capturing stdout/stderr
//! and the exit status. Each request gets its own scoped working directory
//! which is removed on every exit path.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core_types::{ExecutionRequest, ExecutionResult};
use crate::errors::SandboxError;

#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Run the request to completion, timeout, or cancellation.
    ///
    /// A time-budget overrun resolves to `Ok` with `timed_out` set; a
    /// non-zero exit code also resolves to `Ok`. `Err` is reserved for the
    /// sandbox itself failing (runtime unreachable, image missing) or the
    /// caller cancelling. The in-flight container is stopped and the scoped
    /// directory removed in all cases.
    async fn execute(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, SandboxError>;
}

pub mod docker;

pub use docker::DockerSandbox;
