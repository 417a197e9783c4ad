// src/sandbox/docker.rs
use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    CreateContainerOptions as BollardCreateContainerOptionsQuery,
    LogsOptions as BollardLogsOptionsQuery,
    StartContainerOptions as BollardStartContainerOptionsQuery,
    StopContainerOptions as BollardStopContainerOptionsQuery,
    WaitContainerOptions as BollardWaitContainerOptionsQuery,
};
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::default::Default;
use std::time::Instant;
use tempfile::Builder;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::Sandbox;
use crate::config::SandboxConfig;
use crate::core_types::{ExecutionRequest, ExecutionResult};
use crate::errors::SandboxError;
use crate::languages;

const CONTAINER_WORK_DIR: &str = "/app";

pub struct DockerSandbox {
    docker: Docker,
    config: SandboxConfig,
}

impl DockerSandbox {
    /// Connect to the local container runtime. An unreachable daemon is an
    /// `EnvironmentUnavailable` failure, distinct from anything the generated
    /// program can cause.
    pub fn connect(config: SandboxConfig) -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| {
            SandboxError::EnvironmentUnavailable(format!("cannot reach container runtime: {}", e))
        })?;
        Ok(Self { docker, config })
    }

    /// Drain the container's log streams, capping at the configured byte
    /// ceiling. Best effort: with auto-remove the container may already be
    /// gone, in which case whatever was collected so far is returned.
    async fn collect_output(&self, container_id: &str) -> (String, String, bool) {
        let mut output_stream = self.docker.logs(
            container_id,
            Some(BollardLogsOptionsQuery {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );

        let limit = self.config.output_limit_bytes;
        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut truncated = false;
        while let Some(log_result) = output_stream.next().await {
            match log_result {
                Ok(LogOutput::StdOut { message }) => {
                    truncated |= append_capped(&mut stdout, &message, limit);
                }
                Ok(LogOutput::StdErr { message }) => {
                    truncated |= append_capped(&mut stderr, &message, limit);
                }
                Ok(_) => {}
                Err(e) => {
                    log::debug!("log stream ended early for {}: {}", container_id, e);
                    break;
                }
            }
        }
        (stdout, stderr, truncated)
    }

    async fn stop_container(&self, container_id: &str) {
        if let Err(e) = self
            .docker
            .stop_container(container_id, None::<BollardStopContainerOptionsQuery>)
            .await
        {
            log::debug!("stopping container {} failed: {}", container_id, e);
        }
    }
}

fn append_capped(buf: &mut String, chunk: &[u8], limit: usize) -> bool {
    let text = String::from_utf8_lossy(chunk);
    let remaining = limit.saturating_sub(buf.len());
    if text.len() <= remaining {
        buf.push_str(&text);
        false
    } else {
        // Push up to a char boundary inside the remaining window.
        let mut end = remaining;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        buf.push_str(&text[..end]);
        true
    }
}

#[async_trait]
impl Sandbox for DockerSandbox {
    async fn execute(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, SandboxError> {
        let profile = languages::profile(&request.language)
            .ok_or_else(|| SandboxError::UnsupportedLanguage(request.language.clone()))?;

        // Fresh scoped directory per request; the TempDir guard removes it on
        // every exit path out of this function.
        let temp_dir = Builder::new()
            .prefix("kata-exec-")
            .tempdir()
            .map_err(|e| SandboxError::TempDir(e.to_string()))?;
        let host_dir = temp_dir
            .path()
            .to_str()
            .ok_or_else(|| SandboxError::TempDir("non-UTF-8 temp path".to_string()))?
            .to_string();

        let script_name = profile.script_file_name(&format!("script_{}", Uuid::new_v4()));
        let host_script_path = temp_dir.path().join(&script_name);
        let mut file = fs::File::create(&host_script_path).await?;
        file.write_all(request.source.as_bytes()).await?;
        file.flush().await?;

        let script_in_container = format!("{}/{}", CONTAINER_WORK_DIR, script_name);
        let image = self
            .config
            .image
            .clone()
            .unwrap_or_else(|| profile.image.to_string());
        let cmd = profile.run_argv(&script_in_container);

        let options = Some(BollardCreateContainerOptionsQuery {
            name: Some(format!("kata-exec-{}", Uuid::new_v4())),
            ..Default::default()
        });

        let create_body = ContainerCreateBody {
            image: Some(image.clone()),
            cmd: Some(cmd),
            working_dir: Some(CONTAINER_WORK_DIR.to_string()),
            host_config: Some(bollard::models::HostConfig {
                binds: Some(vec![format!("{}:{}", host_dir, CONTAINER_WORK_DIR)]),
                auto_remove: Some(true),
                network_mode: Some("none".to_string()),
                memory: Some(self.config.memory_limit_mb * 1024 * 1024),
                ..Default::default()
            }),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        // Create/start failures mean the environment itself is unusable
        // (image missing, daemon misconfigured), so they are surfaced as
        // EnvironmentUnavailable rather than as a program outcome.
        let container = self
            .docker
            .create_container(options, create_body)
            .await
            .map_err(|e| {
                SandboxError::EnvironmentUnavailable(format!(
                    "cannot create container from image '{}': {}",
                    image, e
                ))
            })?;
        let started = Instant::now();
        if let Err(e) = self
            .docker
            .start_container(&container.id, None::<BollardStartContainerOptionsQuery>)
            .await
        {
            self.stop_container(&container.id).await;
            return Err(SandboxError::EnvironmentUnavailable(format!(
                "cannot start container: {}",
                e
            )));
        }

        let mut wait_stream = self
            .docker
            .wait_container(&container.id, None::<BollardWaitContainerOptionsQuery>);
        let budget = tokio::time::Duration::from_secs(request.time_budget_seconds);

        let wait_outcome = tokio::select! {
            res = wait_stream.next() => res,
            _ = tokio::time::sleep(budget) => {
                log::warn!(
                    "execution exceeded {}s budget, stopping container {}",
                    request.time_budget_seconds,
                    container.id
                );
                self.stop_container(&container.id).await;
                let (stdout, stderr, truncated) = self.collect_output(&container.id).await;
                return Ok(ExecutionResult {
                    exit_code: -1,
                    stdout,
                    stderr,
                    wall_time_ms: started.elapsed().as_millis() as u64,
                    timed_out: true,
                    truncated,
                });
            }
            _ = cancel.cancelled() => {
                log::info!("abort signal received, stopping container {}", container.id);
                self.stop_container(&container.id).await;
                return Err(SandboxError::Cancelled);
            }
        };

        // A non-zero exit comes back as a wait "error" carrying the status
        // code; it is a program outcome, not a sandbox failure.
        let exit_code = match wait_outcome {
            Some(Ok(response)) => response.status_code,
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => code,
            Some(Err(e)) => {
                self.stop_container(&container.id).await;
                return Err(SandboxError::Bollard(e));
            }
            None => {
                self.stop_container(&container.id).await;
                return Err(SandboxError::EnvironmentUnavailable(
                    "container wait stream ended unexpectedly".to_string(),
                ));
            }
        };

        let wall_time_ms = started.elapsed().as_millis() as u64;
        let (stdout, stderr, truncated) = self.collect_output(&container.id).await;

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            wall_time_ms,
            timed_out: false,
            truncated,
        })
    }
}
