// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Supports both Docker and Podman via the Docker-compatible API.

use crate::config::Config;
use crate::runtime::detection::detect_local;
use crate::runtime::error::RuntimeError;
use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerInfo, ContainerOps, ContainerState, ImageError,
    ImageOps, RuntimeInfo, RuntimeInfoError, RuntimeMetadata, VolumeOptions,
};
use crate::runtime::types::{RuntimeSocket, RuntimeType};
use crate::types::{ContainerId, ImageId};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    BuildImageOptions, CreateContainerOptions, CreateImageOptions, InspectContainerOptions,
    KillContainerOptions, RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{Either, Full};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 400 => ContainerError::InvalidConfig(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

// =============================================================================
// Build Context
// =============================================================================

/// Pack a build context directory into the tar stream the build endpoint expects.
pub fn archive_build_context(context: &Path) -> Result<Vec<u8>, ImageError> {
    let invalid = |reason: String| ImageError::InvalidContext {
        path: context.display().to_string(),
        reason,
    };

    if !context.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }

    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    builder
        .append_dir_all(".", context)
        .map_err(|e| invalid(e.to_string()))?;
    builder.into_inner().map_err(|e| invalid(e.to_string()))
}

/// Volume keys of the form `host:container[:mode]` are bind mounts; anything
/// else is an anonymous volume path.
fn split_volumes(
    volumes: &std::collections::BTreeMap<String, VolumeOptions>,
) -> (Vec<String>, Vec<String>) {
    let mut anonymous = Vec::new();
    let mut binds = Vec::new();

    for (path, options) in volumes {
        if !path.contains(':') {
            anonymous.push(path.clone());
            continue;
        }

        match options.get("mode") {
            Some(mode) if path.matches(':').count() == 1 => {
                binds.push(format!("{}:{}", path, mode));
            }
            _ => binds.push(path.clone()),
        }
    }

    (anonymous, binds)
}

/// Stop grace period in whole seconds, saturating at what the API can carry.
fn stop_timeout_secs(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_secs()).unwrap_or(i32::MAX)
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to the runtime listening on `socket`.
    pub fn connect(socket: &RuntimeSocket, timeout: Duration) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &socket.socket_path,
            timeout.as_secs(),
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, socket.runtime_type))
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

/// Detect the local runtime, connect to it and check it answers.
pub async fn connect_local(config: &Config) -> Result<BollardRuntime, RuntimeError> {
    let socket = detect_local(config)?;
    tracing::debug!(
        runtime = %socket.runtime_type,
        socket = %socket.socket_path,
        "connecting to container runtime"
    );

    let runtime = BollardRuntime::connect(&socket, config.timeout)?;
    runtime.ping().await?;
    Ok(runtime)
}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let info = self
            .client
            .info()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        let name = match self.runtime_type {
            RuntimeType::Docker => "Docker".to_string(),
            RuntimeType::Podman => "Podman".to_string(),
        };

        Ok(RuntimeMetadata {
            name,
            version: info.server_version.unwrap_or_default(),
            api_version: bollard::API_DEFAULT_VERSION.to_string(),
            os: info.operating_system.unwrap_or_default(),
            arch: info.architecture.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn image_exists(&self, reference: &ImageId) -> Result<bool, ImageError> {
        match self.client.inspect_image(reference.as_str()).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!(
                "failed to inspect {}: {}",
                reference, e
            ))),
        }
    }

    async fn pull_image(&self, reference: &ImageId) -> Result<(), ImageError> {
        let image_name = reference.to_string();
        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, &image_name))?;
        }

        Ok(())
    }

    async fn build_image(&self, context: &Path, tag: &ImageId) -> Result<(), ImageError> {
        let context: PathBuf = context.to_path_buf();
        let archive = tokio::task::spawn_blocking(move || archive_build_context(&context))
            .await
            .map_err(|e| ImageError::Runtime(format!("build context task failed: {}", e)))??;

        let options = BuildImageOptions {
            dockerfile: "Dockerfile".to_string(),
            t: Some(tag.to_string()),
            ..Default::default()
        };

        let body = Either::Left(Full::new(Bytes::from(archive)));
        let mut build_stream = self.client.build_image(options, None, Some(body));

        while let Some(result) = build_stream.next().await {
            let output = result.map_err(|e| ImageError::BuildFailed(format!("{}: {}", tag, e)))?;
            if let Some(error_detail) = output.error_detail {
                return Err(ImageError::BuildFailed(format!(
                    "{}: {:?}",
                    tag, error_detail
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut host_config = HostConfig::default();

        let (anonymous, binds) = config
            .volumes
            .as_ref()
            .map(split_volumes)
            .unwrap_or_default();
        if !binds.is_empty() {
            host_config.binds = Some(binds);
        }

        let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = config
            .port_bindings
            .iter()
            .map(|(key, bindings)| {
                let bindings = bindings
                    .iter()
                    .map(|b| PortBinding {
                        host_ip: Some(b.host_ip.clone()),
                        host_port: Some(b.host_port.clone()),
                    })
                    .collect();
                (key.clone(), Some(bindings))
            })
            .collect();
        if !port_bindings.is_empty() {
            host_config.port_bindings = Some(port_bindings);
        }

        if !config.links.is_empty() {
            host_config.links = Some(config.links.iter().map(|l| l.to_string()).collect());
        }

        let container_config = ContainerCreateBody {
            image: Some(config.image.to_string()),
            cmd: config.command.clone(),
            env: config.env.clone(),
            volumes: if anonymous.is_empty() {
                None
            } else {
                Some(anonymous)
            },
            exposed_ports: if config.exposed_ports.is_empty() {
                None
            } else {
                Some(config.exposed_ports.clone())
            },
            host_config: Some(host_config),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(None::<CreateContainerOptions>, container_config)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        match self
            .client
            .start_container(id.as_str(), None::<StartContainerOptions>)
            .await
        {
            Ok(()) => Ok(()),
            // 304: already started
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(map_container_not_found_error(e)),
        }
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: Some(stop_timeout_secs(timeout)),
            signal: None,
        };

        match self.client.stop_container(id.as_str(), Some(opts)).await {
            Ok(()) => Ok(()),
            // 304: already stopped
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(map_container_stop_error(e)),
        }
    }

    async fn kill_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .kill_container(id.as_str(), None::<KillContainerOptions>)
            .await
            .map_err(map_container_stop_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let details = self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(map_container_not_found_error)?;

        let state = details
            .state
            .as_ref()
            .and_then(|s| s.status)
            .map(|s| match s {
                bollard::models::ContainerStateStatusEnum::CREATED => ContainerState::Created,
                bollard::models::ContainerStateStatusEnum::RUNNING => ContainerState::Running,
                bollard::models::ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
                bollard::models::ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
                bollard::models::ContainerStateStatusEnum::REMOVING => ContainerState::Removing,
                bollard::models::ContainerStateStatusEnum::EXITED => ContainerState::Exited,
                bollard::models::ContainerStateStatusEnum::DEAD => ContainerState::Dead,
                _ => ContainerState::Exited,
            })
            .unwrap_or(ContainerState::Exited);

        let running = details
            .state
            .as_ref()
            .and_then(|s| s.running)
            .unwrap_or(false);

        Ok(ContainerInfo {
            id: details
                .id
                .clone()
                .map(ContainerId::new)
                .unwrap_or_else(|| id.clone()),
            name: details
                .name
                .unwrap_or_default()
                .trim_start_matches('/')
                .to_string(),
            image: details
                .config
                .as_ref()
                .and_then(|c| c.image.clone())
                .unwrap_or_default(),
            state,
            running,
            created: details.created.map(|dt| dt.to_string()).unwrap_or_default(),
        })
    }
}
