// ABOUTME: In-memory container runtime for exercising the compose layer.
// ABOUTME: Records every capability call in order and simulates container state.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stevedore::runtime::{
    ContainerConfig, ContainerError, ContainerInfo, ContainerOps, ContainerState, ImageError,
    ImageOps,
};
use stevedore::types::{ContainerId, ImageId};

/// One call made against the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ImageExists(String),
    PullImage(String),
    BuildImage { context: PathBuf, tag: String },
    CreateContainer(ContainerConfig),
    StartContainer(String),
    StopContainer(String, Duration),
    KillContainer(String),
    RemoveContainer(String),
    InspectContainer(String),
}

struct FakeContainer {
    image: String,
    running: bool,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    images: HashSet<String>,
    containers: HashMap<String, FakeContainer>,
    next_id: usize,
    fail_pull: bool,
    fail_create: bool,
}

#[derive(Default)]
pub struct RecordingRuntime {
    state: Mutex<State>,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `image` is already present locally.
    pub fn with_image(self, image: &str) -> Self {
        self.state.lock().images.insert(image.to_string());
        self
    }

    pub fn failing_pull(self) -> Self {
        self.state.lock().fail_pull = true;
        self
    }

    pub fn failing_create(self) -> Self {
        self.state.lock().fail_create = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Container configs in creation order.
    pub fn created(&self) -> Vec<ContainerConfig> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateContainer(config) => Some(config),
                _ => None,
            })
            .collect()
    }

    /// Container ids in the order `start_container` was called.
    pub fn started(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::StartContainer(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn container_exists(&self, id: &ContainerId) -> bool {
        self.state.lock().containers.contains_key(id.as_str())
    }

    /// Simulate a container exiting on its own.
    pub fn exit(&self, id: &ContainerId) {
        if let Some(container) = self.state.lock().containers.get_mut(id.as_str()) {
            container.running = false;
        }
    }

    fn set_running(&self, id: &ContainerId, running: bool) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        let container = state
            .containers
            .get_mut(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.running = running;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for RecordingRuntime {
    async fn image_exists(&self, reference: &ImageId) -> Result<bool, ImageError> {
        let mut state = self.state.lock();
        state.calls.push(Call::ImageExists(reference.to_string()));
        Ok(state.images.contains(reference.as_str()))
    }

    async fn pull_image(&self, reference: &ImageId) -> Result<(), ImageError> {
        let mut state = self.state.lock();
        state.calls.push(Call::PullImage(reference.to_string()));
        if state.fail_pull {
            return Err(ImageError::PullFailed(reference.to_string()));
        }
        state.images.insert(reference.to_string());
        Ok(())
    }

    async fn build_image(&self, context: &Path, tag: &ImageId) -> Result<(), ImageError> {
        let mut state = self.state.lock();
        state.calls.push(Call::BuildImage {
            context: context.to_path_buf(),
            tag: tag.to_string(),
        });
        state.images.insert(tag.to_string());
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for RecordingRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateContainer(config.clone()));
        if state.fail_create {
            return Err(ContainerError::Runtime("create refused".to_string()));
        }
        if !state.images.contains(config.image.as_str()) {
            return Err(ContainerError::ImageNotFound(config.image.to_string()));
        }

        state.next_id += 1;
        let id = format!("container-{}", state.next_id);
        state.containers.insert(
            id.clone(),
            FakeContainer {
                image: config.image.to_string(),
                running: false,
            },
        );
        Ok(ContainerId::new(id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.state
            .lock()
            .calls
            .push(Call::StartContainer(id.to_string()));
        self.set_running(id, true)
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        self.state
            .lock()
            .calls
            .push(Call::StopContainer(id.to_string(), timeout));
        self.set_running(id, false)
    }

    async fn kill_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.state
            .lock()
            .calls
            .push(Call::KillContainer(id.to_string()));
        self.set_running(id, false)
    }

    async fn remove_container(&self, id: &ContainerId, _force: bool) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::RemoveContainer(id.to_string()));
        state
            .containers
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::InspectContainer(id.to_string()));
        let container = state
            .containers
            .get(id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;

        Ok(ContainerInfo {
            id: id.clone(),
            name: id.to_string(),
            image: container.image.clone(),
            state: if container.running {
                ContainerState::Running
            } else {
                ContainerState::Exited
            },
            running: container.running,
            created: String::new(),
        })
    }
}
