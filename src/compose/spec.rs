// ABOUTME: A single container definition and its lifecycle against the runtime.
// ABOUTME: Resolves images on demand, materializes the container once, then starts/stops/deletes it.

use super::attributes::ContainerAttributes;
use super::group::SpecIndex;
use super::options::ContainerOptions;
use crate::error::{Error, Result};
use crate::runtime::{
    ContainerConfig, ContainerInfo, ContainerLink, ContainerOps, FullRuntime, HostBinding,
    ImageOps,
};
use crate::types::{ContainerId, ImageId, Label};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// One container of a compose group.
///
/// Lifecycle:
///
/// ```text
/// uninstantiated --start--> running --stop/kill--> stopped --start--> running
///       ^                                             |
///       +------------------- delete ------------------+
/// ```
///
/// The runtime handle survives `stop` and `kill`; only `delete` clears it, so
/// a restarted container keeps its filesystem and the image is resolved once.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    attributes: ContainerAttributes,
    image: Option<ImageId>,
    container: Option<ContainerId>,
    dependencies: Vec<SpecIndex>,
}

impl ContainerSpec {
    /// Normalize `options` into a spec. Fails on malformed ports, labels or links.
    pub fn new(options: ContainerOptions) -> Result<Self> {
        Ok(Self::from_attributes(ContainerAttributes::from_options(
            options,
        )?))
    }

    pub fn from_attributes(attributes: ContainerAttributes) -> Self {
        Self {
            attributes,
            image: None,
            container: None,
            dependencies: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &ContainerAttributes {
        &self.attributes
    }

    pub fn label(&self) -> Option<&Label> {
        self.attributes.label.as_ref()
    }

    /// Image the container was created from, once resolved.
    pub fn resolved_image(&self) -> Option<&ImageId> {
        self.image.as_ref()
    }

    /// Runtime handle, present between the first start and delete.
    pub fn container_id(&self) -> Option<&ContainerId> {
        self.container.as_ref()
    }

    /// Containers that must run before this one, in link declaration order.
    pub fn dependencies(&self) -> &[SpecIndex] {
        &self.dependencies
    }

    /// Record that `dependency` must be started first. Repeats are ignored.
    pub fn add_dependency(&mut self, dependency: SpecIndex) {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    pub(crate) fn replace_dependencies(&mut self, dependencies: Vec<SpecIndex>) {
        self.dependencies = dependencies;
    }

    /// Runtime configuration for materializing this container.
    ///
    /// Every port contributes one exposed port and one host binding; an
    /// unspecified host ip or port becomes an empty string.
    pub fn container_config(&self, image: ImageId, links: Vec<ContainerLink>) -> ContainerConfig {
        let mut exposed_ports = Vec::new();
        let mut port_bindings: BTreeMap<String, Vec<HostBinding>> = BTreeMap::new();

        for port in self.attributes.ports.iter().flatten() {
            let key = port.port_key();
            if !exposed_ports.contains(&key) {
                exposed_ports.push(key.clone());
            }
            port_bindings.entry(key).or_default().push(HostBinding {
                host_ip: port.host_ip().unwrap_or_default().to_string(),
                host_port: port.host_port().unwrap_or_default().to_string(),
            });
        }

        ContainerConfig {
            image,
            command: self.attributes.command.clone(),
            env: self.attributes.environment.clone(),
            volumes: self.attributes.volumes.clone(),
            exposed_ports,
            port_bindings,
            links,
        }
    }

    /// Start this container, creating it first if it has no runtime handle.
    ///
    /// `links` must carry the handles of every dependency; callers normally
    /// go through [`ComposeGroup::start`](super::ComposeGroup::start), which
    /// starts dependencies first. An existing handle is simply restarted and
    /// `links` is ignored.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` without an image or build context, before any
    /// runtime call. Runtime failures propagate unchanged.
    pub async fn start<R: FullRuntime>(
        &mut self,
        runtime: &R,
        links: &[ContainerLink],
    ) -> Result<ContainerId> {
        let id = match self.container.clone() {
            Some(id) => {
                debug!(container = %self.attributes.display_name(), %id, "reusing existing container");
                id
            }
            None => {
                let image = self.resolve_image(runtime).await?;
                let config = self.container_config(image, links.to_vec());
                let id = runtime.create_container(&config).await?;
                info!(container = %self.attributes.display_name(), %id, "created container");
                self.container = Some(id.clone());
                id
            }
        };

        runtime.start_container(&id).await?;
        info!(container = %self.attributes.display_name(), %id, "started container");
        Ok(id)
    }

    /// Pull the declared image if missing, or build the declared context.
    async fn resolve_image<R: ImageOps>(&mut self, runtime: &R) -> Result<ImageId> {
        let image = match (&self.attributes.image, &self.attributes.build) {
            (Some(reference), _) => {
                let image = ImageId::new(reference.clone());
                if runtime.image_exists(&image).await? {
                    debug!(%image, "image already present");
                } else {
                    info!(%image, "pulling image");
                    runtime.pull_image(&image).await?;
                }
                image
            }
            (None, Some(context)) => {
                let tag = ImageId::new(uuid::Uuid::new_v4().simple().to_string());
                info!(context = %context.display(), %tag, "building image");
                runtime.build_image(context, &tag).await?;
                tag
            }
            (None, None) => {
                return Err(Error::Configuration(format!(
                    "container '{}' declares neither an image nor a build context",
                    self.attributes.display_name()
                )));
            }
        };

        self.image = Some(image.clone());
        Ok(image)
    }

    /// Stop the container gracefully. No-op if it was never created.
    pub async fn stop<R: ContainerOps>(&self, runtime: &R, timeout: Duration) -> Result<()> {
        if let Some(ref id) = self.container {
            info!(container = %self.attributes.display_name(), %id, "stopping container");
            runtime.stop_container(id, timeout).await?;
        }
        Ok(())
    }

    /// Kill the container immediately. No-op if it was never created.
    pub async fn kill<R: ContainerOps>(&self, runtime: &R) -> Result<()> {
        if let Some(ref id) = self.container {
            info!(container = %self.attributes.display_name(), %id, "killing container");
            runtime.kill_container(id).await?;
        }
        Ok(())
    }

    /// Force-remove the container and forget its handle. No-op if it was never created.
    pub async fn delete<R: ContainerOps>(&mut self, runtime: &R) -> Result<()> {
        if let Some(id) = self.container.take() {
            info!(container = %self.attributes.display_name(), %id, "removing container");
            if let Err(e) = runtime.remove_container(&id, true).await {
                self.container = Some(id);
                return Err(e.into());
            }
            self.image = None;
        }
        Ok(())
    }

    /// Live inspection record of the container.
    pub async fn stats<R: ContainerOps>(&self, runtime: &R) -> Result<ContainerInfo> {
        let id = self
            .container
            .as_ref()
            .ok_or_else(|| Error::NotInstantiated(self.attributes.display_name()))?;
        Ok(runtime.inspect_container(id).await?)
    }

    /// Whether the runtime reports the container as running.
    ///
    /// Never queries the runtime for a container that was not created.
    pub async fn is_running<R: ContainerOps>(&self, runtime: &R) -> Result<bool> {
        match self.container {
            Some(ref id) => Ok(runtime.inspect_container(id).await?.running),
            None => Ok(false),
        }
    }
}
