// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: ContainerConfig, ContainerInfo, HostBinding, ContainerLink, RuntimeMetadata.

use crate::types::{ContainerId, ImageId};
use std::collections::BTreeMap;

/// Mount options attached to a declared volume path.
pub type VolumeOptions = BTreeMap<String, String>;

/// Configuration for creating a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Image to run.
    pub image: ImageId,
    /// Command to run (overrides image CMD).
    pub command: Option<Vec<String>>,
    /// Environment as `KEY=VALUE` entries.
    pub env: Option<Vec<String>>,
    /// Volume paths and their mount options.
    pub volumes: Option<BTreeMap<String, VolumeOptions>>,
    /// Exposed ports keyed as `<port>/<protocol>`.
    pub exposed_ports: Vec<String>,
    /// Host bindings per exposed port key.
    pub port_bindings: BTreeMap<String, Vec<HostBinding>>,
    /// Links to already materialized containers.
    pub links: Vec<ContainerLink>,
}

/// Host side of a published port. Empty strings let the runtime pick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBinding {
    pub host_ip: String,
    pub host_port: String,
}

/// A link to another container, reachable under `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLink {
    pub container: ContainerId,
    pub alias: String,
}

impl std::fmt::Display for ContainerLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.container, self.alias)
    }
}

/// Live inspection record of a container.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Container ID.
    pub id: ContainerId,
    /// Container name.
    pub name: String,
    /// Image used.
    pub image: String,
    /// Current state.
    pub state: ContainerState,
    /// Running flag as reported by the runtime.
    pub running: bool,
    /// Creation timestamp.
    pub created: String,
}

/// Container state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

/// Runtime metadata.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// Runtime name (e.g., "docker", "podman").
    pub name: String,
    /// Runtime version.
    pub version: String,
    /// API version.
    pub api_version: String,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
}
