// ABOUTME: Container runtime layer: capability traits, detection and the bollard adapter.
// ABOUTME: Everything the compose layer needs from Docker or Podman goes through here.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use self::bollard::{BollardRuntime, archive_build_context, connect_local};
pub use detection::{DetectionError, detect_local};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::{
    ContainerConfig, ContainerError, ContainerInfo, ContainerLink, ContainerOps, ContainerState,
    FullRuntime, HostBinding, ImageError, ImageOps, RuntimeInfo as RuntimeInfoOps,
    RuntimeInfoError, RuntimeMetadata, VolumeOptions,
};
pub use types::{RuntimeSocket, RuntimeType};
