// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ImageOps, ContainerOps, RuntimeInfo and the FullRuntime bundle.

mod container;
mod image;
mod runtime_info;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use image::{ImageError, ImageOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;

/// Everything a compose group needs from a runtime.
///
/// Implemented automatically for any type providing both image and
/// container operations, including test doubles.
pub trait FullRuntime: ImageOps + ContainerOps {}

impl<T: ImageOps + ContainerOps> FullRuntime for T {}
