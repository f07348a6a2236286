// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Check existence, pull, and build container images.

use crate::types::ImageId;
use async_trait::async_trait;
use std::path::Path;

/// Image operations: check existence, pull, build.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Check if an image exists locally.
    async fn image_exists(&self, reference: &ImageId) -> Result<bool, ImageError>;

    /// Pull an image from a registry. Pulling a present image is harmless.
    async fn pull_image(&self, reference: &ImageId) -> Result<(), ImageError>;

    /// Build the Dockerfile found in `context` and tag the result with `tag`.
    async fn build_image(&self, context: &Path, tag: &ImageId) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("invalid build context {path}: {reason}")]
    InvalidContext { path: String, reason: String },

    #[error("runtime error: {0}")]
    Runtime(String),
}
