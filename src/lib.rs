// ABOUTME: Library root for stevedore - dependency-aware container lifecycle management.
// ABOUTME: Exposes the compose layer, the runtime capability traits and configuration.

pub mod compose;
pub mod config;
pub mod error;
pub mod runtime;
pub mod types;

pub use compose::{ComposeGroup, ContainerOptions, ContainerSpec};
pub use error::{Error, ErrorKind, Result};
