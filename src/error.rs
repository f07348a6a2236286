// ABOUTME: Application-wide error types for stevedore.
// ABOUTME: Uses thiserror for ergonomic error handling plus a coarse ErrorKind taxonomy.

use crate::compose::PortSpecError;
use crate::runtime::{ContainerError, ImageError};
use crate::types::LabelError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid label: {0}")]
    InvalidLabel(#[from] LabelError),

    #[error("invalid port specification: {0}")]
    InvalidPort(#[from] PortSpecError),

    #[error("duplicate container label: {0}")]
    DuplicateLabel(String),

    #[error("container '{container}' links to unknown container '{target}'")]
    UnresolvedLink { container: String, target: String },

    #[error("unknown container: {0}")]
    UnknownContainer(String),

    #[error("cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("container '{0}' has not been created yet")]
    NotInstantiated(String),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A container definition cannot be used as written.
    Configuration,
    /// A link or lookup names a container the group does not have.
    Resolution,
    /// Links form a cycle.
    CyclicDependency,
    /// The container runtime reported a failure.
    Runtime,
    /// Reading or parsing a configuration file failed.
    ConfigFile,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_)
            | Error::InvalidLabel(_)
            | Error::InvalidPort(_)
            | Error::DuplicateLabel(_) => ErrorKind::Configuration,
            Error::UnresolvedLink { .. } | Error::UnknownContainer(_) => ErrorKind::Resolution,
            Error::CyclicDependency(_) => ErrorKind::CyclicDependency,
            Error::NotInstantiated(_) | Error::Image(_) | Error::Container(_) => ErrorKind::Runtime,
            Error::ConfigNotFound(_) | Error::Io(_) | Error::Yaml(_) => ErrorKind::ConfigFile,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
