// ABOUTME: Dependency-aware container composition.
// ABOUTME: Normalizes container definitions, links them into a graph and drives their lifecycle.

mod attributes;
mod group;
mod options;
mod port;
mod spec;

pub use attributes::{ContainerAttributes, Link, Links};
pub use group::{ComposeGroup, SpecIndex};
pub use options::{CommandLine, ContainerOptions, EnvValue, Environment, PortEntry};
pub use port::{PortMapping, PortSpecError, Protocol};
pub use spec::ContainerSpec;
