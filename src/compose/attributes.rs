// ABOUTME: Normalized attribute record of a container definition.
// ABOUTME: Built once from ContainerOptions; absent inputs stay absent.

use super::options::ContainerOptions;
use super::port::PortMapping;
use crate::error::Result;
use crate::runtime::VolumeOptions;
use crate::types::Label;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A declared link to another container of the same group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub target: Label,
    pub alias: Label,
}

impl Link {
    /// Parse `"target:alias"` or a bare `"target"` (alias defaults to target).
    pub fn parse(declaration: &str) -> Result<Self> {
        let (target, alias) = match declaration.split_once(':') {
            Some((target, alias)) => (Label::new(target)?, Label::new(alias)?),
            None => {
                let target = Label::new(declaration)?;
                (target.clone(), target)
            }
        };
        Ok(Self { target, alias })
    }
}

/// Links keyed by target label, kept in declaration order.
///
/// Declaring the same target twice keeps its first position and the last alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn parse<S: AsRef<str>>(declarations: &[S]) -> Result<Self> {
        let mut links = Links::default();
        for declaration in declarations {
            links.insert(Link::parse(declaration.as_ref())?);
        }
        Ok(links)
    }

    pub fn insert(&mut self, link: Link) {
        match self.0.iter_mut().find(|l| l.target == link.target) {
            Some(existing) => existing.alias = link.alias,
            None => self.0.push(link),
        }
    }

    pub fn alias_for(&self, target: &str) -> Option<&Label> {
        self.0
            .iter()
            .find(|l| l.target.as_str() == target)
            .map(|l| &l.alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for link in &self.0 {
            map.serialize_entry(&link.target, &link.alias)?;
        }
        map.end()
    }
}

/// Canonical form of a container definition.
///
/// A `None` field means the input did not mention it. Serializing the record
/// omits those keys entirely, so key presence doubles as "feature requested".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortMapping>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<BTreeMap<String, VolumeOptions>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<String>>,
}

impl ContainerAttributes {
    /// Normalize raw options, failing on malformed labels, links or ports.
    ///
    /// Whether an image or build context is present is not checked here; that
    /// only matters once the container is started.
    pub fn from_options(options: ContainerOptions) -> Result<Self> {
        let label = options.label.as_deref().map(Label::new).transpose()?;
        let links = options.links.as_deref().map(|d| Links::parse(d)).transpose()?;
        let ports = options
            .ports
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| PortMapping::parse(&entry.to_spec()))
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            label,
            image: options.image,
            build: options.build,
            links,
            ports,
            volumes: options.volumes,
            command: options.command.map(|c| c.into_argv()),
            environment: options.environment.map(|e| e.into_entries()),
        })
    }

    /// Label for messages, falling back to the image or a placeholder.
    pub fn display_name(&self) -> String {
        match (&self.label, &self.image, &self.build) {
            (Some(label), _, _) => label.to_string(),
            (None, Some(image), _) => image.clone(),
            (None, None, Some(build)) => build.display().to_string(),
            (None, None, None) => "<unnamed>".to_string(),
        }
    }
}
