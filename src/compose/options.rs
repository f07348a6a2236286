// ABOUTME: Raw, user-facing container definition as handed over by a compose parser.
// ABOUTME: Accepts the loose shapes compose files use for commands, ports and environment.

use crate::runtime::VolumeOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Declared configuration of one container. Every field is optional; an
/// absent field means the feature was not requested.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerOptions {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    /// Directory holding a Dockerfile to build instead of pulling `image`.
    #[serde(default)]
    pub build: Option<PathBuf>,

    /// `"target"` or `"target:alias"` entries.
    #[serde(default)]
    pub links: Option<Vec<String>>,

    #[serde(default)]
    pub ports: Option<Vec<PortEntry>>,

    #[serde(default)]
    pub volumes: Option<BTreeMap<String, VolumeOptions>>,

    #[serde(default)]
    pub command: Option<CommandLine>,

    #[serde(default)]
    pub environment: Option<Environment>,
}

impl ContainerOptions {
    /// Options for a container named `label` running `image`.
    pub fn image(label: &str, image: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            image: Some(image.to_string()),
            ..Default::default()
        }
    }

    /// Options for a container named `label` built from `context`.
    pub fn build(label: &str, context: impl Into<PathBuf>) -> Self {
        Self {
            label: Some(label.to_string()),
            build: Some(context.into()),
            ..Default::default()
        }
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = Some(links.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ports = Some(
            ports
                .into_iter()
                .map(|p| PortEntry::Text(p.into()))
                .collect(),
        );
        self
    }

    pub fn with_command(mut self, command: &str) -> Self {
        self.command = Some(CommandLine::Shell(command.to_string()));
        self
    }
}

/// A port written either as a string spec or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortEntry {
    Number(u16),
    Text(String),
}

impl PortEntry {
    pub fn to_spec(&self) -> String {
        match self {
            PortEntry::Number(port) => port.to_string(),
            PortEntry::Text(spec) => spec.clone(),
        }
    }
}

/// A command given as one string (split on whitespace) or as argv.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandLine {
    Shell(String),
    Argv(Vec<String>),
}

impl CommandLine {
    pub fn into_argv(self) -> Vec<String> {
        match self {
            CommandLine::Shell(line) => line.split_whitespace().map(str::to_string).collect(),
            CommandLine::Argv(argv) => argv,
        }
    }
}

/// Environment given as `KEY=VALUE` entries or as a key/value map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Environment {
    List(Vec<String>),
    Map(BTreeMap<String, Option<EnvValue>>),
}

/// A scalar on the value side of an environment map. YAML is free to type
/// `8080` or `true` as non-strings; all of them end up as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Bool(bool),
    Number(serde_yaml::Number),
    Text(String),
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Bool(value) => write!(f, "{}", value),
            EnvValue::Number(value) => write!(f, "{}", value),
            EnvValue::Text(value) => f.write_str(value),
        }
    }
}

impl Environment {
    /// Render as `KEY=VALUE` entries. A map key with a null value becomes a
    /// bare `KEY`, which the runtime reads as "pass through from the host".
    pub fn into_entries(self) -> Vec<String> {
        match self {
            Environment::List(entries) => entries,
            Environment::Map(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Some(value) => format!("{}={}", key, value),
                    None => key,
                })
                .collect(),
        }
    }
}
