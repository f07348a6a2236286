// ABOUTME: Validated container label used as the key inside a compose group.
// ABOUTME: Also doubles as the alias a linked container is reachable under.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("label cannot be empty")]
    Empty,

    #[error("label cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in label '{label}': '{found}'")]
    InvalidChar { label: String, found: char },
}

/// Name of a container within a group.
///
/// Accepts what the runtime accepts for container names and link aliases:
/// ASCII alphanumerics plus `-`, `_` and `.`, starting with an alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(value: &str) -> Result<Self, LabelError> {
        let trimmed = value.trim();
        let Some(first) = trimmed.chars().next() else {
            return Err(LabelError::Empty);
        };

        if !first.is_ascii_alphanumeric() {
            return Err(LabelError::InvalidStart(first));
        }

        if let Some(found) = trimmed
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
        {
            return Err(LabelError::InvalidChar {
                label: trimmed.to_string(),
                found,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Label::new(&value).map_err(serde::de::Error::custom)
    }
}
