//! Structured entity identifiers.
//!
//! A URN is a namespace prefix followed by one or more identifier parts:
//! `urn:li:fs_conversation:2-abc` or, for composite ids,
//! `urn:li:fs_event:(2-abc,5-def)`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Errors produced while parsing or reading a [`Urn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrnError {
    /// The input string was empty.
    Empty,
    /// A single identifier was required but the URN is a tuple of `parts` ids.
    CompositeIdentifier { parts: usize },
}

impl fmt::Display for UrnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UrnError::Empty => write!(f, "URN string is empty"),
            UrnError::CompositeIdentifier { parts } => write!(
                f,
                "URN has {parts} identifier parts where a single part is required"
            ),
        }
    }
}

impl StdError for UrnError {}

/// Entity identifier used throughout the payload model.
///
/// Equality and hashing consider only the identifier parts, so the same entity
/// referenced under two different namespaces compares equal and can be used as
/// a single map key.
#[derive(Debug, Clone)]
pub struct Urn {
    /// `None` when the source string had no `:` at all.
    prefix: Option<String>,
    /// Never empty.
    parts: Vec<String>,
}

impl Urn {
    pub fn parse(urn: &str) -> Result<Self, UrnError> {
        if urn.is_empty() {
            return Err(UrnError::Empty);
        }

        let (prefix, id) = match urn.rsplit_once(':') {
            Some((prefix, id)) => (Some(prefix.to_string()), id),
            None => (None, urn),
        };

        let parts = id
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .map(str::to_string)
            .collect();

        Ok(Self { prefix, parts })
    }

    /// The namespace portion, e.g. `urn:li:fs_conversation`.
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }

    /// Returns the only identifier part.
    ///
    /// Composite identifiers are rejected rather than truncated; callers that
    /// build URL path segments need exactly one id.
    pub fn single_part(&self) -> Result<&str, UrnError> {
        match self.parts.as_slice() {
            [single] => Ok(single),
            parts => Err(UrnError::CompositeIdentifier { parts: parts.len() }),
        }
    }

    /// The trailing part. For composite event ids this is the message id.
    pub fn last_part(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Comma-joined parts without the prefix or parentheses.
    pub fn id_str(&self) -> String {
        self.parts.join(",")
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{prefix}:")?;
        }
        match self.parts.as_slice() {
            [single] => f.write_str(single),
            parts => write!(f, "({})", parts.join(",")),
        }
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urn::parse(s)
    }
}

impl TryFrom<String> for Urn {
    type Error = UrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Urn::parse(&value)
    }
}

impl PartialEq for Urn {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Urn {}

impl Hash for Urn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl Serialize for Urn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Urn::parse(&raw).map_err(serde::de::Error::custom)
    }
}
