//! Identifier types used throughout the Quire core.
//!
//! Both identifiers wrap a UUID v7, so ids created later sort later.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident, $what:literal) => {
        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            pub fn parse(s: &str) -> Result<Self> {
                Uuid::parse_str(s).map(Self).map_err(|_| Error::InvalidId {
                    what: $what,
                    value: s.to_string(),
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }
    };
}

/// Identity of a content instance, generic content and users alike.
///
/// Stored references hold this id as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(Uuid);

uuid_newtype!(ContentId, "content id");

impl ContentId {
    /// Reads the id held by a stored `reference` value. Anything but a
    /// UUID string yields `None`.
    pub fn from_reference(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| Self::parse(s).ok())
    }
}

/// Stable identity of a schema child (a field definition or a collection).
///
/// Survives schema merges: a child matched by identifier keeps its
/// `DefinitionId` even when its settings are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(Uuid);

uuid_newtype!(DefinitionId, "definition id");
