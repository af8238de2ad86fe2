//! Value types shared by the path expander, access policy and providers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which live namespace an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// Publicly readable namespace.
    #[default]
    Public,
    /// Access-controlled namespace.
    Private,
}

impl Visibility {
    /// Map the `private` flag used by the provider operations to a visibility.
    #[must_use]
    pub fn from_private(private: bool) -> Self {
        if private { Self::Private } else { Self::Public }
    }

    /// Return the lowercase name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size and modification time of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time reported by the backend.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One direct child of a listed prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    /// Name relative to the listed prefix (no trailing separator).
    pub name: String,
    /// Whether the entry groups further keys rather than naming an object.
    pub directory: bool,
    /// Object size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time (absent for directories).
    pub last_modified: Option<DateTime<Utc>>,
}

/// A single key returned by a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full physical key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// Entity tag, if the backend reported one.
    pub etag: Option<String>,
}

/// Result of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Objects directly matching the listing criteria.
    pub objects: Vec<ObjectSummary>,
    /// Common prefixes when a delimiter is used (each ends with the delimiter).
    pub common_prefixes: Vec<String>,
}

/// Payload and entity tag returned by a fetch.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    /// Raw object bytes.
    pub body: bytes::Bytes,
    /// Entity tag reported alongside the payload.
    pub etag: Option<String>,
}
