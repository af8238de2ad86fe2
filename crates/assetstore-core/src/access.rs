//! Access policy for stored objects.
//!
//! [`access_for`] decides, from visibility and the trashed flag alone, which
//! canned ACL and storage tier an object gets when it is written or
//! relocated. Applying the descriptor is the transport's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Visibility;

/// Canned access-control list applied to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    /// Grants read to the public principal.
    PublicRead,
    /// Owner-only access; any public-group read grant is revoked.
    Private,
}

impl CannedAcl {
    /// The header value used by S3-compatible APIs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicRead => "public-read",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage tier applied to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageTier {
    /// Default durability tier.
    Standard,
    /// Cheaper tier for objects expected to be purged soon.
    ReducedRedundancy,
}

impl StorageTier {
    /// The storage class name used by S3-compatible APIs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::ReducedRedundancy => "REDUCED_REDUNDANCY",
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ACL and storage tier computed for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDescriptor {
    /// Access-control list.
    pub acl: CannedAcl,
    /// Storage tier.
    pub tier: StorageTier,
}

impl AccessDescriptor {
    /// Whether the descriptor grants read access to the public principal.
    #[must_use]
    pub fn is_public_read(&self) -> bool {
        self.acl == CannedAcl::PublicRead
    }
}

/// Compute the access descriptor for an object in the given state.
///
/// Trashed and private objects deny public read; only live public objects
/// grant it. Trashed objects move to the reduced-redundancy tier.
///
/// ```
/// use assetstore_core::access::{CannedAcl, StorageTier, access_for};
/// use assetstore_core::types::Visibility;
///
/// let live = access_for(Visibility::Public, false);
/// assert_eq!(live.acl, CannedAcl::PublicRead);
/// assert_eq!(live.tier, StorageTier::Standard);
///
/// let trashed = access_for(Visibility::Public, true);
/// assert_eq!(trashed.acl, CannedAcl::Private);
/// assert_eq!(trashed.tier, StorageTier::ReducedRedundancy);
/// ```
#[must_use]
pub fn access_for(visibility: Visibility, trashed: bool) -> AccessDescriptor {
    let acl = if trashed || visibility == Visibility::Private {
        CannedAcl::Private
    } else {
        CannedAcl::PublicRead
    };
    let tier = if trashed {
        StorageTier::ReducedRedundancy
    } else {
        StorageTier::Standard
    };
    AccessDescriptor { acl, tier }
}
