//! Object store transport boundary.
//!
//! [`ObjectStoreClient`] is the thin, policy-free surface the provider needs
//! from a remote object store: prefix listing, byte get/put, delete and
//! server-side copy, keyed by `(bucket, key)`. Implementations report every
//! failure (network, authentication, missing key) as
//! [`StorageError::Transport`](crate::error::StorageError::Transport) and
//! never retry on their own.
//!
//! # Object safety
//!
//! Providers hold clients as `Arc<dyn ObjectStoreClient>`, so the trait uses
//! `#[async_trait]` to stay object-safe.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::access::AccessDescriptor;
use crate::config::ProviderConfig;
use crate::error::StorageResult;
use crate::types::{FetchedObject, Listing};

/// Parameters of a server-side copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    /// Bucket holding the source object.
    pub source_bucket: String,
    /// Key of the source object.
    pub source_key: String,
    /// Bucket receiving the copy.
    pub destination_bucket: String,
    /// Key of the copy.
    pub destination_key: String,
    /// ACL and tier applied to the copy.
    pub access: AccessDescriptor,
    /// Replace an existing destination object. When `false` the copy fails if
    /// the destination already exists.
    pub overwrite: bool,
}

impl CopyRequest {
    /// A copy within one bucket that overwrites the destination.
    #[must_use]
    pub fn within(
        bucket: &str,
        source_key: impl Into<String>,
        destination_key: impl Into<String>,
        access: AccessDescriptor,
    ) -> Self {
        Self {
            source_bucket: bucket.to_owned(),
            source_key: source_key.into(),
            destination_bucket: bucket.to_owned(),
            destination_key: destination_key.into(),
            access,
            overwrite: true,
        }
    }
}

/// Primitive operations of a remote object store.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + fmt::Debug {
    /// Names of every bucket visible to the credentials.
    async fn list_buckets(&self) -> StorageResult<Vec<String>>;

    /// Whether `bucket` exists and is reachable with the credentials.
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// List keys under `prefix`, following pagination.
    ///
    /// With a delimiter, keys containing it after the prefix are folded into
    /// [`Listing::common_prefixes`]. When set, `max_results` caps objects
    /// and common prefixes together, as `MaxKeys` does.
    async fn list_by_prefix(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> StorageResult<Listing>;

    /// Fetch the full payload of `key`.
    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject>;

    /// Store `body` under `key`, replacing any existing object.
    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        access: AccessDescriptor,
    ) -> StorageResult<()>;

    /// Remove `key`.
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Copy an object server-side without downloading its payload.
    async fn copy_object(&self, request: CopyRequest) -> StorageResult<()>;
}

/// Builds transport clients from supplied configuration.
///
/// Configuration validation uses the factory to probe credentials before a
/// provider is constructed.
pub trait ClientFactory: Send + Sync + fmt::Debug {
    /// Instantiate a client for `config`.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot produce a client at all, e.g. a
    /// malformed endpoint.
    fn connect(&self, config: &ProviderConfig) -> StorageResult<Arc<dyn ObjectStoreClient>>;
}
