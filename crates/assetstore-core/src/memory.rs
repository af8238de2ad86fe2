//! In-process object store.
//!
//! [`InMemoryObjectStore`] implements [`ObjectStoreClient`] over a
//! [`DashMap`] of buckets, each holding a sorted key map behind a
//! [`parking_lot::RwLock`]. It follows the listing semantics of S3
//! (prefix filter, delimiter folding into common prefixes, result cap) and
//! records the ACL and tier applied to each object, which makes it the
//! backend of choice for tests and local development.
//!
//! Two switches simulate backend trouble: [`InMemoryObjectStore::set_unavailable`]
//! fails every call with a transport error, and
//! [`InMemoryObjectStore::corrupt_object`] swaps a payload while keeping its
//! original entity tag.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::access::AccessDescriptor;
use crate::checksums;
use crate::client::{ClientFactory, CopyRequest, ObjectStoreClient};
use crate::config::ProviderConfig;
use crate::error::{StorageError, StorageResult};
use crate::types::{FetchedObject, Listing, ObjectSummary};

/// A stored object with the metadata the transport reports.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    etag: String,
    last_modified: DateTime<Utc>,
    access: AccessDescriptor,
}

impl StoredObject {
    fn new(data: Bytes, access: AccessDescriptor) -> Self {
        Self {
            etag: checksums::compute_etag(&data),
            data,
            last_modified: Utc::now(),
            access,
        }
    }

    fn summary(&self, key: &str) -> ObjectSummary {
        ObjectSummary {
            key: key.to_owned(),
            size: self.data.len() as u64,
            last_modified: Some(self.last_modified),
            etag: Some(self.etag.clone()),
        }
    }
}

/// Sorted key space of one bucket.
#[derive(Debug, Default)]
struct BucketObjects {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

/// Thread-safe in-memory object store.
///
/// # Examples
///
/// ```
/// use assetstore_core::access::access_for;
/// use assetstore_core::client::ObjectStoreClient;
/// use assetstore_core::memory::InMemoryObjectStore;
/// use assetstore_core::types::Visibility;
/// use bytes::Bytes;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryObjectStore::with_buckets(["assets"]);
/// let access = access_for(Visibility::Public, false);
/// store
///     .put_bytes("assets", "public/hello.txt", Bytes::from("hello"), access)
///     .await
///     .unwrap();
/// let fetched = store.get_bytes("assets", "public/hello.txt").await.unwrap();
/// assert_eq!(fetched.body.as_ref(), b"hello");
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    buckets: DashMap<String, BucketObjects>,
    unavailable: AtomicBool,
}

impl InMemoryObjectStore {
    /// Create an empty store with no buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given (empty) buckets.
    #[must_use]
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for name in names {
            store.create_bucket(name);
        }
        store
    }

    /// Create a bucket. Existing buckets are left untouched.
    pub fn create_bucket(&self, name: impl Into<String>) {
        let name = name.into();
        debug!(bucket = %name, "creating in-memory bucket");
        self.buckets.entry(name).or_default();
    }

    /// Make every subsequent call fail (or succeed again) with a transport
    /// error, simulating an outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Replace the payload of `key` while keeping its entity tag, so that
    /// integrity verification fails on the next fetch.
    ///
    /// Returns `false` when the object does not exist.
    pub fn corrupt_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) -> bool {
        let Some(b) = self.buckets.get(bucket) else {
            return false;
        };
        let mut objects = b.objects.write();
        match objects.get_mut(key) {
            Some(obj) => {
                obj.data = data.into();
                true
            }
            None => false,
        }
    }

    /// Access descriptor last applied to `key`.
    #[must_use]
    pub fn access_of(&self, bucket: &str, key: &str) -> Option<AccessDescriptor> {
        let b = self.buckets.get(bucket)?;
        let objects = b.objects.read();
        objects.get(key).map(|obj| obj.access)
    }

    /// All keys of `bucket` in lexicographic order.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .get(bucket)
            .map(|b| b.objects.read().keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every bucket and object.
    pub fn reset(&self) {
        self.buckets.clear();
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::transport("ServiceUnavailable: the backend is unreachable"))
        } else {
            Ok(())
        }
    }
}

fn no_such_bucket(bucket: &str) -> StorageError {
    StorageError::transport(format!("NoSuchBucket: the specified bucket does not exist: {bucket}"))
}

fn no_such_key(key: &str) -> StorageError {
    StorageError::transport(format!("NoSuchKey: the specified key does not exist: {key}"))
}

/// Apply S3 listing semantics to a sorted key map.
///
/// Objects and rolled-up prefixes both count toward `max_results`.
fn list_from_btree(
    objects: &BTreeMap<String, StoredObject>,
    prefix: &str,
    delimiter: Option<&str>,
    max_results: Option<usize>,
) -> Listing {
    let delimiter = delimiter.filter(|d| !d.is_empty());
    let limit = max_results.unwrap_or(usize::MAX);
    let mut listing = Listing::default();
    let mut seen_prefixes = HashSet::new();

    for (key, obj) in objects.range(prefix.to_owned()..) {
        if !key.starts_with(prefix) {
            break;
        }
        let full = listing.objects.len() + listing.common_prefixes.len() >= limit;

        if let Some(delim) = delimiter {
            let after_prefix = &key[prefix.len()..];
            if let Some(pos) = after_prefix.find(delim) {
                let cp = format!("{prefix}{}{delim}", &after_prefix[..pos]);
                if !seen_prefixes.contains(&cp) {
                    if full {
                        break;
                    }
                    seen_prefixes.insert(cp.clone());
                    listing.common_prefixes.push(cp);
                }
                continue;
            }
        }

        if full {
            break;
        }
        listing.objects.push(obj.summary(key));
    }

    listing
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        self.ensure_available()?;
        let mut names: Vec<String> = self.buckets.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.ensure_available()?;
        Ok(self.buckets.contains_key(bucket))
    }

    async fn list_by_prefix(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> StorageResult<Listing> {
        self.ensure_available()?;
        let b = self.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let objects = b.objects.read();
        let listing = list_from_btree(&objects, prefix, delimiter, max_results);
        trace!(
            bucket,
            prefix,
            objects = listing.objects.len(),
            common_prefixes = listing.common_prefixes.len(),
            "listed in-memory objects"
        );
        Ok(listing)
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject> {
        self.ensure_available()?;
        let b = self.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        let objects = b.objects.read();
        let obj = objects.get(key).ok_or_else(|| no_such_key(key))?;
        Ok(FetchedObject {
            body: obj.data.clone(),
            etag: Some(obj.etag.clone()),
        })
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        access: AccessDescriptor,
    ) -> StorageResult<()> {
        self.ensure_available()?;
        let b = self.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        trace!(bucket, key, size = body.len(), acl = %access.acl, "stored object");
        b.objects
            .write()
            .insert(key.to_owned(), StoredObject::new(body, access));
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        let b = self.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        // Deleting an absent key succeeds, as it does on S3.
        b.objects.write().remove(key);
        Ok(())
    }

    async fn copy_object(&self, request: CopyRequest) -> StorageResult<()> {
        self.ensure_available()?;
        let source = {
            let b = self
                .buckets
                .get(&request.source_bucket)
                .ok_or_else(|| no_such_bucket(&request.source_bucket))?;
            let objects = b.objects.read();
            objects
                .get(&request.source_key)
                .cloned()
                .ok_or_else(|| no_such_key(&request.source_key))?
        };

        let b = self
            .buckets
            .get(&request.destination_bucket)
            .ok_or_else(|| no_such_bucket(&request.destination_bucket))?;
        let mut objects = b.objects.write();
        if !request.overwrite && objects.contains_key(&request.destination_key) {
            return Err(StorageError::transport(format!(
                "PreconditionFailed: destination exists: {}",
                request.destination_key
            )));
        }

        debug!(
            source_key = %request.source_key,
            destination_key = %request.destination_key,
            size = source.data.len(),
            "copying in-memory object"
        );
        objects.insert(
            request.destination_key,
            StoredObject {
                data: source.data,
                etag: source.etag,
                last_modified: Utc::now(),
                access: request.access,
            },
        );
        Ok(())
    }
}

/// Client factory handing out a shared [`InMemoryObjectStore`].
///
/// When credentials are set, `connect` rejects any other pair, which lets
/// tests exercise the credential phase of configuration validation.
#[derive(Debug, Clone)]
pub struct InMemoryClientFactory {
    store: Arc<InMemoryObjectStore>,
    credentials: Option<(String, String)>,
}

impl InMemoryClientFactory {
    /// Factory accepting any credentials.
    #[must_use]
    pub fn new(store: Arc<InMemoryObjectStore>) -> Self {
        Self {
            store,
            credentials: None,
        }
    }

    /// Only accept the given access key / secret key pair.
    #[must_use]
    pub fn with_credentials(mut self, access_key: &str, secret_key: &str) -> Self {
        self.credentials = Some((access_key.to_owned(), secret_key.to_owned()));
        self
    }

    /// The store every client shares.
    #[must_use]
    pub fn store(&self) -> &Arc<InMemoryObjectStore> {
        &self.store
    }
}

impl ClientFactory for InMemoryClientFactory {
    fn connect(&self, config: &ProviderConfig) -> StorageResult<Arc<dyn ObjectStoreClient>> {
        if let Some((access_key, secret_key)) = &self.credentials {
            if *access_key != config.access_key || *secret_key != config.secret_key {
                return Err(StorageError::transport(format!(
                    "InvalidAccessKeyId: the access key {} is not recognized",
                    config.access_key
                )));
            }
        }
        Ok(Arc::clone(&self.store) as Arc<dyn ObjectStoreClient>)
    }
}
