//! Storage provider contract and its object-store implementation.
//!
//! [`StorageProvider`] is the surface upstream callers program against. It is
//! parameterized uniformly by `(path, trashed, private)` and hides which
//! backend holds the bytes. [`ObjectStoreProvider`] implements it on top of an
//! [`ObjectStoreClient`]; [`FileSystemProvider`](crate::fs::FileSystemProvider)
//! is the local-directory sibling.
//!
//! # Namespace lifecycle
//!
//! ```text
//!            write                soft_delete
//!   (none) --------> public/private ----------> trash
//!                      ^      |                   |
//!                      |      | move_object       | restore
//!                      |      v                   |
//!                    public/private <-------------+
//! ```
//!
//! Every relocation is a destructive move: one server-side copy with the
//! destination's access descriptor, then removal of the source. `delete`
//! removes a key from any namespace for good.
//!
//! # Failure policy
//!
//! `inspect`/`exists` degrade any backend failure to "absent". `read` turns
//! any fetch or verification failure into
//! [`StorageError::ObjectNotFound`]. Every mutating operation propagates
//! backend errors unchanged.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error, trace, warn};

use crate::access::{AccessDescriptor, access_for};
use crate::checksums::{self, Verification};
use crate::client::{ClientFactory, CopyRequest, ObjectStoreClient};
use crate::config::ProviderConfig;
use crate::error::{StorageError, StorageResult};
use crate::path::{PathExpander, SEPARATOR, directory_prefix, parent_prefix};
use crate::types::{ListEntry, ObjectDescriptor, Visibility};
use crate::validation::{self, ValidationReport};

/// Delimiter used to group keys into directories when listing.
const LIST_DELIMITER: &str = "/";

/// Uniform contract of every storage backend.
///
/// # Object safety
///
/// Callers hold providers as `Arc<dyn StorageProvider>`, so the trait uses
/// `#[async_trait]`.
#[async_trait]
pub trait StorageProvider: Send + Sync + fmt::Debug {
    /// Direct children of `path` in the public or private namespace.
    ///
    /// Zero-size objects are treated as directory placeholders and skipped.
    async fn list(&self, path: &str, private: bool) -> StorageResult<Vec<ListEntry>>;

    /// Size and modification time of the object at `path`, or `None` when it
    /// is absent or the backend could not be queried.
    async fn inspect(&self, path: &str, trashed: bool, private: bool) -> Option<ObjectDescriptor>;

    /// Whether [`inspect`](Self::inspect) finds the object.
    async fn exists(&self, path: &str, trashed: bool, private: bool) -> bool {
        self.inspect(path, trashed, private).await.is_some()
    }

    /// Full payload of the object at `path`.
    ///
    /// # Errors
    ///
    /// [`StorageError::ObjectNotFound`] if the object cannot be fetched or
    /// fails integrity verification.
    async fn read(&self, path: &str, trashed: bool, private: bool) -> StorageResult<Bytes>;

    /// Store `data` at `path`, replacing any existing object.
    async fn write(&self, data: Bytes, path: &str, private: bool) -> StorageResult<()>;

    /// Permanently remove the object at `path`.
    async fn delete(&self, path: &str, trashed: bool, private: bool) -> StorageResult<()>;

    /// Move a live object into the trash namespace.
    ///
    /// Returns the logical path to pass to [`restore`](Self::restore).
    async fn soft_delete(&self, path: &str, private: bool) -> StorageResult<String>;

    /// Move a trashed object back to a live namespace, possibly renaming it.
    async fn restore(&self, trashed_path: &str, new_path: &str, private: bool)
    -> StorageResult<()>;

    /// Relocate a live object to another path and/or visibility.
    async fn move_object(
        &self,
        original_path: &str,
        new_path: &str,
        original_private: bool,
        new_private: bool,
    ) -> StorageResult<()>;

    /// Public URL of `path`, or an empty string when public links are
    /// disabled. Does not check that the object exists.
    fn public_url(&self, path: &str) -> String;

    /// Probe the backend with the provider's own configuration.
    async fn validate(&self) -> ValidationReport;
}

/// [`StorageProvider`] backed by a remote object store.
///
/// The configuration, path expander and client are fixed at construction;
/// the provider holds no mutable state and can be shared freely.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use assetstore_core::config::ProviderConfig;
/// use assetstore_core::memory::{InMemoryClientFactory, InMemoryObjectStore};
/// use assetstore_core::provider::{ObjectStoreProvider, StorageProvider};
/// use bytes::Bytes;
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryObjectStore::with_buckets(["acme"]));
/// let config = ProviderConfig::builder().bucket("acme".into()).build();
/// let provider =
///     ObjectStoreProvider::new(config, Arc::new(InMemoryClientFactory::new(store))).unwrap();
///
/// provider.write(Bytes::from("hi"), "Notes/Hello.txt", false).await.unwrap();
/// let token = provider.soft_delete("notes/hello.txt", false).await.unwrap();
/// assert!(!provider.exists("notes/hello.txt", false, false).await);
/// provider.restore(&token, "notes/hello.txt", false).await.unwrap();
/// assert_eq!(provider.read("notes/hello.txt", false, false).await.unwrap(), "hi");
/// # });
/// ```
pub struct ObjectStoreProvider {
    config: Arc<ProviderConfig>,
    expander: PathExpander,
    root_url: Option<String>,
    client: Arc<dyn ObjectStoreClient>,
    factory: Arc<dyn ClientFactory>,
}

impl fmt::Debug for ObjectStoreProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreProvider")
            .field("bucket", &self.config.bucket)
            .field("region", &self.config.region)
            .field("roots", self.expander.roots())
            .field("root_url", &self.root_url)
            .finish_non_exhaustive()
    }
}

impl ObjectStoreProvider {
    /// Build a provider, connecting a client through `factory`.
    ///
    /// # Errors
    ///
    /// Fails when the namespace roots overlap or the factory cannot build a
    /// client.
    pub fn new(config: ProviderConfig, factory: Arc<dyn ClientFactory>) -> StorageResult<Self> {
        let client = factory.connect(&config)?;
        Self::with_client(config, client, factory)
    }

    /// Build a provider around an existing client.
    ///
    /// # Errors
    ///
    /// Fails when the namespace roots overlap.
    pub fn with_client(
        config: ProviderConfig,
        client: Arc<dyn ObjectStoreClient>,
        factory: Arc<dyn ClientFactory>,
    ) -> StorageResult<Self> {
        let expander = PathExpander::new(config.namespace_roots()?);
        let root_url = config.root_url();
        debug!(
            bucket = %config.bucket,
            region = %config.region,
            roots = ?expander.roots(),
            "created object store provider"
        );
        Ok(Self {
            config: Arc::new(config),
            expander,
            root_url,
            client,
            factory,
        })
    }

    /// The configuration this provider was built from.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The path expander shared by every operation.
    #[must_use]
    pub fn expander(&self) -> &PathExpander {
        &self.expander
    }

    /// The transport client.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn ObjectStoreClient> {
        &self.client
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Move `source_key` to `destination_key` with a server-side copy
    /// followed by deletion of the source.
    ///
    /// If the source cannot be removed, the copy is removed again so that
    /// the object never lives in two namespaces at once.
    async fn relocate(
        &self,
        source_key: &str,
        destination_key: &str,
        access: AccessDescriptor,
    ) -> StorageResult<()> {
        if source_key == destination_key {
            debug!(key = source_key, "source and destination coincide, nothing to move");
            return Ok(());
        }

        self.client
            .copy_object(CopyRequest::within(
                self.bucket(),
                source_key,
                destination_key,
                access,
            ))
            .await?;

        if let Err(err) = self.client.delete_object(self.bucket(), source_key).await {
            warn!(
                source_key,
                destination_key,
                error = %err,
                "failed to remove source after copy, rolling back"
            );
            if let Err(rollback) = self
                .client
                .delete_object(self.bucket(), destination_key)
                .await
            {
                error!(
                    destination_key,
                    error = %rollback,
                    "rollback failed, object now exists at both keys"
                );
            }
            return Err(err);
        }

        debug!(
            source_key,
            destination_key,
            acl = %access.acl,
            tier = %access.tier,
            "relocated object"
        );
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for ObjectStoreProvider {
    async fn list(&self, path: &str, private: bool) -> StorageResult<Vec<ListEntry>> {
        let key = self
            .expander
            .expand(path, Visibility::from_private(private), false);
        let prefix = directory_prefix(&key);
        let listing = self
            .client
            .list_by_prefix(self.bucket(), &prefix, Some(LIST_DELIMITER), None)
            .await?;

        let mut entries = Vec::with_capacity(listing.common_prefixes.len() + listing.objects.len());
        for common in &listing.common_prefixes {
            let Some(name) = common.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let name = name.trim_end_matches(SEPARATOR);
            if name.is_empty() {
                continue;
            }
            entries.push(ListEntry {
                name: name.to_owned(),
                directory: true,
                size: 0,
                last_modified: None,
            });
        }
        for object in listing.objects {
            let Some(name) = object.key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            // Zero-size keys are directory placeholder markers.
            if name.is_empty() || name.contains(SEPARATOR) || object.size == 0 {
                continue;
            }
            entries.push(ListEntry {
                name: name.to_owned(),
                directory: false,
                size: object.size,
                last_modified: object.last_modified,
            });
        }

        trace!(prefix = %prefix, count = entries.len(), "listed entries");
        Ok(entries)
    }

    async fn inspect(&self, path: &str, trashed: bool, private: bool) -> Option<ObjectDescriptor> {
        let key = self
            .expander
            .expand(path, Visibility::from_private(private), trashed);
        let parent = parent_prefix(&key);
        match self
            .client
            .list_by_prefix(self.bucket(), parent, Some(LIST_DELIMITER), None)
            .await
        {
            Ok(listing) => listing
                .objects
                .into_iter()
                .find(|object| object.key == key)
                .map(|object| ObjectDescriptor {
                    size: object.size,
                    last_modified: object.last_modified,
                }),
            Err(err) => {
                debug!(key = %key, error = %err, "inspect failed, reporting object as absent");
                None
            }
        }
    }

    async fn read(&self, path: &str, trashed: bool, private: bool) -> StorageResult<Bytes> {
        let key = self
            .expander
            .expand(path, Visibility::from_private(private), trashed);
        let fetched = match self.client.get_bytes(self.bucket(), &key).await {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(key = %key, error = %err, "fetch failed");
                return Err(StorageError::not_found(path));
            }
        };

        match checksums::verify_etag(&fetched.body, fetched.etag.as_deref()) {
            Verification::Verified => Ok(fetched.body),
            Verification::Unverifiable => {
                trace!(key = %key, etag = ?fetched.etag, "payload not verifiable from etag");
                Ok(fetched.body)
            }
            Verification::Mismatch { expected, actual } => {
                warn!(key = %key, %expected, %actual, "payload failed integrity verification");
                Err(StorageError::not_found(path))
            }
        }
    }

    async fn write(&self, data: Bytes, path: &str, private: bool) -> StorageResult<()> {
        let visibility = Visibility::from_private(private);
        let key = self.expander.expand(path, visibility, false);
        let access = access_for(visibility, false);
        debug!(key = %key, size = data.len(), acl = %access.acl, "writing object");
        self.client
            .put_bytes(self.bucket(), &key, data, access)
            .await
    }

    async fn delete(&self, path: &str, trashed: bool, private: bool) -> StorageResult<()> {
        let key = self
            .expander
            .expand(path, Visibility::from_private(private), trashed);
        debug!(key = %key, "deleting object");
        self.client.delete_object(self.bucket(), &key).await
    }

    async fn soft_delete(&self, path: &str, private: bool) -> StorageResult<String> {
        let visibility = Visibility::from_private(private);
        let source = self.expander.expand(path, visibility, false);
        let destination = self.expander.expand(path, visibility, true);
        self.relocate(&source, &destination, access_for(visibility, true))
            .await?;
        Ok(path.to_owned())
    }

    async fn restore(
        &self,
        trashed_path: &str,
        new_path: &str,
        private: bool,
    ) -> StorageResult<()> {
        let visibility = Visibility::from_private(private);
        let source = self.expander.expand(trashed_path, visibility, true);
        let destination = self.expander.expand(new_path, visibility, false);
        self.relocate(&source, &destination, access_for(visibility, false))
            .await
    }

    async fn move_object(
        &self,
        original_path: &str,
        new_path: &str,
        original_private: bool,
        new_private: bool,
    ) -> StorageResult<()> {
        let from = Visibility::from_private(original_private);
        let to = Visibility::from_private(new_private);
        let source = self.expander.expand(original_path, from, false);
        let destination = self.expander.expand(new_path, to, false);
        self.relocate(&source, &destination, access_for(to, false))
            .await
    }

    fn public_url(&self, path: &str) -> String {
        match &self.root_url {
            Some(root) => format!(
                "{root}{}",
                self.expander.expand(path, Visibility::Public, false)
            ),
            None => String::new(),
        }
    }

    async fn validate(&self) -> ValidationReport {
        validation::validate_configuration(&self.config, self.factory.as_ref()).await
    }
}
