//! Local-directory storage provider.
//!
//! [`FileSystemProvider`] maps the physical keys produced by the
//! [`PathExpander`] onto files below a root directory. Listing, inspection and
//! the namespace lifecycle behave as they do for the object store; a
//! relocation is a single `rename`, so no rollback is needed. Access
//! descriptors have no filesystem counterpart; they are only logged.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::access::{AccessDescriptor, access_for};
use crate::config::FileSystemConfig;
use crate::error::{StorageError, StorageResult};
use crate::path::PathExpander;
use crate::provider::StorageProvider;
use crate::types::{ListEntry, ObjectDescriptor, Visibility};
use crate::validation::{FIELD_ROOT, ValidationReport};

/// [`StorageProvider`] storing objects as files under a root directory.
#[derive(Debug)]
pub struct FileSystemProvider {
    config: Arc<FileSystemConfig>,
    expander: PathExpander,
    root_url: Option<String>,
}

impl FileSystemProvider {
    /// Build a provider rooted at `config.root`.
    ///
    /// The root directory is not touched until the first operation.
    ///
    /// # Errors
    ///
    /// Fails when the namespace roots overlap.
    pub fn new(config: FileSystemConfig) -> StorageResult<Self> {
        let expander = PathExpander::new(config.namespace_roots()?);
        let root_url = config.root_url();
        debug!(root = %config.root.display(), roots = ?expander.roots(), "created filesystem provider");
        Ok(Self {
            config: Arc::new(config),
            expander,
            root_url,
        })
    }

    /// The configuration this provider was built from.
    #[must_use]
    pub fn config(&self) -> &FileSystemConfig {
        &self.config
    }

    /// Absolute location of a physical key.
    ///
    /// Keys that would climb out of the root are rejected.
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("key {key:?} escapes the storage root"),
            )
            .into());
        }
        Ok(self.config.root.join(relative))
    }

    fn locate(&self, path: &str, trashed: bool, private: bool) -> StorageResult<PathBuf> {
        let key = self
            .expander
            .expand(path, Visibility::from_private(private), trashed);
        self.resolve(&key)
    }

    async fn relocate(
        &self,
        source: &Path,
        destination: &Path,
        access: AccessDescriptor,
    ) -> StorageResult<()> {
        if source == destination {
            debug!(path = %source.display(), "source and destination coincide, nothing to move");
            return Ok(());
        }
        // Fail before creating directories for a move that cannot happen.
        tokio::fs::metadata(source).await?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(source, destination).await?;
        debug!(
            source = %source.display(),
            destination = %destination.display(),
            acl = %access.acl,
            tier = %access.tier,
            "relocated file"
        );
        Ok(())
    }
}

fn modified_at(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

#[async_trait]
impl StorageProvider for FileSystemProvider {
    async fn list(&self, path: &str, private: bool) -> StorageResult<Vec<ListEntry>> {
        let dir = self.locate(path, false, private)?;
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut directories = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                directories.push(ListEntry {
                    name,
                    directory: true,
                    size: 0,
                    last_modified: None,
                });
            } else if metadata.is_file() && metadata.len() > 0 {
                files.push(ListEntry {
                    name,
                    directory: false,
                    size: metadata.len(),
                    last_modified: modified_at(&metadata),
                });
            }
        }
        directories.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        directories.append(&mut files);

        trace!(dir = %dir.display(), count = directories.len(), "listed entries");
        Ok(directories)
    }

    async fn inspect(&self, path: &str, trashed: bool, private: bool) -> Option<ObjectDescriptor> {
        let file = self.locate(path, trashed, private).ok()?;
        match tokio::fs::metadata(&file).await {
            Ok(metadata) if metadata.is_file() => Some(ObjectDescriptor {
                size: metadata.len(),
                last_modified: modified_at(&metadata),
            }),
            Ok(_) => None,
            Err(err) => {
                trace!(file = %file.display(), error = %err, "inspect found nothing");
                None
            }
        }
    }

    async fn read(&self, path: &str, trashed: bool, private: bool) -> StorageResult<Bytes> {
        let file = self
            .locate(path, trashed, private)
            .map_err(|_| StorageError::not_found(path))?;
        match tokio::fs::read(&file).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) => {
                debug!(file = %file.display(), error = %err, "read failed");
                Err(StorageError::not_found(path))
            }
        }
    }

    async fn write(&self, data: Bytes, path: &str, private: bool) -> StorageResult<()> {
        let file = self.locate(path, false, private)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let access = access_for(Visibility::from_private(private), false);
        debug!(file = %file.display(), size = data.len(), acl = %access.acl, "writing file");
        tokio::fs::write(&file, &data).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, trashed: bool, private: bool) -> StorageResult<()> {
        let file = self.locate(path, trashed, private)?;
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                debug!(file = %file.display(), "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn soft_delete(&self, path: &str, private: bool) -> StorageResult<String> {
        let source = self.locate(path, false, private)?;
        let destination = self.locate(path, true, private)?;
        let access = access_for(Visibility::from_private(private), true);
        self.relocate(&source, &destination, access).await?;
        Ok(path.to_owned())
    }

    async fn restore(
        &self,
        trashed_path: &str,
        new_path: &str,
        private: bool,
    ) -> StorageResult<()> {
        let source = self.locate(trashed_path, true, private)?;
        let destination = self.locate(new_path, false, private)?;
        let access = access_for(Visibility::from_private(private), false);
        self.relocate(&source, &destination, access).await
    }

    async fn move_object(
        &self,
        original_path: &str,
        new_path: &str,
        original_private: bool,
        new_private: bool,
    ) -> StorageResult<()> {
        let source = self.locate(original_path, false, original_private)?;
        let destination = self.locate(new_path, false, new_private)?;
        let access = access_for(Visibility::from_private(new_private), false);
        self.relocate(&source, &destination, access).await
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
        let mut report = ValidationReport::new();
        if let Err(StorageError::ConfigurationInvalid { field, message }) =
            self.config.namespace_roots()
        {
            report.push(field, message);
        }
        match tokio::fs::metadata(&self.config.root).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => report.push(FIELD_ROOT, "root is not a directory"),
            Err(err) => report.push(FIELD_ROOT, err.to_string()),
        }
        report
    }
}
