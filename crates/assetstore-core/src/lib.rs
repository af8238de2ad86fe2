//! Pluggable storage providers with public, private and trash namespaces.
//!
//! Callers address objects by a logical path plus two flags, `private` and
//! `trashed`. This crate expands that triple into a physical key, applies the
//! matching access policy, and implements the namespace lifecycle (write,
//! soft delete, restore, move, permanent delete) on top of a pluggable
//! transport.
//!
//! # Architecture
//!
//! ```text
//!   StorageProvider (uniform contract)
//!        |                        |
//!        v                        v
//!   ObjectStoreProvider      FileSystemProvider
//!        |                        |
//!        | PathExpander           | PathExpander
//!        | access_for             v
//!        v                    tokio::fs
//!   ObjectStoreClient
//!        |
//!        +--> InMemoryObjectStore (tests, local runs)
//!        +--> S3 adapter (assetstore-s3)
//! ```

pub mod access;
pub mod checksums;
pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod path;
pub mod provider;
pub mod types;
pub mod validation;

pub use config::{FileSystemConfig, ProviderConfig};
pub use error::{StorageError, StorageResult};
pub use fs::FileSystemProvider;
pub use provider::{ObjectStoreProvider, StorageProvider};
pub use validation::{ValidationReport, validate_configuration};
