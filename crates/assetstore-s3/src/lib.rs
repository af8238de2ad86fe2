//! Amazon S3 transport for assetstore providers.
//!
//! [`S3ObjectStore`] implements
//! [`ObjectStoreClient`](assetstore_core::client::ObjectStoreClient) with
//! `aws-sdk-s3`, and [`S3ClientFactory`] builds one from a
//! [`ProviderConfig`](assetstore_core::config::ProviderConfig). Custom
//! endpoints and path-style addressing make it usable against any
//! S3-compatible service.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assetstore_core::{ObjectStoreProvider, ProviderConfig, StorageProvider};
//! use assetstore_s3::S3ClientFactory;
//!
//! # async fn run() -> assetstore_core::StorageResult<()> {
//! let config = ProviderConfig::from_env();
//! let provider = ObjectStoreProvider::new(config, Arc::new(S3ClientFactory))?;
//! for entry in provider.list("", false).await? {
//!     println!("{} {}", entry.name, entry.size);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod convert;

pub use client::{S3ClientFactory, S3ObjectStore};
