//! [`ObjectStoreClient`] over the AWS S3 API.

use std::sync::Arc;

use assetstore_core::access::AccessDescriptor;
use assetstore_core::client::{ClientFactory, CopyRequest, ObjectStoreClient};
use assetstore_core::config::ProviderConfig;
use assetstore_core::error::{StorageError, StorageResult};
use assetstore_core::types::{FetchedObject, Listing};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ChecksumMode, MetadataDirective};
use bytes::Bytes;
use tracing::{debug, trace};

use crate::convert::{
    canned_acl, copy_source, object_summary, sdk_error, storage_class, verifiable_etag,
};

/// Name reported as the provider of static credentials.
const CREDENTIALS_PROVIDER: &str = "assetstore";

/// S3 transport client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Wrap an already configured SDK client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from the credentials, region and endpoint of `config`.
    #[must_use]
    pub fn from_config(config: &ProviderConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = config.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
            builder = builder.endpoint_url(endpoint);
        }

        debug!(
            region = %config.region,
            endpoint = ?config.endpoint_url,
            force_path_style = config.force_path_style,
            "built S3 client"
        );
        Self::new(aws_sdk_s3::Client::from_conf(builder.build()))
    }

    /// The underlying SDK client.
    #[must_use]
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(sdk_error("HeadObject", err))
                }
            }
        }
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStore {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| sdk_error("ListBuckets", e))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(ToOwned::to_owned))
            .collect())
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(sdk_error("HeadBucket", err))
                }
            }
        }
    }

    async fn list_by_prefix(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> StorageResult<Listing> {
        let mut listing = Listing::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let returned = listing.objects.len() + listing.common_prefixes.len();
            let remaining = max_results.map(|max| max.saturating_sub(returned));
            if remaining == Some(0) {
                break;
            }

            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_delimiter(delimiter.map(ToOwned::to_owned))
                .set_max_keys(remaining.map(|r| i32::try_from(r).unwrap_or(i32::MAX)))
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListObjectsV2", e))?;

            listing
                .objects
                .extend(output.contents().iter().filter_map(object_summary));
            listing.common_prefixes.extend(
                output
                    .common_prefixes()
                    .iter()
                    .filter_map(|cp| cp.prefix().map(ToOwned::to_owned)),
            );

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(ToOwned::to_owned);
            }
            if continuation_token.is_none() {
                break;
            }
        }

        trace!(
            bucket,
            prefix,
            objects = listing.objects.len(),
            common_prefixes = listing.common_prefixes.len(),
            "listed S3 objects"
        );
        Ok(listing)
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .checksum_mode(ChecksumMode::Enabled)
            .send()
            .await
            .map_err(|e| sdk_error("GetObject", e))?;
        let etag = verifiable_etag(
            output.e_tag(),
            output.server_side_encryption(),
            output.sse_customer_algorithm(),
        );
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| sdk_error("GetObject body", e))?
            .into_bytes();
        Ok(FetchedObject { body, etag })
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        access: AccessDescriptor,
    ) -> StorageResult<()> {
        trace!(bucket, key, size = body.len(), acl = %access.acl, "putting S3 object");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .acl(canned_acl(access.acl))
            .storage_class(storage_class(access.tier))
            .send()
            .await
            .map_err(|e| sdk_error("PutObject", e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteObject", e))?;
        Ok(())
    }

    async fn copy_object(&self, request: CopyRequest) -> StorageResult<()> {
        if !request.overwrite
            && self
                .object_exists(&request.destination_bucket, &request.destination_key)
                .await?
        {
            return Err(StorageError::transport(format!(
                "PreconditionFailed: destination exists: {}",
                request.destination_key
            )));
        }

        debug!(
            source_key = %request.source_key,
            destination_key = %request.destination_key,
            "copying S3 object"
        );
        self.client
            .copy_object()
            .copy_source(copy_source(&request.source_bucket, &request.source_key))
            .bucket(&request.destination_bucket)
            .key(&request.destination_key)
            .metadata_directive(MetadataDirective::Copy)
            .acl(canned_acl(request.access.acl))
            .storage_class(storage_class(request.access.tier))
            .send()
            .await
            .map_err(|e| sdk_error("CopyObject", e))?;
        Ok(())
    }
}

/// [`ClientFactory`] producing [`S3ObjectStore`] clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3ClientFactory;

impl ClientFactory for S3ClientFactory {
    fn connect(&self, config: &ProviderConfig) -> StorageResult<Arc<dyn ObjectStoreClient>> {
        if let Some(endpoint) = config.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(StorageError::invalid_config(
                    "endpointUrl",
                    format!("endpoint {endpoint:?} must be an http(s) URL"),
                ));
            }
        }
        Ok(Arc::new(S3ObjectStore::from_config(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig::builder()
            .bucket("acme".into())
            .access_key("AK".into())
            .secret_key("SK".into())
            .region("eu-central-1".into())
            .endpoint_url("http://localhost:4566".into())
            .force_path_style(true)
            .build()
    }

    #[tokio::test]
    async fn test_should_build_client_from_config() {
        let store = S3ObjectStore::from_config(&config());
        let conf = store.inner().config();
        assert_eq!(conf.region(), Some(&Region::new("eu-central-1")));
    }

    #[tokio::test]
    async fn test_should_connect_through_factory() {
        assert!(S3ClientFactory.connect(&config()).is_ok());
        assert!(S3ClientFactory.connect(&ProviderConfig::default()).is_ok());
    }

    #[test]
    fn test_should_reject_non_http_endpoint() {
        let mut config = config();
        config.endpoint_url = Some("localhost:4566".to_owned());
        match S3ClientFactory.connect(&config) {
            Err(StorageError::ConfigurationInvalid { field, .. }) => assert_eq!(field, "endpointUrl"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
