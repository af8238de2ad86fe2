//! Integration tests for assetstore providers against a live S3 endpoint.
//!
//! These tests require an S3-compatible server at `localhost:4566` (or
//! `S3_ENDPOINT_URL`). They are marked `#[ignore]` so they don't run during
//! normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p assetstore-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use assetstore_core::{ObjectStoreProvider, ProviderConfig};
use assetstore_s3::S3ClientFactory;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

static INIT: Once = Once::new();

/// Access key accepted by the local test server.
pub const ACCESS_KEY: &str = "test";

/// Secret key accepted by the local test server.
pub const SECRET_KEY: &str = "test";

/// Region used by every test client.
pub const REGION: &str = "us-east-1";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("S3_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Create a configured S3 client pointing at the local server.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let creds = Credentials::new(ACCESS_KEY, SECRET_KEY, None, None, "integration-test");

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(REGION))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Provider configuration for `bucket` on the local server.
#[must_use]
pub fn provider_config(bucket: &str) -> ProviderConfig {
    ProviderConfig::builder()
        .bucket(bucket.to_owned())
        .access_key(ACCESS_KEY.to_owned())
        .secret_key(SECRET_KEY.to_owned())
        .region(REGION.to_owned())
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build()
}

/// Object-store provider for `bucket` on the local server.
#[must_use]
pub fn provider(bucket: &str) -> ObjectStoreProvider {
    init_tracing();
    ObjectStoreProvider::new(provider_config(bucket), Arc::new(S3ClientFactory))
        .unwrap_or_else(|e| panic!("failed to create provider for {bucket}: {e}"))
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a bucket and return its name. Caller is responsible for cleanup.
pub async fn create_test_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete all objects in a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let mut continuation_token = None;
    loop {
        let mut req = client.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation_token.take() {
            req = req.continuation_token(token);
        }
        let Ok(resp) = req.send().await else {
            return; // Bucket may not exist.
        };

        for obj in resp.contents() {
            if let Some(key) = obj.key() {
                let _ = client.delete_object().bucket(bucket).key(key).send().await;
            }
        }

        if resp.is_truncated() == Some(true) {
            continuation_token = resp.next_continuation_token().map(ToOwned::to_owned);
        } else {
            break;
        }
    }

    let _ = client.delete_bucket().bucket(bucket).send().await;
}

/// Every key currently stored in `bucket`, in listing order.
pub async fn bucket_keys(client: &aws_sdk_s3::Client, bucket: &str) -> Vec<String> {
    let resp = client
        .list_objects_v2()
        .bucket(bucket)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to list {bucket}: {e}"));
    resp.contents()
        .iter()
        .filter_map(|o| o.key().map(ToOwned::to_owned))
        .collect()
}

mod test_lifecycle;
mod test_list;
mod test_validation;
