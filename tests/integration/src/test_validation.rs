//! Configuration validation integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assetstore_core::{ObjectStoreProvider, StorageProvider, validate_configuration};
    use assetstore_s3::S3ClientFactory;

    use crate::{cleanup_bucket, create_test_bucket, provider_config, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_existing_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "valid").await;

        let report = validate_configuration(&provider_config(&bucket), &S3ClientFactory).await;
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_only_bucket_when_bucket_is_missing() {
        let _client = s3_client();
        let config = provider_config("test-missing-acme");
        let provider =
            ObjectStoreProvider::new(config, Arc::new(S3ClientFactory)).expect("provider");

        let report = provider.validate().await;
        assert_eq!(report.errors().len(), 1, "errors: {:?}", report.errors());
        assert_eq!(report.errors()[0].field, "bucket");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_credentials_when_endpoint_is_unreachable() {
        let mut config = provider_config("acme");
        config.endpoint_url = Some("http://127.0.0.1:9".to_owned());

        let report = validate_configuration(&config, &S3ClientFactory).await;
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].field, "accessKey");
    }
}
