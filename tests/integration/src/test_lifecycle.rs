//! Namespace lifecycle integration tests.

#[cfg(test)]
mod tests {
    use assetstore_core::StorageProvider;
    use aws_sdk_s3::types::StorageClass;
    use bytes::Bytes;

    use crate::{bucket_keys, cleanup_bucket, create_test_bucket, provider, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_and_read_back() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "rw").await;
        let provider = provider(&bucket);

        provider
            .write(Bytes::from_static(b"hello, assets"), "Docs/Hello.txt", false)
            .await
            .expect("write");
        assert_eq!(bucket_keys(&client, &bucket).await, ["public/docs/hello.txt"]);

        let data = provider
            .read("docs/hello.txt", false, false)
            .await
            .expect("read");
        assert_eq!(data.as_ref(), b"hello, assets");

        let info = provider
            .inspect("docs/hello.txt", false, false)
            .await
            .expect("inspect");
        assert_eq!(info.size, 13);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_through_trash() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "trash").await;
        let provider = provider(&bucket);
        let payload = Bytes::from_static(b"quarterly numbers");

        provider
            .write(payload.clone(), "Reports/Q1.pdf", true)
            .await
            .expect("write");
        let token = provider
            .soft_delete("Reports/Q1.pdf", true)
            .await
            .expect("soft delete");
        assert_eq!(bucket_keys(&client, &bucket).await, [".trash/Reports/Q1.pdf"]);
        assert!(!provider.exists("reports/q1.pdf", false, true).await);

        let head = client
            .head_object()
            .bucket(&bucket)
            .key(".trash/Reports/Q1.pdf")
            .send()
            .await
            .expect("head trashed object");
        assert_eq!(head.storage_class(), Some(&StorageClass::ReducedRedundancy));

        provider
            .restore(&token, "reports/q1.pdf", true)
            .await
            .expect("restore");
        let data = provider
            .read("reports/q1.pdf", false, true)
            .await
            .expect("read restored");
        assert_eq!(data, payload);
        assert_eq!(bucket_keys(&client, &bucket).await, ["private/reports/q1.pdf"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_move_between_visibilities() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "move").await;
        let provider = provider(&bucket);

        provider
            .write(Bytes::from_static(b"draft"), "draft.txt", true)
            .await
            .expect("write");
        provider
            .move_object("draft.txt", "published/final.txt", true, false)
            .await
            .expect("move");
        assert_eq!(
            bucket_keys(&client, &bucket).await,
            ["public/published/final.txt"]
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_permanently() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delete").await;
        let provider = provider(&bucket);

        provider
            .write(Bytes::from_static(b"gone"), "a.txt", false)
            .await
            .expect("write");
        provider.delete("a.txt", false, false).await.expect("delete");
        assert!(bucket_keys(&client, &bucket).await.is_empty());
        assert!(
            provider
                .read("a.txt", false, false)
                .await
                .is_err_and(|e| e.is_not_found())
        );

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_bucket_as_absent() {
        let provider = provider("test-no-such-bucket-assetstore");
        assert!(provider.inspect("a.txt", false, false).await.is_none());
        assert!(provider.list("", false).await.is_err());
    }
}
