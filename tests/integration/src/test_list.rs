//! Listing integration tests.

#[cfg(test)]
mod tests {
    use assetstore_core::StorageProvider;
    use bytes::Bytes;

    use crate::{cleanup_bucket, create_test_bucket, provider, s3_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_direct_children() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "list").await;
        let provider = provider(&bucket);

        for (path, data) in [
            ("dir/x", &b""[..]),
            ("dir/y", &b"0123456789"[..]),
            ("dir/sub/z", &b"z"[..]),
        ] {
            provider
                .write(Bytes::copy_from_slice(data), path, false)
                .await
                .expect("write");
        }

        let entries = provider.list("dir", false).await.expect("list");
        let names: Vec<(&str, bool, u64)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.directory, e.size))
            .collect();
        assert_eq!(names, [("sub", true, 0), ("y", false, 10)]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_follow_pagination() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "page").await;
        let provider = provider(&bucket);

        for i in 0..1_050 {
            provider
                .write(Bytes::from(format!("item {i}")), &format!("many/{i:04}.txt"), false)
                .await
                .expect("write");
        }

        let entries = provider.list("many", false).await.expect("list");
        assert_eq!(entries.len(), 1_050);

        cleanup_bucket(&client, &bucket).await;
    }
}
