//! Conversions between assetstore values and aws-sdk-s3 types.

use assetstore_core::access::{CannedAcl, StorageTier};
use assetstore_core::error::StorageError;
use assetstore_core::types::ObjectSummary;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::DateTime as AwsDateTime;
use aws_sdk_s3::types::{Object, ObjectCannedAcl, ServerSideEncryption, StorageClass};
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left intact in a copy source: unreserved ones plus `/`.
const COPY_SOURCE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn canned_acl(acl: CannedAcl) -> ObjectCannedAcl {
    match acl {
        CannedAcl::PublicRead => ObjectCannedAcl::PublicRead,
        CannedAcl::Private => ObjectCannedAcl::Private,
    }
}

pub(crate) fn storage_class(tier: StorageTier) -> StorageClass {
    match tier {
        StorageTier::Standard => StorageClass::Standard,
        StorageTier::ReducedRedundancy => StorageClass::ReducedRedundancy,
    }
}

/// `x-amz-copy-source` value for `key` in `bucket`.
pub(crate) fn copy_source(bucket: &str, key: &str) -> String {
    format!("{bucket}/{}", utf8_percent_encode(key, COPY_SOURCE_SET))
}

pub(crate) fn to_chrono(ts: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

/// Summary of a listed object; entries without a key are dropped.
pub(crate) fn object_summary(object: &Object) -> Option<ObjectSummary> {
    let key = object.key()?;
    Some(ObjectSummary {
        key: key.to_owned(),
        size: object
            .size()
            .and_then(|s| u64::try_from(s).ok())
            .unwrap_or_default(),
        last_modified: object.last_modified().and_then(to_chrono),
        etag: object.e_tag().map(ToOwned::to_owned),
    })
}

/// Entity tag worth checking against the payload MD5.
///
/// Objects encrypted with SSE-KMS or SSE-C carry an entity tag that is not
/// the MD5 of the plaintext, so theirs is withheld.
pub(crate) fn verifiable_etag(
    etag: Option<&str>,
    encryption: Option<&ServerSideEncryption>,
    customer_algorithm: Option<&str>,
) -> Option<String> {
    let kms = matches!(
        encryption,
        Some(ServerSideEncryption::AwsKms | ServerSideEncryption::AwsKmsDsse)
    );
    if kms || customer_algorithm.is_some() {
        return None;
    }
    etag.map(ToOwned::to_owned)
}

/// Wrap an SDK failure, keeping the full error chain in the message.
pub(crate) fn sdk_error<E>(operation: &str, err: E) -> StorageError
where
    E: std::error::Error + 'static,
{
    StorageError::transport(format!("{operation}: {}", DisplayErrorContext(&err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_access_descriptor_to_sdk_enums() {
        assert_eq!(canned_acl(CannedAcl::PublicRead), ObjectCannedAcl::PublicRead);
        assert_eq!(canned_acl(CannedAcl::Private), ObjectCannedAcl::Private);
        assert_eq!(storage_class(StorageTier::Standard), StorageClass::Standard);
        assert_eq!(
            storage_class(StorageTier::ReducedRedundancy),
            StorageClass::ReducedRedundancy
        );
        assert_eq!(canned_acl(CannedAcl::PublicRead).as_str(), CannedAcl::PublicRead.as_str());
        assert_eq!(
            storage_class(StorageTier::ReducedRedundancy).as_str(),
            StorageTier::ReducedRedundancy.as_str()
        );
    }

    #[test]
    fn test_should_encode_copy_source_keeping_separators() {
        assert_eq!(copy_source("b", "public/a b/c+d.txt"), "b/public/a%20b/c%2Bd.txt");
        assert_eq!(copy_source("b", ".trash/Q1~v2.pdf"), "b/.trash/Q1~v2.pdf");
    }

    #[test]
    fn test_should_withhold_etag_of_encrypted_objects() {
        let etag = Some("\"5d41402abc4b2a76b9719d911017c592\"");
        assert_eq!(verifiable_etag(etag, None, None).as_deref(), etag);
        assert_eq!(
            verifiable_etag(etag, Some(&ServerSideEncryption::Aes256), None).as_deref(),
            etag
        );
        assert!(verifiable_etag(etag, Some(&ServerSideEncryption::AwsKms), None).is_none());
        assert!(verifiable_etag(etag, Some(&ServerSideEncryption::AwsKmsDsse), None).is_none());
        assert!(verifiable_etag(etag, None, Some("AES256")).is_none());
        assert!(verifiable_etag(None, None, None).is_none());
    }

    #[test]
    fn test_should_convert_timestamps() {
        let ts = AwsDateTime::from_secs(1_700_000_000);
        let converted = to_chrono(&ts).unwrap_or_else(|| panic!("in range"));
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_should_summarize_listed_objects() {
        let object = Object::builder()
            .key("public/a.txt")
            .size(12)
            .e_tag("\"abc\"")
            .last_modified(AwsDateTime::from_secs(1_700_000_000))
            .build();
        let summary = object_summary(&object).unwrap_or_else(|| panic!("has key"));
        assert_eq!(summary.key, "public/a.txt");
        assert_eq!(summary.size, 12);
        assert_eq!(summary.etag.as_deref(), Some("\"abc\""));
        assert!(summary.last_modified.is_some());

        assert!(object_summary(&Object::builder().size(1).build()).is_none());
    }
}
