//! Payload integrity verification.
//!
//! Object stores report an entity tag alongside each payload. For objects
//! uploaded in a single request the tag is the quoted hex MD5 of the body,
//! so a fetched payload can be checked against it. Multipart uploads carry a
//! composite tag (`"<hex>-<parts>"`) that cannot be recomputed from the body
//! alone; those are accepted as-is.

use md5::{Digest, Md5};

/// Compute the hex-encoded MD5 digest of `data`.
///
/// ```
/// use assetstore_core::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Compute the quoted MD5 entity tag of `data`.
///
/// ```
/// use assetstore_core::checksums::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", compute_md5(data))
}

/// Outcome of checking a payload against its entity tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The payload digest matches the tag.
    Verified,
    /// The tag cannot be checked from the payload (absent or multipart).
    Unverifiable,
    /// The payload digest differs from the tag.
    Mismatch {
        /// Tag reported by the backend (unquoted).
        expected: String,
        /// Digest computed from the payload.
        actual: String,
    },
}

impl Verification {
    /// Whether the payload may be handed to the caller.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, Self::Mismatch { .. })
    }
}

/// Verify `data` against the entity tag reported by the backend.
///
/// ```
/// use assetstore_core::checksums::{Verification, compute_etag, verify_etag};
///
/// let tag = compute_etag(b"payload");
/// assert_eq!(verify_etag(b"payload", Some(&tag)), Verification::Verified);
/// assert!(!verify_etag(b"tampered", Some(&tag)).is_acceptable());
/// ```
#[must_use]
pub fn verify_etag(data: &[u8], etag: Option<&str>) -> Verification {
    let Some(tag) = etag else {
        return Verification::Unverifiable;
    };
    let expected = tag.trim().trim_start_matches("W/").trim_matches('"');
    if expected.len() != 32 || !expected.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Verification::Unverifiable;
    }
    let actual = compute_md5(data);
    if actual.eq_ignore_ascii_case(expected) {
        Verification::Verified
    } else {
        Verification::Mismatch {
            expected: expected.to_owned(),
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compute_md5_of_empty_input() {
        assert_eq!(compute_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_should_verify_matching_payload() {
        let tag = compute_etag(b"hello world");
        assert_eq!(verify_etag(b"hello world", Some(&tag)), Verification::Verified);
    }

    #[test]
    fn test_should_accept_unquoted_and_uppercase_tags() {
        let tag = compute_md5(b"abc").to_uppercase();
        assert_eq!(verify_etag(b"abc", Some(&tag)), Verification::Verified);
    }

    #[test]
    fn test_should_detect_mismatch() {
        let tag = compute_etag(b"original");
        match verify_etag(b"corrupted", Some(&tag)) {
            Verification::Mismatch { expected, actual } => {
                assert_eq!(expected, compute_md5(b"original"));
                assert_eq!(actual, compute_md5(b"corrupted"));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_should_treat_multipart_and_missing_tags_as_unverifiable() {
        let multipart = "\"5d41402abc4b2a76b9719d911017c592-3\"";
        assert_eq!(verify_etag(b"x", Some(multipart)), Verification::Unverifiable);
        assert_eq!(verify_etag(b"x", None), Verification::Unverifiable);
        assert!(Verification::Unverifiable.is_acceptable());
    }
}
