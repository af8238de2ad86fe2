//! Provider configuration.
//!
//! [`ProviderConfig`] configures the object-store provider and
//! [`FileSystemConfig`] its filesystem sibling. Both are immutable once a
//! provider has been built from them. Values can be deserialized (camelCase),
//! built with the typed builder, or loaded from environment variables.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::StorageResult;
use crate::path::NamespaceRoots;

/// Default region used when none is configured.
pub const DEFAULT_REGION: &str = "us-west-1";

/// Default suffix of the public namespace.
pub const DEFAULT_PUBLIC_SUFFIX: &str = "/public";

/// Default suffix of the private namespace.
pub const DEFAULT_PRIVATE_SUFFIX: &str = "/private";

/// Default suffix of the trash namespace.
pub const DEFAULT_TRASH_SUFFIX: &str = "/.trash";

/// Object-store provider configuration.
///
/// `bucket`, `access_key` and `secret_key` are required; everything else has
/// a default. The secret key is redacted from the `Debug` output.
///
/// # Examples
///
/// ```
/// use assetstore_core::config::ProviderConfig;
///
/// let config = ProviderConfig::builder()
///     .bucket("acme".into())
///     .access_key("AK".into())
///     .secret_key("SK".into())
///     .build();
/// assert_eq!(config.region, "us-west-1");
/// assert_eq!(
///     config.root_url().as_deref(),
///     Some("https://acme.s3.us-west-1.amazonaws.com/")
/// );
/// assert!(!format!("{config:?}").contains("SK"));
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Bucket holding every namespace.
    #[builder(default)]
    pub bucket: String,

    /// Access key identifier.
    #[builder(default)]
    pub access_key: String,

    /// Secret access key.
    #[builder(default)]
    pub secret_key: String,

    /// Region of the bucket.
    #[builder(default = String::from(DEFAULT_REGION))]
    pub region: String,

    /// Base URL for public links. `None` derives one from the bucket and
    /// region (or endpoint); an empty string disables public links.
    #[builder(default, setter(strip_option))]
    pub root_url: Option<String>,

    /// Custom endpoint for S3-compatible services.
    #[builder(default, setter(strip_option))]
    pub endpoint_url: Option<String>,

    /// Use path-style addressing (`endpoint/bucket/key`).
    #[builder(default = false)]
    pub force_path_style: bool,

    /// Common prefix placed in front of every namespace suffix.
    #[builder(default)]
    pub subpath: String,

    /// Suffix of the public namespace.
    #[builder(default = String::from(DEFAULT_PUBLIC_SUFFIX))]
    pub public_suffix: String,

    /// Suffix of the private namespace.
    #[builder(default = String::from(DEFAULT_PRIVATE_SUFFIX))]
    pub private_suffix: String,

    /// Suffix of the trash namespace.
    #[builder(default = String::from(DEFAULT_TRASH_SUFFIX))]
    pub trash_suffix: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("root_url", &self.root_url)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .field("subpath", &self.subpath)
            .field("public_suffix", &self.public_suffix)
            .field("private_suffix", &self.private_suffix)
            .field("trash_suffix", &self.trash_suffix)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `ASSETSTORE_BUCKET` | *(empty)* |
    /// | `ASSETSTORE_ACCESS_KEY` | *(empty)* |
    /// | `ASSETSTORE_SECRET_KEY` | *(empty)* |
    /// | `ASSETSTORE_REGION` | `us-west-1` |
    /// | `ASSETSTORE_ROOT_URL` | derived |
    /// | `ASSETSTORE_ENDPOINT_URL` | *(unset)* |
    /// | `ASSETSTORE_FORCE_PATH_STYLE` | `false` |
    /// | `ASSETSTORE_SUBPATH` | *(empty)* |
    /// | `ASSETSTORE_PUBLIC_SUFFIX` | `/public` |
    /// | `ASSETSTORE_PRIVATE_SUFFIX` | `/private` |
    /// | `ASSETSTORE_TRASH_SUFFIX` | `/.trash` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("ASSETSTORE_BUCKET") {
            config.bucket = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_ACCESS_KEY") {
            config.access_key = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_SECRET_KEY") {
            config.secret_key = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_ROOT_URL") {
            config.root_url = Some(v);
        }
        if let Ok(v) = std::env::var("ASSETSTORE_ENDPOINT_URL") {
            config.endpoint_url = Some(v);
        }
        if let Ok(v) = std::env::var("ASSETSTORE_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("ASSETSTORE_SUBPATH") {
            config.subpath = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_PUBLIC_SUFFIX") {
            config.public_suffix = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_PRIVATE_SUFFIX") {
            config.private_suffix = v;
        }
        if let Ok(v) = std::env::var("ASSETSTORE_TRASH_SUFFIX") {
            config.trash_suffix = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Resolve the namespace roots described by this configuration.
    ///
    /// # Errors
    ///
    /// Fails when two namespace roots overlap.
    pub fn namespace_roots(&self) -> StorageResult<NamespaceRoots> {
        NamespaceRoots::new(
            &self.subpath,
            &self.public_suffix,
            &self.private_suffix,
            &self.trash_suffix,
        )
    }

    /// The effective root URL for public links, always ending with `/`.
    ///
    /// Returns `None` when public links are disabled.
    #[must_use]
    pub fn root_url(&self) -> Option<String> {
        let url = match &self.root_url {
            Some(url) if url.trim().is_empty() => return None,
            Some(url) => url.trim().to_owned(),
            None if self.bucket.is_empty() => return None,
            None => match &self.endpoint_url {
                Some(endpoint) => {
                    format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
                }
                None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
            },
        };
        Some(with_trailing_slash(url))
    }
}

/// Filesystem provider configuration.
///
/// Namespaces become directories under `root`.
///
/// ```
/// use assetstore_core::config::FileSystemConfig;
///
/// let config = FileSystemConfig::builder().root("/srv/assets".into()).build();
/// assert_eq!(config.trash_suffix, "/.trash");
/// assert!(config.root_url().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemConfig {
    /// Directory holding every namespace.
    pub root: PathBuf,

    /// Base URL for public links; `None` or empty disables them.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub root_url: Option<String>,

    /// Common prefix placed in front of every namespace suffix.
    #[builder(default)]
    #[serde(default)]
    pub subpath: String,

    /// Suffix of the public namespace.
    #[builder(default = String::from(DEFAULT_PUBLIC_SUFFIX))]
    #[serde(default = "default_public_suffix")]
    pub public_suffix: String,

    /// Suffix of the private namespace.
    #[builder(default = String::from(DEFAULT_PRIVATE_SUFFIX))]
    #[serde(default = "default_private_suffix")]
    pub private_suffix: String,

    /// Suffix of the trash namespace.
    #[builder(default = String::from(DEFAULT_TRASH_SUFFIX))]
    #[serde(default = "default_trash_suffix")]
    pub trash_suffix: String,
}

impl FileSystemConfig {
    /// Resolve the namespace roots described by this configuration.
    ///
    /// # Errors
    ///
    /// Fails when two namespace roots overlap.
    pub fn namespace_roots(&self) -> StorageResult<NamespaceRoots> {
        NamespaceRoots::new(
            &self.subpath,
            &self.public_suffix,
            &self.private_suffix,
            &self.trash_suffix,
        )
    }

    /// The root URL for public links, always ending with `/`.
    #[must_use]
    pub fn root_url(&self) -> Option<String> {
        self.root_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| with_trailing_slash(url.to_owned()))
    }
}

fn default_public_suffix() -> String {
    DEFAULT_PUBLIC_SUFFIX.to_owned()
}

fn default_private_suffix() -> String {
    DEFAULT_PRIVATE_SUFFIX.to_owned()
}

fn default_trash_suffix() -> String {
    DEFAULT_TRASH_SUFFIX.to_owned()
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
