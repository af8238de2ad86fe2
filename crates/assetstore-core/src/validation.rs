//! Configuration self-validation.
//!
//! [`validate_configuration`] probes a candidate [`ProviderConfig`] against
//! the backend before it is put to use. It never fails; problems are reported
//! as field-level entries of a [`ValidationReport`]:
//!
//! 1. Required fields (`bucket`, `accessKey`, `secretKey`) must be non-empty
//!    and the namespace roots must not overlap. Any problem here skips the
//!    probes.
//! 2. A client is built from the credentials and asked to list buckets. A
//!    failure is reported once on `accessKey` and skips the bucket probe.
//! 3. The configured bucket is listed. A failure is reported once on
//!    `bucket`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ClientFactory;
use crate::config::ProviderConfig;
use crate::error::{StorageError, StorageResult};

/// Configuration field holding the bucket name.
pub const FIELD_BUCKET: &str = "bucket";

/// Configuration field holding the access key.
pub const FIELD_ACCESS_KEY: &str = "accessKey";

/// Configuration field holding the secret key.
pub const FIELD_SECRET_KEY: &str = "secretKey";

/// Configuration field holding the filesystem root.
pub const FIELD_ROOT: &str = "root";

/// A problem with one configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Configuration field name (camelCase).
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

/// Outcome of configuration validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    /// An empty (valid) report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether no problem was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every recorded problem, in the order found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Problems recorded against `field`.
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Convert into a result carrying the first problem.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigurationInvalid`] when the report holds
    /// at least one problem.
    pub fn into_result(self) -> StorageResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(FieldError { field, message }) => {
                Err(StorageError::ConfigurationInvalid { field, message })
            }
        }
    }
}

/// Validate `config` by probing the backend through `factory`.
pub async fn validate_configuration(
    config: &ProviderConfig,
    factory: &dyn ClientFactory,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (field, value) in [
        (FIELD_BUCKET, &config.bucket),
        (FIELD_ACCESS_KEY, &config.access_key),
        (FIELD_SECRET_KEY, &config.secret_key),
    ] {
        if value.trim().is_empty() {
            report.push(field, "this field is required");
        }
    }
    if let Err(StorageError::ConfigurationInvalid { field, message }) = config.namespace_roots() {
        report.push(field, message);
    }
    if !report.is_valid() {
        debug!(errors = report.errors().len(), "configuration incomplete, skipping probes");
        return report;
    }

    let client = match factory.connect(config) {
        Ok(client) => client,
        Err(err) => {
            info!(error = %err, "credential probe failed: cannot build client");
            report.push(FIELD_ACCESS_KEY, err.to_string());
            return report;
        }
    };
    if let Err(err) = client.list_buckets().await {
        info!(error = %err, "credential probe failed");
        report.push(FIELD_ACCESS_KEY, err.to_string());
        return report;
    }

    if let Err(err) = client
        .list_by_prefix(&config.bucket, "", None, Some(1))
        .await
    {
        info!(bucket = %config.bucket, error = %err, "bucket probe failed");
        report.push(FIELD_BUCKET, err.to_string());
    }

    debug!(valid = report.is_valid(), "configuration validated");
    report
}
