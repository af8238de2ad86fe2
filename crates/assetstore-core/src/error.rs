//! Storage provider error types.
//!
//! Defines [`StorageError`], the single error enum returned by every
//! [`StorageProvider`](crate::provider::StorageProvider) and
//! [`ObjectStoreClient`](crate::client::ObjectStoreClient) operation.
//!
//! # Usage
//!
//! ```
//! use assetstore_core::error::StorageError;
//!
//! let err = StorageError::transport("connection reset by peer");
//! assert!(err.is_transport());
//! assert!(err.to_string().contains("connection reset"));
//! ```

/// Storage provider error type.
///
/// The variants mirror the three failure classes callers can distinguish:
/// backend failures, missing (or corrupt) objects, and invalid configuration.
/// Filesystem failures are carried separately so that their source is
/// preserved.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Network, authentication or backend failure reported by the transport.
    #[error("transport error: {message}")]
    Transport {
        /// Diagnostic text reported by the backend.
        message: String,
    },

    /// The object could not be read, or its payload failed verification.
    #[error("object not found: {path}")]
    ObjectNotFound {
        /// The logical path that was requested.
        path: String,
    },

    /// A configuration field is missing or was rejected by the backend.
    #[error("invalid configuration for {field}: {message}")]
    ConfigurationInvalid {
        /// Configuration field name (camelCase, as in the config surface).
        field: String,
        /// Human-readable reason.
        message: String,
    },

    /// Local filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Build a [`StorageError::Transport`] from any displayable diagnostic.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`StorageError::ObjectNotFound`] for the given logical path.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::ObjectNotFound { path: path.into() }
    }

    /// Build a [`StorageError::ConfigurationInvalid`].
    #[must_use]
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the transport layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether this error reports a missing object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}

/// Convenience result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
