//! Error types for the configuration store.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use tabgroup_config::{Result, StorageArea};
//!
//! async fn example(option: &ConfigOption<bool>) -> Result<()> {
//!     option.set_value_in(true, StorageArea::Local).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArea`] |
//! | Layer | [`Error::Unavailable`], [`Error::ReadOnlyArea`], [`Error::Storage`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! # Propagation
//!
//! Read-path errors are absorbed by [`ConfigOption`](crate::ConfigOption)
//! and treated as "absent". Write-path errors always reach the caller.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::area::StorageArea;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the store builder is misconfigured.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Write or clear targeted an area this crate may not modify.
    ///
    /// Returned for `managed` and for unrecognized area names.
    #[error("Invalid storage area: {area}")]
    InvalidArea {
        /// The rejected area name.
        area: String,
    },

    // ========================================================================
    // Layer Errors
    // ========================================================================
    /// Layer cannot be read in the current host state.
    ///
    /// Raised by a managed layer without provisioned policy. Never
    /// surfaced by [`ConfigOption`](crate::ConfigOption).
    #[error("Storage area unavailable: {area}")]
    Unavailable {
        /// The unavailable layer.
        area: StorageArea,
    },

    /// Layer refused a write because it is read-only.
    #[error("Storage area is read-only: {area}")]
    ReadOnlyArea {
        /// The read-only layer.
        area: StorageArea,
    },

    /// Backing store failure.
    #[error("Storage error in {area}: {message}")]
    Storage {
        /// Layer that failed.
        area: StorageArea,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid area error.
    #[inline]
    pub fn invalid_area(area: impl Into<String>) -> Self {
        Self::InvalidArea { area: area.into() }
    }

    /// Creates an unavailable layer error.
    #[inline]
    pub fn unavailable(area: StorageArea) -> Self {
        Self::Unavailable { area }
    }

    /// Creates a read-only layer error.
    #[inline]
    pub fn read_only(area: StorageArea) -> Self {
        Self::ReadOnlyArea { area }
    }

    /// Creates a storage error.
    #[inline]
    pub fn storage(area: StorageArea, message: impl Into<String>) -> Self {
        Self::Storage {
            area,
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is an invalid area error.
    #[inline]
    #[must_use]
    pub fn is_invalid_area(&self) -> bool {
        matches!(self, Self::InvalidArea { .. })
    }

    /// Returns `true` if the layer could not be read at all.
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns `true` if this error came from a backing layer.
    #[inline]
    #[must_use]
    pub fn is_layer_error(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::ReadOnlyArea { .. } | Self::Storage { .. } | Self::Io(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_area("managed");
        assert_eq!(err.to_string(), "Invalid storage area: managed");
    }

    #[test]
    fn test_storage_error_display() {
        let err = Error::storage(StorageArea::Sync, "quota exceeded");
        assert_eq!(err.to_string(), "Storage error in sync: quota exceeded");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing local area");
        assert_eq!(err.to_string(), "Configuration error: missing local area");
    }

    #[test]
    fn test_is_invalid_area() {
        assert!(Error::invalid_area("session").is_invalid_area());
        assert!(!Error::read_only(StorageArea::Managed).is_invalid_area());
    }

    #[test]
    fn test_is_layer_error() {
        assert!(Error::unavailable(StorageArea::Managed).is_layer_error());
        assert!(Error::read_only(StorageArea::Managed).is_layer_error());
        assert!(Error::storage(StorageArea::Local, "disk").is_layer_error());
        assert!(!Error::invalid_area("managed").is_layer_error());
        assert!(!Error::config("test").is_layer_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
