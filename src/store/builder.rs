//! Builder pattern for store configuration.
//!
//! Provides a fluent API for wiring layers into a [`ConfigStore`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tabgroup_config::{ConfigStore, MemoryArea, StorageArea};
//!
//! # fn example() -> tabgroup_config::Result<()> {
//! let store = ConfigStore::builder()
//!     .managed(Arc::new(MemoryArea::for_area(StorageArea::Managed)))
//!     .local(Arc::new(MemoryArea::for_area(StorageArea::Local)))
//!     .sync(Arc::new(MemoryArea::for_area(StorageArea::Sync)))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::area::{KeyValueArea, StorageArea};
use crate::error::{Error, Result};

use super::layers::StorageLayers;
use super::{ConfigStore, StoreOptions};

// ============================================================================
// ConfigStoreBuilder
// ============================================================================

/// Builder for configuring a [`ConfigStore`] instance.
///
/// Use [`ConfigStore::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ConfigStoreBuilder {
    managed: Option<Arc<dyn KeyValueArea>>,
    local: Option<Arc<dyn KeyValueArea>>,
    sync: Option<Arc<dyn KeyValueArea>>,
    options: StoreOptions,
}

// ============================================================================
// ConfigStoreBuilder Implementation
// ============================================================================

impl ConfigStoreBuilder {
    /// Creates a builder with no layers and default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the managed (policy) layer.
    #[inline]
    #[must_use]
    pub fn managed(mut self, area: Arc<dyn KeyValueArea>) -> Self {
        self.managed = Some(area);
        self
    }

    /// Sets the local layer.
    #[inline]
    #[must_use]
    pub fn local(mut self, area: Arc<dyn KeyValueArea>) -> Self {
        self.local = Some(area);
        self
    }

    /// Sets the sync layer.
    #[inline]
    #[must_use]
    pub fn sync(mut self, area: Arc<dyn KeyValueArea>) -> Self {
        self.sync = Some(area);
        self
    }

    /// Sets the prefix prepended to every key (default `config.`).
    #[inline]
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.prefix = prefix.into();
        self
    }

    /// Sets the area written by `set_value` (default `sync`).
    #[inline]
    #[must_use]
    pub fn default_write_area(mut self, area: StorageArea) -> Self {
        self.options.default_write_area = area;
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the store with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if any layer is missing
    /// - [`Error::Config`] if a layer reports the wrong area
    /// - [`Error::Config`] if the prefix is empty
    /// - [`Error::Config`] if the default write area is `managed`
    pub fn build(self) -> Result<ConfigStore> {
        self.validate_options()?;

        let layers = StorageLayers::new(
            Self::require(self.managed, StorageArea::Managed)?,
            Self::require(self.local, StorageArea::Local)?,
            Self::require(self.sync, StorageArea::Sync)?,
        )?;

        Ok(ConfigStore::new(layers, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConfigStoreBuilder {
    fn require(
        layer: Option<Arc<dyn KeyValueArea>>,
        area: StorageArea,
    ) -> Result<Arc<dyn KeyValueArea>> {
        layer.ok_or_else(|| {
            Error::config(format!(
                "{area} layer is required. Use .{area}() to set it."
            ))
        })
    }

    fn validate_options(&self) -> Result<()> {
        if self.options.prefix.is_empty() {
            return Err(Error::config("key prefix must not be empty"));
        }

        if !self.options.default_write_area.is_writable() {
            return Err(Error::config(format!(
                "default write area must be writable, got {}",
                self.options.default_write_area
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
