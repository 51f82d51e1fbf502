//! Layered configuration store.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`ConfigStoreBuilder`] |
//! | `layers` | [`StorageLayers`] and the precedence rule |
//! | `option` | [`ConfigOption`], one observable value |
//!
//! # Example
//!
//! ```no_run
//! use tabgroup_config::{ConfigStore, StorageArea};
//!
//! # async fn example() -> tabgroup_config::Result<()> {
//! let store = ConfigStore::from_directory("/var/lib/tabgroups")?;
//!
//! let isolate = store.option("firstPartyIsolate", false);
//! isolate.observe(|enabled| println!("isolation: {enabled}")).await;
//! isolate.set_value_in(true, StorageArea::Local).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod layers;
mod option;

// ============================================================================
// Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::area::{JsonFileArea, StorageArea};
use crate::error::Result;
use crate::identifiers::{ConfigKey, DEFAULT_KEY_PREFIX};

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ConfigStoreBuilder;
pub use layers::{LayerValues, StorageLayers, resolve};
pub use option::{ConfigOption, Observer};

// ============================================================================
// Constants
// ============================================================================

/// Policy file name used by [`ConfigStore::from_directory`].
pub const MANAGED_FILE: &str = "policies.json";

/// Local layer file name used by [`ConfigStore::from_directory`].
pub const LOCAL_FILE: &str = "local.json";

/// Sync layer file name used by [`ConfigStore::from_directory`].
pub const SYNC_FILE: &str = "sync.json";

// ============================================================================
// StoreOptions
// ============================================================================

/// Settings shared by every option a store creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Prepended to every key before it reaches a layer.
    pub prefix: String,

    /// Target of `set_value` when no area is given.
    pub default_write_area: StorageArea,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_write_area: StorageArea::Sync,
        }
    }
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Factory for [`ConfigOption`]s over one set of layers.
///
/// Construct one per process and pass it to whatever needs configuration.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    layers: StorageLayers,
    options: StoreOptions,
}

impl ConfigStore {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::new()
    }

    pub(crate) fn new(layers: StorageLayers, options: StoreOptions) -> Self {
        Self { layers, options }
    }

    /// Creates a store backed by JSON files in `dir`.
    ///
    /// Uses [`MANAGED_FILE`], [`LOCAL_FILE`] and [`SYNC_FILE`]. Files are
    /// created lazily on first write; the policy file is never written.
    ///
    /// # Errors
    ///
    /// Propagates builder validation errors.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        info!(dir = %dir.display(), "Opening file-backed config store");

        Self::builder()
            .managed(Arc::new(JsonFileArea::new(
                StorageArea::Managed,
                dir.join(MANAGED_FILE),
            )))
            .local(Arc::new(JsonFileArea::new(
                StorageArea::Local,
                dir.join(LOCAL_FILE),
            )))
            .sync(Arc::new(JsonFileArea::new(
                StorageArea::Sync,
                dir.join(SYNC_FILE),
            )))
            .build()
    }

    /// Creates the option for `key` with `default`.
    ///
    /// Each call creates an independent option with its own layer
    /// subscriptions.
    #[must_use]
    pub fn option<T>(&self, key: impl Into<ConfigKey>, default: T) -> ConfigOption<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        ConfigOption::with_settings(
            key,
            default,
            self.layers.clone(),
            &self.options.prefix,
            self.options.default_write_area,
        )
    }

    /// Returns the layers.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &StorageLayers {
        &self.layers
    }

    /// Returns the store options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::area::{KeyValueArea, MemoryArea};

    #[tokio::test]
    async fn test_option_uses_store_settings() {
        let local = Arc::new(MemoryArea::for_area(StorageArea::Local));
        let store = ConfigStore::builder()
            .managed(Arc::new(MemoryArea::for_area(StorageArea::Managed)))
            .local(local.clone())
            .sync(Arc::new(MemoryArea::for_area(StorageArea::Sync)))
            .prefix("tabgroups.")
            .default_write_area(StorageArea::Local)
            .build()
            .unwrap();

        let option = store.option("theme", "light".to_string());
        option.set_value("dark".to_string()).await.unwrap();

        assert_eq!(option.storage_key(), "tabgroups.theme");
        assert_eq!(option.default_write_area(), StorageArea::Local);
        assert_eq!(
            local.get("tabgroups.theme").await.unwrap(),
            Some(json!("dark"))
        );
    }

    #[tokio::test]
    async fn test_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANAGED_FILE),
            r#"{ "config.firstPartyIsolate": true }"#,
        )
        .unwrap();

        let store = ConfigStore::from_directory(dir.path()).unwrap();
        let isolate = store.option("firstPartyIsolate", false);
        let theme = store.option("theme", "light".to_string());

        assert!(isolate.get_value().await);

        theme.set_value("dark".to_string()).await.unwrap();
        assert_eq!(theme.get_value().await, "dark");
        assert!(dir.path().join(SYNC_FILE).exists());
        assert!(!dir.path().join(LOCAL_FILE).exists());
    }
}
