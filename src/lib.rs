//! Tab Group Config - layered, observable configuration storage.
//!
//! This library keeps the settings of the Container Tab Groups extension
//! in three independently writable key/value layers and exposes one
//! effective value per key.
//!
//! # Layers
//!
//! | Area | Precedence | Writable |
//! |------|------------|----------|
//! | `managed` | highest | no (administrator policy) |
//! | `local` | middle | yes |
//! | `sync` | lowest | yes (default target) |
//!
//! The effective value is taken from the highest-precedence layer that
//! holds the key, falling back to a caller-supplied default. Keys are
//! namespaced with `config.` before they reach a layer.
//!
//! Layers are supplied by the host through the [`KeyValueArea`] trait.
//! [`MemoryArea`] and [`JsonFileArea`] are provided.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabgroup_config::{ConfigStore, MemoryArea, Result, StorageArea};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = ConfigStore::builder()
//!         .managed(Arc::new(MemoryArea::for_area(StorageArea::Managed)))
//!         .local(Arc::new(MemoryArea::for_area(StorageArea::Local)))
//!         .sync(Arc::new(MemoryArea::for_area(StorageArea::Sync)))
//!         .build()?;
//!
//!     let dark_theme = store.option("ui.darkTheme", false);
//!     dark_theme
//!         .observe(|enabled| println!("dark theme: {enabled}"))
//!         .await;
//!
//!     dark_theme.set_value_in(true, StorageArea::Local).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`area`] | [`KeyValueArea`] trait and backends |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe key and subscription IDs |
//! | [`store`] | [`ConfigStore`] and [`ConfigOption`] |

// ============================================================================
// Modules
// ============================================================================

/// Backing key/value layers.
pub mod area;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Layered configuration store.
///
/// Use [`ConfigStore::builder()`] to wire layers together.
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

// Area types
pub use area::{
    AreaChange, ChangeHandler, ChangeListeners, JsonFileArea, KeyValueArea, MemoryArea,
    StorageArea,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConfigKey, DEFAULT_KEY_PREFIX, SubscriptionId};

// Store types
pub use store::{ConfigOption, ConfigStore, ConfigStoreBuilder, StorageLayers, StoreOptions};
