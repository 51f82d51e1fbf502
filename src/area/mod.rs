//! Backing key/value layers.
//!
//! Each layer is one [`KeyValueArea`]: an independently persisted
//! key/value mapping with change notification. The store reads all three
//! and applies precedence; layers know nothing about each other.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `listeners` | Change handler registry shared by backends |
//! | `memory` | In-process layer |
//! | `file` | JSON file layer |

// ============================================================================
// Submodules
// ============================================================================

mod file;
mod listeners;
mod memory;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;

// ============================================================================
// Re-exports
// ============================================================================

pub use file::JsonFileArea;
pub use listeners::ChangeListeners;
pub use memory::MemoryArea;

// ============================================================================
// StorageArea
// ============================================================================

/// One of the three configuration layers.
///
/// Ordering follows precedence: `Managed < Local < Sync`, so the first
/// element of [`StorageArea::PRECEDENCE`] wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Administrator-provisioned policy. Read-only.
    Managed,
    /// Per-device storage.
    Local,
    /// Account-synced storage. Default write target.
    Sync,
}

impl StorageArea {
    /// All areas, highest precedence first.
    pub const PRECEDENCE: [StorageArea; 3] =
        [StorageArea::Managed, StorageArea::Local, StorageArea::Sync];

    /// Returns the area name used by the host browser.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Local => "local",
            Self::Sync => "sync",
        }
    }

    /// Returns `true` if this crate may write to the area.
    #[inline]
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Managed)
    }

    /// Returns the area if it is writable.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArea`] for `managed`.
    #[inline]
    pub fn writable(self) -> Result<Self> {
        if self.is_writable() {
            Ok(self)
        } else {
            Err(Error::invalid_area(self.as_str()))
        }
    }

    /// Position in [`StorageArea::PRECEDENCE`].
    #[inline]
    #[must_use]
    pub const fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageArea {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "managed" => Ok(Self::Managed),
            "local" => Ok(Self::Local),
            "sync" => Ok(Self::Sync),
            other => Err(Error::invalid_area(other)),
        }
    }
}

// ============================================================================
// AreaChange
// ============================================================================

/// A single key mutation reported by a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaChange {
    /// Namespaced storage key.
    pub key: String,
    /// New value, `None` when the key was removed.
    pub new_value: Option<Value>,
    /// Layer that changed.
    pub area: StorageArea,
}

impl AreaChange {
    /// Creates a change record.
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, new_value: Option<Value>, area: StorageArea) -> Self {
        Self {
            key: key.into(),
            new_value,
            area,
        }
    }

    /// Returns `true` if the change removed the key.
    #[inline]
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.new_value.is_none()
    }
}

/// Change handler callback type.
///
/// Called synchronously by the layer for every mutation. Must not block.
pub type ChangeHandler = Box<dyn Fn(&AreaChange) + Send + Sync>;

// ============================================================================
// KeyValueArea
// ============================================================================

/// A single backing layer.
///
/// Implementations wrap whatever the host provides (browser storage
/// areas, files, an in-memory map). All methods take namespaced keys.
#[async_trait]
pub trait KeyValueArea: Send + Sync {
    /// Which layer this is.
    fn area(&self) -> StorageArea;

    /// Reads a key.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] if the layer cannot be read in the current host state
    /// - [`Error::Storage`] on backend failure
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a key.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnlyArea`] if the layer is read-only
    /// - [`Error::Storage`] on backend failure
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Removes a key.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadOnlyArea`] if the layer is read-only
    /// - [`Error::Storage`] on backend failure
    async fn remove(&self, key: &str) -> Result<()>;

    /// Registers a change handler.
    fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId;

    /// Removes a change handler. Returns `true` if it was registered.
    fn unsubscribe(&self, id: &SubscriptionId) -> bool;
}

// ============================================================================
// Tests
// ============================================================================
