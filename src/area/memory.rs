//! In-process key/value layer.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;

use super::{AreaChange, ChangeHandler, ChangeListeners, KeyValueArea, StorageArea};

// ============================================================================
// MemoryArea
// ============================================================================

/// Layer backed by a hash map.
///
/// A read-only instance stands in for the managed policy store: the
/// [`KeyValueArea`] write methods fail, while [`MemoryArea::provision`]
/// and [`MemoryArea::withdraw`] play the administrator's role.
///
/// # Example
///
/// ```
/// use tabgroup_config::{MemoryArea, StorageArea};
/// use serde_json::json;
///
/// let managed = MemoryArea::read_only(StorageArea::Managed);
/// managed.provision("config.firstPartyIsolate", json!(true));
/// ```
pub struct MemoryArea {
    area: StorageArea,
    read_only: bool,
    unavailable: AtomicBool,
    entries: RwLock<FxHashMap<String, Value>>,
    listeners: ChangeListeners,
}

impl MemoryArea {
    /// Creates a writable layer.
    #[must_use]
    pub fn new(area: StorageArea) -> Self {
        Self::with_access(area, false)
    }

    /// Creates a read-only layer.
    #[must_use]
    pub fn read_only(area: StorageArea) -> Self {
        Self::with_access(area, true)
    }

    /// Creates the layer appropriate for `area`: read-only for managed.
    #[must_use]
    pub fn for_area(area: StorageArea) -> Self {
        Self::with_access(area, !area.is_writable())
    }

    fn with_access(area: StorageArea, read_only: bool) -> Self {
        Self {
            area,
            read_only,
            unavailable: AtomicBool::new(false),
            entries: RwLock::new(FxHashMap::default()),
            listeners: ChangeListeners::new(),
        }
    }

    /// Marks the layer unreadable, as a managed store without policy is.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Writes a key regardless of the read-only flag and notifies.
    pub fn provision(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.entries.write().insert(key.clone(), value.clone());
        self.listeners
            .notify(&AreaChange::new(key, Some(value), self.area));
    }

    /// Removes a key regardless of the read-only flag and notifies.
    ///
    /// Nothing is reported if the key was absent.
    pub fn withdraw(&self, key: &str) {
        let removed = self.entries.write().remove(key);
        if removed.is_some() {
            self.listeners
                .notify(&AreaChange::new(key, None, self.area));
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::read_only(self.area));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueArea for MemoryArea {
    fn area(&self) -> StorageArea {
        self.area
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::unavailable(self.area));
        }
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.ensure_writable()?;

        debug!(area = %self.area, key = %key, "Setting value");
        self.entries.write().insert(key.to_string(), value.clone());
        self.listeners
            .notify(&AreaChange::new(key, Some(value), self.area));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_writable()?;

        debug!(area = %self.area, key = %key, "Removing value");
        let removed = self.entries.write().remove(key);
        if removed.is_some() {
            self.listeners
                .notify(&AreaChange::new(key, None, self.area));
        }
        Ok(())
    }

    fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId {
        self.listeners.add(handler)
    }

    fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
