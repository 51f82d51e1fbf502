//! JSON file key/value layer.
//!
//! The file holds a single JSON object mapping namespaced keys to values:
//!
//! ```json
//! {
//!   "config.firstPartyIsolate": true,
//!   "config.theme": "dark"
//! }
//! ```
//!
//! A read-only instance models an administrator policy file: when the
//! file does not exist the layer is [`Error::Unavailable`]. A writable
//! instance treats a missing file as empty and creates it on first write.
//!
//! Only mutations made through this instance are reported to
//! subscribers; edits made to the file by other processes are picked up
//! on the next read but not announced.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;

use super::{AreaChange, ChangeHandler, ChangeListeners, KeyValueArea, StorageArea};

// ============================================================================
// Types
// ============================================================================

/// In-memory image of the file.
type Entries = FxHashMap<String, Value>;

// ============================================================================
// JsonFileArea
// ============================================================================

/// Layer persisted as a JSON object file.
pub struct JsonFileArea {
    area: StorageArea,
    path: PathBuf,
    read_only: bool,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
    listeners: ChangeListeners,
}

impl JsonFileArea {
    /// Creates a layer for `area` stored at `path`.
    ///
    /// Managed layers are read-only; the others are writable.
    #[must_use]
    pub fn new(area: StorageArea, path: impl Into<PathBuf>) -> Self {
        Self {
            area,
            path: path.into(),
            read_only: !area.is_writable(),
            write_lock: Mutex::new(()),
            listeners: ChangeListeners::new(),
        }
    }

    /// Returns the backing file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file. `None` if it does not exist.
    async fn load(&self) -> Result<Option<Entries>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(self.area, e.to_string())),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Some(Entries::default()));
        }

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            Error::storage(
                self.area,
                format!("malformed {}: {e}", self.path.display()),
            )
        })
    }

    /// Atomically replaces the file with `entries`.
    async fn persist(&self, entries: Entries) -> Result<()> {
        let area = self.area;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &entries))
            .await
            .map_err(|e| Error::storage(area, e.to_string()))?
            .map_err(|e| Error::storage(area, e.to_string()))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::read_only(self.area));
        }
        Ok(())
    }
}

/// Writes to a sibling temp file, then renames over `path`.
fn write_atomic(path: &Path, entries: &Entries) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, entries)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl KeyValueArea for JsonFileArea {
    fn area(&self) -> StorageArea {
        self.area
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.load().await? {
            Some(entries) => Ok(entries.get(key).cloned()),
            None if self.read_only => Err(Error::unavailable(self.area)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.ensure_writable()?;

        {
            let _guard = self.write_lock.lock().await;
            let mut entries = self.load().await?.unwrap_or_default();
            entries.insert(key.to_string(), value.clone());
            self.persist(entries).await?;
        }

        debug!(area = %self.area, key = %key, path = %self.path.display(), "Wrote value");
        self.listeners
            .notify(&AreaChange::new(key, Some(value), self.area));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_writable()?;

        let removed = {
            let _guard = self.write_lock.lock().await;
            let Some(mut entries) = self.load().await? else {
                return Ok(());
            };
            let removed = entries.remove(key).is_some();
            if removed {
                self.persist(entries).await?;
            }
            removed
        };

        if removed {
            debug!(area = %self.area, key = %key, path = %self.path.display(), "Removed value");
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
