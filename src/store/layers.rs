//! The three injected layers and the precedence rule over them.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::future::join3;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::area::{KeyValueArea, StorageArea};
use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// One read per layer, indexed by [`StorageArea::rank`].
pub type LayerValues = [Option<Value>; 3];

// ============================================================================
// StorageLayers
// ============================================================================

/// Managed, local and sync layers, passed in explicitly.
///
/// Cheap to clone; every clone shares the same layers.
#[derive(Clone)]
pub struct StorageLayers {
    areas: [Arc<dyn KeyValueArea>; 3],
}

impl fmt::Debug for StorageLayers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLayers")
            .field("managed", &self.areas[0].area())
            .field("local", &self.areas[1].area())
            .field("sync", &self.areas[2].area())
            .finish()
    }
}

impl StorageLayers {
    /// Bundles the three layers.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a layer reports a different area than the
    /// slot it was given for.
    pub fn new(
        managed: Arc<dyn KeyValueArea>,
        local: Arc<dyn KeyValueArea>,
        sync: Arc<dyn KeyValueArea>,
    ) -> Result<Self> {
        let areas = [managed, local, sync];

        for (expected, layer) in StorageArea::PRECEDENCE.iter().zip(&areas) {
            if layer.area() != *expected {
                return Err(Error::config(format!(
                    "layer for {expected} reports area {}",
                    layer.area()
                )));
            }
        }

        Ok(Self { areas })
    }

    /// Returns the layer for `area`.
    #[inline]
    #[must_use]
    pub fn get(&self, area: StorageArea) -> &Arc<dyn KeyValueArea> {
        &self.areas[area.rank()]
    }

    /// Iterates layers, highest precedence first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn KeyValueArea>> {
        self.areas.iter()
    }

    /// Reads `key` from all three layers concurrently.
    ///
    /// A failed read counts as absent for that layer.
    pub async fn read_all(&self, key: &str) -> LayerValues {
        let (managed, local, sync) = join3(
            self.areas[0].get(key),
            self.areas[1].get(key),
            self.areas[2].get(key),
        )
        .await;

        [
            absorb(StorageArea::Managed, key, managed),
            absorb(StorageArea::Local, key, local),
            absorb(StorageArea::Sync, key, sync),
        ]
    }
}

/// Maps a read failure to "absent".
fn absorb(area: StorageArea, key: &str, result: Result<Option<Value>>) -> Option<Value> {
    match result {
        Ok(value) => value,
        Err(e) if e.is_unavailable() => {
            debug!(area = %area, key = %key, "Layer unavailable, treating as absent");
            None
        }
        Err(e) => {
            warn!(area = %area, key = %key, error = %e, "Layer read failed, treating as absent");
            None
        }
    }
}

// ============================================================================
// Precedence
// ============================================================================

/// Returns the highest-precedence value that decodes as `T`, with the
/// area it came from.
///
/// Values of the wrong shape are skipped so that a bad entry in one
/// layer falls through to the next. This includes `managed`: a policy
/// value that does not decode as `T` does not pin the option, and a
/// `local` or `sync` value applies instead.
pub fn resolve<T: DeserializeOwned>(key: &str, values: LayerValues) -> Option<(StorageArea, T)> {
    for (area, value) in StorageArea::PRECEDENCE.into_iter().zip(values) {
        let Some(value) = value else {
            continue;
        };

        match serde_json::from_value::<T>(value) {
            Ok(decoded) => return Some((area, decoded)),
            Err(e) if area == StorageArea::Managed => {
                warn!(
                    area = %area,
                    key = %key,
                    error = %e,
                    "Managed policy value has unexpected type; lower layers apply"
                );
            }
            Err(e) => {
                warn!(area = %area, key = %key, error = %e, "Ignoring value of unexpected type");
            }
        }
    }

    None
}

// ============================================================================
// Tests
// ============================================================================
