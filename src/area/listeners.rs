//! Change handler registry.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::identifiers::SubscriptionId;

use super::{AreaChange, ChangeHandler};

// ============================================================================
// ChangeListeners
// ============================================================================

/// Registered change handlers for one layer.
///
/// Handlers are stored behind `Arc` so [`ChangeListeners::notify`] can
/// release the lock before invoking them; a handler may subscribe or
/// unsubscribe without deadlocking.
#[derive(Default)]
pub struct ChangeListeners {
    handlers: Mutex<FxHashMap<SubscriptionId, Arc<ChangeHandler>>>,
}

impl ChangeListeners {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler and returns its ID.
    pub fn add(&self, handler: ChangeHandler) -> SubscriptionId {
        let id = SubscriptionId::generate();
        self.handlers.lock().insert(id.clone(), Arc::new(handler));
        id
    }

    /// Removes a handler.
    pub fn remove(&self, id: &SubscriptionId) -> bool {
        self.handlers.lock().remove(id).is_some()
    }

    /// Number of registered handlers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Returns `true` if no handler is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Invokes every handler with `change`.
    pub fn notify(&self, change: &AreaChange) {
        let handlers: Vec<_> = self.handlers.lock().values().cloned().collect();

        trace!(
            area = %change.area,
            key = %change.key,
            handlers = handlers.len(),
            "Notifying change handlers"
        );

        for handler in handlers {
            handler(change);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
