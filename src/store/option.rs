//! A single observable configuration value.
//!
//! [`ConfigOption`] projects the three layers onto one effective value:
//! the value from the highest-precedence layer holding the key, else the
//! default. It holds no cached state; every read and every change event
//! recomputes from the layers.
//!
//! # Change Dispatch
//!
//! At construction the option subscribes to all three layers. Layer
//! handlers run synchronously inside the layer, so they only forward
//! matching [`AreaChange`]s over a channel. A dispatcher task, started by
//! the first [`ConfigOption::observe`], recomputes the effective value for
//! each change in arrival order and hands it to every observer. Changes
//! are neither coalesced nor de-duplicated.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::area::{AreaChange, StorageArea};
use crate::error::Result;
use crate::identifiers::{ConfigKey, DEFAULT_KEY_PREFIX, SubscriptionId};

use super::layers::{StorageLayers, resolve};

// ============================================================================
// Types
// ============================================================================

/// Observer callback type.
///
/// Receives the effective value once on registration, then once per
/// layer change of the key.
pub type Observer<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Sender half feeding the dispatcher, `None` until first observe.
type DispatchSender = Arc<Mutex<Option<mpsc::UnboundedSender<AreaChange>>>>;

// ============================================================================
// ObserverSlot
// ============================================================================

/// A registered observer.
///
/// While `backlog` is `Some`, the initial value has not been delivered
/// yet and dispatched values queue there; `observe` drains the queue
/// after the initial call and then switches the slot live.
struct ObserverSlot<T> {
    id: SubscriptionId,
    callback: Observer<T>,
    backlog: Mutex<Option<Vec<T>>>,
}

impl<T> ObserverSlot<T> {
    /// Delivers `value` now, or queues it while the slot is pending.
    fn deliver(&self, value: T) {
        {
            let mut backlog = self.backlog.lock();
            if let Some(pending) = backlog.as_mut() {
                pending.push(value);
                return;
            }
        }
        invoke(&self.id, &self.callback, value);
    }

    /// Replays queued values until the queue stays empty, then goes live.
    fn go_live(&self) {
        loop {
            let queued = {
                let mut backlog = self.backlog.lock();
                match backlog.as_mut() {
                    Some(pending) if !pending.is_empty() => std::mem::take(pending),
                    _ => {
                        *backlog = None;
                        return;
                    }
                }
            };

            for value in queued {
                invoke(&self.id, &self.callback, value);
            }
        }
    }
}

/// Calls an observer, containing a panic to that one call.
///
/// Containment needs unwinding; under `panic = "abort"` a panicking
/// observer still ends the process.
fn invoke<T>(id: &SubscriptionId, callback: &Observer<T>, value: T) {
    if catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
        warn!(subscription_id = %id, "Observer panicked");
    }
}

// ============================================================================
// ConfigOption
// ============================================================================

/// Layered, observable configuration value.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tabgroup_config::{ConfigOption, MemoryArea, StorageArea, StorageLayers};
///
/// # async fn example() -> tabgroup_config::Result<()> {
/// let layers = StorageLayers::new(
///     Arc::new(MemoryArea::for_area(StorageArea::Managed)),
///     Arc::new(MemoryArea::for_area(StorageArea::Local)),
///     Arc::new(MemoryArea::for_area(StorageArea::Sync)),
/// )?;
///
/// let option = ConfigOption::new("autoDiscard", false, layers);
/// option.set_value_in(true, StorageArea::Local).await?;
/// assert!(option.get_value().await);
/// # Ok(())
/// # }
/// ```
pub struct ConfigOption<T> {
    inner: Arc<OptionInner<T>>,
    /// Layer subscriptions, released on drop.
    subscriptions: Vec<(StorageArea, SubscriptionId)>,
}

/// State shared with the dispatcher task.
struct OptionInner<T> {
    key: ConfigKey,
    storage_key: String,
    default: T,
    default_write_area: StorageArea,
    layers: StorageLayers,
    observers: Mutex<Vec<Arc<ObserverSlot<T>>>>,
    dispatch: DispatchSender,
}

impl<T> fmt::Debug for ConfigOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOption")
            .field("key", &self.inner.key)
            .field("storage_key", &self.inner.storage_key)
            .field("default_write_area", &self.inner.default_write_area)
            .field("observers", &self.inner.observers.lock().len())
            .finish()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl<T> ConfigOption<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates an option with the standard `config.` prefix, writing to
    /// `sync` by default.
    #[must_use]
    pub fn new(key: impl Into<ConfigKey>, default: T, layers: StorageLayers) -> Self {
        Self::with_settings(key, default, layers, DEFAULT_KEY_PREFIX, StorageArea::Sync)
    }

    /// Creates an option with an explicit key prefix and default write area.
    ///
    /// `default_write_area` is expected to be writable; the store builder
    /// validates this before calling.
    pub(crate) fn with_settings(
        key: impl Into<ConfigKey>,
        default: T,
        layers: StorageLayers,
        prefix: &str,
        default_write_area: StorageArea,
    ) -> Self {
        let key = key.into();
        let storage_key = key.storage_key(prefix);
        let dispatch: DispatchSender = Arc::new(Mutex::new(None));

        let subscriptions = layers
            .iter()
            .map(|layer| {
                let watched = storage_key.clone();
                let dispatch = Arc::clone(&dispatch);

                let id = layer.subscribe(Box::new(move |change: &AreaChange| {
                    if change.key != watched {
                        return;
                    }
                    if let Some(tx) = dispatch.lock().as_ref() {
                        trace!(key = %change.key, area = %change.area, "Forwarding change");
                        if tx.send(change.clone()).is_err() {
                            warn!(
                                key = %change.key,
                                area = %change.area,
                                "Dispatcher gone, change not delivered"
                            );
                        }
                    }
                }));

                (layer.area(), id)
            })
            .collect();

        debug!(key = %key, storage_key = %storage_key, "Created config option");

        Self {
            inner: Arc::new(OptionInner {
                key,
                storage_key,
                default,
                default_write_area,
                layers,
                observers: Mutex::new(Vec::new()),
                dispatch,
            }),
            subscriptions,
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl<T> ConfigOption<T> {
    /// Returns the logical key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ConfigKey {
        &self.inner.key
    }

    /// Returns the namespaced key used in the layers.
    #[inline]
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Returns the value used when no layer holds the key.
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> &T {
        &self.inner.default
    }

    /// Returns the area written by [`ConfigOption::set_value`].
    #[inline]
    #[must_use]
    pub fn default_write_area(&self) -> StorageArea {
        self.inner.default_write_area
    }

    /// Number of registered observers.
    #[inline]
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }
}

// ============================================================================
// Reads and Writes
// ============================================================================

impl<T> ConfigOption<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Returns the effective value.
    ///
    /// Never fails: unreadable layers count as absent, and the default is
    /// returned when no layer holds the key. A stored value that does not
    /// decode as `T` also counts as absent, even in `managed`.
    pub async fn get_value(&self) -> T {
        self.inner.effective_value(None).await
    }

    /// Returns the layer currently supplying the value, if any.
    pub async fn source_area(&self) -> Option<StorageArea> {
        let values = self.inner.layers.read_all(&self.inner.storage_key).await;
        resolve::<T>(&self.inner.storage_key, values).map(|(area, _)| area)
    }

    /// Writes to the default write area.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`](crate::Error::Json) if `value` cannot be serialized
    /// - any layer write error, unchanged
    pub async fn set_value(&self, value: T) -> Result<()> {
        self.set_value_in(value, self.inner.default_write_area)
            .await
    }

    /// Writes to `area`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArea`](crate::Error::InvalidArea) for `managed`; no layer is touched
    /// - [`Error::Json`](crate::Error::Json) if `value` cannot be serialized
    /// - any layer write error, unchanged
    pub async fn set_value_in(&self, value: T, area: StorageArea) -> Result<()> {
        let area = area.writable()?;
        let json = serde_json::to_value(value)?;

        debug!(key = %self.inner.key, area = %area, "Setting config value");
        self.inner
            .layers
            .get(area)
            .set(&self.inner.storage_key, json)
            .await
    }

    /// Writes to the area named `area` (`"local"` or `"sync"`).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArea`](crate::Error::InvalidArea) for `"managed"`
    /// or an unknown name, plus everything [`ConfigOption::set_value_in`]
    /// returns.
    pub async fn set_value_by_name(&self, value: T, area: &str) -> Result<()> {
        let area: StorageArea = area.parse()?;
        self.set_value_in(value, area).await
    }

    /// Removes the key from `area`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArea`](crate::Error::InvalidArea) for `managed`; no layer is touched
    /// - any layer remove error, unchanged
    pub async fn clear_value(&self, area: StorageArea) -> Result<()> {
        let area = area.writable()?;

        debug!(key = %self.inner.key, area = %area, "Clearing config value");
        self.inner
            .layers
            .get(area)
            .remove(&self.inner.storage_key)
            .await
    }

    /// Removes the key from the area named `area`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArea`](crate::Error::InvalidArea) for `"managed"`
    /// or an unknown name, plus everything [`ConfigOption::clear_value`]
    /// returns.
    pub async fn clear_value_by_name(&self, area: &str) -> Result<()> {
        let area: StorageArea = area.parse()?;
        self.clear_value(area).await
    }
}

// ============================================================================
// Observation
// ============================================================================

impl<T> ConfigOption<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Registers `callback` for effective value updates.
    ///
    /// `callback` is called with the current value before this returns,
    /// then once for every change of the key in any layer. Changes that
    /// arrive while the current value is being read are delivered right
    /// after it.
    ///
    /// A panicking callback is logged and does not affect other observers.
    ///
    /// Must be called within a tokio runtime.
    pub async fn observe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let slot = Arc::new(ObserverSlot {
            id: SubscriptionId::generate(),
            callback: Arc::new(callback),
            backlog: Mutex::new(Some(Vec::new())),
        });

        self.ensure_dispatcher();
        self.inner.observers.lock().push(Arc::clone(&slot));

        let current = self.get_value().await;
        invoke(&slot.id, &slot.callback, current);
        slot.go_live();

        debug!(key = %self.inner.key, subscription_id = %slot.id, "Observer registered");
        slot.id.clone()
    }

    /// Removes an observer. Returns `true` if it was registered.
    pub fn unobserve(&self, id: &SubscriptionId) -> bool {
        let mut observers = self.inner.observers.lock();
        let before = observers.len();
        observers.retain(|slot| slot.id != *id);
        before != observers.len()
    }

    /// Starts the dispatcher task unless it is already running.
    fn ensure_dispatcher(&self) {
        let mut dispatch = self.inner.dispatch.lock();
        if dispatch.is_some() {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *dispatch = Some(tx);

        tokio::spawn(Self::run_dispatcher(Arc::clone(&self.inner), rx));
    }

    /// Recomputes and delivers the effective value for each change.
    async fn run_dispatcher(inner: Arc<OptionInner<T>>, mut rx: mpsc::UnboundedReceiver<AreaChange>) {
        while let Some(change) = rx.recv().await {
            let value = inner.effective_value(Some(&change)).await;

            let observers: Vec<Arc<ObserverSlot<T>>> =
                inner.observers.lock().iter().cloned().collect();

            debug!(
                key = %inner.key,
                area = %change.area,
                removal = change.is_removal(),
                observers = observers.len(),
                "Dispatching recomputed value"
            );

            for slot in observers {
                slot.deliver(value.clone());
            }
        }

        debug!(key = %inner.key, "Dispatcher stopped");
    }
}

// ============================================================================
// OptionInner
// ============================================================================

impl<T> OptionInner<T>
where
    T: DeserializeOwned + Clone,
{
    /// Reads all layers and applies precedence.
    ///
    /// With `change`, its value replaces the read of its own area, so the
    /// result reflects that event even if the layer has moved on since.
    async fn effective_value(&self, change: Option<&AreaChange>) -> T {
        let mut values = self.layers.read_all(&self.storage_key).await;

        if let Some(change) = change {
            values[change.area.rank()] = change.new_value.clone();
        }

        match resolve(&self.storage_key, values) {
            Some((area, value)) => {
                trace!(key = %self.key, area = %area, "Resolved value");
                value
            }
            None => self.default.clone(),
        }
    }
}

// ============================================================================
// Drop
// ============================================================================

impl<T> Drop for ConfigOption<T> {
    fn drop(&mut self) {
        for (area, id) in self.subscriptions.drain(..) {
            self.inner.layers.get(area).unsubscribe(&id);
        }
        // Closing the channel stops the dispatcher.
        self.inner.dispatch.lock().take();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::time::timeout;

    use crate::area::{ChangeHandler, KeyValueArea, MemoryArea};

    struct Fixture {
        managed: Arc<MemoryArea>,
        local: Arc<MemoryArea>,
        sync: Arc<MemoryArea>,
        layers: StorageLayers,
    }

    fn fixture() -> Fixture {
        let managed = Arc::new(MemoryArea::for_area(StorageArea::Managed));
        let local = Arc::new(MemoryArea::for_area(StorageArea::Local));
        let sync = Arc::new(MemoryArea::for_area(StorageArea::Sync));
        let layers = StorageLayers::new(managed.clone(), local.clone(), sync.clone()).unwrap();
        Fixture {
            managed,
            local,
            sync,
            layers,
        }
    }

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("observer not called in time")
            .expect("observer channel closed")
    }

    #[tokio::test]
    async fn test_default_when_absent() {
        let f = fixture();
        let option = ConfigOption::new("theme", "light".to_string(), f.layers);

        assert_eq!(option.get_value().await, "light");
        assert_eq!(option.source_area().await, None);
    }

    #[tokio::test]
    async fn test_storage_key_is_namespaced() {
        let f = fixture();
        let option = ConfigOption::new("theme", 0u8, f.layers);
        option.set_value(7).await.unwrap();

        assert_eq!(option.storage_key(), "config.theme");
        assert_eq!(f.sync.get("config.theme").await.unwrap(), Some(json!(7)));
        assert_eq!(f.sync.get("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_precedence_regardless_of_write_order() {
        let f = fixture();
        let option = ConfigOption::new("n", 0i64, f.layers);

        f.managed.provision("config.n", json!(1));
        option.set_value_in(3, StorageArea::Sync).await.unwrap();
        option.set_value_in(2, StorageArea::Local).await.unwrap();
        assert_eq!(option.get_value().await, 1);
        assert_eq!(option.source_area().await, Some(StorageArea::Managed));

        f.managed.withdraw("config.n");
        assert_eq!(option.get_value().await, 2);

        option.clear_value(StorageArea::Local).await.unwrap();
        assert_eq!(option.get_value().await, 3);

        option.clear_value(StorageArea::Sync).await.unwrap();
        assert_eq!(option.get_value().await, 0);
    }

    #[tokio::test]
    async fn test_managed_write_rejected() {
        let f = fixture();
        let option = ConfigOption::new("flag", false, f.layers);

        let err = option
            .set_value_in(true, StorageArea::Managed)
            .await
            .unwrap_err();
        assert!(err.is_invalid_area());

        let err = option.clear_value(StorageArea::Managed).await.unwrap_err();
        assert!(err.is_invalid_area());

        assert!(f.managed.is_empty());
        assert!(f.local.is_empty());
        assert!(f.sync.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_area_name_rejected() {
        let f = fixture();
        let option = ConfigOption::new("flag", false, f.layers);

        for name in ["managed", "session", "", "Local"] {
            let err = option.set_value_by_name(true, name).await.unwrap_err();
            assert!(err.is_invalid_area(), "{name} should be rejected");
        }
        assert!(f.local.is_empty());
        assert!(f.sync.is_empty());

        option.set_value_by_name(true, "local").await.unwrap();
        assert_eq!(f.local.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_by_name() {
        let f = fixture();
        f.managed.provision("config.flag", json!(true));
        let option = ConfigOption::new("flag", false, f.layers);
        option.set_value_in(true, StorageArea::Local).await.unwrap();

        for name in ["managed", "session", ""] {
            let err = option.clear_value_by_name(name).await.unwrap_err();
            assert!(err.is_invalid_area(), "{name} should be rejected");
        }
        assert_eq!(f.managed.len(), 1);
        assert_eq!(f.local.len(), 1);

        option.clear_value_by_name("local").await.unwrap();
        assert!(f.local.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_managed_treated_as_absent() {
        let f = fixture();
        f.managed.set_unavailable(true);
        let option = ConfigOption::new("flag", false, f.layers);

        option.set_value_in(true, StorageArea::Local).await.unwrap();
        assert!(option.get_value().await);
    }

    #[tokio::test]
    async fn test_wrong_type_falls_through() {
        let f = fixture();
        let option = ConfigOption::new("count", 5u32, f.layers);

        f.local.set("config.count", json!("many")).await.unwrap();
        assert_eq!(option.get_value().await, 5);

        f.sync.set("config.count", json!(9)).await.unwrap();
        assert_eq!(option.get_value().await, 9);
    }

    #[tokio::test]
    async fn test_malformed_managed_value_does_not_pin() {
        let f = fixture();
        f.managed.provision("config.flag", json!("false"));
        let option = ConfigOption::new("flag", false, f.layers);

        option.set_value_in(true, StorageArea::Local).await.unwrap();
        assert!(option.get_value().await);
        assert_eq!(option.source_area().await, Some(StorageArea::Local));
    }

    #[tokio::test]
    async fn test_observe_reports_initial_value() {
        let f = fixture();
        f.local.set("config.flag", json!(true)).await.unwrap();
        let option = ConfigOption::new("flag", false, f.layers);

        let (tx, mut rx) = mpsc::unbounded_channel();
        option
            .observe(move |value| {
                let _ = tx.send(value);
            })
            .await;

        // Delivered before observe returns.
        assert!(rx.try_recv().unwrap());
        assert_eq!(option.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_observe_recomputes_with_precedence() {
        let f = fixture();
        let option = ConfigOption::new("flag", false, f.layers);

        let (tx, mut rx) = mpsc::unbounded_channel();
        option
            .observe(move |value| {
                let _ = tx.send(value);
            })
            .await;
        assert!(!next(&mut rx).await);

        option.set_value_in(true, StorageArea::Local).await.unwrap();
        assert!(next(&mut rx).await);

        f.managed.provision("config.flag", json!(false));
        assert!(!next(&mut rx).await);

        // Lower layer change while managed holds the key.
        option.set_value_in(true, StorageArea::Sync).await.unwrap();
        assert!(!next(&mut rx).await);

        f.managed.withdraw("config.flag");
        assert!(next(&mut rx).await);
    }

    #[tokio::test]
    async fn test_observe_ignores_other_keys() {
        let f = fixture();
        let option = ConfigOption::new("flag", 0i32, f.layers);

        let (tx, mut rx) = mpsc::unbounded_channel();
        option
            .observe(move |value| {
                let _ = tx.send(value);
            })
            .await;
        assert_eq!(next(&mut rx).await, 0);

        f.sync.set("config.other", json!(1)).await.unwrap();
        f.sync.set("config.flag", json!(2)).await.unwrap();

        assert_eq!(next(&mut rx).await, 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unobserve() {
        let f = fixture();
        let option = ConfigOption::new("flag", false, f.layers);

        let id = option.observe(|_| {}).await;
        assert!(option.unobserve(&id));
        assert!(!option.unobserve(&id));
        assert_eq!(option.observer_count(), 0);
    }

    /// Memory layer that counts live change subscriptions.
    struct CountingArea {
        inner: MemoryArea,
        live: AtomicUsize,
    }

    impl CountingArea {
        fn new(area: StorageArea) -> Self {
            Self {
                inner: MemoryArea::for_area(area),
                live: AtomicUsize::new(0),
            }
        }

        fn live(&self) -> usize {
            self.live.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyValueArea for CountingArea {
        fn area(&self) -> StorageArea {
            self.inner.area()
        }

        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }

        fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId {
            self.live.fetch_add(1, Ordering::SeqCst);
            self.inner.subscribe(handler)
        }

        fn unsubscribe(&self, id: &SubscriptionId) -> bool {
            let removed = self.inner.unsubscribe(id);
            if removed {
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
            removed
        }
    }

    #[tokio::test]
    async fn test_drop_releases_layer_subscriptions() {
        let managed = Arc::new(CountingArea::new(StorageArea::Managed));
        let local = Arc::new(CountingArea::new(StorageArea::Local));
        let sync = Arc::new(CountingArea::new(StorageArea::Sync));
        let layers = StorageLayers::new(managed.clone(), local.clone(), sync.clone()).unwrap();

        let option = ConfigOption::new("flag", false, layers);
        assert_eq!([managed.live(), local.live(), sync.live()], [1, 1, 1]);

        let (tx, mut rx) = mpsc::unbounded_channel();
        option
            .observe(move |value| {
                let _ = tx.send(value);
            })
            .await;
        assert!(!next(&mut rx).await);

        drop(option);
        assert_eq!([managed.live(), local.live(), sync.live()], [0, 0, 0]);

        // The dispatcher owns the observer; once it stops, the channel closes.
        let closed = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(closed, None);
    }

    #[tokio::test]
    async fn test_panicking_observer_does_not_stop_dispatch() {
        let f = fixture();
        let option = ConfigOption::new("count", 0i32, f.layers);

        option
            .observe(|value| {
                if value == 1 {
                    panic!("observer failure");
                }
            })
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        option
            .observe(move |value| {
                let _ = tx.send(value);
            })
            .await;
        assert_eq!(next(&mut rx).await, 0);

        option.set_value(1).await.unwrap();
        option.set_value(2).await.unwrap();

        assert_eq!(next(&mut rx).await, 1);
        assert_eq!(next(&mut rx).await, 2);
    }
}
