//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tabgroup_config::{
    ChangeHandler, ChangeListeners, ConfigStore, Error, KeyValueArea, MemoryArea, Result,
    StorageArea, SubscriptionId,
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

/// Installs a test log subscriber once; controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory layers plus a store over them.
pub struct MemoryStore {
    pub managed: Arc<MemoryArea>,
    pub local: Arc<MemoryArea>,
    pub sync: Arc<MemoryArea>,
    pub store: ConfigStore,
}

pub fn memory_store() -> MemoryStore {
    init_tracing();

    let managed = Arc::new(MemoryArea::for_area(StorageArea::Managed));
    let local = Arc::new(MemoryArea::for_area(StorageArea::Local));
    let sync = Arc::new(MemoryArea::for_area(StorageArea::Sync));

    let store = ConfigStore::builder()
        .managed(managed.clone())
        .local(local.clone())
        .sync(sync.clone())
        .build()
        .expect("valid store");

    MemoryStore {
        managed,
        local,
        sync,
        store,
    }
}

/// Waits for the next observed value.
pub async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("observer not called in time")
        .expect("observer channel closed")
}

/// Layer whose writes always fail.
pub struct FailingArea {
    area: StorageArea,
    listeners: ChangeListeners,
}

impl FailingArea {
    pub fn new(area: StorageArea) -> Self {
        Self {
            area,
            listeners: ChangeListeners::new(),
        }
    }
}

#[async_trait]
impl KeyValueArea for FailingArea {
    fn area(&self) -> StorageArea {
        self.area
    }

    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(Error::storage(self.area, "backend offline"))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<()> {
        Err(Error::storage(self.area, "quota exceeded"))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(Error::storage(self.area, "backend offline"))
    }

    fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId {
        self.listeners.add(handler)
    }

    fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

/// Memory layer whose first read returns what it saw, but only after a
/// delay, so writes can land while that read is in flight.
pub struct SlowFirstReadArea {
    inner: Arc<MemoryArea>,
    delay: Duration,
    first: AtomicBool,
}

impl SlowFirstReadArea {
    pub fn new(inner: Arc<MemoryArea>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            first: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl KeyValueArea for SlowFirstReadArea {
    fn area(&self) -> StorageArea {
        self.inner.area()
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = self.inner.get(key).await?;
        if self.first.swap(false, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }

    fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId {
        self.inner.subscribe(handler)
    }

    fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }
}
