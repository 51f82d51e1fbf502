//! Layered option demonstration.
//!
//! Demonstrates:
//! - Effective value across managed, local and sync layers
//! - Observing changes as policy is provisioned and withdrawn
//! - Write restrictions on the managed layer
//!
//! Usage:
//!   cargo run --example 001_layered_option
//!   RUST_LOG=tabgroup_config=debug cargo run --example 001_layered_option

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

use tabgroup_config::{ConfigStore, MemoryArea, Result, StorageArea};

// ============================================================================
// Constants
// ============================================================================

const KEY: &str = "autoDiscard";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== 001: Layered Option ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    let managed = Arc::new(MemoryArea::for_area(StorageArea::Managed));
    let local = Arc::new(MemoryArea::for_area(StorageArea::Local));
    let sync = Arc::new(MemoryArea::for_area(StorageArea::Sync));

    let store = ConfigStore::builder()
        .managed(managed.clone())
        .local(local)
        .sync(sync)
        .build()?;
    let option = store.option(KEY, false);
    println!("[Setup] Store over in-memory layers, option `{KEY}` (default false)\n");

    let (tx, mut rx) = mpsc::unbounded_channel();
    option
        .observe(move |value: bool| {
            let _ = tx.send(value);
        })
        .await;
    report("observe", &mut rx).await;

    // ========================================================================
    // Layer Changes
    // ========================================================================

    println!("\n[1] Local write");
    option.set_value_in(true, StorageArea::Local).await?;
    report("local = true", &mut rx).await;

    println!("\n[2] Managed policy provisioned");
    managed.provision(format!("config.{KEY}"), json!(false));
    report("managed = false", &mut rx).await;
    println!("    source: {:?}", option.source_area().await);

    println!("\n[3] Managed write is refused");
    match option.set_value_in(true, StorageArea::Managed).await {
        Err(e) => println!("    ✓ {e}"),
        Ok(()) => println!("    ✗ managed write accepted"),
    }

    println!("\n[4] Managed policy withdrawn");
    managed.withdraw(&format!("config.{KEY}"));
    report("managed removed", &mut rx).await;
    println!("    source: {:?}", option.source_area().await);

    println!("\n=== Done ===");
    Ok(())
}

/// Prints the next observed value.
async fn report(label: &str, rx: &mut mpsc::UnboundedReceiver<bool>) {
    match timeout(Duration::from_secs(1), rx.recv()).await {
        Ok(Some(value)) => println!("    ✓ {label}: effective = {value}"),
        _ => println!("    ✗ {label}: no notification"),
    }
}
