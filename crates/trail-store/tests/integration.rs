//! Integration tests for the `Dragonfly` adapter.
//!
//! These tests require a live Dragonfly (or Redis) instance. Run with:
//!
//! ```bash
//! docker run -d -p 6379:6379 docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p trail-store -- --ignored
//! ```
//!
//! All tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use trail_store::{Blobs, DragonflyStore, StoreBackend, keys};

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

async fn connect() -> DragonflyStore {
    let store = DragonflyStore::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly -- is Docker running?");
    store.flush_all().await.expect("Failed to flush");
    store
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_raw_roundtrip() {
    let store = connect().await;

    store
        .set(keys::USER_XP, "250")
        .await
        .expect("Failed to set XP");
    let value = store.get(keys::USER_XP).await.expect("Failed to get XP");
    assert_eq!(value.as_deref(), Some("250"));

    store.remove(keys::USER_XP).await.expect("Failed to delete");
    assert_eq!(store.get(keys::USER_XP).await.unwrap(), None);

    store.flush_all().await.expect("Failed to flush");
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_blob_encodings() {
    let store = connect().await;
    let blobs = Blobs::new(StoreBackend::Dragonfly(store.clone()), Duration::from_secs(2));

    blobs
        .write_json(keys::VISITED_POINTS, &vec![1_u64, 3])
        .await
        .expect("Failed to write visited points");
    let visited: Option<Vec<u64>> = blobs
        .read_json(keys::VISITED_POINTS)
        .await
        .expect("Failed to read visited points");
    assert_eq!(visited, Some(vec![1, 3]));

    blobs
        .write_counter(keys::USER_LEVEL, 3)
        .await
        .expect("Failed to write level");
    assert_eq!(
        blobs.read_counter(keys::USER_LEVEL).await.unwrap(),
        Some(3)
    );

    store.flush_all().await.expect("Failed to flush");
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_missing_key_reads_as_none() {
    let store = connect().await;
    let blobs = Blobs::new(StoreBackend::Dragonfly(store), Duration::from_secs(2));
    let history: Option<Vec<u32>> = blobs.read_json(keys::LEVEL_HISTORY).await.unwrap();
    assert!(history.is_none());
}
