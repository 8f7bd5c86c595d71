//! Per-user map persistence.
//!
//! Maps are stored under an opaque user key and a map name. Each stored map
//! is a [`MapRecord`]: the document plus the time it was last written.

mod manager;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use manager::MapManager;
#[cfg(not(target_arch = "wasm32"))]
pub use manager::{PlatformStorage, create_file_manager};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Map not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A stored map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub data: Document,
    /// Milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl MapRecord {
    /// Wrap a document, stamped with the current time.
    pub fn now(data: Document) -> Self {
        Self {
            data,
            updated_at: now_millis(),
        }
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary {
            node_count: self.data.nodes.len(),
            connection_count: self.data.connections.len(),
            updated_at: self.updated_at,
        }
    }
}

/// What a map listing shows for each map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub node_count: usize,
    pub connection_count: usize,
    pub updated_at: u64,
}

/// Maps keyed by name, as returned by [`MapStorage::list`].
pub type MapListing = BTreeMap<String, MapSummary>;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Trait for map storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MapStorage: Send + Sync {
    /// Save a map, replacing any previous version.
    fn save(&self, user: &str, map: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a map's document.
    fn load(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// List a user's maps.
    fn list(&self, user: &str) -> BoxFuture<'_, StorageResult<MapListing>>;

    /// Delete a map. Deleting a missing map is not an error.
    fn delete(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Check if a map exists.
    fn exists(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for map storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait MapStorage {
    /// Save a map, replacing any previous version.
    fn save(&self, user: &str, map: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a map's document.
    fn load(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// List a user's maps.
    fn list(&self, user: &str) -> BoxFuture<'_, StorageResult<MapListing>>;

    /// Delete a map. Deleting a missing map is not an error.
    fn delete(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Check if a map exists.
    fn exists(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
