//! Storage abstraction for playground drawings.

mod legacy;
mod memory;
mod playground;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod indexeddb;

pub use legacy::{LegacySlot, MemoryLegacySlot, LEGACY_STORAGE_KEY};
pub use memory::MemoryStorage;
pub use playground::PlaygroundStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use legacy::{FileLegacySlot, LEGACY_FILE_NAME};

#[cfg(target_arch = "wasm32")]
pub use indexeddb::IndexedDbStorage;
#[cfg(target_arch = "wasm32")]
pub use legacy::LocalStorageSlot;

use crate::envelope::StoredDrawing;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Database name of the browser playground store.
pub const DB_NAME: &str = "excaliframe-playground";
/// Schema version of the browser playground store.
pub const DB_VERSION: u32 = 1;
/// Object store holding drawing records, keyed by `id`.
pub const STORE_NAME: &str = "drawings";
/// In-line key of every record in [`STORE_NAME`].
pub const KEY_PATH: &str = "id";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Drawing not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Keyed backend for [`StoredDrawing`] records.
///
/// A missing record is `Ok(None)`, never an error, and deleting a missing
/// record succeeds. Writes are whole-record upserts; the last writer wins.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait DrawingStorage: Send + Sync {
    /// Make sure the backend can be used. Called once when a store opens.
    fn ready(&self) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Insert or replace a record under its id.
    fn put(&self, drawing: &StoredDrawing) -> BoxFuture<'_, StorageResult<()>>;

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<StoredDrawing>>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Every record, in no particular order.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredDrawing>>>;
}

/// Keyed backend for [`StoredDrawing`] records (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait DrawingStorage {
    /// Make sure the backend can be used. Called once when a store opens.
    fn ready(&self) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Insert or replace a record under its id.
    fn put(&self, drawing: &StoredDrawing) -> BoxFuture<'_, StorageResult<()>>;

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<StoredDrawing>>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Every record, in no particular order.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredDrawing>>>;
}
