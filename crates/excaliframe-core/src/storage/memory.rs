//! In-memory storage implementation.

use super::{BoxFuture, DrawingStorage, StorageError, StorageResult};
use crate::envelope::StoredDrawing;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    drawings: RwLock<HashMap<String, StoredDrawing>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.drawings.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl DrawingStorage for MemoryStorage {
    fn put(&self, drawing: &StoredDrawing) -> BoxFuture<'_, StorageResult<()>> {
        let drawing = drawing.clone();
        Box::pin(async move {
            let mut drawings = self.drawings.write().map_err(lock_error)?;
            drawings.insert(drawing.id.clone(), drawing);
            Ok(())
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<StoredDrawing>>> {
        let id = id.to_string();
        Box::pin(async move {
            let drawings = self.drawings.read().map_err(lock_error)?;
            Ok(drawings.get(&id).cloned())
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut drawings = self.drawings.write().map_err(lock_error)?;
            drawings.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredDrawing>>> {
        Box::pin(async move {
            let drawings = self.drawings.read().map_err(lock_error)?;
            Ok(drawings.values().cloned().collect())
        })
    }
}
