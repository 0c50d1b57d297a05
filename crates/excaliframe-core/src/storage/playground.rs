//! The playground's drawing store.

use super::{DrawingStorage, LegacySlot, StorageError, StorageResult};
use crate::catalog::normalize_title;
use crate::envelope::{DrawingEnvelope, StoredDrawing};
use crate::tool::ToolKind;
use std::sync::Arc;

/// Keyed store of playground drawings on top of a [`DrawingStorage`] backend.
///
/// Reads degrade: a backend that cannot be listed yields an empty list, and a
/// record that no longer parses reads as absent. Writes always surface errors.
#[derive(Clone)]
pub struct PlaygroundStore {
    storage: Arc<dyn DrawingStorage>,
    migrated: Option<String>,
}

impl PlaygroundStore {
    /// Open the store and drain the legacy slot into it.
    ///
    /// Fails only when the backend itself is unusable. A legacy slot that
    /// cannot be migrated is left untouched for a later open.
    pub async fn open(
        storage: Arc<dyn DrawingStorage>,
        legacy: &dyn LegacySlot,
    ) -> StorageResult<Self> {
        storage.ready().await?;
        let mut store = Self {
            storage,
            migrated: None,
        };
        store.migrated = store.migrate_legacy(legacy).await;
        Ok(store)
    }

    /// Open without a legacy slot.
    pub async fn open_without_legacy(storage: Arc<dyn DrawingStorage>) -> StorageResult<Self> {
        storage.ready().await?;
        Ok(Self {
            storage,
            migrated: None,
        })
    }

    /// Id of the record created from the legacy slot during `open`, if any.
    pub fn migrated_id(&self) -> Option<&str> {
        self.migrated.as_deref()
    }

    async fn migrate_legacy(&self, legacy: &dyn LegacySlot) -> Option<String> {
        let raw = match legacy.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read legacy drawing: {}", e);
                return None;
            }
        };

        let envelope = match DrawingEnvelope::from_json(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("Ignoring corrupt legacy drawing: {}", e);
                return None;
            }
        };

        let drawing = StoredDrawing::wrap(envelope);
        if let Err(e) = self.storage.put(&drawing).await {
            log::warn!("Legacy migration failed, keeping legacy slot: {}", e);
            return None;
        }

        if let Err(e) = legacy.clear() {
            log::warn!("Migrated legacy drawing but could not clear slot: {}", e);
        }
        log::info!("Migrated legacy drawing into {}", drawing.id);
        Some(drawing.id)
    }

    /// Every stored drawing, unordered. Empty when the backend can't be read.
    pub async fn list_all(&self) -> Vec<StoredDrawing> {
        match self.storage.list().await {
            Ok(drawings) => drawings,
            Err(e) => {
                log::warn!("Failed to list drawings: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up a drawing. `Ok(None)` when it doesn't exist or no longer parses.
    pub async fn get_by_id(&self, id: &str) -> StorageResult<Option<StoredDrawing>> {
        match self.storage.get(id).await {
            Err(StorageError::Serialization(e)) => {
                log::warn!("Treating malformed drawing {} as absent: {}", id, e);
                Ok(None)
            }
            Err(StorageError::NotFound(_)) => Ok(None),
            other => other,
        }
    }

    /// Insert or overwrite a drawing under its id.
    pub async fn save(&self, drawing: &StoredDrawing) -> StorageResult<()> {
        self.storage.put(drawing).await
    }

    /// Remove a drawing. Unknown ids are ignored.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// Create and persist an empty drawing for `tool`.
    pub async fn create(&self, tool: ToolKind) -> StorageResult<StoredDrawing> {
        let drawing = StoredDrawing::create(tool);
        self.save(&drawing).await?;
        log::debug!("Created {} drawing {}", tool, drawing.id);
        Ok(drawing)
    }

    /// Change a drawing's title. Returns `None` if the drawing doesn't exist.
    pub async fn rename(&self, id: &str, title: &str) -> StorageResult<Option<StoredDrawing>> {
        let Some(mut drawing) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        drawing.title = normalize_title(title);
        self.save(&drawing).await?;
        Ok(Some(drawing))
    }
}
