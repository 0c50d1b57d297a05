//! The single-drawing slot used before the keyed playground store existed.
//!
//! It holds one bare envelope as JSON. The playground store drains it into a
//! regular record the first time it opens.

use super::{StorageError, StorageResult};
use std::sync::Mutex;

/// Browser `localStorage` key of the legacy slot.
pub const LEGACY_STORAGE_KEY: &str = "excaliframe:drawing";

/// File name of the legacy slot inside a native data directory.
#[cfg(not(target_arch = "wasm32"))]
pub const LEGACY_FILE_NAME: &str = "legacy-drawing.json";

#[cfg(not(target_arch = "wasm32"))]
pub trait LegacySlot: Send + Sync {
    /// Raw slot contents, `None` when empty.
    fn read(&self) -> StorageResult<Option<String>>;

    fn write(&self, raw: &str) -> StorageResult<()>;

    fn clear(&self) -> StorageResult<()>;
}

#[cfg(target_arch = "wasm32")]
pub trait LegacySlot {
    /// Raw slot contents, `None` when empty.
    fn read(&self) -> StorageResult<Option<String>>;

    fn write(&self, raw: &str) -> StorageResult<()>;

    fn clear(&self) -> StorageResult<()>;
}

/// Legacy slot held in memory.
#[derive(Default)]
pub struct MemoryLegacySlot {
    value: Mutex<Option<String>>,
}

impl MemoryLegacySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(raw: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(raw.into())),
        }
    }
}

impl LegacySlot for MemoryLegacySlot {
    fn read(&self) -> StorageResult<Option<String>> {
        let value = self
            .value
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(value.clone())
    }

    fn write(&self, raw: &str) -> StorageResult<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *value = Some(raw.to_string());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *value = None;
        Ok(())
    }
}

/// Legacy slot stored as a single file.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileLegacySlot {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileLegacySlot {
    pub fn new(path: std::path::PathBuf) -> Self {
        Self { path }
    }

    /// The slot file inside a data directory.
    pub fn in_root(root: &std::path::Path) -> Self {
        Self::new(root.join(LEGACY_FILE_NAME))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LegacySlot for FileLegacySlot {
    fn read(&self) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write(&self, raw: &str) -> StorageResult<()> {
        std::fs::write(&self.path, raw).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    fn clear(&self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to delete {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Legacy slot in the browser's `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageSlot {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageSlot {
    pub fn new() -> Self {
        Self::with_key(LEGACY_STORAGE_KEY)
    }

    /// A slot under another `localStorage` key.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage(&self) -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl LegacySlot for LocalStorageSlot {
    fn read(&self) -> StorageResult<Option<String>> {
        self.storage()?
            .get_item(&self.key)
            .map(|v| v.filter(|raw| !raw.is_empty()))
            .map_err(|e| StorageError::Other(format!("getItem error: {:?}", e)))
    }

    fn write(&self, raw: &str) -> StorageResult<()> {
        self.storage()?
            .set_item(&self.key, raw)
            .map_err(|e| StorageError::Other(format!("setItem error: {:?}", e)))
    }

    fn clear(&self) -> StorageResult<()> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| StorageError::Other(format!("removeItem error: {:?}", e)))
    }
}
