//! File-based storage implementation for native platforms.

use super::{BoxFuture, DrawingStorage, StorageError, StorageResult};
use crate::envelope::StoredDrawing;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Stores each drawing as a JSON file named after its id.
pub struct FileStorage {
    /// Base directory for drawing files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Unavailable(format!(
                    "Failed to create storage directory {}: {}",
                    base_path.display(),
                    e
                ))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Default data directory for the playground.
    ///
    /// On Unix: `~/.local/share/excaliframe/`
    /// On Windows: `%LOCALAPPDATA%\excaliframe\`
    pub fn default_root() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Unavailable("Could not determine home directory".to_string()))?;
        Ok(base.join("excaliframe"))
    }

    /// Create file storage in `<root>/drawings`.
    pub fn in_root(root: &Path) -> StorageResult<Self> {
        Self::new(root.join(super::STORE_NAME))
    }

    /// Get the file path for a drawing ID.
    fn drawing_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", file_stem(id)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

/// Filename-safe form of an id. Bytes outside `[A-Za-z0-9-]` become `%XX`, so
/// distinct ids never share a file.
fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            stem.push(b as char);
        } else {
            stem.push_str(&format!("%{:02X}", b));
        }
    }
    stem
}

fn read_drawing(path: &Path) -> StorageResult<StoredDrawing> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    StoredDrawing::from_json(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl DrawingStorage for FileStorage {
    fn ready(&self) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            if self.base_path.is_dir() {
                Ok(())
            } else {
                Err(StorageError::Unavailable(format!(
                    "{} is not a directory",
                    self.base_path.display()
                )))
            }
        })
    }

    fn put(&self, drawing: &StoredDrawing) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.drawing_path(&drawing.id);
        let json = match drawing.to_json() {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            // Write then rename so readers never see a torn file.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e))
            })?;
            fs::rename(&tmp, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
            })
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<StoredDrawing>>> {
        let path = self.drawing_path(id);

        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            read_drawing(&path).map(Some)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.drawing_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredDrawing>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            let entries = fs::read_dir(&base).map_err(|e| {
                StorageError::Io(format!("Failed to read directory {}: {}", base.display(), e))
            })?;

            let mut drawings = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                // Only include .json files
                if path.extension().map(|e| e != "json").unwrap_or(true) {
                    continue;
                }
                match read_drawing(&path) {
                    Ok(drawing) => drawings.push(drawing),
                    Err(e) => log::warn!("Skipping unreadable drawing: {}", e),
                }
            }
            Ok(drawings)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::block_on;
    use crate::tool::ToolKind;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_put_get() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut drawing = StoredDrawing::create(ToolKind::Vector);
        drawing.title = "Architecture".to_string();

        block_on(storage.put(&drawing)).unwrap();
        let loaded = block_on(storage.get(&drawing.id)).unwrap().unwrap();

        assert_eq!(loaded, drawing);
    }

    #[test]
    fn test_file_storage_missing() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(block_on(storage.get("nonexistent")).unwrap(), None);
        block_on(storage.delete("nonexistent")).unwrap();
    }

    #[test]
    fn test_file_storage_list_skips_garbage() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let a = StoredDrawing::create(ToolKind::Vector);
        let b = StoredDrawing::create(ToolKind::Text);
        block_on(storage.put(&a)).unwrap();
        block_on(storage.put(&b)).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&a));
        assert!(list.contains(&b));
    }

    #[test]
    fn test_file_storage_malformed_get_is_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("bad.json"), "[]").unwrap();

        let result = block_on(storage.get("bad"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let drawing = StoredDrawing::create(ToolKind::Vector);
        block_on(storage.put(&drawing)).unwrap();
        block_on(storage.delete(&drawing.id)).unwrap();
        assert_eq!(block_on(storage.get(&drawing.id)).unwrap(), None);
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut drawing = StoredDrawing::create(ToolKind::Vector);
        drawing.id = "test/doc:with*special".to_string();
        block_on(storage.put(&drawing)).unwrap();

        let loaded = block_on(storage.get("test/doc:with*special")).unwrap().unwrap();
        assert_eq!(loaded.id, drawing.id);
    }

    #[test]
    fn test_file_storage_keeps_similar_ids_apart() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut slash = StoredDrawing::create(ToolKind::Vector);
        slash.id = "a/b".to_string();
        slash.title = "A".to_string();
        let mut underscore = StoredDrawing::create(ToolKind::Vector);
        underscore.id = "a_b".to_string();
        underscore.title = "B".to_string();

        block_on(storage.put(&slash)).unwrap();
        block_on(storage.put(&underscore)).unwrap();

        assert_eq!(block_on(storage.list()).unwrap().len(), 2);
        assert_eq!(block_on(storage.get("a/b")).unwrap().unwrap().title, "A");
        assert_eq!(block_on(storage.get("a_b")).unwrap().unwrap().title, "B");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("3f2a-9c"), "3f2a-9c");
        assert_eq!(file_stem("a/b"), "a%2Fb");
        assert_eq!(file_stem("a_b"), "a%5Fb");
        assert_eq!(file_stem("../x"), "%2E%2E%2Fx");
    }

    #[test]
    fn test_in_root_creates_drawings_dir() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::in_root(dir.path()).unwrap();
        assert!(dir.path().join("drawings").is_dir());
        block_on(storage.ready()).unwrap();
    }
}
