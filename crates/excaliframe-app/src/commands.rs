//! Command execution against a file-backed playground store.

use crate::cli::Command;
use excaliframe_core::catalog;
use excaliframe_core::preview;
use excaliframe_core::storage::{FileLegacySlot, FileStorage, LegacySlot};
use excaliframe_core::{DrawingEnvelope, PlaygroundStore, StorageError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No drawing with id {0}")]
    UnknownDrawing(String),
    #[error("Drawing {0} has no preview")]
    NoPreview(String),
    #[error("Legacy drawing in {0} could not be imported")]
    ImportFailed(PathBuf),
}

pub type AppResult<T> = Result<T, AppError>;

/// Open the store kept under `root`, migrating any pending legacy drawing.
pub fn open_store(root: &Path) -> AppResult<PlaygroundStore> {
    let storage = FileStorage::in_root(root)?;
    let legacy = FileLegacySlot::in_root(root);
    let store = pollster::block_on(PlaygroundStore::open(Arc::new(storage), &legacy))?;
    if let Some(id) = store.migrated_id() {
        log::info!("Imported legacy drawing as {}", id);
    }
    Ok(store)
}

/// Stage `file` in the legacy slot and reopen so the store migrates it.
///
/// The file is checked first, and any drawing already waiting in the slot is
/// migrated before the slot is reused.
fn import_legacy(file: &Path, root: &Path) -> AppResult<String> {
    let raw = std::fs::read_to_string(file)?;
    if let Err(e) = DrawingEnvelope::from_json(&raw) {
        log::warn!("Not a drawing envelope: {}", e);
        return Err(AppError::ImportFailed(file.to_path_buf()));
    }

    open_store(root)?;
    FileLegacySlot::in_root(root).write(&raw)?;
    let store = open_store(root)?;
    store
        .migrated_id()
        .map(str::to_string)
        .ok_or_else(|| AppError::ImportFailed(file.to_path_buf()))
}

pub fn run(command: Command, root: &Path, out: &mut impl Write) -> AppResult<()> {
    if let Command::ImportLegacy { file } = &command {
        let id = import_legacy(file, root)?;
        writeln!(out, "{}", id)?;
        return Ok(());
    }

    let store = open_store(root)?;

    match command {
        Command::List => {
            for row in catalog::summarize(pollster::block_on(store.list_all())) {
                let updated = if row.updated.is_empty() { "-" } else { row.updated.as_str() };
                writeln!(out, "{}  {:<10}  {:<10}  {}", row.id, row.tool.id(), updated, row.title)?;
            }
        }
        Command::Show { id } => {
            let drawing = pollster::block_on(store.get_by_id(&id))?
                .ok_or(AppError::UnknownDrawing(id))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&drawing)?)?;
        }
        Command::New { tool } => {
            let drawing = pollster::block_on(store.create(tool))?;
            writeln!(out, "{}", drawing.id)?;
            writeln!(out, "edit: {}", catalog::edit_url(&drawing.id))?;
        }
        Command::Rename { id, title } => {
            let drawing = pollster::block_on(store.rename(&id, &title))?
                .ok_or(AppError::UnknownDrawing(id))?;
            writeln!(out, "{}", drawing.title)?;
        }
        Command::Delete { id } => {
            pollster::block_on(store.delete(&id))?;
        }
        Command::ExportPreview { id, out: path } => {
            let drawing = pollster::block_on(store.get_by_id(&id))?
                .ok_or_else(|| AppError::UnknownDrawing(id.clone()))?;
            let (media_type, bytes) = drawing
                .envelope
                .preview
                .as_deref()
                .and_then(preview::decode)
                .ok_or(AppError::NoPreview(id))?;
            std::fs::write(&path, &bytes)?;
            writeln!(out, "{} ({} bytes) -> {}", media_type, bytes.len(), path.display())?;
        }
        Command::ImportLegacy { .. } => {}
    }
    Ok(())
}
