//! Editor session state shared by both drawing tools.
//!
//! A session owns the host an editor was mounted against, the tool kind picked
//! at mount time and the in-memory payload. It tracks unsaved changes against
//! the last successful load or save.

use crate::envelope::{DrawingEnvelope, ENVELOPE_VERSION, now_iso};
use crate::host::{EditorHost, HostResult};
use crate::preview::PreviewSource;
use crate::tool::ToolKind;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Another save was still running; nothing was done.
    InProgress,
}

pub struct EditorSession<H: EditorHost> {
    host: H,
    kind: ToolKind,
    content: Mutex<String>,
    /// Content at the last successful load or save.
    baseline: Mutex<String>,
    saving: AtomicBool,
}

impl<H: EditorHost> EditorSession<H> {
    /// Load the drawing and mount the tool its envelope names.
    pub async fn open(host: H) -> Self {
        Self::open_with_default(host, ToolKind::default()).await
    }

    /// Like [`open`](Self::open), with the tool to use when the host has no
    /// drawing yet.
    pub async fn open_with_default(host: H, fallback: ToolKind) -> Self {
        let envelope = match host.load_drawing().await {
            Ok(envelope) => envelope,
            Err(e) => {
                log::error!("Error loading drawing, starting empty: {}", e);
                None
            }
        };

        let kind = envelope
            .as_ref()
            .map(DrawingEnvelope::tool_kind)
            .unwrap_or(fallback);
        let content = envelope
            .map(|e| e.data)
            .filter(|data| !data.is_empty())
            .unwrap_or_else(|| kind.default_payload().to_string());

        log::info!("Opened {} editor", kind.display_name());
        Self {
            host,
            kind,
            baseline: Mutex::new(content.clone()),
            content: Mutex::new(content),
            saving: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn content(&self) -> String {
        self.content.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        if let Ok(mut current) = self.content.lock() {
            *current = content.into();
        }
    }

    /// Whether the payload differs from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        let baseline = self.baseline.lock().map(|b| b.clone()).unwrap_or_default();
        self.content() != baseline
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Build the envelope for the current payload.
    fn envelope(&self, content: String, preview: PreviewSource) -> DrawingEnvelope {
        // A raster export of an empty scene is a blank image.
        let preview = if content.is_empty() && !self.kind.uses_markup_preview() {
            None
        } else {
            preview.into_data_uri()
        };
        DrawingEnvelope {
            tool: self.kind.id().to_string(),
            version: ENVELOPE_VERSION,
            data: content,
            preview,
            created_at: None,
            updated_at: Some(now_iso()),
        }
    }

    /// Save the current payload through the host.
    ///
    /// Returns [`SaveOutcome::InProgress`] without touching the host while an
    /// earlier save is outstanding. A failed save keeps the unsaved changes.
    pub async fn save(&self, preview: PreviewSource) -> HostResult<SaveOutcome> {
        if self.saving.swap(true, Ordering::SeqCst) {
            log::debug!("Save already in progress");
            return Ok(SaveOutcome::InProgress);
        }

        let content = self.content();
        let envelope = self.envelope(content.clone(), preview);
        let result = self.host.save_drawing(envelope).await;
        self.saving.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                if let Ok(mut baseline) = self.baseline.lock() {
                    *baseline = content;
                }
                log::info!("Saved {} drawing", self.kind.display_name());
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                log::error!("Error saving drawing: {}", e);
                Err(e)
            }
        }
    }

    /// Close the editor. With unsaved changes, `confirm` decides. Returns
    /// whether the host was asked to close.
    pub fn close(&self, confirm: impl FnOnce() -> bool) -> bool {
        if self.is_dirty() && !confirm() {
            return false;
        }
        self.host.close();
        true
    }
}
