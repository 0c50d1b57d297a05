//! Adapter for the wiki macro platform.
//!
//! The platform persists a small macro configuration object on our behalf. It
//! predates envelopes and only knows a payload and a preview.

use super::{EditorHost, HostError, HostResult, RendererHost};
use crate::envelope::{DrawingEnvelope, ENVELOPE_VERSION};
use crate::storage::{BoxFuture, LegacySlot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Macro configuration as stored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroConfig {
    /// Tool payload.
    #[serde(default)]
    pub drawing: String,
    /// Preview image, empty when there is none.
    #[serde(default)]
    pub preview: String,
}

impl MacroConfig {
    /// Narrow an envelope to the platform shape. Version and timestamps are
    /// dropped because the platform has nowhere to keep them.
    pub fn from_envelope(envelope: &DrawingEnvelope) -> Self {
        Self {
            drawing: envelope.data.clone(),
            preview: envelope.preview.clone().unwrap_or_default(),
        }
    }

    pub fn into_envelope(self, tool: &str) -> DrawingEnvelope {
        DrawingEnvelope {
            tool: tool.to_string(),
            version: ENVELOPE_VERSION,
            data: self.drawing,
            preview: Some(self.preview).filter(|p| !p.is_empty()),
            created_at: None,
            updated_at: None,
        }
    }
}

/// `localStorage` key the standalone mock keeps its macro body under.
pub const MOCK_MACRO_BODY_KEY: &str = "excalfluence_mock_macro_body";

/// Which platform primitives a capability object actually provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCapabilities {
    pub get_config: bool,
    pub submit_config: bool,
    pub close: bool,
}

impl PlatformCapabilities {
    pub const FULL: Self = Self {
        get_config: true,
        submit_config: true,
        close: true,
    };

    /// Whether an editor can be mounted against this platform. Dismissal is
    /// optional; without it the editing surface just stays open.
    pub fn is_complete(&self) -> bool {
        self.get_config && self.submit_config
    }
}

/// Capability object the wiki platform injects into the page.
pub trait MacroPlatform {
    fn name(&self) -> &str;

    fn capabilities(&self) -> PlatformCapabilities;

    /// The stored macro configuration, `None` for a freshly inserted macro.
    fn get_config(&self) -> BoxFuture<'_, HostResult<Option<MacroConfig>>>;

    /// Persist `config` and dismiss the editing surface.
    fn submit_config(&self, config: MacroConfig) -> BoxFuture<'_, HostResult<()>>;

    /// Dismiss the editing surface without saving.
    fn close(&self);
}

/// Pick the platform to run against.
///
/// The candidate is used only when it provides every primitive; otherwise the
/// page runs against a [`MockPlatform`].
pub fn select_platform(candidate: Option<Arc<dyn MacroPlatform>>) -> Arc<dyn MacroPlatform> {
    match candidate {
        Some(platform) if platform.capabilities().is_complete() => {
            log::info!("Using {} platform", platform.name());
            platform
        }
        Some(platform) => {
            log::warn!(
                "{} platform is incomplete ({:?}), falling back to mock",
                platform.name(),
                platform.capabilities()
            );
            fallback_platform()
        }
        None => {
            log::info!("No platform detected, using mock");
            fallback_platform()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn fallback_platform() -> Arc<dyn MacroPlatform> {
    Arc::new(MockPlatform::new())
}

// Keeps the macro body across reloads so the renderer page can show what the
// editor page saved.
#[cfg(target_arch = "wasm32")]
fn fallback_platform() -> Arc<dyn MacroPlatform> {
    use crate::storage::LocalStorageSlot;
    Arc::new(MockPlatform::persistent(Box::new(LocalStorageSlot::with_key(
        MOCK_MACRO_BODY_KEY,
    ))))
}

/// Stand-in platform for local development and tests.
///
/// Keeps the configuration in memory, or as a JSON macro body in a slot when
/// built with [`MockPlatform::persistent`].
#[derive(Default)]
pub struct MockPlatform {
    config: Mutex<Option<MacroConfig>>,
    slot: Option<Box<dyn LegacySlot>>,
    submissions: Mutex<Vec<MacroConfig>>,
    closes: AtomicUsize,
    fail_submit: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MacroConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
            ..Self::default()
        }
    }

    /// A mock whose macro body lives in `slot`.
    pub fn persistent(slot: Box<dyn LegacySlot>) -> Self {
        Self {
            slot: Some(slot),
            ..Self::default()
        }
    }

    pub fn config(&self) -> Option<MacroConfig> {
        self.stored().ok().flatten()
    }

    fn stored(&self) -> HostResult<Option<MacroConfig>> {
        let Some(slot) = &self.slot else {
            let config = self
                .config
                .lock()
                .map_err(|e| HostError::Platform(format!("Lock error: {}", e)))?;
            return Ok(config.clone());
        };

        let Some(body) = slot.read()? else {
            return Ok(None);
        };
        match serde_json::from_str(&body) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                log::warn!("[mock] ignoring malformed macro body: {}", e);
                Ok(None)
            }
        }
    }

    fn store(&self, config: MacroConfig) -> HostResult<()> {
        if let Some(slot) = &self.slot {
            let body = serde_json::to_string(&config)
                .map_err(|e| HostError::Malformed(e.to_string()))?;
            slot.write(&body)?;
        }
        *self
            .config
            .lock()
            .map_err(|e| HostError::Platform(format!("Lock error: {}", e)))? = Some(config);
        Ok(())
    }

    /// Every configuration submitted so far, oldest first.
    pub fn submissions(&self) -> Vec<MacroConfig> {
        self.submissions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of dismissals, including the ones implied by a submit.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Make subsequent submits fail.
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }
}

impl MacroPlatform for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities::FULL
    }

    fn get_config(&self) -> BoxFuture<'_, HostResult<Option<MacroConfig>>> {
        Box::pin(async move { self.stored() })
    }

    fn submit_config(&self, config: MacroConfig) -> BoxFuture<'_, HostResult<()>> {
        Box::pin(async move {
            if self.fail_submit.load(Ordering::SeqCst) {
                return Err(HostError::Platform("submit rejected".to_string()));
            }
            log::info!("[mock] submit_config, drawing length {}", config.drawing.len());
            self.submissions
                .lock()
                .map_err(|e| HostError::Platform(format!("Lock error: {}", e)))?
                .push(config.clone());
            self.store(config)?;
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn close(&self) {
        log::info!("[mock] close, no-op in standalone mode");
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Editor host backed by the platform's macro configuration.
pub struct PlatformConfigHost {
    platform: Arc<dyn MacroPlatform>,
    tool: String,
}

impl PlatformConfigHost {
    pub fn new(platform: Arc<dyn MacroPlatform>, tool: impl Into<String>) -> Self {
        Self {
            platform,
            tool: tool.into(),
        }
    }
}

impl EditorHost for PlatformConfigHost {
    fn load_drawing(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>> {
        Box::pin(async move {
            let config = self.platform.get_config().await?;
            Ok(config
                .filter(|c| !c.drawing.is_empty())
                .map(|c| c.into_envelope(&self.tool)))
        })
    }

    // The platform shape carries no timestamps, so there is no stored
    // created_at that a save could lose.
    fn save_drawing(&self, envelope: DrawingEnvelope) -> BoxFuture<'_, HostResult<()>> {
        Box::pin(async move {
            let config = MacroConfig::from_envelope(&envelope);
            self.platform.submit_config(config).await
        })
    }

    fn close(&self) {
        self.platform.close();
    }
}

/// Renderer host backed by the platform's macro configuration.
pub struct PlatformRendererHost {
    platform: Arc<dyn MacroPlatform>,
    tool: String,
}

impl PlatformRendererHost {
    pub fn new(platform: Arc<dyn MacroPlatform>, tool: impl Into<String>) -> Self {
        Self {
            platform,
            tool: tool.into(),
        }
    }
}

impl RendererHost for PlatformRendererHost {
    fn load_config(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>> {
        Box::pin(async move {
            let config = self.platform.get_config().await?;
            Ok(config.map(|c| c.into_envelope(&self.tool)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLegacySlot;
    use crate::test_util::block_on;

    struct PartialPlatform;

    impl MacroPlatform for PartialPlatform {
        fn name(&self) -> &str {
            "partial"
        }

        fn capabilities(&self) -> PlatformCapabilities {
            PlatformCapabilities {
                get_config: true,
                submit_config: false,
                close: true,
            }
        }

        fn get_config(&self) -> BoxFuture<'_, HostResult<Option<MacroConfig>>> {
            Box::pin(async { Ok(None) })
        }

        fn submit_config(&self, _config: MacroConfig) -> BoxFuture<'_, HostResult<()>> {
            Box::pin(async { Err(HostError::Platform("unsupported".to_string())) })
        }

        fn close(&self) {}
    }

    #[test]
    fn test_load_empty_platform_is_none() {
        let host = PlatformConfigHost::new(Arc::new(MockPlatform::new()), "excalidraw");
        assert!(block_on(host.load_drawing()).unwrap().is_none());

        let blank = MockPlatform::with_config(MacroConfig::default());
        let host = PlatformConfigHost::new(Arc::new(blank), "excalidraw");
        assert!(block_on(host.load_drawing()).unwrap().is_none());
    }

    #[test]
    fn test_load_maps_config_to_envelope() {
        let mock = MockPlatform::with_config(MacroConfig {
            drawing: "{\"elements\":[]}".to_string(),
            preview: String::new(),
        });
        let host = PlatformConfigHost::new(Arc::new(mock), "excalidraw");

        let envelope = block_on(host.load_drawing()).unwrap().unwrap();
        assert_eq!(envelope.tool, "excalidraw");
        assert_eq!(envelope.version, 1);
        assert_eq!(envelope.data, "{\"elements\":[]}");
        assert_eq!(envelope.preview, None);
    }

    #[test]
    fn test_save_submits_narrow_config() {
        let mock = Arc::new(MockPlatform::new());
        let host = PlatformConfigHost::new(mock.clone(), "excalidraw");

        let mut envelope = DrawingEnvelope::new("excalidraw").with_data("{}");
        block_on(host.save_drawing(envelope.clone())).unwrap();
        envelope.preview = Some("data:image/png;base64,AA==".to_string());
        block_on(host.save_drawing(envelope)).unwrap();

        let submissions = mock.submissions();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].preview, "");
        assert_eq!(submissions[1].preview, "data:image/png;base64,AA==");
        // Submitting also dismisses the editor.
        assert_eq!(mock.close_count(), 2);
    }

    #[test]
    fn test_save_failure_propagates() {
        let mock = Arc::new(MockPlatform::new());
        mock.set_fail_submit(true);
        let host = PlatformConfigHost::new(mock.clone(), "excalidraw");

        let result = block_on(host.save_drawing(DrawingEnvelope::empty("excalidraw")));
        assert!(matches!(result, Err(HostError::Platform(_))));
        assert!(mock.submissions().is_empty());
    }

    #[test]
    fn test_close_uses_platform_dismiss() {
        let mock = Arc::new(MockPlatform::new());
        let host = PlatformConfigHost::new(mock.clone(), "excalidraw");
        host.close();
        assert_eq!(mock.close_count(), 1);
        assert!(mock.submissions().is_empty());
    }

    #[test]
    fn test_renderer_keeps_empty_drawing() {
        let mock = MockPlatform::with_config(MacroConfig::default());
        let host = PlatformRendererHost::new(Arc::new(mock), "excalidraw");
        let envelope = block_on(host.load_config()).unwrap().unwrap();
        assert!(envelope.data.is_empty());

        let host = PlatformRendererHost::new(Arc::new(MockPlatform::new()), "excalidraw");
        assert!(block_on(host.load_config()).unwrap().is_none());
    }

    #[test]
    fn test_persistent_mock_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let slot_path = dir.path().join("macro-body.json");
        let reload = || {
            let slot = crate::storage::FileLegacySlot::new(slot_path.clone());
            Arc::new(MockPlatform::persistent(Box::new(slot)))
        };

        let editor = PlatformConfigHost::new(reload(), "mermaid");
        assert!(block_on(editor.load_drawing()).unwrap().is_none());
        block_on(editor.save_drawing(DrawingEnvelope::new("mermaid").with_data("graph LR"))).unwrap();

        let renderer = PlatformRendererHost::new(reload(), "mermaid");
        let envelope = block_on(renderer.load_config()).unwrap().unwrap();
        assert_eq!(envelope.data, "graph LR");

        let stored = std::fs::read_to_string(&slot_path).unwrap();
        let body: MacroConfig = serde_json::from_str(&stored).unwrap();
        assert_eq!(body.drawing, "graph LR");
    }

    #[test]
    fn test_persistent_mock_ignores_garbage_body() {
        let mock = MockPlatform::persistent(Box::new(MemoryLegacySlot::with_value("<html>")));
        assert_eq!(block_on(mock.get_config()).unwrap(), None);
        assert_eq!(mock.config(), None);
    }

    #[test]
    fn test_dismiss_is_optional_capability() {
        let caps = PlatformCapabilities {
            get_config: true,
            submit_config: true,
            close: false,
        };
        assert!(caps.is_complete());
        assert!(PlatformCapabilities::FULL.is_complete());
        assert!(!PlatformCapabilities::default().is_complete());
    }

    #[test]
    fn test_select_platform_candidate() {
        let chosen = select_platform(None);
        assert_eq!(chosen.name(), "mock");

        let chosen = select_platform(Some(Arc::new(PartialPlatform)));
        assert_eq!(chosen.name(), "mock");

        let complete: Arc<dyn MacroPlatform> = Arc::new(MockPlatform::new());
        let chosen = select_platform(Some(complete.clone()));
        assert!(Arc::ptr_eq(&chosen, &complete));
    }
}
