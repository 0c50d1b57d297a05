//! Adapter for the standalone playground.

use super::{EditorHost, HostResult, Navigator, RendererHost, TitleCapability};
use crate::catalog::normalize_title;
use crate::envelope::{DEFAULT_TITLE, DrawingEnvelope, StoredDrawing};
use crate::storage::{BoxFuture, PlaygroundStore};
use std::sync::{Arc, Mutex};

/// Where a playground editor goes when it closes.
pub const PLAYGROUND_LIST_URL: &str = "/playground/";

/// Editor host for one drawing in the playground store.
pub struct LocalStoreHost {
    id: String,
    store: PlaygroundStore,
    navigator: Arc<dyn Navigator>,
    /// Title as last loaded or set.
    title: Mutex<String>,
}

impl LocalStoreHost {
    pub fn new(id: impl Into<String>, store: PlaygroundStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            id: id.into(),
            store,
            navigator,
            title: Mutex::new(DEFAULT_TITLE.to_string()),
        }
    }

    fn cache_title(&self, title: String) {
        if let Ok(mut cached) = self.title.lock() {
            *cached = title;
        }
    }
}

impl EditorHost for LocalStoreHost {
    fn load_drawing(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>> {
        Box::pin(async move {
            let Some(drawing) = self.store.get_by_id(&self.id).await? else {
                return Ok(None);
            };
            self.cache_title(drawing.title);
            Ok(Some(drawing.envelope))
        })
    }

    fn save_drawing(&self, mut envelope: DrawingEnvelope) -> BoxFuture<'_, HostResult<()>> {
        Box::pin(async move {
            let existing = self.store.get_by_id(&self.id).await?;
            let title = match existing {
                Some(previous) => {
                    envelope.inherit_created_at(&previous.envelope);
                    previous.title
                }
                None => self.title(),
            };

            let drawing = StoredDrawing {
                id: self.id.clone(),
                title,
                envelope,
            };
            self.store.save(&drawing).await?;
            log::debug!("Saved drawing {}", self.id);
            Ok(())
        })
    }

    fn close(&self) {
        self.navigator.navigate(PLAYGROUND_LIST_URL);
    }

    fn title_capability(&self) -> Option<&dyn TitleCapability> {
        Some(self)
    }
}

impl TitleCapability for LocalStoreHost {
    fn title(&self) -> String {
        self.title
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|_| DEFAULT_TITLE.to_string())
    }

    fn set_title(&self, title: &str) -> BoxFuture<'_, HostResult<()>> {
        let title = normalize_title(title);
        Box::pin(async move {
            // A drawing that was never saved picks the title up on first save.
            self.store.rename(&self.id, &title).await?;
            self.cache_title(title);
            Ok(())
        })
    }
}

/// Renderer host for one drawing in the playground store.
pub struct LocalRendererHost {
    id: String,
    store: PlaygroundStore,
}

impl LocalRendererHost {
    pub fn new(id: impl Into<String>, store: PlaygroundStore) -> Self {
        Self { id: id.into(), store }
    }
}

impl RendererHost for LocalRendererHost {
    fn load_config(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>> {
        Box::pin(async move {
            Ok(self.store.get_by_id(&self.id).await?.map(|d| d.envelope))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingNavigator;
    use crate::storage::{MemoryLegacySlot, MemoryStorage};
    use crate::test_util::block_on;

    fn store() -> PlaygroundStore {
        block_on(PlaygroundStore::open(
            Arc::new(MemoryStorage::new()),
            &MemoryLegacySlot::new(),
        ))
        .unwrap()
    }

    fn host(store: &PlaygroundStore, id: &str) -> (LocalStoreHost, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        (LocalStoreHost::new(id, store.clone(), navigator.clone()), navigator)
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = store();
        let (host, _) = host(&store, "nope");
        assert!(block_on(host.load_drawing()).unwrap().is_none());
    }

    #[test]
    fn test_save_preserves_created_at() {
        let store = store();
        let initial = StoredDrawing {
            id: "d1".to_string(),
            title: DEFAULT_TITLE.to_string(),
            envelope: DrawingEnvelope {
                tool: "excalidraw".to_string(),
                version: 1,
                data: String::new(),
                preview: None,
                created_at: Some("T0".to_string()),
                updated_at: Some("T0".to_string()),
            },
        };
        block_on(store.save(&initial)).unwrap();

        let (host, _) = host(&store, "d1");
        let update = DrawingEnvelope {
            tool: "excalidraw".to_string(),
            version: 1,
            data: "{\"elements\":[1]}".to_string(),
            preview: None,
            created_at: None,
            updated_at: Some("T1".to_string()),
        };
        block_on(host.save_drawing(update)).unwrap();

        let saved = block_on(store.get_by_id("d1")).unwrap().unwrap();
        assert_eq!(saved.envelope.created_at.as_deref(), Some("T0"));
        assert_eq!(saved.envelope.updated_at.as_deref(), Some("T1"));
        assert_eq!(saved.envelope.data, "{\"elements\":[1]}");
        assert_eq!(saved.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_save_keeps_existing_title() {
        let store = store();
        let mut drawing = StoredDrawing::create(crate::tool::ToolKind::Vector);
        drawing.title = "Roadmap".to_string();
        block_on(store.save(&drawing)).unwrap();

        let (host, _) = host(&store, &drawing.id);
        block_on(host.save_drawing(DrawingEnvelope::empty("excalidraw"))).unwrap();

        let saved = block_on(store.get_by_id(&drawing.id)).unwrap().unwrap();
        assert_eq!(saved.title, "Roadmap");
        assert_eq!(saved.envelope.created_at, drawing.envelope.created_at);
    }

    #[test]
    fn test_title_capability() {
        let store = store();
        let drawing = block_on(store.create(crate::tool::ToolKind::Text)).unwrap();
        let (host, _) = host(&store, &drawing.id);

        block_on(host.load_drawing()).unwrap();
        let titles = host.title_capability().unwrap();
        assert_eq!(titles.title(), DEFAULT_TITLE);

        block_on(titles.set_title("  Login flow ")).unwrap();
        assert_eq!(titles.title(), "Login flow");
        let saved = block_on(store.get_by_id(&drawing.id)).unwrap().unwrap();
        assert_eq!(saved.title, "Login flow");
    }

    #[test]
    fn test_title_set_before_first_save() {
        let store = store();
        let (host, _) = host(&store, "fresh");

        block_on(host.set_title("Sketch")).unwrap();
        block_on(host.save_drawing(DrawingEnvelope::empty("excalidraw"))).unwrap();

        let saved = block_on(store.get_by_id("fresh")).unwrap().unwrap();
        assert_eq!(saved.title, "Sketch");
    }

    #[test]
    fn test_close_navigates_to_listing() {
        let store = store();
        let (host, navigator) = host(&store, "d1");
        host.close();
        assert_eq!(navigator.visited(), vec![PLAYGROUND_LIST_URL.to_string()]);
    }

    #[test]
    fn test_renderer_reads_envelope() {
        let store = store();
        let drawing = block_on(store.create(crate::tool::ToolKind::Vector)).unwrap();
        let renderer = LocalRendererHost::new(drawing.id.clone(), store.clone());
        let envelope = block_on(renderer.load_config()).unwrap().unwrap();
        assert_eq!(envelope, drawing.envelope);

        let missing = LocalRendererHost::new("missing", store);
        assert!(block_on(missing.load_config()).unwrap().is_none());
    }
}
