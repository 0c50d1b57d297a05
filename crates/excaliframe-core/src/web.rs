//! WebAssembly bindings used by the editor and renderer pages.
//!
//! The page's JavaScript mounts the Excalidraw or Mermaid component and talks
//! to the host through an [`EditorHandle`].

use crate::bootstrap::{BootContext, HostDeps, mount};
use crate::host::{
    ActiveHost, ConnectPlatform, EditorHost, LocalRendererHost, LocationNavigator,
    MacroPlatform, PlatformRendererHost, RendererHost, select_platform,
};
use crate::preview::PreviewSource;
use crate::session::{EditorSession, SaveOutcome};
use crate::storage::{IndexedDbStorage, LocalStorageSlot, PlaygroundStore};
use crate::tool::ToolKind;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn detect_platform() -> Option<Arc<dyn MacroPlatform>> {
    ConnectPlatform::detect().map(|p| Arc::new(p) as Arc<dyn MacroPlatform>)
}

async fn open_store() -> Result<PlaygroundStore, JsValue> {
    PlaygroundStore::open(Arc::new(IndexedDbStorage::new()), &LocalStorageSlot::new())
        .await
        .map_err(to_js)
}

/// Initialize logging and panic reporting. Safe to call more than once.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// A mounted editor.
#[wasm_bindgen]
pub struct EditorHandle {
    session: Rc<EditorSession<ActiveHost>>,
}

#[wasm_bindgen]
impl EditorHandle {
    /// Tool identifier the page should mount (`"excalidraw"` or `"mermaid"`).
    #[wasm_bindgen(getter)]
    pub fn tool(&self) -> String {
        self.session.kind().id().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn content(&self) -> String {
        self.session.content()
    }

    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&self, content: String) {
        self.session.set_content(content);
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    /// Save with a PNG export. Resolves to `true` when saved, `false` when a
    /// save was already running.
    #[wasm_bindgen(js_name = saveWithPng)]
    pub fn save_with_png(&self, png: Vec<u8>) -> js_sys::Promise {
        self.save(PreviewSource::Png(png))
    }

    /// Save with rendered SVG markup as the preview.
    #[wasm_bindgen(js_name = saveWithSvg)]
    pub fn save_with_svg(&self, svg: String) -> js_sys::Promise {
        self.save(PreviewSource::Svg(svg))
    }

    fn save(&self, preview: PreviewSource) -> js_sys::Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            let outcome = session.save(preview).await.map_err(to_js)?;
            Ok(JsValue::from_bool(outcome == SaveOutcome::Saved))
        })
    }

    /// Close, asking `confirm` first when there are unsaved changes.
    pub fn close(&self, confirm: &js_sys::Function) -> bool {
        self.session.close(|| {
            confirm
                .call0(&JsValue::NULL)
                .map(|v| v.is_truthy())
                .unwrap_or(false)
        })
    }

    /// Display title, `undefined` for hosts without titles.
    #[wasm_bindgen(getter)]
    pub fn title(&self) -> Option<String> {
        self.session.host().title_capability().map(|t| t.title())
    }

    #[wasm_bindgen(js_name = setTitle)]
    pub fn set_title(&self, title: String) -> js_sys::Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            if let Some(titles) = session.host().title_capability() {
                titles.set_title(&title).await.map_err(to_js)?;
            }
            Ok(JsValue::UNDEFINED)
        })
    }
}

/// Mount an editor. A non-empty `drawing_id` selects the playground host;
/// otherwise the wiki platform (or its mock) is used.
#[wasm_bindgen(js_name = mountEditor)]
pub async fn mount_editor(drawing_id: Option<String>, tool: Option<String>) -> Result<EditorHandle, JsValue> {
    let context = BootContext::detect(drawing_id.as_deref(), tool.as_deref());
    let store = match context {
        BootContext::Playground { .. } => Some(open_store().await?),
        BootContext::Macro { .. } => None,
    };
    let deps = HostDeps {
        platform: detect_platform(),
        store,
        navigator: Arc::new(LocationNavigator),
    };
    let session = mount(&context, deps).await.map_err(to_js)?;
    Ok(EditorHandle {
        session: Rc::new(session),
    })
}

/// Load the envelope for read-only display, as JSON. Resolves to `null` when
/// there is nothing to show.
#[wasm_bindgen(js_name = loadForRenderer)]
pub async fn load_for_renderer(drawing_id: Option<String>, tool: Option<String>) -> Result<JsValue, JsValue> {
    let envelope = match BootContext::detect(drawing_id.as_deref(), tool.as_deref()) {
        BootContext::Playground { drawing_id } => {
            let store = open_store().await?;
            LocalRendererHost::new(drawing_id, store).load_config().await
        }
        BootContext::Macro { tool } => {
            PlatformRendererHost::new(select_platform(detect_platform()), tool.id())
                .load_config()
                .await
        }
    }
    .map_err(to_js)?;

    match envelope {
        Some(envelope) => envelope.to_json().map(|j| JsValue::from_str(&j)).map_err(to_js),
        None => Ok(JsValue::NULL),
    }
}

/// Create a playground drawing and return its id.
#[wasm_bindgen(js_name = createDrawing)]
pub async fn create_drawing(tool: String) -> Result<String, JsValue> {
    let store = open_store().await?;
    let drawing = store
        .create(ToolKind::resolve(Some(&tool)))
        .await
        .map_err(to_js)?;
    Ok(drawing.id)
}

/// One playground drawing as JSON, or `null` when there is no such drawing.
#[wasm_bindgen(js_name = getDrawing)]
pub async fn get_drawing(id: String) -> Result<JsValue, JsValue> {
    let store = open_store().await?;
    match store.get_by_id(&id).await.map_err(to_js)? {
        Some(drawing) => drawing.to_json().map(|j| JsValue::from_str(&j)).map_err(to_js),
        None => Ok(JsValue::NULL),
    }
}

/// All playground drawings as JSON summaries, newest first.
#[wasm_bindgen(js_name = listDrawings)]
pub async fn list_drawings() -> Result<JsValue, JsValue> {
    let store = open_store().await?;
    let summaries = crate::catalog::summarize(store.list_all().await);
    serde_json::to_string(&summaries)
        .map(|j| JsValue::from_str(&j))
        .map_err(to_js)
}

#[wasm_bindgen(js_name = deleteDrawing)]
pub async fn delete_drawing(id: String) -> Result<(), JsValue> {
    let store = open_store().await?;
    store.delete(&id).await.map_err(to_js)
}
