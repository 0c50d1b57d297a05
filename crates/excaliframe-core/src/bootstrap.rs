//! Startup: decide which host the page runs against and mount an editor.

use crate::host::{
    ActiveHost, HostResult, LocalStoreHost, MacroPlatform, Navigator, PlatformConfigHost,
    select_platform,
};
use crate::session::EditorSession;
use crate::storage::{PlaygroundStore, StorageError};
use crate::tool::ToolKind;
use std::sync::Arc;

/// Where the editor page was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootContext {
    /// Editing a macro inside the wiki platform.
    Macro { tool: ToolKind },
    /// Editing one playground drawing.
    Playground { drawing_id: String },
}

impl BootContext {
    /// A page that was handed a drawing id is a playground page.
    pub fn detect(drawing_id: Option<&str>, tool: Option<&str>) -> Self {
        match drawing_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => BootContext::Playground {
                drawing_id: id.to_string(),
            },
            None => BootContext::Macro {
                tool: ToolKind::resolve(tool),
            },
        }
    }
}

/// What the page provides for building a host.
pub struct HostDeps {
    /// The platform's capability object, if the page found one.
    pub platform: Option<Arc<dyn MacroPlatform>>,
    /// The opened playground store.
    pub store: Option<PlaygroundStore>,
    pub navigator: Arc<dyn Navigator>,
}

/// Build the host for `context`, plus the tool to use when it has no drawing.
pub fn build_host(context: &BootContext, deps: HostDeps) -> HostResult<(ActiveHost, ToolKind)> {
    match context {
        BootContext::Macro { tool } => {
            let platform = select_platform(deps.platform);
            let host = PlatformConfigHost::new(platform, tool.id());
            Ok((host.into(), *tool))
        }
        BootContext::Playground { drawing_id } => {
            let store = deps.store.ok_or_else(|| {
                StorageError::Unavailable("playground store was not opened".to_string())
            })?;
            let host = LocalStoreHost::new(drawing_id.clone(), store, deps.navigator);
            Ok((host.into(), ToolKind::default()))
        }
    }
}

/// Build the host and open an editor session on it.
pub async fn mount(context: &BootContext, deps: HostDeps) -> HostResult<EditorSession<ActiveHost>> {
    let (host, fallback) = build_host(context, deps)?;
    log::info!("Mounting editor on {} host", host.name());
    Ok(EditorSession::open_with_default(host, fallback).await)
}
