//! Excaliframe Core Library
//!
//! Tool-agnostic drawing envelopes, playground storage and the host adapters
//! that let the Excalidraw and Mermaid editors persist into either a wiki macro
//! platform or the standalone playground.

pub mod bootstrap;
pub mod catalog;
pub mod envelope;
pub mod host;
pub mod preview;
pub mod session;
pub mod storage;
pub mod tool;

pub use bootstrap::{BootContext, HostDeps, mount};
pub use envelope::{DrawingEnvelope, StoredDrawing, DEFAULT_TITLE, ENVELOPE_VERSION};
pub use host::{
    ActiveHost, EditorHost, HostError, HostResult, LocalRendererHost, LocalStoreHost,
    MacroConfig, MacroPlatform, MockPlatform, Navigator, PlatformCapabilities,
    PlatformConfigHost, PlatformRendererHost, RecordingNavigator, RendererHost, TitleCapability,
    select_platform,
};
pub use preview::PreviewSource;
pub use session::{EditorSession, SaveOutcome};
pub use storage::{DrawingStorage, LegacySlot, PlaygroundStore, StorageError, StorageResult};
pub use tool::ToolKind;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{EditorHandle, mount_editor};
