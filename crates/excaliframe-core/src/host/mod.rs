//! Host adapters.
//!
//! Editors talk to one [`EditorHost`] and never to the backing platform. The
//! wiki macro platform and the standalone playground each provide one.

mod local;
mod navigator;
mod platform;

#[cfg(target_arch = "wasm32")]
mod connect;

pub use local::{LocalRendererHost, LocalStoreHost, PLAYGROUND_LIST_URL};
pub use navigator::{Navigator, RecordingNavigator};
pub use platform::{
    MOCK_MACRO_BODY_KEY, MacroConfig, MacroPlatform, MockPlatform, PlatformCapabilities,
    PlatformConfigHost, PlatformRendererHost, select_platform,
};

#[cfg(target_arch = "wasm32")]
pub use connect::ConnectPlatform;
#[cfg(target_arch = "wasm32")]
pub use navigator::LocationNavigator;

use crate::envelope::DrawingEnvelope;
use crate::storage::{BoxFuture, StorageError};
use thiserror::Error;

/// Host errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Platform call failed: {0}")]
    Platform(String),
    #[error("Malformed host data: {0}")]
    Malformed(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Load/save/close contract every editor is mounted against.
pub trait EditorHost {
    /// The current drawing, or `None` when nothing has been saved yet.
    fn load_drawing(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>>;

    /// Persist `envelope` as the current state of this drawing.
    ///
    /// An existing `created_at` survives when `envelope` doesn't carry one.
    fn save_drawing(&self, envelope: DrawingEnvelope) -> BoxFuture<'_, HostResult<()>>;

    /// Dismiss the editing surface.
    fn close(&self);

    /// Title editing, for hosts that keep a display title.
    fn title_capability(&self) -> Option<&dyn TitleCapability> {
        None
    }
}

/// Optional display-title support.
pub trait TitleCapability {
    fn title(&self) -> String;

    fn set_title(&self, title: &str) -> BoxFuture<'_, HostResult<()>>;
}

/// Read-only access used by the renderer view.
pub trait RendererHost {
    fn load_config(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>>;
}

/// The host chosen at startup.
pub enum ActiveHost {
    PlatformConfig(PlatformConfigHost),
    LocalStore(LocalStoreHost),
}

impl ActiveHost {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveHost::PlatformConfig(_) => "platform-config",
            ActiveHost::LocalStore(_) => "local-store",
        }
    }
}

impl From<PlatformConfigHost> for ActiveHost {
    fn from(host: PlatformConfigHost) -> Self {
        ActiveHost::PlatformConfig(host)
    }
}

impl From<LocalStoreHost> for ActiveHost {
    fn from(host: LocalStoreHost) -> Self {
        ActiveHost::LocalStore(host)
    }
}

impl EditorHost for ActiveHost {
    fn load_drawing(&self) -> BoxFuture<'_, HostResult<Option<DrawingEnvelope>>> {
        match self {
            ActiveHost::PlatformConfig(host) => host.load_drawing(),
            ActiveHost::LocalStore(host) => host.load_drawing(),
        }
    }

    fn save_drawing(&self, envelope: DrawingEnvelope) -> BoxFuture<'_, HostResult<()>> {
        match self {
            ActiveHost::PlatformConfig(host) => host.save_drawing(envelope),
            ActiveHost::LocalStore(host) => host.save_drawing(envelope),
        }
    }

    fn close(&self) {
        match self {
            ActiveHost::PlatformConfig(host) => host.close(),
            ActiveHost::LocalStore(host) => host.close(),
        }
    }

    fn title_capability(&self) -> Option<&dyn TitleCapability> {
        match self {
            ActiveHost::PlatformConfig(host) => host.title_capability(),
            ActiveHost::LocalStore(host) => host.title_capability(),
        }
    }
}
