//! Page navigation used when an editor closes.

use std::sync::Mutex;

pub trait Navigator {
    fn navigate(&self, url: &str);
}

/// Records requested URLs instead of navigating. Used natively and in tests.
#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs requested so far, oldest first.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        log::debug!("navigate -> {}", url);
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(url.to_string());
        }
    }
}

/// Navigates the browser window.
#[cfg(target_arch = "wasm32")]
pub struct LocationNavigator;

#[cfg(target_arch = "wasm32")]
impl Navigator for LocationNavigator {
    fn navigate(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            log::warn!("No window to navigate to {}", url);
            return;
        };
        if let Err(e) = window.location().set_href(url) {
            log::warn!("Failed to navigate to {}: {:?}", url, e);
        }
    }
}
