//! The Confluence Connect `AP` object as a [`MacroPlatform`].
//!
//! Connect keeps the macro body as a string; we store the JSON form of
//! [`MacroConfig`] in it.

use super::{HostError, HostResult, MacroConfig, MacroPlatform, PlatformCapabilities};
use crate::storage::BoxFuture;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

const GET_MACRO_BODY: &str = "getMacroBody";
const SAVE_MACRO: &str = "saveMacro";
const CLOSE_MACRO_EDITOR: &str = "closeMacroEditor";

pub struct ConnectPlatform {
    confluence: JsValue,
}

impl ConnectPlatform {
    /// Wrap the page's global `AP.confluence`, if there is one.
    ///
    /// The Connect script creates a partial `AP` outside Confluence, so callers
    /// still need to check [`MacroPlatform::capabilities`].
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ap = Reflect::get(&window, &JsValue::from_str("AP")).ok()?;
        if ap.is_undefined() || ap.is_null() {
            return None;
        }
        let confluence = Reflect::get(&ap, &JsValue::from_str("confluence")).ok()?;
        if confluence.is_undefined() || confluence.is_null() {
            return None;
        }
        Some(Self { confluence })
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.confluence, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn require(&self, name: &str) -> HostResult<Function> {
        self.method(name)
            .ok_or_else(|| HostError::Platform(format!("AP.confluence.{} is not available", name)))
    }
}

impl MacroPlatform for ConnectPlatform {
    fn name(&self) -> &str {
        "confluence-connect"
    }

    fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities {
            get_config: self.method(GET_MACRO_BODY).is_some(),
            submit_config: self.method(SAVE_MACRO).is_some(),
            close: self.method(CLOSE_MACRO_EDITOR).is_some(),
        }
    }

    fn get_config(&self) -> BoxFuture<'_, HostResult<Option<MacroConfig>>> {
        Box::pin(async move {
            let get_body = self.require(GET_MACRO_BODY)?;
            let confluence = self.confluence.clone();

            let promise = Promise::new(&mut |resolve, reject| {
                let callback = Closure::once_into_js(move |body: JsValue| {
                    let _ = resolve.call1(&JsValue::NULL, &body);
                });
                if let Err(e) = get_body.call1(&confluence, &callback) {
                    let _ = reject.call1(&JsValue::NULL, &e);
                }
            });

            let body = JsFuture::from(promise)
                .await
                .map_err(|e| HostError::Platform(format!("getMacroBody failed: {:?}", e)))?
                .as_string()
                .unwrap_or_default();

            if body.trim().is_empty() {
                return Ok(None);
            }
            match serde_json::from_str::<MacroConfig>(&body) {
                Ok(config) => Ok(Some(config)),
                Err(e) => {
                    log::warn!("Ignoring malformed macro body: {}", e);
                    Ok(None)
                }
            }
        })
    }

    fn submit_config(&self, config: MacroConfig) -> BoxFuture<'_, HostResult<()>> {
        Box::pin(async move {
            let body = serde_json::to_string(&config)
                .map_err(|e| HostError::Malformed(e.to_string()))?;
            let save = self.require(SAVE_MACRO)?;
            save.call2(&self.confluence, &Object::new(), &JsValue::from_str(&body))
                .map_err(|e| HostError::Platform(format!("saveMacro failed: {:?}", e)))?;
            // Connect's saveMacro leaves the dialog open.
            self.close();
            Ok(())
        })
    }

    fn close(&self) {
        match self.method(CLOSE_MACRO_EDITOR) {
            Some(close) => {
                if let Err(e) = close.call0(&self.confluence) {
                    log::warn!("closeMacroEditor failed: {:?}", e);
                }
            }
            None => log::warn!("AP.confluence.closeMacroEditor is not available"),
        }
    }
}
