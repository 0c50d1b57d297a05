//! IndexedDB storage implementation for WebAssembly.
//!
//! Uses the browser's IndexedDB for the playground store. Records are plain
//! `{id, title, envelope}` objects in a store keyed in-line by `id`.

use super::{
    BoxFuture, DB_NAME, DB_VERSION, DrawingStorage, KEY_PATH, STORE_NAME, StorageError,
    StorageResult,
};
use crate::envelope::StoredDrawing;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{IdbDatabase, IdbObjectStore, IdbObjectStoreParameters, IdbRequest, IdbTransactionMode};

/// IndexedDB-based storage for WebAssembly.
///
/// Note: This is intentionally not Send/Sync since WASM is single-threaded
/// and IndexedDB handles are not thread-safe.
pub struct IndexedDbStorage {
    /// Cached database connection.
    db: Rc<RefCell<Option<IdbDatabase>>>,
}

impl IndexedDbStorage {
    /// Create a new IndexedDB storage.
    ///
    /// Note: The actual database connection is established lazily on first use.
    pub fn new() -> Self {
        Self {
            db: Rc::new(RefCell::new(None)),
        }
    }

    /// Open or create the database, returning a handle.
    async fn get_db(&self) -> StorageResult<IdbDatabase> {
        // Return cached connection if available
        if let Some(db) = self.db.borrow().as_ref() {
            return Ok(db.clone());
        }

        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;

        let idb_factory = window
            .indexed_db()
            .map_err(|e| StorageError::Unavailable(format!("IndexedDB error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("IndexedDB not available".to_string()))?;

        let open_request = idb_factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(|e| StorageError::Unavailable(format!("Failed to open DB: {:?}", e)))?;

        // Set up upgrade handler to create object store
        let onupgrade = Closure::once(Box::new(move |event: web_sys::IdbVersionChangeEvent| {
            let Some(target) = event.target() else {
                return;
            };
            let request: IdbRequest = target.unchecked_into();
            let Ok(result) = request.result() else {
                return;
            };
            let db: IdbDatabase = result.unchecked_into();

            if !db.object_store_names().contains(STORE_NAME) {
                let params = IdbObjectStoreParameters::new();
                params.set_key_path(&JsValue::from_str(KEY_PATH));
                if let Err(e) = db.create_object_store_with_optional_parameters(STORE_NAME, &params) {
                    log::error!("Failed to create object store: {:?}", e);
                }
            }
        }) as Box<dyn FnOnce(_)>);

        open_request.set_onupgradeneeded(Some(onupgrade.as_ref().unchecked_ref()));
        onupgrade.forget(); // Let JS handle cleanup

        let db = await_idb_request::<IdbDatabase>(&open_request)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        *self.db.borrow_mut() = Some(db.clone());

        Ok(db)
    }

    /// Get the object store for a transaction.
    fn get_store(&self, db: &IdbDatabase, mode: IdbTransactionMode) -> StorageResult<IdbObjectStore> {
        let transaction = db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .map_err(|e| StorageError::Other(format!("Transaction error: {:?}", e)))?;

        transaction
            .object_store(STORE_NAME)
            .map_err(|e| StorageError::Other(format!("Store error: {:?}", e)))
    }
}

impl Default for IndexedDbStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn to_record(drawing: &StoredDrawing) -> StorageResult<JsValue> {
    let json = drawing
        .to_json()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    js_sys::JSON::parse(&json)
        .map_err(|e| StorageError::Serialization(format!("Invalid record JSON: {:?}", e)))
}

fn parse_record(value: &JsValue) -> StorageResult<StoredDrawing> {
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|e| StorageError::Serialization(format!("Unreadable record: {:?}", e)))?
        .into();
    StoredDrawing::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))
}

impl DrawingStorage for IndexedDbStorage {
    fn ready(&self) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.get_db().await?;
            Ok(())
        })
    }

    fn put(&self, drawing: &StoredDrawing) -> BoxFuture<'_, StorageResult<()>> {
        let record = to_record(drawing);

        Box::pin(async move {
            let record = record?;
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readwrite)?;

            let request = store
                .put(&record)
                .map_err(|e| StorageError::Other(format!("Put error: {:?}", e)))?;

            await_idb_request::<JsValue>(&request).await?;
            Ok(())
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<StoredDrawing>>> {
        let id = id.to_string();

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readonly)?;

            let request = store
                .get(&JsValue::from_str(&id))
                .map_err(|e| StorageError::Other(format!("Get error: {:?}", e)))?;

            let result = await_idb_request::<JsValue>(&request).await?;

            if result.is_undefined() || result.is_null() {
                return Ok(None);
            }
            parse_record(&result).map(Some)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readwrite)?;

            let request = store
                .delete(&JsValue::from_str(&id))
                .map_err(|e| StorageError::Other(format!("Delete error: {:?}", e)))?;

            await_idb_request::<JsValue>(&request).await?;
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredDrawing>>> {
        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readonly)?;

            let request = store
                .get_all()
                .map_err(|e| StorageError::Other(format!("GetAll error: {:?}", e)))?;

            let result = await_idb_request::<js_sys::Array>(&request).await?;

            let mut drawings = Vec::new();
            for i in 0..result.length() {
                match parse_record(&result.get(i)) {
                    Ok(drawing) => drawings.push(drawing),
                    Err(e) => log::warn!("Skipping unreadable drawing: {}", e),
                }
            }
            Ok(drawings)
        })
    }
}

/// Helper to await an IndexedDB request using a Promise.
async fn await_idb_request<T: JsCast>(request: &IdbRequest) -> StorageResult<T> {
    use wasm_bindgen_futures::JsFuture;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let onsuccess = Closure::once(Box::new(move |event: web_sys::Event| {
            let result = event
                .target()
                .map(|t| t.unchecked_into::<IdbRequest>())
                .and_then(|r| r.result().ok())
                .unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        }) as Box<dyn FnOnce(_)>);

        let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        }) as Box<dyn FnOnce(_)>);

        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        onsuccess.forget();
        onerror.forget();
    });

    JsFuture::from(promise)
        .await
        .map_err(|e| StorageError::Other(format!("IndexedDB request failed: {:?}", e)))?
        .dyn_into::<T>()
        .map_err(|_| StorageError::Other("Type conversion failed".to_string()))
}
