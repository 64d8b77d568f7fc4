//! Browser implementations of the `common` seams.
//!
//! - [`BrowserTransport`]: `gloo-net` requests against the single endpoint.
//! - [`BrowserStorage`]: `localStorage` / `sessionStorage`, or memory when the
//!   browser refuses storage (private mode, sandboxed frames).
//! - [`ConsoleLogger`]: routes the `log` facade used by `common` to the console.

use std::ops::Deref;
use std::rc::Rc;

use common::client::{Query, RemoteStore, Transport};
use common::model::DatasetKey;
use common::protocol::HttpResponse;
use common::storage::{KeyValueStore, MemoryStore};
use common::CmsError;
use gloo_net::http::Request;
use js_sys::Reflect;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{BeforeUnloadEvent, CustomEvent, CustomEventInit, Storage};

/// Event dispatched on `window` after a dataset was saved; `detail` is the key.
pub const DATA_UPDATED_EVENT: &str = "app-data-updated";

pub struct BrowserTransport;

impl Transport for BrowserTransport {
    async fn post(&self, url: &str, query: &Query<'_>, body: String) -> Result<HttpResponse, String> {
        // text/plain keeps the request "simple" so Apps Script is not preflighted.
        let response = Request::post(url)
            .query(query.iter().map(|(name, value)| (*name, value.as_str())))
            .header("Content-Type", "text/plain;charset=utf-8")
            .body(body)
            .map_err(|err| err.to_string())?
            .send()
            .await
            .map_err(|err| err.to_string())?;
        let status = response.status();
        let body = response.text().await.map_err(|err| err.to_string())?;
        Ok(HttpResponse { status, body })
    }

    async fn get(&self, url: &str, query: &Query<'_>) -> Result<HttpResponse, String> {
        let response = Request::get(url)
            .query(query.iter().map(|(name, value)| (*name, value.as_str())))
            .send()
            .await
            .map_err(|err| err.to_string())?;
        let status = response.status();
        let body = response.text().await.map_err(|err| err.to_string())?;
        Ok(HttpResponse { status, body })
    }

    fn now_millis(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

pub enum BrowserStorage {
    Web(Storage),
    Memory(MemoryStore),
}

impl BrowserStorage {
    pub fn local() -> Self {
        Self::or_memory(web_sys::window().and_then(|window| window.local_storage().ok().flatten()), "localStorage")
    }

    pub fn session() -> Self {
        Self::or_memory(web_sys::window().and_then(|window| window.session_storage().ok().flatten()), "sessionStorage")
    }

    fn or_memory(storage: Option<Storage>, name: &str) -> Self {
        match storage {
            Some(storage) => BrowserStorage::Web(storage),
            None => {
                gloo_console::warn!(format!("{name} unavailable, keeping state in memory"));
                BrowserStorage::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStorage::Web(storage) => storage.get_item(key).ok().flatten(),
            BrowserStorage::Memory(memory) => memory.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> common::Result<()> {
        match self {
            BrowserStorage::Web(storage) => storage
                .set_item(key, value)
                .map_err(|err| CmsError::Storage(format!("{key}: {err:?}"))),
            BrowserStorage::Memory(memory) => memory.set(key, value),
        }
    }

    fn remove(&self, key: &str) {
        match self {
            BrowserStorage::Web(storage) => {
                let _ = storage.remove_item(key);
            }
            BrowserStorage::Memory(memory) => memory.remove(key),
        }
    }
}

pub type Store = RemoteStore<BrowserTransport>;

/// Shared handle to the remote store, passed down as a prop.
#[derive(Clone)]
pub struct StoreHandle(Rc<Store>);

impl StoreHandle {
    /// Builds the store for this page and forwards its change notifications
    /// to [`DATA_UPDATED_EVENT`].
    pub fn connect(endpoint: Option<String>) -> Self {
        let store = RemoteStore::new(
            endpoint,
            BrowserTransport,
            Rc::new(BrowserStorage::local()),
            Rc::new(BrowserStorage::session()),
        );
        store.subscribe(dispatch_data_updated);
        Self(Rc::new(store))
    }
}

impl Deref for StoreHandle {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.0
    }
}

impl PartialEq for StoreHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

pub fn dispatch_data_updated(key: DatasetKey) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(key.as_str()));
    match CustomEvent::new_with_event_init_dict(DATA_UPDATED_EVENT, &init) {
        Ok(event) => {
            let _ = window.dispatch_event(&event);
        }
        Err(err) => gloo_console::error!(format!("cannot dispatch {DATA_UPDATED_EVENT}: {err:?}")),
    }
}

/// Reads the `window.app_dirty` flag kept by the editor.
pub fn is_dirty() -> bool {
    web_sys::window()
        .and_then(|window| Reflect::get(&window, &JsValue::from_str("app_dirty")).ok())
        .and_then(|flag| flag.as_bool())
        .unwrap_or(false)
}

/// Asks for confirmation before leaving while `window.app_dirty` is set.
pub fn install_unload_guard() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let guard = Closure::<dyn Fn(BeforeUnloadEvent)>::new(|event: BeforeUnloadEvent| {
        if is_dirty() {
            event.prevent_default();
            event.set_return_value("You have unsaved changes.");
        }
    });
    if window
        .add_event_listener_with_callback("beforeunload", guard.as_ref().unchecked_ref())
        .is_ok()
    {
        // Lives as long as the page.
        guard.forget();
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl ConsoleLogger {
    pub fn init(level: log::LevelFilter) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.target(), record.args());
        match record.level() {
            log::Level::Error => gloo_console::error!(line),
            log::Level::Warn => gloo_console::warn!(line),
            log::Level::Info => gloo_console::info!(line),
            log::Level::Debug | log::Level::Trace => gloo_console::debug!(line),
        }
    }

    fn flush(&self) {}
}
