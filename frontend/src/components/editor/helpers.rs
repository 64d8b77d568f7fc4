//! Utility functions for the content editor.
//!
//! - **User feedback**: toasts for save, publish and upload outcomes.
//! - **Dirty tracking**: MD5 of each collected document, compared against the
//!   baseline taken at load or save, mirrored to `window.app_dirty`.
//! - **DOM access**: caret positions and file lists from input events.

use common::editor::{AppState, FieldId};
use common::model::DatasetKey;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{FileList, HtmlElement, HtmlTextAreaElement};

use super::state::EditorComponent;

/// Displays a temporary notification at the bottom of the screen.
///
/// The message is inserted as text, never as markup, because it often carries
/// backend error messages. The toast removes itself after a few seconds.
pub fn show_toast(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

                if body.append_child(&html_toast).is_ok() {
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(3000).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

/// Hex MD5 digest of `input`.
pub fn compute_md5(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

/// Digest of the collected document, or `None` if it cannot be collected
/// (e.g. malformed coordinates), which counts as dirty.
pub fn document_md5(app: &AppState, key: DatasetKey) -> Option<String> {
    app.collect(key).ok().map(|value| compute_md5(&value.to_string()))
}

pub fn is_dirty(component: &EditorComponent, key: DatasetKey) -> bool {
    if !component.app.is_loaded(key) {
        return false;
    }
    match (component.original_md5.get(&key), document_md5(&component.app, key)) {
        (Some(original), Some(current)) => *original != current,
        _ => true,
    }
}

pub fn any_dirty(component: &EditorComponent) -> bool {
    DatasetKey::ALL.into_iter().any(|key| is_dirty(component, key))
}

/// Sets the global `app_dirty` flag read by the unload guard.
pub fn set_window_dirty_flag(component: &EditorComponent) {
    if let Some(window) = web_sys::window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str("app_dirty"),
            &JsValue::from_bool(any_dirty(component)),
        );
    }
}

/// Stable DOM id of a text field, used to restore the caret after an edit.
pub fn field_dom_id(field: FieldId) -> String {
    let raw = format!("{field:?}");
    let id: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("field-{}", id.trim_matches('-'))
}

/// Places the caret of a rendered textarea, after the next render.
pub fn restore_caret(field: FieldId, caret_utf16: u32) {
    let id = field_dom_id(field);
    wasm_bindgen_futures::spawn_local(async move {
        gloo_timers::future::TimeoutFuture::new(10).await;
        let textarea = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&id))
            .and_then(|element| element.dyn_into::<HtmlTextAreaElement>().ok());
        if let Some(textarea) = textarea {
            textarea.focus().ok();
            textarea.set_selection_range(caret_utf16, caret_utf16).ok();
        }
    });
}

pub fn caret_of(textarea: &HtmlTextAreaElement) -> u32 {
    textarea.selection_start().ok().flatten().unwrap_or(0)
}

pub fn files_of(list: Option<FileList>) -> Vec<web_sys::File> {
    let Some(list) = list else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|index| list.get(index)).collect()
}
