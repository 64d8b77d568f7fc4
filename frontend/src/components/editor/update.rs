//! Update function for the content editor component.
//!
//! Elm-style: receives the current state, the `Context` and a `Msg`, mutates
//! the state and returns whether the view should re-render.
//!
//! Key behaviors
//! - Dataset loads tagged with a generation number; stale results are dropped.
//! - Field, list and image edits forwarded to `common::editor::AppState`.
//! - Uploads read the chosen files, send them one by one and insert the
//!   returned placeholders into the target slot.
//! - Save, save-and-publish and publish with a busy flag that every
//!   completion clears.
//! - Dirty tracking after every edit and every successful save.

use common::client::PublishState;
use common::defaults;
use common::editor::ImageTarget;
use common::model::DatasetKey;
use common::CmsError;
use gloo_file::futures::read_as_bytes;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::components::top_sheet::{close_top_sheet, open_top_sheet};
use crate::platform;

use super::helpers::{
    compute_md5, document_md5, is_dirty, restore_caret, set_window_dirty_flag, show_toast,
};
use super::messages::Msg;
use super::state::{Busy, EditorComponent};

/// Central update function for the component.
pub fn update(component: &mut EditorComponent, ctx: &Context<EditorComponent>, msg: Msg) -> bool {
    match msg {
        Msg::SelectDataset(key) => {
            component.dataset = key;
            component.load_error = None;
            component.app.focus.clear();
            if !component.app.is_loaded(key) && component.loading != Some(key) {
                start_load(component, ctx, key);
            }
            true
        }
        Msg::Reload => {
            let key = component.dataset;
            if is_dirty(component, key)
                && !platform::confirm(&format!("Discard unsaved changes to {}?", key.label()))
            {
                return false;
            }
            start_load(component, ctx, key);
            true
        }
        Msg::Loaded {
            generation,
            key,
            result,
        } => {
            if generation != component.load_generation {
                gloo_console::debug!(format!("dropping stale load of {key}"));
                return false;
            }
            component.loading = None;
            match result.and_then(|value| component.app.load(key, value)) {
                Ok(()) => {
                    component.load_error = None;
                    if let Some(md5) = document_md5(&component.app, key) {
                        component.original_md5.insert(key, md5);
                    }
                }
                Err(err) => report_error(component, ctx, &format!("Could not load {}", key.label()), err, true),
            }
            set_window_dirty_flag(component);
            true
        }
        Msg::SetField(field, value) => {
            let changed = component.app.set_field(field, value);
            set_window_dirty_flag(component);
            changed
        }
        Msg::Focus(field, caret) => {
            component.app.focus.focus(field, caret);
            false
        }
        Msg::Caret(field, caret) => {
            component.app.focus.update_caret(field, caret);
            false
        }
        Msg::List(target, op) => {
            let changed = component.app.apply_list(target, op);
            set_window_dirty_flag(component);
            changed
        }
        Msg::SelectProvider(id) => {
            if let Err(err) = component.app.select_provider(&id) {
                show_toast(&err.to_string());
            }
            true
        }
        Msg::SetNewProviderId(value) => {
            component.new_provider_id = value;
            false
        }
        Msg::SetNewProviderName(value) => {
            component.new_provider_name = value;
            false
        }
        Msg::CreateProvider => {
            match component
                .app
                .create_provider(&component.new_provider_id, &component.new_provider_name)
            {
                Ok(()) => {
                    component.new_provider_id.clear();
                    component.new_provider_name.clear();
                    set_window_dirty_flag(component);
                }
                Err(err) => show_toast(&err.to_string()),
            }
            true
        }
        Msg::DeleteProvider(id) => {
            let confirmed = platform::confirm(&format!(
                "Delete provider \"{id}\" with all its cases and timeline? This takes effect on the next save."
            ));
            match component.app.delete_provider(&id, confirmed) {
                Ok(removed) => {
                    if removed {
                        set_window_dirty_flag(component);
                    }
                    removed
                }
                Err(err) => {
                    show_toast(&err.to_string());
                    true
                }
            }
        }
        Msg::FilesChosen(target, mut files) => {
            files.retain(|file| file.type_().starts_with("image/"));
            if files.is_empty() {
                show_toast("Choose an image file.");
                return false;
            }
            if !component.app.accepts_multiple(target) {
                files.truncate(1);
            }
            start_upload(component, ctx, target, files);
            true
        }
        Msg::UploadFinished {
            target,
            uploads,
            errors,
        } => {
            component.uploading = component.uploading.saturating_sub(1);
            let attached = component.app.attach_images(target, uploads);
            if attached > 0 {
                show_toast(&format!("{attached} image(s) uploaded. They go live on the next publish."));
            }
            if let Some(err) = errors.into_iter().next() {
                report_error(component, ctx, "Upload failed", err, false);
            }
            set_window_dirty_flag(component);
            true
        }
        Msg::RemoveImage(target, index) => {
            let removed = component.app.remove_image(target, index).is_some();
            set_window_dirty_flag(component);
            removed
        }
        Msg::SetImageUrl(target, url) => {
            let changed = component.app.set_image_url(target, &url);
            set_window_dirty_flag(component);
            changed
        }
        Msg::Save => {
            let key = component.dataset;
            let Some(data) = collect_for_save(component) else {
                return true;
            };
            let md5 = compute_md5(&data.to_string());
            component.busy = Some(Busy::Saving);

            let store = ctx.props().store.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = store.update(key, data, None).await;
                link.send_message(Msg::SaveFinished { key, md5, result });
            });
            true
        }
        Msg::SaveAndPublish => {
            let key = component.dataset;
            let Some(data) = collect_for_save(component) else {
                return true;
            };
            let md5 = compute_md5(&data.to_string());
            component.busy = Some(Busy::SavingAndPublishing);

            let store = ctx.props().store.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = store.save_publish(key, data, Some(vec![key]), None).await;
                link.send_message(Msg::SavePublishFinished { key, md5, result });
            });
            true
        }
        Msg::Publish => {
            if component.is_blocked() {
                return false;
            }
            if is_dirty(component, component.dataset)
                && !platform::confirm("Unsaved changes are not published. Publish the last saved version?")
            {
                return false;
            }
            component.busy = Some(Busy::Publishing);

            let store = ctx.props().store.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = store.publish(None, None).await;
                link.send_message(Msg::PublishFinished(result));
            });
            true
        }
        Msg::SaveFinished { key, md5, result } => {
            component.busy = None;
            match result {
                Ok(outcome) => {
                    component.original_md5.insert(key, md5);
                    let version = outcome
                        .version
                        .map(|version| format!(" (version {version})"))
                        .unwrap_or_default();
                    component.status = Some(format!("{} saved{version}.", key.label()));
                    show_toast("Saved.");
                }
                Err(err) => report_error(component, ctx, "Save failed", err, false),
            }
            set_window_dirty_flag(component);
            true
        }
        Msg::SavePublishFinished { key, md5, result } => {
            component.busy = None;
            match result {
                Ok(outcome) => {
                    component.original_md5.insert(key, md5);
                    match outcome.status() {
                        PublishState::Published => {
                            component.status = Some(format!("{} saved and published.", key.label()));
                            show_toast("Saved and published.");
                            reload_if_clean(component, ctx, key);
                        }
                        PublishState::SavedNotPublished => {
                            let reason = outcome.message.unwrap_or_else(|| "no reason given".to_string());
                            component.status = Some(format!("{} saved, but not published: {reason}", key.label()));
                            show_toast("Saved, but publishing failed.");
                        }
                    }
                }
                Err(err) => report_error(component, ctx, "Save failed", err, false),
            }
            set_window_dirty_flag(component);
            true
        }
        Msg::PublishFinished(result) => {
            component.busy = None;
            match result {
                Ok(_) => {
                    component.status = Some("Published.".to_string());
                    show_toast("Published.");
                    let key = component.dataset;
                    reload_if_clean(component, ctx, key);
                }
                Err(err) => report_error(component, ctx, "Publish failed", err, false),
            }
            true
        }
        Msg::OpenLinkDialog => match component.app.focus.field() {
            Some(field) if field.is_rich() => {
                open_top_sheet(&component.link_dialog_ref);
                false
            }
            _ => {
                show_toast("Click into a text box that accepts links first.");
                false
            }
        },
        Msg::CloseLinkDialog => {
            close_top_sheet(&component.link_dialog_ref);
            false
        }
        Msg::SetLinkUrl(value) => {
            component.link_url = value;
            false
        }
        Msg::SetLinkLabel(value) => {
            component.link_label = value;
            false
        }
        Msg::InsertLink => {
            let field = component.app.focus.field();
            match component.app.insert_link(&component.link_url, &component.link_label) {
                Ok(caret) => {
                    close_top_sheet(&component.link_dialog_ref);
                    component.link_url.clear();
                    component.link_label.clear();
                    if let Some(field) = field {
                        restore_caret(field, caret);
                    }
                    set_window_dirty_flag(component);
                    true
                }
                Err(err) => {
                    show_toast(&err.to_string());
                    false
                }
            }
        }
    }
}

/// Loads `key`: refreshes the version map, then reads the stored document.
/// An empty store yields the bundled default document.
pub fn start_load(component: &mut EditorComponent, ctx: &Context<EditorComponent>, key: DatasetKey) {
    component.load_generation += 1;
    component.loading = Some(key);
    component.load_error = None;
    let generation = component.load_generation;

    let store = ctx.props().store.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        if let Err(err) = store.fetch_versions().await {
            gloo_console::warn!(format!("version lookup failed: {err}"));
        }
        let result = store
            .secure_read(key, None)
            .await
            .map(|read| defaults::or_default(key, read.data));
        link.send_message(Msg::Loaded {
            generation,
            key,
            result,
        });
    });
}

fn start_upload(
    component: &mut EditorComponent,
    ctx: &Context<EditorComponent>,
    target: ImageTarget,
    files: Vec<web_sys::File>,
) {
    component.uploading += 1;
    let store = ctx.props().store.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let mut uploads = Vec::new();
        let mut errors = Vec::new();
        for file in files {
            let name = file.name();
            let mime = file.type_();
            let file = gloo_file::File::from(file);
            let result = match read_as_bytes(&file).await {
                Ok(bytes) => store.upload_image(&bytes, &name, &mime, None).await,
                Err(err) => Err(CmsError::validation(format!("cannot read {name}: {err}"))),
            };
            match result {
                Ok(upload) => uploads.push(upload),
                Err(err) => errors.push(err),
            }
        }
        link.send_message(Msg::UploadFinished {
            target,
            uploads,
            errors,
        });
    });
}

fn collect_for_save(component: &mut EditorComponent) -> Option<serde_json::Value> {
    if component.is_blocked() {
        return None;
    }
    match component.app.collect(component.dataset) {
        Ok(data) => Some(data),
        Err(err) => {
            show_toast(&err.to_string());
            None
        }
    }
}

/// Reloads after a publish so placeholders the backend resolved show up as
/// durable URLs. Skipped when the user has edited since the save.
fn reload_if_clean(component: &mut EditorComponent, ctx: &Context<EditorComponent>, key: DatasetKey) {
    if component.dataset == key && !is_dirty(component, key) {
        start_load(component, ctx, key);
    }
}

fn report_error(
    component: &mut EditorComponent,
    ctx: &Context<EditorComponent>,
    context: &str,
    err: CmsError,
    during_load: bool,
) {
    gloo_console::error!(format!("{context}: {err}"));
    if err.is_auth() {
        ctx.props().on_session_expired.emit(());
        return;
    }
    let message = format!("{context}: {err}");
    if during_load {
        component.load_error = Some(message.clone());
    } else {
        component.status = Some(message.clone());
    }
    show_toast(&message);
}

