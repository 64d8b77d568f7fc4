//! View rendering for the content editor.
//!
//! A dataset tab bar (with a red dot on datasets holding unsaved changes), a
//! toolbar with the save and publish actions, a status line, and the form of
//! the selected dataset.

use common::model::DatasetKey;
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::is_dirty;
use super::link_dialog::link_dialog;
use super::messages::Msg;
use super::state::EditorComponent;
use super::{about_view, providers_view, site_view};

pub fn view(component: &EditorComponent, ctx: &Context<EditorComponent>) -> Html {
    let link = ctx.link();

    html! {
        <div class="editor-root">
            { build_tab_bar(component, link) }
            { build_toolbar(component, link) }
            { build_status(component) }
            <div class="editor-body">
                { build_body(component, link) }
            </div>
            { link_dialog(component, link) }
        </div>
    }
}

fn build_tab_bar(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let tabs = DatasetKey::ALL
        .into_iter()
        .map(|key| {
            html! {
                <button
                    class={classes!("tab-btn", (component.dataset == key).then_some("active"))}
                    onclick={link.callback(move |_| Msg::SelectDataset(key))}
                >
                    { key.label() }
                    if is_dirty(component, key) {
                        <span class="dirty-dot" title="Unsaved changes" />
                    }
                </button>
            }
        })
        .collect::<Html>();

    html! { <div class="tab-bar">{ tabs }</div> }
}

fn build_toolbar(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let blocked = component.is_blocked();
    let loaded = component.app.is_loaded(component.dataset);

    html! {
        <div class="icon-toolbar">
            { icon_button("save", "Save", link.callback(|_| Msg::Save), blocked || !loaded) }
            { icon_button("publish", "Save & publish", link.callback(|_| Msg::SaveAndPublish), blocked || !loaded) }
            { icon_button("cloud_upload", "Publish all", link.callback(|_| Msg::Publish), blocked) }
            { icon_button("refresh", "Reload", link.callback(|_| Msg::Reload), component.loading.is_some() || component.busy.is_some()) }
            { icon_button("link", "Insert link", link.callback(|_| Msg::OpenLinkDialog), !loaded) }
        </div>
    }
}

fn build_status(component: &EditorComponent) -> Html {
    let line = if let Some(busy) = component.busy {
        Some(busy.label().to_string())
    } else if component.loading == Some(component.dataset) {
        Some(format!("Loading {}...", component.dataset.label()))
    } else if component.uploading > 0 {
        Some("Uploading images...".to_string())
    } else {
        component.status.clone()
    };

    match line {
        Some(line) => html! { <p class={classes!("status-line", component.busy.map(|_| "busy"))}>{ line }</p> },
        None => html! {},
    }
}

fn build_body(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    if let Some(error) = &component.load_error {
        return html! {
            <div class="load-error">
                <p>{ error.clone() }</p>
                <button class="primary-btn" onclick={link.callback(|_| Msg::Reload)}>{"Try again"}</button>
            </div>
        };
    }

    let app = &component.app;
    let form = match component.dataset {
        DatasetKey::AboutContent => app.about.as_ref().map(|form| about_view::view(form, component, link)),
        DatasetKey::Providers => app
            .providers
            .as_ref()
            .map(|editor| providers_view::view(editor, component, link)),
        DatasetKey::SiteContent => app.site.as_ref().map(|form| site_view::view(form, component, link)),
    };
    form.unwrap_or_else(|| html! { <p class="muted">{"Loading..."}</p> })
}

/// Renders a toolbar button with a Material icon and a label.
fn icon_button(icon_name: &str, label: &str, on_click: Callback<MouseEvent>, disabled: bool) -> Html {
    html! {
        <button class="icon-btn" onclick={on_click} {disabled}>
            <i class="material-icons">{icon_name}</i>
            <span class="icon-label">{label}</span>
        </button>
    }
}
