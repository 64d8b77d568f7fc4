//! Provider selector and the form of the selected provider.

use common::editor::provider::{ProviderField, ProviderForm, ProviderImage, ProviderList, ProvidersEditor};
use common::editor::{FieldId, ImageTarget, ListTarget};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::EditorComponent;
use super::widgets::{add_button, image_slot, list_controls, rich_field, text_field};

fn f(field: ProviderField) -> FieldId {
    FieldId::Provider(field)
}

pub fn view(editor: &ProvidersEditor, component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    html! {
        <div class="dataset-form">
            { selector(editor, component, link) }
            {
                match editor.form() {
                    Some(form) => provider_form(form, component, link),
                    None => html! { <p class="muted">{"No provider yet. Create one above."}</p> },
                }
            }
        </div>
    }
}

fn selector(editor: &ProvidersEditor, component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let selected = editor.selected().unwrap_or_default().to_string();
    let options = editor
        .ids()
        .map(|id| {
            let name = editor.name_of(id).unwrap_or_default();
            html! {
                <option value={id.to_string()} selected={id == selected}>
                    { format!("{name} ({id})") }
                </option>
            }
        })
        .collect::<Html>();

    let on_delete = {
        let selected = selected.clone();
        link.callback(move |_| Msg::DeleteProvider(selected.clone()))
    };

    html! {
        <section class="provider-selector">
            <label class="field">
                <span class="field-label">{ format!("Provider ({} total)", editor.len()) }</span>
                <select onchange={link.callback(|e: Event| {
                    Msg::SelectProvider(e.target_unchecked_into::<HtmlSelectElement>().value())
                })}>
                    { options }
                </select>
            </label>
            <button type="button" class="icon-btn danger" disabled={selected.is_empty()} onclick={on_delete}>
                <i class="material-icons">{"delete_forever"}</i>
                <span class="icon-label">{"Delete provider"}</span>
            </button>
            <div class="new-provider">
                <input
                    type="text"
                    placeholder="new-id"
                    value={component.new_provider_id.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::SetNewProviderId(e.target_unchecked_into::<HtmlInputElement>().value()))}
                />
                <input
                    type="text"
                    placeholder="Name"
                    value={component.new_provider_name.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::SetNewProviderName(e.target_unchecked_into::<HtmlInputElement>().value()))}
                />
                <button type="button" class="add-btn" onclick={link.callback(|_| Msg::CreateProvider)}>
                    <i class="material-icons">{"add"}</i>
                    {"Create"}
                </button>
            </div>
        </section>
    }
}

fn provider_form(form: &ProviderForm, component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let cases = form
        .cases
        .iter()
        .enumerate()
        .map(|(i, case)| {
            html! {
                <div class="block">
                    { list_controls(ListTarget::Provider(ProviderList::Cases), i, form.cases.len(), link) }
                    { text_field("Case id", f(ProviderField::CaseId(i)), &case.id, link) }
                    { text_field("Title", f(ProviderField::CaseTitle(i)), &case.title, link) }
                    { rich_field("Summary", f(ProviderField::CaseSummary(i)), &case.summary, 4, link) }
                    { image_slot("Images", ImageTarget::Provider(ProviderImage::CaseImages(i)), &case.images, true, component, link) }
                    { text_field("Video URL", f(ProviderField::CaseVideo(i)), &case.video, link) }
                </div>
            }
        })
        .collect::<Html>();

    let timeline = form
        .timeline
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            html! {
                <div class="block">
                    { list_controls(ListTarget::Provider(ProviderList::Timeline), i, form.timeline.len(), link) }
                    { text_field("When", f(ProviderField::TimelineTime(i)), &entry.time, link) }
                    { text_field("Title", f(ProviderField::TimelineTitle(i)), &entry.title, link) }
                    { rich_field("Detail", f(ProviderField::TimelineDetail(i)), &entry.detail, 3, link) }
                </div>
            }
        })
        .collect::<Html>();

    html! {
        <>
            <section>
                <h2>{ format!("Basics: {}", form.id) }</h2>
                { text_field("Name", f(ProviderField::Name), &form.name, link) }
                { text_field("Category", f(ProviderField::Category), &form.category, link) }
                { text_field("Schedule", f(ProviderField::Schedule), &form.schedule, link) }
                { text_field("Location", f(ProviderField::Location), &form.location, link) }
                { text_field("Address", f(ProviderField::Address), &form.address, link) }
                { text_field("Google Maps URL", f(ProviderField::GmapUrl), &form.gmap_url, link) }
                <div class="inline">
                    { text_field("Latitude", f(ProviderField::Lat), &form.lat, link) }
                    { text_field("Longitude", f(ProviderField::Lng), &form.lng, link) }
                </div>
                { rich_field("Description", f(ProviderField::Description), &form.description, 6, link) }
            </section>
            <section>
                <h2>{"Cases"}</h2>
                { cases }
                { add_button(ListTarget::Provider(ProviderList::Cases), "Add case", link) }
            </section>
            <section>
                <h2>{"Timeline"}</h2>
                { timeline }
                { add_button(ListTarget::Provider(ProviderList::Timeline), "Add entry", link) }
            </section>
        </>
    }
}
