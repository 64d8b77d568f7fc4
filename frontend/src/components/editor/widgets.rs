//! Building blocks shared by the dataset views.

use common::editor::{Direction, FieldId, ImageTarget, ListOp, ListTarget};
use common::model::ImageRef;
use web_sys::{DragEvent, HtmlInputElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::{caret_of, field_dom_id, files_of};
use super::messages::Msg;
use super::state::EditorComponent;

/// Single-line input.
pub fn text_field(label: &str, field: FieldId, value: &str, link: &Scope<EditorComponent>) -> Html {
    html! {
        <label class="field">
            <span class="field-label">{ label }</span>
            <input
                type="text"
                id={field_dom_id(field)}
                value={value.to_string()}
                oninput={link.callback(move |e: InputEvent| {
                    Msg::SetField(field, e.target_unchecked_into::<HtmlInputElement>().value())
                })}
                onfocus={link.callback(move |_: FocusEvent| Msg::Focus(field, 0))}
            />
        </label>
    }
}

/// Textarea for a field stored as HTML. Focus and caret are tracked so the
/// link dialog knows where to insert.
pub fn rich_field(label: &str, field: FieldId, value: &str, rows: u32, link: &Scope<EditorComponent>) -> Html {
    html! {
        <label class="field rich">
            <span class="field-label">{ label }<small class="muted">{" (links allowed)"}</small></span>
            <textarea
                id={field_dom_id(field)}
                rows={rows.to_string()}
                value={value.to_string()}
                oninput={link.batch_callback(move |e: InputEvent| {
                    let textarea = e.target_unchecked_into::<HtmlTextAreaElement>();
                    vec![Msg::SetField(field, textarea.value()), Msg::Caret(field, caret_of(&textarea))]
                })}
                onfocus={link.callback(move |e: FocusEvent| Msg::Focus(field, caret_of(&e.target_unchecked_into())))}
                onselect={link.callback(move |e: Event| Msg::Caret(field, caret_of(&e.target_unchecked_into())))}
                onkeyup={link.callback(move |e: KeyboardEvent| Msg::Caret(field, caret_of(&e.target_unchecked_into())))}
                onclick={link.callback(move |e: MouseEvent| Msg::Caret(field, caret_of(&e.target_unchecked_into())))}
            />
        </label>
    }
}

/// Textarea holding one list entry per line.
pub fn lines_field(label: &str, field: FieldId, value: &str, link: &Scope<EditorComponent>) -> Html {
    html! {
        <label class="field">
            <span class="field-label">{ label }<small class="muted">{" (one per line)"}</small></span>
            <textarea
                id={field_dom_id(field)}
                rows="3"
                value={value.to_string()}
                oninput={link.callback(move |e: InputEvent| {
                    Msg::SetField(field, e.target_unchecked_into::<HtmlTextAreaElement>().value())
                })}
                onfocus={link.callback(move |_: FocusEvent| Msg::Focus(field, 0))}
            />
        </label>
    }
}

fn control(icon: &str, title: &str, disabled: bool, onclick: Callback<MouseEvent>) -> Html {
    html! {
        <button type="button" class="mini-btn" title={title.to_string()} {disabled} {onclick}>
            <i class="material-icons">{ icon }</i>
        </button>
    }
}

/// Move, duplicate and remove buttons of one repeatable block.
pub fn list_controls(target: ListTarget, index: usize, len: usize, link: &Scope<EditorComponent>) -> Html {
    html! {
        <div class="item-controls">
            { control("arrow_upward", "Move up", index == 0,
                link.callback(move |_| Msg::List(target, ListOp::Move(index, Direction::Up)))) }
            { control("arrow_downward", "Move down", index + 1 >= len,
                link.callback(move |_| Msg::List(target, ListOp::Move(index, Direction::Down)))) }
            { control("content_copy", "Duplicate", false,
                link.callback(move |_| Msg::List(target, ListOp::Duplicate(index)))) }
            { control("delete", "Remove", false,
                link.callback(move |_| Msg::List(target, ListOp::Remove(index)))) }
        </div>
    }
}

pub fn add_button(target: ListTarget, label: &str, link: &Scope<EditorComponent>) -> Html {
    html! {
        <button type="button" class="add-btn" onclick={link.callback(move |_| Msg::List(target, ListOp::Add))}>
            <i class="material-icons">{"add"}</i>
            { label }
        </button>
    }
}

/// Thumbnails of an image field plus its upload controls.
///
/// Clicking the button and dropping files onto the zone go through the same
/// message. A list field takes every file, a single field the first one.
pub fn image_slot(
    label: &str,
    target: ImageTarget,
    images: &[ImageRef],
    multiple: bool,
    component: &EditorComponent,
    link: &Scope<EditorComponent>,
) -> Html {
    let thumbs = images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let thumb = component.app.thumbnail(image);
            html! {
                <figure class={classes!("thumb", thumb.pending.then_some("pending"))} title={image.to_string()}>
                    {
                        match thumb.src {
                            Some(src) => html! { <img {src} alt="" /> },
                            None => html! { <div class="thumb-missing"><i class="material-icons">{"image"}</i></div> },
                        }
                    }
                    if thumb.pending {
                        <figcaption class="badge">{"pending"}</figcaption>
                    }
                    <button
                        type="button"
                        class="mini-btn thumb-remove"
                        title="Remove image"
                        onclick={link.callback(move |_| Msg::RemoveImage(target, index))}
                    >
                        <i class="material-icons">{"close"}</i>
                    </button>
                </figure>
            }
        })
        .collect::<Html>();

    let on_choose = link.callback(move |e: Event| {
        let input = e.target_unchecked_into::<HtmlInputElement>();
        let files = files_of(input.files());
        // Lets the same file be chosen again.
        input.set_value("");
        Msg::FilesChosen(target, files)
    });
    let on_drop = link.callback(move |e: DragEvent| {
        e.prevent_default();
        Msg::FilesChosen(target, files_of(e.data_transfer().and_then(|transfer| transfer.files())))
    });
    let on_url = link.callback(move |e: Event| {
        let input = e.target_unchecked_into::<HtmlInputElement>();
        let url = input.value();
        input.set_value("");
        Msg::SetImageUrl(target, url)
    });

    html! {
        <div class="field image-slot">
            <span class="field-label">{ label }</span>
            <div
                class="drop-zone"
                ondragover={Callback::from(|e: DragEvent| e.prevent_default())}
                ondrop={on_drop}
            >
                <div class="thumbs">{ thumbs }</div>
                <label class="upload-btn">
                    <i class="material-icons">{"upload"}</i>
                    { if multiple { "Add images (or drop them here)" } else { "Choose image (or drop it here)" } }
                    <input type="file" accept="image/*" {multiple} hidden=true onchange={on_choose} />
                </label>
                <input
                    type="url"
                    class="url-input"
                    placeholder={if multiple { "Add by URL" } else { "Or paste an image URL" }}
                    onchange={on_url}
                />
            </div>
        </div>
    }
}
