use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

use crate::components::top_sheet::TopSheet;

use super::messages::Msg;
use super::state::EditorComponent;

/// Sheet asking for the URL and label of a link inserted at the caret.
pub fn link_dialog(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let onsubmit = link.callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::InsertLink
    });

    html! {
        <TopSheet node_ref={component.link_dialog_ref.clone()}>
            <form class="sheet-card" {onsubmit}>
                <h3>{"Insert link"}</h3>
                <label class="field">
                    <span class="field-label">{"Address"}</span>
                    <input
                        type="text"
                        placeholder="https://... , mailto:... or /page.html"
                        value={component.link_url.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::SetLinkUrl(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                </label>
                <label class="field">
                    <span class="field-label">{"Text"}</span>
                    <input
                        type="text"
                        placeholder="Defaults to the address"
                        value={component.link_label.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::SetLinkLabel(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                </label>
                <div class="sheet-actions">
                    <button type="button" class="icon-btn" onclick={link.callback(|_| Msg::CloseLinkDialog)}>
                        {"Cancel"}
                    </button>
                    <button type="submit" class="primary-btn">{"Insert"}</button>
                </div>
            </form>
        </TopSheet>
    }
}
