//! Sliding sheet used for dialogs. Opening and closing toggle the `show`
//! class; the CSS transition does the rest.

use uuid::Uuid;
use yew::{html, Component, Context, Html, NodeRef, Properties};

const SHOWN_CLASS: &str = "show";

pub struct TopSheet {
    pub id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
}

impl Component for TopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("sheet-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="top-sheet" id={self.id.clone()} ref={ctx.props().node_ref.clone()}>
                { ctx.props().children.clone() }
            </div>
        }
    }
}

pub fn open_top_sheet(sheet_ref: &NodeRef) {
    if let Some(sheet) = sheet_ref.cast::<web_sys::HtmlElement>() {
        // Deferred so a sheet rendered in the same tick still transitions.
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(50).await;
            let _ = sheet.class_list().add_1(SHOWN_CLASS);
        });
    }
}

pub fn close_top_sheet(sheet_ref: &NodeRef) {
    if let Some(sheet) = sheet_ref.cast::<web_sys::HtmlElement>() {
        let _ = sheet.class_list().remove_1(SHOWN_CLASS);
    }
}
