//! Content editor: root module wiring the Yew `Component` implementation
//! with submodules for state, update logic, views, and helpers.
//!
//! Responsibilities
//! - Re-export `Msg`, `EditorProps` and `EditorComponent`.
//! - Provide the `Component` implementation that delegates to `update::update`
//!   and `view::view`.
//! - On first render, load the initially selected dataset.

use yew::prelude::*;

mod about_view;
pub mod helpers;
mod link_dialog;
mod messages;
mod props;
mod providers_view;
mod site_view;
mod state;
mod update;
mod view;
mod widgets;

pub use messages::Msg;
pub use props::EditorProps;
pub use state::EditorComponent;

impl Component for EditorComponent {
    type Message = Msg;
    type Properties = EditorProps;

    fn create(_ctx: &Context<Self>) -> Self {
        EditorComponent::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            ctx.link().send_message(Msg::SelectDataset(self.dataset));
        }
    }
}
