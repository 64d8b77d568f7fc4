//! Read-only list of registered site members.

use common::protocol::MemberSummary;
use common::CmsError;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::platform::StoreHandle;

#[derive(Properties, PartialEq, Clone)]
pub struct MembersProps {
    pub store: StoreHandle,
    pub on_session_expired: Callback<()>,
}

pub enum Msg {
    Load,
    Loaded(Result<Vec<MemberSummary>, CmsError>),
}

pub struct MembersComponent {
    members: Vec<MemberSummary>,
    loading: bool,
    error: Option<String>,
}

impl Component for MembersComponent {
    type Message = Msg;
    type Properties = MembersProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            members: Vec::new(),
            loading: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                if self.loading {
                    return false;
                }
                self.loading = true;
                self.error = None;
                let store = ctx.props().store.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    link.send_message(Msg::Loaded(store.members_list(None).await));
                });
                true
            }
            Msg::Loaded(result) => {
                self.loading = false;
                match result {
                    Ok(mut members) => {
                        members.sort_by(|a, b| a.username.cmp(&b.username));
                        self.members = members;
                    }
                    Err(err) if err.is_auth() => ctx.props().on_session_expired.emit(()),
                    Err(err) => self.error = Some(err.to_string()),
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let rows = self
            .members
            .iter()
            .map(|member| {
                html! {
                    <tr key={member.username.clone()}>
                        <td>{ member.username.clone() }</td>
                        <td>{ member.email.clone() }</td>
                        <td>{ member.role.clone() }</td>
                    </tr>
                }
            })
            .collect::<Html>();

        html! {
            <section class="members-panel">
                <div class="section-header">
                    <h2>{ format!("Members ({})", self.members.len()) }</h2>
                    <button class="icon-btn" disabled={self.loading} onclick={ctx.link().callback(|_| Msg::Load)}>
                        <i class="material-icons">{"refresh"}</i>
                        <span class="icon-label">{"Refresh"}</span>
                    </button>
                </div>
                {
                    match &self.error {
                        Some(error) => html! { <p class="form-error">{ error.clone() }</p> },
                        None => html! {},
                    }
                }
                if self.loading {
                    <p class="muted">{"Loading..."}</p>
                }
                <table class="members-table">
                    <thead>
                        <tr><th>{"Username"}</th><th>{"Email"}</th><th>{"Role"}</th></tr>
                    </thead>
                    <tbody>{ rows }</tbody>
                </table>
            </section>
        }
    }
}
