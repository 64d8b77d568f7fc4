//! Admin login form.

use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::platform::StoreHandle;

#[derive(Properties, PartialEq, Clone)]
pub struct LoginProps {
    pub store: StoreHandle,
    pub on_login: Callback<()>,
}

pub enum Msg {
    SetUsername(String),
    SetPassword(String),
    Submit,
    Finished { ok: bool, message: Option<String> },
}

pub struct LoginComponent {
    username: String,
    password: String,
    busy: bool,
    error: Option<String>,
}

impl Component for LoginComponent {
    type Message = Msg;
    type Properties = LoginProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            busy: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetUsername(value) => {
                self.username = value;
                false
            }
            Msg::SetPassword(value) => {
                self.password = value;
                false
            }
            Msg::Submit => {
                if self.busy {
                    return false;
                }
                self.busy = true;
                self.error = None;

                let store = ctx.props().store.clone();
                let link = ctx.link().clone();
                let (username, password) = (self.username.clone(), self.password.clone());
                spawn_local(async move {
                    let outcome = store.login(&username, &password).await;
                    link.send_message(Msg::Finished {
                        ok: outcome.ok,
                        message: outcome.message,
                    });
                });
                true
            }
            Msg::Finished { ok, message } => {
                self.busy = false;
                if ok {
                    self.password.clear();
                    ctx.props().on_login.emit(());
                } else {
                    self.error = Some(message.unwrap_or_else(|| "Login failed".to_string()));
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <form class="login-card" {onsubmit}>
                <h2>{"Site admin"}</h2>
                <label>
                    {"Username"}
                    <input
                        type="text"
                        autocomplete="username"
                        value={self.username.clone()}
                        disabled={self.busy}
                        oninput={link.callback(|e: InputEvent| Msg::SetUsername(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                </label>
                <label>
                    {"Password"}
                    <input
                        type="password"
                        autocomplete="current-password"
                        value={self.password.clone()}
                        disabled={self.busy}
                        oninput={link.callback(|e: InputEvent| Msg::SetPassword(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                </label>
                {
                    match &self.error {
                        Some(error) => html! { <p class="form-error">{ error.clone() }</p> },
                        None => html! {},
                    }
                }
                <button type="submit" class="primary-btn" disabled={self.busy}>
                    { if self.busy { "Signing in..." } else { "Sign in" } }
                </button>
            </form>
        }
    }
}
