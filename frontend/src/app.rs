use yew::{classes, html, Component, Context, Html};

use crate::components::editor::EditorComponent;
use crate::components::editor::helpers::show_toast;
use crate::components::login::LoginComponent;
use crate::components::members::MembersComponent;
use crate::config;
use crate::platform::{self, StoreHandle};

#[derive(Clone, Copy, PartialEq)]
pub enum View {
    Editor,
    Members,
}

pub enum Msg {
    LoggedIn,
    Logout,
    /// The backend rejected the session token.
    SessionExpired,
    Show(View),
}

/// Where the admin session stands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Session {
    SignedOut,
    Active,
    /// The backend rejected the token. The editor stays mounted behind the
    /// login form so unsaved edits are still there after logging back in.
    Expired,
}

impl Session {
    fn after(self, msg: &Msg) -> Self {
        match msg {
            Msg::LoggedIn => Session::Active,
            Msg::Logout => Session::SignedOut,
            Msg::SessionExpired if self == Session::Active => Session::Expired,
            _ => self,
        }
    }

    fn shows_login(self) -> bool {
        self != Session::Active
    }

    fn keeps_editor(self) -> bool {
        self != Session::SignedOut
    }
}

pub struct App {
    store: StoreHandle,
    session: Session,
    view: View,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let store = StoreHandle::connect(config::endpoint());
        let session = if store.is_logged_in() {
            Session::Active
        } else {
            Session::SignedOut
        };
        Self {
            store,
            session,
            view: View::Editor,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match &msg {
            Msg::LoggedIn => {
                if self.session == Session::SignedOut {
                    self.view = View::Editor;
                }
            }
            Msg::Logout => {
                if platform::is_dirty() && !platform::confirm("Discard unsaved changes and log out?") {
                    return false;
                }
                self.store.logout();
            }
            Msg::SessionExpired => {
                if self.session != Session::Active {
                    return false;
                }
                self.store.logout();
                show_toast("Your session has expired. Log in again to keep your changes.");
            }
            Msg::Show(view) => self.view = *view,
        }
        self.session = self.session.after(&msg);
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        if !self.store.is_configured() {
            return html! {
                <div class="config-banner">
                    <h2>{"Backend not configured"}</h2>
                    <p>
                        {"Add "}<code>{"<meta name=\"cms-endpoint\" content=\"https://...\">"}</code>
                        {" to the admin page, or build with SITE_CMS_ENDPOINT set."}
                    </p>
                </div>
            };
        }
        let login = html! {
            <LoginComponent store={self.store.clone()} on_login={link.callback(|_| Msg::LoggedIn)} />
        };
        if !self.session.keeps_editor() {
            return login;
        }
        let locked = self.session.shows_login();

        let tab = |view: View, label: &'static str| {
            html! {
                <button
                    class={classes!("tab-btn", (self.view == view).then_some("active"))}
                    onclick={link.callback(move |_| Msg::Show(view))}
                >
                    { label }
                </button>
            }
        };
        html! {
            <>
            { if locked { login } else { html! {} } }
            <div class="admin-root" hidden={locked}>
                <header class="admin-header">
                    { tab(View::Editor, "Content") }
                    { tab(View::Members, "Members") }
                    <span class="admin-role">{ self.store.role().unwrap_or_default() }</span>
                    <button class="icon-btn" onclick={link.callback(|_| Msg::Logout)}>
                        <i class="material-icons">{"logout"}</i>
                        <span class="icon-label">{"Log out"}</span>
                    </button>
                </header>
                // The editor stays mounted so unsaved edits survive a visit to Members.
                <div hidden={self.view != View::Editor}>
                    <EditorComponent
                        store={self.store.clone()}
                        on_session_expired={link.callback(|_| Msg::SessionExpired)}
                    />
                </div>
                {
                    if self.view == View::Members {
                        html! {
                            <MembersComponent
                                store={self.store.clone()}
                                on_session_expired={link.callback(|_| Msg::SessionExpired)}
                            />
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
            </>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_outlives_an_expired_session() {
        let session = Session::SignedOut.after(&Msg::LoggedIn);
        assert_eq!(session, Session::Active);
        assert!(!session.shows_login());

        let expired = session.after(&Msg::SessionExpired);
        assert_eq!(expired, Session::Expired);
        assert!(expired.shows_login());
        assert!(expired.keeps_editor());
        assert_eq!(expired.after(&Msg::Show(View::Members)), Session::Expired);

        assert_eq!(expired.after(&Msg::LoggedIn), Session::Active);
    }

    #[test]
    fn logout_and_late_expiry_drop_the_editor() {
        assert!(!Session::Active.after(&Msg::Logout).keeps_editor());
        assert!(!Session::Expired.after(&Msg::Logout).keeps_editor());
        assert_eq!(Session::SignedOut.after(&Msg::SessionExpired), Session::SignedOut);
    }
}
