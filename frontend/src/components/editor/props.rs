//! Properties for the `EditorComponent`.

use yew::prelude::*;

use crate::platform::StoreHandle;

#[derive(Properties, PartialEq, Clone)]
pub struct EditorProps {
    /// Remote store shared with the rest of the admin.
    pub store: StoreHandle,

    /// Called when the backend rejects the session token. The parent logs out
    /// and shows the login form; the editor keeps its in-memory edits.
    pub on_session_expired: Callback<()>,
}
