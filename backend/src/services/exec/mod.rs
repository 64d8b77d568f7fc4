//! # Action endpoint
//!
//! Mirrors the content backend's single-URL protocol. The operation is picked
//! by the `action` query parameter:
//!
//! *   **`GET /exec?action=data&key=..&v=..`**: public read of a published
//!     document. Answers `notModified` when `v` matches the published version.
//! *   **`GET /exec?action=version`**: published version of every dataset.
//! *   **`POST /exec?action=..`**: every other action. The body is JSON sent
//!     as `text/plain` and carries the session token where one is needed.
//!
//! Every answer is `200 OK` with an `{ok, message?, ...}` envelope, the way
//! the real backend reports failures.

mod datasets;
mod members;
mod uploads;

#[cfg(test)]
mod tests;

use std::str::FromStr;

use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Scope};
use common::protocol::Action;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::StubState;

const API_PATH: &str = "/exec";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(process_get))
        .route("", post().to(process_post))
}

#[derive(Debug, Deserialize)]
pub struct ExecQuery {
    action: Option<String>,
    key: Option<String>,
    v: Option<String>,
}

pub async fn process_get(query: web::Query<ExecQuery>, state: web::Data<StubState>) -> HttpResponse {
    let query = query.into_inner();
    run(state, move |state| match parse_action(query.action.as_deref())? {
        Action::Data => datasets::data(state, query.key.as_deref(), query.v.as_deref()),
        Action::Version => datasets::versions(state),
        other => Err(format!("Action {other} must be sent as POST")),
    })
    .await
}

pub async fn process_post(query: web::Query<ExecQuery>, body: String, state: web::Data<StubState>) -> HttpResponse {
    let action = query.into_inner().action;
    run(state, move |state| {
        let action = parse_action(action.as_deref())?;
        if action.is_get() {
            return Err(format!("Action {action} must be sent as GET"));
        }
        let body: Value = serde_json::from_str(&body).map_err(|e| format!("Invalid JSON body: {e}"))?;
        dispatch(state, action, body)
    })
    .await
}

fn parse_action(action: Option<&str>) -> Result<Action, String> {
    let action = action.ok_or("Missing action")?;
    Action::from_str(action).map_err(|e| e.to_string())
}

fn dispatch(state: &StubState, action: Action, body: Value) -> Result<Value, String> {
    debug!("POST action={action}");
    match action {
        Action::Login => members::login(state, parse(body)?),
        Action::MemberLogin => members::member_login(state, parse(body)?),
        Action::MemberRegister => members::member_register(state, parse(body)?),
        Action::MemberForgot => members::member_forgot(state, parse(body)?),
        Action::MemberChangePassword => members::change_password(state, parse(body)?),
        Action::ProfileRead => members::profile_read(state, parse(body)?),
        Action::ProfileUpdate => members::profile_update(state, parse(body)?),
        Action::MembersList => members::members_list(state, parse(body)?),
        Action::UploadImage => uploads::upload_image(state, parse(body)?),
        Action::Read => datasets::read(state, parse(body)?),
        Action::Update => datasets::update(state, parse(body)?),
        Action::SavePublish => datasets::save_publish(state, parse(body)?),
        Action::Publish => datasets::publish(state, parse(body)?),
        Action::Data | Action::Version => Err(format!("Action {action} must be sent as GET")),
    }
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, String> {
    serde_json::from_value(body).map_err(|e| format!("Invalid request: {e}"))
}

/// Runs an action on the blocking pool; SQLite calls are synchronous.
async fn run<F>(state: web::Data<StubState>, job: F) -> HttpResponse
where
    F: FnOnce(&StubState) -> Result<Value, String> + Send + 'static,
{
    let state = state.get_ref().clone();
    let result = tokio::task::spawn_blocking(move || job(&state))
        .await
        .unwrap_or_else(|e| Err(format!("Action failed: {e}")));
    envelope(result)
}

/// Wraps an action result in the `{ok, message}` envelope. Results that set
/// `ok` themselves keep it.
fn envelope(result: Result<Value, String>) -> HttpResponse {
    let body = match result {
        Ok(Value::Object(mut map)) => {
            map.entry("ok").or_insert(Value::Bool(true));
            Value::Object(map)
        }
        Ok(other) => json!({ "ok": true, "data": other }),
        Err(message) => {
            warn!("Action rejected: {message}");
            json!({ "ok": false, "message": message })
        }
    };
    HttpResponse::Ok().json(body)
}
