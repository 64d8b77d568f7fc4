//! Wire format of the content backend.
//!
//! One endpoint, the operation chosen by the `action` query parameter. Writes
//! are `POST` with a `text/plain` body holding JSON; `data` and `version` are
//! `GET` with query parameters. Every response is an envelope
//! `{ok: boolean, message?: string, ...}`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CmsError, Result};
use crate::model::{DatasetKey, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    MemberLogin,
    MemberRegister,
    MemberForgot,
    MemberChangePassword,
    ProfileRead,
    ProfileUpdate,
    MembersList,
    UploadImage,
    Read,
    Update,
    SavePublish,
    Publish,
    Data,
    Version,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::Login,
        Action::MemberLogin,
        Action::MemberRegister,
        Action::MemberForgot,
        Action::MemberChangePassword,
        Action::ProfileRead,
        Action::ProfileUpdate,
        Action::MembersList,
        Action::UploadImage,
        Action::Read,
        Action::Update,
        Action::SavePublish,
        Action::Publish,
        Action::Data,
        Action::Version,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::MemberLogin => "memberLogin",
            Action::MemberRegister => "memberRegister",
            Action::MemberForgot => "memberForgot",
            Action::MemberChangePassword => "memberChangePassword",
            Action::ProfileRead => "profileRead",
            Action::ProfileUpdate => "profileUpdate",
            Action::MembersList => "membersList",
            Action::UploadImage => "uploadImage",
            Action::Read => "read",
            Action::Update => "update",
            Action::SavePublish => "savePublish",
            Action::Publish => "publish",
            Action::Data => "data",
            Action::Version => "version",
        }
    }

    /// `data` and `version` are public reads sent as `GET`.
    pub fn is_get(self) -> bool {
        matches!(self, Action::Data | Action::Version)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CmsError::Rejected(format!("Unknown action: {s}")))
    }
}

// Requests

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_code: Option<String>,
}

/// Either field identifies the account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberForgotRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub token: String,
    pub current: String,
    #[serde(rename = "new")]
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReadRequest {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdateRequest {
    pub token: String,
    pub username: String,
    pub profile: Value,
}

/// Body of actions that only need the session token (`membersList`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    pub token: String,
    pub data_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub key: DatasetKey,
    pub token: String,
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub key: DatasetKey,
    pub data: Value,
    pub token: String,
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePublishRequest {
    pub key: DatasetKey,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<DatasetKey>>,
    pub token: String,
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub token: String,
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<DatasetKey>>,
}

// Responses

/// The `{ok, message}` part every response carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Present when the update result is nested inside `savePublish`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<Version>,
}

/// `publishOk` is defined by the backend; absent means not published.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePublishResponse {
    #[serde(default)]
    pub update: Option<UpdateResponse>,
    #[serde(default)]
    pub publish_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadImageResponse {
    pub id: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    #[serde(default)]
    pub not_modified: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionsResponse {
    #[serde(default)]
    pub versions: BTreeMap<String, Version>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MembersResponse {
    #[serde(default)]
    pub users: Vec<MemberSummary>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSummary {
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Empty success body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ack {}

/// Raw HTTP result handed back by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Checks the status code and the envelope, then decodes the body.
pub fn open<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let value = open_value(response)?;
    Ok(serde_json::from_value(value)?)
}

/// Like [`open`] but keeps the envelope as raw JSON.
pub fn open_value(response: HttpResponse) -> Result<Value> {
    check(parse_body(response)?)
}

/// Checks the status code and parses the body, without looking at `ok`.
pub fn parse_body(response: HttpResponse) -> Result<Value> {
    match response.status {
        200..=299 => {}
        401 | 403 => {
            return Err(CmsError::Unauthorized(format!("HTTP {}", response.status)));
        }
        status => return Err(CmsError::Http { status }),
    }
    Ok(serde_json::from_str(&response.body)?)
}

/// Fails on `{ok: false}` envelopes.
pub fn check(value: Value) -> Result<Value> {
    let status: Status = serde_json::from_value(value.clone())?;
    if !status.ok {
        return Err(rejection(status.message));
    }
    Ok(value)
}

/// Maps a backend refusal to an error, recognizing session problems.
pub fn rejection(message: Option<String>) -> CmsError {
    let message = message.unwrap_or_else(|| "Request failed".to_string());
    let lower = message.to_lowercase();
    if lower.contains("token") || lower.contains("unauthorized") || lower.contains("not logged in") {
        CmsError::Unauthorized(message)
    } else {
        CmsError::Rejected(message)
    }
}
