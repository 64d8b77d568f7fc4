//! Remote store client.
//!
//! `RemoteStore` is the single chokepoint for every call to the content
//! backend. It owns the session token, the version cache and the retained
//! public snapshots, and turns every failure into a [`CmsError`] so callers
//! never see a panic or an unhandled rejection.
//!
//! Calls are not queued or serialized: two saves issued back to back race at
//! the server and the caller sees whichever response arrives last. There is
//! no locking between tabs or users either; the last save wins at the backend.

pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use base64::{engine::general_purpose, Engine as _};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CmsError, Result};
use crate::model::{DatasetKey, ImageRef, Version};
use crate::protocol::{
    self, Ack, Action, ChangePasswordRequest, DataResponse, LoginRequest, LoginResponse,
    MemberForgotRequest, MemberRegisterRequest, MemberSummary, MembersResponse, ProfileReadRequest,
    ProfileResponse, ProfileUpdateRequest, PublishRequest, PublishResponse, ReadRequest,
    ReadResponse, SavePublishRequest, SavePublishResponse, Status, TokenRequest, UpdateRequest,
    UpdateResponse, UploadImageRequest, UploadImageResponse, VersionsResponse,
};
use crate::storage::{KeyValueStore, ADMIN_ROLE_KEY, ADMIN_TOKEN_KEY};
use crate::version_cache::VersionCache;

pub use transport::{Query, Transport};

/// Result of [`RemoteStore::login`]. Login never fails with an error; the
/// reason is carried in `message`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginOutcome {
    pub ok: bool,
    pub token: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveOutcome {
    pub version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishOutcome {
    /// Whatever the backend returned besides `ok`.
    pub details: Map<String, Value>,
}

/// Result of a combined save-and-publish whose save step succeeded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavePublishOutcome {
    pub update: SaveOutcome,
    pub publish_ok: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    /// Stored and publicly visible.
    Published,
    /// Stored as a draft; the public site still shows the previous version.
    SavedNotPublished,
}

impl SavePublishOutcome {
    pub fn status(&self) -> PublishState {
        if self.publish_ok {
            PublishState::Published
        } else {
            PublishState::SavedNotPublished
        }
    }
}

/// An image accepted by the backend but not yet published.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    /// Always `ImageRef::Pending`.
    pub placeholder: ImageRef,
    /// `data:` URI of the uploaded bytes, used for local thumbnails.
    pub preview_data_url: String,
}

pub struct RemoteStore<T: Transport> {
    endpoint: Option<String>,
    transport: T,
    session: Rc<dyn KeyValueStore>,
    versions: VersionCache,
    retained: RefCell<HashMap<DatasetKey, Rc<Value>>>,
    listeners: RefCell<Vec<Box<dyn Fn(DatasetKey)>>>,
}

impl<T: Transport> RemoteStore<T> {
    /// `local` persists the version cache and snapshots across reloads;
    /// `session` holds the admin token and is cleared on logout.
    pub fn new(
        endpoint: Option<String>,
        transport: T,
        local: Rc<dyn KeyValueStore>,
        session: Rc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            endpoint: endpoint.filter(|url| !url.trim().is_empty()),
            transport,
            session,
            versions: VersionCache::new(local),
            retained: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint.as_deref().ok_or(CmsError::Config)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn versions(&self) -> &VersionCache {
        &self.versions
    }

    /// Registers a listener called with the key of every dataset changed
    /// through this client.
    pub fn subscribe(&self, listener: impl Fn(DatasetKey) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self, key: DatasetKey) {
        for listener in self.listeners.borrow().iter() {
            listener(key);
        }
    }

    pub fn token(&self) -> Option<String> {
        self.session.get(ADMIN_TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn role(&self) -> Option<String> {
        self.session.get(ADMIN_ROLE_KEY)
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    fn require_token(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .or_else(|| self.token())
            .ok_or(CmsError::NotLoggedIn)
    }

    /// Cache-busting request nonce. Not a security token.
    pub fn nonce(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.transport.now_millis(), &suffix[..8])
    }

    /// POSTs `body` and returns the parsed JSON without checking `ok`.
    async fn send<Req: Serialize>(&self, action: Action, body: &Req) -> Result<Value> {
        let endpoint = self.endpoint()?;
        let payload = serde_json::to_string(body)?;
        debug!("POST action={action}");
        let response = self
            .transport
            .post(endpoint, &[("action", action.as_str().to_string())], payload)
            .await
            .map_err(CmsError::Transport)?;
        protocol::parse_body(response)
    }

    async fn call<Req: Serialize, Resp: DeserializeOwned>(&self, action: Action, body: &Req) -> Result<Resp> {
        let value = protocol::check(self.send(action, body).await?)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get<Resp: DeserializeOwned>(&self, action: Action, params: &[(&str, String)]) -> Result<Resp> {
        let endpoint = self.endpoint()?;
        let mut query = vec![("action", action.as_str().to_string())];
        query.extend(params.iter().cloned());
        debug!("GET action={action}");
        let response = self
            .transport
            .get(endpoint, &query)
            .await
            .map_err(CmsError::Transport)?;
        protocol::open(response)
    }

    // Session

    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        if username.trim().is_empty() || password.is_empty() {
            return LoginOutcome {
                message: Some("Enter a username and a password".to_string()),
                ..LoginOutcome::default()
            };
        }

        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        match self.call::<_, LoginResponse>(Action::Login, &request).await {
            Ok(response) => {
                if let Err(err) = self.session.set(ADMIN_TOKEN_KEY, &response.token) {
                    warn!("Could not persist session token: {err}");
                }
                match &response.role {
                    Some(role) => {
                        if let Err(err) = self.session.set(ADMIN_ROLE_KEY, role) {
                            warn!("Could not persist session role: {err}");
                        }
                    }
                    None => self.session.remove(ADMIN_ROLE_KEY),
                }
                info!("Logged in as {}", request.username);
                LoginOutcome {
                    ok: true,
                    token: Some(response.token),
                    role: response.role,
                    message: None,
                }
            }
            Err(err) => LoginOutcome {
                message: Some(err.to_string()),
                ..LoginOutcome::default()
            },
        }
    }

    pub fn logout(&self) {
        self.session.remove(ADMIN_TOKEN_KEY);
        self.session.remove(ADMIN_ROLE_KEY);
    }

    // Datasets

    /// Authenticated read of the stored (draft) document.
    pub async fn secure_read(&self, key: DatasetKey, token: Option<&str>) -> Result<ReadResponse> {
        let token = self.require_token(token)?;
        let request = ReadRequest {
            key,
            token,
            nonce: self.nonce(),
        };
        self.call(Action::Read, &request).await
    }

    /// Public read of the published document.
    ///
    /// Sends the cached version so the server can answer "not modified", in
    /// which case the retained value is returned as is (same `Rc`). The
    /// version is only sent while a retained copy exists.
    pub async fn fetch_data(&self, key: DatasetKey) -> Result<Rc<Value>> {
        let retained = self.retained(key);
        let mut params = vec![("key", key.as_str().to_string())];
        if retained.is_some() {
            if let Some(version) = self.versions.get(key) {
                params.push(("v", version.to_string()));
            }
        }

        let response: DataResponse = self.get(Action::Data, &params).await?;
        if response.not_modified {
            return retained.ok_or_else(|| {
                CmsError::Decode(format!("{key} reported as not modified without a cached copy"))
            });
        }

        let value = Rc::new(response.data.unwrap_or(Value::Null));
        match response.version {
            Some(version) => self.versions.set(key, version),
            None => self.versions.invalidate(key),
        }
        self.retain(key, value.clone());
        Ok(value)
    }

    /// Fetches the server's version map and drops retained copies that are
    /// out of date, so the following `fetch_data` cannot be answered with a
    /// stale "not modified".
    pub async fn fetch_versions(&self) -> Result<BTreeMap<String, Version>> {
        let response: VersionsResponse = self.get(Action::Version, &[]).await?;
        let cached = self.versions.all();
        for (name, version) in &response.versions {
            if cached.get(name) != Some(version) {
                if let Ok(key) = name.parse::<DatasetKey>() {
                    self.forget(key);
                }
            }
        }
        self.versions.merge(response.versions.clone());
        Ok(response.versions)
    }

    /// Replaces the whole stored document.
    pub async fn update(&self, key: DatasetKey, data: Value, token: Option<&str>) -> Result<SaveOutcome> {
        let token = self.require_token(token)?;
        let request = UpdateRequest {
            key,
            data,
            token,
            nonce: self.nonce(),
        };
        let response: UpdateResponse = self.call(Action::Update, &request).await?;
        self.saved(key, response.version.clone());
        Ok(SaveOutcome {
            version: response.version,
        })
    }

    /// Promotes saved drafts to the public site. `None` publishes every key.
    pub async fn publish(&self, keys: Option<Vec<DatasetKey>>, token: Option<&str>) -> Result<PublishOutcome> {
        let token = self.require_token(token)?;
        let request = PublishRequest {
            token,
            nonce: self.nonce(),
            keys: keys.clone(),
        };
        let response: PublishResponse = self.call(Action::Publish, &request).await?;
        for key in keys.unwrap_or_else(|| DatasetKey::ALL.to_vec()) {
            self.forget(key);
            self.notify(key);
        }
        Ok(PublishOutcome {
            details: response.details,
        })
    }

    /// Saves and publishes in one round-trip.
    ///
    /// A failed save is an error and leaves the version cache alone. A save
    /// that succeeded while the publish step did not is `Ok` with
    /// [`PublishState::SavedNotPublished`].
    pub async fn save_publish(
        &self,
        key: DatasetKey,
        data: Value,
        keys: Option<Vec<DatasetKey>>,
        token: Option<&str>,
    ) -> Result<SavePublishOutcome> {
        let token = self.require_token(token)?;
        let request = SavePublishRequest {
            key,
            data,
            keys,
            token,
            nonce: self.nonce(),
        };
        let value = self.send(Action::SavePublish, &request).await?;
        let status: Status = serde_json::from_value(value.clone())?;
        let response: SavePublishResponse = serde_json::from_value(value)?;

        let update = match response.update {
            Some(update) if update.ok.unwrap_or(status.ok || update.version.is_some()) => update,
            Some(update) => return Err(protocol::rejection(update.message.or(status.message))),
            None => return Err(protocol::rejection(status.message)),
        };

        self.saved(key, update.version.clone());
        let message = status.message.or(update.message);
        if !response.publish_ok {
            warn!("{key} saved but not published: {}", message.as_deref().unwrap_or("no reason given"));
        }
        Ok(SavePublishOutcome {
            update: SaveOutcome {
                version: update.version,
            },
            publish_ok: response.publish_ok,
            message,
        })
    }

    fn saved(&self, key: DatasetKey, version: Option<Version>) {
        self.forget(key);
        match version {
            Some(version) => self.versions.set(key, version),
            None => self.versions.invalidate(key),
        }
        self.notify(key);
    }

    fn retained(&self, key: DatasetKey) -> Option<Rc<Value>> {
        if let Some(value) = self.retained.borrow().get(&key) {
            return Some(value.clone());
        }
        let value = Rc::new(self.versions.snapshot(key)?);
        self.retained.borrow_mut().insert(key, value.clone());
        Some(value)
    }

    fn retain(&self, key: DatasetKey, value: Rc<Value>) {
        self.versions.store_snapshot(key, &value);
        self.retained.borrow_mut().insert(key, value);
    }

    fn forget(&self, key: DatasetKey) {
        self.retained.borrow_mut().remove(&key);
        self.versions.drop_snapshot(key);
    }

    // Images

    /// Uploads an image and returns its placeholder plus a local preview.
    pub async fn upload_image(
        &self,
        bytes: &[u8],
        filename: &str,
        mime: &str,
        token: Option<&str>,
    ) -> Result<UploadedImage> {
        if bytes.is_empty() {
            return Err(CmsError::validation(format!("{filename} is empty")));
        }
        let token = self.require_token(token)?;
        let data_url = data_url(mime, bytes);
        let request = UploadImageRequest {
            token,
            data_url: data_url.clone(),
            filename: sanitize_filename(filename),
        };
        let response: UploadImageResponse = self.call(Action::UploadImage, &request).await?;
        let filename = sanitize_filename(&response.filename);
        Ok(UploadedImage {
            placeholder: ImageRef::pending(response.id, filename),
            preview_data_url: data_url,
        })
    }

    // Members

    pub async fn member_login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        self.call(Action::MemberLogin, &request).await
    }

    pub async fn member_register(&self, request: &MemberRegisterRequest) -> Result<LoginResponse> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(CmsError::validation("Username and password are required"));
        }
        self.call(Action::MemberRegister, request).await
    }

    /// The response body is backend-defined and returned untouched.
    pub async fn member_forgot(&self, request: &MemberForgotRequest) -> Result<Value> {
        if request.username.is_none() && request.email.is_none() {
            return Err(CmsError::validation("Enter a username or an email"));
        }
        self.call(Action::MemberForgot, request).await
    }

    pub async fn member_change_password(&self, current: &str, new_password: &str, token: Option<&str>) -> Result<()> {
        let request = ChangePasswordRequest {
            token: self.require_token(token)?,
            current: current.to_string(),
            new_password: new_password.to_string(),
        };
        self.call::<_, Ack>(Action::MemberChangePassword, &request).await?;
        Ok(())
    }

    pub async fn profile_read(&self, username: &str, token: Option<&str>) -> Result<Value> {
        let request = ProfileReadRequest {
            token: self.require_token(token)?,
            username: username.to_string(),
        };
        let response: ProfileResponse = self.call(Action::ProfileRead, &request).await?;
        Ok(response.profile)
    }

    pub async fn profile_update(&self, username: &str, profile: Value, token: Option<&str>) -> Result<()> {
        let request = ProfileUpdateRequest {
            token: self.require_token(token)?,
            username: username.to_string(),
            profile,
        };
        self.call::<_, Ack>(Action::ProfileUpdate, &request).await?;
        Ok(())
    }

    pub async fn members_list(&self, token: Option<&str>) -> Result<Vec<MemberSummary>> {
        let request = TokenRequest {
            token: self.require_token(token)?,
        };
        let response: MembersResponse = self.call(Action::MembersList, &request).await?;
        Ok(response.users)
    }
}

/// Encodes bytes as a `data:` URI.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    let mime = if mime.trim().is_empty() {
        "application/octet-stream"
    } else {
        mime
    };
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

/// Keeps a filename usable as the last segment of a placeholder.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use crate::model::{Dataset, Providers};
    use crate::storage::MemoryStore;
    use crate::version_cache::VERSION_STORAGE_KEY;
    use serde_json::json;
    use tokio_test::block_on;

    struct Fixture {
        store: RemoteStore<MockTransport>,
        local: Rc<MemoryStore>,
        session: Rc<MemoryStore>,
    }

    fn fixture() -> Fixture {
        let local = Rc::new(MemoryStore::new());
        let session = Rc::new(MemoryStore::new());
        let store = RemoteStore::new(
            Some("https://script.example/exec".into()),
            MockTransport::new(),
            local.clone(),
            session.clone(),
        );
        Fixture { store, local, session }
    }

    fn logged_in() -> Fixture {
        let f = fixture();
        f.session.set(ADMIN_TOKEN_KEY, "tok").unwrap();
        f
    }

    #[test]
    fn login_stores_token_in_session_scope() {
        let f = fixture();
        f.store.transport().reply(json!({"ok": true, "token": "abc", "role": "admin"}));

        let outcome = block_on(f.store.login("admin", "secret"));

        assert!(outcome.ok);
        assert_eq!(f.session.get(ADMIN_TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(f.store.role().as_deref(), Some("admin"));
        let request = f.store.transport().last();
        assert_eq!(request.param("action"), Some("login"));
        assert_eq!(request.body.unwrap()["username"], "admin");

        f.store.logout();
        assert!(!f.store.is_logged_in());
    }

    /// Session storage that refuses to keep the role, as a full quota would.
    #[derive(Default)]
    struct RoleRefusingStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for RoleRefusingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == ADMIN_ROLE_KEY {
                return Err(CmsError::Storage("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) {
            self.inner.remove(key)
        }
    }

    #[test]
    fn login_survives_a_role_that_cannot_be_stored() {
        let session = Rc::new(RoleRefusingStore::default());
        let store = RemoteStore::new(
            Some("https://script.example/exec".into()),
            MockTransport::new(),
            Rc::new(MemoryStore::new()),
            session.clone(),
        );
        store.transport().reply(json!({"ok": true, "token": "abc", "role": "admin"}));

        let outcome = block_on(store.login("admin", "secret"));

        assert!(outcome.ok);
        assert_eq!(outcome.role.as_deref(), Some("admin"));
        assert!(store.is_logged_in());
        assert_eq!(session.get(ADMIN_TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(session.get(ADMIN_ROLE_KEY), None);
    }

    #[test]
    fn failed_login_returns_message() {
        let f = fixture();
        f.store.transport().reply(json!({"ok": false, "message": "Wrong password"}));
        let outcome = block_on(f.store.login("admin", "bad"));
        assert!(!outcome.ok);
        assert_eq!(outcome.message.as_deref(), Some("Wrong password"));
        assert!(f.session.is_empty());

        f.store.transport().fail("offline");
        let outcome = block_on(f.store.login("admin", "bad"));
        assert!(outcome.message.unwrap().contains("offline"));
    }

    #[test]
    fn missing_endpoint_short_circuits() {
        let store = RemoteStore::new(
            Some("  ".into()),
            MockTransport::new(),
            Rc::new(MemoryStore::new()),
            Rc::new(MemoryStore::new()),
        );
        assert!(!store.is_configured());
        assert_eq!(block_on(store.fetch_data(DatasetKey::Providers)).unwrap_err(), CmsError::Config);
        assert_eq!(store.transport().request_count(), 0);
    }

    #[test]
    fn secure_read_without_token_fails_locally() {
        let f = fixture();
        let err = block_on(f.store.secure_read(DatasetKey::AboutContent, None)).unwrap_err();
        assert_eq!(err, CmsError::NotLoggedIn);
        assert_eq!(f.store.transport().request_count(), 0);
    }

    #[test]
    fn secure_read_sends_key_token_and_nonce() {
        let f = logged_in();
        f.store.transport().reply(json!({
            "ok": true, "data": {"heroTitle": "Hi"}, "version": 3, "updatedAt": "2026-01-01", "hasData": true
        }));

        let read = block_on(f.store.secure_read(DatasetKey::AboutContent, None)).unwrap();

        assert!(read.has_data);
        assert_eq!(read.version, Some(Version::new("3")));
        let body = f.store.transport().last().body.unwrap();
        assert_eq!(body["key"], "aboutContent");
        assert_eq!(body["token"], "tok");
        assert!(body["nonce"].as_str().unwrap().starts_with("1700000000000-"));
    }

    #[test]
    fn fetch_data_reuses_value_when_not_modified() {
        let f = fixture();
        let transport = f.store.transport();
        transport.reply(json!({"ok": true, "data": {"p1": {"name": "One"}}, "version": 7}));
        transport.reply(json!({"ok": true, "notModified": true, "version": 7}));

        let first = block_on(f.store.fetch_data(DatasetKey::Providers)).unwrap();
        assert_eq!(transport.last().param("v"), None);

        let second = block_on(f.store.fetch_data(DatasetKey::Providers)).unwrap();
        assert_eq!(transport.last().param("v"), Some("7"));
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(*second, json!({"p1": {"name": "One"}}));
    }

    #[test]
    fn snapshot_survives_reload() {
        let f = fixture();
        f.store.transport().reply(json!({"ok": true, "data": {"a": 1}, "version": "v1"}));
        block_on(f.store.fetch_data(DatasetKey::SiteContent)).unwrap();

        let reloaded = RemoteStore::new(
            Some("https://script.example/exec".into()),
            MockTransport::new(),
            f.local.clone(),
            Rc::new(MemoryStore::new()),
        );
        reloaded.transport().reply(json!({"ok": true, "notModified": true}));
        let value = block_on(reloaded.fetch_data(DatasetKey::SiteContent)).unwrap();
        assert_eq!(reloaded.transport().last().param("v"), Some("v1"));
        assert_eq!(*value, json!({"a": 1}));
    }

    #[test]
    fn changed_server_version_drops_retained_copy() {
        let f = fixture();
        let transport = f.store.transport();
        transport.reply(json!({"ok": true, "data": {"old": true}, "version": 1}));
        block_on(f.store.fetch_data(DatasetKey::Providers)).unwrap();

        transport.reply(json!({"ok": true, "versions": {"providers": 2, "aboutContent": 5}}));
        block_on(f.store.fetch_versions()).unwrap();

        transport.reply(json!({"ok": true, "data": {"new": true}, "version": 2}));
        let value = block_on(f.store.fetch_data(DatasetKey::Providers)).unwrap();
        assert_eq!(transport.last().param("v"), None);
        assert_eq!(*value, json!({"new": true}));
        assert_eq!(f.store.versions().get(DatasetKey::AboutContent), Some(Version::new("5")));
    }

    #[test]
    fn update_records_version_and_notifies() {
        let f = logged_in();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        f.store.subscribe(move |key| sink.borrow_mut().push(key));
        f.local.set(VERSION_STORAGE_KEY, r#"{"aboutContent":"1"}"#).unwrap();
        f.store.transport().reply(json!({"ok": true, "version": 12}));

        let outcome = block_on(f.store.update(DatasetKey::Providers, json!({}), None)).unwrap();

        assert_eq!(outcome.version, Some(Version::new("12")));
        assert_eq!(f.store.versions().get(DatasetKey::Providers), Some(Version::new("12")));
        assert_eq!(f.store.versions().get(DatasetKey::AboutContent), Some(Version::new("1")));
        assert_eq!(*seen.borrow(), vec![DatasetKey::Providers]);
    }

    #[test]
    fn transport_failure_is_normalized() {
        let f = logged_in();
        f.store.transport().fail("connection reset");
        let err = block_on(f.store.update(DatasetKey::Providers, json!({}), None)).unwrap_err();
        assert_eq!(err, CmsError::Transport("connection reset".into()));

        f.store.transport().reply_status(502);
        let err = block_on(f.store.update(DatasetKey::Providers, json!({}), None)).unwrap_err();
        assert_eq!(err, CmsError::Http { status: 502 });
        assert_eq!(f.store.versions().get(DatasetKey::Providers), None);
    }

    #[test]
    fn save_publish_reports_both_steps() {
        let f = logged_in();
        f.store.transport().reply(json!({"ok": true, "update": {"version": 4}, "publishOk": true}));

        let outcome = block_on(f.store.save_publish(
            DatasetKey::SiteContent,
            json!({"index": {}}),
            Some(vec![DatasetKey::SiteContent]),
            None,
        ))
        .unwrap();

        assert_eq!(outcome.status(), PublishState::Published);
        assert_eq!(f.store.versions().get(DatasetKey::SiteContent), Some(Version::new("4")));
        assert_eq!(f.store.transport().last().body.unwrap()["keys"], json!(["siteContent"]));
    }

    #[test]
    fn save_publish_partial_failure_is_degraded_success() {
        let f = logged_in();
        f.store.transport().reply(json!({
            "ok": false, "message": "publish quota exceeded", "update": {"ok": true, "version": 5}, "publishOk": false
        }));

        let outcome = block_on(f.store.save_publish(DatasetKey::AboutContent, json!({}), None, None)).unwrap();

        assert_eq!(outcome.status(), PublishState::SavedNotPublished);
        assert_eq!(outcome.message.as_deref(), Some("publish quota exceeded"));
        assert_eq!(f.store.versions().get(DatasetKey::AboutContent), Some(Version::new("5")));
    }

    #[test]
    fn failed_save_keeps_version_cache() {
        let f = logged_in();
        f.store.versions().set(DatasetKey::Providers, Version::new("3"));
        f.store.transport().reply(json!({"ok": false, "message": "Sheet locked", "update": {"ok": false}}));

        let err = block_on(f.store.save_publish(DatasetKey::Providers, json!({}), None, None)).unwrap_err();

        assert_eq!(err, CmsError::Rejected("Sheet locked".into()));
        assert_eq!(f.store.versions().get(DatasetKey::Providers), Some(Version::new("3")));
    }

    #[test]
    fn upload_returns_placeholder_and_preview() {
        let f = logged_in();
        f.store.transport().reply(json!({"ok": true, "id": "u42", "filename": "kids.png"}));

        let uploaded = block_on(f.store.upload_image(b"\x89PNG", "kids.png", "image/png", None)).unwrap();

        assert_eq!(uploaded.placeholder.to_string(), "gas://image/u42/kids.png");
        assert!(uploaded.preview_data_url.starts_with("data:image/png;base64,"));
        let body = f.store.transport().last().body.unwrap();
        assert_eq!(body["dataUrl"], uploaded.preview_data_url.as_str());
        assert_eq!(body["filename"], "kids.png");
    }

    #[test]
    fn empty_upload_is_rejected_locally() {
        let f = logged_in();
        let err = block_on(f.store.upload_image(b"", "x.png", "image/png", None)).unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
        assert_eq!(f.store.transport().request_count(), 0);
    }

    #[test]
    fn filenames_cannot_break_placeholders() {
        assert_eq!(sanitize_filename("a/b\\c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("  "), "image");
    }

    #[test]
    fn members_list_decodes_users() {
        let f = logged_in();
        f.store.transport().reply(json!({
            "ok": true, "users": [{"username": "amy", "email": "amy@x.org", "role": "member", "joined": "2025"}]
        }));
        let users = block_on(f.store.members_list(None)).unwrap();
        assert_eq!(users[0].username, "amy");
        assert_eq!(users[0].extra["joined"], "2025");
        assert_eq!(f.store.transport().last().param("action"), Some("membersList"));
    }

    #[test]
    fn member_forgot_needs_an_identifier() {
        let f = fixture();
        let err = block_on(f.store.member_forgot(&MemberForgotRequest::default())).unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
    }

    // Scenario: a provider created in the editor comes back after a save and reload.
    #[test]
    fn saved_provider_is_visible_after_reload() {
        let f = logged_in();
        let mut providers = Providers::new();
        providers.insert("test-1".into(), crate::model::Provider::new("test-1", "Test"));
        let data = providers.to_value().unwrap();

        f.store.transport().reply(json!({"ok": true, "version": 1}));
        block_on(f.store.update(DatasetKey::Providers, data.clone(), None)).unwrap();
        let sent = f.store.transport().last().body.unwrap()["data"].clone();

        f.store.transport().reply(json!({"ok": true, "data": sent, "version": 1, "hasData": true}));
        let read = block_on(f.store.secure_read(DatasetKey::Providers, None)).unwrap();
        let reloaded = Providers::from_value(read.data.unwrap()).unwrap();
        assert_eq!(reloaded["test-1"].name, "Test");
        assert_eq!(reloaded["test-1"].coords, None);
    }
}
