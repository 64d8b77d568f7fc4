use std::rc::Rc;

use actix_web::dev::ServiceResponse;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use common::client::{PublishState, RemoteStore, Transport};
use common::model::{Dataset, DatasetKey, ImageRef, SiteContent};
use common::protocol::HttpResponse as RawResponse;
use common::storage::MemoryStore;
use serde_json::{json, Value};

use crate::config::StubConfig;
use crate::db::{self, StubState};
use crate::services;

fn state_with(config: StubConfig) -> StubState {
    StubState::open(StubConfig {
        db_path: ":memory:".into(),
        public_url: "http://stub".into(),
        ..config
    })
    .unwrap()
}

fn state() -> StubState {
    state_with(StubConfig::default())
}

/// A fresh service over shared state; the database outlives it.
async fn call(state: &StubState, req: TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure),
    )
    .await;
    test::call_service(&app, req.to_request()).await
}

async fn post(state: &StubState, action: &str, body: Value) -> Value {
    let req = TestRequest::post()
        .uri(&format!("/exec?action={action}"))
        .insert_header((CONTENT_TYPE, "text/plain;charset=utf-8"))
        .set_payload(body.to_string());
    test::read_body_json(call(state, req).await).await
}

async fn get(state: &StubState, query: &str) -> Value {
    let req = TestRequest::get().uri(&format!("/exec?{query}"));
    test::read_body_json(call(state, req).await).await
}

async fn admin_token(state: &StubState) -> String {
    let reply = post(state, "login", json!({"username": "admin", "password": "admin"})).await;
    assert_eq!(reply["ok"], true, "{reply}");
    reply["token"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn login_checks_credentials_and_role() {
    let stub = state();

    let reply = post(&stub, "login", json!({"username": "admin", "password": "nope"})).await;
    assert_eq!(reply["ok"], false);
    assert_eq!(reply["message"], "Invalid username or password");

    let reply = post(&stub, "login", json!({"username": "admin", "password": "admin"})).await;
    assert_eq!(reply["ok"], true);
    assert_eq!(reply["role"], "admin");

    post(
        &stub,
        "memberRegister",
        json!({"username": "ana", "email": "ana@example.com", "password": "pw"}),
    )
    .await;
    let reply = post(&stub, "login", json!({"username": "ana", "password": "pw"})).await;
    assert_eq!(reply["ok"], false);
    let reply = post(&stub, "memberLogin", json!({"username": "ana", "password": "pw"})).await;
    assert_eq!(reply["role"], "member");
}

#[actix_web::test]
async fn malformed_requests_get_a_failed_envelope() {
    let stub = state();

    let reply = post(&stub, "explode", json!({})).await;
    assert_eq!(reply["ok"], false);
    assert!(reply["message"].as_str().unwrap().contains("explode"));

    let reply = get(&stub, "action=read").await;
    assert_eq!(reply["ok"], false);

    let req = TestRequest::post().uri("/exec?action=update").set_payload("not json");
    let reply: Value = test::read_body_json(call(&stub, req).await).await;
    assert!(reply["message"].as_str().unwrap().starts_with("Invalid JSON body"));

    let reply = post(&stub, "read", json!({"key": "aboutContent", "token": "forged", "nonce": "1"})).await;
    assert_eq!(reply["ok"], false);
    assert!(reply["message"].as_str().unwrap().contains("token"));
}

#[actix_web::test]
async fn drafts_stay_private_until_published() {
    let stub = state();
    let token = admin_token(&stub).await;

    let reply = post(&stub, "read", json!({"key": "aboutContent", "token": token, "nonce": "1"})).await;
    assert_eq!(reply["hasData"], false);
    assert_eq!(reply["data"], Value::Null);

    let about = json!({"heroTitle": "About us", "lead": "Hello"});
    let reply = post(&stub, "update", json!({"key": "aboutContent", "data": about, "token": token, "nonce": "2"})).await;
    assert_eq!(reply["version"], 1);

    let reply = post(&stub, "read", json!({"key": "aboutContent", "token": token, "nonce": "3"})).await;
    assert_eq!(reply["hasData"], true);
    assert_eq!(reply["data"]["heroTitle"], "About us");
    assert_eq!(reply["version"], 1);

    let public = get(&stub, "action=data&key=aboutContent").await;
    assert_eq!(public["ok"], true);
    assert_eq!(public["data"], Value::Null);

    let reply = post(&stub, "publish", json!({"token": token, "nonce": "4", "keys": ["aboutContent"]})).await;
    assert_eq!(reply["published"], json!(["aboutContent"]));

    let public = get(&stub, "action=data&key=aboutContent").await;
    assert_eq!(public["data"]["heroTitle"], "About us");
    assert_eq!(public["version"], 1);

    let cached = get(&stub, "action=data&key=aboutContent&v=1").await;
    assert_eq!(cached["notModified"], true);

    let versions = get(&stub, "action=version").await;
    assert_eq!(versions["versions"], json!({"aboutContent": 1}));
}

#[actix_web::test]
async fn publish_is_all_or_nothing() {
    let stub = state();
    let token = admin_token(&stub).await;

    for (nonce, key, data) in [
        ("1", "aboutContent", json!({"heroTitle": "About us"})),
        ("2", "providers", json!({"p1": {"name": "One"}})),
    ] {
        let reply = post(&stub, "update", json!({"key": key, "data": data, "token": token, "nonce": nonce})).await;
        assert_eq!(reply["ok"], true, "{reply}");
    }
    {
        let conn = stub.conn().unwrap();
        db::save_draft(&conn, "siteContent", "{broken").unwrap();
    }

    let reply = post(&stub, "publish", json!({"token": token, "nonce": "3"})).await;
    assert_eq!(reply["ok"], false);

    let versions = get(&stub, "action=version").await;
    assert_eq!(versions["versions"], json!({}));
    let public = get(&stub, "action=data&key=aboutContent").await;
    assert_eq!(public["data"], Value::Null);
}

#[actix_web::test]
async fn documents_of_the_wrong_shape_are_refused() {
    let stub = state();
    let token = admin_token(&stub).await;

    let reply = post(&stub, "update", json!({"key": "providers", "data": [1, 2], "token": token, "nonce": "1"})).await;
    assert_eq!(reply["ok"], false);
    assert!(reply["message"].as_str().unwrap().starts_with("Invalid providers document"));
}

#[actix_web::test]
async fn publish_resolves_uploaded_images() {
    let stub = state();
    let token = admin_token(&stub).await;

    let upload = post(
        &stub,
        "uploadImage",
        json!({"token": token, "dataUrl": "data:image/png;base64,AQID", "filename": "hero.png"}),
    )
    .await;
    let id = upload["id"].as_str().unwrap().to_string();
    assert_eq!(upload["filename"], "hero.png");

    let placeholder = format!("gas://image/{id}/hero.png");
    let site = json!({"index": {"heroTitle": "Hi", "heroImage": placeholder, "story": {"images": [placeholder]}}});
    let reply = post(
        &stub,
        "savePublish",
        json!({"key": "siteContent", "data": site, "token": token, "nonce": "1"}),
    )
    .await;
    assert_eq!(reply["ok"], true);
    assert_eq!(reply["publishOk"], true);
    assert_eq!(reply["update"]["version"], 1);
    assert_eq!(reply["publish"]["resolved"], 2);

    let durable = format!("http://stub/images/{id}/hero.png");
    let public = get(&stub, "action=data&key=siteContent").await;
    assert_eq!(public["data"]["index"]["heroImage"], durable.as_str());
    assert_eq!(public["data"]["index"]["story"]["images"][0], durable.as_str());

    let draft = post(&stub, "read", json!({"key": "siteContent", "token": token, "nonce": "2"})).await;
    assert_eq!(draft["data"]["index"]["heroImage"], durable.as_str());

    let resp = call(&stub, TestRequest::get().uri(&format!("/images/{id}/hero.png"))).await;
    assert!(resp.status().is_success());
    assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap(), "image/png");
    assert_eq!(test::read_body(resp).await.to_vec(), vec![1u8, 2, 3]);

    let resp = call(&stub, TestRequest::get().uri("/images/unknown/x.png")).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn uploads_must_be_images_from_an_admin() {
    let stub = state();
    let token = admin_token(&stub).await;

    let reply = post(
        &stub,
        "uploadImage",
        json!({"token": token, "dataUrl": "data:text/plain;base64,AQID", "filename": "a.txt"}),
    )
    .await;
    assert_eq!(reply["ok"], false);

    let member = post(&stub, "memberRegister", json!({"username": "bo", "email": "", "password": "pw"})).await;
    let reply = post(
        &stub,
        "uploadImage",
        json!({"token": member["token"], "dataUrl": "data:image/png;base64,AQID", "filename": "a.png"}),
    )
    .await;
    assert_eq!(reply["ok"], false);
    assert!(reply["message"].as_str().unwrap().starts_with("Unauthorized"));
}

#[actix_web::test]
async fn failed_publish_still_reports_the_save() {
    let stub = state_with(StubConfig {
        fail_publish: true,
        ..StubConfig::default()
    });
    let token = admin_token(&stub).await;

    let reply = post(
        &stub,
        "savePublish",
        json!({"key": "providers", "data": {"p1": {"name": "One"}}, "token": token, "nonce": "1"}),
    )
    .await;
    assert_eq!(reply["ok"], true);
    assert_eq!(reply["update"]["ok"], true);
    assert_eq!(reply["publishOk"], false);
    assert!(reply["message"].as_str().unwrap().contains("disabled"));

    let public = get(&stub, "action=data&key=providers").await;
    assert_eq!(public["data"], Value::Null);
}

#[actix_web::test]
async fn member_accounts_and_profiles() {
    let stub = state();

    let reply = post(
        &stub,
        "memberRegister",
        json!({"username": "cy", "email": "cy@example.com", "password": "pw", "isAdmin": true, "adminCode": "wrong"}),
    )
    .await;
    assert_eq!(reply["message"], "Invalid admin code");

    let reply = post(
        &stub,
        "memberRegister",
        json!({"username": "cy", "email": "cy@example.com", "password": "pw"}),
    )
    .await;
    let token = reply["token"].as_str().unwrap().to_string();
    let again = post(&stub, "memberRegister", json!({"username": "cy", "email": "", "password": "x"})).await;
    assert_eq!(again["ok"], false);

    let reply = post(
        &stub,
        "profileUpdate",
        json!({"token": token, "username": "cy", "profile": {"bio": "Hi", "role": "admin"}}),
    )
    .await;
    assert_eq!(reply["ok"], true);
    let reply = post(&stub, "profileRead", json!({"token": token, "username": "cy"})).await;
    assert_eq!(reply["profile"]["bio"], "Hi");
    assert_eq!(reply["profile"]["role"], "member");

    let reply = post(&stub, "profileRead", json!({"token": token, "username": "admin"})).await;
    assert_eq!(reply["ok"], false);

    let reply = post(&stub, "membersList", json!({"token": token})).await;
    assert_eq!(reply["ok"], false);
    let admin = admin_token(&stub).await;
    let reply = post(&stub, "membersList", json!({"token": admin})).await;
    let names: Vec<&str> = reply["users"].as_array().unwrap().iter().map(|u| u["username"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["admin", "cy"]);

    let reply = post(&stub, "memberChangePassword", json!({"token": token, "current": "bad", "new": "pw2"})).await;
    assert_eq!(reply["ok"], false);
    let reply = post(&stub, "memberChangePassword", json!({"token": token, "current": "pw", "new": "pw2"})).await;
    assert_eq!(reply["ok"], true);
    let reply = post(&stub, "memberLogin", json!({"username": "cy", "password": "pw2"})).await;
    assert_eq!(reply["ok"], true);

    let reply = post(&stub, "memberForgot", json!({"email": "nobody@example.com"})).await;
    assert_eq!(reply["ok"], true);
    let reply = post(&stub, "memberForgot", json!({})).await;
    assert_eq!(reply["ok"], false);
}

/// Drives the stub through the client's network seam.
struct ServiceTransport {
    state: StubState,
}

impl ServiceTransport {
    async fn send(&self, req: TestRequest) -> RawResponse {
        let resp = call(&self.state, req).await;
        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;
        RawResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

fn uri(url: &str, query: &[(&str, String)]) -> String {
    let query: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{url}?{}", query.join("&"))
}

impl Transport for ServiceTransport {
    async fn post(&self, url: &str, query: &[(&str, String)], body: String) -> Result<RawResponse, String> {
        let req = TestRequest::post()
            .uri(&uri(url, query))
            .insert_header((CONTENT_TYPE, "text/plain;charset=utf-8"))
            .set_payload(body);
        Ok(self.send(req).await)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<RawResponse, String> {
        Ok(self.send(TestRequest::get().uri(&uri(url, query))).await)
    }

    fn now_millis(&self) -> u64 {
        1_700_000_000_000
    }
}

#[actix_web::test]
async fn remote_store_works_against_the_stub() {
    let store = RemoteStore::new(
        Some("/exec".to_string()),
        ServiceTransport { state: state() },
        Rc::new(MemoryStore::new()),
        Rc::new(MemoryStore::new()),
    );

    assert!(!store.login("admin", "wrong").await.ok);
    let outcome = store.login("admin", "admin").await;
    assert!(outcome.ok);
    assert_eq!(outcome.role.as_deref(), Some("admin"));

    let read = store.secure_read(DatasetKey::SiteContent, None).await.unwrap();
    assert!(!read.has_data);

    let uploaded = store.upload_image(&[1, 2, 3], "hero.png", "image/png", None).await.unwrap();
    assert!(uploaded.placeholder.is_pending());

    let mut site = SiteContent::default();
    site.index.hero_title = "Welcome".into();
    site.index.hero_image = Some(uploaded.placeholder.clone());
    let outcome = store
        .save_publish(DatasetKey::SiteContent, site.to_value().unwrap(), None, None)
        .await
        .unwrap();
    assert_eq!(outcome.status(), PublishState::Published);

    let public = store.fetch_data(DatasetKey::SiteContent).await.unwrap();
    let published = SiteContent::from_value((*public).clone()).unwrap();
    let ImageRef::Durable(url) = published.index.hero_image.unwrap() else {
        panic!("hero image still pending after publish");
    };
    assert!(url.starts_with("http://stub/images/"));

    let versions = store.fetch_versions().await.unwrap();
    assert!(versions.contains_key("siteContent"));
    let again = store.fetch_data(DatasetKey::SiteContent).await.unwrap();
    assert!(Rc::ptr_eq(&public, &again));

    let members = store.members_list(None).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].username, "admin");
}
