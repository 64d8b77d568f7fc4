//! Draft and published copies of the three datasets.

use common::model::{AboutContent, Dataset, DatasetKey, Providers, SiteContent};
use common::protocol::{PublishRequest, ReadRequest, SavePublishRequest, UpdateRequest};
use log::{info, warn};
use rusqlite::Connection;
use serde_json::{json, Map, Value};

use super::members::authorize;
use super::uploads::resolve_placeholders;
use crate::db::{self, StubState};

fn parse_stored(raw: Option<&str>) -> Value {
    raw.and_then(|raw| serde_json::from_str(raw).ok()).unwrap_or(Value::Null)
}

/// Rejects documents that do not decode as their dataset's type.
fn validate(key: DatasetKey, data: &Value) -> Result<(), String> {
    let checked = match key {
        DatasetKey::AboutContent => AboutContent::from_value(data.clone()).map(drop),
        DatasetKey::Providers => Providers::from_value(data.clone()).map(drop),
        DatasetKey::SiteContent => SiteContent::from_value(data.clone()).map(drop),
    };
    checked.map_err(|e| format!("Invalid {key} document: {e}"))
}

fn save(conn: &Connection, key: DatasetKey, data: &Value) -> Result<i64, String> {
    validate(key, data)?;
    let raw = serde_json::to_string(data).map_err(|e| e.to_string())?;
    let version = db::save_draft(conn, key.as_str(), &raw)?;
    info!("Saved {key} draft v{version}");
    Ok(version)
}

pub fn read(state: &StubState, request: ReadRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    authorize(&conn, &request.token, true)?;
    let row = db::load_dataset(&conn, request.key.as_str())?;
    let data = parse_stored(row.draft.as_deref());
    Ok(json!({
        "hasData": !data.is_null(),
        "data": data,
        "version": row.draft.as_ref().map(|_| row.draft_version),
        "updatedAt": row.updated_at,
    }))
}

pub fn update(state: &StubState, request: UpdateRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    authorize(&conn, &request.token, true)?;
    let version = save(&conn, request.key, &request.data)?;
    Ok(json!({ "version": version }))
}

/// Promotes the drafts of `keys`, resolving image placeholders on the way.
/// Either every key is promoted or none is.
fn publish_keys(state: &StubState, conn: &Connection, keys: &[DatasetKey]) -> Result<Value, String> {
    if state.config.fail_publish {
        return Err("Publishing is disabled on this stub (SITE_STUB_FAIL_PUBLISH)".to_string());
    }

    let tx = conn.unchecked_transaction().map_err(|e| e.to_string())?;
    let mut published = Vec::new();
    let mut resolved = 0;
    let mut unresolved = Vec::new();
    for key in keys {
        let row = db::load_dataset(&tx, key.as_str())?;
        let Some(raw) = row.draft.as_deref() else {
            continue;
        };
        let mut document: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        let resolution = resolve_placeholders(&tx, &mut document, &state.config.public_url)?;
        let raw = serde_json::to_string(&document).map_err(|e| e.to_string())?;
        db::promote(&tx, key.as_str(), &raw, row.draft_version)?;

        if !resolution.unresolved.is_empty() {
            warn!("{key}: {} placeholder(s) without an upload", resolution.unresolved.len());
        }
        resolved += resolution.resolved;
        unresolved.extend(resolution.unresolved);
        published.push(key.as_str());
    }
    tx.commit().map_err(|e| e.to_string())?;
    info!("Published {published:?}, {resolved} image(s) resolved");
    Ok(json!({ "published": published, "resolved": resolved, "unresolved": unresolved }))
}

pub fn publish(state: &StubState, request: PublishRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    authorize(&conn, &request.token, true)?;
    let keys = request.keys.unwrap_or_else(|| DatasetKey::ALL.to_vec());
    publish_keys(state, &conn, &keys)
}

/// Save, then publish. A failed publish still answers `ok: true` with the
/// update result and `publishOk: false`.
pub fn save_publish(state: &StubState, request: SavePublishRequest) -> Result<Value, String> {
    let conn = state.conn()?;
    authorize(&conn, &request.token, true)?;
    let version = save(&conn, request.key, &request.data)?;
    let update = json!({ "ok": true, "version": version });

    let keys = request.keys.unwrap_or_else(|| vec![request.key]);
    match publish_keys(state, &conn, &keys) {
        Ok(details) => Ok(json!({ "update": update, "publishOk": true, "publish": details })),
        Err(message) => {
            warn!("{} saved but not published: {message}", request.key);
            Ok(json!({ "update": update, "publishOk": false, "message": message }))
        }
    }
}

/// Public read of the published copy.
pub fn data(state: &StubState, key: Option<&str>, version: Option<&str>) -> Result<Value, String> {
    let key: DatasetKey = key.ok_or("Missing key")?.parse().map_err(|e: common::CmsError| e.to_string())?;
    let conn = state.conn()?;
    let row = db::load_dataset(&conn, key.as_str())?;
    let Some(published_version) = row.published_version else {
        return Ok(json!({ "data": null, "version": null }));
    };
    if version == Some(published_version.to_string().as_str()) {
        return Ok(json!({ "notModified": true, "version": published_version }));
    }
    Ok(json!({
        "data": parse_stored(row.published.as_deref()),
        "version": published_version,
    }))
}

pub fn versions(state: &StubState) -> Result<Value, String> {
    let conn = state.conn()?;
    let versions: Map<String, Value> = db::published_versions(&conn)?
        .into_iter()
        .map(|(key, version)| (key, json!(version)))
        .collect();
    Ok(json!({ "versions": versions }))
}
