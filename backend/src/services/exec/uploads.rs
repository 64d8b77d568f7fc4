//! Image uploads and the placeholder rewrite performed on publish.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::{engine::general_purpose, Engine as _};
use common::client::sanitize_filename;
use common::model::ImageRef;
use common::protocol::UploadImageRequest;
use log::info;
use regex::{Captures, Regex};
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

use super::members::authorize;
use crate::db::{self, StoredImage, StubState};

const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"gas://image/([A-Za-z0-9_-]+)/([^\s"'<>]+)"#).unwrap());

/// Splits `data:<mime>;base64,<payload>` into its MIME type and bytes.
fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), String> {
    let rest = data_url.strip_prefix("data:").ok_or("Expected a data: URL")?;
    let (meta, payload) = rest.split_once(',').ok_or("Malformed data: URL")?;
    let mime = meta.strip_suffix(";base64").ok_or("Only base64 data URLs are accepted")?;
    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("Invalid base64 payload: {e}"))?;
    Ok((mime.to_string(), bytes))
}

pub fn upload_image(state: &StubState, request: UploadImageRequest) -> Result<Value, String> {
    let (mime, bytes) = decode_data_url(&request.data_url)?;
    if !mime.starts_with("image/") {
        return Err(format!("Not an image: {mime}"));
    }
    if bytes.is_empty() {
        return Err("The image is empty".to_string());
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(format!("The image is larger than {} MB", MAX_IMAGE_BYTES / (1024 * 1024)));
    }

    let conn = state.conn()?;
    authorize(&conn, &request.token, true)?;

    let id = Uuid::new_v4().simple().to_string();
    let filename = sanitize_filename(&request.filename);
    db::insert_image(
        &conn,
        &id,
        &StoredImage {
            filename: filename.clone(),
            mime,
            bytes,
        },
    )?;
    info!("Stored image {id} ({filename})");
    Ok(json!({ "id": id, "filename": filename }))
}

/// Outcome of rewriting one document.
#[derive(Debug, Default, PartialEq)]
pub struct Resolution {
    pub resolved: usize,
    /// Placeholders whose upload is unknown. They are left in place.
    pub unresolved: Vec<String>,
}

pub fn image_url(public_url: &str, id: &str, filename: &str) -> String {
    format!("{public_url}/images/{id}/{}", filename.replace(' ', "%20"))
}

/// Upload id of a value that is exactly one placeholder. Filenames may hold
/// spaces there, which the in-text pattern does not accept.
fn whole_placeholder(text: &str) -> Option<String> {
    match ImageRef::parse(text) {
        ImageRef::Pending { upload_id, .. } => Some(upload_id),
        ImageRef::Durable(_) => None,
    }
}

/// Replaces every `gas://image/<id>/<filename>` in the string values of
/// `document` with the durable URL of the stored upload.
pub fn resolve_placeholders(conn: &Connection, document: &mut Value, public_url: &str) -> Result<Resolution, String> {
    let mut ids = Vec::new();
    visit_strings(document, &mut |text| match whole_placeholder(text) {
        Some(id) => ids.push(id),
        None => ids.extend(PLACEHOLDER.captures_iter(text).map(|caps| caps[1].to_string())),
    });

    let mut urls: HashMap<String, Option<String>> = HashMap::new();
    for id in ids {
        if urls.contains_key(&id) {
            continue;
        }
        let url = db::find_image(conn, &id)?.map(|image| image_url(public_url, &id, &image.filename));
        urls.insert(id, url);
    }

    let mut resolution = Resolution::default();
    let mut lookup = |id: &str, placeholder: &str| match urls.get(id) {
        Some(Some(url)) => {
            resolution.resolved += 1;
            url.clone()
        }
        _ => {
            resolution.unresolved.push(placeholder.to_string());
            placeholder.to_string()
        }
    };
    visit_strings_mut(document, &mut |text| {
        if let Some(id) = whole_placeholder(text) {
            *text = lookup(&id, text);
        } else if PLACEHOLDER.is_match(text) {
            let rewritten = PLACEHOLDER.replace_all(text, |caps: &Captures| lookup(&caps[1], &caps[0]));
            *text = rewritten.into_owned();
        }
    });
    Ok(resolution)
}

fn visit_strings(value: &Value, f: &mut impl FnMut(&str)) {
    match value {
        Value::String(text) => f(text),
        Value::Array(items) => items.iter().for_each(|item| visit_strings(item, f)),
        Value::Object(map) => map.values().for_each(|item| visit_strings(item, f)),
        _ => {}
    }
}

fn visit_strings_mut(value: &mut Value, f: &mut impl FnMut(&mut String)) {
    match value {
        Value::String(text) => f(text),
        Value::Array(items) => items.iter_mut().for_each(|item| visit_strings_mut(item, f)),
        Value::Object(map) => map.values_mut().for_each(|item| visit_strings_mut(item, f)),
        _ => {}
    }
}
