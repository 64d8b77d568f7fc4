//! Documents shown when the store has nothing for a dataset yet.

use log::warn;
use serde_json::Value;

use crate::model::{AboutContent, Dataset, DatasetKey, Providers, SiteContent};

const ABOUT_CONTENT: &str = include_str!("../defaults/aboutContent.json");
const PROVIDERS: &str = include_str!("../defaults/providers.json");
const SITE_CONTENT: &str = include_str!("../defaults/siteContent.json");

fn raw(key: DatasetKey) -> &'static str {
    match key {
        DatasetKey::AboutContent => ABOUT_CONTENT,
        DatasetKey::Providers => PROVIDERS,
        DatasetKey::SiteContent => SITE_CONTENT,
    }
}

fn typed_default(key: DatasetKey) -> Value {
    let value = match key {
        DatasetKey::AboutContent => AboutContent::default().to_value(),
        DatasetKey::Providers => Providers::default().to_value(),
        DatasetKey::SiteContent => SiteContent::default().to_value(),
    };
    value.unwrap_or(Value::Null)
}

/// The bundled default for `key`. Falls back to the empty document if the
/// bundled file does not parse.
pub fn document(key: DatasetKey) -> Value {
    match serde_json::from_str(raw(key)) {
        Ok(value) => value,
        Err(err) => {
            warn!("bundled default for {key} is invalid: {err}");
            typed_default(key)
        }
    }
}

/// `value`, or the bundled default when the store returned nothing.
pub fn or_default(key: DatasetKey, value: Option<Value>) -> Value {
    match value {
        Some(value) if !value.is_null() => value,
        _ => document(key),
    }
}
