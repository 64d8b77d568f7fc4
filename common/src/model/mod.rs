//! Typed documents stored by the content backend.
//!
//! Each dataset is a whole JSON document replaced on save. Unknown fields at
//! the top level (and on providers) are kept in `extra` so a load/save cycle
//! does not drop what this admin does not edit.

pub mod about;
pub mod image_ref;
pub mod provider;
pub mod site;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CmsError, Result};

pub use about::{AboutContent, Achievement, ModelItem, Social, TeamMember};
pub use image_ref::ImageRef;
pub use provider::{Case, Coords, Provider, Providers, TimelineEntry};
pub use site::{IndexPage, IntroItem, ServiceItem, SiteContent, Story, Video};

/// Identifies a top-level document in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetKey {
    #[serde(rename = "aboutContent")]
    AboutContent,
    #[serde(rename = "providers")]
    Providers,
    #[serde(rename = "siteContent")]
    SiteContent,
}

impl DatasetKey {
    pub const ALL: [DatasetKey; 3] = [
        DatasetKey::AboutContent,
        DatasetKey::Providers,
        DatasetKey::SiteContent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKey::AboutContent => "aboutContent",
            DatasetKey::Providers => "providers",
            DatasetKey::SiteContent => "siteContent",
        }
    }

    /// Human label used by the admin tabs.
    pub fn label(self) -> &'static str {
        match self {
            DatasetKey::AboutContent => "About",
            DatasetKey::Providers => "Providers",
            DatasetKey::SiteContent => "Site",
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKey {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self> {
        DatasetKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CmsError::validation(format!("Unknown dataset key: {s}")))
    }
}

/// A typed document bound to its dataset key.
pub trait Dataset: Serialize + DeserializeOwned + Default {
    const KEY: DatasetKey;

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Dataset for AboutContent {
    const KEY: DatasetKey = DatasetKey::AboutContent;
}

impl Dataset for Providers {
    const KEY: DatasetKey = DatasetKey::Providers;

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let mut providers: Providers = serde_json::from_value(value)?;
        provider::normalize_ids(&mut providers);
        Ok(providers)
    }
}

impl Dataset for SiteContent {
    const KEY: DatasetKey = DatasetKey::SiteContent;
}

/// Opaque per-dataset version stamp.
///
/// The backend may send a number or a string; both are kept as text and only
/// ever compared for equality against the stamp of the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawVersion", into = "String")]
pub struct Version(String);

impl Version {
    pub fn new(stamp: impl Into<String>) -> Self {
        Version(stamp.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawVersion> for Version {
    fn from(raw: RawVersion) -> Self {
        match raw {
            RawVersion::Text(text) => Version(text),
            RawVersion::Number(number) => Version(number.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dataset_keys_parse_and_print() {
        for key in DatasetKey::ALL {
            assert_eq!(key.as_str().parse::<DatasetKey>().unwrap(), key);
        }
        assert!("nope".parse::<DatasetKey>().is_err());
        assert_eq!(serde_json::to_value(DatasetKey::AboutContent).unwrap(), json!("aboutContent"));
    }

    #[test]
    fn version_accepts_numbers_and_strings() {
        let from_number: Version = serde_json::from_value(json!(17)).unwrap();
        let from_text: Version = serde_json::from_value(json!("17")).unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(serde_json::to_value(&from_number).unwrap(), json!("17"));
    }

    #[test]
    fn null_document_decodes_to_default() {
        let about = AboutContent::from_value(Value::Null).unwrap();
        assert_eq!(about, AboutContent::default());
    }
}
