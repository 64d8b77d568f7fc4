use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::image_ref::ImageRef;

/// The `providers` dataset: provider id -> provider.
pub type Providers = BTreeMap<String, Provider>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Provider {
    /// Duplicates the map key.
    pub id: String,
    pub name: String,
    pub category: String,
    pub schedule: String,
    pub location: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmap_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coords>,
    /// Rich text.
    pub description: String,
    pub cases: Vec<Case>,
    pub timeline: Vec<TimelineEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Provider {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.cases.iter().flat_map(|case| case.images.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Case {
    pub id: String,
    pub title: String,
    /// Rich text.
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub time: String,
    pub title: String,
    /// Rich text.
    pub detail: String,
}

/// Makes every provider's `id` match its map key.
pub fn normalize_ids(providers: &mut Providers) {
    for (id, provider) in providers.iter_mut() {
        if provider.id != *id {
            provider.id = id.clone();
        }
    }
}
