//! Persisted `dataset key -> version` map plus retained public snapshots.
//!
//! The cache is advisory. A missing or corrupt entry only costs an extra
//! round-trip; it never changes what data the caller ends up with. Storage
//! failures are logged and swallowed for the same reason.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::warn;
use serde_json::Value;

use crate::model::{DatasetKey, Version};
use crate::storage::KeyValueStore;

/// Storage key of the version map.
pub const VERSION_STORAGE_KEY: &str = "app_data_version";
/// Prefix of the per-dataset snapshot entries.
pub const SNAPSHOT_PREFIX: &str = "app_data_cache:";

#[derive(Clone)]
pub struct VersionCache {
    store: Rc<dyn KeyValueStore>,
}

impl VersionCache {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The whole map. Unreadable storage yields an empty map.
    pub fn all(&self) -> BTreeMap<String, Version> {
        self.store
            .get(VERSION_STORAGE_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(map) => Some(map),
                Err(err) => {
                    warn!("Ignoring corrupt version cache: {err}");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn get(&self, key: DatasetKey) -> Option<Version> {
        self.all().remove(key.as_str())
    }

    pub fn set(&self, key: DatasetKey, version: Version) {
        self.merge([(key.as_str().to_string(), version)]);
    }

    /// Merges `updates` into the stored map; other keys are untouched.
    pub fn merge(&self, updates: impl IntoIterator<Item = (String, Version)>) {
        let mut map = self.all();
        map.extend(updates);
        self.write(&map);
    }

    pub fn invalidate(&self, key: DatasetKey) {
        let mut map = self.all();
        if map.remove(key.as_str()).is_some() {
            self.write(&map);
        }
        self.drop_snapshot(key);
    }

    pub fn snapshot(&self, key: DatasetKey) -> Option<Value> {
        let raw = self.store.get(&snapshot_key(key))?;
        serde_json::from_str(&raw).ok()
    }

    pub fn store_snapshot(&self, key: DatasetKey, value: &Value) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(err) = self.store.set(&snapshot_key(key), &raw) {
                    warn!("Could not persist {key} snapshot: {err}");
                }
            }
            Err(err) => warn!("Could not encode {key} snapshot: {err}"),
        }
    }

    pub fn drop_snapshot(&self, key: DatasetKey) {
        self.store.remove(&snapshot_key(key));
    }

    fn write(&self, map: &BTreeMap<String, Version>) {
        let raw = match serde_json::to_string(map) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Could not encode version cache: {err}");
                return;
            }
        };
        if let Err(err) = self.store.set(VERSION_STORAGE_KEY, &raw) {
            warn!("Could not persist version cache: {err}");
        }
    }
}

fn snapshot_key(key: DatasetKey) -> String {
    format!("{SNAPSHOT_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn cache() -> (Rc<MemoryStore>, VersionCache) {
        let store = Rc::new(MemoryStore::new());
        let cache = VersionCache::new(store.clone());
        (store, cache)
    }

    #[test]
    fn missing_key_has_no_version() {
        let (_, cache) = cache();
        assert_eq!(cache.get(DatasetKey::Providers), None);
    }

    #[test]
    fn writes_merge_instead_of_replacing() {
        let (_, cache) = cache();
        cache.set(DatasetKey::Providers, Version::new("3"));
        cache.set(DatasetKey::AboutContent, Version::new("9"));
        cache.set(DatasetKey::Providers, Version::new("4"));

        assert_eq!(cache.get(DatasetKey::Providers), Some(Version::new("4")));
        assert_eq!(cache.get(DatasetKey::AboutContent), Some(Version::new("9")));
    }

    #[test]
    fn corrupt_storage_reads_as_empty() {
        let (store, cache) = cache();
        store.set(VERSION_STORAGE_KEY, "{not json").unwrap();
        assert!(cache.all().is_empty());
        cache.set(DatasetKey::SiteContent, Version::new("1"));
        assert_eq!(cache.get(DatasetKey::SiteContent), Some(Version::new("1")));
    }

    #[test]
    fn invalidate_drops_version_and_snapshot() {
        let (_, cache) = cache();
        cache.set(DatasetKey::Providers, Version::new("2"));
        cache.set(DatasetKey::SiteContent, Version::new("5"));
        cache.store_snapshot(DatasetKey::Providers, &json!({"a": {}}));

        cache.invalidate(DatasetKey::Providers);

        assert_eq!(cache.get(DatasetKey::Providers), None);
        assert_eq!(cache.snapshot(DatasetKey::Providers), None);
        assert_eq!(cache.get(DatasetKey::SiteContent), Some(Version::new("5")));
    }
}
