//! Key/value persistence seam.
//!
//! The browser build backs this with `localStorage` / `sessionStorage`; tests
//! and browsers without storage use [`MemoryStore`]. Methods take `&self`
//! because the browser storage objects are shared handles.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;

/// Session-scoped key holding the admin token.
pub const ADMIN_TOKEN_KEY: &str = "admin_token";
/// Session-scoped key holding the role returned at login.
pub const ADMIN_ROLE_KEY: &str = "admin_role";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        store.remove("a");
        assert!(store.is_empty());
    }
}
