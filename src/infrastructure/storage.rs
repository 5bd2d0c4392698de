use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::logging::{LogComponent, get_logger};

/// Injected key/value collaborator behind the cache and marker, replacing the
/// hidden globals of the original views. `keys()` enumerates resident keys so
/// introspection and bulk clears need no separate index.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns false when the backing store rejected the write (quota, denied
    /// storage). Callers treat a failed tier write as that tier being absent.
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// Process-wide in-memory tier; also the test double for the durable tier.
/// Cleared on process (tab reload) restart by construction.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// Durable tab-scoped tier over `window.sessionStorage`. Survives UI
/// teardown/rebuild within one tab; no cross-tab consistency.
pub struct SessionStorageStore {
    storage: web_sys::Storage,
}

impl SessionStorageStore {
    /// None when the browser denies storage access; the cache then runs on
    /// the memory tier alone.
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.session_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl KeyValueStore for SessionStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.storage.set_item(key, value) {
            Ok(()) => true,
            Err(_) => {
                get_logger().warn(
                    LogComponent::Infrastructure("SessionStorage"),
                    &format!("sessionStorage write rejected for key {}", key),
                );
                false
            }
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }

    fn keys(&self) -> Vec<String> {
        let len = self.storage.length().unwrap_or(0);
        (0..len)
            .filter_map(|i| self.storage.key(i).ok().flatten())
            .collect()
    }
}
