use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::Clock;
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::storage::KeyValueStore;

/// Default TTL for config/result entries: 24 hours.
pub const RESULT_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Namespace prefix so enumeration and bulk clears only ever touch this
/// cache's entries inside a shared store.
const CACHE_PREFIX: &str = "analysis-cache:";

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    written_at: u64,
    payload: Value,
}

struct CacheTier {
    name: &'static str,
    store: Rc<dyn KeyValueStore>,
}

/// Two-tier TTL-bound cache: a process-wide memory tier backed by a durable
/// tab-scoped tier. Values travel as serialized envelopes, so a cached
/// payload never aliases the caller's value.
pub struct ResultCache {
    tiers: Vec<CacheTier>,
    clock: Rc<dyn Clock>,
    ttl_ms: u64,
}

/// Introspection snapshot. Deliberately applies no TTL filtering.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub tiers: Vec<String>,
    pub resident_keys: Vec<String>,
}

impl ResultCache {
    pub fn new(
        memory: Rc<dyn KeyValueStore>,
        durable: Option<Rc<dyn KeyValueStore>>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let mut tiers = vec![CacheTier {
            name: "memory",
            store: memory,
        }];
        if let Some(store) = durable {
            tiers.push(CacheTier {
                name: "session",
                store,
            });
        }
        Self {
            tiers,
            clock,
            ttl_ms: RESULT_TTL_MS,
        }
    }

    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_PREFIX, key)
    }

    /// Writes a deep copy of `value` into every available tier. The envelope
    /// is encoded once before any tier is touched, so a failed encode leaves
    /// no partially-written state. Returns false only on encode failure,
    /// which is contained here per the error policy.
    pub fn save(&self, key: &str, value: &Value) -> bool {
        let envelope = CacheEnvelope {
            written_at: self.clock.now_ms(),
            payload: value.clone(),
        };
        let encoded = match serde_json::to_string(&envelope) {
            Ok(encoded) => encoded,
            Err(e) => {
                get_logger().warn(
                    LogComponent::Application("ResultCache"),
                    &format!("failed to encode cache entry {}: {}", key, e),
                );
                return false;
            }
        };
        let storage_key = Self::storage_key(key);
        for tier in &self.tiers {
            tier.store.set(&storage_key, &encoded);
        }
        true
    }

    /// Fastest tier first. An entry at or past its TTL is a miss and is
    /// purged from all tiers; an unreadable entry is dropped from its tier
    /// and treated as a miss. A hit found only in a slower tier is promoted
    /// to the memory tier.
    pub fn load(&self, key: &str) -> Option<Value> {
        let storage_key = Self::storage_key(key);
        for (index, tier) in self.tiers.iter().enumerate() {
            let Some(raw) = tier.store.get(&storage_key) else {
                continue;
            };
            let Ok(envelope) = serde_json::from_str::<CacheEnvelope>(&raw) else {
                tier.store.remove(&storage_key);
                continue;
            };
            let age = self.clock.now_ms().saturating_sub(envelope.written_at);
            if age >= self.ttl_ms {
                self.purge(&storage_key);
                return None;
            }
            if index > 0 {
                self.tiers[0].store.set(&storage_key, &raw);
            }
            return Some(envelope.payload);
        }
        None
    }

    pub fn clear(&self, key: &str) {
        self.purge(&Self::storage_key(key));
    }

    pub fn clear_all(&self) {
        for tier in &self.tiers {
            for key in tier.store.keys() {
                if key.starts_with(CACHE_PREFIX) {
                    tier.store.remove(&key);
                }
            }
        }
    }

    pub fn status(&self) -> CacheStatus {
        let mut resident: BTreeSet<String> = BTreeSet::new();
        for tier in &self.tiers {
            for key in tier.store.keys() {
                if let Some(stripped) = key.strip_prefix(CACHE_PREFIX) {
                    resident.insert(stripped.to_string());
                }
            }
        }
        CacheStatus {
            tiers: self.tiers.iter().map(|t| t.name.to_string()).collect(),
            resident_keys: resident.into_iter().collect(),
        }
    }

    fn purge(&self, storage_key: &str) {
        for tier in &self.tiers {
            tier.store.remove(storage_key);
        }
    }
}
