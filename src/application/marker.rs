use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::Clock;
use crate::domain::analysis::{AnalysisDomain, Interval};
use crate::infrastructure::storage::KeyValueStore;

/// Marker TTL: how long a rebuilt UI may show a "maybe still settling" state
/// before reverting to idle. 5 minutes.
pub const MARKER_TTL_MS: u64 = 5 * 60 * 1000;

const MARKER_PREFIX: &str = "analysis-ongoing:";

/// What was being analyzed when the marker was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMeta {
    pub domain: AnalysisDomain,
    pub subject: String,
    pub interval: Interval,
}

#[derive(Serialize, Deserialize)]
struct MarkerEnvelope {
    marked_at: u64,
    meta: SubjectMeta,
}

/// Advisory single-slot breadcrumb in the durable store. The in-memory
/// operation and its cancellation handle do not survive UI teardown; this
/// slot is what a rebuilt view checks. It cannot resume the network call,
/// only bound the ambiguity window.
pub struct OngoingOperationMarker {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    slot_key: String,
    ttl_ms: u64,
}

impl OngoingOperationMarker {
    pub fn new(domain: AnalysisDomain, store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            slot_key: format!("{}{}", MARKER_PREFIX, domain.key()),
            ttl_ms: MARKER_TTL_MS,
        }
    }

    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// Overwrites the slot with the given meta and the current time.
    pub fn mark(&self, meta: &SubjectMeta) {
        let envelope = MarkerEnvelope {
            marked_at: self.clock.now_ms(),
            meta: meta.clone(),
        };
        if let Ok(encoded) = serde_json::to_string(&envelope) {
            self.store.set(&self.slot_key, &encoded);
        }
    }

    /// Self-expiring read: an expired or unreadable slot is deleted and
    /// reported absent.
    pub fn check(&self) -> Option<SubjectMeta> {
        let raw = self.store.get(&self.slot_key)?;
        let Ok(envelope) = serde_json::from_str::<MarkerEnvelope>(&raw) else {
            self.store.remove(&self.slot_key);
            return None;
        };
        let age = self.clock.now_ms().saturating_sub(envelope.marked_at);
        if age >= self.ttl_ms {
            self.store.remove(&self.slot_key);
            return None;
        }
        Some(envelope.meta)
    }

    /// Unconditional removal; the request's finally-path.
    pub fn clear(&self) {
        self.store.remove(&self.slot_key);
    }
}
