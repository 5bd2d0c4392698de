use analysis_dashboard_wasm::application::cache::{RESULT_TTL_MS, ResultCache};
use analysis_dashboard_wasm::application::{Clock, ManualClock};
use analysis_dashboard_wasm::infrastructure::storage::{KeyValueStore, MemoryStore};
use serde_json::json;
use std::rc::Rc;

struct Fixture {
    cache: ResultCache,
    clock: Rc<ManualClock>,
    memory: Rc<MemoryStore>,
    durable: Rc<MemoryStore>,
}

fn fixture() -> Fixture {
    let clock = Rc::new(ManualClock::new(0));
    let memory = Rc::new(MemoryStore::new());
    let durable = Rc::new(MemoryStore::new());
    let cache = ResultCache::new(
        memory.clone() as Rc<dyn KeyValueStore>,
        Some(durable.clone() as Rc<dyn KeyValueStore>),
        clock.clone() as Rc<dyn Clock>,
    );
    Fixture {
        cache,
        clock,
        memory,
        durable,
    }
}

#[test]
fn save_then_load_returns_deep_copy() {
    let f = fixture();
    let mut value = json!({"verdict": "hold", "score": 42});

    assert!(f.cache.save("stock-analysis:AAPL:daily", &value));
    // Mutating the caller's value must not reach the cached copy
    value["score"] = json!(0);

    let loaded = f.cache.load("stock-analysis:AAPL:daily").unwrap();
    assert_eq!(loaded, json!({"verdict": "hold", "score": 42}));
}

#[test]
fn entry_expires_after_ttl_and_leaves_status() {
    let f = fixture();
    f.cache.save("config", &json!({"interval": "daily"}));

    f.clock.set(RESULT_TTL_MS - 1);
    assert!(f.cache.load("config").is_some());

    f.clock.set(RESULT_TTL_MS);
    assert!(f.cache.load("config").is_none());
    assert!(f.cache.status().resident_keys.is_empty());
    // Purged from both tiers, not just the one that was read
    assert!(f.durable.keys().is_empty());
}

#[test]
fn durable_tier_backfills_memory() {
    let f = fixture();
    f.cache.save("result", &json!([1, 2, 3]));

    // Simulated process restart: the memory tier is gone
    for key in f.memory.keys() {
        f.memory.remove(&key);
    }
    assert_eq!(f.cache.load("result"), Some(json!([1, 2, 3])));
    // The durable hit was promoted back into the memory tier
    assert_eq!(f.memory.keys().len(), 1);
}

#[test]
fn unreadable_entry_is_a_contained_miss() {
    let f = fixture();
    f.memory.set("analysis-cache:broken", "not json {{");
    f.durable.set("analysis-cache:broken", "also not json");

    assert!(f.cache.load("broken").is_none());
    // Both corrupted copies were dropped
    assert!(f.memory.get("analysis-cache:broken").is_none());
    assert!(f.durable.get("analysis-cache:broken").is_none());
}

#[test]
fn status_reports_tiers_and_resident_keys_without_ttl_filtering() {
    let f = fixture();
    f.cache.save("a", &json!(1));
    f.cache.save("b", &json!(2));
    f.clock.set(RESULT_TTL_MS * 2);

    let status = f.cache.status();
    assert_eq!(status.tiers, vec!["memory", "session"]);
    // Expired entries remain visible until a load purges them
    assert_eq!(status.resident_keys, vec!["a", "b"]);
}

#[test]
fn clear_and_clear_all_remove_entries_from_every_tier() {
    let f = fixture();
    f.cache.save("a", &json!(1));
    f.cache.save("b", &json!(2));

    f.cache.clear("a");
    assert!(f.cache.load("a").is_none());
    assert!(f.cache.load("b").is_some());

    // Foreign keys in a shared store are untouched by clear_all
    f.durable.set("unrelated", "keep me");
    f.cache.clear_all();
    assert!(f.cache.status().resident_keys.is_empty());
    assert_eq!(f.durable.get("unrelated").as_deref(), Some("keep me"));
}

#[test]
fn memory_only_cache_works_without_durable_tier() {
    let clock = Rc::new(ManualClock::new(0));
    let memory = Rc::new(MemoryStore::new());
    let cache = ResultCache::new(
        memory as Rc<dyn KeyValueStore>,
        None,
        clock as Rc<dyn Clock>,
    );

    cache.save("k", &json!("v"));
    assert_eq!(cache.load("k"), Some(json!("v")));
    assert_eq!(cache.status().tiers, vec!["memory"]);
}
