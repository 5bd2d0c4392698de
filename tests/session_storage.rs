#![cfg(target_arch = "wasm32")]

use analysis_dashboard_wasm::infrastructure::storage::{KeyValueStore, SessionStorageStore};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn session_storage_round_trip() {
    let store = SessionStorageStore::open().expect("sessionStorage unavailable in test browser");
    store.remove("kv-test");

    assert!(store.get("kv-test").is_none());
    assert!(store.set("kv-test", "{\"v\":1}"));
    assert_eq!(store.get("kv-test").as_deref(), Some("{\"v\":1}"));
    assert!(store.keys().iter().any(|k| k == "kv-test"));

    store.remove("kv-test");
    assert!(store.get("kv-test").is_none());
}
