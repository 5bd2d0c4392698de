use analysis_dashboard_wasm::application::marker::{
    MARKER_TTL_MS, OngoingOperationMarker, SubjectMeta,
};
use analysis_dashboard_wasm::application::{Clock, ManualClock};
use analysis_dashboard_wasm::domain::analysis::{AnalysisDomain, Interval};
use analysis_dashboard_wasm::infrastructure::storage::{KeyValueStore, MemoryStore};
use std::rc::Rc;

fn meta(subject: &str) -> SubjectMeta {
    SubjectMeta {
        domain: AnalysisDomain::Stock,
        subject: subject.to_string(),
        interval: Interval::Daily,
    }
}

fn fixture() -> (OngoingOperationMarker, Rc<ManualClock>, Rc<MemoryStore>) {
    let clock = Rc::new(ManualClock::new(0));
    let store = Rc::new(MemoryStore::new());
    let marker = OngoingOperationMarker::new(
        AnalysisDomain::Stock,
        store.clone() as Rc<dyn KeyValueStore>,
        clock.clone() as Rc<dyn Clock>,
    );
    (marker, clock, store)
}

#[test]
fn mark_then_check_within_ttl_returns_meta() {
    let (marker, clock, _store) = fixture();
    marker.mark(&meta("AAPL"));

    clock.set(MARKER_TTL_MS - 1);
    assert_eq!(marker.check(), Some(meta("AAPL")));
    // Non-destructive while fresh
    assert_eq!(marker.check(), Some(meta("AAPL")));
}

#[test]
fn check_past_ttl_clears_the_slot() {
    let (marker, clock, store) = fixture();
    marker.mark(&meta("AAPL"));

    clock.set(MARKER_TTL_MS);
    assert_eq!(marker.check(), None);
    assert!(store.keys().is_empty());
}

#[test]
fn mark_overwrites_the_single_slot() {
    let (marker, clock, _store) = fixture();
    marker.mark(&meta("AAPL"));
    clock.advance(60_000);
    marker.mark(&meta("MSFT"));

    // TTL is measured from the latest mark
    clock.advance(MARKER_TTL_MS - 60_000);
    assert_eq!(marker.check(), Some(meta("MSFT")));
}

#[test]
fn clear_is_unconditional() {
    let (marker, _clock, store) = fixture();
    marker.mark(&meta("AAPL"));
    marker.clear();
    assert_eq!(marker.check(), None);
    assert!(store.keys().is_empty());

    // Clearing an empty slot is a no-op
    marker.clear();
}

#[test]
fn unreadable_slot_resolves_to_absent() {
    let (marker, _clock, store) = fixture();
    store.set("analysis-ongoing:stock-analysis", "garbage!");
    assert_eq!(marker.check(), None);
    assert!(store.keys().is_empty());
}

#[test]
fn domains_use_separate_slots() {
    let clock = Rc::new(ManualClock::new(0));
    let store = Rc::new(MemoryStore::new());
    let stock = OngoingOperationMarker::new(
        AnalysisDomain::Stock,
        store.clone() as Rc<dyn KeyValueStore>,
        clock.clone() as Rc<dyn Clock>,
    );
    let portfolio = OngoingOperationMarker::new(
        AnalysisDomain::Portfolio,
        store.clone() as Rc<dyn KeyValueStore>,
        clock as Rc<dyn Clock>,
    );

    stock.mark(&meta("AAPL"));
    assert_eq!(portfolio.check(), None);
    portfolio.clear();
    assert!(stock.check().is_some());
}
