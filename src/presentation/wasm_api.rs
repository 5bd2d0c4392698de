use js_sys::Promise;
use leptos::SignalGetUntracked;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::application::Clock;
use crate::application::cache::ResultCache;
use crate::application::coordinator::{AnalysisCoordinator, shared_state};
use crate::application::marker::OngoingOperationMarker;
use crate::application::operations::OperationRegistry;
use crate::domain::analysis::{AnalysisDomain, Interval, Subject};
use crate::infrastructure::http::AnalysisHttpClient;
use crate::infrastructure::services::BrowserClock;
use crate::infrastructure::storage::{KeyValueStore, MemoryStore, SessionStorageStore};

/// JS-facing bridge to the coordinator core. Minimal logic here: parse
/// inputs, delegate to the application layer, hand JSON strings back.
#[wasm_bindgen]
pub struct DashboardApi {
    registry: Rc<OperationRegistry>,
    cache: Rc<ResultCache>,
    stock: Rc<AnalysisCoordinator<AnalysisHttpClient>>,
    portfolio: Rc<AnalysisCoordinator<AnalysisHttpClient>>,
}

#[wasm_bindgen]
impl DashboardApi {
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: String) -> Self {
        let clock: Rc<dyn Clock> = Rc::new(BrowserClock);
        let memory: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let durable: Option<Rc<dyn KeyValueStore>> =
            SessionStorageStore::open().map(|s| Rc::new(s) as Rc<dyn KeyValueStore>);
        // Markers must survive teardown when the browser allows it
        let marker_store = durable.clone().unwrap_or_else(|| memory.clone());

        let registry = Rc::new(OperationRegistry::new(clock.clone()));
        let cache = Rc::new(ResultCache::new(memory, durable, clock.clone()));

        let coordinator_for = |domain: AnalysisDomain| {
            Rc::new(AnalysisCoordinator::new(
                domain,
                AnalysisHttpClient::new(base_url.clone()),
                registry.clone(),
                cache.clone(),
                OngoingOperationMarker::new(domain, marker_store.clone(), clock.clone()),
                shared_state(domain),
            ))
        };

        Self {
            stock: coordinator_for(AnalysisDomain::Stock),
            portfolio: coordinator_for(AnalysisDomain::Portfolio),
            registry,
            cache,
        }
    }

    #[wasm_bindgen(js_name = startStockAnalysis)]
    pub fn start_stock_analysis(
        &self,
        subject: String,
        interval: String,
        payload_json: String,
    ) -> Promise {
        start_on(self.stock.clone(), subject, interval, payload_json)
    }

    #[wasm_bindgen(js_name = startPortfolioAnalysis)]
    pub fn start_portfolio_analysis(
        &self,
        subject: String,
        interval: String,
        payload_json: String,
    ) -> Promise {
        start_on(self.portfolio.clone(), subject, interval, payload_json)
    }

    #[wasm_bindgen(js_name = cancelStockAnalysis)]
    pub fn cancel_stock_analysis(&self) -> bool {
        self.stock.cancel_current()
    }

    #[wasm_bindgen(js_name = cancelPortfolioAnalysis)]
    pub fn cancel_portfolio_analysis(&self) -> bool {
        self.portfolio.cancel_current()
    }

    #[wasm_bindgen(js_name = cancelAll)]
    pub fn cancel_all(&self) -> u32 {
        self.registry.cancel_all() as u32
    }

    #[wasm_bindgen(js_name = activeCount)]
    pub fn active_count(&self) -> u32 {
        self.registry.active_count() as u32
    }

    /// JSON of the subject meta left behind by a torn-down view, if the
    /// breadcrumb is still fresh.
    #[wasm_bindgen(js_name = checkOngoing)]
    pub fn check_ongoing(&self, domain: String) -> Option<String> {
        let coordinator = match domain.as_str() {
            "stock-analysis" => &self.stock,
            "portfolio-analysis" => &self.portfolio,
            _ => return None,
        };
        coordinator
            .check_ongoing()
            .and_then(|meta| serde_json::to_string(&meta).ok())
    }

    #[wasm_bindgen(js_name = restoreStockFromCache)]
    pub fn restore_stock_from_cache(&self, subject: String, interval: String) -> bool {
        restore_on(&self.stock, subject, interval)
    }

    #[wasm_bindgen(js_name = restorePortfolioFromCache)]
    pub fn restore_portfolio_from_cache(&self, subject: String, interval: String) -> bool {
        restore_on(&self.portfolio, subject, interval)
    }

    #[wasm_bindgen(js_name = cacheStatus)]
    pub fn cache_status(&self) -> String {
        serde_json::to_string(&self.cache.status()).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = clearCache)]
    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }
}

fn parse_inputs(subject: String, interval: String) -> Result<(Subject, Interval), JsValue> {
    let subject = Subject::new(subject).map_err(|e| JsValue::from_str(&e))?;
    let interval = interval
        .parse::<Interval>()
        .map_err(|_| JsValue::from_str(&format!("unknown interval: {}", interval)))?;
    Ok((subject, interval))
}

fn start_on(
    coordinator: Rc<AnalysisCoordinator<AnalysisHttpClient>>,
    subject: String,
    interval: String,
    payload_json: String,
) -> Promise {
    future_to_promise(async move {
        let (subject, interval) = parse_inputs(subject, interval)?;
        let payload: Value = serde_json::from_str(&payload_json)
            .map_err(|e| JsValue::from_str(&format!("invalid payload: {}", e)))?;

        coordinator.start_analysis(subject, interval, payload).await;

        // Hand the settled state back; a cancelled run resolves to null.
        let state = coordinator.state();
        if let Some(error) = state.error.get_untracked() {
            return Err(JsValue::from_str(&error));
        }
        match state.result.get_untracked() {
            Some(result) => Ok(JsValue::from_str(
                &serde_json::to_string(&result).unwrap_or_default(),
            )),
            None => Ok(JsValue::NULL),
        }
    })
}

fn restore_on(
    coordinator: &AnalysisCoordinator<AnalysisHttpClient>,
    subject: String,
    interval: String,
) -> bool {
    let Ok((subject, interval)) = parse_inputs(subject, interval) else {
        return false;
    };
    coordinator.restore_from_cache(&subject, interval)
}
