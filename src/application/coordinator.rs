use leptos::*;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

use super::cache::ResultCache;
use super::marker::{OngoingOperationMarker, SubjectMeta};
use super::operations::{CancellationToken, OperationRegistry};
use crate::domain::analysis::{
    AnalysisDomain, ChartDataProjector, ChartDataset, Interval, OperationId, Subject,
    extract_series,
};
use crate::domain::errors::{CoordinatorError, TransportResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::http::AnalysisTransport;

/// The single authoritative record for one domain, visible push-based to
/// every mounted consumer through its signals. Readers never write the
/// signals directly; local edits go through the mutators, last call wins.
#[derive(Clone, Copy)]
pub struct SharedAnalysisState {
    pub subject: RwSignal<Option<Subject>>,
    pub interval: RwSignal<Interval>,
    pub result: RwSignal<Option<Value>>,
    pub chart: RwSignal<ChartDataset>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl SharedAnalysisState {
    pub fn new() -> Self {
        Self {
            subject: create_rw_signal(None),
            interval: create_rw_signal(Interval::default()),
            result: create_rw_signal(None),
            chart: create_rw_signal(ChartDataset::default()),
            loading: create_rw_signal(false),
            error: create_rw_signal(None),
        }
    }

    /// Entry into a new request: adopt the subject, drop the previous
    /// result/chart so no consumer renders stale data under the new subject.
    pub fn prepare_for(&self, subject: &Subject, interval: Interval) {
        self.subject.set(Some(subject.clone()));
        self.interval.set(interval);
        self.result.set(None);
        self.chart.set(ChartDataset::default());
        self.error.set(None);
        self.loading.set(true);
    }

    pub fn set_result(&self, result: Option<Value>) {
        self.result.set(result);
    }

    pub fn set_chart(&self, chart: ChartDataset) {
        self.chart.set(chart);
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.error.set(error);
    }

    pub fn reset(&self) {
        self.subject.set(None);
        self.interval.set(Interval::default());
        self.result.set(None);
        self.chart.set(ChartDataset::default());
        self.error.set(None);
        self.loading.set(false);
    }
}

impl Default for SharedAnalysisState {
    fn default() -> Self {
        Self::new()
    }
}

struct DomainStates {
    stock: SharedAnalysisState,
    portfolio: SharedAnalysisState,
}

static SHARED_STATES: OnceCell<DomainStates> = OnceCell::new();

/// The authoritative per-domain state record. Consumers mounting a view seed
/// their working copies from this and subscribe to its signals.
pub fn shared_state(domain: AnalysisDomain) -> SharedAnalysisState {
    let states = SHARED_STATES.get_or_init(|| DomainStates {
        stock: SharedAnalysisState::new(),
        portfolio: SharedAnalysisState::new(),
    });
    match domain {
        AnalysisDomain::Stock => states.stock,
        AnalysisDomain::Portfolio => states.portfolio,
    }
}

/// Coordinates one domain's analysis operations: supersession, cancellation,
/// the durable ongoing marker, the result cache, and pushing settled results
/// into the shared state. One generic coordinator replaces the per-view
/// copies of this pattern.
pub struct AnalysisCoordinator<T: AnalysisTransport> {
    domain: AnalysisDomain,
    transport: T,
    registry: Rc<OperationRegistry>,
    cache: Rc<ResultCache>,
    marker: OngoingOperationMarker,
    projector: ChartDataProjector,
    state: SharedAnalysisState,
    current_op: Cell<Option<OperationId>>,
}

impl<T: AnalysisTransport> AnalysisCoordinator<T> {
    pub fn new(
        domain: AnalysisDomain,
        transport: T,
        registry: Rc<OperationRegistry>,
        cache: Rc<ResultCache>,
        marker: OngoingOperationMarker,
        state: SharedAnalysisState,
    ) -> Self {
        Self {
            domain,
            transport,
            registry,
            cache,
            marker,
            projector: ChartDataProjector::new(),
            state,
            current_op: Cell::new(None),
        }
    }

    pub fn domain(&self) -> AnalysisDomain {
        self.domain
    }

    pub fn state(&self) -> SharedAnalysisState {
        self.state
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Runs one analysis request end to end. Any operation this coordinator
    /// still has in flight, and any operation for the same subject, is
    /// cancelled first, so at most one non-cancelled operation exists per
    /// subject when the request goes out.
    pub async fn start_analysis(&self, subject: Subject, interval: Interval, payload: Value) {
        if let Some(previous) = self.current_op.take() {
            self.registry.cancel(previous);
        }
        self.registry.cancel_subject(&subject);

        let op = self.registry.begin(&subject);
        let (token, registration) = CancellationToken::new_pair();
        self.registry.attach(op, token.clone());
        self.current_op.set(Some(op));

        self.marker.mark(&SubjectMeta {
            domain: self.domain,
            subject: subject.value().to_string(),
            interval,
        });
        self.state.prepare_for(&subject, interval);

        get_logger().debug(
            LogComponent::Application("AnalysisCoordinator"),
            &format!("{} started for {} ({})", op, subject, interval),
        );

        let outcome = self
            .transport
            .issue(self.domain.endpoint(), &payload, registration)
            .await;
        self.settle(op, &token, &subject, interval, outcome);
    }

    /// Settlement path for a finished request, also the hook a test uses to
    /// simulate a late-arriving resolution. The marker is cleared
    /// unconditionally; a cancelled or superseded operation's outcome is
    /// discarded without raising an error. A cancelled settlement of the
    /// coordinator's own operation still releases the loading flag, since
    /// nothing remains in flight afterwards.
    pub fn settle(
        &self,
        op: OperationId,
        token: &CancellationToken,
        subject: &Subject,
        interval: Interval,
        outcome: TransportResult<Value>,
    ) {
        self.marker.clear();
        let superseded = self.current_op.get() != Some(op);
        self.registry.end(op);
        if !superseded {
            self.current_op.set(None);
            // Our own operation settled, so nothing is loading any more.
            // A superseded settlement must not touch the flag: the operation
            // that superseded it owns the flag now.
            self.state.set_loading(false);
        }

        if superseded
            || token.is_cancelled()
            || matches!(outcome, Err(CoordinatorError::Cancelled))
        {
            get_logger().debug(
                LogComponent::Application("AnalysisCoordinator"),
                &format!("{} discarded after cancellation", op),
            );
            return;
        }

        match outcome {
            Ok(result) => {
                self.cache.save(&self.cache_key(subject, interval), &result);
                let dataset = self.projector.project(&extract_series(&result), interval);
                self.state.set_result(Some(result));
                self.state.set_chart(dataset);
            }
            Err(err) => {
                get_logger().warn(
                    LogComponent::Application("AnalysisCoordinator"),
                    &format!("{} failed for {}: {}", op, subject, err),
                );
                self.state.set_error(Some(err.to_string()));
            }
        }
    }

    /// Explicit cancel of this coordinator's in-flight operation, if any.
    /// Leaves `error` unset: cancellation is never a user-visible failure.
    pub fn cancel_current(&self) -> bool {
        match self.current_op.take() {
            Some(op) => {
                let found = self.registry.cancel(op);
                self.marker.clear();
                self.state.set_loading(false);
                found
            }
            None => false,
        }
    }

    /// Mount-time seeding: adopt a cached result instead of re-requesting.
    pub fn restore_from_cache(&self, subject: &Subject, interval: Interval) -> bool {
        match self.cache.load(&self.cache_key(subject, interval)) {
            Some(result) => {
                let dataset = self.projector.project(&extract_series(&result), interval);
                self.state.subject.set(Some(subject.clone()));
                self.state.interval.set(interval);
                self.state.set_result(Some(result));
                self.state.set_chart(dataset);
                self.state.set_loading(false);
                self.state.set_error(None);
                true
            }
            None => false,
        }
    }

    /// Whether a torn-down UI left an operation that may still be settling.
    pub fn check_ongoing(&self) -> Option<SubjectMeta> {
        self.marker.check()
    }

    fn cache_key(&self, subject: &Subject, interval: Interval) -> String {
        format!("{}:{}:{}", self.domain.key(), subject, interval)
    }
}
