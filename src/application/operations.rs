use futures::future::{AbortHandle, AbortRegistration};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::Clock;
use crate::domain::analysis::{OperationId, Subject};
use crate::domain::logging::{LogComponent, get_logger};

/// Cancellation handle for one in-flight request. Cancelling signals the
/// transport future to abort; it never panics and cancelling an
/// already-settled operation is a harmless no-op.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    handle: AbortHandle,
}

impl CancellationToken {
    /// Token plus the registration the transport future is wrapped with.
    pub fn new_pair() -> (Self, AbortRegistration) {
        let (handle, registration) = AbortHandle::new_pair();
        (Self { handle }, registration)
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

struct OperationEntry {
    subject: Subject,
    started_at: u64,
    token: Option<CancellationToken>,
}

/// Registry of live operations keyed by id. Enforces the supersession policy:
/// callers cancel any existing operation for a subject before beginning a new
/// one, keeping at most one non-cancelled operation per subject.
pub struct OperationRegistry {
    clock: Rc<dyn Clock>,
    next_id: Cell<u64>,
    entries: RefCell<HashMap<OperationId, OperationEntry>>,
}

impl OperationRegistry {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: Cell::new(1),
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Registers a fresh operation for the subject and returns its id.
    pub fn begin(&self, subject: &Subject) -> OperationId {
        let id = OperationId::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        // Insert overwrites, so a re-registered id loses its old handle.
        self.entries.borrow_mut().insert(
            id,
            OperationEntry {
                subject: subject.clone(),
                started_at: self.clock.now_ms(),
                token: None,
            },
        );
        id
    }

    /// Removes the operation and its handle. No-op if absent.
    pub fn end(&self, id: OperationId) {
        self.entries.borrow_mut().remove(&id);
    }

    /// Binds a cancellable resource to a registered operation. Attaching to
    /// an unknown id is a no-op: the operation already ended.
    pub fn attach(&self, id: OperationId, token: CancellationToken) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(&id) {
            entry.token = Some(token);
        }
    }

    /// Aborts the operation's handle and unregisters it. Returns true iff the
    /// id was found. Never errors: aborting a settled future is a no-op.
    pub fn cancel(&self, id: OperationId) -> bool {
        let removed = self.entries.borrow_mut().remove(&id);
        match removed {
            Some(entry) => {
                if let Some(token) = entry.token {
                    token.cancel();
                }
                true
            }
            None => false,
        }
    }

    /// Cancels every registered operation, returns the count cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<OperationEntry> =
            self.entries.borrow_mut().drain().map(|(_, e)| e).collect();
        let count = drained.len();
        for entry in drained {
            if let Some(token) = entry.token {
                token.cancel();
            }
        }
        if count > 0 {
            get_logger().info(
                LogComponent::Application("OperationRegistry"),
                &format!("cancelled all {} active operations", count),
            );
        }
        count
    }

    /// Supersession: cancels every operation registered for the subject.
    pub fn cancel_subject(&self, subject: &Subject) -> usize {
        let ids: Vec<OperationId> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, entry)| &entry.subject == subject)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.cancel(*id);
        }
        if !ids.is_empty() {
            get_logger().debug(
                LogComponent::Application("OperationRegistry"),
                &format!("superseded {} operation(s) for {}", ids.len(), subject),
            );
        }
        ids.len()
    }

    pub fn is_active(&self, id: OperationId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn list_active(&self) -> Vec<(OperationId, Subject)> {
        self.entries
            .borrow()
            .iter()
            .map(|(id, entry)| (*id, entry.subject.clone()))
            .collect()
    }

    pub fn started_at(&self, id: OperationId) -> Option<u64> {
        self.entries.borrow().get(&id).map(|entry| entry.started_at)
    }
}
