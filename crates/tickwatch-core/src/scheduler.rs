//! Tick scheduling.
//!
//! An engine asks its [`Scheduler`] for the next tick and cancels the request
//! when it pauses. Whatever drives the engine (a frame loop, an interval timer,
//! a test) then calls `tick` while a request is outstanding.
//!
//! Every request is either consumed by a tick or cancelled. An engine never
//! holds two requests at once.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Opaque id of one tick request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait Scheduler {
    fn request_tick(&mut self) -> TickHandle;
    fn cancel_tick(&mut self, handle: TickHandle);
    /// Called by the engine when a tick arrives for `handle`.
    fn consume_tick(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    pending: BTreeSet<TickHandle>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler that only records requests; the driver polls it.
///
/// Clones share one ledger, so a controller can hand the same scheduler to
/// both engines and a test can inspect it afterwards.
#[derive(Debug, Clone, Default)]
pub struct PollingScheduler {
    ledger: Rc<RefCell<Ledger>>,
}

impl PollingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any tick request is outstanding.
    pub fn has_pending(&self) -> bool {
        !self.ledger.borrow().pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.ledger.borrow().pending.len()
    }

    /// Total requests made over the scheduler's lifetime.
    pub fn requested_count(&self) -> u64 {
        self.ledger.borrow().requested
    }

    pub fn cancelled_count(&self) -> u64 {
        self.ledger.borrow().cancelled
    }
}

impl Scheduler for PollingScheduler {
    fn request_tick(&mut self) -> TickHandle {
        let mut ledger = self.ledger.borrow_mut();
        ledger.next_id += 1;
        let handle = TickHandle(ledger.next_id);
        ledger.pending.insert(handle);
        ledger.requested += 1;
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.pending.remove(&handle) {
            ledger.cancelled += 1;
        }
    }

    fn consume_tick(&mut self, handle: TickHandle) {
        self.ledger.borrow_mut().pending.remove(&handle);
    }
}
