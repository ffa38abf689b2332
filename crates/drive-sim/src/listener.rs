//! Position listeners and the ordered observer set that notifies them.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use drive_core::ListenerId;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::PositionEvent;

/// Why a listener did not accept an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener failed; it stays registered and is called again next tick.
    #[error("listener failed: {0}")]
    Failed(String),

    /// The listener is gone and asks to be unregistered.  Not a failure.
    #[error("listener detached")]
    Detached,
}

pub type ListenerResult = Result<(), ListenerError>;

/// Callback invoked with every [`PositionEvent`].
///
/// `Send` because a wall-clock scheduler runs the fan-out on its own thread.
/// Any `FnMut(&PositionEvent) -> ListenerResult + Send` closure is a
/// listener.
pub trait PositionListener: Send {
    fn on_position(&mut self, event: &PositionEvent) -> ListenerResult;
}

impl<F> PositionListener for F
where
    F: FnMut(&PositionEvent) -> ListenerResult + Send,
{
    #[inline]
    fn on_position(&mut self, event: &PositionEvent) -> ListenerResult {
        self(event)
    }
}

/// Non-owning listener: forwards to a shared listener for as long as
/// something else keeps it alive, then detaches itself.
pub struct WeakListener<L: PositionListener> {
    inner: Weak<Mutex<L>>,
}

impl<L: PositionListener> WeakListener<L> {
    pub fn new(target: &Arc<Mutex<L>>) -> Self {
        Self { inner: Arc::downgrade(target) }
    }
}

impl<L: PositionListener> PositionListener for WeakListener<L> {
    fn on_position(&mut self, event: &PositionEvent) -> ListenerResult {
        match self.inner.upgrade() {
            Some(target) => target.lock().on_position(event),
            None => Err(ListenerError::Detached),
        }
    }
}

// ── ListenerSet ───────────────────────────────────────────────────────────────

/// Outcome of one fan-out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub delivered: usize,
    /// Listeners that returned [`ListenerError::Failed`] or panicked.
    pub failed:    usize,
    /// Listeners removed because they returned [`ListenerError::Detached`].
    pub detached:  usize,
    /// Listeners skipped because the fan-out was cut short.
    pub skipped:   usize,
}

/// Ordered set of listeners.
///
/// Notification follows registration order.  Each call is isolated: an
/// error or a panic in one listener is logged and counted, and the next
/// listener is still called.
#[derive(Default)]
pub struct ListenerSet {
    entries:  Vec<(ListenerId, Box<dyn PositionListener>)>,
    next_id:  u32,
    failures: u64,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; returns the id that removes it.
    pub fn add(&mut self, listener: Box<dyn PositionListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener.  Returns `false` for an unknown or already
    /// removed id; that is not an error.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total failed notifications since this set was created.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Deliver `event` to every listener in registration order.
    ///
    /// `proceed` is consulted before each listener; once it returns `false`
    /// the remaining listeners are skipped for this event.
    pub fn notify(&mut self, event: &PositionEvent, mut proceed: impl FnMut() -> bool) -> NotifyReport {
        let mut report = NotifyReport::default();
        let mut detached: Vec<ListenerId> = Vec::new();
        let total = self.entries.len();

        for (i, (id, listener)) in self.entries.iter_mut().enumerate() {
            if !proceed() {
                report.skipped = total - i;
                break;
            }
            match catch_unwind(AssertUnwindSafe(|| listener.on_position(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(ListenerError::Detached)) => {
                    debug!(listener = %id, "listener detached");
                    detached.push(*id);
                }
                Ok(Err(err)) => {
                    warn!(listener = %id, tick = %event.tick, error = %err, "listener failed");
                    report.failed += 1;
                }
                Err(panic) => {
                    warn!(
                        listener = %id,
                        tick = %event.tick,
                        panic = panic_message(panic.as_ref()),
                        "listener panicked"
                    );
                    report.failed += 1;
                }
            }
        }

        if !detached.is_empty() {
            report.detached = detached.len();
            self.entries.retain(|(id, _)| !detached.contains(id));
        }
        self.failures += report.failed as u64;
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
