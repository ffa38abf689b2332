//! Cross-thread simulator control: the phase flag and the delivery gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::debug;

/// Lifecycle phase of a [`RouteSimulator`][crate::RouteSimulator].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum SimPhase {
    /// Constructed (or reset), never started.
    Idle     = 0,
    /// Ticks advance the traveled distance and notify listeners.
    Running  = 1,
    /// Reached the end of the path.  Terminal until the next `start()`.
    Finished = 2,
    /// Halted by `stop()`.  Terminal until the next `start()`.
    Stopped  = 3,
}

impl SimPhase {
    fn from_u8(v: u8) -> SimPhase {
        match v {
            0 => SimPhase::Idle,
            1 => SimPhase::Running,
            2 => SimPhase::Finished,
            _ => SimPhase::Stopped,
        }
    }
}

/// State shared between a simulator, its tick callback, and its stop
/// handles.
///
/// The phase is an atomic so it can be read without taking any lock.  The
/// delivery gate is held for the whole listener fan-out of a tick; `stop`
/// writes the phase and then passes through the gate, so once it returns no
/// fan-out that could have missed the new phase is still running.  The gate
/// is re-entrant so a listener may stop its own simulator.
pub(crate) struct Control {
    phase:    AtomicU8,
    delivery: ReentrantMutex<()>,
}

impl Control {
    pub(crate) fn new() -> Self {
        Self {
            phase:    AtomicU8::new(SimPhase::Idle as u8),
            delivery: ReentrantMutex::new(()),
        }
    }

    #[inline]
    pub(crate) fn phase(&self) -> SimPhase {
        SimPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    #[inline]
    pub(crate) fn set_phase(&self, phase: SimPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Move `from → to` only if the phase is still `from`.
    #[inline]
    pub(crate) fn transition(&self, from: SimPhase, to: SimPhase) -> bool {
        self.phase
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Enter `Stopped` and wait for any in-flight fan-out to drain.
    /// Returns the phase that was replaced.
    pub(crate) fn stop(&self) -> SimPhase {
        let prev = SimPhase::from_u8(self.phase.swap(SimPhase::Stopped as u8, Ordering::SeqCst));
        drop(self.delivery.lock());
        if prev != SimPhase::Stopped {
            debug!(from = ?prev, "simulator stopped");
        }
        prev
    }

    #[inline]
    pub(crate) fn gate(&self) -> ReentrantMutexGuard<'_, ()> {
        self.delivery.lock()
    }
}

/// Cloneable, thread-safe handle that stops one simulator.
///
/// Obtained from [`RouteSimulator::stop_handle`][crate::RouteSimulator::stop_handle].
/// Typical use is UI teardown on a different thread from the one ticking.
#[derive(Clone)]
pub struct StopHandle {
    pub(crate) control: Arc<Control>,
}

impl StopHandle {
    /// Stop the simulator.  Blocks until a notification fan-out running on
    /// another thread has finished; after this returns, no further event is
    /// delivered until the simulator is started again.  Idempotent.
    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn phase(&self) -> SimPhase {
        self.control.phase()
    }
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle").field("phase", &self.phase()).finish()
    }
}
