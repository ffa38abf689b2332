//! The `RouteSimulator` and its tick.

use std::sync::Arc;
use std::time::Duration;

use drive_core::{Coordinate, ListenerId, SimClock, SimulatorConfig};
use drive_path::GeoPath;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::control::Control;
use crate::listener::{ListenerSet, PositionListener, WeakListener};
use crate::scheduler::{ManualScheduler, Scheduler, TickControl};
use crate::{ListenerResult, PositionEvent, SimError, SimPhase, SimResult, StopHandle};

// ── Engine ────────────────────────────────────────────────────────────────────

/// Mutable simulation state.  Shared between the simulator and the tick
/// callback installed in its scheduler; only ever touched under the engine
/// mutex, so a tick is processed on one thread at a time.
struct Engine {
    path:      Arc<GeoPath>,
    speed:     f64,
    traveled:  f64,
    clock:     SimClock,
    listeners: ListenerSet,
}

impl Engine {
    fn rewind(&mut self) {
        self.traveled = 0.0;
        self.clock.reset();
    }

    fn tick(&mut self, dt: Duration, control: &Control) -> Option<PositionEvent> {
        if control.phase() != SimPhase::Running {
            return None;
        }

        let total = self.path.total_length();
        self.traveled = (self.traveled + self.speed * dt.as_secs_f64()).min(total);
        self.clock.advance(dt);
        let event = PositionEvent::locate(&self.path, self.traveled, &self.clock);

        let _gate = control.gate();
        // Re-check under the gate: a stop() that won the race must see no
        // delivery from this tick.
        if self.traveled >= total {
            if !control.transition(SimPhase::Running, SimPhase::Finished) {
                return None;
            }
            debug!(tick = %event.tick, traveled = self.traveled, "route finished");
        } else if control.phase() != SimPhase::Running {
            return None;
        }

        let report = self.listeners.notify(&event, || control.phase() != SimPhase::Stopped);
        trace!(
            tick = %event.tick,
            traveled = event.traveled_distance,
            index = event.nearest_index,
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "tick"
        );
        Some(event)
    }
}

// ── RouteSimulator ────────────────────────────────────────────────────────────

/// Advances a virtual traveled distance along a [`GeoPath`] and notifies
/// listeners with the interpolated position on every tick.
///
/// The path is shared read-only; all mutable state is owned by this
/// simulator.  Ticks come from the scheduler `S` (or from direct
/// [`tick`][Self::tick] calls); [`stop_handle`][Self::stop_handle] gives
/// other threads a way to halt delivery.
pub struct RouteSimulator<S: Scheduler = ManualScheduler> {
    engine:    Arc<Mutex<Engine>>,
    control:   Arc<Control>,
    scheduler: S,
    interval:  Duration,
}

impl<S: Scheduler> RouteSimulator<S> {
    /// Simulate travel along `path` at `speed` distance units (in the
    /// path's metric) per simulated second.
    pub fn new(path: Arc<GeoPath>, speed: f64, scheduler: S) -> SimResult<Self> {
        let config = SimulatorConfig { speed, ..SimulatorConfig::default() };
        Self::from_config(path, &config, scheduler)
    }

    /// Build from a validated [`SimulatorConfig`].  The config's metric is
    /// not used here; `path` already carries the metric it was measured with.
    pub fn from_config(path: Arc<GeoPath>, config: &SimulatorConfig, mut scheduler: S) -> SimResult<Self> {
        validate_speed(config.speed)?;
        config.validate()?;

        let engine = Arc::new(Mutex::new(Engine {
            path,
            speed:     config.speed,
            traveled:  0.0,
            clock:     SimClock::new(),
            listeners: ListenerSet::new(),
        }));
        let control = Arc::new(Control::new());

        let tick_engine = Arc::clone(&engine);
        let tick_control = Arc::clone(&control);
        scheduler.on_tick(Box::new(move |dt| {
            tick_engine.lock().tick(dt, &tick_control);
            if tick_control.phase() == SimPhase::Running {
                TickControl::Continue
            } else {
                TickControl::Stop
            }
        }));

        Ok(Self {
            engine,
            control,
            scheduler,
            interval: config.tick_interval(),
        })
    }

    /// Build the path from raw coordinates (as decoded from a directions
    /// response) using `config.metric`, then the simulator.
    pub fn from_coordinates(
        coordinates: Vec<Coordinate>,
        config:      &SimulatorConfig,
        scheduler:   S,
    ) -> SimResult<Self> {
        let path = GeoPath::with_metric(coordinates, config.metric)?;
        Self::from_config(Arc::new(path), config, scheduler)
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    /// Register a callback invoked with every [`PositionEvent`].
    pub fn add_listener<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&PositionEvent) -> ListenerResult + Send + 'static,
    {
        self.engine.lock().listeners.add(Box::new(callback))
    }

    /// Register any [`PositionListener`] implementation.
    pub fn add_position_listener<L: PositionListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.engine.lock().listeners.add(Box::new(listener))
    }

    /// Register a listener that may be absent, e.g. one resolved at runtime.
    ///
    /// # Errors
    /// [`SimError::InvalidListener`] if `listener` is `None`.
    pub fn add_boxed_listener(&mut self, listener: Option<Box<dyn PositionListener>>) -> SimResult<ListenerId> {
        let listener = listener.ok_or(SimError::InvalidListener)?;
        Ok(self.engine.lock().listeners.add(listener))
    }

    /// Register a listener without owning it.  It is notified while `target`
    /// is alive and silently unregistered once it has been dropped.
    pub fn add_weak_listener<L: PositionListener + 'static>(&mut self, target: &Arc<Mutex<L>>) -> ListenerId {
        self.add_position_listener(WeakListener::new(target))
    }

    /// Unregister a listener.  Unknown ids are ignored (returns `false`).
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.engine.lock().listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.engine.lock().listeners.len()
    }

    /// Notifications that failed (error or panic) since construction.
    pub fn failed_notifications(&self) -> u64 {
        self.engine.lock().listeners.failures()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Begin simulating from distance 0.
    ///
    /// No-op while already `Running`: a duplicate start neither rewinds nor
    /// restarts the scheduler.
    pub fn start(&mut self) {
        if self.control.phase() == SimPhase::Running {
            debug!("start ignored: already running");
            return;
        }
        self.engine.lock().rewind();
        self.control.set_phase(SimPhase::Running);
        self.scheduler.start(self.interval);
        debug!(
            total = self.engine.lock().path.total_length(),
            "simulator started"
        );
    }

    /// Halt ticking and enter `Stopped`.  Valid from any phase, idempotent.
    pub fn stop(&mut self) {
        self.control.stop();
        self.scheduler.stop();
    }

    /// Stop, rewind to distance 0, and return to `Idle`.
    pub fn reset(&mut self) {
        self.control.stop();
        self.scheduler.stop();
        self.engine.lock().rewind();
        self.control.set_phase(SimPhase::Idle);
        debug!("simulator reset");
    }

    /// Process one tick of length `dt` directly, bypassing the scheduler.
    ///
    /// Returns the event that was produced, or `None` when not `Running`.
    /// `dt` need not be regular.
    pub fn tick(&mut self, dt: Duration) -> Option<PositionEvent> {
        self.engine.lock().tick(dt, &self.control)
    }

    /// Jump to `distance` (clamped to the path) without notifying.
    pub fn seek(&mut self, distance: f64) {
        let mut engine = self.engine.lock();
        engine.traveled = drive_path::interpolate::clamp_distance(&engine.path, distance);
    }

    /// Change the speed; takes effect on the next tick.
    pub fn set_speed(&mut self, speed: f64) -> SimResult<()> {
        validate_speed(speed)?;
        self.engine.lock().speed = speed;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> SimPhase {
        self.control.phase()
    }

    pub fn is_running(&self) -> bool {
        self.control.phase() == SimPhase::Running
    }

    pub fn speed(&self) -> f64 {
        self.engine.lock().speed
    }

    pub fn traveled_distance(&self) -> f64 {
        self.engine.lock().traveled
    }

    /// `traveled / total`; `1.0` for a zero-length path.
    pub fn fraction_complete(&self) -> f64 {
        let engine = self.engine.lock();
        let total = engine.path.total_length();
        if total > 0.0 { engine.traveled / total } else { 1.0 }
    }

    /// Where the marker currently is.
    pub fn current_position(&self) -> PositionEvent {
        let engine = self.engine.lock();
        PositionEvent::locate(&engine.path, engine.traveled, &engine.clock)
    }

    pub fn clock(&self) -> SimClock {
        self.engine.lock().clock.clone()
    }

    pub fn path(&self) -> Arc<GeoPath> {
        Arc::clone(&self.engine.lock().path)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { control: Arc::clone(&self.control) }
    }
}

impl<S: Scheduler> Drop for RouteSimulator<S> {
    fn drop(&mut self) {
        // Other scheduler handles may outlive us; make their ticks inert.
        self.control.stop();
        self.scheduler.stop();
    }
}

impl<S: Scheduler> std::fmt::Debug for RouteSimulator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let engine = self.engine.lock();
        f.debug_struct("RouteSimulator")
            .field("phase", &self.control.phase())
            .field("speed", &engine.speed)
            .field("traveled", &engine.traveled)
            .field("total", &engine.path.total_length())
            .field("listeners", &engine.listeners.len())
            .finish()
    }
}

fn validate_speed(speed: f64) -> SimResult<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidSpeed(speed))
    }
}
