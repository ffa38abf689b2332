//! Integration tests for drive-sim.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use drive_core::{Coordinate, DistanceMetric};
use drive_path::GeoPath;

use crate::{ListenerError, ManualScheduler, PositionEvent, RouteSimulator, SimPhase};

// ── Helpers ───────────────────────────────────────────────────────────────────

const ONE_SEC: Duration = Duration::from_secs(1);

/// `[(0,0), (0,1), (0,2)]` measured in planar degrees: total length 2.
fn line_path() -> Arc<GeoPath> {
    let v = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0), Coordinate::new(0.0, 2.0)];
    Arc::new(GeoPath::with_metric(v, DistanceMetric::Planar).unwrap())
}

/// Ten planar units due north.
fn long_path() -> Arc<GeoPath> {
    let v = (0..=10).map(|i| Coordinate::new(0.0, i as f64)).collect();
    Arc::new(GeoPath::with_metric(v, DistanceMetric::Planar).unwrap())
}

fn manual_sim(path: Arc<GeoPath>, speed: f64) -> (RouteSimulator, ManualScheduler) {
    let clock = ManualScheduler::new();
    let sim = RouteSimulator::new(path, speed, clock.clone()).unwrap();
    (sim, clock)
}

/// Attach a listener that records every event; returns the shared log.
fn record(sim: &mut RouteSimulator) -> Arc<Mutex<Vec<PositionEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    sim.add_listener(move |e| {
        sink.lock().unwrap().push(*e);
        Ok(())
    });
    log
}

fn traveled(log: &Arc<Mutex<Vec<PositionEvent>>>) -> Vec<f64> {
    log.lock().unwrap().iter().map(|e| e.traveled_distance).collect()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use drive_core::SimulatorConfig;

    use super::*;
    use crate::SimError;

    #[test]
    fn starts_idle() {
        let (sim, _clock) = manual_sim(line_path(), 1.0);
        assert_eq!(sim.phase(), SimPhase::Idle);
        assert_eq!(sim.traveled_distance(), 0.0);
        assert_eq!(sim.listener_count(), 0);
    }

    #[test]
    fn rejects_non_positive_speed() {
        for speed in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let err = RouteSimulator::new(line_path(), speed, ManualScheduler::new()).unwrap_err();
            assert!(matches!(err, SimError::InvalidSpeed(_)), "speed {speed}");
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SimulatorConfig { tick_interval_ms: 0, ..SimulatorConfig::default() };
        let err = RouteSimulator::from_config(line_path(), &config, ManualScheduler::new()).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn empty_coordinates_surface_invalid_path() {
        let err = RouteSimulator::from_coordinates(vec![], &SimulatorConfig::default(), ManualScheduler::new())
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidPath(drive_path::PathError::Empty)));
    }

    #[test]
    fn from_coordinates_uses_config_metric() {
        let config = SimulatorConfig { metric: DistanceMetric::Planar, speed: 1.0, ..SimulatorConfig::default() };
        let sim = RouteSimulator::from_coordinates(
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0)],
            &config,
            ManualScheduler::new(),
        )
        .unwrap();
        assert_eq!(sim.path().total_length(), 5.0);
    }
}

// ── Tick semantics ────────────────────────────────────────────────────────────

#[cfg(test)]
mod ticking {
    use drive_core::Tick;

    use super::*;

    #[test]
    fn walks_three_vertex_line_to_finish() {
        let (mut sim, clock) = manual_sim(line_path(), 1.0);
        let log = record(&mut sim);
        sim.start();
        assert_eq!(sim.phase(), SimPhase::Running);

        assert!(clock.advance(ONE_SEC));
        {
            let events = log.lock().unwrap();
            let e = events[0];
            assert_eq!(e.traveled_distance, 1.0);
            assert_eq!(e.coordinate, Coordinate::new(0.0, 1.0));
            assert_eq!(e.nearest_index, 1);
            assert_eq!(e.fraction_complete, 0.5);
            assert_eq!(e.tick, Tick(1));
            assert!(e.bearing.abs() < 1e-9);
        }
        assert_eq!(sim.phase(), SimPhase::Running);

        assert!(clock.advance(ONE_SEC));
        assert_eq!(sim.traveled_distance(), 2.0);
        assert_eq!(sim.phase(), SimPhase::Finished);
        let last = *log.lock().unwrap().last().unwrap();
        assert_eq!(last.coordinate, Coordinate::new(0.0, 2.0));
        assert_eq!(last.nearest_index, 2);
        assert!(last.is_final());

        // The scheduler was told to stop; nothing more is delivered.
        assert!(!clock.advance(ONE_SEC));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn overshoot_is_clamped_to_total() {
        let (mut sim, clock) = manual_sim(line_path(), 5.0);
        let log = record(&mut sim);
        sim.start();
        clock.advance(ONE_SEC);
        assert_eq!(traveled(&log), vec![2.0]);
        assert_eq!(sim.phase(), SimPhase::Finished);
    }

    #[test]
    fn irregular_deltas_accumulate() {
        let (mut sim, clock) = manual_sim(long_path(), 2.0);
        let log = record(&mut sim);
        sim.start();
        for ms in [16, 250, 1_000, 4, 730] {
            clock.advance(Duration::from_millis(ms));
        }
        let expected: Vec<f64> = [0.032, 0.532, 2.532, 2.540, 4.0].to_vec();
        for (got, want) in traveled(&log).iter().zip(&expected) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
        assert_eq!(sim.clock().elapsed, Duration::from_millis(2_000));
    }

    #[test]
    fn zero_length_path_finishes_on_first_tick() {
        let p = Coordinate::new(-122.4, 37.78);
        let path = Arc::new(GeoPath::new(vec![p, p]).unwrap());
        let (mut sim, clock) = manual_sim(path, 0.04);
        let log = record(&mut sim);
        sim.start();
        clock.advance(ONE_SEC);
        let events = log.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].coordinate, p);
        assert_eq!(events[0].fraction_complete, 1.0);
        assert_eq!(sim.phase(), SimPhase::Finished);
    }

    #[test]
    fn direct_tick_without_scheduler() {
        let (mut sim, _clock) = manual_sim(line_path(), 0.5);
        assert!(sim.tick(ONE_SEC).is_none(), "idle simulator must not tick");
        sim.start();
        let e = sim.tick(ONE_SEC).unwrap();
        assert_eq!(e.traveled_distance, 0.5);
        assert_eq!(e.nearest_index, 0);
    }

    #[test]
    fn seek_and_set_speed() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        sim.start();
        sim.seek(7.5);
        assert_eq!(sim.current_position().nearest_index, 7);
        sim.set_speed(2.0).unwrap();
        clock.advance(ONE_SEC);
        assert_eq!(sim.traveled_distance(), 9.5);
        assert!(sim.set_speed(0.0).is_err());
        assert_eq!(sim.speed(), 2.0);
        sim.seek(-4.0);
        assert_eq!(sim.traveled_distance(), 0.0);
    }

    #[test]
    fn nearest_index_never_decreases_during_a_run() {
        let (mut sim, clock) = manual_sim(long_path(), 0.3);
        let log = record(&mut sim);
        sim.start();
        clock.run(Duration::from_millis(700), 1_000);
        let idx: Vec<usize> = log.lock().unwrap().iter().map(|e| e.nearest_index).collect();
        assert!(idx.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*idx.last().unwrap(), 10);
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn duplicate_start_is_noop() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let log = record(&mut sim);
        sim.start();
        clock.advance(ONE_SEC);
        clock.advance(ONE_SEC);
        sim.start(); // already running: must not rewind
        clock.advance(ONE_SEC);
        assert_eq!(traveled(&log), vec![1.0, 2.0, 3.0]);
        assert_eq!(sim.phase(), SimPhase::Running);
    }

    #[test]
    fn stop_halts_delivery() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let log = record(&mut sim);
        sim.start();
        clock.advance(ONE_SEC);
        sim.stop();
        assert_eq!(sim.phase(), SimPhase::Stopped);
        assert!(!clock.advance(ONE_SEC));
        assert!(sim.tick(ONE_SEC).is_none());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn stop_is_idempotent_from_any_phase() {
        let (mut sim, _clock) = manual_sim(line_path(), 1.0);
        sim.stop();
        assert_eq!(sim.phase(), SimPhase::Stopped);
        sim.stop();
        assert_eq!(sim.phase(), SimPhase::Stopped);

        let (mut once, c1) = manual_sim(long_path(), 1.0);
        let (mut twice, c2) = manual_sim(long_path(), 1.0);
        once.start();
        twice.start();
        c1.advance(ONE_SEC);
        c2.advance(ONE_SEC);
        once.stop();
        twice.stop();
        twice.stop();
        assert_eq!(once.phase(), twice.phase());
        assert_eq!(once.traveled_distance(), twice.traveled_distance());
    }

    #[test]
    fn restart_after_finish_rewinds() {
        let (mut sim, clock) = manual_sim(line_path(), 1.0);
        let log = record(&mut sim);
        sim.start();
        clock.run(ONE_SEC, 10);
        assert_eq!(sim.phase(), SimPhase::Finished);

        sim.start();
        assert_eq!(sim.phase(), SimPhase::Running);
        assert_eq!(sim.traveled_distance(), 0.0);
        clock.advance(ONE_SEC);
        assert_eq!(traveled(&log), vec![1.0, 2.0, 1.0]);
        assert_eq!(log.lock().unwrap()[2].tick, drive_core::Tick(1));
    }

    #[test]
    fn restart_after_stop_rewinds() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        sim.start();
        clock.advance(ONE_SEC);
        sim.stop();
        sim.start();
        clock.advance(ONE_SEC);
        assert_eq!(sim.traveled_distance(), 1.0);
    }

    #[test]
    fn reset_returns_to_idle() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        sim.start();
        clock.run(ONE_SEC, 3);
        sim.reset();
        assert_eq!(sim.phase(), SimPhase::Idle);
        assert_eq!(sim.traveled_distance(), 0.0);
        assert!(!clock.advance(ONE_SEC));
    }

    #[test]
    fn dropping_simulator_makes_scheduler_inert() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let log = record(&mut sim);
        sim.start();
        drop(sim);
        assert!(!clock.advance(ONE_SEC));
        assert!(log.lock().unwrap().is_empty());
    }
}

// ── Listener fan-out ──────────────────────────────────────────────────────────

#[cfg(test)]
mod listeners {
    use parking_lot::Mutex as PlMutex;

    use super::*;
    use crate::{ListenerResult, PositionListener, SimError};

    #[test]
    fn notified_in_registration_order() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..4 {
            let order = Arc::clone(&order);
            sim.add_listener(move |_| {
                order.lock().unwrap().push(n);
                Ok(())
            });
        }
        sim.start();
        clock.advance(ONE_SEC);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn failing_listener_does_not_block_others() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        sim.add_listener(|_| Err(ListenerError::Failed("renderer gone".into())));
        let log = record(&mut sim);
        sim.start();

        assert!(clock.advance(ONE_SEC));
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(sim.failed_notifications(), 1);
        // The failing listener stays registered.
        clock.advance(ONE_SEC);
        assert_eq!(sim.failed_notifications(), 2);
        assert_eq!(sim.phase(), SimPhase::Running);
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        sim.add_listener(|e| {
            if e.traveled_distance > 0.0 {
                panic!("listener bug");
            }
            Ok(())
        });
        let log = record(&mut sim);
        sim.start();

        let event = sim.tick(ONE_SEC);
        assert!(event.is_some());
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(sim.failed_notifications(), 1);
        assert!(clock.advance(ONE_SEC));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn absent_listener_rejected() {
        let (mut sim, _clock) = manual_sim(line_path(), 1.0);
        assert!(matches!(sim.add_boxed_listener(None), Err(SimError::InvalidListener)));
        let boxed: Box<dyn PositionListener> = Box::new(|_: &PositionEvent| -> ListenerResult { Ok(()) });
        assert!(sim.add_boxed_listener(Some(boxed)).is_ok());
        assert_eq!(sim.listener_count(), 1);
    }

    #[test]
    fn remove_listener_tolerates_unknown_ids() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let log = record(&mut sim);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = sim.add_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        sim.start();
        clock.advance(ONE_SEC);
        assert!(sim.remove_listener(id));
        assert!(!sim.remove_listener(id));
        assert!(!sim.remove_listener(drive_core::ListenerId(999)));
        clock.advance(ONE_SEC);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    struct Counter(usize);

    impl PositionListener for Counter {
        fn on_position(&mut self, _event: &PositionEvent) -> ListenerResult {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn weak_listener_detaches_when_dropped() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let target = Arc::new(PlMutex::new(Counter(0)));
        sim.add_weak_listener(&target);
        sim.start();
        clock.advance(ONE_SEC);
        assert_eq!(target.lock().0, 1);
        assert_eq!(sim.listener_count(), 1);

        drop(target);
        clock.advance(ONE_SEC);
        assert_eq!(sim.listener_count(), 0);
        assert_eq!(sim.failed_notifications(), 0);
    }

    #[test]
    fn listener_may_stop_its_own_simulator() {
        let (mut sim, clock) = manual_sim(long_path(), 1.0);
        let handle = sim.stop_handle();
        sim.add_listener(move |e| {
            if e.traveled_distance >= 2.0 {
                handle.stop();
            }
            Ok(())
        });
        let log = record(&mut sim);
        sim.start();
        clock.run(ONE_SEC, 10);

        // Tick 2 stopped before reaching the recorder.
        assert_eq!(traveled(&log), vec![1.0]);
        assert_eq!(sim.phase(), SimPhase::Stopped);
        assert_eq!(clock.ticks_delivered(), 2);
    }
}

// ── Schedulers ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod schedulers {
    use std::thread;
    use std::time::Instant;

    use super::*;
    use crate::{IntervalScheduler, Scheduler, TickControl};

    #[test]
    fn manual_scheduler_needs_start_and_callback() {
        let mut clock = ManualScheduler::new();
        assert!(!clock.advance(ONE_SEC));
        clock.start(Duration::from_millis(10));
        assert!(!clock.advance(ONE_SEC), "no callback installed");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        clock.on_tick(Box::new(move |dt| {
            sink.lock().unwrap().push(dt);
            if sink.lock().unwrap().len() == 2 { TickControl::Stop } else { TickControl::Continue }
        }));
        assert!(clock.step());
        assert!(clock.advance(Duration::from_millis(3)));
        assert!(!clock.is_running());
        assert_eq!(*seen.lock().unwrap(), vec![Duration::from_millis(10), Duration::from_millis(3)]);
    }

    fn wait_for(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let t0 = Instant::now();
        while t0.elapsed() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn interval_scheduler_runs_route_to_finish() {
        let mut sim = RouteSimulator::new(line_path(), 50.0, IntervalScheduler::new()).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        sim.add_listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        sim.start();
        assert!(wait_for(Duration::from_secs(5), || sim.phase() == SimPhase::Finished));
        assert!(count.load(Ordering::SeqCst) >= 1);
        assert_eq!(sim.traveled_distance(), 2.0);
    }

    #[test]
    fn start_during_final_tick_keeps_ticking() {
        let mut sched = IntervalScheduler::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let (in_tick, entered) = std::sync::mpsc::channel();
        let t = Arc::clone(&ticks);
        sched.on_tick(Box::new(move |_| {
            if t.fetch_add(1, Ordering::SeqCst) == 0 {
                let _ = in_tick.send(());
                // Hold the worker between the callback and its shutdown.
                thread::sleep(Duration::from_millis(50));
                TickControl::Stop
            } else {
                TickControl::Continue
            }
        }));
        sched.start(Duration::from_millis(1));
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        // The worker is inside the tick that will stop it.
        sched.start(Duration::from_millis(1));
        assert!(wait_for(Duration::from_secs(5), || ticks.load(Ordering::SeqCst) >= 3));
        assert!(sched.is_running());
        sched.stop();
        assert!(!sched.is_running());
    }

    #[test]
    fn restart_right_after_finish_on_wall_clock() {
        let config = drive_core::SimulatorConfig {
            speed: 1_000.0,
            tick_interval_ms: 1,
            metric: DistanceMetric::Planar,
        };
        let mut sim = RouteSimulator::from_config(line_path(), &config, IntervalScheduler::new()).unwrap();
        let finishes = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&finishes);
        sim.add_listener(move |e| {
            if e.is_final() {
                f.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        });

        sim.start();
        for run in 1..=20 {
            assert!(
                wait_for(Duration::from_secs(5), || finishes.load(Ordering::SeqCst) == run),
                "run {run} never finished"
            );
            assert!(wait_for(Duration::from_secs(5), || sim.phase() == SimPhase::Finished));
            sim.start();
        }
        assert!(wait_for(Duration::from_secs(5), || finishes.load(Ordering::SeqCst) == 21));
        sim.stop();
    }

    #[test]
    fn stop_from_another_thread_ends_delivery() {
        let mut sim = RouteSimulator::new(long_path(), 0.001, IntervalScheduler::new()).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        sim.add_listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        sim.start();
        assert!(wait_for(Duration::from_secs(5), || count.load(Ordering::SeqCst) >= 3));

        let handle = sim.stop_handle();
        thread::spawn(move || handle.stop()).join().unwrap();

        let after_stop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
        assert_eq!(sim.phase(), SimPhase::Stopped);
        sim.stop();
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use drive_core::VehicleId;

    use super::*;
    use crate::Fleet;

    #[test]
    fn vehicles_advance_independently() {
        let mut fleet: Fleet = Fleet::new();
        let slow = fleet.add(RouteSimulator::new(long_path(), 1.0, ManualScheduler::new()).unwrap());
        let fast = fleet.add(RouteSimulator::new(long_path(), 4.0, ManualScheduler::new()).unwrap());
        assert_eq!((slow, fast), (VehicleId(0), VehicleId(1)));

        fleet.start_all();
        assert_eq!(fleet.running(), 2);
        let events = fleet.tick_all(ONE_SEC);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, slow);
        assert_eq!(events[0].1.traveled_distance, 1.0);
        assert_eq!(events[1].1.traveled_distance, 4.0);

        for _ in 0..2 {
            fleet.tick_all(ONE_SEC);
        }
        // fast: 4 + 4 + 4 → clamped at 10, finished.
        assert_eq!(fleet.get(fast).unwrap().phase(), SimPhase::Finished);
        assert_eq!(fleet.running(), 1);
        assert_eq!(fleet.tick_all(ONE_SEC).len(), 1);
    }

    #[test]
    fn remove_and_stop_all() {
        let mut fleet: Fleet = Fleet::new();
        let a = fleet.add(RouteSimulator::new(long_path(), 1.0, ManualScheduler::new()).unwrap());
        fleet.add(RouteSimulator::new(long_path(), 1.0, ManualScheduler::new()).unwrap());
        fleet.start_all();
        assert!(fleet.remove(a).is_some());
        assert_eq!(fleet.len(), 1);
        fleet.stop_all();
        assert_eq!(fleet.running(), 0);
        assert!(fleet.tick_all(ONE_SEC).is_empty());
        assert_eq!(fleet.ids().collect::<Vec<_>>(), vec![VehicleId(1)]);
    }
}
