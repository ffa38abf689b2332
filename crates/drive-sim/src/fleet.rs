//! Several independent simulators ticked together.
//!
//! Each vehicle owns its own state and shares nothing mutable with the
//! others, so with the `parallel` feature a fleet tick fans out across
//! Rayon's thread pool with no extra locking.  Listener callbacks then run
//! on worker threads; ordering is only guaranteed per vehicle.

use std::collections::BTreeMap;
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use drive_core::VehicleId;

use crate::scheduler::{ManualScheduler, Scheduler};
use crate::{PositionEvent, RouteSimulator, SimPhase};

/// A keyed collection of [`RouteSimulator`]s driven by a shared `Δt`.
pub struct Fleet<S: Scheduler + Send = ManualScheduler> {
    vehicles: BTreeMap<VehicleId, RouteSimulator<S>>,
    next_id:  u32,
}

impl<S: Scheduler + Send> Default for Fleet<S> {
    fn default() -> Self {
        Self { vehicles: BTreeMap::new(), next_id: 0 }
    }
}

impl<S: Scheduler + Send> Fleet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simulator; returns its key.
    pub fn add(&mut self, sim: RouteSimulator<S>) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        self.vehicles.insert(id, sim);
        id
    }

    /// Remove and return a simulator.  Dropping it stops it.
    pub fn remove(&mut self, id: VehicleId) -> Option<RouteSimulator<S>> {
        self.vehicles.remove(&id)
    }

    pub fn get(&self, id: VehicleId) -> Option<&RouteSimulator<S>> {
        self.vehicles.get(&id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut RouteSimulator<S>> {
        self.vehicles.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles.keys().copied()
    }

    pub fn start_all(&mut self) {
        self.vehicles.values_mut().for_each(RouteSimulator::start);
    }

    pub fn stop_all(&mut self) {
        self.vehicles.values_mut().for_each(RouteSimulator::stop);
    }

    /// Number of vehicles currently `Running`.
    pub fn running(&self) -> usize {
        self.vehicles.values().filter(|s| s.phase() == SimPhase::Running).count()
    }

    /// Tick every vehicle by `dt` and collect the events produced, in
    /// ascending `VehicleId` order.
    pub fn tick_all(&mut self, dt: Duration) -> Vec<(VehicleId, PositionEvent)> {
        #[cfg(feature = "parallel")]
        {
            self.vehicles
                .par_iter_mut()
                .filter_map(|(id, sim)| sim.tick(dt).map(|e| (*id, e)))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.vehicles
                .iter_mut()
                .filter_map(|(id, sim)| sim.tick(dt).map(|e| (*id, e)))
                .collect()
        }
    }
}
