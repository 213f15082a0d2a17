//! Run statistics and the congestion index.
//!
//! Trip totals (travel, wait, fuel) are accumulated when a vehicle arrives;
//! vehicles still on the road at the end of a run never contribute.  The
//! congestion index is recomputed once per tick:
//!
//! ```text
//! 100 × min(1, w_density × active / nodes + w_queue × queued / max(1, active))
//! ```
//!
//! Statistics are purely observational and never feed back into the loop.
//! [`SharedStats`] lets another thread poll consistent snapshots while the
//! worker updates them.

use std::sync::{Arc, Mutex, PoisonError};

use crate::vehicle::Vehicle;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Simulated seconds covered by completed ticks.
    pub elapsed_secs: f64,

    pub vehicles_generated: u64,
    pub vehicles_arrived:   u64,
    /// Trips abandoned at generation because no route existed.
    pub vehicles_dropped:   u64,

    pub total_travel_secs: f64,
    pub total_wait_secs:   f64,
    pub total_fuel_litres: f64,

    pub active_vehicles: usize,
    pub queued_vehicles: usize,

    pub congestion_index: f64,
    pub peak_congestion:  f64,
    congestion_sum:     f64,
    congestion_samples: u64,
}

impl Statistics {
    pub fn record_generated(&mut self) {
        self.vehicles_generated += 1;
    }

    pub fn record_dropped(&mut self) {
        self.vehicles_dropped += 1;
    }

    pub fn record_arrival(&mut self, vehicle: &Vehicle) {
        self.vehicles_arrived  += 1;
        self.total_travel_secs += vehicle.travel_secs;
        self.total_wait_secs   += vehicle.wait_secs;
        self.total_fuel_litres += vehicle.fuel_litres;
    }

    /// Store this tick's congestion index and fold it into the peak and the
    /// running average.
    pub fn record_congestion(&mut self, index: f64, active: usize, queued: usize) {
        self.active_vehicles = active;
        self.queued_vehicles = queued;
        self.congestion_index = index;
        self.peak_congestion = self.peak_congestion.max(index);
        self.congestion_sum += index;
        self.congestion_samples += 1;
    }

    pub fn average_travel_secs(&self) -> f64 {
        per_arrival(self.total_travel_secs, self.vehicles_arrived)
    }

    pub fn average_wait_secs(&self) -> f64 {
        per_arrival(self.total_wait_secs, self.vehicles_arrived)
    }

    pub fn average_fuel_litres(&self) -> f64 {
        per_arrival(self.total_fuel_litres, self.vehicles_arrived)
    }

    /// Mean congestion index over all recorded ticks.
    pub fn average_congestion(&self) -> f64 {
        if self.congestion_samples == 0 {
            0.0
        } else {
            self.congestion_sum / self.congestion_samples as f64
        }
    }
}

fn per_arrival(total: f64, arrived: u64) -> f64 {
    if arrived == 0 { 0.0 } else { total / arrived as f64 }
}

/// Congestion index in `[0, 100]`.
///
/// A graph with no nodes contributes no density term.
pub fn congestion_index(
    active: usize,
    queued: usize,
    total_nodes: usize,
    density_weight: f64,
    queue_weight: f64,
) -> f64 {
    let density = if total_nodes == 0 { 0.0 } else { active as f64 / total_nodes as f64 };
    let queued_ratio = queued as f64 / active.max(1) as f64;
    let score = density_weight * density + queue_weight * queued_ratio;
    if score.is_nan() {
        return 0.0;
    }
    (100.0 * score.min(1.0)).clamp(0.0, 100.0)
}

// ── SharedStats ───────────────────────────────────────────────────────────────

/// Mutex-guarded statistics shared between the worker and observers.
///
/// Every update happens under the lock, so a snapshot never sees a half
/// applied arrival.  A poisoned lock still yields the last written values.
#[derive(Clone, Debug, Default)]
pub struct SharedStats(Arc<Mutex<Statistics>>);

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A consistent copy of the current counters.
    pub fn snapshot(&self) -> Statistics {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply `f` under the lock.
    pub fn update<T>(&self, f: impl FnOnce(&mut Statistics) -> T) -> T {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
