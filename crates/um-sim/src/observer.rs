//! Simulation observer trait for diagnostics, progress and data collection.
//!
//! The engine never prints.  Everything worth reporting (spawns, drops,
//! phase changes, strategy fallbacks, detours, arrivals) is delivered to a
//! [`SimObserver`].  [`LogObserver`] forwards those events to the `log`
//! facade; tests use recording observers and assert on the events directly.

use log::{debug, info, trace, warn};

use um_core::{NodeId, Tick};
use um_signal::{LightPhase, TrafficLight};

use crate::movement::Reroute;
use crate::stats::Statistics;
use crate::vehicle::{Vehicle, VehicleStore};

/// Per-tick totals passed to [`SimObserver::on_tick_end`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    pub tick: Tick,
    /// Simulated time at the end of the tick.
    pub elapsed_secs:  f64,
    pub spawned:       usize,
    pub dropped:       usize,
    pub arrived:       usize,
    pub active:        usize,
    pub queued:        usize,
    pub phase_changes: usize,
    pub congestion_index: f64,
}

/// Callbacks invoked by [`Sim`][crate::Sim] during the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick, _elapsed_secs: f64) {}

    /// A vehicle was created with a route.
    fn on_vehicle_spawned(&mut self, _tick: Tick, _vehicle: &Vehicle) {}

    /// A trip was abandoned because no route joins its endpoints.
    fn on_vehicle_dropped(&mut self, _tick: Tick, _origin: NodeId, _destination: NodeId) {}

    /// Generation was switched off at the cut-off time.  Called once.
    fn on_generation_stopped(&mut self, _tick: Tick, _elapsed_secs: f64) {}

    fn on_phase_change(
        &mut self,
        _tick: Tick,
        _node: NodeId,
        _from: LightPhase,
        _to: LightPhase,
        _duration_secs: f64,
    ) {}

    /// A light's strategy gave no usable decision and the light fell back to
    /// its default phase.
    fn on_light_fallback(&mut self, _tick: Tick, _node: NodeId, _from: LightPhase, _duration_secs: f64) {}

    fn on_vehicle_rerouted(&mut self, _tick: Tick, _reroute: &Reroute) {}

    /// A vehicle reached its destination at `arrival_secs`.
    fn on_vehicle_arrived(&mut self, _tick: Tick, _vehicle: &Vehicle, _arrival_secs: f64) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called every `config.snapshot_interval_ticks` ticks with read-only
    /// access to the vehicles and lights.
    fn on_snapshot(&mut self, _tick: Tick, _vehicles: &VehicleStore, _lights: &[TrafficLight]) {}

    /// Called once when the run ends, with the final statistics.
    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &Statistics) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

// ── LogObserver ───────────────────────────────────────────────────────────────

/// Forwards simulation events to the `log` facade.
///
/// | Level   | Events                                               |
/// |---------|------------------------------------------------------|
/// | `trace` | spawns, arrivals                                     |
/// | `debug` | phase changes, detours                               |
/// | `info`  | progress every `progress_interval` ticks, final stats |
/// | `warn`  | dropped trips, strategy fallbacks                    |
pub struct LogObserver {
    pub progress_interval: u64,
}

impl LogObserver {
    pub fn new(progress_interval: u64) -> Self {
        Self { progress_interval }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(60)
    }
}

impl SimObserver for LogObserver {
    fn on_vehicle_spawned(&mut self, tick: Tick, vehicle: &Vehicle) {
        trace!(
            "{tick}: spawned {} {} -> {} ({} hops)",
            vehicle.id,
            vehicle.origin,
            vehicle.destination,
            vehicle.route.len().saturating_sub(1),
        );
    }

    fn on_vehicle_dropped(&mut self, tick: Tick, origin: NodeId, destination: NodeId) {
        warn!("{tick}: no route from {origin} to {destination}; trip dropped");
    }

    fn on_generation_stopped(&mut self, tick: Tick, elapsed_secs: f64) {
        info!("{tick}: vehicle generation stopped at {elapsed_secs:.0} s");
    }

    fn on_phase_change(&mut self, tick: Tick, node: NodeId, from: LightPhase, to: LightPhase, duration_secs: f64) {
        debug!("{tick}: light at {node} {from} -> {to} for {duration_secs:.1} s");
    }

    fn on_light_fallback(&mut self, tick: Tick, node: NodeId, from: LightPhase, duration_secs: f64) {
        warn!(
            "{tick}: light at {node} got no decision after {from}; \
             falling back to {} for {duration_secs:.1} s",
            LightPhase::NsGreenEwRed,
        );
    }

    fn on_vehicle_rerouted(&mut self, tick: Tick, r: &Reroute) {
        debug!(
            "{tick}: {} rerouted at {} via {} ({} -> {})",
            r.vehicle, r.at, r.via, r.planned_heading, r.new_heading,
        );
    }

    fn on_vehicle_arrived(&mut self, tick: Tick, vehicle: &Vehicle, arrival_secs: f64) {
        trace!(
            "{tick}: {} arrived at {arrival_secs:.0} s (travel {:.0} s, wait {:.0} s)",
            vehicle.id,
            vehicle.travel_secs,
            vehicle.wait_secs,
        );
    }

    fn on_tick_end(&mut self, tick: Tick, s: &TickSummary) {
        if self.progress_interval > 0 && tick.0 % self.progress_interval == 0 {
            info!(
                "t={:.0}s active={} queued={} congestion={:.1}",
                s.elapsed_secs, s.active, s.queued, s.congestion_index,
            );
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, stats: &Statistics) {
        info!(
            "run finished at {final_tick} ({:.0} s): generated={} arrived={} dropped={} \
             avg_travel={:.1}s avg_wait={:.1}s fuel={:.3}L congestion avg={:.1} peak={:.1}",
            stats.elapsed_secs,
            stats.vehicles_generated,
            stats.vehicles_arrived,
            stats.vehicles_dropped,
            stats.average_travel_secs(),
            stats.average_wait_secs(),
            stats.total_fuel_litres,
            stats.average_congestion(),
            stats.peak_congestion,
        );
    }
}
