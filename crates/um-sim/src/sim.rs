//! The `Sim` struct and its tick loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use um_core::{NodeId, SimClock, SimRng, Tick, VehicleId};
use um_signal::{LightUpdate, TrafficLight};
use um_spatial::{RoadGraph, Router};

use crate::generator::{TripPlan, VehicleGenerator};
use crate::lights::LightSet;
use crate::movement::{advance_vehicle, leave_queue};
use crate::stats::{SharedStats, Statistics, congestion_index};
use crate::vehicle::VehicleStore;
use crate::{SimConfig, SimObserver, SimResult, TickSummary};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation: graph, lights, vehicles and the fixed-step loop.
///
/// Each call to [`step`](Self::step) runs one tick:
///
/// 1. **Cut-off**: once elapsed time passes `generation_cutoff_secs`,
///    generation stops for good.
/// 2. **Generate**: spawn this tick's vehicles; trips without a route are
///    dropped and counted.
/// 3. **Lights**: every light counts down and switches phase on expiry.
/// 4. **Move**: every vehicle advances, in ascending `VehicleId` order.
/// 5. **Arrivals**: vehicles parked at their destination are folded into
///    the statistics and removed.
/// 6. **Congestion**: the index is recomputed from active and queued counts.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router> {
    pub(crate) config:     SimConfig,
    pub(crate) clock:      SimClock,
    pub(crate) graph:      RoadGraph,
    pub(crate) router:     R,
    pub(crate) lights:     LightSet,
    pub(crate) vehicles:   VehicleStore,
    pub(crate) generator:  VehicleGenerator,
    pub(crate) rng:        SimRng,
    pub(crate) stats:      SharedStats,
    pub(crate) generating: bool,
    pub(crate) stop:       Arc<AtomicBool>,
}

impl<R: Router> Sim<R> {
    // ── Running ───────────────────────────────────────────────────────────

    /// Run until elapsed time reaches `duration_secs` or a stop is requested,
    /// then report the final statistics through `on_sim_end` and return them.
    ///
    /// A [`SimError::MissingEdge`][crate::SimError::MissingEdge] halts the
    /// run immediately; `on_sim_end` is not called in that case.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Statistics> {
        while !self.is_finished() {
            self.step(observer)?;
        }
        Ok(self.finish(observer))
    }

    /// Run exactly `n` ticks from the current position, ignoring the
    /// configured duration and the stop flag.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Emit `on_sim_end` with the current statistics and return them.
    pub fn finish<O: SimObserver>(&mut self, observer: &mut O) -> Statistics {
        let stats = self.stats.snapshot();
        observer.on_sim_end(self.clock.current_tick, &stats);
        stats
    }

    /// Run one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.clock.current_tick;
        let elapsed = self.clock.elapsed_secs();
        let dt = self.clock.tick_secs;
        observer.on_tick_start(now, elapsed);

        // ── Phase 1: generation cut-off ───────────────────────────────────
        if self.generating && elapsed > self.config.generation_cutoff_secs {
            self.generating = false;
            observer.on_generation_stopped(now, elapsed);
        }

        // ── Phase 2: generate ─────────────────────────────────────────────
        let mut spawned = 0;
        let mut dropped = 0;
        if self.generating {
            let plans = self.generator.generate(dt, &self.graph, &self.router, &mut self.rng);
            for plan in plans {
                match plan {
                    TripPlan::Routed { route } => {
                        let id = self.add_vehicle(route, elapsed);
                        spawned += 1;
                        if let Some(vehicle) = self.vehicles.get(id) {
                            observer.on_vehicle_spawned(now, vehicle);
                        }
                    }
                    TripPlan::NoRoute { origin, destination } => {
                        dropped += 1;
                        self.stats.update(Statistics::record_dropped);
                        observer.on_vehicle_dropped(now, origin, destination);
                    }
                }
            }
        }

        // ── Phase 3: lights ───────────────────────────────────────────────
        let mut phase_changes = 0;
        let peak = self.config.peak_hour;
        for light in self.lights.iter_mut() {
            match light.update(dt, peak) {
                LightUpdate::Holding => {}
                LightUpdate::Changed { from, to, duration_secs } => {
                    phase_changes += 1;
                    observer.on_phase_change(now, light.node(), from, to, duration_secs);
                }
                LightUpdate::Fallback { from, duration_secs } => {
                    phase_changes += 1;
                    observer.on_light_fallback(now, light.node(), from, duration_secs);
                }
            }
        }

        // ── Phase 4: move vehicles ────────────────────────────────────────
        let mut arrived_ids = Vec::new();
        for id in self.vehicles.ids() {
            let Some(vehicle) = self.vehicles.get_mut(id) else {
                continue;
            };
            let report = advance_vehicle(
                vehicle,
                &self.graph,
                &mut self.lights,
                &self.router,
                &self.config,
                dt,
            )?;
            if let Some(reroute) = &report.reroute {
                observer.on_vehicle_rerouted(now, reroute);
            }
            if vehicle.has_arrived() {
                arrived_ids.push(id);
            }
        }

        // ── Phase 5: arrivals ─────────────────────────────────────────────
        let end_secs = self.clock.secs_at(now.offset(1));
        let arrived = arrived_ids.len();
        for id in arrived_ids {
            if let Some(mut vehicle) = self.vehicles.remove(id) {
                leave_queue(&mut vehicle, &mut self.lights);
                self.stats.update(|s| s.record_arrival(&vehicle));
                observer.on_vehicle_arrived(now, &vehicle, end_secs);
            }
        }

        // ── Phase 6: congestion ───────────────────────────────────────────
        let active = self.vehicles.len();
        let queued = self.lights.total_queued();
        let index = congestion_index(
            active,
            queued,
            self.graph.node_count(),
            self.config.congestion_density_weight,
            self.config.congestion_queue_weight,
        );
        self.stats.update(|s| {
            s.record_congestion(index, active, queued);
            s.elapsed_secs = end_secs;
        });

        self.clock.advance();

        let summary = TickSummary {
            tick: now,
            elapsed_secs: end_secs,
            spawned,
            dropped,
            arrived,
            active,
            queued,
            phase_changes,
            congestion_index: index,
        };
        observer.on_tick_end(now, &summary);

        let interval = self.config.snapshot_interval_ticks;
        if interval > 0 && now.0 % interval == 0 {
            observer.on_snapshot(now, &self.vehicles, self.lights.as_slice());
        }

        Ok(summary)
    }

    // ── Manual spawning ───────────────────────────────────────────────────

    /// Route a vehicle from `origin` to `destination` and add it at the
    /// current time.  `None` when no route exists.
    pub fn spawn_vehicle(&mut self, origin: NodeId, destination: NodeId) -> Option<VehicleId> {
        let route = self.router.route(&self.graph, origin, destination);
        self.spawn_on_route(route.nodes)
    }

    /// Add a vehicle that follows `route` as given.  `None` for an empty
    /// route.
    ///
    /// The route is not checked against the graph; a hop with no edge makes
    /// the next [`step`](Self::step) fail with `MissingEdge`.
    pub fn spawn_on_route(&mut self, route: Vec<NodeId>) -> Option<VehicleId> {
        if route.is_empty() {
            return None;
        }
        let now = self.clock.elapsed_secs();
        Some(self.add_vehicle(route, now))
    }

    fn add_vehicle(&mut self, route: Vec<NodeId>, now_secs: f64) -> VehicleId {
        let id = self.vehicles.spawn(route, now_secs);
        self.stats.update(Statistics::record_generated);
        id
    }

    // ── Stopping ──────────────────────────────────────────────────────────

    /// Ask [`run`](Self::run) to stop after the tick in progress.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// The flag [`run`](Self::run) checks before each tick.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// `true` once the configured duration has elapsed or a stop was
    /// requested.
    pub fn is_finished(&self) -> bool {
        self.stop_requested() || self.clock.current_tick.0 >= self.config.total_ticks()
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn vehicles(&self) -> &VehicleStore {
        &self.vehicles
    }

    pub fn lights(&self) -> &[TrafficLight] {
        self.lights.as_slice()
    }

    /// The light at `node`, if it has one.
    pub fn light_at(&self, node: NodeId) -> Option<&TrafficLight> {
        self.lights.at(node)
    }

    /// The tick that will run next.
    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Simulated seconds covered by the ticks run so far.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    /// `false` once the generation cut-off has passed.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// A snapshot of the current statistics.
    pub fn stats(&self) -> Statistics {
        self.stats.snapshot()
    }

    /// A handle other threads can poll for statistics.
    pub fn shared_stats(&self) -> SharedStats {
        self.stats.clone()
    }
}
