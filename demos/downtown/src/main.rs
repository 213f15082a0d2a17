//! downtown: the urban mobility simulator on a synthetic 4×4 street grid.
//!
//! Builds the grid, runs the simulation on a worker thread, polls the
//! published view for progress and prints the final statistics.

mod cli;
mod network;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{error, info};

use um_core::{NodeId, Tick, VehicleId};
use um_output::{CsvWriter, SimOutputObserver};
use um_signal::{LightPhase, TrafficLight};
use um_sim::{
    LogObserver, Reroute, SimBuilder, SimConfig, SimObserver, SimRunner, Statistics, TickSummary,
    Vehicle, VehicleStore,
};
use um_spatial::DijkstraRouter;

use cli::Cli;
use network::{CITY_HALL, SIZE, build_grid, node_key};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const JOIN_TIMEOUT:  Duration = Duration::from_secs(30);

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs every event and, when an output directory was given, writes CSV.
struct DemoObserver {
    log: LogObserver,
    csv: Option<SimOutputObserver<CsvWriter>>,
}

impl SimObserver for DemoObserver {
    fn on_vehicle_spawned(&mut self, tick: Tick, v: &Vehicle) {
        self.log.on_vehicle_spawned(tick, v);
    }

    fn on_vehicle_dropped(&mut self, tick: Tick, origin: NodeId, destination: NodeId) {
        self.log.on_vehicle_dropped(tick, origin, destination);
    }

    fn on_generation_stopped(&mut self, tick: Tick, elapsed_secs: f64) {
        self.log.on_generation_stopped(tick, elapsed_secs);
    }

    fn on_phase_change(&mut self, tick: Tick, node: NodeId, from: LightPhase, to: LightPhase, secs: f64) {
        self.log.on_phase_change(tick, node, from, to, secs);
    }

    fn on_light_fallback(&mut self, tick: Tick, node: NodeId, from: LightPhase, secs: f64) {
        self.log.on_light_fallback(tick, node, from, secs);
    }

    fn on_vehicle_rerouted(&mut self, tick: Tick, reroute: &Reroute) {
        self.log.on_vehicle_rerouted(tick, reroute);
    }

    fn on_vehicle_arrived(&mut self, tick: Tick, v: &Vehicle, arrival_secs: f64) {
        self.log.on_vehicle_arrived(tick, v, arrival_secs);
        if let Some(csv) = &mut self.csv {
            csv.on_vehicle_arrived(tick, v, arrival_secs);
        }
    }

    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.log.on_tick_end(tick, summary);
        if let Some(csv) = &mut self.csv {
            csv.on_tick_end(tick, summary);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, vehicles: &VehicleStore, lights: &[TrafficLight]) {
        if let Some(csv) = &mut self.csv {
            csv.on_snapshot(tick, vehicles, lights);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, stats: &Statistics) {
        self.log.on_sim_end(final_tick, stats);
        if let Some(csv) = &mut self.csv {
            csv.on_sim_end(final_tick, stats);
            if let Some(e) = csv.take_error() {
                error!("output error: {e}");
            } else {
                info!("wrote {} CSV rows", csv.rows_written());
            }
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // 1. Street grid.
    let graph = build_grid().context("building street grid")?;
    info!(
        "grid: {} intersections, {} directed edges, {} lights",
        graph.node_count(),
        graph.edge_count(),
        graph.signals().len(),
    );

    // 2. Config.
    let config = SimConfig {
        duration_secs:          cli.duration,
        generation_rate:        cli.rate,
        generation_cutoff_secs: cli.cutoff,
        mode:                   cli.mode.into(),
        redirect_threshold:     cli.redirect,
        peak_hour:              cli.peak,
        seed:                   cli.seed,
        ..SimConfig::default()
    };

    // 3. CSV output.
    let csv = match &cli.output {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            Some(SimOutputObserver::new(CsvWriter::new(dir)?))
        }
        None => None,
    };

    // 4. Build the sim and add one fixed trip: city hall to the far corner.
    let mut sim = SimBuilder::new(config, graph, DijkstraRouter).build()?;
    let Some(city_hall) = sim.graph().nearest_node(CITY_HALL) else {
        bail!("street grid has no intersections");
    };
    let far_corner = sim
        .graph()
        .node_id(&node_key(SIZE - 1, SIZE - 1))
        .context("grid corner missing")?;
    let tour: Option<VehicleId> = sim.spawn_vehicle(city_hall, far_corner);
    if let Some(id) = tour {
        info!("city hall tour {id}: {city_hall} -> {far_corner}");
    }

    // 5. Run on the worker thread and poll its view.
    let progress_ticks = (60.0 / sim.config().tick_secs).max(1.0) as u64;
    let observer = DemoObserver { log: LogObserver::new(progress_ticks), csv };
    let t0 = Instant::now();
    let mut handle = SimRunner::spawn(sim, observer, Duration::from_millis(cli.pace_ms));

    let mut last_reported = None;
    while !handle.is_finished() {
        thread::sleep(POLL_INTERVAL);
        let view = handle.view();
        if cli.pace_ms > 0 && last_reported != Some(view.tick) {
            let queued: usize = view.lights.iter().map(|l| l.queue_sizes.iter().sum::<usize>()).sum();
            info!(
                "view t={:.0}s vehicles={} queued={}",
                view.elapsed_secs,
                view.vehicles.len(),
                queued,
            );
            last_reported = Some(view.tick);
        }
    }

    handle.stop();
    let sim = handle.join(JOIN_TIMEOUT)?;
    let elapsed = t0.elapsed();

    // 6. Summary.
    let stats = sim.stats();
    println!();
    println!("Simulated {:.0} s in {:.3} s wall time", stats.elapsed_secs, elapsed.as_secs_f64());
    println!("{:<24} {:>10}", "vehicles generated", stats.vehicles_generated);
    println!("{:<24} {:>10}", "vehicles arrived", stats.vehicles_arrived);
    println!("{:<24} {:>10}", "vehicles dropped", stats.vehicles_dropped);
    println!("{:<24} {:>10}", "still on the road", sim.vehicles().len());
    println!("{:<24} {:>10.1}", "avg travel (s)", stats.average_travel_secs());
    println!("{:<24} {:>10.1}", "avg wait (s)", stats.average_wait_secs());
    println!("{:<24} {:>10.3}", "total fuel (L)", stats.total_fuel_litres);
    println!("{:<24} {:>10.1}", "avg congestion", stats.average_congestion());
    println!("{:<24} {:>10.1}", "peak congestion", stats.peak_congestion);

    Ok(())
}
