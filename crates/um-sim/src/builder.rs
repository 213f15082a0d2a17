//! Builder for constructing a [`Sim`].

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use um_core::{NodeId, SimClock, SimRng};
use um_spatial::{RoadGraph, Router};

use crate::generator::VehicleGenerator;
use crate::lights::LightSet;
use crate::stats::SharedStats;
use crate::vehicle::VehicleStore;
use crate::{Sim, SimConfig, SimError, SimResult};

/// Builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick length, duration, generation rate, strategy, seed, …
/// - [`RoadGraph`]: a sealed, connected graph with its signal sites
/// - `R: Router`: the routing algorithm (e.g. [`um_spatial::DijkstraRouter`])
///
/// # Optional inputs
///
/// | Method                | Default                        |
/// |-----------------------|--------------------------------|
/// | `.shared_stats(s)`    | A fresh `SharedStats`          |
/// | `.stop_flag(f)`       | A fresh, unset `AtomicBool`    |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default(), graph, DijkstraRouter).build()?;
/// sim.run(&mut LogObserver::default())?;
/// ```
pub struct SimBuilder<R: Router> {
    config: SimConfig,
    graph:  RoadGraph,
    router: R,
    stats:  Option<SharedStats>,
    stop:   Option<Arc<AtomicBool>>,
}

impl<R: Router> SimBuilder<R> {
    pub fn new(config: SimConfig, graph: RoadGraph, router: R) -> Self {
        Self { config, graph, router, stats: None, stop: None }
    }

    /// Publish statistics into an existing handle, e.g. one already held by
    /// a UI thread.
    pub fn shared_stats(mut self, stats: SharedStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Share an externally owned stop flag.
    pub fn stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Validate the config and graph, create the lights, and return a
    /// ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] / [`SimError::Signal`] for invalid parameters.
    /// - [`SimError::EmptyGraph`] if the graph has no nodes.
    /// - [`SimError::Disconnected`] if some node cannot be reached from the
    ///   first one.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;

        if self.graph.is_empty() {
            return Err(SimError::EmptyGraph);
        }
        let total = self.graph.node_count();
        let reachable = self.graph.reachable_from(NodeId(0));
        if reachable != total {
            return Err(SimError::Disconnected { reachable, total });
        }

        let clock = SimClock::new(self.config.tick_secs)?;
        let lights = LightSet::from_graph(&self.graph, &self.config.strategy(), self.config.peak_hour);
        let generator = VehicleGenerator::new(self.config.generation_rate, &self.graph);
        let rng = SimRng::new(self.config.seed);

        Ok(Sim {
            clock,
            lights,
            generator,
            rng,
            vehicles:   VehicleStore::new(),
            stats:      self.stats.unwrap_or_default(),
            stop:       self.stop.unwrap_or_default(),
            generating: true,
            config:     self.config,
            graph:      self.graph,
            router:     self.router,
        })
    }
}
