//! Random trip generation.
//!
//! Each tick the generator draws how many vehicles to spawn: the whole part
//! of `rate × dt`, plus one more with probability equal to the fractional
//! part.  Over many ticks that averages to `rate` vehicles per second.
//!
//! Each new vehicle gets two distinct random nodes as origin and destination
//! and a route from the router.  A pair with no route produces
//! [`TripPlan::NoRoute`]; the caller drops it and moves on.

use um_core::{NodeId, SimRng};
use um_spatial::{RoadGraph, Router};

/// Outcome of planning one trip.
#[derive(Clone, Debug, PartialEq)]
pub enum TripPlan {
    Routed { route: Vec<NodeId> },
    NoRoute { origin: NodeId, destination: NodeId },
}

#[derive(Clone, Debug)]
pub struct VehicleGenerator {
    /// Mean vehicles per simulated second.
    rate: f64,
    /// Candidate origin/destination nodes.
    nodes: Vec<NodeId>,
}

impl VehicleGenerator {
    pub fn new(rate: f64, graph: &RoadGraph) -> Self {
        Self { rate, nodes: graph.node_ids().collect() }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of vehicles to spawn over a step of `dt` seconds.
    pub fn spawn_count(&self, dt: f64, rng: &mut SimRng) -> usize {
        let expected = (self.rate * dt).max(0.0);
        if !expected.is_finite() {
            return 0;
        }
        let whole = expected.floor();
        let fraction = expected - whole;
        let extra = fraction > 0.0 && rng.gen_bool(fraction);
        whole as usize + usize::from(extra)
    }

    /// Plan one trip between two distinct random nodes.  `None` when the
    /// graph has fewer than two nodes.
    pub fn plan_trip<R: Router>(
        &self,
        graph: &RoadGraph,
        router: &R,
        rng: &mut SimRng,
    ) -> Option<TripPlan> {
        let (origin, destination) = rng.choose_distinct_pair(&self.nodes)?;
        let route = router.route(graph, origin, destination);
        Some(if route.is_empty() {
            TripPlan::NoRoute { origin, destination }
        } else {
            TripPlan::Routed { route: route.nodes }
        })
    }

    /// Plan all trips for one step.
    pub fn generate<R: Router>(
        &self,
        dt: f64,
        graph: &RoadGraph,
        router: &R,
        rng: &mut SimRng,
    ) -> Vec<TripPlan> {
        let count = self.spawn_count(dt, rng);
        (0..count)
            .filter_map(|_| self.plan_trip(graph, router, rng))
            .collect()
    }
}
