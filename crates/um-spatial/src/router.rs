//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `um-sim` calls routing through the [`Router`] trait, so an application can
//! swap in A* or a congestion-aware router without touching the loop.
//!
//! # Cost units
//!
//! Edge cost is the edge's free-flow `travel_secs` (`f64`).  Edges whose
//! travel time is not a positive finite number are skipped.
//!
//! # Failure
//!
//! An unreachable destination yields an *empty* [`Route`], never an error:
//! the generator treats "no route" as a normal, per-vehicle outcome.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use um_core::{EdgeId, NodeId};

use crate::network::RoadGraph;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence from origin to
/// destination (inclusive) and its total free-flow travel time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub total_travel_secs: f64,
}

impl Route {
    /// The "no route" value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `true` if no path was found.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of hops (edges) along the route.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn origin(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so the simulation can move onto its
/// worker thread together with its router.
pub trait Router: Send + Sync {
    /// Shortest route from `from` to `to`.
    ///
    /// Returns `[from]` when `from == to` and an empty route when `to` is
    /// unreachable or either id is not in `graph`.
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route;

    /// [`route`](Self::route) addressed by node key.
    fn route_by_key(&self, graph: &RoadGraph, from_key: &str, to_key: &str) -> SpatialResult<Route> {
        let from = graph
            .node_id(from_key)
            .ok_or_else(|| SpatialError::UnknownNode(from_key.to_owned()))?;
        let to = graph
            .node_id(to_key)
            .ok_or_else(|| SpatialError::UnknownNode(to_key.to_owned()))?;
        Ok(self.route(graph, from, to))
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR street graph, weighted by travel time.
///
/// A node's best distance is replaced only on strict improvement, so among
/// equal-cost paths the one found first in out-edge order wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route {
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total order over finite, non-negative costs for the binary heap.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(graph: &RoadGraph, from: NodeId, to: NodeId) -> Route {
    if !graph.has_node_id(from) || !graph.has_node_id(to) {
        return Route::empty();
    }
    if from == to {
        return Route { nodes: vec![from], total_travel_secs: 0.0 };
    }

    let n = graph.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut settled   = vec![false; n];

    dist[from.index()] = 0.0;

    // Reverse turns the max-heap into a min-heap; NodeId breaks exact ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;

        if node == to {
            return reconstruct(graph, &prev_edge, from, to, cost);
        }

        for edge_id in graph.out_edges(node) {
            let edge = graph.edge(edge_id);
            if !edge.is_traversable() {
                continue;
            }
            let neighbor = edge.to;
            if settled[neighbor.index()] {
                continue;
            }
            let new_cost = cost + edge.travel_secs;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge_id;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Route::empty()
}

fn reconstruct(
    graph: &RoadGraph,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_travel_secs: f64,
) -> Route {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        if !e.is_valid() {
            return Route::empty();
        }
        cur = graph.edge(e).from;
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes, total_travel_secs }
}
