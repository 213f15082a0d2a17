//! Street graph representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** order.  Given
//! a `NodeId n`, its outgoing edges are the `EdgeId`s
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! `build()` sorts edges by source node with a *stable* sort, so each node's
//! out-edges keep the order in which they were added.  The router relies on
//! that order for deterministic tie-breaking.
//!
//! # Lookups
//!
//! Map data names nodes by string key.  An `FxHashMap<String, NodeId>` gives
//! O(1) key lookup; after that everything is indexed by `NodeId`.  An R-tree
//! (via `rstar`) maps `(lat, lon)` to the nearest node.
//!
//! # Signals
//!
//! Traffic signals are registered on the builder in a second pass, after all
//! nodes exist.  `build()` derives each node's `has_light` flag from those
//! registrations, so a built graph is never mutated.

use std::collections::VecDeque;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use um_core::{EdgeId, GeoPoint, NodeId};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a `[lat, lon]` point and its `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Good enough for picking
    /// the nearest intersection inside one city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Node / Edge ───────────────────────────────────────────────────────────────

/// A street intersection or dead end.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Key from the map data.
    pub key:       String,
    pub pos:       GeoPoint,
    /// `true` when a signal was registered for this node.
    pub has_light: bool,
}

/// One direction of a street segment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub key:           String,
    pub from:          NodeId,
    pub to:            NodeId,
    pub length_m:      f64,
    /// Free-flow travel time.  `+∞` when `max_speed_kmh` is not positive.
    pub travel_secs:   f64,
    pub one_way:       bool,
    pub max_speed_kmh: f64,
    /// Nominal vehicle capacity, one vehicle per 10 km/h of speed limit.
    pub capacity:      u32,
}

impl Edge {
    /// `false` for edges the router must not use (zero, negative or
    /// infinite travel time).
    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.travel_secs.is_finite() && self.travel_secs > 0.0
    }
}

/// A node that carries a traffic signal, with the raw direction attribute
/// from the map data (used to pick the light's starting phase).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalSite {
    pub node:           NodeId,
    pub direction_hint: String,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed street graph in CSR form plus key and spatial indexes.
///
/// Do not construct directly; use [`RoadGraphBuilder`].
pub struct RoadGraph {
    nodes: Vec<Node>,
    /// Edges sorted by source node; an `EdgeId` is a position in this vec.
    edges: Vec<Edge>,
    /// CSR row pointer, length `node_count + 1`.
    node_out_start: Vec<u32>,
    key_index:      FxHashMap<String, NodeId>,
    signals:        Vec<SignalSite>,
    spatial_idx:    RTree<NodeEntry>,
}

impl RoadGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Element access ────────────────────────────────────────────────────

    /// Node by id.  Panics if `id` is out of range.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Edge by id.  Panics if `id` is out of range.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    #[inline]
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()].pos
    }

    /// `true` if `id` indexes a node of this graph.
    #[inline]
    pub fn has_node_id(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Nodes carrying a traffic signal, in registration order.
    pub fn signals(&self) -> &[SignalSite] {
        &self.signals
    }

    // ── Key lookups ───────────────────────────────────────────────────────

    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    pub fn node_by_key(&self, key: &str) -> Option<&Node> {
        self.node_id(key).map(|id| self.node(id))
    }

    pub fn contains_node(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    /// `true` if a directed edge runs from node `from_key` to node `to_key`.
    pub fn contains_edge(&self, from_key: &str, to_key: &str) -> bool {
        match (self.node_id(from_key), self.node_id(to_key)) {
            (Some(a), Some(b)) => self.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`, in the
    /// order they were added.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// First directed edge `from → to` in out-edge order.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.has_node_id(from) {
            return None;
        }
        self.out_edges(from).find(|&e| self.edges[e.index()].to == to)
    }

    /// Number of nodes reachable from `start` over directed edges
    /// (including `start`).
    pub fn reachable_from(&self, start: NodeId) -> usize {
        if !self.has_node_id(start) {
            return 0;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        seen[start.index()] = true;
        queue.push_back(start);
        let mut count = 1;

        while let Some(node) = queue.pop_front() {
            for e in self.out_edges(node) {
                let next = self.edges[e.index()].to;
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    count += 1;
                    queue.push_back(next);
                }
            }
        }
        count
    }

    /// `true` if every node is reachable from the first node.  An empty graph
    /// is not connected.
    pub fn is_connected(&self) -> bool {
        !self.is_empty() && self.reachable_from(NodeId(0)) == self.nodes.len()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node nearest to `pos`, or `None` for an empty graph.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Pass one adds nodes and edges; pass two registers signals.  Endpoints and
/// signal nodes are referenced by key, so both passes can be driven straight
/// from map data.
///
/// # Example
///
/// ```
/// use um_core::GeoPoint;
/// use um_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
/// b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
/// b.add_street("AB", "A", "B", 100.0, 36.0, false).unwrap();
/// b.add_signal("B", "east").unwrap();
/// let graph = b.build();
/// assert_eq!(graph.edge_count(), 2);
/// assert!(graph.node_by_key("B").unwrap().has_light);
/// ```
#[derive(Default)]
pub struct RoadGraphBuilder {
    nodes:     Vec<(String, GeoPoint)>,
    key_index: FxHashMap<String, NodeId>,
    raw_edges: Vec<Edge>,
    signals:   Vec<SignalSite>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    ///
    /// A repeated key is rejected with [`SpatialError::DuplicateNode`] and the
    /// node added first is kept unchanged.
    pub fn add_node(&mut self, key: impl Into<String>, pos: GeoPoint) -> SpatialResult<NodeId> {
        let key = key.into();
        if self.key_index.contains_key(&key) {
            return Err(SpatialError::DuplicateNode(key));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.key_index.insert(key.clone(), id);
        self.nodes.push((key, pos));
        Ok(id)
    }

    /// Add a **directed** edge between two existing nodes.
    ///
    /// Edge ids are assigned by `build()`, after edges are grouped by source.
    pub fn add_directed_edge(
        &mut self,
        key: impl Into<String>,
        from_key: &str,
        to_key: &str,
        length_m: f64,
        max_speed_kmh: f64,
        one_way: bool,
    ) -> SpatialResult<()> {
        let key = key.into();
        let from = self.resolve(from_key)?;
        let to = self.resolve(to_key)?;

        if !length_m.is_finite() || length_m < 0.0 {
            return Err(SpatialError::InvalidEdge {
                key,
                reason: format!("length must be a non-negative number of metres, got {length_m}"),
            });
        }
        if max_speed_kmh.is_nan() {
            return Err(SpatialError::InvalidEdge { key, reason: "speed limit is NaN".into() });
        }

        let travel_secs = if max_speed_kmh > 0.0 {
            length_m / (max_speed_kmh / 3.6)
        } else {
            f64::INFINITY
        };
        let capacity = (max_speed_kmh / 10.0).max(0.0) as u32;

        self.raw_edges.push(Edge {
            key,
            from,
            to,
            length_m,
            travel_secs,
            one_way,
            max_speed_kmh,
            capacity,
        });
        Ok(())
    }

    /// Add a street segment.  Two-way streets also get the opposing edge,
    /// keyed `"<key>_rev"`.
    pub fn add_street(
        &mut self,
        key: &str,
        from_key: &str,
        to_key: &str,
        length_m: f64,
        max_speed_kmh: f64,
        one_way: bool,
    ) -> SpatialResult<()> {
        self.add_directed_edge(key, from_key, to_key, length_m, max_speed_kmh, one_way)?;
        if !one_way {
            self.add_directed_edge(
                format!("{key}_rev"),
                to_key,
                from_key,
                length_m,
                max_speed_kmh,
                false,
            )?;
        }
        Ok(())
    }

    /// Register a traffic signal on an existing node.
    pub fn add_signal(&mut self, node_key: &str, direction_hint: impl Into<String>) -> SpatialResult<()> {
        let node = self.resolve(node_key)?;
        if self.signals.iter().any(|s| s.node == node) {
            return Err(SpatialError::DuplicateSignal(node_key.to_owned()));
        }
        self.signals.push(SignalSite { node, direction_hint: direction_hint.into() });
        Ok(())
    }

    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    fn resolve(&self, key: &str) -> SpatialResult<NodeId> {
        self.node_id(key)
            .ok_or_else(|| SpatialError::UnknownNode(key.to_owned()))
    }

    /// Consume the builder and produce a sealed [`RoadGraph`].
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();

        // Stable: per-node edge order stays insertion order.
        let mut edges = self.raw_edges;
        edges.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &edges {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edges.len());

        let mut has_light = vec![false; node_count];
        for s in &self.signals {
            has_light[s.node.index()] = true;
        }

        let nodes: Vec<Node> = self
            .nodes
            .into_iter()
            .zip(has_light)
            .map(|((key, pos), has_light)| Node { key, pos, has_light })
            .collect();

        let entries: Vec<NodeEntry> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry { point: [n.pos.lat, n.pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadGraph {
            nodes,
            edges,
            node_out_start,
            key_index: self.key_index,
            signals: self.signals,
            spatial_idx,
        }
    }
}
