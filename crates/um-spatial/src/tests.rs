//! Unit tests for um-spatial.
//!
//! All tests use hand-built graphs.  Every street runs at 36 km/h (10 m/s),
//! so a street's travel time in seconds is its length divided by ten.

#[cfg(test)]
mod helpers {
    use um_core::{GeoPoint, NodeId};
    use crate::{RoadGraph, RoadGraphBuilder};

    pub const SPEED: f64 = 36.0;

    /// Small grid:
    ///
    /// ```text
    ///   D ─────────── E        D=(0.001,0)      E=(0.001,0.002)
    ///   │             │
    ///   A ──── B ──── C        A=(0,0) B=(0,0.001) C=(0,0.002)
    /// ```
    ///
    /// A→B→C→E costs 10+10+10 = 30 s; A→D→E costs 50+10 = 60 s.
    pub fn grid() -> (RoadGraph, [NodeId; 5]) {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        let bb = b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        let c = b.add_node("C", GeoPoint::new(0.0, 0.002)).unwrap();
        let d = b.add_node("D", GeoPoint::new(0.001, 0.0)).unwrap();
        let e = b.add_node("E", GeoPoint::new(0.001, 0.002)).unwrap();

        b.add_street("AB", "A", "B", 100.0, SPEED, false).unwrap();
        b.add_street("BC", "B", "C", 100.0, SPEED, false).unwrap();
        b.add_street("CE", "C", "E", 100.0, SPEED, false).unwrap();
        b.add_street("AD", "A", "D", 500.0, SPEED, false).unwrap();
        b.add_street("DE", "D", "E", 100.0, SPEED, false).unwrap();

        (b.build(), [a, bb, c, d, e])
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use um_core::GeoPoint;
    use crate::{RoadGraphBuilder, SpatialError};

    #[test]
    fn empty_build() {
        let g = RoadGraphBuilder::new().build();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
        assert!(!g.is_connected());
    }

    #[test]
    fn duplicate_node_keeps_first() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(1.0, 2.0)).unwrap();
        let err = b.add_node("A", GeoPoint::new(9.0, 9.0)).unwrap_err();
        assert_eq!(err, SpatialError::DuplicateNode("A".into()));

        let g = b.build();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.node_by_key("A").unwrap().pos, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn edge_with_unknown_endpoint() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        let err = b.add_street("AX", "A", "X", 10.0, 50.0, false).unwrap_err();
        assert_eq!(err, SpatialError::UnknownNode("X".into()));
        assert_eq!(b.edge_count(), 0);
    }

    #[test]
    fn negative_length_rejected() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        let err = b.add_directed_edge("AB", "A", "B", -1.0, 50.0, true).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidEdge { .. }));
    }

    #[test]
    fn two_way_street_adds_reverse() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_street("AB", "A", "B", 100.0, 36.0, false).unwrap();
        let g = b.build();

        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge("A", "B"));
        assert!(g.contains_edge("B", "A"));
        let keys: Vec<_> = g.edges().map(|(_, e)| e.key.as_str()).collect();
        assert!(keys.contains(&"AB_rev"));
    }

    #[test]
    fn one_way_street_is_directed() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_street("AB", "A", "B", 100.0, 36.0, true).unwrap();
        let g = b.build();

        assert_eq!(g.edge_count(), 1);
        assert!(g.contains_edge("A", "B"));
        assert!(!g.contains_edge("B", "A"));
        assert!(!g.contains_edge("A", "nowhere"));
    }

    #[test]
    fn derived_edge_attributes() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_directed_edge("fast", "A", "B", 100.0, 36.0, true).unwrap();
        b.add_directed_edge("closed", "B", "A", 100.0, 0.0, true).unwrap();
        let g = b.build();

        let a = g.node_id("A").unwrap();
        let bn = g.node_id("B").unwrap();
        let fast = g.edge(g.find_edge(a, bn).unwrap());
        assert!((fast.travel_secs - 10.0).abs() < 1e-9);
        assert_eq!(fast.capacity, 3);
        assert!(fast.is_traversable());

        let closed = g.edge(g.find_edge(bn, a).unwrap());
        assert!(closed.travel_secs.is_infinite());
        assert_eq!(closed.capacity, 0);
        assert!(!closed.is_traversable());
    }

    #[test]
    fn signals_set_light_flag() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_signal("B", "east-west").unwrap();
        assert_eq!(
            b.add_signal("B", "north").unwrap_err(),
            SpatialError::DuplicateSignal("B".into())
        );
        assert_eq!(
            b.add_signal("Z", "north").unwrap_err(),
            SpatialError::UnknownNode("Z".into())
        );
        let g = b.build();

        assert!(!g.node_by_key("A").unwrap().has_light);
        assert!(g.node_by_key("B").unwrap().has_light);
        assert_eq!(g.signals().len(), 1);
        assert_eq!(g.signals()[0].direction_hint, "east-west");
    }

    #[test]
    fn out_edges_keep_insertion_order() {
        let (g, [a, b, _, d, _]) = super::helpers::grid();
        let targets: Vec<_> = g.out_edges(a).map(|e| g.edge(e).to).collect();
        assert_eq!(targets, vec![b, d]);
        assert_eq!(g.out_degree(a), 2);
    }

    #[test]
    fn key_lookup() {
        let (g, [_, _, c, _, _]) = super::helpers::grid();
        assert!(g.contains_node("C"));
        assert!(!g.contains_node("Q"));
        assert_eq!(g.node_id("C"), Some(c));
        assert!(g.node_by_key("Q").is_none());
    }
}

// ── Connectivity & spatial index ──────────────────────────────────────────────

#[cfg(test)]
mod connectivity {
    use um_core::GeoPoint;
    use crate::RoadGraphBuilder;

    #[test]
    fn grid_is_connected() {
        let (g, [a, ..]) = super::helpers::grid();
        assert!(g.is_connected());
        assert_eq!(g.reachable_from(a), 5);
    }

    #[test]
    fn isolated_node_disconnects() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_node("lonely", GeoPoint::new(1.0, 1.0)).unwrap();
        b.add_street("AB", "A", "B", 100.0, 36.0, false).unwrap();
        let g = b.build();
        assert!(!g.is_connected());
        assert_eq!(g.reachable_from(g.node_id("A").unwrap()), 2);
    }

    #[test]
    fn nearest_node_snaps() {
        let (g, [_, b, _, _, e]) = super::helpers::grid();
        assert_eq!(g.nearest_node(GeoPoint::new(0.0001, 0.0011)), Some(b));
        assert_eq!(g.nearest_node(GeoPoint::new(0.002, 0.003)), Some(e));
        assert_eq!(g.k_nearest_nodes(GeoPoint::new(0.0, 0.001), 1), vec![b]);
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use um_core::{GeoPoint, NodeId};
    use crate::{DijkstraRouter, RoadGraphBuilder, Router, SpatialError};

    #[test]
    fn shortest_by_travel_time() {
        let (g, [a, b, c, _, e]) = super::helpers::grid();
        let r = DijkstraRouter.route(&g, a, e);
        assert_eq!(r.nodes, vec![a, b, c, e]);
        assert!((r.total_travel_secs - 30.0).abs() < 1e-9);
        assert_eq!(r.hop_count(), 3);
    }

    #[test]
    fn consecutive_nodes_are_joined_by_edges() {
        let (g, [_, _, _, d, _]) = super::helpers::grid();
        let c = g.node_id("C").unwrap();
        let r = DijkstraRouter.route(&g, d, c);
        assert_eq!(r.origin(), Some(d));
        assert_eq!(r.destination(), Some(c));

        let mut total = 0.0;
        for pair in r.nodes.windows(2) {
            let e = g.find_edge(pair[0], pair[1]).expect("hop must be an edge");
            total += g.edge(e).travel_secs;
        }
        assert!((total - r.total_travel_secs).abs() < 1e-9);
        // D→E→C = 10+10 beats D→A→B→C = 50+10+10.
        assert!((r.total_travel_secs - 20.0).abs() < 1e-9);
    }

    #[test]
    fn same_node_is_single_element() {
        let (g, [a, ..]) = super::helpers::grid();
        let r = DijkstraRouter.route(&g, a, a);
        assert_eq!(r.nodes, vec![a]);
        assert_eq!(r.total_travel_secs, 0.0);
    }

    #[test]
    fn unreachable_is_empty() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_street("AB", "A", "B", 100.0, 36.0, true).unwrap();
        let g = b.build();

        let r = DijkstraRouter.route(&g, NodeId(1), NodeId(0));
        assert!(r.is_empty());
        assert!(DijkstraRouter.route(&g, NodeId(0), NodeId(99)).is_empty());
    }

    #[test]
    fn zero_speed_edge_is_skipped() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_node("C", GeoPoint::new(0.001, 0.0)).unwrap();
        b.add_street("AB", "A", "B", 100.0, 0.0, false).unwrap();
        b.add_street("AC", "A", "C", 100.0, 36.0, false).unwrap();
        b.add_street("CB", "C", "B", 100.0, 36.0, false).unwrap();
        let g = b.build();

        let r = DijkstraRouter.route_by_key(&g, "A", "B").unwrap();
        assert_eq!(r.nodes.len(), 3, "must detour through C");
        assert!((r.total_travel_secs - 20.0).abs() < 1e-9);
    }

    #[test]
    fn zero_length_edge_is_skipped() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_street("AB", "A", "B", 0.0, 36.0, false).unwrap();
        let g = b.build();
        assert!(DijkstraRouter.route_by_key(&g, "A", "B").unwrap().is_empty());
    }

    #[test]
    fn equal_cost_prefers_first_edge() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("X", GeoPoint::new(0.001, 0.0)).unwrap();
        b.add_node("Y", GeoPoint::new(-0.001, 0.0)).unwrap();
        b.add_node("Z", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_street("AX", "A", "X", 100.0, 36.0, true).unwrap();
        b.add_street("AY", "A", "Y", 100.0, 36.0, true).unwrap();
        b.add_street("XZ", "X", "Z", 100.0, 36.0, true).unwrap();
        b.add_street("YZ", "Y", "Z", 100.0, 36.0, true).unwrap();
        let g = b.build();

        let r = DijkstraRouter.route_by_key(&g, "A", "Z").unwrap();
        let keys: Vec<_> = r.nodes.iter().map(|&n| g.node(n).key.as_str()).collect();
        assert_eq!(keys, vec!["A", "X", "Z"]);
    }

    #[test]
    fn unknown_key_is_error() {
        let (g, _) = super::helpers::grid();
        let err = DijkstraRouter.route_by_key(&g, "A", "nowhere").unwrap_err();
        assert_eq!(err, SpatialError::UnknownNode("nowhere".into()));
    }
}
