//! Vehicles and the id-keyed vehicle store.
//!
//! A vehicle is an entry in [`VehicleStore`]; everything else (light queues,
//! observers, the published view) refers to it by `VehicleId`.  The store is
//! a `BTreeMap`, so iteration is always in ascending id (= spawn) order and a
//! run is deterministic regardless of insertion or removal pattern.

use std::collections::BTreeMap;

use um_core::{Approach, NodeId, VehicleId};

/// One simulated vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id:          VehicleId,
    pub origin:      NodeId,
    pub destination: NodeId,

    /// Node sequence from origin to destination.  `route[route_pos]` is the
    /// node the vehicle is at (or has most recently left).
    pub route:     Vec<NodeId>,
    pub route_pos: usize,

    /// Fraction of the current edge covered, in `[0, 1)`.  0 means the
    /// vehicle is exactly at `current_node()`.
    pub position: f64,

    pub travel_secs: f64,
    pub wait_secs:   f64,
    pub fuel_litres: f64,

    /// Simulated time at which the vehicle was spawned.
    pub spawned_at_secs: f64,

    /// Light (index into the simulation's light list) and approach queue the
    /// vehicle currently occupies, if any.
    pub queued_at: Option<(usize, Approach)>,

    /// `true` once the redirect check ran at the current node.  Reset when
    /// the vehicle reaches the next node.
    pub redirect_checked: bool,

    /// Number of times the route was replaced by a detour.
    pub reroutes: u32,
}

impl Vehicle {
    /// A vehicle parked at the first node of `route`.
    ///
    /// `route` must be non-empty.
    pub fn new(id: VehicleId, route: Vec<NodeId>, spawned_at_secs: f64) -> Self {
        let origin = route.first().copied().unwrap_or(NodeId::INVALID);
        let destination = route.last().copied().unwrap_or(NodeId::INVALID);
        Self {
            id,
            origin,
            destination,
            route,
            route_pos: 0,
            position: 0.0,
            travel_secs: 0.0,
            wait_secs: 0.0,
            fuel_litres: 0.0,
            spawned_at_secs,
            queued_at: None,
            redirect_checked: false,
            reroutes: 0,
        }
    }

    #[inline]
    pub fn current_node(&self) -> NodeId {
        self.route[self.route_pos]
    }

    #[inline]
    pub fn next_node(&self) -> Option<NodeId> {
        self.route.get(self.route_pos + 1).copied()
    }

    #[inline]
    pub fn previous_node(&self) -> Option<NodeId> {
        self.route_pos.checked_sub(1).map(|i| self.route[i])
    }

    /// The part of the route not yet reached, starting at the current node.
    pub fn remaining_route(&self) -> &[NodeId] {
        &self.route[self.route_pos..]
    }

    /// `true` when parked at the destination.
    #[inline]
    pub fn has_arrived(&self) -> bool {
        self.position == 0.0 && self.current_node() == self.destination
    }

    #[inline]
    pub fn is_queued(&self) -> bool {
        self.queued_at.is_some()
    }
}

// ── VehicleStore ──────────────────────────────────────────────────────────────

/// Active vehicles keyed by id.  Ids are issued sequentially and never
/// reused within a run.
#[derive(Clone, Debug, Default)]
pub struct VehicleStore {
    vehicles: BTreeMap<VehicleId, Vehicle>,
    next_id:  VehicleId,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vehicle on `route` and return its id.
    pub fn spawn(&mut self, route: Vec<NodeId>, now_secs: f64) -> VehicleId {
        let id = self.next_id;
        self.next_id = id.next();
        self.vehicles.insert(id, Vehicle::new(id, route, now_secs));
        id
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(&id)
    }

    pub fn remove(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.remove(&id)
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Total ids issued so far.
    pub fn issued(&self) -> u32 {
        self.next_id.0
    }
}
