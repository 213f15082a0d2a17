//! Plain data row types written by output backends.
//!
//! Node and vehicle ids are written as their raw `u32` index; `u32::MAX`
//! stands for "none".

/// Totals for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:             u64,
    pub elapsed_secs:     f64,
    pub spawned:          u64,
    pub dropped:          u64,
    pub arrived:          u64,
    pub active:           u64,
    pub queued:           u64,
    pub phase_changes:    u64,
    pub congestion_index: f64,
}

/// One completed trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalRow {
    pub vehicle_id:      u32,
    pub origin:          u32,
    pub destination:     u32,
    pub spawned_at_secs: f64,
    pub arrival_secs:    f64,
    pub travel_secs:     f64,
    pub wait_secs:       f64,
    pub fuel_litres:     f64,
    /// Edges on the final route.
    pub hops:            u32,
    pub reroutes:        u32,
}

/// Where one vehicle is at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshotRow {
    pub vehicle_id:   u32,
    pub tick:         u64,
    pub current_node: u32,
    /// `u32::MAX` when parked at the destination.
    pub next_node:    u32,
    pub position:     f64,
    pub queued:       bool,
}
