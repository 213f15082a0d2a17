//! Per-tick vehicle advance.
//!
//! # Rules
//!
//! A vehicle parked at a node (`position == 0`) that has a next route node:
//!
//! 1. If the node has a light and redirects are enabled, runs the redirect
//!    check once (see [`try_redirect`]).
//! 2. If the node has a light, works out the approach it arrived on (bearing
//!    from the previous route node, or towards the next one when it has not
//!    moved yet).  A non-green light, or an approach that cannot be
//!    determined, holds the vehicle: it accrues wait time and idle fuel and
//!    joins that approach's queue once.
//! 3. Otherwise it leaves any queue and moves onto the edge to the next node.
//!
//! A vehicle mid-edge just keeps moving; lights are only checked at nodes.
//!
//! Travel time accrues every tick, moving or not.

use um_core::{Approach, NodeId, VehicleId};
use um_signal::LightState;
use um_spatial::{RoadGraph, Router};

use crate::lights::LightSet;
use crate::vehicle::Vehicle;
use crate::{SimConfig, SimError, SimResult};

/// A position this close to 1 counts as having reached the next node.
/// Summing `dt / travel` in floating point leaves a tiny shortfall
/// (ten steps of 0.1 give 0.9999999999999999).
pub const SNAP_EPSILON: f64 = 1e-9;

/// What one call to [`advance_vehicle`] did.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum MoveOutcome {
    /// Parked at the end of its route.
    AtDestination,
    /// Held at a light that is not green for `approach` (`None` when the
    /// approach could not be determined).
    Waiting { node: NodeId, approach: Option<Approach> },
    /// Moved along an edge; `reached` is set when it arrived at a node.
    Moved { reached: Option<NodeId> },
}

/// A detour taken at a congested light.
#[derive(Clone, PartialEq, Debug)]
pub struct Reroute {
    pub vehicle: VehicleId,
    /// The signalised node where the detour starts.
    pub at: NodeId,
    /// The next node the vehicle would have taken.
    pub avoided: NodeId,
    /// The neighbour it takes instead.
    pub via: NodeId,
    pub planned_heading: Approach,
    pub new_heading: Approach,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub reroute: Option<Reroute>,
}

/// Advance one vehicle by one step of `dt` seconds.
///
/// Fails only when the route steps over a pair of nodes that no edge joins.
pub fn advance_vehicle<R: Router>(
    vehicle: &mut Vehicle,
    graph: &RoadGraph,
    lights: &mut LightSet,
    router: &R,
    config: &SimConfig,
    dt: f64,
) -> SimResult<MoveReport> {
    vehicle.travel_secs += dt;

    let Some(mut next) = vehicle.next_node() else {
        return Ok(MoveReport { outcome: MoveOutcome::AtDestination, reroute: None });
    };
    let current = vehicle.current_node();
    let mut reroute = None;

    if vehicle.position == 0.0 {
        if let Some(light_idx) = lights.index_at(current) {
            if config.redirect_threshold > 0 && !vehicle.redirect_checked {
                vehicle.redirect_checked = true;
                reroute = try_redirect(vehicle, graph, lights, light_idx, router, config.redirect_threshold);
                if let Some(n) = vehicle.next_node() {
                    next = n;
                }
            }

            let approach = approach_into(graph, vehicle, next);
            let state = match (lights.get(light_idx), approach) {
                (Some(light), Some(a)) => light.state_for(a),
                _ => LightState::Red,
            };

            if !state.is_green() {
                vehicle.wait_secs += dt;
                vehicle.fuel_litres += config.fuel_idle_lps * dt;
                if vehicle.queued_at.is_none() {
                    if let (Some(a), Some(light)) = (approach, lights.get_mut(light_idx)) {
                        light.add_vehicle_to_queue(a, vehicle.id);
                        vehicle.queued_at = Some((light_idx, a));
                    }
                }
                return Ok(MoveReport {
                    outcome: MoveOutcome::Waiting { node: current, approach },
                    reroute,
                });
            }

            leave_queue(vehicle, lights);
        }
    }

    let edge_id = graph
        .find_edge(current, next)
        .ok_or(SimError::MissingEdge { vehicle: vehicle.id, from: current, to: next })?;
    let travel = graph.edge(edge_id).travel_secs;

    let step = if travel.is_finite() && travel > 0.0 { dt / travel } else { dt };
    vehicle.position += step;
    vehicle.fuel_litres += config.fuel_moving_lps * dt;

    let reached = if vehicle.position >= 1.0 - SNAP_EPSILON {
        vehicle.route_pos += 1;
        vehicle.position = 0.0;
        vehicle.redirect_checked = false;
        Some(next)
    } else {
        None
    };

    Ok(MoveReport { outcome: MoveOutcome::Moved { reached }, reroute })
}

/// Remove the vehicle from the light queue it occupies, if any.
pub fn leave_queue(vehicle: &mut Vehicle, lights: &mut LightSet) {
    if let Some((idx, approach)) = vehicle.queued_at.take() {
        if let Some(light) = lights.get_mut(idx) {
            light.remove_from_queue(approach, vehicle.id);
        }
    }
}

/// Heading on which the vehicle enters its current node.
fn approach_into(graph: &RoadGraph, vehicle: &Vehicle, next: NodeId) -> Option<Approach> {
    let current = graph.node_pos(vehicle.current_node());
    match vehicle.previous_node() {
        Some(prev) => graph.node_pos(prev).heading_to(current),
        None => current.heading_to(graph.node_pos(next)),
    }
}

/// Look for a detour around a long queue.
///
/// If the light's queue for the vehicle's planned heading is longer than
/// `threshold`, consider every other traversable out-neighbour except a
/// U-turn and pick the one whose heading has the shortest queue, provided it
/// is strictly shorter than the planned one.  The route from that neighbour
/// to the destination replaces the rest of the vehicle's route.  If no
/// neighbour qualifies or none has a route, nothing changes.
pub fn try_redirect<R: Router>(
    vehicle: &mut Vehicle,
    graph: &RoadGraph,
    lights: &LightSet,
    light_idx: usize,
    router: &R,
    threshold: usize,
) -> Option<Reroute> {
    let light = lights.get(light_idx)?;
    let current = vehicle.current_node();
    let planned_next = vehicle.next_node()?;
    let here = graph.node_pos(current);
    let planned = here.heading_to(graph.node_pos(planned_next))?;
    let planned_queue = light.queue_len(planned);
    if planned_queue <= threshold {
        return None;
    }

    let mut best: Option<(NodeId, Approach, usize)> = None;
    for edge_id in graph.out_edges(current) {
        let edge = graph.edge(edge_id);
        if !edge.is_traversable() || edge.to == planned_next {
            continue;
        }
        let Some(heading) = here.heading_to(graph.node_pos(edge.to)) else {
            continue;
        };
        if heading == planned || heading == planned.opposite() {
            continue;
        }
        let queue = light.queue_len(heading);
        if queue < planned_queue && best.is_none_or(|(_, _, q)| queue < q) {
            best = Some((edge.to, heading, queue));
        }
    }

    let (via, new_heading, _) = best?;
    let detour = router.route(graph, via, vehicle.destination);
    if detour.is_empty() {
        return None;
    }

    vehicle.route.truncate(vehicle.route_pos + 1);
    vehicle.route.extend(detour.nodes);
    vehicle.reroutes += 1;

    Some(Reroute {
        vehicle: vehicle.id,
        at: current,
        avoided: planned_next,
        via,
        planned_heading: planned,
        new_heading,
    })
}
