//! Per-intersection traffic light.
//!
//! A `TrafficLight` counts its current phase down by the simulation step and,
//! when the countdown expires, asks its strategy for the next phase.  Phase
//! changes are driven by the timer only.
//!
//! Each light also owns one FIFO queue of `VehicleId`s per approach.  The
//! vehicles themselves live in the simulation's vehicle store; a queue entry
//! is only a reference by id.

use std::collections::VecDeque;

use um_core::{Approach, NodeId, VehicleId};

use crate::{ControlStrategy, LightPhase, LightState};

/// Green time used when a strategy produces no usable decision.
pub const FALLBACK_GREEN_SECS: f64 = 10.0;

/// What happened during one [`TrafficLight::update`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum LightUpdate {
    /// The current phase is still running.
    Holding,
    /// The strategy picked the next phase.
    Changed { from: LightPhase, to: LightPhase, duration_secs: f64 },
    /// The strategy gave no decision; the light reset to north–south green
    /// for [`FALLBACK_GREEN_SECS`].
    Fallback { from: LightPhase, duration_secs: f64 },
}

#[derive(Clone, Debug)]
pub struct TrafficLight {
    node:           NodeId,
    direction_hint: String,
    phase:          LightPhase,
    remaining_secs: f64,
    /// Indexed by `Approach::index` (N, E, S, W).
    queues:   [VecDeque<VehicleId>; 4],
    strategy: ControlStrategy,
}

impl TrafficLight {
    /// Create a light and let `strategy` pick its starting phase from the
    /// map's direction hint.
    pub fn new(
        node: NodeId,
        direction_hint: impl Into<String>,
        strategy: ControlStrategy,
        peak_hour: bool,
    ) -> Self {
        let direction_hint = direction_hint.into();
        let start = strategy.initialize(&direction_hint, peak_hour);
        let remaining_secs = if start.duration_secs.is_finite() && start.duration_secs > 0.0 {
            start.duration_secs
        } else {
            FALLBACK_GREEN_SECS
        };

        Self {
            node,
            direction_hint,
            phase: start.phase,
            remaining_secs,
            queues: Default::default(),
            strategy,
        }
    }

    // ── Phase machine ─────────────────────────────────────────────────────

    /// Advance the phase timer by `dt` seconds.
    ///
    /// At most one transition happens per call; the new phase starts with its
    /// full duration.
    pub fn update(&mut self, dt: f64, peak_hour: bool) -> LightUpdate {
        self.remaining_secs -= dt;
        if self.remaining_secs > 0.0 {
            return LightUpdate::Holding;
        }

        let from = self.phase;
        match self.strategy.decide(from, self.queue_sizes(), peak_hour) {
            Some(decision) => {
                self.phase = decision.phase;
                self.remaining_secs = decision.duration_secs;
                LightUpdate::Changed {
                    from,
                    to: decision.phase,
                    duration_secs: decision.duration_secs,
                }
            }
            None => {
                self.phase = LightPhase::NsGreenEwRed;
                self.remaining_secs = FALLBACK_GREEN_SECS;
                LightUpdate::Fallback { from, duration_secs: FALLBACK_GREEN_SECS }
            }
        }
    }

    /// Colour shown to vehicles arriving on `approach`.
    #[inline]
    pub fn state_for(&self, approach: Approach) -> LightState {
        self.phase.state_for(approach)
    }

    /// Colour for a direction given by name.  Names that are not a cardinal
    /// direction get red.
    pub fn state_for_direction(&self, direction: &str) -> LightState {
        direction
            .parse::<Approach>()
            .map_or(LightState::Red, |a| self.state_for(a))
    }

    // ── Queues ────────────────────────────────────────────────────────────

    pub fn add_vehicle_to_queue(&mut self, approach: Approach, vehicle: VehicleId) {
        self.queues[approach.index()].push_back(vehicle);
    }

    pub fn pop_vehicle_from_queue(&mut self, approach: Approach) -> Option<VehicleId> {
        self.queues[approach.index()].pop_front()
    }

    /// Remove `vehicle` from the `approach` queue wherever it is.  Returns
    /// `false` if it was not queued there.
    pub fn remove_from_queue(&mut self, approach: Approach, vehicle: VehicleId) -> bool {
        let queue = &mut self.queues[approach.index()];
        match queue.iter().position(|&v| v == vehicle) {
            Some(pos) => {
                queue.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn queue(&self, approach: Approach) -> &VecDeque<VehicleId> {
        &self.queues[approach.index()]
    }

    #[inline]
    pub fn queue_len(&self, approach: Approach) -> usize {
        self.queues[approach.index()].len()
    }

    /// Queue lengths in canonical order (N, E, S, W).
    pub fn queue_sizes(&self) -> [usize; 4] {
        [
            self.queues[0].len(),
            self.queues[1].len(),
            self.queues[2].len(),
            self.queues[3].len(),
        ]
    }

    pub fn total_queued(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn node(&self) -> NodeId { self.node }
    pub fn direction_hint(&self) -> &str { &self.direction_hint }
    pub fn phase(&self) -> LightPhase { self.phase }
    pub fn remaining_secs(&self) -> f64 { self.remaining_secs }
    pub fn strategy(&self) -> &ControlStrategy { &self.strategy }
}
