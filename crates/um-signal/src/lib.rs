//! `um-signal`: traffic light phase machine and control strategies.
//!
//! Every signalised intersection owns one [`TrafficLight`].  The light runs a
//! strict four-phase cycle and asks its [`ControlStrategy`] how long each new
//! phase should last, based on the queue lengths on its four approaches.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`phase`]    | `LightPhase` (the 4-cycle), `LightState`                   |
//! | [`strategy`] | `ControlStrategy`, per-strategy configs, `StrategyMode`    |
//! | [`light`]    | `TrafficLight`, `LightUpdate`                              |
//! | [`error`]    | `SignalError`, `SignalResult<T>`                           |
//!
//! This crate has no knowledge of vehicles beyond their ids: queues hold
//! `VehicleId`s and the simulation loop owns the vehicles themselves.

pub mod error;
pub mod light;
pub mod phase;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use error::{SignalError, SignalResult};
pub use light::{FALLBACK_GREEN_SECS, LightUpdate, TrafficLight};
pub use phase::{LightPhase, LightState};
pub use strategy::{
    AdaptiveQueueConfig, ControlStrategy, EnergySavingConfig, FixedTimeConfig, PhaseDecision,
    StrategyMode,
};
