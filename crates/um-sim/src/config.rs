//! Simulation configuration.
//!
//! `SimConfig` is an immutable bag of parameters supplied before the loop
//! starts.  Loading it from a file is the application's job; with the `serde`
//! feature every field deserializes and missing fields take their defaults.

use um_core::SimClock;
use um_signal::{
    AdaptiveQueueConfig, ControlStrategy, EnergySavingConfig, FixedTimeConfig, StrategyMode,
};

use crate::{SimError, SimResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Seconds of simulated time per tick.
    pub tick_secs: f64,

    /// The loop stops once elapsed time reaches this.
    pub duration_secs: f64,

    /// Mean vehicles spawned per simulated second.
    pub generation_rate: f64,

    /// No vehicles are spawned once elapsed time exceeds this.
    pub generation_cutoff_secs: f64,

    /// Which control strategy every light runs.
    pub mode: StrategyMode,

    pub fixed:    FixedTimeConfig,
    pub adaptive: AdaptiveQueueConfig,
    pub energy:   EnergySavingConfig,

    /// Queue length on the planned heading above which a vehicle looks for a
    /// detour.  0 disables redirects.
    pub redirect_threshold: usize,

    /// Biases adaptive and energy-saving greens upward.
    pub peak_hour: bool,

    /// Master RNG seed.  The same seed and graph reproduce a run exactly.
    pub seed: u64,

    /// Litres per second while moving.
    pub fuel_moving_lps: f64,
    /// Litres per second while waiting at a light.
    pub fuel_idle_lps: f64,

    /// Weight of the active-vehicles-per-node term of the congestion index.
    pub congestion_density_weight: f64,
    /// Weight of the queued-vehicles-per-active-vehicle term.
    pub congestion_queue_weight: f64,

    /// Call `SimObserver::on_snapshot` every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_secs:              1.0,
            duration_secs:          3_600.0,
            generation_rate:        0.5,
            generation_cutoff_secs: 100.0,
            mode:                   StrategyMode::AdaptiveQueue,
            fixed:                  FixedTimeConfig::default(),
            adaptive:               AdaptiveQueueConfig::default(),
            energy:                 EnergySavingConfig::default(),
            redirect_threshold:     10,
            peak_hour:              false,
            seed:                   42,
            fuel_moving_lps:        0.0005,
            fuel_idle_lps:          0.0002,
            congestion_density_weight: 0.3,
            congestion_queue_weight:   0.7,
            snapshot_interval_ticks:   60,
        }
    }
}

impl SimConfig {
    /// The control strategy selected by `mode`, with its config.
    pub fn strategy(&self) -> ControlStrategy {
        match self.mode {
            StrategyMode::FixedTime     => ControlStrategy::FixedTime(self.fixed.clone()),
            StrategyMode::AdaptiveQueue => ControlStrategy::AdaptiveQueue(self.adaptive.clone()),
            StrategyMode::EnergySaving  => ControlStrategy::EnergySaving(self.energy.clone()),
        }
    }

    /// Number of ticks the full run takes.
    pub fn total_ticks(&self) -> u64 {
        SimClock::new(self.tick_secs).map_or(0, |clock| clock.ticks_for_secs(self.duration_secs))
    }

    /// Reject values the loop cannot run with.  Only the strategy selected
    /// by `mode` is validated.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0) {
            return Err(config_err("tick_secs", self.tick_secs, "must be positive"));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(config_err("duration_secs", self.duration_secs, "must be >= 0"));
        }
        if !(self.generation_rate.is_finite() && self.generation_rate >= 0.0) {
            return Err(config_err("generation_rate", self.generation_rate, "must be >= 0"));
        }
        if self.generation_cutoff_secs.is_nan() {
            return Err(config_err("generation_cutoff_secs", self.generation_cutoff_secs, "is NaN"));
        }
        for (name, value) in [
            ("fuel_moving_lps", self.fuel_moving_lps),
            ("fuel_idle_lps", self.fuel_idle_lps),
            ("congestion_density_weight", self.congestion_density_weight),
            ("congestion_queue_weight", self.congestion_queue_weight),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(config_err(name, value, "must be >= 0"));
            }
        }
        self.strategy().validate()?;
        Ok(())
    }
}

fn config_err(field: &str, value: f64, rule: &str) -> SimError {
    SimError::Config(format!("{field} {rule}, got {value}"))
}
