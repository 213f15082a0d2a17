//! Signal control strategies.
//!
//! All three strategies run the same four-phase cycle and the same yellow
//! time.  They differ only in how long the next green phase lasts:
//!
//! | Strategy        | Green time                                           |
//! |-----------------|------------------------------------------------------|
//! | `FixedTime`     | constant; peak hour has no effect                    |
//! | `AdaptiveQueue` | base (+5 s peak), shrunk when idle, extended per     |
//! |                 | queued vehicle above a threshold, clamped to min/max |
//! | `EnergySaving`  | base (+2 s peak), minimum when traffic is light,     |
//! |                 | capped at max                                        |
//!
//! Queue sizes are always passed in canonical approach order (N, E, S, W).

use um_core::Approach;

use crate::{LightPhase, SignalError, SignalResult};

/// Seconds added to the adaptive base green during peak hour.
pub const ADAPTIVE_PEAK_BONUS_SECS: f64 = 5.0;

/// Seconds added to the energy-saving base green during peak hour.
pub const ENERGY_PEAK_BONUS_SECS: f64 = 2.0;

/// Factor applied to the adaptive green when both incoming queues are empty
/// outside peak hour.
pub const ADAPTIVE_IDLE_FACTOR: f64 = 0.66;

// ── PhaseDecision ─────────────────────────────────────────────────────────────

/// A phase to enter and how long to hold it.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PhaseDecision {
    pub phase: LightPhase,
    pub duration_secs: f64,
}

// ── Configs ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedTimeConfig {
    pub green_secs:  f64,
    pub yellow_secs: f64,
}

impl Default for FixedTimeConfig {
    fn default() -> Self {
        Self { green_secs: 15.0, yellow_secs: 3.0 }
    }
}

impl FixedTimeConfig {
    pub fn validate(&self) -> SignalResult<()> {
        positive("fixed-time", "green_secs", self.green_secs)?;
        positive("fixed-time", "yellow_secs", self.yellow_secs)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveQueueConfig {
    pub base_green_secs: f64,
    pub yellow_secs:     f64,
    pub min_green_secs:  f64,
    pub max_green_secs:  f64,
    /// Queue length above which green is extended.
    pub queue_threshold: usize,
    /// Seconds of extra green per vehicle above the threshold.
    pub increment_per_vehicle_secs: f64,
}

impl Default for AdaptiveQueueConfig {
    fn default() -> Self {
        Self {
            base_green_secs: 10.0,
            yellow_secs:     3.0,
            min_green_secs:  5.0,
            max_green_secs:  25.0,
            queue_threshold: 2,
            increment_per_vehicle_secs: 2.0,
        }
    }
}

impl AdaptiveQueueConfig {
    pub fn validate(&self) -> SignalResult<()> {
        const NAME: &str = "adaptive-queue";
        positive(NAME, "base_green_secs", self.base_green_secs)?;
        positive(NAME, "yellow_secs", self.yellow_secs)?;
        positive(NAME, "min_green_secs", self.min_green_secs)?;
        positive(NAME, "max_green_secs", self.max_green_secs)?;
        min_le_max(NAME, self.min_green_secs, self.max_green_secs)?;
        if !self.increment_per_vehicle_secs.is_finite() || self.increment_per_vehicle_secs < 0.0 {
            return Err(SignalError::InvalidConfig {
                strategy: NAME,
                reason: format!(
                    "increment_per_vehicle_secs must be >= 0, got {}",
                    self.increment_per_vehicle_secs
                ),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergySavingConfig {
    pub base_green_secs: f64,
    pub yellow_secs:     f64,
    pub min_green_secs:  f64,
    pub max_green_secs:  f64,
    /// Combined queue on the incoming pair at or below which the light only
    /// gives minimum green.
    pub low_traffic_threshold: usize,
}

impl Default for EnergySavingConfig {
    fn default() -> Self {
        Self {
            base_green_secs: 12.0,
            yellow_secs:     3.0,
            min_green_secs:  5.0,
            max_green_secs:  40.0,
            low_traffic_threshold: 1,
        }
    }
}

impl EnergySavingConfig {
    pub fn validate(&self) -> SignalResult<()> {
        const NAME: &str = "energy-saving";
        positive(NAME, "base_green_secs", self.base_green_secs)?;
        positive(NAME, "yellow_secs", self.yellow_secs)?;
        positive(NAME, "min_green_secs", self.min_green_secs)?;
        positive(NAME, "max_green_secs", self.max_green_secs)?;
        min_le_max(NAME, self.min_green_secs, self.max_green_secs)
    }
}

fn positive(strategy: &'static str, field: &str, value: f64) -> SignalResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SignalError::InvalidConfig {
            strategy,
            reason: format!("{field} must be a positive number of seconds, got {value}"),
        })
    }
}

fn min_le_max(strategy: &'static str, min: f64, max: f64) -> SignalResult<()> {
    if min <= max {
        Ok(())
    } else {
        Err(SignalError::InvalidConfig {
            strategy,
            reason: format!("min_green_secs ({min}) exceeds max_green_secs ({max})"),
        })
    }
}

// ── StrategyMode ──────────────────────────────────────────────────────────────

/// Integer mode selector as it appears in configuration files.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum StrategyMode {
    FixedTime     = 1,
    AdaptiveQueue = 2,
    EnergySaving  = 3,
}

impl TryFrom<u8> for StrategyMode {
    type Error = SignalError;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(StrategyMode::FixedTime),
            2 => Ok(StrategyMode::AdaptiveQueue),
            3 => Ok(StrategyMode::EnergySaving),
            other => Err(SignalError::UnknownMode(other)),
        }
    }
}

impl From<StrategyMode> for u8 {
    fn from(mode: StrategyMode) -> u8 {
        mode as u8
    }
}

impl std::fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StrategyMode::FixedTime     => "fixed-time",
            StrategyMode::AdaptiveQueue => "adaptive-queue",
            StrategyMode::EnergySaving  => "energy-saving",
        })
    }
}

// ── ControlStrategy ───────────────────────────────────────────────────────────

/// The policy a light uses to time its phases.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlStrategy {
    FixedTime(FixedTimeConfig),
    AdaptiveQueue(AdaptiveQueueConfig),
    EnergySaving(EnergySavingConfig),
}

impl ControlStrategy {
    pub fn mode(&self) -> StrategyMode {
        match self {
            ControlStrategy::FixedTime(_)     => StrategyMode::FixedTime,
            ControlStrategy::AdaptiveQueue(_) => StrategyMode::AdaptiveQueue,
            ControlStrategy::EnergySaving(_)  => StrategyMode::EnergySaving,
        }
    }

    pub fn validate(&self) -> SignalResult<()> {
        match self {
            ControlStrategy::FixedTime(c)     => c.validate(),
            ControlStrategy::AdaptiveQueue(c) => c.validate(),
            ControlStrategy::EnergySaving(c)  => c.validate(),
        }
    }

    pub fn yellow_secs(&self) -> f64 {
        match self {
            ControlStrategy::FixedTime(c)     => c.yellow_secs,
            ControlStrategy::AdaptiveQueue(c) => c.yellow_secs,
            ControlStrategy::EnergySaving(c)  => c.yellow_secs,
        }
    }

    /// Starting phase and duration for a new light.
    ///
    /// A direction hint that mentions east or west (any case) starts the
    /// east–west approaches on green; anything else starts north–south.
    pub fn initialize(&self, direction_hint: &str, peak_hour: bool) -> PhaseDecision {
        let hint = direction_hint.to_ascii_lowercase();
        let phase = if hint.contains("east") || hint.contains("west") {
            LightPhase::NsRedEwGreen
        } else {
            LightPhase::NsGreenEwRed
        };

        let duration_secs = match self {
            ControlStrategy::FixedTime(c) => c.green_secs,
            ControlStrategy::AdaptiveQueue(c) => {
                let base = c.base_green_secs + peak_bonus(peak_hour, ADAPTIVE_PEAK_BONUS_SECS);
                base.max(c.min_green_secs).min(c.max_green_secs)
            }
            ControlStrategy::EnergySaving(c) => {
                let base = c.base_green_secs + peak_bonus(peak_hour, ENERGY_PEAK_BONUS_SECS);
                base.max(c.min_green_secs).min(c.max_green_secs)
            }
        };

        PhaseDecision { phase, duration_secs }
    }

    /// The phase that follows `current` and its duration.
    ///
    /// Returns `None` if the computed duration is not a positive finite
    /// number; the light then falls back to a safe default.
    pub fn decide(
        &self,
        current: LightPhase,
        queue_sizes: [usize; 4],
        peak_hour: bool,
    ) -> Option<PhaseDecision> {
        let phase = current.next();
        let duration_secs = match phase {
            LightPhase::NsYellowEwRed | LightPhase::NsRedEwYellow => self.yellow_secs(),
            LightPhase::NsRedEwGreen => self.green_secs(true, queue_sizes, peak_hour),
            LightPhase::NsGreenEwRed => self.green_secs(false, queue_sizes, peak_hour),
        };
        (duration_secs.is_finite() && duration_secs > 0.0)
            .then_some(PhaseDecision { phase, duration_secs })
    }

    /// Green duration for the pair about to receive green.
    pub fn green_secs(&self, east_west: bool, queue_sizes: [usize; 4], peak_hour: bool) -> f64 {
        let (a, b) = if east_west {
            (Approach::East, Approach::West)
        } else {
            (Approach::North, Approach::South)
        };
        let qa = queue_sizes[a.index()];
        let qb = queue_sizes[b.index()];

        match self {
            ControlStrategy::FixedTime(c) => c.green_secs,

            ControlStrategy::AdaptiveQueue(c) => {
                let mut green = c.base_green_secs + peak_bonus(peak_hour, ADAPTIVE_PEAK_BONUS_SECS);
                let longest = qa.max(qb);

                if longest == 0 && !peak_hour {
                    return c.min_green_secs.max(green * ADAPTIVE_IDLE_FACTOR).min(c.max_green_secs);
                }
                if longest > c.queue_threshold {
                    let excess = (longest - c.queue_threshold) as f64;
                    green += excess * c.increment_per_vehicle_secs;
                }
                green.min(c.max_green_secs).max(c.min_green_secs)
            }

            ControlStrategy::EnergySaving(c) => {
                let mut green = c.base_green_secs + peak_bonus(peak_hour, ENERGY_PEAK_BONUS_SECS);
                if qa.saturating_add(qb) <= c.low_traffic_threshold && !peak_hour {
                    green = c.min_green_secs;
                }
                green.min(c.max_green_secs)
            }
        }
    }
}

#[inline]
fn peak_bonus(peak_hour: bool, bonus: f64) -> f64 {
    if peak_hour { bonus } else { 0.0 }
}
