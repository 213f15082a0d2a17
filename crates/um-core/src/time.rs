//! Simulation time model.
//!
//! Time advances in fixed logical steps.  The canonical counter is the integer
//! `Tick`; seconds are derived from it:
//!
//!   elapsed_secs = tick * tick_secs
//!
//! Deriving elapsed time from the counter (instead of summing `tick_secs`
//! every step) keeps long runs free of accumulated floating-point drift.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Maps tick counts to simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds per tick (the fixed step `dt`).
    pub tick_secs: f64,
    /// The current tick, advanced by `SimClock::advance()` once per step.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock at tick 0.
    ///
    /// `tick_secs` must be finite and strictly positive.
    pub fn new(tick_secs: f64) -> CoreResult<Self> {
        if !tick_secs.is_finite() || tick_secs <= 0.0 {
            return Err(CoreError::InvalidTick(format!(
                "tick length must be a positive number of seconds, got {tick_secs}"
            )));
        }
        Ok(Self { tick_secs, current_tick: Tick::ZERO })
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Simulated seconds elapsed at the start of `current_tick`.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.secs_at(self.current_tick)
    }

    /// Simulated seconds at the start of `tick`.
    #[inline]
    pub fn secs_at(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.tick_secs
    }

    /// How many ticks span `secs` seconds (rounded up).
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        if secs <= 0.0 || !secs.is_finite() {
            return 0;
        }
        // Guard against 3600 / 0.1 = 36000.000000000004 rounding up to 36001.
        let raw = secs / self.tick_secs;
        let nearest = raw.round();
        if (raw - nearest).abs() < 1e-9 { nearest as u64 } else { raw.ceil() as u64 }
    }

    /// Break elapsed time into (hours, minutes, seconds).
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total = self.elapsed_secs().max(0.0) as u64;
        let hours = total / 3_600;
        let minutes = ((total % 3_600) / 60) as u32;
        let seconds = (total % 60) as u32;
        (hours, minutes, seconds)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "{} ({:02}:{:02}:{:02})", self.current_tick, h, m, s)
    }
}
