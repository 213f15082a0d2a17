//! Signal-subsystem error type.

use thiserror::Error;

/// Errors produced by `um-signal`.
#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    /// A strategy configuration failed validation.
    #[error("invalid {strategy} configuration: {reason}")]
    InvalidConfig { strategy: &'static str, reason: String },

    /// Mode selectors are 1 (fixed), 2 (adaptive) and 3 (energy saving).
    #[error("unknown traffic light mode {0} (expected 1, 2 or 3)")]
    UnknownMode(u8),
}

pub type SignalResult<T> = Result<T, SignalError>;
