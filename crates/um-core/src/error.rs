//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` with a
//! `#[from]` variant where they surface one.

use thiserror::Error;

/// Errors produced by `um-core` parsing and validation helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown approach direction {0:?}")]
    UnknownApproach(String),

    #[error("invalid tick duration: {0}")]
    InvalidTick(String),
}

/// Shorthand result type for `um-core`.
pub type CoreResult<T> = Result<T, CoreError>;
