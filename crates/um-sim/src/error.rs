//! Simulation error type.

use std::time::Duration;

use thiserror::Error;

use um_core::{CoreError, NodeId, VehicleId};
use um_signal::SignalError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("street graph has no nodes")]
    EmptyGraph,

    #[error("street graph is not connected: {reachable} of {total} nodes reachable from the first node")]
    Disconnected { reachable: usize, total: usize },

    /// A vehicle's route steps between two nodes that no edge joins.  The
    /// route and the graph disagree, so the run cannot continue.
    #[error("{vehicle} routed over missing edge {from} -> {to}")]
    MissingEdge { vehicle: VehicleId, from: NodeId, to: NodeId },

    #[error("simulation worker did not finish within {0:?}")]
    JoinTimeout(Duration),

    #[error("simulation worker exited without reporting a result")]
    WorkerLost,
}

pub type SimResult<T> = Result<T, SimError>;
