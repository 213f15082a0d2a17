//! The `OutputWriter` trait implemented by backend writers.

use crate::{ArrivalRow, OutputResult, TickSummaryRow, VehicleSnapshotRow};

/// Sink for simulation output rows.
///
/// Errors are returned to [`SimOutputObserver`][crate::SimOutputObserver],
/// which stores them for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    fn write_arrival(&mut self, row: &ArrivalRow) -> OutputResult<()>;

    /// Write a batch of vehicle positions.
    fn write_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()>;

    /// Flush all underlying files.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
