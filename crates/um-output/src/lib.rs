//! `um-output`: simulation output writers for the urban mobility simulator.
//!
//! | Backend | Files created                                                        |
//! |---------|----------------------------------------------------------------------|
//! | CSV     | `tick_summaries.csv`, `vehicle_arrivals.csv`, `vehicle_snapshots.csv` |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `um_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use um_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     log::error!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{ArrivalRow, TickSummaryRow, VehicleSnapshotRow};
pub use writer::OutputWriter;
