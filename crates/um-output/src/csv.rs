//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `tick_summaries.csv`
//! - `vehicle_arrivals.csv`
//! - `vehicle_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{ArrivalRow, OutputResult, TickSummaryRow, VehicleSnapshotRow};

pub const TICK_SUMMARY_HEADER: [&str; 9] = [
    "tick",
    "elapsed_secs",
    "spawned",
    "dropped",
    "arrived",
    "active",
    "queued",
    "phase_changes",
    "congestion_index",
];

pub const ARRIVAL_HEADER: [&str; 10] = [
    "vehicle_id",
    "origin",
    "destination",
    "spawned_at_secs",
    "arrival_secs",
    "travel_secs",
    "wait_secs",
    "fuel_litres",
    "hops",
    "reroutes",
];

pub const SNAPSHOT_HEADER: [&str; 6] =
    ["vehicle_id", "tick", "current_node", "next_node", "position", "queued"];

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    arrivals:  Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create (or truncate) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(TICK_SUMMARY_HEADER)?;

        let mut arrivals = Writer::from_path(dir.join("vehicle_arrivals.csv"))?;
        arrivals.write_record(ARRIVAL_HEADER)?;

        let mut snapshots = Writer::from_path(dir.join("vehicle_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        Ok(Self { summaries, arrivals, snapshots, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.spawned.to_string(),
            row.dropped.to_string(),
            row.arrived.to_string(),
            row.active.to_string(),
            row.queued.to_string(),
            row.phase_changes.to_string(),
            format!("{:.3}", row.congestion_index),
        ])?;
        Ok(())
    }

    fn write_arrival(&mut self, row: &ArrivalRow) -> OutputResult<()> {
        self.arrivals.write_record(&[
            row.vehicle_id.to_string(),
            row.origin.to_string(),
            row.destination.to_string(),
            row.spawned_at_secs.to_string(),
            row.arrival_secs.to_string(),
            row.travel_secs.to_string(),
            row.wait_secs.to_string(),
            format!("{:.6}", row.fuel_litres),
            row.hops.to_string(),
            row.reroutes.to_string(),
        ])?;
        Ok(())
    }

    fn write_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.vehicle_id.to_string(),
                row.tick.to_string(),
                row.current_node.to_string(),
                row.next_node.to_string(),
                format!("{:.4}", row.position),
                (row.queued as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.arrivals.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}
