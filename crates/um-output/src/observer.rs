//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use um_core::{NodeId, Tick};
use um_signal::TrafficLight;
use um_sim::{SimObserver, Statistics, TickSummary, Vehicle, VehicleStore};

use crate::row::{ArrivalRow, TickSummaryRow, VehicleSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes tick summaries, arrivals and vehicle
/// snapshots to any [`OutputWriter`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the run, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
    rows:       u64,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None, rows: 0 }
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Rows handed to the writer so far, across all files.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>, rows: usize) {
        match result {
            Ok(()) => self.rows += rows as u64,
            // Keep only the first error.
            Err(e) => {
                if self.last_error.is_none() {
                    self.last_error = Some(e);
                }
            }
        }
    }
}

fn raw(id: Option<NodeId>) -> u32 {
    id.unwrap_or(NodeId::INVALID).0
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, s: &TickSummary) {
        let row = TickSummaryRow {
            tick:             tick.0,
            elapsed_secs:     s.elapsed_secs,
            spawned:          s.spawned as u64,
            dropped:          s.dropped as u64,
            arrived:          s.arrived as u64,
            active:           s.active as u64,
            queued:           s.queued as u64,
            phase_changes:    s.phase_changes as u64,
            congestion_index: s.congestion_index,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result, 1);
    }

    fn on_vehicle_arrived(&mut self, _tick: Tick, v: &Vehicle, arrival_secs: f64) {
        let row = ArrivalRow {
            vehicle_id:      v.id.0,
            origin:          v.origin.0,
            destination:     v.destination.0,
            spawned_at_secs: v.spawned_at_secs,
            arrival_secs,
            travel_secs:     v.travel_secs,
            wait_secs:       v.wait_secs,
            fuel_litres:     v.fuel_litres,
            hops:            v.route.len().saturating_sub(1) as u32,
            reroutes:        v.reroutes,
        };
        let result = self.writer.write_arrival(&row);
        self.store_err(result, 1);
    }

    fn on_snapshot(&mut self, tick: Tick, vehicles: &VehicleStore, _lights: &[TrafficLight]) {
        let rows: Vec<VehicleSnapshotRow> = vehicles
            .iter()
            .map(|v| VehicleSnapshotRow {
                vehicle_id:   v.id.0,
                tick:         tick.0,
                current_node: v.current_node().0,
                next_node:    raw(v.next_node()),
                position:     v.position,
                queued:       v.is_queued(),
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result, rows.len());
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &Statistics) {
        let result = self.writer.finish();
        self.store_err(result, 0);
    }
}
