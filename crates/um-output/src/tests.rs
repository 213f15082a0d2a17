//! Tests for um-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{ARRIVAL_HEADER, CsvWriter, SNAPSHOT_HEADER, TICK_SUMMARY_HEADER};
    use crate::row::{ArrivalRow, TickSummaryRow, VehicleSnapshotRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    fn records(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn files_and_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir, "tick_summaries.csv"), TICK_SUMMARY_HEADER);
        assert_eq!(headers(&dir, "vehicle_arrivals.csv"), ARRIVAL_HEADER);
        assert_eq!(headers(&dir, "vehicle_snapshots.csv"), SNAPSHOT_HEADER);
    }

    #[test]
    fn tick_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:             3,
            elapsed_secs:     4.0,
            spawned:          2,
            dropped:          1,
            arrived:          0,
            active:           7,
            queued:           3,
            phase_changes:    1,
            congestion_index: 12.34567,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(&dir, "tick_summaries.csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "4");
        assert_eq!(&rows[0][5], "7");
        assert_eq!(&rows[0][8], "12.346");
    }

    #[test]
    fn arrival_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_arrival(&ArrivalRow {
            vehicle_id:      9,
            origin:          0,
            destination:     4,
            spawned_at_secs: 12.0,
            arrival_secs:    40.0,
            travel_secs:     28.0,
            wait_secs:       3.0,
            fuel_litres:     0.0146,
            hops:            2,
            reroutes:        1,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(&dir, "vehicle_arrivals.csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "9");
        assert_eq!(&rows[0][4], "40");
        assert_eq!(&rows[0][7], "0.014600");
        assert_eq!(&rows[0][9], "1");
    }

    #[test]
    fn snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows: Vec<_> = (0..3)
            .map(|i| VehicleSnapshotRow {
                vehicle_id:   i,
                tick:         5,
                current_node: i * 10,
                next_node:    u32::MAX,
                position:     0.25,
                queued:       i == 1,
            })
            .collect();
        w.write_snapshots(&rows).unwrap();
        w.write_snapshots(&[]).unwrap();
        w.finish().unwrap();

        let read = records(&dir, "vehicle_snapshots.csv");
        assert_eq!(read.len(), 3);
        assert_eq!(&read[1][2], "10");
        assert_eq!(&read[1][3], "4294967295");
        assert_eq!(&read[1][4], "0.2500");
        assert_eq!(&read[1][5], "1");
        assert_eq!(&read[2][5], "0");
    }

    #[test]
    fn finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("does/not/exist")).is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use um_core::{GeoPoint, Tick};
    use um_sim::{SimBuilder, SimConfig, SimObserver, TickSummary};
    use um_spatial::{DijkstraRouter, RoadGraphBuilder};

    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::row::{ArrivalRow, TickSummaryRow, VehicleSnapshotRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    /// Always fails.
    struct Broken;

    impl OutputWriter for Broken {
        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }
        fn write_arrival(&mut self, _row: &ArrivalRow) -> OutputResult<()> {
            Ok(())
        }
        fn write_snapshots(&mut self, _rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = SimOutputObserver::new(Broken);
        obs.on_tick_end(Tick(0), &TickSummary::default());
        obs.on_tick_end(Tick(1), &TickSummary::default());
        assert_eq!(obs.rows_written(), 0);
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
    }

    #[test]
    fn full_run_to_csv() {
        let mut b = RoadGraphBuilder::new();
        b.add_node("A", GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node("B", GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_street("AB", "A", "B", 100.0, 36.0, false).unwrap();
        let graph = b.build();
        let (a, bb) = (graph.node_id("A").unwrap(), graph.node_id("B").unwrap());

        let config = SimConfig {
            duration_secs: 20.0,
            generation_rate: 0.0,
            snapshot_interval_ticks: 5,
            ..SimConfig::default()
        };
        let mut sim = SimBuilder::new(config, graph, DijkstraRouter).build().unwrap();
        sim.spawn_vehicle(a, bb).unwrap();

        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 20);

        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_arrivals.csv")).unwrap();
        let arrivals: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(&arrivals[0][4], "10");
        assert_eq!(&arrivals[0][8], "1");

        // Snapshots at ticks 0 and 5 while the vehicle is on the road.
        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_snapshots.csv")).unwrap();
        assert_eq!(rdr.records().count(), 2);

        assert_eq!(obs.rows_written(), 23);
    }
}
