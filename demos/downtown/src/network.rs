//! Synthetic downtown street grid.
//!
//! Four east-west avenues crossed by four north-south streets, roughly
//! 150 m apart.  Every crossing except the four corners has a light; the
//! hints alternate so neighbouring lights start out of step.

use anyhow::Result;

use um_core::GeoPoint;
use um_spatial::{RoadGraph, RoadGraphBuilder};

pub const SIZE: usize = 4;

const ORIGIN:     GeoPoint = GeoPoint { lat: 30.6900, lon: -88.0450 };
const BLOCK_DEG:  f64 = 0.00135;
const AVENUE_KMH: f64 = 50.0;
const STREET_KMH: f64 = 40.0;

/// Rough centre of the grid, used to place the city hall trip.
pub const CITY_HALL: GeoPoint = GeoPoint { lat: 30.6920, lon: -88.0430 };

pub fn node_key(row: usize, col: usize) -> String {
    format!("r{row}c{col}")
}

fn position(row: usize, col: usize) -> GeoPoint {
    GeoPoint::new(ORIGIN.lat + row as f64 * BLOCK_DEG, ORIGIN.lon + col as f64 * BLOCK_DEG)
}

pub fn build_grid() -> Result<RoadGraph> {
    let mut b = RoadGraphBuilder::new();

    for row in 0..SIZE {
        for col in 0..SIZE {
            b.add_node(node_key(row, col), position(row, col))?;
        }
    }

    // Avenues run east-west, streets north-south; both are two-way.
    for row in 0..SIZE {
        for col in 0..SIZE {
            let here = node_key(row, col);
            if col + 1 < SIZE {
                let east = node_key(row, col + 1);
                let len = position(row, col).distance_m(position(row, col + 1));
                b.add_street(&format!("ave{row}_{col}"), &here, &east, len, AVENUE_KMH, false)?;
            }
            if row + 1 < SIZE {
                let north = node_key(row + 1, col);
                let len = position(row, col).distance_m(position(row + 1, col));
                b.add_street(&format!("st{col}_{row}"), &here, &north, len, STREET_KMH, false)?;
            }
        }
    }

    for row in 0..SIZE {
        for col in 0..SIZE {
            let corner = (row == 0 || row == SIZE - 1) && (col == 0 || col == SIZE - 1);
            if corner {
                continue;
            }
            let hint = if (row + col) % 2 == 0 { "north" } else { "east" };
            b.add_signal(&node_key(row, col), hint)?;
        }
    }

    Ok(b.build())
}
