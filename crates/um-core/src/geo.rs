//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Cardinal inference compares raw
//! degree deltas, so nodes a few metres apart must still resolve to a heading;
//! single precision would collapse those deltas into the epsilon band.

use crate::Approach;

/// Deltas at or below this many degrees are treated as "no movement" on that
/// axis when inferring a cardinal heading.
pub const HEADING_EPSILON_DEG: f64 = 1e-9;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Cardinal heading of travel from `self` to `other`.
    ///
    /// The axis with the larger absolute delta wins; its sign picks the
    /// direction (latitude up = north, longitude up = east).  Returns `None`
    /// when the deltas tie or the dominant one is within
    /// [`HEADING_EPSILON_DEG`]; callers treat that as an unknown approach.
    pub fn heading_to(self, other: GeoPoint) -> Option<Approach> {
        let d_lat = other.lat - self.lat;
        let d_lon = other.lon - self.lon;

        if (d_lat.abs() - d_lon.abs()).abs() <= HEADING_EPSILON_DEG {
            return None;
        }
        if d_lat.abs() > d_lon.abs() {
            if d_lat > 0.0 { Some(Approach::North) } else { Some(Approach::South) }
        } else if d_lon > 0.0 {
            Some(Approach::East)
        } else {
            Some(Approach::West)
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
