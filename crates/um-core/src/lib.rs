//! `um-core`: foundational types for the urban mobility simulator.
//!
//! Every other `um-*` crate depends on this one.  It has no `um-*`
//! dependencies and only two external ones (`rand`, `thiserror`), plus
//! optional `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `VehicleId`                       |
//! | [`geo`]         | `GeoPoint`, haversine distance, cardinal heading      |
//! | [`approach`]    | `Approach` (north / east / south / west)              |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `SimRng`                                              |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod approach;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use approach::Approach;
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId, VehicleId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
