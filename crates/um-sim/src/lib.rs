//! `um-sim`: fixed-step simulation loop for the urban mobility simulator.
//!
//! # Tick loop
//!
//! ```text
//! while elapsed < duration and not stopped:
//!   ① Cut-off   past generation_cutoff_secs, stop spawning (reported once).
//!   ② Generate  rate × dt vehicles between random node pairs; trips with no
//!               route are dropped and counted.
//!   ③ Lights    every light counts down; on expiry its strategy picks the
//!               next phase and duration.
//!   ④ Move      every vehicle in ascending VehicleId order: wait at a red
//!               light (queueing once), optionally detour around a long
//!               queue, otherwise advance along the current edge.
//!   ⑤ Arrivals  vehicles at their destination are folded into Statistics
//!               and removed.
//!   ⑥ Congestion index recomputed from active and queued vehicles.
//! ```
//!
//! # Modules
//!
//! | Module      | Contents                                               |
//! |-------------|--------------------------------------------------------|
//! | `config`    | [`SimConfig`] and its validation                       |
//! | `builder`   | [`SimBuilder`]                                         |
//! | `sim`       | [`Sim`] and the tick loop                              |
//! | `movement`  | Per-vehicle advance and the redirect check             |
//! | `generator` | Random trip generation                                 |
//! | `lights`    | [`LightSet`]: the run's lights indexed by node         |
//! | `vehicle`   | [`Vehicle`] and the id-keyed [`VehicleStore`]          |
//! | `stats`     | [`Statistics`], [`SharedStats`], the congestion index  |
//! | `observer`  | [`SimObserver`], [`NoopObserver`], [`LogObserver`]     |
//! | `runner`    | [`SimRunner`], [`SimHandle`], [`SimView`]              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use um_sim::{LogObserver, SimBuilder, SimConfig};
//! use um_spatial::DijkstraRouter;
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), graph, DijkstraRouter).build()?;
//! let stats = sim.run(&mut LogObserver::default())?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod generator;
pub mod lights;
pub mod movement;
pub mod observer;
pub mod runner;
pub mod sim;
pub mod stats;
pub mod vehicle;


pub use builder::SimBuilder;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use generator::{TripPlan, VehicleGenerator};
pub use lights::LightSet;
pub use movement::{MoveOutcome, MoveReport, Reroute};
pub use observer::{LogObserver, NoopObserver, SimObserver, TickSummary};
pub use runner::{LightView, SimHandle, SimRunner, SimView, VehicleView};
pub use sim::Sim;
pub use stats::{SharedStats, Statistics, congestion_index};
pub use vehicle::{Vehicle, VehicleStore};
