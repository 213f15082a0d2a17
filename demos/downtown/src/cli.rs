use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use um_signal::StrategyMode;

#[derive(Parser)]
#[command(name = "downtown")]
#[command(about = "Simulate traffic on a 4×4 signalised downtown grid.")]
#[command(long_about = "Simulate traffic on a 4×4 signalised downtown grid.\n\n\
    Vehicles are generated between random intersections and routed by travel time. \
    Lights run the selected control strategy. Set RUST_LOG=debug to see every phase \
    change, or RUST_LOG=trace for every vehicle.")]
pub struct Cli {
    /// Light control strategy.
    #[arg(short, long, value_enum, default_value = "adaptive")]
    pub mode: Mode,

    /// Mean vehicles generated per simulated second.
    #[arg(short, long, default_value = "0.5")]
    pub rate: f64,

    /// Simulated seconds to run.
    #[arg(short, long, default_value = "900")]
    pub duration: f64,

    /// Stop generating vehicles after this many simulated seconds.
    #[arg(long, default_value = "300")]
    pub cutoff: f64,

    /// Bias green times for peak-hour traffic.
    #[arg(long)]
    pub peak: bool,

    /// Queue length that makes a vehicle look for a detour (0 disables).
    #[arg(long, default_value = "10")]
    pub redirect: usize,

    /// Wall-clock milliseconds between ticks (0 runs flat out).
    #[arg(long, default_value = "0")]
    pub pace_ms: u64,

    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Write CSV output into this directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    Fixed,
    Adaptive,
    Energy,
}

impl From<Mode> for StrategyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Fixed    => StrategyMode::FixedTime,
            Mode::Adaptive => StrategyMode::AdaptiveQueue,
            Mode::Energy   => StrategyMode::EnergySaving,
        }
    }
}
