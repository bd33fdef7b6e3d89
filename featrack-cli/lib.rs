//! Benchmark harness: drives detector/descriptor/matcher combinations over
//! a frame sequence and records per-frame statistics.

pub mod error;
pub mod runner;
pub mod source;
pub mod stats;
pub mod sweep;
pub mod vis;

pub use error::CombinationError;
pub use runner::{run_combination, Combination, CombinationOutcome};
pub use source::{load_grayscale, FrameSource};
pub use stats::{KeypointStats, StatsSinks};
pub use sweep::{run_sweep, SweepOptions, SweepSummary};
