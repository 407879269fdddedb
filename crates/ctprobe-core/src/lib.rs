//! Online statistics for timing side-channel detection.
//!
//! This crate holds the statistical half of `ctprobe`: a bank of two-class
//! Welford accumulators fed with raw, percentile-cropped and second-order
//! timing samples, and the dudect-style report derived from whichever bank
//! shows the largest Welch t-statistic.
//!
//! It works in `no_std` environments with only an allocator.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support for error types
//!
//! # Usage
//!
//! ```ignore
//! use ctprobe_core::{Class, EngineConfig, LeakTestEngine, Sample};
//!
//! let mut engine = LeakTestEngine::new(EngineConfig::default());
//! let samples: Vec<Sample> = collect_round();
//!
//! if engine.needs_percentiles() {
//!     let durations: Vec<i64> = samples.iter().map(|s| s.duration).collect();
//!     engine.prepare_percentiles(&durations)?;
//! }
//! engine.update(&samples);
//! println!("{}", engine.report().verdict);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod engine;
pub mod error;
pub mod math;
pub mod percentile;
pub mod report;
pub mod types;
pub mod welford;

// Re-export commonly used items at crate root
pub use engine::{BankTag, EngineConfig, LeakTestEngine, TestBank, UpdateSummary};
pub use error::{InvalidClass, PercentileError};
pub use percentile::{prepare_percentiles, tail_probability, PercentileThresholds};
pub use report::{LeakStatistics, Report, Verdict};
pub use types::{Class, Sample};
pub use welford::WelfordAccumulator;
