//! # ctprobe
//!
//! Online detection of timing leaks in RSA-OAEP decryption.
//!
//! A run repeatedly generates two classes of inputs, times the subject
//! routine on each of them, and feeds the timings to a bank of Welch
//! t-tests from [`ctprobe_core`]. The default subject is OAEP decryption
//! probed the way Manger's attack probes it:
//!
//! - class 0: ciphertexts whose integer is at least the modulus, which
//!   decryption rejects before exponentiating
//! - class 1: valid ciphertexts that run the full private-key operation
//!
//! A decryptor that rejects the first class measurably faster is a timing
//! oracle for Manger's attack.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ctprobe::{output, Detector, StopCondition};
//!
//! let mut driver = Detector::new().manger_test_key()?;
//! driver.run(&StopCondition::Rounds(100), |report| {
//!     println!("{}", output::format_report(report));
//! })?;
//! ```
//!
//! ## Common Pitfall: Work Inside the Timed Region
//!
//! Only [`Workload::execute`] runs between the two clock reads. Input
//! generation, labeling, logging and sample storage all happen outside it;
//! a workload that allocates or logs in `execute` measures itself.

#![warn(clippy::all)]

mod config;
mod detector;
mod driver;
mod error;

pub mod crypto;
pub mod measurement;
pub mod output;
pub mod workload;

pub use config::Config;
pub use detector::Detector;
pub use driver::{Driver, StopCondition};
pub use error::Error;
pub use measurement::{Timer, TimerSpec};
pub use workload::{Labeled, LeftPadWorkload, MangerWorkload, PadRoutine, Workload};

pub use ctprobe_core::{
    BankTag, Class, EngineConfig, LeakStatistics, LeakTestEngine, Report, Sample, Verdict,
};
