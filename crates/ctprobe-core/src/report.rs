//! Per-round summary of the leak evidence.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::BankTag;

/// Outcome of the current evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The winning bank holds fewer samples than the floor.
    NotEnoughMeasurements {
        /// Samples still needed to reach the floor.
        remaining: u64,
    },
    /// No evidence of a leak so far.
    MaybeConstantTime,
    /// |t| above the moderate threshold.
    ProbablyNotConstantTime,
    /// |t| above the overwhelming-evidence threshold.
    DefinitelyNotConstantTime,
}

impl Verdict {
    /// Whether further measurement cannot change the outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Verdict::DefinitelyNotConstantTime)
    }

    /// Whether a leak has been flagged, probable or definite.
    pub fn is_leak(&self) -> bool {
        matches!(
            self,
            Verdict::ProbablyNotConstantTime | Verdict::DefinitelyNotConstantTime
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NotEnoughMeasurements { remaining } => {
                write!(f, "not enough measurements ({} still to go)", remaining)
            }
            Verdict::MaybeConstantTime => f.write_str("for the moment, maybe constant time"),
            Verdict::ProbablyNotConstantTime => f.write_str("probably not constant time"),
            Verdict::DefinitelyNotConstantTime => f.write_str("definitely not constant time"),
        }
    }
}

/// Statistics of the winning bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakStatistics {
    /// The bank with the largest |t|.
    pub bank: BankTag,
    /// Its |t|.
    pub max_t: f64,
    /// |t| normalized by the bank's measurement count, comparable across
    /// experiments of different sizes.
    pub max_tau: f64,
    /// `(5 / tau)^2`: measurements needed to reach |t| = 5 at this tau.
    pub needed: f64,
}

/// Report rendered after every round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Measurements in the winning bank, both classes.
    pub measurements: u64,
    /// Present once the verdict is based on a defined t-statistic.
    pub statistics: Option<LeakStatistics>,
    /// The verdict.
    pub verdict: Verdict,
}

impl Report {
    /// A report with no statistics that still waits for `remaining` samples.
    pub(crate) fn not_enough(measurements: u64, remaining: u64) -> Self {
        Self {
            measurements,
            statistics: None,
            verdict: Verdict::NotEnoughMeasurements { remaining },
        }
    }

    /// Measurements in millions, as printed in the report line.
    pub fn measurements_millions(&self) -> f64 {
        self.measurements as f64 / 1e6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn verdict_strings() {
        assert_eq!(
            Verdict::NotEnoughMeasurements { remaining: 42 }.to_string(),
            "not enough measurements (42 still to go)"
        );
        assert_eq!(
            Verdict::MaybeConstantTime.to_string(),
            "for the moment, maybe constant time"
        );
        assert_eq!(
            Verdict::ProbablyNotConstantTime.to_string(),
            "probably not constant time"
        );
        assert_eq!(
            Verdict::DefinitelyNotConstantTime.to_string(),
            "definitely not constant time"
        );
    }

    #[test]
    fn only_definite_leak_is_terminal() {
        assert!(Verdict::DefinitelyNotConstantTime.is_terminal());
        assert!(!Verdict::ProbablyNotConstantTime.is_terminal());
        assert!(Verdict::ProbablyNotConstantTime.is_leak());
        assert!(!Verdict::MaybeConstantTime.is_leak());
    }
}
