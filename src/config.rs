//! Configuration for a detector run.

use ctprobe_core::constants::{
    DEFAULT_ENOUGH_MEASUREMENTS, DEFAULT_PERCENTILE_COUNT, DEFAULT_SECOND_ORDER_AFTER,
    T_THRESHOLD_BANANAS, T_THRESHOLD_MODERATE, T_THRESHOLD_MODERATE_STRICT,
};
use ctprobe_core::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::measurement::TimerSpec;

/// Configuration options for a [`Detector`](crate::Detector).
///
/// Serializable so a run's settings can be stored next to its reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Measurement
    // =========================================================================
    /// Inputs generated and timed per round.
    ///
    /// The first round doubles as the percentile warm-up batch. Default: 3,000.
    pub measurements_per_round: usize,

    /// Clock used for the two timestamps around each call.
    ///
    /// Default: [`TimerSpec::Monotonic`].
    pub timer: TimerSpec,

    /// Seed for every random source in the run. `None` seeds from the OS.
    pub seed: Option<u64>,

    // =========================================================================
    // Statistics
    // =========================================================================
    /// Number of percentile-cropped banks. Default: 100.
    pub percentile_count: usize,

    /// Class-0 samples a bank needs before it can win, and the total below
    /// which no verdict is given. Default: 3,000.
    pub enough_measurements: u64,

    /// Raw class-0 count after which the second-order bank is fed.
    /// Default: 10,000.
    pub second_order_after: u64,

    /// |t| above which the run stops with "definitely not constant time".
    /// Default: 500.
    pub t_threshold_bananas: f64,

    /// |t| above which the verdict is "probably not constant time".
    /// Default: 10, or 5 under [`Config::strict`].
    pub t_threshold_moderate: f64,

    // =========================================================================
    // Subject
    // =========================================================================
    /// Blind the ciphertext before the private-key operation. Default: true.
    pub blinding: bool,

    /// Re-encrypt the private-key result and compare. Default: false.
    pub check_crt: bool,

    /// Plaintext length of class-1 ciphertexts. Default: 32.
    pub message_len: usize,

    /// OAEP label. Default: empty.
    pub label: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            measurements_per_round: 3_000,
            timer: TimerSpec::Monotonic,
            seed: None,

            percentile_count: DEFAULT_PERCENTILE_COUNT,
            enough_measurements: DEFAULT_ENOUGH_MEASUREMENTS,
            second_order_after: DEFAULT_SECOND_ORDER_AFTER,
            t_threshold_bananas: T_THRESHOLD_BANANAS,
            t_threshold_moderate: T_THRESHOLD_MODERATE,

            blinding: true,
            check_crt: false,
            message_len: 32,
            label: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag "probably not constant time" from |t| > 5.
    pub fn strict() -> Self {
        Self {
            t_threshold_moderate: T_THRESHOLD_MODERATE_STRICT,
            ..Default::default()
        }
    }

    /// Small rounds and few banks, for tests and smoke runs.
    pub fn quick() -> Self {
        Self {
            measurements_per_round: 500,
            percentile_count: 10,
            enough_measurements: 400,
            second_order_after: 2_000,
            ..Default::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn measurements_per_round(mut self, n: usize) -> Self {
        assert!(n > 0, "measurements_per_round must be > 0");
        self.measurements_per_round = n;
        self
    }

    pub fn percentile_count(mut self, count: usize) -> Self {
        assert!(count > 0, "percentile_count must be > 0");
        self.percentile_count = count;
        self
    }

    pub fn enough_measurements(mut self, n: u64) -> Self {
        self.enough_measurements = n;
        self
    }

    pub fn second_order_after(mut self, n: u64) -> Self {
        self.second_order_after = n;
        self
    }

    pub fn t_threshold_bananas(mut self, t: f64) -> Self {
        assert!(t > 0.0, "t_threshold_bananas must be > 0");
        assert!(
            t > self.t_threshold_moderate,
            "t_threshold_bananas must be > t_threshold_moderate"
        );
        self.t_threshold_bananas = t;
        self
    }

    pub fn t_threshold_moderate(mut self, t: f64) -> Self {
        assert!(t > 0.0, "t_threshold_moderate must be > 0");
        assert!(
            t < self.t_threshold_bananas,
            "t_threshold_moderate must be < t_threshold_bananas"
        );
        self.t_threshold_moderate = t;
        self
    }

    pub fn timer(mut self, timer: TimerSpec) -> Self {
        self.timer = timer;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn blinding(mut self, blinding: bool) -> Self {
        self.blinding = blinding;
        self
    }

    pub fn check_crt(mut self, check: bool) -> Self {
        self.check_crt = check;
        self
    }

    pub fn message_len(mut self, len: usize) -> Self {
        self.message_len = len;
        self
    }

    pub fn label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.label = label.into();
        self
    }

    // =========================================================================
    // Resolution methods
    // =========================================================================

    /// The engine settings carried by this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            percentile_count: self.percentile_count,
            enough_measurements: self.enough_measurements,
            second_order_after: self.second_order_after,
            t_threshold_bananas: self.t_threshold_bananas,
            t_threshold_moderate: self.t_threshold_moderate,
        }
    }

    /// Check a configuration that bypassed the builder, e.g. one
    /// deserialized from a file.
    pub fn validate(&self) -> Result<(), String> {
        if self.measurements_per_round == 0 {
            return Err("measurements_per_round must be > 0".to_string());
        }
        if self.percentile_count == 0 {
            return Err("percentile_count must be > 0".to_string());
        }
        if !(self.t_threshold_moderate > 0.0) {
            return Err("t_threshold_moderate must be > 0".to_string());
        }
        if !(self.t_threshold_bananas > self.t_threshold_moderate) {
            return Err("t_threshold_bananas must be > t_threshold_moderate".to_string());
        }
        Ok(())
    }
}
