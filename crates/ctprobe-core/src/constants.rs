//! Default engine constants.

/// Number of percentile-cropped banks.
pub const DEFAULT_PERCENTILE_COUNT: usize = 100;

/// A bank takes part in the report only once its class-0 count exceeds this.
pub const DEFAULT_ENOUGH_MEASUREMENTS: u64 = 3_000;

/// Raw class-0 count after which second-order samples are collected.
pub const DEFAULT_SECOND_ORDER_AFTER: u64 = 10_000;

/// Above this |t| the test has failed with overwhelming probability.
pub const T_THRESHOLD_BANANAS: f64 = 500.0;

/// Default |t| above which timing is "probably not constant".
pub const T_THRESHOLD_MODERATE: f64 = 10.0;

/// Stricter moderate threshold, as used by the reference dudect tooling.
pub const T_THRESHOLD_MODERATE_STRICT: f64 = 5.0;

/// Confidence level used to extrapolate the measurements still needed.
pub const DETECTION_T: f64 = 5.0;
