//! Error types for the statistical engine.

/// A class label outside {0, 1} reached the accumulators.
///
/// This is a harness bug, never a data condition. Callers must treat it as
/// fatal: pushing the sample anyway would corrupt both classes' statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid class label {class}: expected 0 or 1")]
pub struct InvalidClass {
    /// The offending label.
    pub class: usize,
}

/// Percentile thresholds could not be derived from the warm-up batch.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PercentileError {
    /// The warm-up batch held no usable (non-negative) durations.
    #[error("warm-up batch is empty")]
    EmptyBatch,

    /// The targeted rank falls outside the batch.
    ///
    /// The batch is too small for the requested tail probability.
    #[error("percentile rank {rank} out of range for {len} samples (p = {probability})")]
    RankOutOfRange {
        /// Computed rank, `floor(probability * len)`.
        rank: usize,
        /// Number of samples in the batch.
        len: usize,
        /// Targeted cumulative probability.
        probability: f64,
    },
}
