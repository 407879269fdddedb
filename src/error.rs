//! Crate-level error type.

use ctprobe_core::{InvalidClass, PercentileError};

use crate::crypto::{KeyError, RsaError};

/// Anything that stops a detector run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A sample carried a class outside {0, 1}.
    #[error(transparent)]
    InvalidClass(#[from] InvalidClass),
    /// The warm-up batch could not produce percentile cutoffs.
    #[error("percentile warm-up failed: {0}")]
    Percentile(#[from] PercentileError),
    /// The subject key is malformed.
    #[error("invalid key: {0}")]
    Key(#[from] KeyError),
    /// Input generation failed.
    #[error("workload generation failed: {0}")]
    Rsa(#[from] RsaError),
}
