//! Two-class online mean/variance tracking.
//!
//! Uses Welford's method (Knuth Vol. 2) so the running variance stays
//! numerically stable over hundreds of millions of samples. The variance is
//! only finalized, by dividing by `n - 1`, when the t-statistic is computed.

use crate::error::InvalidClass;
use crate::math;
use crate::types::Class;

/// Per-class count, running mean and sum of squared deviations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WelfordAccumulator {
    n: [u64; 2],
    mean: [f64; 2],
    m2: [f64; 2],
}

impl WelfordAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation to the given class.
    #[inline]
    pub fn push(&mut self, x: f64, class: Class) {
        let c = class.index();
        self.n[c] += 1;
        let delta = x - self.mean[c];
        self.mean[c] += delta / self.n[c] as f64;
        self.m2[c] += delta * (x - self.mean[c]);
    }

    /// Add one observation under a raw class label.
    ///
    /// Nothing is recorded when the label is invalid.
    pub fn push_raw(&mut self, x: f64, class: usize) -> Result<(), InvalidClass> {
        self.push(x, Class::from_index(class)?);
        Ok(())
    }

    /// Number of observations in a class.
    #[inline]
    pub fn count(&self, class: Class) -> u64 {
        self.n[class.index()]
    }

    /// Observations across both classes.
    #[inline]
    pub fn total(&self) -> u64 {
        self.n[0] + self.n[1]
    }

    /// Running mean of a class (0.0 while empty).
    #[inline]
    pub fn mean(&self, class: Class) -> f64 {
        self.mean[class.index()]
    }

    /// Running sum of squared deviations of a class.
    #[inline]
    pub fn m2(&self, class: Class) -> f64 {
        self.m2[class.index()]
    }

    /// Sample variance `m2 / (n - 1)`, defined for `n >= 2`.
    pub fn variance(&self, class: Class) -> Option<f64> {
        let n = self.count(class);
        (n > 1).then(|| self.m2(class) / (n - 1) as f64)
    }

    /// Welch's t-statistic `(mean0 - mean1) / sqrt(var0/n0 + var1/n1)`.
    ///
    /// Returns `None` unless both classes hold at least two observations.
    /// When both classes have zero variance the statistic degenerates: equal
    /// means give 0 and different means give a signed infinity. NaN is never
    /// returned.
    pub fn compute_t(&self) -> Option<f64> {
        let var0 = self.variance(Class::Zero)?;
        let var1 = self.variance(Class::One)?;
        let n0 = self.n[0] as f64;
        let n1 = self.n[1] as f64;

        let num = self.mean[0] - self.mean[1];
        let den = math::sqrt(var0 / n0 + var1 / n1);

        if den == 0.0 {
            return Some(if num == 0.0 {
                0.0
            } else if num > 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            });
        }

        let t = num / den;
        (!t.is_nan()).then_some(t)
    }
}
