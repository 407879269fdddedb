//! Percentile cutoffs for cropped t-tests.
//!
//! Cropping drops the slow tail of the distribution before testing, which is
//! where interrupts and context switches pile up. Because the right amount
//! of cropping is unknown, the engine keeps one bank per cutoff. Cutoff `i`
//! of `P` targets cumulative probability `1 - 0.5^(10 * (i + 1) / P)`, which
//! spaces the cutoffs densely near the bulk and sparsely in the tail.
//!
//! Cutoffs come from the first warm-up batch and are then frozen for the
//! lifetime of the engine, even if later rounds see a different noise
//! profile.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::PercentileError;
use crate::math;

/// Cumulative probability targeted by cutoff `index` out of `count`.
#[inline]
pub fn tail_probability(index: usize, count: usize) -> f64 {
    1.0 - math::pow(0.5, (10 * (index + 1)) as f64 / count as f64)
}

/// Nearest-rank value of a sorted batch at probability `p`.
///
/// The rank is `floor(p * len)` and must fall strictly inside the batch:
/// rank 0 would make the cutoff the minimum, which crops everything.
fn percentile_of_sorted(sorted: &[i64], p: f64) -> Result<i64, PercentileError> {
    let len = sorted.len();
    let rank = (p * len as f64) as usize;
    if rank == 0 || rank >= len {
        return Err(PercentileError::RankOutOfRange {
            rank,
            len,
            probability: p,
        });
    }
    Ok(sorted[rank])
}

/// Return `count` cutoffs of the warm-up batch, in increasing order.
///
/// Negative durations (clock went backwards) are ignored here just as they
/// are by the accumulators. Adjacent cutoffs can coincide when the batch is
/// too small to separate their target ranks or holds repeated values.
pub fn prepare_percentiles(durations: &[i64], count: usize) -> Result<Vec<i64>, PercentileError> {
    let mut sorted: Vec<i64> = durations.iter().copied().filter(|&d| d >= 0).collect();
    if sorted.is_empty() {
        return Err(PercentileError::EmptyBatch);
    }
    sorted.sort_unstable();

    (0..count)
        .map(|i| percentile_of_sorted(&sorted, tail_probability(i, count)))
        .collect()
}

/// The frozen set of cropping cutoffs.
///
/// Starts zeroed. A last cutoff of zero is the "not yet computed" sentinel,
/// so a warm-up batch whose top cutoff is itself zero leaves the thresholds
/// eligible for recomputation on the next round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentileThresholds {
    values: Vec<i64>,
}

impl PercentileThresholds {
    /// Create `count` uncomputed (zero) cutoffs.
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![0; count],
        }
    }

    /// Whether the cutoffs still need a warm-up batch.
    pub fn needs_warmup(&self) -> bool {
        self.values.last().is_some_and(|&last| last == 0)
    }

    /// Compute the cutoffs from a warm-up batch if they are not yet set.
    ///
    /// Returns `Ok(true)` when the cutoffs were (re)computed and `Ok(false)`
    /// when they were already frozen. On error the cutoffs are untouched.
    pub fn prepare(&mut self, durations: &[i64]) -> Result<bool, PercentileError> {
        if !self.needs_warmup() {
            return Ok(false);
        }
        self.values = prepare_percentiles(durations, self.values.len())?;
        Ok(true)
    }

    /// Cutoff `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    /// All cutoffs in order.
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    /// Number of cutoffs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no cutoffs at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distinct durations 0..n in a scrambled but deterministic order.
    fn scrambled(n: i64) -> Vec<i64> {
        // 7919 is prime and does not divide the sizes used below.
        (0..n).map(|i| (i * 7919) % n).collect()
    }

    #[test]
    fn tail_probabilities_match_formula() {
        assert!((tail_probability(0, 10) - 0.5).abs() < 1e-12);
        assert!((tail_probability(9, 10) - (1.0 - 0.5f64.powi(10))).abs() < 1e-12);
        assert!((tail_probability(0, 100) - (1.0 - 0.5f64.powf(0.1))).abs() < 1e-12);
    }

    #[test]
    fn cutoffs_strictly_increase_on_distinct_data() {
        for &(n, count) in &[(10_000i64, 10usize), (100_000, 100)] {
            let cutoffs = prepare_percentiles(&scrambled(n), count).unwrap();
            assert_eq!(cutoffs.len(), count);
            assert!(cutoffs.windows(2).all(|w| w[0] < w[1]), "{:?}", cutoffs);
        }
    }

    #[test]
    fn empirical_tail_fraction_matches_target() {
        let data = scrambled(50_000);
        let count = 100;
        let cutoffs = prepare_percentiles(&data, count).unwrap();

        for (i, &cutoff) in cutoffs.iter().enumerate() {
            let below = data.iter().filter(|&&d| d < cutoff).count() as f64;
            let fraction = below / data.len() as f64;
            assert!(
                (fraction - tail_probability(i, count)).abs() < 1e-3,
                "cutoff {} covers {} instead of {}",
                i,
                fraction,
                tail_probability(i, count)
            );
        }
    }

    #[test]
    fn negative_durations_ignored() {
        let mut data = scrambled(1_000);
        data.extend(core::iter::repeat(-5).take(500));
        let with_noise = prepare_percentiles(&data, 10).unwrap();
        let clean = prepare_percentiles(&scrambled(1_000), 10).unwrap();
        assert_eq!(with_noise, clean);
    }

    #[test]
    fn batch_too_small_is_an_error() {
        assert_eq!(prepare_percentiles(&[], 10), Err(PercentileError::EmptyBatch));
        assert!(matches!(
            prepare_percentiles(&[1, 2, 3], 100),
            Err(PercentileError::RankOutOfRange { rank: 0, len: 3, .. })
        ));
    }

    #[test]
    fn thresholds_freeze_after_first_batch() {
        let mut thresholds = PercentileThresholds::new(10);
        assert!(thresholds.needs_warmup());

        assert_eq!(thresholds.prepare(&scrambled(1_000)), Ok(true));
        let frozen = thresholds.clone();
        assert!(!thresholds.needs_warmup());

        let slower: Vec<i64> = scrambled(1_000).iter().map(|d| d * 10).collect();
        assert_eq!(thresholds.prepare(&slower), Ok(false));
        assert_eq!(thresholds, frozen);
    }

    #[test]
    fn zero_top_cutoff_keeps_sentinel_armed() {
        // All-zero timings (a timer too coarse for the subject) leave the
        // last cutoff at zero, which reads as "not computed".
        let mut thresholds = PercentileThresholds::new(10);
        assert_eq!(thresholds.prepare(&[0; 100]), Ok(true));
        assert!(thresholds.needs_warmup());

        assert_eq!(thresholds.prepare(&scrambled(1_000)), Ok(true));
        assert!(!thresholds.needs_warmup());
    }

    #[test]
    fn failed_prepare_leaves_sentinel() {
        let mut thresholds = PercentileThresholds::new(100);
        assert!(thresholds.prepare(&[1, 2, 3]).is_err());
        assert!(thresholds.needs_warmup());
        assert!(thresholds.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn no_cutoffs_never_need_warmup() {
        let mut thresholds = PercentileThresholds::new(0);
        assert!(!thresholds.needs_warmup());
        assert_eq!(thresholds.prepare(&[]), Ok(false));
    }
}
