//! The bank of t-tests and the logic that feeds it.
//!
//! One engine owns `1 + P + 1` banks:
//! - [`BankTag::Raw`]: every non-negative sample
//! - [`BankTag::Cropped(i)`](BankTag::Cropped): samples strictly below cutoff `i`
//! - [`BankTag::SecondOrder`]: squared class-centered samples, once the raw
//!   bank has seen enough class-0 samples for the centering to be stable
//!
//! Engines share nothing. Running several detectors side by side means
//! building several engines, each with its own banks and cutoffs.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENOUGH_MEASUREMENTS, DEFAULT_PERCENTILE_COUNT, DEFAULT_SECOND_ORDER_AFTER,
    DETECTION_T, T_THRESHOLD_BANANAS, T_THRESHOLD_MODERATE,
};
use crate::error::PercentileError;
use crate::math;
use crate::percentile::PercentileThresholds;
use crate::report::{LeakStatistics, Report, Verdict};
use crate::types::{Class, Sample};
use crate::welford::WelfordAccumulator;

/// Which subset of the measurements a bank tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankTag {
    /// All samples.
    Raw,
    /// Samples strictly below percentile cutoff `i`.
    Cropped(usize),
    /// Squared deviations from the raw class mean.
    SecondOrder,
}

/// One tagged two-class accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct TestBank {
    tag: BankTag,
    acc: WelfordAccumulator,
}

impl TestBank {
    fn new(tag: BankTag) -> Self {
        Self {
            tag,
            acc: WelfordAccumulator::new(),
        }
    }

    /// The subset this bank tracks.
    pub fn tag(&self) -> BankTag {
        self.tag
    }

    /// The underlying accumulator.
    pub fn accumulator(&self) -> &WelfordAccumulator {
        &self.acc
    }
}

/// Tunables of the engine and its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of cropped banks (and percentile cutoffs).
    pub percentile_count: usize,
    /// Class-0 count a bank needs before it may win the report.
    pub enough_measurements: u64,
    /// Raw class-0 count after which second-order samples are collected.
    pub second_order_after: u64,
    /// |t| above which the verdict is terminal.
    pub t_threshold_bananas: f64,
    /// |t| above which timing is probably not constant.
    pub t_threshold_moderate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percentile_count: DEFAULT_PERCENTILE_COUNT,
            enough_measurements: DEFAULT_ENOUGH_MEASUREMENTS,
            second_order_after: DEFAULT_SECOND_ORDER_AFTER,
            t_threshold_bananas: T_THRESHOLD_BANANAS,
            t_threshold_moderate: T_THRESHOLD_MODERATE,
        }
    }
}

/// What happened to one batch of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Samples pushed into the raw bank.
    pub accepted: usize,
    /// Samples dropped for a negative duration.
    pub dropped: usize,
}

/// Online leak detector over a bank of Welch t-tests.
#[derive(Debug, Clone)]
pub struct LeakTestEngine {
    config: EngineConfig,
    percentiles: PercentileThresholds,
    banks: Vec<TestBank>,
}

impl LeakTestEngine {
    /// Create an engine with empty banks and uncomputed cutoffs.
    pub fn new(config: EngineConfig) -> Self {
        let p = config.percentile_count;
        let mut banks = Vec::with_capacity(p + 2);
        banks.push(TestBank::new(BankTag::Raw));
        banks.extend((0..p).map(|i| TestBank::new(BankTag::Cropped(i))));
        banks.push(TestBank::new(BankTag::SecondOrder));

        Self {
            config,
            percentiles: PercentileThresholds::new(p),
            banks,
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cropping cutoffs.
    pub fn percentiles(&self) -> &PercentileThresholds {
        &self.percentiles
    }

    /// Whether the cutoffs still need a warm-up batch.
    pub fn needs_percentiles(&self) -> bool {
        self.percentiles.needs_warmup()
    }

    /// Derive the cutoffs from a warm-up batch, once.
    ///
    /// See [`PercentileThresholds::prepare`].
    pub fn prepare_percentiles(&mut self, durations: &[i64]) -> Result<bool, PercentileError> {
        self.percentiles.prepare(durations)
    }

    /// All banks: raw, then cropped in cutoff order, then second order.
    pub fn banks(&self) -> &[TestBank] {
        &self.banks
    }

    /// The bank carrying `tag`, if the engine has one.
    pub fn bank(&self, tag: BankTag) -> Option<&TestBank> {
        self.slot(tag).map(|i| &self.banks[i])
    }

    fn slot(&self, tag: BankTag) -> Option<usize> {
        let p = self.config.percentile_count;
        match tag {
            BankTag::Raw => Some(0),
            BankTag::Cropped(i) if i < p => Some(1 + i),
            BankTag::Cropped(_) => None,
            BankTag::SecondOrder => Some(1 + p),
        }
    }

    fn raw(&self) -> &WelfordAccumulator {
        &self.banks[0].acc
    }

    /// Feed one batch of samples into every bank that accepts them.
    pub fn update(&mut self, samples: &[Sample]) -> UpdateSummary {
        let p = self.config.percentile_count;
        let mut summary = UpdateSummary::default();

        for sample in samples {
            if sample.duration < 0 {
                summary.dropped += 1;
                continue;
            }
            summary.accepted += 1;
            let x = sample.duration as f64;

            self.banks[0].acc.push(x, sample.class);

            for (bank, &cutoff) in self.banks[1..=p]
                .iter_mut()
                .zip(self.percentiles.as_slice())
            {
                if sample.duration < cutoff {
                    bank.acc.push(x, sample.class);
                }
            }

            if self.raw().count(Class::Zero) > self.config.second_order_after {
                let centered = x - self.raw().mean(sample.class);
                self.banks[1 + p].acc.push(math::sq(centered), sample.class);
            }
        }

        summary
    }

    /// The bank with the largest |t| among those with enough class-0 samples.
    ///
    /// Ties keep the earliest bank. Returns `None` while no bank qualifies.
    pub fn max_test(&self) -> Option<&TestBank> {
        let mut best: Option<(&TestBank, f64)> = None;
        for bank in &self.banks {
            if bank.acc.count(Class::Zero) <= self.config.enough_measurements {
                continue;
            }
            let Some(t) = bank.acc.compute_t() else {
                continue;
            };
            let t = math::abs(t);
            if best.map_or(true, |(_, max)| max < t) {
                best = Some((bank, t));
            }
        }
        best.map(|(bank, _)| bank)
    }

    /// Summarize the current evidence.
    ///
    /// Falls back to the raw bank while no bank has enough measurements. The
    /// verdict is "not enough measurements" whenever the winning bank holds
    /// fewer samples than the floor or its t-statistic is undefined.
    ///
    /// `remaining` counts toward the floor first. Past the floor it counts
    /// the samples the sparser class still lacks for a defined variance.
    pub fn report(&self) -> Report {
        let winner = self.max_test().unwrap_or(&self.banks[0]);
        let measurements = winner.acc.total();
        let floor = self.config.enough_measurements;

        if measurements < floor {
            return Report::not_enough(measurements, floor - measurements);
        }

        let Some(t) = winner.acc.compute_t() else {
            let sparse = winner
                .acc
                .count(Class::Zero)
                .min(winner.acc.count(Class::One));
            return Report::not_enough(measurements, 2u64.saturating_sub(sparse).max(1));
        };

        let max_t = math::abs(t);
        let max_tau = max_t / measurements as f64;
        let needed = math::sq(DETECTION_T / max_tau);

        let verdict = if max_t > self.config.t_threshold_bananas {
            Verdict::DefinitelyNotConstantTime
        } else if max_t > self.config.t_threshold_moderate {
            Verdict::ProbablyNotConstantTime
        } else {
            Verdict::MaybeConstantTime
        };

        Report {
            measurements,
            statistics: Some(LeakStatistics {
                bank: winner.tag,
                max_t,
                max_tau,
                needed,
            }),
            verdict,
        }
    }
}

impl Default for LeakTestEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn small_config() -> EngineConfig {
        EngineConfig {
            percentile_count: 4,
            enough_measurements: 10,
            second_order_after: 20,
            ..EngineConfig::default()
        }
    }

    fn count(engine: &LeakTestEngine, tag: BankTag) -> u64 {
        engine.bank(tag).unwrap().accumulator().total()
    }

    #[test]
    fn bank_layout_is_tagged() {
        let engine = LeakTestEngine::new(small_config());
        let tags: Vec<BankTag> = engine.banks().iter().map(TestBank::tag).collect();
        assert_eq!(
            tags,
            vec![
                BankTag::Raw,
                BankTag::Cropped(0),
                BankTag::Cropped(1),
                BankTag::Cropped(2),
                BankTag::Cropped(3),
                BankTag::SecondOrder,
            ]
        );
        assert!(engine.bank(BankTag::Cropped(4)).is_none());
    }

    #[test]
    fn negative_durations_touch_no_bank() {
        let mut engine = LeakTestEngine::new(small_config());
        let warmup: Vec<i64> = (1..=100).collect();
        engine.prepare_percentiles(&warmup).unwrap();

        let summary = engine.update(&[Sample::new(-1, Class::Zero), Sample::new(-40, Class::One)]);
        assert_eq!(summary, UpdateSummary { accepted: 0, dropped: 2 });
        for bank in engine.banks() {
            assert_eq!(bank.accumulator().total(), 0, "{:?}", bank.tag());
        }
    }

    #[test]
    fn cropped_banks_exclude_samples_at_or_above_cutoff() {
        let mut engine = LeakTestEngine::new(small_config());
        let warmup: Vec<i64> = (0..1000).collect();
        engine.prepare_percentiles(&warmup).unwrap();
        let cutoff = engine.percentiles().get(0).unwrap();

        engine.update(&[
            Sample::new(cutoff - 1, Class::Zero),
            Sample::new(cutoff, Class::One),
            Sample::new(cutoff + 1, Class::Zero),
        ]);

        assert_eq!(count(&engine, BankTag::Raw), 3);
        assert_eq!(count(&engine, BankTag::Cropped(0)), 1);
        assert_eq!(count(&engine, BankTag::Cropped(3)), 3);
    }

    #[test]
    fn cropped_banks_idle_before_warmup() {
        let mut engine = LeakTestEngine::new(small_config());
        engine.update(&[Sample::new(5, Class::Zero), Sample::new(0, Class::One)]);

        assert_eq!(count(&engine, BankTag::Raw), 2);
        for i in 0..4 {
            assert_eq!(count(&engine, BankTag::Cropped(i)), 0);
        }
    }

    #[test]
    fn second_order_starts_after_raw_class_zero_exceeds_threshold() {
        let mut engine = LeakTestEngine::new(small_config());
        let zeros: Vec<Sample> = (0..20).map(|i| Sample::new(100 + i, Class::Zero)).collect();
        engine.update(&zeros);
        assert_eq!(count(&engine, BankTag::SecondOrder), 0);

        engine.update(&[Sample::new(130, Class::Zero), Sample::new(90, Class::One)]);
        assert_eq!(count(&engine, BankTag::SecondOrder), 2);

        let second = engine.bank(BankTag::SecondOrder).unwrap().accumulator();
        // The class-1 sample is its own class mean, so it centers to zero.
        assert_eq!(second.mean(Class::One), 0.0);
        assert!(second.mean(Class::Zero) > 0.0);
    }

    #[test]
    fn report_waits_for_enough_measurements() {
        let mut engine = LeakTestEngine::new(small_config());
        engine.update(&[Sample::new(1, Class::Zero), Sample::new(2, Class::One)]);

        let report = engine.report();
        assert_eq!(report.measurements, 2);
        assert!(report.statistics.is_none());
        assert_eq!(report.verdict, Verdict::NotEnoughMeasurements { remaining: 8 });
    }

    #[test]
    fn undefined_t_past_floor_counts_missing_class_samples() {
        let mut engine = LeakTestEngine::new(small_config());
        let zeros: Vec<Sample> = (0..20).map(|i| Sample::new(100 + i, Class::Zero)).collect();
        engine.update(&zeros);

        let report = engine.report();
        assert_eq!(report.measurements, 20);
        assert_eq!(report.verdict, Verdict::NotEnoughMeasurements { remaining: 2 });

        engine.update(&[Sample::new(100, Class::One)]);
        assert_eq!(
            engine.report().verdict,
            Verdict::NotEnoughMeasurements { remaining: 1 }
        );
    }

    /// Raw bank only: 1000 samples per class alternating `±10` around 100
    /// and `100 + shift`. With a sample variance of 100.1 per class, |t| is
    /// about `shift / 0.4474`.
    fn shifted_engine(shift: i64, config: EngineConfig) -> LeakTestEngine {
        let mut engine = LeakTestEngine::new(EngineConfig {
            second_order_after: u64::MAX,
            ..config
        });
        let samples: Vec<Sample> = (0..1000)
            .flat_map(|i| {
                let noise = if i % 2 == 0 { -10 } else { 10 };
                [
                    Sample::new(100 + noise, Class::Zero),
                    Sample::new(100 + shift + noise, Class::One),
                ]
            })
            .collect();
        engine.update(&samples);
        engine
    }

    #[test]
    fn moderate_t_is_maybe_under_default_threshold() {
        let report = shifted_engine(3, small_config()).report();
        let stats = report.statistics.unwrap();

        assert_eq!(stats.bank, BankTag::Raw);
        assert!(stats.max_t > 5.0 && stats.max_t <= 10.0, "|t| = {}", stats.max_t);
        assert_eq!(report.verdict, Verdict::MaybeConstantTime);
    }

    #[test]
    fn moderate_t_is_probable_leak_under_strict_threshold() {
        let strict = EngineConfig {
            t_threshold_moderate: 5.0,
            ..small_config()
        };
        let report = shifted_engine(3, strict).report();

        assert_eq!(report.verdict, Verdict::ProbablyNotConstantTime);
    }

    #[test]
    fn large_t_below_bananas_is_probable_leak() {
        let report = shifted_engine(10, small_config()).report();
        let stats = report.statistics.unwrap();

        assert!(stats.max_t > 10.0 && stats.max_t <= 500.0, "|t| = {}", stats.max_t);
        assert_eq!(report.verdict, Verdict::ProbablyNotConstantTime);
        assert!(!report.verdict.is_terminal());
    }

    #[test]
    fn clear_shift_is_definitely_not_constant_time() {
        let mut engine = LeakTestEngine::new(small_config());
        let samples: Vec<Sample> = (0..200)
            .flat_map(|i| {
                [
                    Sample::new(1000 + i % 5, Class::Zero),
                    Sample::new(2000 + i % 5, Class::One),
                ]
            })
            .collect();
        engine.prepare_percentiles(&[1000, 1001, 1500, 2000, 2001, 2002, 2003, 2004]).unwrap();
        engine.update(&samples);

        let report = engine.report();
        assert_eq!(report.verdict, Verdict::DefinitelyNotConstantTime);
        assert!(report.verdict.is_terminal());
        let stats = report.statistics.unwrap();
        assert!(stats.max_t > 500.0);
        assert!((stats.max_tau - stats.max_t / report.measurements as f64).abs() < 1e-12);
    }

    #[test]
    fn max_test_ignores_banks_below_floor() {
        let mut engine = LeakTestEngine::new(EngineConfig {
            second_order_after: 1_000,
            ..small_config()
        });
        // No sample falls under the cutoffs, so every cropped bank stays
        // below the floor and only the raw bank qualifies.
        engine.prepare_percentiles(&(0..100).collect::<Vec<i64>>()).unwrap();
        let samples: Vec<Sample> = (0..50)
            .flat_map(|i| [Sample::new(500 + i % 3, Class::Zero), Sample::new(500 + i % 4, Class::One)])
            .collect();
        engine.update(&samples);

        assert_eq!(engine.max_test().map(TestBank::tag), Some(BankTag::Raw));
    }
}
