//! The measurement loop.
//!
//! Each round generates a batch of labeled inputs, times them one by one,
//! feeds the samples to the engine and reports. The first round also
//! provides the warm-up batch for the percentile cutoffs, which stay
//! frozen afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ctprobe_core::{Class, LeakTestEngine, Report};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Error;
use crate::measurement::{Collector, Timer};
use crate::workload::{Labeled, Workload};

/// When [`Driver::run`] returns.
#[derive(Debug, Clone, Default)]
pub enum StopCondition {
    /// After this many rounds.
    Rounds(u64),
    /// Once the flag is set. Checked between rounds.
    Signal(Arc<AtomicBool>),
    /// Only on a terminal verdict.
    #[default]
    Forever,
}

impl StopCondition {
    fn reached(&self, rounds: u64) -> bool {
        match self {
            StopCondition::Rounds(limit) => rounds >= *limit,
            StopCondition::Signal(flag) => flag.load(Ordering::Relaxed),
            StopCondition::Forever => false,
        }
    }
}

/// Owns one engine and drives a workload through it.
///
/// Nothing is shared between drivers: each has its own banks and cutoffs.
pub struct Driver<W: Workload> {
    workload: W,
    engine: LeakTestEngine,
    collector: Collector,
    rng: StdRng,
    measurements_per_round: usize,
    inputs: Vec<Labeled<W::Input>>,
    rounds: u64,
}

impl<W: Workload> Driver<W> {
    pub fn new(workload: W, config: &Config, rng: StdRng) -> Self {
        let n = config.measurements_per_round;
        Self {
            workload,
            engine: LeakTestEngine::new(config.engine_config()),
            collector: Collector::new(Timer::new(config.timer), n),
            rng,
            measurements_per_round: n,
            inputs: Vec::with_capacity(n),
            rounds: 0,
        }
    }

    pub fn workload(&self) -> &W {
        &self.workload
    }

    pub fn engine(&self) -> &LeakTestEngine {
        &self.engine
    }

    /// Rounds completed so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Run one generate, measure, update, report cycle.
    pub fn run_round(&mut self) -> Result<Report, Error> {
        self.generate()?;

        let workload = &mut self.workload;
        let samples = self
            .collector
            .collect(&self.inputs, |input| workload.execute(input));

        if self.engine.needs_percentiles() {
            let durations: Vec<i64> = samples.iter().map(|s| s.duration).collect();
            self.engine.prepare_percentiles(&durations)?;
            let cutoffs = self.engine.percentiles().as_slice();
            info!(
                count = cutoffs.len(),
                first = cutoffs.first().copied().unwrap_or_default(),
                last = cutoffs.last().copied().unwrap_or_default(),
                "percentile cutoffs prepared"
            );
        }

        let summary = self.engine.update(samples);
        if summary.dropped > 0 {
            debug!(dropped = summary.dropped, "negative durations dropped");
        }

        self.rounds += 1;
        let report = self.engine.report();
        debug!(
            round = self.rounds,
            measurements = report.measurements,
            verdict = %report.verdict,
            "round complete"
        );
        Ok(report)
    }

    /// Run rounds until `stop` holds or a verdict is terminal, handing every
    /// report to `sink`. Returns the last report.
    pub fn run<F>(&mut self, stop: &StopCondition, mut sink: F) -> Result<Option<Report>, Error>
    where
        F: FnMut(&Report),
    {
        let mut last = None;
        while !stop.reached(self.rounds) {
            let report = self.run_round()?;
            sink(&report);
            last = Some(report);
            if report.verdict.is_terminal() {
                info!(workload = self.workload.name(), rounds = self.rounds, "terminal verdict");
                break;
            }
        }
        Ok(last)
    }

    fn generate(&mut self) -> Result<(), Error> {
        self.inputs.clear();
        let mut ones = 0usize;
        for _ in 0..self.measurements_per_round {
            let class = if self.rng.random::<bool>() {
                Class::One
            } else {
                Class::Zero
            };
            let labeled = self.workload.generate(class)?;
            if labeled.class == Class::One {
                ones += 1;
            }
            self.inputs.push(labeled);
        }
        debug!(
            workload = self.workload.name(),
            zeros = self.inputs.len() - ones,
            ones,
            "round generated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Busy-loops longer for class 1.
    struct Skewed;

    impl Workload for Skewed {
        type Input = u32;

        fn name(&self) -> &'static str {
            "skewed"
        }

        fn generate(&mut self, class: Class) -> Result<Labeled<u32>, Error> {
            let spins = match class {
                Class::Zero => 10,
                Class::One => 5_000,
            };
            Ok(Labeled::new(spins, class))
        }

        fn execute(&mut self, input: &u32) {
            let mut acc = 0u64;
            for i in 0..*input {
                acc = crate::measurement::black_box(acc.wrapping_add(i as u64));
            }
            crate::measurement::black_box(acc);
        }
    }

    fn config() -> Config {
        Config::quick().measurements_per_round(200).percentile_count(5)
    }

    #[test]
    fn round_budget_is_respected() {
        let mut driver = Driver::new(Skewed, &config().t_threshold_bananas(1e12), StdRng::seed_from_u64(4));
        let mut reports = 0;
        driver.run(&StopCondition::Rounds(3), |_| reports += 1).unwrap();

        assert_eq!(reports, 3);
        assert_eq!(driver.rounds(), 3);
        assert!(!driver.engine().needs_percentiles());
    }

    #[test]
    fn signal_set_before_start_runs_nothing() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut driver = Driver::new(Skewed, &config(), StdRng::seed_from_u64(4));
        let last = driver.run(&StopCondition::Signal(flag), |_| {}).unwrap();
        assert!(last.is_none());
        assert_eq!(driver.rounds(), 0);
    }

    #[test]
    fn gross_leak_ends_run_early() {
        let mut driver = Driver::new(Skewed, &config(), StdRng::seed_from_u64(4));
        let last = driver.run(&StopCondition::Rounds(500), |_| {}).unwrap().unwrap();
        assert!(last.verdict.is_terminal());
        assert!(driver.rounds() < 500);
    }
}
