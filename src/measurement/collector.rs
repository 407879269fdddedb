//! Sequential sample collection.
//!
//! Inputs are timed one at a time, in the order they were generated, on the
//! calling thread. Nothing else runs between the two clock reads: the
//! sample is pushed only after the second read, into a buffer that keeps
//! its capacity across rounds.

use ctprobe_core::Sample;

use super::timer::Timer;
use crate::workload::Labeled;

/// Times a subject routine over a round of labeled inputs.
#[derive(Debug)]
pub struct Collector {
    timer: Timer,
    samples: Vec<Sample>,
}

impl Collector {
    /// A collector with room for `capacity` samples per round.
    pub fn new(timer: Timer, capacity: usize) -> Self {
        Self {
            timer,
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Time `execute` once per input and return the round's samples.
    ///
    /// Sample `i` carries the duration and class of `inputs[i]`.
    pub fn collect<I, T, F>(&mut self, inputs: &[Labeled<I>], mut execute: F) -> &[Sample]
    where
        F: FnMut(&I) -> T,
    {
        self.samples.clear();
        self.samples.reserve(inputs.len());

        for labeled in inputs {
            let duration = self.timer.measure(|| execute(&labeled.input));
            self.samples.push(Sample::new(duration, labeled.class));
        }

        &self.samples
    }
}
