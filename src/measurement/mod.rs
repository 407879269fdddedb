//! Timing measurement: tick sources and the sequential collector.

mod collector;
mod timer;

pub use collector::Collector;
pub use timer::{black_box, cycles_available, elapsed, Timer, TimerSpec};

#[cfg(target_arch = "x86_64")]
pub use timer::rdtsc;
