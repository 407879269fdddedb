//! Tick sources for timing one call.
//!
//! | Variant     | Source                | Tick          |
//! |-------------|-----------------------|---------------|
//! | `Monotonic` | `std::time::Instant`  | 1 ns          |
//! | `Cycles`    | `rdtsc` (x86_64 only) | 1 TSC cycle   |

use std::fmt;
use std::time::Instant;

#[cfg(target_arch = "x86_64")]
use core::arch::asm;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use std::hint::black_box;

/// Which clock to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerSpec {
    /// Monotonic wall clock in nanoseconds.
    #[default]
    Monotonic,
    /// CPU time-stamp counter. Falls back to `Monotonic` where unavailable.
    Cycles,
}

impl TimerSpec {
    /// Parse a timer name as accepted on the command line.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "monotonic" | "instant" => Some(TimerSpec::Monotonic),
            "cycles" | "rdtsc" => Some(TimerSpec::Cycles),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimerSpec::Monotonic => "monotonic",
            TimerSpec::Cycles => "cycles",
        }
    }
}

impl fmt::Display for TimerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a cycle counter can be read on this target.
pub const fn cycles_available() -> bool {
    cfg!(target_arch = "x86_64")
}

/// Read the x86_64 time-stamp counter.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn rdtsc() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: rdtsc only writes eax and edx.
    unsafe {
        asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nostack, nomem)
        );
    }
    ((hi as u64) << 32) | (lo as u64)
}

/// Signed tick difference `t1 - t0`.
///
/// A clock that stepped backwards yields a negative value rather than a
/// huge unsigned one; the engine drops such samples.
#[inline]
pub fn elapsed(t0: u64, t1: u64) -> i64 {
    t1.wrapping_sub(t0) as i64
}

/// A resolved tick source.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    spec: TimerSpec,
    origin: Instant,
}

impl Timer {
    /// Resolve `spec` on this target.
    pub fn new(spec: TimerSpec) -> Self {
        let spec = match spec {
            TimerSpec::Cycles if !cycles_available() => {
                warn!("cycle counter unavailable on this target, using the monotonic clock");
                TimerSpec::Monotonic
            }
            spec => spec,
        };
        Self {
            spec,
            origin: Instant::now(),
        }
    }

    /// The clock actually in use.
    pub fn spec(&self) -> TimerSpec {
        self.spec
    }

    /// Current tick count.
    #[inline]
    pub fn now(&self) -> u64 {
        match self.spec {
            TimerSpec::Monotonic => self.origin.elapsed().as_nanos() as u64,
            #[cfg(target_arch = "x86_64")]
            TimerSpec::Cycles => rdtsc(),
            #[cfg(not(target_arch = "x86_64"))]
            TimerSpec::Cycles => self.origin.elapsed().as_nanos() as u64,
        }
    }

    /// Ticks spent in one call of `f`.
    #[inline]
    pub fn measure<T, F: FnOnce() -> T>(&self, f: F) -> i64 {
        let t0 = self.now();
        black_box(f());
        let t1 = self.now();
        elapsed(t0, t1)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(TimerSpec::default())
    }
}
