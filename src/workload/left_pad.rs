//! Left-padding a decrypted value, measured on its own.
//!
//! Class 0 inputs are already full width, class 1 inputs are one byte
//! short. Padding copies a different number of bytes into a different
//! offset, which is enough to show up in the raw timing.
//!
//! [`PadRoutine::Masked`] runs the same experiment against a byte-wise
//! masked copy, for comparison with the bulk copy.

use ctprobe_core::Class;
use rand::rngs::StdRng;
use rand::Rng;

use super::{Labeled, Workload};
use crate::crypto::pad::{left_pad, left_pad_masked};
use crate::error::Error;
use crate::measurement::black_box;

/// Width the subject pads to: a 2048-bit modulus.
pub const DEFAULT_WIDTH: usize = 256;

/// Which padding routine sits in the timed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadRoutine {
    /// [`left_pad`]: one bulk copy.
    #[default]
    Copy,
    /// [`left_pad_masked`]: byte-wise masked selects.
    Masked,
}

impl PadRoutine {
    fn pad(self, input: &[u8], width: usize) -> Vec<u8> {
        match self {
            PadRoutine::Copy => left_pad(input, width),
            PadRoutine::Masked => left_pad_masked(input, width),
        }
    }
}

#[derive(Debug)]
pub struct LeftPadWorkload {
    rng: StdRng,
    width: usize,
    routine: PadRoutine,
}

impl LeftPadWorkload {
    pub fn new(rng: StdRng) -> Self {
        Self::with_width(rng, DEFAULT_WIDTH)
    }

    /// Pad to `width` bytes. `width` must be at least 1.
    pub fn with_width(rng: StdRng, width: usize) -> Self {
        assert!(width > 0, "width must be > 0");
        Self {
            rng,
            width,
            routine: PadRoutine::default(),
        }
    }

    /// Time `routine` instead of the bulk copy.
    pub fn routine(mut self, routine: PadRoutine) -> Self {
        self.routine = routine;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn pad_routine(&self) -> PadRoutine {
        self.routine
    }
}

impl Workload for LeftPadWorkload {
    type Input = Vec<u8>;

    fn name(&self) -> &'static str {
        match self.routine {
            PadRoutine::Copy => "left-pad",
            PadRoutine::Masked => "left-pad-const",
        }
    }

    fn generate(&mut self, class: Class) -> Result<Labeled<Vec<u8>>, Error> {
        let len = match class {
            Class::Zero => self.width,
            Class::One => self.width - 1,
        };
        let mut input = vec![0u8; len];
        self.rng.fill(&mut input[..]);
        Ok(Labeled::new(input, class))
    }

    fn execute(&mut self, input: &Vec<u8>) {
        let mut out = self.routine.pad(input, self.width);
        out[0] = 0;
        black_box(out);
    }
}
