//! Input generators and the routines they exercise.
//!
//! A [`Workload`] produces one input per requested class and runs the
//! subject routine on it. Generation happens before a round is timed;
//! only [`Workload::execute`] runs between the clock reads.

mod left_pad;
mod manger;

pub use left_pad::{LeftPadWorkload, PadRoutine};
pub use manger::MangerWorkload;

use ctprobe_core::Class;

use crate::error::Error;

/// An input and the class of the code path it exercises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeled<I> {
    pub input: I,
    pub class: Class,
}

impl<I> Labeled<I> {
    pub fn new(input: I, class: Class) -> Self {
        Self { input, class }
    }
}

/// A subject routine plus a generator of class-labeled inputs for it.
pub trait Workload {
    /// One input to the subject routine.
    type Input;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Build an input aimed at `class`.
    ///
    /// The returned label is the class of the path the input actually
    /// takes, which may differ from the one requested.
    fn generate(&mut self, class: Class) -> Result<Labeled<Self::Input>, Error>;

    /// Run the subject routine once. This is the timed region.
    fn execute(&mut self, input: &Self::Input);
}
