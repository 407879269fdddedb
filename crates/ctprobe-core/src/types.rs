//! Class labels and timing samples.

use serde::{Deserialize, Serialize};

use crate::error::InvalidClass;

/// Input class identifier for timing measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    /// Class 0.
    Zero,
    /// Class 1.
    One,
}

impl Class {
    /// Both classes, in index order.
    pub const ALL: [Class; 2] = [Class::Zero, Class::One];

    /// Index of this class into per-class arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Class::Zero => 0,
            Class::One => 1,
        }
    }

    /// Convert a raw label, rejecting anything outside {0, 1}.
    pub fn from_index(class: usize) -> Result<Self, InvalidClass> {
        match class {
            0 => Ok(Class::Zero),
            1 => Ok(Class::One),
            _ => Err(InvalidClass { class }),
        }
    }
}

impl TryFrom<u8> for Class {
    type Error = InvalidClass;

    fn try_from(class: u8) -> Result<Self, Self::Error> {
        Class::from_index(class as usize)
    }
}

/// One timing measurement with the class of the input that produced it.
///
/// The duration is a signed tick count: a negative value means the clock
/// went backwards or wrapped between the two timestamps, and the engine
/// drops such samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Elapsed ticks between the two timestamps.
    pub duration: i64,
    /// Which class this sample belongs to.
    pub class: Class,
}

impl Sample {
    /// Create a new sample.
    pub fn new(duration: i64, class: Class) -> Self {
        Self { duration, class }
    }

    /// Create a sample from a raw class label.
    pub fn from_raw(duration: i64, class: u8) -> Result<Self, InvalidClass> {
        Ok(Self::new(duration, Class::try_from(class)?))
    }
}
