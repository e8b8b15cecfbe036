//! Probability mass levels used by the quantile bounds

use ratio_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fraction of probability mass in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Level(f64);

impl Level {
    pub const MEDIAN: Level = Level(0.5);

    /// Validate a level; NaN and values outside `[0, 1]` are rejected
    pub fn new(level: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::invalid_level(level))
        }
    }

    /// Lower and upper levels of a central band holding `confidence` of the mass
    ///
    /// A 95% band uses `0.025` for both bounds, since `up` measures its
    /// level from the top of the row.
    pub fn central(confidence: f64) -> Result<Self> {
        let confidence = Self::new(confidence)?;
        Self::new((1.0 - confidence.0) / 2.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Level {
    type Error = Error;

    fn try_from(level: f64) -> Result<Self> {
        Self::new(level)
    }
}

impl From<Level> for f64 {
    fn from(level: Level) -> f64 {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
