//! How extreme an observed point is within its row

use std::fmt;

/// Longest run of significance marks
pub const MAX_MARKS: usize = 5;

/// Mass at or below and at or above an observed `y`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailFractions {
    /// Fraction of orderings reaching a `y` no larger than the observed one
    pub as_small: f64,
    /// Fraction of orderings reaching a `y` no smaller than the observed one
    pub as_large: f64,
}

impl TailFractions {
    /// One `-` per decade `as_small` falls below 10%, then one `+` per
    /// decade for `as_large`, at most [`MAX_MARKS`] in total
    pub fn marks(&self) -> String {
        let mut marks = String::new();
        for (frac, mark) in [(self.as_small, '-'), (self.as_large, '+')] {
            let mut f = frac;
            while f <= 0.1 && marks.len() < MAX_MARKS {
                marks.push(mark);
                f *= 10.0;
            }
        }
        marks
    }
}

impl fmt::Display for TailFractions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:6.2}% as small, {:6.2}% as large",
            self.as_small * 100.0,
            self.as_large * 100.0
        )
    }
}
