//! Cumulative rows and the quantile statistics read from them

use crate::level::Level;
use crate::tail::TailFractions;
use ratio_core::{Artifact, JointHistogram};

/// Per-row cumulative counts of a joint histogram
///
/// Row `x` holds `yy + 2` values: `cum[0] = 0` and `cum[y + 1]` is the
/// mass at `y` or below, so `cum[yy + 1]` is the row total. Queries on a
/// row with no mass, or past `xx`, are unavailable and return `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeTable {
    xx: usize,
    yy: usize,
    /// Row-major, `xx + 1` rows of `yy + 2` values
    cum: Vec<u64>,
}

impl CumulativeTable {
    pub fn from_histogram(histogram: &JointHistogram) -> Self {
        let (xx, yy) = (histogram.xx(), histogram.yy());
        let mut cum = Vec::with_capacity((xx + 1) * (yy + 2));
        for row in histogram.rows() {
            let mut s = 0u64;
            cum.push(s);
            for &v in row {
                s += v;
                cum.push(s);
            }
        }
        Self { xx, yy, cum }
    }

    pub fn xx(&self) -> usize {
        self.xx
    }

    pub fn yy(&self) -> usize {
        self.yy
    }

    /// Cumulative row `x`, `None` past `xx`
    pub fn row(&self, x: usize) -> Option<&[u64]> {
        if x > self.xx {
            return None;
        }
        let width = self.yy + 2;
        Some(&self.cum[x * width..(x + 1) * width])
    }

    /// Mass of row `x`
    pub fn total(&self, x: usize) -> Option<u64> {
        self.row(x).map(|row| row[self.yy + 1])
    }

    /// Row `x` and its total as a float, when it carries mass
    fn informative_row(&self, x: usize) -> Option<(&[u64], f64)> {
        let row = self.row(x)?;
        let tot = row[self.yy + 1];
        (tot > 0).then_some((row, tot as f64))
    }

    /// Lower bound: scanning up from 0, the last `y` whose mass strictly
    /// below stays within `level` of the total
    pub fn low(&self, x: usize, level: Level) -> Option<usize> {
        let (row, tot) = self.informative_row(x)?;
        let limit = tot * level.value();
        let mut y = 0;
        while y + 1 < row.len() && row[y + 1] as f64 <= limit {
            y += 1;
        }
        Some(y.min(self.yy))
    }

    /// Upper bound: scanning down from `yy`, the first `y` whose mass
    /// strictly below falls short of `1 - level` of the total
    pub fn up(&self, x: usize, level: Level) -> Option<usize> {
        let (row, tot) = self.informative_row(x)?;
        let limit = tot * (1.0 - level.value());
        let mut y = self.yy;
        while y > 0 && row[y] as f64 >= limit {
            y -= 1;
        }
        Some(y)
    }

    /// Average of the two median-level bounds
    pub fn median(&self, x: usize) -> Option<f64> {
        let up = self.up(x, Level::MEDIAN)?;
        let low = self.low(x, Level::MEDIAN)?;
        Some((up + low) as f64 / 2.0)
    }

    pub fn mean(&self, x: usize) -> Option<f64> {
        let (row, tot) = self.informative_row(x)?;
        let sum: f64 = row
            .windows(2)
            .enumerate()
            .map(|(y, w)| y as f64 * (w[1] - w[0]) as f64)
            .sum();
        Some(sum / tot)
    }

    /// [`low`](Self::low) as a percentage of `x`; an empty prefix bounds at 0%
    pub fn low_pct(&self, x: usize, level: Level) -> Option<f64> {
        if x == 0 {
            return Some(0.0);
        }
        self.low(x, level).map(|y| percent(y as f64, x))
    }

    /// [`up`](Self::up) as a percentage of `x`; an empty prefix bounds at 100%
    pub fn up_pct(&self, x: usize, level: Level) -> Option<f64> {
        if x == 0 {
            return Some(100.0);
        }
        self.up(x, level).map(|y| percent(y as f64, x))
    }

    pub fn median_pct(&self, x: usize) -> Option<f64> {
        if x == 0 {
            return None;
        }
        self.median(x).map(|m| percent(m, x))
    }

    pub fn mean_pct(&self, x: usize) -> Option<f64> {
        if x == 0 {
            return None;
        }
        self.mean(x).map(|m| percent(m, x))
    }

    /// Where an observed point `(x, y)` sits within row `x`
    pub fn tail_fractions(&self, x: usize, y: usize) -> Option<TailFractions> {
        if y > self.yy {
            return None;
        }
        let (row, tot) = self.informative_row(x)?;
        Some(TailFractions {
            as_small: row[y + 1] as f64 / tot,
            as_large: 1.0 - row[y] as f64 / tot,
        })
    }
}

impl From<&JointHistogram> for CumulativeTable {
    fn from(histogram: &JointHistogram) -> Self {
        Self::from_histogram(histogram)
    }
}

impl From<&Artifact> for CumulativeTable {
    fn from(artifact: &Artifact) -> Self {
        Self::from_histogram(&artifact.histogram)
    }
}

#[inline]
fn percent(y: f64, x: usize) -> f64 {
    y / x as f64 * 100.0
}
