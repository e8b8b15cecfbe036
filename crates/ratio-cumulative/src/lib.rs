//! Cumulative distribution statistics over joint histograms
//!
//! A [`CumulativeTable`] turns each row of a joint histogram into a
//! cumulative count and answers the queries used to draw confidence bands
//! around a type-accumulation curve: the lower and upper bounds at a
//! probability level, the median and the mean, each also as a percentage
//! of the row's total distinct-token count.
//!
//! ```rust
//! use ratio_core::JointHistogram;
//! use ratio_cumulative::{CumulativeTable, Level};
//!
//! let histogram = JointHistogram::from_rows(1, 1, vec![vec![0, 0], vec![1, 3]]).unwrap();
//! let table = CumulativeTable::from_histogram(&histogram);
//!
//! let band = Level::central(0.95).unwrap();
//! assert_eq!(table.low(1, band), Some(0));
//! assert_eq!(table.up(1, band), Some(1));
//! assert_eq!(table.mean_pct(1), Some(75.0));
//! ```

pub mod level;
pub mod table;
pub mod tail;

pub use level::Level;
pub use table::CumulativeTable;
pub use tail::{TailFractions, MAX_MARKS};
