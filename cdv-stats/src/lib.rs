//! Weighted statistics behind the mortality violins and the series charts.
//!
//! - `kde`: kernel density estimation over weighted observations
//! - `distribution`: weighted quantiles, box-plot summaries and means
//! - `summary`: extents, nearest-index bisection and keyed rollups

pub mod distribution;
pub mod kde;
pub mod summary;

pub use distribution::{weighted_box_stats, weighted_mean, BoxStats};
pub use kde::{epanechnikov, weighted_kde, Observation};

#[cfg(test)]
pub(crate) fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
}
