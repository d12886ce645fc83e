//! Weighted box-plot summaries.

use crate::kde::Observation;
use serde::Serialize;

/// Five-number summary with Tukey fences computed from weighted data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// First value at or above `q1 - 1.5 * IQR`.
    pub whisker_low: f64,
    /// Last value at or below `q3 + 1.5 * IQR`.
    pub whisker_high: f64,
    pub min_actual: f64,
    pub max_actual: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Summarize `values` weighted by `weights` (paired by index).
///
/// Non-finite values and non-positive weights are dropped. Returns `None`
/// when nothing with positive weight remains.
pub fn weighted_box_stats(values: &[f64], weights: &[f64]) -> Option<BoxStats> {
    let mut data: Vec<(f64, f64)> = values
        .iter()
        .zip(weights.iter())
        .filter(|(v, w)| v.is_finite() && **w > 0.0)
        .map(|(v, w)| (*v, *w))
        .collect();
    data.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total: f64 = data.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return None;
    }
    let last = data.last()?.0;

    let quantile = |p: f64| {
        let target = total * p;
        let mut acc = 0.0;
        for (v, w) in &data {
            acc += w;
            if acc >= target {
                return *v;
            }
        }
        last
    };

    let q1 = quantile(0.25);
    let median = quantile(0.5);
    let q3 = quantile(0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let min_actual = data[0].0;
    let max_actual = last;
    let whisker_low = data
        .iter()
        .map(|(v, _)| *v)
        .find(|v| *v >= lower_fence)
        .unwrap_or(min_actual);
    let whisker_high = data
        .iter()
        .rev()
        .map(|(v, _)| *v)
        .find(|v| *v <= upper_fence)
        .unwrap_or(max_actual);
    let outliers = data
        .iter()
        .map(|(v, _)| *v)
        .filter(|v| *v < whisker_low || *v > whisker_high)
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        min_actual,
        max_actual,
        outliers,
    })
}

/// Weighted mean age, `None` when the weights sum to zero.
pub fn weighted_mean(observations: &[Observation]) -> Option<f64> {
    let num: f64 = observations.iter().map(|o| o.age * o.weight).sum();
    let den: f64 = observations.iter().map(|o| o.weight).sum();
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}
