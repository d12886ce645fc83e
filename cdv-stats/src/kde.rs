//! Weighted kernel density estimation.

use serde::Serialize;

/// A weighted observation: the midpoint of an age band and its mortality weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub age: f64,
    pub weight: f64,
}

/// Bandwidth used for the mortality violins.
pub const VIOLIN_BANDWIDTH: f64 = 6.0;

/// Epanechnikov kernel with bandwidth `k`.
pub fn epanechnikov(k: f64) -> impl Fn(f64) -> f64 {
    move |v| {
        let u = v / k;
        if u.abs() <= 1.0 {
            0.75 * (1.0 - u * u) / k
        } else {
            0.0
        }
    }
}

/// Evaluate the weighted density at every grid point.
///
/// The sum is normalized by the total weight; a zero total is treated as 1
/// so empty inputs yield an all-zero curve instead of NaN.
pub fn weighted_kde<K: Fn(f64) -> f64>(
    kernel: K,
    grid: &[f64],
    observations: &[Observation],
) -> Vec<(f64, f64)> {
    let total: f64 = observations.iter().map(|o| o.weight).sum();
    let total = if total == 0.0 { 1.0 } else { total };
    grid.iter()
        .map(|&x| {
            let density: f64 = observations
                .iter()
                .map(|o| o.weight * kernel(x - o.age))
                .sum();
            (x, density / total)
        })
        .collect()
}

/// `start, start + step, ...` strictly below `stop`.
pub fn range(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || stop <= start {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Age grid of the violins: 0 to 99.5 in half-year steps.
pub fn age_grid() -> Vec<f64> {
    range(0.0, 100.0, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;

    #[test]
    fn kernel_peaks_at_zero_and_vanishes_outside_bandwidth() {
        let k = epanechnikov(6.0);
        assert_close(k(0.0), 0.75 / 6.0);
        assert_close(k(6.0), 0.0);
        assert_eq!(k(6.5), 0.0);
        assert_eq!(k(-7.0), 0.0);
    }

    #[test]
    fn single_observation_density_is_the_kernel() {
        let obs = [Observation { age: 50.0, weight: 4.0 }];
        let curve = weighted_kde(epanechnikov(6.0), &[50.0, 53.0, 70.0], &obs);
        assert_close(curve[0].1, 0.75 / 6.0);
        assert_close(curve[1].1, 0.75 * (1.0 - 0.25) / 6.0);
        assert_eq!(curve[2].1, 0.0);
    }

    #[test]
    fn zero_total_weight_gives_zero_density() {
        let obs = [Observation { age: 10.0, weight: 0.0 }];
        let curve = weighted_kde(epanechnikov(6.0), &[10.0], &obs);
        assert_eq!(curve, vec![(10.0, 0.0)]);
    }

    #[test]
    fn density_integrates_to_about_one() {
        let obs = [
            Observation { age: 22.0, weight: 3.0 },
            Observation { age: 47.0, weight: 1.0 },
        ];
        let grid = age_grid();
        let curve = weighted_kde(epanechnikov(VIOLIN_BANDWIDTH), &grid, &obs);
        let area: f64 = curve.iter().map(|(_, d)| d * 0.5).sum();
        assert!((area - 1.0).abs() < 0.01, "area was {area}");
    }

    #[test]
    fn age_grid_has_two_hundred_points() {
        let grid = age_grid();
        assert_eq!(grid.len(), 200);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[199], 99.5);
    }
}
