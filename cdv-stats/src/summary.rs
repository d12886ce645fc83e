//! Small helpers over series: extents, nearest-point lookup and rollups.

use std::collections::BTreeMap;

/// Minimum and maximum of the finite values, `None` when there are none.
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Largest finite value, or `fallback` when there is none.
pub fn max_or<I: IntoIterator<Item = f64>>(values: I, fallback: f64) -> f64 {
    extent(values).map(|(_, hi)| hi).unwrap_or(fallback)
}

/// Index of the element of `sorted` nearest to `x`.
///
/// A value exactly halfway between two elements resolves to the later one.
/// Returns `None` for an empty slice.
pub fn bisect_center(sorted: &[f64], x: f64) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }
    let i = sorted.partition_point(|v| *v < x).min(sorted.len() - 1);
    if i > 0 && sorted[i - 1] - x > x - sorted[i] {
        Some(i - 1)
    } else {
        Some(i)
    }
}

/// Sum `value` grouped by `key`, in key order.
pub fn rollup_sum<T, K, FK, FV>(items: &[T], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut out = BTreeMap::new();
    for item in items {
        *out.entry(key(item)).or_insert(0.0) += value(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_skips_non_finite() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(extent(Vec::<f64>::new()), None);
        assert_eq!(max_or(Vec::<f64>::new(), 1.0), 1.0);
    }

    #[test]
    fn bisect_center_picks_nearest() {
        let xs = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(bisect_center(&xs, -5.0), Some(0));
        assert_eq!(bisect_center(&xs, 4.0), Some(0));
        assert_eq!(bisect_center(&xs, 6.0), Some(1));
        assert_eq!(bisect_center(&xs, 15.0), Some(2), "halfway resolves to the later point");
        assert_eq!(bisect_center(&xs, 99.0), Some(3));
        assert_eq!(bisect_center(&[], 1.0), None);
    }

    #[test]
    fn rollup_sums_by_key() {
        let rows = [("a", 1.0), ("b", 2.0), ("a", 4.0)];
        let sums = rollup_sum(&rows, |r| r.0, |r| r.1);
        assert_eq!(sums.get("a"), Some(&5.0));
        assert_eq!(sums.get("b"), Some(&2.0));
    }
}
