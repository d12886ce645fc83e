//! Continuous scales.
//!
//! Tick steps follow the 1-2-5 rule: the raw step `(stop - start) / count`
//! is rounded to 1, 2, 5 or 10 times a power of ten, so axes read
//! 0, 20, 40 rather than 0, 17.3, 34.6.

use cdv_core::YearMonth;
use chrono::{Datelike, NaiveDate};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

/// Signed tick increment: positive `k` means a step of `k`, negative `-k`
/// means a step of `1/k` (keeps fractional ticks exact).
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Round tick values spanning `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reverse) = if stop < start { (stop, start, true) } else { (start, stop, false) };
    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 || !inc.is_finite() {
        return Vec::new();
    }
    let mut out: Vec<f64> = if inc > 0.0 {
        let i0 = (lo / inc).ceil() as i64;
        let i1 = (hi / inc).floor() as i64;
        (i0..=i1).map(|i| i as f64 * inc).collect()
    } else {
        let inc = -inc;
        let i0 = (lo * inc).ceil() as i64;
        let i1 = (hi * inc).floor() as i64;
        (i0..=i1).map(|i| i as f64 / inc).collect()
    };
    if reverse {
        out.reverse();
    }
    out
}

/// Extend `[start, stop]` outward to round tick boundaries.
pub fn nice(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !(stop > start) {
        return (start, stop);
    }
    let (mut lo, mut hi) = (start, stop);
    let mut previous = None;
    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if Some(step) == previous {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else if step < 0.0 {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }
    (lo, hi)
}

/// Affine map from a numeric domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Replace the domain with its nice extension (10 ticks, like d3's default).
    pub fn nice(self) -> Self {
        self.nice_with(10)
    }

    pub fn nice_with(self, count: usize) -> Self {
        Self {
            domain: nice(self.domain.0, self.domain.1, count),
            ..self
        }
    }

    pub fn scale(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (x - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (y - r0) / (r1 - r0) * (d1 - d0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Linear scale over calendar days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    inner: LinearScale,
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        Self {
            inner: LinearScale::new((day_number(domain.0), day_number(domain.1)), range),
        }
    }

    pub fn scale(&self, date: NaiveDate) -> f64 {
        self.inner.scale(day_number(date))
    }

    /// Nearest calendar day to a pixel position.
    pub fn invert(&self, x: f64) -> NaiveDate {
        let days = self.inner.invert(x).round() as i32;
        NaiveDate::from_num_days_from_ce_opt(days).unwrap_or_default()
    }

    pub fn range(&self) -> (f64, f64) {
        self.inner.range
    }
}

/// First days of every `step`-th month from `start` through `end`, inclusive.
pub fn month_ticks(start: YearMonth, end: YearMonth, step: u32) -> Vec<NaiveDate> {
    let step = step.max(1);
    let mut out = Vec::new();
    let mut cur = start;
    while cur <= end {
        out.push(cur.first_day());
        cur = cur.add_months(step);
    }
    out
}

/// Month ticks covering the dates in `[from, to]`, starting at the first
/// month boundary on or after `from`.
pub fn month_ticks_within(from: NaiveDate, to: NaiveDate, step: u32) -> Vec<NaiveDate> {
    let mut first = YearMonth::of(from);
    if from.day() != 1 {
        first = first.succ();
    }
    month_ticks(first, YearMonth::of(to), step)
        .into_iter()
        .filter(|d| *d <= to)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;

    #[test]
    fn ticks_follow_one_two_five_rule() {
        assert_eq!(ticks(0.0, 100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(0.0, 10.0, 10).len(), 11);
    }

    #[test]
    fn ticks_handle_degenerate_input() {
        assert_eq!(ticks(3.0, 3.0, 5), vec![3.0]);
        assert!(ticks(0.0, 1.0, 0).is_empty());
        assert_eq!(ticks(10.0, 0.0, 2), vec![10.0, 5.0, 0.0]);
    }

    #[test]
    fn nice_rounds_outward() {
        assert_eq!(nice(0.0, 9_357.0, 10), (0.0, 10_000.0));
        assert_eq!(nice(0.3, 97.2, 10), (0.0, 100.0));
        assert_eq!(nice(5.0, 5.0, 10), (5.0, 5.0));
    }

    #[test]
    fn linear_scale_maps_and_inverts() {
        let s = LinearScale::new((0.0, 100.0), (400.0, 0.0));
        assert_close(s.scale(25.0), 300.0);
        assert_close(s.invert(300.0), 25.0);
        let flat = LinearScale::new((1.0, 1.0), (0.0, 10.0));
        assert_close(flat.scale(1.0), 5.0);
    }

    #[test]
    fn time_scale_round_trips_days() {
        let a = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let s = TimeScale::new((a, b), (0.0, 364.0));
        assert_close(s.scale(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()), 31.0);
        assert_eq!(s.invert(31.2), NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn quarterly_month_ticks() {
        let start = YearMonth::new(2023, 1).unwrap();
        let end = YearMonth::new(2023, 12).unwrap();
        let t = month_ticks(start, end, 3);
        assert_eq!(t.len(), 4);
        assert_eq!(t[1], NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
    }

    #[test]
    fn ticks_within_skip_partial_first_month() {
        let from = NaiveDate::from_ymd_opt(2023, 10, 7).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let t = month_ticks_within(from, to, 3);
        assert_eq!(
            t,
            vec![
                NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
            ]
        );
    }
}
