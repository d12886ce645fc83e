//! Pie angles and annular sectors.
//!
//! Angles are in radians, measured clockwise from 12 o'clock, so a point
//! at angle `a` and radius `r` sits at `(r sin a, -r cos a)`.

use std::f64::consts::{PI, TAU};
use std::fmt::Write;

const EPSILON: f64 = 1e-9;

/// Angular span of one pie slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub start: f64,
    pub end: f64,
}

impl Slice {
    /// The slice swept up to a fraction `t` of its final angle.
    pub fn swept(&self, t: f64) -> Slice {
        Slice {
            start: self.start,
            end: self.start + (self.end - self.start) * t.clamp(0.0, 1.0),
        }
    }
}

/// Lay out `values` around a full turn in input order.
///
/// Negative and non-finite values count as zero. When everything is zero
/// all slices are empty.
pub fn pie(values: &[f64]) -> Vec<Slice> {
    let clean: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() && *v > 0.0 { *v } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    let k = if total > 0.0 { TAU / total } else { 0.0 };
    let mut angle = 0.0;
    clean
        .iter()
        .map(|v| {
            let start = angle;
            angle += v * k;
            Slice { start, end: angle }
        })
        .collect()
}

fn polar(r: f64, a: f64) -> (f64, f64) {
    (r * a.sin(), -r * a.cos())
}

/// Path of the annular sector between `inner` and `outer` radii.
pub fn arc_path(inner: f64, outer: f64, slice: Slice) -> String {
    let sweep = slice.end - slice.start;
    if sweep.abs() < EPSILON || outer <= 0.0 {
        return String::new();
    }
    let mut d = String::new();
    if sweep >= TAU - EPSILON {
        let _ = write!(
            d,
            "M0,{:.2}A{o:.2},{o:.2},0,1,1,0,{:.2}A{o:.2},{o:.2},0,1,1,0,{:.2}",
            -outer, outer, -outer, o = outer
        );
        if inner > 0.0 {
            let _ = write!(
                d,
                "M0,{:.2}A{i:.2},{i:.2},0,1,0,0,{:.2}A{i:.2},{i:.2},0,1,0,0,{:.2}",
                -inner, inner, -inner, i = inner
            );
        }
        d.push('Z');
        return d;
    }
    let large = if sweep > PI { 1 } else { 0 };
    let (x0, y0) = polar(outer, slice.start);
    let (x1, y1) = polar(outer, slice.end);
    let _ = write!(
        d,
        "M{:.2},{:.2}A{o:.2},{o:.2},0,{large},1,{:.2},{:.2}",
        x0, y0, x1, y1, o = outer
    );
    if inner > 0.0 {
        let (x2, y2) = polar(inner, slice.end);
        let (x3, y3) = polar(inner, slice.start);
        let _ = write!(
            d,
            "L{:.2},{:.2}A{i:.2},{i:.2},0,{large},0,{:.2},{:.2}",
            x2, y2, x3, y3, i = inner
        );
    } else {
        d.push_str("L0,0");
    }
    d.push('Z');
    d
}

/// Midpoint of the sector, halfway between the radii and the angles.
pub fn arc_centroid(inner: f64, outer: f64, slice: Slice) -> (f64, f64) {
    polar((inner + outer) / 2.0, (slice.start + slice.end) / 2.0)
}

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Quadratic ease-in-out on `[0, 1]`.
pub fn ease_quad_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t / 2.0
    } else {
        let t = t - 1.0;
        (t * (2.0 - t) + 1.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;

    #[test]
    fn pie_keeps_input_order_and_fills_turn() {
        let slices = pie(&[1.0, 3.0]);
        assert_close(slices[0].start, 0.0);
        assert_close(slices[0].end, TAU / 4.0);
        assert_close(slices[1].end, TAU);
    }

    #[test]
    fn pie_of_zeros_is_empty_slices() {
        let slices = pie(&[0.0, f64::NAN]);
        assert!(slices.iter().all(|s| s.start == s.end));
        assert_eq!(arc_path(10.0, 20.0, slices[0]), "");
    }

    #[test]
    fn quarter_sector_path() {
        let d = arc_path(5.0, 10.0, Slice { start: 0.0, end: PI / 2.0 });
        assert_eq!(
            d,
            "M0.00,-10.00A10.00,10.00,0,0,1,10.00,-0.00L5.00,-0.00A5.00,5.00,0,0,0,0.00,-5.00Z"
        );
    }

    #[test]
    fn full_ring_uses_two_half_arcs() {
        let d = arc_path(6.0, 10.0, Slice { start: 0.0, end: TAU });
        assert_eq!(d.matches('A').count(), 4);
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn centroid_of_right_half() {
        let (x, y) = arc_centroid(0.0, 10.0, Slice { start: 0.0, end: PI });
        assert_close(x, 5.0);
        assert_close(y, 0.0);
    }

    #[test]
    fn sweep_interpolates_end_angle() {
        let s = Slice { start: 1.0, end: 3.0 }.swept(0.5);
        assert_close(s.end, 2.0);
        assert_close(s.start, 1.0);
    }

    #[test]
    fn easing_endpoints() {
        assert_close(ease_cubic_in_out(0.0), 0.0);
        assert_close(ease_cubic_in_out(0.5), 0.5);
        assert_close(ease_cubic_in_out(1.0), 1.0);
        assert_close(ease_quad_in_out(0.5), 0.5);
        assert_close(ease_quad_in_out(1.0), 1.0);
    }
}
