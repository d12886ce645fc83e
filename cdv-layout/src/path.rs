//! SVG path data generators.
//!
//! Coordinates are written with two decimals. Curves are emitted as cubic
//! Bezier segments so every generator produces plain `M`/`L`/`C`/`Z` data.

use std::fmt::Write;

pub type Point = (f64, f64);

/// Interpolation between consecutive points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    /// Uniform Catmull-Rom spline through every point.
    CatmullRom,
    /// Monotone cubic in x (no overshoot between points).
    MonotoneX,
}

fn push_cmd(d: &mut String, cmd: char, p: Point) {
    let _ = write!(d, "{}{:.2},{:.2}", cmd, p.0, p.1);
}

fn push_cubic(d: &mut String, c1: Point, c2: Point, p: Point) {
    let _ = write!(
        d,
        "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
        c1.0, c1.1, c2.0, c2.1, p.0, p.1
    );
}

/// Append a run through `points`, entering the first point with `enter` (`M` or `L`).
fn trace(d: &mut String, points: &[Point], curve: Curve, enter: char) {
    let Some(&first) = points.first() else {
        return;
    };
    push_cmd(d, enter, first);
    if points.len() == 1 {
        return;
    }
    match curve {
        Curve::Linear => {
            for &p in &points[1..] {
                push_cmd(d, 'L', p);
            }
        }
        Curve::CatmullRom => trace_catmull_rom(d, points),
        Curve::MonotoneX => trace_monotone_x(d, points),
    }
}

fn trace_catmull_rom(d: &mut String, pts: &[Point]) {
    let n = pts.len();
    for i in 0..n - 1 {
        let p0 = if i == 0 { pts[0] } else { pts[i - 1] };
        let p1 = pts[i];
        let p2 = pts[i + 1];
        let p3 = if i + 2 < n { pts[i + 2] } else { p2 };
        let c1 = (p1.0 + (p2.0 - p0.0) / 6.0, p1.1 + (p2.1 - p0.1) / 6.0);
        let c2 = (p2.0 - (p3.0 - p1.0) / 6.0, p2.1 - (p3.1 - p1.1) / 6.0);
        push_cubic(d, c1, c2, p2);
    }
}

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Tangent at an interior point (Fritsch-Carlson, as Steffen 1990).
fn interior_slope(p0: Point, p1: Point, p2: Point) -> f64 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    let s0 = (p1.1 - p0.1) / h0;
    let s1 = (p2.1 - p1.1) / h1;
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// Tangent at an end point given the tangent at its neighbour.
fn end_slope(a: Point, b: Point, t: f64) -> f64 {
    let h = b.0 - a.0;
    if h != 0.0 {
        (3.0 * (b.1 - a.1) / h - t) / 2.0
    } else {
        t
    }
}

fn trace_monotone_x(d: &mut String, pts: &[Point]) {
    let n = pts.len();
    if n == 2 {
        push_cmd(d, 'L', pts[1]);
        return;
    }
    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        tangents[i] = interior_slope(pts[i - 1], pts[i], pts[i + 1]);
    }
    tangents[0] = end_slope(pts[0], pts[1], tangents[1]);
    tangents[n - 1] = end_slope(pts[n - 2], pts[n - 1], tangents[n - 2]);
    for i in 0..n - 1 {
        let (a, b) = (pts[i], pts[i + 1]);
        let dx = (b.0 - a.0) / 3.0;
        push_cubic(
            d,
            (a.0 + dx, a.1 + dx * tangents[i]),
            (b.0 - dx, b.1 - dx * tangents[i + 1]),
            b,
        );
    }
}

/// Open path through `points`.
pub fn line(points: &[Point], curve: Curve) -> String {
    let mut d = String::new();
    trace(&mut d, points, curve, 'M');
    d
}

/// Open path that breaks wherever a point is missing.
pub fn line_defined(points: &[Option<Point>], curve: Curve) -> String {
    let mut d = String::new();
    for run in points.split(|p| p.is_none()) {
        let run: Vec<Point> = run.iter().flatten().copied().collect();
        trace(&mut d, &run, curve, 'M');
    }
    d
}

/// Closed band between `top` and `bottom`, both given in the same x order.
pub fn area(top: &[Point], bottom: &[Point], curve: Curve) -> String {
    if top.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    trace(&mut d, top, curve, 'M');
    let reversed: Vec<Point> = bottom.iter().rev().copied().collect();
    trace(&mut d, &reversed, curve, 'L');
    d.push('Z');
    d
}

/// Horizontal flow link: a cubic whose control points sit at the midpoint x.
pub fn link_horizontal(source: Point, target: Point) -> String {
    let xm = (source.0 + target.0) / 2.0;
    let mut d = String::new();
    push_cmd(&mut d, 'M', source);
    push_cubic(&mut d, (xm, source.1), (xm, target.1), target);
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_line_visits_every_point() {
        let d = line(&[(0.0, 0.0), (10.0, 5.0), (20.0, 2.5)], Curve::Linear);
        assert_eq!(d, "M0.00,0.00L10.00,5.00L20.00,2.50");
    }

    #[test]
    fn empty_and_single_point_lines() {
        assert_eq!(line(&[], Curve::MonotoneX), "");
        assert_eq!(line(&[(1.0, 2.0)], Curve::CatmullRom), "M1.00,2.00");
    }

    #[test]
    fn missing_points_split_the_line() {
        let d = line_defined(
            &[Some((0.0, 0.0)), Some((1.0, 1.0)), None, Some((3.0, 3.0)), Some((4.0, 4.0))],
            Curve::Linear,
        );
        assert_eq!(d, "M0.00,0.00L1.00,1.00M3.00,3.00L4.00,4.00");
    }

    #[test]
    fn catmull_rom_passes_through_points() {
        let d = line(&[(0.0, 0.0), (6.0, 6.0), (12.0, 0.0)], Curve::CatmullRom);
        assert!(d.starts_with("M0.00,0.00C"));
        assert!(d.contains(",6.00,6.00C"));
        assert!(d.ends_with(",12.00,0.00"));
        assert_eq!(d.matches('C').count(), 2);
    }

    #[test]
    fn monotone_does_not_overshoot_flat_step() {
        // flat then rise: first segment tangents must stay zero at the plateau
        let d = line(&[(0.0, 10.0), (3.0, 10.0), (6.0, 0.0)], Curve::MonotoneX);
        assert_eq!(d, "M0.00,10.00C1.00,10.00,2.00,10.00,3.00,10.00C4.00,10.00,5.00,5.00,6.00,0.00");
    }

    #[test]
    fn monotone_two_points_is_straight() {
        assert_eq!(line(&[(0.0, 0.0), (5.0, 5.0)], Curve::MonotoneX), "M0.00,0.00L5.00,5.00");
    }

    #[test]
    fn area_closes_over_reversed_baseline() {
        let d = area(&[(0.0, 1.0), (2.0, 3.0)], &[(0.0, 0.0), (2.0, 0.0)], Curve::Linear);
        assert_eq!(d, "M0.00,1.00L2.00,3.00L2.00,0.00L0.00,0.00Z");
    }

    #[test]
    fn link_uses_midpoint_controls() {
        let d = link_horizontal((0.0, 10.0), (100.0, 50.0));
        assert_eq!(d, "M0.00,10.00C50.00,10.00,50.00,50.00,100.00,50.00");
    }
}
