//! Spherical Mercator projection and GeoJSON-to-SVG path output.

use cdv_core::geo::{Bounds, Geometry, Position};
use std::f64::consts::FRAC_PI_4;
use std::fmt::Write;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 20.0;
pub const ZOOM_STEP: f64 = 1.5;

/// Metres per degree of latitude, used for the longitude-degree conversion.
const METERS_PER_DEGREE: f64 = 111_000.0;

fn raw(lon: f64, lat: f64) -> (f64, f64) {
    let lambda = lon.to_radians();
    let phi = lat.to_radians();
    (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
}

/// Mercator with a uniform scale and a pixel translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    scale: f64,
    tx: f64,
    ty: f64,
}

impl Mercator {
    /// Projection placing `center` (lon, lat) at the `translate` pixel.
    pub fn centered(center: (f64, f64), scale: f64, translate: (f64, f64)) -> Self {
        let (x0, y0) = raw(center.0, center.1);
        Self {
            scale,
            tx: translate.0 - x0 * scale,
            ty: translate.1 + y0 * scale,
        }
    }

    /// Largest projection that fits `bounds` inside the pixel rectangle
    /// `[top_left, bottom_right]`, centred in it.
    pub fn fit_extent(top_left: (f64, f64), bottom_right: (f64, f64), bounds: &Bounds) -> Self {
        let (x0, y_south) = raw(bounds.min_lon, bounds.min_lat);
        let (x1, y_north) = raw(bounds.max_lon, bounds.max_lat);
        // screen y grows southward
        let (by0, by1) = (-y_north, -y_south);
        let w = bottom_right.0 - top_left.0;
        let h = bottom_right.1 - top_left.1;
        let kx = if x1 > x0 { w / (x1 - x0) } else { f64::INFINITY };
        let ky = if by1 > by0 { h / (by1 - by0) } else { f64::INFINITY };
        let k = kx.min(ky);
        let k = if k.is_finite() { k } else { 1.0 };
        Self {
            scale: k,
            tx: top_left.0 + (w - k * (x1 + x0)) / 2.0,
            ty: top_left.1 + (h - k * (by1 + by0)) / 2.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = raw(lon, lat);
        (self.tx + x * self.scale, self.ty - y * self.scale)
    }

    /// On-screen radius of a circle of `meters` around (lon, lat), at least 2 px.
    pub fn pixel_radius(&self, lon: f64, lat: f64, meters: f64) -> f64 {
        let per_degree_lon = METERS_PER_DEGREE * lat.to_radians().cos();
        if per_degree_lon <= 0.0 {
            return 2.0;
        }
        let (cx, _) = self.project(lon, lat);
        let (ox, _) = self.project(lon + meters / per_degree_lon, lat);
        (ox - cx).max(2.0)
    }
}

pub fn zoom_in(level: f64) -> f64 {
    (level * ZOOM_STEP).min(MAX_ZOOM)
}

pub fn zoom_out(level: f64) -> f64 {
    (level / ZOOM_STEP).max(MIN_ZOOM)
}

fn push_ring(d: &mut String, ring: &[Position], projection: &Mercator, close: bool) {
    let mut first = true;
    for p in ring {
        let (Some(&lon), Some(&lat)) = (p.first(), p.get(1)) else {
            continue;
        };
        let (x, y) = projection.project(lon, lat);
        let _ = write!(d, "{}{:.2},{:.2}", if first { 'M' } else { 'L' }, x, y);
        first = false;
    }
    if close && !first {
        d.push('Z');
    }
}

/// SVG path data for line and polygon geometries. Points yield an empty path.
pub fn geo_path(geometry: &Geometry, projection: &Mercator) -> String {
    let mut d = String::new();
    match geometry {
        Geometry::LineString { coordinates } => push_ring(&mut d, coordinates, projection, false),
        Geometry::MultiLineString { coordinates } => {
            for line in coordinates {
                push_ring(&mut d, line, projection, false);
            }
        }
        Geometry::Polygon { coordinates } => {
            for ring in coordinates {
                push_ring(&mut d, ring, projection, true);
            }
        }
        Geometry::MultiPolygon { coordinates } => {
            for ring in coordinates.iter().flatten() {
                push_ring(&mut d, ring, projection, true);
            }
        }
        Geometry::Point { .. } | Geometry::Other => {}
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;

    const GAZA: Bounds = Bounds { min_lon: 34.2, min_lat: 31.2, max_lon: 34.6, max_lat: 31.6 };

    #[test]
    fn centre_projects_to_translate() {
        let p = Mercator::centered((35.056898, 31.3945), 8500.0, (550.0, 350.0));
        let (x, y) = p.project(35.056898, 31.3945);
        assert_close(x, 550.0);
        assert_close(y, 350.0);
        let (xn, yn) = p.project(35.056898, 32.0);
        assert_close(xn, 550.0);
        assert!(yn < 350.0, "north must be up");
    }

    #[test]
    fn fit_extent_keeps_bounds_inside() {
        let p = Mercator::fit_extent((10.0, 10.0), (790.0, 390.0), &GAZA);
        for (lon, lat) in [(34.2, 31.2), (34.6, 31.6), (34.2, 31.6), (34.6, 31.2)] {
            let (x, y) = p.project(lon, lat);
            assert!((10.0 - 1e-6..=790.0 + 1e-6).contains(&x), "x {x} outside");
            assert!((10.0 - 1e-6..=390.0 + 1e-6).contains(&y), "y {y} outside");
        }
        // the tighter axis touches both edges
        let (_, top) = p.project(34.4, 31.6);
        let (_, bottom) = p.project(34.4, 31.2);
        assert_close(top, 10.0);
        assert_close(bottom, 390.0);
    }

    #[test]
    fn pixel_radius_has_floor() {
        let p = Mercator::centered((34.4, 31.4), 100.0, (0.0, 0.0));
        assert_eq!(p.pixel_radius(34.4, 31.4, 1.0), 2.0);
        let big = Mercator::centered((34.4, 31.4), 200_000.0, (0.0, 0.0));
        assert!(big.pixel_radius(34.4, 31.4, 300.0) > 2.0);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(zoom_in(1.0), 1.5);
        assert_eq!(zoom_in(18.0), 20.0);
        assert_eq!(zoom_out(0.6), 0.5);
    }

    #[test]
    fn polygon_path_is_closed_per_ring() {
        let g = Geometry::Polygon {
            coordinates: vec![vec![vec![34.2, 31.2], vec![34.6, 31.2], vec![34.6, 31.6]]],
        };
        let p = Mercator::fit_extent((0.0, 0.0), (100.0, 100.0), &GAZA);
        let d = geo_path(&g, &p);
        assert!(d.starts_with('M'));
        assert_eq!(d.matches('L').count(), 2);
        assert!(d.ends_with('Z'));
        assert_eq!(geo_path(&Geometry::Point { coordinates: vec![34.3, 31.3] }, &p), "");
    }
}
