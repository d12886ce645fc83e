//! Geometry for the narrative charts.
//!
//! Everything here is pure: given data and a frame size, compute the
//! numbers and SVG path strings a widget renders. The Dioxus components in
//! `cdv-chart-ui` only map these onto RSX elements.
//!
//! - `scale`: linear and time scales, nice domains and tick generation
//! - `frame`: chart margins and responsive widths
//! - `path`: line, area and link path strings with linear, Catmull-Rom and monotone curves
//! - `arc`: pie angles and annular sector paths for the donut
//! - `sankey`: three-column flow layout with spacing post-processing
//! - `labels`: label de-overlap and truncation
//! - `grid`: small-multiples panel placement
//! - `projection`: Mercator projection and GeoJSON path output
//! - `color`: hex parsing and RGB interpolation

pub mod arc;
pub mod color;
pub mod frame;
pub mod grid;
pub mod labels;
pub mod path;
pub mod projection;
pub mod sankey;
pub mod scale;

pub use frame::{Frame, Margin};
pub use scale::{LinearScale, TimeScale};

#[cfg(test)]
pub(crate) fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-6, "expected {b}, got {a}");
}
