//! Chart frame: outer size and margins.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Frame {
    pub const fn new(width: f64, height: f64, margin: Margin) -> Self {
        Self { width, height, margin }
    }

    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// Pixel x of the right edge of the plot area.
    pub fn right(&self) -> f64 {
        self.width - self.margin.right
    }

    /// Pixel y of the bottom edge of the plot area.
    pub fn bottom(&self) -> f64 {
        self.height - self.margin.bottom
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }
}

/// Chart width for a measured container width.
///
/// An unmeasured container (zero or negative) falls back to `fallback`.
pub fn responsive_width(container: f64, min: f64, max: f64, fallback: f64) -> f64 {
    let w = if container > 0.0 { container } else { fallback };
    w.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_size_subtracts_margins() {
        let f = Frame::new(1100.0, 440.0, Margin::new(32.0, 110.0, 44.0, 64.0));
        assert_eq!(f.inner_width(), 926.0);
        assert_eq!(f.inner_height(), 364.0);
        assert_eq!(f.right(), 990.0);
        assert_eq!(f.bottom(), 396.0);
        assert_eq!(f.view_box(), "0 0 1100 440");
    }

    #[test]
    fn width_clamps_and_falls_back() {
        assert_eq!(responsive_width(200.0, 360.0, 1100.0, 800.0), 360.0);
        assert_eq!(responsive_width(2000.0, 360.0, 1100.0, 800.0), 1100.0);
        assert_eq!(responsive_width(0.0, 360.0, 1100.0, 800.0), 800.0);
    }
}
