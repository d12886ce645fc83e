//! Colour parsing and mixing for computed fills.
//!
//! Theme colours live in CSS custom properties; only the Sankey node fills,
//! which blend two concrete colours, need arithmetic here.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let h = hex.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match h.len() {
            6 => Some(Rgb {
                r: channel(&h[0..2])?,
                g: channel(&h[2..4])?,
                b: channel(&h[4..6])?,
            }),
            3 => {
                let expand = |c: &str| channel(c).map(|v| v * 17);
                Some(Rgb {
                    r: expand(&h[0..1])?,
                    g: expand(&h[1..2])?,
                    b: expand(&h[2..3])?,
                })
            }
            _ => None,
        }
    }

    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Straight per-channel interpolation from `a` (t = 0) to `b` (t = 1).
pub fn interpolate_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Rgb {
        r: mix(a.r, b.r),
        g: mix(a.g, b.g),
        b: mix(a.b, b.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::from_hex("#99B8FF"), Some(Rgb { r: 0x99, g: 0xB8, b: 0xFF }));
        assert_eq!(Rgb::from_hex("#888"), Some(Rgb { r: 0x88, g: 0x88, b: 0x88 }));
        assert_eq!(Rgb::from_hex("99B8FF"), None);
        assert_eq!(Rgb::from_hex("#12345"), None);
    }

    #[test]
    fn interpolation_endpoints_and_midpoint() {
        let a = Rgb { r: 0, g: 100, b: 200 };
        let b = Rgb { r: 100, g: 100, b: 0 };
        assert_eq!(interpolate_rgb(a, b, 0.0), a);
        assert_eq!(interpolate_rgb(a, b, 1.0), b);
        assert_eq!(interpolate_rgb(a, b, 0.5).to_css(), "rgb(50, 100, 100)");
    }
}
