//! Small-multiples panel placement on a fixed 1100x500 canvas.
//!
//! Without a selection the four panels form a 2x2 grid. Selecting a panel
//! enlarges it 1.8x on the right and stacks the other three at 0.6x on the
//! left.

use crate::frame::Margin;

pub const CANVAS_WIDTH: f64 = 1100.0;
pub const CANVAS_HEIGHT: f64 = 500.0;

const GRID_MARGIN: Margin = Margin::new(50.0, 40.0, 35.0, 60.0);
const ZOOM_MARGIN: Margin = Margin::new(50.0, 20.0, 35.0, 260.0);
const GRID_GAP: f64 = 60.0;
const ZOOM_FACTOR: f64 = 1.8;
const SHRINK_FACTOR: f64 = 0.6;
const STACK_SPACING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub selected: bool,
}

/// Rectangle of panel `index` (0..4) given the selected panel, if any.
pub fn panel(index: usize, selected: Option<usize>) -> Panel {
    let m = if selected.is_some() { ZOOM_MARGIN } else { GRID_MARGIN };
    let inner_h = CANVAS_HEIGHT - m.top - m.bottom;
    let cw = (CANVAS_WIDTH - m.left - m.right) / 2.0 - 30.0;
    let ch = inner_h / 2.0 - 30.0;

    match selected {
        None => {
            let (row, col) = ((index / 2) as f64, (index % 2) as f64);
            Panel {
                x: m.left + col * (cw + GRID_GAP),
                y: m.top + row * (ch + GRID_GAP),
                width: cw,
                height: ch,
                opacity: 1.0,
                selected: false,
            }
        }
        Some(sel) if sel == index => Panel {
            x: CANVAS_WIDTH - m.right - cw * ZOOM_FACTOR,
            y: m.top + (inner_h - ch * ZOOM_FACTOR) / 2.0,
            width: cw * ZOOM_FACTOR,
            height: ch * ZOOM_FACTOR,
            opacity: 1.0,
            selected: true,
        },
        Some(sel) => {
            let slot = (if index < sel { index } else { index - 1 }) as f64;
            let small_h = ch * SHRINK_FACTOR;
            let stack = 3.0 * small_h + 2.0 * STACK_SPACING;
            let start_y = m.top + (inner_h - stack) / 2.0;
            Panel {
                x: m.left - 200.0,
                y: start_y + slot * (small_h + STACK_SPACING),
                width: cw * SHRINK_FACTOR,
                height: small_h,
                opacity: 0.7,
                selected: false,
            }
        }
    }
}

/// Y domain of a panel: percentages use 0..100 in the grid view; otherwise
/// the data extent padded by 10% on both sides.
pub fn y_domain(extent: (f64, f64), percentage: bool, zoomed: bool) -> (f64, f64) {
    if percentage && !zoomed {
        return (0.0, 100.0);
    }
    let pad = (extent.1 - extent.0) * 0.1;
    (extent.0 - pad, extent.1 + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;

    #[test]
    fn grid_places_four_equal_panels() {
        let p0 = panel(0, None);
        let p3 = panel(3, None);
        assert_close(p0.x, 60.0);
        assert_close(p0.y, 50.0);
        assert_close(p0.width, 470.0);
        assert_close(p0.height, 177.5);
        assert_close(p3.x, 60.0 + 470.0 + 60.0);
        assert_close(p3.y, 50.0 + 177.5 + 60.0);
    }

    #[test]
    fn selected_panel_grows_on_the_right() {
        let p = panel(2, Some(2));
        assert!(p.selected);
        assert_close(p.width, 380.0 * 1.8);
        assert_close(p.x + p.width, CANVAS_WIDTH - 20.0);
    }

    #[test]
    fn other_panels_stack_on_the_left() {
        let a = panel(0, Some(2));
        let b = panel(1, Some(2));
        let c = panel(3, Some(2));
        assert_close(a.x, 60.0);
        assert_close(b.y - a.y, a.height + 50.0);
        assert_close(c.y - b.y, a.height + 50.0);
        assert_eq!(c.opacity, 0.7);
    }

    #[test]
    fn percentage_domain_depends_on_zoom() {
        assert_eq!(y_domain((40.0, 60.0), true, false), (0.0, 100.0));
        assert_eq!(y_domain((40.0, 60.0), true, true), (38.0, 62.0));
        assert_eq!(y_domain((1000.0, 2000.0), false, false), (900.0, 2100.0));
    }
}
