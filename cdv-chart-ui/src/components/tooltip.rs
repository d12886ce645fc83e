//! Floating tooltip box positioned inside a `ChartContainer`.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct TooltipProps {
    /// Anchor, in percent of the container width
    pub x_pct: f64,
    /// Anchor, in pixels from the container top
    pub y: f64,
    pub children: Element,
}

/// Opens to the right of the anchor on the left half of the chart and to
/// the left on the right half.
#[component]
pub fn Tooltip(props: TooltipProps) -> Element {
    let horizontal = if props.x_pct < 50.0 {
        format!("left: calc({:.2}% + 16px);", props.x_pct.max(0.0))
    } else {
        format!("right: calc({:.2}% + 16px);", (100.0 - props.x_pct).max(0.0))
    };

    rsx! {
        div {
            class: "tooltip",
            style: "position: absolute; top: {props.y:.0}px; {horizontal} pointer-events: none; z-index: 20; \
                    background: var(--color-tooltip-bg); color: var(--color-text); border: 1px solid var(--color-grid); \
                    border-radius: 6px; padding: 8px 10px; font-size: 12px; max-width: 280px; box-shadow: 0 2px 8px rgba(0,0,0,0.25);",
            {props.children}
        }
    }
}
