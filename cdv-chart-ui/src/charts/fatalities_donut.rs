//! Total fatalities per country as a donut (chapter 5).

use crate::components::{ChartContainer, SourceNote, Tooltip};
use crate::hooks::{to_view, use_element_width, use_reveal, use_timeline};
use crate::state::AppState;
use cdv_core::indicator::group_thousands;
use cdv_core::Country;
use cdv_db::models::CountryTotal;
use cdv_layout::arc::{arc_centroid, arc_path, ease_cubic_in_out, pie, Slice};
use dioxus::prelude::*;
use std::f64::consts::TAU;

const CONTAINER_ID: &str = "fatalities-donut-chart";
const SIZE: f64 = 320.0;
const EXTRA_SPACE: f64 = 60.0;
const RADIUS: f64 = SIZE / 2.0 - 20.0;
const INNER_RADIUS: f64 = RADIUS * 0.6;
const CENTER: (f64, f64) = (SIZE / 2.0, SIZE / 2.0 + EXTRA_SPACE / 2.0);
const SWEEP_MS: f64 = 2500.0;
/// Vertical offset of the country labels from their arc centroid.
const LABEL_OFFSET: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub country: Country,
    pub value: f64,
    pub percent: f64,
    pub slice: Slice,
    /// Label position in canvas coordinates
    pub label: (f64, f64),
}

/// Slices in input order. Israel's label goes above its arc, Palestine's below.
pub fn donut_slices(totals: &[CountryTotal]) -> Vec<DonutSlice> {
    let values: Vec<f64> = totals.iter().map(|t| t.fatalities).collect();
    let sum: f64 = values.iter().filter(|v| v.is_finite() && **v > 0.0).sum();
    totals
        .iter()
        .zip(pie(&values))
        .map(|(t, slice)| {
            let (cx, cy) = arc_centroid(INNER_RADIUS, RADIUS, slice);
            let dy = match t.country {
                Country::Israel => -LABEL_OFFSET,
                Country::Palestine => LABEL_OFFSET,
            };
            DonutSlice {
                country: t.country,
                value: t.fatalities,
                percent: if sum > 0.0 { t.fatalities / sum * 100.0 } else { 0.0 },
                slice,
                label: (CENTER.0 + cx, CENTER.1 + cy + dy),
            }
        })
        .collect()
}

/// Slice under a canvas point, if it falls on the ring.
pub fn slice_at(slices: &[DonutSlice], x: f64, y: f64) -> Option<usize> {
    let (dx, dy) = (x - CENTER.0, y - CENTER.1);
    let r = dx.hypot(dy);
    if !(INNER_RADIUS..=RADIUS).contains(&r) {
        return None;
    }
    // clockwise from 12 o'clock, like the pie angles
    let angle = dx.atan2(-dy).rem_euclid(TAU);
    slices
        .iter()
        .position(|s| angle >= s.slice.start && angle < s.slice.end)
}

#[component]
pub fn FatalitiesDonut() -> Element {
    let state = use_context::<AppState>();
    let mut hovered: Signal<Option<(usize, f64, f64)>> = use_signal(|| None);
    let (div_width, on_mounted) = use_element_width();
    let visible = use_reveal(CONTAINER_ID, 0.5);
    let elapsed = use_timeline(visible, SWEEP_MS);

    let totals = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        data.db.query_total_fatalities().unwrap_or_else(|e| {
            log::error!("[CDV] donut: {}", e);
            Vec::new()
        })
    });

    let slices = donut_slices(&totals.read());
    let sweep = ease_cubic_in_out((elapsed() / SWEEP_MS).clamp(0.0, 1.0));
    let started = visible();
    let hit_slices = slices.clone();
    let view_box = format!("0 0 {} {}", SIZE, SIZE + EXTRA_SPACE);
    let tooltip = hovered().and_then(|(i, x_pct, y)| slices.get(i).cloned().map(|s| (s, x_pct, y)));

    rsx! {
        ChartContainer {
            id: CONTAINER_ID,
            min_height: 380,
            div {
                style: "width: 340px; max-width: 100%; margin: 0 auto; text-align: center;",
                div {
                    style: "font-weight: 700; font-size: 20px; margin-bottom: 8px; color: var(--text-primary);",
                    "Fatalities Distribution: Gaza vs Israel"
                }
                div {
                    style: "position: relative; width: 100%;",
                    onmounted: on_mounted,
                    onmouseleave: move |_| hovered.set(None),
                    onmousemove: move |e| {
                        let c = e.data().element_coordinates();
                        let (vx, vy) = to_view(c.x, c.y, div_width(), SIZE);
                        let pct = vx / SIZE * 100.0;
                        hovered.set(slice_at(&hit_slices, vx, vy).map(|i| (i, pct, c.y)));
                    },
                    svg {
                        style: "width: 100%; height: auto; display: block; pointer-events: none;",
                        view_box: "{view_box}",
                        "preserveAspectRatio": "xMidYMid meet",
                        if started {
                            g {
                                transform: "translate({CENTER.0},{CENTER.1})",
                                for s in slices.iter() {
                                    path {
                                        key: "{s.country.slug()}",
                                        d: "{arc_path(INNER_RADIUS, RADIUS, s.slice.swept(sweep))}",
                                        fill: "{s.country.css_var()}",
                                    }
                                }
                            }
                            for s in slices.iter() {
                                text {
                                    x: "{s.label.0}", y: "{s.label.1}",
                                    "text-anchor": "middle", "font-size": "17", "font-weight": "700",
                                    fill: "{s.country.css_var()}",
                                    "{s.country.label()}"
                                }
                            }
                        }
                    }
                    if let Some((s, x_pct, y)) = tooltip {
                        Tooltip {
                            x_pct,
                            y: y - 24.0,
                            span { style: "color: {s.country.css_var()}; font-weight: 700;", "{s.country.label()}" }
                            br {}
                            "{s.percent:.1}% ({group_thousands(s.value)})"
                        }
                    }
                }
            }
            SourceNote { source: "ACLED" }
        }
    }
}
