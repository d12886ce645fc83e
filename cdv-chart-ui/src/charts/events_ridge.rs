//! Weekly events ridge plot (chapter 4).
//!
//! Each country's weekly event count, summed over the selected event types,
//! is drawn as a filled ridge above a shared baseline. The amplitude is
//! fixed by the largest weekly total across all types so toggling types
//! never rescales the plot.

use crate::components::{ChartContainer, ChartHeader, EventTypeFilter, GuideBanner, SourceNote, Tooltip};
use crate::hooks::{stage, to_view, use_element_width, use_reveal, use_timeline};
use crate::state::AppState;
use cdv_core::period::format_week;
use cdv_core::{Country, YearMonth};
use cdv_db::models::{WeeklyBreakdown, WeeklyCount};
use cdv_layout::frame::responsive_width;
use cdv_layout::path::{area, Curve};
use cdv_layout::scale::month_ticks;
use cdv_layout::{Frame, LinearScale, Margin, TimeScale};
use cdv_stats::summary::bisect_center;
use chrono::NaiveDate;
use dioxus::prelude::*;
use std::collections::BTreeMap;

const CONTAINER_ID: &str = "events-ridge-chart";
const HEIGHT: f64 = 400.0;
const MARGIN: Margin = Margin::new(40.0, 40.0, 60.0, 60.0);
const DRAW_MS: f64 = 1500.0;
const FILL_OPACITY: f64 = 0.6;

/// Palestine first so Israel is drawn in front.
const DRAW_ORDER: [Country; 2] = [Country::Palestine, Country::Israel];

fn domain() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ridge {
    pub country: Country,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RidgeView {
    pub frame: Frame,
    pub x: TimeScale,
    pub baseline: f64,
    pub weeks: Vec<NaiveDate>,
    pub ridges: Vec<Ridge>,
    pub x_ticks: Vec<(f64, String)>,
}

/// Ridges for the weekly sums in `rows`, scaled so `global_max` reaches
/// the full ridge height.
pub fn ridge_view(rows: &[WeeklyCount], global_max: f64, width: f64) -> RidgeView {
    let frame = Frame::new(width, HEIGHT, MARGIN);
    let (start, end) = domain();
    let x = TimeScale::new((start, end), (MARGIN.left, frame.right()));
    let inner_h = frame.inner_height();
    let baseline = frame.bottom() - inner_h * 0.2;
    let max_height = (inner_h * 0.8).min(500.0);
    let amplitude = LinearScale::new((0.0, if global_max > 0.0 { global_max } else { 1.0 }), (0.0, max_height));

    let mut by_country: BTreeMap<Country, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for r in rows {
        *by_country.entry(r.country).or_default().entry(r.week).or_insert(0.0) += r.events;
    }
    let mut weeks: Vec<NaiveDate> = rows.iter().map(|r| r.week).collect();
    weeks.sort();
    weeks.dedup();

    let ridges = DRAW_ORDER
        .iter()
        .filter_map(|c| {
            let series = by_country.get(c)?;
            let top: Vec<(f64, f64)> = weeks
                .iter()
                .map(|w| {
                    let v = series.get(w).copied().unwrap_or(0.0);
                    (x.scale(*w), baseline - amplitude.scale(v))
                })
                .collect();
            let bottom: Vec<(f64, f64)> = top.iter().map(|(px, _)| (*px, baseline)).collect();
            Some(Ridge { country: *c, path: area(&top, &bottom, Curve::Linear) })
        })
        .collect();

    let first = YearMonth::of(start);
    let last = YearMonth::new(2025, 10).unwrap_or(first);
    let x_ticks = month_ticks(first, last, 3)
        .into_iter()
        .map(|d| (x.scale(d), YearMonth::of(d).short_label()))
        .collect();

    RidgeView { frame, x, baseline, weeks, ridges, x_ticks }
}

/// Week nearest to pointer x, if any data is shown.
pub fn nearest_week(view: &RidgeView, px: f64) -> Option<NaiveDate> {
    let xs: Vec<f64> = view.weeks.iter().map(|w| view.x.scale(*w)).collect();
    bisect_center(&xs, px).map(|i| view.weeks[i])
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub country: Country,
    pub selected_count: f64,
    /// (event type, count, percent of the selected count), in selection order
    pub types: Vec<(String, f64, f64)>,
}

/// Tooltip body for one week: Palestine then Israel, every selected type
/// listed even when it had no events.
pub fn tooltip_entries(breakdown: &[WeeklyBreakdown], selected: &[String]) -> Vec<TooltipEntry> {
    let mut sorted: Vec<&String> = selected.iter().collect();
    sorted.sort();
    Country::TOOLTIP_ORDER
        .iter()
        .map(|c| {
            let count = |t: &str| {
                breakdown
                    .iter()
                    .filter(|b| b.country == *c && b.event_type == t)
                    .map(|b| b.events)
                    .sum::<f64>()
            };
            let selected_count: f64 = sorted.iter().map(|t| count(t)).sum();
            let types = sorted
                .iter()
                .map(|t| {
                    let v = count(t);
                    let pct = if selected_count > 0.0 { v / selected_count * 100.0 } else { 0.0 };
                    (t.to_string(), v, pct)
                })
                .collect();
            TooltipEntry { country: *c, selected_count, types }
        })
        .collect()
}

#[component]
pub fn EventsRidge() -> Element {
    let state = use_context::<AppState>();
    let mut selected: Signal<Vec<String>> = use_signal(Vec::new);
    let mut initialized = use_signal(|| false);
    let mut hovered: Signal<Option<(NaiveDate, f64)>> = use_signal(|| None);
    let (div_width, on_mounted) = use_element_width();
    let visible = use_reveal(CONTAINER_ID, 0.3);
    let elapsed = use_timeline(visible, DRAW_MS);

    let event_types = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        data.db.query_event_types().unwrap_or_else(|e| {
            log::error!("[CDV] ridge: {}", e);
            Vec::new()
        })
    });

    use_effect(move || {
        let types = event_types();
        if !types.is_empty() && !*initialized.peek() {
            initialized.set(true);
            selected.set(types);
        }
    });

    let weekly = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return (Vec::new(), 0.0);
        };
        let rows = data.db.query_weekly_events(&selected()).unwrap_or_else(|e| {
            log::error!("[CDV] ridge: {}", e);
            Vec::new()
        });
        let max = data.db.query_weekly_max_all().unwrap_or(0.0);
        (rows, max)
    });

    let width = responsive_width(div_width(), 360.0, 1100.0, 800.0);
    let view = {
        let (rows, max) = &*weekly.read();
        ridge_view(rows, *max, width)
    };
    let frame = view.frame;
    let view_box = frame.view_box();
    let draw = stage(elapsed(), 0.0, DRAW_MS);
    let nothing_selected = selected.read().is_empty();

    let tooltip = hovered().and_then(|(week, y_px)| {
        let data = (state.datasets)()?;
        let breakdown = data.db.query_weekly_breakdown(week, &selected.read()).ok()?;
        Some((week, view.x.scale(week), y_px, tooltip_entries(&breakdown, &selected.read())))
    });

    let move_view = view.clone();
    let (plot_x0, plot_x1) = view.x.range();
    let legend_x = frame.right() - 140.0;

    rsx! {
        ChartContainer {
            id: CONTAINER_ID,
            ChartHeader {
                title: "Events timeline",
                subtitle: "Weekly ACLED events per country, filtered by event type.",
            }
            EventTypeFilter { available: event_types(), selected }
            div {
                style: "position: relative; width: 100%; cursor: crosshair;",
                onmounted: on_mounted,
                onmouseleave: move |_| hovered.set(None),
                onmousemove: move |e| {
                    let c = e.data().element_coordinates();
                    let (vx, vy) = to_view(c.x, c.y, div_width(), frame.width);
                    let inside = vx >= plot_x0 && vx <= plot_x1 && vy >= MARGIN.top && vy <= frame.bottom();
                    hovered.set(if inside { nearest_week(&move_view, vx).map(|w| (w, c.y)) } else { None });
                },
                svg {
                    style: "width: 100%; height: auto; pointer-events: none;",
                    view_box: "{view_box}",
                    "preserveAspectRatio": "xMidYMid meet",

                    text {
                        x: "{MARGIN.left}", y: "{MARGIN.top - 12.0}",
                        "font-size": "12", "font-weight": "600", fill: "var(--text-primary)",
                        "Events timeline (2023-2025)"
                    }
                    for ridge in view.ridges.iter() {
                        path {
                            key: "{ridge.country.slug()}",
                            d: "{ridge.path}",
                            fill: "{ridge.country.css_var()}",
                            "fill-opacity": "{FILL_OPACITY * draw}",
                            stroke: "{ridge.country.css_var()}",
                            "stroke-width": "2",
                            "pathLength": "1",
                            "stroke-dasharray": "1",
                            "stroke-dashoffset": "{1.0 - draw}",
                        }
                    }
                    line {
                        x1: "{MARGIN.left}", x2: "{frame.right()}", y1: "{view.baseline}", y2: "{view.baseline}",
                        stroke: "var(--text-primary)", "stroke-opacity": "0.3", "stroke-width": "1.5",
                    }
                    line {
                        x1: "{MARGIN.left}", x2: "{frame.right()}", y1: "{frame.bottom()}", y2: "{frame.bottom()}",
                        stroke: "var(--text-primary)", "stroke-opacity": "0.4",
                    }
                    for (x, label) in view.x_ticks.iter() {
                        line {
                            x1: "{x}", x2: "{x}", y1: "{frame.bottom()}", y2: "{frame.bottom() + 6.0}",
                            stroke: "var(--text-primary)", "stroke-opacity": "0.25",
                        }
                        text {
                            x: "{x}", y: "{frame.bottom() + 20.0}",
                            "text-anchor": "middle", "font-size": "11", fill: "var(--text-primary)",
                            "{label}"
                        }
                    }
                    for (i, country) in Country::TOOLTIP_ORDER.iter().enumerate() {
                        rect {
                            x: "{legend_x}", y: "{MARGIN.top + 10.0 + i as f64 * 20.0}",
                            width: "12", height: "12", rx: "2",
                            fill: "{country.css_var()}", "fill-opacity": "0.6",
                            stroke: "{country.css_var()}", "stroke-width": "1",
                        }
                        text {
                            x: "{legend_x + 18.0}", y: "{MARGIN.top + 20.0 + i as f64 * 20.0}",
                            "font-size": "11", fill: "var(--text-primary)",
                            "{country.label()}"
                        }
                    }
                    if nothing_selected {
                        text {
                            x: "{frame.width / 2.0}", y: "{HEIGHT / 2.0 - 30.0}",
                            "text-anchor": "middle", "font-size": "16", "font-style": "italic",
                            fill: "var(--text-primary)", opacity: "0.6",
                            "Select at least one event type"
                        }
                    }
                    if let Some((_, x, _, _)) = tooltip.as_ref() {
                        line {
                            x1: "{x}", x2: "{x}", y1: "{MARGIN.top}", y2: "{frame.bottom()}",
                            stroke: "var(--text-primary)", "stroke-opacity": "0.25", "stroke-width": "1.2",
                        }
                    }
                }
                if let Some((week, x, y_px, entries)) = tooltip.as_ref() {
                    Tooltip {
                        x_pct: *x / frame.width * 100.0,
                        y: *y_px - 20.0,
                        div { class: "tooltip-date", style: "font-weight: 600; margin-bottom: 4px;", "{format_week(week)}" }
                        for entry in entries.iter() {
                            div {
                                class: "tooltip-entry",
                                style: "display: flex; align-items: center; gap: 6px; margin-top: 4px;",
                                span { style: "width: 10px; height: 10px; border-radius: 2px; background: {entry.country.css_var()}; opacity: 0.6;" }
                                span { "{entry.country.label()}:" }
                                span { style: "font-weight: 600;", "{entry.selected_count} selected" }
                            }
                            for (event_type, value, pct) in entry.types.iter() {
                                div {
                                    class: "tooltip-detail",
                                    style: "display: flex; justify-content: space-between; gap: 10px; padding-left: 16px;",
                                    span { "{event_type}" }
                                    span { style: "font-weight: 700;", "{value} ({pct:.1}%)" }
                                }
                            }
                        }
                    }
                }
                GuideBanner { text: "Hover tooltip", position: "top: 10%; left: 58%;" }
                GuideBanner { text: "Events selection", position: "top: -48px; left: 0;" }
            }
            SourceNote { source: "ACLED" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn count(w: NaiveDate, country: Country, events: f64) -> WeeklyCount {
        WeeklyCount { week: w, country, events }
    }

    #[test]
    fn ridges_are_drawn_palestine_first() {
        let rows = vec![
            count(week(2023, 10, 7), Country::Israel, 40.0),
            count(week(2023, 10, 7), Country::Palestine, 80.0),
            count(week(2023, 10, 14), Country::Palestine, 60.0),
        ];
        let v = ridge_view(&rows, 100.0, 800.0);
        assert_eq!(v.ridges.len(), 2);
        assert_eq!(v.ridges[0].country, Country::Palestine);
        assert_eq!(v.ridges[1].country, Country::Israel);
        assert_eq!(v.weeks.len(), 2);
    }

    #[test]
    fn baseline_sits_at_eighty_percent() {
        let v = ridge_view(&[], 10.0, 800.0);
        // inner height 300, baseline 60 px above the bottom edge
        assert_eq!(v.baseline, 400.0 - 60.0 - 60.0);
        assert!(v.ridges.is_empty());
        assert_eq!(v.x_ticks.first().unwrap().1, "Jan 2023");
        assert_eq!(v.x_ticks.last().unwrap().1, "Oct 2025");
    }

    #[test]
    fn amplitude_is_fixed_by_global_max() {
        let rows = vec![count(week(2024, 1, 6), Country::Israel, 50.0)];
        let full = ridge_view(&rows, 50.0, 800.0);
        let half = ridge_view(&rows, 100.0, 800.0);
        // baseline 280, ridge height 240 at the global max
        assert!(full.ridges[0].path.contains(",40.00"));
        assert!(half.ridges[0].path.contains(",160.00"));
    }

    #[test]
    fn nearest_week_snaps_to_data() {
        let rows = vec![
            count(week(2024, 1, 6), Country::Israel, 5.0),
            count(week(2024, 1, 13), Country::Israel, 5.0),
        ];
        let v = ridge_view(&rows, 5.0, 800.0);
        let x = v.x.scale(week(2024, 1, 12));
        assert_eq!(nearest_week(&v, x), Some(week(2024, 1, 13)));
        assert_eq!(nearest_week(&ridge_view(&[], 1.0, 800.0), x), None);
    }

    #[test]
    fn tooltip_lists_every_selected_type_with_share() {
        let breakdown = vec![
            WeeklyBreakdown { country: Country::Palestine, event_type: "Battles".into(), events: 30.0 },
            WeeklyBreakdown { country: Country::Palestine, event_type: "Protests".into(), events: 10.0 },
            WeeklyBreakdown { country: Country::Israel, event_type: "Protests".into(), events: 4.0 },
        ];
        let selected = vec!["Protests".to_string(), "Battles".to_string()];
        let entries = tooltip_entries(&breakdown, &selected);
        assert_eq!(entries[0].country, Country::Palestine);
        assert_eq!(entries[0].selected_count, 40.0);
        assert_eq!(entries[0].types[0], ("Battles".to_string(), 30.0, 75.0));
        assert_eq!(entries[1].types[0], ("Battles".to_string(), 0.0, 0.0));
        assert_eq!(entries[1].types[1].2, 100.0);
    }
}
