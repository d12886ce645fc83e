//! Monthly fatalities line chart (chapter 5).
//!
//! One line per country over the monthly series, a dot per month drawn in
//! ascending fatality order so the largest values sit on top, and a hover
//! tooltip snapped to the nearest month.

use crate::components::{ChartContainer, ChartHeader, GuideBanner, SourceNote, Tooltip};
use crate::hooks::{stage, to_view, use_element_width, use_reveal, use_timeline};
use crate::state::AppState;
use cdv_core::{Country, YearMonth};
use cdv_db::models::MonthlyFatalities;
use cdv_layout::frame::responsive_width;
use cdv_layout::path::{line_defined, Curve};
use cdv_layout::scale::month_ticks;
use cdv_layout::{Frame, LinearScale, Margin, TimeScale};
use cdv_stats::summary::bisect_center;
use dioxus::prelude::*;

const CONTAINER_ID: &str = "fatalities-line-chart";
const HEIGHT: f64 = 440.0;
const MARGIN: Margin = Margin::new(32.0, 110.0, 44.0, 64.0);
const DRAW_MS: f64 = 1500.0;
const DOTS_MS: f64 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: Country,
    /// (month, fatalities) ordered by month
    pub points: Vec<(YearMonth, f64)>,
    pub path: String,
    /// End-of-line label anchor
    pub label_at: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub country: Country,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub frame: Frame,
    pub x: TimeScale,
    pub y: LinearScale,
    pub months: Vec<YearMonth>,
    pub series: Vec<CountrySeries>,
    pub dots: Vec<Dot>,
    pub x_ticks: Vec<(f64, String)>,
    pub y_ticks: Vec<(f64, String)>,
}

/// Scales, paths and dots for `rows` at the given chart width.
pub fn line_view(rows: &[MonthlyFatalities], width: f64) -> Option<LineView> {
    let first = rows.iter().map(|r| r.month).min()?;
    let last = rows.iter().map(|r| r.month).max()?;
    let frame = Frame::new(width, HEIGHT, MARGIN);
    let x = TimeScale::new((first.first_day(), last.first_day()), (MARGIN.left, frame.right()));
    let max = rows.iter().map(|r| r.fatalities).fold(0.0, f64::max);
    let y = LinearScale::new((0.0, max), (frame.bottom(), MARGIN.top)).nice();

    let mut months: Vec<YearMonth> = rows.iter().map(|r| r.month).collect();
    months.sort();
    months.dedup();

    let mut series = Vec::new();
    let mut dots = Vec::new();
    for country in Country::ALL {
        let mut points: Vec<(YearMonth, f64)> = rows
            .iter()
            .filter(|r| r.country == country)
            .map(|r| (r.month, r.fatalities))
            .collect();
        if points.is_empty() {
            continue;
        }
        points.sort_by_key(|(m, _)| *m);
        let projected: Vec<Option<(f64, f64)>> = points
            .iter()
            .map(|(m, v)| v.is_finite().then(|| (x.scale(m.first_day()), y.scale(*v))))
            .collect();
        for (m, v) in &points {
            dots.push(Dot { country, x: x.scale(m.first_day()), y: y.scale(*v), value: *v });
        }
        let (lm, lv) = points[points.len() - 1];
        let offset = if country == Country::Israel { 10.0 } else { -10.0 };
        series.push(CountrySeries {
            country,
            path: line_defined(&projected, Curve::Linear),
            label_at: (x.scale(lm.first_day()) + 8.0, y.scale(lv) + offset),
            points,
        });
    }
    dots.sort_by(|a, b| a.value.total_cmp(&b.value));

    let x_ticks = month_ticks(first, last, 3)
        .into_iter()
        .map(|d| (x.scale(d), YearMonth::of(d).short_label()))
        .collect();
    let y_ticks = y.ticks(6).into_iter().map(|v| (y.scale(v), format!("{}", v))).collect();

    Some(LineView { frame, x, y, months, series, dots, x_ticks, y_ticks })
}

/// Index into `view.months` of the month nearest to pointer x.
pub fn nearest_month(view: &LineView, px: f64) -> Option<usize> {
    let xs: Vec<f64> = view.months.iter().map(|m| view.x.scale(m.first_day())).collect();
    bisect_center(&xs, px)
}

/// Tooltip rows for a month: Palestine first, with square opacity dimmed
/// for the non-selected country.
pub fn tooltip_rows(view: &LineView, month: YearMonth, selected: Option<Country>) -> Vec<(Country, f64, f64)> {
    Country::TOOLTIP_ORDER
        .iter()
        .filter_map(|c| {
            let s = view.series.iter().find(|s| s.country == *c)?;
            let (_, value) = s.points.iter().find(|(m, _)| *m == month)?;
            let opacity = match selected {
                Some(sel) if sel != *c => 0.2,
                _ => 1.0,
            };
            Some((*c, *value, opacity))
        })
        .collect()
}

/// Country whose dot, line or label lies under the pointer.
pub fn hit_country(view: &LineView, px: f64, py: f64) -> Option<Country> {
    if let Some(dot) = view
        .dots
        .iter()
        .rev()
        .find(|d| (d.x - px).hypot(d.y - py) <= 6.0)
    {
        return Some(dot.country);
    }
    for s in &view.series {
        let (lx, ly) = s.label_at;
        if px >= lx && px <= lx + 80.0 && (py - ly).abs() <= 9.0 {
            return Some(s.country);
        }
    }
    // distance to the line at the pointer's month
    let idx = nearest_month(view, px)?;
    let month = view.months[idx];
    view.series.iter().find_map(|s| {
        let (_, v) = s.points.iter().find(|(m, _)| *m == month)?;
        ((view.y.scale(*v) - py).abs() <= 5.0).then_some(s.country)
    })
}

#[component]
pub fn FatalitiesLineChart() -> Element {
    let state = use_context::<AppState>();
    let mut selected: Signal<Option<Country>> = use_signal(|| None);
    let mut hovered: Signal<Option<(usize, f64)>> = use_signal(|| None);
    let (div_width, on_mounted) = use_element_width();
    let visible = use_reveal(CONTAINER_ID, 1.0);
    let elapsed = use_timeline(visible, DRAW_MS + DOTS_MS);

    let rows = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        match data.db.query_monthly_fatalities() {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("[CDV] line chart: {}", e);
                Vec::new()
            }
        }
    });

    let width = responsive_width(div_width(), 360.0, 1100.0, 800.0);
    let Some(view) = line_view(&rows.read(), width) else {
        return rsx! {
            ChartContainer { id: CONTAINER_ID, ChartHeader { title: "Monthly fatalities" } }
        };
    };

    let draw = stage(elapsed(), 0.0, DRAW_MS);
    let dots_opacity = stage(elapsed(), DRAW_MS, DOTS_MS);
    let sel = selected();
    let frame = view.frame;
    let view_box = frame.view_box();

    let move_view = view.clone();
    let click_view = view.clone();
    let tooltip = hovered().and_then(|(idx, y_px)| {
        let month = *view.months.get(idx)?;
        let rows = tooltip_rows(&view, month, sel);
        let visible_rows: Vec<_> = rows.iter().filter(|(c, _, _)| sel.map_or(true, |s| s == *c)).collect();
        if visible_rows.is_empty() {
            return None;
        }
        let x = view.x.scale(month.first_day());
        let focus: Vec<(Country, f64)> = visible_rows.iter().map(|(c, v, _)| (*c, view.y.scale(*v))).collect();
        Some((month, x, y_px, rows, focus))
    });

    rsx! {
        ChartContainer {
            id: CONTAINER_ID,
            ChartHeader {
                title: "Monthly fatalities",
                subtitle: "Click a line to focus on one country; click the background to reset.",
            }
            div {
                style: "position: relative; width: 100%; cursor: crosshair;",
                onmounted: on_mounted,
                onmouseleave: move |_| hovered.set(None),
                onmousemove: move |e| {
                    let c = e.data().element_coordinates();
                    let (vx, vy) = to_view(c.x, c.y, div_width(), frame.width);
                    let inside = vx >= MARGIN.left && vx <= frame.right() && vy >= MARGIN.top && vy <= frame.bottom();
                    hovered.set(if inside { nearest_month(&move_view, vx).map(|i| (i, c.y)) } else { None });
                },
                onclick: move |e| {
                    let c = e.data().element_coordinates();
                    let (vx, vy) = to_view(c.x, c.y, div_width(), frame.width);
                    let hit = hit_country(&click_view, vx, vy);
                    selected.set(match hit {
                        Some(h) if sel != Some(h) => Some(h),
                        Some(_) => None,
                        None => None,
                    });
                },
                svg {
                    style: "width: 100%; height: auto; pointer-events: none;",
                    view_box: "{view_box}",
                    "preserveAspectRatio": "xMidYMid meet",

                    text {
                        x: "{MARGIN.left}", y: "{MARGIN.top - 12.0}",
                        "font-size": "12", "font-weight": "600", fill: "var(--text-primary)",
                        "Monthly fatalities"
                    }
                    for (y, label) in view.y_ticks.iter() {
                        line {
                            x1: "{MARGIN.left}", x2: "{frame.right()}", y1: "{y}", y2: "{y}",
                            stroke: "var(--text-primary)", "stroke-opacity": "0.15",
                        }
                        text {
                            x: "{MARGIN.left - 8.0}", y: "{y}", dy: "0.32em",
                            "text-anchor": "end", "font-size": "11", fill: "var(--text-primary)",
                            "{label}"
                        }
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
                    for s in view.series.iter() {
                        {
                            let other = sel.is_some_and(|c| c != s.country);
                            let opacity = if other { 0.15 } else { 1.0 };
                            let stroke_width = if sel == Some(s.country) { 3.5 } else { 2.5 };
                            rsx! {
                                path {
                                    key: "{s.country.slug()}-line",
                                    d: "{s.path}",
                                    fill: "none",
                                    stroke: "{s.country.css_var()}",
                                    "stroke-width": "{stroke_width}",
                                    opacity: "{opacity}",
                                    "pathLength": "1",
                                    "stroke-dasharray": "1",
                                    "stroke-dashoffset": "{1.0 - draw}",
                                }
                                text {
                                    x: "{s.label_at.0}", y: "{s.label_at.1}", dy: "0.32em",
                                    fill: "{s.country.css_var()}", "font-size": "12", "font-weight": "600",
                                    "{s.country.label()}"
                                }
                            }
                        }
                    }
                    for (i, dot) in view.dots.iter().enumerate() {
                        if sel.map_or(true, |c| c == dot.country) {
                            circle {
                                key: "dot-{i}",
                                cx: "{dot.x}", cy: "{dot.y}", r: "4",
                                fill: "{dot.country.css_var()}",
                                opacity: "{dots_opacity}",
                            }
                        }
                    }
                    if let Some((_, x, _, _, focus)) = tooltip.as_ref() {
                        line {
                            x1: "{x}", x2: "{x}", y1: "{MARGIN.top}", y2: "{frame.bottom()}",
                            stroke: "var(--text-primary)", "stroke-opacity": "0.25", "stroke-width": "1.2",
                        }
                        for (c, fy) in focus.iter() {
                            circle {
                                cx: "{x}", cy: "{fy}", r: "6",
                                fill: "{c.css_var()}", stroke: "var(--bg-primary)", "stroke-width": "2",
                            }
                        }
                    }
                }
                if let Some((month, x, y_px, rows, _)) = tooltip.as_ref() {
                    Tooltip {
                        x_pct: x / frame.width * 100.0,
                        y: y_px - 20.0,
                        div { class: "tooltip-date", style: "font-weight: 600; margin-bottom: 4px;", "{month.label()}" }
                        for (c, v, opacity) in rows.iter() {
                            div {
                                class: "tooltip-entry",
                                style: "display: flex; align-items: center; gap: 6px;",
                                span { style: "width: 10px; height: 10px; background: {c.css_var()}; opacity: {opacity};" }
                                span { "{c.label()}" }
                                span { style: "margin-left: auto; font-weight: 600;", "{v}" }
                            }
                        }
                    }
                }
                GuideBanner { text: "Click a line to select", position: "top: 40px; right: 120px;" }
                GuideBanner { text: "Hover tooltip", position: "top: 120px; left: 50%;" }
            }
            SourceNote { source: "ACLED" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(m: (i32, u32), country: Country, fatalities: f64) -> MonthlyFatalities {
        MonthlyFatalities { month: YearMonth::new(m.0, m.1).unwrap(), country, fatalities }
    }

    fn sample() -> Vec<MonthlyFatalities> {
        vec![
            row((2023, 10), Country::Palestine, 6245.0),
            row((2023, 10), Country::Israel, 1420.0),
            row((2023, 11), Country::Palestine, 8000.0),
            row((2023, 11), Country::Israel, 100.0),
            row((2023, 12), Country::Palestine, 7000.0),
            row((2023, 12), Country::Israel, 80.0),
        ]
    }

    #[test]
    fn empty_data_has_no_view() {
        assert!(line_view(&[], 800.0).is_none());
    }

    #[test]
    fn view_spans_inner_frame() {
        let v = line_view(&sample(), 800.0).unwrap();
        assert_eq!(v.months.len(), 3);
        assert_eq!(v.series.len(), 2);
        assert_eq!(v.x.scale(v.months[0].first_day()), MARGIN.left);
        assert_eq!(v.x.scale(v.months[2].first_day()), 800.0 - MARGIN.right);
        // nice domain starts at zero and covers the max
        assert_eq!(v.y.scale(0.0), HEIGHT - MARGIN.bottom);
        assert!(v.y.scale(8000.0) >= MARGIN.top);
    }

    #[test]
    fn dots_are_drawn_smallest_first() {
        let v = line_view(&sample(), 800.0).unwrap();
        assert_eq!(v.dots.len(), 6);
        assert_eq!(v.dots.first().unwrap().value, 80.0);
        assert_eq!(v.dots.last().unwrap().value, 8000.0);
    }

    #[test]
    fn ticks_every_third_month() {
        let v = line_view(&sample(), 800.0).unwrap();
        assert_eq!(v.x_ticks.len(), 1);
        assert_eq!(v.x_ticks[0].1, "Oct 2023");
    }

    #[test]
    fn tooltip_lists_palestine_first_and_dims_other() {
        let v = line_view(&sample(), 800.0).unwrap();
        let nov = YearMonth::new(2023, 11).unwrap();
        let rows = tooltip_rows(&v, nov, Some(Country::Israel));
        assert_eq!(rows[0], (Country::Palestine, 8000.0, 0.2));
        assert_eq!(rows[1], (Country::Israel, 100.0, 1.0));
    }

    #[test]
    fn nearest_month_snaps_pointer() {
        let v = line_view(&sample(), 800.0).unwrap();
        let x_nov = v.x.scale(v.months[1].first_day());
        assert_eq!(nearest_month(&v, x_nov + 3.0), Some(1));
        assert_eq!(nearest_month(&v, 0.0), Some(0));
    }

    #[test]
    fn clicking_a_dot_hits_its_country() {
        let v = line_view(&sample(), 800.0).unwrap();
        let d = v.dots.iter().find(|d| d.value == 1420.0).unwrap();
        assert_eq!(hit_country(&v, d.x + 1.0, d.y), Some(Country::Israel));
        assert_eq!(hit_country(&v, d.x, MARGIN.top + 1.0), None);
    }
}
