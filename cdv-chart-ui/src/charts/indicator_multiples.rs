//! Development indicators as four small multiples (chapter 1).
//!
//! One panel per indicator with a line per country over the years. Clicking
//! a panel enlarges it and stacks the others on the left; clicking it again
//! restores the grid.

use crate::components::{ChartContainer, ChartHeader, GuideBanner, SourceNote, Tooltip};
use crate::hooks::{stage, to_view, use_reveal, use_element_width, use_timeline};
use crate::state::AppState;
use cdv_core::{Country, Indicator};
use cdv_db::models::IndicatorRow;
use cdv_layout::grid::{panel, y_domain, Panel, CANVAS_HEIGHT, CANVAS_WIDTH};
use cdv_layout::path::{line_defined, Curve};
use cdv_layout::LinearScale;
use cdv_stats::summary::extent;
use dioxus::prelude::*;

const CONTAINER_ID: &str = "indicator-multiples-chart";
const DRAW_MS: f64 = 1500.0;
const DOTS_MS: f64 = 300.0;
const PANEL_TRANSITION: &str = "transform 500ms ease, opacity 500ms ease";

#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub year: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub country: Country,
    pub path: String,
    pub dots: Vec<Dot>,
}

/// One panel in its own coordinates; the group is translated to `panel.x, panel.y`.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub indicator: Indicator,
    pub panel: Panel,
    pub x: LinearScale,
    pub y: LinearScale,
    pub series: Vec<Series>,
    pub x_ticks: Vec<(f64, i32)>,
    pub y_ticks: Vec<(f64, String)>,
}

pub fn panel_view(rows: &[IndicatorRow], indicator: Indicator, index: usize, selected: Option<usize>) -> Option<PanelView> {
    let present: Vec<&IndicatorRow> = rows.iter().filter(|r| r.value(indicator).is_some()).collect();
    let years = extent(present.iter().map(|r| r.year as f64))?;
    let values = extent(present.iter().filter_map(|r| r.value(indicator)))?;

    let p = panel(index, selected);
    let x = LinearScale::new(years, (0.0, p.width));
    let zoomed = selected == Some(index);
    let y = LinearScale::new(y_domain(values, indicator.is_percentage(), zoomed), (p.height, 0.0)).nice();

    let series = Country::ALL
        .iter()
        .filter_map(|c| {
            let mut own: Vec<&IndicatorRow> = rows.iter().filter(|r| r.country == *c).collect();
            own.sort_by_key(|r| r.year);
            if !own.iter().any(|r| r.value(indicator).is_some()) {
                return None;
            }
            let points: Vec<Option<(f64, f64)>> = own
                .iter()
                .map(|r| r.value(indicator).map(|v| (x.scale(r.year as f64), y.scale(v))))
                .collect();
            let dots = own
                .iter()
                .filter_map(|r| {
                    let v = r.value(indicator)?;
                    Some(Dot { year: r.year, x: x.scale(r.year as f64), y: y.scale(v) })
                })
                .collect();
            Some(Series { country: *c, path: line_defined(&points, Curve::MonotoneX), dots })
        })
        .collect();

    let x_ticks = x
        .ticks(4)
        .into_iter()
        .filter(|t| t.fract() == 0.0)
        .map(|t| (x.scale(t), t as i32))
        .collect();
    let y_ticks = y
        .ticks(5)
        .into_iter()
        .map(|t| (y.scale(t), indicator.format_with_unit(t)))
        .collect();

    Some(PanelView { indicator, panel: p, x, y, series, x_ticks, y_ticks })
}

/// Index into `panels` of the panel under a canvas point.
pub fn panel_at(panels: &[PanelView], x: f64, y: f64) -> Option<usize> {
    panels.iter().position(|v| {
        let p = v.panel;
        x >= p.x && x <= p.x + p.width && y >= p.y && y <= p.y + p.height
    })
}

/// Year under a canvas x inside `view`.
pub fn year_at(view: &PanelView, x: f64) -> i32 {
    view.x.invert(x - view.panel.x).round() as i32
}

/// Change against the previous year as shown in the tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub text: String,
    pub color: &'static str,
}

/// Arrow and magnitude of `value - previous`. A change that rounds to zero
/// at one decimal is flat.
pub fn trend(value: f64, previous: f64, unit: &str) -> Trend {
    let change = value - previous;
    let magnitude = format!("{:.1}", change.abs());
    let flat = magnitude.parse::<f64>().map(|m| m == 0.0).unwrap_or(true);
    let (arrow, color) = if flat {
        ("→", "var(--color-neutral)")
    } else if change > 0.0 {
        ("↑", "var(--color-positive)")
    } else {
        ("↓", "var(--color-negative)")
    };
    let sign = if change > 0.0 { "+" } else { "" };
    Trend { text: format!("{arrow} {sign}{magnitude}{unit}"), color }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub country: Country,
    /// Formatted value, `None` for "No data"
    pub value: Option<String>,
    pub trend: Option<Trend>,
}

pub fn tooltip_entries(rows: &[IndicatorRow], indicator: Indicator, year: i32) -> Vec<TooltipEntry> {
    let lookup = |c: Country, y: i32| {
        rows.iter()
            .find(|r| r.country == c && r.year == y)
            .and_then(|r| r.value(indicator))
    };
    Country::ALL
        .iter()
        .map(|c| {
            let current = lookup(*c, year);
            let trend = current
                .zip(lookup(*c, year - 1))
                .map(|(v, prev)| trend(v, prev, indicator.unit()));
            TooltipEntry {
                country: *c,
                value: current.map(|v| indicator.format_with_unit(v)),
                trend,
            }
        })
        .collect()
}

#[component]
pub fn IndicatorMultiples() -> Element {
    let state = use_context::<AppState>();
    let mut selected: Signal<Option<usize>> = use_signal(|| None);
    let mut hovered: Signal<Option<(usize, i32, f64, f64)>> = use_signal(|| None);
    let (div_width, on_mounted) = use_element_width();
    let visible = use_reveal(CONTAINER_ID, 1.0);
    let elapsed = use_timeline(visible, DRAW_MS + DOTS_MS);

    let rows = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        data.db.query_indicators().unwrap_or_else(|e| {
            log::error!("[CDV] small multiples: {}", e);
            Vec::new()
        })
    });

    let sel = selected();
    let panels: Vec<PanelView> = Indicator::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, ind)| panel_view(&rows.read(), *ind, i, sel))
        .collect();
    let draw = stage(elapsed(), 0.0, DRAW_MS);
    let dots_opacity = 0.8 * stage(elapsed(), DRAW_MS, DOTS_MS);
    let interactive = elapsed() >= DRAW_MS + DOTS_MS;
    let hover = hovered();
    let right_margin = if sel.is_some() { 20.0 } else { 40.0 };
    let legend_x = CANVAS_WIDTH - right_margin - 50.0;
    let view_box = format!("0 0 {} {}", CANVAS_WIDTH, CANVAS_HEIGHT);
    let click_panels = panels.clone();
    let move_panels = panels.clone();

    let tooltip = hover.and_then(|(i, year, x_pct, y_px)| {
        let view = panels.get(i)?;
        Some((view.indicator, year, x_pct, y_px, tooltip_entries(&rows.read(), view.indicator, year)))
    });

    rsx! {
        ChartContainer {
            id: CONTAINER_ID,
            min_height: 500,
            ChartHeader {
                title: "Living conditions",
                subtitle: "Click a panel to enlarge it; hover for yearly values.",
            }
            div {
                style: "position: relative; width: 100%; max-width: 1100px; margin: 0 auto; cursor: pointer;",
                onmounted: on_mounted,
                onclick: move |e| {
                    let c = e.data().element_coordinates();
                    let (vx, vy) = to_view(c.x, c.y, div_width(), CANVAS_WIDTH);
                    if let Some(i) = panel_at(&click_panels, vx, vy) {
                        let idx = Indicator::ALL.iter().position(|ind| *ind == click_panels[i].indicator);
                        selected.set(if selected() == idx { None } else { idx });
                        hovered.set(None);
                    }
                },
                onmousemove: move |e| {
                    if !interactive {
                        return;
                    }
                    let c = e.data().element_coordinates();
                    let (vx, vy) = to_view(c.x, c.y, div_width(), CANVAS_WIDTH);
                    let next = panel_at(&move_panels, vx, vy).map(|i| {
                        (i, year_at(&move_panels[i], vx), vx / CANVAS_WIDTH * 100.0, c.y)
                    });
                    if *hovered.peek() != next {
                        hovered.set(next);
                    }
                },
                onmouseleave: move |_| hovered.set(None),
                svg {
                    style: "width: 100%; height: auto; display: block; pointer-events: none;",
                    view_box: "{view_box}",
                    "preserveAspectRatio": "xMidYMid meet",

                    for (i, v) in panels.iter().enumerate() {
                        g {
                            key: "{v.indicator.column()}",
                            style: "transform: translate({v.panel.x}px, {v.panel.y}px); opacity: {v.panel.opacity}; transition: {PANEL_TRANSITION};",
                            text {
                                x: "{v.panel.width / 2.0}", y: "-10",
                                "text-anchor": "middle", "font-size": "13", "font-weight": "600",
                                fill: "var(--text-primary)",
                                "{v.indicator.label()}"
                            }
                            for (py, label) in v.y_ticks.iter() {
                                line {
                                    x1: "0", x2: "{v.panel.width}", y1: "{py}", y2: "{py}",
                                    stroke: "var(--text-primary)", "stroke-opacity": "0.25", "stroke-dasharray": "2,2",
                                }
                                text {
                                    x: "-6", y: "{py}", dy: "0.32em",
                                    "text-anchor": "end", "font-size": "10", fill: "var(--text-primary)",
                                    "{label}"
                                }
                            }
                            line {
                                x1: "0", x2: "{v.panel.width}", y1: "{v.panel.height}", y2: "{v.panel.height}",
                                stroke: "var(--text-primary)", "stroke-opacity": "0.4",
                            }
                            for (px, year) in v.x_ticks.iter() {
                                line {
                                    x1: "{px}", x2: "{px}", y1: "{v.panel.height}", y2: "{v.panel.height + 6.0}",
                                    stroke: "var(--text-primary)", "stroke-opacity": "0.25",
                                }
                                text {
                                    x: "{px}", y: "{v.panel.height + 18.0}",
                                    "text-anchor": "middle", "font-size": "10", fill: "var(--text-primary)",
                                    "{year}"
                                }
                            }
                            for s in v.series.iter() {
                                path {
                                    d: "{s.path}",
                                    fill: "none",
                                    stroke: "{s.country.css_var()}",
                                    "stroke-width": "5",
                                    "stroke-linejoin": "round",
                                    "stroke-linecap": "round",
                                    "pathLength": "1",
                                    "stroke-dasharray": "1",
                                    "stroke-dashoffset": "{1.0 - draw}",
                                }
                                for d in s.dots.iter() {
                                    {
                                        let active = hover.is_some_and(|(h, y, _, _)| h == i && y == d.year);
                                        let opacity = if active { 1.0 } else { dots_opacity };
                                        rsx! {
                                            circle {
                                                cx: "{d.x}", cy: "{d.y}",
                                                r: if active { "9" } else { "5" },
                                                fill: "{s.country.css_var()}",
                                                stroke: "var(--bg-primary)", "stroke-width": "1.5",
                                                opacity: "{opacity}",
                                                style: "transition: r 100ms ease;",
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    g {
                        transform: "translate({legend_x}, 15)",
                        for (i, c) in Country::ALL.iter().enumerate() {
                            line {
                                x1: "0", x2: "16", y1: "{i as f64 * 16.0}", y2: "{i as f64 * 16.0}",
                                stroke: "{c.css_var()}", "stroke-width": "2.5",
                            }
                            text {
                                x: "20", y: "{i as f64 * 16.0 + 3.0}",
                                "font-size": "12", fill: "var(--text-primary)",
                                "{c.label()}"
                            }
                        }
                    }
                }
                if let Some((indicator, year, x_pct, y_px, entries)) = tooltip {
                    Tooltip {
                        x_pct,
                        y: y_px - 12.0,
                        div { class: "tooltip-title", style: "font-weight: 700;", "{indicator.label()}" }
                        div { class: "tooltip-subtitle", style: "color: var(--color-muted); margin-bottom: 4px;", "Year {year}" }
                        for entry in entries {
                            div {
                                class: "tooltip-country-section",
                                style: "margin-top: 4px;",
                                div { style: "color: {entry.country.css_var()}; font-weight: 600;", "{entry.country.label()}" }
                                if let Some(value) = entry.value {
                                    div { "Value: " strong { "{value}" } }
                                    if let Some(t) = entry.trend {
                                        div {
                                            "vs. {year - 1}: "
                                            span { style: "color: {t.color};", "{t.text}" }
                                        }
                                    }
                                } else {
                                    div { style: "font-style: italic;", "No data" }
                                }
                            }
                        }
                    }
                }
                GuideBanner { text: "Click a panel to zoom", position: "top: 20px; left: 40%;" }
            }
            SourceNote { source: "World Bank" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: Country, year: i32, gdp: Option<f64>, water: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            country,
            year,
            gdp_per_capita: gdp,
            drinking_water: water,
            sanitation: None,
            food_insecurity: None,
        }
    }

    fn sample() -> Vec<IndicatorRow> {
        vec![
            row(Country::Israel, 2020, Some(44000.0), Some(99.0)),
            row(Country::Israel, 2021, Some(52000.0), Some(99.0)),
            row(Country::Palestine, 2020, Some(3200.0), Some(80.0)),
            row(Country::Palestine, 2021, Some(3600.0), None),
        ]
    }

    #[test]
    fn empty_indicator_has_no_panel() {
        assert!(panel_view(&sample(), Indicator::Sanitation, 2, None).is_none());
    }

    #[test]
    fn percentage_panels_span_zero_to_hundred_in_grid() {
        let v = panel_view(&sample(), Indicator::DrinkingWater, 1, None).unwrap();
        assert_eq!(v.y.scale(0.0), v.panel.height);
        assert_eq!(v.y.scale(100.0), 0.0);
        assert_eq!(v.y_ticks.last().unwrap().1, "100.0%");
    }

    #[test]
    fn missing_values_break_the_line() {
        let v = panel_view(&sample(), Indicator::DrinkingWater, 1, None).unwrap();
        let palestine = v.series.iter().find(|s| s.country == Country::Palestine).unwrap();
        assert_eq!(palestine.dots.len(), 1);
        assert_eq!(palestine.path.matches('M').count(), 1);
    }

    #[test]
    fn pointer_maps_to_panel_and_year() {
        let panels: Vec<PanelView> = Indicator::ALL
            .iter()
            .enumerate()
            .filter_map(|(i, ind)| panel_view(&sample(), *ind, i, None))
            .collect();
        let gdp = &panels[0];
        let x = gdp.panel.x + gdp.panel.width - 1.0;
        let y = gdp.panel.y + 5.0;
        assert_eq!(panel_at(&panels, x, y), Some(0));
        assert_eq!(year_at(gdp, x), 2021);
        assert_eq!(panel_at(&panels, 0.0, 0.0), None);
    }

    #[test]
    fn trend_rounds_before_choosing_arrow() {
        assert_eq!(trend(50.04, 50.0, "%").text, "→ +0.0%");
        assert_eq!(trend(52.0, 50.0, "%").text, "↑ +2.0%");
        let down = trend(48.0, 50.0, "%");
        assert_eq!(down.text, "↓ 2.0%");
        assert_eq!(down.color, "var(--color-negative)");
    }

    #[test]
    fn tooltip_compares_with_previous_year() {
        let entries = tooltip_entries(&sample(), Indicator::GdpPerCapita, 2021);
        assert_eq!(entries[0].country, Country::Israel);
        assert_eq!(entries[0].value.as_deref(), Some("52,000$"));
        assert_eq!(entries[0].trend.as_ref().unwrap().text, "↑ +8000.0$");
        let water = tooltip_entries(&sample(), Indicator::DrinkingWater, 2021);
        assert_eq!(water[1].value, None);
    }
}
