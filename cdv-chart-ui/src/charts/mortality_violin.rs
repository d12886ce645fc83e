//! Age-at-death violin and box plots per country (chapter 2).
//!
//! For the chosen year each country gets a weighted KDE violin with a box
//! plot drawn inside it. A slider and an autoplay loop step through the
//! years; compare mode pushes the violins apart and shows a metric table.

use crate::components::{ChartContainer, ChartHeader, GuideBanner, PlayButton, RangeSlider, SourceNote};
use crate::hooks::{use_element_width, use_interval, use_reveal};
use crate::state::AppState;
use crate::theme::ThemeState;
use cdv_core::Country;
use cdv_db::models::MortalityProfile;
use cdv_layout::frame::responsive_width;
use cdv_layout::path::{area, Curve};
use cdv_layout::{Frame, LinearScale, Margin};
use cdv_stats::kde::{age_grid, VIOLIN_BANDWIDTH};
use cdv_stats::{epanechnikov, weighted_box_stats, weighted_kde, weighted_mean, BoxStats};
use dioxus::prelude::*;

const CONTAINER_ID: &str = "mortality-violin-chart";
const HEIGHT: f64 = 350.0;
const MARGIN: Margin = Margin::new(32.0, 44.0, 30.0, 80.0);
const AUTOPLAY_MS: u32 = 900;
const MOVE_TRANSITION: &str = "transform 420ms cubic-bezier(0.65, 0, 0.35, 1)";

/// Summary of one country's distribution in the chosen year.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryStats {
    pub country: Country,
    pub stats: Option<BoxStats>,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violin {
    pub country: Country,
    /// Horizontal centre; shapes below are drawn around x = 0
    pub center: f64,
    pub path: String,
    pub summary: CountryStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinView {
    pub frame: Frame,
    pub y: LinearScale,
    pub box_width: f64,
    pub cap_width: f64,
    pub violins: Vec<Violin>,
}

/// Horizontal centre of a country's violin.
pub fn position(country: Country, frame: &Frame, compare: bool) -> f64 {
    let share = match (country, compare) {
        (Country::Israel, false) => 0.35,
        (Country::Palestine, false) => 0.65,
        (Country::Israel, true) => 0.18,
        (Country::Palestine, true) => 0.82,
    };
    frame.margin.left + frame.inner_width() * share
}

pub fn violin_view(profiles: &[MortalityProfile], width: f64, compare: bool) -> ViolinView {
    let frame = Frame::new(width, HEIGHT, MARGIN);
    let y = LinearScale::new((0.0, 100.0), (frame.bottom(), MARGIN.top));
    let inner_w = frame.inner_width();
    let band = if compare { (inner_w * 0.14).min(120.0) } else { (inner_w * 0.22).min(160.0) };
    let box_width = (band * 0.6).min(46.0);
    let cap_width = (box_width * 0.7).min(26.0);

    let grid = age_grid();
    let kernel = epanechnikov(VIOLIN_BANDWIDTH);
    let densities: Vec<Vec<(f64, f64)>> = profiles
        .iter()
        .map(|p| weighted_kde(&kernel, &grid, &p.observations))
        .collect();
    let max_density = densities
        .iter()
        .flat_map(|d| d.iter().map(|(_, v)| *v))
        .fold(0.0, f64::max);
    let max_density = if max_density > 0.0 { max_density } else { 0.001 };
    let half = LinearScale::new((0.0, max_density), (0.0, band / 2.0 * 0.9));

    let violins = profiles
        .iter()
        .zip(densities)
        .map(|(p, density)| {
            let right: Vec<(f64, f64)> = density.iter().map(|(age, d)| (half.scale(*d), y.scale(*age))).collect();
            let left: Vec<(f64, f64)> = right.iter().map(|(x, py)| (-x, *py)).collect();
            let ages: Vec<f64> = p.observations.iter().map(|o| o.age).collect();
            let weights: Vec<f64> = p.observations.iter().map(|o| o.weight).collect();
            Violin {
                country: p.country,
                center: position(p.country, &frame, compare),
                path: area(&right, &left, Curve::CatmullRom),
                summary: CountryStats {
                    country: p.country,
                    stats: weighted_box_stats(&ages, &weights),
                    mean: weighted_mean(&p.observations),
                },
            }
        })
        .collect();

    ViolinView { frame, y, box_width, cap_width, violins }
}

/// Row of the compare table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRow {
    pub label: &'static str,
    pub values: Vec<Option<f64>>,
    /// Highest finite value of the row
    pub best: Option<f64>,
}

const METRICS: [&str; 6] = [
    "Median age (weighted)",
    "Mean age (weighted)",
    "Q1 (25th percentile)",
    "Q3 (75th percentile)",
    "Lower whisker",
    "Upper whisker",
];

fn metric(summary: &CountryStats, index: usize) -> Option<f64> {
    if index == 1 {
        return summary.mean;
    }
    let s = summary.stats.as_ref()?;
    Some(match index {
        0 => s.median,
        2 => s.q1,
        3 => s.q3,
        4 => s.whisker_low,
        _ => s.whisker_high,
    })
}

impl CompareRow {
    /// Display text of each value and whether it is the row's best.
    pub fn cells(&self) -> Vec<(String, bool)> {
        self.values
            .iter()
            .map(|v| match v {
                Some(v) => (format!("{:.2}", v), self.best == Some(*v)),
                None => ("–".to_string(), false),
            })
            .collect()
    }
}

/// Compare table rows; a higher age counts as the better value.
pub fn compare_rows(summaries: &[CountryStats]) -> Vec<CompareRow> {
    METRICS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let values: Vec<Option<f64>> = summaries
                .iter()
                .map(|s| metric(s, i).filter(|v| v.is_finite()))
                .collect();
            let best = values.iter().flatten().copied().reduce(f64::max);
            CompareRow { label, values, best }
        })
        .collect()
}

/// Next year of the autoplay loop, wrapping to the first.
pub fn next_year(years: &[i32], current: Option<i32>) -> Option<i32> {
    let idx = current.and_then(|c| years.iter().position(|y| *y == c));
    match idx {
        Some(i) => years.get((i + 1) % years.len()).copied(),
        None => years.first().copied(),
    }
}

#[component]
pub fn MortalityViolin() -> Element {
    let state = use_context::<AppState>();
    let theme = use_context::<ThemeState>();
    let mut year: Signal<Option<i32>> = use_signal(|| None);
    let mut playing = use_signal(|| false);
    let mut compare = use_signal(|| false);
    let (div_width, on_mounted) = use_element_width();
    let visible = use_reveal(CONTAINER_ID, 0.3);

    let years = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        data.db.query_mortality_years().unwrap_or_else(|e| {
            log::error!("[CDV] violin: {}", e);
            Vec::new()
        })
    });

    use_effect(move || {
        let ys = years();
        if year.peek().is_none() {
            if let Some(latest) = ys.last() {
                year.set(Some(*latest));
            }
        }
    });

    use_interval(AUTOPLAY_MS, playing, move || {
        let next = next_year(&years.peek(), *year.peek());
        year.set(next);
    });

    let profiles = use_memo(move || {
        let (Some(data), Some(y)) = ((state.datasets)(), year()) else {
            return Vec::new();
        };
        data.db.query_mortality_profiles(y).unwrap_or_else(|e| {
            log::error!("[CDV] violin: {}", e);
            Vec::new()
        })
    });

    let width = responsive_width(div_width(), 360.0, 960.0, 900.0);
    let view = violin_view(&profiles.read(), width, compare());
    let frame = view.frame;
    let view_box = frame.view_box();
    let dark = theme.is_dark();
    let fill_opacity = if dark { 0.32 } else { 0.26 };
    let box_opacity = if dark { 0.32 } else { 0.24 };
    let median_stroke = if dark { "#fdfdfd" } else { "#111" };
    let grid_stroke = if dark { "rgba(217,217,214,0.25)" } else { "rgba(37,40,42,0.25)" };
    let y_ticks = view.y.ticks(10);
    let reveal = if visible() { 1.0 } else { 0.0 };

    let ys = years();
    let year_index = year().and_then(|y| ys.iter().position(|v| *v == y)).unwrap_or(0);
    let year_label = year().map(|y| y.to_string()).unwrap_or_else(|| "–".to_string());
    let summaries: Vec<CountryStats> = view.violins.iter().map(|v| v.summary.clone()).collect();
    let rows = compare_rows(&summaries);

    rsx! {
        ChartContainer {
            id: CONTAINER_ID,
            ChartHeader {
                title: "Age distribution of mortality",
                subtitle: "Weighted density of deaths by age group, with box plots.",
            }
            div {
                style: "position: relative; width: 100%;",
                onmounted: on_mounted,
                svg {
                    style: "width: 100%; height: auto; opacity: {reveal}; transition: opacity 600ms ease;",
                    view_box: "{view_box}",
                    "preserveAspectRatio": "xMidYMid meet",
                    role: "img",
                    "aria-label": "Violin and box plot of mortality by age and country",

                    for t in y_ticks.iter() {
                        line {
                            x1: "{MARGIN.left}", x2: "{frame.right()}", y1: "{view.y.scale(*t)}", y2: "{view.y.scale(*t)}",
                            stroke: "{grid_stroke}", "stroke-dasharray": "3 4",
                        }
                        text {
                            x: "{MARGIN.left - 8.0}", y: "{view.y.scale(*t)}", dy: "0.32em",
                            "text-anchor": "end", "font-size": "11", fill: "var(--text-primary)",
                            "{t}"
                        }
                    }
                    text {
                        x: "20", y: "{MARGIN.top - 16.0}",
                        "font-size": "12", "font-weight": "700", fill: "var(--text-primary)",
                        "Age group"
                    }
                    text {
                        x: "{frame.width / 2.0}", y: "{MARGIN.top - 12.0}",
                        "text-anchor": "middle", "font-size": "13", "font-weight": "700", fill: "var(--text-primary)",
                        "Age distribution of mortality rates - {year_label}"
                    }
                    for v in view.violins.iter() {
                        g {
                            key: "{v.country.slug()}",
                            style: "transform: translate({v.center}px, 0px); transition: {MOVE_TRANSITION};",
                            path {
                                d: "{v.path}",
                                fill: "{v.country.css_var()}", "fill-opacity": "{fill_opacity}",
                                stroke: "{v.country.css_var()}", "stroke-width": "0.8",
                            }
                            if let Some(s) = v.summary.stats.as_ref() {
                                line {
                                    x1: "0", x2: "0", y1: "{view.y.scale(s.whisker_low)}", y2: "{view.y.scale(s.whisker_high)}",
                                    stroke: "{v.country.css_var()}", "stroke-width": "2", "stroke-linecap": "round",
                                }
                                for w in [s.whisker_low, s.whisker_high] {
                                    line {
                                        x1: "{-view.cap_width / 2.0}", x2: "{view.cap_width / 2.0}",
                                        y1: "{view.y.scale(w)}", y2: "{view.y.scale(w)}",
                                        stroke: "{v.country.css_var()}", "stroke-width": "2", "stroke-linecap": "round",
                                    }
                                }
                                rect {
                                    x: "{-view.box_width / 2.0}", width: "{view.box_width}",
                                    y: "{view.y.scale(s.q3)}",
                                    height: "{(view.y.scale(s.q1) - view.y.scale(s.q3)).max(1.0)}",
                                    rx: "6",
                                    fill: "{v.country.css_var()}", "fill-opacity": "{box_opacity}",
                                    stroke: "{v.country.css_var()}", "stroke-width": "1.4",
                                }
                                line {
                                    x1: "{-view.box_width / 2.0}", x2: "{view.box_width / 2.0}",
                                    y1: "{view.y.scale(s.median)}", y2: "{view.y.scale(s.median)}",
                                    stroke: "{median_stroke}", "stroke-width": "2.4",
                                }
                                for (i, o) in s.outliers.iter().enumerate() {
                                    circle {
                                        key: "{i}",
                                        cx: "0", cy: "{view.y.scale(*o)}", r: "3.2",
                                        fill: "{v.country.css_var()}", "fill-opacity": "0.8",
                                        stroke: "{v.country.css_var()}", "stroke-width": "0.6",
                                    }
                                }
                            }
                        }
                        text {
                            style: "transform: translateX({v.center}px); transition: {MOVE_TRANSITION};",
                            x: "0", y: "{frame.bottom() + 16.0}",
                            "text-anchor": "middle", "font-weight": "700", fill: "var(--text-primary)",
                            "{v.country.label()}"
                        }
                    }
                }
                GuideBanner { text: "Year selection", position: "bottom: 40px; left: 30%;" }
            }
            div {
                class: "chart-controls",
                style: "display: flex; align-items: center; gap: 10px; margin-top: 8px;",
                button {
                    class: if compare() { "btn active" } else { "btn" },
                    "aria-pressed": "{compare()}",
                    title: if compare() { "Hide compare" } else { "Show compare" },
                    onclick: move |_| compare.toggle(),
                    "⇄ Compare"
                }
                PlayButton {
                    playing: playing(),
                    onclick: move |_| playing.toggle(),
                }
                span { "Year" }
                div {
                    style: "flex: 1;",
                    RangeSlider {
                        min: 0,
                        max: ys.len().saturating_sub(1),
                        value: year_index,
                        label: year_label.clone(),
                        disabled: ys.is_empty(),
                        oninput: move |i: usize| {
                            let picked = years.peek().get(i).copied();
                            if picked.is_some() {
                                year.set(picked);
                            }
                        },
                    }
                }
            }
            if compare() && !summaries.is_empty() {
                div {
                    class: "compare-panel",
                    style: "margin-top: 12px; padding: 12px; border-radius: 8px; background: var(--color-tooltip-bg);",
                    div { style: "font-weight: 700;", "Comparison for {year_label}" }
                    div {
                        style: "font-size: 12px; color: var(--color-muted); margin-bottom: 8px;",
                        "Higher ages mean mortality is concentrated among older groups (better)"
                    }
                    div {
                        style: "display: grid; grid-template-columns: 140px repeat({summaries.len()}, 1fr); gap: 4px 12px; font-size: 13px;",
                        div {}
                        for s in summaries.iter() {
                            div {
                                style: "font-weight: 700; display: flex; align-items: center; gap: 6px;",
                                span { style: "width: 10px; height: 10px; border-radius: 50%; background: {s.country.css_var()};" }
                                "{s.country.label()}"
                            }
                        }
                        for row in rows.iter() {
                            div { style: "color: var(--color-muted);", "{row.label}" }
                            for (text, best) in row.cells() {
                                div {
                                    style: if best { "font-weight: 700; color: var(--color-details);" } else { "" },
                                    "{text}"
                                }
                            }
                        }
                    }
                }
            }
            SourceNote { source: "World Bank / UN DESA" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdv_stats::Observation;

    fn profile(country: Country, obs: &[(f64, f64)]) -> MortalityProfile {
        MortalityProfile {
            country,
            year: 2021,
            observations: obs.iter().map(|(age, weight)| Observation { age: *age, weight: *weight }).collect(),
        }
    }

    #[test]
    fn compare_mode_moves_violins_apart() {
        let f = Frame::new(900.0, HEIGHT, MARGIN);
        let inner = 900.0 - 80.0 - 44.0;
        assert_eq!(position(Country::Israel, &f, false), 80.0 + inner * 0.35);
        assert_eq!(position(Country::Palestine, &f, true), 80.0 + inner * 0.82);
    }

    #[test]
    fn violins_share_one_density_scale() {
        let profiles = vec![
            profile(Country::Israel, &[(2.0, 1.0), (77.0, 20.0)]),
            profile(Country::Palestine, &[(2.0, 10.0), (27.0, 5.0)]),
        ];
        let v = violin_view(&profiles, 900.0, false);
        assert_eq!(v.violins.len(), 2);
        assert!(v.violins.iter().all(|v| v.path.starts_with('M') && v.path.ends_with('Z')));
        assert_eq!(v.violins[0].summary.stats.as_ref().unwrap().median, 77.0);
        assert_eq!(v.box_width, 46.0);
        assert_eq!(v.cap_width, 26.0);
    }

    #[test]
    fn compare_rows_mark_the_highest_value() {
        let summaries = vec![
            CountryStats {
                country: Country::Israel,
                stats: weighted_box_stats(&[70.0, 80.0], &[1.0, 1.0]),
                mean: Some(75.0),
            },
            CountryStats { country: Country::Palestine, stats: None, mean: Some(30.0) },
        ];
        let rows = compare_rows(&summaries);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].values, vec![Some(70.0), None]);
        assert_eq!(rows[1].best, Some(75.0));
        assert_eq!(rows[1].cells(), vec![("75.00".to_string(), true), ("30.00".to_string(), false)]);
    }

    #[test]
    fn autoplay_wraps_to_first_year() {
        let years = [2019, 2020, 2021];
        assert_eq!(next_year(&years, Some(2020)), Some(2021));
        assert_eq!(next_year(&years, Some(2021)), Some(2019));
        assert_eq!(next_year(&years, None), Some(2019));
        assert_eq!(next_year(&[], None), None);
    }
}
