//! Gaza incident and damage map (chapter 6).
//!
//! Municipal boundaries drawn with a Mercator projection fitted to the
//! strip. On top, either the attacks on food-system and health-care
//! infrastructure or the clustered damaged-building sites. Incidents can be
//! filtered by category and stepped through month by month.

use crate::components::{GuideBanner, PlayButton, RangeSlider, SourceNote, Tooltip};
use crate::hooks::{to_view, use_element_width, use_interval};
use crate::state::AppState;
use cdv_core::geo::{Bounds, DamageCluster, FeatureCollection};
use cdv_core::indicator::group_thousands;
use cdv_core::period::format_day;
use cdv_core::{IncidentCategory, YearMonth};
use cdv_db::models::{Incident, IncidentFilter, TimeWindow};
use cdv_layout::frame::responsive_width;
use cdv_layout::projection::{geo_path, zoom_in, zoom_out, Mercator};
use dioxus::prelude::*;

const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 10.0;
const PLAY_MS: u32 = 1000;
const POINT_RADIUS: f64 = 4.0;
const POINT_HOVER_RADIUS: f64 = 6.0;

/// Which layer is drawn over the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Incidents,
    Damage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Full,
    Monthly,
    Cumulative,
}

impl ViewMode {
    pub fn window(self, month: Option<YearMonth>) -> TimeWindow {
        match (self, month) {
            (ViewMode::Monthly, Some(m)) => TimeWindow::Month(m),
            (ViewMode::Cumulative, Some(m)) => TimeWindow::CumulativeTo(m),
            _ => TimeWindow::Full,
        }
    }

    pub fn is_timeline(self) -> bool {
        self != ViewMode::Full
    }
}

/// Projection for the current zoom and pan: the fitted scale multiplied by
/// `zoom`, centred on the middle of `bounds` and shifted by `pan`.
pub fn map_projection(bounds: &Bounds, width: f64, zoom: f64, pan: (f64, f64)) -> Mercator {
    let fitted = Mercator::fit_extent((MARGIN, MARGIN), (width - MARGIN, HEIGHT - MARGIN), bounds);
    let center = (
        (bounds.min_lon + bounds.max_lon) / 2.0,
        (bounds.min_lat + bounds.max_lat) / 2.0,
    );
    Mercator::centered(center, fitted.scale() * zoom, (width / 2.0 + pan.0, HEIGHT / 2.0 + pan.1))
}

/// A circle on the map in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

pub fn incident_markers(incidents: &[Incident], projection: &Mercator) -> Vec<Marker> {
    incidents
        .iter()
        .map(|i| {
            let (x, y) = projection.project(i.longitude, i.latitude);
            Marker { x, y, r: POINT_RADIUS }
        })
        .collect()
}

pub fn damage_markers(clusters: &[DamageCluster], projection: &Mercator) -> Vec<Marker> {
    clusters
        .iter()
        .map(|c| {
            let (x, y) = projection.project(c.lon, c.lat);
            Marker { x, y, r: projection.pixel_radius(c.lon, c.lat, c.radius_m()) }
        })
        .collect()
}

/// Topmost marker under the pointer. Points get the hover radius as slack.
pub fn marker_at(markers: &[Marker], x: f64, y: f64) -> Option<usize> {
    markers
        .iter()
        .rposition(|m| (m.x - x).hypot(m.y - y) <= m.r.max(POINT_HOVER_RADIUS))
}

/// Next month of the animation, wrapping to `first` after `last`.
pub fn next_month(current: YearMonth, first: YearMonth, last: YearMonth) -> YearMonth {
    let next = current.succ();
    if next > last || next < first {
        first
    } else {
        next
    }
}

pub fn total_buildings(clusters: &[DamageCluster]) -> u64 {
    clusters.iter().map(|c| c.count as u64).sum()
}

/// Labelled tooltip rows of an incident; unknown fields are omitted.
pub fn incident_details(incident: &Incident) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Date", format_day(&incident.date))];
    let optional = [
        ("Perpetrator", &incident.perpetrator),
        ("Weapon", &incident.weapon),
        ("Description", &incident.description),
    ];
    for (label, value) in optional {
        if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            rows.push((label, v.to_string()));
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq)]
enum Hover {
    Incident(Incident),
    Damage(DamageCluster),
}

#[component]
pub fn IncidentMap() -> Element {
    let state = use_context::<AppState>();
    let mut layer: Signal<Option<Layer>> = use_signal(|| None);
    let mut category: Signal<Option<IncidentCategory>> = use_signal(|| None);
    let mut view_mode = use_signal(|| ViewMode::Full);
    let mut month: Signal<Option<YearMonth>> = use_signal(|| None);
    let mut playing = use_signal(|| false);
    let mut zoom = use_signal(|| 1.0f64);
    let mut pan = use_signal(|| (0.0f64, 0.0f64));
    let mut drag_from: Signal<Option<(f64, f64)>> = use_signal(|| None);
    let mut hovered: Signal<Option<(Hover, f64, f64)>> = use_signal(|| None);
    let (div_width, on_mounted) = use_element_width();

    let boundaries = use_memo(move || {
        (state.datasets)()
            .map(|d| d.boundaries.clone())
            .unwrap_or_else(|| std::rc::Rc::new(FeatureCollection { features: Vec::new() }))
    });
    let bounds = use_memo(move || boundaries.read().bounds());
    let damage = use_memo(move || {
        (state.datasets)().map(|d| d.damage.clone()).unwrap_or_default()
    });
    let month_range = use_memo(move || {
        let data = (state.datasets)()?;
        data.db.query_incident_month_range().unwrap_or_else(|e| {
            log::error!("[CDV] incident map: {}", e);
            None
        })
    });
    let incidents = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        let filter = IncidentFilter {
            category: category(),
            window: view_mode().window(month()),
            bounds: bounds(),
        };
        data.db.query_incidents(&filter).unwrap_or_else(|e| {
            log::error!("[CDV] incident map: {}", e);
            Vec::new()
        })
    });

    use_effect(move || {
        if let Some((first, _)) = month_range() {
            if month.peek().is_none() {
                month.set(Some(first));
            }
        }
    });

    use_interval(PLAY_MS, playing, move || {
        let current = *month.peek();
        if let (Some((first, last)), Some(current)) = (*month_range.peek(), current) {
            month.set(Some(next_month(current, first, last)));
        }
    });

    let width = responsive_width(div_width(), 320.0, 1400.0, 800.0);
    let projection = bounds().map(|b| map_projection(&b, width, zoom(), pan()));
    let paths: Vec<String> = match projection.as_ref() {
        Some(p) => boundaries
            .read()
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(|g| geo_path(g, p))
            .collect(),
        None => Vec::new(),
    };
    let current_layer = layer();
    let markers: Vec<Marker> = match (current_layer, projection.as_ref()) {
        (Some(Layer::Incidents), Some(p)) => incident_markers(&incidents.read(), p),
        (Some(Layer::Damage), Some(p)) => damage_markers(&damage.read(), p),
        _ => Vec::new(),
    };
    let hover_markers = markers.clone();
    let counter = match current_layer {
        Some(Layer::Incidents) => Some(format!("Total incidents: {}", incidents.read().len())),
        Some(Layer::Damage) => Some(format!(
            "Total damaged buildings: {}",
            group_thousands(total_buildings(&damage.read()) as f64)
        )),
        None => None,
    };
    let hovered_index = hovered().and_then(|(h, _, _)| match h {
        Hover::Incident(i) => incidents.read().iter().position(|x| x.id == i.id),
        Hover::Damage(c) => damage.read().iter().position(|x| *x == c),
    });
    let view_box = format!("0 0 {} {}", width, HEIGHT);
    let mode = view_mode();
    let timeline = current_layer == Some(Layer::Incidents) && mode.is_timeline();
    let cursor = if drag_from().is_some() { "grabbing" } else { "grab" };
    let play_hint = if playing() { "⏸ Stop animation" } else { "▶ Play animation" };

    rsx! {
        div {
            id: "incident-map",
            class: "chart-container",
            style: "width: 100%; min-height: 500px; position: relative; display: flex; gap: 12px;",

            GuideBanner { text: "Dataset choice", position: "left: 10%; top: 5%;" }
            if current_layer == Some(Layer::Incidents) {
                GuideBanner { text: "Category choice", position: "left: 10%; top: 30%;" }
                GuideBanner { text: "Animation choice", position: "left: 10%; top: 60%;" }
            }
            if timeline {
                GuideBanner { text: play_hint, position: "left: 5%; top: 100%;" }
                GuideBanner { text: "⏮ Restart animation", position: "left: 10%; top: 80%;" }
            }
            if current_layer.is_some() {
                GuideBanner { text: "Hover tooltip", position: "left: 60%; top: 40%;" }
                GuideBanner { text: "zoom in", position: "right: 80px; top: -1%;" }
                GuideBanner { text: "zoom out", position: "right: 80px; top: 7%;" }
                GuideBanner { text: "reset", position: "right: 80px; top: 13%;" }
            }

            div {
                class: "map-controls",
                style: "display: flex; flex-direction: column; gap: 6px; width: 120px; z-index: 2;",
                label { class: "control-label", "Dataset" }
                button {
                    class: if current_layer == Some(Layer::Incidents) { "selection-button active" } else { "selection-button" },
                    onclick: move |_| {
                        layer.set(Some(Layer::Incidents));
                        hovered.set(None);
                    },
                    "Incidents"
                }
                button {
                    class: if current_layer == Some(Layer::Damage) { "selection-button active" } else { "selection-button" },
                    onclick: move |_| {
                        layer.set(Some(Layer::Damage));
                        playing.set(false);
                        hovered.set(None);
                    },
                    "Damage Sites"
                }
                if current_layer == Some(Layer::Incidents) {
                    label { class: "control-label", "Category" }
                    button {
                        class: if category().is_none() { "selection-button active" } else { "selection-button" },
                        onclick: move |_| category.set(None),
                        "All Types"
                    }
                    for c in IncidentCategory::ALL {
                        button {
                            key: "{c.label()}",
                            class: if category() == Some(c) { "selection-button active" } else { "selection-button" },
                            onclick: move |_| category.set(Some(c)),
                            "{c.label()}"
                        }
                    }
                    label { class: "control-label", style: "margin-top: 12px;", "View" }
                    for (m, text) in [(ViewMode::Full, "Full Period"), (ViewMode::Monthly, "Monthly"), (ViewMode::Cumulative, "Cumulative")] {
                        button {
                            key: "{text}",
                            class: if mode == m { "selection-button active" } else { "selection-button" },
                            onclick: move |_| {
                                view_mode.set(m);
                                if m == ViewMode::Full {
                                    playing.set(false);
                                }
                            },
                            "{text}"
                        }
                    }
                }
            }

            div {
                style: "width: 80%; display: flex; flex-direction: column; position: relative;",
                if current_layer.is_none() {
                    div {
                        style: "position: absolute; top: 190px; left: 0; width: 100%; display: flex; justify-content: center; \
                                font-size: 1.2rem; font-weight: 600; color: var(--color-details); z-index: 3; pointer-events: none;",
                        "Please select a dataset to display the map data."
                    }
                }
                div {
                    class: "zoom-controls",
                    style: "position: absolute; top: 0; right: 10px; z-index: 4; display: flex; flex-direction: column; gap: 6px; align-items: center;",
                    button { class: "control-button", style: "width: 50px; font-size: 16px;", onclick: move |_| zoom.set(zoom_in(zoom())), "+" }
                    button { class: "control-button", style: "width: 50px; font-size: 16px;", onclick: move |_| zoom.set(zoom_out(zoom())), "-" }
                    button {
                        class: "control-button",
                        style: "width: 50px;",
                        onclick: move |_| {
                            zoom.set(1.0);
                            pan.set((0.0, 0.0));
                        },
                        "Reset"
                    }
                    div {
                        style: "padding: 10px 16px; background: var(--bg-primary); color: var(--text-primary); \
                                border: 1px solid var(--text-secondary); border-radius: 4px; font-weight: bold; min-width: 80px; text-align: center;",
                        "Zoom: {zoom():.1}x"
                    }
                }
                div {
                    style: "height: 30px; margin-bottom: 6px; text-align: center; font-size: 24px; font-weight: 700; color: var(--text-primary);",
                    if timeline {
                        if let Some(m) = month() {
                            "{m.label()}"
                        }
                    }
                }
                div {
                    style: "position: relative; cursor: {cursor};",
                    onmounted: on_mounted,
                    onmousedown: move |e| {
                        let c = e.data().element_coordinates();
                        drag_from.set(Some(to_view(c.x, c.y, div_width(), width)));
                    },
                    onmouseup: move |_| drag_from.set(None),
                    onmouseleave: move |_| {
                        drag_from.set(None);
                        hovered.set(None);
                    },
                    onmousemove: move |e| {
                        let c = e.data().element_coordinates();
                        let (vx, vy) = to_view(c.x, c.y, div_width(), width);
                        if let Some((fx, fy)) = drag_from() {
                            let (px, py) = pan();
                            pan.set((px + vx - fx, py + vy - fy));
                            drag_from.set(Some((vx, vy)));
                            return;
                        }
                        let hit = marker_at(&hover_markers, vx, vy).and_then(|i| match current_layer {
                            Some(Layer::Incidents) => incidents.read().get(i).cloned().map(Hover::Incident),
                            Some(Layer::Damage) => damage.read().get(i).cloned().map(Hover::Damage),
                            None => None,
                        });
                        hovered.set(hit.map(|h| (h, vx / width * 100.0, c.y)));
                    },
                    svg {
                        style: "width: 100%; height: auto; display: block; pointer-events: none;",
                        view_box: "{view_box}",
                        "preserveAspectRatio": "xMidYMid meet",
                        g {
                            class: "boundaries",
                            for (i, d) in paths.iter().enumerate() {
                                path {
                                    key: "{i}",
                                    d: "{d}",
                                    fill: "var(--bg-secondary)",
                                    stroke: "var(--text-primary)",
                                    "stroke-width": "1.5",
                                }
                            }
                        }
                        if current_layer == Some(Layer::Incidents) {
                            g {
                                class: "incidents",
                                for (i, m) in markers.iter().enumerate() {
                                    circle {
                                        cx: "{m.x}", cy: "{m.y}",
                                        r: if hovered_index == Some(i) { "{POINT_HOVER_RADIUS}" } else { "{m.r}" },
                                        fill: "var(--color-details)",
                                        "fill-opacity": if hovered_index == Some(i) { "1" } else { "0.6" },
                                        style: "transition: r 200ms ease, fill-opacity 200ms ease;",
                                    }
                                }
                            }
                        }
                        if current_layer == Some(Layer::Damage) {
                            g {
                                class: "damage-sites",
                                for (i, m) in markers.iter().enumerate() {
                                    circle {
                                        cx: "{m.x}", cy: "{m.y}", r: "{m.r}",
                                        fill: "var(--color-details)",
                                        "fill-opacity": if hovered_index == Some(i) { "0.85" } else { "0.6" },
                                        stroke: "var(--color-details)",
                                        "stroke-width": if hovered_index == Some(i) { "2" } else { "1.5" },
                                        "stroke-opacity": "0.9",
                                    }
                                }
                            }
                        }
                        if let Some(text) = counter {
                            text {
                                x: "10", y: "{HEIGHT - 10.0}",
                                "font-size": "12", "font-weight": "600",
                                fill: "var(--text-primary)",
                                "{text}"
                            }
                        }
                    }
                    if let Some((hover, x_pct, y)) = hovered() {
                        Tooltip {
                            x_pct,
                            y: y - 10.0,
                            if let Hover::Incident(incident) = &hover {
                                strong { "{incident.category.label()}" }
                                for (label, value) in incident_details(incident) {
                                    div { strong { "{label}: " } "{value}" }
                                }
                            }
                            if let Hover::Damage(cluster) = &hover {
                                strong { "Damage area" }
                                div { strong { "Buildings: " } "{group_thousands(cluster.count as f64)}" }
                                div { strong { "Area: " } "{cluster.area_label()}" }
                                span {
                                    style: "font-size: 0.8em; opacity: 0.7;",
                                    "Area represents the cluster extent, not real damaged area."
                                }
                            }
                        }
                    }
                }
                if timeline {
                    if let Some(((first, last), current)) = month_range().zip(month()) {
                        div {
                            class: "chart-controls",
                            style: "display: flex; align-items: center; gap: 10px; margin-top: 8px;",
                            PlayButton {
                                playing: playing(),
                                onclick: move |_| playing.toggle(),
                            }
                            button {
                                class: "btn",
                                onclick: move |_| month.set(Some(first)),
                                "⏮"
                            }
                            div {
                                style: "flex: 1;",
                                RangeSlider {
                                    min: 0,
                                    max: first.months_until(&last).max(0) as usize,
                                    value: first.months_until(&current).max(0) as usize,
                                    label: current.short_label(),
                                    oninput: move |i: usize| {
                                        month.set(Some(first.add_months(i as u32)));
                                        playing.set(false);
                                    },
                                }
                            }
                        }
                    }
                }
            }
        }
        SourceNote { source: "HDX" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const GAZA: Bounds = Bounds { min_lon: 34.2, min_lat: 31.2, max_lon: 34.6, max_lat: 31.6 };

    fn incident(id: i64, lon: f64, lat: f64) -> Incident {
        Incident {
            id,
            category: IncidentCategory::HealthCare,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            latitude: lat,
            longitude: lon,
            perpetrator: Some("Unknown".to_string()),
            weapon: None,
            description: Some("  ".to_string()),
        }
    }

    #[test]
    fn zoom_scales_around_the_centre() {
        let base = map_projection(&GAZA, 800.0, 1.0, (0.0, 0.0));
        let zoomed = map_projection(&GAZA, 800.0, 1.5, (0.0, 0.0));
        assert!((zoomed.scale() / base.scale() - 1.5).abs() < 1e-9);
        let (cx, cy) = zoomed.project(34.4, 31.4);
        assert!((cx - 400.0).abs() < 0.5);
        assert!((cy - HEIGHT / 2.0).abs() < 0.5);
    }

    #[test]
    fn pan_shifts_every_point() {
        let a = map_projection(&GAZA, 800.0, 1.0, (0.0, 0.0)).project(34.3, 31.5);
        let b = map_projection(&GAZA, 800.0, 1.0, (25.0, -10.0)).project(34.3, 31.5);
        assert!((b.0 - a.0 - 25.0).abs() < 1e-6);
        assert!((b.1 - a.1 + 10.0).abs() < 1e-6);
    }

    #[test]
    fn marker_hit_prefers_topmost() {
        let p = map_projection(&GAZA, 800.0, 1.0, (0.0, 0.0));
        let markers = incident_markers(&[incident(1, 34.4, 31.4), incident(2, 34.4, 31.4)], &p);
        assert_eq!(marker_at(&markers, 400.0, HEIGHT / 2.0 + 3.0), Some(1));
        assert_eq!(marker_at(&markers, 10.0, 10.0), None);
    }

    #[test]
    fn animation_wraps_to_first_month() {
        let first = YearMonth::new(2023, 10).unwrap();
        let last = YearMonth::new(2024, 1).unwrap();
        assert_eq!(next_month(first, first, last), YearMonth::new(2023, 11).unwrap());
        assert_eq!(next_month(last, first, last), first);
    }

    #[test]
    fn view_mode_maps_to_query_window() {
        let m = YearMonth::new(2024, 2).unwrap();
        assert_eq!(ViewMode::Full.window(Some(m)), TimeWindow::Full);
        assert_eq!(ViewMode::Monthly.window(Some(m)), TimeWindow::Month(m));
        assert_eq!(ViewMode::Cumulative.window(Some(m)), TimeWindow::CumulativeTo(m));
        assert_eq!(ViewMode::Monthly.window(None), TimeWindow::Full);
    }

    #[test]
    fn tooltip_skips_blank_fields() {
        let rows = incident_details(&incident(1, 34.4, 31.4));
        assert_eq!(rows, vec![("Date", "05/03/2024".to_string()), ("Perpetrator", "Unknown".to_string())]);
    }

    #[test]
    fn damage_counter_sums_buildings() {
        let clusters = vec![
            DamageCluster { lon: 34.4, lat: 31.4, count: 1200, area_m2: None },
            DamageCluster { lon: 34.5, lat: 31.5, count: 34, area_m2: Some(5000.0) },
        ];
        assert_eq!(total_buildings(&clusters), 1234);
        let markers = damage_markers(&clusters, &map_projection(&GAZA, 800.0, 1.0, (0.0, 0.0)));
        assert!(markers[0].r > markers[1].r);
    }
}
