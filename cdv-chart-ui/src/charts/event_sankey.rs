//! Country -> event type -> sub-event type flow diagram (chapter 3).
//!
//! Layout comes from `cdv_layout::sankey`; this module colours nodes by
//! the country mix of their inflow, stages the entrance column by column
//! and hit-tests the pointer against nodes and links.

use crate::components::{ChartContainer, ChartHeader, GuideBanner, SourceNote, Tooltip};
use crate::hooks::{stage, to_view, use_element_width, use_reveal, use_timeline};
use crate::state::AppState;
use crate::theme::ThemeState;
use cdv_core::indicator::group_thousands;
use cdv_core::Country;
use cdv_db::models::EventFlow;
use cdv_layout::arc::ease_quad_in_out;
use cdv_layout::color::{interpolate_rgb, Rgb};
use cdv_layout::frame::responsive_width;
use cdv_layout::sankey::{
    layout, link_at, link_path, node_at, node_labels, Extent, FlowRow, LinkSide, NodeKind, SankeyLayout,
    SankeyNode,
};
use cdv_layout::Margin;
use dioxus::prelude::*;

const CONTAINER_ID: &str = "event-sankey-chart";
const HEIGHT: f64 = 600.0;
const MARGIN: Margin = Margin::new(40.0, 200.0, 40.0, 200.0);
const TITLE: &str = "Event Types Flow: Country → Event Type → Sub-Event Type";

/// Entrance schedule in ms: (delay, duration).
const COUNTRY_NODES: (f64, f64) = (0.0, 400.0);
const LEFT_LINKS: (f64, f64) = (400.0, 800.0);
const TYPE_NODES: (f64, f64) = (1200.0, 400.0);
const RIGHT_LINKS: (f64, f64) = (1800.0, 1000.0);
const SUB_NODES: (f64, f64) = (2800.0, 400.0);
const TOTAL_MS: f64 = 3200.0;

pub fn sankey_layout(flows: &[EventFlow], width: f64) -> SankeyLayout {
    let rows: Vec<FlowRow> = flows
        .iter()
        .map(|f| FlowRow {
            country: f.country,
            event_type: f.event_type.clone(),
            sub_event_type: f.sub_event_type.clone(),
            events: f.events,
        })
        .collect();
    let extent = Extent {
        x0: MARGIN.left,
        y0: MARGIN.top,
        x1: width - MARGIN.right,
        y1: HEIGHT - MARGIN.bottom,
    };
    layout(&rows, extent)
}

/// Fill of a node: country nodes use their country colour, the others
/// blend the two countries' colours by their share of the inflow.
pub fn node_fill(node: &SankeyNode, dark: bool) -> String {
    if node.kind == NodeKind::Country {
        return node
            .name
            .parse::<Country>()
            .map(|c| c.css_var().to_string())
            .unwrap_or_else(|_| "var(--color-details)".to_string());
    }
    let (israel, palestine, neutral) = if dark {
        ("#99B8FF", "#1CD475", "#888")
    } else {
        ("#0034AD", "#074024", "#666")
    };
    let Some(share) = node.israel_share() else {
        return neutral.to_string();
    };
    match (Rgb::from_hex(palestine), Rgb::from_hex(israel)) {
        (Some(p), Some(i)) => interpolate_rgb(p, i, share).to_css(),
        _ => neutral.to_string(),
    }
}

/// Opacity of a node or its label at `elapsed` ms into the entrance.
pub fn node_opacity(kind: NodeKind, elapsed: f64) -> f64 {
    let (delay, duration) = match kind {
        NodeKind::Country => COUNTRY_NODES,
        NodeKind::EventType => TYPE_NODES,
        NodeKind::SubEvent => SUB_NODES,
    };
    ease_quad_in_out(stage(elapsed, delay, duration))
}

/// Drawn fraction of a link at `elapsed` ms into the entrance.
pub fn link_progress(side: LinkSide, elapsed: f64) -> f64 {
    let (delay, duration) = match side {
        LinkSide::Left => LEFT_LINKS,
        LinkSide::Right => RIGHT_LINKS,
    };
    stage(elapsed, delay, duration)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hover {
    Node(usize),
    Link(usize),
}

pub fn link_opacity(layout: &SankeyLayout, hover: Option<Hover>, index: usize) -> f64 {
    match hover {
        None => 0.4,
        Some(Hover::Link(i)) => {
            if i == index {
                0.7
            } else {
                0.4
            }
        }
        Some(Hover::Node(n)) => {
            let l = &layout.links[index];
            if l.source == n || l.target == n {
                0.8
            } else {
                0.1
            }
        }
    }
}

/// Node first, since nodes are drawn above links.
pub fn hover_at(layout: &SankeyLayout, x: f64, y: f64) -> Option<Hover> {
    node_at(layout, x, y)
        .map(Hover::Node)
        .or_else(|| link_at(layout, x, y).map(Hover::Link))
}

/// Per-country inflow lines of a node tooltip: (country, count, percent of node value).
pub fn node_breakdown(node: &SankeyNode) -> Vec<(Country, f64, f64)> {
    if node.kind == NodeKind::Country || node.value <= 0.0 {
        return Vec::new();
    }
    [(Country::Israel, node.inflow.0), (Country::Palestine, node.inflow.1)]
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(c, v)| (c, v, v / node.value * 100.0))
        .collect()
}

#[component]
pub fn EventSankey() -> Element {
    let state = use_context::<AppState>();
    let theme = use_context::<ThemeState>();
    let mut hovered: Signal<Option<(Hover, f64, f64)>> = use_signal(|| None);
    let (div_width, on_mounted) = use_element_width();
    let visible = use_reveal(CONTAINER_ID, 1.0);
    let elapsed = use_timeline(visible, TOTAL_MS);

    let flows = use_memo(move || {
        let Some(data) = (state.datasets)() else {
            return Vec::new();
        };
        data.db.query_event_flows().unwrap_or_else(|e| {
            log::error!("[CDV] sankey: {}", e);
            Vec::new()
        })
    });

    let width = responsive_width(div_width(), 600.0, 1400.0, 1000.0);
    let graph = sankey_layout(&flows.read(), width);
    let labels = node_labels(&graph, width);
    let dark = theme.is_dark();
    let t = elapsed();
    let hover = hovered().map(|(h, _, _)| h);
    let label_color = if dark { "#fff" } else { "#25282A" };
    let leader_color = if dark { "#888" } else { "#666" };
    let text_shadow = if dark {
        "0 0 3px rgba(0,0,0,0.8), 0 0 6px rgba(0,0,0,0.5)"
    } else {
        "0 0 3px rgba(255,255,255,0.9), 0 0 6px rgba(255,255,255,0.6)"
    };
    let node_stroke = if dark { "#fff" } else { "#000" };
    let view_box = format!("0 0 {} {}", width, HEIGHT);
    let hit_graph = graph.clone();

    let tooltip = hovered().map(|(h, x_px, y_px)| {
        let body = match h {
            Hover::Link(i) => {
                let l = &graph.links[i];
                rsx! {
                    div { style: "font-weight: 600; margin-bottom: 6px; color: {l.country.css_var()};", "{l.country.label()}" }
                    div {
                        style: "margin-bottom: 4px;",
                        strong { "{graph.nodes[l.source].name}" }
                        " → "
                        strong { "{graph.nodes[l.target].name}" }
                    }
                    div { style: "font-size: 14px; font-weight: 600;", "{group_thousands(l.value)} events" }
                }
            }
            Hover::Node(n) => {
                let node = &graph.nodes[n];
                let breakdown = node_breakdown(node);
                rsx! {
                    div { style: "font-weight: 600; margin-bottom: 6px; font-size: 13px;", "{node.name}" }
                    div { style: "font-size: 14px; font-weight: 600; margin-bottom: 8px;", "{group_thousands(node.value)} total events" }
                    if !breakdown.is_empty() {
                        div {
                            style: "margin-top: 6px; padding-top: 6px; border-top: 1px solid var(--color-grid);",
                            for (c, v, pct) in breakdown {
                                div {
                                    span { style: "color: {c.css_var()};", "● " }
                                    "{c.label()}: {group_thousands(v)} ({pct:.1}%)"
                                }
                            }
                        }
                    }
                }
            }
        };
        (x_px, y_px, body)
    });

    rsx! {
        ChartContainer {
            id: CONTAINER_ID,
            min_height: 600,
            ChartHeader {
                title: "Events categories (2023-2025)",
                subtitle: "Hover a flow or a node to see how each country's events split by type.",
            }
            div {
                style: "position: relative; width: 100%;",
                onmounted: on_mounted,
                onmouseleave: move |_| hovered.set(None),
                onmousemove: move |e| {
                    let c = e.data().element_coordinates();
                    let (vx, vy) = to_view(c.x, c.y, div_width(), width);
                    let pct = if div_width() > 0.0 { c.x / div_width() * 100.0 } else { 0.0 };
                    hovered.set(hover_at(&hit_graph, vx, vy).map(|h| (h, pct, c.y)));
                },
                svg {
                    style: "width: 100%; height: auto; pointer-events: none;",
                    view_box: "{view_box}",
                    "preserveAspectRatio": "xMidYMid meet",

                    text {
                        x: "{width / 2.0}", y: "20",
                        "text-anchor": "middle", "font-size": "16", "font-weight": "700", fill: "{label_color}",
                        "{TITLE}"
                    }
                    g {
                        class: "links",
                        for (i, l) in graph.links.iter().enumerate() {
                            path {
                                key: "link-{i}",
                                class: "sankey-link",
                                d: "{link_path(&graph, i)}",
                                fill: "none",
                                stroke: "{l.country.css_var()}",
                                "stroke-width": "{l.width.max(1.0)}",
                                opacity: "{link_opacity(&graph, hover, i)}",
                                "pathLength": "1",
                                "stroke-dasharray": "1",
                                "stroke-dashoffset": "{1.0 - link_progress(l.side, t)}",
                            }
                        }
                    }
                    g {
                        class: "nodes",
                        for (i, n) in graph.nodes.iter().enumerate() {
                            rect {
                                key: "node-{i}",
                                "data-node-type": "{n.kind.as_str()}",
                                x: "{n.x0}", y: "{n.y0}", width: "{n.x1 - n.x0}", height: "{n.height()}",
                                fill: "{node_fill(n, dark)}",
                                stroke: "{node_stroke}",
                                "stroke-width": if hover == Some(Hover::Node(i)) { "2" } else { "0.5" },
                                opacity: "{node_opacity(n.kind, t)}",
                            }
                        }
                        for label in labels.iter() {
                            {
                                let node = &graph.nodes[label.node];
                                let opacity = node_opacity(node.kind, t);
                                let anchor_x = if label.anchor_start { node.x1 } else { node.x0 };
                                rsx! {
                                    if label.leader {
                                        line {
                                            x1: "{anchor_x}", y1: "{label.original_y}", x2: "{label.x}", y2: "{label.y}",
                                            stroke: "{leader_color}", "stroke-width": "0.5", "stroke-dasharray": "2,2",
                                            opacity: "{opacity * 0.5}",
                                        }
                                    }
                                    text {
                                        x: "{label.x}", y: "{label.y}", dy: "0.35em",
                                        "text-anchor": if label.anchor_start { "start" } else { "end" },
                                        "font-size": "{label.font_size}", "font-weight": "500",
                                        fill: "{label_color}",
                                        style: "text-shadow: {text_shadow};",
                                        opacity: "{opacity}",
                                        "{label.text}"
                                    }
                                }
                            }
                        }
                    }
                }
                if let Some((x_pct, y_px, body)) = tooltip {
                    Tooltip { x_pct, y: y_px - 10.0, {body} }
                }
                GuideBanner { text: "Hover tooltip", position: "top: 30%; left: 45%;" }
            }
            SourceNote { source: "ACLED" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(country: Country, t: &str, s: &str, events: f64) -> EventFlow {
        EventFlow { country, event_type: t.into(), sub_event_type: s.into(), events }
    }

    fn sample() -> SankeyLayout {
        sankey_layout(
            &[
                flow(Country::Israel, "Protests", "Peaceful protest", 30.0),
                flow(Country::Palestine, "Protests", "Peaceful protest", 10.0),
                flow(Country::Palestine, "Battles", "Armed clash", 20.0),
            ],
            1000.0,
        )
    }

    fn find<'a>(l: &'a SankeyLayout, id: &str) -> &'a SankeyNode {
        l.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn country_nodes_use_country_colour() {
        let l = sample();
        assert_eq!(node_fill(find(&l, "Israel"), true), "var(--color-Israel)");
    }

    #[test]
    fn mixed_nodes_blend_by_israel_share() {
        let l = sample();
        // all inflow from Palestine -> pure Palestine blend colour
        assert_eq!(node_fill(find(&l, "Battles"), true), "rgb(28, 212, 117)");
        assert_eq!(node_fill(find(&l, "Battles"), false), "rgb(7, 64, 36)");
        let protests = find(&l, "Protests");
        assert_eq!(protests.israel_share(), Some(0.75));
        assert_ne!(node_fill(protests, true), "#888");
    }

    #[test]
    fn entrance_runs_column_by_column() {
        assert_eq!(node_opacity(NodeKind::Country, 400.0), 1.0);
        assert_eq!(node_opacity(NodeKind::EventType, 1000.0), 0.0);
        assert_eq!(link_progress(LinkSide::Left, 800.0), 0.5);
        assert_eq!(link_progress(LinkSide::Right, 1800.0), 0.0);
        assert_eq!(node_opacity(NodeKind::SubEvent, TOTAL_MS), 1.0);
    }

    #[test]
    fn node_hover_highlights_connected_links() {
        let l = sample();
        let israel = l.nodes.iter().position(|n| n.id == "Israel").unwrap();
        for i in 0..l.links.len() {
            let connected = l.links[i].source == israel || l.links[i].target == israel;
            let expected = if connected { 0.8 } else { 0.1 };
            assert_eq!(link_opacity(&l, Some(Hover::Node(israel)), i), expected);
        }
        assert_eq!(link_opacity(&l, None, 0), 0.4);
        assert_eq!(link_opacity(&l, Some(Hover::Link(0)), 0), 0.7);
    }

    #[test]
    fn breakdown_lists_countries_with_inflow() {
        let l = sample();
        let b = node_breakdown(find(&l, "Protests"));
        assert_eq!(b, vec![(Country::Israel, 30.0, 75.0), (Country::Palestine, 10.0, 25.0)]);
        assert!(node_breakdown(find(&l, "Israel")).is_empty());
    }

    #[test]
    fn pointer_on_a_node_wins_over_links() {
        let l = sample();
        let n = find(&l, "Protests");
        let idx = l.nodes.iter().position(|m| m.id == "Protests").unwrap();
        assert_eq!(hover_at(&l, n.x0 + 2.0, (n.y0 + n.y1) / 2.0), Some(Hover::Node(idx)));
        assert_eq!(hover_at(&l, 5.0, 5.0), None);
    }
}
