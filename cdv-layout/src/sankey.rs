//! Three-column flow layout: country -> event type -> sub-event type.
//!
//! Nodes are placed in columns by their longest distance from a source
//! (left alignment), stacked top-down in a grouped order, and scaled so the
//! fullest column fits the extent. Two adjustments follow the stacking:
//! the country column and the event-type column are stretched to span the
//! same height as the sub-event column, and link end points are then
//! re-stacked proportionally inside each node.

use crate::labels::{needs_leader, spread, truncate, MIN_LABEL_SPACING};
use crate::path::{link_horizontal, Point};
use cdv_core::Country;
use std::collections::HashMap;

pub const NODE_WIDTH: f64 = 20.0;
pub const NODE_PADDING: f64 = 10.0;
pub const LABEL_MAX_CHARS: usize = 35;

/// One aggregated row of `events_sankey.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRow {
    pub country: Country,
    pub event_type: String,
    pub sub_event_type: String,
    pub events: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Country,
    EventType,
    SubEvent,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Country => "country",
            NodeKind::EventType => "eventtype",
            NodeKind::SubEvent => "subevent",
        }
    }
}

/// Which half of the diagram a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub column: usize,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    /// Incoming flow from Israel and Palestine respectively.
    pub inflow: (f64, f64),
}

impl SankeyNode {
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Share of incoming flow that originates in Israel, `None` without inflow.
    pub fn israel_share(&self) -> Option<f64> {
        let total = self.inflow.0 + self.inflow.1;
        if total > 0.0 {
            Some(self.inflow.0 / total)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub country: Country,
    pub side: LinkSide,
    pub width: f64,
    /// Centre y at the source node.
    pub y0: f64,
    /// Centre y at the target node.
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLayout {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

/// Pixel rectangle the nodes are laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Group sub-events under their parent event type, then order by id.
fn sort_key(id: &str) -> (&str, &str) {
    let parent = id.split_once('|').map(|(p, _)| p).unwrap_or(id);
    (parent, id)
}

struct GraphBuilder {
    nodes: Vec<SankeyNode>,
    index: HashMap<String, usize>,
    links: Vec<SankeyLink>,
    link_index: HashMap<(usize, usize, Country), usize>,
}

impl GraphBuilder {
    fn node(&mut self, id: String, name: &str, kind: NodeKind) -> usize {
        if let Some(&i) = self.index.get(&id) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(id.clone(), i);
        self.nodes.push(SankeyNode {
            id,
            name: name.to_string(),
            kind,
            column: 0,
            value: 0.0,
            x0: 0.0,
            x1: 0.0,
            y0: 0.0,
            y1: 0.0,
            inflow: (0.0, 0.0),
        });
        i
    }

    fn link(&mut self, source: usize, target: usize, value: f64, country: Country, side: LinkSide) {
        let key = (source, target, country);
        if let Some(&i) = self.link_index.get(&key) {
            self.links[i].value += value;
            return;
        }
        self.link_index.insert(key, self.links.len());
        self.links.push(SankeyLink {
            source,
            target,
            value,
            country,
            side,
            width: 0.0,
            y0: 0.0,
            y1: 0.0,
        });
    }
}

/// Build and lay out the flow graph for `rows` inside `extent`.
///
/// Rows with a non-positive or non-finite event count are ignored.
pub fn layout(rows: &[FlowRow], extent: Extent) -> SankeyLayout {
    let mut g = GraphBuilder {
        nodes: Vec::new(),
        index: HashMap::new(),
        links: Vec::new(),
        link_index: HashMap::new(),
    };
    for row in rows.iter().filter(|r| r.events.is_finite() && r.events > 0.0) {
        let c = g.node(row.country.label().to_string(), row.country.label(), NodeKind::Country);
        let t = g.node(row.event_type.clone(), &row.event_type, NodeKind::EventType);
        let s = g.node(
            format!("{}|{}", row.event_type, row.sub_event_type),
            &row.sub_event_type,
            NodeKind::SubEvent,
        );
        g.link(c, t, row.events, row.country, LinkSide::Left);
        g.link(t, s, row.events, row.country, LinkSide::Right);
    }
    let mut nodes = g.nodes;
    let mut links = g.links;
    if nodes.is_empty() {
        return SankeyLayout { nodes, links };
    }

    compute_values(&mut nodes, &links);
    let columns = assign_columns(&mut nodes, &links);
    let ky = position_nodes(&mut nodes, &columns, extent);
    for link in links.iter_mut() {
        link.width = link.value * ky;
    }
    balance_columns(&mut nodes, &columns);
    position_links(&nodes, &mut links);

    log::debug!("sankey: {} nodes, {} links, ky={:.4}", nodes.len(), links.len(), ky);
    SankeyLayout { nodes, links }
}

fn compute_values(nodes: &mut [SankeyNode], links: &[SankeyLink]) {
    let mut incoming = vec![0.0; nodes.len()];
    let mut outgoing = vec![0.0; nodes.len()];
    for l in links {
        outgoing[l.source] += l.value;
        incoming[l.target] += l.value;
        let inflow = &mut nodes[l.target].inflow;
        match l.country {
            Country::Israel => inflow.0 += l.value,
            Country::Palestine => inflow.1 += l.value,
        }
    }
    for (i, n) in nodes.iter_mut().enumerate() {
        n.value = incoming[i].max(outgoing[i]);
    }
}

/// Column = longest path from a source. Returns node indices per column,
/// each in display order.
fn assign_columns(nodes: &mut [SankeyNode], links: &[SankeyLink]) -> Vec<Vec<usize>> {
    let mut depth = vec![0usize; nodes.len()];
    for _ in 0..nodes.len() {
        let mut changed = false;
        for l in links {
            if depth[l.target] < depth[l.source] + 1 {
                depth[l.target] = depth[l.source] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    let n_cols = depth.iter().max().map(|d| d + 1).unwrap_or(1);
    let mut columns = vec![Vec::new(); n_cols];
    for (i, d) in depth.iter().enumerate() {
        nodes[i].column = *d;
        columns[*d].push(i);
    }
    for col in columns.iter_mut() {
        col.sort_by(|&a, &b| sort_key(&nodes[a].id).cmp(&sort_key(&nodes[b].id)));
    }
    columns
}

/// Place nodes horizontally by column and stack them vertically. Returns
/// the value-to-pixel factor.
fn position_nodes(nodes: &mut [SankeyNode], columns: &[Vec<usize>], extent: Extent) -> f64 {
    let n_cols = columns.len();
    let kx = if n_cols > 1 {
        (extent.x1 - extent.x0 - NODE_WIDTH) / (n_cols - 1) as f64
    } else {
        0.0
    };
    let height = extent.y1 - extent.y0;
    let longest = columns.iter().map(Vec::len).max().unwrap_or(1);
    let padding = if longest > 1 {
        NODE_PADDING.min(height / (longest - 1) as f64)
    } else {
        NODE_PADDING
    };

    let ky = columns
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| {
            let total: f64 = c.iter().map(|&i| nodes[i].value).sum();
            (height - (c.len() - 1) as f64 * padding) / total
        })
        .filter(|k| k.is_finite())
        .fold(f64::INFINITY, f64::min);
    let ky = if ky.is_finite() { ky.max(0.0) } else { 0.0 };

    for (ci, col) in columns.iter().enumerate() {
        let mut y = extent.y0;
        for &i in col {
            let n = &mut nodes[i];
            n.x0 = extent.x0 + ci as f64 * kx;
            n.x1 = n.x0 + NODE_WIDTH;
            n.y0 = y;
            n.y1 = y + n.value * ky;
            y = n.y1 + padding;
        }
        // spread leftover space evenly between the nodes of this column
        let spare = (extent.y1 - y + padding) / (col.len() + 1) as f64;
        for (k, &i) in col.iter().enumerate() {
            let shift = spare * (k + 1) as f64;
            nodes[i].y0 += shift;
            nodes[i].y1 += shift;
        }
    }
    ky
}

fn column_span(nodes: &[SankeyNode], col: &[usize]) -> f64 {
    let top = col.iter().map(|&i| nodes[i].y0).fold(f64::INFINITY, f64::min);
    let bottom = col.iter().map(|&i| nodes[i].y1).fold(f64::NEG_INFINITY, f64::max);
    if col.is_empty() {
        0.0
    } else {
        bottom - top
    }
}

fn by_top(nodes: &[SankeyNode], col: &[usize]) -> Vec<usize> {
    let mut sorted = col.to_vec();
    sorted.sort_by(|&a, &b| nodes[a].y0.total_cmp(&nodes[b].y0));
    sorted
}

/// Stretch the first and middle columns to the height of the last one.
fn balance_columns(nodes: &mut [SankeyNode], columns: &[Vec<usize>]) {
    if columns.len() < 3 {
        return;
    }
    let right_h = column_span(nodes, &columns[columns.len() - 1]);

    let left = by_top(nodes, &columns[0]);
    if left.len() == 2 && right_h > column_span(nodes, &left) {
        // top node stays, bottom node moves down
        let top_y0 = nodes[left[0]].y0;
        let bottom = &mut nodes[left[1]];
        let h = bottom.height();
        bottom.y0 = top_y0 + right_h - h;
        bottom.y1 = bottom.y0 + h;
    }

    let center = by_top(nodes, &columns[1]);
    if !center.is_empty() && right_h > column_span(nodes, &center) {
        let total: f64 = center.iter().map(|&i| nodes[i].height()).sum();
        let gaps = if center.len() > 1 { (center.len() - 1) as f64 } else { 1.0 };
        let spacing = (right_h - total) / gaps;
        let mut y = nodes[center[0]].y0;
        for &i in &center {
            let h = nodes[i].height();
            nodes[i].y0 = y;
            nodes[i].y1 = y + h;
            y += h + spacing;
        }
    }
}

/// Stack link ends inside each node proportionally to link value, ordered by
/// the position of the node at the other end.
fn position_links(nodes: &[SankeyNode], links: &mut [SankeyLink]) {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (li, l) in links.iter().enumerate() {
        outgoing[l.source].push(li);
        incoming[l.target].push(li);
    }
    for (ni, node) in nodes.iter().enumerate() {
        let mut out = outgoing[ni].clone();
        out.sort_by(|&a, &b| nodes[links[a].target].y0.total_cmp(&nodes[links[b].target].y0));
        let total: f64 = out.iter().map(|&li| links[li].value).sum();
        let mut y = node.y0;
        for &li in &out {
            let band = if total > 0.0 { links[li].value / total * node.height() } else { 0.0 };
            links[li].y0 = y + band / 2.0;
            y += band;
        }

        let mut inc = incoming[ni].clone();
        inc.sort_by(|&a, &b| nodes[links[a].source].y0.total_cmp(&nodes[links[b].source].y0));
        let total: f64 = inc.iter().map(|&li| links[li].value).sum();
        let mut y = node.y0;
        for &li in &inc {
            let band = if total > 0.0 { links[li].value / total * node.height() } else { 0.0 };
            links[li].y1 = y + band / 2.0;
            y += band;
        }
    }
}

/// End points of link `index`: right edge of its source node to left edge
/// of its target node, at the link's centre line.
pub fn link_ends(layout: &SankeyLayout, index: usize) -> Option<(Point, Point)> {
    let link = layout.links.get(index)?;
    let source = layout.nodes.get(link.source)?;
    let target = layout.nodes.get(link.target)?;
    Some(((source.x1, link.y0), (target.x0, link.y1)))
}

/// SVG path of link `index`, stroked with the link's width.
pub fn link_path(layout: &SankeyLayout, index: usize) -> String {
    link_ends(layout, index)
        .map(|(a, b)| link_horizontal(a, b))
        .unwrap_or_default()
}

/// Node whose rectangle contains `(x, y)`.
pub fn node_at(layout: &SankeyLayout, x: f64, y: f64) -> Option<usize> {
    layout
        .nodes
        .iter()
        .position(|n| x >= n.x0 && x <= n.x1 && y >= n.y0 && y <= n.y1)
}

/// Topmost link whose stroke covers `(x, y)`.
///
/// Links are cubic curves with both control points at the horizontal
/// midpoint, so x is monotone in the curve parameter and can be inverted
/// by bisection.
pub fn link_at(layout: &SankeyLayout, x: f64, y: f64) -> Option<usize> {
    (0..layout.links.len()).rev().find(|&i| {
        let Some(((sx, sy), (tx, ty))) = link_ends(layout, i) else {
            return false;
        };
        if x < sx || x > tx || tx <= sx {
            return false;
        }
        let xm = (sx + tx) / 2.0;
        let bezier = |a: f64, b: f64, c: f64, d: f64, t: f64| {
            let u = 1.0 - t;
            u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
        };
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..30 {
            let mid = (lo + hi) / 2.0;
            if bezier(sx, xm, xm, tx, mid) < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let cy = bezier(sy, sy, ty, ty, (lo + hi) / 2.0);
        (y - cy).abs() <= (layout.links[i].width / 2.0).max(1.0)
    })
}

/// Placed text for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    pub node: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub original_y: f64,
    /// Label sits right of its node (text-anchor start).
    pub anchor_start: bool,
    pub font_size: f64,
    pub leader: bool,
}

/// Labels for every node, de-overlapped separately on each side.
///
/// Nodes in the left half of `width` are labelled on their right.
pub fn node_labels(layout: &SankeyLayout, width: f64) -> Vec<NodeLabel> {
    let mut labels: Vec<NodeLabel> = layout
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let anchor_start = n.x0 < width / 2.0;
            let y = (n.y0 + n.y1) / 2.0;
            NodeLabel {
                node: i,
                text: truncate(&n.name, LABEL_MAX_CHARS),
                x: if anchor_start { n.x1 + 6.0 } else { n.x0 - 6.0 },
                y,
                original_y: y,
                anchor_start,
                font_size: if n.height() < 15.0 { 9.0 } else { 11.0 },
                leader: false,
            }
        })
        .collect();

    for side in [true, false] {
        let members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i].anchor_start == side).collect();
        let ys: Vec<f64> = members.iter().map(|&i| labels[i].y).collect();
        for (slot, y) in spread(&ys, MIN_LABEL_SPACING).into_iter().enumerate() {
            let label = &mut labels[members[slot]];
            label.y = y;
            label.leader = needs_leader(label.original_y, y);
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: Country, t: &str, s: &str, events: f64) -> FlowRow {
        FlowRow {
            country,
            event_type: t.to_string(),
            sub_event_type: s.to_string(),
            events,
        }
    }

    fn sample() -> Vec<FlowRow> {
        vec![
            row(Country::Palestine, "Explosions/Remote violence", "Air/drone strike", 400.0),
            row(Country::Palestine, "Explosions/Remote violence", "Shelling/artillery/missile attack", 200.0),
            row(Country::Israel, "Explosions/Remote violence", "Shelling/artillery/missile attack", 100.0),
            row(Country::Palestine, "Protests", "Peaceful protest", 50.0),
            row(Country::Israel, "Protests", "Peaceful protest", 150.0),
            row(Country::Israel, "Battles", "Armed clash", 30.0),
        ]
    }

    const EXTENT: Extent = Extent { x0: 200.0, y0: 40.0, x1: 800.0, y1: 560.0 };

    fn node<'a>(l: &'a SankeyLayout, id: &str) -> &'a SankeyNode {
        l.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn builds_three_columns() {
        let l = layout(&sample(), EXTENT);
        assert_eq!(node(&l, "Israel").column, 0);
        assert_eq!(node(&l, "Protests").column, 1);
        assert_eq!(node(&l, "Protests|Peaceful protest").column, 2);
        assert_eq!(node(&l, "Protests|Peaceful protest").kind, NodeKind::SubEvent);
        assert_eq!(node(&l, "Israel").x0, 200.0);
        assert_eq!(node(&l, "Battles|Armed clash").x1, 800.0);
    }

    #[test]
    fn links_are_aggregated_per_country() {
        let l = layout(&sample(), EXTENT);
        let expl = l.nodes.iter().position(|n| n.id == "Explosions/Remote violence").unwrap();
        let pal = l.nodes.iter().position(|n| n.id == "Palestine").unwrap();
        let left: Vec<_> = l.links.iter().filter(|k| k.source == pal && k.target == expl).collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].value, 600.0);
        assert_eq!(left[0].side, LinkSide::Left);
    }

    #[test]
    fn node_value_is_max_of_flows() {
        let l = layout(&sample(), EXTENT);
        assert_eq!(node(&l, "Palestine").value, 650.0);
        assert_eq!(node(&l, "Protests").value, 200.0);
        let share = node(&l, "Protests").israel_share().unwrap();
        assert!((share - 0.75).abs() < 1e-9);
        assert_eq!(node(&l, "Israel").israel_share(), None);
    }

    #[test]
    fn sub_events_grouped_under_parent_type() {
        let l = layout(&sample(), EXTENT);
        let mut right: Vec<&SankeyNode> = l.nodes.iter().filter(|n| n.column == 2).collect();
        right.sort_by(|a, b| a.y0.total_cmp(&b.y0));
        let ids: Vec<&str> = right.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "Battles|Armed clash",
                "Explosions/Remote violence|Air/drone strike",
                "Explosions/Remote violence|Shelling/artillery/missile attack",
                "Protests|Peaceful protest"
            ]
        );
    }

    #[test]
    fn side_columns_span_the_right_column() {
        let l = layout(&sample(), EXTENT);
        let span = |col: usize| {
            let ns: Vec<_> = l.nodes.iter().filter(|n| n.column == col).collect();
            let top = ns.iter().map(|n| n.y0).fold(f64::INFINITY, f64::min);
            let bottom = ns.iter().map(|n| n.y1).fold(f64::NEG_INFINITY, f64::max);
            bottom - top
        };
        assert!((span(0) - span(2)).abs() < 1e-6, "left {} right {}", span(0), span(2));
        assert!((span(1) - span(2)).abs() < 1e-6, "center {} right {}", span(1), span(2));
    }

    #[test]
    fn link_ends_stay_inside_nodes() {
        let l = layout(&sample(), EXTENT);
        for link in &l.links {
            let s = &l.nodes[link.source];
            let t = &l.nodes[link.target];
            assert!(link.y0 >= s.y0 - 1e-9 && link.y0 <= s.y1 + 1e-9);
            assert!(link.y1 >= t.y0 - 1e-9 && link.y1 <= t.y1 + 1e-9);
            assert!(link.width > 0.0);
        }
    }

    #[test]
    fn empty_rows_give_empty_layout() {
        let l = layout(&[row(Country::Israel, "Riots", "Mob violence", 0.0)], EXTENT);
        assert!(l.nodes.is_empty());
        assert!(l.links.is_empty());
    }

    #[test]
    fn labels_flip_side_at_half_width() {
        let l = layout(&sample(), EXTENT);
        let labels = node_labels(&l, 1000.0);
        let israel = labels.iter().find(|lb| l.nodes[lb.node].id == "Israel").unwrap();
        assert!(israel.anchor_start);
        assert_eq!(israel.x, 226.0);
        let sub = labels.iter().find(|lb| l.nodes[lb.node].column == 2).unwrap();
        assert!(!sub.anchor_start);
        assert_eq!(sub.x, 774.0);
    }

    #[test]
    fn labels_on_one_side_do_not_overlap() {
        let l = layout(&sample(), EXTENT);
        let labels = node_labels(&l, 1000.0);
        let mut right: Vec<f64> = labels.iter().filter(|lb| !lb.anchor_start).map(|lb| lb.y).collect();
        right.sort_by(f64::total_cmp);
        for w in right.windows(2) {
            assert!(w[1] - w[0] >= MIN_LABEL_SPACING - 1e-9);
        }
    }

    #[test]
    fn hit_testing_finds_nodes_and_links() {
        let l = layout(&[row(Country::Israel, "Battles", "Armed clash", 30.0)], EXTENT);
        let israel = l.nodes.iter().position(|n| n.id == "Israel").unwrap();
        let n = &l.nodes[israel];
        assert_eq!(node_at(&l, n.x0 + 1.0, (n.y0 + n.y1) / 2.0), Some(israel));
        assert_eq!(node_at(&l, 0.0, 0.0), None);

        let li = l.links.iter().position(|k| k.source == israel).unwrap();
        let ((sx, sy), (tx, ty)) = link_ends(&l, li).unwrap();
        // the curve passes through the midpoint of its ends
        assert_eq!(link_at(&l, (sx + tx) / 2.0, (sy + ty) / 2.0), Some(li));
        assert!(link_path(&l, li).starts_with('M'));
        assert_eq!(link_at(&l, sx - 5.0, sy), None);
    }
}
