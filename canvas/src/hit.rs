//! Spatial hit-testing: which interactive element sits under a screen point.
//!
//! Categories are tested in a fixed priority: connection handles of selected
//! nodes, node bodies, edges, group areas, then empty canvas. Within a
//! category the most recently inserted element wins, matching draw order.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{EDGE_CURVE_OFFSET, EDGE_HIT_SLOP_PX, EDGE_SAMPLES, HANDLE_OFFSET, HANDLE_RADIUS, NODE_HIT_PAD};
use crate::doc::{DocStore, Edge, EdgeId, GroupId, Node, NodeId, Shape};
use crate::input::UiState;

/// Topmost interactive element under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A connection handle owned by the node.
    Handle(NodeId),
    Node(NodeId),
    Edge(EdgeId),
    /// Inside a group's area but not on a node.
    Group(GroupId),
    Empty,
}

/// Classify the element under `screen`.
#[must_use]
pub fn hit_test(screen: Point, doc: &DocStore, camera: &Camera, ui: &UiState) -> Hit {
    let world = camera.screen_to_world(screen);
    let slop = camera.screen_dist_to_world(EDGE_HIT_SLOP_PX);

    for node in doc.nodes().iter().rev().filter(|n| ui.is_selected(n.id)) {
        if handle_positions(node).iter().any(|h| h.distance(world) <= HANDLE_RADIUS + slop) {
            return Hit::Handle(node.id);
        }
    }

    if let Some(node) = doc.nodes().iter().rev().find(|n| node_contains(n, world)) {
        return Hit::Node(node.id);
    }

    for edge in doc.edges().iter().rev() {
        let Some(path) = edge_polyline(doc, edge) else {
            continue;
        };
        if path.windows(2).any(|seg| dist_to_segment(world, seg[0], seg[1]) <= slop) {
            return Hit::Edge(edge.id);
        }
    }

    for group in doc.groups().iter().rev() {
        if doc.group_bounds(group).is_some_and(|b| b.contains(world)) {
            return Hit::Group(group.id);
        }
    }

    Hit::Empty
}

/// World positions of a node's four connection handles (N, S, W, E).
#[must_use]
pub fn handle_positions(node: &Node) -> [Point; 4] {
    let d = node.radius() + HANDLE_OFFSET;
    [
        Point::new(node.x, node.y - d),
        Point::new(node.x, node.y + d),
        Point::new(node.x - d, node.y),
        Point::new(node.x + d, node.y),
    ]
}

/// Whether `world` falls inside a node's padded outline.
#[must_use]
pub fn node_contains(node: &Node, world: Point) -> bool {
    let r = node.radius();
    let dx = world.x - node.x;
    let dy = world.y - node.y;
    match node.shape {
        Shape::Circle => dx.hypot(dy) <= r + NODE_HIT_PAD,
        Shape::Square => dx.abs() <= r + NODE_HIT_PAD && dy.abs() <= r + NODE_HIT_PAD,
        Shape::Triangle => {
            let rr = r + NODE_HIT_PAD;
            let a = Point::new(node.x, node.y - rr);
            let b = Point::new(node.x + rr * 0.866, node.y + rr * 0.5);
            let c = Point::new(node.x - rr * 0.866, node.y + rr * 0.5);
            point_in_triangle(world, a, b, c)
        }
    }
}

/// Sampled world-space path of an edge, or `None` if an endpoint is missing.
///
/// Non-self edges bow to one side as a quadratic curve; self-loops are a
/// cubic arc above the node.
#[must_use]
pub fn edge_polyline(doc: &DocStore, edge: &Edge) -> Option<Vec<Point>> {
    let from = doc.node(edge.from)?;
    let to = doc.node(edge.to)?;
    if edge.is_self_loop() {
        let r = from.radius();
        let top = from.y - r;
        let p0 = Point::new(from.x - r * 0.5, top);
        let c1 = Point::new(from.x - r * 1.5, top - r * 2.0);
        let c2 = Point::new(from.x + r * 1.5, top - r * 2.0);
        let p3 = Point::new(from.x + r * 0.5, top);
        return Some(sample(|t| cubic(p0, c1, c2, p3, t)));
    }
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = match dx.hypot(dy) {
        l if l > 0.0 => l,
        _ => 1.0,
    };
    let off = len * EDGE_CURVE_OFFSET;
    let ctrl = Point::new((from.x + to.x) / 2.0 - (dy / len) * off, (from.y + to.y) / 2.0 + (dx / len) * off);
    let (p0, p2) = (from.center(), to.center());
    Some(sample(|t| quadratic(p0, ctrl, p2, t)))
}

#[allow(clippy::cast_precision_loss)]
fn sample(curve: impl Fn(f64) -> Point) -> Vec<Point> {
    (0..=EDGE_SAMPLES).map(|i| curve(i as f64 / EDGE_SAMPLES as f64)).collect()
}

fn quadratic(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
        u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
    )
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + abx * t, a.y + aby * t))
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let cross = |o: Point, u: Point, v: Point| (u.x - o.x) * (v.y - o.y) - (u.y - o.y) * (v.x - o.x);
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
