//! Document model: nodes, edges, groups, and the in-memory entity store.
//!
//! This module defines the data that describes what is on the canvas
//! (`Node`, `Edge`, `Group`), sparse-update types for incremental edits
//! (`NodePatch`, `GroupPatch`), the monotonic id sequences (`Sequences`), the
//! serialized cross-boundary shape (`Snapshot`), and the store that owns all
//! live entities (`DocStore`).
//!
//! `DocStore` is pure data plus derived queries. Every mutation reaches it
//! through [`crate::dispatch::Store::dispatch`]; the gesture engine only reads.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Rect};
use crate::consts::{GROUP_PAD, TARGET_RADIUS_FACTOR};

/// Identifier of a node, assigned from [`Sequences::node`].
pub type NodeId = u64;
/// Identifier of an edge, assigned from [`Sequences::edge`].
pub type EdgeId = u64;
/// Identifier of a group, assigned from [`Sequences::group`].
pub type GroupId = u64;

/// Outline drawn for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Triangle,
}

/// Three-step node size ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum NodeSize {
    S,
    #[default]
    M,
    L,
}

impl NodeSize {
    /// Nominal radius in world units.
    #[must_use]
    pub fn radius(self) -> f64 {
        match self {
            Self::S => 16.0,
            Self::M => 26.0,
            Self::L => 40.0,
        }
    }

    /// One step up the ladder, or `None` at the top.
    #[must_use]
    pub fn larger(self) -> Option<Self> {
        match self {
            Self::S => Some(Self::M),
            Self::M => Some(Self::L),
            Self::L => None,
        }
    }

    /// One step down the ladder, or `None` at the bottom.
    #[must_use]
    pub fn smaller(self) -> Option<Self> {
        match self {
            Self::S => None,
            Self::M => Some(Self::S),
            Self::L => Some(Self::M),
        }
    }
}

/// Border rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    #[default]
    Sharp,
    Blur,
}

/// Arrow direction of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    /// Arrow points from `from` to `to`.
    #[default]
    Fwd,
    /// Arrow points from `to` back to `from`.
    Bwd,
    /// Plain line without arrowheads.
    #[serde(rename = "none")]
    Undirected,
}

/// A node on the canvas. `x`/`y` is its centre in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub shape: Shape,
    pub color: String,
    #[serde(default)]
    pub size: NodeSize,
    #[serde(default)]
    pub border: Border,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub locked: bool,
}

impl Node {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.size.radius()
    }

    /// Whether `world` lies within the enlarged target circle used for
    /// drop targets and pinch targets.
    #[must_use]
    pub fn within_target(&self, world: Point) -> bool {
        let r = self.radius() * TARGET_RADIUS_FACTOR;
        let dx = world.x - self.x;
        let dy = world.y - self.y;
        dx * dx + dy * dy <= r * r
    }
}

/// A directed connection between two nodes. `from == to` is a self-loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub mode: EdgeMode,
}

impl Edge {
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    #[must_use]
    pub fn touches(&self, id: NodeId) -> bool {
        self.from == id || self.to == id
    }
}

/// A named, coloured collection of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub node_ids: Vec<NodeId>,
    /// Presentation rank per member.
    #[serde(default)]
    pub order: BTreeMap<NodeId, usize>,
    /// Explicit area; required when the group has no members.
    #[serde(default)]
    pub bounds: Option<Rect>,
}

impl Group {
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_ids.contains(&id)
    }

    /// Append a member with rank equal to its position. Returns false if it
    /// was already a member.
    pub fn push_member(&mut self, id: NodeId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.node_ids.push(id);
        self.order.insert(id, self.node_ids.len() - 1);
        true
    }

    /// Drop a member and its rank. Returns false if it was not a member.
    pub fn remove_member(&mut self, id: NodeId) -> bool {
        let before = self.node_ids.len();
        self.node_ids.retain(|n| *n != id);
        self.order.remove(&id);
        before != self.node_ids.len()
    }

    /// Members sorted by rank; members without a rank sort as rank 0.
    #[must_use]
    pub fn ordered_members(&self) -> Vec<NodeId> {
        let mut ids = self.node_ids.clone();
        ids.sort_by_key(|id| self.order.get(id).copied().unwrap_or(0));
        ids
    }
}

/// Sparse update for a node. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<NodeSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NodePatch {
    fn apply(&self, node: &mut Node) {
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(shape) = self.shape {
            node.shape = shape;
        }
        if let Some(ref color) = self.color {
            node.color.clone_from(color);
        }
        if let Some(size) = self.size {
            node.size = size;
        }
        if let Some(border) = self.border {
            node.border = border;
        }
        if let Some(ref label) = self.label {
            node.label.clone_from(label);
        }
        if let Some(ref note) = self.note {
            node.note.clone_from(note);
        }
    }
}

/// Sparse update for a group's presentation fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

impl GroupPatch {
    fn apply(&self, group: &mut Group) {
        if let Some(ref name) = self.name {
            group.name.clone_from(name);
        }
        if let Some(ref color) = self.color {
            group.color.clone_from(color);
        }
        if let Some(bounds) = self.bounds {
            group.bounds = Some(bounds);
        }
    }
}

/// Next id to hand out for each entity kind. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequences {
    pub node: NodeId,
    pub edge: EdgeId,
    pub group: GroupId,
}

impl Default for Sequences {
    fn default() -> Self {
        Self { node: 1, edge: 1, group: 1 }
    }
}

/// The serialized document: `{nodes, edges, groups, nSeq, eSeq, gSeq}`.
///
/// Sequence counters are optional on input; [`DocStore::load_snapshot`]
/// derives missing ones from the largest id present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(rename = "nSeq", default, skip_serializing_if = "Option::is_none")]
    pub n_seq: Option<NodeId>,
    #[serde(rename = "eSeq", default, skip_serializing_if = "Option::is_none")]
    pub e_seq: Option<EdgeId>,
    #[serde(rename = "gSeq", default, skip_serializing_if = "Option::is_none")]
    pub g_seq: Option<GroupId>,
}

/// In-memory store of nodes, edges, and groups.
///
/// Entities keep insertion order; hit-testing and rectangle queries iterate
/// in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    groups: Vec<Group>,
    seq: Sequences,
}

impl DocStore {
    /// Create an empty store with all sequences at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Lookups ---

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn sequences(&self) -> Sequences {
        self.seq
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Whether an edge with exactly this ordered endpoint pair exists.
    #[must_use]
    pub fn edge_exists(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    /// Groups that list `id` as a member.
    #[must_use]
    pub fn groups_of(&self, id: NodeId) -> Vec<GroupId> {
        self.groups.iter().filter(|g| g.contains(id)).map(|g| g.id).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.groups.is_empty()
    }

    // --- Insertion ---

    /// Allocate a node id and insert the node built from it.
    pub fn insert_node_with(&mut self, build: impl FnOnce(NodeId) -> Node) -> &Node {
        let id = self.seq.node;
        self.seq.node += 1;
        self.nodes.push(build(id));
        let last = self.nodes.len() - 1;
        &self.nodes[last]
    }

    /// Allocate an edge id and insert a new edge.
    pub fn insert_edge(&mut self, from: NodeId, to: NodeId, mode: EdgeMode) -> &Edge {
        let id = self.seq.edge;
        self.seq.edge += 1;
        self.edges.push(Edge { id, from, to, mode });
        let last = self.edges.len() - 1;
        &self.edges[last]
    }

    /// Allocate a group id and insert the group built from it.
    pub fn insert_group_with(&mut self, build: impl FnOnce(GroupId) -> Group) -> &Group {
        let id = self.seq.group;
        self.seq.group += 1;
        self.groups.push(build(id));
        let last = self.groups.len() - 1;
        &self.groups[last]
    }

    // --- Mutation ---

    /// Apply a sparse patch to a node. Returns false if the node doesn't exist.
    pub fn patch_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        patch.apply(node);
        true
    }

    /// Apply a sparse patch to a group. Returns false if the group doesn't exist.
    pub fn patch_group(&mut self, id: GroupId, patch: &GroupPatch) -> bool {
        let Some(group) = self.group_mut(id) else {
            return false;
        };
        patch.apply(group);
        true
    }

    /// Remove a node along with every edge touching it and every group
    /// membership referencing it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(idx);
        self.edges.retain(|e| !e.touches(id));
        for group in &mut self.groups {
            group.remove_member(id);
        }
        Some(node)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(idx))
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let idx = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(idx))
    }

    /// Drop every entity and reset all sequences to 1.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // --- Spatial queries ---

    /// First node (in insertion order) whose enlarged target circle contains
    /// `world`, skipping `exclude`.
    #[must_use]
    pub fn node_at(&self, world: Point, exclude: Option<NodeId>) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|n| Some(n.id) != exclude)
            .find(|n| n.within_target(world))
            .map(|n| n.id)
    }

    /// Nodes whose centre lies inside `rect` (inclusive).
    #[must_use]
    pub fn nodes_in_rect(&self, rect: &Rect) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| rect.contains(n.center()))
            .map(|n| n.id)
            .collect()
    }

    /// Visual bounds of a group: member extents padded by [`GROUP_PAD`],
    /// unioned with explicit bounds. `None` when the group has neither.
    #[must_use]
    pub fn group_bounds(&self, group: &Group) -> Option<Rect> {
        let mut derived: Option<Rect> = None;
        for node in group.node_ids.iter().filter_map(|id| self.node(*id)) {
            let r = node.radius();
            let extent = Rect { x: node.x - r, y: node.y - r, w: r * 2.0, h: r * 2.0 };
            derived = Some(match derived {
                Some(acc) => acc.union(&extent),
                None => extent,
            });
        }
        match (derived.map(|d| d.expanded(GROUP_PAD)), group.bounds) {
            (Some(d), Some(explicit)) => Some(d.union(&explicit)),
            (Some(d), None) => Some(d),
            (None, explicit) => explicit,
        }
    }

    /// The focus node plus every node sharing an edge with it.
    #[must_use]
    pub fn focus_set(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = vec![id];
        for edge in &self.edges {
            let other = if edge.from == id {
                edge.to
            } else if edge.to == id {
                edge.from
            } else {
                continue;
            };
            if !ids.contains(&other) {
                ids.push(other);
            }
        }
        ids
    }

    // --- Snapshots ---

    /// Serializable copy of all entities and sequences.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            groups: self.groups.clone(),
            n_seq: Some(self.seq.node),
            e_seq: Some(self.seq.edge),
            g_seq: Some(self.seq.group),
        }
    }

    /// Replace all entities with a snapshot. Missing sequences become
    /// `max(existing id) + 1`.
    pub fn load_snapshot(&mut self, snap: Snapshot) {
        let next_node = snap.nodes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let next_edge = snap.edges.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let next_group = snap.groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        self.seq = Sequences {
            node: snap.n_seq.unwrap_or(next_node),
            edge: snap.e_seq.unwrap_or(next_edge),
            group: snap.g_seq.unwrap_or(next_group),
        };
        self.nodes = snap.nodes;
        self.edges = snap.edges;
        self.groups = snap.groups;
    }

    /// Append a foreign snapshot's entities with freshly allocated ids.
    ///
    /// Edge endpoints, group members, and group order keys are remapped
    /// through the new node ids; references to nodes not in `snap` are kept
    /// unchanged.
    pub fn merge_snapshot(&mut self, snap: Snapshot) {
        let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();
        for node in snap.nodes {
            let old = node.id;
            let new = self.insert_node_with(|id| Node { id, ..node }).id;
            id_map.insert(old, new);
        }
        let remap = |id: NodeId| id_map.get(&id).copied().unwrap_or(id);
        for edge in snap.edges {
            self.insert_edge(remap(edge.from), remap(edge.to), edge.mode);
        }
        for group in snap.groups {
            let node_ids = group.node_ids.iter().map(|id| remap(*id)).collect();
            let order = group.order.iter().map(|(id, rank)| (remap(*id), *rank)).collect();
            self.insert_group_with(|id| Group { id, node_ids, order, ..group });
        }
    }
}
