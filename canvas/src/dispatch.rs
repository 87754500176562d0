//! Dispatch core: the single gateway for every state mutation.
//!
//! DESIGN
//! ======
//! `Store` owns the document, the UI state, the camera, and the history ring.
//! Nothing else holds a mutable path to them; callers describe what they
//! want as an [`Action`] and hand it to [`Store::dispatch`].
//!
//! Durable actions mutate and then record exactly one history snapshot before
//! returning. Transient actions (`MoveNode`, `MoveNodes`) mutate without
//! recording; the paired `MoveNodeEnd` / `MoveNodesEnd` records once for the
//! whole drag. Invalid references and policy violations (locked nodes,
//! duplicate directed edges) are silent no-ops that record nothing.
//! Selection changes and drag ends record only when the document differs
//! from the current entry, so they never add an empty step or drop redo.
//!
//! Host-facing signals (re-render, notices, panel toggles, fly-to requests)
//! accumulate as [`Effect`]s and are drained with [`Store::take_effects`].

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::camera::{Camera, Point, Rect};
use crate::consts::{DEFAULT_GROUP_NAME, GROUP_COLORS, NODE_COLORS};
use crate::doc::{
    Border, DocStore, Edge, EdgeId, EdgeMode, Group, GroupId, GroupPatch, Node, NodeId, NodePatch, NodeSize, Shape,
    Snapshot,
};
use crate::history::{History, HistoryError, HistoryLimits};
use crate::input::{GridStyle, UiState};

// =============================================================================
// ACTIONS
// =============================================================================

/// Payload for creating a node. Absent style fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewNode {
    pub x: f64,
    pub y: f64,
    pub shape: Option<Shape>,
    pub color: Option<String>,
    pub size: Option<NodeSize>,
    pub border: Option<Border>,
    pub label: Option<String>,
    pub note: Option<String>,
    /// Group to append the new node to.
    pub group_id: Option<GroupId>,
}

impl NewNode {
    /// A default-styled node at a world point.
    #[must_use]
    pub fn at(world: Point) -> Self {
        Self { x: world.x, y: world.y, ..Self::default() }
    }

    /// A node at a world point copying `template`'s shape, colour, size, and border.
    #[must_use]
    pub fn styled_like(template: &Node, world: Point) -> Self {
        Self {
            shape: Some(template.shape),
            color: Some(template.color.clone()),
            size: Some(template.size),
            border: Some(template.border),
            ..Self::at(world)
        }
    }
}

/// Payload for creating a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewGroup {
    pub name: Option<String>,
    pub color: Option<String>,
    pub node_ids: Vec<NodeId>,
    pub bounds: Option<Rect>,
}

/// A saved node style. Applying one is an ordinary `UpdateNode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinStyle {
    pub shape: Shape,
    pub color: String,
    pub size: NodeSize,
    pub border: Border,
}

impl PinStyle {
    #[must_use]
    pub fn of(node: &Node) -> Self {
        Self { shape: node.shape, color: node.color.clone(), size: node.size, border: node.border }
    }

    /// Patch that restyles a node to this pin.
    #[must_use]
    pub fn patch(&self) -> NodePatch {
        NodePatch {
            shape: Some(self.shape),
            color: Some(self.color.clone()),
            size: Some(self.size),
            border: Some(self.border),
            ..NodePatch::default()
        }
    }
}

/// One entry of a multi-node move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Every mutation the core accepts.
///
/// On the wire an action is `{"type": "CREATE_EDGE", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Action {
    CreateNode(NewNode),
    DeleteNode { id: NodeId },
    UpdateNode { id: NodeId, props: NodePatch },
    /// Transient: live drag of one node.
    MoveNode { id: NodeId, x: f64, y: f64 },
    /// Commits a single-node drag. `id` names the dragged node and is
    /// informational only.
    MoveNodeEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
    },
    /// Transient: live drag of a multi-selection.
    MoveNodes { moves: Vec<NodeMove> },
    /// Commits a multi-node drag.
    MoveNodesEnd,
    CreateEdge { from: NodeId, to: NodeId },
    CycleEdge { id: EdgeId },
    UpdateEdge { id: EdgeId, mode: EdgeMode },
    DeleteEdge { id: EdgeId },
    CreateGroup(NewGroup),
    DeleteGroup { id: GroupId },
    UpdateGroup { id: GroupId, props: GroupPatch },
    AddNodeToGroup { group_id: GroupId, node_id: NodeId },
    RemoveNodeFromGroup { group_id: GroupId, node_id: NodeId },
    Select { ids: Vec<NodeId> },
    Deselect,
    ShowEditBar { id: NodeId },
    HideEditBar,
    ToggleFocus { id: NodeId },
    ToggleLock { id: NodeId },
    SetCamera(Camera),
    SetGrid { style: GridStyle },
    SetSelectMode { on: bool },
    SetGroupDrawMode { on: bool },
    StartPresent { list: Vec<NodeId> },
    NavPresent { idx: i64 },
    EndPresent,
    Reset,
    Restore { data: Snapshot },
    Merge { data: Snapshot },
    /// Remember a node's style in the pin list.
    AddPin { id: NodeId },
    DeletePin { idx: usize },
}

impl Action {
    /// Every wire name `Action` understands.
    pub const KINDS: [&'static str; 34] = [
        "CREATE_NODE",
        "DELETE_NODE",
        "UPDATE_NODE",
        "MOVE_NODE",
        "MOVE_NODE_END",
        "MOVE_NODES",
        "MOVE_NODES_END",
        "CREATE_EDGE",
        "CYCLE_EDGE",
        "UPDATE_EDGE",
        "DELETE_EDGE",
        "CREATE_GROUP",
        "DELETE_GROUP",
        "UPDATE_GROUP",
        "ADD_NODE_TO_GROUP",
        "REMOVE_NODE_FROM_GROUP",
        "SELECT",
        "DESELECT",
        "SHOW_EDIT_BAR",
        "HIDE_EDIT_BAR",
        "TOGGLE_FOCUS",
        "TOGGLE_LOCK",
        "SET_CAMERA",
        "SET_GRID",
        "SET_SELECT_MODE",
        "SET_GROUP_DRAW_MODE",
        "START_PRESENT",
        "NAV_PRESENT",
        "END_PRESENT",
        "RESET",
        "RESTORE",
        "MERGE",
        "ADD_PIN",
        "DELETE_PIN",
    ];

    /// Wire name of this action.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateNode(_) => "CREATE_NODE",
            Self::DeleteNode { .. } => "DELETE_NODE",
            Self::UpdateNode { .. } => "UPDATE_NODE",
            Self::MoveNode { .. } => "MOVE_NODE",
            Self::MoveNodeEnd { .. } => "MOVE_NODE_END",
            Self::MoveNodes { .. } => "MOVE_NODES",
            Self::MoveNodesEnd => "MOVE_NODES_END",
            Self::CreateEdge { .. } => "CREATE_EDGE",
            Self::CycleEdge { .. } => "CYCLE_EDGE",
            Self::UpdateEdge { .. } => "UPDATE_EDGE",
            Self::DeleteEdge { .. } => "DELETE_EDGE",
            Self::CreateGroup(_) => "CREATE_GROUP",
            Self::DeleteGroup { .. } => "DELETE_GROUP",
            Self::UpdateGroup { .. } => "UPDATE_GROUP",
            Self::AddNodeToGroup { .. } => "ADD_NODE_TO_GROUP",
            Self::RemoveNodeFromGroup { .. } => "REMOVE_NODE_FROM_GROUP",
            Self::Select { .. } => "SELECT",
            Self::Deselect => "DESELECT",
            Self::ShowEditBar { .. } => "SHOW_EDIT_BAR",
            Self::HideEditBar => "HIDE_EDIT_BAR",
            Self::ToggleFocus { .. } => "TOGGLE_FOCUS",
            Self::ToggleLock { .. } => "TOGGLE_LOCK",
            Self::SetCamera(_) => "SET_CAMERA",
            Self::SetGrid { .. } => "SET_GRID",
            Self::SetSelectMode { .. } => "SET_SELECT_MODE",
            Self::SetGroupDrawMode { .. } => "SET_GROUP_DRAW_MODE",
            Self::StartPresent { .. } => "START_PRESENT",
            Self::NavPresent { .. } => "NAV_PRESENT",
            Self::EndPresent => "END_PRESENT",
            Self::Reset => "RESET",
            Self::Restore { .. } => "RESTORE",
            Self::Merge { .. } => "MERGE",
            Self::AddPin { .. } => "ADD_PIN",
            Self::DeletePin { .. } => "DELETE_PIN",
        }
    }

    /// Decode a string-keyed wire action.
    ///
    /// # Errors
    ///
    /// Returns `MissingKind` without a string `type`, `UnknownAction` for a
    /// name outside [`Action::KINDS`], and `Malformed` when the payload does
    /// not fit the named action.
    pub fn from_wire(mut raw: serde_json::Value) -> Result<Self, WireError> {
        let kind = raw
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(WireError::MissingKind)?
            .to_owned();
        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(WireError::UnknownAction(kind));
        }
        // MOVE_NODE_END is sent both bare and with `{id}`.
        if kind == "MOVE_NODE_END"
            && let Some(obj) = raw.as_object_mut()
            && obj.get("payload").is_none_or(serde_json::Value::is_null)
        {
            obj.insert("payload".to_owned(), serde_json::Value::Object(serde_json::Map::new()));
        }
        serde_json::from_value(raw).map_err(|source| WireError::Malformed { kind, source })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("action has no `type` field")]
    MissingKind,
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// RESULTS AND EFFECTS
// =============================================================================

/// Entity returned by a creating action.
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    Node(Node),
    Edge(Edge),
    Group(Group),
}

impl Created {
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Node(n) => Some(n.id),
            _ => None,
        }
    }
}

/// Advisory message for the user. Never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Undone,
    Redone,
    NothingToUndo,
    NothingToRedo,
    Merged,
    Pinned,
}

/// Signals for the host to process after an action or input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Document, UI, camera, or previews changed.
    RenderNeeded,
    Notice(Notice),
    /// The edit affordance opened on a node.
    EditBarShown(NodeId),
    EditBarHidden,
    /// Selection-dependent panels should close.
    PanelsHidden,
    /// A group area was tapped.
    GroupSummary(GroupId),
    /// Presentation wants the camera to fly to a node.
    FlyTo(NodeId),
    /// A fly-to animation finished (or had nothing to fly to).
    FlyFinished(NodeId),
}

// =============================================================================
// STORE
// =============================================================================

/// Document, UI state, camera, and history behind one mutation gateway.
#[derive(Debug, Clone)]
pub struct Store {
    doc: DocStore,
    ui: UiState,
    camera: Camera,
    history: History,
    pins: Vec<PinStyle>,
    effects: Vec<Effect>,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_history_limits(HistoryLimits::default())
    }
}

impl Store {
    /// An empty store whose history holds the empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_history_limits(limits: HistoryLimits) -> Self {
        let mut store = Self {
            doc: DocStore::new(),
            ui: UiState::default(),
            camera: Camera::default(),
            history: History::with_limits(limits),
            pins: Vec::new(),
            effects: Vec::new(),
        };
        store.snapshot();
        store
    }

    // --- Queries ---

    #[must_use]
    pub fn doc(&self) -> &DocStore {
        &self.doc
    }

    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Saved node styles, oldest first.
    #[must_use]
    pub fn pins(&self) -> &[PinStyle] {
        &self.pins
    }

    /// Drain the effects accumulated since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // --- Dispatch ---

    /// Decode and apply a string-keyed action. Unknown or malformed actions
    /// are logged and change nothing.
    ///
    /// # Errors
    ///
    /// Returns the decode failure after logging it.
    pub fn dispatch_wire(&mut self, raw: serde_json::Value) -> Result<Option<Created>, WireError> {
        match Action::from_wire(raw) {
            Ok(action) => Ok(self.dispatch(action)),
            Err(e) => {
                warn!(error = %e, "dispatch rejected action");
                Err(e)
            }
        }
    }

    /// Apply one action. Returns the created entity for creating actions.
    pub fn dispatch(&mut self, action: Action) -> Option<Created> {
        debug!(action = action.kind(), "dispatch");
        match action {
            // ── Nodes ──
            Action::CreateNode(new) => Some(Created::Node(self.create_node(new))),
            Action::DeleteNode { id } => {
                if self.doc.node(id).is_none_or(|n| n.locked) {
                    return None;
                }
                self.doc.remove_node(id);
                self.ui.forget_node(id);
                self.commit();
                None
            }
            Action::UpdateNode { id, props } => {
                if self.doc.patch_node(id, &props) {
                    self.commit();
                }
                None
            }
            Action::MoveNode { id, x, y } => {
                if self.move_unlocked(id, x, y) {
                    self.render();
                }
                None
            }
            Action::MoveNodes { moves } => {
                let mut any = false;
                for m in moves {
                    any |= self.move_unlocked(m.id, m.x, m.y);
                }
                if any {
                    self.render();
                }
                None
            }
            Action::MoveNodeEnd { .. } | Action::MoveNodesEnd => {
                // A drag that moved nothing (locked nodes) is not an undo step.
                self.snapshot_if_changed();
                None
            }

            // ── Edges ──
            Action::CreateEdge { from, to } => self.create_edge(from, to).map(Created::Edge),
            Action::CycleEdge { id } => {
                self.cycle_edge(id);
                None
            }
            Action::UpdateEdge { id, mode } => {
                if let Some(edge) = self.doc.edge_mut(id) {
                    edge.mode = mode;
                    self.commit();
                }
                None
            }
            Action::DeleteEdge { id } => {
                if self.doc.remove_edge(id).is_some() {
                    self.commit();
                }
                None
            }

            // ── Groups ──
            Action::CreateGroup(new) => self.create_group(new).map(Created::Group),
            Action::DeleteGroup { id } => {
                if self.doc.remove_group(id).is_some() {
                    self.commit();
                }
                None
            }
            Action::UpdateGroup { id, props } => {
                if self.doc.patch_group(id, &props) {
                    self.commit();
                }
                None
            }
            Action::AddNodeToGroup { group_id, node_id } => {
                if self.doc.node(node_id).is_some()
                    && self.doc.group_mut(group_id).is_some_and(|g| g.push_member(node_id))
                {
                    self.commit();
                }
                None
            }
            Action::RemoveNodeFromGroup { group_id, node_id } => {
                if self.doc.group_mut(group_id).is_some_and(|g| g.remove_member(node_id)) {
                    self.commit();
                }
                None
            }

            // ── Selection ──
            Action::Select { ids } => {
                let mut selected: Vec<NodeId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if self.doc.node(id).is_some() && !selected.contains(&id) {
                        selected.push(id);
                    }
                }
                self.ui.selected_ids = selected;
                self.ui.focus_id = None;
                self.ui.edit_target = None;
                self.effects.push(Effect::EditBarHidden);
                self.snapshot_if_changed();
                self.render();
                None
            }
            Action::Deselect => {
                self.ui.clear_selection();
                self.effects.push(Effect::EditBarHidden);
                self.effects.push(Effect::PanelsHidden);
                self.snapshot_if_changed();
                self.render();
                None
            }
            Action::ShowEditBar { id } => {
                if self.doc.node(id).is_some() {
                    self.ui.edit_target = Some(id);
                    self.effects.push(Effect::EditBarShown(id));
                    self.render();
                }
                None
            }
            Action::HideEditBar => {
                self.ui.edit_target = None;
                self.effects.push(Effect::EditBarHidden);
                self.render();
                None
            }
            Action::ToggleFocus { id } => {
                if self.ui.focus_id == Some(id) {
                    self.ui.focus_id = None;
                } else if self.doc.node(id).is_some() {
                    self.ui.focus_id = Some(id);
                }
                self.render();
                None
            }
            Action::ToggleLock { id } => {
                if let Some(node) = self.doc.node_mut(id) {
                    node.locked = !node.locked;
                    self.commit();
                }
                None
            }

            // ── Camera and modes ──
            Action::SetCamera(camera) => {
                self.camera = camera.clamped();
                self.render();
                None
            }
            Action::SetGrid { style } => {
                self.ui.grid = style;
                self.render();
                None
            }
            Action::SetSelectMode { on } => {
                self.ui.select_mode = on;
                self.render();
                None
            }
            Action::SetGroupDrawMode { on } => {
                self.ui.group_draw_mode = on;
                self.render();
                None
            }

            // ── Presentation ──
            Action::StartPresent { list } => {
                let Some(&first) = list.first() else {
                    return None;
                };
                self.ui.present_mode = true;
                self.ui.present_list = list;
                self.ui.present_idx = 0;
                self.effects.push(Effect::FlyTo(first));
                self.render();
                None
            }
            Action::NavPresent { idx } => {
                self.nav_present(idx);
                None
            }
            Action::EndPresent => {
                self.ui.present_mode = false;
                self.ui.selected_ids.clear();
                self.effects.push(Effect::PanelsHidden);
                self.render();
                None
            }

            // ── Whole document ──
            Action::Reset => {
                info!("reset");
                self.doc.clear();
                self.ui.clear_selection();
                self.ui.present_mode = false;
                self.history.clear();
                self.commit();
                None
            }
            Action::Restore { data } => {
                info!(nodes = data.nodes.len(), edges = data.edges.len(), groups = data.groups.len(), "restore");
                self.doc.load_snapshot(data);
                self.ui.clear_selection();
                self.history.clear();
                self.commit();
                None
            }
            Action::Merge { data } => {
                info!(nodes = data.nodes.len(), edges = data.edges.len(), groups = data.groups.len(), "merge");
                self.doc.merge_snapshot(data);
                self.effects.push(Effect::Notice(Notice::Merged));
                self.commit();
                None
            }

            // ── Pins ──
            Action::AddPin { id } => {
                if let Some(node) = self.doc.node(id) {
                    self.pins.push(PinStyle::of(node));
                    self.effects.push(Effect::Notice(Notice::Pinned));
                }
                None
            }
            Action::DeletePin { idx } => {
                if idx < self.pins.len() {
                    self.pins.remove(idx);
                }
                None
            }
        }
    }

    // --- History ---

    /// Step back one snapshot. Clears selection, focus, and edit target.
    /// Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        let result = self.history.undo();
        self.restore_from(result, Notice::Undone, Notice::NothingToUndo)
    }

    /// Step forward one snapshot. Clears selection, focus, and edit target.
    /// Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        let result = self.history.redo();
        self.restore_from(result, Notice::Redone, Notice::NothingToRedo)
    }

    fn restore_from(&mut self, result: Result<Snapshot, HistoryError>, done: Notice, empty: Notice) -> bool {
        match result {
            Ok(snap) => {
                self.doc.load_snapshot(snap);
                self.ui.clear_selection();
                self.effects.push(Effect::EditBarHidden);
                self.effects.push(Effect::Notice(done));
                self.render();
                true
            }
            Err(HistoryError::NothingToUndo | HistoryError::NothingToRedo) => {
                self.effects.push(Effect::Notice(empty));
                false
            }
            Err(e) => {
                warn!(error = %e, "history entry could not be restored");
                false
            }
        }
    }

    // --- Helpers ---

    fn create_node(&mut self, new: NewNode) -> Node {
        let node = self
            .doc
            .insert_node_with(|id| Node {
                id,
                x: new.x,
                y: new.y,
                shape: new.shape.unwrap_or_default(),
                color: new.color.unwrap_or_else(|| NODE_COLORS[0].to_owned()),
                size: new.size.unwrap_or_default(),
                border: new.border.unwrap_or_default(),
                label: new.label.unwrap_or_default(),
                note: new.note.unwrap_or_default(),
                locked: false,
            })
            .clone();
        if let Some(gid) = new.group_id
            && let Some(group) = self.doc.group_mut(gid)
        {
            group.push_member(node.id);
        }
        self.commit();
        node
    }

    fn move_unlocked(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        match self.doc.node_mut(id) {
            Some(node) if !node.locked => {
                node.x = x;
                node.y = y;
                true
            }
            _ => false,
        }
    }

    fn create_edge(&mut self, from: NodeId, to: NodeId) -> Option<Edge> {
        if self.doc.node(from).is_none() || self.doc.node(to).is_none() || self.doc.edge_exists(from, to) {
            return None;
        }
        let edge = self.doc.insert_edge(from, to, EdgeMode::Fwd).clone();
        self.commit();
        Some(edge)
    }

    /// Self-loops: fwd → none → deleted. Others: fwd → bwd → none → deleted.
    fn cycle_edge(&mut self, id: EdgeId) {
        let Some(edge) = self.doc.edge_mut(id) else {
            return;
        };
        let next = match (edge.is_self_loop(), edge.mode) {
            (false, EdgeMode::Fwd) => Some(EdgeMode::Bwd),
            (true, EdgeMode::Fwd) | (false, EdgeMode::Bwd) => Some(EdgeMode::Undirected),
            (true, EdgeMode::Bwd) | (_, EdgeMode::Undirected) => None,
        };
        match next {
            Some(mode) => edge.mode = mode,
            None => {
                self.doc.remove_edge(id);
            }
        }
        self.commit();
    }

    fn create_group(&mut self, new: NewGroup) -> Option<Group> {
        let mut members: Vec<NodeId> = Vec::with_capacity(new.node_ids.len());
        for id in new.node_ids {
            if self.doc.node(id).is_some() && !members.contains(&id) {
                members.push(id);
            }
        }
        if members.is_empty() && new.bounds.is_none() {
            return None;
        }
        let order = members.iter().enumerate().map(|(rank, id)| (*id, rank)).collect();
        let group = self
            .doc
            .insert_group_with(|id| Group {
                id,
                name: new.name.unwrap_or_else(|| DEFAULT_GROUP_NAME.to_owned()),
                color: new.color.unwrap_or_else(|| GROUP_COLORS[0].to_owned()),
                node_ids: members,
                order,
                bounds: new.bounds,
            })
            .clone();
        self.commit();
        Some(group)
    }

    fn nav_present(&mut self, idx: i64) {
        let len = self.ui.present_list.len();
        if !self.ui.present_mode || len == 0 {
            return;
        }
        let max = i64::try_from(len - 1).unwrap_or(i64::MAX);
        let clamped = usize::try_from(idx.clamp(0, max)).unwrap_or(0);
        self.ui.present_idx = clamped;
        let Some(&id) = self.ui.present_list.get(clamped) else {
            return;
        };
        self.ui.selected_ids = vec![id];
        self.effects.push(Effect::FlyTo(id));
        self.render();
    }

    /// Record a snapshot and request a render.
    fn commit(&mut self) {
        self.snapshot();
        self.render();
    }

    fn snapshot(&mut self) {
        if let Err(e) = self.history.record(&self.doc.to_snapshot()) {
            error!(error = %e, "history snapshot failed");
        }
    }

    /// Record only if the document differs from the current entry.
    fn snapshot_if_changed(&mut self) {
        if let Err(e) = self.history.record_if_changed(&self.doc.to_snapshot()) {
            error!(error = %e, "history snapshot failed");
        }
    }

    fn render(&mut self) {
        if !self.effects.contains(&Effect::RenderNeeded) {
            self.effects.push(Effect::RenderNeeded);
        }
    }
}
