//! Interaction core for the thought-space diagram editor.
//!
//! The crate owns everything about a diagram that doesn't need a display:
//! the document of nodes, edges, and groups; the single dispatch gateway that
//! mutates it; the undo/redo history; the camera transform; hit-testing; and
//! the gesture state machine that turns raw pointer and touch input into
//! actions. The host is responsible only for feeding input events in,
//! drawing the document, and acting on the returned [`dispatch::Effect`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Gesture state machine, [`engine::EngineCore`] |
//! | [`dispatch`] | Action vocabulary and the [`dispatch::Store`] gateway |
//! | [`doc`] | Nodes, edges, groups, snapshots, and the entity store |
//! | [`history`] | Bounded undo/redo ring of serialized snapshots |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | UI state, gesture state, and input event types |
//! | [`hit`] | Hit-testing against handles, nodes, edges, and groups |
//! | [`fly`] | Eased fly-to camera animation |
//! | [`consts`] | Shared numeric constants (zoom limits, thresholds, palettes) |

pub mod camera;
pub mod consts;
pub mod dispatch;
pub mod doc;
pub mod engine;
pub mod fly;
pub mod hit;
pub mod history;
pub mod input;
