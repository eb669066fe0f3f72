//! Tool mode controller for the whiteboard.
//!
//! The toolbar has four mutually exclusive modes (pen, select, text, erase).
//! When all four are off the session is in [`ToolMode::ShapePick`], the only
//! state in which a shape primitive can be chosen and drawn.

mod gesture;

pub use gesture::{GestureContext, GestureEngine, GestureState, GestureUpdate, InFlight};

use crate::shapes::ShapeKind;
use serde::{Deserialize, Serialize};

/// The active interaction mode. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    /// Freehand drawing.
    #[default]
    Pen,
    /// Click to select, drag to move.
    Select,
    /// Click to place a text overlay.
    Text,
    /// Click an entity to delete it.
    Erase,
    /// None of the exclusive modes is on; shapes can be picked and drawn.
    ShapePick,
}

impl ToolMode {
    /// Cursor shown over the canvas in this mode.
    pub fn cursor(&self) -> CursorIcon {
        match self {
            ToolMode::Pen | ToolMode::ShapePick => CursorIcon::Default,
            ToolMode::Select => CursorIcon::Move,
            ToolMode::Text => CursorIcon::Text,
            ToolMode::Erase => CursorIcon::Eraser,
        }
    }

    /// Whether this is one of the four toolbar toggles.
    pub fn is_exclusive(&self) -> bool {
        !matches!(self, ToolMode::ShapePick)
    }
}

/// Canvas cursor hint for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorIcon {
    Default,
    Move,
    Text,
    Eraser,
}

/// Owns the active mode and the chosen shape primitive.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    mode: ToolMode,
    shape_kind: Option<ShapeKind>,
}

impl ToolManager {
    /// Create a tool manager starting in `mode`.
    pub fn new(mode: ToolMode) -> Self {
        Self {
            mode,
            shape_kind: None,
        }
    }

    /// Currently active mode.
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Chosen shape primitive, if any.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        self.shape_kind
    }

    /// Toggle a toolbar mode and return the resulting mode.
    ///
    /// Turning a mode on turns every other mode off. Toggling the active mode
    /// returns to [`ToolMode::ShapePick`]. Every toggle resets the chosen shape.
    pub fn toggle(&mut self, mode: ToolMode) -> ToolMode {
        let next = if self.mode == mode {
            ToolMode::ShapePick
        } else {
            mode
        };
        log::debug!("Tool mode {:?} -> {:?}", self.mode, next);
        self.mode = next;
        self.shape_kind = None;
        next
    }

    /// Whether the shape picker is enabled.
    pub fn can_pick_shape(&self) -> bool {
        self.mode == ToolMode::ShapePick
    }

    /// Choose the primitive for subsequent shape gestures.
    ///
    /// Returns `false` (and changes nothing) unless the picker is enabled.
    pub fn choose_shape(&mut self, kind: ShapeKind) -> bool {
        if !self.can_pick_shape() {
            log::debug!("Ignoring shape choice {:?} in {:?} mode", kind, self.mode);
            return false;
        }
        self.shape_kind = Some(kind);
        true
    }

    /// Whether strokes and shapes can be dragged.
    pub fn geometry_draggable(&self) -> bool {
        self.mode == ToolMode::Select
    }

    /// Whether the color picker is enabled.
    pub fn can_change_color(&self) -> bool {
        self.mode != ToolMode::Select
    }

    /// Whether the mode is one of the four exclusive modes and is active.
    pub fn is_active(&self, mode: ToolMode) -> bool {
        mode.is_exclusive() && self.mode == mode
    }
}
