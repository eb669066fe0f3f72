//! Replay scripts: recorded toolbar and surface events as JSON.

use inkboard_core::shapes::{EntityTrait, translate_points};
use inkboard_core::{
    ClickOutcome, DragGeometry, EntityId, EntityKind, GestureUpdate, Session, ShapeKind,
    TextEditResult, TextKey, ToolMode,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Script loading errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Refers to an entity by collection and position, since ids are random.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub index: usize,
}

impl EntityRef {
    /// Resolve to the id currently at this position.
    pub fn resolve(&self, session: &Session) -> Option<EntityId> {
        let store = session.store();
        match self.kind {
            EntityKind::Stroke => store.strokes().get(self.index).map(EntityTrait::id),
            EntityKind::Shape => store.shapes().get(self.index).map(EntityTrait::id),
            EntityKind::Text => store.texts().get(self.index).map(EntityTrait::id),
        }
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    Toggle { mode: ToolMode },
    ChooseShape { shape: ShapeKind },
    SetColor { color: String },
    SetPenWidth { width: f64 },
    SetShapeStrokeWidth { width: f64 },
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    Click { target: EntityRef },
    DragStart { target: EntityRef },
    DragEnd { target: EntityRef, geometry: DragGeometry },
    /// Drag start and end with the geometry a surface would report after
    /// moving the entity by `(dx, dy)`.
    DragBy { target: EntityRef, dx: f64, dy: f64 },
    Key { key: TextKey },
    TextInput { text: String },
}

/// A list of steps replayed in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub steps: Vec<ScriptStep>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(json).map_err(|e| ScriptError::Serialization(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ScriptError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Apply every step to `session`. Returns how many steps took effect.
    pub fn replay(&self, session: &mut Session) -> usize {
        let mut applied = 0;
        for (i, step) in self.steps.iter().enumerate() {
            if apply_step(session, step) {
                applied += 1;
            } else {
                log::debug!("Step {} had no effect: {:?}", i, step);
            }
        }
        applied
    }
}

/// Apply one step. Returns whether it changed anything.
pub fn apply_step(session: &mut Session, step: &ScriptStep) -> bool {
    match step {
        ScriptStep::Toggle { mode } => {
            session.toggle_mode(*mode);
            true
        }
        ScriptStep::ChooseShape { shape } => session.choose_shape(*shape),
        ScriptStep::SetColor { color } => session.set_color_hex(color),
        ScriptStep::SetPenWidth { width } => {
            session.set_pen_width(*width);
            true
        }
        ScriptStep::SetShapeStrokeWidth { width } => {
            session.set_shape_stroke_width(*width);
            true
        }
        ScriptStep::PointerDown { x, y } => {
            session.pointer_down(Point::new(*x, *y)) != GestureUpdate::Ignored
        }
        ScriptStep::PointerMove { x, y } => {
            session.pointer_move(Point::new(*x, *y)) != GestureUpdate::Ignored
        }
        ScriptStep::PointerUp { x, y } => {
            let was_drawing = session.is_drawing();
            session.pointer_up(Point::new(*x, *y));
            was_drawing
        }
        ScriptStep::Click { target } => match target.resolve(session) {
            Some(id) => session.click(id) != ClickOutcome::Missed,
            None => unresolved(target),
        },
        ScriptStep::DragStart { target } => match target.resolve(session) {
            Some(id) => session.drag_start(id),
            None => unresolved(target),
        },
        ScriptStep::DragEnd { target, geometry } => match target.resolve(session) {
            Some(id) => session.drag_end(id, geometry),
            None => unresolved(target),
        },
        ScriptStep::DragBy { target, dx, dy } => {
            let Some(id) = target.resolve(session) else {
                return unresolved(target);
            };
            let Some(geometry) = dragged_geometry(session, id, Vec2::new(*dx, *dy)) else {
                return false;
            };
            session.drag_start(id) && session.drag_end(id, &geometry)
        }
        ScriptStep::Key { key } => {
            session.handle_key(key) != TextEditResult::NotHandled
        }
        ScriptStep::TextInput { text } => session.set_text_input(text),
    }
}

fn unresolved(target: &EntityRef) -> bool {
    log::warn!("No {:?} at index {}", target.kind, target.index);
    false
}

/// Geometry the surface reports after dragging `id` by `delta`.
fn dragged_geometry(session: &Session, id: EntityId, delta: Vec2) -> Option<DragGeometry> {
    let entity = session.store().entity(id)?;
    let geometry = match entity.kind() {
        EntityKind::Stroke => DragGeometry::Points {
            points: translate_points(entity.as_stroke()?.points()?, delta),
        },
        EntityKind::Shape => DragGeometry::position(entity.as_shape()?.anchor + delta),
        EntityKind::Text => DragGeometry::position(entity.as_text()?.position + delta),
    };
    Some(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::{SessionConfig, Stroke};

    const SCRIPT: &str = r##"{
        "steps": [
            {"action": "set_color", "color": "#0000ff"},
            {"action": "pointer_down", "x": 10, "y": 10},
            {"action": "pointer_move", "x": 20, "y": 15},
            {"action": "pointer_move", "x": 30, "y": 5},
            {"action": "pointer_up", "x": 30, "y": 5},
            {"action": "toggle", "mode": "pen"},
            {"action": "choose_shape", "shape": "rectangle"},
            {"action": "pointer_down", "x": 0, "y": 0},
            {"action": "pointer_move", "x": 40, "y": 30},
            {"action": "pointer_up", "x": 40, "y": 30},
            {"action": "toggle", "mode": "select"},
            {"action": "click", "target": {"kind": "stroke", "index": 0}},
            {"action": "drag_by", "target": {"kind": "shape", "index": 0}, "dx": 5, "dy": 5},
            {"action": "toggle", "mode": "text"},
            {"action": "pointer_down", "x": 50, "y": 60},
            {"action": "pointer_up", "x": 50, "y": 60},
            {"action": "key", "key": {"key": "character", "text": "h"}},
            {"action": "key", "key": {"key": "character", "text": "i"}},
            {"action": "key", "key": {"key": "enter"}}
        ]
    }"##;

    #[test]
    fn test_replay_builds_scene() {
        let script = ReplayScript::from_json(SCRIPT).unwrap();
        let mut session = Session::new(SessionConfig::default());
        let applied = script.replay(&mut session);
        assert_eq!(applied, script.steps.len());

        let scene = session.snapshot();
        assert_eq!(scene.strokes.len(), 1);
        assert_eq!(scene.strokes[0].color.to_hex(), "#0000ff");
        assert_eq!(scene.shapes.len(), 1);
        assert_eq!(scene.shapes[0].anchor, Point::new(5.0, 5.0));
        assert_eq!(scene.shapes[0].width(), Some(40.0));
        assert_eq!(scene.texts.len(), 1);
        assert_eq!(scene.texts[0].text, "hi");
    }

    #[test]
    fn test_drag_by_stroke_shifts_points() {
        let mut session = Session::new(SessionConfig {
            initial_mode: ToolMode::Select,
            ..SessionConfig::default()
        });
        session.toggle_mode(ToolMode::Pen);
        session.pointer_down(Point::new(1.0, 2.0));
        session.pointer_move(Point::new(3.0, 4.0));
        session.pointer_up(Point::new(3.0, 4.0));
        session.toggle_mode(ToolMode::Select);

        let target = EntityRef {
            kind: EntityKind::Stroke,
            index: 0,
        };
        assert!(apply_step(
            &mut session,
            &ScriptStep::DragBy {
                target,
                dx: 10.0,
                dy: -1.0
            }
        ));
        let id = target.resolve(&session).unwrap();
        assert_eq!(
            session.store().get::<Stroke>(id).and_then(|s| s.points()),
            Some(&[11.0, 1.0, 13.0, 3.0][..])
        );
    }

    #[test]
    fn test_missing_target_has_no_effect() {
        let mut session = Session::default();
        let step = ScriptStep::Click {
            target: EntityRef {
                kind: EntityKind::Shape,
                index: 3,
            },
        };
        assert!(!apply_step(&mut session, &step));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_bad_script_json() {
        assert!(matches!(
            ReplayScript::from_json(r#"{"steps":[{"action":"fly"}]}"#),
            Err(ScriptError::Serialization(_))
        ));
        assert!(matches!(
            ReplayScript::load("/nonexistent/inkboard/script.json"),
            Err(ScriptError::Io(_))
        ));
    }
}
