//! Events reported by the render surface.
//!
//! Positions are in stage-local coordinates, already transformed by the
//! surface.

use crate::selection::DragGeometry;
use crate::shapes::EntityId;
use crate::text_overlay::TextKey;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => *position,
        }
    }
}

/// Event emitted by a drawn entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityEvent {
    Click { id: EntityId },
    DragStart { id: EntityId },
    DragEnd { id: EntityId, geometry: DragGeometry },
}

/// Anything the surface can report to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurfaceEvent {
    Pointer(PointerEvent),
    Entity(EntityEvent),
    Key(TextKey),
}

impl From<PointerEvent> for SurfaceEvent {
    fn from(event: PointerEvent) -> Self {
        SurfaceEvent::Pointer(event)
    }
}

impl From<EntityEvent> for SurfaceEvent {
    fn from(event: EntityEvent) -> Self {
        SurfaceEvent::Entity(event)
    }
}

impl From<TextKey> for SurfaceEvent {
    fn from(key: TextKey) -> Self {
        SurfaceEvent::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_position() {
        let event = PointerEvent::Move {
            position: Point::new(3.0, 4.0),
        };
        assert_eq!(event.position(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_pointer_event_json() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"type":"down","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(
            event,
            PointerEvent::Down {
                position: Point::new(1.0, 2.0)
            }
        );
    }

    #[test]
    fn test_drag_end_json() {
        let id = uuid::Uuid::new_v4();
        let json = format!(
            r#"{{"type":"drag_end","id":"{id}","geometry":{{"type":"position","x":5.0,"y":6.0}}}}"#
        );
        let event: EntityEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(
            event,
            EntityEvent::DragEnd {
                id,
                geometry: DragGeometry::Position { x: 5.0, y: 6.0 }
            }
        );
    }
}
