//! Pointer gesture engine.
//!
//! The entity under construction lives in a single in-flight slot owned by
//! the engine. It is only handed to the entity store when the gesture ends,
//! so committed entities are never edited while being drawn.

use super::ToolMode;
use crate::shapes::{Entity, SerializableColor, Shape, ShapeKind, Stroke};
use kurbo::Point;

/// Inputs a gesture needs from the session when it starts.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext {
    pub mode: ToolMode,
    pub shape_kind: Option<ShapeKind>,
    pub color: SerializableColor,
    pub pen_width: f64,
    pub shape_stroke_width: f64,
}

/// State of the pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No pointer is down.
    #[default]
    Idle,
    /// Pointer is down.
    Active {
        /// Pointer-down position.
        start: Point,
        /// Latest pointer position.
        current: Point,
        /// Mode the gesture was started in.
        mode: ToolMode,
    },
}

/// The entity being built by the active gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum InFlight {
    Stroke(Stroke),
    Shape(Shape),
}

impl InFlight {
    /// The finished entity.
    pub fn into_entity(self) -> Entity {
        match self {
            InFlight::Stroke(s) => Entity::Stroke(s),
            InFlight::Shape(s) => Entity::Shape(s),
        }
    }
}

/// What a pointer event did, for the session to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    /// Event did not apply.
    Ignored,
    /// In-flight geometry changed (or was created).
    Geometry,
    /// Text overlay should be placed at or follow this position.
    TextAt(Point),
    /// Gesture started without geometry (erase mode, or no shape chosen).
    Tracking,
}

/// Turns pointer-down/move/up into entity geometry.
#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    state: GestureState,
    in_flight: Option<InFlight>,
}

impl GestureEngine {
    /// Create an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::Active { .. })
    }

    /// Pointer-down position of the active gesture.
    pub fn start_pos(&self) -> Option<Point> {
        match self.state {
            GestureState::Active { start, .. } => Some(start),
            GestureState::Idle => None,
        }
    }

    /// The entity under construction, if any.
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    /// Handle pointer-down.
    ///
    /// Select mode never starts a gesture. The caller commits any entity
    /// left over from an unfinished gesture via [`GestureEngine::end`] first.
    pub fn begin(&mut self, point: Point, ctx: &GestureContext) -> GestureUpdate {
        if ctx.mode == ToolMode::Select {
            return GestureUpdate::Ignored;
        }

        self.state = GestureState::Active {
            start: point,
            current: point,
            mode: ctx.mode,
        };

        match ctx.mode {
            ToolMode::Pen => {
                self.in_flight = Some(InFlight::Stroke(Stroke::new(
                    point,
                    ctx.color,
                    ctx.pen_width,
                )));
                GestureUpdate::Geometry
            }
            ToolMode::Text => GestureUpdate::TextAt(point),
            ToolMode::ShapePick => match ctx.shape_kind {
                Some(kind) => {
                    self.in_flight = Some(InFlight::Shape(Shape::new(
                        kind,
                        point,
                        ctx.color,
                        ctx.shape_stroke_width,
                    )));
                    GestureUpdate::Geometry
                }
                None => GestureUpdate::Tracking,
            },
            ToolMode::Erase | ToolMode::Select => GestureUpdate::Tracking,
        }
    }

    /// Handle pointer-move. Moves outside a gesture are ignored.
    pub fn update(&mut self, point: Point) -> GestureUpdate {
        let GestureState::Active {
            start,
            current,
            mode,
        } = &mut self.state
        else {
            log::trace!("Ignoring stray pointer move at {:?}", point);
            return GestureUpdate::Ignored;
        };
        *current = point;

        if *mode == ToolMode::Text {
            return GestureUpdate::TextAt(point);
        }

        match &mut self.in_flight {
            Some(InFlight::Stroke(stroke)) => {
                stroke.push_point(point);
                GestureUpdate::Geometry
            }
            Some(InFlight::Shape(shape)) => {
                shape.resize_to(*start, point);
                GestureUpdate::Geometry
            }
            None => GestureUpdate::Ignored,
        }
    }

    /// Handle pointer-up. Returns the finished entity, if the gesture built one.
    pub fn end(&mut self) -> Option<Entity> {
        self.state = GestureState::Idle;
        self.in_flight.take().map(InFlight::into_entity)
    }
}
