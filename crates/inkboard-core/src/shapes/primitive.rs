//! Primitive shapes: rectangle, circle and triangle.
//!
//! A shape is anchored at the pointer-down position of the gesture that
//! created it and sized from the current pointer position on every move.

use super::{EntityId, EntityKind, EntityTrait, SerializableColor, new_entity_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// The primitive a shape gesture draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
}

/// Size of a shape. The variant always matches the shape's [`ShapeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    /// Signed extents from the anchor. Negative values are kept as-is.
    Rect { width: f64, height: f64 },
    Circle { radius: f64 },
    /// Closed polygon as `[x1, y1, x2, y2, x3, y3]`.
    Triangle { points: [f64; 6] },
}

impl ShapeGeometry {
    /// Size a shape of `kind` for a drag from `start` to `pos`.
    pub fn from_drag(kind: ShapeKind, start: Point, pos: Point) -> Self {
        match kind {
            ShapeKind::Rectangle => Self::rectangle(start, pos),
            ShapeKind::Circle => Self::circle(start, pos),
            ShapeKind::Triangle => Self::triangle(start, pos),
        }
    }

    /// Signed width and height of the drag vector.
    pub fn rectangle(start: Point, pos: Point) -> Self {
        ShapeGeometry::Rect {
            width: pos.x - start.x,
            height: pos.y - start.y,
        }
    }

    /// Radius is the euclidean length of the drag vector.
    pub fn circle(start: Point, pos: Point) -> Self {
        let radius = ((pos.x - start.x).powi(2) + (pos.y - start.y).powi(2)).sqrt();
        ShapeGeometry::Circle { radius }
    }

    /// Isosceles triangle: the drag vector is one side and the apex sits above
    /// the midpoint, mirrored vertically by the drag's vertical offset.
    pub fn triangle(start: Point, pos: Point) -> Self {
        let (x1, y1) = (start.x, start.y);
        let (x2, y2) = (pos.x, pos.y);
        let x3 = (x1 + x2) / 2.0;
        let y3 = y1 - (y2 - y1);
        ShapeGeometry::Triangle {
            points: [x1, y1, x2, y2, x3, y3],
        }
    }

    /// The kind this geometry belongs to.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Rect { .. } => ShapeKind::Rectangle,
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Triangle { .. } => ShapeKind::Triangle,
        }
    }
}

/// A primitive shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: EntityId,
    pub kind: ShapeKind,
    /// Pointer-down position of the creating gesture.
    pub anchor: Point,
    pub color: SerializableColor,
    pub stroke_width: f64,
    /// Zero-size until the first pointer move resizes the shape.
    geometry: ShapeGeometry,
}

impl Shape {
    /// Create a zero-size shape at `anchor`.
    pub fn new(
        kind: ShapeKind,
        anchor: Point,
        color: SerializableColor,
        stroke_width: f64,
    ) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            anchor,
            color,
            stroke_width,
            geometry: ShapeGeometry::from_drag(kind, anchor, anchor),
        }
    }

    /// Resize for a drag from the anchor to `pos`.
    pub(crate) fn resize_to(&mut self, start: Point, pos: Point) {
        self.geometry = ShapeGeometry::from_drag(self.kind, start, pos);
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn width(&self) -> Option<f64> {
        match self.geometry {
            ShapeGeometry::Rect { width, .. } => Some(width),
            _ => None,
        }
    }

    pub fn height(&self) -> Option<f64> {
        match self.geometry {
            ShapeGeometry::Rect { height, .. } => Some(height),
            _ => None,
        }
    }

    pub fn radius(&self) -> Option<f64> {
        match self.geometry {
            ShapeGeometry::Circle { radius } => Some(radius),
            _ => None,
        }
    }

    /// A copy of this shape whose anchor is moved to `position`.
    ///
    /// Rectangle and circle extents are untouched. Triangle vertices are
    /// absolute, so they follow the anchor.
    pub fn with_position(&self, position: Point) -> Self {
        Self {
            anchor: position,
            ..self.translated(position - self.anchor)
        }
    }
}

impl EntityTrait for Shape {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Shape
    }

    fn points(&self) -> Option<&[f64]> {
        match &self.geometry {
            ShapeGeometry::Triangle { points } => Some(points),
            _ => None,
        }
    }

    fn color(&self) -> SerializableColor {
        self.color
    }

    fn translated(&self, delta: Vec2) -> Self {
        let geometry = match self.geometry {
            ShapeGeometry::Triangle { points } => {
                let mut moved = points;
                for (i, v) in moved.iter_mut().enumerate() {
                    *v += if i % 2 == 0 { delta.x } else { delta.y };
                }
                ShapeGeometry::Triangle { points: moved }
            }
            other => other,
        };
        Self {
            anchor: self.anchor + delta,
            geometry,
            ..self.clone()
        }
    }
}
