//! Freehand pen stroke.

use super::{EntityId, EntityKind, EntityTrait, SerializableColor, new_entity_id, translate_points};
use crate::tools::ToolMode;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke stored as a flattened `[x0, y0, x1, y1, ...]` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: EntityId,
    /// Mode that produced the stroke.
    pub tool: ToolMode,
    points: Vec<f64>,
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Stroke {
    /// Start a stroke with a single point pair.
    pub fn new(start: Point, color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            id: new_entity_id(),
            tool: ToolMode::Pen,
            points: vec![start.x, start.y],
            color,
            stroke_width,
        }
    }

    /// Append a point while the stroke is being drawn.
    pub(crate) fn push_point(&mut self, point: Point) {
        self.points.push(point.x);
        self.points.push(point.y);
    }

    /// A copy of this stroke with its points replaced.
    ///
    /// Returns `None` when the sequence is empty or has an odd length.
    pub fn with_points(&self, points: Vec<f64>) -> Option<Self> {
        if points.is_empty() || points.len() % 2 != 0 {
            return None;
        }
        Some(Self {
            points,
            ..self.clone()
        })
    }

    /// Number of point pairs.
    pub fn len(&self) -> usize {
        self.points.len() / 2
    }

    /// Strokes always hold at least one point pair.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The first point of the stroke.
    pub fn first_point(&self) -> Option<Point> {
        match self.points.as_slice() {
            [x, y, ..] => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

impl EntityTrait for Stroke {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Stroke
    }

    fn points(&self) -> Option<&[f64]> {
        Some(&self.points)
    }

    fn color(&self) -> SerializableColor {
        self.color
    }

    fn translated(&self, delta: Vec2) -> Self {
        Self {
            points: translate_points(&self.points, delta),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_starts_with_single_pair() {
        let stroke = Stroke::new(Point::new(3.0, 4.0), SerializableColor::black(), 5.0);
        assert_eq!(stroke.len(), 1);
        assert_eq!(stroke.points(), Some(&[3.0, 4.0][..]));
        assert_eq!(stroke.first_point(), Some(Point::new(3.0, 4.0)));
        assert_eq!(stroke.tool, ToolMode::Pen);
    }

    #[test]
    fn test_push_point_grows_by_pairs() {
        let mut stroke = Stroke::new(Point::ZERO, SerializableColor::black(), 5.0);
        stroke.push_point(Point::new(1.0, 2.0));
        stroke.push_point(Point::new(3.0, 4.0));
        assert_eq!(stroke.len(), 3);
        assert_eq!(stroke.points().map(<[f64]>::len), Some(6));
    }

    #[test]
    fn test_with_points_rejects_odd_sequences() {
        let stroke = Stroke::new(Point::ZERO, SerializableColor::black(), 5.0);
        assert!(stroke.with_points(vec![1.0, 2.0, 3.0]).is_none());
        assert!(stroke.with_points(Vec::new()).is_none());

        let moved = stroke.with_points(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(moved.is_some());
        let moved = moved.unwrap();
        assert_eq!(moved.id(), stroke.id());
        assert_eq!(moved.len(), 2);
    }

    #[test]
    fn test_translate_keeps_identity() {
        let mut stroke = Stroke::new(Point::new(0.0, 0.0), SerializableColor::black(), 5.0);
        stroke.push_point(Point::new(10.0, 10.0));
        let moved = stroke.translated(Vec2::new(5.0, -5.0));
        assert_eq!(moved.id(), stroke.id());
        assert_eq!(moved.points(), Some(&[5.0, -5.0, 15.0, 5.0][..]));
    }
}
