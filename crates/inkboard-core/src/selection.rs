//! Selection highlighting and drag commits.

use crate::canvas::EntityStore;
use crate::shapes::{Entity, EntityId, EntityKind, EntityTrait, Shape, ShapeGeometry, Stroke, TextLabel};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned box used to highlight the selected entity.
///
/// Width and height may be negative for rectangles drawn up or left of
/// their anchor, unless normalization is requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The same box with non-negative extents.
    pub fn normalized(&self) -> Self {
        Self::from(self.to_rect())
    }

    /// Convert to a `kurbo` rect (always ordered).
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        )
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

/// Min/max box over a flattened `[x0, y0, ...]` sequence.
pub fn points_bounds(points: &[f64]) -> Option<BoundingBox> {
    let mut pairs = points.chunks_exact(2);
    let first = pairs.next()?;
    let (mut min_x, mut min_y) = (first[0], first[1]);
    let (mut max_x, mut max_y) = (min_x, min_y);
    for pair in pairs {
        min_x = min_x.min(pair[0]);
        max_x = max_x.max(pair[0]);
        min_y = min_y.min(pair[1]);
        max_y = max_y.max(pair[1]);
    }
    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Compute the highlight box for an entity.
///
/// Point-based entities use the extent of their points; rectangles use the
/// anchor and signed size; circles use the anchor as center. Text labels and
/// shapes with a zero extent get no box.
pub fn bounding_box(entity: &Entity, normalize: bool) -> Option<BoundingBox> {
    let bbox = match entity {
        Entity::Stroke(stroke) => stroke.points().and_then(points_bounds),
        Entity::Shape(shape) => shape_bounds(shape),
        Entity::Text(_) => None,
    }?;
    Some(if normalize { bbox.normalized() } else { bbox })
}

fn shape_bounds(shape: &Shape) -> Option<BoundingBox> {
    match shape.geometry() {
        ShapeGeometry::Triangle { points } => points_bounds(points),
        &ShapeGeometry::Rect { width, height } if width != 0.0 && height != 0.0 => Some(
            BoundingBox::new(shape.anchor.x, shape.anchor.y, width, height),
        ),
        &ShapeGeometry::Circle { radius } if radius != 0.0 => Some(BoundingBox::new(
            shape.anchor.x - radius,
            shape.anchor.y - radius,
            radius * 2.0,
            radius * 2.0,
        )),
        _ => None,
    }
}

/// Current selection: the picked entity and its highlight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub selected_id: Option<EntityId>,
    pub bounding_box: Option<BoundingBox>,
}

impl Selection {
    /// Select an entity and compute its box.
    pub fn select(&mut self, entity: &Entity, normalize: bool) {
        self.selected_id = Some(entity.id());
        self.bounding_box = bounding_box(entity, normalize);
    }

    pub fn clear(&mut self) {
        self.selected_id = None;
        self.bounding_box = None;
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected_id == Some(id)
    }
}

/// Final geometry the render surface reports at the end of a drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragGeometry {
    /// Final point sequence of a dragged stroke.
    Points { points: Vec<f64> },
    /// Final anchor/top-left position of a dragged shape or text label.
    Position { x: f64, y: f64 },
}

impl DragGeometry {
    pub fn position(point: Point) -> Self {
        DragGeometry::Position {
            x: point.x,
            y: point.y,
        }
    }
}

/// Write the dragged geometry of `id` back into the store.
///
/// Strokes take the reported points, shapes and text labels take the
/// reported position with their size untouched. Unknown ids and geometry
/// that doesn't fit the entity are ignored. Returns whether anything changed.
pub fn commit_drag(store: &mut EntityStore, id: EntityId, geometry: &DragGeometry) -> bool {
    let Some(kind) = store.kind_of(id) else {
        log::debug!("Drag ended on unknown entity {}", id);
        return false;
    };
    match (kind, geometry) {
        (EntityKind::Stroke, DragGeometry::Points { points }) => {
            let mut accepted = false;
            let updated = store.update_by_id::<Stroke>(id, |stroke| {
                match stroke.with_points(points.clone()) {
                    Some(moved) => {
                        accepted = true;
                        moved
                    }
                    None => stroke.clone(),
                }
            });
            updated && accepted
        }
        (EntityKind::Shape, &DragGeometry::Position { x, y }) => {
            store.update_by_id::<Shape>(id, |shape| shape.with_position(Point::new(x, y)))
        }
        (EntityKind::Text, &DragGeometry::Position { x, y }) => {
            store.update_by_id::<TextLabel>(id, |label| label.with_position(Point::new(x, y)))
        }
        (kind, geometry) => {
            log::debug!("Ignoring {:?} drag geometry for {:?} {}", geometry, kind, id);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SerializableColor, ShapeKind};

    fn sized(kind: ShapeKind, anchor: Point, to: Point) -> Shape {
        let mut shape = Shape::new(kind, anchor, SerializableColor::black(), 2.0);
        shape.resize_to(anchor, to);
        shape
    }

    #[test]
    fn test_points_bounds() {
        let bbox = points_bounds(&[0.0, 10.0, 30.0, -5.0, 12.0, 40.0]);
        assert_eq!(bbox, Some(BoundingBox::new(0.0, -5.0, 30.0, 45.0)));
        assert!(points_bounds(&[]).is_none());
    }

    #[test]
    fn test_circle_bounds() {
        let shape = sized(ShapeKind::Circle, Point::new(50.0, 60.0), Point::new(53.0, 64.0));
        let bbox = bounding_box(&Entity::Shape(shape), false);
        assert_eq!(bbox, Some(BoundingBox::new(45.0, 55.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rectangle_bounds_keep_sign() {
        let shape = sized(ShapeKind::Rectangle, Point::new(100.0, 100.0), Point::new(80.0, 70.0));
        let entity = Entity::Shape(shape);
        assert_eq!(
            bounding_box(&entity, false),
            Some(BoundingBox::new(100.0, 100.0, -20.0, -30.0))
        );
        assert_eq!(
            bounding_box(&entity, true),
            Some(BoundingBox::new(80.0, 70.0, 20.0, 30.0))
        );
    }

    #[test]
    fn test_triangle_bounds_use_points() {
        let shape = sized(ShapeKind::Triangle, Point::new(10.0, 50.0), Point::new(30.0, 70.0));
        let bbox = bounding_box(&Entity::Shape(shape), false);
        assert_eq!(bbox, Some(BoundingBox::new(10.0, 30.0, 20.0, 40.0)));
    }

    #[test]
    fn test_degenerate_shapes_have_no_box() {
        let fresh_rect = Shape::new(
            ShapeKind::Rectangle,
            Point::ZERO,
            SerializableColor::black(),
            2.0,
        );
        assert!(bounding_box(&Entity::Shape(fresh_rect), false).is_none());

        let flat = sized(ShapeKind::Rectangle, Point::ZERO, Point::new(10.0, 0.0));
        assert!(bounding_box(&Entity::Shape(flat), false).is_none());

        let dot = sized(ShapeKind::Circle, Point::ZERO, Point::ZERO);
        assert!(bounding_box(&Entity::Shape(dot), false).is_none());
    }

    #[test]
    fn test_single_point_stroke_box() {
        let stroke = Stroke::new(Point::new(4.0, 5.0), SerializableColor::black(), 5.0);
        let bbox = bounding_box(&Entity::Stroke(stroke), false);
        assert_eq!(bbox, Some(BoundingBox::new(4.0, 5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_text_has_no_box() {
        let label = TextLabel::new(Point::ZERO, "hi", 20.0, SerializableColor::black()).unwrap();
        let mut selection = Selection::default();
        selection.select(&Entity::Text(label.clone()), false);
        assert!(selection.is_selected(label.id()));
        assert!(selection.bounding_box.is_none());
    }

    #[test]
    fn test_commit_drag_on_shape_keeps_size() {
        let mut store = EntityStore::new();
        let shape = sized(ShapeKind::Rectangle, Point::new(1.0, 2.0), Point::new(11.0, 22.0));
        let before = *shape.geometry();
        let id = store.add_shape(shape);

        assert!(commit_drag(&mut store, id, &DragGeometry::position(Point::new(50.0, 60.0))));
        let moved = store.get::<Shape>(id).unwrap();
        assert_eq!(moved.anchor, Point::new(50.0, 60.0));
        assert_eq!(*moved.geometry(), before);
    }

    #[test]
    fn test_commit_drag_on_stroke_replaces_points() {
        let mut store = EntityStore::new();
        let id = store.add_stroke(Stroke::new(Point::ZERO, SerializableColor::black(), 5.0));
        let geometry = DragGeometry::Points {
            points: vec![5.0, 5.0],
        };
        assert!(commit_drag(&mut store, id, &geometry));
        assert_eq!(
            store.get::<Stroke>(id).and_then(|s| s.first_point()),
            Some(Point::new(5.0, 5.0))
        );
    }

    #[test]
    fn test_commit_drag_mismatch_is_noop() {
        let mut store = EntityStore::new();
        let id = store.add_stroke(Stroke::new(Point::ZERO, SerializableColor::black(), 5.0));
        assert!(!commit_drag(&mut store, id, &DragGeometry::position(Point::new(1.0, 1.0))));
        let odd = DragGeometry::Points {
            points: vec![1.0, 2.0, 3.0],
        };
        assert!(!commit_drag(&mut store, id, &odd));
        assert!(!commit_drag(&mut store, uuid::Uuid::new_v4(), &odd));
    }
}
