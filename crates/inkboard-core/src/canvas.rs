//! Entity store: the three ordered entity collections of a session.

use crate::shapes::{Entity, EntityId, EntityKind, EntityTrait, Shape, Stroke, TextLabel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An entity type held in one of the store's collections.
pub trait StoredEntity: EntityTrait + Clone + Into<Entity> {
    /// Collection the type is stored in.
    const KIND: EntityKind;

    fn collection(store: &EntityStore) -> &Vec<Self>;

    fn collection_mut(store: &mut EntityStore) -> &mut Vec<Self>;
}

impl StoredEntity for Stroke {
    const KIND: EntityKind = EntityKind::Stroke;

    fn collection(store: &EntityStore) -> &Vec<Self> {
        &store.strokes
    }

    fn collection_mut(store: &mut EntityStore) -> &mut Vec<Self> {
        &mut store.strokes
    }
}

impl StoredEntity for Shape {
    const KIND: EntityKind = EntityKind::Shape;

    fn collection(store: &EntityStore) -> &Vec<Self> {
        &store.shapes
    }

    fn collection_mut(store: &mut EntityStore) -> &mut Vec<Self> {
        &mut store.shapes
    }
}

impl StoredEntity for TextLabel {
    const KIND: EntityKind = EntityKind::Text;

    fn collection(store: &EntityStore) -> &Vec<Self> {
        &store.texts
    }

    fn collection_mut(store: &mut EntityStore) -> &mut Vec<Self> {
        &mut store.texts
    }
}

/// The collections as handed to the render surface or serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub strokes: Vec<Stroke>,
    pub shapes: Vec<Shape>,
    pub texts: Vec<TextLabel>,
}

impl SceneSnapshot {
    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Ordered strokes, shapes and text labels, with an id index across all three.
///
/// Records are replaced, never edited in place: every update builds a new
/// record from the old one and swaps it into its slot.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    strokes: Vec<Stroke>,
    shapes: Vec<Shape>,
    texts: Vec<TextLabel>,
    /// Collection and position of every stored entity.
    index: HashMap<EntityId, (EntityKind, usize)>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from serialized collections.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        let mut store = Self {
            strokes: snapshot.strokes,
            shapes: snapshot.shapes,
            texts: snapshot.texts,
            index: HashMap::new(),
        };
        store.reindex_from::<Stroke>(0);
        store.reindex_from::<Shape>(0);
        store.reindex_from::<TextLabel>(0);
        store
    }

    /// Copy the collections out.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            strokes: self.strokes.clone(),
            shapes: self.shapes.clone(),
            texts: self.texts.clone(),
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn texts(&self) -> &[TextLabel] {
        &self.texts
    }

    /// Append a stroke.
    pub fn add_stroke(&mut self, stroke: Stroke) -> EntityId {
        self.push(stroke)
    }

    /// Append a shape.
    pub fn add_shape(&mut self, shape: Shape) -> EntityId {
        self.push(shape)
    }

    /// Append a text label.
    pub fn add_text(&mut self, text: TextLabel) -> EntityId {
        self.push(text)
    }

    /// Append any entity to its collection.
    pub fn add(&mut self, entity: Entity) -> EntityId {
        match entity {
            Entity::Stroke(s) => self.add_stroke(s),
            Entity::Shape(s) => self.add_shape(s),
            Entity::Text(t) => self.add_text(t),
        }
    }

    fn push<T: StoredEntity>(&mut self, entity: T) -> EntityId {
        let id = entity.id();
        if self.index.contains_key(&id) {
            log::warn!("Entity {} already stored, replacing by id", id);
            self.update_by_id::<T>(id, |_| entity);
            return id;
        }
        let items = T::collection_mut(self);
        items.push(entity);
        let position = items.len() - 1;
        self.index.insert(id, (T::KIND, position));
        id
    }

    /// Replace the most recently added element of `T`'s collection.
    ///
    /// The patch must keep the element's id. Returns `false` if the collection
    /// is empty or the patch changed the id.
    pub fn update_last<T: StoredEntity>(&mut self, patch: impl FnOnce(&T) -> T) -> bool {
        let Some(last) = T::collection(self).len().checked_sub(1) else {
            return false;
        };
        self.replace_at::<T>(last, patch)
    }

    /// Replace the element with `id` in `T`'s collection.
    ///
    /// Returns `false` when the id is unknown, belongs to another collection,
    /// or the patch changed the id.
    pub fn update_by_id<T: StoredEntity>(
        &mut self,
        id: EntityId,
        patch: impl FnOnce(&T) -> T,
    ) -> bool {
        match self.index.get(&id) {
            Some(&(kind, position)) if kind == T::KIND => self.replace_at::<T>(position, patch),
            _ => {
                log::debug!("No {:?} with id {} to update", T::KIND, id);
                false
            }
        }
    }

    fn replace_at<T: StoredEntity>(&mut self, position: usize, patch: impl FnOnce(&T) -> T) -> bool {
        let Some(current) = T::collection(self).get(position) else {
            return false;
        };
        let replacement = patch(current);
        if replacement.id() != current.id() {
            log::warn!(
                "Rejected patch that changes id {} to {}",
                current.id(),
                replacement.id()
            );
            return false;
        }
        T::collection_mut(self)[position] = replacement;
        true
    }

    /// Remove the element with `id` from `T`'s collection, keeping order.
    pub fn remove_by_id<T: StoredEntity>(&mut self, id: EntityId) -> Option<T> {
        match self.index.get(&id) {
            Some(&(kind, position)) if kind == T::KIND => {
                self.index.remove(&id);
                let removed = T::collection_mut(self).remove(position);
                self.reindex_from::<T>(position);
                Some(removed)
            }
            _ => None,
        }
    }

    /// Remove an entity from whichever collection holds it.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        match self.kind_of(id)? {
            EntityKind::Stroke => self.remove_by_id::<Stroke>(id).map(Entity::Stroke),
            EntityKind::Shape => self.remove_by_id::<Shape>(id).map(Entity::Shape),
            EntityKind::Text => self.remove_by_id::<TextLabel>(id).map(Entity::Text),
        }
    }

    fn reindex_from<T: StoredEntity>(&mut self, start: usize) {
        let updates: Vec<(EntityId, usize)> = T::collection(self)
            .iter()
            .enumerate()
            .skip(start)
            .map(|(position, e)| (e.id(), position))
            .collect();
        for (id, position) in updates {
            self.index.insert(id, (T::KIND, position));
        }
    }

    /// Which collection holds `id`.
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.index.get(&id).map(|&(kind, _)| kind)
    }

    /// Look up an element of `T`'s collection by id.
    pub fn get<T: StoredEntity>(&self, id: EntityId) -> Option<&T> {
        match self.index.get(&id) {
            Some(&(kind, position)) if kind == T::KIND => T::collection(self).get(position),
            _ => None,
        }
    }

    /// Look up any entity by id (cloned).
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        match self.kind_of(id)? {
            EntityKind::Stroke => self.get::<Stroke>(id).cloned().map(Entity::Stroke),
            EntityKind::Shape => self.get::<Shape>(id).cloned().map(Entity::Shape),
            EntityKind::Text => self.get::<TextLabel>(id).cloned().map(Entity::Text),
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.strokes.len() + self.shapes.len() + self.texts.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All ids in draw order: strokes, then shapes, then text labels.
    pub fn ids(&self) -> Vec<EntityId> {
        self.strokes
            .iter()
            .map(EntityTrait::id)
            .chain(self.shapes.iter().map(EntityTrait::id))
            .chain(self.texts.iter().map(EntityTrait::id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{SerializableColor, ShapeKind};
    use kurbo::{Point, Vec2};

    fn stroke_at(x: f64) -> Stroke {
        Stroke::new(Point::new(x, x), SerializableColor::black(), 5.0)
    }

    fn label(text: &str) -> TextLabel {
        TextLabel::new(Point::ZERO, text, 20.0, SerializableColor::black()).unwrap()
    }

    #[test]
    fn test_store_creation() {
        let store = EntityStore::new();
        assert!(store.is_empty());
        assert!(store.ids().is_empty());
    }

    #[test]
    fn test_add_to_each_collection() {
        let mut store = EntityStore::new();
        let s = store.add_stroke(stroke_at(1.0));
        let r = store.add_shape(Shape::new(
            ShapeKind::Rectangle,
            Point::ZERO,
            SerializableColor::black(),
            2.0,
        ));
        let t = store.add_text(label("hi"));

        assert_eq!(store.len(), 3);
        assert_eq!(store.kind_of(s), Some(EntityKind::Stroke));
        assert_eq!(store.kind_of(r), Some(EntityKind::Shape));
        assert_eq!(store.kind_of(t), Some(EntityKind::Text));
        assert_eq!(store.ids(), vec![s, r, t]);
    }

    #[test]
    fn test_get_checks_collection() {
        let mut store = EntityStore::new();
        let s = store.add_stroke(stroke_at(1.0));
        assert!(store.get::<Stroke>(s).is_some());
        assert!(store.get::<Shape>(s).is_none());
    }

    #[test]
    fn test_update_last_replaces_newest() {
        let mut store = EntityStore::new();
        let first = store.add_stroke(stroke_at(1.0));
        let second = store.add_stroke(stroke_at(2.0));

        assert!(store.update_last::<Stroke>(|s| s.translated(Vec2::new(10.0, 0.0))));
        assert_eq!(
            store.get::<Stroke>(second).and_then(|s| s.first_point()),
            Some(Point::new(12.0, 2.0))
        );
        assert_eq!(
            store.get::<Stroke>(first).and_then(|s| s.first_point()),
            Some(Point::new(1.0, 1.0))
        );
    }

    #[test]
    fn test_update_last_on_empty_collection() {
        let mut store = EntityStore::new();
        assert!(!store.update_last::<Shape>(|s| s.clone()));
    }

    #[test]
    fn test_update_rejects_id_change() {
        let mut store = EntityStore::new();
        let id = store.add_stroke(stroke_at(1.0));
        assert!(!store.update_by_id::<Stroke>(id, |_| stroke_at(9.0)));
        assert_eq!(
            store.get::<Stroke>(id).and_then(|s| s.first_point()),
            Some(Point::new(1.0, 1.0))
        );
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = EntityStore::new();
        store.add_stroke(stroke_at(1.0));
        assert!(!store.update_by_id::<Stroke>(uuid::Uuid::new_v4(), |s| s.clone()));
    }

    #[test]
    fn test_remove_preserves_order_and_index() {
        let mut store = EntityStore::new();
        let a = store.add_stroke(stroke_at(1.0));
        let b = store.add_stroke(stroke_at(2.0));
        let c = store.add_stroke(stroke_at(3.0));

        let removed = store.remove_by_id::<Stroke>(a);
        assert_eq!(removed.map(|s| s.id()), Some(a));
        assert_eq!(store.ids(), vec![b, c]);

        // Index still resolves shifted elements.
        assert_eq!(store.get::<Stroke>(c).map(|s| s.id()), Some(c));
        assert!(store.update_by_id::<Stroke>(c, |s| s.translated(Vec2::new(1.0, 1.0))));
        assert_eq!(
            store.get::<Stroke>(c).and_then(|s| s.first_point()),
            Some(Point::new(4.0, 4.0))
        );
        assert!(!store.contains(a));
    }

    #[test]
    fn test_remove_wrong_collection_is_noop() {
        let mut store = EntityStore::new();
        let t = store.add_text(label("x"));
        assert!(store.remove_by_id::<Stroke>(t).is_none());
        assert_eq!(store.len(), 1);
        assert!(store.remove(t).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_roundtrip_rebuilds_index() {
        let mut store = EntityStore::new();
        let a = store.add_stroke(stroke_at(1.0));
        let t = store.add_text(label("hello"));

        let json = store.snapshot().to_json().unwrap();
        let restored = EntityStore::from_snapshot(SceneSnapshot::from_json(&json).unwrap());
        assert_eq!(restored.ids(), vec![a, t]);
        assert_eq!(restored.get::<TextLabel>(t).map(|l| l.text.as_str()), Some("hello"));
    }
}
