//! Drawable entity definitions for the whiteboard.

mod primitive;
mod stroke;
mod text;

pub use primitive::{Shape, ShapeGeometry, ShapeKind};
pub use stroke::Stroke;
pub use text::{ApproxTextMeasure, FontSpec, TextLabel, TextMeasure};

use kurbo::Vec2;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
                255,
            )),
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Unique identifier for entities.
pub type EntityId = Uuid;

/// Generate a fresh entity identifier.
pub(crate) fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// The three entity collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Stroke,
    Shape,
    Text,
}

/// Shift every pair of a flattened coordinate sequence by `delta`.
pub fn translate_points(coords: &[f64], delta: Vec2) -> Vec<f64> {
    coords
        .iter()
        .enumerate()
        .map(|(i, v)| if i % 2 == 0 { v + delta.x } else { v + delta.y })
        .collect()
}

/// Common behavior of every drawable entity.
pub trait EntityTrait {
    /// Get the unique identifier.
    fn id(&self) -> EntityId;

    /// Which collection the entity belongs to.
    fn kind(&self) -> EntityKind;

    /// The flattened point sequence, for point-based entities.
    fn points(&self) -> Option<&[f64]>;

    /// The entity's color.
    fn color(&self) -> SerializableColor;

    /// A copy of this entity moved by `delta`.
    fn translated(&self, delta: Vec2) -> Self
    where
        Self: Sized;
}

/// Enum wrapper for all entity types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Stroke(Stroke),
    Shape(Shape),
    Text(TextLabel),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Stroke(s) => s.id(),
            Entity::Shape(s) => s.id(),
            Entity::Text(t) => t.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Stroke(s) => s.kind(),
            Entity::Shape(s) => s.kind(),
            Entity::Text(t) => t.kind(),
        }
    }

    pub fn points(&self) -> Option<&[f64]> {
        match self {
            Entity::Stroke(s) => s.points(),
            Entity::Shape(s) => s.points(),
            Entity::Text(t) => t.points(),
        }
    }

    pub fn color(&self) -> SerializableColor {
        match self {
            Entity::Stroke(s) => s.color(),
            Entity::Shape(s) => s.color(),
            Entity::Text(t) => t.color(),
        }
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        match self {
            Entity::Stroke(s) => Entity::Stroke(s.translated(delta)),
            Entity::Shape(s) => Entity::Shape(s.translated(delta)),
            Entity::Text(t) => Entity::Text(t.translated(delta)),
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Entity::Stroke(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Entity::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Entity::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Stroke> for Entity {
    fn from(stroke: Stroke) -> Self {
        Entity::Stroke(stroke)
    }
}

impl From<Shape> for Entity {
    fn from(shape: Shape) -> Self {
        Entity::Shape(shape)
    }
}

impl From<TextLabel> for Entity {
    fn from(text: TextLabel) -> Self {
        Entity::Text(text)
    }
}
