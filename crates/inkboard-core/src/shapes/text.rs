//! Text labels and text measurement.

use super::{EntityId, EntityKind, EntityTrait, SerializableColor, new_entity_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A committed text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub(crate) id: EntityId,
    pub text: String,
    /// Top-left corner of the label.
    pub position: Point,
    /// Font size in pixels.
    pub font_size: f64,
    pub color: SerializableColor,
}

impl TextLabel {
    /// Default font size for committed labels.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Create a label. Returns `None` for empty text.
    pub fn new(
        position: Point,
        text: impl Into<String>,
        font_size: f64,
        color: SerializableColor,
    ) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: new_entity_id(),
            text,
            position,
            font_size,
            color,
        })
    }

    /// A copy of this label moved to `position`.
    pub fn with_position(&self, position: Point) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

impl EntityTrait for TextLabel {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Text
    }

    fn points(&self) -> Option<&[f64]> {
        None
    }

    fn color(&self) -> SerializableColor {
        self.color
    }

    fn translated(&self, delta: Vec2) -> Self {
        self.with_position(self.position + delta)
    }
}

/// Font used to measure text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Size in pixels.
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// CSS shorthand, e.g. `20px Arial`.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size, self.family)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Arial", TextLabel::DEFAULT_FONT_SIZE)
    }
}

/// Measures the rendered pixel width of a string.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64;
}

/// Width estimate from an average glyph advance.
///
/// Used when no real text layout is available (headless sessions, tests).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub char_width_factor: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        // Arial averages a little over half an em per glyph.
        Self {
            char_width_factor: 0.55,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * font.size * self.char_width_factor
    }
}
