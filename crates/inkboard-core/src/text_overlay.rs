//! Live text-entry overlay for text mode.
//!
//! The overlay is opened at a pointer position, follows the pointer while it
//! is held down, and is turned into a [`TextLabel`] when the user confirms.

use crate::shapes::{FontSpec, SerializableColor, TextLabel, TextMeasure};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Keyboard key for text entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "text", rename_all = "snake_case")]
pub enum TextKey {
    Character(String),
    Backspace,
    Enter,
    Escape,
}

/// Result of handling a key.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEditResult {
    /// Buffer changed (or Enter on an empty buffer).
    Handled,
    /// A label was committed and the overlay closed.
    Committed(TextLabel),
    /// Overlay was dismissed without a label.
    Cancelled,
    /// No overlay is open.
    NotHandled,
}

/// In-flight text: where it goes, what has been typed, and how wide it is.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    position: Point,
    buffer: String,
    width: f64,
    font: FontSpec,
    padding: f64,
}

impl TextOverlay {
    /// Open an empty overlay at `position`.
    pub fn open(position: Point, font: FontSpec, padding: f64) -> Self {
        Self {
            position,
            buffer: String::new(),
            width: 0.0,
            font,
            padding,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Display width of the entry box.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    /// Follow the pointer.
    pub fn move_to(&mut self, position: Point, measure: &dyn TextMeasure) {
        self.position = position;
        self.remeasure(measure);
    }

    /// Replace the whole buffer (e.g. from an input element's value).
    pub fn set_text(&mut self, text: impl Into<String>, measure: &dyn TextMeasure) {
        self.buffer = text.into();
        self.remeasure(measure);
    }

    pub fn insert(&mut self, text: &str, measure: &dyn TextMeasure) {
        self.buffer.push_str(text);
        self.remeasure(measure);
    }

    pub fn backspace(&mut self, measure: &dyn TextMeasure) {
        self.buffer.pop();
        self.remeasure(measure);
    }

    fn remeasure(&mut self, measure: &dyn TextMeasure) {
        self.width = measure.measure(&self.buffer, &self.font) + self.padding;
    }

    /// Build the label this overlay would commit. `None` while the buffer is empty.
    pub fn confirm(&self, font_size: f64, color: SerializableColor) -> Option<TextLabel> {
        TextLabel::new(self.position, self.buffer.clone(), font_size, color)
    }
}
