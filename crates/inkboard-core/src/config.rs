//! Session configuration.

use crate::shapes::{FontSpec, SerializableColor};
use crate::tools::ToolMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default stroke color (`#df4b26`).
pub const DEFAULT_COLOR: &str = "#df4b26";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid width range: {min}..={max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Initial toolbar state and text settings for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub initial_mode: ToolMode,
    /// Hex color string, as a color picker yields it.
    pub color: String,
    pub pen_width: f64,
    pub shape_stroke_width: f64,
    pub min_width: f64,
    pub max_width: f64,
    /// Size the text overlay is measured at. Committed labels are always 20px.
    pub text_font_size: f64,
    pub text_font_family: String,
    /// Added to the measured text width of the overlay.
    pub text_box_padding: f64,
    /// Report selection boxes with non-negative extents.
    pub normalize_bounding_boxes: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_mode: ToolMode::Pen,
            color: DEFAULT_COLOR.to_string(),
            pen_width: 5.0,
            shape_stroke_width: 2.0,
            min_width: 1.0,
            max_width: 10.0,
            text_font_size: 20.0,
            text_font_family: "Arial".to_string(),
            text_box_padding: 10.0,
            normalize_bounding_boxes: false,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        config.validate()
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Check the width range and color, clamping widths into range.
    pub fn validate(mut self) -> ConfigResult<Self> {
        if !(self.min_width.is_finite() && self.max_width.is_finite())
            || self.min_width > self.max_width
        {
            return Err(ConfigError::InvalidRange {
                min: self.min_width,
                max: self.max_width,
            });
        }
        if SerializableColor::from_hex(&self.color).is_none() {
            return Err(ConfigError::InvalidColor(self.color));
        }
        self.pen_width = self.clamp_width(self.pen_width);
        self.shape_stroke_width = self.clamp_width(self.shape_stroke_width);
        Ok(self)
    }

    /// The configured width range, or the default one if it is inverted or not finite.
    pub fn width_range(&self) -> (f64, f64) {
        if self.min_width.is_finite()
            && self.max_width.is_finite()
            && self.min_width <= self.max_width
        {
            return (self.min_width, self.max_width);
        }
        let defaults = Self::default();
        (defaults.min_width, defaults.max_width)
    }

    /// Clamp a slider value into the width range.
    pub fn clamp_width(&self, width: f64) -> f64 {
        let (min, max) = self.width_range();
        if width.is_nan() {
            return min;
        }
        width.clamp(min, max)
    }

    /// Parsed initial color, falling back to the default.
    pub fn initial_color(&self) -> SerializableColor {
        SerializableColor::from_hex(&self.color)
            .or_else(|| SerializableColor::from_hex(DEFAULT_COLOR))
            .unwrap_or_else(SerializableColor::black)
    }

    /// Font used to measure the text overlay.
    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.text_font_family.clone(), self.text_font_size)
    }
}
