//! Inkboard Core Library
//!
//! Platform-agnostic drawing-session state for the Inkboard whiteboard:
//! entities, tool modes, gestures, selection, drag commits and text entry.

pub mod canvas;
pub mod config;
pub mod input;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod text_overlay;
pub mod tools;

pub use canvas::{EntityStore, SceneSnapshot, StoredEntity};
pub use config::{ConfigError, ConfigResult, SessionConfig};
pub use input::{EntityEvent, PointerEvent, SurfaceEvent};
pub use selection::{BoundingBox, DragGeometry, Selection, bounding_box, commit_drag};
pub use session::{ClickOutcome, Session};
pub use shapes::{
    ApproxTextMeasure, Entity, EntityId, EntityKind, FontSpec, SerializableColor, Shape,
    ShapeGeometry, ShapeKind, Stroke, TextLabel, TextMeasure,
};
pub use text_overlay::{TextEditResult, TextKey, TextOverlay};
pub use tools::{CursorIcon, GestureUpdate, InFlight, ToolManager, ToolMode};
