//! Inkboard Application
//!
//! Headless shell around an Inkboard session: replays recorded events,
//! rasterizes and exports the scene.

mod app;
mod script;

pub use app::{App, AppConfig};
pub use script::{EntityRef, ReplayScript, ScriptError, ScriptStep, apply_step};
