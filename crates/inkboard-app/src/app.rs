//! Headless application shell: a session, a raster surface and an exporter.

use crate::script::ReplayScript;
use inkboard_core::{SceneSnapshot, Session, SessionConfig};
use inkboard_render::{
    DrawCommand, ExportFormat, ExportedImage, Exporter, PixelCanvas, RecordingSurface,
    RenderContext, render_frame,
};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub session: SessionConfig,
    pub export_format: ExportFormat,
    /// Directory exported images are written to. No export when unset.
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            session: SessionConfig::default(),
            export_format: ExportFormat::Jpeg,
            export_dir: None,
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    session: Session,
    exporter: Exporter,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            session: Session::new(config.session.clone()),
            exporter: Exporter::new(config.export_format),
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Replay a script into the session and log the resulting draw commands.
    pub fn run_script(&mut self, script: &ReplayScript) -> usize {
        let applied = script.replay(&mut self.session);
        log::info!("Replayed {}/{} steps", applied, script.steps.len());
        for command in self.draw_commands() {
            log::debug!("{}", describe(&command));
        }
        applied
    }

    /// Primitives the current frame issues to a surface.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut surface = RecordingSurface::new();
        render_frame(&RenderContext::new(&self.session), &mut surface);
        surface.commands
    }

    /// Rasterize the committed scene, without selection box or text overlay.
    pub fn rasterize(&self) -> PixelCanvas {
        let mut canvas = PixelCanvas::new(self.config.width, self.config.height);
        let ctx = RenderContext::new(&self.session)
            .with_chrome(false)
            .with_in_flight(false);
        render_frame(&ctx, &mut canvas);
        canvas
    }

    /// Export the scene as an image. Failures are logged, not returned.
    pub fn export(&self) -> Option<ExportedImage> {
        let canvas = self.rasterize();
        self.exporter.export_or_log(Some(&canvas))
    }

    /// Export into the configured directory. Returns the written path.
    pub fn export_to_dir(&self) -> Option<PathBuf> {
        let dir = self.config.export_dir.as_deref()?;
        let image = self.export()?;
        write_image(dir, &image)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.session.snapshot()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn write_image(dir: &Path, image: &ExportedImage) -> Option<PathBuf> {
    let path = dir.join(&image.file_name);
    if let Err(e) = std::fs::write(&path, &image.data) {
        log::error!("Failed to write {}: {}", path.display(), e);
        return None;
    }
    log::info!("Exported image to: {:?}", path);
    Some(path)
}

fn describe(command: &DrawCommand) -> String {
    match command {
        DrawCommand::Polyline { points, style, .. } => {
            format!("polyline {} points, width {}", points.len() / 2, style.stroke_width)
        }
        DrawCommand::Rect { origin, width, height, .. } => {
            format!("rect at {:?} {}x{}", origin, width, height)
        }
        DrawCommand::Circle { center, radius, .. } => {
            format!("circle at {:?} r={}", center, radius)
        }
        DrawCommand::Polygon { points, .. } => format!("polygon {} points", points.len() / 2),
        DrawCommand::Text { position, text, .. } => format!("text {:?} at {:?}", text, position),
        DrawCommand::BoundingBox { rect, .. } => format!("bounding box {:?}", rect),
        DrawCommand::TextOverlay { position, buffer, width } => {
            format!("text overlay {:?} at {:?} width {}", buffer, position, width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::{ShapeKind, ToolMode};
    use kurbo::Point;

    fn small_app(format: ExportFormat, export_dir: Option<PathBuf>) -> App {
        App::with_config(AppConfig {
            width: 64,
            height: 48,
            export_format: format,
            export_dir,
            ..AppConfig::default()
        })
    }

    #[test]
    fn test_rasterize_draws_committed_stroke() {
        let mut app = small_app(ExportFormat::Png, None);
        let session = app.session_mut();
        session.pointer_down(Point::new(10.0, 10.0));
        session.pointer_move(Point::new(50.0, 10.0));
        session.pointer_up(Point::new(50.0, 10.0));

        let canvas = app.rasterize();
        let [r, g, b, a] = canvas.pixel(30, 10).unwrap();
        assert_eq!((r, g, b, a), (0xdf, 0x4b, 0x26, 255));
        assert_eq!(canvas.pixel(30, 40), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_export_to_dir_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = small_app(ExportFormat::Jpeg, Some(dir.path().to_path_buf()));
        let session = app.session_mut();
        session.toggle_mode(ToolMode::Pen);
        session.choose_shape(ShapeKind::Circle);
        session.pointer_down(Point::new(32.0, 24.0));
        session.pointer_move(Point::new(42.0, 24.0));
        session.pointer_up(Point::new(42.0, 24.0));

        let path = app.export_to_dir().unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_no_export_dir_means_no_file() {
        let app = small_app(ExportFormat::Png, None);
        assert!(app.export_to_dir().is_none());
        assert!(app.export().is_some());
    }

    #[test]
    fn test_draw_commands_follow_session() {
        let mut app = App::new();
        assert!(app.draw_commands().is_empty());
        let session = app.session_mut();
        session.pointer_down(Point::new(1.0, 1.0));
        assert_eq!(app.draw_commands().len(), 1);
        assert!(describe(&app.draw_commands()[0]).starts_with("polyline 1 points"));
    }
}
