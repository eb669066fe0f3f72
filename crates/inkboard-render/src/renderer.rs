//! Render surface abstraction and the frame walk that feeds it.

use inkboard_core::shapes::{EntityKind, EntityTrait, FontSpec, ShapeGeometry};
use inkboard_core::{EntityId, InFlight, Session, Shape, Stroke, TextLabel};
use kurbo::{BezPath, Cap, Point, Rect};
use peniko::Color;

/// Curve tension used for freehand strokes.
pub const STROKE_TENSION: f64 = 0.5;

/// How a primitive is drawn and whether the surface may drag it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    /// Id the surface reports in click/drag events. `None` for the in-flight entity.
    pub id: Option<EntityId>,
    pub color: Color,
    pub stroke_width: f64,
    pub draggable: bool,
}

/// Drawing primitives a surface must provide.
///
/// Coordinates are stage-local. Rectangle extents may be negative.
pub trait RenderSurface {
    fn draw_polyline(&mut self, points: &[f64], tension: f64, cap: Cap, style: &DrawStyle);

    fn draw_rect(&mut self, origin: Point, width: f64, height: f64, style: &DrawStyle);

    fn draw_circle(&mut self, center: Point, radius: f64, style: &DrawStyle);

    /// Closed polygon over a flattened point sequence.
    fn draw_polygon(&mut self, points: &[f64], style: &DrawStyle);

    fn draw_text(&mut self, position: Point, text: &str, font_size: f64, style: &DrawStyle);

    /// Selection highlight.
    fn draw_bounding_box(&mut self, rect: Rect, color: Color, stroke_width: f64);

    /// Live text-entry box.
    fn draw_text_overlay(&mut self, position: Point, buffer: &str, width: f64, font: &FontSpec);
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The session to render.
    pub session: &'a Session,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Selection highlight line width.
    pub selection_stroke_width: f64,
    /// Tension for freehand strokes.
    pub stroke_tension: f64,
    /// Whether to draw the entity under construction.
    pub show_in_flight: bool,
    /// Whether to draw the selection box and text overlay.
    pub show_chrome: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            selection_stroke_width: 1.0,
            stroke_tension: STROKE_TENSION,
            show_in_flight: true,
            show_chrome: true,
        }
    }

    /// Draw or skip the in-flight entity.
    pub fn with_in_flight(mut self, show: bool) -> Self {
        self.show_in_flight = show;
        self
    }

    /// Draw or skip the selection box and text overlay (skipped for export).
    pub fn with_chrome(mut self, show: bool) -> Self {
        self.show_chrome = show;
        self
    }

    fn style_for<T: EntityTrait>(&self, entity: &T, stroke_width: f64, id: Option<EntityId>) -> DrawStyle {
        DrawStyle {
            id,
            color: entity.color().into(),
            stroke_width,
            draggable: id.is_some() && self.session.is_draggable(entity.kind()),
        }
    }
}

/// Issue one frame to `surface`.
///
/// Strokes, shapes and text labels are drawn in collection order. The
/// in-flight stroke or shape is drawn after its collection, then the
/// selection box and the text overlay.
pub fn render_frame(ctx: &RenderContext, surface: &mut dyn RenderSurface) {
    let session = ctx.session;
    let store = session.store();
    let in_flight = session.in_flight().filter(|_| ctx.show_in_flight);

    for stroke in store.strokes() {
        render_stroke(ctx, stroke, Some(stroke.id()), surface);
    }
    if let Some(InFlight::Stroke(stroke)) = in_flight {
        render_stroke(ctx, stroke, None, surface);
    }

    for shape in store.shapes() {
        render_shape(ctx, shape, Some(shape.id()), surface);
    }
    if let Some(InFlight::Shape(shape)) = in_flight {
        render_shape(ctx, shape, None, surface);
    }

    for label in store.texts() {
        render_text(ctx, label, surface);
    }

    if !ctx.show_chrome {
        return;
    }

    if let Some(bbox) = session.selection().bounding_box {
        surface.draw_bounding_box(bbox.to_rect(), ctx.selection_color, ctx.selection_stroke_width);
    }

    if let Some(overlay) = session.text_overlay() {
        surface.draw_text_overlay(overlay.position(), overlay.buffer(), overlay.width(), overlay.font());
    }
}

fn render_stroke(ctx: &RenderContext, stroke: &Stroke, id: Option<EntityId>, surface: &mut dyn RenderSurface) {
    let Some(points) = stroke.points() else {
        return;
    };
    let style = ctx.style_for(stroke, stroke.stroke_width, id);
    surface.draw_polyline(points, ctx.stroke_tension, Cap::Round, &style);
}

fn render_shape(ctx: &RenderContext, shape: &Shape, id: Option<EntityId>, surface: &mut dyn RenderSurface) {
    let style = ctx.style_for(shape, shape.stroke_width, id);
    match shape.geometry() {
        &ShapeGeometry::Rect { width, height } => {
            surface.draw_rect(shape.anchor, width, height, &style)
        }
        &ShapeGeometry::Circle { radius } => surface.draw_circle(shape.anchor, radius, &style),
        ShapeGeometry::Triangle { points } => surface.draw_polygon(points, &style),
    }
}

fn render_text(ctx: &RenderContext, label: &TextLabel, surface: &mut dyn RenderSurface) {
    let style = DrawStyle {
        id: Some(label.id()),
        color: label.color.into(),
        stroke_width: 0.0,
        draggable: ctx.session.is_draggable(EntityKind::Text),
    };
    surface.draw_text(label.position, &label.text, label.font_size, &style);
}

/// Build the path a tensioned polyline traces.
///
/// Interior points get cubic control points spread along the neighbour
/// chord, scaled by `tension` and the relative segment lengths. The first
/// and last segments are quadratic. With zero tension, or fewer than three
/// points, the path is straight segments.
pub fn smooth_path(points: &[f64], tension: f64) -> BezPath {
    let pts: Vec<Point> = points
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect();
    let mut path = BezPath::new();
    let Some(&first) = pts.first() else {
        return path;
    };
    path.move_to(first);

    if tension == 0.0 || pts.len() < 3 {
        for &p in &pts[1..] {
            path.line_to(p);
        }
        return path;
    }

    // (incoming control, point, outgoing control) for every interior point
    let controls: Vec<(Point, Point, Point)> = pts
        .windows(3)
        .map(|w| {
            let (c_in, c_out) = control_points(w[0], w[1], w[2], tension);
            (c_in, w[1], c_out)
        })
        .collect();

    let last = pts[pts.len() - 1];
    let (first_in, first_pt, _) = controls[0];
    path.quad_to(first_in, first_pt);
    for pair in controls.windows(2) {
        let (_, _, out) = pair[0];
        let (next_in, next_pt, _) = pair[1];
        path.curve_to(out, next_in, next_pt);
    }
    let (_, _, last_out) = controls[controls.len() - 1];
    path.quad_to(last_out, last);
    path
}

fn control_points(p0: Point, p1: Point, p2: Point, tension: f64) -> (Point, Point) {
    let d01 = p0.distance(p1);
    let d12 = p1.distance(p2);
    let total = d01 + d12;
    if total == 0.0 {
        return (p1, p1);
    }
    let fa = tension * d01 / total;
    let fb = tension * d12 / total;
    let chord = p2 - p0;
    (p1 - chord * fa, p1 + chord * fb)
}

/// A primitive issued to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Polyline {
        points: Vec<f64>,
        tension: f64,
        cap: Cap,
        style: DrawStyle,
    },
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        style: DrawStyle,
    },
    Circle {
        center: Point,
        radius: f64,
        style: DrawStyle,
    },
    Polygon {
        points: Vec<f64>,
        style: DrawStyle,
    },
    Text {
        position: Point,
        text: String,
        font_size: f64,
        style: DrawStyle,
    },
    BoundingBox {
        rect: Rect,
        color: Color,
    },
    TextOverlay {
        position: Point,
        buffer: String,
        width: f64,
    },
}

/// Surface that records what it is asked to draw.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_polyline(&mut self, points: &[f64], tension: f64, cap: Cap, style: &DrawStyle) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            tension,
            cap,
            style: *style,
        });
    }

    fn draw_rect(&mut self, origin: Point, width: f64, height: f64, style: &DrawStyle) {
        self.commands.push(DrawCommand::Rect {
            origin,
            width,
            height,
            style: *style,
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f64, style: &DrawStyle) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            style: *style,
        });
    }

    fn draw_polygon(&mut self, points: &[f64], style: &DrawStyle) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            style: *style,
        });
    }

    fn draw_text(&mut self, position: Point, text: &str, font_size: f64, style: &DrawStyle) {
        self.commands.push(DrawCommand::Text {
            position,
            text: text.to_string(),
            font_size,
            style: *style,
        });
    }

    fn draw_bounding_box(&mut self, rect: Rect, color: Color, _stroke_width: f64) {
        self.commands.push(DrawCommand::BoundingBox { rect, color });
    }

    fn draw_text_overlay(&mut self, position: Point, buffer: &str, width: f64, _font: &FontSpec) {
        self.commands.push(DrawCommand::TextOverlay {
            position,
            buffer: buffer.to_string(),
            width,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::{SessionConfig, ShapeKind, TextKey, ToolMode};
    use kurbo::PathEl;

    fn session(mode: ToolMode) -> Session {
        Session::new(SessionConfig {
            initial_mode: mode,
            ..SessionConfig::default()
        })
    }

    fn frame(session: &Session) -> Vec<DrawCommand> {
        let mut surface = RecordingSurface::new();
        render_frame(&RenderContext::new(session), &mut surface);
        surface.commands
    }

    #[test]
    fn test_empty_frame() {
        assert!(frame(&Session::default()).is_empty());
    }

    #[test]
    fn test_draw_order_and_styles() {
        let mut session = session(ToolMode::Text);
        session.pointer_down(Point::new(1.0, 1.0));
        session.pointer_up(Point::new(1.0, 1.0));
        session.set_text_input("hi");
        session.handle_key(&TextKey::Enter);

        session.toggle_mode(ToolMode::Text);
        session.choose_shape(ShapeKind::Triangle);
        session.pointer_down(Point::new(10.0, 50.0));
        session.pointer_move(Point::new(30.0, 70.0));
        session.pointer_up(Point::new(30.0, 70.0));

        session.toggle_mode(ToolMode::Pen);
        session.pointer_down(Point::ZERO);
        session.pointer_move(Point::new(5.0, 5.0));
        session.pointer_up(Point::new(5.0, 5.0));

        let commands = frame(&session);
        assert_eq!(commands.len(), 3);
        let DrawCommand::Polyline { tension, cap, style, .. } = &commands[0] else {
            panic!("expected a polyline first");
        };
        assert!((tension - STROKE_TENSION).abs() < f64::EPSILON);
        assert_eq!(*cap, Cap::Round);
        assert!(!style.draggable);
        assert!((style.stroke_width - 5.0).abs() < f64::EPSILON);

        assert!(matches!(&commands[1], DrawCommand::Polygon { points, .. } if points.len() == 6));
        let DrawCommand::Text { text, style, .. } = &commands[2] else {
            panic!("expected text last");
        };
        assert_eq!(text, "hi");
        assert!(style.draggable);
    }

    #[test]
    fn test_select_mode_makes_geometry_draggable() {
        let mut session = session(ToolMode::ShapePick);
        session.choose_shape(ShapeKind::Rectangle);
        session.pointer_down(Point::new(10.0, 10.0));
        session.pointer_move(Point::new(0.0, 30.0));
        let id = session.pointer_up(Point::new(0.0, 30.0)).unwrap();
        session.toggle_mode(ToolMode::Select);
        session.click(id);

        let commands = frame(&session);
        let DrawCommand::Rect { origin, width, height, style } = &commands[0] else {
            panic!("expected a rect");
        };
        assert_eq!(*origin, Point::new(10.0, 10.0));
        assert!((width + 10.0).abs() < f64::EPSILON);
        assert!((height - 20.0).abs() < f64::EPSILON);
        assert!(style.draggable);
        assert_eq!(style.id, Some(id));
        assert_eq!(
            commands[1],
            DrawCommand::BoundingBox {
                rect: Rect::new(0.0, 10.0, 10.0, 30.0),
                color: Color::from_rgba8(59, 130, 246, 255),
            }
        );
    }

    #[test]
    fn test_in_flight_drawn_without_id() {
        let mut session = session(ToolMode::ShapePick);
        session.choose_shape(ShapeKind::Circle);
        session.pointer_down(Point::new(5.0, 5.0));
        assert!(matches!(
            frame(&session).as_slice(),
            [DrawCommand::Circle { radius, .. }] if *radius == 0.0
        ));

        session.pointer_move(Point::new(8.0, 9.0));
        let commands = frame(&session);
        assert_eq!(commands.len(), 1);
        let DrawCommand::Circle { radius, style, .. } = &commands[0] else {
            panic!("expected a circle");
        };
        assert!((radius - 5.0).abs() < f64::EPSILON);
        assert!(style.id.is_none());
        assert!(!style.draggable);

        let mut surface = RecordingSurface::new();
        render_frame(&RenderContext::new(&session).with_in_flight(false), &mut surface);
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn test_text_overlay_drawn_last() {
        let mut session = session(ToolMode::Text);
        session.pointer_down(Point::new(3.0, 4.0));
        session.handle_key(&TextKey::Character("a".into()));
        let commands = frame(&session);
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::TextOverlay { buffer, .. }) if buffer == "a"
        ));

        let mut surface = RecordingSurface::new();
        render_frame(&RenderContext::new(&session).with_chrome(false), &mut surface);
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn test_smooth_path_shapes() {
        assert!(smooth_path(&[], 0.5).elements().is_empty());

        let straight = smooth_path(&[0.0, 0.0, 10.0, 0.0], 0.5);
        assert_eq!(
            straight.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(10.0, 0.0))
            ]
        );

        let curved = smooth_path(&[0.0, 0.0, 10.0, 10.0, 20.0, 0.0, 30.0, 10.0], 0.5);
        let els = curved.elements();
        assert!(matches!(els[0], PathEl::MoveTo(_)));
        assert!(matches!(els[1], PathEl::QuadTo(_, p) if p == Point::new(10.0, 10.0)));
        assert!(matches!(els[2], PathEl::CurveTo(_, _, p) if p == Point::new(20.0, 0.0)));
        assert!(matches!(els[3], PathEl::QuadTo(_, p) if p == Point::new(30.0, 10.0)));
    }

    #[test]
    fn test_control_points_follow_chord() {
        let (c_in, c_out) = control_points(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            0.5,
        );
        assert_eq!(c_in, Point::new(5.0, 0.0));
        assert_eq!(c_out, Point::new(15.0, 0.0));

        let (c_in, c_out) = control_points(Point::ZERO, Point::ZERO, Point::ZERO, 0.5);
        assert_eq!((c_in, c_out), (Point::ZERO, Point::ZERO));
    }
}
