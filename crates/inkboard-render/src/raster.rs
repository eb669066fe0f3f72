//! Software raster surface for headless rendering and export.
//!
//! Outlines are drawn with hard edges by testing pixel centers against the
//! stroked geometry. Text labels are not rasterized; there is no font
//! backend here.

use crate::export::{PixelBuffer, RasterSource};
use crate::renderer::{DrawStyle, RenderSurface, smooth_path};
use inkboard_core::shapes::FontSpec;
use kurbo::{BezPath, Cap, Line, ParamCurveNearest, PathEl, Point, Rect};
use peniko::Color;

/// Flattening tolerance for curved strokes, in pixels.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// Overlay box border color.
fn overlay_border() -> Color {
    Color::from_rgba8(118, 118, 118, 255)
}

/// A transparent RGBA8 canvas.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelCanvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA of one pixel, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    fn blend(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let src_a = color[3] as u32;
        let dst_a = self.rgba[i + 3] as u32;
        // Source-over, in 0..=255 fixed point
        let out_a = src_a + dst_a * (255 - src_a) / 255;
        if out_a == 0 {
            return;
        }
        for c in 0..3 {
            let src = color[c] as u32 * src_a;
            let dst = self.rgba[i + c] as u32 * dst_a * (255 - src_a) / 255;
            self.rgba[i + c] = ((src + dst) / out_a).min(255) as u8;
        }
        self.rgba[i + 3] = out_a.min(255) as u8;
    }

    /// Blend `color` into every pixel in `bounds` whose center satisfies `covered`.
    fn fill_where(&mut self, bounds: Rect, color: Color, covered: impl Fn(Point) -> bool) {
        let rgba = color.to_rgba8();
        let color = [rgba.r, rgba.g, rgba.b, rgba.a];
        let bounds = bounds.abs();
        let x0 = bounds.x0.floor().max(0.0) as u32;
        let y0 = bounds.y0.floor().max(0.0) as u32;
        let x1 = (bounds.x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (bounds.y1.ceil().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                if covered(Point::new(x as f64 + 0.5, y as f64 + 0.5)) {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Stroke a set of segments as one primitive.
    fn stroke_segments(&mut self, segments: &[Line], width: f64, color: Color) {
        let Some(bounds) = segments
            .iter()
            .map(|l| Rect::from_points(l.p0, l.p1))
            .reduce(|a, b| a.union(b))
        else {
            return;
        };
        let half = (width / 2.0).max(0.5);
        let half_sq = half * half;
        self.fill_where(bounds.inflate(half, half), color, |p| {
            segments
                .iter()
                .any(|l| l.nearest(p, 1e-6).distance_sq <= half_sq)
        });
    }
}

/// Straight segments of a path after flattening.
fn path_segments(path: &BezPath) -> Vec<Line> {
    let mut segments = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path, FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            start = p;
            last = p;
        }
        PathEl::LineTo(p) => {
            segments.push(Line::new(last, p));
            last = p;
        }
        PathEl::ClosePath => {
            segments.push(Line::new(last, start));
            last = start;
        }
        // flatten only emits the three above
        _ => {}
    });
    // A lone point still leaves a dot with round caps
    if segments.is_empty() {
        segments.push(Line::new(start, start));
    }
    segments
}

fn closed_segments(points: &[f64]) -> Vec<Line> {
    let pts: Vec<Point> = points
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect();
    let n = pts.len();
    (0..n).map(|i| Line::new(pts[i], pts[(i + 1) % n])).collect()
}

impl RenderSurface for PixelCanvas {
    fn draw_polyline(&mut self, points: &[f64], tension: f64, _cap: Cap, style: &DrawStyle) {
        // Distance-based coverage gives round caps and joins
        let segments = path_segments(&smooth_path(points, tension));
        self.stroke_segments(&segments, style.stroke_width, style.color);
    }

    fn draw_rect(&mut self, origin: Point, width: f64, height: f64, style: &DrawStyle) {
        let rect = Rect::from_origin_size(origin, (width, height)).abs();
        let corners = [
            rect.x0, rect.y0, rect.x1, rect.y0, rect.x1, rect.y1, rect.x0, rect.y1,
        ];
        self.stroke_segments(&closed_segments(&corners), style.stroke_width, style.color);
    }

    fn draw_circle(&mut self, center: Point, radius: f64, style: &DrawStyle) {
        let half = (style.stroke_width / 2.0).max(0.5);
        let reach = radius.abs() + half;
        let bounds = Rect::new(center.x - reach, center.y - reach, center.x + reach, center.y + reach);
        self.fill_where(bounds, style.color, |p| {
            (p.distance(center) - radius.abs()).abs() <= half
        });
    }

    fn draw_polygon(&mut self, points: &[f64], style: &DrawStyle) {
        let segments = closed_segments(points);
        if !segments.is_empty() {
            self.stroke_segments(&segments, style.stroke_width, style.color);
        }
    }

    fn draw_text(&mut self, position: Point, text: &str, _font_size: f64, _style: &DrawStyle) {
        log::trace!("Skipping text {:?} at {:?} in software raster", text, position);
    }

    fn draw_bounding_box(&mut self, rect: Rect, color: Color, stroke_width: f64) {
        let corners = [
            rect.x0, rect.y0, rect.x1, rect.y0, rect.x1, rect.y1, rect.x0, rect.y1,
        ];
        self.stroke_segments(&closed_segments(&corners), stroke_width, color);
    }

    fn draw_text_overlay(&mut self, position: Point, _buffer: &str, width: f64, font: &FontSpec) {
        // Input box: 5px padding on every side of one text line
        let rect = Rect::new(
            position.x,
            position.y,
            position.x + width + 10.0,
            position.y + font.size + 10.0,
        );
        self.draw_bounding_box(rect, overlay_border(), 1.0);
    }
}

impl RasterSource for PixelCanvas {
    fn snapshot(&self) -> Option<PixelBuffer> {
        Some(PixelBuffer {
            width: self.width,
            height: self.height,
            rgba: self.rgba.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(width: f64) -> DrawStyle {
        DrawStyle {
            id: None,
            color: Color::from_rgba8(255, 0, 0, 255),
            stroke_width: width,
            draggable: false,
        }
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = PixelCanvas::new(4, 3);
        assert_eq!(canvas.pixel(3, 2), Some([0, 0, 0, 0]));
        assert!(canvas.pixel(4, 0).is_none());
    }

    #[test]
    fn test_polyline_covers_its_path() {
        let mut canvas = PixelCanvas::new(20, 20);
        canvas.draw_polyline(&[2.0, 10.0, 18.0, 10.0], 0.5, Cap::Round, &style(2.0));
        assert_eq!(canvas.pixel(10, 9), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(10, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_curved_polyline_is_flattened() {
        let segments = path_segments(&smooth_path(&[0.0, 0.0, 10.0, 10.0, 20.0, 0.0], 0.5));
        assert!(segments.len() > 2);
        assert_eq!(segments[0].p0, Point::ZERO);
        assert_eq!(segments[segments.len() - 1].p1, Point::new(20.0, 0.0));

        let mut canvas = PixelCanvas::new(20, 20);
        canvas.draw_polyline(&[2.0, 10.0, 10.0, 10.0, 18.0, 10.0], 0.5, Cap::Round, &style(2.0));
        assert_eq!(canvas.pixel(6, 10), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(14, 10), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(10, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_single_point_stroke_leaves_dot() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.draw_polyline(&[5.0, 5.0], 0.5, Cap::Round, &style(4.0));
        assert_eq!(canvas.pixel(5, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_negative_rect_outline() {
        let mut canvas = PixelCanvas::new(20, 20);
        canvas.draw_rect(Point::new(15.0, 15.0), -10.0, -10.0, &style(1.0));
        assert_eq!(canvas.pixel(5, 10), Some([255, 0, 0, 255]));
        // Outline only
        assert_eq!(canvas.pixel(10, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_circle_ring() {
        let mut canvas = PixelCanvas::new(30, 30);
        canvas.draw_circle(Point::new(15.0, 15.0), 10.0, &style(2.0));
        assert_eq!(canvas.pixel(24, 15), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(15, 15), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_translucent_blend() {
        let mut canvas = PixelCanvas::new(1, 1);
        canvas.blend(0, 0, [0, 0, 255, 255]);
        canvas.blend(0, 0, [255, 0, 0, 128]);
        let [r, _, b, a] = canvas.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!(r > 120 && r < 135);
        assert!(b > 120 && b < 135);
    }
}
