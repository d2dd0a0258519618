//! Scene drawing shared by the live view and the exporters.
//!
//! Primitives are drawn from [`Primitive::geometry`], mapped through a
//! [`View`] and painted onto any [`Surface`].

use crate::style::{ExportOptions, Palette, STROKE_WIDTH};
use crate::surface::{StrokeStyle, Surface, TextAlign, View};
use draftline_core::shapes::Mark;
use draftline_core::{Document, Endpoint, Primitive, Session};
use kurbo::{Line, Point, Rect, Size, Vec2};
use peniko::Color;

/// World distance between grid lines.
pub const GRID_SIZE: f64 = 50.0;

/// Side of an endpoint handle, in screen pixels.
pub const HANDLE_SIZE: f64 = 7.0;

/// Live label size, in screen pixels.
pub const LABEL_FONT_SIZE: f64 = 12.0;

/// Distance of a live label from its segment, in screen pixels.
pub const LABEL_OFFSET: f64 = 10.0;

const AXIS_SIZE: f64 = 40.0;
const AXIS_MARGIN: Vec2 = Vec2::new(60.0, 20.0);
const AXIS_X_COLOR: Color = Color::from_rgba8(0xff, 0x4d, 0x4d, 255);
const AXIS_Y_COLOR: Color = Color::from_rgba8(0x2e, 0xcc, 0x71, 255);

/// Draw one primitive. `highlight` replaces the per-kind colors.
pub fn draw_primitive(
    surface: &mut dyn Surface,
    primitive: &Primitive,
    view: &View,
    palette: &Palette,
    stroke_width: f64,
    highlight: Option<Color>,
) {
    for mark in primitive.geometry(view.scale).marks(view.scale) {
        let color = highlight.unwrap_or_else(|| palette.role_color(mark.role()));
        match mark {
            Mark::Segment { line, opacity, .. } => {
                let stroke = StrokeStyle::new(color, stroke_width).with_opacity(opacity);
                surface.stroke_line(view.line(line), &stroke);
            }
            Mark::Arc { arc, dash, .. } => {
                let stroke = StrokeStyle::new(color, stroke_width).with_dash(dash.map(|d| view.length(d)));
                surface.stroke_arc(&view.arc(&arc), &stroke);
            }
        }
    }
}

/// Draw a document for export: background, primitives and, when
/// calibrated, length labels beside each midpoint.
///
/// `bounds` is the world rectangle that maps onto the whole surface.
pub fn draw_export(surface: &mut dyn Surface, document: &Document, bounds: Rect, options: &ExportOptions) {
    let palette = options.palette();
    if let Some(color) = options.background.color() {
        surface.fill_rect(Rect::from_origin_size(Point::ZERO, bounds.size()), color);
    }

    let view = View::new(bounds.origin(), 1.0);
    for primitive in document.primitives() {
        draw_primitive(surface, primitive, &view, &palette, options.stroke_width, None);
    }

    for primitive in document.primitives() {
        if let Some(label) = document.calibration.format_length(primitive.length()) {
            let origin = view.point(primitive.midpoint()) + Vec2::new(5.0, 0.0);
            surface.fill_text(&label, origin, options.font_size, palette.label, TextAlign::Start);
        }
    }
}

/// Everything needed to draw one frame of an editing session.
pub struct LiveScene<'a> {
    pub session: &'a Session,
    /// Viewport size in screen pixels.
    pub viewport_size: Size,
    pub palette: Palette,
    pub show_grid: bool,
    pub show_axes: bool,
}

impl<'a> LiveScene<'a> {
    pub fn new(session: &'a Session, viewport_size: Size) -> Self {
        Self {
            session,
            viewport_size,
            palette: Palette::dark(),
            show_grid: true,
            show_axes: true,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    pub fn with_axes(mut self, show: bool) -> Self {
        self.show_axes = show;
        self
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        let viewport = Rect::from_origin_size(Point::ZERO, self.viewport_size);
        surface.fill_rect(viewport, self.palette.background);
        if self.show_grid {
            self.draw_grid(surface);
        }
        if self.show_axes {
            self.draw_axes(surface);
        }

        let view = View::from_camera(&self.session.camera);
        let selected = self.session.selected_id();
        let preview = self.session.preview();
        let drawn = self.session.document().primitives().iter().chain(preview);

        for primitive in drawn {
            // The segment being drawn counts as selected.
            let active = Some(primitive.id()) == selected || preview.is_some_and(|p| p.id() == primitive.id());
            let highlight = active.then_some(self.palette.selected);
            draw_primitive(surface, primitive, &view, &self.palette, STROKE_WIDTH, highlight);
            self.draw_handles(surface, primitive, &view);
            self.draw_label(surface, primitive, &view);
        }
    }

    /// One-pixel grid lines every [`GRID_SIZE`] world units.
    fn draw_grid(&self, surface: &mut dyn Surface) {
        let camera = &self.session.camera;
        let step = GRID_SIZE * camera.zoom;
        if step < 2.0 {
            return;
        }
        let stroke = StrokeStyle::new(self.palette.grid, 1.0);
        let Size { width, height } = self.viewport_size;

        let mut x = (-camera.pan.x * camera.zoom).rem_euclid(step);
        while x < width {
            surface.stroke_line(Line::new((x, 0.0), (x, height)), &stroke);
            x += step;
        }
        let mut y = (-camera.pan.y * camera.zoom).rem_euclid(step);
        while y < height {
            surface.stroke_line(Line::new((0.0, y), (width, y)), &stroke);
            y += step;
        }
    }

    /// X/Y orientation gizmo near the bottom-right corner.
    fn draw_axes(&self, surface: &mut dyn Surface) {
        let corner = Point::new(self.viewport_size.width, self.viewport_size.height) - AXIS_MARGIN;
        let x_end = corner + Vec2::new(AXIS_SIZE, 0.0);
        let y_end = corner - Vec2::new(0.0, AXIS_SIZE);

        surface.stroke_line(Line::new(corner, x_end), &StrokeStyle::new(AXIS_X_COLOR, 2.0));
        surface.fill_text("X", x_end + Vec2::new(5.0, 5.0), LABEL_FONT_SIZE, AXIS_X_COLOR, TextAlign::Start);
        surface.stroke_line(Line::new(corner, y_end), &StrokeStyle::new(AXIS_Y_COLOR, 2.0));
        surface.fill_text("Y", y_end + Vec2::new(-4.0, -8.0), LABEL_FONT_SIZE, AXIS_Y_COLOR, TextAlign::Start);
    }

    fn draw_handles(&self, surface: &mut dyn Surface, primitive: &Primitive, view: &View) {
        let grabbed = self
            .session
            .selection()
            .filter(|selection| selection.id == primitive.id())
            .and_then(|selection| selection.endpoint);

        for endpoint in [Endpoint::P1, Endpoint::P2] {
            let center = view.point(primitive.endpoint(endpoint));
            let color = if grabbed == Some(endpoint) {
                self.palette.handle_active
            } else {
                self.palette.handle
            };
            let half = HANDLE_SIZE / 2.0;
            surface.fill_rect(Rect::new(center.x - half, center.y - half, center.x + half, center.y + half), color);
        }
    }

    /// Length label offset perpendicular to the segment.
    fn draw_label(&self, surface: &mut dyn Surface, primitive: &Primitive, view: &View) {
        let Some(label) = self.session.length_label(primitive) else {
            return;
        };
        let angle = primitive.angle();
        let offset = Vec2::new(angle.sin(), -angle.cos()) * LABEL_OFFSET;
        let origin = view.point(primitive.midpoint()) + offset;
        surface.fill_text(&label, origin, LABEL_FONT_SIZE, self.palette.label, TextAlign::Center);
    }
}

/// Draw a session frame with the default palette.
pub fn draw_session(surface: &mut dyn Surface, session: &Session, viewport_size: Size) {
    LiveScene::new(session, viewport_size).draw(surface);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use draftline_core::{Calibration, ToolKind, Unit};
    use kurbo::Arc;

    /// Records draw calls.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub lines: Vec<(Line, [u8; 4])>,
        pub arcs: Vec<(Arc, Option<f64>)>,
        pub rects: Vec<(Rect, [u8; 4])>,
        pub texts: Vec<(String, Point, TextAlign)>,
    }

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    impl Surface for Recorder {
        fn stroke_line(&mut self, line: Line, stroke: &StrokeStyle) {
            self.lines.push((line, stroke.rgba8()));
        }

        fn stroke_arc(&mut self, arc: &Arc, stroke: &StrokeStyle) {
            self.arcs.push((*arc, stroke.dash));
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.rects.push((rect, rgba(color)));
        }

        fn fill_text(&mut self, text: &str, origin: Point, _font_size: f64, _color: Color, align: TextAlign) {
            self.texts.push((text.to_string(), origin, align));
        }
    }

    #[test]
    fn test_door_draws_frame_leaf_and_dashed_arc() {
        let door = Primitive::door(Point::new(0.0, 0.0), Point::new(100.0, 0.0), false);
        let mut surface = Recorder::default();
        draw_primitive(&mut surface, &door, &View::new(Point::ZERO, 2.0), &Palette::dark(), 2.0, None);

        assert_eq!(surface.lines.len(), 2);
        // Frame is faded, leaf is opaque.
        assert!(surface.lines[0].1[3] < 100);
        assert_eq!(surface.lines[1].1[3], 255);
        let (arc, dash) = surface.arcs[0];
        assert!((arc.radii.x - 200.0).abs() < 1e-9);
        // Dash stays five screen pixels at any zoom.
        assert!((dash.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_translates_to_bounds_origin() {
        let mut doc = Document::new();
        doc.add(Primitive::wall(Point::new(100.0, 200.0), Point::new(300.0, 200.0)));
        let bounds = doc.export_bounds(60.0).unwrap();

        let mut surface = Recorder::default();
        draw_export(&mut surface, &doc, bounds, &ExportOptions::default());

        assert_eq!(surface.rects.len(), 1);
        assert_eq!(surface.rects[0].0, Rect::new(0.0, 0.0, 320.0, 120.0));
        assert_eq!(surface.lines[0].0, Line::new((60.0, 60.0), (260.0, 60.0)));
        assert!(surface.texts.is_empty());
    }

    #[test]
    fn test_export_labels_when_calibrated() {
        let mut doc = Document::new();
        doc.add(Primitive::wall(Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
        doc.calibration = Calibration::with_factor(2.0, Unit::Cm);
        let bounds = doc.export_bounds(0.0).unwrap();

        let mut surface = Recorder::default();
        let options = ExportOptions::default().with_background(crate::Background::Transparent);
        draw_export(&mut surface, &doc, bounds, &options);

        assert!(surface.rects.is_empty());
        assert_eq!(surface.texts.len(), 1);
        assert_eq!(surface.texts[0].0, "200.00cm");
        assert_eq!(surface.texts[0].1, Point::new(55.0, 0.0));
    }

    #[test]
    fn test_live_scene_highlights_selection_and_preview() {
        let mut session = Session::new();
        session.set_tool(ToolKind::Wall);
        session.begin_draw(Point::new(0.0, 0.0));
        session.update_draw(Point::new(100.0, 0.0));
        session.commit_draw();

        session.set_tool(ToolKind::Window);
        session.begin_draw(Point::new(0.0, 50.0));
        session.update_draw(Point::new(100.0, 50.0));

        let mut surface = Recorder::default();
        LiveScene::new(&session, Size::new(400.0, 300.0))
            .with_grid(false)
            .with_axes(false)
            .draw(&mut surface);

        let selected = rgba(Palette::dark().selected);
        // One wall stroke plus the two window strokes of the preview.
        assert_eq!(surface.lines.len(), 3);
        assert!(surface.lines.iter().all(|(_, color)| *color == selected));
        // Background plus two handles per primitive.
        assert_eq!(surface.rects.len(), 5);
        assert!(surface.texts.is_empty());
    }

    #[test]
    fn test_live_labels_are_prefixed_and_centered() {
        let mut session = Session::new();
        session.set_tool(ToolKind::Door);
        session.begin_draw(Point::new(0.0, 0.0));
        session.update_draw(Point::new(100.0, 0.0));
        session.commit_draw();
        session.calibrate(100.0, 100.0, Unit::Cm);

        let mut surface = Recorder::default();
        LiveScene::new(&session, Size::new(400.0, 300.0))
            .with_grid(false)
            .with_axes(false)
            .draw(&mut surface);

        let (text, origin, align) = &surface.texts[0];
        assert_eq!(text, "D: 100.00cm");
        assert_eq!(*align, TextAlign::Center);
        assert!((*origin - Point::new(50.0, -10.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_grid_lines_fill_viewport() {
        let session = Session::new();
        let mut surface = Recorder::default();
        LiveScene::new(&session, Size::new(120.0, 60.0))
            .with_axes(false)
            .draw(&mut surface);
        // x = 0, 50, 100 and y = 0, 50
        assert_eq!(surface.lines.len(), 5);
    }

    #[test]
    fn test_draw_session_draws_axes() {
        let session = Session::new();
        let mut surface = Recorder::default();
        draw_session(&mut surface, &session, Size::new(200.0, 200.0));
        let names: Vec<_> = surface.texts.iter().map(|(text, _, _)| text.as_str()).collect();
        assert_eq!(names, ["X", "Y"]);
    }
}
