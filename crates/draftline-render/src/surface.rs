//! Drawing surface abstraction.
//!
//! Scene drawing issues strokes, rectangles and text in surface coordinates
//! through [`Surface`]. The SVG and raster exporters implement it, and hosts
//! implement it for their live canvas.

use kurbo::{Arc, Line, Point, Rect, Vec2};
use peniko::Color;

/// Stroke parameters for a single draw call.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub color: Color,
    /// Width in surface units.
    pub width: f64,
    /// Multiplied into the color's alpha.
    pub opacity: f64,
    /// On/off dash length in surface units.
    pub dash: Option<f64>,
}

impl StrokeStyle {
    /// Solid, fully opaque stroke.
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            opacity: 1.0,
            dash: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_dash(mut self, dash: Option<f64>) -> Self {
        self.dash = dash;
        self
    }

    /// RGBA bytes with opacity folded into alpha.
    pub fn rgba8(&self) -> [u8; 4] {
        let rgba = self.color.to_rgba8();
        let alpha = (rgba.a as f64 * self.opacity.clamp(0.0, 1.0)).round() as u8;
        [rgba.r, rgba.g, rgba.b, alpha]
    }
}

/// Horizontal anchoring of text relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
}

/// Something scene drawing can paint onto.
///
/// Coordinates are surface units (screen pixels for the live view, image
/// pixels for exports).
pub trait Surface {
    fn stroke_line(&mut self, line: Line, stroke: &StrokeStyle);

    /// Stroke an elliptical arc. Sweeps are positive in surface space.
    fn stroke_arc(&mut self, arc: &Arc, stroke: &StrokeStyle);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a text run with its baseline at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color, align: TextAlign);
}

/// Mapping from world coordinates to surface coordinates.
///
/// Only uniform scale plus translation, so arcs stay circular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// World point that lands on the surface origin.
    pub origin: Point,
    pub scale: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl View {
    pub fn new(origin: Point, scale: f64) -> Self {
        Self { origin, scale }
    }

    /// View matching a camera: `origin` is its pan, `scale` its zoom.
    pub fn from_camera(camera: &draftline_core::Camera) -> Self {
        Self::new(camera.pan.to_point(), camera.zoom)
    }

    pub fn point(&self, world: Point) -> Point {
        ((world - self.origin) * self.scale).to_point()
    }

    pub fn line(&self, world: Line) -> Line {
        Line::new(self.point(world.p0), self.point(world.p1))
    }

    pub fn arc(&self, world: &Arc) -> Arc {
        Arc {
            center: self.point(world.center),
            radii: Vec2::new(world.radii.x * self.scale, world.radii.y * self.scale),
            ..*world
        }
    }

    pub fn length(&self, world: f64) -> f64 {
        world * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftline_core::Camera;

    #[test]
    fn test_view_matches_camera() {
        let mut camera = Camera::new();
        camera.pan = Vec2::new(10.0, -20.0);
        camera.zoom = 2.5;
        let view = View::from_camera(&camera);

        let world = Point::new(33.0, 7.0);
        let a = view.point(world);
        let b = camera.world_to_screen(world);
        assert!((a - b).hypot() < 1e-9);
    }

    #[test]
    fn test_view_scales_arc_radius() {
        let view = View::new(Point::new(5.0, 5.0), 2.0);
        let arc = Arc {
            center: Point::new(5.0, 5.0),
            radii: Vec2::new(10.0, 10.0),
            start_angle: 0.3,
            sweep_angle: 1.0,
            x_rotation: 0.0,
        };
        let mapped = view.arc(&arc);
        assert_eq!(mapped.center, Point::ZERO);
        assert_eq!(mapped.radii, Vec2::new(20.0, 20.0));
        assert_eq!(mapped.start_angle, 0.3);
    }

    #[test]
    fn test_opacity_folds_into_alpha() {
        let stroke = StrokeStyle::new(Color::from_rgba8(255, 0, 0, 255), 2.0).with_opacity(0.5);
        assert_eq!(stroke.rgba8(), [255, 0, 0, 128]);
    }
}
