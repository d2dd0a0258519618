//! Raster export surface backed by tiny-skia.
//!
//! Labels are rasterized with ab_glyph from a bundled DejaVu Sans Mono and
//! blended straight into the pixmap.

use crate::surface::{StrokeStyle, Surface, TextAlign};
use ab_glyph::{Font, FontRef, PxScale, ScaleFont, point};
use kurbo::{Arc, Line, PathEl, Point, Rect, Shape};
use peniko::Color;
use tiny_skia::{
    FillRule, LineCap, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, StrokeDash, Transform,
};

/// Largest accepted image side, in pixels.
pub const MAX_RASTER_DIMENSION: u32 = 16_384;

/// Tolerance used when flattening arcs into cubic segments.
const ARC_TOLERANCE: f64 = 0.1;

static LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

fn label_font() -> Option<FontRef<'static>> {
    match FontRef::try_from_slice(LABEL_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("Label font unusable: {e}");
            None
        }
    }
}

/// Source-over blend of `rgba` at `coverage` onto a premultiplied pixel.
fn blend(dst: PremultipliedColorU8, rgba: [u8; 4], coverage: f32) -> PremultipliedColorU8 {
    let sa = f32::from(rgba[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    let mix = |src: u8, dst: u8| (f32::from(src) * sa + f32::from(dst) * (1.0 - sa)).round() as u8;
    let a = (255.0 * sa + f32::from(dst.alpha()) * (1.0 - sa)).round() as u8;
    let (r, g, b) = (mix(rgba[0], dst.red()), mix(rgba[1], dst.green()), mix(rgba[2], dst.blue()));
    // Premultiplied channels never exceed alpha.
    PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a).unwrap_or(dst)
}

/// Decoded image produced by a raster export.
#[derive(Debug, Clone)]
pub struct PngRenderResult {
    /// Straight (non-premultiplied) RGBA pixels, row-major.
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PngRenderResult {
    /// RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba_data.get(i..i + 4).and_then(|p| p.try_into().ok())
    }
}

fn paint_for(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    paint
}

/// Paints onto an in-memory pixmap.
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Create a transparent surface. Returns `None` for a zero-sized image.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn stroke_for(style: &StrokeStyle) -> Stroke {
        Stroke {
            width: style.width as f32,
            line_cap: LineCap::Butt,
            dash: style
                .dash
                .and_then(|d| StrokeDash::new(vec![d as f32, d as f32], 0.0)),
            ..Stroke::default()
        }
    }

    fn stroke_elements(&mut self, elements: impl IntoIterator<Item = PathEl>, style: &StrokeStyle) {
        let mut pb = PathBuilder::new();
        for el in elements {
            match el {
                PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
                PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
                PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
                PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                    p1.x as f32,
                    p1.y as f32,
                    p2.x as f32,
                    p2.y as f32,
                    p3.x as f32,
                    p3.y as f32,
                ),
                PathEl::ClosePath => pb.close(),
            }
        }
        if let Some(path) = pb.finish() {
            let paint = paint_for(style.rgba8());
            self.pixmap
                .stroke_path(&path, &paint, &Self::stroke_for(style), Transform::identity(), None);
        }
    }

    /// Un-premultiply into straight RGBA.
    pub fn into_result(self) -> PngRenderResult {
        let rgba_data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        PngRenderResult {
            rgba_data,
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }
}

impl Surface for RasterSurface {
    fn stroke_line(&mut self, line: Line, stroke: &StrokeStyle) {
        self.stroke_elements([PathEl::MoveTo(line.p0), PathEl::LineTo(line.p1)], stroke);
    }

    fn stroke_arc(&mut self, arc: &Arc, stroke: &StrokeStyle) {
        self.stroke_elements(arc.path_elements(ARC_TOLERANCE), stroke);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rgba = color.to_rgba8();
        let Some(rect) = tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
        else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        self.pixmap.fill_path(
            &path,
            &paint_for([rgba.r, rgba.g, rgba.b, rgba.a]),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color, align: TextAlign) {
        let Some(font) = label_font() else {
            return;
        };
        let scaled = font.as_scaled(PxScale::from(font_size as f32));
        let advance: f32 = text.chars().map(|c| scaled.h_advance(scaled.glyph_id(c))).sum();
        let mut x = origin.x as f32
            - match align {
                TextAlign::Start => 0.0,
                TextAlign::Center => advance / 2.0,
            };
        let baseline = origin.y as f32;

        let rgba = color.to_rgba8();
        let rgba = [rgba.r, rgba.g, rgba.b, rgba.a];
        let (width, height) = (self.pixmap.width() as i64, self.pixmap.height() as i64);
        let pixels = self.pixmap.pixels_mut();

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scaled.scale(), point(x, baseline));
            x += scaled.h_advance(id);
            let Some(outline) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                if px < 0 || py < 0 || px >= width || py >= height || coverage <= 0.0 {
                    return;
                }
                let i = (py * width + px) as usize;
                pixels[i] = blend(pixels[i], rgba, coverage);
            });
        }
    }
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(result: &PngRenderResult) -> Result<Vec<u8>, png::EncodingError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, result.width, result.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&result.rgba_data)?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn test_zero_size_rejected() {
        assert!(RasterSurface::new(0, 10).is_none());
    }

    #[test]
    fn test_fill_rect_and_line() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), Color::from_rgba8(0x1e, 0x1e, 0x1e, 255));
        surface.stroke_line(
            Line::new((0.0, 10.0), (20.0, 10.0)),
            &StrokeStyle::new(Color::WHITE, 2.0),
        );
        let result = surface.into_result();
        assert_eq!(result.pixel(5, 2), Some([0x1e, 0x1e, 0x1e, 255]));
        assert!(result.pixel(5, 10).is_some_and(|p| p[0] > 200 && p[3] == 255));
        assert_eq!(result.pixel(20, 0), None);
    }

    #[test]
    fn test_untouched_surface_is_clear() {
        let result = RasterSurface::new(10, 10).unwrap().into_result();
        assert!(result.rgba_data.iter().all(|&b| b == 0));
    }

    fn inked(result: &PngRenderResult, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| result.pixel(x, y).is_some_and(|p| p[3] > 0))
            .count()
    }

    #[test]
    fn test_text_sits_on_baseline() {
        let mut surface = RasterSurface::new(120, 40).unwrap();
        surface.fill_text("2.00m", Point::new(10.0, 25.0), 14.0, Color::WHITE, TextAlign::Start);
        let result = surface.into_result();

        assert!(inked(&result, 10..60, 12..26) > 20);
        // Nothing left of the origin and nothing well below the baseline.
        assert_eq!(inked(&result, 0..9, 0..40), 0);
        assert_eq!(inked(&result, 0..120, 30..40), 0);
    }

    #[test]
    fn test_centered_text_straddles_origin() {
        let mut surface = RasterSurface::new(120, 40).unwrap();
        surface.fill_text("888", Point::new(60.0, 25.0), 14.0, Color::WHITE, TextAlign::Center);
        let result = surface.into_result();
        assert!(inked(&result, 45..60, 10..26) > 0);
        assert!(inked(&result, 60..75, 10..26) > 0);
        assert_eq!(inked(&result, 0..40, 0..40), 0);
    }

    #[test]
    fn test_text_clipped_at_edges() {
        let mut surface = RasterSurface::new(8, 8).unwrap();
        surface.fill_text("W", Point::new(-4.0, 4.0), 20.0, Color::WHITE, TextAlign::Start);
        surface.fill_text("W", Point::new(6.0, 30.0), 20.0, Color::WHITE, TextAlign::Start);
        assert_eq!(surface.width(), 8);
    }

    #[test]
    fn test_arc_is_stroked() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        let arc = Arc {
            center: Point::new(0.0, 0.0),
            radii: Vec2::new(30.0, 30.0),
            start_angle: 0.0,
            sweep_angle: std::f64::consts::FRAC_PI_2,
            x_rotation: 0.0,
        };
        surface.stroke_arc(&arc, &StrokeStyle::new(Color::WHITE, 2.0));
        let result = surface.into_result();
        // 45° along the arc
        let d = (30.0 * std::f64::consts::FRAC_1_SQRT_2).round() as u32;
        assert!(result.pixel(d, d).is_some_and(|p| p[3] > 0));
    }

    #[test]
    fn test_encode_png_signature() {
        let surface = RasterSurface::new(4, 3).unwrap();
        let png = encode_png(&surface.into_result()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
