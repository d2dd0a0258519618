//! SVG export surface.

use crate::style::{alpha, to_hex};
use crate::surface::{StrokeStyle, Surface, TextAlign};
use draftline_core::shapes::{arc_end, arc_start};
use kurbo::{Arc, Line, Point, Rect, Size};
use peniko::Color;
use std::fmt::Write;

/// Format a coordinate with at most two decimals and no negative zero.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" { "0".to_string() } else { text }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Accumulates SVG elements.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    size: Size,
    body: String,
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            body: String::new(),
        }
    }

    fn stroke_attrs(stroke: &StrokeStyle) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{}""#,
            to_hex(stroke.color),
            num(stroke.width)
        );
        let opacity = alpha(stroke.color) * stroke.opacity;
        if opacity < 1.0 {
            let _ = write!(attrs, r#" stroke-opacity="{}""#, num(opacity));
        }
        if let Some(dash) = stroke.dash {
            let _ = write!(attrs, r#" stroke-dasharray="{},{}""#, num(dash), num(dash));
        }
        attrs
    }

    /// Close the document.
    pub fn finish(self) -> String {
        let (w, h) = (num(self.size.width), num(self.size.height));
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
            self.body
        )
    }
}

impl Surface for SvgSurface {
    fn stroke_line(&mut self, line: Line, stroke: &StrokeStyle) {
        let _ = writeln!(
            self.body,
            r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" {} />"#,
            num(line.p0.x),
            num(line.p0.y),
            num(line.p1.x),
            num(line.p1.y),
            Self::stroke_attrs(stroke)
        );
    }

    fn stroke_arc(&mut self, arc: &Arc, stroke: &StrokeStyle) {
        let (start, end) = (arc_start(arc), arc_end(arc));
        let large = u8::from(arc.sweep_angle.abs() > std::f64::consts::PI);
        let sweep = u8::from(arc.sweep_angle > 0.0);
        let _ = writeln!(
            self.body,
            r#"  <path d="M {} {} A {} {} 0 {} {} {} {}" fill="none" {} />"#,
            num(start.x),
            num(start.y),
            num(arc.radii.x),
            num(arc.radii.y),
            large,
            sweep,
            num(end.x),
            num(end.y),
            Self::stroke_attrs(stroke)
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut fill = format!(r#"fill="{}""#, to_hex(color));
        if alpha(color) < 1.0 {
            let _ = write!(fill, r#" fill-opacity="{}""#, num(alpha(color)));
        }
        let _ = writeln!(
            self.body,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" {} />"#,
            num(rect.x0),
            num(rect.y0),
            num(rect.width()),
            num(rect.height()),
            fill
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, color: Color, align: TextAlign) {
        let anchor = match align {
            TextAlign::Start => "",
            TextAlign::Center => r#" text-anchor="middle""#,
        };
        let _ = writeln!(
            self.body,
            r#"  <text x="{}" y="{}" fill="{}" font-size="{}" font-family="monospace"{}>{}</text>"#,
            num(origin.x),
            num(origin.y),
            to_hex(color),
            num(font_size),
            anchor,
            escape(text)
        );
    }
}
