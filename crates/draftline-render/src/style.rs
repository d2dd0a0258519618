//! Colors, palettes and export options.

use draftline_core::document::EXPORT_PADDING;
use draftline_core::shapes::MarkRole;
use peniko::Color;
use std::str::FromStr;
use thiserror::Error;

/// Stroke width of primitives, in surface pixels.
pub const STROKE_WIDTH: f64 = 2.0;

/// Default background of the drawing area and of exports.
pub const DEFAULT_BACKGROUND: Color = Color::from_rgba8(0x1e, 0x1e, 0x1e, 255);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ParseColorError(String);

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
pub fn parse_color(input: &str) -> Result<Color, ParseColorError> {
    let color = input.trim();
    if color.eq_ignore_ascii_case("transparent") {
        return Ok(Color::TRANSPARENT);
    }
    let invalid = || ParseColorError(input.to_string());
    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());

    match hex.len() {
        3 => {
            // #rgb -> #rrggbb
            let r = byte(0..1)? * 17;
            let g = byte(1..2)? * 17;
            let b = byte(2..3)? * 17;
            Ok(Color::from_rgba8(r, g, b, 255))
        }
        6 => Ok(Color::from_rgba8(byte(0..2)?, byte(2..4)?, byte(4..6)?, 255)),
        8 => Ok(Color::from_rgba8(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
        _ => Err(invalid()),
    }
}

/// Format as `#rrggbb`, ignoring alpha.
pub fn to_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

/// Alpha as a fraction in `[0, 1]`.
pub fn alpha(color: Color) -> f64 {
    color.to_rgba8().a as f64 / 255.0
}

fn is_light(color: Color) -> bool {
    let rgba = color.to_rgba8();
    let luma = 0.299 * rgba.r as f64 + 0.587 * rgba.g as f64 + 0.114 * rgba.b as f64;
    luma / 255.0 > 0.6
}

/// Export background.
#[derive(Debug, Clone, Copy)]
pub enum Background {
    Color(Color),
    Transparent,
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(DEFAULT_BACKGROUND)
    }
}

impl Background {
    pub fn color(&self) -> Option<Color> {
        match self {
            Background::Color(color) => Some(*color),
            Background::Transparent => None,
        }
    }
}

impl FromStr for Background {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = parse_color(s)?;
        if color.to_rgba8().a == 0 {
            Ok(Background::Transparent)
        } else {
            Ok(Background::Color(color))
        }
    }
}

/// Colors for each thing scene drawing paints.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub wall: Color,
    pub window: Color,
    pub door: Color,
    pub selected: Color,
    pub handle: Color,
    pub handle_active: Color,
    pub label: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    /// Light strokes on the dark drawing area.
    pub fn dark() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            grid: Color::from_rgba8(0x2a, 0x2a, 0x2a, 255),
            wall: Color::WHITE,
            window: Color::from_rgba8(0x34, 0x98, 0xdb, 255),
            door: Color::from_rgba8(0xe6, 0x7e, 0x22, 255),
            selected: Color::from_rgba8(0x00, 0x78, 0xd4, 255),
            handle: Color::from_rgba8(0xe7, 0x4c, 0x3c, 255),
            handle_active: Color::from_rgba8(0xf1, 0xc4, 0x0f, 255),
            label: Color::from_rgba8(0x00, 0xff, 0x00, 255),
        }
    }

    /// Black strokes and labels, for printing on a light background.
    pub fn monochrome(background: Color) -> Self {
        Self {
            background,
            grid: Color::from_rgba8(0xdd, 0xdd, 0xdd, 255),
            wall: Color::BLACK,
            window: Color::BLACK,
            door: Color::BLACK,
            label: Color::BLACK,
            ..Self::dark()
        }
    }

    /// Palette readable on `background`.
    pub fn for_background(background: &Background) -> Self {
        match background {
            Background::Color(color) if is_light(*color) => Self::monochrome(*color),
            Background::Color(color) => Self {
                background: *color,
                ..Self::dark()
            },
            Background::Transparent => Self::dark(),
        }
    }

    pub fn role_color(&self, role: MarkRole) -> Color {
        match role {
            MarkRole::Wall => self.wall,
            MarkRole::Window => self.window,
            MarkRole::DoorFrame | MarkRole::DoorLeaf | MarkRole::DoorSwing => self.door,
        }
    }
}

/// Options shared by the PNG and SVG exporters.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub background: Background,
    /// Label size in pixels.
    pub font_size: f64,
    /// Margin around the drawing's bounds.
    pub padding: f64,
    pub stroke_width: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            background: Background::default(),
            font_size: 14.0,
            padding: EXPORT_PADDING,
            stroke_width: STROKE_WIDTH,
        }
    }
}

impl ExportOptions {
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn palette(&self) -> Palette {
        Palette::for_background(&self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(rgba(parse_color("#fff").unwrap()), [255, 255, 255, 255]);
        assert_eq!(rgba(parse_color("#3498db").unwrap()), [0x34, 0x98, 0xdb, 255]);
        assert_eq!(rgba(parse_color(" #00000080 ").unwrap()), [0, 0, 0, 0x80]);
        assert_eq!(rgba(parse_color("transparent").unwrap())[3], 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_color("fff").is_err());
        assert!(parse_color("#ggg").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#ééé").is_err());
    }

    #[test]
    fn test_background_from_str() {
        assert!(matches!("transparent".parse::<Background>(), Ok(Background::Transparent)));
        assert!(matches!("#ffffff00".parse::<Background>(), Ok(Background::Transparent)));
        let Ok(Background::Color(color)) = "#ffffff".parse::<Background>() else {
            panic!("expected an opaque background");
        };
        assert_eq!(to_hex(color), "#ffffff");
    }

    #[test]
    fn test_white_background_prints_black() {
        let palette = Palette::for_background(&Background::Color(Color::WHITE));
        assert_eq!(rgba(palette.role_color(MarkRole::Window)), [0, 0, 0, 255]);
        assert_eq!(rgba(palette.label), [0, 0, 0, 255]);
    }

    #[test]
    fn test_dark_background_keeps_kind_colors() {
        let palette = ExportOptions::default().palette();
        assert_eq!(to_hex(palette.role_color(MarkRole::Wall)), "#ffffff");
        assert_eq!(to_hex(palette.role_color(MarkRole::Window)), "#3498db");
        assert_eq!(to_hex(palette.role_color(MarkRole::DoorSwing)), "#e67e22");
        assert_eq!(to_hex(palette.label), "#00ff00");
    }
}
