//! Export engine: turns a document into PNG, SVG, DXF or JSON.

use crate::dxf::write_dxf;
use crate::raster::{MAX_RASTER_DIMENSION, PngRenderResult, RasterSurface, encode_png};
use crate::scene::draw_export;
use crate::style::ExportOptions;
use crate::svg::SvgSurface;
use draftline_core::Document;
use kurbo::Rect;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: the drawing is empty")]
    EmptyDrawing,
    #[error("Image of {width}x{height} exceeds {max} pixels per side", max = MAX_RASTER_DIMENSION)]
    TooLarge { width: f64, height: f64 },
    #[error("Rasterization failed: {0}")]
    Raster(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Svg,
    Dxf,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [ExportFormat::Png, ExportFormat::Svg, ExportFormat::Dxf, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Dxf => "dxf",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Dxf => "application/dxf",
            ExportFormat::Json => "application/json",
        }
    }

    /// Match a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the document must contain at least one primitive.
    fn requires_content(self) -> bool {
        !matches!(self, ExportFormat::Json)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| ExportError::UnknownFormat(s.to_string()))
    }
}

fn content_bounds(document: &Document, options: &ExportOptions) -> ExportResult<Rect> {
    document
        .export_bounds(options.padding)
        .ok_or(ExportError::EmptyDrawing)
}

/// Rasterize the document to straight RGBA pixels.
pub fn render_png(document: &Document, options: &ExportOptions) -> ExportResult<PngRenderResult> {
    let bounds = content_bounds(document, options)?;
    let (width, height) = (bounds.width().ceil(), bounds.height().ceil());
    let max = MAX_RASTER_DIMENSION as f64;
    if !(width <= max && height <= max) {
        return Err(ExportError::TooLarge { width, height });
    }

    let mut surface = RasterSurface::new(width.max(1.0) as u32, height.max(1.0) as u32)
        .ok_or_else(|| ExportError::Raster(format!("Cannot allocate a {width}x{height} image")))?;
    draw_export(&mut surface, document, bounds, options);
    Ok(surface.into_result())
}

/// Render and encode as PNG.
pub fn export_png(document: &Document, options: &ExportOptions) -> ExportResult<Vec<u8>> {
    let image = render_png(document, options)?;
    let bytes = encode_png(&image).map_err(|e| ExportError::Encode(e.to_string()))?;
    log::info!("Exported PNG {}x{} ({} bytes)", image.width, image.height, bytes.len());
    Ok(bytes)
}

/// Export as SVG markup.
pub fn export_svg(document: &Document, options: &ExportOptions) -> ExportResult<String> {
    let bounds = content_bounds(document, options)?;
    let mut surface = SvgSurface::new(bounds.size());
    draw_export(&mut surface, document, bounds, options);
    let svg = surface.finish();
    log::info!("Exported SVG with {} primitives", document.len());
    Ok(svg)
}

/// Export as DXF.
pub fn export_dxf(document: &Document) -> ExportResult<String> {
    if document.is_empty() {
        return Err(ExportError::EmptyDrawing);
    }
    log::info!("Exported DXF with {} lines", document.len());
    Ok(write_dxf(document.primitives()))
}

/// Export the project itself. Succeeds even for an empty drawing.
pub fn export_json(document: &Document) -> ExportResult<String> {
    Ok(document.to_json()?)
}

/// Export in any format.
pub fn export(document: &Document, format: ExportFormat, options: &ExportOptions) -> ExportResult<Vec<u8>> {
    if format.requires_content() && document.is_empty() {
        log::warn!("Refusing {format} export of an empty drawing");
        return Err(ExportError::EmptyDrawing);
    }
    match format {
        ExportFormat::Png => export_png(document, options),
        ExportFormat::Svg => export_svg(document, options).map(String::into_bytes),
        ExportFormat::Dxf => export_dxf(document).map(String::into_bytes),
        ExportFormat::Json => export_json(document).map(String::into_bytes),
    }
}

/// Export to a file, choosing the format from its extension.
pub fn export_to_path(document: &Document, path: &Path, options: &ExportOptions) -> ExportResult<ExportFormat> {
    let format = ExportFormat::from_path(path)
        .ok_or_else(|| ExportError::UnknownFormat(path.display().to_string()))?;
    let bytes = export(document, format, options)?;
    std::fs::write(path, bytes)?;
    log::info!("Wrote {}", path.display());
    Ok(format)
}
