//! Draftline Render Library
//!
//! Drawing surfaces and the export engine. Live views and exports draw the
//! same derived primitive geometry through the [`Surface`] trait.

mod dxf;
mod export;
mod raster;
mod scene;
mod style;
mod surface;
mod svg;

pub use dxf::write_dxf;
pub use export::{
    ExportError, ExportFormat, ExportResult, export, export_dxf, export_json, export_png, export_svg,
    export_to_path, render_png,
};
pub use raster::{MAX_RASTER_DIMENSION, PngRenderResult, RasterSurface, encode_png};
pub use scene::{GRID_SIZE, HANDLE_SIZE, LiveScene, draw_export, draw_primitive, draw_session};
pub use style::{Background, ExportOptions, Palette, ParseColorError, STROKE_WIDTH, parse_color, to_hex};
pub use surface::{StrokeStyle, Surface, TextAlign, View};
pub use svg::SvgSurface;
