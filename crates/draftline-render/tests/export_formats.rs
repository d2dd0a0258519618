//! End-to-end exports of a drawing built through an editing session.

use draftline_core::{Session, ToolKind, Unit};
use draftline_render::{Background, ExportFormat, ExportOptions, export, export_dxf, render_png};
use kurbo::Point;

fn draw(session: &mut Session, tool: ToolKind, from: (f64, f64), to: (f64, f64)) {
    session.set_tool(tool);
    session.begin_draw(Point::new(from.0, from.1));
    session.update_draw(Point::new(to.0, to.1));
    assert!(session.commit_draw().is_some());
}

fn room() -> Session {
    let mut session = Session::new();
    draw(&mut session, ToolKind::Wall, (0.0, 0.0), (300.0, 0.0));
    draw(&mut session, ToolKind::Wall, (300.0, 0.0), (300.0, 200.0));
    draw(&mut session, ToolKind::Window, (300.0, 200.0), (100.0, 200.0));
    draw(&mut session, ToolKind::Door, (0.0, 200.0), (0.0, 100.0));
    session
}

#[test]
fn test_png_decodes_with_expected_size() {
    let session = room();
    let bytes = export(session.document(), ExportFormat::Png, &ExportOptions::default()).unwrap();

    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    // Door hinge at (0, 200) swings 100 to the left: x -100..300, y 0..300.
    assert_eq!((info.width, info.height), (520, 420));
}

#[test]
fn test_png_strokes_land_on_bounds_offset() {
    let session = room();
    let options = ExportOptions::default().with_background(Background::Transparent);
    let image = render_png(session.document(), &options).unwrap();
    // First wall runs along world y = 0, image y = 60, starting at image x = 160.
    let pixel = image.pixel(300, 60).unwrap();
    assert!(pixel[3] > 0, "{pixel:?}");
    assert_eq!(image.pixel(300, 30), Some([0, 0, 0, 0]));
}

#[test]
fn test_svg_and_dxf_agree_on_count() {
    let mut session = room();
    assert!(session.calibrate_from_last(90.0));
    session.set_unit(Unit::M);

    let svg = String::from_utf8(export(session.document(), ExportFormat::Svg, &ExportOptions::default()).unwrap()).unwrap();
    assert_eq!(svg.matches("<text ").count(), 4);
    assert!(svg.contains(">0.90m</text>"));

    let dxf = export_dxf(session.document()).unwrap();
    assert_eq!(dxf.matches("0\nLINE\n").count(), session.document().len());
}

#[test]
fn test_json_export_restores_session() {
    let session = room();
    let json = export(session.document(), ExportFormat::Json, &ExportOptions::default()).unwrap();

    let mut restored = Session::new();
    restored.import_document(std::str::from_utf8(&json).unwrap()).unwrap();
    assert_eq!(restored.document(), session.document());
}
