//! Editing workflows driven through the public session API.

use draftline_core::{
    Document, Endpoint, FileStorage, MouseButton, PointerEvent, Session, SessionConfig, ToolKind, Unit,
};
use kurbo::{Point, Vec2};
use std::sync::Arc;

fn click_drag(session: &mut Session, from: Point, to: Point) {
    session.handle_pointer(PointerEvent::Down {
        position: from,
        button: MouseButton::Left,
    });
    session.handle_pointer(PointerEvent::Move { position: to });
    session.handle_pointer(PointerEvent::Up {
        position: to,
        button: MouseButton::Left,
    });
}

fn draw(session: &mut Session, tool: ToolKind, a: Point, b: Point) {
    session.set_tool(tool);
    session.begin_draw(a);
    session.update_draw(b);
    assert!(session.commit_draw().is_some());
}

#[test]
fn test_screen_events_at_zoom_snap_in_world_space() {
    let mut session = Session::new();
    session.camera.zoom = 2.0;
    session.camera.pan = Vec2::new(10.0, 10.0);

    session.set_tool(ToolKind::Wall);
    click_drag(&mut session, Point::new(0.0, 0.0), Point::new(200.0, 0.0));
    let wall = session.document().last().unwrap().clone();
    assert_eq!(wall.p1, Point::new(10.0, 10.0));
    assert_eq!(wall.p2, Point::new(110.0, 10.0));

    // Under three world units from the wall's end: inside 15px / zoom 2.
    session.set_tool(ToolKind::Window);
    click_drag(&mut session, Point::new(205.0, 3.0), Point::new(200.0, 100.0));
    let window = session.document().last().unwrap();
    assert_eq!(window.p1, wall.p2);
    assert_eq!(window.p2, Point::new(110.0, 60.0));
}

#[test]
fn test_select_tool_drags_endpoint_with_lock() {
    let mut session = Session::new();
    draw(&mut session, ToolKind::Wall, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    session.set_length_locked(true).unwrap();

    session.set_tool(ToolKind::Select);
    click_drag(&mut session, Point::new(100.0, 0.0), Point::new(0.0, 300.0));

    let wall = session.document().last().unwrap();
    assert!((wall.length() - 100.0).abs() < 1e-9);
    assert!((wall.endpoint(Endpoint::P2) - Point::new(0.0, 100.0)).hypot() < 1e-9);
}

#[test]
fn test_history_capacity_evicts_oldest() {
    let config = SessionConfig {
        history_capacity: 3,
        ..SessionConfig::default()
    };
    let mut session = Session::with_config(config);
    for i in 0..5 {
        let y = i as f64 * 40.0;
        draw(&mut session, ToolKind::Wall, Point::new(0.0, y), Point::new(100.0, y));
    }

    let mut undone = 0;
    while session.undo() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(session.document().len(), 2);

    assert!(session.redo());
    assert_eq!(session.document().len(), 3);
}

#[test]
fn test_file_backed_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());

    let mut session = Session::new().with_store(storage.clone());
    draw(&mut session, ToolKind::Wall, Point::new(0.0, 0.0), Point::new(250.0, 0.0));
    draw(&mut session, ToolKind::Door, Point::new(250.0, 0.0), Point::new(250.0, 90.0));
    session.toggle_mirror().unwrap();
    session.set_unit(Unit::M);
    assert!(session.calibrate_from_last(0.9));

    let mut restarted = Session::new().with_store(storage);
    assert!(restarted.restore_from_store().unwrap());
    assert_eq!(restarted.document(), session.document());
    assert!(restarted.document().last().unwrap().is_mirrored());
    assert_eq!(
        restarted.length_label(restarted.document().last().unwrap()).as_deref(),
        Some("D: 0.90m")
    );
}

#[test]
fn test_legacy_import_round_trips_natively() {
    let legacy = r#"{
        "lines": [
            {"x1": 0, "y1": 0, "x2": 120, "y2": 0, "type": "line", "locked": true, "fixedLen": 120},
            {"x1": 120, "y1": 0, "x2": 120, "y2": 80, "type": "door", "mirrored": true}
        ],
        "baseCmPerPixel": 0.5,
        "activeUnit": "mm"
    }"#;
    let mut session = Session::new();
    session.import_document(legacy).unwrap();
    assert_eq!(session.document().len(), 2);
    assert_eq!(session.document().calibration.active_unit, Unit::Mm);

    let json = session.document().to_json().unwrap();
    assert_eq!(&Document::from_json(&json).unwrap(), session.document());

    assert!(session.undo());
    assert!(session.document().is_empty());
}

#[test]
fn test_parametric_room_closes() {
    let mut session = Session::new();
    session.calibrate(1.0, 1.0, Unit::Cm);
    let added = session.apply_parametric("R300\nD200\nL300\nU200\n").unwrap();
    assert_eq!(added, 4);

    let prims = session.document().primitives();
    assert_eq!(prims[0].p1, Point::ZERO);
    assert!((prims[3].p2 - Point::ZERO).hypot() < 1e-9);
    assert!(session.apply_parametric("X5\nbanana").is_err());
    assert_eq!(session.document().len(), 4);
}
