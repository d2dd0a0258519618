//! Per-kind geometry derivation shared by live rendering and export.
//!
//! Every surface draws a primitive from the same [`PrimitiveGeometry`], so
//! the window offsets and door swing on screen are exactly the ones written
//! to PNG and SVG files.

use super::{Primitive, PrimitiveKind};
use kurbo::{Arc, Line, Point, Vec2};
use std::f64::consts::FRAC_PI_2;

/// Half-distance between the two strokes of a window, in screen pixels.
pub const WINDOW_GAP: f64 = 3.0;

/// Dash length (and gap) of a door swing arc, in screen pixels.
pub const DOOR_DASH: f64 = 5.0;

/// Opacity of a door frame stroke.
pub const DOOR_FRAME_OPACITY: f64 = 0.3;

/// The drawable parts of a door.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorGeometry {
    /// The opening itself, drawn faded.
    pub frame: Line,
    /// The open leaf, hinged at `p1`, perpendicular to the frame.
    pub leaf: Line,
    /// Quarter circle joining the frame end and the leaf end.
    pub swing: Arc,
}

/// Derived geometry of one primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveGeometry {
    Wall(Line),
    Window([Line; 2]),
    Door(DoorGeometry),
}

/// What a stroke represents, so surfaces can pick colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkRole {
    Wall,
    Window,
    DoorFrame,
    DoorLeaf,
    DoorSwing,
}

/// A single stroke of derived geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    Segment {
        line: Line,
        role: MarkRole,
        opacity: f64,
    },
    Arc {
        arc: Arc,
        role: MarkRole,
        /// Dash length and gap, in world units.
        dash: Option<f64>,
    },
}

impl Mark {
    pub fn role(&self) -> MarkRole {
        match self {
            Mark::Segment { role, .. } | Mark::Arc { role, .. } => *role,
        }
    }
}

impl Primitive {
    /// Derive the strokes for this primitive.
    ///
    /// `zoom` keeps window gaps and dash lengths constant on screen; exports
    /// pass `1.0`.
    pub fn geometry(&self, zoom: f64) -> PrimitiveGeometry {
        match self.kind() {
            PrimitiveKind::Wall => PrimitiveGeometry::Wall(self.as_kurbo()),
            PrimitiveKind::Window => PrimitiveGeometry::Window(window_lines(self.p1, self.p2, WINDOW_GAP / zoom)),
            PrimitiveKind::Door { mirrored } => PrimitiveGeometry::Door(door_geometry(self.p1, self.p2, mirrored)),
        }
    }
}

impl PrimitiveGeometry {
    /// Flatten into strokes, in draw order.
    pub fn marks(&self, zoom: f64) -> Vec<Mark> {
        match *self {
            PrimitiveGeometry::Wall(line) => vec![Mark::Segment {
                line,
                role: MarkRole::Wall,
                opacity: 1.0,
            }],
            PrimitiveGeometry::Window(lines) => lines
                .iter()
                .map(|&line| Mark::Segment {
                    line,
                    role: MarkRole::Window,
                    opacity: 1.0,
                })
                .collect(),
            PrimitiveGeometry::Door(door) => vec![
                Mark::Segment {
                    line: door.frame,
                    role: MarkRole::DoorFrame,
                    opacity: DOOR_FRAME_OPACITY,
                },
                Mark::Segment {
                    line: door.leaf,
                    role: MarkRole::DoorLeaf,
                    opacity: 1.0,
                },
                Mark::Arc {
                    arc: door.swing,
                    role: MarkRole::DoorSwing,
                    dash: Some(DOOR_DASH / zoom),
                },
            ],
        }
    }
}

/// The two offset strokes of a window.
fn window_lines(p1: Point, p2: Point, gap: f64) -> [Line; 2] {
    let angle = (p2 - p1).atan2();
    let offset = Vec2::new(angle.sin() * gap, -angle.cos() * gap);
    [
        Line::new(p1 + offset, p2 + offset),
        Line::new(p1 - offset, p2 - offset),
    ]
}

/// Leaf and swing of a door hinged at `p1`.
///
/// The leaf is the frame rotated by -90° (or +90° when mirrored). The arc
/// always sweeps +90°, from the leaf to the frame end or from the frame end
/// to the leaf, so its ends coincide with both.
fn door_geometry(p1: Point, p2: Point, mirrored: bool) -> DoorGeometry {
    let d = p2 - p1;
    let angle = d.atan2();
    let radius = d.hypot();
    let sign = if mirrored { 1.0 } else { -1.0 };
    let leaf_angle = angle + sign * FRAC_PI_2;
    let leaf_end = p1 + Vec2::from_angle(leaf_angle) * radius;
    let start_angle = if mirrored { angle } else { angle - FRAC_PI_2 };

    DoorGeometry {
        frame: Line::new(p1, p2),
        leaf: Line::new(p1, leaf_end),
        swing: Arc {
            center: p1,
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle: FRAC_PI_2,
            x_rotation: 0.0,
        },
    }
}

/// Point where an arc starts.
pub fn arc_start(arc: &Arc) -> Point {
    arc.center + Vec2::new(arc.start_angle.cos() * arc.radii.x, arc.start_angle.sin() * arc.radii.y)
}

/// Point where an arc ends.
pub fn arc_end(arc: &Arc) -> Point {
    let end = arc.start_angle + arc.sweep_angle;
    arc.center + Vec2::new(end.cos() * arc.radii.x, end.sin() * arc.radii.y)
}
