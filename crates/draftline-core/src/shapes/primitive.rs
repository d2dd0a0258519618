//! The primitive segment.

use super::{Endpoint, PrimitiveId, PrimitiveKind};
use kurbo::{Line as KurboLine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight wall, window or door segment in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub(crate) id: PrimitiveId,
    /// First endpoint (door hinge).
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
    kind: PrimitiveKind,
    /// Locked length, present only while the length lock is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_length: Option<f64>,
}

impl Primitive {
    /// Create a new primitive.
    pub fn new(kind: PrimitiveKind, p1: Point, p2: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            p1,
            p2,
            kind,
            fixed_length: None,
        }
    }

    /// Create a wall segment.
    pub fn wall(p1: Point, p2: Point) -> Self {
        Self::new(PrimitiveKind::Wall, p1, p2)
    }

    /// Create a window segment.
    pub fn window(p1: Point, p2: Point) -> Self {
        Self::new(PrimitiveKind::Window, p1, p2)
    }

    /// Create a door hinged at `p1`.
    pub fn door(p1: Point, p2: Point, mirrored: bool) -> Self {
        Self::new(PrimitiveKind::Door { mirrored }, p1, p2)
    }

    /// Reconstruct a primitive with a specific ID and lock state (for import).
    pub(crate) fn reconstruct(
        id: PrimitiveId,
        kind: PrimitiveKind,
        p1: Point,
        p2: Point,
        fixed_length: Option<f64>,
    ) -> Self {
        Self {
            id,
            p1,
            p2,
            kind,
            fixed_length: fixed_length.filter(|len| len.is_finite() && *len > 0.0),
        }
    }

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Segment length in world pixels.
    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).hypot()
    }

    /// Direction of `p1 -> p2` in radians.
    pub fn angle(&self) -> f64 {
        let d = self.p2 - self.p1;
        d.y.atan2(d.x)
    }

    pub fn midpoint(&self) -> Point {
        self.p1.midpoint(self.p2)
    }

    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.p1, self.p2)
    }

    pub fn endpoint(&self, which: Endpoint) -> Point {
        match which {
            Endpoint::P1 => self.p1,
            Endpoint::P2 => self.p2,
        }
    }

    /// Move one endpoint. Constraints are the caller's responsibility.
    pub fn set_endpoint(&mut self, which: Endpoint, point: Point) {
        match which {
            Endpoint::P1 => self.p1 = point,
            Endpoint::P2 => self.p2 = point,
        }
    }

    /// Move both endpoints by the same offset.
    pub fn translate(&mut self, delta: Vec2) {
        self.p1 += delta;
        self.p2 += delta;
    }

    pub fn is_locked(&self) -> bool {
        self.fixed_length.is_some()
    }

    pub fn fixed_length(&self) -> Option<f64> {
        self.fixed_length
    }

    /// Turn the length lock on or off. Locking captures the current length.
    pub fn set_length_locked(&mut self, locked: bool) {
        self.fixed_length = if locked { Some(self.length()) } else { None };
    }

    /// Resize the segment along its current direction, keeping `p1` fixed.
    ///
    /// A locked segment adopts the new length as its locked length.
    pub fn set_length(&mut self, length: f64) {
        let angle = self.angle();
        self.p2 = Point::new(
            self.p1.x + angle.cos() * length,
            self.p1.y + angle.sin() * length,
        );
        if self.fixed_length.is_some() {
            self.fixed_length = Some(length);
        }
    }

    /// Whether this is a door drawn with the mirrored swing.
    pub fn is_mirrored(&self) -> bool {
        matches!(self.kind, PrimitiveKind::Door { mirrored: true })
    }

    /// Flip a door's swing side. Returns `false` for walls and windows.
    pub fn toggle_mirror(&mut self) -> bool {
        match &mut self.kind {
            PrimitiveKind::Door { mirrored } => {
                *mirrored = !*mirrored;
                true
            }
            _ => false,
        }
    }

    /// Axis-aligned bounds of the two endpoints.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.p1, self.p2)
    }

    /// Bounds including a door's full swing, used to size exports.
    pub fn extent(&self) -> Rect {
        match self.kind {
            PrimitiveKind::Door { .. } => {
                let r = self.length();
                self.bounds()
                    .union(Rect::new(self.p1.x - r, self.p1.y - r, self.p1.x + r, self.p1.y + r))
            }
            _ => self.bounds(),
        }
    }

    /// The endpoint within `radius` of `point`, preferring `p1`.
    pub fn endpoint_at(&self, point: Point, radius: f64) -> Option<Endpoint> {
        if point.distance(self.p1) < radius {
            Some(Endpoint::P1)
        } else if point.distance(self.p2) < radius {
            Some(Endpoint::P2)
        } else {
            None
        }
    }

    /// Whether `point` lies on the segment body.
    ///
    /// Uses the triangle inequality slack `|d(p,p1) + d(p,p2) - len|`, which
    /// is zero exactly on the segment.
    pub fn body_hit(&self, point: Point, tolerance: f64) -> bool {
        let slack = point.distance(self.p1) + point.distance(self.p2) - self.length();
        slack.abs() < tolerance
    }
}
