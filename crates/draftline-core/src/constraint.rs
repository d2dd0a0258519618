//! Constraints applied while an endpoint is being repositioned.

use kurbo::{Point, Vec2};

/// Active constraints for a single endpoint edit.
///
/// Applied in order: orthogonal lock first, then the fixed length, which
/// keeps the direction but is authoritative over the magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constraints {
    /// Force the segment horizontal or vertical (Shift held).
    pub ortho: bool,
    /// Locked length of the edited primitive.
    pub fixed_length: Option<f64>,
}

impl Constraints {
    pub fn new(ortho: bool, fixed_length: Option<f64>) -> Self {
        Self { ortho, fixed_length }
    }

    /// Adjust `candidate` given the fixed `anchor` endpoint.
    pub fn apply(&self, anchor: Point, candidate: Point) -> Point {
        let mut point = candidate;
        if self.ortho {
            point = ortho_lock(anchor, point);
        }
        if let Some(length) = self.fixed_length {
            point = length_lock(anchor, point, length);
        }
        point
    }
}

/// Snap `candidate` onto the horizontal or vertical through `anchor`,
/// whichever axis it is further along.
pub fn ortho_lock(anchor: Point, candidate: Point) -> Point {
    let d = candidate - anchor;
    if d.x.abs() > d.y.abs() {
        Point::new(candidate.x, anchor.y)
    } else {
        Point::new(anchor.x, candidate.y)
    }
}

/// Place a point `length` away from `anchor` in the direction of `candidate`.
///
/// A candidate on top of the anchor has direction 0 (`atan2(0, 0)`).
pub fn length_lock(anchor: Point, candidate: Point, length: f64) -> Point {
    let theta = (candidate - anchor).atan2();
    anchor + Vec2::from_angle(theta) * length
}
