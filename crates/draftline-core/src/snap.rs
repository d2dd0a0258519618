//! Snap functionality for attaching points to existing vertices.

use crate::shapes::{Endpoint, Primitive, PrimitiveId};
use kurbo::Point;

/// Snap catch radius in screen pixels.
pub const SNAP_DIST: f64 = 15.0;

/// A vertex that a point can snap to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// The vertex location.
    pub point: Point,
    /// Primitive owning the vertex.
    pub primitive: PrimitiveId,
    /// Which end of the primitive it is.
    pub endpoint: Endpoint,
}

/// Where a cursor landed after snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point, or the input point when nothing was in range.
    pub point: Point,
    /// Whether a vertex was found.
    pub snapped: bool,
    /// The vertex snapped to, for visual feedback.
    pub target: Option<SnapTarget>,
}

impl SnapResult {
    /// Unsnapped passthrough.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped: false,
            target: None,
        }
    }
}

/// Collect both endpoints of every primitive except `exclude`, in document order.
pub fn snap_targets(primitives: &[Primitive], exclude: Option<PrimitiveId>) -> Vec<SnapTarget> {
    primitives
        .iter()
        .filter(|p| Some(p.id()) != exclude)
        .flat_map(|p| {
            [Endpoint::P1, Endpoint::P2].map(|endpoint| SnapTarget {
                point: p.endpoint(endpoint),
                primitive: p.id(),
                endpoint,
            })
        })
        .collect()
}

/// Snap a point to the nearest target strictly closer than `threshold`.
///
/// The first target at the minimum distance wins.
pub fn snap_to_targets(point: Point, targets: &[SnapTarget], threshold: f64) -> SnapResult {
    let mut best_target: Option<&SnapTarget> = None;
    let mut best_dist_sq = threshold * threshold;

    for target in targets {
        let dist_sq = (point - target.point).hypot2();
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best_target = Some(target);
        }
    }

    match best_target {
        Some(target) => SnapResult {
            point: target.point,
            snapped: true,
            target: Some(*target),
        },
        None => SnapResult::none(point),
    }
}

/// Find the vertex nearest to `point` within `snap_dist / zoom` world units.
///
/// `exclude` skips the primitive being edited so an endpoint never snaps to
/// itself or its own anchor.
pub fn find_snap_with(
    primitives: &[Primitive],
    point: Point,
    exclude: Option<PrimitiveId>,
    zoom: f64,
    snap_dist: f64,
) -> SnapResult {
    let targets = snap_targets(primitives, exclude);
    snap_to_targets(point, &targets, snap_dist / zoom)
}

/// [`find_snap_with`] using the default [`SNAP_DIST`].
pub fn find_snap(primitives: &[Primitive], point: Point, exclude: Option<PrimitiveId>, zoom: f64) -> SnapResult {
    find_snap_with(primitives, point, exclude, zoom, SNAP_DIST)
}
