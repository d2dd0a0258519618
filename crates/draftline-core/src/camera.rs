//! Screen <-> world mapping for the drawing canvas.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor the camera accepts.
pub const MIN_ZOOM: f64 = 0.05;
/// Largest zoom factor the camera accepts.
pub const MAX_ZOOM: f64 = 50.0;

/// Pan and zoom of the canvas view.
///
/// `pan` is the world point shown at the top-left corner of the surface and
/// `zoom` the number of screen pixels per world unit, so
/// `screen_to_world(s) = s / zoom + pan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// World point drawn at the top-left pixel.
    pub pan: Vec2,
    /// Screen pixels per world unit.
    pub zoom: f64,
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-to-screen transform, equivalent to [`Camera::world_to_screen`].
    pub fn transform(&self) -> Affine {
        Affine::scale(self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        (screen.to_vec2() / self.zoom + self.pan).to_point()
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        ((world.to_vec2() - self.pan) * self.zoom).to_point()
    }

    /// Pan by a pointer drag of `delta` screen pixels.
    ///
    /// The drawing follows the pointer, so the world origin moves the
    /// opposite way.
    pub fn pan_by_screen(&mut self, delta: Vec2) {
        self.pan -= delta / self.zoom;
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    ///
    /// Returns `false` (and leaves the camera untouched) when the new zoom
    /// would fall outside `[min_zoom, max_zoom]`.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_zoom = self.zoom * factor;
        if !new_zoom.is_finite() || new_zoom < self.min_zoom || new_zoom > self.max_zoom {
            return false;
        }

        let before = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        let after = self.screen_to_world(screen_point);

        // Shift pan so `before` is under the cursor again
        self.pan += before - after;
        true
    }

    /// Zoom in one step about the screen origin.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.2).clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom out one step about the screen origin.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom * 0.8).clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom as a whole percentage for status display.
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }

    /// Back to the origin at 100%.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Zoom and pan so `bounds` fills `viewport`, leaving `padding` pixels
    /// on every side. Degenerate bounds reset the view.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let room = |extent: f64| (extent - 2.0 * padding).max(1.0);
        let fit = f64::min(room(viewport.width) / bounds.width(), room(viewport.height) / bounds.height());
        self.zoom = fit.clamp(self.min_zoom, self.max_zoom);

        let half_view = Vec2::new(viewport.width, viewport.height) / (2.0 * self.zoom);
        self.pan = bounds.center().to_vec2() - half_view;
    }
}
