//! Camera module for pan/zoom transforms.
//!
//! Step positions and hit-testing live in world coordinates; pointer events
//! arrive in screen coordinates. The free functions below are the single place
//! where the two are converted, so placement math and rendering never drift.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default lower zoom bound.
pub const MIN_ZOOM: f64 = 0.1;
/// Default upper zoom bound.
pub const MAX_ZOOM: f64 = 10.0;

/// Convert a screen point to world coordinates.
///
/// `zoom` must be strictly positive; [`Camera`] guarantees this for its own zoom.
pub fn screen_to_world(screen: Point, zoom: f64, pan: Vec2) -> Point {
    Point::new((screen.x - pan.x) / zoom, (screen.y - pan.y) / zoom)
}

/// Convert a world point to screen coordinates. Inverse of [`screen_to_world`].
pub fn world_to_screen(world: Point, zoom: f64, pan: Vec2) -> Point {
    Point::new(world.x * zoom + pan.x, world.y * zoom + pan.y)
}

/// Camera manages the view transform for the designer canvas.
///
/// The offset is in screen pixels. The zoom is always finite and inside
/// `[min_zoom, max_zoom]`; invalid requests are rejected rather than applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan) in screen pixels.
    pub offset: Vec2,
    zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom bounds.
    ///
    /// Bounds that are not finite and positive, or that are inverted, fall back
    /// to the defaults.
    pub fn with_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        let valid =
            min_zoom.is_finite() && max_zoom.is_finite() && min_zoom > 0.0 && min_zoom <= max_zoom;
        if !valid {
            log::warn!("Ignoring invalid zoom bounds [{}, {}]", min_zoom, max_zoom);
            return Self::default();
        }
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom level, clamped to the camera bounds.
    ///
    /// Returns `false` (and leaves the zoom untouched) for zero, negative or
    /// non-finite values.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() || zoom <= 0.0 {
            log::warn!("Rejected zoom level {}", zoom);
            return false;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        true
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        screen_to_world(screen_point, self.zoom, self.offset)
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        world_to_screen(world_point, self.zoom, self.offset)
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the camera by `factor`, keeping the given screen point fixed.
    ///
    /// Returns `true` if the zoom level changed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Rejected zoom factor {}", factor);
            return false;
        }
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Keep world_point under the cursor
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
        true
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the camera to show the given world bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            self.reset();
            return;
        }

        let padded_viewport = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / bounds.width();
        let scale_y = padded_viewport.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);

        self.offset = Vec2::new(
            viewport_center.x - bounds_center.x * self.zoom,
            viewport_center.y - bounds_center.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_zoom() {
        let world = screen_to_world(Point::new(120.0, 240.0), 2.0, Vec2::new(20.0, 40.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let zooms = [0.1, 0.37, 1.0, 1.5, 4.0, 10.0];
        let pans = [Vec2::ZERO, Vec2::new(30.0, -20.0), Vec2::new(-812.5, 1033.25)];
        let points = [Point::ZERO, Point::new(123.0, 456.0), Point::new(-77.7, 9001.0)];

        for &zoom in &zooms {
            for &pan in &pans {
                for &screen in &points {
                    let back = world_to_screen(screen_to_world(screen, zoom, pan), zoom, pan);
                    assert!((back.x - screen.x).abs() < 1e-9, "x drift at zoom {zoom}");
                    assert!((back.y - screen.y).abs() < 1e-9, "y drift at zoom {zoom}");
                }
            }
        }
    }

    #[test]
    fn test_camera_matches_affine() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(15.0, -5.0);
        assert!(camera.set_zoom(2.5));

        let world = Point::new(10.0, 20.0);
        let via_fn = camera.world_to_screen(world);
        let via_affine = camera.transform() * world;
        assert!((via_fn.x - via_affine.x).abs() < 1e-9);
        assert!((via_fn.y - via_affine.y).abs() < 1e-9);
    }

    #[test]
    fn test_set_zoom_rejects_degenerate_values() {
        let mut camera = Camera::new();
        assert!(!camera.set_zoom(0.0));
        assert!(!camera.set_zoom(-2.0));
        assert!(!camera.set_zoom(f64::NAN));
        assert!(!camera.set_zoom(f64::INFINITY));
        assert!((camera.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom() - camera.min_zoom).abs() < f64::EPSILON);

        camera.set_zoom(1.0);
        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom() - camera.max_zoom).abs() < f64::EPSILON);

        camera.set_zoom(500.0);
        assert!((camera.zoom() - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(40.0, 10.0);
        let anchor = Point::new(300.0, 200.0);
        let before = camera.screen_to_world(anchor);

        assert!(camera.zoom_at(anchor, 1.25));
        let after = camera.screen_to_world(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_bounds_fall_back() {
        let camera = Camera::with_bounds(0.0, 5.0);
        assert!((camera.min_zoom - MIN_ZOOM).abs() < f64::EPSILON);
        let camera = Camera::with_bounds(2.0, 1.0);
        assert!((camera.max_zoom - MAX_ZOOM).abs() < f64::EPSILON);
        let camera = Camera::with_bounds(2.0, 4.0);
        assert!((camera.zoom() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut camera = Camera::new();
        let bounds = Rect::new(100.0, 100.0, 300.0, 200.0);
        camera.fit_to_bounds(bounds, Size::new(800.0, 600.0), 50.0);

        let center = camera.world_to_screen(bounds.center());
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }
}
