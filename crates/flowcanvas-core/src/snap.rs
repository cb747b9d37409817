//! Grid snapping for step placement and dragging.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Grid size for snapping in world units (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Snap mode for aligning steps to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Snap to grid intersections.
    #[default]
    Grid,
}

impl SnapMode {
    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        self == SnapMode::Grid
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round a single coordinate to the nearest multiple of `grid_size`.
///
/// Halves round away from zero (`f64::round`), so `30 -> 40` and `-30 -> -40`
/// on a grid of 20.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return SnapResult::none(point);
    }
    SnapResult {
        point: Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size)),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Snap a point based on the current snap mode.
pub fn snap_point(point: Point, mode: SnapMode, grid_size: f64) -> SnapResult {
    match mode {
        SnapMode::None => SnapResult::none(point),
        SnapMode::Grid => snap_to_grid(point, grid_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid_rounds_each_axis() {
        let result = snap_to_grid(Point::new(27.0, 53.0), GRID_SIZE);
        assert_eq!(result.point, Point::new(20.0, 60.0));
        assert!(result.is_snapped());
    }

    #[test]
    fn test_snap_halfway_rounds_away_from_zero() {
        assert_eq!(snap_value(30.0, 20.0), 40.0);
        assert_eq!(snap_value(10.0, 20.0), 20.0);
        assert_eq!(snap_value(-30.0, 20.0), -40.0);
        assert_eq!(snap_value(29.999, 20.0), 20.0);
    }

    #[test]
    fn test_snap_mode_none_passes_through() {
        let p = Point::new(27.0, 53.0);
        let result = snap_point(p, SnapMode::None, GRID_SIZE);
        assert_eq!(result.point, p);
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_degenerate_grid_is_ignored() {
        let p = Point::new(27.0, 53.0);
        assert_eq!(snap_to_grid(p, 0.0).point, p);
        assert_eq!(snap_to_grid(p, -20.0).point, p);
    }

    #[test]
    fn test_snap_mode_default() {
        assert!(SnapMode::default().snaps_to_grid());
        assert!(!SnapMode::None.snaps_to_grid());
    }
}
