//! Editor configuration.

use crate::camera::{Camera, MAX_ZOOM, MIN_ZOOM};
use crate::geometry::NodeMetrics;
use crate::hit::DEFAULT_PICK_WIDTH;
use crate::snap::{GRID_SIZE, SnapMode};
use serde::{Deserialize, Serialize};

/// Zoom factor applied per wheel notch.
pub const DEFAULT_ZOOM_STEP: f64 = 1.1;

/// Tunables for one editing session. Every field has a default, so partial
/// JSON files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid spacing in world units.
    pub grid_size: f64,
    /// Whether placement and dragging snap to the grid.
    pub snap: SnapMode,
    /// Clickable thickness of transition curves in world units.
    pub pick_width: f64,
    /// Step box size and minimum render scale.
    pub node: NodeMetrics,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom factor per wheel notch (> 1).
    pub zoom_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap: SnapMode::Grid,
            pick_width: DEFAULT_PICK_WIDTH,
            node: NodeMetrics::default(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl EditorConfig {
    /// Parse a configuration from JSON and replace unusable values with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace non-positive, non-finite or inconsistent values with defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !positive(self.grid_size) {
            log::warn!("Invalid grid size {}, using {}", self.grid_size, defaults.grid_size);
            self.grid_size = defaults.grid_size;
        }
        if !positive(self.pick_width) {
            log::warn!("Invalid pick width {}, using {}", self.pick_width, defaults.pick_width);
            self.pick_width = defaults.pick_width;
        }
        let node = &self.node;
        if !positive(node.width) || !positive(node.height) || !positive(node.min_scale) {
            log::warn!("Invalid node metrics {:?}, using defaults", self.node);
            self.node = defaults.node;
        }
        if !positive(self.min_zoom) || !positive(self.max_zoom) || self.min_zoom > self.max_zoom {
            log::warn!(
                "Invalid zoom bounds [{}, {}], using defaults",
                self.min_zoom,
                self.max_zoom
            );
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            log::warn!("Invalid zoom step {}, using {}", self.zoom_step, defaults.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        self
    }

    /// A camera honoring the configured zoom bounds.
    pub fn camera(&self) -> Camera {
        Camera::with_bounds(self.min_zoom, self.max_zoom)
    }
}
