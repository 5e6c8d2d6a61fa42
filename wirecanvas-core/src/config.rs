//! # Configuration
//!
//! Centralized constants for the kernel plus the per-canvas [`CanvasConfig`].
//!
//! ## Categories
//!
//! - **Precision**: floating-point comparison tolerances
//! - **Limits**: bounds on grids, resolutions and drawable coordinates
//! - **Defaults**: initial window bounds and canvas behaviour

use crate::clipping::LineClipping;
use crate::projection::ProjectionMode;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Tolerance used when comparing coordinates for equality, e.g. the G0
/// continuity check between consecutive Bézier segments.
pub const EPSILON: f64 = 1e-9;

// =============================================================================
// LIMITS
// =============================================================================

/// Smallest control grid (rows and columns) a bicubic surface accepts.
pub const MIN_SURFACE_GRID: usize = 4;

/// Largest control grid (rows and columns) the forward-difference surface
/// accepts.
pub const MAX_SURFACE_GRID: usize = 20;

/// Upper bound on samples per parametric dimension of a surface.
pub const MAX_SURFACE_RESOLUTION: usize = 100;

/// Largest pixel coordinate magnitude that is still handed to a renderer.
///
/// Anything beyond this is reported as an overflow and the owning object is
/// skipped for the frame.
pub const MAX_DRAWABLE_COORDINATE: f64 = i32::MAX as f64;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Half extent of the default window along every axis: `-10..10`.
pub const DEFAULT_WINDOW_EXTENT: f64 = 10.0;

/// Samples per surface dimension when the caller does not choose one.
pub const DEFAULT_SURFACE_RESOLUTION: usize = 20;

/// Steps used to sample each 2D curve segment.
pub const DEFAULT_CURVE_PRECISION: usize = 100;

/// Distance from the eye to the window centre in perspective mode.
pub const DEFAULT_PERSPECTIVE_DISTANCE: f64 = 30.0;

/// What [`crate::Canvas::move_view`] does with its deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Deltas pan the window.
    #[default]
    Pan,
    /// Deltas rotate the window about x/y/z.
    Rotate,
}

/// Behaviour switches and step sizes of one canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Inset in pixels between the drawing surface edge and the viewport.
    pub border_width: f64,
    /// World units panned per unit of [`crate::Canvas::pan`] input.
    pub pan_step: f64,
    /// Factor applied by zoom out (and its inverse by zoom in).
    pub zoom_factor: f64,
    /// Degrees rotated per unit of [`crate::Canvas::move_view`] input in
    /// [`MovementMode::Rotate`].
    pub rotation_step: f64,
    pub line_clipping: LineClipping,
    pub projection: ProjectionMode,
    pub perspective_distance: f64,
    pub curve_precision: usize,
    /// Radius in pixels of the marker drawn for a dot.
    pub dot_radius: f64,
    pub show_control_points: bool,
    pub movement: MovementMode,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            border_width: 50.0,
            pan_step: 1.0,
            zoom_factor: 1.2,
            rotation_step: 15.0,
            line_clipping: LineClipping::CohenSutherland,
            projection: ProjectionMode::Parallel,
            perspective_distance: DEFAULT_PERSPECTIVE_DISTANCE,
            curve_precision: DEFAULT_CURVE_PRECISION,
            dot_radius: 3.0,
            show_control_points: false,
            movement: MovementMode::Pan,
        }
    }
}
