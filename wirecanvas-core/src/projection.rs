//! Projection modes and the homogeneous divide
use nalgebra::{Matrix4, Point3};

use crate::transform::Transform;

/// Projection mode for 3D objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Parallel,
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Parallel => ProjectionMode::Perspective,
            ProjectionMode::Perspective => ProjectionMode::Parallel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectionMode::Parallel => "Parallel",
            ProjectionMode::Perspective => "Perspective",
        }
    }
}

/// Apply a projection matrix and divide by `w`.
///
/// Returns `None` when the point is behind the eye (`w <= 0`) or `w` is not
/// finite: such a point has no pixel and must not be drawn.
pub fn project_point(m: &Matrix4<f64>, point: Point3<f64>) -> Option<Point3<f64>> {
    let h = Transform::apply_3d(m, point.x, point.y, point.z);
    let w = h[3];
    if !w.is_finite() || w <= 0.0 {
        return None;
    }
    Some(Point3::new(h[0] / w, h[1] / w, h[2] / w))
}
