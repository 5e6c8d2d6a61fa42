//! Homogeneous 2D/3D transformation matrices and rotation state
//!
//! Convention used throughout the crate: points are ROW vectors multiplied on
//! the left, `[x, y, 1] * M` (2D) and `[x, y, z, 1] * M` (3D). Translation
//! lives in the last row and `A * B` applies `A` first. All angles are in
//! degrees; positive angles rotate counter-clockwise.
use nalgebra::{Matrix3, Matrix4, Point2, RowVector3, RowVector4};

use crate::geometry::Point3D;

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Rotation state around three axes (in degrees, each kept in `[0, 360)`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: normalize_angle(x),
            y: normalize_angle(y),
            z: normalize_angle(z),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x = normalize_angle(self.x + dx);
        self.y = normalize_angle(self.y + dy);
        self.z = normalize_angle(self.z + dz);
    }
}

/// Transform builder for 2D and 3D transformations
pub struct Transform;

impl Transform {
    pub fn translation_2d(dx: f64, dy: f64) -> Matrix3<f64> {
        Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            dx, dy, 1.0,
        )
    }

    pub fn scale_2d(sx: f64, sy: f64) -> Matrix3<f64> {
        Matrix3::new(
            sx, 0.0, 0.0, //
            0.0, sy, 0.0, //
            0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_2d(angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.to_radians().sin_cos();
        Matrix3::new(
            c, s, 0.0, //
            -s, c, 0.0, //
            0.0, 0.0, 1.0,
        )
    }

    /// Rotation correction applied to normalized coordinates for a window
    /// rotated by `angle`: the scene turns the opposite way on screen.
    pub fn window_transform(angle: f64) -> Matrix3<f64> {
        Self::rotation_2d(-angle)
    }

    pub fn translation_3d(dx: f64, dy: f64, dz: f64) -> Matrix4<f64> {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            dx, dy, dz, 1.0,
        )
    }

    pub fn scale_3d(sx: f64, sy: f64, sz: f64) -> Matrix4<f64> {
        Matrix4::new(
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, sz, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_x(angle: f64) -> Matrix4<f64> {
        let (s, c) = angle.to_radians().sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, s, 0.0, //
            0.0, -s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_y(angle: f64) -> Matrix4<f64> {
        let (s, c) = angle.to_radians().sin_cos();
        Matrix4::new(
            c, 0.0, -s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn rotation_z(angle: f64) -> Matrix4<f64> {
        let (s, c) = angle.to_radians().sin_cos();
        Matrix4::new(
            c, s, 0.0, 0.0, //
            -s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Combined rotation `Rx · Ry · Rz`: X is applied first, then Y, then Z.
    pub fn rotation_3d(ax: f64, ay: f64, az: f64) -> Matrix4<f64> {
        Self::rotation_x(ax) * Self::rotation_y(ay) * Self::rotation_z(az)
    }

    /// Perspective onto the plane `z = d` with the centre of projection at
    /// the origin. The homogeneous `w` of the result is `z / d`.
    pub fn perspective(d: f64) -> Matrix4<f64> {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 1.0 / d, //
            0.0, 0.0, 0.0, 0.0,
        )
    }

    /// `translate(-pivot) · m · translate(pivot)`
    pub fn about_pivot_2d(m: &Matrix3<f64>, pivot: Point2<f64>) -> Matrix3<f64> {
        Self::translation_2d(-pivot.x, -pivot.y) * m * Self::translation_2d(pivot.x, pivot.y)
    }

    /// `translate(-pivot) · m · translate(pivot)`
    pub fn about_pivot_3d(m: &Matrix4<f64>, pivot: &Point3D) -> Matrix4<f64> {
        Self::translation_3d(-pivot.x, -pivot.y, -pivot.z)
            * m
            * Self::translation_3d(pivot.x, pivot.y, pivot.z)
    }

    pub fn apply_2d(m: &Matrix3<f64>, point: Point2<f64>) -> Point2<f64> {
        let row = RowVector3::new(point.x, point.y, 1.0) * m;
        Point2::new(row[0], row[1])
    }

    /// Full homogeneous product, no divide.
    pub fn apply_3d(m: &Matrix4<f64>, x: f64, y: f64, z: f64) -> RowVector4<f64> {
        RowVector4::new(x, y, z, 1.0) * m
    }
}
