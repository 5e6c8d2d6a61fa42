//! The viewing window: the visible region of world space and its rotation.

use nalgebra::{Matrix3, Matrix4, Point2, Point3, RowVector4};

use crate::config::DEFAULT_WINDOW_EXTENT;
use crate::error::WindowError;
use crate::projection::ProjectionMode;
use crate::transform::{RotationState, Transform};

/// World-space bounds plus rotation angles.
///
/// Always satisfies `xmax > xmin`, `ymax > ymin` and `zmax > zmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    xmin: f64,
    ymin: f64,
    zmin: f64,
    xmax: f64,
    ymax: f64,
    zmax: f64,
    rotation: RotationState,
}

impl Default for Window {
    fn default() -> Self {
        let e = DEFAULT_WINDOW_EXTENT;
        Self::new_2d(-e, -e, e, e)
    }
}

impl Window {
    /// A window with the given x/y bounds and the default depth.
    ///
    /// Bounds given in the wrong order are swapped. Zero-width bounds are
    /// widened to one unit.
    pub fn new_2d(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        let e = DEFAULT_WINDOW_EXTENT;
        Self::new_3d(xmin, ymin, -e, xmax, ymax, e)
    }

    pub fn new_3d(xmin: f64, ymin: f64, zmin: f64, xmax: f64, ymax: f64, zmax: f64) -> Self {
        let (xmin, xmax) = ordered(xmin, xmax);
        let (ymin, ymax) = ordered(ymin, ymax);
        let (zmin, zmax) = ordered(zmin, zmax);
        Self {
            xmin,
            ymin,
            zmin,
            xmax,
            ymax,
            zmax,
            rotation: RotationState::zero(),
        }
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn zmin(&self) -> f64 {
        self.zmin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn zmax(&self) -> f64 {
        self.zmax
    }

    /// `(xmin, ymin, xmax, ymax)`
    pub fn bounds_2d(&self) -> (f64, f64, f64, f64) {
        (self.xmin, self.ymin, self.xmax, self.ymax)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn depth(&self) -> f64 {
        self.zmax - self.zmin
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            (self.zmin + self.zmax) / 2.0,
        )
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    /// Local-to-world orientation `Rz(az) · Rx(ax) · Ry(ay)`.
    ///
    /// Its inverse is exactly what the projection (x, y) and the window
    /// transform (z) undo, so a pan along local x always moves along the
    /// on-screen x axis.
    pub fn orientation(&self) -> Matrix4<f64> {
        Transform::rotation_z(self.rotation.z)
            * Transform::rotation_x(self.rotation.x)
            * Transform::rotation_y(self.rotation.y)
    }

    /// Shift the window by a delta expressed in window-local units.
    pub fn pan(&mut self, dx: f64, dy: f64, dz: f64) -> Result<(), WindowError> {
        if !(dx.is_finite() && dy.is_finite() && dz.is_finite()) {
            return Err(WindowError::NonFinitePan);
        }
        let world = RowVector4::new(dx, dy, dz, 0.0) * self.orientation();
        self.xmin += world[0];
        self.xmax += world[0];
        self.ymin += world[1];
        self.ymax += world[1];
        self.zmin += world[2];
        self.zmax += world[2];
        log::trace!("window panned by ({}, {}, {})", world[0], world[1], world[2]);
        Ok(())
    }

    /// Centered rescale; `factor < 1` zooms in, `factor > 1` zooms out.
    pub fn zoom(&mut self, factor: f64) -> Result<(), WindowError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(WindowError::InvalidZoom(factor));
        }
        let c = self.center();
        let half_w = self.width() * factor / 2.0;
        let half_h = self.height() * factor / 2.0;
        let half_d = self.depth() * factor / 2.0;
        let bounds = [
            c.x - half_w,
            c.x + half_w,
            c.y - half_h,
            c.y + half_h,
            c.z - half_d,
            c.z + half_d,
        ];
        let usable = |h: f64| h > 0.0 && h.is_finite();
        if !(usable(half_w) && usable(half_h) && usable(half_d)) || !bounds.iter().all(|b| b.is_finite()) {
            return Err(WindowError::InvalidZoom(factor));
        }
        [self.xmin, self.xmax, self.ymin, self.ymax, self.zmin, self.zmax] = bounds;
        Ok(())
    }

    pub fn rotate(&mut self, ax: f64, ay: f64, az: f64) -> Result<(), WindowError> {
        if !(ax.is_finite() && ay.is_finite() && az.is_finite()) {
            return Err(WindowError::NonFiniteAngle);
        }
        self.rotation.rotate(ax, ay, az);
        Ok(())
    }

    pub fn rotate_x(&mut self, angle: f64) -> Result<(), WindowError> {
        self.rotate(angle, 0.0, 0.0)
    }

    pub fn rotate_y(&mut self, angle: f64) -> Result<(), WindowError> {
        self.rotate(0.0, angle, 0.0)
    }

    pub fn rotate_z(&mut self, angle: f64) -> Result<(), WindowError> {
        self.rotate(0.0, 0.0, angle)
    }

    /// Map `[min, max]` to `[-1, 1]` on every axis.
    pub fn world_to_normalized(&self, p: Point3<f64>) -> Point3<f64> {
        Point3::new(
            to_unit_range(p.x, self.xmin, self.xmax),
            to_unit_range(p.y, self.ymin, self.ymax),
            to_unit_range(p.z, self.zmin, self.zmax),
        )
    }

    pub fn normalized_to_world(&self, n: Point3<f64>) -> Point3<f64> {
        Point3::new(
            from_unit_range(n.x, self.xmin, self.xmax),
            from_unit_range(n.y, self.ymin, self.ymax),
            from_unit_range(n.z, self.zmin, self.zmax),
        )
    }

    pub fn world_to_normalized_2d(&self, p: Point2<f64>) -> Point2<f64> {
        Point2::new(
            to_unit_range(p.x, self.xmin, self.xmax),
            to_unit_range(p.y, self.ymin, self.ymax),
        )
    }

    pub fn normalized_to_world_2d(&self, n: Point2<f64>) -> Point2<f64> {
        Point2::new(
            from_unit_range(n.x, self.xmin, self.xmax),
            from_unit_range(n.y, self.ymin, self.ymax),
        )
    }

    /// Rotation correction applied in normalized coordinates.
    pub fn transformation_matrix(&self) -> Matrix3<f64> {
        Transform::window_transform(self.rotation.z)
    }

    /// View-reference-point translation with the inverse x/y rotation.
    pub fn parallel_projection(&self) -> Matrix4<f64> {
        let c = self.center();
        Transform::translation_3d(-c.x, -c.y, -c.z)
            * self.inverse_tilt()
            * Transform::translation_3d(c.x, c.y, c.z)
    }

    /// Parallel projection plus a perspective divide with the eye `d` units
    /// in front of the window centre. Points on the centre plane keep their
    /// position; points at or behind the eye get `w <= 0`.
    pub fn perspective_projection(&self, d: f64) -> Matrix4<f64> {
        let c = self.center();
        Transform::translation_3d(-c.x, -c.y, -c.z)
            * self.inverse_tilt()
            * Transform::translation_3d(0.0, 0.0, d)
            * Transform::perspective(d)
            * Transform::translation_3d(0.0, 0.0, -d)
            * Transform::translation_3d(c.x, c.y, c.z)
    }

    pub fn projection(&self, mode: ProjectionMode, d: f64) -> Matrix4<f64> {
        match mode {
            ProjectionMode::Parallel => self.parallel_projection(),
            ProjectionMode::Perspective => self.perspective_projection(d),
        }
    }

    fn inverse_tilt(&self) -> Matrix4<f64> {
        Transform::rotation_y(-self.rotation.y) * Transform::rotation_x(-self.rotation.x)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, lo + 0.5)
    }
}

fn to_unit_range(v: f64, min: f64, max: f64) -> f64 {
    2.0 * (v - min) / (max - min) - 1.0
}

fn from_unit_range(n: f64, min: f64, max: f64) -> f64 {
    min + (n + 1.0) * (max - min) / 2.0
}
