//! Geometry primitives shared by every scene object
use nalgebra::{Matrix4, Point3};

use crate::transform::Transform;

/// A single 3D coordinate, mutated in place by transforms
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Multiply `[x, y, z, 1]` by an affine `m`. The `w` column is ignored;
    /// projective matrices go through [`crate::projection::project_point`].
    pub fn transform(&mut self, m: &Matrix4<f64>) {
        let h = Transform::apply_3d(m, self.x, self.y, self.z);
        self.x = h[0];
        self.y = h[1];
        self.z = h[2];
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.transform(&Transform::translation_3d(dx, dy, dz));
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) {
        self.transform(&Transform::scale_3d(sx, sy, sz));
    }

    pub fn rotate_x(&mut self, angle: f64) {
        self.transform(&Transform::rotation_x(angle));
    }

    pub fn rotate_y(&mut self, angle: f64) {
        self.transform(&Transform::rotation_y(angle));
    }

    pub fn rotate_z(&mut self, angle: f64) {
        self.transform(&Transform::rotation_z(angle));
    }

    pub fn rotate(&mut self, ax: f64, ay: f64, az: f64) {
        self.transform(&Transform::rotation_3d(ax, ay, az));
    }

    /// Arithmetic mean of `points`, or the origin when empty.
    pub fn centroid<'a, I>(points: I) -> Point3D
    where
        I: IntoIterator<Item = &'a Point3D>,
    {
        let mut sum = Point3D::default();
        let mut count = 0usize;
        for p in points {
            sum.x += p.x;
            sum.y += p.y;
            sum.z += p.z;
            count += 1;
        }
        if count == 0 {
            return sum;
        }
        let n = count as f64;
        Point3D::new(sum.x / n, sum.y / n, sum.z / n)
    }
}

impl From<Point3D> for Point3<f64> {
    fn from(p: Point3D) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

impl From<Point3<f64>> for Point3D {
    fn from(p: Point3<f64>) -> Self {
        Point3D::new(p.x, p.y, p.z)
    }
}

impl From<(f64, f64, f64)> for Point3D {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point3D::new(x, y, z)
    }
}

/// An 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GREY: Rgb = Rgb::new(128, 128, 128);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats in `[0, 1]`, the form used by `Kd` lines.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    /// Inverse of [`Rgb::to_unit`]; channels are clamped to `[0, 1]`.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}
