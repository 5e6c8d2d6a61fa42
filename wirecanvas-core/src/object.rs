//! The closed set of drawable objects held by a scene.

use std::fmt;

use crate::geometry::{Point3D, Rgb};
use crate::surface::Surface;
use crate::wireframe::{Wireframe, Wireframe3D};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Dot,
    Line,
    Polygon,
    Curve,
    CurveBSpline,
    Polygon3D,
    SurfaceBezier,
    SurfaceBSpline,
    SurfaceBSplineFD,
}

impl ObjectType {
    pub fn is_3d(self) -> bool {
        matches!(
            self,
            ObjectType::Polygon3D
                | ObjectType::SurfaceBezier
                | ObjectType::SurfaceBSpline
                | ObjectType::SurfaceBSplineFD
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::Dot => "Dot",
            ObjectType::Line => "Line",
            ObjectType::Polygon => "Polygon",
            ObjectType::Curve => "Curve",
            ObjectType::CurveBSpline => "B-spline curve",
            ObjectType::Polygon3D => "3D polygon",
            ObjectType::SurfaceBezier => "Bezier surface",
            ObjectType::SurfaceBSpline => "B-spline surface",
            ObjectType::SurfaceBSplineFD => "B-spline surface (forward differences)",
        };
        f.write_str(name)
    }
}

/// Any object a scene can hold.
///
/// Editing goes through a uniform set of operations. 2D objects ignore the z
/// components and rotate by `az` only.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Wireframe(Wireframe),
    Wireframe3D(Wireframe3D),
    Surface(Surface),
}

macro_rules! each {
    ($self:expr, $o:ident => $body:expr) => {
        match $self {
            SceneObject::Wireframe($o) => $body,
            SceneObject::Wireframe3D($o) => $body,
            SceneObject::Surface($o) => $body,
        }
    };
}

impl SceneObject {
    pub fn name(&self) -> &str {
        each!(self, o => o.name())
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            SceneObject::Wireframe(w) => w.kind().object_type(),
            SceneObject::Wireframe3D(_) => ObjectType::Polygon3D,
            SceneObject::Surface(s) => s.kind().object_type(),
        }
    }

    pub fn color(&self) -> Rgb {
        each!(self, o => o.color())
    }

    pub fn set_color(&mut self, color: Rgb) {
        each!(self, o => o.set_color(color))
    }

    pub fn fill(&self) -> bool {
        each!(self, o => o.fill())
    }

    pub fn set_fill(&mut self, fill: bool) {
        each!(self, o => o.set_fill(fill))
    }

    pub fn is_selected(&self) -> bool {
        each!(self, o => o.is_selected())
    }

    pub fn select(&mut self) {
        each!(self, o => o.select())
    }

    pub fn deselect(&mut self) {
        each!(self, o => o.deselect())
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        match self {
            SceneObject::Wireframe(w) => w.translate(dx, dy),
            SceneObject::Wireframe3D(w) => w.translate(dx, dy, dz),
            SceneObject::Surface(s) => s.translate(dx, dy, dz),
        }
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) {
        match self {
            SceneObject::Wireframe(w) => w.scale(sx, sy),
            SceneObject::Wireframe3D(w) => w.scale(sx, sy, sz),
            SceneObject::Surface(s) => s.scale(sx, sy, sz),
        }
    }

    /// Rotation about the world origin.
    pub fn rotate(&mut self, ax: f64, ay: f64, az: f64) {
        match self {
            SceneObject::Wireframe(w) => w.rotate(az),
            SceneObject::Wireframe3D(w) => w.rotate(ax, ay, az),
            SceneObject::Surface(s) => s.rotate(ax, ay, az),
        }
    }

    pub fn rotate_about_centroid(&mut self, ax: f64, ay: f64, az: f64) {
        match self {
            SceneObject::Wireframe(w) => w.rotate_about_centroid(az),
            SceneObject::Wireframe3D(w) => w.rotate_about_centroid(ax, ay, az),
            SceneObject::Surface(s) => s.rotate_about_centroid(ax, ay, az),
        }
    }

    pub fn rotate_about_point(&mut self, ax: f64, ay: f64, az: f64, pivot: Point3D) {
        match self {
            SceneObject::Wireframe(w) => w.rotate_about_point(az, pivot.x, pivot.y),
            SceneObject::Wireframe3D(w) => w.rotate_about_point(ax, ay, az, pivot),
            SceneObject::Surface(s) => s.rotate_about_point(ax, ay, az, pivot),
        }
    }

    /// Mean of the defining points, z = 0 for 2D objects.
    pub fn centroid(&self) -> Point3D {
        match self {
            SceneObject::Wireframe(w) => {
                let c = w.centroid();
                Point3D::new(c.x, c.y, 0.0)
            }
            SceneObject::Wireframe3D(w) => w.centroid(),
            SceneObject::Surface(s) => s.centroid(),
        }
    }

    pub fn as_wireframe(&self) -> Option<&Wireframe> {
        match self {
            SceneObject::Wireframe(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_surface(&self) -> Option<&Surface> {
        match self {
            SceneObject::Surface(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Wireframe> for SceneObject {
    fn from(w: Wireframe) -> Self {
        SceneObject::Wireframe(w)
    }
}

impl From<Wireframe3D> for SceneObject {
    fn from(w: Wireframe3D) -> Self {
        SceneObject::Wireframe3D(w)
    }
}

impl From<Surface> for SceneObject {
    fn from(s: Surface) -> Self {
        SceneObject::Surface(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wireframe::WireframeKind;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point2;

    fn square() -> SceneObject {
        Wireframe::new(
            "sq",
            WireframeKind::Polygon,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
            ],
        )
        .unwrap()
        .into()
    }

    #[test]
    fn types_and_display() {
        assert_eq!(square().object_type(), ObjectType::Polygon);
        assert_eq!(ObjectType::Line.to_string(), "Line");
        assert!(ObjectType::SurfaceBSplineFD.is_3d());
        assert!(!ObjectType::CurveBSpline.is_3d());
    }

    #[test]
    fn planar_objects_ignore_z() {
        let mut o = square();
        o.translate(1.0, 1.0, 50.0);
        o.rotate_about_centroid(90.0, 90.0, 0.0);
        let c = o.centroid();
        assert_abs_diff_eq!(c.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 2.0, epsilon = 1e-12);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn rotate_about_point_uses_az() {
        let mut o = square();
        o.rotate_about_point(0.0, 0.0, 180.0, Point3D::new(0.0, 0.0, 7.0));
        let c = o.centroid();
        assert_abs_diff_eq!(c.x, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn selection_flags() {
        let mut o = square();
        assert!(!o.is_selected());
        o.select();
        assert!(o.is_selected());
        o.deselect();
        assert!(!o.is_selected());
    }
}
