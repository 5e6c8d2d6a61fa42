//! Display-list entries made of points and edges.

use nalgebra::Point2;

use crate::error::GeometryError;
use crate::geometry::{Point3D, Rgb};
use crate::object::ObjectType;
use crate::transform::Transform;

/// Geometry kind of a 2D wireframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireframeKind {
    Dot,
    Line,
    Polygon,
    /// Cubic Bézier, four control points per segment.
    Curve,
    /// Uniform cubic B-spline, at least four control points.
    CurveBSpline,
}

impl WireframeKind {
    pub fn object_type(self) -> ObjectType {
        match self {
            WireframeKind::Dot => ObjectType::Dot,
            WireframeKind::Line => ObjectType::Line,
            WireframeKind::Polygon => ObjectType::Polygon,
            WireframeKind::Curve => ObjectType::Curve,
            WireframeKind::CurveBSpline => ObjectType::CurveBSpline,
        }
    }

    fn check_count(self, count: usize) -> Result<(), GeometryError> {
        let (ok, expected) = match self {
            WireframeKind::Dot => (count == 1, "exactly 1"),
            WireframeKind::Line => (count == 2, "exactly 2"),
            WireframeKind::Polygon => (count >= 3, "at least 3"),
            WireframeKind::Curve => (count >= 4 && count % 4 == 0, "a non-zero multiple of 4"),
            WireframeKind::CurveBSpline => (count >= 4, "at least 4"),
        };
        if ok {
            Ok(())
        } else {
            Err(GeometryError::CoordinateCount {
                kind: self.object_type(),
                expected,
                count,
            })
        }
    }
}

/// A 2D object: an ordered coordinate list interpreted by its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe {
    name: String,
    kind: WireframeKind,
    coordinates: Vec<Point2<f64>>,
    color: Rgb,
    fill: bool,
    selected: bool,
}

impl Wireframe {
    pub fn new(
        name: impl Into<String>,
        kind: WireframeKind,
        coordinates: Vec<Point2<f64>>,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GeometryError::EmptyName);
        }
        kind.check_count(coordinates.len())?;
        Ok(Self {
            name,
            kind,
            coordinates,
            color: Rgb::BLACK,
            fill: false,
            selected: false,
        })
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WireframeKind {
        self.kind
    }

    pub fn coordinates(&self) -> &[Point2<f64>] {
        &self.coordinates
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    pub fn set_fill(&mut self, fill: bool) {
        self.fill = fill;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    fn apply(&mut self, m: &nalgebra::Matrix3<f64>) {
        for p in &mut self.coordinates {
            *p = Transform::apply_2d(m, *p);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.apply(&Transform::translation_2d(dx, dy));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.apply(&Transform::scale_2d(sx, sy));
    }

    /// Rotate about the world origin.
    pub fn rotate(&mut self, angle: f64) {
        self.apply(&Transform::rotation_2d(angle));
    }

    pub fn rotate_about_point(&mut self, angle: f64, px: f64, py: f64) {
        let m = Transform::about_pivot_2d(&Transform::rotation_2d(angle), Point2::new(px, py));
        self.apply(&m);
    }

    pub fn rotate_about_centroid(&mut self, angle: f64) {
        let c = self.centroid();
        self.rotate_about_point(angle, c.x, c.y);
    }

    pub fn center_x(&self) -> f64 {
        self.centroid().x
    }

    pub fn center_y(&self) -> f64 {
        self.centroid().y
    }

    pub fn centroid(&self) -> Point2<f64> {
        if self.coordinates.is_empty() {
            return Point2::origin();
        }
        let n = self.coordinates.len() as f64;
        let (sx, sy) = self
            .coordinates
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2::new(sx / n, sy / n)
    }
}

/// A 3D object: vertices plus an explicit edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe3D {
    name: String,
    points: Vec<Point3D>,
    edges: Vec<(usize, usize)>,
    color: Rgb,
    fill: bool,
    selected: bool,
}

impl Wireframe3D {
    /// Edges are pairs of 0-based vertex indices.
    pub fn new(
        name: impl Into<String>,
        points: Vec<Point3D>,
        edges: Vec<(usize, usize)>,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GeometryError::EmptyName);
        }
        if points.len() < 2 {
            return Err(GeometryError::CoordinateCount {
                kind: ObjectType::Polygon3D,
                expected: "at least 2",
                count: points.len(),
            });
        }
        if edges.is_empty() {
            return Err(GeometryError::NoEdges);
        }
        if let Some(&(start, end)) = edges
            .iter()
            .find(|(a, b)| *a >= points.len() || *b >= points.len())
        {
            return Err(GeometryError::EdgeIndex {
                start,
                end,
                vertex_count: points.len(),
            });
        }
        Ok(Self {
            name,
            points,
            edges,
            color: Rgb::BLACK,
            fill: false,
            selected: false,
        })
    }

    /// Closed outline through every vertex in order.
    pub fn outline(name: impl Into<String>, points: Vec<Point3D>) -> Result<Self, GeometryError> {
        let n = points.len();
        let edges = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Self::new(name, points, edges)
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    pub fn set_fill(&mut self, fill: bool) {
        self.fill = fill;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    pub(crate) fn apply(&mut self, m: &nalgebra::Matrix4<f64>) {
        for p in &mut self.points {
            p.transform(m);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.apply(&Transform::translation_3d(dx, dy, dz));
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) {
        self.apply(&Transform::scale_3d(sx, sy, sz));
    }

    pub fn rotate_x(&mut self, angle: f64) {
        self.apply(&Transform::rotation_x(angle));
    }

    pub fn rotate_y(&mut self, angle: f64) {
        self.apply(&Transform::rotation_y(angle));
    }

    pub fn rotate_z(&mut self, angle: f64) {
        self.apply(&Transform::rotation_z(angle));
    }

    pub fn rotate(&mut self, ax: f64, ay: f64, az: f64) {
        self.apply(&Transform::rotation_3d(ax, ay, az));
    }

    pub fn rotate_about_point(&mut self, ax: f64, ay: f64, az: f64, pivot: Point3D) {
        let m = Transform::about_pivot_3d(&Transform::rotation_3d(ax, ay, az), &pivot);
        self.apply(&m);
    }

    pub fn rotate_about_centroid(&mut self, ax: f64, ay: f64, az: f64) {
        let c = self.centroid();
        self.rotate_about_point(ax, ay, az, c);
    }

    pub fn centroid(&self) -> Point3D {
        Point3D::centroid(&self.points)
    }

    pub fn center_x(&self) -> f64 {
        self.centroid().x
    }

    pub fn center_y(&self) -> f64 {
        self.centroid().y
    }

    pub fn center_z(&self) -> f64 {
        self.centroid().z
    }
}
