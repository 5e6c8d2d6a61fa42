//! Bicubic surfaces sampled into a wireframe mesh.
//!
//! The mesh is derived data: every control point edit regenerates it before
//! returning, so it is never stale.

use nalgebra::Matrix4;

use crate::config::{MAX_SURFACE_GRID, MAX_SURFACE_RESOLUTION, MIN_SURFACE_GRID};
use crate::curve::{evaluate_patch_direct, evaluate_patch_fd, Basis, PatchCoefficients};
use crate::error::{GeometryError, PatchError};
use crate::geometry::{Point3D, Rgb};
use crate::object::ObjectType;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Exactly 4×4 control points, Bézier basis, direct evaluation.
    Bezier,
    /// Exactly 4×4 control points, B-spline basis, direct evaluation.
    BSpline,
    /// 4×4 up to 20×20 control points split into overlapping B-spline
    /// patches, each sampled with forward differences.
    BSplineFD,
}

impl SurfaceKind {
    pub fn object_type(self) -> ObjectType {
        match self {
            SurfaceKind::Bezier => ObjectType::SurfaceBezier,
            SurfaceKind::BSpline => ObjectType::SurfaceBSpline,
            SurfaceKind::BSplineFD => ObjectType::SurfaceBSplineFD,
        }
    }

    pub fn basis(self) -> Basis {
        match self {
            SurfaceKind::Bezier => Basis::Bezier,
            SurfaceKind::BSpline | SurfaceKind::BSplineFD => Basis::BSpline,
        }
    }
}

pub type Grid = Vec<Vec<Point3D>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    name: String,
    kind: SurfaceKind,
    control_points: Grid,
    resolution: usize,
    color: Rgb,
    fill: bool,
    selected: bool,
    patches: Vec<Grid>,
    triangles: Vec<[usize; 3]>,
    skipped_patches: Vec<(usize, usize)>,
}

impl Surface {
    pub fn new(
        name: impl Into<String>,
        kind: SurfaceKind,
        control_points: Grid,
        resolution: usize,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GeometryError::EmptyName);
        }
        validate_grid(kind, &control_points)?;
        if resolution == 0 || resolution > MAX_SURFACE_RESOLUTION {
            return Err(GeometryError::Resolution {
                resolution,
                max: MAX_SURFACE_RESOLUTION,
            });
        }

        let mut surface = Self {
            name,
            kind,
            control_points,
            resolution,
            color: Rgb::BLACK,
            fill: false,
            selected: false,
            patches: Vec::new(),
            triangles: Vec::new(),
            skipped_patches: Vec::new(),
        };
        surface.generate_surface();
        Ok(surface)
    }

    /// Build a grid from a row-major list of `rows * cols` points.
    pub fn from_flat(
        name: impl Into<String>,
        kind: SurfaceKind,
        rows: usize,
        cols: usize,
        points: &[Point3D],
        resolution: usize,
    ) -> Result<Self, GeometryError> {
        if cols == 0 || points.len() != rows * cols {
            return Err(GeometryError::CoordinateCount {
                kind: kind.object_type(),
                expected: "rows × cols",
                count: points.len(),
            });
        }
        let grid = points.chunks(cols).map(<[Point3D]>::to_vec).collect();
        Self::new(name, kind, grid, resolution)
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn control_points(&self) -> &Grid {
        &self.control_points
    }

    /// `(rows, cols)` of the control grid.
    pub fn dimensions(&self) -> (usize, usize) {
        let rows = self.control_points.len();
        let cols = self.control_points.first().map_or(0, Vec::len);
        (rows, cols)
    }

    pub fn control_points_flat(&self) -> impl Iterator<Item = &Point3D> {
        self.control_points.iter().flatten()
    }

    /// The sampled grid of a whole-grid surface (the first patch otherwise).
    pub fn surface_points(&self) -> &[Vec<Point3D>] {
        self.patches.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn surface_patches(&self) -> &[Grid] {
        &self.patches
    }

    /// Triangles over all patches; vertex `k` of patch `p` has index
    /// `p * (resolution + 1)² + k` in the row-major flattened mesh.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Patches (row, col) that could not be evaluated in the last
    /// regeneration.
    pub fn skipped_patches(&self) -> &[(usize, usize)] {
        &self.skipped_patches
    }

    pub fn mesh_vertices(&self) -> impl Iterator<Item = &Point3D> {
        self.patches.iter().flatten().flatten()
    }

    /// Row and column segments of every sampled grid.
    pub fn wireframe_edges(&self) -> Vec<(Point3D, Point3D)> {
        let mut edges = Vec::new();
        for patch in &self.patches {
            for row in patch {
                edges.extend(row.windows(2).map(|w| (w[0], w[1])));
            }
            for rows in patch.windows(2) {
                edges.extend(rows[0].iter().zip(&rows[1]).map(|(a, b)| (*a, *b)));
            }
        }
        edges
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

    pub fn set_resolution(&mut self, resolution: usize) -> Result<(), GeometryError> {
        if resolution == 0 || resolution > MAX_SURFACE_RESOLUTION {
            return Err(GeometryError::Resolution {
                resolution,
                max: MAX_SURFACE_RESOLUTION,
            });
        }
        self.resolution = resolution;
        self.generate_surface();
        Ok(())
    }

    pub(crate) fn apply(&mut self, m: &Matrix4<f64>) {
        for p in self.control_points.iter_mut().flatten() {
            p.transform(m);
        }
        self.generate_surface();
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.apply(&Transform::translation_3d(dx, dy, dz));
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) {
        self.apply(&Transform::scale_3d(sx, sy, sz));
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
        Point3D::centroid(self.control_points.iter().flatten())
    }

    /// Replace the mesh from the current control points.
    pub fn generate_surface(&mut self) {
        let (rows, cols) = self.dimensions();
        let (patches_u, patches_v) = match self.kind {
            SurfaceKind::Bezier | SurfaceKind::BSpline => (1, 1),
            SurfaceKind::BSplineFD => (rows.saturating_sub(3).max(1), cols.saturating_sub(3).max(1)),
        };

        self.patches.clear();
        self.skipped_patches.clear();
        for i in 0..patches_u {
            for j in 0..patches_v {
                match self.evaluate_patch(i, j) {
                    Ok(grid) => self.patches.push(grid),
                    Err(e) => {
                        log::warn!("surface {}: {e}, patch skipped", self.name);
                        self.skipped_patches.push((i, j));
                    }
                }
            }
        }
        self.triangles = triangulate(self.patches.len(), self.resolution);
        log::trace!(
            "surface {} regenerated: {} patches, {} triangles",
            self.name,
            self.patches.len(),
            self.triangles.len()
        );
    }

    fn evaluate_patch(&self, row: usize, col: usize) -> Result<Grid, PatchError> {
        let (rows, cols) = self.dimensions();
        let mut patch = [[Point3D::default(); 4]; 4];
        for (u, patch_row) in patch.iter_mut().enumerate() {
            for (v, p) in patch_row.iter_mut().enumerate() {
                // windows past the grid edge reuse the last row/column
                *p = self.control_points[(row + u).min(rows - 1)][(col + v).min(cols - 1)];
                if !p.is_finite() {
                    return Err(PatchError::NonFiniteControlPoint { row, col });
                }
            }
        }

        let coefficients = PatchCoefficients::new(&patch, self.kind.basis());
        let grid = match self.kind {
            SurfaceKind::Bezier | SurfaceKind::BSpline => {
                evaluate_patch_direct(&coefficients, self.resolution)
            }
            SurfaceKind::BSplineFD => evaluate_patch_fd(&coefficients, self.resolution),
        };

        if grid.iter().flatten().all(Point3D::is_finite) {
            Ok(grid)
        } else {
            Err(PatchError::NonFiniteSample { row, col })
        }
    }
}

fn validate_grid(kind: SurfaceKind, grid: &Grid) -> Result<(), GeometryError> {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    if grid.iter().any(|row| row.len() != cols) {
        return Err(GeometryError::RaggedGrid);
    }
    let (ok, expected) = match kind {
        SurfaceKind::Bezier | SurfaceKind::BSpline => (rows == 4 && cols == 4, "exactly 4x4"),
        SurfaceKind::BSplineFD => (
            (MIN_SURFACE_GRID..=MAX_SURFACE_GRID).contains(&rows)
                && (MIN_SURFACE_GRID..=MAX_SURFACE_GRID).contains(&cols),
            "between 4x4 and 20x20",
        ),
    };
    if ok {
        Ok(())
    } else {
        Err(GeometryError::GridSize {
            kind: kind.object_type(),
            rows,
            cols,
            expected,
        })
    }
}

/// Two triangles `(v1, v2, v3)` and `(v2, v4, v3)` per grid quad.
fn triangulate(patch_count: usize, resolution: usize) -> Vec<[usize; 3]> {
    let side = resolution + 1;
    let per_patch = side * side;
    let mut triangles = Vec::with_capacity(patch_count * resolution * resolution * 2);
    for p in 0..patch_count {
        let base = p * per_patch;
        for i in 0..resolution {
            for j in 0..resolution {
                let v1 = base + i * side + j;
                let v2 = v1 + 1;
                let v3 = base + (i + 1) * side + j;
                let v4 = v3 + 1;
                triangles.push([v1, v2, v3]);
                triangles.push([v2, v4, v3]);
            }
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid(rows: usize, cols: usize) -> Grid {
        (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| {
                        let (x, y) = (i as f64, j as f64);
                        Point3D::new(x, y, (x - 1.5).powi(2) - 0.5 * (y - 2.0).abs())
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn whole_grid_mesh_shape() {
        let s = Surface::new("bz", SurfaceKind::Bezier, grid(4, 4), 10).unwrap();
        assert_eq!(s.surface_points().len(), 11);
        assert_eq!(s.surface_points()[0].len(), 11);
        assert_eq!(s.triangles().len(), 200);
        assert_eq!(s.triangles()[0], [0, 1, 11]);
        assert_eq!(s.triangles()[1], [1, 12, 11]);
        assert!(s.skipped_patches().is_empty());
    }

    #[test]
    fn whole_grid_rejects_other_sizes() {
        let err = Surface::new("bz", SurfaceKind::BSpline, grid(5, 4), 10).unwrap_err();
        assert!(matches!(err, GeometryError::GridSize { rows: 5, cols: 4, .. }));
    }

    #[test]
    fn fd_grid_limits() {
        assert!(Surface::new("f", SurfaceKind::BSplineFD, grid(3, 6), 4).is_err());
        assert!(Surface::new("f", SurfaceKind::BSplineFD, grid(21, 4), 4).is_err());
        assert!(Surface::new("f", SurfaceKind::BSplineFD, grid(20, 20), 2).is_ok());
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let mut g = grid(4, 4);
        g[2].pop();
        assert_eq!(
            Surface::new("r", SurfaceKind::Bezier, g, 4),
            Err(GeometryError::RaggedGrid)
        );
    }

    #[test]
    fn resolution_bounds() {
        assert!(Surface::new("r", SurfaceKind::Bezier, grid(4, 4), 0).is_err());
        assert!(Surface::new("r", SurfaceKind::Bezier, grid(4, 4), MAX_SURFACE_RESOLUTION + 1).is_err());
    }

    #[test]
    fn fd_patch_count_uses_sliding_window() {
        let s = Surface::new("fd", SurfaceKind::BSplineFD, grid(6, 5), 8).unwrap();
        assert_eq!(s.surface_patches().len(), 3 * 2);
        assert_eq!(s.triangles().len(), 6 * 8 * 8 * 2);
        // last triangle references the last vertex of the last patch
        let max_index = s.triangles().iter().flatten().copied().max().unwrap();
        assert_eq!(max_index, 6 * 9 * 9 - 1);
    }

    #[test]
    fn fd_surface_matches_direct_evaluation() {
        for (rows, cols) in [(4, 4), (6, 6)] {
            let g = grid(rows, cols);
            let resolution = 12;
            let s = Surface::new("fd", SurfaceKind::BSplineFD, g.clone(), resolution).unwrap();
            let mut k = 0;
            for i in 0..rows - 3 {
                for j in 0..cols - 3 {
                    let mut patch = [[Point3D::default(); 4]; 4];
                    for u in 0..4 {
                        for v in 0..4 {
                            patch[u][v] = g[i + u][j + v];
                        }
                    }
                    let c = PatchCoefficients::new(&patch, Basis::BSpline);
                    let sampled = &s.surface_patches()[k];
                    for (a, row) in sampled.iter().enumerate() {
                        for (b, p) in row.iter().enumerate() {
                            let direct = c.evaluate(
                                a as f64 / resolution as f64,
                                b as f64 / resolution as f64,
                            );
                            assert_abs_diff_eq!(p.x, direct.x, epsilon = 1e-6);
                            assert_abs_diff_eq!(p.y, direct.y, epsilon = 1e-6);
                            assert_abs_diff_eq!(p.z, direct.z, epsilon = 1e-6);
                        }
                    }
                    k += 1;
                }
            }
        }
    }

    #[test]
    fn translate_regenerates_mesh() {
        let mut s = Surface::new("bz", SurfaceKind::Bezier, grid(4, 4), 6).unwrap();
        let before = s.surface_points()[3][2];
        s.translate(1.0, -2.0, 3.0);
        let after = s.surface_points()[3][2];
        assert_abs_diff_eq!(after.x - before.x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(after.y - before.y, -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(after.z - before.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn rotation_about_centroid_keeps_centroid() {
        let mut s = Surface::new("bs", SurfaceKind::BSplineFD, grid(5, 5), 4).unwrap();
        let c = s.centroid();
        s.rotate_about_centroid(20.0, 45.0, 10.0);
        let after = s.centroid();
        assert_abs_diff_eq!(after.x, c.x, epsilon = 1e-9);
        assert_abs_diff_eq!(after.y, c.y, epsilon = 1e-9);
        assert_abs_diff_eq!(after.z, c.z, epsilon = 1e-9);
    }

    #[test]
    fn malformed_patch_is_skipped() {
        let mut g = grid(5, 4);
        // only the second patch row touches row 4
        g[4][1] = Point3D::new(f64::NAN, 0.0, 0.0);
        let s = Surface::new("bad", SurfaceKind::BSplineFD, g, 4).unwrap();
        assert_eq!(s.skipped_patches(), &[(1, 0)]);
        assert_eq!(s.surface_patches().len(), 1);
        assert_eq!(s.triangles().len(), 4 * 4 * 2);
    }

    #[test]
    fn bezier_surface_passes_through_corners() {
        let g = grid(4, 4);
        let s = Surface::new("bz", SurfaceKind::Bezier, g.clone(), 5).unwrap();
        let pts = s.surface_points();
        assert_abs_diff_eq!(pts[0][0].z, g[0][0].z, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[5][5].z, g[3][3].z, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[5][0].x, g[3][0].x, epsilon = 1e-9);
    }

    #[test]
    fn wireframe_edge_count() {
        let s = Surface::new("bz", SurfaceKind::Bezier, grid(4, 4), 3).unwrap();
        // 4 rows of 3 segments plus 3 row gaps of 4 segments
        assert_eq!(s.wireframe_edges().len(), 24);
    }

    #[test]
    fn from_flat_builds_row_major_grid() {
        let flat: Vec<Point3D> = grid(4, 4).into_iter().flatten().collect();
        let s = Surface::from_flat("flat", SurfaceKind::Bezier, 4, 4, &flat, 2).unwrap();
        assert_eq!(s.control_points()[1][2], flat[6]);
        assert!(Surface::from_flat("flat", SurfaceKind::Bezier, 4, 4, &flat[..15], 2).is_err());
    }
}
