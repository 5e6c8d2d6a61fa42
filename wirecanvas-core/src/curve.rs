//! Cubic curve and bicubic patch evaluation.
//!
//! Curves and patches are written in power form: a cubic segment is
//! `T · M · G` with `T = [t³, t², t, 1]`, a bicubic patch is
//! `U · M · G · Mᵗ · Vᵗ`. [`forward_differences`] turns power-form
//! coefficients into start value plus first, second and third differences so
//! consecutive samples need three additions instead of a cubic evaluation.

use nalgebra::{Matrix4, Point2, RowVector4, Vector4};

use crate::geometry::Point3D;

/// Which cubic basis a curve or surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    Bezier,
    BSpline,
}

impl Basis {
    pub fn matrix(self) -> Matrix4<f64> {
        match self {
            Basis::Bezier => bezier_matrix(),
            Basis::BSpline => bspline_matrix(),
        }
    }
}

pub fn bezier_matrix() -> Matrix4<f64> {
    Matrix4::new(
        -1.0, 3.0, -3.0, 1.0, //
        3.0, -6.0, 3.0, 0.0, //
        -3.0, 3.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0,
    )
}

pub fn bspline_matrix() -> Matrix4<f64> {
    Matrix4::new(
        -1.0, 3.0, -3.0, 1.0, //
        3.0, -6.0, 3.0, 0.0, //
        -3.0, 0.0, 3.0, 0.0, //
        1.0, 4.0, 1.0, 0.0,
    ) / 6.0
}

/// Maps power-form coefficients `[a, b, c, d]` of `f(t) = at³ + bt² + ct + d`
/// to `[f(0), Δf(0), Δ²f(0), Δ³f(0)]` for step `delta`.
pub fn forward_differences(delta: f64) -> Matrix4<f64> {
    let d2 = delta * delta;
    let d3 = d2 * delta;
    Matrix4::new(
        0.0, 0.0, 0.0, 1.0, //
        d3, d2, delta, 0.0, //
        6.0 * d3, 2.0 * d2, 0.0, 0.0, //
        6.0 * d3, 0.0, 0.0, 0.0,
    )
}

fn power_row(t: f64) -> RowVector4<f64> {
    RowVector4::new(t * t * t, t * t, t, 1.0)
}

/// Sample a cubic Bézier segment at `precision + 1` evenly spaced parameters.
pub fn bezier_segment(control: &[Point2<f64>; 4], precision: usize) -> Vec<Point2<f64>> {
    let precision = precision.max(1);
    let m = bezier_matrix();
    let cx = m * Vector4::new(control[0].x, control[1].x, control[2].x, control[3].x);
    let cy = m * Vector4::new(control[0].y, control[1].y, control[2].y, control[3].y);

    (0..=precision)
        .map(|i| {
            let t = power_row(i as f64 / precision as f64);
            Point2::new(t.dot(&cx.transpose()), t.dot(&cy.transpose()))
        })
        .collect()
}

/// Sample every 4-point segment of a Bézier curve and chain the polylines.
///
/// `control.len()` must be a multiple of 4; a trailing partial segment is
/// ignored.
pub fn bezier_curve(control: &[Point2<f64>], precision: usize) -> Vec<Vec<Point2<f64>>> {
    control
        .chunks_exact(4)
        .map(|c| bezier_segment(&[c[0], c[1], c[2], c[3]], precision))
        .collect()
}

/// Indices `i` where segment `i` does not end where segment `i + 1` starts.
pub fn g0_discontinuities(control: &[Point2<f64>], tolerance: f64) -> Vec<usize> {
    let segments: Vec<&[Point2<f64>]> = control.chunks_exact(4).collect();
    segments
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| (pair[0][3] - pair[1][0]).norm() > tolerance)
        .map(|(i, _)| i)
        .collect()
}

/// Sample one uniform cubic B-spline span with forward differences.
pub fn bspline_segment_fd(control: &[Point2<f64>; 4], precision: usize) -> Vec<Point2<f64>> {
    let precision = precision.max(1);
    let e = forward_differences(1.0 / precision as f64);
    let m = bspline_matrix();
    let dx = e * m * Vector4::new(control[0].x, control[1].x, control[2].x, control[3].x);
    let dy = e * m * Vector4::new(control[0].y, control[1].y, control[2].y, control[3].y);

    let (mut x, mut dx1, mut dx2, dx3) = (dx[0], dx[1], dx[2], dx[3]);
    let (mut y, mut dy1, mut dy2, dy3) = (dy[0], dy[1], dy[2], dy[3]);

    let mut points = Vec::with_capacity(precision + 1);
    points.push(Point2::new(x, y));
    for _ in 0..precision {
        x += dx1;
        dx1 += dx2;
        dx2 += dx3;
        y += dy1;
        dy1 += dy2;
        dy2 += dy3;
        points.push(Point2::new(x, y));
    }
    points
}

/// Slide a 4-point window across the control points (`len - 3` spans) and
/// sample each span with forward differences.
pub fn bspline_curve(control: &[Point2<f64>], precision: usize) -> Vec<Vec<Point2<f64>>> {
    control
        .windows(4)
        .map(|w| bspline_segment_fd(&[w[0], w[1], w[2], w[3]], precision))
        .collect()
}

/// Direct evaluation of a uniform B-spline span at `t`, used to check the
/// forward-difference path.
pub fn bspline_segment_at(control: &[Point2<f64>; 4], t: f64) -> Point2<f64> {
    let m = bspline_matrix();
    let cx = m * Vector4::new(control[0].x, control[1].x, control[2].x, control[3].x);
    let cy = m * Vector4::new(control[0].y, control[1].y, control[2].y, control[3].y);
    let tr = power_row(t);
    Point2::new(tr.dot(&cx.transpose()), tr.dot(&cy.transpose()))
}

/// Power-form coefficients `M · G · Mᵗ` of a 4×4 patch, one matrix per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchCoefficients {
    pub x: Matrix4<f64>,
    pub y: Matrix4<f64>,
    pub z: Matrix4<f64>,
}

impl PatchCoefficients {
    pub fn new(patch: &[[Point3D; 4]; 4], basis: Basis) -> Self {
        let m = basis.matrix();
        let mt = m.transpose();
        let axis = |f: fn(&Point3D) -> f64| {
            let g = Matrix4::from_fn(|i, j| f(&patch[i][j]));
            m * g * mt
        };
        Self {
            x: axis(|p| p.x),
            y: axis(|p| p.y),
            z: axis(|p| p.z),
        }
    }

    /// `U · C · Vᵗ` per axis.
    pub fn evaluate(&self, u: f64, v: f64) -> Point3D {
        let ur = power_row(u);
        let vc = power_row(v).transpose();
        let eval = |c: &Matrix4<f64>| (ur * c * vc)[0];
        Point3D::new(eval(&self.x), eval(&self.y), eval(&self.z))
    }
}

/// Sample a patch at `(resolution + 1)²` grid points by direct evaluation.
/// Rows follow `u`, columns follow `v`.
pub fn evaluate_patch_direct(coefficients: &PatchCoefficients, resolution: usize) -> Vec<Vec<Point3D>> {
    let resolution = resolution.max(1);
    let step = 1.0 / resolution as f64;
    (0..=resolution)
        .map(|i| {
            (0..=resolution)
                .map(|j| coefficients.evaluate(i as f64 * step, j as f64 * step))
                .collect()
        })
        .collect()
}

/// Sample a patch on the same grid as [`evaluate_patch_direct`] using
/// bivariate forward differences.
pub fn evaluate_patch_fd(coefficients: &PatchCoefficients, resolution: usize) -> Vec<Vec<Point3D>> {
    let resolution = resolution.max(1);
    let e = forward_differences(1.0 / resolution as f64);
    let et = e.transpose();
    // DD[i][j] = Δu^i Δv^j P(0, 0)
    let mut dd = [e * coefficients.x * et, e * coefficients.y * et, e * coefficients.z * et];

    let mut grid = Vec::with_capacity(resolution + 1);
    for _ in 0..=resolution {
        let mut row_state: Vec<[f64; 4]> = dd
            .iter()
            .map(|d| [d[(0, 0)], d[(0, 1)], d[(0, 2)], d[(0, 3)]])
            .collect();

        let mut row = Vec::with_capacity(resolution + 1);
        row.push(Point3D::new(row_state[0][0], row_state[1][0], row_state[2][0]));
        for _ in 0..resolution {
            for s in row_state.iter_mut() {
                s[0] += s[1];
                s[1] += s[2];
                s[2] += s[3];
            }
            row.push(Point3D::new(row_state[0][0], row_state[1][0], row_state[2][0]));
        }
        grid.push(row);

        // step u: every row absorbs the next difference order
        for d in dd.iter_mut() {
            for i in 0..3 {
                let next = d.row(i + 1).into_owned();
                let mut row = d.row_mut(i);
                row += next;
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pt(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn sample_patch() -> [[Point3D; 4]; 4] {
        let mut patch = [[Point3D::default(); 4]; 4];
        for (i, row) in patch.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                let (x, y) = (i as f64 * 2.0 - 3.0, j as f64 * 1.5 - 2.0);
                *p = Point3D::new(x, y, (x * 0.7).sin() * 3.0 + y * y * 0.25 - (i * j) as f64);
            }
        }
        patch
    }

    #[test]
    fn bezier_segment_interpolates_endpoints() {
        let c = [pt(0.0, 0.0), pt(1.0, 3.0), pt(3.0, 3.0), pt(4.0, 0.0)];
        let samples = bezier_segment(&c, 100);
        assert_eq!(samples.len(), 101);
        assert_abs_diff_eq!(samples[0].x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[100].x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[100].y, 0.0, epsilon = 1e-12);
        // midpoint of a symmetric curve: (P0 + 3P1 + 3P2 + P3) / 8
        assert_abs_diff_eq!(samples[50].x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[50].y, 2.25, epsilon = 1e-12);
    }

    #[test]
    fn bezier_curve_splits_into_segments() {
        let c = [
            pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 1.0), pt(3.0, 0.0),
            pt(3.0, 0.0), pt(4.0, -1.0), pt(5.0, -1.0), pt(6.0, 0.0),
        ];
        assert_eq!(bezier_curve(&c, 10).len(), 2);
        assert!(g0_discontinuities(&c, 1e-9).is_empty());
    }

    #[test]
    fn detects_g0_break() {
        let c = [
            pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 1.0), pt(3.0, 0.0),
            pt(3.5, 0.0), pt(4.0, -1.0), pt(5.0, -1.0), pt(6.0, 0.0),
        ];
        assert_eq!(g0_discontinuities(&c, 1e-9), vec![0]);
    }

    #[test]
    fn bspline_fd_matches_direct_evaluation() {
        let c = [pt(-4.0, 1.0), pt(-1.0, 6.0), pt(2.5, -3.0), pt(7.0, 2.0)];
        let precision = 50;
        let samples = bspline_segment_fd(&c, precision);
        assert_eq!(samples.len(), precision + 1);
        for (i, s) in samples.iter().enumerate() {
            let direct = bspline_segment_at(&c, i as f64 / precision as f64);
            assert_abs_diff_eq!(s.x, direct.x, epsilon = 1e-9);
            assert_abs_diff_eq!(s.y, direct.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn bspline_curve_has_len_minus_three_spans() {
        let c: Vec<_> = (0..7).map(|i| pt(i as f64, (i % 2) as f64)).collect();
        let spans = bspline_curve(&c, 10);
        assert_eq!(spans.len(), 4);
        // consecutive spans join
        for pair in spans.windows(2) {
            let end = pair[0].last().unwrap();
            let start = pair[1].first().unwrap();
            assert_abs_diff_eq!(end.x, start.x, epsilon = 1e-9);
            assert_abs_diff_eq!(end.y, start.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn forward_differences_of_cubic() {
        // f(t) = t³ with step 0.5: f = 0, 0.125, 1.0, 3.375
        let d = forward_differences(0.5) * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(d[0], 0.0);
        assert_abs_diff_eq!(d[1], 0.125);
        assert_abs_diff_eq!(d[2], 0.75);
        assert_abs_diff_eq!(d[3], 0.75);
    }

    #[test]
    fn bezier_patch_touches_corner_control_points() {
        let patch = sample_patch();
        let c = PatchCoefficients::new(&patch, Basis::Bezier);
        let corner = c.evaluate(1.0, 1.0);
        assert_abs_diff_eq!(corner.x, patch[3][3].x, epsilon = 1e-9);
        assert_abs_diff_eq!(corner.y, patch[3][3].y, epsilon = 1e-9);
        assert_abs_diff_eq!(corner.z, patch[3][3].z, epsilon = 1e-9);
        let origin = c.evaluate(0.0, 0.0);
        assert_abs_diff_eq!(origin.z, patch[0][0].z, epsilon = 1e-9);
        let edge = c.evaluate(0.0, 1.0);
        assert_abs_diff_eq!(edge.y, patch[0][3].y, epsilon = 1e-9);
    }

    #[test]
    fn patch_fd_matches_direct_for_both_bases() {
        let patch = sample_patch();
        for basis in [Basis::Bezier, Basis::BSpline] {
            let c = PatchCoefficients::new(&patch, basis);
            for resolution in [1, 7, 20] {
                let fd = evaluate_patch_fd(&c, resolution);
                let direct = evaluate_patch_direct(&c, resolution);
                assert_eq!(fd.len(), resolution + 1);
                for (row_fd, row_direct) in fd.iter().zip(&direct) {
                    assert_eq!(row_fd.len(), resolution + 1);
                    for (a, b) in row_fd.iter().zip(row_direct) {
                        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
                        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);
                        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-6);
                    }
                }
            }
        }
    }
}
