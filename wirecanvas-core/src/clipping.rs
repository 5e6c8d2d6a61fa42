//! Point, line and polygon clipping against the viewport rectangle.
//!
//! All routines work in pixel space, where y grows downward: the "bottom"
//! boundary is `ymax` and the "top" boundary is `ymin`.

use nalgebra::Point2;

use crate::config::EPSILON;
use crate::viewport::Viewport;

pub const INSIDE: u8 = 0b0000;
pub const LEFT: u8 = 0b0001;
pub const RIGHT: u8 = 0b0010;
pub const BOTTOM: u8 = 0b0100;
pub const TOP: u8 = 0b1000;

/// Each endpoint moves to a boundary at most once per bit.
const MAX_CS_ITERATIONS: usize = 8;

/// Line clipping algorithm used by a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineClipping {
    #[default]
    CohenSutherland,
    LiangBarsky,
}

impl LineClipping {
    pub fn clip(
        self,
        vp: &Viewport,
        p1: Point2<f64>,
        p2: Point2<f64>,
    ) -> Option<(Point2<f64>, Point2<f64>)> {
        match self {
            LineClipping::CohenSutherland => cohen_sutherland(vp, p1, p2),
            LineClipping::LiangBarsky => liang_barsky(vp, p1, p2),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LineClipping::CohenSutherland => LineClipping::LiangBarsky,
            LineClipping::LiangBarsky => LineClipping::CohenSutherland,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineClipping::CohenSutherland => "Cohen-Sutherland",
            LineClipping::LiangBarsky => "Liang-Barsky",
        }
    }
}

pub fn clip_point(vp: &Viewport, p: Point2<f64>) -> bool {
    vp.contains(p)
}

/// The 4-bit Cohen-Sutherland region code of `p`.
pub fn outcode(vp: &Viewport, p: Point2<f64>) -> u8 {
    let mut code = INSIDE;
    if p.x < vp.xmin {
        code |= LEFT;
    } else if p.x > vp.xmax {
        code |= RIGHT;
    }
    if p.y > vp.ymax {
        code |= BOTTOM;
    } else if p.y < vp.ymin {
        code |= TOP;
    }
    code
}

pub fn cohen_sutherland(
    vp: &Viewport,
    p1: Point2<f64>,
    p2: Point2<f64>,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let slope = if p2.x != p1.x {
        Some((p2.y - p1.y) / (p2.x - p1.x))
    } else {
        None
    };

    let (mut a, mut b) = (p1, p2);
    let (mut code_a, mut code_b) = (outcode(vp, a), outcode(vp, b));

    for _ in 0..MAX_CS_ITERATIONS {
        if code_a & code_b != 0 {
            return None;
        }
        if code_a | code_b == 0 {
            return Some((a, b));
        }
        if code_a != 0 {
            a = boundary_intersection(vp, code_a, a, slope);
            code_a = outcode(vp, a);
        } else {
            b = boundary_intersection(vp, code_b, b, slope);
            code_b = outcode(vp, b);
        }
    }

    // Only reachable when rounding keeps a corner-grazing line bouncing
    // between two boundaries.
    settle_grazing(vp, a, b)
}

/// Accept a segment whose endpoints sit on the viewport up to `EPSILON`,
/// clamped onto it.
fn settle_grazing(vp: &Viewport, a: Point2<f64>, b: Point2<f64>) -> Option<(Point2<f64>, Point2<f64>)> {
    let near = |p: Point2<f64>| {
        p.x >= vp.xmin - EPSILON && p.x <= vp.xmax + EPSILON && p.y >= vp.ymin - EPSILON && p.y <= vp.ymax + EPSILON
    };
    if near(a) && near(b) {
        let clamp = |p: Point2<f64>| Point2::new(p.x.clamp(vp.xmin, vp.xmax), p.y.clamp(vp.ymin, vp.ymax));
        Some((clamp(a), clamp(b)))
    } else {
        log::debug!("cohen-sutherland gave up on ({a}, {b}) after {MAX_CS_ITERATIONS} steps");
        None
    }
}

/// Move `p` onto the first boundary flagged in `code`, along the line.
fn boundary_intersection(vp: &Viewport, code: u8, p: Point2<f64>, slope: Option<f64>) -> Point2<f64> {
    let along_x = |x: f64| match slope {
        Some(m) => p.y + m * (x - p.x),
        None => p.y,
    };
    let along_y = |y: f64| match slope {
        Some(m) if m != 0.0 => p.x + (y - p.y) / m,
        _ => p.x,
    };

    if code & LEFT != 0 {
        Point2::new(vp.xmin, along_x(vp.xmin))
    } else if code & RIGHT != 0 {
        Point2::new(vp.xmax, along_x(vp.xmax))
    } else if code & BOTTOM != 0 {
        Point2::new(along_y(vp.ymax), vp.ymax)
    } else {
        Point2::new(along_y(vp.ymin), vp.ymin)
    }
}

pub fn liang_barsky(
    vp: &Viewport,
    p1: Point2<f64>,
    p2: Point2<f64>,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    let p = [-dx, dx, -dy, dy];
    let q = [
        p1.x - vp.xmin,
        vp.xmax - p1.x,
        p1.y - vp.ymin,
        vp.ymax - p1.y,
    ];

    let mut t_enter = 0.0_f64;
    let mut t_exit = 1.0_f64;
    for (&pi, &qi) in p.iter().zip(q.iter()) {
        if pi == 0.0 {
            // parallel to this boundary
            if qi < 0.0 {
                return None;
            }
        } else {
            let r = qi / pi;
            if pi < 0.0 {
                t_enter = t_enter.max(r);
            } else {
                t_exit = t_exit.min(r);
            }
        }
    }

    if t_enter > t_exit {
        return None;
    }

    let start = if t_enter != 0.0 {
        Point2::new(p1.x + t_enter * dx, p1.y + t_enter * dy)
    } else {
        p1
    };
    let end = if t_exit != 1.0 {
        Point2::new(p1.x + t_exit * dx, p1.y + t_exit * dy)
    } else {
        p2
    };
    Some((start, end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top];

    fn inside(self, vp: &Viewport, p: Point2<f64>) -> bool {
        match self {
            Edge::Left => p.x >= vp.xmin,
            Edge::Right => p.x <= vp.xmax,
            Edge::Bottom => p.y <= vp.ymax,
            Edge::Top => p.y >= vp.ymin,
        }
    }

    fn intersect(self, vp: &Viewport, a: Point2<f64>, b: Point2<f64>) -> Point2<f64> {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let at_x = |x: f64| if dx != 0.0 { a.y + dy * (x - a.x) / dx } else { a.y };
        let at_y = |y: f64| if dy != 0.0 { a.x + dx * (y - a.y) / dy } else { a.x };
        match self {
            Edge::Left => Point2::new(vp.xmin, at_x(vp.xmin)),
            Edge::Right => Point2::new(vp.xmax, at_x(vp.xmax)),
            Edge::Bottom => Point2::new(at_y(vp.ymax), vp.ymax),
            Edge::Top => Point2::new(at_y(vp.ymin), vp.ymin),
        }
    }
}

/// Sutherland-Hodgman polygon clipping.
///
/// A result with fewer than 3 vertices means the polygon is clipped away.
pub fn sutherland_hodgman(vp: &Viewport, polygon: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut output = polygon.to_vec();

    for edge in Edge::ALL {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        for (i, &current) in input.iter().enumerate() {
            let next = input[(i + 1) % input.len()];
            let current_in = edge.inside(vp, current);
            let next_in = edge.inside(vp, next);
            if current_in {
                output.push(current);
                if !next_in {
                    output.push(edge.intersect(vp, current, next));
                }
            } else if next_in {
                output.push(edge.intersect(vp, current, next));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn vp() -> Viewport {
        Viewport::new(0.0, 0.0, 500.0, 500.0)
    }

    fn pt(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn grazing_endpoints_are_clamped_onto_the_viewport() {
        let (a, b) = settle_grazing(&vp(), pt(500.0 + 1e-12, 0.0), pt(250.0, -1e-12)).unwrap();
        assert_eq!(a, pt(500.0, 0.0));
        assert_eq!(b, pt(250.0, 0.0));
        assert!(settle_grazing(&vp(), pt(501.0, 0.0), pt(250.0, 0.0)).is_none());
    }

    #[test]
    fn point_clip_is_inclusive() {
        assert!(clip_point(&vp(), pt(0.0, 500.0)));
        assert!(!clip_point(&vp(), pt(-0.1, 10.0)));
        assert!(!clip_point(&vp(), pt(10.0, 500.1)));
    }

    #[test]
    fn outcodes_match_pixel_orientation() {
        let v = vp();
        assert_eq!(outcode(&v, pt(250.0, 250.0)), INSIDE);
        assert_eq!(outcode(&v, pt(-1.0, 250.0)), LEFT);
        assert_eq!(outcode(&v, pt(501.0, 250.0)), RIGHT);
        assert_eq!(outcode(&v, pt(250.0, 501.0)), BOTTOM);
        assert_eq!(outcode(&v, pt(250.0, -1.0)), TOP);
        assert_eq!(outcode(&v, pt(-1.0, -1.0)), LEFT | TOP);
    }

    fn battery() -> Vec<(Point2<f64>, Point2<f64>)> {
        vec![
            // fully inside
            (pt(10.0, 10.0), pt(490.0, 300.0)),
            (pt(100.0, 100.0), pt(100.0, 400.0)),
            // fully outside, same side and different sides
            (pt(-50.0, 10.0), pt(-10.0, 400.0)),
            (pt(600.0, -20.0), pt(700.0, 900.0)),
            (pt(-100.0, 450.0), pt(100.0, 700.0)),
            // crossing single boundaries
            (pt(-100.0, 250.0), pt(250.0, 250.0)),
            (pt(250.0, 250.0), pt(800.0, 100.0)),
            (pt(250.0, 250.0), pt(300.0, 900.0)),
            (pt(200.0, -300.0), pt(250.0, 250.0)),
            // crossing several boundaries
            (pt(-100.0, 250.0), pt(600.0, 250.0)),
            (pt(250.0, -100.0), pt(250.0, 600.0)),
            (pt(-100.0, -50.0), pt(600.0, 550.0)),
            (pt(-50.0, 300.0), pt(300.0, -60.0)),
            (pt(520.0, 100.0), pt(100.0, 560.0)),
        ]
    }

    #[test]
    fn cohen_sutherland_and_liang_barsky_agree() {
        let v = vp();
        for (a, b) in battery() {
            let cs = cohen_sutherland(&v, a, b);
            let lb = liang_barsky(&v, a, b);
            match (cs, lb) {
                (None, None) => {}
                (Some((c1, c2)), Some((l1, l2))) => {
                    assert_abs_diff_eq!(c1.x, l1.x, epsilon = 1e-9);
                    assert_abs_diff_eq!(c1.y, l1.y, epsilon = 1e-9);
                    assert_abs_diff_eq!(c2.x, l2.x, epsilon = 1e-9);
                    assert_abs_diff_eq!(c2.y, l2.y, epsilon = 1e-9);
                }
                other => panic!("algorithms disagree on {a:?}-{b:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn inside_segment_is_untouched() {
        let (a, b) = (pt(10.0, 20.0), pt(30.0, 40.0));
        for algo in [LineClipping::CohenSutherland, LineClipping::LiangBarsky] {
            assert_eq!(algo.clip(&vp(), a, b), Some((a, b)));
        }
    }

    #[test]
    fn horizontal_crossing_clips_to_both_sides() {
        for algo in [LineClipping::CohenSutherland, LineClipping::LiangBarsky] {
            let (a, b) = algo.clip(&vp(), pt(-250.0, 250.0), pt(750.0, 250.0)).unwrap();
            assert_abs_diff_eq!(a.x, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(b.x, 500.0, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y, 250.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn vertical_line_outside_is_rejected() {
        for algo in [LineClipping::CohenSutherland, LineClipping::LiangBarsky] {
            assert_eq!(algo.clip(&vp(), pt(-5.0, -100.0), pt(-5.0, 600.0)), None);
        }
    }

    #[test]
    fn degenerate_segment() {
        for algo in [LineClipping::CohenSutherland, LineClipping::LiangBarsky] {
            let p = pt(100.0, 100.0);
            assert_eq!(algo.clip(&vp(), p, p), Some((p, p)));
            let q = pt(-100.0, 100.0);
            assert_eq!(algo.clip(&vp(), q, q), None);
        }
    }

    #[test]
    fn polygon_inside_is_unchanged() {
        let square = vec![pt(100.0, 100.0), pt(400.0, 100.0), pt(400.0, 400.0), pt(100.0, 400.0)];
        assert_eq!(sutherland_hodgman(&vp(), &square), square);
    }

    #[test]
    fn polygon_outside_is_removed() {
        let tri = vec![pt(600.0, 600.0), pt(700.0, 600.0), pt(650.0, 700.0)];
        assert!(sutherland_hodgman(&vp(), &tri).len() < 3);
    }

    #[test]
    fn polygon_straddling_corner() {
        let square = vec![pt(-100.0, -100.0), pt(100.0, -100.0), pt(100.0, 100.0), pt(-100.0, 100.0)];
        let clipped = sutherland_hodgman(&vp(), &square);
        assert_eq!(clipped.len(), 4);
        for p in &clipped {
            assert!(vp().contains(*p));
        }
        assert!(clipped.contains(&pt(0.0, 0.0)));
        assert!(clipped.contains(&pt(100.0, 100.0)));
    }

    #[test]
    fn polygon_enclosing_viewport_becomes_viewport() {
        let big = vec![pt(-10.0, -10.0), pt(510.0, -10.0), pt(510.0, 510.0), pt(-10.0, 510.0)];
        let clipped = sutherland_hodgman(&vp(), &big);
        assert_eq!(clipped.len(), 4);
        for corner in [pt(0.0, 0.0), pt(500.0, 0.0), pt(500.0, 500.0), pt(0.0, 500.0)] {
            assert!(clipped.iter().any(|p| (p - corner).norm() < 1e-9));
        }
    }

    #[test]
    fn toggle_switches_algorithm() {
        assert_eq!(LineClipping::CohenSutherland.toggled(), LineClipping::LiangBarsky);
        assert_eq!(LineClipping::LiangBarsky.label(), "Liang-Barsky");
    }
}
