//! Pixel-space primitives and the drawing surface they are handed to.

use nalgebra::Point2;

use crate::config::MAX_DRAWABLE_COORDINATE;
use crate::error::RenderError;
use crate::geometry::Rgb;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    /// 2 for selected objects, 1 otherwise.
    pub width: u8,
}

impl Stroke {
    pub fn new(color: Rgb, selected: bool) -> Self {
        Self {
            color,
            width: if selected { 2 } else { 1 },
        }
    }
}

/// One drawing command. All coordinates are pixels, already clipped to the
/// viewport.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// The viewport rectangle, emitted first in every frame.
    Border(Viewport),
    Point {
        at: Point2<f64>,
        radius: f64,
        stroke: Stroke,
    },
    Segment {
        from: Point2<f64>,
        to: Point2<f64>,
        stroke: Stroke,
    },
    Polygon {
        vertices: Vec<Point2<f64>>,
        fill: bool,
        stroke: Stroke,
    },
}

/// The external 2D surface a canvas renders into.
pub trait DrawSurface {
    fn draw(&mut self, primitive: &Primitive);
}

impl DrawSurface for Vec<Primitive> {
    fn draw(&mut self, primitive: &Primitive) {
        self.push(primitive.clone());
    }
}

/// Reject pixel coordinates a surface cannot represent.
pub fn check_drawable(p: Point2<f64>) -> Result<Point2<f64>, RenderError> {
    for value in [p.x, p.y] {
        if !value.is_finite() || value.abs() > MAX_DRAWABLE_COORDINATE {
            return Err(RenderError::Overflow { value });
        }
    }
    Ok(p)
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub objects_drawn: usize,
    pub objects_skipped: usize,
    pub primitives: usize,
}
