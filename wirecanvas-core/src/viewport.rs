//! Pixel-space viewport and the NDC ⇄ pixel mapping
use nalgebra::Point2;

/// The pixel rectangle primitives are drawn into, inset from the surface
/// edges by `border`. Pixel y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub border: f64,
}

impl Viewport {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            border: 0.0,
        }
    }

    /// Viewport of a `width × height` surface inset by `border` on every
    /// side. A surface smaller than twice the border keeps a one pixel
    /// viewport at the centre.
    pub fn for_surface(width: f64, height: f64, border: f64) -> Self {
        let border = border.max(0.0);
        let (xmin, xmax) = inset(width, border);
        let (ymin, ymax) = inset(height, border);
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            border,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn contains(&self, p: Point2<f64>) -> bool {
        self.xmin <= p.x && p.x <= self.xmax && self.ymin <= p.y && p.y <= self.ymax
    }

    /// Normalized (post window-transform) coordinates to pixels, y inverted.
    pub fn to_pixel(&self, n: Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.xmin + self.width() * (n.x + 1.0) / 2.0,
            self.ymin + self.height() * (1.0 - (n.y + 1.0) / 2.0),
        )
    }

    pub fn to_normalized(&self, p: Point2<f64>) -> Point2<f64> {
        Point2::new(
            2.0 * (p.x - self.xmin) / self.width() - 1.0,
            1.0 - 2.0 * (p.y - self.ymin) / self.height(),
        )
    }
}

fn inset(extent: f64, border: f64) -> (f64, f64) {
    if extent - 2.0 * border >= 1.0 {
        (border, extent - border)
    } else {
        let mid = (extent / 2.0).max(0.5);
        (mid - 0.5, mid + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn center_maps_to_middle_pixel() {
        let vp = Viewport::new(0.0, 0.0, 500.0, 500.0);
        assert_eq!(vp.to_pixel(Point2::new(0.0, 0.0)), Point2::new(250.0, 250.0));
    }

    #[test]
    fn y_is_inverted() {
        let vp = Viewport::new(0.0, 0.0, 400.0, 200.0);
        assert_eq!(vp.to_pixel(Point2::new(-1.0, 1.0)), Point2::new(0.0, 0.0));
        assert_eq!(vp.to_pixel(Point2::new(1.0, -1.0)), Point2::new(400.0, 200.0));
    }

    #[test]
    fn pixel_round_trip() {
        let vp = Viewport::for_surface(640.0, 480.0, 50.0);
        let n = Point2::new(0.3, -0.7);
        let back = vp.to_normalized(vp.to_pixel(n));
        assert_abs_diff_eq!(back.x, n.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, n.y, epsilon = 1e-12);
    }

    #[test]
    fn surface_inset() {
        let vp = Viewport::for_surface(640.0, 480.0, 50.0);
        assert_eq!((vp.xmin, vp.ymin, vp.xmax, vp.ymax), (50.0, 50.0, 590.0, 430.0));
        let tiny = Viewport::for_surface(40.0, 40.0, 50.0);
        assert!(tiny.width() > 0.0 && tiny.height() > 0.0);
    }
}
