//! The scene, its window and viewport, and the per-frame pipeline.
//!
//! Every frame recomputes object coordinates from scratch:
//! world → (3D: projection and divide) → normalized → window rotation →
//! pixels → clip → primitive.

use std::cell::RefCell;

use nalgebra::{Matrix3, Matrix4, Point2, Point3};

use crate::clipping::{clip_point, sutherland_hodgman, LineClipping};
use crate::config::{CanvasConfig, MovementMode, EPSILON};
use crate::curve::{bezier_curve, bspline_curve, g0_discontinuities};
use crate::error::{RenderError, SceneError};
use crate::geometry::{Point3D, Rgb};
use crate::object::SceneObject;
use crate::projection::{project_point, ProjectionMode};
use crate::render::{check_drawable, DrawSurface, FrameStats, Primitive, Stroke};
use crate::report::{LogReporter, Reporter};
use crate::scene_io::{export_scene, ColorTable, ExportedScene, ImportOutcome};
use crate::surface::Surface;
use crate::transform::Transform;
use crate::viewport::Viewport;
use crate::window::Window;
use crate::wireframe::{Wireframe, Wireframe3D, WireframeKind};

pub struct Canvas {
    window: Window,
    viewport: Viewport,
    width: f64,
    height: f64,
    objects: Vec<SceneObject>,
    config: CanvasConfig,
    reporter: Box<dyn Reporter>,
    /// Warnings raised by the previous frame; a warning is reported only on
    /// the first of a run of frames that raise it.
    frame_warnings: RefCell<Vec<String>>,
}

impl Canvas {
    /// A canvas for a `width × height` pixel surface with default settings.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(width, height, CanvasConfig::default())
    }

    pub fn with_config(width: f64, height: f64, config: CanvasConfig) -> Self {
        Self {
            window: Window::default(),
            viewport: Viewport::for_surface(width, height, config.border_width),
            width,
            height,
            objects: Vec::new(),
            config,
            reporter: Box::new(LogReporter),
            frame_warnings: RefCell::new(Vec::new()),
        }
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn set_window(&mut self, window: Window) {
        self.window = window;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Replace the viewport directly, ignoring the configured border.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.viewport = Viewport::for_surface(width, height, self.config.border_width);
        log::debug!("canvas resized to {width}x{height}");
    }

    pub fn set_border_width(&mut self, border: f64) {
        self.config.border_width = border;
        self.resize(self.width, self.height);
    }

    // ---- scene ----

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name() == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name() == name)
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut SceneObject, SceneError> {
        self.object_mut(name)
            .ok_or_else(|| SceneError::NotFound(name.to_owned()))
    }

    /// Append an object; names are unique within the scene.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> Result<(), SceneError> {
        let object = object.into();
        if self.object(object.name()).is_some() {
            let err = SceneError::DuplicateName(object.name().to_owned());
            self.reporter.warn(&err.to_string());
            return Err(err);
        }
        self.reporter
            .info(&format!("{} {} added", object.object_type(), object.name()));
        self.objects.push(object);
        Ok(())
    }

    pub fn remove_object(&mut self, name: &str) -> Result<SceneObject, SceneError> {
        let index = self
            .objects
            .iter()
            .position(|o| o.name() == name)
            .ok_or_else(|| SceneError::NotFound(name.to_owned()))?;
        self.reporter.info(&format!("{name} removed"));
        Ok(self.objects.remove(index))
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn select(&mut self, name: &str) -> Result<(), SceneError> {
        self.require_mut(name)?.select();
        Ok(())
    }

    pub fn deselect(&mut self, name: &str) -> Result<(), SceneError> {
        self.require_mut(name)?.deselect();
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.objects.iter_mut().for_each(SceneObject::deselect);
    }

    pub fn selected(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.is_selected())
    }

    /// A red dot, a green line, a blue triangle and a filled yellow square.
    pub fn load_example_objects(&mut self) -> Result<(), SceneError> {
        let p = Point2::new;
        let examples = [
            example("Red Dot", WireframeKind::Dot, vec![p(0.0, 0.0)], Rgb::RED, false),
            example(
                "Green Line",
                WireframeKind::Line,
                vec![p(-5.0, -5.0), p(5.0, 5.0)],
                Rgb::GREEN,
                false,
            ),
            example(
                "Blue Triangle",
                WireframeKind::Polygon,
                vec![p(0.0, 0.0), p(5.0, 8.0), p(-5.0, 8.0)],
                Rgb::BLUE,
                false,
            ),
            example(
                "Yellow Square",
                WireframeKind::Polygon,
                vec![p(-5.0, -5.0), p(5.0, -5.0), p(5.0, 5.0), p(-5.0, 5.0)],
                Rgb::YELLOW,
                true,
            ),
        ];
        for wireframe in examples.into_iter().flatten() {
            self.add_object(wireframe)?;
        }
        Ok(())
    }

    // ---- object edits ----

    pub fn translate_object(&mut self, name: &str, dx: f64, dy: f64, dz: f64) -> Result<(), SceneError> {
        self.require_mut(name)?.translate(dx, dy, dz);
        Ok(())
    }

    pub fn scale_object(&mut self, name: &str, sx: f64, sy: f64, sz: f64) -> Result<(), SceneError> {
        self.require_mut(name)?.scale(sx, sy, sz);
        Ok(())
    }

    pub fn rotate_object(&mut self, name: &str, ax: f64, ay: f64, az: f64) -> Result<(), SceneError> {
        self.require_mut(name)?.rotate(ax, ay, az);
        Ok(())
    }

    pub fn rotate_object_about_center(
        &mut self,
        name: &str,
        ax: f64,
        ay: f64,
        az: f64,
    ) -> Result<(), SceneError> {
        self.require_mut(name)?.rotate_about_centroid(ax, ay, az);
        Ok(())
    }

    pub fn rotate_object_about_point(
        &mut self,
        name: &str,
        ax: f64,
        ay: f64,
        az: f64,
        pivot: Point3D,
    ) -> Result<(), SceneError> {
        self.require_mut(name)?.rotate_about_point(ax, ay, az, pivot);
        Ok(())
    }

    // ---- navigation ----

    /// Pan by `pan_step` world units per input unit, in window-local axes.
    pub fn pan(&mut self, dx: f64, dy: f64, dz: f64) -> Result<(), SceneError> {
        let s = self.config.pan_step;
        self.window.pan(dx * s, dy * s, dz * s)?;
        Ok(())
    }

    pub fn zoom_in(&mut self) -> Result<(), SceneError> {
        self.window.zoom(1.0 / self.config.zoom_factor)?;
        Ok(())
    }

    pub fn zoom_out(&mut self) -> Result<(), SceneError> {
        self.window.zoom(self.config.zoom_factor)?;
        Ok(())
    }

    pub fn rotate_window(&mut self, ax: f64, ay: f64, az: f64) -> Result<(), SceneError> {
        self.window.rotate(ax, ay, az)?;
        Ok(())
    }

    /// Directional input routed by the movement mode. In rotate mode a
    /// vertical delta tilts about x, a horizontal one turns about y and the
    /// depth delta spins about z, `rotation_step` degrees per unit.
    pub fn move_view(&mut self, dx: f64, dy: f64, dz: f64) -> Result<(), SceneError> {
        match self.config.movement {
            MovementMode::Pan => self.pan(dx, dy, dz),
            MovementMode::Rotate => {
                let s = self.config.rotation_step;
                self.rotate_window(dy * s, dx * s, dz * s)
            }
        }
    }

    // ---- switches ----

    pub fn set_line_clipping(&mut self, clipping: LineClipping) {
        self.config.line_clipping = clipping;
        self.reporter
            .info(&format!("line clipping: {}", clipping.label()));
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.config.projection = mode;
        self.reporter.info(&format!("projection: {}", mode.label()));
    }

    pub fn set_show_control_points(&mut self, show: bool) {
        self.config.show_control_points = show;
    }

    pub fn set_movement_mode(&mut self, movement: MovementMode) {
        self.config.movement = movement;
    }

    // ---- coordinate mapping ----

    /// World (2D) to pixel coordinates.
    pub fn world_to_viewport(&self, p: Point2<f64>) -> Point2<f64> {
        FrameContext::new(self).map_2d(p)
    }

    pub fn viewport_to_world(&self, pixel: Point2<f64>) -> Point2<f64> {
        let n = self.viewport.to_normalized(pixel);
        let unrotated = Transform::apply_2d(&Transform::rotation_2d(self.window.rotation().z), n);
        self.window.normalized_to_world_2d(unrotated)
    }

    // ---- scene files ----

    pub fn export(&self, colors: &ColorTable) -> ExportedScene {
        export_scene(&self.objects, colors)
    }

    /// Add every imported object, reporting file issues and name clashes.
    /// Returns the number of objects added.
    pub fn import(&mut self, outcome: ImportOutcome) -> usize {
        for issue in &outcome.issues {
            self.reporter.warn(&issue.to_string());
        }
        let mut added = 0;
        for object in outcome.objects {
            if self.add_object(object).is_ok() {
                added += 1;
            }
        }
        added
    }

    // ---- drawing ----

    /// Collect one frame as a list of primitives.
    pub fn frame(&self) -> Vec<Primitive> {
        let mut out = Vec::new();
        self.render(&mut out);
        out
    }

    /// Draw one frame. An object whose coordinates leave the drawable range
    /// is reported and contributes nothing to this frame.
    pub fn render(&self, surface: &mut dyn DrawSurface) -> FrameStats {
        let ctx = FrameContext::new(self);
        let mut stats = FrameStats::default();

        surface.draw(&Primitive::Border(self.viewport));
        stats.primitives += 1;

        let mut staged = Vec::new();
        for object in &self.objects {
            staged.clear();
            match ctx.draw_object(object, &mut staged) {
                Ok(()) => {
                    for p in &staged {
                        surface.draw(p);
                    }
                    stats.objects_drawn += 1;
                    stats.primitives += staged.len();
                }
                Err(e) => {
                    ctx.warn(format!("{} not drawn: {e}", object.name()));
                    stats.objects_skipped += 1;
                }
            }
        }

        let current = ctx.warnings.into_inner();
        let mut previous = self.frame_warnings.borrow_mut();
        for message in current.iter().filter(|m| !previous.contains(m)) {
            self.reporter.warn(message);
        }
        *previous = current;
        log::trace!(
            "frame: {} drawn, {} skipped, {} primitives",
            stats.objects_drawn,
            stats.objects_skipped,
            stats.primitives
        );
        stats
    }
}

fn example(
    name: &str,
    kind: WireframeKind,
    coordinates: Vec<Point2<f64>>,
    color: Rgb,
    fill: bool,
) -> Option<Wireframe> {
    Wireframe::new(name, kind, coordinates)
        .ok()
        .map(|w| w.with_color(color).with_fill(fill))
}

/// Matrices and settings fixed for the duration of one frame.
struct FrameContext<'a> {
    canvas: &'a Canvas,
    window_matrix: Matrix3<f64>,
    projection: Matrix4<f64>,
    warnings: RefCell<Vec<String>>,
}

impl<'a> FrameContext<'a> {
    fn new(canvas: &'a Canvas) -> Self {
        let window = &canvas.window;
        Self {
            canvas,
            window_matrix: window.transformation_matrix(),
            projection: window.projection(
                canvas.config.projection,
                canvas.config.perspective_distance,
            ),
            warnings: RefCell::new(Vec::new()),
        }
    }

    fn warn(&self, message: String) {
        self.warnings.borrow_mut().push(message);
    }

    fn viewport(&self) -> &Viewport {
        &self.canvas.viewport
    }

    fn clipping(&self) -> LineClipping {
        self.canvas.config.line_clipping
    }

    fn map_2d(&self, p: Point2<f64>) -> Point2<f64> {
        let n = self.canvas.window.world_to_normalized_2d(p);
        let rotated = Transform::apply_2d(&self.window_matrix, n);
        self.viewport().to_pixel(rotated)
    }

    fn pixel_2d(&self, p: Point2<f64>) -> Result<Point2<f64>, RenderError> {
        check_drawable(self.map_2d(p))
    }

    /// `Ok(None)` when the point is unprojectable.
    fn pixel_3d(&self, p: &Point3D) -> Result<Option<Point2<f64>>, RenderError> {
        let Some(projected) = project_point(&self.projection, Point3::new(p.x, p.y, p.z)) else {
            return Ok(None);
        };
        self.pixel_2d(Point2::new(projected.x, projected.y)).map(Some)
    }

    fn draw_object(&self, object: &SceneObject, out: &mut Vec<Primitive>) -> Result<(), RenderError> {
        let stroke = Stroke::new(object.color(), object.is_selected());
        match object {
            SceneObject::Wireframe(w) => self.draw_wireframe(w, stroke, out),
            SceneObject::Wireframe3D(w) => self.draw_wireframe_3d(w, stroke, out),
            SceneObject::Surface(s) => self.draw_surface(s, stroke, out),
        }
    }

    fn draw_wireframe(&self, w: &Wireframe, stroke: Stroke, out: &mut Vec<Primitive>) -> Result<(), RenderError> {
        let coords = w.coordinates();
        match w.kind() {
            WireframeKind::Dot => {
                let at = self.pixel_2d(coords[0])?;
                if clip_point(self.viewport(), at) {
                    out.push(Primitive::Point {
                        at,
                        radius: self.canvas.config.dot_radius,
                        stroke,
                    });
                }
            }
            WireframeKind::Line => {
                let a = self.pixel_2d(coords[0])?;
                let b = self.pixel_2d(coords[1])?;
                self.push_segment(a, b, stroke, out);
            }
            WireframeKind::Polygon => {
                let pixels = coords
                    .iter()
                    .map(|&p| self.pixel_2d(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let clipped = sutherland_hodgman(self.viewport(), &pixels);
                if clipped.len() >= 3 {
                    out.push(Primitive::Polygon {
                        vertices: clipped,
                        fill: w.fill(),
                        stroke,
                    });
                }
            }
            WireframeKind::Curve => {
                for i in g0_discontinuities(coords, EPSILON) {
                    self.warn(format!(
                        "{}: segments {} and {} are not G0 continuous",
                        w.name(),
                        i,
                        i + 1
                    ));
                }
                for segment in bezier_curve(coords, self.canvas.config.curve_precision) {
                    self.push_polyline(&segment, stroke, out)?;
                }
                self.push_control_points(coords.iter().copied(), stroke, out)?;
            }
            WireframeKind::CurveBSpline => {
                for segment in bspline_curve(coords, self.canvas.config.curve_precision) {
                    self.push_polyline(&segment, stroke, out)?;
                }
                self.push_control_points(coords.iter().copied(), stroke, out)?;
            }
        }
        Ok(())
    }

    fn draw_wireframe_3d(&self, w: &Wireframe3D, stroke: Stroke, out: &mut Vec<Primitive>) -> Result<(), RenderError> {
        let points = w.points();
        for &(i, j) in w.edges() {
            self.push_edge_3d(&points[i], &points[j], stroke, out)?;
        }
        Ok(())
    }

    fn draw_surface(&self, s: &Surface, stroke: Stroke, out: &mut Vec<Primitive>) -> Result<(), RenderError> {
        for (a, b) in s.wireframe_edges() {
            self.push_edge_3d(&a, &b, stroke, out)?;
        }
        if self.canvas.config.show_control_points {
            for p in s.control_points_flat() {
                if let Some(at) = self.pixel_3d(p)? {
                    self.push_marker(at, stroke, out);
                }
            }
        }
        Ok(())
    }

    fn push_edge_3d(&self, a: &Point3D, b: &Point3D, stroke: Stroke, out: &mut Vec<Primitive>) -> Result<(), RenderError> {
        if let (Some(a), Some(b)) = (self.pixel_3d(a)?, self.pixel_3d(b)?) {
            self.push_segment(a, b, stroke, out);
        }
        Ok(())
    }

    fn push_segment(&self, a: Point2<f64>, b: Point2<f64>, stroke: Stroke, out: &mut Vec<Primitive>) {
        if let Some((from, to)) = self.clipping().clip(self.viewport(), a, b) {
            out.push(Primitive::Segment { from, to, stroke });
        }
    }

    /// World-space samples, each sub-segment clipped on its own.
    fn push_polyline(&self, samples: &[Point2<f64>], stroke: Stroke, out: &mut Vec<Primitive>) -> Result<(), RenderError> {
        let pixels = samples
            .iter()
            .map(|&p| self.pixel_2d(p))
            .collect::<Result<Vec<_>, _>>()?;
        for pair in pixels.windows(2) {
            self.push_segment(pair[0], pair[1], stroke, out);
        }
        Ok(())
    }

    fn push_control_points(
        &self,
        points: impl Iterator<Item = Point2<f64>>,
        stroke: Stroke,
        out: &mut Vec<Primitive>,
    ) -> Result<(), RenderError> {
        if !self.canvas.config.show_control_points {
            return Ok(());
        }
        for p in points {
            let at = self.pixel_2d(p)?;
            self.push_marker(at, stroke, out);
        }
        Ok(())
    }

    fn push_marker(&self, at: Point2<f64>, stroke: Stroke, out: &mut Vec<Primitive>) {
        if clip_point(self.viewport(), at) {
            out.push(Primitive::Point {
                at,
                radius: (self.canvas.config.dot_radius - 1.0).max(1.0),
                stroke,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use crate::surface::SurfaceKind;
    use approx::assert_abs_diff_eq;
    use std::rc::Rc;

    fn canvas_500() -> Canvas {
        let mut canvas = Canvas::new(500.0, 500.0);
        canvas.set_viewport(Viewport::new(0.0, 0.0, 500.0, 500.0));
        canvas
    }

    fn line(name: &str, a: (f64, f64), b: (f64, f64)) -> Wireframe {
        Wireframe::new(
            name,
            WireframeKind::Line,
            vec![Point2::new(a.0, a.1), Point2::new(b.0, b.1)],
        )
        .unwrap()
    }

    #[test]
    fn origin_maps_to_viewport_centre() {
        let canvas = canvas_500();
        assert_eq!(canvas.world_to_viewport(Point2::new(0.0, 0.0)), Point2::new(250.0, 250.0));
    }

    #[test]
    fn viewport_to_world_inverts_mapping_under_rotation() {
        let mut canvas = canvas_500();
        canvas.rotate_window(0.0, 0.0, 37.0).unwrap();
        canvas.pan(2.0, -1.0, 0.0).unwrap();
        let p = Point2::new(3.5, -7.25);
        let back = canvas.viewport_to_world(canvas.world_to_viewport(p));
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut canvas = canvas_500();
        canvas.add_object(line("a", (0.0, 0.0), (1.0, 1.0))).unwrap();
        let err = canvas.add_object(line("a", (5.0, 5.0), (6.0, 6.0))).unwrap_err();
        assert_eq!(err, SceneError::DuplicateName("a".into()));
        assert_eq!(canvas.objects().len(), 1);
        let kept = canvas.object("a").and_then(SceneObject::as_wireframe).unwrap();
        assert_eq!(kept.coordinates()[0], Point2::new(0.0, 0.0));
    }

    #[test]
    fn remove_and_edit_unknown_names() {
        let mut canvas = canvas_500();
        assert_eq!(
            canvas.remove_object("ghost").unwrap_err(),
            SceneError::NotFound("ghost".into())
        );
        assert!(canvas.translate_object("ghost", 1.0, 0.0, 0.0).is_err());
        canvas.load_example_objects().unwrap();
        assert_eq!(canvas.objects().len(), 4);
        canvas.remove_object("Red Dot").unwrap();
        assert_eq!(canvas.objects().len(), 3);
    }

    #[test]
    fn border_is_first_primitive() {
        let mut canvas = canvas_500();
        canvas.load_example_objects().unwrap();
        let frame = canvas.frame();
        assert!(matches!(frame[0], Primitive::Border(_)));
        assert_eq!(frame.len(), 5);
    }

    #[test]
    fn example_square_is_filled_and_unclipped() {
        let mut canvas = canvas_500();
        canvas.load_example_objects().unwrap();
        let frame = canvas.frame();
        let square = frame
            .iter()
            .find_map(|p| match p {
                Primitive::Polygon { vertices, fill, stroke } if stroke.color == Rgb::YELLOW => {
                    Some((vertices.clone(), *fill))
                }
                _ => None,
            })
            .unwrap();
        assert!(square.1);
        assert_eq!(square.0.len(), 4);
        assert_abs_diff_eq!(square.0[0].x, 125.0, epsilon = 1e-9);
        assert_abs_diff_eq!(square.0[0].y, 375.0, epsilon = 1e-9);
    }

    #[test]
    fn selected_objects_get_wide_stroke() {
        let mut canvas = canvas_500();
        canvas.add_object(line("l", (-1.0, 0.0), (1.0, 0.0))).unwrap();
        canvas.select("l").unwrap();
        let frame = canvas.frame();
        assert!(matches!(frame[1], Primitive::Segment { stroke: Stroke { width: 2, .. }, .. }));
        canvas.deselect_all();
        assert!(matches!(canvas.frame()[1], Primitive::Segment { stroke: Stroke { width: 1, .. }, .. }));
    }

    #[test]
    fn overflowing_object_is_skipped_and_reported() {
        let reporter = Rc::new(MemoryReporter::new());
        let mut canvas = canvas_500().with_reporter(Rc::clone(&reporter));
        canvas.add_object(line("huge", (0.0, 0.0), (1e300, 0.0))).unwrap();
        canvas.add_object(line("ok", (-1.0, 0.0), (1.0, 0.0))).unwrap();
        let mut out = Vec::new();
        let stats = canvas.render(&mut out);
        assert_eq!(stats.objects_skipped, 1);
        assert_eq!(stats.objects_drawn, 1);
        assert_eq!(out.len(), 2);
        assert!(reporter.contains("huge not drawn"));
    }

    #[test]
    fn curve_discontinuity_is_reported_not_fatal() {
        let reporter = Rc::new(MemoryReporter::new());
        let mut canvas = canvas_500().with_reporter(Rc::clone(&reporter));
        let p = Point2::new;
        let curve = Wireframe::new(
            "c",
            WireframeKind::Curve,
            vec![
                p(-8.0, 0.0), p(-6.0, 4.0), p(-4.0, 4.0), p(-2.0, 0.0),
                p(0.0, 0.0), p(2.0, -4.0), p(4.0, -4.0), p(6.0, 0.0),
            ],
        )
        .unwrap();
        canvas.add_object(curve).unwrap();
        let stats = canvas.render(&mut Vec::new());
        assert_eq!(stats.objects_drawn, 1);
        assert_eq!(stats.primitives, 1 + 2 * canvas.config().curve_precision);
        assert!(reporter.contains("not G0 continuous"));
    }

    fn count(reporter: &MemoryReporter, needle: &str) -> usize {
        reporter.entries().iter().filter(|(_, m)| m.contains(needle)).count()
    }

    #[test]
    fn repeated_frames_report_a_discontinuity_once() {
        let reporter = Rc::new(MemoryReporter::new());
        let mut canvas = canvas_500().with_reporter(Rc::clone(&reporter));
        let p = Point2::new;
        let curve = Wireframe::new(
            "c",
            WireframeKind::Curve,
            vec![
                p(-8.0, 0.0), p(-6.0, 4.0), p(-4.0, 4.0), p(-2.0, 0.0),
                p(0.0, 0.0), p(2.0, -4.0), p(4.0, -4.0), p(6.0, 0.0),
            ],
        )
        .unwrap();
        canvas.add_object(curve).unwrap();
        canvas.frame();
        canvas.frame();
        assert_eq!(count(&reporter, "not G0 continuous"), 1);
    }

    #[test]
    fn overflow_is_reported_again_after_it_clears() {
        let reporter = Rc::new(MemoryReporter::new());
        let mut canvas = canvas_500().with_reporter(Rc::clone(&reporter));
        canvas.add_object(line("huge", (0.0, 0.0), (1e300, 0.0))).unwrap();
        canvas.frame();
        canvas.frame();
        assert_eq!(count(&reporter, "huge not drawn"), 1);

        let huge = canvas.remove_object("huge").unwrap();
        canvas.frame();
        canvas.add_object(huge).unwrap();
        canvas.frame();
        assert_eq!(count(&reporter, "huge not drawn"), 2);
    }

    #[test]
    fn control_point_markers_follow_switch() {
        let mut canvas = canvas_500();
        let p = Point2::new;
        let spline = Wireframe::new(
            "b",
            WireframeKind::CurveBSpline,
            vec![p(-5.0, 0.0), p(-2.0, 5.0), p(2.0, 5.0), p(5.0, 0.0), p(8.0, -3.0)],
        )
        .unwrap();
        canvas.add_object(spline).unwrap();
        let points = |c: &Canvas| {
            c.frame()
                .iter()
                .filter(|p| matches!(p, Primitive::Point { .. }))
                .count()
        };
        assert_eq!(points(&canvas), 0);
        canvas.set_show_control_points(true);
        assert_eq!(points(&canvas), 5);
    }

    #[test]
    fn move_view_rotates_in_rotate_mode() {
        let mut canvas = canvas_500();
        canvas.set_movement_mode(MovementMode::Rotate);
        canvas.move_view(1.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(canvas.window().rotation().y, 15.0, epsilon = 1e-12);
        assert_eq!(canvas.window().xmin(), -10.0);
        canvas.set_movement_mode(MovementMode::Pan);
        canvas.move_view(1.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(canvas.window().xmin(), -9.0, epsilon = 1e-12);
    }

    #[test]
    fn zoom_in_then_out_restores_window() {
        let mut canvas = canvas_500();
        canvas.zoom_in().unwrap();
        assert!(canvas.window().width() < 20.0);
        canvas.zoom_out().unwrap();
        assert_abs_diff_eq!(canvas.window().width(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn polygon3d_edge_behind_eye_is_dropped() {
        let mut canvas = canvas_500();
        canvas.set_projection_mode(ProjectionMode::Perspective);
        let points = vec![
            Point3D::new(-1.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, -40.0),
        ];
        let cube = Wireframe3D::new("tri", points, vec![(0, 1), (1, 2)]).unwrap();
        canvas.add_object(cube).unwrap();
        let segments = canvas
            .frame()
            .iter()
            .filter(|p| matches!(p, Primitive::Segment { .. }))
            .count();
        assert_eq!(segments, 1);
    }

    #[test]
    fn surface_draws_its_mesh_edges() {
        let mut canvas = canvas_500();
        let grid: Vec<Vec<Point3D>> = (0..4)
            .map(|i| (0..4).map(|j| Point3D::new(i as f64 - 1.5, j as f64 - 1.5, 0.0)).collect())
            .collect();
        let surface = Surface::new("s", SurfaceKind::Bezier, grid, 2).unwrap();
        let edges = surface.wireframe_edges().len();
        canvas.add_object(surface).unwrap();
        assert_eq!(canvas.frame().len(), 1 + edges);
    }
}
