//! Wirecanvas core library - 2D/3D wireframe modelling kernel
//!
//! World-space objects (dots, lines, polygons, curves, 3D polygons and
//! bicubic surfaces) are mapped through a movable, rotatable window into a
//! pixel viewport, clipped, and handed to a drawing surface as primitives.
//! The crate has no terminal or GUI code; front-ends implement
//! [`DrawSurface`] and [`Reporter`].

pub mod canvas;
pub mod clipping;
pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod object;
pub mod projection;
pub mod render;
pub mod report;
pub mod scene_io;
pub mod surface;
pub mod transform;
pub mod viewport;
pub mod window;
pub mod wireframe;

// Re-export commonly used types
pub use canvas::Canvas;
pub use clipping::LineClipping;
pub use config::{CanvasConfig, MovementMode};
pub use error::{GeometryError, PatchError, RenderError, SceneError, SceneIoError, WindowError};
pub use geometry::{Point3D, Rgb};
pub use nalgebra::{Point2, Point3};
pub use object::{ObjectType, SceneObject};
pub use projection::ProjectionMode;
pub use render::{DrawSurface, FrameStats, Primitive, Stroke};
pub use report::{LogReporter, MemoryReporter, Reporter};
pub use scene_io::{ColorTable, ExportedScene, ImportIssue, ImportOutcome};
pub use surface::{Surface, SurfaceKind};
pub use transform::{RotationState, Transform};
pub use viewport::Viewport;
pub use window::Window;
pub use wireframe::{Wireframe, Wireframe3D, WireframeKind};
