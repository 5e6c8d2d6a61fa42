//! # Errors
//!
//! Error types for object construction, scene editing, navigation, drawing
//! and scene files. None of them is fatal: callers skip the offending object
//! or primitive and carry on.

use thiserror::Error;

use crate::object::ObjectType;

/// An object violates the geometric constraints of its type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("object name must not be empty")]
    EmptyName,

    #[error("{kind} requires {expected} coordinates, got {count}")]
    CoordinateCount {
        kind: ObjectType,
        expected: &'static str,
        count: usize,
    },

    #[error("3D polygon requires at least one edge")]
    NoEdges,

    #[error("edge ({start}, {end}) references a vertex outside 0..{vertex_count}")]
    EdgeIndex {
        start: usize,
        end: usize,
        vertex_count: usize,
    },

    #[error("control grid rows must all have the same length")]
    RaggedGrid,

    #[error("{kind} control grid is {rows}x{cols}, expected {expected}")]
    GridSize {
        kind: ObjectType,
        rows: usize,
        cols: usize,
        expected: &'static str,
    },

    #[error("surface resolution must be between 1 and {max}, got {resolution}")]
    Resolution { resolution: usize, max: usize },
}

/// Scene-level edits that cannot be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("object {0} already exists")]
    DuplicateName(String),

    #[error("object {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Window updates that would break `max > min` on some axis.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WindowError {
    #[error("zoom factor must be positive and finite, got {0}")]
    InvalidZoom(f64),

    #[error("pan delta must be finite")]
    NonFinitePan,

    #[error("rotation angle must be finite")]
    NonFiniteAngle,
}

/// A primitive could not be handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RenderError {
    #[error("coordinate {value} exceeds the drawable range")]
    Overflow { value: f64 },
}

/// One surface patch could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PatchError {
    #[error("patch [{row}][{col}] has non-finite control points")]
    NonFiniteControlPoint { row: usize, col: usize },

    #[error("patch [{row}][{col}] produced non-finite samples")]
    NonFiniteSample { row: usize, col: usize },
}

/// Reading or writing a scene file failed as a whole.
#[derive(Debug, Error)]
pub enum SceneIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl SceneIoError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
