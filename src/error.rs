//! Error types for gtmesh.
//!
//! Every failure aborts the current export. There are no soft errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ExportError`].
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while collecting, welding, encoding or decoding meshes.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A face was not triangulated before export.
    #[error("face {face} has {corners} corners, expected a triangle")]
    NotTriangulated {
        /// The face index.
        face: usize,
        /// Number of corners the face actually has.
        corners: usize,
    },

    /// The source mesh carries no UV layer.
    #[error("mesh {mesh} has no UV layer")]
    MissingUvLayer {
        /// Name of the source mesh, or its position in the export.
        mesh: String,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A per-vertex attribute array does not match the vertex count.
    #[error("{attribute} has {found} entries, expected {expected}")]
    AttributeCountMismatch {
        /// Attribute name.
        attribute: &'static str,
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries.
        found: usize,
    },

    /// A UV layer does not hold exactly one coordinate per face corner.
    #[error("UV layer has {found} coordinates for face {face}, expected {expected}")]
    InvalidUvLayer {
        /// The face index.
        face: usize,
        /// Number of corners of the face.
        expected: usize,
        /// Number of UVs supplied for the face.
        found: usize,
    },

    /// Internal consistency check failed. Signals a bug, not bad input.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A `.gtmesh` stream could not be decoded.
    #[error("malformed mesh file: {0}")]
    Malformed(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading source meshes from a file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl ExportError {
    /// Whether this error is a precondition violation on the input geometry.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExportError::NotTriangulated { .. } | ExportError::MissingUvLayer { .. }
        )
    }

    /// Create an invariant violation error.
    pub fn invariant<T: std::fmt::Display>(message: T) -> Self {
        ExportError::InvariantViolation(message.to_string())
    }

    /// Create a malformed-file error.
    pub fn malformed<T: std::fmt::Display>(message: T) -> Self {
        ExportError::Malformed(message.to_string())
    }
}
