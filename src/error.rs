//! Error types for annotation operations.

use thiserror::Error;

use crate::store::MIN_POLYGON_VERTICES;

/// Errors that can occur while editing annotations.
///
/// All variants are local, recoverable conditions: the operation that would
/// have violated an invariant is rejected and the prior state is preserved.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationError {
    /// Transform requested before the image's natural size is known
    #[error("image not loaded yet, transforms unavailable")]
    NotReady,

    /// Commit attempted with too few vertices
    #[error("polygon needs at least {MIN_POLYGON_VERTICES} vertices, got {count}")]
    InvalidPolygon {
        /// Number of vertices at the time of the attempt
        count: usize,
    },

    /// Vertex mutation with an invalid polygon or vertex index
    #[error("vertex index {index} out of range for polygon {polygon}")]
    IndexOutOfRange {
        /// Polygon id the mutation targeted
        polygon: usize,
        /// Vertex index the mutation targeted
        index: usize,
    },

    /// New polygon started while another is still being drawn
    #[error("a polygon is already being drawn; commit or cancel it first")]
    SessionAlreadyOpen,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AnnotationError>;
