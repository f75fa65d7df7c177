//! Error types for volume construction and access.

use thiserror::Error;

/// Result type for volume operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur when building or reshaping a volume.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A voxel size is not positive and finite.
    #[error("voxel size for axis {axis} must be positive and finite, got {value}")]
    InvalidVoxelSize {
        /// Axis the voxel size belongs to.
        axis: usize,
        /// The rejected value.
        value: f64,
    },

    /// Per-axis vectors disagree on the number of axes.
    #[error("expected {expected} axes, got {got}")]
    AxisCountMismatch {
        /// Number of axes the geometry defines.
        expected: usize,
        /// Number of axes supplied.
        got: usize,
    },

    /// A sample buffer does not match the geometry's voxel count.
    #[error("buffer holds {got} samples but the geometry has {expected} voxels")]
    BufferLength {
        /// Voxel count of the geometry.
        expected: usize,
        /// Length of the supplied buffer.
        got: usize,
    },

    /// An axis order is not a signed permutation of the axis ranks.
    #[error("invalid axis order: {0}")]
    InvalidAxisOrder(String),
}
