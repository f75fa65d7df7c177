//! Error types for filter configuration and execution.

use thiserror::Error;
use volume_grid::GridError;

use crate::dispatch::FilterKind;

/// Result alias for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while configuring or running a filter.
///
/// Every variant describes a configuration problem that is detected before
/// any voxel is processed, except [`FilterError::Grid`] which wraps failures
/// reported by the volume layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A per-axis parameter sequence had the wrong length.
    ///
    /// Sequences of length one are broadcast to every axis; otherwise the
    /// length must match the number of filtered axes exactly.
    #[error("{parameter} expects 1 or {expected} values, got {got}")]
    SequenceLength {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Number of values the filter operates on.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// A parameter that must be non-negative was negative or not finite.
    #[error("{parameter} must be non-negative and finite, got {value}")]
    NegativeValue {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Value supplied.
        value: f64,
    },

    /// A kernel extent was even or zero.
    #[error("{parameter} entries must be odd, got {value}")]
    EvenExtent {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Value supplied.
        value: usize,
    },

    /// Two parameters that configure the same quantity were both supplied.
    #[error("the {first} and {second} options are mutually exclusive")]
    MutuallyExclusive {
        /// Name of the first parameter.
        first: &'static str,
        /// Name of the second parameter.
        second: &'static str,
    },

    /// An axis selection referred to an axis the volume does not have.
    #[error("axis {axis} is out of range for a {ndim}-dimensional volume")]
    AxisOutOfRange {
        /// Requested axis.
        axis: usize,
        /// Number of axes in the volume.
        ndim: usize,
    },

    /// An axis was listed more than once in an axis selection.
    #[error("axis {axis} is listed more than once")]
    DuplicateAxis {
        /// The repeated axis.
        axis: usize,
    },

    /// A memory layout override named more axes than the output has.
    #[error("memory layout names {got} axes but the output has only {expected}")]
    LayoutRank {
        /// Number of axes in the output.
        expected: usize,
        /// Number of axes named by the override.
        got: usize,
    },

    /// A real-valued filter received complex input.
    #[error("the {filter} filter does not accept complex input")]
    ComplexInput {
        /// The filter that rejected the input.
        filter: FilterKind,
    },

    /// A filter name did not match any known filter.
    #[error("unknown filter {0:?}; expected fft, gradient, median or smooth")]
    UnknownFilter(String),

    /// An error reported by the underlying volume layer.
    #[error(transparent)]
    Grid(#[from] GridError),
}

// ==================== Tests ====================
