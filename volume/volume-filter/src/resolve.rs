//! Shared resolution of per-axis filter parameters.
//!
//! Spatial filters accept parameter sequences that are either broadcast from
//! a single value or matched one-to-one against the filtered axes. All
//! sequence validation lives here so every filter reports identical errors.

use volume_grid::VolumeGeometry;

use crate::error::{FilterError, FilterResult};

/// Number of spatial axes the neighbourhood filters operate on.
pub(crate) const SPATIAL_AXES: usize = 3;

/// Broadcasts a standard deviation sequence to `axes` entries.
///
/// A single value applies to every axis; otherwise the sequence length must
/// equal `axes`. Every entry must be finite and non-negative.
pub(crate) fn per_axis_stdev(
    parameter: &'static str,
    values: &[f64],
    axes: usize,
) -> FilterResult<Vec<f64>> {
    for &value in values {
        if !value.is_finite() || value < 0.0 {
            return Err(FilterError::NegativeValue { parameter, value });
        }
    }
    broadcast(parameter, values, axes)
}

/// Broadcasts a kernel extent sequence to `axes` entries.
///
/// Every entry must be odd, which also rules out zero.
pub(crate) fn per_axis_extents(
    parameter: &'static str,
    values: &[usize],
    axes: usize,
) -> FilterResult<Vec<usize>> {
    for &value in values {
        if value % 2 == 0 {
            return Err(FilterError::EvenExtent { parameter, value });
        }
    }
    broadcast(parameter, values, axes)
}

/// Default smoothing standard deviation: one voxel along each spatial axis.
pub(crate) fn default_stdev(geometry: &VolumeGeometry) -> Vec<f64> {
    (0..SPATIAL_AXES).map(|axis| geometry.voxel_size(axis)).collect()
}

/// Resolves the axis selection for the Fourier transform.
///
/// With no explicit request the first three axes are transformed, capped at
/// the dimensionality of the volume. An explicit empty selection is allowed
/// and leaves the volume untouched.
pub(crate) fn fourier_axes(
    requested: Option<&[usize]>,
    ndim: usize,
) -> FilterResult<Vec<usize>> {
    let Some(axes) = requested else {
        return Ok((0..ndim.min(SPATIAL_AXES)).collect());
    };
    for (position, &axis) in axes.iter().enumerate() {
        if axis >= ndim {
            return Err(FilterError::AxisOutOfRange { axis, ndim });
        }
        if axes[..position].contains(&axis) {
            return Err(FilterError::DuplicateAxis { axis });
        }
    }
    Ok(axes.to_vec())
}

fn broadcast<T: Copy>(
    parameter: &'static str,
    values: &[T],
    axes: usize,
) -> FilterResult<Vec<T>> {
    match values.len() {
        1 => Ok(vec![values[0]; axes]),
        len if len == axes => Ok(values.to_vec()),
        len => Err(FilterError::SequenceLength {
            parameter,
            expected: axes,
            got: len,
        }),
    }
}

// ==================== Tests ====================
