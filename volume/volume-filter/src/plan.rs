//! Output planning.
//!
//! Every filter declares the geometry and sample kind of its output before
//! any voxel is processed, so callers can allocate storage, validate memory
//! layout overrides and report sizes up front. Planning is pure: the same
//! input always yields the same plan.

use volume_grid::{AxisOrder, VolumeGeometry};

use crate::dispatch::Filter;
use crate::error::{FilterError, FilterResult};
use crate::gradient;

/// Sample kind of a filter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// Real-valued samples.
    Real,
    /// Complex-valued samples.
    Complex,
}

/// Computes the geometry a filter will produce for the given input.
///
/// The gradient filter grows the volume by a component axis of extent 3
/// unless it collapses to a magnitude; every other filter preserves the
/// input geometry. A memory layout override replaces the stored order of
/// the leading output axes, with unnamed trailing axes laid out slowest in
/// the order given.
///
/// # Errors
///
/// Returns [`FilterError::LayoutRank`] if the override names more axes
/// than the output has, or an error from the volume layer if the override
/// is not a valid order.
pub fn output_geometry(
    input: &VolumeGeometry,
    filter: &Filter,
    layout: Option<&AxisOrder>,
) -> FilterResult<VolumeGeometry> {
    let base = match filter {
        Filter::Gradient(params) if !params.magnitude => gradient::component_geometry(input)?,
        _ => input.clone(),
    };

    let Some(order) = layout else {
        return Ok(base);
    };
    if order.ndim() > base.ndim() {
        return Err(FilterError::LayoutRank {
            expected: base.ndim(),
            got: order.ndim(),
        });
    }
    let padded = order.padded_to(base.ndim());
    Ok(VolumeGeometry::with_order(
        base.sizes().to_vec(),
        base.voxel_sizes().to_vec(),
        *base.transform(),
        &padded,
    )?)
}

/// Sample kind a filter will produce.
///
/// The Fourier transform yields complex samples unless collapsed to a
/// magnitude; every other filter yields real samples.
#[must_use]
pub fn output_kind(filter: &Filter) -> ValueKind {
    match filter {
        Filter::Fourier(params) if !params.magnitude => ValueKind::Complex,
        _ => ValueKind::Real,
    }
}

// ==================== Tests ====================
