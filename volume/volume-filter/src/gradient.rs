//! Spatial intensity gradients.
//!
//! The input is Gaussian pre-smoothed, then differentiated with central
//! differences in the interior and one-sided differences on the boundary.
//! Derivatives are taken with respect to physical distance, so the result
//! is intensity per millimetre regardless of voxel size.

use nalgebra::Vector3;
use volume_grid::{AxisOrder, Volume, VolumeGeometry};

use crate::error::FilterResult;
use crate::kernel;
use crate::resolve;
use crate::smooth;

/// Coordinate frame the gradient components are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceFrame {
    /// Components along the volume's own axes.
    #[default]
    Image,
    /// Components rotated into scanner space by the volume's transform.
    Scanner,
}

/// Parameters for the gradient filter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientParams {
    /// Standard deviation of the pre-smoothing kernel in millimetres, one
    /// value per spatial axis or a single value for all of them. Defaults
    /// to one voxel along each axis.
    pub stdev: Option<Vec<f64>>,
    /// Frame the components are expressed in.
    pub frame: ReferenceFrame,
    /// Collapse the gradient vector to its Euclidean norm.
    pub magnitude: bool,
}

impl GradientParams {
    /// Creates parameters with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pre-smoothing standard deviation in millimetres.
    #[must_use]
    pub fn with_stdev(mut self, stdev: Vec<f64>) -> Self {
        self.stdev = Some(stdev);
        self
    }

    /// Sets the frame the components are expressed in.
    #[must_use]
    pub const fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Requests the gradient magnitude instead of the component vector.
    #[must_use]
    pub const fn with_magnitude(mut self, magnitude: bool) -> Self {
        self.magnitude = magnitude;
        self
    }
}

/// Computes the spatial gradient of a volume.
///
/// Unless [`GradientParams::magnitude`] is set, the output gains an axis of
/// extent 3 holding the x, y and z derivative components, placed after the
/// spatial axes.
///
/// # Example
///
/// ```
/// use volume_filter::{gradient, GradientParams};
/// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![6, 6, 6],
///     vec![1.0, 1.0, 1.0],
///     VolumeTransform::identity(),
/// )?;
/// // Intensity rises by one per voxel along x.
/// let ramp = Volume::from_fn(geometry, |index| index[0] as f64);
///
/// let params = GradientParams::new().with_stdev(vec![0.0]);
/// let output = gradient(&ramp, &params)?;
///
/// assert_eq!(output.geometry().sizes(), &[6, 6, 6, 3]);
/// assert!((output.get(&[3, 3, 3, 0]) - 1.0).abs() < 1e-12);
/// assert!(output.get(&[3, 3, 3, 1]).abs() < 1e-12);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns an error if the standard deviation sequence holds a negative or
/// non-finite value or has a length other than one or three.
pub fn gradient(input: &Volume<f64>, params: &GradientParams) -> FilterResult<Volume<f64>> {
    let stdev = resolve_gradient(input.geometry(), params)?;
    let extent: Vec<usize> = stdev
        .iter()
        .enumerate()
        .map(|(axis, &sigma)| kernel::default_extent(sigma, input.geometry().voxel_size(axis)))
        .collect();
    let smoothed = smooth::blur(input, &stdev, &extent);

    let geometry = smoothed.geometry().clone();
    let ndim = geometry.ndim();
    let position = ndim.min(resolve::SPATIAL_AXES);

    let mut output = if params.magnitude {
        Volume::filled(geometry.clone(), 0.0)
    } else {
        Volume::filled(component_geometry(&geometry)?, 0.0)
    };

    let mut neighbour = vec![0_usize; ndim];
    let mut out_index = vec![0_usize; ndim + 1];

    for index in geometry.indices() {
        let mut components = Vector3::zeros();
        for axis in 0..resolve::SPATIAL_AXES.min(ndim) {
            components[axis] = derivative(&smoothed, &index, axis, &mut neighbour);
        }
        if params.frame == ReferenceFrame::Scanner {
            components = geometry.transform().rotate(&components);
        }

        if params.magnitude {
            output.set(&index, components.norm());
        } else {
            out_index[..position].copy_from_slice(&index[..position]);
            out_index[position + 1..].copy_from_slice(&index[position..]);
            for (component, &value) in components.iter().enumerate() {
                out_index[position] = component;
                output.set(&out_index, value);
            }
        }
    }

    Ok(output)
}

pub(crate) fn resolve_gradient(
    geometry: &VolumeGeometry,
    params: &GradientParams,
) -> FilterResult<Vec<f64>> {
    match &params.stdev {
        Some(values) => resolve::per_axis_stdev("stdev", values, resolve::SPATIAL_AXES),
        None => Ok(resolve::default_stdev(geometry)),
    }
}

/// Geometry of the component output: the input with an axis of extent 3
/// inserted after the spatial axes, ordered slowest in memory.
pub(crate) fn component_geometry(input: &VolumeGeometry) -> FilterResult<VolumeGeometry> {
    let ndim = input.ndim();
    let position = ndim.min(resolve::SPATIAL_AXES);

    let mut size = input.sizes().to_vec();
    let mut voxel = input.voxel_sizes().to_vec();
    size.insert(position, 3);
    voxel.insert(position, 1.0);

    let mut ranks = input.axis_order().ranks().to_vec();
    ranks.insert(position, (ndim + 1) as i32);
    let order = AxisOrder::new(ranks)?;

    Ok(VolumeGeometry::with_order(
        size,
        voxel,
        *input.transform(),
        &order,
    )?)
}

/// Finite-difference derivative along one axis, in intensity per
/// millimetre. Degenerate axes yield zero.
fn derivative(
    volume: &Volume<f64>,
    index: &[usize],
    axis: usize,
    neighbour: &mut [usize],
) -> f64 {
    let length = volume.geometry().size(axis);
    if length <= 1 {
        return 0.0;
    }
    let spacing = volume.geometry().voxel_size(axis);
    let position = index[axis];
    neighbour.copy_from_slice(index);

    match (position > 0, position + 1 < length) {
        (true, true) => {
            neighbour[axis] = position + 1;
            let next = volume.get(neighbour);
            neighbour[axis] = position - 1;
            let previous = volume.get(neighbour);
            (next - previous) / (2.0 * spacing)
        }
        (false, true) => {
            neighbour[axis] = position + 1;
            (volume.get(neighbour) - volume.get(index)) / spacing
        }
        (true, false) => {
            neighbour[axis] = position - 1;
            (volume.get(index) - volume.get(neighbour)) / spacing
        }
        (false, false) => 0.0,
    }
}

// ==================== Tests ====================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};
    use volume_grid::{Volume, VolumeGeometry, VolumeTransform};

    use super::*;

    fn ramp_along(axis: usize, side: usize, voxel: f64) -> Volume<f64> {
        let geometry = VolumeGeometry::new(
            vec![side, side, side],
            vec![voxel; 3],
            VolumeTransform::identity(),
        )
        .unwrap();
        Volume::from_fn(geometry, |index| index[axis] as f64)
    }

    fn no_smoothing() -> GradientParams {
        GradientParams::new().with_stdev(vec![0.0])
    }

    #[test]
    fn test_gradient_ramp_constant_component() {
        let output = gradient(&ramp_along(0, 5, 1.0), &no_smoothing()).unwrap();
        assert_eq!(output.geometry().sizes(), &[5, 5, 5, 3]);
        for index in ramp_along(0, 5, 1.0).geometry().indices() {
            let probe = [index[0], index[1], index[2], 0];
            assert_relative_eq!(output.get(&probe), 1.0, epsilon = 1e-12);
            let quiet = [index[0], index[1], index[2], 1];
            assert_relative_eq!(output.get(&quiet), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gradient_physical_units() {
        // One intensity step per voxel at 2 mm spacing is 0.5 per mm.
        let output = gradient(&ramp_along(1, 4, 2.0), &no_smoothing()).unwrap();
        assert_relative_eq!(output.get(&[2, 2, 2, 1]), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_magnitude_keeps_input_shape() {
        let input = ramp_along(2, 4, 1.0);
        let params = no_smoothing().with_magnitude(true);
        let output = gradient(&input, &params).unwrap();
        assert_eq!(output.geometry().sizes(), input.geometry().sizes());
        assert_relative_eq!(output.get(&[1, 1, 1]), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_magnitude_is_non_negative() {
        let input = ramp_along(0, 4, 1.0);
        let params = GradientParams::new().with_magnitude(true);
        let output = gradient(&input, &params).unwrap();
        for &value in output.as_slice() {
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_gradient_scanner_frame_applies_rotation() {
        let flip = VolumeTransform::new(
            Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0)),
            Vector3::zeros(),
        );
        let geometry =
            VolumeGeometry::new(vec![4, 4, 4], vec![1.0, 1.0, 1.0], flip).unwrap();
        let ramp = Volume::from_fn(geometry, |index| index[0] as f64);

        let image = gradient(&ramp, &no_smoothing()).unwrap();
        let scanner = gradient(
            &ramp,
            &no_smoothing().with_frame(ReferenceFrame::Scanner),
        )
        .unwrap();

        assert_relative_eq!(image.get(&[2, 2, 2, 0]), 1.0, epsilon = 1e-12);
        assert_relative_eq!(scanner.get(&[2, 2, 2, 0]), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_default_stdev_is_one_voxel() {
        let geometry = VolumeGeometry::new(
            vec![6, 6, 6],
            vec![0.5, 1.0, 2.0],
            VolumeTransform::identity(),
        )
        .unwrap();
        let input = Volume::from_fn(geometry, |index| {
            (index[0] * index[0] + index[1] + index[2]) as f64
        });
        let defaulted = gradient(&input, &GradientParams::new()).unwrap();
        let explicit = gradient(
            &input,
            &GradientParams::new().with_stdev(vec![0.5, 1.0, 2.0]),
        )
        .unwrap();
        assert_eq!(defaulted, explicit);
    }

    #[test]
    fn test_gradient_component_axis_is_slowest() {
        let input = ramp_along(0, 3, 1.0);
        let output = gradient(&input, &no_smoothing()).unwrap();
        assert_eq!(output.geometry().axis_order().ranks(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_gradient_component_axis_follows_input_order() {
        let order = AxisOrder::new(vec![3, -1, 2]).unwrap();
        let geometry = VolumeGeometry::with_order(
            vec![4, 4, 4],
            vec![1.0, 1.0, 1.0],
            VolumeTransform::identity(),
            &order,
        )
        .unwrap();
        let input = Volume::from_fn(geometry, |index| index[1] as f64);
        let output = gradient(&input, &no_smoothing()).unwrap();
        assert_eq!(output.geometry().axis_order().ranks(), &[3, -1, 2, 4]);
        assert_relative_eq!(output.get(&[2, 2, 2, 1]), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_two_dimensional_volume() {
        let geometry = VolumeGeometry::new(
            vec![5, 5],
            vec![1.0, 1.0],
            VolumeTransform::identity(),
        )
        .unwrap();
        let input = Volume::from_fn(geometry, |index| index[1] as f64);
        let output = gradient(&input, &no_smoothing()).unwrap();
        assert_eq!(output.geometry().sizes(), &[5, 5, 3]);
        assert_relative_eq!(output.get(&[2, 2, 1]), 1.0, epsilon = 1e-12);
        assert_relative_eq!(output.get(&[2, 2, 2]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_rejects_bad_stdev() {
        let input = ramp_along(0, 3, 1.0);
        assert!(gradient(&input, &GradientParams::new().with_stdev(vec![-1.0])).is_err());
        assert!(gradient(&input, &GradientParams::new().with_stdev(vec![1.0, 1.0])).is_err());
    }
}
