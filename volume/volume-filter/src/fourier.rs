//! Discrete Fourier transforms along selected axes.
//!
//! The transform runs one axis at a time over every line of the volume, so
//! any subset of axes can be transformed regardless of memory layout. The
//! inverse direction applies the 1/N normalisation exactly once, with N the
//! number of samples across all transformed axes, so a forward transform
//! followed by an inverse one reproduces the input.

use num_complex::Complex64;
use rustfft::FftPlanner;
use volume_grid::Volume;

use crate::error::FilterResult;
use crate::resolve;

/// Direction of the Fourier transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FourierDirection {
    /// Spatial domain to frequency domain, unnormalised.
    #[default]
    Forward,
    /// Frequency domain to spatial domain, normalised by 1/N.
    Inverse,
}

/// Parameters for the Fourier transform filter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FourierParams {
    /// Axes to transform. Defaults to the first three axes, capped at the
    /// dimensionality of the volume. An explicit empty selection leaves the
    /// volume untouched.
    pub axes: Option<Vec<usize>>,
    /// Transform direction.
    pub direction: FourierDirection,
    /// Cyclically shift each transformed axis so the zero-frequency
    /// component lands at index `n / 2`.
    pub centre_zero: bool,
    /// Collapse the complex spectrum to its magnitude. This only affects
    /// dispatching; [`transform`] always returns the full spectrum and
    /// [`magnitude`] the collapsed one.
    pub magnitude: bool,
}

impl FourierParams {
    /// Creates parameters with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the axes to transform.
    #[must_use]
    pub fn with_axes(mut self, axes: Vec<usize>) -> Self {
        self.axes = Some(axes);
        self
    }

    /// Sets the transform direction.
    #[must_use]
    pub const fn with_direction(mut self, direction: FourierDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Enables or disables the centre-zero frequency shift.
    #[must_use]
    pub const fn with_centre_zero(mut self, centre_zero: bool) -> Self {
        self.centre_zero = centre_zero;
        self
    }

    /// Requests the spectrum magnitude instead of complex values.
    #[must_use]
    pub const fn with_magnitude(mut self, magnitude: bool) -> Self {
        self.magnitude = magnitude;
        self
    }
}

/// Widens a real volume to complex samples with zero imaginary part.
#[must_use]
pub fn promote(input: &Volume<f64>) -> Volume<Complex64> {
    input.map(|sample| Complex64::new(sample, 0.0))
}

/// Applies the discrete Fourier transform along the selected axes.
///
/// # Example
///
/// ```
/// use num_complex::Complex64;
/// use volume_filter::{transform, FourierParams};
/// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![8, 1, 1],
///     vec![1.0, 1.0, 1.0],
///     VolumeTransform::identity(),
/// )?;
/// let mut input = Volume::filled(geometry, Complex64::new(0.0, 0.0));
/// input.set(&[0, 0, 0], Complex64::new(1.0, 0.0));
///
/// // An impulse transforms to a flat spectrum.
/// let spectrum = transform(&input, &FourierParams::new())?;
/// assert!((spectrum.get(&[5, 0, 0]).re - 1.0).abs() < 1e-12);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns an error if the axis selection names an axis the volume does not
/// have, or names an axis twice.
pub fn transform(
    input: &Volume<Complex64>,
    params: &FourierParams,
) -> FilterResult<Volume<Complex64>> {
    let axes = resolve::fourier_axes(params.axes.as_deref(), input.geometry().ndim())?;
    let mut output = input.clone();
    if axes.is_empty() {
        return Ok(output);
    }

    let mut planner = FftPlanner::new();
    for &axis in &axes {
        let length = output.geometry().size(axis);
        if length == 0 {
            continue;
        }
        let plan = match params.direction {
            FourierDirection::Forward => planner.plan_fft_forward(length),
            FourierDirection::Inverse => planner.plan_fft_inverse(length),
        };
        let mut line = vec![Complex64::default(); length];
        let mut scratch = vec![Complex64::default(); plan.get_inplace_scratch_len()];
        let mut shifted = vec![Complex64::default(); length];
        let shift = length / 2;

        for start in output.geometry().line_starts(axis) {
            output.read_line(&start, axis, &mut line);
            plan.process_with_scratch(&mut line, &mut scratch);
            if params.centre_zero {
                for (bin, &value) in line.iter().enumerate() {
                    shifted[(bin + shift) % length] = value;
                }
                output.write_line(&start, axis, &shifted);
            } else {
                output.write_line(&start, axis, &line);
            }
        }
    }

    if params.direction == FourierDirection::Inverse {
        let samples: f64 = axes
            .iter()
            .map(|&axis| output.geometry().size(axis) as f64)
            .product();
        let scale = 1.0 / samples;
        for sample in output.as_mut_slice() {
            *sample *= scale;
        }
    }

    Ok(output)
}

/// Applies the transform and collapses the spectrum to its magnitude.
///
/// # Errors
///
/// Fails under the same conditions as [`transform`].
pub fn magnitude(input: &Volume<Complex64>, params: &FourierParams) -> FilterResult<Volume<f64>> {
    Ok(transform(input, params)?.map(|sample| sample.norm()))
}

// ==================== Tests ====================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use approx::assert_relative_eq;
    use volume_grid::{Volume, VolumeGeometry, VolumeTransform};

    use super::*;

    fn complex_volume(size: Vec<usize>, f: impl FnMut(&[usize]) -> Complex64) -> Volume<Complex64> {
        let voxel = vec![1.0; size.len()];
        let geometry =
            VolumeGeometry::new(size, voxel, VolumeTransform::identity()).unwrap();
        Volume::from_fn(geometry, f)
    }

    fn assert_volumes_close(left: &Volume<Complex64>, right: &Volume<Complex64>) {
        for index in left.geometry().indices() {
            let a = left.get(&index);
            let b = right.get(&index);
            assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_transform_constant_concentrates_at_zero_frequency() {
        let input = complex_volume(vec![4, 1, 1], |_| Complex64::new(1.0, 0.0));
        let spectrum = transform(&input, &FourierParams::new().with_axes(vec![0])).unwrap();
        assert_relative_eq!(spectrum.get(&[0, 0, 0]).re, 4.0, epsilon = 1e-12);
        for bin in 1..4 {
            assert_relative_eq!(spectrum.get(&[bin, 0, 0]).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_roundtrip_recovers_input() {
        let input = complex_volume(vec![4, 3, 5], |index| {
            Complex64::new(
                (index[0] * 7) as f64 * 0.13 - (index[1] as f64),
                (index[2] * index[0]) as f64 * 0.21,
            )
        });
        let forward = transform(&input, &FourierParams::new()).unwrap();
        let back = transform(
            &forward,
            &FourierParams::new().with_direction(FourierDirection::Inverse),
        )
        .unwrap();
        assert_volumes_close(&back, &input);
    }

    #[test]
    fn test_transform_roundtrip_on_axis_subset() {
        let input = complex_volume(vec![6, 2, 3], |index| {
            Complex64::new(index[0] as f64 - 2.0 * index[2] as f64, 0.5)
        });
        let axes = vec![0, 2];
        let forward =
            transform(&input, &FourierParams::new().with_axes(axes.clone())).unwrap();
        let back = transform(
            &forward,
            &FourierParams::new()
                .with_axes(axes)
                .with_direction(FourierDirection::Inverse),
        )
        .unwrap();
        assert_volumes_close(&back, &input);
    }

    #[test]
    fn test_transform_untransformed_lines_stay_independent() {
        let input = complex_volume(vec![4, 2, 1], |index| {
            if index[1] == 0 {
                Complex64::new(1.0 + index[0] as f64, 0.0)
            } else {
                Complex64::default()
            }
        });
        let spectrum = transform(&input, &FourierParams::new().with_axes(vec![0])).unwrap();
        for bin in 0..4 {
            assert_relative_eq!(spectrum.get(&[bin, 1, 0]).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_centre_zero_moves_dc_to_middle() {
        let even = complex_volume(vec![6, 1, 1], |_| Complex64::new(1.0, 0.0));
        let spectrum = transform(
            &even,
            &FourierParams::new().with_axes(vec![0]).with_centre_zero(true),
        )
        .unwrap();
        assert_relative_eq!(spectrum.get(&[3, 0, 0]).re, 6.0, epsilon = 1e-12);
        assert_relative_eq!(spectrum.get(&[0, 0, 0]).norm(), 0.0, epsilon = 1e-12);

        let odd = complex_volume(vec![5, 1, 1], |_| Complex64::new(1.0, 0.0));
        let spectrum = transform(
            &odd,
            &FourierParams::new().with_axes(vec![0]).with_centre_zero(true),
        )
        .unwrap();
        assert_relative_eq!(spectrum.get(&[2, 0, 0]).re, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_centre_zero_is_pure_shift() {
        let input = complex_volume(vec![6, 1, 1], |index| {
            Complex64::new(index[0] as f64, (index[0] % 2) as f64)
        });
        let plain = transform(&input, &FourierParams::new().with_axes(vec![0])).unwrap();
        let centred = transform(
            &input,
            &FourierParams::new().with_axes(vec![0]).with_centre_zero(true),
        )
        .unwrap();
        for bin in 0..6 {
            let moved = centred.get(&[(bin + 3) % 6, 0, 0]);
            let original = plain.get(&[bin, 0, 0]);
            assert_relative_eq!(moved.re, original.re, epsilon = 1e-12);
            assert_relative_eq!(moved.im, original.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_default_axes_leave_fourth_axis_alone() {
        // Two volumes stacked along axis 3; the zero volume must stay zero.
        let input = complex_volume(vec![4, 4, 1, 2], |index| {
            if index[3] == 0 {
                Complex64::new((index[0] + index[1]) as f64, 0.0)
            } else {
                Complex64::default()
            }
        });
        let spectrum = transform(&input, &FourierParams::new()).unwrap();
        for index in input.geometry().indices().filter(|index| index[3] == 1) {
            assert_relative_eq!(spectrum.get(&index).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_explicit_empty_selection_is_identity() {
        let input = complex_volume(vec![3, 3, 3], |index| {
            Complex64::new(index[0] as f64, index[1] as f64)
        });
        let output = transform(&input, &FourierParams::new().with_axes(vec![])).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_transform_rejects_axis_out_of_range() {
        let input = complex_volume(vec![3, 3, 3], |_| Complex64::default());
        let error = transform(&input, &FourierParams::new().with_axes(vec![0, 3]));
        assert!(error.is_err());
    }

    #[test]
    fn test_transform_rejects_duplicate_axis() {
        let input = complex_volume(vec![3, 3, 3], |_| Complex64::default());
        let error = transform(&input, &FourierParams::new().with_axes(vec![2, 2]));
        assert!(error.is_err());
    }

    #[test]
    fn test_magnitude_is_non_negative() {
        let input = complex_volume(vec![4, 4, 2], |index| {
            Complex64::new(index[0] as f64 - 1.5, index[1] as f64 - 1.0)
        });
        let output = magnitude(&input, &FourierParams::new()).unwrap();
        for &value in output.as_slice() {
            assert!(value >= 0.0);
        }
    }

    #[test]
    fn test_promote_keeps_values_real() {
        let geometry = VolumeGeometry::new(
            vec![2, 2],
            vec![1.0, 1.0],
            VolumeTransform::identity(),
        )
        .unwrap();
        let real = Volume::from_fn(geometry, |index| index[0] as f64 + 10.0);
        let complex = promote(&real);
        assert_relative_eq!(complex.get(&[1, 0]).re, 11.0);
        assert_relative_eq!(complex.get(&[1, 0]).im, 0.0);
    }
}
