//! Separable Gaussian smoothing.
//!
//! Smoothing runs one spatial axis at a time with a one-dimensional kernel
//! sampled at physical offsets, so the cost grows with the kernel extent
//! rather than its volume. Near the boundary the kernel is truncated to the
//! taps that fall inside the volume and renormalised over them, which keeps
//! constant volumes constant all the way to the edge.

use volume_grid::{Volume, VolumeGeometry};

use crate::error::{FilterError, FilterResult};
use crate::kernel;
use crate::resolve;

/// Parameters for the Gaussian smoothing filter.
///
/// The kernel width can be given either as a standard deviation or as a
/// full width at half maximum, but not both. Unset parameters fall back to
/// their defaults: a standard deviation of one voxel per axis, and an
/// extent wide enough to cover 2.5 standard deviations each side.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothParams {
    /// Kernel standard deviation in millimetres, one value per spatial axis
    /// or a single value for all of them.
    pub stdev: Option<Vec<f64>>,
    /// Kernel full width at half maximum in millimetres, as an alternative
    /// to `stdev`.
    pub fwhm: Option<Vec<f64>>,
    /// Kernel extent in voxels, one odd value per spatial axis or a single
    /// odd value for all of them.
    pub extent: Option<Vec<usize>>,
}

impl SmoothParams {
    /// Creates parameters with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kernel standard deviation in millimetres.
    #[must_use]
    pub fn with_stdev(mut self, stdev: Vec<f64>) -> Self {
        self.stdev = Some(stdev);
        self
    }

    /// Sets the kernel full width at half maximum in millimetres.
    #[must_use]
    pub fn with_fwhm(mut self, fwhm: Vec<f64>) -> Self {
        self.fwhm = Some(fwhm);
        self
    }

    /// Sets the kernel extent in voxels.
    #[must_use]
    pub fn with_extent(mut self, extent: Vec<usize>) -> Self {
        self.extent = Some(extent);
        self
    }
}

/// Applies Gaussian smoothing along the spatial axes of a volume.
///
/// # Example
///
/// ```
/// use volume_filter::{smooth, SmoothParams};
/// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![8, 8, 8],
///     vec![1.0, 1.0, 1.0],
///     VolumeTransform::identity(),
/// )?;
/// let input = Volume::filled(geometry, 2.5);
/// let params = SmoothParams::new().with_stdev(vec![1.0]);
/// let output = smooth(&input, &params)?;
///
/// // Smoothing preserves constant volumes exactly, edges included.
/// assert!((output.get(&[0, 0, 0]) - 2.5).abs() < 1e-12);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns an error if both `stdev` and `fwhm` are set, if either holds a
/// negative or non-finite value, if the extent is even, or if any sequence
/// has a length other than one or three.
pub fn smooth(input: &Volume<f64>, params: &SmoothParams) -> FilterResult<Volume<f64>> {
    let (stdev, extent) = resolve_smooth(input.geometry(), params)?;
    Ok(blur(input, &stdev, &extent))
}

/// Resolves smoothing parameters against a concrete geometry.
///
/// Shared with the gradient filter, which pre-smooths its input with the
/// same defaulting rules.
pub(crate) fn resolve_smooth(
    geometry: &VolumeGeometry,
    params: &SmoothParams,
) -> FilterResult<(Vec<f64>, Vec<usize>)> {
    if params.stdev.is_some() && params.fwhm.is_some() {
        return Err(FilterError::MutuallyExclusive {
            first: "stdev",
            second: "FWHM",
        });
    }

    let stdev = match (&params.stdev, &params.fwhm) {
        (Some(values), _) => resolve::per_axis_stdev("stdev", values, resolve::SPATIAL_AXES)?,
        (None, Some(values)) => resolve::per_axis_stdev("FWHM", values, resolve::SPATIAL_AXES)?
            .into_iter()
            .map(kernel::fwhm_to_stdev)
            .collect(),
        (None, None) => resolve::default_stdev(geometry),
    };

    let extent = match &params.extent {
        Some(values) => resolve::per_axis_extents("extent", values, resolve::SPATIAL_AXES)?,
        None => stdev
            .iter()
            .enumerate()
            .map(|(axis, &sigma)| kernel::default_extent(sigma, geometry.voxel_size(axis)))
            .collect(),
    };

    Ok((stdev, extent))
}

/// Runs the separable convolution with already-resolved parameters.
pub(crate) fn blur(input: &Volume<f64>, stdev: &[f64], extent: &[usize]) -> Volume<f64> {
    let mut current = input.clone();

    for axis in 0..resolve::SPATIAL_AXES {
        let length = current.geometry().size(axis);
        if stdev[axis] <= 0.0 || length <= 1 || extent[axis] <= 1 {
            continue;
        }

        let weights =
            kernel::gaussian_line(stdev[axis], current.geometry().voxel_size(axis), extent[axis]);
        let half = (extent[axis] / 2) as isize;
        let mut line = vec![0.0; length];
        let mut blurred = vec![0.0; length];

        for start in current.geometry().line_starts(axis) {
            current.read_line(&start, axis, &mut line);
            for (position, sample) in blurred.iter_mut().enumerate() {
                let mut accumulated = 0.0;
                let mut included = 0.0;
                for (tap, &weight) in weights.iter().enumerate() {
                    let neighbour = position as isize + tap as isize - half;
                    if neighbour >= 0 && (neighbour as usize) < length {
                        accumulated += weight * line[neighbour as usize];
                        included += weight;
                    }
                }
                // The centre tap is always in range, so `included` is never
                // zero here.
                *sample = accumulated / included;
            }
            current.write_line(&start, axis, &blurred);
        }
    }

    current
}

// ==================== Tests ====================
