//! Gaussian kernel construction for the smoothing filters.
//!
//! Kernels are sampled at physical offsets, so anisotropic voxel sizes
//! produce correctly anisotropic smoothing without resampling the volume.

/// Ratio between the full width at half maximum of a Gaussian and its
/// standard deviation.
pub const FWHM_PER_STDEV: f64 = 2.3548;

/// Converts a full width at half maximum to the equivalent standard
/// deviation, both in millimetres.
#[must_use]
pub fn fwhm_to_stdev(fwhm: f64) -> f64 {
    fwhm / FWHM_PER_STDEV
}

/// Default kernel extent for a Gaussian of standard deviation `stdev`
/// sampled on an axis with the given voxel size.
///
/// The kernel reaches out 2.5 standard deviations on each side, rounded up
/// to a whole number of voxels. The result is always odd and at least 1.
#[must_use]
pub fn default_extent(stdev: f64, voxel_size: f64) -> usize {
    let radius = (2.5 * stdev / voxel_size).ceil() as i64;
    (2 * radius - 1).max(1) as usize
}

/// Samples a normalised Gaussian at `extent` physical offsets centred on
/// zero, spaced `voxel_size` apart.
///
/// The returned weights sum to one. `extent` must be odd and `stdev`
/// strictly positive; callers skip axes where no smoothing applies.
#[must_use]
pub fn gaussian_line(stdev: f64, voxel_size: f64, extent: usize) -> Vec<f64> {
    debug_assert!(extent % 2 == 1, "kernel extent must be odd");
    debug_assert!(stdev > 0.0, "kernel stdev must be positive");

    let half = (extent / 2) as i64;
    let mut weights = Vec::with_capacity(extent);
    for tap in -half..=half {
        let offset = tap as f64 * voxel_size;
        weights.push((-offset * offset / (2.0 * stdev * stdev)).exp());
    }
    let total: f64 = weights.iter().sum();
    for weight in &mut weights {
        *weight /= total;
    }
    weights
}

// ==================== Tests ====================
