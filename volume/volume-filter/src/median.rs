//! Median filtering over rectangular neighbourhoods.
//!
//! At the volume boundary the neighbourhood shrinks to the voxels that
//! actually exist; no values are invented by padding. When the effective
//! neighbourhood has an even number of samples the lower of the two middle
//! values is returned, so every output value is one of the input values.

use volume_grid::{SentinelView, Volume};

use crate::error::FilterResult;
use crate::resolve;

/// Parameters for the median filter.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MedianParams {
    /// Neighbourhood extent in voxels, one odd value per spatial axis or a
    /// single odd value for all of them. Defaults to 3.
    pub extent: Option<Vec<usize>>,
}

impl MedianParams {
    /// Creates parameters with the default neighbourhood.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the neighbourhood extent in voxels.
    #[must_use]
    pub fn with_extent(mut self, extent: Vec<usize>) -> Self {
        self.extent = Some(extent);
        self
    }
}

/// Applies a median filter over the spatial axes of a volume.
///
/// # Example
///
/// ```
/// use volume_filter::{median, MedianParams};
/// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![5, 5, 5],
///     vec![1.0, 1.0, 1.0],
///     VolumeTransform::identity(),
/// )?;
/// let mut input = Volume::filled(geometry, 1.0);
/// input.set(&[2, 2, 2], 100.0);
///
/// let output = median(&input, &MedianParams::new())?;
///
/// // A lone spike is replaced by the neighbourhood median.
/// assert_eq!(output.get(&[2, 2, 2]), 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns an error if the extent contains an even value or has a length
/// other than one or three.
pub fn median(input: &Volume<f64>, params: &MedianParams) -> FilterResult<Volume<f64>> {
    let extent = resolve_median(params)?;
    Ok(apply(input, &extent))
}

pub(crate) fn resolve_median(params: &MedianParams) -> FilterResult<Vec<usize>> {
    match &params.extent {
        Some(values) => resolve::per_axis_extents("extent", values, resolve::SPATIAL_AXES),
        None => Ok(vec![3; resolve::SPATIAL_AXES]),
    }
}

fn apply(input: &Volume<f64>, extent: &[usize]) -> Volume<f64> {
    let ndim = input.geometry().ndim();
    if ndim == 0 {
        return input.clone();
    }
    let mut output = Volume::filled(input.geometry().clone(), 0.0);
    let source = SentinelView::new(input, 0.0);

    let half: Vec<isize> = extent.iter().map(|&e| (e / 2) as isize).collect();
    let mut values = Vec::with_capacity(extent.iter().product());
    let mut probe = vec![0_isize; ndim];

    for index in input.geometry().indices() {
        for (target, &position) in probe.iter_mut().zip(&index) {
            *target = position as isize;
        }
        values.clear();

        for depth in -half[2]..=half[2] {
            if ndim > 2 {
                probe[2] = index[2] as isize + depth;
            } else if depth != 0 {
                continue;
            }
            for row in -half[1]..=half[1] {
                if ndim > 1 {
                    probe[1] = index[1] as isize + row;
                } else if row != 0 {
                    continue;
                }
                for column in -half[0]..=half[0] {
                    probe[0] = index[0] as isize + column;
                    if source.contains(&probe) {
                        values.push(source.get(&probe));
                    }
                }
            }
        }

        // The centre voxel is always present, so `values` is never empty.
        let middle = (values.len() - 1) / 2;
        let (_, sample, _) = values.select_nth_unstable_by(middle, f64::total_cmp);
        output.set(&index, *sample);
    }

    output
}

// ==================== Tests ====================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use volume_grid::{Volume, VolumeGeometry, VolumeTransform};

    use super::*;

    fn volume_from(size: Vec<usize>, samples: Vec<f64>) -> Volume<f64> {
        let voxel = vec![1.0; size.len()];
        let geometry =
            VolumeGeometry::new(size, voxel, VolumeTransform::identity()).unwrap();
        Volume::from_vec(geometry, samples).unwrap()
    }

    #[test]
    fn test_median_preserves_constant_volume() {
        let input = volume_from(vec![4, 4, 4], vec![2.5; 64]);
        let output = median(&input, &MedianParams::new()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_median_removes_isolated_spike() {
        let mut input = volume_from(vec![5, 5, 5], vec![1.0; 125]);
        input.set(&[2, 2, 2], 50.0);
        let output = median(&input, &MedianParams::new()).unwrap();
        assert_eq!(output.get(&[2, 2, 2]), 1.0);
        assert_eq!(output.get(&[0, 0, 0]), 1.0);
    }

    #[test]
    fn test_median_single_voxel_volume_is_identity() {
        let input = volume_from(vec![1, 1, 1], vec![42.0]);
        let output = median(&input, &MedianParams::new().with_extent(vec![5])).unwrap();
        assert_eq!(output.get(&[0, 0, 0]), 42.0);
    }

    #[test]
    fn test_median_boundary_takes_lower_middle_value() {
        // Along a 4-sample row with extent 3, the edge neighbourhoods hold
        // two samples and must yield the lower one.
        let input = volume_from(vec![4, 1, 1], vec![1.0, 2.0, 3.0, 4.0]);
        let output = median(&input, &MedianParams::new().with_extent(vec![3, 1, 1])).unwrap();
        assert_eq!(output.get(&[0, 0, 0]), 1.0);
        assert_eq!(output.get(&[1, 0, 0]), 2.0);
        assert_eq!(output.get(&[2, 0, 0]), 3.0);
        assert_eq!(output.get(&[3, 0, 0]), 3.0);
    }

    #[test]
    fn test_median_scalar_extent_broadcasts() {
        let mut input = volume_from(vec![5, 5, 5], vec![0.0; 125]);
        input.set(&[2, 2, 2], 9.0);
        input.set(&[1, 2, 2], 9.0);
        let scalar = median(&input, &MedianParams::new().with_extent(vec![5])).unwrap();
        let triple = median(&input, &MedianParams::new().with_extent(vec![5, 5, 5])).unwrap();
        assert_eq!(scalar, triple);
    }

    #[test]
    fn test_median_output_values_come_from_input() {
        let samples: Vec<f64> = (0..27).map(|v| f64::from(v) * 0.37 - 2.0).collect();
        let input = volume_from(vec![3, 3, 3], samples.clone());
        let output = median(&input, &MedianParams::new()).unwrap();
        for &value in output.as_slice() {
            assert!(samples.contains(&value));
        }
    }

    #[test]
    fn test_median_rejects_even_extent() {
        let input = volume_from(vec![3, 3, 3], vec![0.0; 27]);
        let params = MedianParams::new().with_extent(vec![2]);
        assert!(median(&input, &params).is_err());
    }

    #[test]
    fn test_median_rejects_two_element_extent() {
        let input = volume_from(vec![3, 3, 3], vec![0.0; 27]);
        let params = MedianParams::new().with_extent(vec![3, 5]);
        assert!(median(&input, &params).is_err());
    }

    #[test]
    fn test_median_two_dimensional_volume() {
        let mut input = volume_from(vec![3, 3], vec![1.0; 9]);
        input.set(&[1, 1], 10.0);
        let output = median(&input, &MedianParams::new()).unwrap();
        assert_eq!(output.get(&[1, 1]), 1.0);
    }
}
