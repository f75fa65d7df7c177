//! Bounds-tolerant views over an optional volume.
//!
//! Neighborhood-probing algorithms routinely step past a volume's edge, and
//! some take operands that may be absent altogether. These views give both
//! cases one uniform surface: reads outside the grid (or against an absent
//! source) return a caller-supplied sentinel, writes there are silently
//! discarded, and an absent source reports size 0 on every axis so loops
//! over it collapse to nothing.
//!
//! The views never clamp: an out-of-range probe stays out of range and reads
//! the sentinel, it is not snapped to the nearest edge voxel.

use crate::volume::Volume;

/// Read-only bounds-tolerant view.
///
/// # Example
///
/// ```
/// use volume_grid::{SentinelView, Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![2, 2],
///     vec![1.0; 2],
///     VolumeTransform::identity(),
/// )
/// .unwrap();
/// let volume = Volume::filled(geometry, 5.0_f64);
///
/// let view = SentinelView::new(&volume, 0.0);
/// assert_eq!(view.get(&[1, 1]), 5.0);
/// assert_eq!(view.get(&[2, 1]), 0.0); // past the edge: sentinel
///
/// let absent = SentinelView::<f64>::absent(0.0);
/// assert_eq!(absent.size(0), 0);
/// assert_eq!(absent.get(&[0, 0]), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SentinelView<'a, T> {
    source: Option<&'a Volume<T>>,
    sentinel: T,
}

impl<'a, T: Copy> SentinelView<'a, T> {
    /// Wraps a present volume.
    #[must_use]
    pub const fn new(source: &'a Volume<T>, sentinel: T) -> Self {
        Self {
            source: Some(source),
            sentinel,
        }
    }

    /// Creates a view with no backing volume.
    #[must_use]
    pub const fn absent(sentinel: T) -> Self {
        Self {
            source: None,
            sentinel,
        }
    }

    /// Whether a backing volume is present.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.source.is_some()
    }

    /// The sentinel substituted for unreachable samples.
    #[must_use]
    pub fn sentinel(&self) -> T {
        self.sentinel
    }

    /// Extent along `axis`; 0 on every axis when absent.
    #[must_use]
    pub fn size(&self, axis: usize) -> usize {
        self.source.map_or(0, |volume| volume.geometry().size(axis))
    }

    /// Whether the index hits a stored sample.
    #[must_use]
    pub fn contains(&self, index: &[isize]) -> bool {
        self.source
            .is_some_and(|volume| volume.geometry().contains_signed(index))
    }

    /// Reads a sample, substituting the sentinel when absent or out of
    /// range.
    #[must_use]
    pub fn get(&self, index: &[isize]) -> T {
        self.source
            .and_then(|volume| volume.get_signed(index))
            .unwrap_or(self.sentinel)
    }
}

/// Mutable bounds-tolerant view.
///
/// Writes against an absent source or outside the grid are discarded
/// without error, so scatter loops need no range bookkeeping.
#[derive(Debug)]
pub struct SentinelViewMut<'a, T> {
    source: Option<&'a mut Volume<T>>,
    sentinel: T,
}

impl<'a, T: Copy> SentinelViewMut<'a, T> {
    /// Wraps a present volume.
    #[must_use]
    pub fn new(source: &'a mut Volume<T>, sentinel: T) -> Self {
        Self {
            source: Some(source),
            sentinel,
        }
    }

    /// Creates a view with no backing volume.
    #[must_use]
    pub fn absent(sentinel: T) -> Self {
        Self {
            source: None,
            sentinel,
        }
    }

    /// Whether a backing volume is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.source.is_some()
    }

    /// Extent along `axis`; 0 on every axis when absent.
    #[must_use]
    pub fn size(&self, axis: usize) -> usize {
        self.source
            .as_ref()
            .map_or(0, |volume| volume.geometry().size(axis))
    }

    /// Reads a sample, substituting the sentinel when absent or out of
    /// range.
    #[must_use]
    pub fn get(&self, index: &[isize]) -> T {
        self.source
            .as_ref()
            .and_then(|volume| volume.get_signed(index))
            .unwrap_or(self.sentinel)
    }

    /// Writes a sample; discarded when absent or out of range.
    pub fn set(&mut self, index: &[isize], value: T) {
        if let Some(volume) = self.source.as_mut() {
            if let Some(offset) = volume.geometry().offset_signed(index) {
                volume.as_mut_slice()[offset] = value;
            }
        }
    }
}
