//! Dense volume storage.

use crate::error::{GridError, GridResult};
use crate::geometry::VolumeGeometry;

/// A dense N-dimensional volume: one geometry plus one contiguous sample
/// buffer.
///
/// Samples are stored in the geometry's memory layout; all indexed access
/// goes through the geometry's offset computation, so reversed and permuted
/// layouts behave exactly like the default one.
///
/// # Example
///
/// ```
/// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![2, 2, 2],
///     vec![1.0; 3],
///     VolumeTransform::identity(),
/// )
/// .unwrap();
///
/// let mut volume = Volume::filled(geometry, 0.0_f64);
/// volume.set(&[1, 0, 1], 7.0);
/// assert_eq!(volume.get(&[1, 0, 1]), 7.0);
/// assert_eq!(volume.get_signed(&[-1, 0, 0]), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volume<T> {
    geometry: VolumeGeometry,
    data: Vec<T>,
}

impl<T: Copy> Volume<T> {
    /// Creates a volume with every sample set to `value`.
    #[must_use]
    pub fn filled(geometry: VolumeGeometry, value: T) -> Self {
        let count = geometry.voxel_count();
        Self {
            geometry,
            data: vec![value; count],
        }
    }

    /// Wraps an existing sample buffer, which must be in the geometry's
    /// memory layout.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::BufferLength`] if the buffer does not hold
    /// exactly one sample per voxel.
    pub fn from_vec(geometry: VolumeGeometry, data: Vec<T>) -> GridResult<Self> {
        if data.len() != geometry.voxel_count() {
            return Err(GridError::BufferLength {
                expected: geometry.voxel_count(),
                got: data.len(),
            });
        }
        Ok(Self { geometry, data })
    }

    /// The geometry describing this volume.
    #[must_use]
    pub const fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the volume holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads the sample at an index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> T {
        self.data[self.geometry.offset(index)]
    }

    /// Writes the sample at an index.
    pub fn set(&mut self, index: &[usize], value: T) {
        let offset = self.geometry.offset(index);
        self.data[offset] = value;
    }

    /// Reads the sample at a signed index, or `None` when out of range.
    #[must_use]
    pub fn get_signed(&self, index: &[isize]) -> Option<T> {
        self.geometry.offset_signed(index).map(|offset| self.data[offset])
    }

    /// The raw samples in memory-layout order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The raw samples, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Gathers the line through `start` along `axis` into `line`.
    ///
    /// `start` must have the `axis` component 0 and `line` must hold the
    /// axis extent. Lines are the unit of work for separable filters and
    /// per-axis transforms.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn read_line(&self, start: &[usize], axis: usize, line: &mut [T]) {
        let extent = self.geometry.size(axis);
        debug_assert_eq!(line.len(), extent);
        debug_assert_eq!(start.get(axis).copied().unwrap_or(0), 0);

        let stride = self.geometry.axis_stride(axis);
        let mut offset = self.geometry.offset(start) as isize;
        for sample in line.iter_mut() {
            *sample = self.data[offset as usize];
            offset += stride;
        }
    }

    /// Scatters `line` back along `axis` starting at `start`.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn write_line(&mut self, start: &[usize], axis: usize, line: &[T]) {
        let extent = self.geometry.size(axis);
        debug_assert_eq!(line.len(), extent);
        debug_assert_eq!(start.get(axis).copied().unwrap_or(0), 0);

        let stride = self.geometry.axis_stride(axis);
        let mut offset = self.geometry.offset(start) as isize;
        for &sample in line {
            self.data[offset as usize] = sample;
            offset += stride;
        }
    }

    /// Applies `f` to every sample, keeping the geometry.
    #[must_use]
    pub fn map<U: Copy>(&self, mut f: impl FnMut(T) -> U) -> Volume<U> {
        Volume {
            geometry: self.geometry.clone(),
            data: self.data.iter().map(|&sample| f(sample)).collect(),
        }
    }
}

impl<T: Copy + Default> Volume<T> {
    /// Creates a volume by evaluating `f` at every index.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
    ///
    /// let geometry = VolumeGeometry::new(
    ///     vec![3, 3],
    ///     vec![1.0; 2],
    ///     VolumeTransform::identity(),
    /// )
    /// .unwrap();
    ///
    /// let ramp = Volume::from_fn(geometry, |index| index[0] as f64);
    /// assert_eq!(ramp.get(&[2, 1]), 2.0);
    /// ```
    #[must_use]
    pub fn from_fn(geometry: VolumeGeometry, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let mut volume = Self::filled(geometry, T::default());
        for index in volume.geometry().indices() {
            let value = f(&index);
            volume.set(&index, value);
        }
        volume
    }
}
