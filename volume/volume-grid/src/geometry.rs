//! Volume geometry: shape, voxel size, memory layout and scanner transform.

use nalgebra::{Point3, Vector3};

use crate::error::{GridError, GridResult};
use crate::layout::AxisOrder;
use crate::transform::VolumeTransform;

/// Complete description of a volume's sampling grid.
///
/// A geometry pins down everything about a volume except its sample values:
/// the per-axis extents, the physical voxel spacing in mm, the memory layout
/// (signed strides plus the start offset that keeps reversed axes inside the
/// buffer) and the affine map into scanner space.
///
/// Axes beyond `ndim` report size 1, so algorithms written for three spatial
/// axes run unchanged on lower-dimensional grids.
///
/// # Example
///
/// ```
/// use volume_grid::{VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![4, 5, 6],
///     vec![1.0, 1.0, 2.5],
///     VolumeTransform::identity(),
/// )
/// .unwrap();
///
/// assert_eq!(geometry.ndim(), 3);
/// assert_eq!(geometry.voxel_count(), 120);
/// assert_eq!(geometry.size(2), 6);
/// assert_eq!(geometry.size(3), 1); // degenerate beyond ndim
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeGeometry {
    size: Vec<usize>,
    voxel_size: Vec<f64>,
    strides: Vec<isize>,
    start: usize,
    transform: VolumeTransform,
}

impl VolumeGeometry {
    /// Creates a geometry with the default contiguous layout (axis 0
    /// fastest).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AxisCountMismatch`] if `voxel_size` does not
    /// cover every axis, or [`GridError::InvalidVoxelSize`] if a spacing is
    /// not positive and finite.
    pub fn new(
        size: Vec<usize>,
        voxel_size: Vec<f64>,
        transform: VolumeTransform,
    ) -> GridResult<Self> {
        let order = AxisOrder::contiguous(size.len());
        Self::with_order(size, voxel_size, transform, &order)
    }

    /// Creates a geometry with an explicit memory layout.
    ///
    /// # Errors
    ///
    /// As [`VolumeGeometry::new`], plus [`GridError::AxisCountMismatch`] if
    /// the order does not cover every axis.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_grid::{AxisOrder, VolumeGeometry, VolumeTransform};
    ///
    /// // Axis 0 stored reversed: its stride is -1 and the start offset
    /// // keeps every index inside the buffer.
    /// let order = AxisOrder::new(vec![-1, 2, 3]).unwrap();
    /// let geometry = VolumeGeometry::with_order(
    ///     vec![4, 5, 6],
    ///     vec![1.0; 3],
    ///     VolumeTransform::identity(),
    ///     &order,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(geometry.strides(), &[-1, 4, 20]);
    /// assert_eq!(geometry.offset(&[0, 0, 0]), 3);
    /// assert_eq!(geometry.offset(&[3, 0, 0]), 0);
    /// ```
    pub fn with_order(
        size: Vec<usize>,
        voxel_size: Vec<f64>,
        transform: VolumeTransform,
        order: &AxisOrder,
    ) -> GridResult<Self> {
        if voxel_size.len() != size.len() {
            return Err(GridError::AxisCountMismatch {
                expected: size.len(),
                got: voxel_size.len(),
            });
        }
        for (axis, &spacing) in voxel_size.iter().enumerate() {
            if spacing <= 0.0 || !spacing.is_finite() {
                return Err(GridError::InvalidVoxelSize {
                    axis,
                    value: spacing,
                });
            }
        }

        let strides = order.to_strides(&size)?;
        let start = start_offset(&size, &strides);
        Ok(Self {
            size,
            voxel_size,
            strides,
            start,
            transform,
        })
    }

    /// Number of axes.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.size.len()
    }

    /// Extent along `axis`; 1 for axes beyond `ndim`.
    #[must_use]
    pub fn size(&self, axis: usize) -> usize {
        self.size.get(axis).copied().unwrap_or(1)
    }

    /// All per-axis extents.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.size
    }

    /// Voxel spacing along `axis` in mm; 1.0 for axes beyond `ndim`.
    #[must_use]
    pub fn voxel_size(&self, axis: usize) -> f64 {
        self.voxel_size.get(axis).copied().unwrap_or(1.0)
    }

    /// All per-axis voxel spacings.
    #[must_use]
    pub fn voxel_sizes(&self) -> &[f64] {
        &self.voxel_size
    }

    /// Signed memory strides, one per axis.
    #[must_use]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Memory stride along `axis`; 0 for axes beyond `ndim`.
    #[must_use]
    pub fn axis_stride(&self, axis: usize) -> isize {
        self.strides.get(axis).copied().unwrap_or(0)
    }

    /// Buffer offset of the index `(0, .., 0)`.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The symbolic layout of this geometry.
    #[must_use]
    pub fn axis_order(&self) -> AxisOrder {
        AxisOrder::from_strides(&self.strides)
    }

    /// The voxel-space to scanner-space transform.
    #[must_use]
    pub const fn transform(&self) -> &VolumeTransform {
        &self.transform
    }

    /// Total number of voxels.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.size.iter().product()
    }

    /// Buffer offset of a voxel index.
    ///
    /// Every valid index maps into `0..voxel_count()`, also when some axes
    /// are stored reversed.
    ///
    /// # Panics
    ///
    /// Debug builds assert that the index has `ndim` components, each within
    /// its axis extent.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn offset(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.ndim());
        let mut offset = self.start as isize;
        for (axis, (&i, &stride)) in index.iter().zip(&self.strides).enumerate() {
            debug_assert!(i < self.size[axis], "index {i} out of range on axis {axis}");
            offset += i as isize * stride;
        }
        offset as usize
    }

    /// Buffer offset of a signed voxel index, or `None` when out of range.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn offset_signed(&self, index: &[isize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut offset = self.start as isize;
        for ((&i, &extent), &stride) in index.iter().zip(&self.size).zip(&self.strides) {
            if i < 0 || i as usize >= extent {
                return None;
            }
            offset += i * stride;
        }
        Some(offset as usize)
    }

    /// Whether a signed index lies inside the grid.
    #[must_use]
    pub fn contains_signed(&self, index: &[isize]) -> bool {
        self.offset_signed(index).is_some()
    }

    /// Scanner-space position of a voxel (first three axes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scanner_position(&self, index: &[usize]) -> Point3<f64> {
        let mut position = Vector3::zeros();
        for axis in 0..3 {
            let i = index.get(axis).copied().unwrap_or(0);
            position[axis] = i as f64 * self.voxel_size(axis);
        }
        self.transform.apply(&Point3::from(position))
    }

    /// Iterates all voxel indices in memory-layout order.
    ///
    /// The fastest-stored axis varies innermost, which keeps sequential
    /// buffer access local for whole-volume sweeps.
    #[must_use]
    pub fn indices(&self) -> IndexIter {
        IndexIter::new(self.size.clone(), &self.strides)
    }

    /// Iterates the start index of every line along `axis`.
    ///
    /// Yields each index with the `axis` component 0 exactly once, in the
    /// layout order of the remaining axes.
    #[must_use]
    pub fn line_starts(&self, axis: usize) -> IndexIter {
        let mut collapsed = self.size.clone();
        if axis < collapsed.len() {
            collapsed[axis] = collapsed[axis].min(1);
        }
        IndexIter::new(collapsed, &self.strides)
    }

    /// The geometry of the leading `ndim` axes.
    ///
    /// The remaining axes keep their sizes, spacings and relative layout;
    /// the transform carries over.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AxisCountMismatch`] if `ndim` exceeds the
    /// geometry's rank.
    pub fn truncated(&self, ndim: usize) -> GridResult<Self> {
        if ndim > self.ndim() {
            return Err(GridError::AxisCountMismatch {
                expected: self.ndim(),
                got: ndim,
            });
        }
        let axes: Vec<usize> = (0..ndim).collect();
        let order = self.axis_order().subset(&axes);
        Self::with_order(
            self.size[..ndim].to_vec(),
            self.voxel_size[..ndim].to_vec(),
            self.transform,
            &order,
        )
    }
}

/// Start offset that keeps reversed axes inside the buffer.
fn start_offset(size: &[usize], strides: &[isize]) -> usize {
    size.iter()
        .zip(strides)
        .filter(|&(_, &stride)| stride < 0)
        .map(|(&extent, &stride)| extent.saturating_sub(1) * stride.unsigned_abs())
        .sum()
}

/// Iterator over voxel indices in memory-layout order.
#[derive(Debug, Clone)]
pub struct IndexIter {
    size: Vec<usize>,
    axes_fastest_first: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl IndexIter {
    fn new(size: Vec<usize>, strides: &[isize]) -> Self {
        let mut axes_fastest_first: Vec<usize> = (0..size.len()).collect();
        axes_fastest_first.sort_by_key(|&axis| strides[axis].unsigned_abs());

        let next = if size.iter().any(|&extent| extent == 0) {
            None
        } else {
            Some(vec![0; size.len()])
        };
        Self {
            size,
            axes_fastest_first,
            next,
        }
    }
}

impl Iterator for IndexIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.clone()?;

        let mut exhausted = true;
        if let Some(index) = self.next.as_mut() {
            for &axis in &self.axes_fastest_first {
                if index[axis] + 1 < self.size[axis] {
                    index[axis] += 1;
                    exhausted = false;
                    break;
                }
                index[axis] = 0;
            }
        }
        if exhausted {
            self.next = None;
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.as_ref().map_or(0, |index| {
            let mut consumed = 0_usize;
            let mut block = 1_usize;
            for &axis in &self.axes_fastest_first {
                consumed += index[axis] * block;
                block *= self.size[axis];
            }
            block - consumed
        });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndexIter {}
