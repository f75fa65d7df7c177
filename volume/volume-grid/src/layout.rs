//! Symbolic memory layout for volume axes.
//!
//! A volume's samples live in one contiguous buffer; the layout decides which
//! axis varies fastest in that buffer and in which direction each axis is
//! stored. Layouts are kept symbolic (per-axis signed ranks) so they can be
//! re-applied to a differently shaped volume, e.g. when a filter preserves
//! the input's layout on an output with an extra axis.

use std::fmt;
use std::str::FromStr;

use crate::error::{GridError, GridResult};

/// Per-axis memory layout expressed as signed ranks.
///
/// Each axis carries a rank: the magnitude gives the axis's position in
/// memory (1 = fastest varying) and the sign gives the storage direction.
/// The magnitudes of a valid order form a permutation of `1..=ndim`.
///
/// # Example
///
/// ```
/// use volume_grid::AxisOrder;
///
/// // Axis 0 fastest, then axis 1, then axis 2.
/// let order = AxisOrder::contiguous(3);
/// assert_eq!(order.to_strides(&[4, 5, 6]).unwrap(), vec![1, 4, 20]);
///
/// // Axis 1 fastest, axis 2 next, axis 0 slowest.
/// let order: AxisOrder = "3,1,2".parse().unwrap();
/// assert_eq!(order.to_strides(&[4, 5, 6]).unwrap(), vec![30, 1, 5]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisOrder {
    ranks: Vec<i32>,
}

impl AxisOrder {
    /// Creates an axis order from signed ranks.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidAxisOrder`] if the rank magnitudes are not
    /// a permutation of `1..=ndim`.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_grid::AxisOrder;
    ///
    /// assert!(AxisOrder::new(vec![2, -1, 3]).is_ok());
    /// assert!(AxisOrder::new(vec![1, 1, 2]).is_err());
    /// assert!(AxisOrder::new(vec![0, 1, 2]).is_err());
    /// ```
    pub fn new(ranks: Vec<i32>) -> GridResult<Self> {
        let ndim = ranks.len();
        let mut seen = vec![false; ndim];
        for &rank in &ranks {
            let magnitude = rank.unsigned_abs() as usize;
            if magnitude == 0 || magnitude > ndim {
                return Err(GridError::InvalidAxisOrder(format!(
                    "rank {rank} is outside 1..={ndim}"
                )));
            }
            if seen[magnitude - 1] {
                return Err(GridError::InvalidAxisOrder(format!(
                    "rank magnitude {magnitude} appears more than once"
                )));
            }
            seen[magnitude - 1] = true;
        }
        Ok(Self { ranks })
    }

    /// Creates the default contiguous layout: axis 0 fastest, all positive.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn contiguous(ndim: usize) -> Self {
        Self {
            ranks: (0..ndim).map(|axis| axis as i32 + 1).collect(),
        }
    }

    /// Recovers the symbolic order from actual memory strides.
    ///
    /// Axes are ranked by absolute stride, smallest first; ties keep axis
    /// index order. Stride signs carry over; a zero stride counts as
    /// positive.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_grid::AxisOrder;
    ///
    /// let order = AxisOrder::from_strides(&[20, 1, 4]);
    /// assert_eq!(order.ranks(), &[3, 1, 2]);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_strides(strides: &[isize]) -> Self {
        let mut axes: Vec<usize> = (0..strides.len()).collect();
        axes.sort_by_key(|&axis| strides[axis].unsigned_abs());

        let mut ranks = vec![0_i32; strides.len()];
        for (position, &axis) in axes.iter().enumerate() {
            let rank = position as i32 + 1;
            ranks[axis] = if strides[axis] < 0 { -rank } else { rank };
        }
        Self { ranks }
    }

    /// Computes actual memory strides for a contiguous buffer of `size`.
    ///
    /// The fastest-ranked axis gets stride ±1; each following rank steps by
    /// the sizes of the faster axes. Degenerate axes (size 0 or 1) occupy a
    /// rank but contribute a step of at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AxisCountMismatch`] if `size` does not cover
    /// every axis of this order.
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_strides(&self, size: &[usize]) -> GridResult<Vec<isize>> {
        if size.len() != self.ranks.len() {
            return Err(GridError::AxisCountMismatch {
                expected: self.ranks.len(),
                got: size.len(),
            });
        }

        let mut by_rank: Vec<usize> = (0..self.ranks.len()).collect();
        by_rank.sort_by_key(|&axis| self.ranks[axis].unsigned_abs());

        let mut strides = vec![0_isize; self.ranks.len()];
        let mut step = 1_isize;
        for &axis in &by_rank {
            strides[axis] = if self.ranks[axis] < 0 { -step } else { step };
            step *= size[axis].max(1) as isize;
        }
        Ok(strides)
    }

    /// Number of axes this order covers.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.ranks.len()
    }

    /// The signed rank of each axis.
    #[must_use]
    pub fn ranks(&self) -> &[i32] {
        &self.ranks
    }

    /// Restricts the order to the given axes, re-packing ranks.
    ///
    /// Relative speed and signs are preserved; the result's rank magnitudes
    /// are again a permutation of `1..=axes.len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use volume_grid::AxisOrder;
    ///
    /// let order = AxisOrder::new(vec![4, 1, 3, 2]).unwrap();
    /// let spatial = order.subset(&[0, 1, 2]);
    /// assert_eq!(spatial.ranks(), &[3, 1, 2]);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn subset(&self, axes: &[usize]) -> Self {
        let mut slots: Vec<usize> = (0..axes.len()).collect();
        slots.sort_by_key(|&slot| self.ranks[axes[slot]].unsigned_abs());

        let mut ranks = vec![0_i32; axes.len()];
        for (position, &slot) in slots.iter().enumerate() {
            let rank = position as i32 + 1;
            ranks[slot] = if self.ranks[axes[slot]] < 0 { -rank } else { rank };
        }
        Self { ranks }
    }

    /// Extends the order to `ndim` axes, appending slowest ranks.
    ///
    /// Already-covered axes are untouched; new axes are stored positive and
    /// slower than everything before them. Returns a clone when the order
    /// already covers `ndim` axes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn padded_to(&self, ndim: usize) -> Self {
        let mut ranks = self.ranks.clone();
        for next in self.ranks.len()..ndim {
            ranks.push(next as i32 + 1);
        }
        Self { ranks }
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rank) in self.ranks.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{rank}")?;
        }
        Ok(())
    }
}

impl FromStr for AxisOrder {
    type Err = GridError;

    /// Parses a comma-separated rank list such as `"3,-1,2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranks = s
            .split(',')
            .map(|token| {
                token
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| GridError::InvalidAxisOrder(format!("cannot parse rank {token:?}")))
            })
            .collect::<Result<Vec<i32>, GridError>>()?;
        Self::new(ranks)
    }
}
