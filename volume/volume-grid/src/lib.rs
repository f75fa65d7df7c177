//! Dense N-dimensional voxel volumes with explicit memory layout.
//!
//! This crate is the data model for scientific image volumes: a
//! [`VolumeGeometry`] pins down shape, voxel spacing, memory layout and the
//! affine map into scanner space, and a [`Volume`] pairs a geometry with a
//! contiguous sample buffer. Layouts are first-class: axes may be permuted
//! or stored reversed ([`AxisOrder`]), and every indexed access resolves
//! through signed strides plus a start offset, so algorithms never need to
//! know how the buffer is arranged.
//!
//! [`SentinelView`] and [`SentinelViewMut`] wrap an optional volume for
//! neighborhood code: probes past the edge read a sentinel instead of
//! faulting, writes there are discarded, and an absent operand reports size
//! 0 everywhere.
//!
//! # Example
//!
//! ```
//! use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
//!
//! let geometry = VolumeGeometry::new(
//!     vec![64, 64, 32],
//!     vec![1.0, 1.0, 2.0],
//!     VolumeTransform::identity(),
//! )
//! .unwrap();
//!
//! let mut volume = Volume::filled(geometry, 0.0_f64);
//! volume.set(&[10, 20, 5], 1.0);
//!
//! // Every voxel position maps into scanner space (mm).
//! let p = volume.geometry().scanner_position(&[10, 20, 5]);
//! assert_eq!(p.z, 10.0);
//! ```

mod adapter;
mod error;
mod geometry;
mod layout;
mod transform;
mod volume;

pub use adapter::{SentinelView, SentinelViewMut};
pub use error::{GridError, GridResult};
pub use geometry::{IndexIter, VolumeGeometry};
pub use layout::AxisOrder;
pub use transform::VolumeTransform;
pub use volume::Volume;
