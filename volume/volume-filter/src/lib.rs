//! Image filters for N-dimensional voxel volumes.
//!
//! This crate provides four filters over [`volume_grid`] volumes:
//!
//! - [`transform`]: discrete Fourier transform along selected axes, with
//!   optional inverse direction, centre-zero shift and magnitude output.
//! - [`gradient`]: Gaussian-regularised spatial gradient, as components
//!   along a new axis or collapsed to a magnitude, in image or scanner
//!   coordinates.
//! - [`median`]: median over a rectangular neighbourhood that shrinks at
//!   the volume boundary.
//! - [`smooth`]: separable Gaussian smoothing with physically sized
//!   kernels.
//!
//! Filters can be called directly with their parameter records, or run
//! through [`apply`] with a [`FilterRequest`], which adds filter selection
//! by name, per-volume parallelism for inputs with more than three axes
//! and memory layout control for the output.
//!
//! # Example
//!
//! ```
//! use volume_filter::{apply, Filter, FilterRequest, MedianParams, VolumeData};
//! use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
//!
//! let geometry = VolumeGeometry::new(
//!     vec![16, 16, 16],
//!     vec![1.0, 1.0, 1.0],
//!     VolumeTransform::identity(),
//! )?;
//! let mut noisy = Volume::filled(geometry, 0.0);
//! noisy.set(&[8, 8, 8], 100.0);
//!
//! let request = FilterRequest::new(Filter::Median(MedianParams::new()));
//! let output = apply(&VolumeData::Real(noisy), &request)?;
//!
//! let VolumeData::Real(cleaned) = output else {
//!     unreachable!("median output is real");
//! };
//! assert_eq!(cleaned.get(&[8, 8, 8]), 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dispatch;
pub mod error;
pub mod fourier;
pub mod gradient;
mod kernel;
pub mod median;
pub mod plan;
mod resolve;
pub mod smooth;

pub use dispatch::{apply, Filter, FilterKind, FilterRequest, VolumeData};
pub use error::{FilterError, FilterResult};
pub use fourier::{promote, transform, FourierDirection, FourierParams};
pub use gradient::{gradient, GradientParams, ReferenceFrame};
pub use kernel::{fwhm_to_stdev, FWHM_PER_STDEV};
pub use median::{median, MedianParams};
pub use plan::{output_geometry, output_kind, ValueKind};
pub use smooth::{smooth, SmoothParams};
