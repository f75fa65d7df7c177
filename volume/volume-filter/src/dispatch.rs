//! Filter selection and execution.
//!
//! A [`FilterRequest`] bundles a concrete filter with the options shared by
//! all of them, and [`apply`] runs it on real or complex input. Volumes
//! with more than three axes are filtered one three-dimensional volume at
//! a time, in parallel, and the results are written back in the original
//! volume order so the output never depends on scheduling.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, info};
use volume_grid::{AxisOrder, SentinelViewMut, Volume, VolumeGeometry};

use crate::error::{FilterError, FilterResult};
use crate::fourier::{self, FourierParams};
use crate::gradient::{self, GradientParams};
use crate::median::{self, MedianParams};
use crate::plan::{self, ValueKind};
use crate::resolve;
use crate::smooth::{self, SmoothParams};

/// The available filters, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterKind {
    /// Discrete Fourier transform.
    Fourier,
    /// Spatial intensity gradient.
    Gradient,
    /// Median over a rectangular neighbourhood.
    Median,
    /// Separable Gaussian smoothing.
    Smooth,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fourier => "fft",
            Self::Gradient => "gradient",
            Self::Median => "median",
            Self::Smooth => "smooth",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "fft" => Ok(Self::Fourier),
            "gradient" => Ok(Self::Gradient),
            "median" => Ok(Self::Median),
            "smooth" => Ok(Self::Smooth),
            other => Err(FilterError::UnknownFilter(other.to_string())),
        }
    }
}

/// A filter together with its parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Filter {
    /// Discrete Fourier transform.
    Fourier(FourierParams),
    /// Spatial intensity gradient.
    Gradient(GradientParams),
    /// Median over a rectangular neighbourhood.
    Median(MedianParams),
    /// Separable Gaussian smoothing.
    Smooth(SmoothParams),
}

impl Filter {
    /// The kind of this filter.
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::Fourier(_) => FilterKind::Fourier,
            Self::Gradient(_) => FilterKind::Gradient,
            Self::Median(_) => FilterKind::Median,
            Self::Smooth(_) => FilterKind::Smooth,
        }
    }
}

/// A filter plus the options every filter honours.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterRequest {
    /// The filter to run.
    pub filter: Filter,
    /// Memory layout override for the output. Axes not named keep the
    /// planned default.
    pub layout: Option<AxisOrder>,
    /// Free-form label logged when the filter starts, typically naming the
    /// operation for progress reporting.
    pub message: Option<String>,
}

impl FilterRequest {
    /// Creates a request with default options.
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            layout: None,
            message: None,
        }
    }

    /// Overrides the memory layout of the output.
    #[must_use]
    pub fn with_layout(mut self, layout: AxisOrder) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Attaches a progress label.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A volume of either real or complex samples.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeData {
    /// Real-valued samples.
    Real(Volume<f64>),
    /// Complex-valued samples.
    Complex(Volume<Complex64>),
}

impl VolumeData {
    /// The geometry of the contained volume.
    #[must_use]
    pub fn geometry(&self) -> &VolumeGeometry {
        match self {
            Self::Real(volume) => volume.geometry(),
            Self::Complex(volume) => volume.geometry(),
        }
    }

    /// The sample kind of the contained volume.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Real(_) => ValueKind::Real,
            Self::Complex(_) => ValueKind::Complex,
        }
    }
}

/// Runs a filter request against a volume.
///
/// The Fourier transform accepts real or complex input, widening real
/// samples on the fly; every other filter requires real input. The output
/// geometry and sample kind always match what [`plan::output_geometry`]
/// and [`plan::output_kind`] report for the request.
///
/// # Example
///
/// ```
/// use volume_filter::{apply, Filter, FilterRequest, SmoothParams, VolumeData};
/// use volume_grid::{Volume, VolumeGeometry, VolumeTransform};
///
/// let geometry = VolumeGeometry::new(
///     vec![8, 8, 8],
///     vec![1.0, 1.0, 1.0],
///     VolumeTransform::identity(),
/// )?;
/// let input = VolumeData::Real(Volume::filled(geometry, 1.0));
///
/// let request = FilterRequest::new(Filter::Smooth(SmoothParams::new()));
/// let output = apply(&input, &request)?;
/// assert_eq!(output.geometry().sizes(), input.geometry().sizes());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns an error if the filter parameters are invalid, if the layout
/// override does not fit the output, or if a real-only filter receives
/// complex input. All of these are detected before any voxel is processed.
pub fn apply(input: &VolumeData, request: &FilterRequest) -> FilterResult<VolumeData> {
    if let Some(message) = &request.message {
        info!("{message}");
    }
    info!(
        filter = %request.filter.kind(),
        voxels = input.geometry().voxel_count(),
        "applying filter"
    );

    let planned = plan::output_geometry(input.geometry(), &request.filter, request.layout.as_ref())?;

    let output = match (&request.filter, input) {
        (Filter::Fourier(params), VolumeData::Real(volume)) => {
            finish_fourier(fourier::transform(&fourier::promote(volume), params)?, params, &planned)
        }
        (Filter::Fourier(params), VolumeData::Complex(volume)) => {
            finish_fourier(fourier::transform(volume, params)?, params, &planned)
        }
        (filter, VolumeData::Complex(_)) => {
            return Err(FilterError::ComplexInput {
                filter: filter.kind(),
            });
        }
        (Filter::Gradient(params), VolumeData::Real(volume)) => VolumeData::Real(per_volume(
            volume,
            &planned,
            |slice| gradient::gradient(slice, params),
        )?),
        (Filter::Median(params), VolumeData::Real(volume)) => VolumeData::Real(per_volume(
            volume,
            &planned,
            |slice| median::median(slice, params),
        )?),
        (Filter::Smooth(params), VolumeData::Real(volume)) => VolumeData::Real(per_volume(
            volume,
            &planned,
            |slice| smooth::smooth(slice, params),
        )?),
    };

    debug!(voxels = output.geometry().voxel_count(), "filter complete");
    Ok(output)
}

fn finish_fourier(
    spectrum: Volume<Complex64>,
    params: &FourierParams,
    planned: &VolumeGeometry,
) -> VolumeData {
    if params.magnitude {
        VolumeData::Real(relayout(spectrum.map(|sample| sample.norm()), planned))
    } else {
        VolumeData::Complex(relayout(spectrum, planned))
    }
}

/// Runs a three-dimensional filter over every volume of the input.
///
/// Each volume is filtered independently, in parallel. Results are written
/// back sequentially in ascending volume order, so the output is identical
/// however the work was scheduled.
fn per_volume(
    input: &Volume<f64>,
    planned: &VolumeGeometry,
    run: impl Fn(&Volume<f64>) -> FilterResult<Volume<f64>> + Sync,
) -> FilterResult<Volume<f64>> {
    let ndim = input.geometry().ndim();
    if ndim <= resolve::SPATIAL_AXES {
        return Ok(relayout(run(input)?, planned));
    }

    let spatial = input.geometry().truncated(resolve::SPATIAL_AXES)?;
    let trailing: Vec<usize> = input.geometry().sizes()[resolve::SPATIAL_AXES..].to_vec();
    let volumes: usize = trailing.iter().product();

    let results: Vec<Volume<f64>> = (0..volumes)
        .into_par_iter()
        .map(|volume| run(&extract(input, &spatial, &unravel(volume, &trailing))))
        .collect::<FilterResult<Vec<_>>>()?;

    let leading = planned.ndim() - trailing.len();
    let mut output = Volume::filled(planned.clone(), 0.0);
    let mut sink = SentinelViewMut::new(&mut output, 0.0);
    let mut target = vec![0_isize; planned.ndim()];
    for (volume, result) in results.iter().enumerate() {
        let tail = unravel(volume, &trailing);
        for (slot, &position) in target[leading..].iter_mut().zip(&tail) {
            *slot = position as isize;
        }
        for index in result.geometry().indices() {
            for (slot, &position) in target[..leading].iter_mut().zip(&index) {
                *slot = position as isize;
            }
            sink.set(&target, result.get(&index));
        }
    }
    Ok(output)
}

/// Copies one volume out of a stack, dropping the trailing axes.
fn extract(input: &Volume<f64>, spatial: &VolumeGeometry, tail: &[usize]) -> Volume<f64> {
    let mut slice = Volume::filled(spatial.clone(), 0.0);
    let mut source = vec![0_usize; input.geometry().ndim()];
    source[resolve::SPATIAL_AXES..].copy_from_slice(tail);
    for index in spatial.indices() {
        source[..resolve::SPATIAL_AXES].copy_from_slice(&index);
        slice.set(&index, input.get(&source));
    }
    slice
}

/// Splits a flat volume number into per-axis positions, first axis fastest.
fn unravel(mut volume: usize, sizes: &[usize]) -> Vec<usize> {
    let mut index = Vec::with_capacity(sizes.len());
    for &size in sizes {
        index.push(volume % size);
        volume /= size;
    }
    index
}

/// Moves a volume into the planned geometry, copying only when the stored
/// order differs.
fn relayout<T: Copy + Default>(volume: Volume<T>, planned: &VolumeGeometry) -> Volume<T> {
    if volume.geometry() == planned {
        return volume;
    }
    debug_assert_eq!(volume.geometry().sizes(), planned.sizes());
    let mut output = Volume::filled(planned.clone(), T::default());
    for index in volume.geometry().indices() {
        output.set(&index, volume.get(&index));
    }
    output
}

// ==================== Tests ====================
