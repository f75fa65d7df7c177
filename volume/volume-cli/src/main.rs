//! Command-line filtering of N-dimensional image volumes.
//!
//! Reads a volume container file, applies one of the four filters and
//! writes the result:
//!
//! ```text
//! volfilter input.rvol smooth output.rvol --stdev 2.5
//! volfilter input.rvol fft output.rvol --centre-zero --magnitude
//! volfilter input.rvol gradient output.rvol --scanner
//! volfilter input.rvol median output.rvol --extent 5
//! ```
//!
//! Options that do not apply to the selected filter are rejected rather
//! than ignored.

mod format;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use volume_filter::{
    Filter, FilterRequest, FourierDirection, FourierParams, GradientParams, MedianParams,
    ReferenceFrame, SmoothParams,
};
use volume_grid::AxisOrder;

/// Apply spatial and frequency-domain filters to image volumes.
#[derive(Parser)]
#[command(name = "volfilter")]
#[command(about = "Apply spatial and frequency-domain filters to image volumes", long_about = None)]
#[command(version)]
struct Cli {
    /// Input volume file.
    input: PathBuf,

    /// Filter to apply.
    #[arg(value_enum)]
    filter: FilterName,

    /// Output volume file.
    output: PathBuf,

    /// Axes to transform, comma-separated (fft; defaults to the first
    /// three).
    #[arg(long, value_delimiter = ',')]
    axes: Option<Vec<usize>>,

    /// Apply the inverse transform (fft).
    #[arg(long)]
    inverse: bool,

    /// Shift the zero-frequency component to the centre of each
    /// transformed axis (fft).
    #[arg(long)]
    centre_zero: bool,

    /// Write the magnitude instead of complex values or gradient
    /// components (fft, gradient).
    #[arg(long)]
    magnitude: bool,

    /// Kernel standard deviation in millimetres, one value or one per
    /// axis (smooth, gradient).
    #[arg(long, value_delimiter = ',')]
    stdev: Option<Vec<f64>>,

    /// Kernel full width at half maximum in millimetres, as an
    /// alternative to --stdev (smooth).
    #[arg(long, value_delimiter = ',')]
    fwhm: Option<Vec<f64>>,

    /// Kernel extent in voxels, one odd value or one per axis (smooth,
    /// median).
    #[arg(long, value_delimiter = ',')]
    extent: Option<Vec<usize>>,

    /// Express gradient components in scanner coordinates (gradient).
    #[arg(long)]
    scanner: bool,

    /// Memory layout of the output, as comma-separated signed axis ranks.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    stride: Option<Vec<i32>>,

    /// Increase log verbosity (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The four available filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterName {
    /// Discrete Fourier transform.
    Fft,
    /// Spatial intensity gradient.
    Gradient,
    /// Median over a rectangular neighbourhood.
    Median,
    /// Separable Gaussian smoothing.
    Smooth,
}

impl FilterName {
    const fn label(self) -> &'static str {
        match self {
            Self::Fft => "fft",
            Self::Gradient => "gradient",
            Self::Median => "median",
            Self::Smooth => "smooth",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let input = format::read_volume(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let filter = build_filter(&cli)?;
    let mut request = FilterRequest::new(filter).with_message(format!(
        "applying {} filter to {}",
        cli.filter.label(),
        cli.input.display()
    ));
    if let Some(ranks) = &cli.stride {
        let layout = AxisOrder::new(ranks.clone()).context("invalid --stride layout")?;
        request = request.with_layout(layout);
    }

    let output = volume_filter::apply(&input, &request)?;
    format::write_volume(&cli.output, &output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(path = %cli.output.display(), "volume written");
    Ok(())
}

/// Builds the filter from the command line, rejecting options that do not
/// apply to the selected filter.
fn build_filter(cli: &Cli) -> Result<Filter> {
    let reject = |used: bool, option: &'static str| -> Result<()> {
        if used {
            bail!(
                "the --{option} option does not apply to the {} filter",
                cli.filter.label()
            );
        }
        Ok(())
    };

    match cli.filter {
        FilterName::Fft => {
            reject(cli.stdev.is_some(), "stdev")?;
            reject(cli.fwhm.is_some(), "fwhm")?;
            reject(cli.extent.is_some(), "extent")?;
            reject(cli.scanner, "scanner")?;
            let mut params = FourierParams::new()
                .with_centre_zero(cli.centre_zero)
                .with_magnitude(cli.magnitude);
            if cli.inverse {
                params = params.with_direction(FourierDirection::Inverse);
            }
            if let Some(axes) = &cli.axes {
                params = params.with_axes(axes.clone());
            }
            Ok(Filter::Fourier(params))
        }
        FilterName::Gradient => {
            reject(cli.axes.is_some(), "axes")?;
            reject(cli.inverse, "inverse")?;
            reject(cli.centre_zero, "centre-zero")?;
            reject(cli.fwhm.is_some(), "fwhm")?;
            reject(cli.extent.is_some(), "extent")?;
            let mut params = GradientParams::new().with_magnitude(cli.magnitude);
            if cli.scanner {
                params = params.with_frame(ReferenceFrame::Scanner);
            }
            if let Some(stdev) = &cli.stdev {
                params = params.with_stdev(stdev.clone());
            }
            Ok(Filter::Gradient(params))
        }
        FilterName::Median => {
            reject(cli.axes.is_some(), "axes")?;
            reject(cli.inverse, "inverse")?;
            reject(cli.centre_zero, "centre-zero")?;
            reject(cli.magnitude, "magnitude")?;
            reject(cli.stdev.is_some(), "stdev")?;
            reject(cli.fwhm.is_some(), "fwhm")?;
            reject(cli.scanner, "scanner")?;
            let mut params = MedianParams::new();
            if let Some(extent) = &cli.extent {
                params = params.with_extent(extent.clone());
            }
            Ok(Filter::Median(params))
        }
        FilterName::Smooth => {
            reject(cli.axes.is_some(), "axes")?;
            reject(cli.inverse, "inverse")?;
            reject(cli.centre_zero, "centre-zero")?;
            reject(cli.magnitude, "magnitude")?;
            reject(cli.scanner, "scanner")?;
            let mut params = SmoothParams::new();
            if let Some(stdev) = &cli.stdev {
                params = params.with_stdev(stdev.clone());
            }
            if let Some(fwhm) = &cli.fwhm {
                params = params.with_fwhm(fwhm.clone());
            }
            if let Some(extent) = &cli.extent {
                params = params.with_extent(extent.clone());
            }
            Ok(Filter::Smooth(params))
        }
    }
}

// ==================== Tests ====================
