//! On-disk container for filter volumes.
//!
//! The layout is little-endian throughout: the magic `RVOL`, a version
//! byte, a sample kind byte (0 real, 1 complex), the axis count, then per
//! axis the extent as a `u64`, the signed layout rank as an `i8` and the
//! voxel size as an `f64`. The scanner transform follows as nine rotation
//! values in row-major order plus three translation values, and the
//! samples complete the file in stored memory order. Complex samples are
//! written as real and imaginary pairs.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::{Matrix3, Vector3};
use num_complex::Complex64;
use thiserror::Error;
use volume_filter::VolumeData;
use volume_grid::{AxisOrder, GridError, Volume, VolumeGeometry, VolumeTransform};

const MAGIC: [u8; 4] = *b"RVOL";
const VERSION: u8 = 1;
const KIND_REAL: u8 = 0;
const KIND_COMPLEX: u8 = 1;

/// Result alias for container operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while reading or writing a volume file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file does not start with the volume magic.
    #[error("not a volume file: bad magic {found:?}")]
    BadMagic {
        /// The four bytes actually found.
        found: [u8; 4],
    },

    /// The file uses a format revision this build does not understand.
    #[error("unsupported volume format version {0}")]
    UnsupportedVersion(u8),

    /// The sample kind byte is neither real nor complex.
    #[error("unknown sample kind {0}")]
    UnknownSampleKind(u8),

    /// The volume has more axes than the container can describe.
    #[error("cannot store a volume with {0} axes")]
    TooManyAxes(usize),

    /// An axis extent does not fit in memory on this platform.
    #[error("axis extent {0} is too large")]
    OversizedExtent(u64),

    /// The header does not describe a valid volume.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Reads a volume from a container file.
pub fn read_volume(path: &Path) -> FormatResult<VolumeData> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0_u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic { found: magic });
    }
    let version = read_u8(&mut reader)?;
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    let kind = read_u8(&mut reader)?;
    let ndim = usize::from(read_u8(&mut reader)?);

    let mut size = Vec::with_capacity(ndim);
    let mut ranks = Vec::with_capacity(ndim);
    let mut voxel = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        let extent = read_u64(&mut reader)?;
        size.push(usize::try_from(extent).map_err(|_| FormatError::OversizedExtent(extent))?);
        ranks.push(i32::from(read_i8(&mut reader)?));
        voxel.push(read_f64(&mut reader)?);
    }

    let mut rotation = [0.0_f64; 9];
    for slot in &mut rotation {
        *slot = read_f64(&mut reader)?;
    }
    let mut translation = [0.0_f64; 3];
    for slot in &mut translation {
        *slot = read_f64(&mut reader)?;
    }
    let transform = VolumeTransform::new(
        Matrix3::from_row_slice(&rotation),
        Vector3::from_row_slice(&translation),
    );

    let order = AxisOrder::new(ranks)?;
    let geometry = VolumeGeometry::with_order(size, voxel, transform, &order)?;
    let count = geometry.voxel_count();

    match kind {
        KIND_REAL => {
            let mut data = Vec::with_capacity(count);
            for _ in 0..count {
                data.push(read_f64(&mut reader)?);
            }
            Ok(VolumeData::Real(Volume::from_vec(geometry, data)?))
        }
        KIND_COMPLEX => {
            let mut data = Vec::with_capacity(count);
            for _ in 0..count {
                let re = read_f64(&mut reader)?;
                let im = read_f64(&mut reader)?;
                data.push(Complex64::new(re, im));
            }
            Ok(VolumeData::Complex(Volume::from_vec(geometry, data)?))
        }
        other => Err(FormatError::UnknownSampleKind(other)),
    }
}

/// Writes a volume to a container file, replacing any existing file.
pub fn write_volume(path: &Path, data: &VolumeData) -> FormatResult<()> {
    let geometry = data.geometry();
    let ndim = geometry.ndim();
    if ndim > 127 {
        return Err(FormatError::TooManyAxes(ndim));
    }
    let order = geometry.axis_order();

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&MAGIC)?;
    let kind = match data {
        VolumeData::Real(_) => KIND_REAL,
        VolumeData::Complex(_) => KIND_COMPLEX,
    };
    writer.write_all(&[VERSION, kind, ndim as u8])?;

    for axis in 0..ndim {
        writer.write_all(&(geometry.size(axis) as u64).to_le_bytes())?;
        writer.write_all(&(order.ranks()[axis] as i8).to_le_bytes())?;
        writer.write_all(&geometry.voxel_size(axis).to_le_bytes())?;
    }

    let transform = geometry.transform();
    for row in 0..3 {
        for column in 0..3 {
            writer.write_all(&transform.rotation[(row, column)].to_le_bytes())?;
        }
    }
    for row in 0..3 {
        writer.write_all(&transform.translation[row].to_le_bytes())?;
    }

    match data {
        VolumeData::Real(volume) => {
            for &sample in volume.as_slice() {
                writer.write_all(&sample.to_le_bytes())?;
            }
        }
        VolumeData::Complex(volume) => {
            for &sample in volume.as_slice() {
                writer.write_all(&sample.re.to_le_bytes())?;
                writer.write_all(&sample.im.to_le_bytes())?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn read_u8(reader: &mut impl Read) -> FormatResult<u8> {
    let mut buffer = [0_u8; 1];
    reader.read_exact(&mut buffer)?;
    Ok(buffer[0])
}

fn read_i8(reader: &mut impl Read) -> FormatResult<i8> {
    Ok(read_u8(reader)? as i8)
}

fn read_u64(reader: &mut impl Read) -> FormatResult<u64> {
    let mut buffer = [0_u8; 8];
    reader.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

fn read_f64(reader: &mut impl Read) -> FormatResult<f64> {
    let mut buffer = [0_u8; 8];
    reader.read_exact(&mut buffer)?;
    Ok(f64::from_le_bytes(buffer))
}

// ==================== Tests ====================
