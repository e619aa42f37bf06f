//! Stitched-raster decoding.
//!
//! Stitched microscope output is 16-bit grayscale TIFF; everything
//! downstream works on a single-channel `u16` buffer plus its extent.
//! Other single-image formats the `image` crate can decode (e.g. PNG
//! test fixtures) are converted to 16-bit grayscale on load.

use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};

use chiptile_geometry::ImageExtent;

/// In-memory stitched raster: single-channel 16-bit pixels.
pub type Raster = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Errors from raster decoding, encoding, and filesystem collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// The raster file could not be decoded.
    #[error("failed to decode raster {path}: {source}")]
    Decode {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The raster file could not be encoded/written.
    #[error("failed to write raster {path}: {source}")]
    Encode {
        /// Target file.
        path: PathBuf,
        /// Encoder error.
        #[source]
        source: image::ImageError,
    },

    /// The decoded raster has an unusable shape.
    ///
    /// Propagated to the caller unrecovered: a zero-extent raster cannot
    /// anchor any coordinate frame.
    #[error("raster {path} has degenerate shape {width}x{height}")]
    ShapeMismatch {
        /// Offending file.
        path: PathBuf,
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },

    /// A filesystem operation failed.
    #[error("i/o failure on {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A rotation request produced a non-invertible projection.
    #[error("rotation by {angle_degrees} degrees produced a non-invertible projection")]
    DegenerateProjection {
        /// Requested angle.
        angle_degrees: f64,
    },
}

/// The extent of an in-memory raster.
#[must_use]
pub fn extent_of(raster: &Raster) -> ImageExtent {
    ImageExtent::new(raster.width(), raster.height())
}

/// Decode the stitched raster at `path` into 16-bit grayscale.
///
/// # Errors
///
/// Returns [`RasterError::Decode`] for unreadable/undecodable files and
/// [`RasterError::ShapeMismatch`] when either dimension is zero.
pub fn read_raster(path: &Path) -> Result<(Raster, ImageExtent), RasterError> {
    let decoded = image::open(path).map_err(|source| RasterError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let raster = decoded.to_luma16();
    let extent = extent_of(&raster);
    if extent.width == 0 || extent.height == 0 {
        return Err(RasterError::ShapeMismatch {
            path: path.to_path_buf(),
            width: extent.width,
            height: extent.height,
        });
    }
    tracing::debug!(
        path = %path.display(),
        width = extent.width,
        height = extent.height,
        "raster decoded",
    );
    Ok((raster, extent))
}

/// Write a raster to `path`; the format follows the file extension.
///
/// # Errors
///
/// Returns [`RasterError::Encode`] if encoding or writing fails.
pub fn write_raster(raster: &Raster, path: &Path) -> Result<(), RasterError> {
    raster.save(path).map_err(|source| RasterError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "raster written");
    Ok(())
}
