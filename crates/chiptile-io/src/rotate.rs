//! Raster rotation with resize.
//!
//! Rotating a raster so the device sits square changes its bounding box,
//! so the rotated frame is re-sized to the rotated extent of the source.
//! The warp uses the same forward map as the geometry engine's point
//! mapper (both frames' pixel centers, counter-clockwise-positive angle),
//! so mapped corner coordinates land on the same pixels the warp moved
//! them to.

use image::Luma;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use chiptile_geometry::ImageExtent;

use crate::raster::{Raster, RasterError, extent_of};

/// Bounding extent of `source` after rotation by `angle_degrees`.
///
/// The rotated corners' axis-aligned bounding box, rounded up to whole
/// pixels.
#[must_use]
pub fn rotated_extent(source: ImageExtent, angle_degrees: f64) -> ImageExtent {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let width = f64::from(source.width);
    let height = f64::from(source.height);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    ImageExtent::new(
        width.mul_add(cos.abs(), height * sin.abs()).ceil() as u32,
        width.mul_add(sin.abs(), height * cos.abs()).ceil() as u32,
    )
}

/// Rotate a raster by `angle_degrees` (counter-clockwise positive) into a
/// frame resized to hold the full rotated content.
///
/// Pixels are resampled bilinearly; regions outside the source map to
/// zero (black), matching the dark background of fluorescence imaging.
///
/// # Errors
///
/// Returns [`RasterError::DegenerateProjection`] if the projection cannot
/// be inverted, which a pure rotation never triggers.
pub fn rotate_raster(
    raster: &Raster,
    angle_degrees: f64,
) -> Result<(Raster, ImageExtent), RasterError> {
    let source = extent_of(raster);
    let target = rotated_extent(source, angle_degrees);
    let source_center = source.center();
    let target_center = target.center();

    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    // Forward map of a source pixel into the target frame:
    //   x' =  cos*(x - cx) + sin*(y - cy) + cx'
    //   y' = -sin*(x - cx) + cos*(y - cy) + cy'
    let tx = target_center.x - cos * source_center.x - sin * source_center.y;
    let ty = target_center.y + sin * source_center.x - cos * source_center.y;
    #[allow(clippy::cast_possible_truncation)]
    let matrix = [
        cos as f32,
        sin as f32,
        tx as f32,
        -sin as f32,
        cos as f32,
        ty as f32,
        0.0,
        0.0,
        1.0,
    ];
    let projection =
        Projection::from_matrix(matrix).ok_or(RasterError::DegenerateProjection { angle_degrees })?;

    let mut rotated = Raster::new(target.width, target.height);
    warp_into(
        raster,
        &projection,
        Interpolation::Bilinear,
        Luma([0_u16]),
        &mut rotated,
    );
    tracing::debug!(
        angle_degrees,
        source_width = source.width,
        source_height = source.height,
        target_width = target.width,
        target_height = target.height,
        "raster rotated",
    );
    Ok((rotated, target))
}
