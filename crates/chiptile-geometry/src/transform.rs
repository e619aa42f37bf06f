//! Coordinate mapping between the unrotated and rotated raster frames.
//!
//! Rotating a raster with resize enabled changes its bounding extent, so
//! the two frames have different centers. Mapping a point therefore needs
//! both extents: translate to the source center, rotate, re-center on the
//! target.

use crate::rotation::rotation_angle;
use crate::types::{CornerSet, GeometryError, ImageExtent, Point};

/// Map a point from the `source` frame into the `target` frame rotated by
/// `angle_degrees`.
///
/// Each frame's center follows the pixel-center convention
/// ([`ImageExtent::center`]). The rotated coordinates are truncated toward
/// zero so the result can index the target raster directly.
///
/// With `angle_degrees == 0` and equal extents this is the identity on
/// integer-valued points; mapping forward by `a` and back by `-a` (with
/// the extents swapped) returns the original point to within one pixel of
/// truncation error.
#[must_use]
pub fn map_point(
    source: ImageExtent,
    target: ImageExtent,
    point: Point,
    angle_degrees: f64,
) -> Point {
    let source_center = source.center();
    let target_center = target.center();

    let x = point.x - source_center.x;
    let y = point.y - source_center.y;

    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let rotated_x = x.mul_add(cos, y * sin);
    let rotated_y = (-x).mul_add(sin, y * cos);

    Point::new(rotated_x + target_center.x, rotated_y + target_center.y).truncated()
}

/// Map a device's full corner set into the rotated frame.
///
/// The angle is estimated once from the top edge and applied to all four
/// corners, so corner roles survive the mapping: the upper-left corner is
/// still the upper-left corner afterwards, just at new coordinates. Applied
/// to a raster rotated by that same angle, the result bounds the device
/// region in the rotated raster to truncation precision.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateEdge`] if the top edge's corners
/// coincide.
pub fn transform_corners(
    source: ImageExtent,
    rotated: ImageExtent,
    corners: &CornerSet,
) -> Result<CornerSet, GeometryError> {
    let angle = rotation_angle(corners.upper_left, corners.upper_right)?;
    Ok(CornerSet::new(
        map_point(source, rotated, corners.upper_left, angle),
        map_point(source, rotated, corners.upper_right, angle),
        map_point(source, rotated, corners.lower_left, angle),
        map_point(source, rotated, corners.lower_right, angle),
    ))
}
