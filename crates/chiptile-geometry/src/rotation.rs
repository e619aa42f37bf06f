//! Rotation-angle estimation from a device's observed top edge.
//!
//! Stitched rasters come off the scope slightly tilted. The angle between
//! the observed top edge and the horizontal axis tells the rotation stage
//! how far to turn the raster so the device sits square.

use crate::types::{EdgeId, GeometryError, Point};

/// Angle, in degrees, that rotates the raster so the device's top edge
/// becomes horizontal.
///
/// Computed as the angle between `upper_right - upper_left` and the
/// horizontal unit vector `(1, 0)`, negated: a top edge observed tilting
/// downward yields a negative angle, matching a counter-clockwise-positive
/// rotate call downstream.
///
/// An already-horizontal edge yields `0`; a vertical edge pointing down
/// the image yields `-90`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateEdge`] if the two corners coincide,
/// since a zero-length edge has no direction.
pub fn rotation_angle(upper_left: Point, upper_right: Point) -> Result<f64, GeometryError> {
    let dx = upper_right.x - upper_left.x;
    let dy = upper_right.y - upper_left.y;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return Err(GeometryError::DegenerateEdge { edge: EdgeId::Top });
    }

    // dot((1, 0), edge) / |edge|, clamped against rounding drift before
    // the inverse cosine.
    let cos = (dx / length).clamp(-1.0, 1.0);
    Ok(-cos.acos().to_degrees())
}
