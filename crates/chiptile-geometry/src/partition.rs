//! Divider-line construction for the sub-array grid.
//!
//! Each device edge is subdivided into its slot segments; the slot
//! boundaries on opposite edges are then joined point-for-point into two
//! families of divider lines. Entries `2i` and `2i + 1` of a family bound
//! grid column (or row) `i`, which is exactly how the tile resolver
//! indexes them.

use serde::{Deserialize, Serialize};

use crate::subdivide::subdivide;
use crate::types::{CornerSet, EdgeId, GeometryError, Point, Segment, TilingConfig};

/// The two divider-line families of a partitioned device.
///
/// Vertical dividers run from the top edge to the bottom edge; horizontal
/// dividers run from the left edge to the right edge. Endpoints are whole
/// pixels (truncated at construction) so the lines can be drawn onto or
/// sliced out of the rotated raster directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerFamilies {
    /// Column-bounding lines, `2 x columns` entries.
    pub vertical: Vec<Segment>,
    /// Row-bounding lines, `2 x rows` entries.
    pub horizontal: Vec<Segment>,
}

/// Build both divider families for a rotated device.
///
/// The top and bottom edges are subdivided into `columns` slots and zipped
/// into the vertical family; the left and right edges are subdivided into
/// `rows` slots and zipped into the horizontal family. Each slot
/// contributes its start and end boundary, so
/// `vertical.len() == 2 * columns` and `horizontal.len() == 2 * rows`.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateEdge`] or
/// [`GeometryError::InvalidLayout`] from the underlying edge subdivision,
/// tagged with the edge that failed.
pub fn partition(
    corners: &CornerSet,
    config: &TilingConfig,
) -> Result<DividerFamilies, GeometryError> {
    let spacing = config.tile_spacing;

    let top = subdivide(corners.top(), config.columns, spacing, EdgeId::Top)?;
    let bottom = subdivide(corners.bottom(), config.columns, spacing, EdgeId::Bottom)?;
    let left = subdivide(corners.left(), config.rows, spacing, EdgeId::Left)?;
    let right = subdivide(corners.right(), config.rows, spacing, EdgeId::Right)?;

    Ok(DividerFamilies {
        vertical: zip_boundaries(&top, &bottom),
        horizontal: zip_boundaries(&left, &right),
    })
}

/// Flatten two opposite edges' slot sequences into boundary-point runs and
/// join them position-for-position into divider segments.
fn zip_boundaries(near: &[Segment], far: &[Segment]) -> Vec<Segment> {
    let near_points = boundary_points(near);
    let far_points = boundary_points(far);
    near_points
        .zip(far_points)
        .map(|(n, f)| Segment::new(n.truncated(), f.truncated()))
        .collect()
}

/// Every slot boundary along one edge, in order: each slot's start point
/// followed by its end point.
fn boundary_points(slots: &[Segment]) -> impl Iterator<Item = Point> {
    slots.iter().flat_map(|slot| [slot.start, slot.end])
}
