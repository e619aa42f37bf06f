//! chiptile-geometry: Pure tiling and coordinate-transform engine (sans-IO).
//!
//! Locates every sub-array tile of a chip device on a stitched raster
//! through:
//! rotation estimation -> corner mapping -> edge subdivision ->
//! divider-line partitioning -> per-tile corner resolution.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! coordinate data (corner points and raster extents, never pixels) and
//! returns structured data. Raster decoding and rotation live in
//! `chiptile-io`; chip objects and series bookkeeping live in
//! `chiptile-collections`.

pub mod partition;
pub mod rotation;
pub mod subdivide;
pub mod tile;
pub mod transform;
pub mod types;

pub use partition::{DividerFamilies, partition};
pub use rotation::rotation_angle;
pub use subdivide::{slot_width, subdivide};
pub use tile::resolve;
pub use transform::{map_point, transform_corners};
pub use types::{
    CornerSet, DEFAULT_TILE_SPACING, EdgeId, GeometryError, ImageExtent, Point, Segment,
    TileGrid, TilingConfig,
};

/// Tile an already-rotated device into its full sub-array grid.
///
/// Builds both divider families from `rotated_corners` and resolves every
/// `(column, row)` cell, row-major. The families are computed once and
/// shared by all cells; each cell's resolution is independent of every
/// other cell's.
///
/// # Errors
///
/// Propagates [`GeometryError::DegenerateEdge`] and
/// [`GeometryError::InvalidLayout`] from partitioning, and
/// [`GeometryError::SingularIntersection`] from corner resolution, each
/// tagged with the offending edge or tile.
pub fn tile_grid(
    rotated_corners: &CornerSet,
    config: &TilingConfig,
) -> Result<TileGrid, GeometryError> {
    let families = partition::partition(rotated_corners, config)?;

    #[allow(clippy::cast_possible_truncation)]
    let mut tiles = Vec::with_capacity(config.tile_count() as usize);
    for row in 0..config.rows {
        for column in 0..config.columns {
            tiles.push(tile::resolve(column, row, &families)?);
        }
    }

    Ok(TileGrid::new(
        config.columns,
        config.rows,
        *rotated_corners,
        tiles,
    ))
}

/// Map a device's unrotated corners into the rotated frame, then tile it.
///
/// The one-call entry point for the full geometric pipeline: estimates the
/// rotation from the top edge, maps all four corners into the rotated
/// frame (`source` and `rotated` are the two frames' extents), and
/// resolves every tile's corner set.
///
/// # Errors
///
/// Propagates any [`GeometryError`] from corner transformation or tiling.
pub fn align_and_tile(
    source: ImageExtent,
    rotated: ImageExtent,
    device_corners: &CornerSet,
    config: &TilingConfig,
) -> Result<TileGrid, GeometryError> {
    let rotated_corners = transform::transform_corners(source, rotated, device_corners)?;
    tile_grid(&rotated_corners, config)
}
