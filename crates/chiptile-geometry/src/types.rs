//! Shared types for the chiptile geometry engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inter-tile spacing used by the reference chip layout, in pixels.
///
/// This is only a default: the spacing is threaded through every call via
/// [`TilingConfig`] so that devices with different geometries can be
/// processed side by side.
pub const DEFAULT_TILE_SPACING: f64 = 63.0;

/// A 2D point in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Truncate both coordinates toward zero.
    ///
    /// Finalized pixel coordinates are truncated, not rounded, since rounding
    /// would shift tile-boundary pixel assignment by up to one pixel.
    #[must_use]
    pub fn truncated(self) -> Self {
        Self {
            x: self.x.trunc(),
            y: self.y.trunc(),
        }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A directed line segment between two points.
///
/// Doubles as one sub-array slot's edge span and as one divider-family
/// entry; the direction (start → end) is meaningful in both roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment start point.
    pub start: Point,
    /// Segment end point.
    pub end: Point,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Segment length in pixels.
    #[must_use]
    pub fn length(self) -> f64 {
        self.start.distance(self.end)
    }

    /// The same segment traversed in the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// The point `distance` pixels from `start` along the segment direction.
    ///
    /// Distances beyond the segment length extrapolate along the same
    /// direction. A zero-length segment has no direction; its start point
    /// is returned unchanged.
    #[must_use]
    pub fn point_along(self, distance: f64) -> Point {
        let length = self.length();
        if length == 0.0 {
            return self.start;
        }
        let ux = (self.end.x - self.start.x) / length;
        let uy = (self.end.y - self.start.y) / length;
        Point::new(
            distance.mul_add(ux, self.start.x),
            distance.mul_add(uy, self.start.y),
        )
    }

    /// Truncate both endpoints toward zero.
    #[must_use]
    pub fn truncated(self) -> Self {
        Self {
            start: self.start.truncated(),
            end: self.end.truncated(),
        }
    }
}

/// The four labeled corners of a device or tile in one raster frame.
///
/// Corner roles are fixed by field name: `upper_left`/`upper_right` share
/// the top edge, `upper_left`/`lower_left` share the left edge. Pre- and
/// post-rotation corner sets are distinct values; a corner set is never
/// mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    /// Upper-left corner.
    pub upper_left: Point,
    /// Upper-right corner.
    pub upper_right: Point,
    /// Lower-left corner.
    pub lower_left: Point,
    /// Lower-right corner.
    pub lower_right: Point,
}

impl CornerSet {
    /// Create a corner set from its four labeled corners.
    #[must_use]
    pub const fn new(
        upper_left: Point,
        upper_right: Point,
        lower_left: Point,
        lower_right: Point,
    ) -> Self {
        Self {
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }
    }

    /// Top edge, upper-left → upper-right.
    #[must_use]
    pub const fn top(self) -> Segment {
        Segment::new(self.upper_left, self.upper_right)
    }

    /// Bottom edge, lower-left → lower-right.
    #[must_use]
    pub const fn bottom(self) -> Segment {
        Segment::new(self.lower_left, self.lower_right)
    }

    /// Left edge, upper-left → lower-left.
    #[must_use]
    pub const fn left(self) -> Segment {
        Segment::new(self.upper_left, self.lower_left)
    }

    /// Right edge, upper-right → lower-right.
    #[must_use]
    pub const fn right(self) -> Segment {
        Segment::new(self.upper_right, self.lower_right)
    }

    /// Truncate all four corners toward zero.
    #[must_use]
    pub fn truncated(self) -> Self {
        Self {
            upper_left: self.upper_left.truncated(),
            upper_right: self.upper_right.truncated(),
            lower_left: self.lower_left.truncated(),
            lower_right: self.lower_right.truncated(),
        }
    }
}

/// Pixel extent of a raster frame.
///
/// Only the shape is carried, never pixel data. The extent exists to
/// locate each frame's rotation center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageExtent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageExtent {
    /// Create a new extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The frame's rotation center under the pixel-center convention:
    /// `((width - 1) / 2, (height - 1) / 2)`.
    ///
    /// Integer pixel coordinates address pixel centers, so the center of
    /// an `n`-pixel axis sits at `(n - 1) / 2`, not `n / 2`.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(
            (f64::from(self.width) - 1.0) / 2.0,
            (f64::from(self.height) - 1.0) / 2.0,
        )
    }
}

/// Sub-array grid layout and inter-tile spacing for one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Number of sub-array columns.
    pub columns: u32,
    /// Number of sub-array rows.
    pub rows: u32,
    /// Fixed gap between adjacent tiles along a device edge, in pixels.
    pub tile_spacing: f64,
}

impl TilingConfig {
    /// Layout with the reference deployment's tile spacing
    /// ([`DEFAULT_TILE_SPACING`]).
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            tile_spacing: DEFAULT_TILE_SPACING,
        }
    }

    /// Layout with an explicit tile spacing.
    #[must_use]
    pub const fn with_spacing(columns: u32, rows: u32, tile_spacing: f64) -> Self {
        Self {
            columns,
            rows,
            tile_spacing,
        }
    }

    /// Total number of tiles in the grid.
    #[must_use]
    pub fn tile_count(self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

/// Result of tiling a rotated device: one resolved corner set per grid
/// cell, row-major.
///
/// Produced by the top-level tiling entry points; consumed by per-tile
/// chip constructors downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Grid column count.
    pub columns: u32,
    /// Grid row count.
    pub rows: u32,
    /// The device corner set in the rotated frame the grid was built from.
    pub device_corners: CornerSet,
    /// Tile corner sets, row-major (`row * columns + column`).
    tiles: Vec<CornerSet>,
}

impl TileGrid {
    /// Assemble a grid from row-major tile corner sets.
    ///
    /// `tiles.len()` must equal `columns * rows`; callers construct this
    /// via the tiling entry points, which guarantee it.
    #[must_use]
    pub(crate) const fn new(
        columns: u32,
        rows: u32,
        device_corners: CornerSet,
        tiles: Vec<CornerSet>,
    ) -> Self {
        Self {
            columns,
            rows,
            device_corners,
            tiles,
        }
    }

    /// The corner set of the tile at `(column, row)`, if inside the grid.
    #[must_use]
    pub fn tile(&self, column: u32, row: u32) -> Option<&CornerSet> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.tiles.get((row * self.columns + column) as usize)
    }

    /// Iterate all tiles as `(column, row, corners)`, row-major.
    pub fn indexed(&self) -> impl Iterator<Item = (u32, u32, &CornerSet)> {
        self.tiles.iter().enumerate().map(|(i, corners)| {
            #[allow(clippy::cast_possible_truncation)]
            let i = i as u32;
            (i % self.columns, i / self.columns, corners)
        })
    }

    /// Total number of tiles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` if the grid holds no tiles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Identifies which device edge an operation was working on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeId {
    /// Upper-left → upper-right.
    Top,
    /// Lower-left → lower-right.
    Bottom,
    /// Upper-left → lower-left.
    Left,
    /// Upper-right → lower-right.
    Right,
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors produced by the geometry engine.
///
/// All of these are unrecoverable at the point of detection: the geometry
/// is deterministic, so no retry or fallback is ever substituted. Each
/// variant carries enough context to name the offending edge or tile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// An edge's endpoints coincide, leaving no direction to work with.
    #[error("zero-length {edge} edge: endpoints coincide")]
    DegenerateEdge {
        /// The degenerate edge.
        edge: EdgeId,
    },

    /// The requested slot count and spacing do not fit on the edge.
    ///
    /// The computed slot width would be zero or negative. This is a
    /// configuration error and is reported before any tiling proceeds.
    #[error(
        "invalid layout on {edge} edge: {slots} slots with {spacing}px spacing \
         do not fit in {edge_length:.1}px"
    )]
    InvalidLayout {
        /// Edge the layout was applied to.
        edge: EdgeId,
        /// Length of that edge in pixels.
        edge_length: f64,
        /// Requested slot count.
        slots: u32,
        /// Requested inter-tile spacing in pixels.
        spacing: f64,
    },

    /// Two divider lines chosen for a tile corner are parallel.
    ///
    /// The 2x2 intersection system is singular. Well-formed device
    /// geometry never produces this, but it is detected rather than
    /// letting NaN coordinates propagate downstream.
    #[error("parallel divider lines at tile ({column}, {row})")]
    SingularIntersection {
        /// Tile column index.
        column: u32,
        /// Tile row index.
        row: u32,
    },

    /// A tile index outside the configured grid was requested.
    #[error("tile index ({column}, {row}) outside {columns}x{rows} grid")]
    TileIndexOutOfBounds {
        /// Requested column index.
        column: u32,
        /// Requested row index.
        row: u32,
        /// Grid column count.
        columns: u32,
        /// Grid row count.
        rows: u32,
    },
}
