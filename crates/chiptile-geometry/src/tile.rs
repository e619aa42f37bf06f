//! Per-tile corner resolution from the divider-line families.
//!
//! A tile at grid cell `(column, row)` is bounded by the horizontal
//! dividers `2*row` and `2*row + 1` and the vertical dividers `2*column`
//! and `2*column + 1`. Each of its four corners is the intersection of one
//! horizontal with one vertical divider.

use crate::partition::DividerFamilies;
use crate::types::{CornerSet, GeometryError, Point, Segment};

/// Resolve the four corner coordinates of the tile at `(column, row)`.
///
/// Corners are intersections of the tile's bounding dividers, truncated to
/// whole pixels:
///
/// - upper-left: top divider x left divider
/// - upper-right: top divider x right divider
/// - lower-left: bottom divider x left divider
/// - lower-right: bottom divider x right divider
///
/// # Errors
///
/// Returns [`GeometryError::TileIndexOutOfBounds`] if the families do not
/// contain the requested cell, or [`GeometryError::SingularIntersection`]
/// if a pair of bounding dividers is parallel. The latter cannot happen
/// for well-formed device geometry but is detected so corrupted
/// coordinates never propagate.
pub fn resolve(
    column: u32,
    row: u32,
    families: &DividerFamilies,
) -> Result<CornerSet, GeometryError> {
    let out_of_bounds = || {
        #[allow(clippy::cast_possible_truncation)]
        let columns = (families.vertical.len() / 2) as u32;
        #[allow(clippy::cast_possible_truncation)]
        let rows = (families.horizontal.len() / 2) as u32;
        GeometryError::TileIndexOutOfBounds {
            column,
            row,
            columns,
            rows,
        }
    };
    let horizontal = |index: usize| families.horizontal.get(index).ok_or_else(out_of_bounds);
    let vertical = |index: usize| families.vertical.get(index).ok_or_else(out_of_bounds);

    let top = *horizontal(2 * row as usize)?;
    let bottom = *horizontal(2 * row as usize + 1)?;
    let left = *vertical(2 * column as usize)?;
    let right = *vertical(2 * column as usize + 1)?;

    let corner = |h: Segment, v: Segment| {
        intersect(h, v).ok_or(GeometryError::SingularIntersection { column, row })
    };

    Ok(CornerSet::new(
        corner(top, left)?,
        corner(top, right)?,
        corner(bottom, left)?,
        corner(bottom, right)?,
    ))
}

/// Intersection of the lines through two segments, evaluated on the first
/// segment's parametrization and truncated to whole pixels.
///
/// Solves `a.start + t*(a.end - a.start) = b.start + s*(b.end - b.start)`
/// as the 2x2 system `[a.end - a.start | b.start - b.end] * (t, s) =
/// b.start - a.start` and returns the point at parameter `t` on `a`.
/// Returns `None` when the determinant vanishes (parallel segments).
fn intersect(a: Segment, b: Segment) -> Option<Point> {
    let adx = a.end.x - a.start.x;
    let ady = a.end.y - a.start.y;
    let bdx = b.start.x - b.end.x;
    let bdy = b.start.y - b.end.y;

    let det = adx.mul_add(bdy, -(bdx * ady));
    if det.abs() < f64::EPSILON {
        return None;
    }

    let rx = b.start.x - a.start.x;
    let ry = b.start.y - a.start.y;
    let t = rx.mul_add(bdy, -(bdx * ry)) / det;

    Some(
        Point::new(
            t.mul_add(adx, a.start.x),
            t.mul_add(ady, a.start.y),
        )
        .truncated(),
    )
}
