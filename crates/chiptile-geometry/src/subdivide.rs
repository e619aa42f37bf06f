//! Recursive subdivision of a device edge into evenly spaced slot segments.
//!
//! A device edge carries `n` sub-arrays separated by a fixed inter-tile
//! gap. Subdivision peels one slot-width segment off each end of the edge,
//! steps `slot width + spacing` further inward from both sides, and recurses
//! on the remaining span with `n - 2`. The two base cases (0 and 1 slots)
//! cover both remainder classes, so odd and even counts terminate.
//!
//! The recursion works on immutable segment values throughout; no shared
//! accumulator is mutated across levels.

use crate::types::{EdgeId, GeometryError, Segment};

/// Width of one sub-array slot on `edge`, given the slot count and
/// inter-tile spacing: `(length - (n - 1)*spacing) / n`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidLayout`] if `slot_count` is zero or the
/// requested slots and gaps exceed the edge length (non-positive width).
/// The width is validated here, never silently clamped: downstream
/// geometry built from a non-positive slot width would be garbage.
pub fn slot_width(
    edge: Segment,
    slot_count: u32,
    spacing: f64,
    edge_id: EdgeId,
) -> Result<f64, GeometryError> {
    let length = edge.length();
    let invalid = || GeometryError::InvalidLayout {
        edge: edge_id,
        edge_length: length,
        slots: slot_count,
        spacing,
    };

    if slot_count == 0 {
        return Err(invalid());
    }
    let gaps = f64::from(slot_count - 1) * spacing;
    let width = (length - gaps) / f64::from(slot_count);
    if width <= 0.0 {
        return Err(invalid());
    }
    Ok(width)
}

/// Subdivide `edge` into `slot_count` slot segments separated by `spacing`.
///
/// Returns the slots in order from the edge's start to its end. Every
/// returned segment is one slot width long (up to floating precision) and
/// consecutive segments are separated by exactly `spacing` pixels along
/// the edge.
///
/// A count of 0 yields an empty sequence and 1 yields the whole edge,
/// before any width is computed.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateEdge`] if the edge has zero length
/// (no direction to subdivide along), or [`GeometryError::InvalidLayout`]
/// if the slots and gaps do not fit (see [`slot_width`]).
pub fn subdivide(
    edge: Segment,
    slot_count: u32,
    spacing: f64,
    edge_id: EdgeId,
) -> Result<Vec<Segment>, GeometryError> {
    match slot_count {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![edge]),
        _ => {}
    }
    if edge.length() == 0.0 {
        return Err(GeometryError::DegenerateEdge { edge: edge_id });
    }
    let width = slot_width(edge, slot_count, spacing, edge_id)?;
    Ok(split(edge, slot_count, width, spacing))
}

/// Recursive step: carve the outermost slot off each end, then recurse on
/// the span between the next two inner endpoints.
fn split(edge: Segment, slot_count: u32, width: f64, spacing: f64) -> Vec<Segment> {
    match slot_count {
        0 => Vec::new(),
        1 => vec![edge],
        _ => {
            let reversed = edge.reversed();
            let first = Segment::new(edge.start, edge.point_along(width));
            let last = Segment::new(reversed.point_along(width), edge.end);

            let inner = Segment::new(
                edge.point_along(width + spacing),
                reversed.point_along(width + spacing),
            );
            let mut slots = vec![first];
            slots.extend(split(inner, slot_count - 2, width, spacing));
            slots.push(last);
            slots
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn horizontal_edge(length: f64) -> Segment {
        Segment::new(Point::new(0.0, 0.0), Point::new(length, 0.0))
    }

    #[test]
    fn zero_slots_yield_nothing() {
        let slots = subdivide(horizontal_edge(100.0), 0, 63.0, EdgeId::Top).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn one_slot_is_the_whole_edge() {
        let edge = horizontal_edge(100.0);
        let slots = subdivide(edge, 1, 63.0, EdgeId::Top).unwrap();
        assert_eq!(slots, vec![edge]);
    }

    #[test]
    fn two_slots_split_around_the_gap() {
        // 1000px edge, 63px gap: slot width (1000 - 63) / 2 = 468.5.
        let slots = subdivide(horizontal_edge(1000.0), 2, 63.0, EdgeId::Top).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start, Point::new(0.0, 0.0));
        assert!((slots[0].end.x - 468.5).abs() < 1e-9);
        assert!((slots[1].start.x - 531.5).abs() < 1e-9);
        assert_eq!(slots[1].end, Point::new(1000.0, 0.0));
    }

    #[test]
    fn slot_lengths_and_gaps_hold_for_even_counts() {
        check_lengths_and_gaps(6);
    }

    #[test]
    fn slot_lengths_and_gaps_hold_for_odd_counts() {
        check_lengths_and_gaps(7);
    }

    fn check_lengths_and_gaps(slot_count: u32) {
        let spacing = 63.0;
        let edge = horizontal_edge(4000.0);
        let width = slot_width(edge, slot_count, spacing, EdgeId::Top).unwrap();
        let slots = subdivide(edge, slot_count, spacing, EdgeId::Top).unwrap();

        assert_eq!(slots.len(), slot_count as usize);
        for (i, slot) in slots.iter().enumerate() {
            assert!(
                (slot.length() - width).abs() < 1.0,
                "slot {i} length {} vs width {width}",
                slot.length(),
            );
        }
        for window in slots.windows(2) {
            let gap = window[0].end.distance(window[1].start);
            assert!(
                (gap - spacing).abs() < 1e-6,
                "gap {gap} differs from spacing {spacing}",
            );
        }
        // Slots cover the edge end to end.
        assert_eq!(slots[0].start, edge.start);
        assert!(slots[slot_count as usize - 1].end.distance(edge.end) < 1e-9);
    }

    #[test]
    fn subdivision_follows_tilted_edges() {
        // A 45-degree edge: slots must advance along the edge direction,
        // not an axis.
        let edge = Segment::new(Point::new(0.0, 0.0), Point::new(707.0, 707.0));
        let slots = subdivide(edge, 3, 20.0, EdgeId::Left).unwrap();
        assert_eq!(slots.len(), 3);
        for slot in &slots {
            let dx = slot.end.x - slot.start.x;
            let dy = slot.end.y - slot.start.y;
            assert!((dx - dy).abs() < 1e-9, "slot off the edge direction");
        }
    }

    #[test]
    fn slot_width_matches_formula() {
        let width = slot_width(horizontal_edge(1000.0), 2, 63.0, EdgeId::Top).unwrap();
        assert!((width - 468.5).abs() < 1e-12);
    }

    #[test]
    fn oversubscribed_edge_is_invalid_layout() {
        // 9 slots with 63px gaps need more than 500px.
        let err = subdivide(horizontal_edge(500.0), 9, 63.0, EdgeId::Bottom).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InvalidLayout {
                edge: EdgeId::Bottom,
                slots: 9,
                ..
            }
        ));
    }

    #[test]
    fn exact_fit_without_remaining_width_is_invalid() {
        // Edge length exactly equals the gaps: slot width comes out zero.
        let err = slot_width(horizontal_edge(63.0), 2, 63.0, EdgeId::Top).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidLayout { .. }));
    }

    #[test]
    fn zero_slot_width_request_is_invalid() {
        let err = slot_width(horizontal_edge(100.0), 0, 63.0, EdgeId::Top).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidLayout { slots: 0, .. }));
    }

    #[test]
    fn degenerate_edge_is_reported_with_identity() {
        let p = Point::new(4.0, 4.0);
        let err = subdivide(Segment::new(p, p), 2, 63.0, EdgeId::Right).unwrap_err();
        assert_eq!(err, GeometryError::DegenerateEdge { edge: EdgeId::Right });
    }
}
