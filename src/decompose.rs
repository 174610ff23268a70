use std::collections::BTreeSet;

use crate::errors::InternalError;
use crate::geom::Point;
use crate::idx::{Idx, VecExt};
use crate::querygraph::QueryGraph;
use crate::segment::Segment;
use crate::trapezoid::Trapezoid;

/// Partition the interior of the graph's polygons into y-monotone loops.
///
/// Every trapezoid carries exactly two polygon vertices on its boundary (its
/// top and bottom points). When those are not the endpoints of one of its
/// sides, the trapezoid is split along the top-to-bottom diagonal; after
/// that, walking chains of vertically adjacent interior trapezoids and
/// collecting the boundary vertices yields the monotone loops directly.
///
/// The diagonal splits invalidate the query structure and the winding-based
/// inside test, so this consumes the graph's usefulness for point location;
/// the working set itself is the only remaining notion of "inside".
pub(crate) fn convert_to_monotones(graph: &mut QueryGraph) -> Result<Vec<Vec<Idx<Point>>>, InternalError> {
    let mut inside: BTreeSet<Idx<Trapezoid>> = BTreeSet::new();
    for ti in graph.sink_trapezoids() {
        if graph.traps[ti].is_inside(&graph.points, &graph.segments) {
            inside.insert(ti);
        }
    }

    split_on_diagonals(graph, &mut inside)?;

    let mut result = Vec::new();
    while let Some(&seed) = inside.iter().next() {
        // Scan to the top trapezoid of the monotone. It is degenerate on
        // top, so it has no interior neighbor above it.
        let mut ti = seed;
        loop {
            match graph.traps[ti].above.any() {
                Some(ni) if inside.contains(&ni) => ti = ni,
                _ => break,
            }
        }

        // The top point is on both chains; it goes on the left arbitrarily.
        let top = graph.traps[ti]
            .top
            .ok_or_else(|| InternalError::new(format!("interior trapezoid {} has an open top", ti)))?;
        let mut left_chain: Vec<Idx<Point>> = vec![top];
        let mut right_chain: Vec<Idx<Point>> = Vec::new();

        // Descend, collecting each trapezoid's bottom point onto the chain
        // whose side it terminates.
        loop {
            let t = &graph.traps[ti];
            let bottom = t
                .bottom
                .ok_or_else(|| InternalError::new(format!("interior trapezoid {} has an open bottom", ti)))?;
            let (Some(left), Some(right)) = (t.left, t.right) else {
                return Err(InternalError::new(format!("interior trapezoid {} has an open side", ti)));
            };
            let left_bottom = graph.segments[left].bottom(&graph.points);
            let right_bottom = graph.segments[right].bottom(&graph.points);

            if bottom == left_bottom && bottom == right_bottom {
                // The chains converged.
                left_chain.push(bottom);
                inside.remove(&ti);
                break;
            }

            if bottom == left_bottom {
                left_chain.push(bottom);
            } else if bottom == right_bottom {
                right_chain.push(bottom);
            } else {
                return Err(InternalError::new("bottom point was not on either chain"));
            }

            inside.remove(&ti);
            match graph.traps[ti].below.any() {
                Some(ni) if inside.contains(&ni) => ti = ni,
                _ => break,
            }
        }

        // The monotone loop is the left chain followed by the right chain
        // in reverse.
        left_chain.extend(right_chain.into_iter().rev());
        if left_chain.len() < 3 {
            return Err(InternalError::new(format!(
                "monotone polygon is degenerate with {} points",
                left_chain.len()
            )));
        }
        result.push(left_chain);
    }
    Ok(result)
}

/// Split every trapezoid whose top and bottom are non-adjacent boundary
/// vertices along the diagonal between them. The pieces replace the
/// original in the working set; each piece has the diagonal as a side, so
/// no piece ever needs splitting again.
fn split_on_diagonals(graph: &mut QueryGraph, inside: &mut BTreeSet<Idx<Trapezoid>>) -> Result<(), InternalError> {
    let members: Vec<Idx<Trapezoid>> = inside.iter().copied().collect();
    for ti in members {
        let t = &graph.traps[ti];
        let (Some(top), Some(bottom)) = (t.top, t.bottom) else {
            return Err(InternalError::new(format!("interior trapezoid {} has an open boundary", ti)));
        };
        let (Some(left), Some(right)) = (t.left, t.right) else {
            return Err(InternalError::new(format!("interior trapezoid {} has an open side", ti)));
        };

        // No diagonal when the boundary points are the endpoints of a side.
        let left_s = &graph.segments[left];
        if top == left_s.top(&graph.points) && bottom == left_s.bottom(&graph.points) {
            continue;
        }
        let right_s = &graph.segments[right];
        if top == right_s.top(&graph.points) && bottom == right_s.bottom(&graph.points) {
            continue;
        }

        let si = graph.segments.push_get_index(Segment::new(top, bottom));
        let (li, ri) = graph.split_by_segment(ti, si)?;
        inside.remove(&ti);
        inside.insert(li);
        inside.insert(ri);
    }
    Ok(())
}
