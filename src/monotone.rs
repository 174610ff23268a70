use std::collections::HashSet;

use smallvec::{smallvec, SmallVec};

use crate::errors::InternalError;
use crate::geom::{signed_area_ids, Point};
use crate::idx::Idx;

/// Triangulate a counterclockwise y-monotone polygon.
///
/// The lexicographic order stands in for a slightly rotated coordinate
/// system, so horizontal edges do not break strict monotonicity; a
/// horizontal edge on the left chain sits above the interior and one on the
/// right chain sits below it, which is exactly the convention the
/// trapezoidization produces.
pub(crate) fn triangulate_monotone(points: &[Point], polygon: &[Idx<Point>]) -> Result<Vec<[Idx<Point>; 3]>, InternalError> {
    let n = polygon.len();
    if n < 3 {
        return Err(InternalError::new(format!(
            "cannot triangulate degenerate polygon with point count: {}",
            n
        )));
    }
    // Triangles pass through unchanged.
    if n == 3 {
        return Ok(vec![[polygon[0], polygon[1], polygon[2]]]);
    }

    let mut triangles = Vec::with_capacity(n - 2);

    let mut top = 0;
    for i in 1..n {
        if points[polygon[i]].above(&points[polygon[top]]) {
            top = i;
        }
    }

    // Merge sort the two chains outward from the top into one
    // lexicographically descending sequence, tagging the left-chain points.
    // The bottom point stays out of the sequence; the final fan handles it.
    let mut sorted: Vec<Idx<Point>> = Vec::with_capacity(n);
    sorted.push(polygon[top]);
    let mut left_chain: HashSet<Idx<Point>> = HashSet::new();
    let mut left_offset = 1isize;
    let mut right_offset = 1isize;
    let bottom;
    loop {
        let left_point = polygon[circular(top as isize + left_offset, n)];
        let right_point = polygon[circular(top as isize - right_offset, n)];

        // The chains met; we are done.
        if left_point == right_point {
            bottom = left_point;
            break;
        }

        if points[left_point].above(&points[right_point]) {
            left_chain.insert(left_point);
            sorted.push(left_point);
            left_offset += 1;
        } else {
            sorted.push(right_point);
            right_offset += 1;
        }
    }

    let mut stack: SmallVec<[Idx<Point>; 16]> = smallvec![sorted[0], sorted[1]];
    for i in 2..sorted.len() {
        let p = sorted[i];
        let left = left_chain.contains(&p);
        let Some(&stack_top) = stack.last() else {
            return Err(InternalError::new("sweep stack drained early"));
        };

        if left != left_chain.contains(&stack_top) {
            // Jumped to the opposite chain: monotonicity guarantees every
            // stack point is visible from here, so fan them all off.
            while let Some(a) = stack.pop() {
                if let Some(&b) = stack.last() {
                    let tri = if left {
                        /*
                                      b
                                     /|
                         diagonal-> / |
                                   p--a
                        */
                        [p, a, b]
                    } else {
                        /*
                            b
                            |\ <- diagonal
                            | \
                            a--p
                        */
                        [a, p, b]
                    };
                    push_triangle(points, &mut triangles, tri)?;
                }
            }
            stack.push(sorted[i - 1]);
            stack.push(p);
        } else {
            // Same chain: pop while the new point can see the next stack
            // point. Building the candidate triangle and checking its
            // winding is the easiest visibility test.
            let Some(mut v) = stack.pop() else {
                return Err(InternalError::new("sweep stack drained early"));
            };
            while let Some(&next) = stack.last() {
                let tri = if left { [p, next, v] } else { [p, v, next] };
                if signed_area_ids(points, tri) > 0.0 {
                    stack.pop();
                    v = next;
                    triangles.push(tri);
                } else {
                    break;
                }
            }
            stack.push(v);
            stack.push(p);
        }
    }

    // Fan off whatever remains against the bottom point. The final triangle
    // must include the bottom point itself; stopping one point early would
    // leave it out of the output entirely.
    let Some(mut l) = stack.pop() else {
        return Err(InternalError::new("sweep stack drained early"));
    };
    while let Some(p) = stack.pop() {
        let tri = if left_chain.contains(&l) {
            [bottom, p, l]
        } else {
            [bottom, l, p]
        };
        push_triangle(points, &mut triangles, tri)?;
        l = p;
    }

    Ok(triangles)
}

fn push_triangle(points: &[Point], triangles: &mut Vec<[Idx<Point>; 3]>, tri: [Idx<Point>; 3]) -> Result<(), InternalError> {
    if signed_area_ids(points, tri) < 0.0 {
        return Err(InternalError::new(format!(
            "triangle is clockwise: {}, {}, {}",
            points[tri[0]], points[tri[1]], points[tri[2]]
        )));
    }
    triangles.push(tri);
    Ok(())
}

/// Modular index that stays positive for negative offsets.
fn circular(i: isize, n: usize) -> usize {
    let n = n as isize;
    ((i % n + n) % n) as usize
}
