//! An asymptotically fast polygon triangulation library.
//!
//! Converts a set of simple polygons, which may be non-convex, may be
//! disjoint, and may contain holes, into a set of counterclockwise triangles
//! containing only the original points. Filled polygons give their points in
//! counterclockwise order, holes in clockwise order; the order of the loops
//! themselves is irrelevant, and holes may nest to any depth.
//!
//! The implementation is Seidel's randomized incremental trapezoidization,
//! which runs in expected O(n log n) time and handles holes without any
//! special casing: all it needs is line segments and a consistent winding
//! rule.
//!
//! ```
//! use seidel::{triangulate, Point};
//!
//! let square = vec![
//!     Point::new(1.0, -1.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(-1.0, 1.0),
//!     Point::new(-1.0, -1.0),
//! ];
//! let triangles = triangulate(&[square]).expect("triangulation failed");
//! assert_eq!(triangles.len(), 2);
//! ```
//!
//! Inputs are not validated: loops must not self-intersect, must wind as
//! described, and edges of different loops must not share endpoints. The
//! arithmetic is plain `f64` with a fixed tolerance of [EPSILON].

mod decompose;
mod errors;
mod geom;
mod idx;
mod monotone;
mod querygraph;
mod querynode;
mod segment;
mod trapezoid;

#[cfg(any(test, feature = "benchmarking"))]
pub mod tests;

pub use errors::{InternalError, TriangulateError};
pub use geom::{Point, Triangle, EPSILON};
pub use querygraph::QueryGraph;

/// Convert a set of point loops into triangles.
///
/// Accepts anything iterable over point slices: `&[Vec<Point>]`,
/// `Vec<Vec<Point>>`, an array of slices, and so on. Empty loops are
/// skipped; a loop with one or two points is an error. On any failure the
/// result carries the first fatal condition detected and no triangles.
pub fn triangulate<I>(loops: I) -> Result<Vec<Triangle>, TriangulateError>
where
    I: IntoIterator,
    I::Item: AsRef<[Point]>,
{
    // The graph copies every loop into its own arenas, so the caller's
    // buffers are free to go away.
    let mut graph = QueryGraph::new();
    for polygon in loops {
        let polygon = polygon.as_ref();
        if polygon.is_empty() {
            continue;
        }
        graph.add_polygon(polygon, false)?;
    }

    let mut triangles = Vec::new();
    for monotone_loop in decompose::convert_to_monotones(&mut graph)? {
        for t in monotone::triangulate_monotone(&graph.points, &monotone_loop)? {
            triangles.push(Triangle::new(
                graph.points[t[0]],
                graph.points[t[1]],
                graph.points[t[2]],
            ));
        }
    }
    Ok(triangles)
}
