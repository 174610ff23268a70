use std::collections::HashSet;

use crate::geom::{approx_eq, approx_lt, polygon_signed_area};
use crate::{Point, Triangle, EPSILON};

/// Check that a triangulation of a single counterclockwise polygon is
/// valid. The rules are:
/// 1. The set of points in the triangles equals the set of points in the
///    polygon.
/// 2. Every polygon edge appears among the triangle edges.
/// 3. Every triangle is counterclockwise.
/// 4. No triangle has near-zero area.
/// 5. The triangle areas sum to the polygon area.
pub fn assert_valid_triangulation(polygon: &[Point], triangles: &[Triangle]) {
    assert!(polygon_signed_area(polygon) > 0.0, "polygon is not counterclockwise");

    let poly_points: HashSet<(u64, u64)> = polygon.iter().map(point_key).collect();
    let mut triangle_points = HashSet::new();
    let mut triangle_edges = HashSet::new();
    let mut triangle_area = 0.0;
    for t in triangles {
        assert!(t.is_ccw(), "clockwise triangle: {}", t);
        assert!(t.area() >= EPSILON, "degenerate triangle: {}", t);
        triangle_area += t.area();
        for p in [&t.a, &t.b, &t.c] {
            triangle_points.insert(point_key(p));
        }
        triangle_edges.insert(edge_key(&t.a, &t.b));
        triangle_edges.insert(edge_key(&t.b, &t.c));
        triangle_edges.insert(edge_key(&t.c, &t.a));
    }

    assert_eq!(
        poly_points, triangle_points,
        "the triangles must use exactly the polygon's points"
    );

    for i in 0..polygon.len() {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % polygon.len()];
        assert!(
            triangle_edges.contains(&edge_key(a, b)),
            "polygon edge {}-{} is missing from the triangulation",
            a, b
        );
    }

    let poly_area = polygon_signed_area(polygon).abs();
    assert!(
        (poly_area - triangle_area).abs() < EPSILON,
        "triangle areas sum to {} but the polygon area is {}",
        triangle_area, poly_area
    );
}

/// Compare the region covered by the triangulation against the input loops
/// by sampling a grid over the padded bounding box, using the even-odd rule
/// on both sides.
pub fn validate_by_sampling(triangles: &[Triangle], expected: &[Vec<Point>]) {
    let actual: Vec<Vec<Point>> = triangles.iter().map(|t| vec![t.a, t.b, t.c]).collect();

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for list in [&actual[..], expected] {
        for polygon in list {
            for p in polygon {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
        }
    }

    // Pad the bounding box by 10%, then sample on a 50-division grid.
    let x_padding = (max_x - min_x) * 0.1;
    let y_padding = (max_y - min_y) * 0.1;
    min_x -= x_padding;
    min_y -= y_padding;
    max_x += x_padding;
    max_y += y_padding;
    let step = (max_x - min_x).max(max_y - min_y) / 50.0;

    let mut y = min_y;
    while y <= max_y {
        let mut x = min_x;
        while x <= max_x {
            let p = Point::new(x, y);
            let expected_inside = contains_point_even_odd(expected, p);
            let actual_inside = contains_point_even_odd(&actual, p);
            assert_eq!(
                expected_inside, actual_inside,
                "point {} should {}be covered by the triangulation",
                p,
                if expected_inside { "" } else { "not " }
            );
            x += step;
        }
        y += step;
    }
}

/// Even-odd point-in-region test over a set of loops. Winding agnostic, so
/// it treats holes correctly whichever way they run.
pub fn contains_point_even_odd(loops: &[Vec<Point>], p: Point) -> bool {
    let crossings: usize = loops.iter().map(|l| crossing_count(l, p)).sum();
    crossings % 2 == 1
}

/// Crossings of the leftward ray from `p` with the loop's edges.
fn crossing_count(polygon: &[Point], p: Point) -> usize {
    let mut count = 0;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        if !segment_is_left_of(a, b, p) && (a.below(&p) != b.below(&p)) {
            count += 1;
        }
    }
    count
}

/// Value-based mirror of the segment predicate used by the library.
fn segment_is_left_of(a: Point, b: Point, p: Point) -> bool {
    if approx_eq(a.y, b.y) {
        approx_lt(a.x.max(b.x), p.x)
    } else {
        let x = if approx_eq(a.x, b.x) {
            a.x
        } else {
            a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y)
        };
        approx_lt(x, p.x)
    }
}

fn point_key(p: &Point) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}

fn edge_key(a: &Point, b: &Point) -> ((u64, u64), (u64, u64)) {
    // Normalize so an edge hashes the same whichever way it is traversed.
    if a.below(b) {
        (point_key(a), point_key(b))
    } else {
        (point_key(b), point_key(a))
    }
}
