use std::f64::consts::PI;

use crate::geom::polygon_signed_area;
use crate::Point;

/// The 2x2 square centered on the origin.
pub fn square() -> Vec<Point> {
    vec![
        Point::new(1.0, -1.0),
        Point::new(1.0, 1.0),
        Point::new(-1.0, 1.0),
        Point::new(-1.0, -1.0),
    ]
}

pub fn reverse(points: &[Point]) -> Vec<Point> {
    points.iter().rev().copied().collect()
}

/// A counterclockwise regular polygon around the origin.
pub fn regular_polygon(sides: usize, radius: f64) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / sides as f64;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// A ten-point star with alternating radii, centered at `(x, y)`.
pub fn make_star(x: f64, y: f64, outer_radius: f64, inner_radius: f64) -> Vec<Point> {
    (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            let angle = 2.0 * PI * i as f64 / 10.0;
            Point::new(x + radius * angle.cos(), y + radius * angle.sin())
        })
        .collect()
}

pub fn simple_star() -> Vec<Vec<Point>> {
    vec![make_star(0.0, 0.0, 5.0, 2.0)]
}

pub fn square_with_hole() -> Vec<Vec<Point>> {
    let outer = vec![
        Point::new(-5.0, -5.0),
        Point::new(5.0, -5.0),
        Point::new(5.0, 5.0),
        Point::new(-5.0, 5.0),
    ];
    let hole = vec![
        Point::new(-2.0, -2.0),
        Point::new(-2.0, 2.0),
        Point::new(2.0, 2.0),
        Point::new(2.0, -2.0),
    ];
    vec![outer, hole]
}

/// A star-shaped ring: a filled star with a smaller star-shaped hole.
pub fn star_outline() -> Vec<Vec<Point>> {
    let filled = make_star(0.0, 0.0, 10.0, 5.0);
    let hole = make_star(0.0, 0.0, 8.0, 3.0);
    vec![filled, reverse(&hole)]
}

/// Many nested stars with alternating winding, giving concentric stripes.
pub fn star_stripes() -> Vec<Vec<Point>> {
    let mut list = Vec::new();
    let outer_radius = 10.0;
    let indent_scale = 0.7;
    let gap_scale = 0.9;
    let mut scale: f64 = 1.0;
    for i in 0..20 {
        let r = outer_radius * scale;
        let mut star = make_star(0.0, 0.0, r, r * indent_scale);
        if i % 2 == 1 {
            star = reverse(&star);
        }
        list.push(star);
        scale *= gap_scale;
    }
    list
}

/// Multiple holes which themselves contain filled shapes.
pub fn multi_layered_holes() -> Vec<Vec<Point>> {
    vec![
        // Outer star
        make_star(0.0, 0.0, 10.0, 7.0),
        // Top hole
        reverse(&make_star(1.5, 5.0, 3.0, 2.0)),
        // Top inner
        make_star(1.5, 5.0, 2.0, 1.0),
        // Bottom hole
        reverse(&make_star(1.8, -5.0, 3.0, 2.0)),
        // Bottom inner
        make_star(1.8, -5.0, 2.0, 1.0),
        // Left hole
        reverse(&make_star(-3.0, 0.0, 4.0, 2.0)),
        // Left inner
        make_star(-3.0, 0.0, 3.0, 1.0),
    ]
}

/// An Archimedean spiral band: outward along the spiral, back along an
/// inset copy. Exercises long chains of nearly parallel segments.
pub fn spiral() -> Vec<Point> {
    let steps_per_turn = 40usize;
    let total = steps_per_turn * 5 / 2;
    let width = 0.6;

    let theta = |i: usize| 2.0 * PI * i as f64 / steps_per_turn as f64;
    let mut points = Vec::with_capacity(2 * (total + 1));
    for i in 0..=total {
        let t = theta(i);
        let r = 1.0 + 0.5 * t;
        points.push(Point::new(r * t.cos(), r * t.sin()));
    }
    for i in (0..=total).rev() {
        let t = theta(i);
        let r = 1.0 + 0.5 * t - width;
        points.push(Point::new(r * t.cos(), r * t.sin()));
    }

    if polygon_signed_area(&points) < 0.0 {
        points.reverse();
    }
    points
}
