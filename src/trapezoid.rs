use crate::errors::InternalError;
use crate::geom::Point;
use crate::idx::{Idx, IdxDisplay};
use crate::querynode::QueryNode;
use crate::segment::Segment;

/// A region of the plane bounded by two (possibly open) segments on the
/// sides and two (possibly open) horizontal boundaries.
///
/// The top and bottom are points, not y values, for two reasons:
///
/// 1. No two points lie on the same lexicographic horizontal, so every
///    vertical comparison needs an x value to break ties.
/// 2. The decomposition step asks every trapezoid which points on its
///    boundary are polygon vertices. The answer is always exactly two, and
///    those two points are the `top` and `bottom` fields.
#[derive(Debug, Clone)]
pub(crate) struct Trapezoid {
    pub left: Option<Idx<Segment>>,
    pub right: Option<Idx<Segment>>,
    pub top: Option<Idx<Point>>,
    pub bottom: Option<Idx<Point>>,
    pub above: NeighborList,
    pub below: NeighborList,
    pub sink: Idx<QueryNode>,
}

impl IdxDisplay for Trapezoid {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "t{}", idx)
    }
}

impl Trapezoid {
    /// Is the trapezoid inside the polygon? True iff it has both a left and
    /// right segment and the left segment points down; for any valid winding
    /// this implies the right segment points up.
    pub fn is_inside(&self, points: &[Point], segments: &[Segment]) -> bool {
        match (self.left, self.right) {
            (Some(left), Some(_)) => segments[left].points_down(points),
            _ => false,
        }
    }

    /// Check if the point is any of the (up to) six points involved with the
    /// trapezoid. If it is, the point is already a segment endpoint in the
    /// graph and no horizontal split is needed for it.
    pub fn has_point(&self, segments: &[Segment], pi: Idx<Point>) -> bool {
        if self.top == Some(pi) || self.bottom == Some(pi) {
            return true;
        }
        for side in [self.left, self.right].into_iter().flatten() {
            let s = &segments[side];
            if s.start == pi || s.end == pi {
                return true;
            }
        }
        false
    }

    /// Does the trapezoid pinch to a point at the top (is it a triangle)?
    /// Requires both sides to meet at the trapezoid's own top point.
    pub fn is_degenerate_on_top(&self, points: &[Point], segments: &[Segment]) -> bool {
        match (self.left, self.right) {
            (Some(left), Some(right)) => {
                let shared = segments[left].top(points);
                self.top == Some(shared) && segments[right].top(points) == shared
            }
            _ => false,
        }
    }

    pub fn is_degenerate_on_bottom(&self, points: &[Point], segments: &[Segment]) -> bool {
        match (self.left, self.right) {
            (Some(left), Some(right)) => {
                let shared = segments[left].bottom(points);
                self.bottom == Some(shared) && segments[right].bottom(points) == shared
            }
            _ => false,
        }
    }
}

/// Up to two neighbors above and below a trapezoid in the stable state.
/// While a trapezoid is being split there can transiently be a third, which
/// the merge step removes again.
#[derive(Debug, Clone, Default)]
pub(crate) struct NeighborList([Option<Idx<Trapezoid>>; 3]);

impl NeighborList {
    pub fn one(ti: Idx<Trapezoid>) -> Self {
        Self([Some(ti), None, None])
    }

    pub fn two(a: Idx<Trapezoid>, b: Idx<Trapezoid>) -> Self {
        Self([Some(a), Some(b), None])
    }

    /// Set-insert: adding an existing neighbor is a no-op.
    pub fn add(&mut self, ti: Idx<Trapezoid>) -> Result<(), InternalError> {
        if self.0.iter().any(|slot| *slot == Some(ti)) {
            return Ok(());
        }
        for slot in self.0.iter_mut() {
            if slot.is_none() {
                *slot = Some(ti);
                return Ok(());
            }
        }
        Err(InternalError::new(format!("too many neighbors adding {}", ti)))
    }

    pub fn remove(&mut self, ti: Idx<Trapezoid>) {
        for slot in self.0.iter_mut() {
            if *slot == Some(ti) {
                *slot = None;
                return;
            }
        }
    }

    /// Replace a neighbor with another, or insert if the original is absent.
    pub fn replace_or_add(&mut self, orig: Idx<Trapezoid>, replacement: Idx<Trapezoid>) -> Result<(), InternalError> {
        for slot in self.0.iter_mut() {
            if *slot == Some(orig) {
                *slot = Some(replacement);
                return Ok(());
            }
        }
        self.add(replacement)
    }

    pub fn any(&self) -> Option<Idx<Trapezoid>> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = Idx<Trapezoid>> + '_ {
        self.0.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn contains(&self, ti: Idx<Trapezoid>) -> bool {
        self.0.iter().any(|slot| *slot == Some(ti))
    }
}
