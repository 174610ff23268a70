use crate::geom::Point;
use crate::idx::{Idx, IdxDisplay};
use crate::segment::Segment;
use crate::trapezoid::Trapezoid;

/// A node of the point-location structure.
///
/// The kind of a node may be replaced in place (a sink becomes a Y node when
/// its trapezoid is split horizontally, or an X node when it is split by a
/// segment). Parents hold `Idx<QueryNode>` edges, so swapping the variant at
/// a fixed index leaves every existing edge valid.
#[derive(Debug, Clone)]
pub(crate) enum QueryNode {
    /// Splits on a segment: left child for points left of the key.
    X {
        segment: Idx<Segment>,
        left: Idx<QueryNode>,
        right: Idx<QueryNode>,
    },
    /// Splits on a point: children for lexicographically above and below.
    Y {
        key: Idx<Point>,
        above: Idx<QueryNode>,
        below: Idx<QueryNode>,
    },
    /// Names exactly one trapezoid. Before a sink has been merged it has a
    /// single parent, recorded here; a sink created by merging a chain has
    /// several X-node parents and records none.
    Sink {
        trapezoid: Idx<Trapezoid>,
        initial_parent: Option<Idx<QueryNode>>,
    },
}

impl IdxDisplay for QueryNode {
    fn fmt(f: &mut std::fmt::Formatter<'_>, idx: usize) -> std::fmt::Result {
        write!(f, "q{}", idx)
    }
}

impl QueryNode {
    pub fn sink(&self) -> Option<Idx<Trapezoid>> {
        match self {
            QueryNode::Sink { trapezoid, .. } => Some(*trapezoid),
            _ => None,
        }
    }

    /// Child edges, for graph iteration.
    pub fn children(&self) -> [Option<Idx<QueryNode>>; 2] {
        match *self {
            QueryNode::X { left, right, .. } => [Some(left), Some(right)],
            QueryNode::Y { above, below, .. } => [Some(above), Some(below)],
            QueryNode::Sink { .. } => [None, None],
        }
    }
}
