use std::time;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use smallvec::SmallVec;

use crate::errors::{InternalError, TriangulateError};
use crate::geom::{Point, Vector};
use crate::idx::{Idx, VecExt};
use crate::querynode::QueryNode;
use crate::segment::Segment;
use crate::trapezoid::{NeighborList, Trapezoid};

/// The trapezoid map and its point-location structure (Seidel 1991).
///
/// The graph owns every point, segment, trapezoid, and query node in four
/// arenas; everything else holds typed indices into them. Segments are
/// inserted one at a time in shuffled order, each insertion splitting the
/// trapezoids it crosses and rewriting their sinks so the directed acyclic
/// query structure locates any point in expected logarithmic time.
///
/// Holes need no special casing: polygons are just piles of segments with a
/// consistent winding rule, and a region is inside exactly when its left
/// bounding segment points lexicographically down.
pub struct QueryGraph {
    pub(crate) points: Vec<Point>,
    pub(crate) segments: Vec<Segment>,
    pub(crate) traps: Vec<Trapezoid>,
    pub(crate) nodes: Vec<QueryNode>,
    root: Option<Idx<QueryNode>>,
}

impl Default for QueryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryGraph {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            segments: Vec::new(),
            traps: Vec::new(),
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Add a polygon to the graph. If the polygon winds clockwise it ends up
    /// producing a hole; counterclockwise, a filled region. The polygon must
    /// not intersect any segment already in the graph.
    ///
    /// Insertion order is pseudorandom but deterministic, because
    /// predictable results are easier to debug. That raises the potential
    /// for adversarial inputs; pass `nondeterministic = true` to seed from
    /// the clock when the input is untrusted.
    pub fn add_polygon(&mut self, points: &[Point], nondeterministic: bool) -> Result<(), TriangulateError> {
        if points.len() < 3 {
            return Err(TriangulateError::NotEnoughVertices(points.len()));
        }

        // Intern every occurrence as its own point; identity, not value,
        // is what the algorithm compares.
        let ids: Vec<Idx<Point>> = points.iter().map(|&p| self.points.push_get_index(p)).collect();
        let mut order: Vec<Idx<Segment>> = Vec::with_capacity(ids.len());
        for i in 0..ids.len() {
            let s = Segment::new(ids[i], ids[(i + 1) % ids.len()]);
            order.push(self.segments.push_get_index(s));
        }

        // Shuffling the segments is what gives the expected O(n log n) time.
        let seed = if nondeterministic {
            time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        } else {
            0
        };
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let mut order = order.into_iter();
        if self.root.is_none() {
            if let Some(si) = order.next() {
                self.bootstrap(si);
            }
        }
        for si in order {
            self.add_segment(si)?;
        }
        Ok(())
    }

    /// [Self::add_polygon] over several loops, deterministic mode.
    pub fn add_polygons<I>(&mut self, polygons: I) -> Result<(), TriangulateError>
    where
        I: IntoIterator,
        I::Item: AsRef<[Point]>,
    {
        for polygon in polygons {
            self.add_polygon(polygon.as_ref(), false)?;
        }
        Ok(())
    }

    /// Fast point-in-polygon test using the trapezoid map. Output is not
    /// defined for points exactly on an edge.
    pub fn contains_point(&self, p: Point) -> bool {
        if self.root.is_none() {
            return false;
        }
        match self.locate(p, None, Vector { x: 1.0, y: 0.0 }) {
            Ok(qi) => match self.nodes[qi].sink() {
                Some(ti) => self.traps[ti].is_inside(&self.points, &self.segments),
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Build the initial graph from a single segment.
    fn bootstrap(&mut self, si: Idx<Segment>) {
        let a = self.segments[si].top(&self.points);
        let b = self.segments[si].bottom(&self.points);

        // The first segment divides the plane into four trapezoids:
        //
        //            top
        //    ------a--------------
        //     left  \  right
        //    --------b------------
        //           bottom
        let ti_top = self.traps.next_index();
        let ti_left = ti_top + 1;
        let ti_right = ti_top + 2;
        let ti_bottom = ti_top + 3;

        let qi_top = self.nodes.next_index();
        let qi_left = qi_top + 1;
        let qi_right = qi_top + 2;
        let qi_bottom = qi_top + 3;
        let qi_x = qi_top + 4;
        let qi_y_b = qi_top + 5;
        let qi_y_a = qi_top + 6;

        self.traps.push(Trapezoid {
            left: None,
            right: None,
            top: None,
            bottom: Some(a),
            above: NeighborList::default(),
            below: NeighborList::two(ti_left, ti_right),
            sink: qi_top,
        });
        self.traps.push(Trapezoid {
            left: None,
            right: Some(si),
            top: Some(a),
            bottom: Some(b),
            above: NeighborList::one(ti_top),
            below: NeighborList::one(ti_bottom),
            sink: qi_left,
        });
        self.traps.push(Trapezoid {
            left: Some(si),
            right: None,
            top: Some(a),
            bottom: Some(b),
            above: NeighborList::one(ti_top),
            below: NeighborList::one(ti_bottom),
            sink: qi_right,
        });
        self.traps.push(Trapezoid {
            left: None,
            right: None,
            top: Some(b),
            bottom: None,
            above: NeighborList::two(ti_left, ti_right),
            below: NeighborList::default(),
            sink: qi_bottom,
        });

        self.nodes.push(QueryNode::Sink { trapezoid: ti_top, initial_parent: Some(qi_y_a) });
        self.nodes.push(QueryNode::Sink { trapezoid: ti_left, initial_parent: Some(qi_x) });
        self.nodes.push(QueryNode::Sink { trapezoid: ti_right, initial_parent: Some(qi_x) });
        self.nodes.push(QueryNode::Sink { trapezoid: ti_bottom, initial_parent: Some(qi_y_b) });
        self.nodes.push(QueryNode::X { segment: si, left: qi_left, right: qi_right });
        self.nodes.push(QueryNode::Y { key: b, above: qi_x, below: qi_bottom });
        self.nodes.push(QueryNode::Y { key: a, above: qi_top, below: qi_y_b });

        self.root = Some(qi_y_a);
    }

    /// Traverse from the root to the sink whose trapezoid contains the
    /// query. `pi` carries the query's identity when it is a graph vertex;
    /// `dir` disambiguates when the query coincides with a node's key.
    fn locate(&self, p: Point, pi: Option<Idx<Point>>, dir: Vector) -> Result<Idx<QueryNode>, InternalError> {
        let mut qi = self
            .root
            .ok_or_else(|| InternalError::new("point location on an empty graph"))?;
        loop {
            match &self.nodes[qi] {
                QueryNode::Sink { .. } => return Ok(qi),
                QueryNode::Y { key, above, below } => {
                    qi = if pi == Some(*key) {
                        // The query is the key vertex itself; follow the
                        // direction out of it.
                        if dir.y > 0.0 || (dir.y == 0.0 && dir.x > 0.0) {
                            *above
                        } else {
                            *below
                        }
                    } else if p.below(&self.points[*key]) {
                        *below
                    } else {
                        *above
                    };
                }
                QueryNode::X { segment, left, right } => {
                    let s = &self.segments[*segment];
                    qi = if pi == Some(s.start) || pi == Some(s.end) {
                        // The query is an endpoint of the key. Displacing it
                        // by `dir` and testing against the key's infinite
                        // line reduces to the sign of a cross product.
                        let top = self.points[s.top(&self.points)];
                        let bottom = self.points[s.bottom(&self.points)];
                        let up = Vector { x: top.x - bottom.x, y: top.y - bottom.y };
                        if up.cross(dir) < 0.0 {
                            *right
                        } else {
                            *left
                        }
                    } else if s.is_left_of_point(&self.points, p) {
                        *right
                    } else {
                        *left
                    };
                }
            }
        }
    }

    fn sink_trapezoid(&self, qi: Idx<QueryNode>) -> Result<Idx<Trapezoid>, InternalError> {
        self.nodes[qi]
            .sink()
            .ok_or_else(|| InternalError::new(format!("{} is not a sink", qi)))
    }

    /// Insert one segment, splitting every trapezoid it crosses and
    /// rewiring the query structure.
    pub(crate) fn add_segment(&mut self, si: Idx<Segment>) -> Result<(), InternalError> {
        let top = self.segments[si].top(&self.points);
        let bottom = self.segments[si].bottom(&self.points);
        let downward = Vector::toward(self.points[top], self.points[bottom]);
        let upward = Vector::toward(self.points[bottom], self.points[top]);

        // Find the trapezoid holding the top point, approaching along the
        // segment. Unless the point is already a vertex on that trapezoid's
        // boundary, cut the trapezoid at the point's height.
        let qi = self.locate(self.points[top], Some(top), downward)?;
        let ti = self.sink_trapezoid(qi)?;
        if !self.traps[ti].has_point(&self.segments, top) {
            self.split_horizontal(qi, top)?;
        }

        // Same for the bottom point.
        let qi = self.locate(self.points[bottom], Some(bottom), upward)?;
        let mut cur = self.sink_trapezoid(qi)?;
        if !self.traps[cur].has_point(&self.segments, bottom) {
            self.split_horizontal(qi, bottom)?;
            // The segment crosses the upper half of the cut.
            cur = match self.nodes[qi] {
                QueryNode::Y { above, .. } => self.sink_trapezoid(above)?,
                _ => return Err(InternalError::new(format!("horizontal split left {} as a non-Y node", qi))),
            };
        }

        // Walk upward from the bottom, splitting each trapezoid the segment
        // passes through. The walk ends at the trapezoid whose top is the
        // segment's top point, or as soon as no neighbor's bottom edge
        // crosses the segment (the segment can end on a corner where two
        // existing trapezoids already meet).
        let mut lefts: SmallVec<[Idx<Trapezoid>; 8]> = SmallVec::new();
        let mut rights: SmallVec<[Idx<Trapezoid>; 8]> = SmallVec::new();
        loop {
            let (li, ri) = self.split_by_segment(cur, si)?;
            lefts.push(li);
            rights.push(ri);
            if self.traps[cur].top == Some(top) {
                break;
            }
            match self.next_above_crossing(cur, si)? {
                Some(ni) => cur = ni,
                None => break,
            }
        }

        // The chains may contain consecutive pieces that agree on both
        // sides; collapse each such run into one trapezoid, then replace
        // every original sink with an X node over the merged pieces.
        let sinks: Vec<Idx<QueryNode>> = lefts.iter().map(|&ti| self.traps[ti].sink).collect();
        let left_sinks = self.merge_chain(&lefts)?;
        let right_sinks = self.merge_chain(&rights)?;
        for (i, &qi) in sinks.iter().enumerate() {
            self.nodes[qi] = QueryNode::X { segment: si, left: left_sinks[i], right: right_sinks[i] };
        }

        self.assert_consistent();
        Ok(())
    }

    /// Cut the trapezoid named by the sink `qi` at the height of `pi`,
    /// replacing the sink with a Y node over the two halves. The point must
    /// not lie above the trapezoid's top or below its bottom.
    fn split_horizontal(&mut self, qi: Idx<QueryNode>, pi: Idx<Point>) -> Result<(), InternalError> {
        let ti = self.sink_trapezoid(qi)?;
        let orig = self.traps[ti].clone();

        if let Some(top) = orig.top {
            if self.points[top].below(&self.points[pi]) {
                return Err(InternalError::new(format!("cannot split {} on a point above its top", ti)));
            }
        }
        if let Some(bottom) = orig.bottom {
            if self.points[bottom].above(&self.points[pi]) {
                return Err(InternalError::new(format!("cannot split {} on a point below its bottom", ti)));
            }
        }

        let ti_upper = self.traps.next_index();
        let ti_lower = ti_upper + 1;
        let qi_upper = self.nodes.next_index();
        let qi_lower = qi_upper + 1;

        // The upper half keeps the original top and neighbors above; the
        // lower half keeps the bottom and the neighbors below.
        let mut upper = orig.clone();
        upper.bottom = Some(pi);
        upper.below = NeighborList::one(ti_lower);
        upper.sink = qi_upper;

        let mut lower = orig.clone();
        lower.top = Some(pi);
        lower.above = NeighborList::one(ti_upper);
        lower.sink = qi_lower;

        for ni in upper.above.iter() {
            self.traps[ni].below.replace_or_add(ti, ti_upper)?;
        }
        for ni in lower.below.iter() {
            self.traps[ni].above.replace_or_add(ti, ti_lower)?;
        }

        self.traps.push(upper);
        self.traps.push(lower);
        self.nodes.push(QueryNode::Sink { trapezoid: ti_upper, initial_parent: Some(qi) });
        self.nodes.push(QueryNode::Sink { trapezoid: ti_lower, initial_parent: Some(qi) });
        self.nodes[qi] = QueryNode::Y { key: pi, above: qi_upper, below: qi_lower };
        Ok(())
    }

    /// Split a trapezoid with a segment assumed to pass fully through it.
    /// The two pieces still point at the original's sink; the caller fixes
    /// the query structure once agreeing pieces have been merged.
    pub(crate) fn split_by_segment(&mut self, ti: Idx<Trapezoid>, si: Idx<Segment>) -> Result<(Idx<Trapezoid>, Idx<Trapezoid>), InternalError> {
        let orig = self.traps[ti].clone();

        let mut left = orig.clone();
        left.right = Some(si);
        left.above = NeighborList::default();
        left.below = NeighborList::default();
        let mut right = orig.clone();
        right.left = Some(si);
        right.above = NeighborList::default();
        right.below = NeighborList::default();

        let li = self.traps.push_get_index(left);
        let ri = self.traps.push_get_index(right);

        let s_top = self.segments[si].top(&self.points);
        let s_bottom = self.segments[si].bottom(&self.points);

        // A piece that pinches shut at a boundary takes no neighbors there.
        let left_top_open = !self.traps[li].is_degenerate_on_top(&self.points, &self.segments);
        let left_bottom_open = !self.traps[li].is_degenerate_on_bottom(&self.points, &self.segments);
        let right_top_open = !self.traps[ri].is_degenerate_on_top(&self.points, &self.segments);
        let right_bottom_open = !self.traps[ri].is_degenerate_on_bottom(&self.points, &self.segments);

        // Each old neighbor attaches to the piece(s) it still overlaps: the
        // left piece if the segment's endpoint clears the neighbor's left
        // side, the right piece if it clears the neighbor's right side.
        for ni in orig.above.iter() {
            self.traps[ni].below.remove(ti);
            let n_left = self.traps[ni].left;
            let n_right = self.traps[ni].right;
            if left_top_open && self.side_is_left_of(n_left, s_top) {
                self.traps[li].above.add(ni)?;
                self.traps[ni].below.add(li)?;
            }
            if right_top_open && self.side_is_right_of(n_right, s_top) {
                self.traps[ri].above.add(ni)?;
                self.traps[ni].below.add(ri)?;
            }
        }
        for ni in orig.below.iter() {
            self.traps[ni].above.remove(ti);
            let n_left = self.traps[ni].left;
            let n_right = self.traps[ni].right;
            if left_bottom_open && self.side_is_left_of(n_left, s_bottom) {
                self.traps[li].below.add(ni)?;
                self.traps[ni].above.add(li)?;
            }
            if right_bottom_open && self.side_is_right_of(n_right, s_bottom) {
                self.traps[ri].below.add(ni)?;
                self.traps[ni].above.add(ri)?;
            }
        }

        Ok((li, ri))
    }

    /// An open side counts as infinitely far out, so every point clears it.
    fn side_is_left_of(&self, side: Option<Idx<Segment>>, pi: Idx<Point>) -> bool {
        match side {
            None => true,
            Some(si) => self.segments[si].is_left_of(&self.points, pi),
        }
    }

    fn side_is_right_of(&self, side: Option<Idx<Segment>>, pi: Idx<Point>) -> bool {
        match side {
            None => true,
            Some(si) => self.segments[si].is_right_of(&self.points, pi),
        }
    }

    /// The neighbor above `ti` that the segment continues into, if any.
    fn next_above_crossing(&self, ti: Idx<Trapezoid>, si: Idx<Segment>) -> Result<Option<Idx<Trapezoid>>, InternalError> {
        let above: SmallVec<[Idx<Trapezoid>; 3]> = self.traps[ti].above.iter().collect();
        for &ni in &above {
            if self.bottom_intersects_segment(ni, si)? {
                return Ok(Some(ni));
            }
        }
        Ok(None)
    }

    /// Does the segment cross the bottom edge of the trapezoid?
    fn bottom_intersects_segment(&self, ti: Idx<Trapezoid>, si: Idx<Segment>) -> Result<bool, InternalError> {
        let t = &self.traps[ti];
        let Some(bi) = t.bottom else {
            // Bottom at infinity, nothing crosses it.
            return Ok(false);
        };
        let s = &self.segments[si];

        // The segment may end exactly on a corner of the trapezoid; that is
        // not a crossing.
        if s.start == bi || s.end == bi {
            for side in [t.left, t.right].into_iter().flatten() {
                if self.segments[side].bottom(&self.points) == bi {
                    return Ok(false);
                }
            }
        }

        if s.is_horizontal(&self.points) {
            return Err(InternalError::new(format!("tried to intersect horizontal {} with the bottom of {}", si, ti)));
        }

        let b = self.points[bi];
        let crossing = Point::new(s.solve_for_x(&self.points, b.y), b.y);
        let left_ok = match t.left {
            None => true,
            Some(side) => self.segments[side].is_left_of_point(&self.points, crossing),
        };
        let right_ok = match t.right {
            None => true,
            Some(side) => self.segments[side].is_right_of_point(&self.points, crossing),
        };
        Ok(left_ok && right_ok)
    }

    /// Collapse runs of chain pieces that share both sides. Returns the sink
    /// of the merged trapezoid covering each chain position.
    fn merge_chain(&mut self, chain: &[Idx<Trapezoid>]) -> Result<Vec<Idx<QueryNode>>, InternalError> {
        let mut sinks = Vec::with_capacity(chain.len());
        let mut start = 0;
        while start < chain.len() {
            let mut end = start + 1;
            while end < chain.len() && self.can_merge(chain[start], chain[end]) {
                end += 1;
            }

            // The merged trapezoid takes its geometry from the bottom piece
            // up to the top piece, with the neighbor sets to match. No
            // initial parent: after the rewire it has several X parents.
            let bottom = chain[start];
            let top = chain[end - 1];
            let mi = self.traps.next_index();
            let qi = self.nodes.next_index();
            let mut merged = self.traps[bottom].clone();
            merged.top = self.traps[top].top;
            merged.above = self.traps[top].above.clone();
            merged.sink = qi;
            let above = merged.above.clone();
            let below = merged.below.clone();
            self.traps.push(merged);
            self.nodes.push(QueryNode::Sink { trapezoid: mi, initial_parent: None });

            for ni in above.iter() {
                self.traps[ni].below.replace_or_add(top, mi)?;
            }
            for ni in below.iter() {
                self.traps[ni].above.replace_or_add(bottom, mi)?;
            }

            for _ in start..end {
                sinks.push(qi);
            }
            start = end;
        }
        Ok(sinks)
    }

    fn can_merge(&self, a: Idx<Trapezoid>, b: Idx<Trapezoid>) -> bool {
        let ta = &self.traps[a];
        let tb = &self.traps[b];
        ta.left == tb.left && ta.right == tb.right
    }

    /// Visit every node reachable from the root exactly once. Traversal
    /// order is unspecified; the graph must not change during iteration.
    pub(crate) fn iter_nodes(&self) -> NodeIter<'_> {
        NodeIter {
            nodes: &self.nodes,
            stack: self.root.into_iter().collect(),
            seen: vec![false; self.nodes.len()],
        }
    }

    /// Every trapezoid still named by a reachable sink.
    pub(crate) fn sink_trapezoids(&self) -> impl Iterator<Item = Idx<Trapezoid>> + '_ {
        let nodes = &self.nodes;
        self.iter_nodes().filter_map(move |qi| nodes[qi].sink())
    }

    #[cfg(debug_assertions)]
    pub(crate) fn assert_consistent(&self) {
        // A sink that has not been merged records the single parent it was
        // created under; that parent must still point back at it.
        for qi in self.iter_nodes() {
            if let QueryNode::Sink { initial_parent: Some(parent), .. } = self.nodes[qi] {
                let children = self.nodes[parent].children();
                if !children.into_iter().flatten().any(|child| child == qi) {
                    panic!("sink {} is not a child of its initial parent {}", qi, parent);
                }
            }
        }

        for ti in self.sink_trapezoids() {
            let t = &self.traps[ti];
            match &self.nodes[t.sink] {
                QueryNode::Sink { trapezoid, .. } if *trapezoid == ti => {}
                _ => panic!("trapezoid {} does not agree with its sink {}", ti, t.sink),
            }
            if t.above.len() > 2 || t.below.len() > 2 {
                panic!("trapezoid {} has more than two neighbors on one side", ti);
            }
            for ni in t.above.iter() {
                if !self.traps[ni].below.contains(ti) {
                    panic!("neighbor link {} -> {} is not reciprocated below", ti, ni);
                }
            }
            for ni in t.below.iter() {
                if !self.traps[ni].above.contains(ti) {
                    panic!("neighbor link {} -> {} is not reciprocated above", ti, ni);
                }
            }
        }
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn assert_consistent(&self) { }
}

pub(crate) struct NodeIter<'a> {
    nodes: &'a [QueryNode],
    stack: Vec<Idx<QueryNode>>,
    seen: Vec<bool>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = Idx<QueryNode>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(qi) = self.stack.pop() {
            if self.seen[qi.usize()] {
                continue;
            }
            self.seen[qi.usize()] = true;
            for child in self.nodes[qi].children().into_iter().flatten() {
                self.stack.push(child);
            }
            return Some(qi);
        }
        None
    }
}
