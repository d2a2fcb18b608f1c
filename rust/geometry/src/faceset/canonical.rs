// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loops reduced to canonical edges, duplicate and degenerate loop
//! detection, and edge usage tallies.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::weld::VertexMap;
use crate::taxonomy::{Loop, NodeId};

/// Undirected edge between two canonical vertices, smaller id first.
pub type CanonicalEdge = (usize, usize);

/// A canonical edge and whether the loop walks it from the smaller id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub edge: CanonicalEdge,
    pub forward: bool,
}

pub type Segments = SmallVec<[Segment; 8]>;

/// Walks a loop as canonical segments.
///
/// Loops with fewer than three edges yield nothing. Edges whose ends weld
/// into the same vertex are dropped. Each segment runs from the vertex of
/// the previous kept edge's start to the vertex of the current edge's
/// start, beginning with the start of the loop's last edge. A point missing
/// from `mapping` ends the walk with no segments.
pub fn segments(lp: &Loop, mapping: &VertexMap) -> Segments {
    let mut out = Segments::new();
    let Some(last) = lp.edges.last() else {
        return out;
    };
    if lp.edges.len() < 3 {
        return out;
    }
    let Some(&first) = mapping.get(&last.start.id) else {
        return out;
    };

    let mut a = first;
    for edge in &lp.edges {
        let Some(&b) = mapping.get(&edge.start.id) else {
            return Segments::new();
        };
        if a == b {
            continue;
        }
        let forward = a < b;
        let edge = if forward { (a, b) } else { (b, a) };
        out.push(Segment { edge, forward });
        a = b;
    }
    out
}

/// Per-pass outcome of canonicalizing every loop of a shell.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    /// Loops using each canonical edge.
    pub usage: BTreeMap<CanonicalEdge, usize>,
    /// Loops whose edge set repeats an earlier loop's.
    pub duplicates: FxHashSet<NodeId>,
    pub duplicate_faces: usize,
    /// Loops left with fewer than three segments after welding.
    pub degenerate_loops: usize,
}

impl Tally {
    /// Canonicalizes `loops` in order.
    ///
    /// The duplicate check runs before the degenerate check, so a loop that
    /// collapsed completely is a duplicate of any earlier collapsed loop.
    pub fn run<'a>(loops: impl IntoIterator<Item = &'a Loop>, mapping: &VertexMap) -> Self {
        let mut tally = Tally::default();
        let mut seen: BTreeSet<BTreeSet<CanonicalEdge>> = BTreeSet::new();

        for lp in loops {
            let segs = segments(lp, mapping);
            let edge_set: BTreeSet<CanonicalEdge> = segs.iter().map(|s| s.edge).collect();

            if seen.contains(&edge_set) {
                tally.duplicate_faces += 1;
                tally.duplicates.insert(lp.id);
                continue;
            }
            seen.insert(edge_set);

            if segs.len() >= 3 {
                for s in &segs {
                    *tally.usage.entry(s.edge).or_insert(0) += 1;
                }
            } else {
                tally.degenerate_loops += 1;
            }
        }
        tally
    }

    pub fn has_edges(&self) -> bool {
        !self.usage.is_empty()
    }

    /// Edges not used by exactly two loops.
    pub fn non_manifold_edges(&self) -> usize {
        self.usage.values().filter(|&&n| n != 2).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{IdAllocator, PointNode};

    fn identity_mapping(points: &[PointNode]) -> VertexMap {
        points.iter().enumerate().map(|(i, p)| (p.id, i)).collect()
    }

    fn grid(ids: &mut IdAllocator, n: usize) -> Vec<PointNode> {
        (0..n)
            .map(|i| PointNode::new(ids.allocate(), i as f64, (i * i) as f64, 0.0))
            .collect()
    }

    #[test]
    fn segments_start_from_last_edge() {
        let mut ids = IdAllocator::new();
        let points = grid(&mut ids, 3);
        let mapping = identity_mapping(&points);
        let lp = Loop::polygon(ids.allocate(), &points, true);

        let segs = segments(&lp, &mapping);
        let expected = [((0, 2), false), ((0, 1), true), ((1, 2), true)];
        assert_eq!(segs.len(), 3);
        for (s, (edge, forward)) in segs.iter().zip(expected) {
            assert_eq!(s.edge, edge);
            assert_eq!(s.forward, forward);
        }
    }

    #[test]
    fn collapsed_edges_are_skipped() {
        let mut ids = IdAllocator::new();
        let points = grid(&mut ids, 4);
        let mut mapping = identity_mapping(&points);
        mapping.insert(points[2].id, 1);
        let lp = Loop::polygon(ids.allocate(), &points, true);

        let segs = segments(&lp, &mapping);
        let edges: Vec<_> = segs.iter().map(|s| s.edge).collect();
        assert_eq!(edges, vec![(0, 3), (0, 1), (1, 3)]);
    }

    #[test]
    fn short_loops_yield_nothing() {
        let mut ids = IdAllocator::new();
        let points = grid(&mut ids, 2);
        let lp = Loop::polygon(ids.allocate(), &points, true);
        assert!(segments(&lp, &identity_mapping(&points)).is_empty());
    }

    #[test]
    fn unmapped_point_yields_nothing() {
        let mut ids = IdAllocator::new();
        let points = grid(&mut ids, 4);
        let mut mapping = identity_mapping(&points);
        mapping.remove(&points[1].id);
        let lp = Loop::polygon(ids.allocate(), &points, true);
        assert!(segments(&lp, &mapping).is_empty());
    }

    #[test]
    fn tally_counts_duplicates_and_degenerates() {
        let mut ids = IdAllocator::new();
        let points = grid(&mut ids, 4);
        let mapping = identity_mapping(&points);

        let tri = Loop::polygon(ids.allocate(), &points[..3], true);
        let mut reversed_points = points[..3].to_vec();
        reversed_points.reverse();
        let reversed = Loop::polygon(ids.allocate(), &reversed_points, false);
        let line = Loop::polygon(ids.allocate(), &points[2..], true);

        let tally = Tally::run([&tri, &reversed, &line], &mapping);
        assert_eq!(tally.duplicate_faces, 1);
        assert!(tally.duplicates.contains(&reversed.id));
        assert_eq!(tally.degenerate_loops, 1);
        assert_eq!(tally.usage.len(), 3);
        assert!(tally.usage.values().all(|&n| n == 1));
        assert_eq!(tally.non_manifold_edges(), 3);
    }
}
