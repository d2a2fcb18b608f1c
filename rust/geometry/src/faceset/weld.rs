// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex welding: near-coincident points share a canonical vertex id.

use rustc_hash::{FxHashMap, FxHashSet};
use shellweld_topology::{Aabb, PointIndex};

use crate::taxonomy::{Loop, NodeId, PointNode};

/// Point node identity to canonical vertex id.
pub type VertexMap = FxHashMap<NodeId, usize>;

/// Every edge start point of `loops`, in loop order.
///
/// A point node referenced by several loops appears once per reference.
pub fn collect_points<'a>(loops: impl IntoIterator<Item = &'a Loop>) -> Vec<PointNode> {
    loops
        .into_iter()
        .flat_map(|l| l.points().copied())
        .collect()
}

/// Index over `points`, keyed by position in the slice.
pub fn index_points(points: &[PointNode]) -> PointIndex {
    PointIndex::from_points(points.iter().enumerate().map(|(i, p)| (i, p.point())))
}

/// Assigns every point node a canonical vertex id.
///
/// Points are visited in order. Each one claims, under its own position as
/// id, every point within `eps` of it on each axis (itself included). A
/// node keeps the first id it is given, so earlier points win ties.
///
/// Neighbourhoods are not merged transitively: with `a` near `b` and `b`
/// near `c` but `a` far from `c`, `c` only joins `a`'s cluster when `b`
/// claims it before anything else does. Results therefore depend on input
/// order, and dense chains of points do not collapse into a single vertex.
pub fn weld(index: &PointIndex, points: &[PointNode], eps: f64) -> VertexMap {
    let mut mapping = VertexMap::default();
    for (i, p) in points.iter().enumerate() {
        let range = Aabb::from_point(p.point()).enlarged(eps);
        for j in index.query(&range).into_iter().chain(std::iter::once(i)) {
            mapping.entry(points[j].id).or_insert(i);
        }
    }
    mapping
}

/// Point counts before and after welding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeldReport {
    /// Point references across all loops.
    pub points: usize,
    /// Distinct coordinate triples.
    pub unique: usize,
    /// Distinct canonical vertices.
    pub canonical: usize,
}

impl WeldReport {
    pub fn new(points: &[PointNode], mapping: &VertexMap) -> Self {
        let unique: FxHashSet<[u64; 3]> = points
            .iter()
            .map(|p| p.coords.map(f64::to_bits))
            .collect();
        let canonical: FxHashSet<usize> = mapping.values().copied().collect();
        Self {
            points: points.len(),
            unique: unique.len(),
            canonical: canonical.len(),
        }
    }

    pub fn collapsed(&self) -> bool {
        self.canonical != self.unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::IdAllocator;

    fn nodes(coords: &[(f64, f64, f64)]) -> Vec<PointNode> {
        let mut ids = IdAllocator::new();
        coords
            .iter()
            .map(|&(x, y, z)| PointNode::new(ids.allocate(), x, y, z))
            .collect()
    }

    fn weld_all(points: &[PointNode], eps: f64) -> VertexMap {
        weld(&index_points(points), points, eps)
    }

    #[test]
    fn near_points_share_first_id() {
        let points = nodes(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1e-6, 0.0, 0.0)]);
        let mapping = weld_all(&points, 1e-4);

        assert_eq!(mapping[&points[0].id], 0);
        assert_eq!(mapping[&points[1].id], 1);
        assert_eq!(mapping[&points[2].id], 0);
    }

    #[test]
    fn chains_are_not_merged_transitively() {
        // a-b and b-c are within eps, a-c is not.
        let points = nodes(&[(0.0, 0.0, 0.0), (0.6, 0.0, 0.0), (1.2, 0.0, 0.0)]);
        let mapping = weld_all(&points, 1.0);
        assert_eq!(mapping[&points[0].id], 0);
        assert_eq!(mapping[&points[1].id], 0);
        assert_eq!(mapping[&points[2].id], 1);

        // Starting from the middle point pulls both ends in.
        let reordered = vec![points[1], points[0], points[2]];
        let mapping = weld_all(&reordered, 1.0);
        assert!(points.iter().all(|p| mapping[&p.id] == 0));
    }

    #[test]
    fn repeated_node_is_mapped_once() {
        let mut points = nodes(&[(0.0, 0.0, 0.0), (5.0, 0.0, 0.0)]);
        points.push(points[0]);
        let mapping = weld_all(&points, 1e-3);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&points[0].id], 0);
    }

    #[test]
    fn report_counts() {
        let mut points = nodes(&[(0.0, 0.0, 0.0), (1e-6, 0.0, 0.0), (1.0, 0.0, 0.0)]);
        points.push(points[2]);
        let mapping = weld_all(&points, 1e-4);
        let report = WeldReport::new(&points, &mapping);

        assert_eq!(report.points, 4);
        assert_eq!(report.unique, 3);
        assert_eq!(report.canonical, 2);
        assert!(report.collapsed());
    }

    #[test]
    fn box_query_is_per_axis() {
        // Diagonal offset of eps on every axis is still inside the box.
        let points = nodes(&[(0.0, 0.0, 0.0), (0.5, 0.5, 0.5)]);
        let mapping = weld_all(&points, 0.5);
        assert_eq!(mapping[&points[1].id], 0);
    }
}
