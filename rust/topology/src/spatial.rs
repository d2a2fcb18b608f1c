// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial index for box queries over points.
//!
//! [`PointIndex`] is a balanced kd-tree stored implicitly in a flat vector:
//! the median of every index range is the splitting node, the left half holds
//! coordinates `<=` the median on the split axis and the right half `>=`.
//! Points inserted after the last rebuild sit in a small pending buffer that
//! is scanned linearly and folded into the tree once it grows.

use nalgebra::Point3;

use crate::bounds::Aabb;

/// Pending points tolerated before a rebuild, as a floor.
const MIN_PENDING: usize = 32;

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: usize,
    point: Point3<f64>,
}

/// A kd-tree of `(id, point)` pairs answering inclusive box queries.
#[derive(Debug, Default, Clone)]
pub struct PointIndex {
    tree: Vec<Entry>,
    pending: Vec<Entry>,
}

impl PointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a balanced index in one pass.
    pub fn from_points(points: impl IntoIterator<Item = (usize, Point3<f64>)>) -> Self {
        let mut tree: Vec<Entry> = points
            .into_iter()
            .map(|(id, point)| Entry { id, point })
            .collect();
        build(&mut tree, 0);
        Self {
            tree,
            pending: Vec::new(),
        }
    }

    pub fn insert(&mut self, id: usize, point: Point3<f64>) {
        self.pending.push(Entry { id, point });
        if self.pending.len() > MIN_PENDING.max(self.tree.len() / 8) {
            self.rebuild();
        }
    }

    /// Folds pending points into the balanced tree.
    pub fn rebuild(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.tree.append(&mut self.pending);
        build(&mut self.tree, 0);
    }

    pub fn len(&self) -> usize {
        self.tree.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the ids of all points inside `range`, bounds included.
    /// The order of the result is unspecified.
    pub fn query(&self, range: &Aabb) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .pending
            .iter()
            .filter(|e| range.contains(&e.point))
            .map(|e| e.id)
            .collect();

        if range.is_empty() || self.tree.is_empty() {
            return found;
        }

        let mut stack = vec![(0usize, self.tree.len(), 0usize)];
        while let Some((lo, hi, depth)) = stack.pop() {
            if lo >= hi {
                continue;
            }
            let mid = lo + (hi - lo) / 2;
            let axis = depth % 3;
            let node = &self.tree[mid];
            if range.contains(&node.point) {
                found.push(node.id);
            }
            let split = node.point[axis];
            if range.min[axis] <= split {
                stack.push((lo, mid, depth + 1));
            }
            if range.max[axis] >= split {
                stack.push((mid + 1, hi, depth + 1));
            }
        }
        found
    }
}

/// Arranges `entries` so every range's median splits it on `depth % 3`.
fn build(entries: &mut [Entry], depth: usize) {
    if entries.len() <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = entries.len() / 2;
    entries.select_nth_unstable_by(mid, |a, b| a.point[axis].total_cmp(&b.point[axis]));
    let (left, rest) = entries.split_at_mut(mid);
    build(left, depth + 1);
    build(&mut rest[1..], depth + 1);
}
