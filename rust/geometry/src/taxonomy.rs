// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intermediate geometry tree handed from the mappings to the kernel.
//!
//! Every node carries a [`NodeId`] naming the source entity it was mapped
//! from. Point identities matter beyond traceability: the welder keys its
//! canonical vertex map on them, so two loops referencing the same point
//! node always agree on its canonical vertex.

use nalgebra::{Matrix4, Point3, Vector3};

/// Identity of the source entity a node was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh node ids for mapped entities that have none.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Continue after ids already in use.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A cartesian point together with the node it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointNode {
    pub id: NodeId,
    pub coords: [f64; 3],
}

impl PointNode {
    pub fn new(id: NodeId, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            coords: [x, y, z],
        }
    }

    #[inline]
    pub fn point(&self) -> Point3<f64> {
        Point3::new(self.coords[0], self.coords[1], self.coords[2])
    }
}

/// A straight segment of a loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub start: PointNode,
    pub end: PointNode,
}

impl Edge {
    pub fn new(start: PointNode, end: PointNode) -> Self {
        Self { start, end }
    }
}

/// Ordered, cyclic boundary of a face.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loop {
    pub id: NodeId,
    pub edges: Vec<Edge>,
    /// Outer boundary rather than a hole.
    #[cfg_attr(feature = "serde", serde(default))]
    pub external: bool,
}

impl Loop {
    /// Closed polygon through `points`, last point connected back to the first.
    pub fn polygon(id: NodeId, points: &[PointNode], external: bool) -> Self {
        let edges = (0..points.len())
            .map(|i| Edge::new(points[i], points[(i + 1) % points.len()]))
            .collect();
        Self {
            id,
            edges,
            external,
        }
    }

    /// Start points of the edges, in loop order.
    pub fn points(&self) -> impl Iterator<Item = &PointNode> + '_ {
        self.edges.iter().map(|e| &e.start)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// A planar face: one outer loop and any number of holes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face {
    pub id: NodeId,
    pub loops: Vec<Loop>,
}

impl Face {
    pub fn new(id: NodeId, loops: Vec<Loop>) -> Self {
        Self { id, loops }
    }

    /// The loop flagged external, or the first loop when none is.
    pub fn outer(&self) -> Option<&Loop> {
        self.loops
            .iter()
            .find(|l| l.external)
            .or_else(|| self.loops.first())
    }

    /// Every loop except [`Face::outer`].
    pub fn inner(&self) -> impl Iterator<Item = &Loop> + '_ {
        let outer = self.outer().map(|l| l.id);
        self.loops.iter().filter(move |l| Some(l.id) != outer)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shell {
    pub id: NodeId,
    pub faces: Vec<Face>,
    /// Advisory: the source claims the shell bounds a volume.
    #[cfg_attr(feature = "serde", serde(default))]
    pub closed: bool,
}

impl Shell {
    pub fn loops(&self) -> impl Iterator<Item = &Loop> + '_ {
        self.faces.iter().flat_map(|f| f.loops.iter())
    }
}

/// Linear extrusion of one or more planar faces.
///
/// Several basis faces (a composite profile) become a compound solid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extrusion {
    pub id: NodeId,
    pub basis: Vec<Face>,
    pub direction: [f64; 3],
    pub depth: f64,
    /// Column-major 4x4 placement applied to the swept solid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub placement: Option<[f64; 16]>,
}

impl Extrusion {
    /// Unit direction scaled by the depth.
    pub fn sweep_vector(&self) -> Vector3<f64> {
        let direction = Vector3::new(self.direction[0], self.direction[1], self.direction[2]);
        match direction.try_normalize(0.0) {
            Some(unit) => unit * self.depth,
            None => Vector3::zeros(),
        }
    }

    pub fn matrix(&self) -> Option<Matrix4<f64>> {
        self.placement.map(|m| Matrix4::from_column_slice(&m))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collection {
    pub id: NodeId,
    pub children: Vec<Item>,
}

/// Closed set of convertible items.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Item {
    Shell(Shell),
    Face(Face),
    Loop(Loop),
    Extrusion(Extrusion),
    Collection(Collection),
}

impl Item {
    pub fn id(&self) -> NodeId {
        match self {
            Item::Shell(s) => s.id,
            Item::Face(f) => f.id,
            Item::Loop(l) => l.id,
            Item::Extrusion(e) => e.id,
            Item::Collection(c) => c.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Item::Shell(_) => "shell",
            Item::Face(_) => "face",
            Item::Loop(_) => "loop",
            Item::Extrusion(_) => "extrusion",
            Item::Collection(_) => "collection",
        }
    }

    /// Curves are loops; everything else is body geometry.
    pub fn is_curve(&self) -> bool {
        matches!(self, Item::Loop(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(ids: &mut IdAllocator) -> Vec<PointNode> {
        [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| PointNode::new(ids.allocate(), x, y, 0.0))
            .collect()
    }

    #[test]
    fn polygon_loop_is_cyclic() {
        let mut ids = IdAllocator::new();
        let points = square(&mut ids);
        let lp = Loop::polygon(ids.allocate(), &points, true);

        assert_eq!(lp.len(), 4);
        assert_eq!(lp.edges[3].end, points[0]);
        let starts: Vec<_> = lp.points().map(|p| p.id).collect();
        assert_eq!(starts, points.iter().map(|p| p.id).collect::<Vec<_>>());
    }

    #[test]
    fn outer_loop_prefers_external_flag() {
        let mut ids = IdAllocator::new();
        let points = square(&mut ids);
        let hole = Loop::polygon(ids.allocate(), &points, false);
        let outer = Loop::polygon(ids.allocate(), &points, true);
        let face = Face::new(ids.allocate(), vec![hole.clone(), outer.clone()]);

        assert_eq!(face.outer().map(|l| l.id), Some(outer.id));
        let inner: Vec<_> = face.inner().map(|l| l.id).collect();
        assert_eq!(inner, vec![hole.id]);
    }

    #[test]
    fn sweep_vector_normalizes_direction() {
        let extrusion = Extrusion {
            id: NodeId(1),
            basis: Vec::new(),
            direction: [0.0, 0.0, 2.0],
            depth: 3.0,
            placement: None,
        };
        assert_eq!(extrusion.sweep_vector(), Vector3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn allocator_is_sequential() {
        let mut ids = IdAllocator::starting_at(10);
        assert_eq!(ids.allocate(), NodeId(10));
        assert_eq!(ids.allocate(), NodeId(11));
        assert_eq!(NodeId(11).to_string(), "#11");
    }
}
