// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for kernel entities.
//!
//! Every entity is created through the arena, which checks that referenced
//! sub-entities exist and maintains the upward adjacency index.

use nalgebra::Point3;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl TopologyArena {
    /// Adds a vertex with the kernel's default tolerance.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.make_vertex(Point3::new(x, y, z), CONFUSION)
    }

    /// Adds a vertex with an explicit tolerance radius, never below [`CONFUSION`].
    pub fn make_vertex(&mut self, point: Point3<f64>, tolerance: f64) -> VertexKey {
        self.vertices.insert(VertexData {
            point,
            tolerance: tolerance.max(CONFUSION),
        })
    }

    /// Creates an edge between two existing vertices.
    pub fn add_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        if !self.vertices.contains_key(start) {
            return Err(Error::VertexNotFound(start));
        }
        if !self.vertices.contains_key(end) {
            return Err(Error::VertexNotFound(end));
        }

        let key = self.edges.insert(EdgeData { start, end });
        self.link_vertex_edge(start, key);
        self.link_vertex_edge(end, key);
        Ok(key)
    }

    /// Creates a wire from an ordered list of edges, inferring each edge's
    /// orientation from its connectivity with the previous one.
    ///
    /// The wire is marked closed when its last edge ends where the first
    /// one starts.
    pub fn add_wire(&mut self, edge_keys: &[EdgeKey]) -> Result<WireKey> {
        if edge_keys.is_empty() {
            return Err(Error::EmptyWire);
        }
        for &ek in edge_keys {
            if !self.edges.contains_key(ek) {
                return Err(Error::EdgeNotFound(ek));
            }
        }

        let mut orientations = Vec::with_capacity(edge_keys.len());
        if edge_keys.len() == 1 {
            orientations.push(true);
        } else {
            let first = &self.edges[edge_keys[0]];
            let second = &self.edges[edge_keys[1]];
            if first.end == second.start || first.end == second.end {
                orientations.push(true);
            } else if first.start == second.start || first.start == second.end {
                orientations.push(false);
            } else {
                return Err(Error::DisconnectedWire(0, 1));
            }

            for i in 1..edge_keys.len() {
                let prev = &self.edges[edge_keys[i - 1]];
                let curr = &self.edges[edge_keys[i]];
                let prev_end = if orientations[i - 1] { prev.end } else { prev.start };

                if prev_end == curr.start {
                    orientations.push(true);
                } else if prev_end == curr.end {
                    orientations.push(false);
                } else {
                    return Err(Error::DisconnectedWire(i - 1, i));
                }
            }
        }

        let closed = edge_keys.len() > 1 && {
            let first = &self.edges[edge_keys[0]];
            let last = &self.edges[edge_keys[edge_keys.len() - 1]];
            let first_start = if orientations[0] { first.start } else { first.end };
            let last_end = if orientations[orientations.len() - 1] {
                last.end
            } else {
                last.start
            };
            first_start == last_end
        };

        Ok(self.insert_wire(edge_keys.to_vec(), orientations, closed))
    }

    /// Creates a wire with explicit per-edge orientations.
    ///
    /// Consecutive oriented edges must share a vertex. When `closed` is set
    /// the chain must also return to its first vertex.
    pub fn add_oriented_wire(
        &mut self,
        edge_keys: &[EdgeKey],
        orientations: &[bool],
        closed: bool,
    ) -> Result<WireKey> {
        if edge_keys.is_empty() {
            return Err(Error::EmptyWire);
        }
        if edge_keys.len() != orientations.len() {
            return Err(Error::OrientationMismatch {
                edges: edge_keys.len(),
                orientations: orientations.len(),
            });
        }

        let mut ends = Vec::with_capacity(edge_keys.len());
        for (&ek, &forward) in edge_keys.iter().zip(orientations) {
            let edge = self.edges.get(ek).ok_or(Error::EdgeNotFound(ek))?;
            ends.push(if forward {
                (edge.start, edge.end)
            } else {
                (edge.end, edge.start)
            });
        }

        for i in 1..ends.len() {
            if ends[i - 1].1 != ends[i].0 {
                return Err(Error::DisconnectedWire(i - 1, i));
            }
        }
        if closed && ends[ends.len() - 1].1 != ends[0].0 {
            return Err(Error::NotClosed);
        }

        Ok(self.insert_wire(edge_keys.to_vec(), orientations.to_vec(), closed))
    }

    fn insert_wire(&mut self, edges: Vec<EdgeKey>, orientations: Vec<bool>, closed: bool) -> WireKey {
        let key = self.wires.insert(WireData {
            edges,
            orientations,
            closed,
        });
        let edges = self.wires[key].edges.clone();
        for ek in edges {
            self.link_edge_wire(ek, key);
        }
        key
    }

    /// Creates a face from an outer boundary wire of at least 3 edges.
    pub fn add_face(&mut self, outer_wire: WireKey) -> Result<FaceKey> {
        self.add_face_with_holes(outer_wire, &[])
    }

    /// Creates a face with an outer boundary and inner boundary wires (holes).
    pub fn add_face_with_holes(
        &mut self,
        outer_wire: WireKey,
        inner_wires: &[WireKey],
    ) -> Result<FaceKey> {
        let wire = self
            .wires
            .get(outer_wire)
            .ok_or(Error::WireNotFound(outer_wire))?;
        if wire.edges.len() < 3 {
            return Err(Error::DegenerateFace);
        }
        for &iw in inner_wires {
            if !self.wires.contains_key(iw) {
                return Err(Error::WireNotFound(iw));
            }
        }

        let key = self.faces.insert(FaceData {
            outer_wire,
            inner_wires: inner_wires.to_vec(),
        });
        self.link_wire_face(outer_wire, key);
        for &iw in inner_wires {
            self.link_wire_face(iw, key);
        }
        Ok(key)
    }

    /// Creates a shell from a list of faces.
    ///
    /// `closed` is advisory and recorded as given; use
    /// [`TopologyArena::shell_is_closed`] to check the actual edge usage.
    pub fn add_shell(&mut self, face_keys: &[FaceKey], closed: bool) -> Result<ShellKey> {
        if face_keys.is_empty() {
            return Err(Error::EmptyShell);
        }
        for &fk in face_keys {
            if !self.faces.contains_key(fk) {
                return Err(Error::FaceNotFound(fk));
            }
        }

        let key = self.shells.insert(ShellData {
            faces: face_keys.to_vec(),
            closed,
        });
        for &fk in face_keys {
            self.link_face_shell(fk, key);
        }
        Ok(key)
    }

    pub fn add_solid(&mut self, outer_shell: ShellKey) -> Result<SolidKey> {
        self.add_solid_with_voids(outer_shell, &[])
    }

    /// Creates a solid with an outer shell and inner void shells.
    pub fn add_solid_with_voids(
        &mut self,
        outer_shell: ShellKey,
        inner_shells: &[ShellKey],
    ) -> Result<SolidKey> {
        if !self.shells.contains_key(outer_shell) {
            return Err(Error::ShellNotFound(outer_shell));
        }
        for &is in inner_shells {
            if !self.shells.contains_key(is) {
                return Err(Error::ShellNotFound(is));
            }
        }

        let key = self.solids.insert(SolidData {
            outer_shell,
            inner_shells: inner_shells.to_vec(),
        });
        self.link_shell_solid(outer_shell, key);
        for &is in inner_shells {
            self.link_shell_solid(is, key);
        }
        Ok(key)
    }

    pub fn add_comp_solid(&mut self, solid_keys: &[SolidKey]) -> Result<CompSolidKey> {
        if solid_keys.is_empty() {
            return Err(Error::EmptyCompSolid);
        }
        for &sk in solid_keys {
            if !self.solids.contains_key(sk) {
                return Err(Error::SolidNotFound(sk));
            }
        }
        Ok(self.comp_solids.insert(CompSolidData {
            solids: solid_keys.to_vec(),
        }))
    }
}

/// Accumulates oriented edges into a wire.
///
/// ```
/// use shellweld_topology::{TopologyArena, WireBuilder};
///
/// let mut arena = TopologyArena::new();
/// let a = arena.add_vertex(0.0, 0.0, 0.0);
/// let b = arena.add_vertex(1.0, 0.0, 0.0);
/// let c = arena.add_vertex(0.0, 1.0, 0.0);
/// let ab = arena.add_edge(a, b).unwrap();
/// let bc = arena.add_edge(b, c).unwrap();
/// let ac = arena.add_edge(a, c).unwrap();
///
/// let mut builder = WireBuilder::new();
/// builder.push(ab, true);
/// builder.push(bc, true);
/// builder.push(ac, false);
/// let wire = builder.build_closed(&mut arena).unwrap();
/// assert!(arena.wire_is_closed(wire));
/// ```
#[derive(Debug, Default, Clone)]
pub struct WireBuilder {
    edges: Vec<EdgeKey>,
    orientations: Vec<bool>,
}

impl WireBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an edge, reversed when `forward` is false.
    pub fn push(&mut self, edge: EdgeKey, forward: bool) {
        self.edges.push(edge);
        self.orientations.push(forward);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn build(self, arena: &mut TopologyArena) -> Result<WireKey> {
        arena.add_oriented_wire(&self.edges, &self.orientations, false)
    }

    pub fn build_closed(self, arena: &mut TopologyArena) -> Result<WireKey> {
        arena.add_oriented_wire(&self.edges, &self.orientations, true)
    }
}

/// Builds a closed polygonal wire through the given points, one new vertex
/// per point.
pub fn make_polygon(arena: &mut TopologyArena, points: &[Point3<f64>]) -> Result<WireKey> {
    if points.len() < 2 {
        return Err(Error::EmptyWire);
    }
    let vertices: Vec<VertexKey> = points
        .iter()
        .map(|p| arena.make_vertex(*p, CONFUSION))
        .collect();
    let mut builder = WireBuilder::new();
    for i in 0..vertices.len() {
        let edge = arena.add_edge(vertices[i], vertices[(i + 1) % vertices.len()])?;
        builder.push(edge, true);
    }
    builder.build_closed(arena)
}
