// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linear sweep of planar faces into prisms.

use nalgebra::Vector3;
use rustc_hash::FxHashMap;

use crate::arena::{TopologyArena, CONFUSION};
use crate::construction::WireBuilder;
use crate::error::{Error, Result};
use crate::keys::*;

/// An edge together with the direction it is walked in.
type Oriented = (EdgeKey, bool);

impl TopologyArena {
    /// Sweeps a planar face (holes included) along `vector` into a closed
    /// solid with outward facing faces.
    ///
    /// The source face is left untouched; the bottom of the prism reuses its
    /// edges in a new wire.
    pub fn make_prism(&mut self, face: FaceKey, vector: &Vector3<f64>) -> Result<SolidKey> {
        let length = vector.norm();
        if length < CONFUSION {
            return Err(Error::DegenerateSweep(length));
        }
        let normal = self.face_normal(face).ok_or(Error::DegenerateFace)?;
        let upward = normal.dot(vector) > 0.0;
        let wires = self.face_wires(face).ok_or(Error::FaceNotFound(face))?;

        let mut top_vertex: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        let mut top_edge: FxHashMap<EdgeKey, EdgeKey> = FxHashMap::default();
        let mut rising_edge: FxHashMap<VertexKey, EdgeKey> = FxHashMap::default();

        let mut bottom_wires = Vec::with_capacity(wires.len());
        let mut top_wires = Vec::with_capacity(wires.len());
        let mut sides = Vec::new();

        for (index, &wire) in wires.iter().enumerate() {
            let ring = self.counter_clockwise_ring(wire, &normal, index == 0)?;

            for &(ek, _) in &ring {
                let (a, b) = self.edge_vertices(ek).ok_or(Error::EdgeNotFound(ek))?;
                for v in [a, b] {
                    if !top_vertex.contains_key(&v) {
                        let p = self.vertex_point(v).ok_or(Error::VertexNotFound(v))?;
                        let tolerance = self.vertices[v].tolerance;
                        let t = self.make_vertex(p + vector, tolerance);
                        top_vertex.insert(v, t);
                        rising_edge.insert(v, self.add_edge(v, t)?);
                    }
                }
                top_edge.insert(ek, self.add_edge(top_vertex[&a], top_vertex[&b])?);
            }

            let bottom_order: Vec<Oriented> = if upward {
                ring.iter().rev().map(|&(ek, fwd)| (ek, !fwd)).collect()
            } else {
                ring.clone()
            };
            let mut bottom = WireBuilder::new();
            for &(ek, fwd) in &bottom_order {
                bottom.push(ek, fwd);
            }
            // The top ring runs opposite to the bottom ring.
            let mut top = WireBuilder::new();
            for &(ek, fwd) in bottom_order.iter().rev() {
                top.push(top_edge[&ek], !fwd);
            }
            bottom_wires.push(bottom.build_closed(self)?);
            top_wires.push(top.build_closed(self)?);

            for &(ek, fwd) in &ring {
                let (start, end) = {
                    let e = &self.edges[ek];
                    if fwd {
                        (e.start, e.end)
                    } else {
                        (e.end, e.start)
                    }
                };
                // Walking the ring counter-clockwise, the quad a, b, b', a'
                // faces away from the material when sweeping upward.
                let (a, b, along) = if upward {
                    (start, end, fwd)
                } else {
                    (end, start, !fwd)
                };
                let mut quad = WireBuilder::new();
                quad.push(ek, along);
                quad.push(rising_edge[&b], true);
                quad.push(top_edge[&ek], !along);
                quad.push(rising_edge[&a], false);
                sides.push(quad.build_closed(self)?);
            }
        }

        let mut faces = Vec::with_capacity(2 + sides.len());
        faces.push(self.add_face_with_holes(bottom_wires[0], &bottom_wires[1..])?);
        faces.push(self.add_face_with_holes(top_wires[0], &top_wires[1..])?);
        for quad in sides {
            faces.push(self.add_face(quad)?);
        }
        let shell = self.add_shell(&faces, true)?;
        self.add_solid(shell)
    }

    /// The oriented edges of a face ring, walked counter-clockwise around
    /// `normal` for the outer ring and clockwise for holes.
    fn counter_clockwise_ring(
        &self,
        wire: WireKey,
        normal: &Vector3<f64>,
        outer: bool,
    ) -> Result<Vec<Oriented>> {
        let data = self.wires.get(wire).ok_or(Error::WireNotFound(wire))?;
        let ring: Vec<Oriented> = data
            .edges
            .iter()
            .copied()
            .zip(data.orientations.iter().copied())
            .collect();
        let ring_ccw = self
            .wire_normal(wire)
            .map(|n| n.dot(normal) > 0.0)
            .unwrap_or(outer);
        if ring_ccw == outer {
            Ok(ring)
        } else {
            Ok(ring.into_iter().rev().map(|(ek, fwd)| (ek, !fwd)).collect())
        }
    }
}
