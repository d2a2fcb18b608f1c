// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement of kernel entities.
//!
//! Transforms move vertex positions in place; everything built on those
//! vertices follows. Vertices shared with other entities move for them too.

use nalgebra::{Matrix4, Vector3};
use rustc_hash::FxHashSet;

use crate::arena::TopologyArena;
use crate::keys::*;

impl TopologyArena {
    pub fn translate(&mut self, key: TopologyKey, offset: &Vector3<f64>) {
        for vk in self.vertices_of(key) {
            if let Some(v) = self.vertices.get_mut(vk) {
                v.point += *offset;
            }
        }
    }

    /// Applies an affine 4x4 matrix to every vertex of an entity.
    pub fn transform(&mut self, key: TopologyKey, matrix: &Matrix4<f64>) {
        for vk in self.vertices_of(key) {
            if let Some(v) = self.vertices.get_mut(vk) {
                v.point = matrix.transform_point(&v.point);
            }
        }
    }

    /// All distinct vertices reachable from an entity.
    pub fn vertices_of(&self, key: TopologyKey) -> FxHashSet<VertexKey> {
        let mut set = FxHashSet::default();
        match key {
            TopologyKey::Vertex(vk) => {
                set.insert(vk);
            }
            TopologyKey::Edge(ek) => {
                if let Some((a, b)) = self.edge_vertices(ek) {
                    set.insert(a);
                    set.insert(b);
                }
            }
            TopologyKey::Wire(wk) => {
                for &ek in self.wire_edges(wk).unwrap_or_default() {
                    set.extend(self.vertices_of(TopologyKey::Edge(ek)));
                }
            }
            TopologyKey::Face(fk) => set.extend(self.face_vertices(fk).unwrap_or_default()),
            TopologyKey::Shell(sk) => set.extend(self.shell_vertices(sk).unwrap_or_default()),
            TopologyKey::Solid(sk) => {
                for shell in self.solid_shells(sk).unwrap_or_default() {
                    set.extend(self.vertices_of(TopologyKey::Shell(shell)));
                }
            }
            TopologyKey::CompSolid(ck) => {
                for &solid in self.comp_solid_solids(ck).unwrap_or_default() {
                    set.extend(self.vertices_of(TopologyKey::Solid(solid)));
                }
            }
        }
        set
    }
}
