// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Navigation through the entity hierarchy.
//!
//! Downward traversal follows stored references (shell -> faces -> wires ->
//! edges -> vertices); upward traversal reads the adjacency index.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::TopologyArena;
use crate::keys::*;

// =============================================================================
// Downward traversal
// =============================================================================

impl TopologyArena {
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(key).map(|e| (e.start, e.end))
    }

    /// Returns the start vertex of every edge of a wire, in traversal order.
    pub fn wire_vertices_ordered(&self, key: WireKey) -> Option<Vec<VertexKey>> {
        let wire = self.wires.get(key)?;
        wire.edges
            .iter()
            .zip(&wire.orientations)
            .map(|(&ek, &forward)| {
                let edge = self.edges.get(ek)?;
                Some(if forward { edge.start } else { edge.end })
            })
            .collect()
    }

    pub fn wire_edges(&self, key: WireKey) -> Option<&[EdgeKey]> {
        self.wires.get(key).map(|w| w.edges.as_slice())
    }

    /// Returns the outer wire followed by the inner wires of a face.
    pub fn face_wires(&self, key: FaceKey) -> Option<Vec<WireKey>> {
        let face = self.faces.get(key)?;
        let mut wires = Vec::with_capacity(1 + face.inner_wires.len());
        wires.push(face.outer_wire);
        wires.extend_from_slice(&face.inner_wires);
        Some(wires)
    }

    pub fn face_edges(&self, key: FaceKey) -> Option<FxHashSet<EdgeKey>> {
        let mut set = FxHashSet::default();
        for wk in self.face_wires(key)? {
            set.extend(self.wire_edges(wk)?.iter().copied());
        }
        Some(set)
    }

    pub fn face_vertices(&self, key: FaceKey) -> Option<FxHashSet<VertexKey>> {
        let mut set = FxHashSet::default();
        for ek in self.face_edges(key)? {
            let (a, b) = self.edge_vertices(ek)?;
            set.insert(a);
            set.insert(b);
        }
        Some(set)
    }

    pub fn shell_faces(&self, key: ShellKey) -> Option<&[FaceKey]> {
        self.shells.get(key).map(|s| s.faces.as_slice())
    }

    pub fn shell_edges(&self, key: ShellKey) -> Option<FxHashSet<EdgeKey>> {
        Some(self.shell_edge_usage(key)?.into_keys().collect())
    }

    pub fn shell_vertices(&self, key: ShellKey) -> Option<FxHashSet<VertexKey>> {
        let mut set = FxHashSet::default();
        for &fk in self.shell_faces(key)? {
            set.extend(self.face_vertices(fk)?);
        }
        Some(set)
    }

    /// Returns every shell of a solid, outer first.
    pub fn solid_shells(&self, key: SolidKey) -> Option<Vec<ShellKey>> {
        let solid = self.solids.get(key)?;
        let mut shells = vec![solid.outer_shell];
        shells.extend_from_slice(&solid.inner_shells);
        Some(shells)
    }

    pub fn comp_solid_solids(&self, key: CompSolidKey) -> Option<&[SolidKey]> {
        self.comp_solid(key).map(|c| c.solids.as_slice())
    }

    // =========================================================================
    // Upward traversal
    // =========================================================================

    pub fn vertex_edges(&self, key: VertexKey) -> Vec<EdgeKey> {
        self.vertex_to_edges
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn edge_wires(&self, key: EdgeKey) -> Vec<WireKey> {
        self.edge_to_wires
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn wire_faces(&self, key: WireKey) -> Vec<FaceKey> {
        self.wire_to_faces
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn face_shells(&self, key: FaceKey) -> Vec<ShellKey> {
        self.face_to_shells
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn shell_solids(&self, key: ShellKey) -> Vec<SolidKey> {
        self.shell_to_solids
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Closure checks
    // =========================================================================

    /// Checks that a wire's last edge ends at its first edge's start.
    pub fn wire_is_closed(&self, key: WireKey) -> bool {
        let Some(wire) = self.wires.get(key) else {
            return false;
        };
        let (Some(&first), Some(&last)) = (wire.edges.first(), wire.edges.last()) else {
            return false;
        };
        let (Some(first_edge), Some(last_edge)) = (self.edges.get(first), self.edges.get(last))
        else {
            return false;
        };

        let first_start = if wire.orientations[0] {
            first_edge.start
        } else {
            first_edge.end
        };
        let last_end = if wire.orientations[wire.orientations.len() - 1] {
            last_edge.end
        } else {
            last_edge.start
        };
        first_start == last_end
    }

    /// Counts how many wire traversals of the shell's faces use each edge.
    pub fn shell_edge_usage(&self, key: ShellKey) -> Option<FxHashMap<EdgeKey, usize>> {
        let mut usage: FxHashMap<EdgeKey, usize> = FxHashMap::default();
        for &fk in self.shell_faces(key)? {
            for wk in self.face_wires(fk)? {
                for &ek in self.wire_edges(wk)? {
                    *usage.entry(ek).or_insert(0) += 1;
                }
            }
        }
        Some(usage)
    }

    /// Checks that every edge of the shell is used exactly twice.
    pub fn shell_is_closed(&self, key: ShellKey) -> bool {
        match self.shell_edge_usage(key) {
            Some(usage) => !usage.is_empty() && usage.values().all(|&c| c == 2),
            None => false,
        }
    }
}
