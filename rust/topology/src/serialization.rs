// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON export and import of the arena.
//!
//! Slot-map keys are replaced by sequential indices so a snapshot can be
//! read by consumers that know nothing about the arena.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::Key;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

/// Serializable image of a whole arena.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub vertices: Vec<VertexSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub wires: Vec<WireSnapshot>,
    pub faces: Vec<FaceSnapshot>,
    pub shells: Vec<ShellSnapshot>,
    pub solids: Vec<SolidSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comp_solids: Vec<CompSolidSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub tolerance: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub id: usize,
    pub edges: Vec<usize>,
    pub orientations: Vec<bool>,
    pub closed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub id: usize,
    pub outer_wire: usize,
    pub inner_wires: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShellSnapshot {
    pub id: usize,
    pub faces: Vec<usize>,
    pub closed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SolidSnapshot {
    pub id: usize,
    pub outer_shell: usize,
    pub inner_shells: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompSolidSnapshot {
    pub id: usize,
    pub solids: Vec<usize>,
}

/// Sequential ids in slot-map iteration order.
fn sequential_ids<K: Key, V>(map: &slotmap::SlotMap<K, V>) -> FxHashMap<K, usize> {
    map.keys().enumerate().map(|(i, k)| (k, i)).collect()
}

fn resolve<K: Copy>(keys: &[K], id: usize) -> Result<K> {
    keys.get(id)
        .copied()
        .ok_or_else(|| Error::Serialization(format!("dangling reference to id {id}")))
}

fn resolve_all<K: Copy>(keys: &[K], ids: &[usize]) -> Result<Vec<K>> {
    ids.iter().map(|&id| resolve(keys, id)).collect()
}

impl TopologyArena {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn to_snapshot(&self) -> ArenaSnapshot {
        let vertex_ids = sequential_ids(&self.vertices);
        let edge_ids = sequential_ids(&self.edges);
        let wire_ids = sequential_ids(&self.wires);
        let face_ids = sequential_ids(&self.faces);
        let shell_ids = sequential_ids(&self.shells);
        let solid_ids = sequential_ids(&self.solids);

        ArenaSnapshot {
            vertices: self
                .vertices
                .values()
                .enumerate()
                .map(|(id, v)| VertexSnapshot {
                    id,
                    x: v.point.x,
                    y: v.point.y,
                    z: v.point.z,
                    tolerance: v.tolerance,
                })
                .collect(),
            edges: self
                .edges
                .values()
                .enumerate()
                .map(|(id, e)| EdgeSnapshot {
                    id,
                    start: vertex_ids[&e.start],
                    end: vertex_ids[&e.end],
                })
                .collect(),
            wires: self
                .wires
                .values()
                .enumerate()
                .map(|(id, w)| WireSnapshot {
                    id,
                    edges: w.edges.iter().map(|ek| edge_ids[ek]).collect(),
                    orientations: w.orientations.clone(),
                    closed: w.closed,
                })
                .collect(),
            faces: self
                .faces
                .values()
                .enumerate()
                .map(|(id, f)| FaceSnapshot {
                    id,
                    outer_wire: wire_ids[&f.outer_wire],
                    inner_wires: f.inner_wires.iter().map(|wk| wire_ids[wk]).collect(),
                })
                .collect(),
            shells: self
                .shells
                .values()
                .enumerate()
                .map(|(id, s)| ShellSnapshot {
                    id,
                    faces: s.faces.iter().map(|fk| face_ids[fk]).collect(),
                    closed: s.closed,
                })
                .collect(),
            solids: self
                .solids
                .values()
                .enumerate()
                .map(|(id, s)| SolidSnapshot {
                    id,
                    outer_shell: shell_ids[&s.outer_shell],
                    inner_shells: s.inner_shells.iter().map(|sk| shell_ids[sk]).collect(),
                })
                .collect(),
            comp_solids: self
                .comp_solids
                .values()
                .enumerate()
                .map(|(id, c)| CompSolidSnapshot {
                    id,
                    solids: c.solids.iter().map(|sk| solid_ids[sk]).collect(),
                })
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ArenaSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Rebuilds an arena, validating every reference through the regular
    /// construction methods.
    pub fn from_snapshot(snap: &ArenaSnapshot) -> Result<Self> {
        let mut arena = TopologyArena::new();

        let vertices: Vec<VertexKey> = snap
            .vertices
            .iter()
            .map(|v| arena.make_vertex(nalgebra::Point3::new(v.x, v.y, v.z), v.tolerance))
            .collect();

        let mut edges = Vec::with_capacity(snap.edges.len());
        for e in &snap.edges {
            edges.push(arena.add_edge(resolve(&vertices, e.start)?, resolve(&vertices, e.end)?)?);
        }

        let mut wires = Vec::with_capacity(snap.wires.len());
        for w in &snap.wires {
            let wire_edges = resolve_all(&edges, &w.edges)?;
            wires.push(arena.add_oriented_wire(&wire_edges, &w.orientations, w.closed)?);
        }

        let mut faces = Vec::with_capacity(snap.faces.len());
        for f in &snap.faces {
            let inner = resolve_all(&wires, &f.inner_wires)?;
            faces.push(arena.add_face_with_holes(resolve(&wires, f.outer_wire)?, &inner)?);
        }

        let mut shells = Vec::with_capacity(snap.shells.len());
        for s in &snap.shells {
            shells.push(arena.add_shell(&resolve_all(&faces, &s.faces)?, s.closed)?);
        }

        let mut solids = Vec::with_capacity(snap.solids.len());
        for s in &snap.solids {
            let inner = resolve_all(&shells, &s.inner_shells)?;
            solids.push(arena.add_solid_with_voids(resolve(&shells, s.outer_shell)?, &inner)?);
        }

        for c in &snap.comp_solids {
            arena.add_comp_solid(&resolve_all(&solids, &c.solids)?)?;
        }

        Ok(arena)
    }
}
