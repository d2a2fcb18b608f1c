// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for kernel entities.
//!
//! The [`TopologyArena`] owns every vertex, edge, wire, face, shell, solid
//! and compound solid, stored in slot maps with stable generational keys.
//! Upward adjacency indices (vertex to edges, edge to wires, ...) let callers
//! ask which higher entities use a given one.
//!
//! Edges are undirected storage: a wire records, per edge, whether it is
//! traversed start to end (`true`) or reversed (`false`). A "reversed edge"
//! is therefore never a separate entity, only an orientation flag.

use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::keys::*;

/// Smallest distance the kernel's predicates treat as meaningful.
pub const CONFUSION: f64 = 1e-7;

/// A point in 3D space with its own tolerance radius.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub point: Point3<f64>,
    pub tolerance: f64,
}

/// A straight segment between two vertices.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

/// An ordered chain of edges.
#[derive(Debug, Clone)]
pub struct WireData {
    pub edges: Vec<EdgeKey>,
    /// `true` if `edges[i]` is traversed start to end.
    pub orientations: Vec<bool>,
    pub closed: bool,
}

/// A planar region bounded by one outer wire and zero or more holes.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer_wire: WireKey,
    pub inner_wires: Vec<WireKey>,
}

/// A set of faces, optionally flagged as closed.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub faces: Vec<FaceKey>,
    pub closed: bool,
}

/// A volume bounded by an outer shell with optional void shells.
#[derive(Debug, Clone)]
pub struct SolidData {
    pub outer_shell: ShellKey,
    pub inner_shells: Vec<ShellKey>,
}

/// A compound of solids, e.g. one prism per face of a compound profile.
#[derive(Debug, Clone)]
pub struct CompSolidData {
    pub solids: Vec<SolidKey>,
}

/// The arena that owns all kernel entities and their adjacency indices.
///
/// # Example
///
/// ```
/// use shellweld_topology::TopologyArena;
///
/// let mut arena = TopologyArena::new();
/// let v0 = arena.add_vertex(0.0, 0.0, 0.0);
/// let v1 = arena.add_vertex(1.0, 0.0, 0.0);
/// arena.add_edge(v0, v1).unwrap();
///
/// assert_eq!(arena.vertex_count(), 2);
/// assert_eq!(arena.edge_count(), 1);
/// ```
#[derive(Debug)]
pub struct TopologyArena {
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) wires: SlotMap<WireKey, WireData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) shells: SlotMap<ShellKey, ShellData>,
    pub(crate) solids: SlotMap<SolidKey, SolidData>,
    pub(crate) comp_solids: SlotMap<CompSolidKey, CompSolidData>,

    // Upward adjacency: child -> parents
    pub(crate) vertex_to_edges: FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
    pub(crate) edge_to_wires: FxHashMap<EdgeKey, FxHashSet<WireKey>>,
    pub(crate) wire_to_faces: FxHashMap<WireKey, FxHashSet<FaceKey>>,
    pub(crate) face_to_shells: FxHashMap<FaceKey, FxHashSet<ShellKey>>,
    pub(crate) shell_to_solids: FxHashMap<ShellKey, FxHashSet<SolidKey>>,
}

impl TopologyArena {
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            wires: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            shells: SlotMap::with_key(),
            solids: SlotMap::with_key(),
            comp_solids: SlotMap::with_key(),

            vertex_to_edges: FxHashMap::default(),
            edge_to_wires: FxHashMap::default(),
            wire_to_faces: FxHashMap::default(),
            face_to_shells: FxHashMap::default(),
            shell_to_solids: FxHashMap::default(),
        }
    }

    // --- Vertex operations ---

    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the coordinates of a vertex as `[x, y, z]`.
    pub fn vertex_coords(&self, key: VertexKey) -> Option<[f64; 3]> {
        self.vertices
            .get(key)
            .map(|v| [v.point.x, v.point.y, v.point.z])
    }

    // --- Edge operations ---

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // --- Wire operations ---

    pub fn wire(&self, key: WireKey) -> Option<&WireData> {
        self.wires.get(key)
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    // --- Face operations ---

    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Shell operations ---

    pub fn shell(&self, key: ShellKey) -> Option<&ShellData> {
        self.shells.get(key)
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    // --- Solid operations ---

    pub fn solid(&self, key: SolidKey) -> Option<&SolidData> {
        self.solids.get(key)
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn comp_solid(&self, key: CompSolidKey) -> Option<&CompSolidData> {
        self.comp_solids.get(key)
    }

    pub fn comp_solid_count(&self) -> usize {
        self.comp_solids.len()
    }

    /// Returns `true` if the given key references a live entity.
    pub fn contains(&self, key: TopologyKey) -> bool {
        match key {
            TopologyKey::Vertex(k) => self.vertices.contains_key(k),
            TopologyKey::Edge(k) => self.edges.contains_key(k),
            TopologyKey::Wire(k) => self.wires.contains_key(k),
            TopologyKey::Face(k) => self.faces.contains_key(k),
            TopologyKey::Shell(k) => self.shells.contains_key(k),
            TopologyKey::Solid(k) => self.solids.contains_key(k),
            TopologyKey::CompSolid(k) => self.comp_solids.contains_key(k),
        }
    }

    // --- Adjacency index helpers ---

    pub(crate) fn link_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        self.vertex_to_edges.entry(vertex).or_default().insert(edge);
    }

    pub(crate) fn link_edge_wire(&mut self, edge: EdgeKey, wire: WireKey) {
        self.edge_to_wires.entry(edge).or_default().insert(wire);
    }

    pub(crate) fn link_wire_face(&mut self, wire: WireKey, face: FaceKey) {
        self.wire_to_faces.entry(wire).or_default().insert(face);
    }

    pub(crate) fn link_face_shell(&mut self, face: FaceKey, shell: ShellKey) {
        self.face_to_shells.entry(face).or_default().insert(shell);
    }

    pub(crate) fn link_shell_solid(&mut self, shell: ShellKey, solid: SolidKey) {
        self.shell_to_solids.entry(shell).or_default().insert(solid);
    }
}

impl Default for TopologyArena {
    fn default() -> Self {
        Self::new()
    }
}
