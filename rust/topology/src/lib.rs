// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Shellweld Topology
//!
//! A small boundary-representation kernel for planar polyhedral geometry.
//!
//! Entities (vertices, edges, wires, faces, shells, solids and compound
//! solids) live in an arena of slot maps with upward adjacency indices.
//! Besides primitive construction the kernel offers the services a shell
//! reconstruction layer needs: a kd-tree [`PointIndex`] for box queries,
//! [`Aabb`] bounds, splitting of self-intersecting wires into simple cycles,
//! linear prism sweeps and JSON snapshots.

pub mod arena;
pub mod bounds;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod intersect;
pub mod keys;
pub mod serialization;
pub mod spatial;
pub mod sweep;
pub mod transform;
pub mod traversal;

pub use arena::{TopologyArena, CONFUSION};
pub use bounds::Aabb;
pub use construction::{make_polygon, WireBuilder};
pub use error::{Error, Result};
pub use keys::{
    CompSolidKey, EdgeKey, FaceKey, ShellKey, SolidKey, TopologyKey, TopologyType, VertexKey,
    WireKey,
};
pub use spatial::PointIndex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};
