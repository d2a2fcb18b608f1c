// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for kernel operations.

use crate::keys::*;

/// Result type alias for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying topology.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    #[error("wire not found: {0:?}")]
    WireNotFound(WireKey),

    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    #[error("shell not found: {0:?}")]
    ShellNotFound(ShellKey),

    #[error("solid not found: {0:?}")]
    SolidNotFound(SolidKey),

    /// Edges in a wire are not connected end-to-end.
    #[error("wire edges are not connected: edge {0} endpoint does not match edge {1} startpoint")]
    DisconnectedWire(usize, usize),

    /// Edge and orientation lists of an oriented wire differ in length.
    #[error("wire has {edges} edges but {orientations} orientations")]
    OrientationMismatch { edges: usize, orientations: usize },

    #[error("wire must have at least one edge")]
    EmptyWire,

    /// A wire marked closed does not end where it starts.
    #[error("wire is not closed")]
    NotClosed,

    #[error("face outer wire has fewer than 3 edges")]
    DegenerateFace,

    #[error("shell must have at least one face")]
    EmptyShell,

    #[error("compound must have at least one solid")]
    EmptyCompSolid,

    /// Sweep direction too short to produce a solid.
    #[error("sweep vector length {0} is below tolerance")]
    DegenerateSweep(f64),

    #[error("serialization error: {0}")]
    Serialization(String),
}
