// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::taxonomy::NodeId;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting taxonomy items into kernel shapes
#[derive(Error, Debug)]
pub enum Error {
    /// A one-based face set index outside `1..=max`.
    #[error("Face set index {index} out of bounds (1..={max})")]
    IndexOutOfBounds { index: i64, max: usize },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    /// Welding and wire construction left nothing to build a shape from.
    #[error("No geometry could be produced for {0}")]
    NoGeometry(NodeId),

    #[error("Unsupported item: {0}")]
    UnsupportedItem(String),

    #[error("Topology error: {0}")]
    Topology(#[from] shellweld_topology::Error),
}
