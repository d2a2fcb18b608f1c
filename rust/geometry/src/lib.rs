// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shellweld Geometry
//!
//! Converts an intermediate geometry tree (shells, faces, loops,
//! extrusions) into boundary representation shapes on the
//! `shellweld-topology` kernel.
//!
//! The heart of the crate is [`FacesetHelper`], which rebuilds consistent
//! topology from loosely defined polygon loops: it welds drifting vertices
//! under an adaptive tolerance, drops duplicate and degenerate loops,
//! counts edge usage to spot non-manifold edges and splits
//! self-intersecting boundaries into simple wires.
//!
//! ```
//! use shellweld_geometry::mapping::triangulated_face_set;
//! use shellweld_geometry::{ConversionSettings, IdAllocator, Item, Kernel};
//!
//! let coords = vec![
//!     vec![0.0, 0.0, 0.0],
//!     vec![1.0, 0.0, 0.0],
//!     vec![0.0, 1.0, 0.0],
//!     vec![0.0, 0.0, 1.0],
//! ];
//! let indices = vec![vec![1, 3, 2], vec![1, 2, 4], vec![2, 3, 4], vec![3, 1, 4]];
//!
//! let settings = ConversionSettings::default();
//! let mut ids = IdAllocator::new();
//! let shell = triangulated_face_set(&coords, &indices, true, &settings, &mut ids).unwrap();
//!
//! let mut kernel = Kernel::new(settings);
//! let shapes = kernel.convert(&Item::Shell(shell)).unwrap();
//! assert_eq!(shapes.len(), 1);
//! ```

pub mod convert;
pub mod error;
pub mod faceset;
pub mod kernel;
pub mod mapping;
pub mod settings;
pub mod taxonomy;
pub mod tolerance;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use faceset::{FacesetHelper, FacesetSummary};
pub use kernel::{ConversionResult, Kernel};
pub use settings::ConversionSettings;
pub use taxonomy::{
    Collection, Edge, Extrusion, Face, IdAllocator, Item, Loop, NodeId, PointNode, Shell,
};
pub use tolerance::select_epsilon;
