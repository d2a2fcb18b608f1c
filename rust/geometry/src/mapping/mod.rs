// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mappings from raw building-model data to taxonomy items.
//!
//! Coordinates are scaled by the configured length unit on the way in;
//! everything downstream works in model units.

pub mod face_set;
pub mod profiles;

pub use face_set::{polygonal_face_set, triangulated_face_set, PolygonalFace};
pub use profiles::{
    c_shape_profile, ellipse_profile, profile_helper, CShapeProfile, EllipseProfile,
    ProfileVertex,
};
