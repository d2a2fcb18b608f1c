// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adaptive welding tolerance.

use shellweld_topology::{Aabb, CONFUSION};

/// Welding epsilon for a point set with the given bounds.
///
/// The base radius is `10 * precision`. It shrinks with the smallest
/// bounding box extent that is itself larger than that radius, so sheet-like
/// geometry keeps its thin dimension. Extents at or below the radius are
/// ignored; when no extent qualifies the base radius is used as is. The
/// result never drops below [`CONFUSION`].
///
/// The extents are taken from an axis-aligned box, so the choice depends on
/// how the geometry is oriented.
pub fn select_epsilon(bounds: &Aabb, precision: f64) -> f64 {
    let base = precision * 10.0;
    let extents = bounds.extents();
    let smallest = extents
        .iter()
        .copied()
        .filter(|&d| d > base)
        .fold(f64::INFINITY, f64::min);
    clamp_epsilon(base * smallest.min(1.0))
}

/// Raises `eps` to the kernel's smallest reliable distance.
#[inline]
pub fn clamp_epsilon(eps: f64) -> f64 {
    eps.max(CONFUSION)
}
