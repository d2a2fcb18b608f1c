// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indexed face sets: a shared coordinate list plus one-based index lists.

use crate::error::{Error, Result};
use crate::settings::ConversionSettings;
use crate::taxonomy::{Face, IdAllocator, Loop, PointNode, Shell};

/// One face of a polygonal face set: an outer index list and optional holes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonalFace {
    pub outer: Vec<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inner: Vec<Vec<i64>>,
}

/// A shell of triangles (or any polygons) over a shared coordinate list.
///
/// Each index list becomes a face with one external loop. Indices are one
/// based; anything outside `1..=coords.len()` fails the whole face set.
/// Points referenced by several faces share one node, so the welder sees
/// them as the same vertex before any tolerance comes into play.
pub fn triangulated_face_set(
    coords: &[Vec<f64>],
    indices: &[Vec<i64>],
    closed: bool,
    settings: &ConversionSettings,
    ids: &mut IdAllocator,
) -> Result<Shell> {
    let points = point_list(coords, settings, ids);
    let mut faces = Vec::with_capacity(indices.len());
    for face_indices in indices {
        let outer = index_loop(&points, face_indices, true, ids)?;
        faces.push(Face::new(ids.allocate(), vec![outer]));
    }
    Ok(Shell {
        id: ids.allocate(),
        faces,
        closed,
    })
}

/// Like [`triangulated_face_set`], with inner loops per face.
pub fn polygonal_face_set(
    coords: &[Vec<f64>],
    faces: &[PolygonalFace],
    closed: bool,
    settings: &ConversionSettings,
    ids: &mut IdAllocator,
) -> Result<Shell> {
    let points = point_list(coords, settings, ids);
    let mut mapped = Vec::with_capacity(faces.len());
    for face in faces {
        let mut loops = Vec::with_capacity(1 + face.inner.len());
        loops.push(index_loop(&points, &face.outer, true, ids)?);
        for hole in &face.inner {
            loops.push(index_loop(&points, hole, false, ids)?);
        }
        mapped.push(Face::new(ids.allocate(), loops));
    }
    Ok(Shell {
        id: ids.allocate(),
        faces: mapped,
        closed,
    })
}

/// Scaled points; missing trailing components are zero.
fn point_list(
    coords: &[Vec<f64>],
    settings: &ConversionSettings,
    ids: &mut IdAllocator,
) -> Vec<PointNode> {
    let unit = settings.length_unit;
    coords
        .iter()
        .map(|c| {
            let component = |i: usize| c.get(i).map_or(0.0, |v| v * unit);
            PointNode::new(ids.allocate(), component(0), component(1), component(2))
        })
        .collect()
}

fn index_loop(
    points: &[PointNode],
    indices: &[i64],
    external: bool,
    ids: &mut IdAllocator,
) -> Result<Loop> {
    let max = points.len();
    let ring = indices
        .iter()
        .map(|&index| {
            usize::try_from(index)
                .ok()
                .filter(|&i| (1..=max).contains(&i))
                .map(|i| points[i - 1])
                .ok_or(Error::IndexOutOfBounds { index, max })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Loop::polygon(ids.allocate(), &ring, external))
}
