// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric profile definitions mapped to planar faces.

use std::f64::consts::PI;

use nalgebra::{Matrix4, Point2, Point3, Vector2};

use crate::error::{Error, Result};
use crate::settings::ConversionSettings;
use crate::taxonomy::{Face, IdAllocator, Loop, NodeId, PointNode};

/// A profile corner, optionally rounded with the given radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileVertex {
    pub point: Point2<f64>,
    pub fillet: Option<f64>,
}

impl ProfileVertex {
    pub fn sharp(x: f64, y: f64) -> Self {
        Self {
            point: Point2::new(x, y),
            fillet: None,
        }
    }

    pub fn rounded(x: f64, y: f64, radius: f64) -> Self {
        Self {
            point: Point2::new(x, y),
            fillet: Some(radius),
        }
    }
}

/// C-shape (lipped channel) profile.
///
/// Depth runs along y, width along x, the lips point towards +x.
#[derive(Debug, Clone, PartialEq)]
pub struct CShapeProfile {
    pub id: NodeId,
    pub depth: f64,
    pub width: f64,
    pub wall_thickness: f64,
    pub girth: f64,
    pub internal_fillet_radius: Option<f64>,
    pub placement: Option<Matrix4<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EllipseProfile {
    pub id: NodeId,
    pub semi_axis1: f64,
    pub semi_axis2: f64,
    pub placement: Option<Matrix4<f64>>,
}

/// Builds a single-loop face from profile corners placed by `placement`.
///
/// Corners with a fillet radius are replaced by an arc of
/// `settings.fillet_segments` segments tangent to both adjacent edges.
/// Corners on a straight line, or whose fillet would not fit on the
/// adjacent edges, stay sharp.
pub fn profile_helper(
    id: NodeId,
    placement: Option<&Matrix4<f64>>,
    vertices: &[ProfileVertex],
    settings: &ConversionSettings,
    ids: &mut IdAllocator,
) -> Result<Face> {
    if vertices.len() < 3 {
        return Err(Error::InvalidProfile(format!(
            "{} needs at least 3 corners, got {}",
            id,
            vertices.len()
        )));
    }

    let n = vertices.len();
    let segments = settings.fillet_segments.max(1);
    let mut outline: Vec<Point2<f64>> = Vec::with_capacity(n);
    for (i, v) in vertices.iter().enumerate() {
        let prev = vertices[(i + n - 1) % n].point;
        let next = vertices[(i + 1) % n].point;
        match v.fillet.filter(|&r| r > 0.0) {
            Some(radius) => outline.extend(fillet(prev, v.point, next, radius, segments)),
            None => outline.push(v.point),
        }
    }

    let placement = placement.copied().unwrap_or_else(Matrix4::identity);
    let points: Vec<PointNode> = outline
        .iter()
        .map(|p| {
            let q = placement.transform_point(&Point3::new(p.x, p.y, 0.0));
            PointNode::new(ids.allocate(), q.x, q.y, q.z)
        })
        .collect();
    let outer = Loop::polygon(ids.allocate(), &points, true);
    Ok(Face::new(id, vec![outer]))
}

/// Points of a circular arc rounding `corner`, from the tangent point on the
/// edge towards `prev` to the one towards `next`.
fn fillet(
    prev: Point2<f64>,
    corner: Point2<f64>,
    next: Point2<f64>,
    radius: f64,
    segments: usize,
) -> Vec<Point2<f64>> {
    let to_prev = prev - corner;
    let to_next = next - corner;
    let (Some(d1), Some(d2)) = (to_prev.try_normalize(0.0), to_next.try_normalize(0.0)) else {
        return vec![corner];
    };
    let half = d1.dot(&d2).clamp(-1.0, 1.0).acos() / 2.0;
    if half < 1e-9 || half > PI / 2.0 - 1e-9 {
        return vec![corner];
    }
    let tangent = radius / half.tan();
    if tangent > to_prev.norm() || tangent > to_next.norm() {
        return vec![corner];
    }

    let bisector: Vector2<f64> = (d1 + d2).normalize();
    let center = corner + bisector * (radius / half.sin());
    let start = corner + d1 * tangent;
    let end = corner + d2 * tangent;

    let a0 = (start.y - center.y).atan2(start.x - center.x);
    let a1 = (end.y - center.y).atan2(end.x - center.x);
    let mut sweep = a1 - a0;
    if sweep > PI {
        sweep -= 2.0 * PI;
    } else if sweep <= -PI {
        sweep += 2.0 * PI;
    }

    (0..=segments)
        .map(|k| {
            let angle = a0 + sweep * k as f64 / segments as f64;
            center + Vector2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Lipped channel outline, counter-clockwise from the lower web corner.
///
/// Outer corners are rounded with the internal radius plus the wall
/// thickness, inner corners with the internal radius. Profiles with a
/// dimension below precision are skipped (`Ok(None)`).
pub fn c_shape_profile(
    profile: &CShapeProfile,
    settings: &ConversionSettings,
    ids: &mut IdAllocator,
) -> Result<Option<Face>> {
    let unit = settings.length_unit;
    let y = profile.depth / 2.0 * unit;
    let x = profile.width / 2.0 * unit;
    let d1 = profile.wall_thickness * unit;
    let d2 = profile.girth * unit;
    let f1 = profile.internal_fillet_radius.map(|r| r * unit);
    let f2 = f1.map(|r| r + d1);

    let tol = settings.precision;
    if x < tol || y < tol || d1 < tol || d2 < tol {
        tracing::info!(node = %profile.id, "Skipping zero sized profile");
        return Ok(None);
    }

    let corner = |px: f64, py: f64, radius: Option<f64>| ProfileVertex {
        point: Point2::new(px, py),
        fillet: radius,
    };
    let vertices = [
        corner(-x, -y, f2),
        corner(x, -y, f2),
        corner(x, -y + d2, None),
        corner(x - d1, -y + d2, None),
        corner(x - d1, -y + d1, f1),
        corner(-x + d1, -y + d1, f1),
        corner(-x + d1, y - d1, f1),
        corner(x - d1, y - d1, f1),
        corner(x - d1, y - d2, None),
        corner(x, y - d2, None),
        corner(x, y, f2),
        corner(-x, y, f2),
    ];
    profile_helper(
        profile.id,
        profile.placement.as_ref(),
        &vertices,
        settings,
        ids,
    )
    .map(Some)
}

/// Polygonal ellipse with `settings.ellipse_segments` points.
///
/// The longer semi axis always runs along the local x axis: when the second
/// axis is longer the placement is turned a quarter turn and the radii are
/// swapped.
pub fn ellipse_profile(
    profile: &EllipseProfile,
    settings: &ConversionSettings,
    ids: &mut IdAllocator,
) -> Result<Face> {
    let mut rx = profile.semi_axis1 * settings.length_unit;
    let mut ry = profile.semi_axis2 * settings.length_unit;

    let tol = settings.precision;
    if rx < tol || ry < tol {
        tracing::error!(node = %profile.id, rx, ry, "Radius not greater than zero");
        return Err(Error::InvalidProfile(format!(
            "non-positive ellipse radius for {}",
            profile.id
        )));
    }

    let mut placement = profile.placement.unwrap_or_else(Matrix4::identity);
    if ry > rx {
        let original = placement;
        placement.set_column(0, &(-original.column(1)));
        placement.set_column(1, &original.column(0));
        std::mem::swap(&mut rx, &mut ry);
    }

    let segments = settings.ellipse_segments.max(3);
    let vertices: Vec<ProfileVertex> = (0..segments)
        .map(|i| {
            let angle = i as f64 * 2.0 * PI / segments as f64;
            ProfileVertex::sharp(rx * angle.cos(), ry * angle.sin())
        })
        .collect();
    profile_helper(profile.id, Some(&placement), &vertices, settings, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Kernel;
    use crate::taxonomy::Item;
    use approx::assert_relative_eq;
    use shellweld_topology::TopologyKey;

    fn channel(fillet: Option<f64>) -> CShapeProfile {
        CShapeProfile {
            id: NodeId(500),
            depth: 10.0,
            width: 4.0,
            wall_thickness: 1.0,
            girth: 2.0,
            internal_fillet_radius: fillet,
            placement: None,
        }
    }

    fn face_area(face: Face) -> f64 {
        let mut kernel = Kernel::default();
        let results = kernel.convert(&Item::Face(face)).unwrap();
        let TopologyKey::Face(fk) = results[0].shape else {
            panic!("expected a face");
        };
        kernel.arena().face_area(fk).unwrap()
    }

    #[test]
    fn c_shape_outline() {
        let mut ids = IdAllocator::new();
        let face = c_shape_profile(&channel(None), &ConversionSettings::default(), &mut ids)
            .unwrap()
            .unwrap();

        assert_eq!(face.id, NodeId(500));
        assert_eq!(face.loops[0].len(), 12);
        // Web 10, flanges 2 x 3, lips 2 x 1.
        assert_relative_eq!(face_area(face), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn c_shape_fillets_stay_inside_bounds() {
        let mut ids = IdAllocator::new();
        let settings = ConversionSettings::default();
        let face = c_shape_profile(&channel(Some(0.25)), &settings, &mut ids)
            .unwrap()
            .unwrap();

        let lp = &face.loops[0];
        assert_eq!(lp.len(), 12 + 8 * settings.fillet_segments);
        for p in lp.points() {
            assert!(p.coords[0].abs() <= 2.0 + 1e-12);
            assert!(p.coords[1].abs() <= 5.0 + 1e-12);
        }
        assert!(!lp.points().any(|p| p.coords[0] == -2.0 && p.coords[1] == -5.0));
    }

    #[test]
    fn zero_sized_c_shape_is_skipped() {
        let mut ids = IdAllocator::new();
        let mut profile = channel(None);
        profile.girth = 0.0;
        let face = c_shape_profile(&profile, &ConversionSettings::default(), &mut ids).unwrap();
        assert!(face.is_none());
    }

    #[test]
    fn fillet_arc_is_tangent() {
        let arc = fillet(
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            1.0,
            4,
        );
        assert_eq!(arc.len(), 5);
        assert_relative_eq!(arc[0].x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc[0].y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc[4].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc[4].y, 0.0, epsilon = 1e-12);
        for p in &arc {
            assert_relative_eq!((p - Point2::new(1.0, 1.0)).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn oversized_fillet_keeps_corner() {
        let arc = fillet(
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            5.0,
            4,
        );
        assert_eq!(arc, vec![Point2::new(0.0, 0.0)]);
    }

    #[test]
    fn ellipse_keeps_long_axis_on_x() {
        let mut ids = IdAllocator::new();
        let profile = EllipseProfile {
            id: NodeId(1),
            semi_axis1: 2.0,
            semi_axis2: 1.0,
            placement: None,
        };
        let face = ellipse_profile(&profile, &ConversionSettings::default(), &mut ids).unwrap();
        let max_x = face.loops[0].points().map(|p| p.coords[0]).fold(0.0, f64::max);
        let max_y = face.loops[0].points().map(|p| p.coords[1]).fold(0.0, f64::max);
        assert_relative_eq!(max_x, 2.0, epsilon = 1e-12);
        assert!(max_y <= 1.0 + 1e-12);
    }

    #[test]
    fn taller_ellipse_rotates_placement() {
        let mut ids = IdAllocator::new();
        let profile = EllipseProfile {
            id: NodeId(1),
            semi_axis1: 1.0,
            semi_axis2: 3.0,
            placement: None,
        };
        let face = ellipse_profile(&profile, &ConversionSettings::default(), &mut ids).unwrap();
        let lp = &face.loops[0];
        assert_eq!(lp.len(), 32);
        let max_x = lp.points().map(|p| p.coords[0].abs()).fold(0.0, f64::max);
        let max_y = lp.points().map(|p| p.coords[1].abs()).fold(0.0, f64::max);
        assert!(max_x <= 1.0 + 1e-12);
        assert_relative_eq!(max_y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_ellipse_is_rejected() {
        let mut ids = IdAllocator::new();
        let profile = EllipseProfile {
            id: NodeId(1),
            semi_axis1: 1.0,
            semi_axis2: 0.0,
            placement: None,
        };
        assert!(matches!(
            ellipse_profile(&profile, &ConversionSettings::default(), &mut ids),
            Err(Error::InvalidProfile(_))
        ));
    }
}
