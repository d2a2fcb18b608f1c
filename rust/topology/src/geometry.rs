// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on kernel entities.
//!
//! Lengths, areas, normals, triangulation and volumes, computed directly from
//! the planar polygon data in the arena.

use nalgebra::{Point3, Vector3};

use crate::arena::TopologyArena;
use crate::keys::*;

/// Newell's polygon normal, unnormalised. Its length is twice the enclosed
/// area for a planar polygon.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let n = points.len();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

/// Area enclosed by a planar polygon.
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    newell_normal(points).norm() / 2.0
}

/// Picks the two coordinate axes to keep when projecting a polygon with
/// the given normal onto its dominant plane.
pub(crate) fn projection_axes(normal: &Vector3<f64>) -> (usize, usize) {
    let abs_n = normal.abs();
    if abs_n.z >= abs_n.x && abs_n.z >= abs_n.y {
        (0, 1)
    } else if abs_n.y >= abs_n.x {
        (0, 2)
    } else {
        (1, 2)
    }
}

impl TopologyArena {
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices.get(key).map(|v| v.point)
    }

    pub fn edge_length(&self, key: EdgeKey) -> Option<f64> {
        let edge = self.edges.get(key)?;
        let p0 = self.vertex_point(edge.start)?;
        let p1 = self.vertex_point(edge.end)?;
        Some((p1 - p0).norm())
    }

    /// Returns the positions of a wire's vertices in traversal order.
    pub fn wire_points(&self, key: WireKey) -> Option<Vec<Point3<f64>>> {
        self.wire_vertices_ordered(key)?
            .into_iter()
            .map(|vk| self.vertex_point(vk))
            .collect()
    }

    /// Unit normal of a wire following the right-hand rule, `None` when
    /// the wire encloses no area.
    pub fn wire_normal(&self, key: WireKey) -> Option<Vector3<f64>> {
        let normal = newell_normal(&self.wire_points(key)?);
        let len = normal.norm();
        if len < 1e-15 {
            return None;
        }
        Some(normal / len)
    }

    /// Area enclosed by a planar wire.
    pub fn wire_area(&self, key: WireKey) -> Option<f64> {
        Some(polygon_area(&self.wire_points(key)?))
    }

    pub fn face_normal(&self, key: FaceKey) -> Option<Vector3<f64>> {
        self.wire_normal(self.faces.get(key)?.outer_wire)
    }

    /// Area of a face with its holes subtracted.
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        let face = self.faces.get(key)?;
        let mut total = self.wire_area(face.outer_wire)?;
        for &iw in &face.inner_wires {
            total -= self.wire_area(iw)?;
        }
        Some(total.max(0.0))
    }

    /// Triangulates a face (with holes) by ear clipping in its dominant plane.
    pub fn triangulate_face(&self, key: FaceKey) -> Option<Vec<[VertexKey; 3]>> {
        let face = self.faces.get(key)?;
        let outer = self.wire_vertices_ordered(face.outer_wire)?;
        if outer.len() < 3 {
            return None;
        }
        let normal = self.face_normal(key)?;
        let (ax_u, ax_v) = projection_axes(&normal);

        let mut rings = vec![outer];
        for &iw in &face.inner_wires {
            rings.push(self.wire_vertices_ordered(iw)?);
        }

        let mut coords_2d: Vec<f64> = Vec::new();
        let mut all_verts: Vec<VertexKey> = Vec::new();
        let mut hole_indices: Vec<usize> = Vec::new();
        for (i, ring) in rings.iter().enumerate() {
            if i > 0 {
                hole_indices.push(all_verts.len());
            }
            for &vk in ring {
                let p = self.vertex_point(vk)?;
                coords_2d.push(p[ax_u]);
                coords_2d.push(p[ax_v]);
                all_verts.push(vk);
            }
        }

        let indices = earcutr::earcut(&coords_2d, &hole_indices, 2).ok()?;

        // Ear clipping emits a fixed winding; restore the face's own.
        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for c in indices.chunks_exact(3) {
            let tri = [all_verts[c[0]], all_verts[c[1]], all_verts[c[2]]];
            let p0 = self.vertex_point(tri[0])?;
            let p1 = self.vertex_point(tri[1])?;
            let p2 = self.vertex_point(tri[2])?;
            if (p1 - p0).cross(&(p2 - p0)).dot(&normal) < 0.0 {
                triangles.push([tri[0], tri[2], tri[1]]);
            } else {
                triangles.push(tri);
            }
        }
        Some(triangles)
    }

    /// Signed volume enclosed by a shell (positive for outward normals).
    pub fn shell_volume(&self, key: ShellKey) -> Option<f64> {
        let shell = self.shells.get(key)?;
        let mut volume = 0.0;
        for &fk in &shell.faces {
            for [a, b, c] in self.triangulate_face(fk)? {
                let p0 = self.vertex_point(a)?;
                let p1 = self.vertex_point(b)?;
                let p2 = self.vertex_point(c)?;
                volume += p0.coords.dot(&p1.coords.cross(&p2.coords));
            }
        }
        Some(volume / 6.0)
    }

    /// Volume of a solid: the outer shell minus its voids.
    pub fn solid_volume(&self, key: SolidKey) -> Option<f64> {
        let solid = self.solids.get(key)?;
        let mut volume = self.shell_volume(solid.outer_shell)?.abs();
        for &inner in &solid.inner_shells {
            volume -= self.shell_volume(inner)?.abs();
        }
        Some(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_polygon;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(size, 0.0, 0.0),
            Point3::new(size, size, 0.0),
            Point3::new(0.0, size, 0.0),
        ]
    }

    #[test]
    fn newell_normal_of_ccw_square_points_up() {
        let mut arena = TopologyArena::new();
        let wire = make_polygon(&mut arena, &square(2.0)).unwrap();
        let n = arena.wire_normal(wire).unwrap();
        assert_relative_eq!(n.z, 1.0);
        assert_relative_eq!(arena.wire_area(wire).unwrap(), 4.0);
    }

    #[test]
    fn concave_polygon_area() {
        // L-shape: 2x2 square minus a 1x1 corner
        let l_shape = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert_relative_eq!(polygon_area(&l_shape), 3.0);
    }

    #[test]
    fn face_with_hole_area_and_triangulation() {
        let mut arena = TopologyArena::new();
        let outer = make_polygon(&mut arena, &square(10.0)).unwrap();
        let hole_points: Vec<_> = square(2.0)
            .into_iter()
            .rev()
            .map(|p| p + Vector3::new(4.0, 4.0, 0.0))
            .collect();
        let hole = make_polygon(&mut arena, &hole_points).unwrap();
        let face = arena.add_face_with_holes(outer, &[hole]).unwrap();

        assert_relative_eq!(arena.face_area(face).unwrap(), 96.0);
        let triangles = arena.triangulate_face(face).unwrap();
        assert_eq!(triangles.len(), 8);
    }

    #[test]
    fn edge_length_of_diagonal() {
        let mut arena = TopologyArena::new();
        let a = arena.add_vertex(0.0, 0.0, 0.0);
        let b = arena.add_vertex(3.0, 4.0, 0.0);
        let e = arena.add_edge(a, b).unwrap();
        assert_relative_eq!(arena.edge_length(e).unwrap(), 5.0);
    }
}
