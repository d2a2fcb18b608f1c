// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

/// An axis-aligned box. The empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// A zero-size box around one point.
    pub fn from_point(p: Point3<f64>) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.add(p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box to include `p`.
    pub fn add(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grows the box by `eps` in every direction.
    pub fn enlarge(&mut self, eps: f64) {
        if self.is_empty() {
            return;
        }
        let d = Vector3::repeat(eps);
        self.min -= d;
        self.max += d;
    }

    pub fn enlarged(mut self, eps: f64) -> Self {
        self.enlarge(eps);
        self
    }

    /// Side lengths along x, y and z. Zero for an empty box.
    pub fn extents(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    /// Inclusive overlap test. False when either box is empty.
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn extents_of_added_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 100.0, 0.001),
            Point3::new(50.0, -10.0, 0.0),
        ];
        let aabb = Aabb::from_points(&points);
        let e = aabb.extents();
        assert_relative_eq!(e.x, 100.0);
        assert_relative_eq!(e.y, 110.0);
        assert_relative_eq!(e.z, 0.001);
    }

    #[test]
    fn enlarge_is_inclusive() {
        let aabb = Aabb::from_point(Point3::new(1.0, 1.0, 1.0)).enlarged(0.5);
        assert!(aabb.contains(&Point3::new(1.5, 0.5, 1.0)));
        assert!(!aabb.contains(&Point3::new(1.6, 1.0, 1.0)));
    }

    #[test]
    fn empty_box_stays_empty() {
        let mut aabb = Aabb::empty();
        aabb.enlarge(1.0);
        assert!(aabb.is_empty());
        assert_eq!(aabb.extents(), Vector3::zeros());
        assert!(!aabb.contains(&Point3::origin()));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::from_points(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)]);
        let b = Aabb::from_points(&[Point3::new(1.0, 0.5, 0.0), Point3::new(2.0, 2.0, 0.0)]);
        let c = Aabb::from_points(&[Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 0.2, 0.0)]);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&Aabb::empty()));
    }
}
