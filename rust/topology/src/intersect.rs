// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Self-intersection splitting for closed planar wires.
//!
//! A closed wire that crosses or touches itself is cut at every contact
//! point (proper crossings, T-junctions and revisited vertices) and the
//! resulting closed walk is decomposed into simple cycles. Each cycle closes
//! the moment the walk returns to a node already on the current path.

use nalgebra::{Point2, Point3, Vector2, Vector3};
use rustc_hash::FxHashMap;

use crate::arena::{TopologyArena, WireData, CONFUSION};
use crate::bounds::Aabb;
use crate::construction::WireBuilder;
use crate::error::{Error, Result};
use crate::geometry::{polygon_area, projection_axes};
use crate::keys::*;

/// Contact nodes. Indices below the wire's vertex count are its vertices;
/// later ones are new crossing points. Merged nodes point at the smallest
/// index of their group so original vertices survive as representatives.
struct Nodes {
    parent: Vec<usize>,
    points: Vec<Point3<f64>>,
}

impl Nodes {
    fn new(points: &[Point3<f64>]) -> Self {
        Self {
            parent: (0..points.len()).collect(),
            points: points.to_vec(),
        }
    }

    fn push(&mut self, point: Point3<f64>) -> usize {
        self.parent.push(self.parent.len());
        self.points.push(point);
        self.points.len() - 1
    }

    fn find(&self, mut i: usize) -> usize {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    /// Returns `true` when the two nodes were not merged yet.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra.max(rb)] = ra.min(rb);
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct Event {
    t: f64,
    node: usize,
}

/// One position of the split walk and the original edge leaving it, when
/// that edge was not cut.
#[derive(Debug, Clone, Copy)]
struct Step {
    node: usize,
    edge: Option<(EdgeKey, bool)>,
}

struct Splitter<'a> {
    points: &'a [Point3<f64>],
    flat: Vec<Point2<f64>>,
    nodes: Nodes,
    events: Vec<Vec<Event>>,
    hits: Vec<(f64, f64)>,
    tolerance: f64,
}

impl<'a> Splitter<'a> {
    fn new(points: &'a [Point3<f64>], tolerance: f64) -> Self {
        let (u, v) = plane_axes(points);
        Self {
            points,
            flat: points.iter().map(|p| Point2::new(p[u], p[v])).collect(),
            nodes: Nodes::new(points),
            events: vec![Vec::new(); points.len()],
            hits: Vec::new(),
            tolerance,
        }
    }

    fn segment(&self, i: usize) -> (Point2<f64>, Point2<f64>) {
        (self.flat[i], self.flat[(i + 1) % self.flat.len()])
    }

    /// Non-adjacent segment pairs whose tolerance-enlarged boxes overlap,
    /// in ascending order.
    fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.flat.len();
        let boxes: Vec<Aabb> = (0..n)
            .map(|i| {
                let (a, b) = self.segment(i);
                Aabb::from_points(&[Point3::new(a.x, a.y, 0.0), Point3::new(b.x, b.y, 0.0)])
                    .enlarged(self.tolerance)
            })
            .collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| boxes[a].min.x.total_cmp(&boxes[b].min.x));

        let mut pairs = Vec::new();
        for (k, &a) in order.iter().enumerate() {
            for &b in &order[k + 1..] {
                if boxes[b].min.x > boxes[a].max.x {
                    break;
                }
                let (i, j) = (a.min(b), a.max(b));
                if j - i < 2 || (i == 0 && j == n - 1) {
                    continue;
                }
                if boxes[a].intersects(&boxes[b]) {
                    pairs.push((i, j));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Maps a parameter near a segment end onto that end's vertex node.
    fn snap(&self, i: usize, t: f64, len: f64) -> Option<usize> {
        if t * len <= self.tolerance {
            Some(i)
        } else if (1.0 - t) * len <= self.tolerance {
            Some((i + 1) % self.flat.len())
        } else {
            None
        }
    }

    /// Records every contact between non-adjacent segments `i` and `j`.
    fn intersect(&mut self, i: usize, j: usize) -> bool {
        let (a0, a1) = self.segment(i);
        let (b0, b1) = self.segment(j);
        let (r, s) = (a1 - a0, b1 - b0);
        let (len_a, len_b) = (r.norm(), s.norm());
        if len_a <= self.tolerance || len_b <= self.tolerance {
            return false;
        }

        let mut hits = std::mem::take(&mut self.hits);
        hits.clear();
        let denom = cross2(&r, &s);
        if denom.abs() > 1e-12 * len_a * len_b {
            let qp = b0 - a0;
            let t = cross2(&qp, &s) / denom;
            let u = cross2(&qp, &r) / denom;
            let (slack_a, slack_b) = (self.tolerance / len_a, self.tolerance / len_b);
            if t >= -slack_a && t <= 1.0 + slack_a && u >= -slack_b && u <= 1.0 + slack_b {
                hits.push((t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)));
            }
        } else {
            // Parallel: only endpoint contacts can split the walk.
            for (p, u) in [(b0, 0.0), (b1, 1.0)] {
                let (t, d) = project_on_segment(&p, &a0, &a1);
                if d <= self.tolerance {
                    hits.push((t, u));
                }
            }
            for (p, t) in [(a0, 0.0), (a1, 1.0)] {
                let (u, d) = project_on_segment(&p, &b0, &b1);
                if d <= self.tolerance {
                    hits.push((t, u));
                }
            }
        }

        let mut found = false;
        for &(t, u) in &hits {
            match (self.snap(i, t, len_a), self.snap(j, u, len_b)) {
                (Some(x), Some(y)) => found |= self.nodes.union(x, y),
                (Some(x), None) => {
                    self.events[j].push(Event { t: u, node: x });
                    found = true;
                }
                (None, Some(y)) => {
                    self.events[i].push(Event { t, node: y });
                    found = true;
                }
                (None, None) => {
                    let start = self.points[i];
                    let end = self.points[(i + 1) % self.points.len()];
                    let x = self.nodes.push(start + (end - start) * t);
                    self.events[i].push(Event { t, node: x });
                    self.events[j].push(Event { t: u, node: x });
                    found = true;
                }
            }
        }
        self.hits = hits;
        found
    }

    /// Sorts each segment's cut points and merges those closer than the
    /// tolerance.
    fn settle_events(&mut self) {
        for i in 0..self.events.len() {
            let mut events = std::mem::take(&mut self.events[i]);
            events.sort_by(|a, b| a.t.total_cmp(&b.t));
            let mut kept: Vec<Event> = Vec::with_capacity(events.len());
            for event in events {
                if let Some(last) = kept.last() {
                    let d = (self.nodes.points[last.node] - self.nodes.points[event.node]).norm();
                    if d <= self.tolerance {
                        self.nodes.union(last.node, event.node);
                        continue;
                    }
                }
                kept.push(event);
            }
            self.events[i] = kept;
        }
    }

    /// The closed walk through all vertices and cut points.
    fn walk(&self, wire: &WireData) -> Vec<Step> {
        let mut steps: Vec<Step> = Vec::new();
        for i in 0..self.points.len() {
            let events = &self.events[i];
            let edge = events
                .is_empty()
                .then(|| (wire.edges[i], wire.orientations[i]));
            push_step(
                &mut steps,
                Step {
                    node: self.nodes.find(i),
                    edge,
                },
            );
            for event in events {
                push_step(
                    &mut steps,
                    Step {
                        node: self.nodes.find(event.node),
                        edge: None,
                    },
                );
            }
        }
        if steps.len() > 1 && steps[0].node == steps[steps.len() - 1].node {
            steps.pop();
        }
        steps
    }
}

/// Appends a step, collapsing it into the previous one when both sit on the
/// same node.
fn push_step(steps: &mut Vec<Step>, step: Step) {
    if let Some(last) = steps.last_mut() {
        if last.node == step.node {
            last.edge = step.edge;
            return;
        }
    }
    steps.push(step);
}

fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Parameter of the point of segment `a-b` closest to `p`, and the distance.
fn project_on_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> (f64, f64) {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 == 0.0 {
        return (0.0, (p - a).norm());
    }
    let t = ((p - a).dot(&d) / len2).clamp(0.0, 1.0);
    (t, (a + d * t - p).norm())
}

/// Dominant projection plane of a polygon. Sums absolute fan cross products
/// so lobes of opposite winding reinforce instead of cancelling.
fn plane_axes(points: &[Point3<f64>]) -> (usize, usize) {
    let n = points.len() as f64;
    let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n;
    let mut acc = Vector3::zeros();
    for i in 0..points.len() {
        let a = points[i].coords - centroid;
        let b = points[(i + 1) % points.len()].coords - centroid;
        acc += a.cross(&b).abs();
    }
    projection_axes(&acc)
}

/// Splits a walk into simple cycles at every revisited node.
fn extract_cycles(steps: &[Step]) -> Vec<Vec<Step>> {
    let mut cycles = Vec::new();
    let mut stack: Vec<Step> = Vec::with_capacity(steps.len());
    let mut position: FxHashMap<usize, usize> = FxHashMap::default();

    for step in steps.iter().chain(steps.first()) {
        if let Some(&k) = position.get(&step.node) {
            cycles.push(stack[k..].to_vec());
            for dropped in &stack[k + 1..] {
                position.remove(&dropped.node);
            }
            stack.truncate(k + 1);
            stack[k].edge = step.edge;
        } else {
            position.insert(step.node, stack.len());
            stack.push(*step);
        }
    }
    cycles
}

impl TopologyArena {
    /// Splits a self-intersecting closed wire into simple closed wires.
    ///
    /// Returns an empty list when the wire does not touch itself (or is
    /// open), in which case the original wire is usable as is. Unsplit edges
    /// are shared with the original wire; new edges are shared between the
    /// returned cycles. Cycles enclosing no area are dropped.
    pub fn wire_intersections(&mut self, wire: WireKey, tolerance: f64) -> Result<Vec<WireKey>> {
        let data = self.wires.get(wire).ok_or(Error::WireNotFound(wire))?.clone();
        if !data.closed || data.edges.len() < 4 {
            return Ok(Vec::new());
        }
        let vertices = self
            .wire_vertices_ordered(wire)
            .ok_or(Error::WireNotFound(wire))?;
        let points = vertices
            .iter()
            .map(|&vk| self.vertex_point(vk).ok_or(Error::VertexNotFound(vk)))
            .collect::<Result<Vec<_>>>()?;
        let n = points.len();
        let tolerance = tolerance.max(CONFUSION);

        let mut splitter = Splitter::new(&points, tolerance);
        let mut found = false;

        let mut first_visit: FxHashMap<VertexKey, usize> = FxHashMap::default();
        for (i, &vk) in vertices.iter().enumerate() {
            match first_visit.get(&vk) {
                Some(&j) => found |= splitter.nodes.union(i, j),
                None => {
                    first_visit.insert(vk, i);
                }
            }
        }

        for (i, j) in splitter.candidate_pairs() {
            found |= splitter.intersect(i, j);
        }
        if !found {
            return Ok(Vec::new());
        }

        splitter.settle_events();
        let steps = splitter.walk(&data);
        let nodes = &splitter.nodes;
        let cycles: Vec<Vec<Step>> = extract_cycles(&steps)
            .into_iter()
            .filter(|cycle| {
                let ring: Vec<Point3<f64>> = cycle.iter().map(|s| nodes.points[s.node]).collect();
                cycle.len() >= 3 && polygon_area(&ring) > tolerance * tolerance
            })
            .collect();
        if cycles.len() < 2 {
            return Ok(Vec::new());
        }

        let mut node_vertex: FxHashMap<usize, VertexKey> = FxHashMap::default();
        for step in cycles.iter().flatten() {
            if !node_vertex.contains_key(&step.node) {
                let vk = if step.node < n {
                    vertices[step.node]
                } else {
                    self.make_vertex(nodes.points[step.node], tolerance)
                };
                node_vertex.insert(step.node, vk);
            }
        }

        let mut new_edges: FxHashMap<(usize, usize), EdgeKey> = FxHashMap::default();
        let mut result = Vec::with_capacity(cycles.len());
        for cycle in &cycles {
            let mut builder = WireBuilder::new();
            for (idx, step) in cycle.iter().enumerate() {
                let next = cycle[(idx + 1) % cycle.len()].node;
                let (va, vb) = (node_vertex[&step.node], node_vertex[&next]);

                if let Some((ek, forward)) = step.edge {
                    let edge = &self.edges[ek];
                    let (from, to) = if forward {
                        (edge.start, edge.end)
                    } else {
                        (edge.end, edge.start)
                    };
                    if from == va && to == vb {
                        builder.push(ek, forward);
                        continue;
                    }
                }

                let pair = (step.node.min(next), step.node.max(next));
                let ek = match new_edges.get(&pair) {
                    Some(&ek) => ek,
                    None => {
                        let ek = self.add_edge(node_vertex[&pair.0], node_vertex[&pair.1])?;
                        new_edges.insert(pair, ek);
                        ek
                    }
                };
                builder.push(ek, step.node < next);
            }
            result.push(builder.build_closed(self)?);
        }
        Ok(result)
    }

    /// Returns the wire enclosing the largest area.
    pub fn select_largest(&self, wires: &[WireKey]) -> Option<WireKey> {
        wires
            .iter()
            .filter_map(|&w| Some((w, self.wire_area(w)?)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(w, _)| w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_polygon;
    use approx::assert_relative_eq;

    fn polygon(arena: &mut TopologyArena, coords: &[(f64, f64)]) -> WireKey {
        let points: Vec<_> = coords.iter().map(|&(x, y)| Point3::new(x, y, 0.0)).collect();
        make_polygon(arena, &points).unwrap()
    }

    #[test]
    fn simple_polygon_has_no_intersections() {
        let mut arena = TopologyArena::new();
        let wire = polygon(&mut arena, &[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 0.5), (0.0, 1.0)]);
        assert!(arena.wire_intersections(wire, 1e-5).unwrap().is_empty());
    }

    #[test]
    fn bow_tie_splits_into_two_triangles() {
        let mut arena = TopologyArena::new();
        let wire = polygon(&mut arena, &[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let cycles = arena.wire_intersections(wire, 1e-5).unwrap();

        assert_eq!(cycles.len(), 2);
        for &cycle in &cycles {
            assert!(arena.wire_is_closed(cycle));
            assert_eq!(arena.wire_edges(cycle).unwrap().len(), 3);
            assert_relative_eq!(arena.wire_area(cycle).unwrap(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn figure_eight_keeps_larger_lobe() {
        let mut arena = TopologyArena::new();
        let wire = polygon(
            &mut arena,
            &[
                (0.0, 0.0),
                (1.0, 0.0),
                (3.0, 2.0),
                (6.0, 2.0),
                (6.0, 0.0),
                (3.0, 0.0),
                (1.0, 2.0),
                (0.0, 2.0),
            ],
        );
        let cycles = arena.wire_intersections(wire, 1e-5).unwrap();
        assert_eq!(cycles.len(), 2);

        let largest = arena.select_largest(&cycles).unwrap();
        assert_relative_eq!(arena.wire_area(largest).unwrap(), 7.0, epsilon = 1e-9);
        let smallest = cycles.iter().copied().find(|&c| c != largest).unwrap();
        assert_relative_eq!(arena.wire_area(smallest).unwrap(), 3.0, epsilon = 1e-9);

        // The crossing vertex is shared by both lobes.
        let shared: Vec<_> = arena
            .wire_vertices_ordered(largest)
            .unwrap()
            .into_iter()
            .filter(|v| arena.wire_vertices_ordered(smallest).unwrap().contains(v))
            .collect();
        assert_eq!(shared.len(), 1);
        let p = arena.vertex_point(shared[0]).unwrap();
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn revisited_vertex_splits_and_reuses_edges() {
        let mut arena = TopologyArena::new();
        let [a, b, c, d, e] = [(0.0, 0.0), (2.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 2.0)]
            .map(|(x, y)| arena.add_vertex(x, y, 0.0));
        let mut builder = WireBuilder::new();
        for (from, to) in [(a, b), (b, c), (c, d), (d, e), (e, c), (c, a)] {
            let edge = arena.add_edge(from, to).unwrap();
            builder.push(edge, true);
        }
        let wire = builder.build_closed(&mut arena).unwrap();
        let edges_before = arena.edge_count();

        let cycles = arena.wire_intersections(wire, 1e-5).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(arena.edge_count(), edges_before);
        for &cycle in &cycles {
            assert_relative_eq!(arena.wire_area(cycle).unwrap(), 1.0, epsilon = 1e-9);
        }
    }

    /// Subdivides every side of a closed polygon into `pieces` collinear
    /// segments.
    fn subdivided(corners: &[(f64, f64)], pieces: usize) -> Vec<(f64, f64)> {
        let mut coords = Vec::with_capacity(corners.len() * pieces);
        for (k, &(x0, y0)) in corners.iter().enumerate() {
            let (x1, y1) = corners[(k + 1) % corners.len()];
            for step in 0..pieces {
                let t = step as f64 / pieces as f64;
                coords.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
            }
        }
        coords
    }

    #[test]
    fn dense_ellipse_has_no_intersections() {
        let mut arena = TopologyArena::new();
        let coords: Vec<(f64, f64)> = (0..4000)
            .map(|k| {
                let a = k as f64 / 4000.0 * std::f64::consts::TAU;
                (50.0 * a.cos(), 20.0 * a.sin())
            })
            .collect();
        let wire = polygon(&mut arena, &coords);
        assert!(arena.wire_intersections(wire, 1e-5).unwrap().is_empty());
    }

    #[test]
    fn dense_bow_tie_still_splits() {
        let mut arena = TopologyArena::new();
        let coords = subdivided(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)], 301);
        let wire = polygon(&mut arena, &coords);
        let cycles = arena.wire_intersections(wire, 1e-5).unwrap();

        assert_eq!(cycles.len(), 2);
        for &cycle in &cycles {
            assert_relative_eq!(arena.wire_area(cycle).unwrap(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn select_largest_of_nothing() {
        let arena = TopologyArena::new();
        assert!(arena.select_largest(&[]).is_none());
    }
}
