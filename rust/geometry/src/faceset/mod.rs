// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology reconstruction for polygonal face sets.
//!
//! Face sets arrive as loops of independent coordinate triples: vertices
//! shared by adjacent faces are repeated, often with slight drift, faces are
//! sometimes declared twice, and boundaries may cross themselves. The
//! [`FacesetHelper`] turns such loops into kernel wires that share edges:
//!
//! 1. all loop points go into a [`PointIndex`](shellweld_topology::PointIndex)
//!    and a welding epsilon is picked from their bounds
//!    ([`select_epsilon`](crate::tolerance::select_epsilon));
//! 2. near-coincident points are welded into canonical vertices
//!    ([`weld::weld`]);
//! 3. loops are reduced to canonical edges, duplicates and degenerate loops
//!    are set aside and edge usage is counted ([`canonical::Tally`]);
//! 4. if nothing survives, the pass repeats with a smaller epsilon
//!    ([`retry::WeldState`]);
//! 5. every used canonical edge becomes one kernel edge, and wires are built
//!    per loop on request, splitting self-intersecting boundaries.

pub mod canonical;
pub mod retry;
pub mod weld;

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use shellweld_topology::{Aabb, EdgeKey, FaceKey, VertexKey, WireBuilder, WireKey, CONFUSION};

use crate::error::Result;
use crate::kernel::Kernel;
use crate::taxonomy::{Face, Loop, NodeId, PointNode, Shell};
use crate::tolerance::select_epsilon;

use canonical::{segments, CanonicalEdge, Tally};
use retry::WeldState;
use weld::{VertexMap, WeldReport};

/// Counts of the recoverable problems met while welding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FacesetSummary {
    pub duplicate_faces: usize,
    pub degenerate_loops: usize,
    pub non_manifold_edges: usize,
}

impl FacesetSummary {
    fn worth_reporting(&self, closed: bool) -> bool {
        self.duplicate_faces > 0
            || self.degenerate_loops > 0
            || (closed && self.non_manifold_edges > 0)
    }
}

/// Welded view of one shell's loops, scoped to a single conversion.
///
/// The helper holds the kernel mutably for its whole lifetime and marks
/// itself as the kernel's active faceset; dropping it clears the mark.
pub struct FacesetHelper<'k> {
    kernel: &'k mut Kernel,
    owner: NodeId,
    points: Vec<PointNode>,
    mapping: VertexMap,
    duplicates: FxHashSet<NodeId>,
    usage: BTreeMap<CanonicalEdge, usize>,
    edges: BTreeMap<CanonicalEdge, EdgeKey>,
    state: WeldState,
    report: WeldReport,
    summary: FacesetSummary,
    non_manifold: bool,
}

impl<'k> FacesetHelper<'k> {
    /// Welds every loop of `shell`.
    pub fn new(kernel: &'k mut Kernel, shell: &Shell) -> Result<Self> {
        Self::from_loops(kernel, shell.id, shell.loops(), shell.closed)
    }

    /// Welds the loops of a single face.
    pub fn for_face(kernel: &'k mut Kernel, face: &Face) -> Result<Self> {
        Self::from_loops(kernel, face.id, face.loops.iter(), false)
    }

    /// Welds an arbitrary set of loops on behalf of `owner`.
    ///
    /// `closed` only decides whether non-manifold edges are worth a warning.
    pub fn from_loops<'a>(
        kernel: &'k mut Kernel,
        owner: NodeId,
        loops: impl IntoIterator<Item = &'a Loop>,
        closed: bool,
    ) -> Result<Self> {
        let loops: Vec<&Loop> = loops.into_iter().collect();
        let points = weld::collect_points(loops.iter().copied());
        let index = weld::index_points(&points);
        let mut bounds = Aabb::empty();
        for p in &points {
            bounds.add(&p.point());
        }

        let precision = kernel.settings.precision;
        let max_attempts = kernel.settings.max_weld_attempts.max(1);

        let mut state = WeldState::start(select_epsilon(&bounds, precision));
        let mut mapping = VertexMap::default();
        let mut tally = Tally::default();

        while let WeldState::Attempt { index: attempt, epsilon } = state {
            if attempt > 0 {
                tracing::debug!(
                    node = %owner,
                    attempt,
                    epsilon,
                    "Retrying vertex welding with smaller epsilon"
                );
            }
            mapping = weld::weld(&index, &points, epsilon);
            let report = WeldReport::new(&points, &mapping);
            if report.collapsed() {
                tracing::info!(
                    node = %owner,
                    points = report.points,
                    unique = report.unique,
                    canonical = report.canonical,
                    "Collapsed vertices"
                );
            }
            tally = Tally::run(loops.iter().copied(), &mapping);
            state = state.advance(tally.has_edges(), max_attempts);
        }

        if let WeldState::Exhausted { attempts, epsilon } = state {
            tracing::warn!(
                node = %owner,
                attempts,
                epsilon,
                "No edges left after vertex welding"
            );
        }

        let report = WeldReport::new(&points, &mapping);
        let summary = FacesetSummary {
            duplicate_faces: tally.duplicate_faces,
            degenerate_loops: tally.degenerate_loops,
            non_manifold_edges: tally.non_manifold_edges(),
        };

        kernel.active_faceset = Some(owner);
        let mut helper = Self {
            kernel,
            owner,
            points,
            mapping,
            duplicates: tally.duplicates,
            usage: tally.usage,
            edges: BTreeMap::new(),
            state,
            report,
            summary,
            non_manifold: false,
        };
        helper.materialize_edges()?;

        if summary.worth_reporting(closed) {
            tracing::warn!(
                node = %owner,
                duplicate_faces = summary.duplicate_faces,
                degenerate_loops = summary.degenerate_loops,
                non_manifold_edges = summary.non_manifold_edges,
                "Duplicate faces removed, degenerate loops eliminated, non-manifold edges found"
            );
        }
        Ok(helper)
    }

    /// One kernel edge per used canonical edge, between the vertices of the
    /// points whose positions name the canonical ids.
    fn materialize_edges(&mut self) -> Result<()> {
        let FacesetHelper {
            kernel,
            points,
            usage,
            edges,
            ..
        } = self;
        let arena = &mut kernel.arena;
        let mut vertices: FxHashMap<usize, VertexKey> = FxHashMap::default();
        for &(a, b) in usage.keys() {
            let [va, vb] = [a, b].map(|id| {
                *vertices
                    .entry(id)
                    .or_insert_with(|| arena.make_vertex(points[id].point(), CONFUSION))
            });
            edges.insert((a, b), arena.add_edge(va, vb)?);
        }
        Ok(())
    }

    /// The kernel edge between two canonical vertices, in either order.
    pub fn edge(&self, a: usize, b: usize) -> Option<EdgeKey> {
        self.edges.get(&(a.min(b), a.max(b))).copied()
    }

    /// Every closed wire the loop yields.
    ///
    /// `None` for loops recognised as duplicates, loops left with fewer than
    /// three edges and loops this helper was not built with. A boundary that
    /// crosses or touches itself comes back as its simple cycles instead of
    /// a single wire, and marks the helper non-manifold.
    pub fn wires(&mut self, lp: &Loop) -> Result<Option<Vec<WireKey>>> {
        if self.duplicates.contains(&lp.id) {
            return Ok(None);
        }
        let mut builder = WireBuilder::new();
        for segment in segments(lp, &self.mapping) {
            match self.edges.get(&segment.edge) {
                Some(&edge) => builder.push(edge, segment.forward),
                None => return Ok(None),
            }
        }
        if builder.len() < 3 {
            return Ok(None);
        }

        let precision = self.kernel.settings.precision;
        let check = self.kernel.settings.check_wire_intersections;
        let arena = &mut self.kernel.arena;
        let wire = builder.build_closed(arena)?;
        if !check {
            return Ok(Some(vec![wire]));
        }

        let cycles = arena.wire_intersections(wire, precision)?;
        if cycles.is_empty() {
            return Ok(Some(vec![wire]));
        }
        tracing::warn!(
            node = %lp.id,
            cycles = cycles.len(),
            "Self-intersections detected"
        );
        self.non_manifold = true;
        Ok(Some(cycles))
    }

    /// The largest of [`FacesetHelper::wires`].
    pub fn wire(&mut self, lp: &Loop) -> Result<Option<WireKey>> {
        Ok(self
            .wires(lp)?
            .and_then(|wires| self.kernel.arena.select_largest(&wires)))
    }

    /// A face from the largest wire of the outer loop and every cycle of the
    /// inner loops. `None` when the outer loop yields no wire.
    pub fn face(&mut self, face: &Face) -> Result<Option<FaceKey>> {
        let Some(outer_loop) = face.outer() else {
            return Ok(None);
        };
        let Some(outer) = self.wire(outer_loop)? else {
            return Ok(None);
        };
        let mut holes = Vec::new();
        for inner in face.inner() {
            if let Some(wires) = self.wires(inner)? {
                holes.extend(wires);
            }
        }
        Ok(Some(self.kernel.arena.add_face_with_holes(outer, &holes)?))
    }

    /// A self-intersecting boundary has been split by [`FacesetHelper::wires`].
    pub fn non_manifold_seen(&self) -> bool {
        self.non_manifold
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Epsilon of the last welding pass.
    pub fn epsilon(&self) -> f64 {
        self.state.epsilon()
    }

    /// Welding passes run.
    pub fn attempts(&self) -> usize {
        self.state.attempts()
    }

    pub fn state(&self) -> WeldState {
        self.state
    }

    /// Every welding pass failed; no wire can be built.
    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    pub fn summary(&self) -> FacesetSummary {
        self.summary
    }

    pub fn weld_report(&self) -> WeldReport {
        self.report
    }

    /// Canonical vertex of a point node.
    pub fn canonical_id(&self, point: NodeId) -> Option<usize> {
        self.mapping.get(&point).copied()
    }

    pub fn is_duplicate(&self, lp: NodeId) -> bool {
        self.duplicates.contains(&lp)
    }

    /// Loops using each canonical edge, ordered by edge.
    pub fn edge_usage(&self) -> impl Iterator<Item = (CanonicalEdge, usize)> + '_ {
        self.usage.iter().map(|(&edge, &count)| (edge, count))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn kernel(&self) -> &Kernel {
        self.kernel
    }
}

impl Drop for FacesetHelper<'_> {
    fn drop(&mut self) {
        self.kernel.active_faceset = None;
    }
}
