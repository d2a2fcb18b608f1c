// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of taxonomy items into kernel shapes.
//!
//! Dispatch is a single `match` over [`Item`]; adding an item kind means
//! adding a variant and the compiler points at every place to extend.

use shellweld_topology::{FaceKey, TopologyKey, CONFUSION};

use crate::error::{Error, Result};
use crate::faceset::FacesetHelper;
use crate::kernel::{ConversionResult, Kernel};
use crate::taxonomy::{Collection, Extrusion, Face, Item, Loop, Shell};

impl Kernel {
    /// Converts an item into zero or more shapes.
    ///
    /// Collections skip (and log) children that fail; every other item
    /// reports its failure to the caller.
    pub fn convert(&mut self, item: &Item) -> Result<Vec<ConversionResult>> {
        match item {
            Item::Shell(shell) => Ok(vec![self.convert_shell(shell)?]),
            Item::Face(face) => Ok(vec![self.convert_face(face)?]),
            Item::Loop(lp) => Ok(self.convert_loop(lp)?.into_iter().collect()),
            Item::Extrusion(extrusion) => Ok(vec![self.convert_extrusion(extrusion)?]),
            Item::Collection(collection) => Ok(self.convert_collection(collection)),
        }
    }

    /// Welds the shell's loops and assembles one face per usable face.
    ///
    /// A shell declared closed that also closes topologically becomes a
    /// solid.
    pub fn convert_shell(&mut self, shell: &Shell) -> Result<ConversionResult> {
        let (faces, non_manifold) = {
            let mut helper = FacesetHelper::new(self, shell)?;
            if helper.is_exhausted() {
                return Err(Error::NoGeometry(shell.id));
            }
            let mut faces = Vec::with_capacity(shell.faces.len());
            for face in &shell.faces {
                if let Some(fk) = helper.face(face)? {
                    faces.push(fk);
                }
            }
            (faces, helper.non_manifold_seen())
        };
        if faces.is_empty() {
            return Err(Error::NoGeometry(shell.id));
        }

        let shell_key = self.arena.add_shell(&faces, shell.closed)?;
        let shape = if shell.closed && self.arena.shell_is_closed(shell_key) {
            TopologyKey::Solid(self.arena.add_solid(shell_key)?)
        } else {
            TopologyKey::Shell(shell_key)
        };
        Ok(ConversionResult {
            item: shell.id,
            shape,
            non_manifold,
        })
    }

    pub fn convert_face(&mut self, face: &Face) -> Result<ConversionResult> {
        let (fk, non_manifold) = self.build_face(face)?;
        Ok(ConversionResult {
            item: face.id,
            shape: TopologyKey::Face(fk),
            non_manifold,
        })
    }

    /// A loop converts to a wire only when curves are requested.
    pub fn convert_loop(&mut self, lp: &Loop) -> Result<Option<ConversionResult>> {
        if !self.settings.include_curves {
            tracing::debug!(node = %lp.id, "Skipping loop outside curve conversion");
            return Ok(None);
        }
        let mut helper = FacesetHelper::from_loops(self, lp.id, [lp], false)?;
        let wire = helper.wire(lp)?.ok_or(Error::NoGeometry(lp.id))?;
        Ok(Some(ConversionResult {
            item: lp.id,
            shape: TopologyKey::Wire(wire),
            non_manifold: helper.non_manifold_seen(),
        }))
    }

    /// Sweeps the basis along the extrusion direction.
    ///
    /// A basis of several faces becomes a compound of one prism per face.
    pub fn convert_extrusion(&mut self, extrusion: &Extrusion) -> Result<ConversionResult> {
        if extrusion.depth < self.settings.precision {
            tracing::error!(
                node = %extrusion.id,
                depth = extrusion.depth,
                "Non-positive extrusion depth"
            );
            return Err(Error::InvalidExtrusion(format!(
                "depth {} below precision for {}",
                extrusion.depth, extrusion.id
            )));
        }
        let vector = extrusion.sweep_vector();
        if vector.norm() < CONFUSION {
            return Err(Error::InvalidExtrusion(format!(
                "zero direction for {}",
                extrusion.id
            )));
        }

        let mut faces: Vec<FaceKey> = Vec::with_capacity(extrusion.basis.len());
        let mut non_manifold = false;
        for face in &extrusion.basis {
            match self.build_face(face) {
                Ok((fk, split)) => {
                    faces.push(fk);
                    non_manifold |= split;
                }
                Err(Error::NoGeometry(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let shape = match faces.as_slice() {
            [] => return Err(Error::NoGeometry(extrusion.id)),
            [face] if extrusion.basis.len() == 1 => {
                TopologyKey::Solid(self.arena.make_prism(*face, &vector)?)
            }
            faces => {
                let mut solids = Vec::with_capacity(faces.len());
                for &fk in faces {
                    solids.push(self.arena.make_prism(fk, &vector)?);
                }
                TopologyKey::CompSolid(self.arena.add_comp_solid(&solids)?)
            }
        };

        if let Some(matrix) = extrusion.matrix() {
            self.arena.transform(shape, &matrix);
        }
        Ok(ConversionResult {
            item: extrusion.id,
            shape,
            non_manifold,
        })
    }

    /// Converts the children matching the representation filter: loops when
    /// curves are requested, everything else otherwise.
    pub fn convert_collection(&mut self, collection: &Collection) -> Vec<ConversionResult> {
        let use_curves = self.settings.include_curves;
        let mut results = Vec::new();
        for child in &collection.children {
            if !matches!(child, Item::Collection(_)) && child.is_curve() != use_curves {
                continue;
            }
            match self.convert(child) {
                Ok(shapes) => results.extend(shapes),
                Err(e) => {
                    tracing::warn!(
                        node = %child.id(),
                        kind = child.kind(),
                        error = %e,
                        "Failed to convert item"
                    );
                }
            }
        }
        results
    }

    /// A standalone face welded on its own.
    fn build_face(&mut self, face: &Face) -> Result<(FaceKey, bool)> {
        let mut helper = FacesetHelper::for_face(self, face)?;
        let fk = helper.face(face)?.ok_or(Error::NoGeometry(face.id))?;
        Ok((fk, helper.non_manifold_seen()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ConversionSettings;
    use crate::taxonomy::{IdAllocator, NodeId, PointNode};
    use approx::assert_relative_eq;

    fn rectangle(ids: &mut IdAllocator, x0: f64, w: f64, h: f64) -> Face {
        let points: Vec<PointNode> = [(x0, 0.0), (x0 + w, 0.0), (x0 + w, h), (x0, h)]
            .iter()
            .map(|&(x, y)| PointNode::new(ids.allocate(), x, y, 0.0))
            .collect();
        let lp = Loop::polygon(ids.allocate(), &points, true);
        Face::new(ids.allocate(), vec![lp])
    }

    fn extrusion(ids: &mut IdAllocator, basis: Vec<Face>, depth: f64) -> Extrusion {
        Extrusion {
            id: ids.allocate(),
            basis,
            direction: [0.0, 0.0, 1.0],
            depth,
            placement: None,
        }
    }

    #[test]
    fn extrusion_of_single_face_is_solid() {
        let mut ids = IdAllocator::new();
        let face = rectangle(&mut ids, 0.0, 2.0, 1.0);
        let item = Item::Extrusion(extrusion(&mut ids, vec![face], 3.0));

        let mut kernel = Kernel::default();
        let results = kernel.convert(&item).unwrap();
        assert_eq!(results.len(), 1);
        let TopologyKey::Solid(solid) = results[0].shape else {
            panic!("expected a solid, got {:?}", results[0].shape);
        };
        assert_relative_eq!(kernel.arena().solid_volume(solid).unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn composite_basis_is_comp_solid() {
        let mut ids = IdAllocator::new();
        let a = rectangle(&mut ids, 0.0, 1.0, 1.0);
        let b = rectangle(&mut ids, 3.0, 1.0, 1.0);
        let item = Item::Extrusion(extrusion(&mut ids, vec![a, b], 1.0));

        let mut kernel = Kernel::default();
        let results = kernel.convert(&item).unwrap();
        let TopologyKey::CompSolid(cs) = results[0].shape else {
            panic!("expected a compound solid");
        };
        assert_eq!(kernel.arena().comp_solid_solids(cs).unwrap().len(), 2);
    }

    #[test]
    fn shallow_extrusion_is_rejected() {
        let mut ids = IdAllocator::new();
        let face = rectangle(&mut ids, 0.0, 1.0, 1.0);
        let item = Item::Extrusion(extrusion(&mut ids, vec![face], 1e-7));

        let mut kernel = Kernel::default();
        assert!(matches!(kernel.convert(&item), Err(Error::InvalidExtrusion(_))));
    }

    #[test]
    fn placement_moves_solid() {
        let mut ids = IdAllocator::new();
        let face = rectangle(&mut ids, 0.0, 1.0, 1.0);
        let mut ex = extrusion(&mut ids, vec![face], 1.0);
        let mut placement = [0.0; 16];
        for i in 0..4 {
            placement[i * 5] = 1.0;
        }
        placement[12] = 10.0;
        ex.placement = Some(placement);

        let mut kernel = Kernel::default();
        let results = kernel.convert(&Item::Extrusion(ex)).unwrap();
        let arena = kernel.arena();
        let xs: Vec<f64> = arena
            .vertices_of(results[0].shape)
            .into_iter()
            .map(|v| arena.vertex_point(v).unwrap().x)
            .collect();
        assert!(xs.iter().all(|&x| (10.0..=11.0).contains(&x)));
    }

    #[test]
    fn collection_filters_curves_and_skips_failures() {
        let mut ids = IdAllocator::new();
        let face = rectangle(&mut ids, 0.0, 1.0, 1.0);
        let curve = face.loops[0].clone();
        let basis = rectangle(&mut ids, 0.0, 1.0, 1.0);
        let bad = extrusion(&mut ids, vec![basis], 0.0);
        let collection = Item::Collection(Collection {
            id: ids.allocate(),
            children: vec![
                Item::Face(face),
                Item::Loop(curve),
                Item::Extrusion(bad),
            ],
        });

        let mut body = Kernel::default();
        let results = body.convert(&collection).unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].shape, TopologyKey::Face(_)));

        let mut curves = Kernel::new(ConversionSettings::default().with_include_curves(true));
        let results = curves.convert(&collection).unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].shape, TopologyKey::Wire(_)));
    }

    #[test]
    fn loops_are_ignored_for_body_geometry() {
        let mut ids = IdAllocator::new();
        let face = rectangle(&mut ids, 0.0, 1.0, 1.0);
        let mut kernel = Kernel::default();
        assert!(kernel.convert(&Item::Loop(face.loops[0].clone())).unwrap().is_empty());
        assert_eq!(kernel.active_faceset(), None::<NodeId>);
    }
}
