//! Differentiable-simulation context: the parameter vector, the broadcast
//! operation, and gradient/Hessian retrieval.
//!
//! A scalar parameter vector reaches per-element state through exactly one
//! channel: an `I64` attribute named `diff/<name>` maps each row of the `F64`
//! attribute `<name>` in the same collection to a parameter index (-1 leaves
//! the row unlinked), and `broadcast` copies the parameter values across.
//! After a backward pass the `pGpP` and `H` blocks are available read-only
//! until the next `clear`.
#![warn(missing_docs)]

pub mod sparse;

pub use sparse::SparseMatrix;

use std::cell::RefCell;
use std::rc::Rc;

use crate::attribute::{AttrType, AttributeCollection};
use crate::builtin;
use crate::scene::scene::SceneCore;
use crate::scene_error::MeshSceneError;

/// Differentiable-simulation state owned by the scene core.
#[derive(Debug, Default)]
pub(crate) struct DiffSimState {
    pub(crate) params: Vec<f64>,
    pub(crate) pgpp: Option<SparseMatrix>,
    pub(crate) hessian: Option<SparseMatrix>,
}

/// Accessor handle onto the scene's differentiable-simulation context.
#[derive(Clone)]
pub struct DiffSim {
    pub(crate) core: Rc<RefCell<SceneCore>>,
}

impl DiffSim {
    /// Parameter-vector accessor.
    pub fn parameters(&self) -> ParameterCollection {
        ParameterCollection {
            core: Rc::clone(&self.core),
        }
    }

    /// Discards accumulated gradient/Hessian state.
    ///
    /// Required before a fresh forward+backward pass; the blocks accumulate
    /// across sub-steps otherwise.
    pub fn clear(&self) {
        let mut core = self.core.borrow_mut();
        core.diff_sim.pgpp = None;
        core.diff_sim.hessian = None;
    }

    /// Partial derivative of the per-DOF residual w.r.t. the parameters.
    ///
    /// # Errors
    /// `NoGradientAvailable` before any backward pass or after `clear`.
    #[allow(non_snake_case)]
    pub fn pGpP(&self) -> Result<SparseMatrix, MeshSceneError> {
        self.core
            .borrow()
            .diff_sim
            .pgpp
            .clone()
            .ok_or(MeshSceneError::NoGradientAvailable)
    }

    /// The system Hessian of the last backward pass.
    ///
    /// # Errors
    /// `NoGradientAvailable` before any backward pass or after `clear`.
    #[allow(non_snake_case)]
    pub fn H(&self) -> Result<SparseMatrix, MeshSceneError> {
        self.core
            .borrow()
            .diff_sim
            .hessian
            .clone()
            .ok_or(MeshSceneError::NoGradientAvailable)
    }

    /// Installs the blocks produced by a backward pass.
    pub(crate) fn set_gradients(&self, hessian: SparseMatrix, pgpp: SparseMatrix) {
        let mut core = self.core.borrow_mut();
        core.diff_sim.hessian = Some(hessian);
        core.diff_sim.pgpp = Some(pgpp);
    }
}

/// The differentiable parameter vector.
#[derive(Clone)]
pub struct ParameterCollection {
    pub(crate) core: Rc<RefCell<SceneCore>>,
}

impl ParameterCollection {
    /// Resizes the vector; new entries take `default`.
    pub fn resize(&self, len: usize, default: f64) {
        self.core.borrow_mut().diff_sim.params.resize(len, default);
    }

    /// Current length.
    pub fn size(&self) -> usize {
        self.core.borrow().diff_sim.params.len()
    }

    /// Copy of the whole vector.
    pub fn view(&self) -> Vec<f64> {
        self.core.borrow().diff_sim.params.clone()
    }

    /// Reads one entry.
    ///
    /// # Errors
    /// `RowOutOfBounds` past the end of the vector.
    pub fn get(&self, index: usize) -> Result<f64, MeshSceneError> {
        let core = self.core.borrow();
        core.diff_sim
            .params
            .get(index)
            .copied()
            .ok_or_else(|| MeshSceneError::RowOutOfBounds {
                name: "parameters".to_string(),
                row: index,
                len: core.diff_sim.params.len(),
            })
    }

    /// Writes one entry.
    ///
    /// # Errors
    /// `RowOutOfBounds` past the end of the vector.
    pub fn set(&self, index: usize, value: f64) -> Result<(), MeshSceneError> {
        let mut core = self.core.borrow_mut();
        let len = core.diff_sim.params.len();
        let cell = core.diff_sim.params.get_mut(index).ok_or(
            MeshSceneError::RowOutOfBounds {
                name: "parameters".to_string(),
                row: index,
                len,
            },
        )?;
        *cell = value;
        Ok(())
    }

    /// Pushes the parameter vector into every parameter-linked attribute of
    /// every registered current geometry.
    ///
    /// # Errors
    /// `IndexOutOfRange` when a link refers past the end of the vector;
    /// `TypeMismatch` when a `diff/<name>` link has no `F64` target.
    pub fn broadcast(&self) -> Result<(), MeshSceneError> {
        let (params, slots) = {
            let core = self.core.borrow();
            let slots: Vec<_> = core
                .slots
                .values()
                .map(|pair| Rc::clone(&pair.current))
                .collect();
            (core.diff_sim.params.clone(), slots)
        };
        for slot in slots {
            let geometry = slot.geometry();
            broadcast_collection(geometry.meta(), &params)?;
            broadcast_collection(geometry.vertices(), &params)?;
            broadcast_collection(geometry.edges(), &params)?;
            broadcast_collection(geometry.triangles(), &params)?;
            broadcast_collection(geometry.tetrahedra(), &params)?;
            broadcast_collection(geometry.instances(), &params)?;
        }
        Ok(())
    }
}

fn broadcast_collection(
    collection: &AttributeCollection,
    params: &[f64],
) -> Result<(), MeshSceneError> {
    for (name, link_slot) in collection.iter() {
        let Some(target_name) = name.strip_prefix(builtin::DIFF_PREFIX) else {
            continue;
        };
        if link_slot.attr_type() != AttrType::I64 {
            continue;
        }
        let Some(target) = collection.find(target_name) else {
            continue;
        };
        if target.attr_type() != AttrType::F64 {
            return Err(MeshSceneError::TypeMismatch {
                name: target_name.to_string(),
                stored: target.attr_type(),
                requested: AttrType::F64,
            });
        }
        let links = link_slot.view().to_vec::<i64>()?;
        let target_view = target.view_mut()?;
        for (row, &link) in links.iter().enumerate() {
            if link < 0 {
                continue;
            }
            let index = link as usize;
            let value = *params.get(index).ok_or(MeshSceneError::IndexOutOfRange {
                index: link as u64,
                count: params.len(),
            })?;
            target_view.set::<f64>(row, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::linemesh;
    use crate::scene::Scene;
    use glam::DVec3;

    #[test]
    fn broadcast_follows_the_link_convention() {
        let scene = Scene::with_default_config();
        let object = scene.objects().create("rod");

        let mut rod = linemesh(
            &[DVec3::ZERO, DVec3::X, DVec3::X * 2.0],
            &[[0, 1], [1, 2]],
        )
        .unwrap();
        rod.edges_mut().create("kappa", 0.0f64).unwrap();
        let link = rod.edges_mut().create("diff/kappa", -1i64).unwrap();
        link.view_mut().unwrap().copy_from_slice(&[0i64, 0]).unwrap();

        object.geometries().create(&rod).unwrap();

        let parameters = scene.diff_sim().parameters();
        parameters.resize(1, 0.0);
        parameters.set(0, 2.5).unwrap();
        parameters.broadcast().unwrap();

        let (current, _) = scene
            .geometries()
            .find(object.geometries().ids().unwrap()[0]);
        let geometry = current.unwrap();
        let geometry = geometry.geometry();
        let kappa = geometry.edges().find("kappa").unwrap();
        assert_eq!(kappa.view().to_vec::<f64>().unwrap(), vec![2.5, 2.5]);
    }

    #[test]
    fn broadcast_rejects_dangling_links() {
        let scene = Scene::with_default_config();
        let object = scene.objects().create("rod");
        let mut rod = linemesh(&[DVec3::ZERO, DVec3::X], &[[0, 1]]).unwrap();
        rod.edges_mut().create("kappa", 0.0f64).unwrap();
        let link = rod.edges_mut().create("diff/kappa", 3i64).unwrap();
        drop(link);
        object.geometries().create(&rod).unwrap();

        let parameters = scene.diff_sim().parameters();
        parameters.resize(1, 0.0);
        assert!(matches!(
            parameters.broadcast(),
            Err(MeshSceneError::IndexOutOfRange { index: 3, count: 1 })
        ));
    }

    #[test]
    fn gradients_gate_on_backward() {
        let scene = Scene::with_default_config();
        let diff = scene.diff_sim();
        assert!(matches!(diff.H(), Err(MeshSceneError::NoGradientAvailable)));
        diff.set_gradients(SparseMatrix::new(3, 3), SparseMatrix::new(3, 1));
        assert_eq!(diff.H().unwrap().rows(), 3);
        assert_eq!(diff.pGpP().unwrap().cols(), 1);
        diff.clear();
        assert!(matches!(
            diff.pGpP(),
            Err(MeshSceneError::NoGradientAvailable)
        ));
    }
}
