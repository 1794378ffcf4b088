//! Host reference backend.
//!
//! A deliberately small solver that exercises every boundary of the engine
//! contract without prescribing a real algorithm: semi-implicit Euler under
//! the configured gravity, honoring `is_fixed` pins and
//! `is_constrained`/`aim_position` targets, with a backward pass that emits
//! an identity-pattern Hessian over vertex DOFs and one `pGpP` entry per
//! parameter-linked element DOF.

use std::collections::BTreeMap;

use glam::DVec3;

use crate::attribute::{AttrType, AttributeCollection};
use crate::builtin;
use crate::diff_sim::SparseMatrix;
use crate::engine::Engine;
use crate::geometry::Geometry;
use crate::scene::config::SimConfig;
use crate::scene::{Scene, SharedGeometrySlot};
use crate::scene_error::MeshSceneError;

#[derive(Debug, Default)]
struct Staged {
    positions: Vec<DVec3>,
    velocities: Vec<DVec3>,
}

/// Host-side reference engine.
#[derive(Debug, Default)]
pub struct HostEngine {
    config: SimConfig,
    staged: BTreeMap<u64, Staged>,
}

impl HostEngine {
    /// Creates an engine; the configuration is read at `init`.
    pub fn new() -> Self {
        Self::default()
    }

    fn advance_slot(&self, geometry: &Geometry, dt: f64, gravity: DVec3) -> Result<Staged, MeshSceneError> {
        let positions = geometry.positions().view().to_vec::<DVec3>()?;
        let velocities = match geometry.vertices().find(builtin::VELOCITY) {
            Some(slot) => slot.view().to_vec::<DVec3>()?,
            None => vec![DVec3::ZERO; positions.len()],
        };
        let fixed = match geometry.vertices().find(builtin::IS_FIXED) {
            Some(slot) => slot.view().to_vec::<i32>()?,
            None => vec![0; positions.len()],
        };
        let constrained = match geometry.vertices().find(builtin::IS_CONSTRAINED) {
            Some(slot) => slot.view().to_vec::<i32>()?,
            None => vec![0; positions.len()],
        };
        let aims = match geometry.vertices().find(builtin::AIM_POSITION) {
            Some(slot) => slot.view().to_vec::<DVec3>()?,
            None => positions.clone(),
        };

        let mut staged = Staged {
            positions: Vec::with_capacity(positions.len()),
            velocities: Vec::with_capacity(positions.len()),
        };
        for i in 0..positions.len() {
            let (x, v) = if fixed[i] != 0 {
                (positions[i], DVec3::ZERO)
            } else if constrained[i] != 0 {
                ((aims[i]), (aims[i] - positions[i]) / dt)
            } else {
                let v = velocities[i] + gravity * dt;
                (positions[i] + v * dt, v)
            };
            staged.positions.push(x);
            staged.velocities.push(v);
        }
        Ok(staged)
    }
}

fn current_slots(scene: &Scene) -> Vec<SharedGeometrySlot> {
    scene
        .geometries()
        .ids()
        .into_iter()
        .filter_map(|id| scene.geometries().find(id).0)
        .collect()
}

/// Entries of `pGpP` contributed by one collection's parameter links:
/// for each linked element, one unit entry per DOF of each vertex the
/// element touches.
fn link_entries(
    collection: &AttributeCollection,
    element_vertices: &dyn Fn(usize) -> Vec<u64>,
    vertex_offset: usize,
    pgpp: &mut SparseMatrix,
) -> Result<(), MeshSceneError> {
    for (name, link_slot) in collection.iter() {
        if !name.starts_with(builtin::DIFF_PREFIX) || link_slot.attr_type() != AttrType::I64 {
            continue;
        }
        let links = link_slot.view().to_vec::<i64>()?;
        for (element, &link) in links.iter().enumerate() {
            if link < 0 {
                continue;
            }
            for vertex in element_vertices(element) {
                let dof = (vertex_offset + vertex as usize) * 3;
                for k in 0..3 {
                    pgpp.push(dof + k, link as usize, 1.0);
                }
            }
        }
    }
    Ok(())
}

impl Engine for HostEngine {
    fn name(&self) -> &str {
        "host"
    }

    fn do_init(&mut self, scene: &Scene) -> Result<(), MeshSceneError> {
        self.config = SimConfig::from_value(&scene.config())?;
        self.config.validate()?;
        self.staged.clear();

        let element_count = scene.contact_tabular().element_count();
        for slot in current_slots(scene) {
            let mut geometry = slot.geometry_mut();
            if geometry.vertices().find(builtin::VELOCITY).is_none() {
                geometry
                    .vertices_mut()
                    .create(builtin::VELOCITY, DVec3::ZERO)?;
            }
            if let Some(tags) = geometry.instances().find(builtin::CONTACT_ELEMENT_ID) {
                for tag in tags.view().to_vec::<i64>()? {
                    if tag < 0 || tag as usize >= element_count {
                        return Err(MeshSceneError::ConfigMismatch(format!(
                            "slot {} tags contact element {tag}, but only {element_count} are registered",
                            slot.id()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn do_advance(&mut self, scene: &Scene, frame: u64) -> Result<(), MeshSceneError> {
        let dt = self.config.dt;
        let gravity = self.config.gravity_vec();
        log::debug!("host engine advancing frame {frame} with dt {dt}");
        for slot in current_slots(scene) {
            let staged = self.advance_slot(&slot.geometry(), dt, gravity)?;
            self.staged.insert(slot.id(), staged);
        }
        Ok(())
    }

    fn do_retrieve(&mut self, scene: &Scene) -> Result<(), MeshSceneError> {
        for slot in current_slots(scene) {
            let Some(staged) = self.staged.get(&slot.id()) else {
                log::warn!("no staged state for slot {}; retrieve skipped", slot.id());
                continue;
            };
            let geometry = slot.geometry();
            geometry
                .positions()
                .view_mut()?
                .copy_from_slice(&staged.positions)?;
            if let Some(velocity) = geometry.vertices().find(builtin::VELOCITY) {
                velocity.view_mut()?.copy_from_slice(&staged.velocities)?;
            }
        }
        Ok(())
    }

    fn do_backward(&mut self, scene: &Scene) -> Result<(), MeshSceneError> {
        let slots = current_slots(scene);
        let total_vertices: usize = slots.iter().map(|s| s.geometry().vertex_count()).sum();
        let ndof = total_vertices * 3;
        let nparams = scene.diff_sim().parameters().size();

        let mut hessian = SparseMatrix::new(ndof, ndof);
        for dof in 0..ndof {
            hessian.push(dof, dof, 1.0);
        }

        let mut pgpp = SparseMatrix::new(ndof, nparams);
        let mut vertex_offset = 0usize;
        for slot in &slots {
            let geometry = slot.geometry();
            link_entries(
                geometry.vertices(),
                &|v| vec![v as u64],
                vertex_offset,
                &mut pgpp,
            )?;
            let edges = geometry.topology().edges().to_vec();
            link_entries(
                geometry.edges(),
                &|e| edges[e].to_vec(),
                vertex_offset,
                &mut pgpp,
            )?;
            let triangles = geometry.topology().triangles().to_vec();
            link_entries(
                geometry.triangles(),
                &|t| triangles[t].to_vec(),
                vertex_offset,
                &mut pgpp,
            )?;
            let tetrahedra = geometry.topology().tetrahedra().to_vec();
            link_entries(
                geometry.tetrahedra(),
                &|t| tetrahedra[t].to_vec(),
                vertex_offset,
                &mut pgpp,
            )?;
            vertex_offset += geometry.vertex_count();
        }

        scene.diff_sim().set_gradients(hessian, pgpp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tetmesh;

    fn scene_with_tet() -> (Scene, u64) {
        let scene = Scene::with_default_config();
        let object = scene.objects().create("tet");
        let tet = tetmesh(
            &[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO],
            &[[0, 1, 2, 3]],
        )
        .unwrap();
        let (current, _) = object.geometries().create(&tet).unwrap();
        (scene, current.id())
    }

    #[test]
    fn free_vertices_fall_under_gravity() {
        let (scene, id) = scene_with_tet();
        let mut engine = HostEngine::new();
        engine.do_init(&scene).unwrap();
        engine.do_advance(&scene, 1).unwrap();
        engine.do_retrieve(&scene).unwrap();

        let (current, _) = scene.geometries().find(id);
        let geometry = current.unwrap();
        let geometry = geometry.geometry();
        let p = geometry.positions().view().get::<DVec3>(3).unwrap();
        // One semi-implicit Euler step from rest: dy = g * dt^2.
        assert!((p.y - (-9.8 * 0.01 * 0.01)).abs() < 1e-12);
    }

    #[test]
    fn fixed_vertices_do_not_move() {
        let (scene, id) = scene_with_tet();
        {
            let (current, _) = scene.geometries().find(id);
            let geometry = current.unwrap();
            let mut geometry = geometry.geometry_mut();
            let fixed = geometry.vertices_mut().create(builtin::IS_FIXED, 0i32).unwrap();
            fixed.view_mut().unwrap().set::<i32>(0, 1).unwrap();
        }
        let mut engine = HostEngine::new();
        engine.do_init(&scene).unwrap();
        engine.do_advance(&scene, 1).unwrap();
        engine.do_retrieve(&scene).unwrap();

        let (current, _) = scene.geometries().find(id);
        let geometry = current.unwrap();
        let geometry = geometry.geometry();
        assert_eq!(geometry.positions().view().get::<DVec3>(0).unwrap(), DVec3::X);
    }

    #[test]
    fn init_rejects_unregistered_contact_tags() {
        let (scene, id) = scene_with_tet();
        {
            let (current, _) = scene.geometries().find(id);
            let geometry = current.unwrap();
            let mut geometry = geometry.geometry_mut();
            let tags = geometry
                .instances_mut()
                .create(builtin::CONTACT_ELEMENT_ID, 5i64)
                .unwrap();
            drop(tags);
        }
        let mut engine = HostEngine::new();
        assert!(matches!(
            engine.do_init(&scene),
            Err(MeshSceneError::ConfigMismatch(_))
        ));
    }
}
