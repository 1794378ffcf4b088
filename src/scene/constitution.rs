//! Constitution tabular and the concrete attribute-tagging constitutions.
//!
//! A constitution is a material/behavior model tag: `apply_to` writes the
//! model's attributes onto a geometry and nothing else; no solver call
//! happens here. The tabular records which models a scene uses; UIDs must
//! come from the [`UidRegistry`](crate::builtin::UidRegistry) the scene was
//! constructed with.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;

use crate::attribute::AttributeCollection;
use crate::builtin;
use crate::geometry::Geometry;
use crate::scene::scene::SceneCore;
use crate::scene_error::MeshSceneError;

/// UID of the Neo-Hookean elastic constitution.
pub const NEO_HOOKEAN_UID: u64 = 9;
/// UID of the soft position-constraint constitution.
pub const SOFT_POSITION_CONSTRAINT_UID: u64 = 13;

/// A material/behavior model tag.
pub trait Constitution {
    /// The library-assigned unique identifier.
    fn uid(&self) -> u64;
    /// Human-readable model name.
    fn name(&self) -> &str;
}

/// Constitution state owned by the scene core.
#[derive(Debug, Default)]
pub(crate) struct ConstitutionState {
    pub(crate) registered: std::collections::BTreeMap<u64, String>,
}

/// Accessor handle onto the scene's constitution tabular.
#[derive(Clone)]
pub struct ConstitutionTabular {
    pub(crate) core: Rc<RefCell<SceneCore>>,
}

impl ConstitutionTabular {
    /// Registers a constitution.
    ///
    /// # Errors
    /// `DuplicateConstitution` when the UID is already present;
    /// `UnknownConstitution` when the UID is missing from the scene's
    /// UID registry.
    pub fn insert(&self, constitution: &dyn Constitution) -> Result<(), MeshSceneError> {
        let mut core = self.core.borrow_mut();
        let uid = constitution.uid();
        if !core.uid_registry.contains(uid) {
            return Err(MeshSceneError::UnknownConstitution(uid));
        }
        if core.constitutions.registered.contains_key(&uid) {
            return Err(MeshSceneError::DuplicateConstitution(uid));
        }
        core.constitutions
            .registered
            .insert(uid, constitution.name().to_string());
        Ok(())
    }

    /// Registered UIDs in ascending order.
    pub fn uids(&self) -> Vec<u64> {
        self.core
            .borrow()
            .constitutions
            .registered
            .keys()
            .copied()
            .collect()
    }

    /// Number of registered constitutions.
    pub fn size(&self) -> usize {
        self.core.borrow().constitutions.registered.len()
    }
}

/// Lame parameters for elastic constitutions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElasticModuli {
    /// First Lame parameter.
    pub lambda: f64,
    /// Shear modulus.
    pub mu: f64,
}

impl ElasticModuli {
    /// Converts Young's modulus and Poisson's ratio to Lame parameters.
    pub fn youngs_poisson(youngs: f64, poisson: f64) -> Self {
        let mu = youngs / (2.0 * (1.0 + poisson));
        let lambda = youngs * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
        Self { lambda, mu }
    }
}

fn set_meta_u64(
    meta: &mut AttributeCollection,
    name: &str,
    value: u64,
) -> Result<(), MeshSceneError> {
    match meta.find(name) {
        Some(slot) => slot.view_mut()?.set::<u64>(0, value),
        None => {
            meta.create_protected(name, value)?;
            Ok(())
        }
    }
}

fn fill_f64(
    collection: &mut AttributeCollection,
    name: &str,
    value: f64,
) -> Result<(), MeshSceneError> {
    match collection.find(name) {
        Some(slot) => slot.view_mut()?.fill(value),
        None => {
            collection.create(name, value)?;
            Ok(())
        }
    }
}

/// Hyperelastic volumetric constitution; tags tetrahedra with Lame moduli.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeoHookean;

impl NeoHookean {
    /// Creates the constitution tag.
    pub fn new() -> Self {
        Self
    }

    /// Writes `mu`/`lambda` per tetrahedron, `mass_density` into meta, and
    /// the constitution UID into meta.
    pub fn apply_to(
        &self,
        geometry: &mut Geometry,
        moduli: ElasticModuli,
        mass_density: f64,
    ) -> Result<(), MeshSceneError> {
        set_meta_u64(geometry.meta_mut(), builtin::CONSTITUTION_UID, self.uid())?;
        fill_f64(geometry.tetrahedra_mut(), "mu", moduli.mu)?;
        fill_f64(geometry.tetrahedra_mut(), "lambda", moduli.lambda)?;
        fill_f64(geometry.meta_mut(), builtin::MASS_DENSITY, mass_density)?;
        Ok(())
    }
}

impl Constitution for NeoHookean {
    fn uid(&self) -> u64 {
        NEO_HOOKEAN_UID
    }

    fn name(&self) -> &str {
        "NeoHookean"
    }
}

/// Soft position constraint; prepares the per-vertex constraint/aim
/// attributes the animator writes each frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftPositionConstraint;

impl SoftPositionConstraint {
    /// Creates the constitution tag.
    pub fn new() -> Self {
        Self
    }

    /// Writes the constraint UID into meta and initializes per-vertex
    /// `is_constrained` (0), `aim_position` (the current positions), and
    /// `strength_ratio`.
    pub fn apply_to(
        &self,
        geometry: &mut Geometry,
        strength_ratio: f64,
    ) -> Result<(), MeshSceneError> {
        set_meta_u64(geometry.meta_mut(), builtin::CONSTRAINT_UID, self.uid())?;
        if geometry.vertices().find(builtin::IS_CONSTRAINED).is_none() {
            geometry
                .vertices_mut()
                .create_protected(builtin::IS_CONSTRAINED, 0i32)?;
        }
        let positions = geometry.positions().view().to_vec::<DVec3>()?;
        let aim = match geometry.vertices().find(builtin::AIM_POSITION) {
            Some(slot) => slot,
            None => geometry
                .vertices_mut()
                .create_protected(builtin::AIM_POSITION, DVec3::ZERO)?,
        };
        aim.view_mut()?.copy_from_slice(&positions)?;
        fill_f64(geometry.vertices_mut(), "strength_ratio", strength_ratio)?;
        Ok(())
    }
}

impl Constitution for SoftPositionConstraint {
    fn uid(&self) -> u64 {
        SOFT_POSITION_CONSTRAINT_UID
    }

    fn name(&self) -> &str {
        "SoftPositionConstraint"
    }
}
