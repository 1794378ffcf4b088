//! Scene: objects, the flat geometry-slot registry, tabulars, animator, and
//! the differentiable-simulation context.
//!
//! The scene is a cheap handle over shared core state; accessor structs
//! (`objects()`, `geometries()`, the tabulars) mirror the orchestration
//! protocol scripts drive. All operations are synchronous and single-threaded.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::builtin::UidRegistry;
use crate::diff_sim::{DiffSim, DiffSimState, ParameterCollection};
use crate::scene::animator::{Animator, AnimatorState};
use crate::scene::config;
use crate::scene::constitution::{ConstitutionState, ConstitutionTabular};
use crate::scene::contact::{ContactState, ContactTabular};
use crate::scene::object::Object;
use crate::scene::slot::{SharedGeometrySlot, SlotPair};
use crate::scene_error::MeshSceneError;

/// One object's record inside the core.
#[derive(Debug, Default)]
pub(crate) struct ObjectRecord {
    pub(crate) name: String,
    pub(crate) geometry_ids: Vec<u64>,
}

/// Shared scene state.
#[derive(Debug)]
pub(crate) struct SceneCore {
    pub(crate) config: serde_json::Value,
    pub(crate) uid_registry: UidRegistry,
    pub(crate) objects: BTreeMap<u64, ObjectRecord>,
    pub(crate) slots: BTreeMap<u64, SlotPair>,
    pub(crate) contact: ContactState,
    pub(crate) constitutions: ConstitutionState,
    pub(crate) animator: AnimatorState,
    pub(crate) diff_sim: DiffSimState,
    next_object_id: u64,
    next_slot_id: u64,
}

impl SceneCore {
    /// Issues a fresh slot ID; IDs are strictly increasing and never reused.
    pub(crate) fn allocate_slot_id(&mut self) -> u64 {
        let id = self.next_slot_id;
        self.next_slot_id += 1;
        id
    }

    fn allocate_object_id(&mut self) -> u64 {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }
}

/// The scene graph root.
pub struct Scene {
    pub(crate) core: Rc<RefCell<SceneCore>>,
}

impl Scene {
    /// Creates a scene from a configuration record and a UID registry.
    pub fn new(config: serde_json::Value, uid_registry: UidRegistry) -> Self {
        Self {
            core: Rc::new(RefCell::new(SceneCore {
                config,
                uid_registry,
                objects: BTreeMap::new(),
                slots: BTreeMap::new(),
                contact: ContactState::default(),
                constitutions: ConstitutionState::default(),
                animator: AnimatorState::new(),
                diff_sim: DiffSimState::default(),
                next_object_id: 0,
                next_slot_id: 0,
            })),
        }
    }

    /// Scene with the default configuration and the builtin UID registry.
    pub fn with_default_config() -> Self {
        Self::new(Self::default_config(), UidRegistry::builtin())
    }

    /// The default configuration record; see [`config::SimConfig`].
    pub fn default_config() -> serde_json::Value {
        config::default_config()
    }

    /// A copy of the scene's raw configuration record.
    pub fn config(&self) -> serde_json::Value {
        self.core.borrow().config.clone()
    }

    /// Cheap additional handle to the same scene.
    pub fn handle(&self) -> Scene {
        Scene {
            core: Rc::clone(&self.core),
        }
    }

    /// Object accessor.
    pub fn objects(&self) -> Objects {
        Objects {
            core: Rc::clone(&self.core),
        }
    }

    /// Flat slot-registry accessor.
    pub fn geometries(&self) -> Geometries {
        Geometries {
            core: Rc::clone(&self.core),
        }
    }

    /// Contact tabular accessor.
    pub fn contact_tabular(&self) -> ContactTabular {
        ContactTabular {
            core: Rc::clone(&self.core),
        }
    }

    /// Constitution tabular accessor.
    pub fn constitution_tabular(&self) -> ConstitutionTabular {
        ConstitutionTabular {
            core: Rc::clone(&self.core),
        }
    }

    /// Animator accessor.
    pub fn animator(&self) -> Animator {
        Animator {
            core: Rc::clone(&self.core),
        }
    }

    /// Differentiable-simulation context accessor.
    pub fn diff_sim(&self) -> DiffSim {
        DiffSim {
            core: Rc::clone(&self.core),
        }
    }

    /// Parameter-collection accessor (shortcut through [`Scene::diff_sim`]).
    pub fn parameters(&self) -> ParameterCollection {
        self.diff_sim().parameters()
    }
}

/// Accessor for scene objects.
pub struct Objects {
    core: Rc<RefCell<SceneCore>>,
}

impl Objects {
    /// Creates a named object with a fresh auto-assigned id.
    pub fn create(&self, name: &str) -> Object {
        let mut core = self.core.borrow_mut();
        let id = core.allocate_object_id();
        core.objects.insert(
            id,
            ObjectRecord {
                name: name.to_string(),
                geometry_ids: Vec::new(),
            },
        );
        log::debug!("created object {id} `{name}`");
        Object {
            id,
            name: name.to_string(),
            core: Rc::downgrade(&self.core),
        }
    }

    /// Looks up an object by id.
    pub fn find(&self, id: u64) -> Option<Object> {
        let core = self.core.borrow();
        core.objects.get(&id).map(|record| Object {
            id,
            name: record.name.clone(),
            core: Rc::downgrade(&self.core),
        })
    }

    /// All objects carrying `name`; names may be ambiguous.
    pub fn find_by_name(&self, name: &str) -> Vec<Object> {
        let core = self.core.borrow();
        core.objects
            .iter()
            .filter(|(_, record)| record.name == name)
            .map(|(&id, record)| Object {
                id,
                name: record.name.clone(),
                core: Rc::downgrade(&self.core),
            })
            .collect()
    }

    /// Destroys an object, cascading to its slots and its animation.
    ///
    /// Later registry lookups for the removed slot IDs return "not found"
    /// rather than erroring; the IDs are never reissued.
    ///
    /// # Errors
    /// `ObjectNotFound` for an unknown id.
    pub fn destroy(&self, id: u64) -> Result<(), MeshSceneError> {
        let mut core = self.core.borrow_mut();
        let record = core
            .objects
            .remove(&id)
            .ok_or(MeshSceneError::ObjectNotFound(id))?;
        for slot_id in &record.geometry_ids {
            core.slots.remove(slot_id);
        }
        core.animator.actions.remove(&id);
        log::debug!(
            "destroyed object {id} `{}` with {} slot(s)",
            record.name,
            record.geometry_ids.len()
        );
        Ok(())
    }

    /// Number of live objects.
    pub fn size(&self) -> usize {
        self.core.borrow().objects.len()
    }
}

/// Accessor for the scene-wide flat slot registry.
pub struct Geometries {
    core: Rc<RefCell<SceneCore>>,
}

impl Geometries {
    /// O(log n) lookup of the current/rest pair registered under `id`.
    ///
    /// Returns `(None, None)` for IDs that were never issued or whose owner
    /// was destroyed.
    pub fn find(
        &self,
        id: u64,
    ) -> (Option<SharedGeometrySlot>, Option<SharedGeometrySlot>) {
        let core = self.core.borrow();
        match core.slots.get(&id) {
            Some(pair) => (
                Some(Rc::clone(&pair.current)),
                Some(Rc::clone(&pair.rest)),
            ),
            None => (None, None),
        }
    }

    /// IDs of every registered slot pair, ascending.
    pub fn ids(&self) -> Vec<u64> {
        self.core.borrow().slots.keys().copied().collect()
    }

    /// Number of registered slot pairs.
    pub fn size(&self) -> usize {
        self.core.borrow().slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    #[test]
    fn slot_pair_shares_one_monotonic_id() {
        let scene = Scene::with_default_config();
        let object = scene.objects().create("cube");
        let (current, rest) = object.geometries().create(&Geometry::new()).unwrap();
        assert_eq!(current.id(), rest.id());
        let (c2, _) = object.geometries().create(&Geometry::new()).unwrap();
        assert!(c2.id() > current.id());
    }

    #[test]
    fn registry_lookup_returns_the_same_pair() {
        let scene = Scene::with_default_config();
        let object = scene.objects().create("cube");
        let (current, rest) = object.geometries().create(&Geometry::new()).unwrap();
        let (found_current, found_rest) = scene.geometries().find(current.id());
        assert!(Rc::ptr_eq(&found_current.unwrap(), &current));
        assert!(Rc::ptr_eq(&found_rest.unwrap(), &rest));
    }

    #[test]
    fn destroy_cascades_and_ids_are_not_reused() {
        let scene = Scene::with_default_config();
        let object = scene.objects().create("cube");
        let (current, _) = object.geometries().create(&Geometry::new()).unwrap();
        let stale_id = current.id();
        scene.objects().destroy(object.id()).unwrap();
        let (c, r) = scene.geometries().find(stale_id);
        assert!(c.is_none() && r.is_none());
        assert!(matches!(
            scene.objects().destroy(object.id()),
            Err(MeshSceneError::ObjectNotFound(_))
        ));

        let other = scene.objects().create("cube2");
        let (fresh, _) = other.geometries().create(&Geometry::new()).unwrap();
        assert!(fresh.id() > stale_id);
    }

    #[test]
    fn destroying_one_object_leaves_the_other_alone() {
        let scene = Scene::with_default_config();
        let a = scene.objects().create("a");
        let b = scene.objects().create("b");
        let (slot_a, _) = a.geometries().create(&Geometry::new()).unwrap();
        let (slot_b, _) = b.geometries().create(&Geometry::new()).unwrap();
        scene.objects().destroy(a.id()).unwrap();
        let (gone, _) = scene.geometries().find(slot_a.id());
        assert!(gone.is_none());
        let (found, _) = scene.geometries().find(slot_b.id());
        assert!(found.is_some());
    }

    #[test]
    fn name_lookup_may_be_ambiguous() {
        let scene = Scene::with_default_config();
        scene.objects().create("wall");
        scene.objects().create("wall");
        scene.objects().create("ball");
        assert_eq!(scene.objects().find_by_name("wall").len(), 2);
        assert_eq!(scene.objects().find_by_name("ghost").len(), 0);
        assert_eq!(scene.objects().size(), 3);
    }
}
