//! Objects: named scene-graph groupings of geometry slots.
//!
//! An object owns an ordered set of slot IDs. Geometries are attached by
//! value: the scene deep-copies the input twice (current, rest) and returns
//! both handles. Slots are detached only together with their object.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::geometry::Geometry;
use crate::scene::scene::SceneCore;
use crate::scene::slot::{GeometrySlot, SharedGeometrySlot, SlotPair};
use crate::scene_error::MeshSceneError;

/// Handle to one object in a scene.
///
/// Holds a weak scene pointer: operations after the scene is dropped fail
/// with `SceneDropped` rather than keeping the scene alive.
#[derive(Clone)]
pub struct Object {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) core: Weak<RefCell<SceneCore>>,
}

impl Object {
    /// Scene-unique object id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Object name (not necessarily unique).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accessor for the object's geometries.
    pub fn geometries(&self) -> ObjectGeometries {
        ObjectGeometries {
            object_id: self.id,
            core: self.core.clone(),
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Accessor for one object's geometry slots.
pub struct ObjectGeometries {
    object_id: u64,
    core: Weak<RefCell<SceneCore>>,
}

impl ObjectGeometries {
    fn upgrade(&self) -> Result<Rc<RefCell<SceneCore>>, MeshSceneError> {
        self.core.upgrade().ok_or(MeshSceneError::SceneDropped)
    }

    /// Clones `geometry` into a new current/rest slot pair sharing a fresh
    /// scene-wide ID, registers both, and appends the ID to the object.
    ///
    /// # Errors
    /// `ObjectNotFound` when the object was destroyed, `SceneDropped` when
    /// the scene no longer exists.
    pub fn create(
        &self,
        geometry: &Geometry,
    ) -> Result<(SharedGeometrySlot, SharedGeometrySlot), MeshSceneError> {
        let core = self.upgrade()?;
        let mut core = core.borrow_mut();
        if !core.objects.contains_key(&self.object_id) {
            return Err(MeshSceneError::ObjectNotFound(self.object_id));
        }
        let id = core.allocate_slot_id();
        let current = GeometrySlot::new(id, geometry.copy());
        let rest = GeometrySlot::new(id, geometry.copy());
        core.slots.insert(
            id,
            SlotPair {
                current: Rc::clone(&current),
                rest: Rc::clone(&rest),
            },
        );
        core.objects
            .get_mut(&self.object_id)
            .expect("presence checked above")
            .geometry_ids
            .push(id);
        log::debug!(
            "object {} attached geometry slot {id}",
            self.object_id
        );
        Ok((current, rest))
    }

    /// Ordered slot IDs owned by the object.
    ///
    /// # Errors
    /// `ObjectNotFound` when the object was destroyed, `SceneDropped` when
    /// the scene no longer exists.
    pub fn ids(&self) -> Result<Vec<u64>, MeshSceneError> {
        let core = self.upgrade()?;
        let core = core.borrow();
        core.objects
            .get(&self.object_id)
            .map(|record| record.geometry_ids.clone())
            .ok_or(MeshSceneError::ObjectNotFound(self.object_id))
    }
}
