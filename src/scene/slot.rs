//! Geometry slots: identity-stable handles pairing current and rest
//! geometries.
//!
//! A slot owns one geometry behind a `RefCell`; the scene registers a
//! current slot and a rest slot under one shared ID. IDs come from a
//! scene-owned strictly-monotonic allocator and are never reused, so stale
//! handles fail lookups instead of resolving to an unrelated slot.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::geometry::Geometry;

/// One registered geometry with its scene-wide stable ID.
#[derive(Debug)]
pub struct GeometrySlot {
    id: u64,
    geometry: RefCell<Geometry>,
}

/// Shared handle to a slot; cloning shares the same geometry.
pub type SharedGeometrySlot = Rc<GeometrySlot>;

impl GeometrySlot {
    pub(crate) fn new(id: u64, geometry: Geometry) -> SharedGeometrySlot {
        Rc::new(Self {
            id,
            geometry: RefCell::new(geometry),
        })
    }

    /// The stable slot ID shared by the current and rest twins.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Borrows the geometry.
    pub fn geometry(&self) -> Ref<'_, Geometry> {
        self.geometry.borrow()
    }

    /// Mutably borrows the geometry.
    pub fn geometry_mut(&self) -> RefMut<'_, Geometry> {
        self.geometry.borrow_mut()
    }

    /// Replaces the slot's geometry wholesale (snapshot restore).
    pub(crate) fn replace_geometry(&self, geometry: Geometry) {
        *self.geometry.borrow_mut() = geometry;
    }
}

/// The current/rest pair registered under one ID.
#[derive(Clone, Debug)]
pub(crate) struct SlotPair {
    pub(crate) current: SharedGeometrySlot,
    pub(crate) rest: SharedGeometrySlot,
}
