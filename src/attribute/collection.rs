//! Named attribute collections scoped to one element dimension.
//!
//! A collection maps attribute names to columns and keeps every column's
//! length in lock-step with its element count: `resize` grows each column
//! with its default element or truncates it. Insertion order is preserved
//! for serialization; lookup order is irrelevant.
//!
//! # Invariants
//!
//! - Each name appears exactly once in `order`.
//! - `attrs` contains precisely the keys listed in `order`.
//! - Every column's length equals the collection's element count.
//!
//! These are checked after mutations in debug builds.

use std::collections::HashMap;
use std::rc::Rc;

use crate::attribute::column::{AttrColumn, AttrElem, TaggedColumn};
use crate::attribute::slot::{AttrCore, AttributeSlot};
use crate::attribute::value::{AttrType, AttrValue};
use crate::scene_error::MeshSceneError;

/// Mapping from attribute name to column, scoped to one element dimension.
#[derive(Debug, Default)]
pub struct AttributeCollection {
    /// Current element count; every column has exactly this many rows.
    size: usize,
    /// Name -> shared column core.
    attrs: HashMap<String, Rc<AttrCore>>,
    /// Insertion order of names, for deterministic serialization.
    order: Vec<String>,
}

impl AttributeCollection {
    /// Creates an empty collection with zero elements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection pinned to `size` elements.
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Current element count.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of attributes.
    #[inline]
    pub fn attribute_count(&self) -> usize {
        debug_assert_eq!(self.order.len(), self.attrs.len());
        self.order.len()
    }

    /// True when no attributes are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Creates a typed attribute, every row set to `default`.
    ///
    /// # Errors
    /// `DuplicateAttribute` if the name is taken.
    pub fn create<T: AttrElem>(
        &mut self,
        name: &str,
        default: T,
    ) -> Result<AttributeSlot, MeshSceneError> {
        self.create_inner(name, default, true)
    }

    /// Creates a reserved attribute that rejects `destroy`.
    pub(crate) fn create_protected<T: AttrElem>(
        &mut self,
        name: &str,
        default: T,
    ) -> Result<AttributeSlot, MeshSceneError> {
        self.create_inner(name, default, false)
    }

    fn create_inner<T: AttrElem>(
        &mut self,
        name: &str,
        default: T,
        allow_destroy: bool,
    ) -> Result<AttributeSlot, MeshSceneError> {
        if self.attrs.contains_key(name) {
            return Err(MeshSceneError::DuplicateAttribute(name.to_string()));
        }
        let column = T::wrap(AttrColumn::with_len(self.size, default));
        let core = AttrCore::new(name.to_string(), column, allow_destroy);
        self.attrs.insert(name.to_string(), Rc::clone(&core));
        self.order.push(name.to_string());
        #[cfg(debug_assertions)]
        self.debug_assert_invariants();
        Ok(AttributeSlot::from_core(core))
    }

    /// Creates a typed attribute with an explicit row count.
    ///
    /// # Errors
    /// `ShapeMismatch` when `count` differs from the element count;
    /// `DuplicateAttribute` if the name is taken.
    pub fn create_with_count<T: AttrElem>(
        &mut self,
        name: &str,
        default: T,
        count: usize,
    ) -> Result<AttributeSlot, MeshSceneError> {
        if count != self.size {
            return Err(MeshSceneError::ShapeMismatch {
                expected: self.size,
                found: count,
            });
        }
        self.create(name, default)
    }

    /// Creates a zero-initialized attribute from a `(count, rows, cols)`
    /// shape, mapping the per-element part onto the closed type enumeration.
    ///
    /// # Errors
    /// `ShapeMismatch` when `count` differs from the element count or the
    /// per-element shape is unsupported.
    pub fn create_from_shape(
        &mut self,
        name: &str,
        shape: (usize, usize, usize),
    ) -> Result<AttributeSlot, MeshSceneError> {
        let (count, rows, cols) = shape;
        if count != self.size {
            return Err(MeshSceneError::ShapeMismatch {
                expected: self.size,
                found: count,
            });
        }
        let ty = AttrType::from_element_shape(rows, cols).ok_or(
            MeshSceneError::ShapeMismatch {
                expected: self.size,
                found: count,
            },
        )?;
        if self.attrs.contains_key(name) {
            return Err(MeshSceneError::DuplicateAttribute(name.to_string()));
        }
        let column = TaggedColumn::from_default(ty.zero_value(), self.size);
        let core = AttrCore::new(name.to_string(), column, true);
        self.attrs.insert(name.to_string(), Rc::clone(&core));
        self.order.push(name.to_string());
        #[cfg(debug_assertions)]
        self.debug_assert_invariants();
        Ok(AttributeSlot::from_core(core))
    }

    /// Creates an attribute from a dynamic default element.
    ///
    /// # Errors
    /// `DuplicateAttribute` if the name is taken.
    pub fn create_dynamic(
        &mut self,
        name: &str,
        default: AttrValue,
    ) -> Result<AttributeSlot, MeshSceneError> {
        if self.attrs.contains_key(name) {
            return Err(MeshSceneError::DuplicateAttribute(name.to_string()));
        }
        let column = TaggedColumn::from_default(default, self.size);
        let core = AttrCore::new(name.to_string(), column, true);
        self.attrs.insert(name.to_string(), Rc::clone(&core));
        self.order.push(name.to_string());
        #[cfg(debug_assertions)]
        self.debug_assert_invariants();
        Ok(AttributeSlot::from_core(core))
    }

    /// Looks up an attribute by name. Never fails; absent names yield `None`.
    pub fn find(&self, name: &str) -> Option<AttributeSlot> {
        self.attrs
            .get(name)
            .map(|core| AttributeSlot::from_core(Rc::clone(core)))
    }

    /// Removes an attribute.
    ///
    /// # Errors
    /// `AttributeNotFound` for absent names (idempotent destroys fail the
    /// second time), `ProtectedAttribute` for reserved attributes,
    /// `AliasingViolation` while a write view is outstanding.
    pub fn destroy(&mut self, name: &str) -> Result<(), MeshSceneError> {
        let core = self
            .attrs
            .get(name)
            .ok_or_else(|| MeshSceneError::AttributeNotFound(name.to_string()))?;
        if !core.allow_destroy() {
            return Err(MeshSceneError::ProtectedAttribute(name.to_string()));
        }
        if core.has_writers() {
            return Err(MeshSceneError::AliasingViolation(name.to_string()));
        }
        // Outstanding read views answer StaleView from now on.
        core.bump_version();
        self.attrs.remove(name);
        self.order.retain(|n| n != name);
        #[cfg(debug_assertions)]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Changes the element count, resizing every column in lock-step.
    ///
    /// New rows take each attribute's default element; shrink truncates.
    /// Outstanding views are invalidated (`StaleView` on later access).
    ///
    /// # Errors
    /// `AliasingViolation` while any write view is outstanding; nothing is
    /// resized in that case.
    pub fn resize(&mut self, new_size: usize) -> Result<(), MeshSceneError> {
        for name in &self.order {
            if self.attrs[name].has_writers() {
                return Err(MeshSceneError::AliasingViolation(name.clone()));
            }
        }
        for name in &self.order {
            self.attrs[name]
                .try_resize(new_size)
                .expect("writer check preceded resize");
        }
        self.size = new_size;
        #[cfg(debug_assertions)]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Iterates `(name, slot)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AttributeSlot)> + '_ {
        self.order.iter().map(move |name| {
            (
                name.as_str(),
                AttributeSlot::from_core(Rc::clone(&self.attrs[name])),
            )
        })
    }

    /// Structured record of the collection: element count plus each
    /// attribute's name, type tag, and rows, in insertion order.
    pub fn to_record(&self) -> serde_json::Value {
        let attributes: Vec<serde_json::Value> = self
            .order
            .iter()
            .map(|name| {
                let core = &self.attrs[name];
                serde_json::json!({
                    "name": name,
                    "type": core.attr_type().as_str(),
                    "values": core.column_json(),
                })
            })
            .collect();
        serde_json::json!({
            "size": self.size,
            "attributes": attributes,
        })
    }

    #[cfg(debug_assertions)]
    fn debug_assert_invariants(&self) {
        debug_assert_eq!(self.order.len(), self.attrs.len());
        for name in &self.order {
            let core = self.attrs.get(name).expect("order entry missing from map");
            debug_assert_eq!(
                core.len(),
                self.size,
                "attribute `{name}` out of lock-step"
            );
        }
    }
}

/// Deep copy: fresh column cores with cleared borrow state, no aliasing with
/// the source.
impl Clone for AttributeCollection {
    fn clone(&self) -> Self {
        let mut attrs = HashMap::with_capacity(self.attrs.len());
        for (name, core) in &self.attrs {
            attrs.insert(name.clone(), core.deep_clone());
        }
        Self {
            size: self.size,
            attrs,
            order: self.order.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn collection(size: usize) -> AttributeCollection {
        AttributeCollection::with_size(size)
    }

    #[test]
    fn create_and_round_trip() {
        let mut c = collection(4);
        c.create("velocity", DVec3::ZERO).unwrap();
        let slot = c.find("velocity").unwrap();
        assert_eq!(slot.view().get::<DVec3>(0).unwrap(), DVec3::ZERO);
    }

    #[test]
    fn duplicate_create_rejected() {
        let mut c = collection(2);
        c.create("mass", 1.0f64).unwrap();
        assert!(matches!(
            c.create("mass", 2.0f64),
            Err(MeshSceneError::DuplicateAttribute(_))
        ));
    }

    #[test]
    fn resize_keeps_columns_in_lock_step() {
        let mut c = collection(2);
        c.create("a", 0.0f64).unwrap();
        c.create("b", 7i64).unwrap();
        c.resize(5).unwrap();
        for name in ["a", "b"] {
            assert_eq!(c.find(name).unwrap().view().len().unwrap(), 5);
        }
        // Grown rows take the default element.
        assert_eq!(c.find("b").unwrap().view().get::<i64>(4).unwrap(), 7);
        c.resize(1).unwrap();
        assert_eq!(c.find("a").unwrap().view().len().unwrap(), 1);
    }

    #[test]
    fn destroy_twice_fails_second_time() {
        let mut c = collection(2);
        c.create("tmp", 0i32).unwrap();
        c.destroy("tmp").unwrap();
        assert!(c.find("tmp").is_none());
        assert!(matches!(
            c.destroy("tmp"),
            Err(MeshSceneError::AttributeNotFound(_))
        ));
    }

    #[test]
    fn protected_attribute_rejects_destroy() {
        let mut c = collection(2);
        c.create_protected("position", DVec3::ZERO).unwrap();
        assert!(matches!(
            c.destroy("position"),
            Err(MeshSceneError::ProtectedAttribute(_))
        ));
        assert!(c.find("position").is_some());
    }

    #[test]
    fn resize_refused_while_writer_outstanding() {
        let mut c = collection(3);
        c.create("x", 0.0f64).unwrap();
        let slot = c.find("x").unwrap();
        let w = slot.view_mut().unwrap();
        assert!(matches!(
            c.resize(6),
            Err(MeshSceneError::AliasingViolation(_))
        ));
        drop(w);
        c.resize(6).unwrap();
        assert_eq!(c.size(), 6);
    }

    #[test]
    fn shape_checked_creation() {
        let mut c = collection(1);
        assert!(matches!(
            c.create_from_shape("i64", (10, 10, 1)),
            Err(MeshSceneError::ShapeMismatch {
                expected: 1,
                found: 10
            })
        ));
        let slot = c.create_from_shape("n", (1, 3, 1)).unwrap();
        assert_eq!(slot.attr_type(), AttrType::Vec3);
    }

    #[test]
    fn names_preserve_insertion_order() {
        let mut c = collection(0);
        c.create("z", 0.0f64).unwrap();
        c.create("a", 0.0f64).unwrap();
        c.create("m", 0.0f64).unwrap();
        assert_eq!(c.names(), vec!["z", "a", "m"]);
        let record = c.to_record();
        let names: Vec<&str> = record["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn deep_clone_does_not_alias() {
        let mut c = collection(2);
        c.create("w", 0.0f64).unwrap();
        let copy = c.clone();
        let w = c.find("w").unwrap().view_mut().unwrap();
        w.set::<f64>(0, 9.0).unwrap();
        assert_eq!(copy.find("w").unwrap().view().get::<f64>(0).unwrap(), 0.0);
    }
}
