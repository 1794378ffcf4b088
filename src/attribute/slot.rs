//! Attribute slots and runtime-checked view tokens.
//!
//! A slot is a cheap handle onto one named column. Views are RAII borrow
//! tokens over the column's backing buffer: the core tracks an outstanding
//! reader count and writer count plus a version stamp, and every access
//! re-checks them. Values cross the view boundary by copy; no raw slice of
//! store-internal memory ever escapes.
//!
//! Borrow discipline (checked, not merely documented):
//! - any number of read views may coexist;
//! - a write view is refused with `AliasingViolation` while read views are
//!   outstanding;
//! - several write views obtained through the slot path may coexist; they
//!   alias one buffer and observe each other's writes;
//! - structural operations (`resize`, `destroy`) are refused while a write
//!   view is outstanding, and on success bump the version so every view taken
//!   earlier answers `StaleView` from then on;
//! - a view taken through the read path refuses writes with
//!   `ReadOnlyViolation`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::attribute::column::{AttrColumn, AttrElem, TaggedColumn};
use crate::attribute::value::{AttrType, AttrValue};
use crate::scene_error::MeshSceneError;

/// Shared state behind one named attribute.
#[derive(Debug)]
pub(crate) struct AttrCore {
    name: String,
    column: RefCell<TaggedColumn>,
    readers: Cell<usize>,
    writers: Cell<usize>,
    version: Cell<u64>,
    allow_destroy: bool,
}

impl AttrCore {
    pub(crate) fn new(name: String, column: TaggedColumn, allow_destroy: bool) -> Rc<Self> {
        Rc::new(Self {
            name,
            column: RefCell::new(column),
            readers: Cell::new(0),
            writers: Cell::new(0),
            version: Cell::new(0),
            allow_destroy,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn attr_type(&self) -> AttrType {
        self.column.borrow().attr_type()
    }

    pub(crate) fn len(&self) -> usize {
        self.column.borrow().len()
    }

    pub(crate) fn allow_destroy(&self) -> bool {
        self.allow_destroy
    }

    pub(crate) fn has_writers(&self) -> bool {
        self.writers.get() > 0
    }

    /// Lock-step resize; refused while a write view is outstanding.
    pub(crate) fn try_resize(&self, new_len: usize) -> Result<(), MeshSceneError> {
        if self.has_writers() {
            return Err(MeshSceneError::AliasingViolation(self.name.clone()));
        }
        self.column.borrow_mut().resize(new_len);
        self.bump_version();
        Ok(())
    }

    /// Invalidates every outstanding view (used by resize and destroy).
    pub(crate) fn bump_version(&self) {
        self.version.set(self.version.get().wrapping_add(1));
    }

    /// Deep copy with fresh borrow state, for geometry cloning.
    pub(crate) fn deep_clone(&self) -> Rc<Self> {
        Rc::new(Self {
            name: self.name.clone(),
            column: RefCell::new(self.column.borrow().clone()),
            readers: Cell::new(0),
            writers: Cell::new(0),
            version: Cell::new(0),
            allow_destroy: self.allow_destroy,
        })
    }

    pub(crate) fn column_json(&self) -> serde_json::Value {
        self.column.borrow().to_json()
    }

    pub(crate) fn default_value(&self) -> AttrValue {
        self.column.borrow().default_value()
    }
}

/// Handle onto one named attribute of a collection.
///
/// Obtained from [`AttributeCollection::find`](crate::attribute::AttributeCollection::find)
/// or at creation. Cloning the handle does not copy data.
#[derive(Clone, Debug)]
pub struct AttributeSlot {
    core: Rc<AttrCore>,
}

impl AttributeSlot {
    pub(crate) fn from_core(core: Rc<AttrCore>) -> Self {
        Self { core }
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Element-type tag of the column.
    pub fn attr_type(&self) -> AttrType {
        self.core.attr_type()
    }

    /// Current row count.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// True when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for reserved/builtin attributes that reject `destroy`.
    pub fn is_protected(&self) -> bool {
        !self.core.allow_destroy()
    }

    /// The grow-fill default element of the column.
    pub fn default_value(&self) -> AttrValue {
        self.core.default_value()
    }

    /// Acquires a read view. Always permitted; writes through it fail with
    /// `ReadOnlyViolation`.
    pub fn view(&self) -> View {
        self.core.readers.set(self.core.readers.get() + 1);
        View {
            core: Rc::clone(&self.core),
            version: self.core.version.get(),
            attr_type: self.core.attr_type(),
            mode: ViewMode::Read,
        }
    }

    /// Acquires a write view.
    ///
    /// # Errors
    /// `AliasingViolation` while read views are outstanding. Several write
    /// views from this entry point may coexist; they alias the same buffer.
    pub fn view_mut(&self) -> Result<View, MeshSceneError> {
        if self.core.readers.get() > 0 {
            return Err(MeshSceneError::AliasingViolation(self.name().to_string()));
        }
        self.core.writers.set(self.core.writers.get() + 1);
        Ok(View {
            core: Rc::clone(&self.core),
            version: self.core.version.get(),
            attr_type: self.core.attr_type(),
            mode: ViewMode::Write,
        })
    }
}

/// Read or write capability of a [`View`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewMode {
    /// Reads only; writes fail with `ReadOnlyViolation`.
    Read,
    /// Reads and writes.
    Write,
}

/// RAII borrow token over one attribute's backing buffer.
///
/// All access is copy-in/copy-out and re-checks staleness: once the attribute
/// is resized or destroyed, every operation fails with `StaleView`.
#[derive(Debug)]
pub struct View {
    core: Rc<AttrCore>,
    version: u64,
    attr_type: AttrType,
    mode: ViewMode,
}

impl View {
    /// Capability this view was acquired with.
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Element-type tag captured at acquisition.
    pub fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    fn check_fresh(&self) -> Result<(), MeshSceneError> {
        if self.version != self.core.version.get() {
            return Err(MeshSceneError::StaleView(self.core.name().to_string()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), MeshSceneError> {
        if self.mode != ViewMode::Write {
            return Err(MeshSceneError::ReadOnlyViolation(
                self.core.name().to_string(),
            ));
        }
        Ok(())
    }

    /// Row count at the time of the call.
    pub fn len(&self) -> Result<usize, MeshSceneError> {
        self.check_fresh()?;
        Ok(self.core.len())
    }

    /// True when the attribute holds no rows.
    pub fn is_empty(&self) -> Result<bool, MeshSceneError> {
        Ok(self.len()? == 0)
    }

    /// Copies one row out as a typed element.
    pub fn get<T: AttrElem>(&self, row: usize) -> Result<T, MeshSceneError> {
        self.check_fresh()?;
        let column = self.core.column.borrow();
        let typed = self.unwrap_typed::<T>(&column)?;
        typed
            .values()
            .get(row)
            .cloned()
            .ok_or_else(|| MeshSceneError::RowOutOfBounds {
                name: self.core.name().to_string(),
                row,
                len: typed.len(),
            })
    }

    /// Copies one row out as a dynamic element.
    pub fn value(&self, row: usize) -> Result<AttrValue, MeshSceneError> {
        self.check_fresh()?;
        let column = self.core.column.borrow();
        column
            .value(row)
            .ok_or_else(|| MeshSceneError::RowOutOfBounds {
                name: self.core.name().to_string(),
                row,
                len: column.len(),
            })
    }

    /// Copies one dynamic element into a row.
    pub fn set_value(&self, row: usize, value: &AttrValue) -> Result<(), MeshSceneError> {
        self.check_fresh()?;
        self.check_writable()?;
        let mut column = self.core.column.borrow_mut();
        let stored = column.attr_type();
        let len = column.len();
        if stored != value.attr_type() {
            return Err(MeshSceneError::TypeMismatch {
                name: self.core.name().to_string(),
                stored,
                requested: value.attr_type(),
            });
        }
        column
            .set_value(row, value)
            .ok_or_else(|| MeshSceneError::RowOutOfBounds {
                name: self.core.name().to_string(),
                row,
                len,
            })
    }

    /// Copies one typed element into a row.
    pub fn set<T: AttrElem>(&self, row: usize, value: T) -> Result<(), MeshSceneError> {
        self.check_fresh()?;
        self.check_writable()?;
        let mut column = self.core.column.borrow_mut();
        let name = self.core.name().to_string();
        let stored = column.attr_type();
        let typed =
            T::unwrap_mut(&mut column).ok_or_else(|| MeshSceneError::TypeMismatch {
                name: name.clone(),
                stored,
                requested: T::TYPE,
            })?;
        let len = typed.len();
        let cell = typed
            .values_mut()
            .get_mut(row)
            .ok_or(MeshSceneError::RowOutOfBounds { name, row, len })?;
        *cell = value;
        Ok(())
    }

    /// Copies the whole column out as a typed vector.
    pub fn to_vec<T: AttrElem>(&self) -> Result<Vec<T>, MeshSceneError> {
        self.check_fresh()?;
        let column = self.core.column.borrow();
        let typed = self.unwrap_typed::<T>(&column)?;
        Ok(typed.values().to_vec())
    }

    /// Overwrites the whole column from a typed slice.
    ///
    /// # Errors
    /// `ShapeMismatch` when the slice length differs from the row count.
    pub fn copy_from_slice<T: AttrElem>(&self, src: &[T]) -> Result<(), MeshSceneError> {
        self.check_fresh()?;
        self.check_writable()?;
        let mut column = self.core.column.borrow_mut();
        let name = self.core.name().to_string();
        let stored = column.attr_type();
        let typed =
            T::unwrap_mut(&mut column).ok_or_else(|| MeshSceneError::TypeMismatch {
                name,
                stored,
                requested: T::TYPE,
            })?;
        if typed.len() != src.len() {
            return Err(MeshSceneError::ShapeMismatch {
                expected: typed.len(),
                found: src.len(),
            });
        }
        typed.values_mut().clone_from_slice(src);
        Ok(())
    }

    /// Sets every row to one typed element.
    pub fn fill<T: AttrElem>(&self, value: T) -> Result<(), MeshSceneError> {
        self.check_fresh()?;
        self.check_writable()?;
        let mut column = self.core.column.borrow_mut();
        let name = self.core.name().to_string();
        let stored = column.attr_type();
        let typed =
            T::unwrap_mut(&mut column).ok_or_else(|| MeshSceneError::TypeMismatch {
                name,
                stored,
                requested: T::TYPE,
            })?;
        for cell in typed.values_mut() {
            *cell = value.clone();
        }
        Ok(())
    }

    fn unwrap_typed<'a, T: AttrElem>(
        &self,
        column: &'a TaggedColumn,
    ) -> Result<&'a AttrColumn<T>, MeshSceneError> {
        T::unwrap(column).ok_or_else(|| MeshSceneError::TypeMismatch {
            name: self.core.name().to_string(),
            stored: column.attr_type(),
            requested: T::TYPE,
        })
    }
}

impl Drop for View {
    fn drop(&mut self) {
        match self.mode {
            ViewMode::Read => {
                let n = self.core.readers.get();
                debug_assert!(n > 0, "reader count underflow");
                self.core.readers.set(n.saturating_sub(1));
            }
            ViewMode::Write => {
                let n = self.core.writers.get();
                debug_assert!(n > 0, "writer count underflow");
                self.core.writers.set(n.saturating_sub(1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::value::AttrValue;

    fn slot(len: usize) -> AttributeSlot {
        let core = AttrCore::new(
            "velocity".into(),
            TaggedColumn::from_default(AttrValue::F64(0.0), len),
            true,
        );
        AttributeSlot::from_core(core)
    }

    #[test]
    fn read_views_always_coexist() {
        let s = slot(3);
        let a = s.view();
        let b = s.view();
        assert_eq!(a.len().unwrap(), 3);
        assert_eq!(b.get::<f64>(2).unwrap(), 0.0);
    }

    #[test]
    fn write_refused_while_readers_live() {
        let s = slot(3);
        let r = s.view();
        assert!(matches!(
            s.view_mut(),
            Err(MeshSceneError::AliasingViolation(_))
        ));
        drop(r);
        assert!(s.view_mut().is_ok());
    }

    #[test]
    fn aliasing_write_views_observe_each_other() {
        let s = slot(2);
        let a = s.view_mut().unwrap();
        let b = s.view_mut().unwrap();
        a.set::<f64>(0, 4.5).unwrap();
        assert_eq!(b.get::<f64>(0).unwrap(), 4.5);
    }

    #[test]
    fn read_view_rejects_writes() {
        let s = slot(2);
        let v = s.view();
        assert!(matches!(
            v.set::<f64>(0, 1.0),
            Err(MeshSceneError::ReadOnlyViolation(_))
        ));
    }

    #[test]
    fn resize_stales_outstanding_views() {
        let s = slot(2);
        let v = s.view();
        s.core.try_resize(5).unwrap();
        assert!(matches!(v.len(), Err(MeshSceneError::StaleView(_))));
        assert!(matches!(
            v.get::<f64>(0),
            Err(MeshSceneError::StaleView(_))
        ));
        // A fresh view sees the new size.
        assert_eq!(s.view().len().unwrap(), 5);
    }

    #[test]
    fn resize_refused_while_writer_live() {
        let s = slot(2);
        let w = s.view_mut().unwrap();
        assert!(matches!(
            s.core.try_resize(4),
            Err(MeshSceneError::AliasingViolation(_))
        ));
        drop(w);
        assert!(s.core.try_resize(4).is_ok());
    }

    #[test]
    fn typed_access_checks_tag() {
        let s = slot(1);
        let v = s.view();
        assert!(matches!(
            v.get::<i64>(0),
            Err(MeshSceneError::TypeMismatch { .. })
        ));
    }
}
