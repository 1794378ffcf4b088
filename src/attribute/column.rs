//! Typed columns and the tagged, type-erased column container.
//!
//! A column is one homogeneous value buffer plus the default element used to
//! fill rows created by a grow. `TaggedColumn` erases the element type behind
//! the closed [`AttrType`] enumeration; [`AttrElem`] maps concrete element
//! types back onto the tags for checked typed access.

use glam::{DMat2, DMat3, DMat4, DVec2, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use crate::attribute::value::{AttrType, AttrValue, Bytes32};

/// Homogeneous value buffer with a grow-fill default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttrColumn<T> {
    values: Vec<T>,
    default: T,
}

impl<T: Clone> AttrColumn<T> {
    /// Creates a column of `len` rows, all set to `default`.
    pub fn with_len(len: usize, default: T) -> Self {
        Self {
            values: vec![default.clone(); len],
            default,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Grow fills with the default element; shrink truncates.
    pub fn resize(&mut self, new_len: usize) {
        self.values.resize(new_len, self.default.clone());
    }

    /// Read-only row buffer.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable row buffer.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// The grow-fill default element.
    pub fn default_value(&self) -> &T {
        &self.default
    }
}

/// Tagged, type-erased column storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TaggedColumn {
    /// `f32` rows.
    F32(AttrColumn<f32>),
    /// `f64` rows.
    F64(AttrColumn<f64>),
    /// `i32` rows.
    I32(AttrColumn<i32>),
    /// `i64` rows.
    I64(AttrColumn<i64>),
    /// `u32` rows.
    U32(AttrColumn<u32>),
    /// `u64` rows.
    U64(AttrColumn<u64>),
    /// `DVec2` rows.
    Vec2(AttrColumn<DVec2>),
    /// `DVec3` rows.
    Vec3(AttrColumn<DVec3>),
    /// `DVec4` rows.
    Vec4(AttrColumn<DVec4>),
    /// `DMat2` rows.
    Mat2(AttrColumn<DMat2>),
    /// `DMat3` rows.
    Mat3(AttrColumn<DMat3>),
    /// `DMat4` rows.
    Mat4(AttrColumn<DMat4>),
    /// Fixed-size byte-string rows.
    Bytes32(AttrColumn<Bytes32>),
    /// Variable-length text rows.
    Text(AttrColumn<String>),
}

macro_rules! dispatch {
    ($self:expr, $col:ident => $body:expr) => {
        match $self {
            TaggedColumn::F32($col) => $body,
            TaggedColumn::F64($col) => $body,
            TaggedColumn::I32($col) => $body,
            TaggedColumn::I64($col) => $body,
            TaggedColumn::U32($col) => $body,
            TaggedColumn::U64($col) => $body,
            TaggedColumn::Vec2($col) => $body,
            TaggedColumn::Vec3($col) => $body,
            TaggedColumn::Vec4($col) => $body,
            TaggedColumn::Mat2($col) => $body,
            TaggedColumn::Mat3($col) => $body,
            TaggedColumn::Mat4($col) => $body,
            TaggedColumn::Bytes32($col) => $body,
            TaggedColumn::Text($col) => $body,
        }
    };
}

impl TaggedColumn {
    /// Builds a column of `len` rows from a dynamic default element.
    pub fn from_default(default: AttrValue, len: usize) -> Self {
        match default {
            AttrValue::F32(v) => TaggedColumn::F32(AttrColumn::with_len(len, v)),
            AttrValue::F64(v) => TaggedColumn::F64(AttrColumn::with_len(len, v)),
            AttrValue::I32(v) => TaggedColumn::I32(AttrColumn::with_len(len, v)),
            AttrValue::I64(v) => TaggedColumn::I64(AttrColumn::with_len(len, v)),
            AttrValue::U32(v) => TaggedColumn::U32(AttrColumn::with_len(len, v)),
            AttrValue::U64(v) => TaggedColumn::U64(AttrColumn::with_len(len, v)),
            AttrValue::Vec2(v) => TaggedColumn::Vec2(AttrColumn::with_len(len, v)),
            AttrValue::Vec3(v) => TaggedColumn::Vec3(AttrColumn::with_len(len, v)),
            AttrValue::Vec4(v) => TaggedColumn::Vec4(AttrColumn::with_len(len, v)),
            AttrValue::Mat2(v) => TaggedColumn::Mat2(AttrColumn::with_len(len, v)),
            AttrValue::Mat3(v) => TaggedColumn::Mat3(AttrColumn::with_len(len, v)),
            AttrValue::Mat4(v) => TaggedColumn::Mat4(AttrColumn::with_len(len, v)),
            AttrValue::Bytes32(v) => TaggedColumn::Bytes32(AttrColumn::with_len(len, v)),
            AttrValue::Text(v) => TaggedColumn::Text(AttrColumn::with_len(len, v)),
        }
    }

    /// Element-type tag for this column.
    pub fn attr_type(&self) -> AttrType {
        match self {
            TaggedColumn::F32(_) => AttrType::F32,
            TaggedColumn::F64(_) => AttrType::F64,
            TaggedColumn::I32(_) => AttrType::I32,
            TaggedColumn::I64(_) => AttrType::I64,
            TaggedColumn::U32(_) => AttrType::U32,
            TaggedColumn::U64(_) => AttrType::U64,
            TaggedColumn::Vec2(_) => AttrType::Vec2,
            TaggedColumn::Vec3(_) => AttrType::Vec3,
            TaggedColumn::Vec4(_) => AttrType::Vec4,
            TaggedColumn::Mat2(_) => AttrType::Mat2,
            TaggedColumn::Mat3(_) => AttrType::Mat3,
            TaggedColumn::Mat4(_) => AttrType::Mat4,
            TaggedColumn::Bytes32(_) => AttrType::Bytes32,
            TaggedColumn::Text(_) => AttrType::Text,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        dispatch!(self, col => col.len())
    }

    /// True when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resizes in lock-step with the owning collection.
    pub fn resize(&mut self, new_len: usize) {
        dispatch!(self, col => col.resize(new_len));
    }

    /// Dynamic read of one row; `None` when out of bounds.
    pub fn value(&self, row: usize) -> Option<AttrValue> {
        match self {
            TaggedColumn::F32(c) => c.values().get(row).map(|v| AttrValue::F32(*v)),
            TaggedColumn::F64(c) => c.values().get(row).map(|v| AttrValue::F64(*v)),
            TaggedColumn::I32(c) => c.values().get(row).map(|v| AttrValue::I32(*v)),
            TaggedColumn::I64(c) => c.values().get(row).map(|v| AttrValue::I64(*v)),
            TaggedColumn::U32(c) => c.values().get(row).map(|v| AttrValue::U32(*v)),
            TaggedColumn::U64(c) => c.values().get(row).map(|v| AttrValue::U64(*v)),
            TaggedColumn::Vec2(c) => c.values().get(row).map(|v| AttrValue::Vec2(*v)),
            TaggedColumn::Vec3(c) => c.values().get(row).map(|v| AttrValue::Vec3(*v)),
            TaggedColumn::Vec4(c) => c.values().get(row).map(|v| AttrValue::Vec4(*v)),
            TaggedColumn::Mat2(c) => c.values().get(row).map(|v| AttrValue::Mat2(*v)),
            TaggedColumn::Mat3(c) => c.values().get(row).map(|v| AttrValue::Mat3(*v)),
            TaggedColumn::Mat4(c) => c.values().get(row).map(|v| AttrValue::Mat4(*v)),
            TaggedColumn::Bytes32(c) => c.values().get(row).map(|v| AttrValue::Bytes32(*v)),
            TaggedColumn::Text(c) => c.values().get(row).map(|v| AttrValue::Text(v.clone())),
        }
    }

    /// Dynamic write of one row.
    ///
    /// Returns `None` on a tag mismatch or an out-of-bounds row; callers
    /// surface those as typed errors.
    pub fn set_value(&mut self, row: usize, value: &AttrValue) -> Option<()> {
        match (self, value) {
            (TaggedColumn::F32(c), AttrValue::F32(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::F64(c), AttrValue::F64(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::I32(c), AttrValue::I32(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::I64(c), AttrValue::I64(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::U32(c), AttrValue::U32(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::U64(c), AttrValue::U64(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Vec2(c), AttrValue::Vec2(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Vec3(c), AttrValue::Vec3(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Vec4(c), AttrValue::Vec4(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Mat2(c), AttrValue::Mat2(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Mat3(c), AttrValue::Mat3(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Mat4(c), AttrValue::Mat4(v)) => *c.values_mut().get_mut(row)? = *v,
            (TaggedColumn::Bytes32(c), AttrValue::Bytes32(v)) => {
                *c.values_mut().get_mut(row)? = *v
            }
            (TaggedColumn::Text(c), AttrValue::Text(v)) => {
                *c.values_mut().get_mut(row)? = v.clone()
            }
            _ => return None,
        }
        Some(())
    }

    /// The grow-fill default as a dynamic element.
    pub fn default_value(&self) -> AttrValue {
        match self {
            TaggedColumn::F32(c) => AttrValue::F32(*c.default_value()),
            TaggedColumn::F64(c) => AttrValue::F64(*c.default_value()),
            TaggedColumn::I32(c) => AttrValue::I32(*c.default_value()),
            TaggedColumn::I64(c) => AttrValue::I64(*c.default_value()),
            TaggedColumn::U32(c) => AttrValue::U32(*c.default_value()),
            TaggedColumn::U64(c) => AttrValue::U64(*c.default_value()),
            TaggedColumn::Vec2(c) => AttrValue::Vec2(*c.default_value()),
            TaggedColumn::Vec3(c) => AttrValue::Vec3(*c.default_value()),
            TaggedColumn::Vec4(c) => AttrValue::Vec4(*c.default_value()),
            TaggedColumn::Mat2(c) => AttrValue::Mat2(*c.default_value()),
            TaggedColumn::Mat3(c) => AttrValue::Mat3(*c.default_value()),
            TaggedColumn::Mat4(c) => AttrValue::Mat4(*c.default_value()),
            TaggedColumn::Bytes32(c) => AttrValue::Bytes32(*c.default_value()),
            TaggedColumn::Text(c) => AttrValue::Text(c.default_value().clone()),
        }
    }

    /// JSON rendering of every row in order, for structured records.
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = (0..self.len())
            .map(|i| self.value(i).expect("row within bounds").to_json())
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Maps concrete element types onto tagged columns for checked typed access.
///
/// The mirror of the tag enum: `wrap` erases, `unwrap`/`unwrap_mut` recover
/// the typed column only when the tag matches.
pub trait AttrElem: Clone + 'static {
    /// Element-type tag for this concrete type.
    const TYPE: AttrType;

    /// Erase a typed column into a tagged container.
    fn wrap(column: AttrColumn<Self>) -> TaggedColumn;
    /// Borrow a typed column if the tag matches.
    fn unwrap(column: &TaggedColumn) -> Option<&AttrColumn<Self>>;
    /// Mutably borrow a typed column if the tag matches.
    fn unwrap_mut(column: &mut TaggedColumn) -> Option<&mut AttrColumn<Self>>;
}

macro_rules! impl_attr_elem {
    ($ty:ty, $variant:ident) => {
        impl AttrElem for $ty {
            const TYPE: AttrType = AttrType::$variant;

            fn wrap(column: AttrColumn<Self>) -> TaggedColumn {
                TaggedColumn::$variant(column)
            }

            fn unwrap(column: &TaggedColumn) -> Option<&AttrColumn<Self>> {
                if let TaggedColumn::$variant(column) = column {
                    Some(column)
                } else {
                    None
                }
            }

            fn unwrap_mut(column: &mut TaggedColumn) -> Option<&mut AttrColumn<Self>> {
                if let TaggedColumn::$variant(column) = column {
                    Some(column)
                } else {
                    None
                }
            }
        }
    };
}

impl_attr_elem!(f32, F32);
impl_attr_elem!(f64, F64);
impl_attr_elem!(i32, I32);
impl_attr_elem!(i64, I64);
impl_attr_elem!(u32, U32);
impl_attr_elem!(u64, U64);
impl_attr_elem!(DVec2, Vec2);
impl_attr_elem!(DVec3, Vec3);
impl_attr_elem!(DVec4, Vec4);
impl_attr_elem!(DMat2, Mat2);
impl_attr_elem!(DMat3, Mat3);
impl_attr_elem!(DMat4, Mat4);
impl_attr_elem!(Bytes32, Bytes32);
impl_attr_elem!(String, Text);
