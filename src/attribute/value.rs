//! Closed element-type enumeration and dynamic element values.
//!
//! Attribute columns are homogeneous: every row of a column stores exactly one
//! of the types tagged here. Accessors perform a checked tag dispatch instead
//! of relying on dynamic typing.

use glam::{DMat2, DMat3, DMat4, DVec2, DVec3, DVec4};
use serde::{Deserialize, Serialize};

/// Fixed-size byte string element.
pub type Bytes32 = [u8; 32];

/// Element-type tag for attribute columns.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    /// 32-bit float scalar.
    F32,
    /// 64-bit float scalar.
    F64,
    /// 32-bit signed integer scalar.
    I32,
    /// 64-bit signed integer scalar.
    I64,
    /// 32-bit unsigned integer scalar.
    U32,
    /// 64-bit unsigned integer scalar.
    U64,
    /// 2-component f64 vector.
    Vec2,
    /// 3-component f64 vector.
    Vec3,
    /// 4-component f64 vector.
    Vec4,
    /// 2x2 f64 matrix.
    Mat2,
    /// 3x3 f64 matrix.
    Mat3,
    /// 4x4 f64 matrix (affine placements).
    Mat4,
    /// Fixed-size byte string (32 bytes).
    Bytes32,
    /// Variable-length UTF-8 text.
    Text,
}

impl AttrType {
    /// Returns a stable string label for the element type.
    pub fn as_str(self) -> &'static str {
        match self {
            AttrType::F32 => "f32",
            AttrType::F64 => "f64",
            AttrType::I32 => "i32",
            AttrType::I64 => "i64",
            AttrType::U32 => "u32",
            AttrType::U64 => "u64",
            AttrType::Vec2 => "vec2",
            AttrType::Vec3 => "vec3",
            AttrType::Vec4 => "vec4",
            AttrType::Mat2 => "mat2",
            AttrType::Mat3 => "mat3",
            AttrType::Mat4 => "mat4",
            AttrType::Bytes32 => "bytes32",
            AttrType::Text => "text",
        }
    }

    /// Parse an element type from a string label.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "f32" => Some(AttrType::F32),
            "f64" => Some(AttrType::F64),
            "i32" => Some(AttrType::I32),
            "i64" => Some(AttrType::I64),
            "u32" => Some(AttrType::U32),
            "u64" => Some(AttrType::U64),
            "vec2" => Some(AttrType::Vec2),
            "vec3" => Some(AttrType::Vec3),
            "vec4" => Some(AttrType::Vec4),
            "mat2" => Some(AttrType::Mat2),
            "mat3" => Some(AttrType::Mat3),
            "mat4" => Some(AttrType::Mat4),
            "bytes32" => Some(AttrType::Bytes32),
            "text" => Some(AttrType::Text),
            _ => None,
        }
    }

    /// Maps a per-element `(rows, cols)` shape onto a float element type.
    ///
    /// Returns `None` for shapes outside the closed enumeration; callers
    /// surface that as a shape mismatch.
    pub fn from_element_shape(rows: usize, cols: usize) -> Option<Self> {
        match (rows, cols) {
            (1, 1) => Some(AttrType::F64),
            (2, 1) => Some(AttrType::Vec2),
            (3, 1) => Some(AttrType::Vec3),
            (4, 1) => Some(AttrType::Vec4),
            (2, 2) => Some(AttrType::Mat2),
            (3, 3) => Some(AttrType::Mat3),
            (4, 4) => Some(AttrType::Mat4),
            _ => None,
        }
    }

    /// All-zero element of this type (empty string for text).
    pub fn zero_value(self) -> AttrValue {
        match self {
            AttrType::F32 => AttrValue::F32(0.0),
            AttrType::F64 => AttrValue::F64(0.0),
            AttrType::I32 => AttrValue::I32(0),
            AttrType::I64 => AttrValue::I64(0),
            AttrType::U32 => AttrValue::U32(0),
            AttrType::U64 => AttrValue::U64(0),
            AttrType::Vec2 => AttrValue::Vec2(DVec2::ZERO),
            AttrType::Vec3 => AttrValue::Vec3(DVec3::ZERO),
            AttrType::Vec4 => AttrValue::Vec4(DVec4::ZERO),
            AttrType::Mat2 => AttrValue::Mat2(DMat2::ZERO),
            AttrType::Mat3 => AttrValue::Mat3(DMat3::ZERO),
            AttrType::Mat4 => AttrValue::Mat4(DMat4::ZERO),
            AttrType::Bytes32 => AttrValue::Bytes32([0u8; 32]),
            AttrType::Text => AttrValue::Text(String::new()),
        }
    }
}

/// One dynamically-typed attribute element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// 32-bit float scalar.
    F32(f32),
    /// 64-bit float scalar.
    F64(f64),
    /// 32-bit signed integer scalar.
    I32(i32),
    /// 64-bit signed integer scalar.
    I64(i64),
    /// 32-bit unsigned integer scalar.
    U32(u32),
    /// 64-bit unsigned integer scalar.
    U64(u64),
    /// 2-component f64 vector.
    Vec2(DVec2),
    /// 3-component f64 vector.
    Vec3(DVec3),
    /// 4-component f64 vector.
    Vec4(DVec4),
    /// 2x2 f64 matrix.
    Mat2(DMat2),
    /// 3x3 f64 matrix.
    Mat3(DMat3),
    /// 4x4 f64 matrix.
    Mat4(DMat4),
    /// Fixed-size byte string.
    Bytes32(Bytes32),
    /// Variable-length UTF-8 text.
    Text(String),
}

impl AttrValue {
    /// Element-type tag of this value.
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::F32(_) => AttrType::F32,
            AttrValue::F64(_) => AttrType::F64,
            AttrValue::I32(_) => AttrType::I32,
            AttrValue::I64(_) => AttrType::I64,
            AttrValue::U32(_) => AttrType::U32,
            AttrValue::U64(_) => AttrType::U64,
            AttrValue::Vec2(_) => AttrType::Vec2,
            AttrValue::Vec3(_) => AttrType::Vec3,
            AttrValue::Vec4(_) => AttrType::Vec4,
            AttrValue::Mat2(_) => AttrType::Mat2,
            AttrValue::Mat3(_) => AttrType::Mat3,
            AttrValue::Mat4(_) => AttrType::Mat4,
            AttrValue::Bytes32(_) => AttrType::Bytes32,
            AttrValue::Text(_) => AttrType::Text,
        }
    }

    /// JSON rendering for structured records.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttrValue::F32(v) => serde_json::json!(v),
            AttrValue::F64(v) => serde_json::json!(v),
            AttrValue::I32(v) => serde_json::json!(v),
            AttrValue::I64(v) => serde_json::json!(v),
            AttrValue::U32(v) => serde_json::json!(v),
            AttrValue::U64(v) => serde_json::json!(v),
            AttrValue::Vec2(v) => serde_json::json!(v.to_array()),
            AttrValue::Vec3(v) => serde_json::json!(v.to_array()),
            AttrValue::Vec4(v) => serde_json::json!(v.to_array()),
            AttrValue::Mat2(v) => serde_json::json!(v.to_cols_array()),
            AttrValue::Mat3(v) => serde_json::json!(v.to_cols_array()),
            AttrValue::Mat4(v) => serde_json::json!(v.to_cols_array()),
            AttrValue::Bytes32(v) => serde_json::json!(v.to_vec()),
            AttrValue::Text(v) => serde_json::json!(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_labels_round_trip() {
        for ty in [
            AttrType::F32,
            AttrType::F64,
            AttrType::I32,
            AttrType::I64,
            AttrType::U32,
            AttrType::U64,
            AttrType::Vec2,
            AttrType::Vec3,
            AttrType::Vec4,
            AttrType::Mat2,
            AttrType::Mat3,
            AttrType::Mat4,
            AttrType::Bytes32,
            AttrType::Text,
        ] {
            assert_eq!(AttrType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(AttrType::parse("quaternion"), None);
    }

    #[test]
    fn element_shape_mapping() {
        assert_eq!(AttrType::from_element_shape(3, 1), Some(AttrType::Vec3));
        assert_eq!(AttrType::from_element_shape(4, 4), Some(AttrType::Mat4));
        assert_eq!(AttrType::from_element_shape(10, 10), None);
    }

    #[test]
    fn value_tags_match() {
        assert_eq!(AttrValue::Vec3(DVec3::ZERO).attr_type(), AttrType::Vec3);
        assert_eq!(
            AttrValue::Text("rest".into()).attr_type(),
            AttrType::Text
        );
    }

    #[test]
    fn json_rendering() {
        let v = AttrValue::Vec3(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.to_json(), serde_json::json!([1.0, 2.0, 3.0]));
        assert_eq!(AttrValue::I64(-3).to_json(), serde_json::json!(-3));
    }
}
