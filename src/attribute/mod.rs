//! Attribute module: type-erased, resizable, named column storage.
#![warn(missing_docs)]

pub mod collection;
pub mod column;
pub mod slot;
pub mod value;

pub use collection::AttributeCollection;
pub use column::{AttrColumn, AttrElem, TaggedColumn};
pub use slot::{AttributeSlot, View, ViewMode};
pub use value::{AttrType, AttrValue, Bytes32};
