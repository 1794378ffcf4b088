//! MeshSceneError: unified error type for mesh-scene public APIs.
//!
//! Every fallible operation in the crate reports through this enum so that
//! callers (scripts, orchestration layers) can match on a single taxonomy and
//! decide whether to retry, abort, or fall back. The core itself never
//! retries.

use thiserror::Error;

use crate::attribute::AttrType;

/// Unified error type for mesh-scene operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshSceneError {
    /// An attribute with the given name already exists in the collection.
    #[error("attribute `{0}` already exists")]
    DuplicateAttribute(String),
    /// No attribute with the given name exists in the collection.
    #[error("attribute `{0}` not found")]
    AttributeNotFound(String),
    /// Requested shape conflicts with the collection's current element count.
    #[error("shape mismatch: collection holds {expected} elements, requested {found}")]
    ShapeMismatch {
        /// Element count the collection currently has.
        expected: usize,
        /// Element count the caller requested.
        found: usize,
    },
    /// An index tuple references a vertex beyond the vertex count.
    #[error("index {index} out of range: only {count} vertices exist")]
    IndexOutOfRange {
        /// The offending vertex index.
        index: u64,
        /// Number of vertices in the geometry.
        count: usize,
    },
    /// A structural operation would invalidate an outstanding mutable view.
    #[error("aliasing violation on attribute `{0}`: a mutable view is outstanding")]
    AliasingViolation(String),
    /// A write was attempted through a view obtained from a read-only path.
    #[error("read-only violation on attribute `{0}`")]
    ReadOnlyViolation(String),
    /// The view outlived a resize or destroy of its attribute.
    #[error("stale view on attribute `{0}`: the attribute was resized or destroyed")]
    StaleView(String),
    /// Attempt to destroy a reserved/builtin attribute.
    #[error("attribute `{0}` is protected and cannot be destroyed")]
    ProtectedAttribute(String),
    /// Typed access does not match the attribute's stored element type.
    #[error("type mismatch on attribute `{name}`: stored {stored:?}, requested {requested:?}")]
    TypeMismatch {
        /// Name of the attribute.
        name: String,
        /// Element type the column actually stores.
        stored: AttrType,
        /// Element type the caller asked for.
        requested: AttrType,
    },
    /// Row index beyond the attribute's current length.
    #[error("row {row} out of bounds for attribute `{name}` of length {len}")]
    RowOutOfBounds {
        /// Name of the attribute.
        name: String,
        /// The offending row.
        row: usize,
        /// Current column length.
        len: usize,
    },
    /// A constitution with the same UID is already registered.
    #[error("constitution uid {0} already registered")]
    DuplicateConstitution(u64),
    /// Constitution UID is not present in the registry handed to the scene.
    #[error("constitution uid {0} is unknown to the uid registry")]
    UnknownConstitution(u64),
    /// No object with the given id exists in the scene.
    #[error("object {0} not found")]
    ObjectNotFound(u64),
    /// A contact element index is outside the tabular.
    #[error("contact element {index} out of range: {count} elements registered")]
    ContactElementOutOfRange {
        /// The offending element index.
        index: u64,
        /// Number of registered elements.
        count: usize,
    },
    /// Geometries of unequal simplex dimension cannot be merged.
    #[error("dimension mismatch: expected dim {expected}, found dim {found}")]
    DimensionMismatch {
        /// Dimension of the first geometry.
        expected: i32,
        /// Dimension of the offending geometry.
        found: i32,
    },
    /// `pGpP()`/`H()` called before any backward pass, or after `clear()`.
    #[error("no gradient available: run a backward pass first")]
    NoGradientAvailable,
    /// Scene content or configuration violates a solver precondition.
    #[error("config mismatch: {0}")]
    ConfigMismatch(String),
    /// A step action failed; the in-progress step was aborted.
    #[error("animation for object {object} failed: {reason}")]
    AnimationFailed {
        /// Id of the object whose action failed.
        object: u64,
        /// Failure reported by the action.
        reason: String,
    },
    /// World operation before a successful `init`.
    #[error("world is not initialized: call init(scene) first")]
    WorldNotInitialized,
    /// `recover` asked for a frame that was never dumped.
    #[error("no snapshot recorded for frame {0}")]
    SnapshotNotFound(u64),
    /// The scene handle behind an object or subsystem was dropped.
    #[error("scene has been dropped")]
    SceneDropped,
}
