//! Reserved attribute names and the builtin constitution UID table.
//!
//! Attributes created under these names by the library itself are protected:
//! `destroy` rejects them. User code reads and writes them through the normal
//! view protocol.

/// Vertex positions, `Vec3`, one row per vertex.
pub const POSITION: &str = "position";
/// Instance placement, `Mat4` affine transform, one row per instance.
pub const TRANSFORM: &str = "transform";
/// Animation target position, `Vec3`, one row per vertex.
pub const AIM_POSITION: &str = "aim_position";
/// Animation target placement, `Mat4`, one row per instance.
pub const AIM_TRANSFORM: &str = "aim_transform";
/// Boundary marker, `I32` (0/1), on vertices and triangles.
pub const IS_SURF: &str = "is_surf";
/// Surface orientation, `I32` (+1 outward, -1 inward, 0 unknown), per triangle.
pub const ORIENT: &str = "orient";
/// Kinematic pin marker, `I32` (0/1), per vertex.
pub const IS_FIXED: &str = "is_fixed";
/// Soft-constraint marker, `I32` (0/1), per vertex.
pub const IS_CONSTRAINED: &str = "is_constrained";
/// Dynamic/static marker, `I32` (0/1), per instance.
pub const IS_DYNAMIC: &str = "is_dynamic";
/// Contact element tag, `I64`, per instance.
pub const CONTACT_ELEMENT_ID: &str = "contact_element_id";
/// Constitution tag, `U64`, meta scalar.
pub const CONSTITUTION_UID: &str = "constitution_uid";
/// Constraint tag, `U64`, meta scalar.
pub const CONSTRAINT_UID: &str = "constraint_uid";
/// Rest volume, `F64`, per tetrahedron.
pub const VOLUME: &str = "volume";
/// Mass density, `F64`, meta scalar or per element.
pub const MASS_DENSITY: &str = "mass_density";
/// Shell/rod thickness, `F64`, per vertex.
pub const THICKNESS: &str = "thickness";
/// Vertex velocities, `Vec3`. Conventional rather than reserved: backends
/// create it on demand and user code may destroy it.
pub const VELOCITY: &str = "velocity";

/// Prefix of the parameter-link naming convention: an `I64` attribute named
/// `diff/<name>` maps each row of the `F64` attribute `<name>` to an index in
/// the differentiable parameter vector (-1 leaves the row unlinked).
pub const DIFF_PREFIX: &str = "diff/";

use std::collections::BTreeMap;

/// One registered builtin UID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidInfo {
    /// Human-readable constitution name.
    pub name: String,
}

/// Explicit registry of sanctioned constitution UIDs.
///
/// Constructed once and handed to [`Scene::new`](crate::scene::Scene::new);
/// there is deliberately no process-wide mutable registry.
#[derive(Debug, Clone, Default)]
pub struct UidRegistry {
    entries: BTreeMap<u64, UidInfo>,
}

impl UidRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the constitutions this crate ships.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register(crate::scene::constitution::NEO_HOOKEAN_UID, "NeoHookean");
        reg.register(
            crate::scene::constitution::SOFT_POSITION_CONSTRAINT_UID,
            "SoftPositionConstraint",
        );
        reg
    }

    /// Adds a UID; a repeated UID simply overwrites its name entry.
    pub fn register(&mut self, uid: u64, name: impl Into<String>) {
        self.entries.insert(uid, UidInfo { name: name.into() });
    }

    /// Looks up a UID.
    pub fn find(&self, uid: u64) -> Option<&UidInfo> {
        self.entries.get(&uid)
    }

    /// True if the UID is registered.
    pub fn contains(&self, uid: u64) -> bool {
        self.entries.contains_key(&uid)
    }

    /// All registered UIDs in ascending order.
    pub fn uids(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }
}
