//! # mesh-scene
//!
//! mesh-scene is a Rust library for attributed simplicial meshes and the
//! scene graph that drives solver backends around them. It provides a
//! type-erased, named attribute store with checked view aliasing, topology
//! tables for edges/triangles/tetrahedra, identity-stable current/rest
//! geometry slots, material and contact tabulars, a per-frame animator, and
//! a differentiable-simulation parameter/gradient context.
//!
//! ## Features
//! - Tagged attribute columns over a closed element-type enumeration with
//!   copy-in/copy-out views and runtime borrow checking
//! - Geometry builders (`pointcloud`, `linemesh`, `trimesh`, `tetmesh`) and
//!   derived operations (surface labeling, orientation, extraction, merge,
//!   instance baking)
//! - Scenes with cascading object/slot lifecycles and monotonic slot IDs
//! - A blocking engine boundary (`init`/`advance`/`retrieve`/`backward`/
//!   `dump`/`recover`) with a host reference backend
//!
//! ## Concurrency
//!
//! The caller-facing model is single-threaded and cooperative: operations
//! are synchronous, non-reentrant, and guarded only by per-attribute view
//! discipline. A backend may compute elsewhere; its calls are single
//! blocking boundaries from this crate's perspective.

// Re-export our major subsystems:
pub mod attribute;
pub mod builtin;
pub mod diff_sim;
pub mod engine;
pub mod geometry;
pub mod scene;
pub mod scene_error;
pub mod world;

pub use scene_error::MeshSceneError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::attribute::{
        AttrType, AttrValue, AttributeCollection, AttributeSlot, View, ViewMode,
    };
    pub use crate::builtin::UidRegistry;
    pub use crate::diff_sim::{DiffSim, ParameterCollection, SparseMatrix};
    pub use crate::engine::{Engine, HostEngine};
    pub use crate::geometry::{
        Geometry, Topology, apply_transform, extract_surface, flip_inward_triangles,
        label_surface, label_triangle_orient, linemesh, merge, pointcloud, tetmesh, trimesh,
        trimesh_with_edges,
    };
    pub use crate::scene::{
        Animator, AnimatorPhase, Constitution, ContactElement, ContactModel, ElasticModuli,
        GeometrySlot, NeoHookean, Object, Scene, SharedGeometrySlot, SimConfig,
        SoftPositionConstraint, StepAction, UpdateInfo,
    };
    pub use crate::scene_error::MeshSceneError;
    pub use crate::world::World;
}
