//! Geometry module: topology tables, attributed geometries, builders, and
//! derived operations.
#![warn(missing_docs)]

pub mod factory;
#[allow(clippy::module_inception)]
pub mod geometry;
pub mod ops;
pub mod topology;

pub use factory::{linemesh, pointcloud, tetmesh, trimesh, trimesh_with_edges};
pub use geometry::Geometry;
pub use ops::{
    apply_transform, extract_surface, flip_inward_triangles, label_surface,
    label_triangle_orient, merge,
};
pub use topology::{Index, Topology};
