//! Geometry: a topology table plus per-dimension attribute collections.
//!
//! Every geometry carries a `meta` collection pinned to one element (global
//! scalars), one collection per simplex dimension, and an instance collection
//! whose builtin `transform` places the shared positions at read time. The
//! base positions are never mutated by instancing.

use glam::{DMat4, DVec3};

use crate::attribute::{AttributeCollection, AttributeSlot};
use crate::builtin;
use crate::geometry::topology::Topology;
use crate::scene_error::MeshSceneError;

/// Attributed simplicial mesh with instances and metadata.
#[derive(Debug)]
pub struct Geometry {
    meta: AttributeCollection,
    topology: Topology,
    vertices: AttributeCollection,
    edges: AttributeCollection,
    triangles: AttributeCollection,
    tetrahedra: AttributeCollection,
    instances: AttributeCollection,
}

impl Geometry {
    /// Empty geometry: no vertices, one identity instance, empty meta.
    pub fn new() -> Self {
        let mut vertices = AttributeCollection::new();
        vertices
            .create_protected(builtin::POSITION, DVec3::ZERO)
            .expect("fresh collection accepts the position builtin");
        let mut instances = AttributeCollection::with_size(1);
        instances
            .create_protected(builtin::TRANSFORM, DMat4::IDENTITY)
            .expect("fresh collection accepts the transform builtin");
        Self {
            meta: AttributeCollection::with_size(1),
            topology: Topology::new(),
            vertices,
            edges: AttributeCollection::new(),
            triangles: AttributeCollection::new(),
            tetrahedra: AttributeCollection::new(),
            instances,
        }
    }

    /// Global scalar attributes (element count pinned to 1).
    #[inline]
    pub fn meta(&self) -> &AttributeCollection {
        &self.meta
    }

    /// Mutable global scalar attributes.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut AttributeCollection {
        &mut self.meta
    }

    /// Connectivity tables.
    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub(crate) fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    /// Vertex attributes.
    #[inline]
    pub fn vertices(&self) -> &AttributeCollection {
        &self.vertices
    }

    /// Mutable vertex attributes.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut AttributeCollection {
        &mut self.vertices
    }

    /// Edge attributes.
    #[inline]
    pub fn edges(&self) -> &AttributeCollection {
        &self.edges
    }

    /// Mutable edge attributes.
    #[inline]
    pub fn edges_mut(&mut self) -> &mut AttributeCollection {
        &mut self.edges
    }

    /// Triangle attributes.
    #[inline]
    pub fn triangles(&self) -> &AttributeCollection {
        &self.triangles
    }

    /// Mutable triangle attributes.
    #[inline]
    pub fn triangles_mut(&mut self) -> &mut AttributeCollection {
        &mut self.triangles
    }

    /// Tetrahedron attributes.
    #[inline]
    pub fn tetrahedra(&self) -> &AttributeCollection {
        &self.tetrahedra
    }

    /// Mutable tetrahedron attributes.
    #[inline]
    pub fn tetrahedra_mut(&mut self) -> &mut AttributeCollection {
        &mut self.tetrahedra
    }

    /// Instance attributes (at least one instance, builtin `transform`).
    #[inline]
    pub fn instances(&self) -> &AttributeCollection {
        &self.instances
    }

    /// Mutable instance attributes.
    #[inline]
    pub fn instances_mut(&mut self) -> &mut AttributeCollection {
        &mut self.instances
    }

    /// Shortcut to the builtin vertex `position` slot.
    pub fn positions(&self) -> AttributeSlot {
        self.vertices
            .find(builtin::POSITION)
            .expect("position builtin exists for the geometry's lifetime")
    }

    /// Shortcut to the builtin instance `transform` slot.
    pub fn transforms(&self) -> AttributeSlot {
        self.instances
            .find(builtin::TRANSFORM)
            .expect("transform builtin exists for the geometry's lifetime")
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.size()
    }

    /// Number of instances.
    #[inline]
    pub fn instance_count(&self) -> usize {
        self.instances.size()
    }

    /// Highest populated simplex dimension.
    pub fn dim(&self) -> i32 {
        self.topology.max_dim()
    }

    /// Fully independent deep copy; no attribute buffer is shared with the
    /// source.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Replaces the triangle table and resizes the triangle collection in
    /// lock-step.
    pub(crate) fn set_triangle_table(
        &mut self,
        triangles: Vec<[u64; 3]>,
    ) -> Result<(), MeshSceneError> {
        self.triangles.resize(triangles.len())?;
        self.topology.set_triangles(triangles);
        Ok(())
    }

    /// Structured record of the whole geometry for diagnostics and I/O
    /// layers.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "dim": self.dim(),
            "topology": {
                "edges": self.topology.edges(),
                "triangles": self.topology.triangles(),
                "tetrahedra": self.topology.tetrahedra(),
            },
            "meta": self.meta.to_record(),
            "vertices": self.vertices.to_record(),
            "edges": self.edges.to_record(),
            "triangles": self.triangles.to_record(),
            "tetrahedra": self.tetrahedra.to_record(),
            "instances": self.instances.to_record(),
        })
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Geometry {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            topology: self.topology.clone(),
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            triangles: self.triangles.clone(),
            tetrahedra: self.tetrahedra.clone(),
            instances: self.instances.clone(),
        }
    }
}
