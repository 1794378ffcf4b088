//! Per-simplex-dimension connectivity tables.
//!
//! One ordered sequence of fixed-arity index tuples per dimension above 0;
//! the vertex count is implicit (it is the dimension-0 element count of the
//! owning geometry). Mutation happens only through whole-geometry
//! construction and derived operations; there is no incremental edit API.
//!
//! Index validity against the vertex count is the caller's responsibility at
//! consumption time; the construction functions in [`crate::geometry::factory`]
//! validate eagerly.

use serde::{Deserialize, Serialize};

use crate::scene_error::MeshSceneError;

/// Vertex index into the dimension-0 element range.
pub type Index = u64;

/// Connectivity tables for edges, triangles, and tetrahedra.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    edges: Vec<[Index; 2]>,
    triangles: Vec<[Index; 3]>,
    tetrahedra: Vec<[Index; 4]>,
}

impl Topology {
    /// Empty topology (a point cloud).
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge tuples in order.
    #[inline]
    pub fn edges(&self) -> &[[Index; 2]] {
        &self.edges
    }

    /// Triangle tuples in order.
    #[inline]
    pub fn triangles(&self) -> &[[Index; 3]] {
        &self.triangles
    }

    /// Tetrahedron tuples in order.
    #[inline]
    pub fn tetrahedra(&self) -> &[[Index; 4]] {
        &self.tetrahedra
    }

    /// Highest populated simplex dimension (0 for a point cloud).
    pub fn max_dim(&self) -> i32 {
        if !self.tetrahedra.is_empty() {
            3
        } else if !self.triangles.is_empty() {
            2
        } else if !self.edges.is_empty() {
            1
        } else {
            0
        }
    }

    /// Number of simplices of `dim`; `dim` 0 is not stored here.
    pub fn simplex_count(&self, dim: i32) -> usize {
        match dim {
            1 => self.edges.len(),
            2 => self.triangles.len(),
            3 => self.tetrahedra.len(),
            _ => 0,
        }
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<[Index; 2]>) {
        self.edges = edges;
    }

    pub(crate) fn set_triangles(&mut self, triangles: Vec<[Index; 3]>) {
        self.triangles = triangles;
    }

    pub(crate) fn set_tetrahedra(&mut self, tetrahedra: Vec<[Index; 4]>) {
        self.tetrahedra = tetrahedra;
    }

    /// Checks every tuple against `vertex_count`.
    ///
    /// # Errors
    /// `IndexOutOfRange` naming the first offending index.
    pub fn validate(&self, vertex_count: usize) -> Result<(), MeshSceneError> {
        let check = |index: Index| -> Result<(), MeshSceneError> {
            if index as usize >= vertex_count {
                Err(MeshSceneError::IndexOutOfRange {
                    index,
                    count: vertex_count,
                })
            } else {
                Ok(())
            }
        };
        for e in &self.edges {
            e.iter().try_for_each(|&i| check(i))?;
        }
        for t in &self.triangles {
            t.iter().try_for_each(|&i| check(i))?;
        }
        for t in &self.tetrahedra {
            t.iter().try_for_each(|&i| check(i))?;
        }
        Ok(())
    }
}
