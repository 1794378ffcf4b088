//! Construction primitives for simplicial geometries.
//!
//! Each builder validates that index tuples reference existing vertices,
//! fills the builtin `position` attribute, and leaves the geometry with one
//! identity instance.

use glam::DVec3;

use crate::geometry::geometry::Geometry;
use crate::geometry::topology::Index;
use crate::scene_error::MeshSceneError;

fn with_positions(points: &[DVec3]) -> Result<Geometry, MeshSceneError> {
    let mut geometry = Geometry::new();
    geometry.vertices_mut().resize(points.len())?;
    geometry.positions().view_mut()?.copy_from_slice(points)?;
    Ok(geometry)
}

/// Builds a point cloud: vertices only.
pub fn pointcloud(points: &[DVec3]) -> Result<Geometry, MeshSceneError> {
    with_positions(points)
}

/// Builds a line mesh from points and edge tuples.
///
/// # Errors
/// `IndexOutOfRange` when an edge references a missing vertex.
pub fn linemesh(points: &[DVec3], edges: &[[Index; 2]]) -> Result<Geometry, MeshSceneError> {
    let mut geometry = with_positions(points)?;
    geometry.topology_mut().set_edges(edges.to_vec());
    geometry.topology().validate(points.len())?;
    geometry.edges_mut().resize(edges.len())?;
    Ok(geometry)
}

/// Builds a triangle mesh from points and triangle tuples.
///
/// # Errors
/// `IndexOutOfRange` when a triangle references a missing vertex.
pub fn trimesh(
    points: &[DVec3],
    triangles: &[[Index; 3]],
) -> Result<Geometry, MeshSceneError> {
    let mut geometry = with_positions(points)?;
    geometry.topology_mut().set_triangles(triangles.to_vec());
    geometry.topology().validate(points.len())?;
    geometry.triangles_mut().resize(triangles.len())?;
    Ok(geometry)
}

/// Builds a triangle mesh carrying an explicit edge table alongside the
/// faces (for stitched shells and cloth with bending edges).
///
/// # Errors
/// `IndexOutOfRange` when any tuple references a missing vertex.
pub fn trimesh_with_edges(
    points: &[DVec3],
    edges: &[[Index; 2]],
    triangles: &[[Index; 3]],
) -> Result<Geometry, MeshSceneError> {
    let mut geometry = trimesh(points, triangles)?;
    geometry.topology_mut().set_edges(edges.to_vec());
    geometry.topology().validate(points.len())?;
    geometry.edges_mut().resize(edges.len())?;
    Ok(geometry)
}

/// Builds a tetrahedral mesh from points and tetrahedron tuples.
///
/// # Errors
/// `IndexOutOfRange` when a tetrahedron references a missing vertex.
pub fn tetmesh(
    points: &[DVec3],
    tetrahedra: &[[Index; 4]],
) -> Result<Geometry, MeshSceneError> {
    let mut geometry = with_positions(points)?;
    geometry
        .topology_mut()
        .set_tetrahedra(tetrahedra.to_vec());
    geometry.topology().validate(points.len())?;
    geometry.tetrahedra_mut().resize(tetrahedra.len())?;
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet_points() -> Vec<DVec3> {
        vec![
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::ZERO,
        ]
    }

    #[test]
    fn tetmesh_builds_and_fills_positions() {
        let g = tetmesh(&unit_tet_points(), &[[0, 1, 2, 3]]).unwrap();
        assert_eq!(g.dim(), 3);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.tetrahedra().size(), 1);
        assert_eq!(
            g.positions().view().get::<DVec3>(3).unwrap(),
            DVec3::ZERO
        );
    }

    #[test]
    fn builders_reject_dangling_indices() {
        let pts = unit_tet_points();
        assert!(matches!(
            tetmesh(&pts, &[[0, 1, 2, 4]]),
            Err(MeshSceneError::IndexOutOfRange { index: 4, count: 4 })
        ));
        assert!(matches!(
            linemesh(&pts, &[[0, 9]]),
            Err(MeshSceneError::IndexOutOfRange { index: 9, count: 4 })
        ));
        assert!(matches!(
            trimesh(&pts, &[[7, 1, 2]]),
            Err(MeshSceneError::IndexOutOfRange { index: 7, count: 4 })
        ));
    }

    #[test]
    fn trimesh_can_carry_an_edge_table() {
        let pts = unit_tet_points();
        let g = trimesh_with_edges(&pts, &[[0, 1], [1, 2]], &[[0, 1, 2]]).unwrap();
        assert_eq!(g.dim(), 2);
        assert_eq!(g.edges().size(), 2);
        assert_eq!(g.topology().edges(), &[[0, 1], [1, 2]]);
    }

    #[test]
    fn pointcloud_has_no_simplices() {
        let g = pointcloud(&unit_tet_points()).unwrap();
        assert_eq!(g.dim(), 0);
        assert_eq!(g.topology().simplex_count(1), 0);
    }
}
