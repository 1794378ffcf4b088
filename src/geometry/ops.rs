//! Derived geometry operations: surface labeling, orientation, extraction,
//! merging, and instance baking.
//!
//! These operate by constructing new tables or tagging reserved attributes;
//! none of them edits topology incrementally.

use std::collections::HashMap;

use glam::{DMat4, DVec3};
use itertools::Itertools;

use crate::attribute::{AttributeCollection, AttributeSlot};
use crate::builtin;
use crate::geometry::geometry::Geometry;
use crate::geometry::topology::Index;
use crate::scene_error::MeshSceneError;

/// Faces of tetrahedron `[v0, v1, v2, v3]`, wound outward for a positively
/// oriented tetrahedron.
fn tet_faces(t: [Index; 4]) -> [[Index; 3]; 4] {
    [
        [t[1], t[2], t[3]],
        [t[0], t[3], t[2]],
        [t[0], t[1], t[3]],
        [t[0], t[2], t[1]],
    ]
}

fn face_key(f: [Index; 3]) -> [Index; 3] {
    let mut k = f;
    k.sort_unstable();
    k
}

fn ensure_i32(
    collection: &mut AttributeCollection,
    name: &str,
) -> Result<AttributeSlot, MeshSceneError> {
    match collection.find(name) {
        Some(slot) => Ok(slot),
        None => collection.create_protected(name, 0i32),
    }
}

/// Marks boundary elements with the reserved `is_surf` attribute.
///
/// For a tetrahedral geometry this first appends the boundary triangles
/// (faces owned by exactly one tetrahedron) to the triangle table, then tags
/// those triangles and every vertex they reference. Lower-dimensional
/// geometries are entirely boundary: all their elements are tagged.
pub fn label_surface(geometry: &mut Geometry) -> Result<(), MeshSceneError> {
    let dim = geometry.dim();
    if dim == 3 {
        let counts = geometry
            .topology()
            .tetrahedra()
            .iter()
            .flat_map(|&t| tet_faces(t))
            .map(face_key)
            .counts();

        let mut table = geometry.topology().triangles().to_vec();
        let mut known: std::collections::HashSet<[Index; 3]> =
            table.iter().map(|&f| face_key(f)).collect();
        for &tet in geometry.topology().tetrahedra() {
            for face in tet_faces(tet) {
                let key = face_key(face);
                if counts[&key] == 1 && known.insert(key) {
                    table.push(face);
                }
            }
        }
        geometry.set_triangle_table(table)?;

        let surf_tris = ensure_i32(geometry.triangles_mut(), builtin::IS_SURF)?;
        let view = surf_tris.view_mut()?;
        let mut surf_vertices = vec![0i32; geometry.vertex_count()];
        for (i, &tri) in geometry.topology().triangles().iter().enumerate() {
            let boundary = counts.get(&face_key(tri)).copied() == Some(1);
            view.set::<i32>(i, boundary as i32)?;
            if boundary {
                for v in tri {
                    surf_vertices[v as usize] = 1;
                }
            }
        }
        drop(view);

        let surf = ensure_i32(geometry.vertices_mut(), builtin::IS_SURF)?;
        surf.view_mut()?.copy_from_slice(&surf_vertices)?;
        return Ok(());
    }

    // Everything in a geometry of dimension <= 2 lies on the boundary.
    let surf = ensure_i32(geometry.vertices_mut(), builtin::IS_SURF)?;
    surf.view_mut()?.fill(1i32)?;
    if geometry.edges().size() > 0 {
        let surf = ensure_i32(geometry.edges_mut(), builtin::IS_SURF)?;
        surf.view_mut()?.fill(1i32)?;
    }
    if geometry.triangles().size() > 0 {
        let surf = ensure_i32(geometry.triangles_mut(), builtin::IS_SURF)?;
        surf.view_mut()?.fill(1i32)?;
    }
    Ok(())
}

/// Writes the reserved `orient` attribute on triangles of a tetrahedral
/// geometry: +1 when the triangle agrees with its owning tetrahedron's
/// outward face winding, -1 when it is wound inward, 0 for interior or
/// unmatched triangles.
pub fn label_triangle_orient(geometry: &mut Geometry) -> Result<(), MeshSceneError> {
    let mut outward: HashMap<[Index; 3], [Index; 3]> = HashMap::new();
    let mut shared: HashMap<[Index; 3], usize> = HashMap::new();
    for &tet in geometry.topology().tetrahedra() {
        for face in tet_faces(tet) {
            let key = face_key(face);
            *shared.entry(key).or_insert(0) += 1;
            outward.insert(key, face);
        }
    }

    let orients: Vec<i32> = geometry
        .topology()
        .triangles()
        .iter()
        .map(|&tri| {
            let key = face_key(tri);
            if shared.get(&key).copied() != Some(1) {
                return 0;
            }
            let [x, y, z] = outward[&key];
            let even = tri == [x, y, z] || tri == [y, z, x] || tri == [z, x, y];
            if even { 1 } else { -1 }
        })
        .collect();

    let orient = ensure_i32(geometry.triangles_mut(), builtin::ORIENT)?;
    orient.view_mut()?.copy_from_slice(&orients)?;
    Ok(())
}

/// Returns a copy in which every inward-wound surface triangle
/// (`orient == -1`) is flipped and re-tagged outward.
///
/// # Errors
/// `AttributeNotFound` when `orient` was never labeled.
pub fn flip_inward_triangles(geometry: &Geometry) -> Result<Geometry, MeshSceneError> {
    let orient = geometry
        .triangles()
        .find(builtin::ORIENT)
        .ok_or_else(|| MeshSceneError::AttributeNotFound(builtin::ORIENT.to_string()))?;
    let orients = orient.view().to_vec::<i32>()?;

    let copy = geometry.copy();
    let flipped: Vec<[Index; 3]> = copy
        .topology()
        .triangles()
        .iter()
        .zip(&orients)
        .map(|(&[a, b, c], &o)| if o == -1 { [a, c, b] } else { [a, b, c] })
        .collect();
    let mut copy = copy;
    copy.topology_mut().set_triangles(flipped);

    let orient = copy
        .triangles()
        .find(builtin::ORIENT)
        .ok_or_else(|| MeshSceneError::AttributeNotFound(builtin::ORIENT.to_string()))?;
    let view = orient.view_mut()?;
    for (i, &o) in orients.iter().enumerate() {
        if o == -1 {
            view.set::<i32>(i, 1)?;
        }
    }
    Ok(copy)
}

/// Dimension-reducing projection keeping only boundary elements.
///
/// Builds a fresh triangle mesh from the `is_surf` triangles, renumbering
/// vertex indices densely; only positions carry over to the new geometry.
///
/// # Errors
/// `AttributeNotFound` when the geometry was never surface-labeled.
pub fn extract_surface(geometry: &Geometry) -> Result<Geometry, MeshSceneError> {
    let surf = geometry
        .triangles()
        .find(builtin::IS_SURF)
        .ok_or_else(|| MeshSceneError::AttributeNotFound(builtin::IS_SURF.to_string()))?;
    let flags = surf.view().to_vec::<i32>()?;
    let positions = geometry.positions().view().to_vec::<DVec3>()?;

    let mut remap: HashMap<Index, Index> = HashMap::new();
    let mut points: Vec<DVec3> = Vec::new();
    let mut triangles: Vec<[Index; 3]> = Vec::new();
    for (tri, flag) in geometry.topology().triangles().iter().zip(&flags) {
        if *flag == 0 {
            continue;
        }
        let mapped = tri.map(|v| {
            *remap.entry(v).or_insert_with(|| {
                points.push(positions[v as usize]);
                (points.len() - 1) as Index
            })
        });
        triangles.push(mapped);
    }
    crate::geometry::factory::trimesh(&points, &triangles)
}

/// Concatenates attributes common to every part into `target`.
///
/// An attribute carries over only when each part stores it under the same
/// name and element type; `target` must already be sized to the summed
/// element count.
fn concat_collections(
    target: &mut AttributeCollection,
    parts: &[&AttributeCollection],
) -> Result<(), MeshSceneError> {
    let Some(first) = parts.first() else {
        return Ok(());
    };
    for (name, slot) in first.iter() {
        let ty = slot.attr_type();
        if !parts.iter().all(|p| {
            p.find(name)
                .map(|s| s.attr_type() == ty)
                .unwrap_or(false)
        }) {
            continue;
        }
        let out = match target.find(name) {
            Some(out) => out,
            None => target.create_dynamic(name, slot.default_value())?,
        };
        let view = out.view_mut()?;
        let mut row = 0usize;
        for part in parts {
            let src = part.find(name).expect("presence checked above").view();
            for i in 0..src.len()? {
                view.set_value(row, &src.value(i)?)?;
                row += 1;
            }
        }
    }
    Ok(())
}

/// Concatenates geometries of equal dimension into one, renumbering simplex
/// indices and concatenating instance tables.
///
/// # Errors
/// `DimensionMismatch` when dimensions differ, `ConfigMismatch` on empty
/// input.
pub fn merge(geometries: &[&Geometry]) -> Result<Geometry, MeshSceneError> {
    let Some(first) = geometries.first() else {
        return Err(MeshSceneError::ConfigMismatch(
            "merge requires at least one geometry".into(),
        ));
    };
    let dim = first.dim();
    for g in geometries {
        if g.dim() != dim {
            return Err(MeshSceneError::DimensionMismatch {
                expected: dim,
                found: g.dim(),
            });
        }
    }

    let mut merged = Geometry::new();

    let total_vertices: usize = geometries.iter().map(|g| g.vertex_count()).sum();
    merged.vertices_mut().resize(total_vertices)?;

    let mut edges = Vec::new();
    let mut triangles = Vec::new();
    let mut tetrahedra = Vec::new();
    let mut offset: Index = 0;
    for g in geometries {
        let topo = g.topology();
        edges.extend(topo.edges().iter().map(|e| e.map(|v| v + offset)));
        triangles.extend(topo.triangles().iter().map(|t| t.map(|v| v + offset)));
        tetrahedra.extend(topo.tetrahedra().iter().map(|t| t.map(|v| v + offset)));
        offset += g.vertex_count() as Index;
    }
    merged.edges_mut().resize(edges.len())?;
    merged.triangles_mut().resize(triangles.len())?;
    merged.tetrahedra_mut().resize(tetrahedra.len())?;
    merged.topology_mut().set_edges(edges);
    merged.topology_mut().set_triangles(triangles);
    merged.topology_mut().set_tetrahedra(tetrahedra);

    let total_instances: usize = geometries.iter().map(|g| g.instance_count()).sum();
    merged.instances_mut().resize(total_instances)?;

    let vertex_parts: Vec<&AttributeCollection> =
        geometries.iter().map(|g| g.vertices()).collect();
    concat_collections(merged.vertices_mut(), &vertex_parts)?;
    let edge_parts: Vec<&AttributeCollection> = geometries.iter().map(|g| g.edges()).collect();
    concat_collections(merged.edges_mut(), &edge_parts)?;
    let tri_parts: Vec<&AttributeCollection> =
        geometries.iter().map(|g| g.triangles()).collect();
    concat_collections(merged.triangles_mut(), &tri_parts)?;
    let tet_parts: Vec<&AttributeCollection> =
        geometries.iter().map(|g| g.tetrahedra()).collect();
    concat_collections(merged.tetrahedra_mut(), &tet_parts)?;
    let instance_parts: Vec<&AttributeCollection> =
        geometries.iter().map(|g| g.instances()).collect();
    concat_collections(merged.instances_mut(), &instance_parts)?;

    Ok(merged)
}

/// Bakes each instance's transform into a standalone single-instance
/// geometry, leaving the shared positions of the source untouched.
pub fn apply_transform(geometry: &Geometry) -> Result<Vec<Geometry>, MeshSceneError> {
    let transforms = geometry.transforms().view().to_vec::<DMat4>()?;
    let positions = geometry.positions().view().to_vec::<DVec3>()?;

    let mut baked = Vec::with_capacity(transforms.len());
    for m in transforms {
        let mut copy = geometry.copy();
        let placed: Vec<DVec3> = positions.iter().map(|&p| m.transform_point3(p)).collect();
        copy.positions().view_mut()?.copy_from_slice(&placed)?;
        copy.instances_mut().resize(1)?;
        copy.transforms().view_mut()?.set::<DMat4>(0, DMat4::IDENTITY)?;
        baked.push(copy);
    }
    Ok(baked)
}
