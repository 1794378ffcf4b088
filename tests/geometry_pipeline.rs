use glam::{DMat4, DVec3};
use mesh_scene::builtin;
use mesh_scene::geometry::{
    apply_transform, extract_surface, flip_inward_triangles, label_surface,
    label_triangle_orient, merge, tetmesh,
};

fn two_tets() -> mesh_scene::geometry::Geometry {
    // Two tetrahedra sharing the (1,2,3) face: six boundary faces, one
    // interior face.
    tetmesh(
        &[
            DVec3::ZERO,
            DVec3::X,
            DVec3::Y,
            DVec3::Z,
            DVec3::new(1.0, 1.0, 1.0),
        ],
        &[[0, 1, 2, 3], [4, 3, 2, 1]],
    )
    .unwrap()
}

#[test]
fn surface_pipeline_on_a_shared_face() {
    let mut g = two_tets();
    label_surface(&mut g).unwrap();

    // 2 tets x 4 faces = 8, minus the shared face counted twice: 6 boundary.
    assert_eq!(g.topology().triangles().len(), 6);
    let surf = g.triangles().find(builtin::IS_SURF).unwrap();
    assert!(surf.view().to_vec::<i32>().unwrap().iter().all(|&s| s == 1));
    let vsurf = g.vertices().find(builtin::IS_SURF).unwrap();
    assert!(vsurf.view().to_vec::<i32>().unwrap().iter().all(|&s| s == 1));

    label_triangle_orient(&mut g).unwrap();
    let fixed = flip_inward_triangles(&g).unwrap();
    let orient = fixed.triangles().find(builtin::ORIENT).unwrap();
    assert!(orient.view().to_vec::<i32>().unwrap().iter().all(|&o| o == 1));

    let surface = extract_surface(&fixed).unwrap();
    assert_eq!(surface.dim(), 2);
    assert_eq!(surface.topology().triangles().len(), 6);
    assert_eq!(surface.vertex_count(), 5);
    surface.topology().validate(surface.vertex_count()).unwrap();
}

#[test]
fn instanced_merge_bakes_then_concatenates() {
    let mut g = two_tets();
    g.instances_mut().resize(2).unwrap();
    g.transforms()
        .view_mut()
        .unwrap()
        .set::<DMat4>(1, DMat4::from_translation(DVec3::new(0.0, 0.0, 4.0)))
        .unwrap();

    let baked = apply_transform(&g).unwrap();
    assert_eq!(baked.len(), 2);

    let parts: Vec<&mesh_scene::geometry::Geometry> = baked.iter().collect();
    let merged = merge(&parts).unwrap();
    assert_eq!(merged.vertex_count(), 10);
    assert_eq!(merged.topology().tetrahedra().len(), 4);
    assert_eq!(merged.instance_count(), 2);

    // The second copy's indices were renumbered past the first copy.
    assert_eq!(merged.topology().tetrahedra()[2], [5, 6, 7, 8]);
    // Baked translation survived the merge.
    let p = merged.positions().view().get::<DVec3>(5).unwrap();
    assert_eq!(p, DVec3::new(0.0, 0.0, 4.0));
}

#[test]
fn merge_carries_common_attributes() {
    let mut a = two_tets();
    let mut b = two_tets();
    a.tetrahedra_mut().create("mu", 1.0f64).unwrap();
    b.tetrahedra_mut().create("mu", 2.0f64).unwrap();
    // Present only on one part: not carried.
    a.tetrahedra_mut().create("only_a", 5i64).unwrap();

    let merged = merge(&[&a, &b]).unwrap();
    let mu = merged.tetrahedra().find("mu").unwrap();
    assert_eq!(
        mu.view().to_vec::<f64>().unwrap(),
        vec![1.0, 1.0, 2.0, 2.0]
    );
    assert!(merged.tetrahedra().find("only_a").is_none());
}
