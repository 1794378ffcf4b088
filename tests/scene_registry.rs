use glam::DVec3;
use mesh_scene::geometry::tetmesh;
use mesh_scene::scene::Scene;
use mesh_scene::scene_error::MeshSceneError;

fn unit_tet() -> mesh_scene::geometry::Geometry {
    tetmesh(
        &[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO],
        &[[0, 1, 2, 3]],
    )
    .unwrap()
}

#[test]
fn create_returns_twins_sharing_one_id() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    let (current, rest) = object.geometries().create(&unit_tet()).unwrap();

    assert_eq!(current.id(), rest.id());
    // Structural twins at creation time.
    assert_eq!(
        current.geometry().topology().tetrahedra(),
        rest.geometry().topology().tetrahedra()
    );
    assert_eq!(
        current.geometry().vertex_count(),
        rest.geometry().vertex_count()
    );

    let (found_current, found_rest) = scene.geometries().find(current.id());
    assert_eq!(found_current.unwrap().id(), current.id());
    assert_eq!(found_rest.unwrap().id(), rest.id());
}

#[test]
fn current_and_rest_values_diverge_independently() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    let (current, rest) = object.geometries().create(&unit_tet()).unwrap();

    current
        .geometry()
        .positions()
        .view_mut()
        .unwrap()
        .set::<DVec3>(0, DVec3::splat(9.0))
        .unwrap();

    assert_eq!(
        rest.geometry().positions().view().get::<DVec3>(0).unwrap(),
        DVec3::X
    );
}

#[test]
fn destroyed_owner_invalidates_lookups() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    let (current, _) = object.geometries().create(&unit_tet()).unwrap();
    let id = current.id();

    scene.objects().destroy(object.id()).unwrap();
    let (c, r) = scene.geometries().find(id);
    assert!(c.is_none());
    assert!(r.is_none());

    // The object handle now fails too.
    assert!(matches!(
        object.geometries().ids(),
        Err(MeshSceneError::ObjectNotFound(_))
    ));
}

#[test]
fn sibling_objects_are_unaffected_by_destroy() {
    let scene = Scene::with_default_config();
    let left = scene.objects().create("left");
    let right = scene.objects().create("right");
    let (l, _) = left.geometries().create(&unit_tet()).unwrap();
    let (r, _) = right.geometries().create(&unit_tet()).unwrap();

    scene.objects().destroy(left.id()).unwrap();

    let (gone, _) = scene.geometries().find(l.id());
    assert!(gone.is_none());
    let (kept, _) = scene.geometries().find(r.id());
    assert_eq!(kept.unwrap().id(), r.id());
    assert_eq!(right.geometries().ids().unwrap(), vec![r.id()]);
}

#[test]
fn object_ids_and_slot_ids_stay_ordered() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("stack");
    let mut previous = None;
    for _ in 0..4 {
        let (current, _) = object.geometries().create(&unit_tet()).unwrap();
        if let Some(last) = previous {
            assert!(current.id() > last);
        }
        previous = Some(current.id());
    }
    let ids = object.geometries().ids().unwrap();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[test]
fn contact_tabular_pairs_fall_back_to_default() {
    let scene = Scene::with_default_config();
    let tabular = scene.contact_tabular();
    tabular.default_model(0.5, 1.0e9);

    let rubber = tabular.create("rubber");
    let steel = tabular.create("steel");
    tabular.insert(&rubber, &steel, 0.9, 2.0e9).unwrap();

    // Explicit pair, looked up in either order.
    let m = tabular.at(steel.index(), rubber.index()).unwrap();
    assert_eq!(m.friction_ratio, 0.9);

    // No explicit entry: the default model applies.
    let d = tabular.at(rubber.index(), rubber.index()).unwrap();
    assert_eq!(d.friction_ratio, 0.5);
    assert_eq!(d.resistance, 1.0e9);

    assert_eq!(tabular.element_count(), 3);
    assert!(matches!(
        tabular.at(0, 7),
        Err(MeshSceneError::ContactElementOutOfRange { index: 7, count: 3 })
    ));
}

#[test]
fn contact_element_tags_instances() {
    let scene = Scene::with_default_config();
    let tabular = scene.contact_tabular();
    let element = tabular.create("cloth");

    let mut tet = unit_tet();
    element.apply_to(&mut tet).unwrap();
    let tags = tet.instances().find("contact_element_id").unwrap();
    assert_eq!(tags.view().get::<i64>(0).unwrap(), element.index() as i64);
}

#[test]
fn constitution_tabular_rejects_duplicates_and_strangers() {
    use mesh_scene::scene::{Constitution, NeoHookean, SoftPositionConstraint};

    let scene = Scene::with_default_config();
    let tabular = scene.constitution_tabular();
    tabular.insert(&NeoHookean::new()).unwrap();
    tabular.insert(&SoftPositionConstraint::new()).unwrap();
    assert!(matches!(
        tabular.insert(&NeoHookean::new()),
        Err(MeshSceneError::DuplicateConstitution(_))
    ));

    struct Homemade;
    impl Constitution for Homemade {
        fn uid(&self) -> u64 {
            424242
        }
        fn name(&self) -> &str {
            "Homemade"
        }
    }
    assert!(matches!(
        tabular.insert(&Homemade),
        Err(MeshSceneError::UnknownConstitution(424242))
    ));
    assert_eq!(tabular.uids().len(), 2);
}
