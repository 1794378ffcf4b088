use glam::DVec3;
use mesh_scene::builtin;
use mesh_scene::engine::HostEngine;
use mesh_scene::geometry::tetmesh;
use mesh_scene::scene::{Scene, SoftPositionConstraint, UpdateInfo};
use mesh_scene::scene_error::MeshSceneError;
use mesh_scene::world::World;

fn constrained_scene() -> (Scene, u64) {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");

    let mut tet = tetmesh(
        &[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO],
        &[[0, 1, 2, 3]],
    )
    .unwrap();
    SoftPositionConstraint::new().apply_to(&mut tet, 100.0).unwrap();
    let (current, _) = object.geometries().create(&tet).unwrap();
    let id = current.id();

    // Pin vertex 0 to a target that rises with the frame counter.
    scene
        .animator()
        .insert(&object, |info: &mut UpdateInfo<'_>| {
            let frame = info.frame();
            for slot in info.geo_slots() {
                let geometry = slot.geometry();
                let constrained = geometry
                    .vertices()
                    .find(builtin::IS_CONSTRAINED)
                    .ok_or_else(|| {
                        MeshSceneError::AttributeNotFound(builtin::IS_CONSTRAINED.into())
                    })?;
                constrained.view_mut()?.set::<i32>(0, 1)?;
                let aim = geometry
                    .vertices()
                    .find(builtin::AIM_POSITION)
                    .ok_or_else(|| {
                        MeshSceneError::AttributeNotFound(builtin::AIM_POSITION.into())
                    })?;
                aim.view_mut()?
                    .set::<DVec3>(0, DVec3::new(1.0, 0.1 * frame as f64, 0.0))?;
            }
            Ok(())
        })
        .unwrap();

    (scene, id)
}

#[test]
fn constrained_vertex_follows_its_aim() {
    let (scene, id) = constrained_scene();
    let mut world = World::new(Box::new(HostEngine::new()));
    world.init(scene.handle()).unwrap();

    for _ in 0..3 {
        world.advance().unwrap();
        world.retrieve().unwrap();
    }

    let (current, _) = scene.geometries().find(id);
    let slot = current.unwrap();
    let p = slot.geometry().positions().view().get::<DVec3>(0).unwrap();
    assert!((p.y - 0.3).abs() < 1e-12);
    // Unconstrained vertices fell instead.
    let q = slot.geometry().positions().view().get::<DVec3>(3).unwrap();
    assert!(q.y < 0.0);
}

#[test]
fn reinsert_replaces_the_prior_action() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    object
        .geometries()
        .create(&tetmesh(&[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO], &[[0, 1, 2, 3]]).unwrap())
        .unwrap();

    scene
        .animator()
        .insert(&object, |_: &mut UpdateInfo<'_>| {
            Err(MeshSceneError::ConfigMismatch("first action".into()))
        })
        .unwrap();
    scene
        .animator()
        .insert(&object, |_: &mut UpdateInfo<'_>| Ok(()))
        .unwrap();
    assert_eq!(scene.animator().size(), 1);

    let mut world = World::new(Box::new(HostEngine::new()));
    world.init(scene.handle()).unwrap();
    // The replacement action runs; the failing one is gone.
    world.advance().unwrap();
}

#[test]
fn action_errors_abort_the_step() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    object
        .geometries()
        .create(&tetmesh(&[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO], &[[0, 1, 2, 3]]).unwrap())
        .unwrap();
    scene
        .animator()
        .insert(&object, |_: &mut UpdateInfo<'_>| {
            Err(MeshSceneError::ConfigMismatch("scripted failure".into()))
        })
        .unwrap();

    let mut world = World::new(Box::new(HostEngine::new()));
    world.init(scene.handle()).unwrap();
    let err = world.advance().unwrap_err();
    assert!(matches!(err, MeshSceneError::AnimationFailed { object: id, .. } if id == object.id()));
    // The aborted step did not count.
    assert_eq!(world.frame(), 0);
}

#[test]
fn substeps_tick_monotonically() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    object
        .geometries()
        .create(&tetmesh(&[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO], &[[0, 1, 2, 3]]).unwrap())
        .unwrap();

    let ticks: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ticks);
    scene
        .animator()
        .insert(&object, move |info: &mut UpdateInfo<'_>| {
            sink.borrow_mut().push(info.tick());
            Ok(())
        })
        .unwrap();
    scene.animator().substep(3);
    assert_eq!(scene.animator().substeps(), 3);

    let mut world = World::new(Box::new(HostEngine::new()));
    world.init(scene.handle()).unwrap();
    world.advance().unwrap();
    world.advance().unwrap();

    assert_eq!(*ticks.borrow(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn destroyed_object_loses_its_animation() {
    let scene = Scene::with_default_config();
    let object = scene.objects().create("body");
    object
        .geometries()
        .create(&tetmesh(&[DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO], &[[0, 1, 2, 3]]).unwrap())
        .unwrap();
    scene
        .animator()
        .insert(&object, |_: &mut UpdateInfo<'_>| Ok(()))
        .unwrap();
    scene.objects().destroy(object.id()).unwrap();
    assert_eq!(scene.animator().size(), 0);
    assert!(matches!(
        scene.animator().insert(&object, |_: &mut UpdateInfo<'_>| Ok(())),
        Err(MeshSceneError::ObjectNotFound(_))
    ));
}
