//! World: the step-driving boundary between a scene and a solver backend.
//!
//! Each step: the animator's actions run (mutating reserved attributes),
//! then the engine advances, then `retrieve` copies resulting state back
//! into the scene's current geometry slots. `dump`/`recover` keep
//! frame-keyed whole-scene checkpoints for re-entrant optimization loops;
//! callers treat them as atomic and opaque.
//!
//! Engine errors are fatal for the world instance: recovery is a fresh
//! `init` from a scene or an explicit `recover(frame)`.
#![warn(missing_docs)]

use std::collections::BTreeMap;

use crate::engine::Engine;
use crate::geometry::Geometry;
use crate::scene::Scene;
use crate::scene::config::SimConfig;
use crate::scene_error::MeshSceneError;

/// Frame-keyed checkpoint of every current geometry.
#[derive(Debug)]
struct SceneSnapshot {
    geometries: Vec<(u64, Geometry)>,
}

/// Owns a solver backend and drives a bound scene through steps.
pub struct World {
    engine: Box<dyn Engine>,
    scene: Option<Scene>,
    frame: u64,
    snapshots: BTreeMap<u64, SceneSnapshot>,
}

impl World {
    /// Creates a world around a backend; no scene is bound yet.
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine,
            scene: None,
            frame: 0,
            snapshots: BTreeMap::new(),
        }
    }

    /// One-time binding of a scene to the backend.
    ///
    /// # Errors
    /// `ConfigMismatch` when the scene's configuration record is malformed
    /// or violates backend preconditions.
    pub fn init(&mut self, scene: Scene) -> Result<(), MeshSceneError> {
        let config = SimConfig::from_value(&scene.config())?;
        config.validate()?;
        self.engine.do_init(&scene)?;
        log::info!(
            "world initialized with `{}` backend, dt {}",
            self.engine.name(),
            config.dt
        );
        self.frame = 0;
        self.scene = Some(scene);
        Ok(())
    }

    fn scene(&self) -> Result<&Scene, MeshSceneError> {
        self.scene.as_ref().ok_or(MeshSceneError::WorldNotInitialized)
    }

    /// Current step counter (0 before the first `advance`).
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advances one full step: animator sub-steps first, then the engine.
    ///
    /// # Errors
    /// Animator action failures abort the step and propagate; engine errors
    /// are fatal for this world instance.
    pub fn advance(&mut self) -> Result<(), MeshSceneError> {
        let scene = self.scene()?.handle();
        let dt = SimConfig::from_value(&scene.config())?.dt;
        let frame = self.frame + 1;
        scene.animator().run_substeps(frame, dt)?;
        self.engine.do_advance(&scene, frame)?;
        self.frame = frame;
        Ok(())
    }

    /// Copies resulting per-element state back into current geometry slots.
    pub fn retrieve(&mut self) -> Result<(), MeshSceneError> {
        let scene = self.scene()?.handle();
        self.engine.do_retrieve(&scene)
    }

    /// Runs the differentiation pass, populating the scene's
    /// differentiable-simulation context.
    pub fn backward(&mut self) -> Result<(), MeshSceneError> {
        let scene = self.scene()?.handle();
        self.engine.do_backward(&scene)
    }

    /// Checkpoints every current geometry under the current frame index.
    pub fn dump(&mut self) -> Result<(), MeshSceneError> {
        let scene = self.scene()?;
        let geometries = scene
            .geometries()
            .ids()
            .into_iter()
            .filter_map(|id| {
                scene
                    .geometries()
                    .find(id)
                    .0
                    .map(|slot| (id, slot.geometry().copy()))
            })
            .collect();
        self.snapshots.insert(self.frame, SceneSnapshot { geometries });
        log::debug!("dumped snapshot for frame {}", self.frame);
        Ok(())
    }

    /// Restores the checkpoint for `frame` (the latest when `None`) and
    /// rewinds the step counter to it.
    ///
    /// # Errors
    /// `SnapshotNotFound` when no matching checkpoint exists.
    pub fn recover(&mut self, frame: Option<u64>) -> Result<(), MeshSceneError> {
        let target = match frame {
            Some(frame) => frame,
            None => *self
                .snapshots
                .keys()
                .next_back()
                .ok_or(MeshSceneError::SnapshotNotFound(0))?,
        };
        let scene = self.scene()?.handle();
        let snapshot = self
            .snapshots
            .get(&target)
            .ok_or(MeshSceneError::SnapshotNotFound(target))?;
        for (id, geometry) in &snapshot.geometries {
            match scene.geometries().find(*id).0 {
                Some(slot) => slot.replace_geometry(geometry.copy()),
                None => log::warn!("snapshot slot {id} no longer registered; skipped"),
            }
        }
        self.frame = target;
        log::debug!("recovered snapshot for frame {target}");
        Ok(())
    }
}
