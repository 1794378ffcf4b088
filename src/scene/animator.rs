//! Animator: per-frame step actions keyed by object.
//!
//! Each registered object carries at most one action; re-insertion replaces
//! the prior one. Every solver step runs the configured number of sub-steps,
//! and each sub-step invokes every action once with the object's ordered
//! current and rest geometry slots. The sanctioned side effect of an action
//! is writing reserved constraint/aim attributes; it must not alter topology
//! or element counts.
//!
//! An action error aborts the in-progress step and propagates to the
//! step-driving caller; nothing is retried.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::scene::object::Object;
use crate::scene::scene::SceneCore;
use crate::scene::slot::SharedGeometrySlot;
use crate::scene_error::MeshSceneError;

/// Per-step command object registered with the animator.
///
/// Implement this on whatever state the animation needs; closures of type
/// `FnMut(&mut UpdateInfo) -> Result<(), MeshSceneError>` get it for free.
pub trait StepAction {
    /// Invoked once per sub-step, before the solver consumes state.
    fn on_step(&mut self, info: &mut UpdateInfo<'_>) -> Result<(), MeshSceneError>;
}

impl<F> StepAction for F
where
    F: FnMut(&mut UpdateInfo<'_>) -> Result<(), MeshSceneError>,
{
    fn on_step(&mut self, info: &mut UpdateInfo<'_>) -> Result<(), MeshSceneError> {
        self(info)
    }
}

/// What one sub-step invocation sees.
pub struct UpdateInfo<'a> {
    object_id: u64,
    frame: u64,
    tick: u64,
    dt: f64,
    geo_slots: &'a [SharedGeometrySlot],
    rest_geo_slots: &'a [SharedGeometrySlot],
}

impl<'a> UpdateInfo<'a> {
    /// Id of the object this action animates.
    #[inline]
    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    /// The world's step counter.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Monotonic sub-step counter across the whole run.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Step size.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Ordered current geometry slots of the object.
    #[inline]
    pub fn geo_slots(&self) -> &'a [SharedGeometrySlot] {
        self.geo_slots
    }

    /// Ordered rest geometry slots of the object.
    #[inline]
    pub fn rest_geo_slots(&self) -> &'a [SharedGeometrySlot] {
        self.rest_geo_slots
    }
}

/// Animator step phase, observable between calls.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AnimatorPhase {
    /// No step in flight.
    #[default]
    Idle,
    /// Gathering actions and slots for a step.
    Collecting,
    /// Every action of the step ran to completion.
    Applied,
}

type SharedAction = Rc<RefCell<Box<dyn StepAction>>>;

/// Animator state owned by the scene core.
#[derive(Default)]
pub(crate) struct AnimatorState {
    pub(crate) actions: BTreeMap<u64, SharedAction>,
    pub(crate) substeps: usize,
    pub(crate) tick: u64,
    pub(crate) phase: AnimatorPhase,
}

impl AnimatorState {
    pub(crate) fn new() -> Self {
        Self {
            substeps: 1,
            ..Self::default()
        }
    }
}

impl fmt::Debug for AnimatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatorState")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("substeps", &self.substeps)
            .field("tick", &self.tick)
            .field("phase", &self.phase)
            .finish()
    }
}

/// Accessor handle onto the scene's animator.
#[derive(Clone)]
pub struct Animator {
    pub(crate) core: Rc<RefCell<SceneCore>>,
}

impl Animator {
    /// Registers `action` for `object`, replacing any prior action.
    ///
    /// # Errors
    /// `ObjectNotFound` when the object is not (or no longer) in the scene.
    pub fn insert(
        &self,
        object: &Object,
        action: impl StepAction + 'static,
    ) -> Result<(), MeshSceneError> {
        let mut core = self.core.borrow_mut();
        if !core.objects.contains_key(&object.id()) {
            return Err(MeshSceneError::ObjectNotFound(object.id()));
        }
        core.animator
            .actions
            .insert(object.id(), Rc::new(RefCell::new(Box::new(action))));
        Ok(())
    }

    /// Drops the action registered for `object`, if any.
    pub fn erase(&self, object: &Object) {
        self.core.borrow_mut().animator.actions.remove(&object.id());
    }

    /// Sets how many animator invocations occur per solver step.
    ///
    /// Zero is clamped to one.
    pub fn substep(&self, count: usize) {
        self.core.borrow_mut().animator.substeps = count.max(1);
    }

    /// Invocations per solver step.
    pub fn substeps(&self) -> usize {
        self.core.borrow().animator.substeps
    }

    /// Current step phase.
    pub fn phase(&self) -> AnimatorPhase {
        self.core.borrow().animator.phase
    }

    /// Number of registered actions.
    pub fn size(&self) -> usize {
        self.core.borrow().animator.actions.len()
    }

    /// Runs every registered action for each sub-step of one solver step.
    ///
    /// Actions run in object-id order. The first error aborts the step,
    /// resets the phase to idle, and propagates wrapped with the object id.
    pub(crate) fn run_substeps(&self, frame: u64, dt: f64) -> Result<(), MeshSceneError> {
        // Clone the per-object work out of the core so actions can reach
        // back into the scene without a nested borrow.
        let (entries, substeps) = {
            let mut core = self.core.borrow_mut();
            core.animator.phase = AnimatorPhase::Collecting;
            let mut entries: Vec<(u64, SharedAction, Vec<SharedGeometrySlot>, Vec<SharedGeometrySlot>)> =
                Vec::with_capacity(core.animator.actions.len());
            for (&object_id, action) in &core.animator.actions {
                let Some(record) = core.objects.get(&object_id) else {
                    continue;
                };
                let mut current = Vec::with_capacity(record.geometry_ids.len());
                let mut rest = Vec::with_capacity(record.geometry_ids.len());
                for id in &record.geometry_ids {
                    if let Some(pair) = core.slots.get(id) {
                        current.push(Rc::clone(&pair.current));
                        rest.push(Rc::clone(&pair.rest));
                    }
                }
                entries.push((object_id, Rc::clone(action), current, rest));
            }
            (entries, core.animator.substeps)
        };

        for _ in 0..substeps {
            let tick = {
                let mut core = self.core.borrow_mut();
                core.animator.tick += 1;
                core.animator.tick
            };
            for (object_id, action, current, rest) in &entries {
                let mut info = UpdateInfo {
                    object_id: *object_id,
                    frame,
                    tick,
                    dt,
                    geo_slots: current,
                    rest_geo_slots: rest,
                };
                let outcome = action.borrow_mut().on_step(&mut info);
                if let Err(err) = outcome {
                    self.core.borrow_mut().animator.phase = AnimatorPhase::Idle;
                    return Err(MeshSceneError::AnimationFailed {
                        object: *object_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        // Applied is observable until the next step starts collecting.
        self.core.borrow_mut().animator.phase = AnimatorPhase::Applied;
        Ok(())
    }
}
