//! Engine boundary: the solver backend contract consumed by
//! [`World`](crate::world::World).
//!
//! A backend may run its computation anywhere (host, device); from this
//! core's perspective every call is a single blocking boundary, and
//! `do_retrieve` completes only after backend-side state has been copied
//! back into host-owned attribute buffers.
#![warn(missing_docs)]

pub mod host;

pub use host::HostEngine;

use crate::scene::Scene;
use crate::scene_error::MeshSceneError;

/// Solver backend contract.
pub trait Engine {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// One-time binding of a scene.
    ///
    /// # Errors
    /// `ConfigMismatch` when scene content violates backend preconditions.
    fn do_init(&mut self, scene: &Scene) -> Result<(), MeshSceneError>;

    /// Advances one full step from the animator-produced target state.
    fn do_advance(&mut self, scene: &Scene, frame: u64) -> Result<(), MeshSceneError>;

    /// Copies resulting per-element state back into the scene's current
    /// geometry slots.
    fn do_retrieve(&mut self, scene: &Scene) -> Result<(), MeshSceneError>;

    /// Runs the differentiation pass and populates the scene's
    /// differentiable-simulation context.
    fn do_backward(&mut self, scene: &Scene) -> Result<(), MeshSceneError>;
}
