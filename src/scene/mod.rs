//! Scene module: objects, slots, registries, tabulars, and the animator.
#![warn(missing_docs)]

pub mod animator;
pub mod config;
pub mod constitution;
pub mod contact;
pub mod object;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod slot;

pub use animator::{Animator, AnimatorPhase, StepAction, UpdateInfo};
pub use config::SimConfig;
pub use constitution::{
    Constitution, ConstitutionTabular, ElasticModuli, NeoHookean, SoftPositionConstraint,
};
pub use contact::{ContactElement, ContactModel, ContactTabular};
pub use object::{Object, ObjectGeometries};
pub use scene::{Geometries, Objects, Scene};
pub use slot::{GeometrySlot, SharedGeometrySlot};
