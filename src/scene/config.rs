//! Engine configuration records.
//!
//! The scene stores configuration as a raw JSON record: recognized keys are
//! read through [`SimConfig`] with engine-side defaults, unknown keys pass
//! through untouched for the solver backend to interpret.

use serde::{Deserialize, Serialize};

use crate::scene_error::MeshSceneError;

fn default_dt() -> f64 {
    0.01
}

fn default_gravity() -> [f64; 3] {
    [0.0, -9.8, 0.0]
}

fn default_d_hat() -> f64 {
    0.01
}

fn default_friction_enable() -> bool {
    true
}

fn default_newton_max_iter() -> usize {
    1024
}

fn default_velocity_tol() -> f64 {
    0.05
}

fn default_line_search_max_iter() -> usize {
    1000
}

/// `contact.friction.*` keys.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FrictionConfig {
    /// Whether friction is resolved at all.
    #[serde(default = "default_friction_enable")]
    pub enable: bool,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            enable: default_friction_enable(),
        }
    }
}

/// `contact.*` keys.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ContactConfig {
    /// Contact activation distance.
    #[serde(default = "default_d_hat")]
    pub d_hat: f64,
    /// Friction sub-record.
    #[serde(default)]
    pub friction: FrictionConfig,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            d_hat: default_d_hat(),
            friction: FrictionConfig::default(),
        }
    }
}

/// `newton.*` keys.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NewtonConfig {
    /// Iteration cap for the nonlinear solve.
    #[serde(default = "default_newton_max_iter")]
    pub max_iter: usize,
    /// Convergence tolerance on velocity.
    #[serde(default = "default_velocity_tol")]
    pub velocity_tol: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iter: default_newton_max_iter(),
            velocity_tol: default_velocity_tol(),
        }
    }
}

/// `line_search.*` keys.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LineSearchConfig {
    /// Iteration cap for the line search.
    #[serde(default = "default_line_search_max_iter")]
    pub max_iter: usize,
}

impl Default for LineSearchConfig {
    fn default() -> Self {
        Self {
            max_iter: default_line_search_max_iter(),
        }
    }
}

/// The recognized configuration surface. All keys are optional; missing
/// ones take engine-defined defaults, unrecognized ones are ignored here
/// and passed through in the raw record.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimConfig {
    /// Step size.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Gravity 3-vector.
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
    /// Contact sub-record.
    #[serde(default)]
    pub contact: ContactConfig,
    /// Newton sub-record.
    #[serde(default)]
    pub newton: NewtonConfig,
    /// Line-search sub-record.
    #[serde(default)]
    pub line_search: LineSearchConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            gravity: default_gravity(),
            contact: ContactConfig::default(),
            newton: NewtonConfig::default(),
            line_search: LineSearchConfig::default(),
        }
    }
}

impl SimConfig {
    /// Reads the recognized keys out of a raw record.
    ///
    /// # Errors
    /// `ConfigMismatch` when a recognized key holds a malformed value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, MeshSceneError> {
        serde_json::from_value(value.clone())
            .map_err(|e| MeshSceneError::ConfigMismatch(e.to_string()))
    }

    /// Validates solver preconditions on the recognized keys.
    ///
    /// # Errors
    /// `ConfigMismatch` on a non-positive step size or activation distance.
    pub fn validate(&self) -> Result<(), MeshSceneError> {
        if !(self.dt > 0.0) {
            return Err(MeshSceneError::ConfigMismatch(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if !(self.contact.d_hat > 0.0) {
            return Err(MeshSceneError::ConfigMismatch(format!(
                "contact.d_hat must be positive, got {}",
                self.contact.d_hat
            )));
        }
        Ok(())
    }

    /// Gravity as a vector.
    pub fn gravity_vec(&self) -> glam::DVec3 {
        glam::DVec3::from_array(self.gravity)
    }
}

/// The default configuration record with every recognized key present.
pub fn default_config() -> serde_json::Value {
    serde_json::to_value(SimConfig::default()).expect("default config serializes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip() {
        let record = default_config();
        let cfg = SimConfig::from_value(&record).unwrap();
        assert_eq!(cfg, SimConfig::default());
        assert_eq!(cfg.dt, 0.01);
        assert_eq!(cfg.gravity, [0.0, -9.8, 0.0]);
        assert!(cfg.contact.friction.enable);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let record = serde_json::json!({
            "dt": 0.02,
            "cuda": {"device": 1},
            "contact": {"d_hat": 0.005, "experimental_pruning": true},
        });
        let cfg = SimConfig::from_value(&record).unwrap();
        assert_eq!(cfg.dt, 0.02);
        assert_eq!(cfg.contact.d_hat, 0.005);
        assert_eq!(cfg.newton.max_iter, 1024);
    }

    #[test]
    fn validation_rejects_bad_dt() {
        let mut cfg = SimConfig::default();
        cfg.dt = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(MeshSceneError::ConfigMismatch(_))
        ));
    }
}
