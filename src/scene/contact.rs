//! Contact tabular: registered contact elements and pairwise models.
//!
//! Elements are tags; geometries opt into a pairwise law by tagging their
//! instances with an element index. Lookups for a pair without an explicit
//! entry fall back to the default model. The element at index 0 is the
//! default element every geometry starts from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::builtin;
use crate::geometry::Geometry;
use crate::scene::scene::SceneCore;
use crate::scene_error::MeshSceneError;

/// One pairwise contact law.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactModel {
    /// The unordered element pair this law applies to.
    pub element_ids: (u64, u64),
    /// Friction ratio of the pair.
    pub friction_ratio: f64,
    /// Contact resistance of the pair.
    pub resistance: f64,
    /// Whether the pair participates in contact at all.
    pub enabled: bool,
}

/// A registered contact element tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactElement {
    index: u64,
    name: String,
}

impl ContactElement {
    /// Auto-assigned element index (0 is the default element).
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Element name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags the geometry's instances with this element's index through the
    /// reserved `contact_element_id` attribute.
    pub fn apply_to(&self, geometry: &mut Geometry) -> Result<(), MeshSceneError> {
        let slot = match geometry.instances().find(builtin::CONTACT_ELEMENT_ID) {
            Some(slot) => slot,
            None => geometry
                .instances_mut()
                .create_protected(builtin::CONTACT_ELEMENT_ID, 0i64)?,
        };
        slot.view_mut()?.fill(self.index as i64)?;
        Ok(())
    }
}

/// Contact state owned by the scene core.
#[derive(Debug)]
pub(crate) struct ContactState {
    pub(crate) elements: Vec<String>,
    pub(crate) models: HashMap<(u64, u64), ContactModel>,
    pub(crate) default_model: ContactModel,
}

impl Default for ContactState {
    fn default() -> Self {
        Self {
            elements: vec!["default".to_string()],
            models: HashMap::new(),
            default_model: ContactModel {
                element_ids: (0, 0),
                friction_ratio: 0.5,
                resistance: 1.0e9,
                enabled: true,
            },
        }
    }
}

fn pair_key(a: u64, b: u64) -> (u64, u64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Accessor handle onto the scene's contact tabular.
#[derive(Clone)]
pub struct ContactTabular {
    pub(crate) core: Rc<RefCell<SceneCore>>,
}

impl ContactTabular {
    /// Sets the fallback pairwise law.
    pub fn default_model(&self, friction_ratio: f64, resistance: f64) {
        let mut core = self.core.borrow_mut();
        core.contact.default_model = ContactModel {
            element_ids: (0, 0),
            friction_ratio,
            resistance,
            enabled: true,
        };
    }

    /// The element every geometry is tagged with until told otherwise.
    pub fn default_element(&self) -> ContactElement {
        let core = self.core.borrow();
        ContactElement {
            index: 0,
            name: core.contact.elements[0].clone(),
        }
    }

    /// Registers a new contact element under an auto-assigned index.
    pub fn create(&self, name: &str) -> ContactElement {
        let mut core = self.core.borrow_mut();
        let index = core.contact.elements.len() as u64;
        let name = if name.is_empty() {
            format!("contact_element_{index}")
        } else {
            name.to_string()
        };
        core.contact.elements.push(name.clone());
        ContactElement { index, name }
    }

    /// Records an override law for the unordered pair `(a, b)`.
    ///
    /// # Errors
    /// `ContactElementOutOfRange` when either element is not registered
    /// in this tabular.
    pub fn insert(
        &self,
        a: &ContactElement,
        b: &ContactElement,
        friction_ratio: f64,
        resistance: f64,
    ) -> Result<(), MeshSceneError> {
        let mut core = self.core.borrow_mut();
        let count = core.contact.elements.len();
        for e in [a, b] {
            if e.index as usize >= count {
                return Err(MeshSceneError::ContactElementOutOfRange {
                    index: e.index,
                    count,
                });
            }
        }
        let key = pair_key(a.index, b.index);
        core.contact.models.insert(
            key,
            ContactModel {
                element_ids: key,
                friction_ratio,
                resistance,
                enabled: true,
            },
        );
        Ok(())
    }

    /// Looks up the law for `(i, j)`, falling back to the default model.
    ///
    /// # Errors
    /// `ContactElementOutOfRange` when either index is not registered.
    pub fn at(&self, i: u64, j: u64) -> Result<ContactModel, MeshSceneError> {
        let core = self.core.borrow();
        let count = core.contact.elements.len();
        for index in [i, j] {
            if index as usize >= count {
                return Err(MeshSceneError::ContactElementOutOfRange { index, count });
            }
        }
        let key = pair_key(i, j);
        Ok(core.contact.models.get(&key).cloned().unwrap_or_else(|| {
            let mut model = core.contact.default_model.clone();
            model.element_ids = key;
            model
        }))
    }

    /// Number of registered elements (the default element included).
    pub fn element_count(&self) -> usize {
        self.core.borrow().contact.elements.len()
    }

    /// Every explicit pair law, in unspecified order.
    pub fn contact_models(&self) -> Vec<ContactModel> {
        self.core.borrow().contact.models.values().cloned().collect()
    }
}
