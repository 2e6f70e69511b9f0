//! Mapping from a skinned collider's lattice bones to the animation
//! skeleton that drives it.

use weft_types::BoneIndex;

use crate::kinematics::Kinematics;

/// Sparse map from internal lattice bone index to external bone motion.
///
/// Lattice bones without an external counterpart map to `None`, and the
/// solver then uses the collider's rigid motion for friction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneMap {
    lattice_to_external: Vec<Option<usize>>,
    external: Vec<Kinematics>,
}

impl BoneMap {
    /// Creates a bone map. Entries pointing past `external` are dropped
    /// so those bones fall back to the rigid motion.
    pub fn new(mut lattice_to_external: Vec<Option<usize>>, external: Vec<Kinematics>) -> Self {
        for (bone, entry) in lattice_to_external.iter_mut().enumerate() {
            if let Some(index) = *entry {
                if index >= external.len() {
                    tracing::warn!(bone, index, external = external.len(), "bone_map_entry_dropped");
                    *entry = None;
                }
            }
        }
        Self {
            lattice_to_external,
            external,
        }
    }

    /// Motion of the external bone mapped from `bone`, if any.
    ///
    /// Out-of-range indices on either side resolve to `None`.
    pub fn lookup(&self, bone: BoneIndex) -> Option<&Kinematics> {
        let external = (*self.lattice_to_external.get(bone.index())?)?;
        self.external.get(external)
    }

    /// Updates the motion of external bone `index`.
    pub fn set_external(&mut self, index: usize, kinematics: Kinematics) -> bool {
        match self.external.get_mut(index) {
            Some(slot) => {
                *slot = kinematics;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lattice_to_external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lattice_to_external.is_empty()
    }
}
