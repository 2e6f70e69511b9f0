//! Index newtypes for particles, colliders and lattice bones.
//!
//! Contacts, cached planes and debug records carry all three side by
//! side; distinct types keep a collider slot from being read as a
//! particle slot.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! index_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

index_newtype!(
    /// Slot in the particle arrays (`x`, `p`, `inv_m`).
    ParticleId,
    "particle"
);

index_newtype!(
    /// Position of a collider in the list handed to the solver.
    ColliderId,
    "collider"
);

index_newtype!(
    /// Internal bone of a weighted-lattice level set. Maps to the
    /// animation skeleton through a bone map.
    BoneIndex,
    "bone"
);
