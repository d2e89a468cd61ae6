//! Opaque handles to objects owned by a physics backend
//!
//! Handles are generational keys: once the backend releases an object its old
//! handle stops resolving instead of aliasing whatever reuses the slot. A
//! configuration that stores a handle therefore only references the native
//! object and never owns it.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Native material
    pub struct MaterialHandle;
    /// Native convex or triangle mesh created from cooked data
    pub struct MeshHandle;
    /// Native height field sampled grid
    pub struct HeightFieldHandle;
    /// Native shape (geometry + materials + flags)
    pub struct ShapeHandle;
    /// Native rigid actor (static or dynamic)
    pub struct ActorHandle;
}

/// Identity of the entity that owns a body, as handed out by the entity framework
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The "no entity" id
    pub const INVALID: Self = Self(0);

    /// Whether this id refers to an entity
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}
