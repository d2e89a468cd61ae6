//! Physical materials and material selections
//!
//! A collider does not hold materials directly. It holds a
//! [`MaterialSelection`]: an ordered list of [`MaterialId`] slots, one per
//! sub-shape of a mesh asset, that the material registry turns into native
//! material handles when the shape is built.

use serde::{Deserialize, Serialize};

/// Physical material properties for collision response
///
/// Materials define how objects interact during collisions, including
/// friction (how much objects resist sliding) and restitution (bounciness).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient when at rest
    pub static_friction: f32,
    /// Friction coefficient while sliding
    pub dynamic_friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.5,
        }
    }
}

impl PhysicsMaterial {
    /// Ice-like material: very low friction, slight bounce
    pub const ICE: Self = Self {
        static_friction: 0.1,
        dynamic_friction: 0.05,
        restitution: 0.1,
    };

    /// Rubber-like material: high friction, very bouncy
    pub const RUBBER: Self = Self {
        static_friction: 1.0,
        dynamic_friction: 0.9,
        restitution: 0.8,
    };

    /// Concrete-like material: high friction, very low bounce
    pub const CONCRETE: Self = Self {
        static_friction: 0.8,
        dynamic_friction: 0.7,
        restitution: 0.1,
    };

    /// Create a new physics material
    ///
    /// Friction is clamped to be non-negative and restitution to [0.0, 1.0].
    pub fn new(static_friction: f32, dynamic_friction: f32, restitution: f32) -> Self {
        Self {
            static_friction: static_friction.max(0.0),
            dynamic_friction: dynamic_friction.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }
}

/// Name of a material in the material library
///
/// The empty id stands for "the default material".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub String);

impl MaterialId {
    /// Create an id from a material name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this id refers to the default material
    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered material slots assigned to a collider
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSelection {
    #[serde(default)]
    slots: Vec<MaterialId>,
}

impl MaterialSelection {
    /// Create a selection from explicit slots
    pub fn new(slots: Vec<MaterialId>) -> Self {
        Self { slots }
    }

    /// Selection with a single slot
    pub fn single(id: MaterialId) -> Self {
        Self { slots: vec![id] }
    }

    /// All slots, in order
    pub fn material_ids(&self) -> &[MaterialId] {
        &self.slots
    }

    /// Material in the given slot, or the default material if the slot does not exist
    pub fn material_id(&self, slot: usize) -> MaterialId {
        self.slots.get(slot).cloned().unwrap_or_default()
    }

    /// Replace every slot
    pub fn set_material_slots(&mut self, slots: Vec<MaterialId>) {
        self.slots = slots;
    }

    /// Assign the first slot, creating it if the selection is empty
    pub fn set_material_id(&mut self, id: MaterialId) {
        match self.slots.first_mut() {
            Some(first) => *first = id,
            None => self.slots.push(id),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the selection has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
