//! Collision filtering
//!
//! Every shape sits on exactly one [`CollisionLayer`] and carries a
//! [`CollisionGroup`]: the set of layers it is willing to interact with.
//! Collider configurations reference groups indirectly through a
//! [`CollisionGroupId`] which the collision registry resolves at build time.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of distinct collision layers
pub const MAX_COLLISION_LAYERS: u8 = 64;

/// A single collision layer, identified by its bit index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(u8);

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CollisionLayer {
    /// Layer used by most objects
    pub const DEFAULT: Self = Self(0);
    /// Static world geometry and terrain
    pub const STATIC: Self = Self(1);
    /// Trigger volumes
    pub const TRIGGER: Self = Self(2);

    /// Create a layer from its bit index; `None` if the index is out of range
    pub fn new(index: u8) -> Option<Self> {
        (index < MAX_COLLISION_LAYERS).then_some(Self(index))
    }

    /// Bit index of this layer
    pub fn index(&self) -> u8 {
        self.0
    }

    /// Single-bit mask of this layer
    pub fn mask(&self) -> u64 {
        1u64 << self.0
    }
}

bitflags! {
    /// Set of layers a shape can collide with
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionGroup: u64 {
        /// Interacts with nothing
        const NONE = 0;
        /// Interacts with every layer
        const ALL = u64::MAX;
    }
}

impl Default for CollisionGroup {
    fn default() -> Self {
        Self::ALL
    }
}

impl CollisionGroup {
    /// Build a group from a list of layers
    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        layers
            .iter()
            .fold(Self::NONE, |group, layer| group | Self::from_bits_retain(layer.mask()))
    }

    /// Whether the layer is part of this group
    pub fn contains_layer(&self, layer: CollisionLayer) -> bool {
        self.bits() & layer.mask() != 0
    }
}

/// Name of a collision group, resolved by the collision registry
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionGroupId(pub String);

impl Default for CollisionGroupId {
    fn default() -> Self {
        Self::all()
    }
}

impl CollisionGroupId {
    /// Name of the built-in group that collides with everything
    pub const ALL_NAME: &'static str = "All";

    /// Create an id from a group name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The built-in "All" group
    pub fn all() -> Self {
        Self(Self::ALL_NAME.to_string())
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Filter words attached to a native shape for simulation and scene queries
///
/// The layer bit is split across `word0` (low half) and `word1` (high half),
/// the group mask across `word2` and `word3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterData {
    pub word0: u32,
    pub word1: u32,
    pub word2: u32,
    pub word3: u32,
}

impl FilterData {
    /// Pack a layer and a group into filter words
    pub fn new(layer: CollisionLayer, group: CollisionGroup) -> Self {
        let layer_mask = layer.mask();
        let group_mask = group.bits();
        Self {
            word0: layer_mask as u32,
            word1: (layer_mask >> 32) as u32,
            word2: group_mask as u32,
            word3: (group_mask >> 32) as u32,
        }
    }

    /// Layer mask encoded in the first two words
    pub fn layer_mask(&self) -> u64 {
        u64::from(self.word0) | (u64::from(self.word1) << 32)
    }

    /// Group encoded in the last two words
    pub fn group(&self) -> CollisionGroup {
        CollisionGroup::from_bits_retain(u64::from(self.word2) | (u64::from(self.word3) << 32))
    }
}
