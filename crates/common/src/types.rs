use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity in a scene.
///
/// Entities are keyed by the id of the inventory item that backs them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved id meaning "no entity".
    pub const NONE: EntityId = EntityId(0);

    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookup key for a bubble (spatial partition cell).
///
/// A plain handle: holding one grants no ownership, and the partition may
/// invalidate or rebind it at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BubbleId(pub u32);

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bubble-{}", self.0)
    }
}
