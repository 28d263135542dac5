//! Outgoing add-ball message and its summaries.

use orrery_common::EntityId;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::damage::DamageState;

/// Object type name the slim item is wrapped in on the wire.
pub const SLIM_ITEM_TYPE: &str = "foo.SlimItem";

/// Identity-only record clients use for minimal rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlimItem {
    #[serde(rename = "itemID")]
    pub item_id: u32,
    #[serde(rename = "typeID")]
    pub type_id: u32,
    #[serde(rename = "ownerID")]
    pub owner_id: u32,
}

impl SlimItem {
    pub fn object_type(&self) -> &'static str {
        SLIM_ITEM_TYPE
    }
}

/// Introduces or refreshes one ball for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddBall {
    /// Envelope + ball body.
    pub destiny_binary: Vec<u8>,
    /// Damage state keyed by ball id.
    pub damages: BTreeMap<EntityId, DamageState>,
    pub slim: SlimItem,
}

/// Why an entity could not produce an add-ball.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BallError {
    #[error("entity {id} has no ball encoding")]
    NotEncodable { id: EntityId },
}
