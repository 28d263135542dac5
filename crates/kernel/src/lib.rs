//! Scene kernel: authoritative entity state and the per-tick drive that
//! turns it into Destiny add-ball messages.
//!
//! # Invariants
//! - Each tick steps all physics before any bookkeeping.
//! - Encoding borrows entities immutably, so it can never interleave with
//!   a step on the same entity.
//! - Per-entity failures are local: the scene logs them and keeps going.

pub mod damage;
pub mod entity;
pub mod item;
pub mod message;
pub mod physics;
pub mod scene;
pub mod targets;

pub use damage::{DAMAGE_TAU, DamageState};
pub use entity::{
    BallConfig, DynamicEntity, EntityCore, FALLBACK_RADIUS, ItemEntity, PLACEHOLDER_NAME,
    SystemEntity, same_item,
};
pub use item::{InventoryItem, ItemRecord, ItemRef};
pub use message::{AddBall, BallError, SLIM_ITEM_TYPE, SlimItem};
pub use physics::{KinematicController, PhysicsController};
pub use scene::{Scene, SceneConfig, SceneError};
pub use targets::TargetList;

pub fn crate_info() -> &'static str {
    "orrery-kernel v0.1.0"
}
