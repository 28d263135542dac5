//! Shared types and utilities for the orrery simulation core.
//!
//! # Invariants
//! - `EntityId(0)` is reserved for "no entity" and never names a real item.
//! - All positions are `f64` (`glam::DVec3`), matching the wire precision.

pub mod geom;
pub mod time;
mod types;

pub use geom::{Point, Vector};
pub use types::{BubbleId, EntityId};

pub fn crate_info() -> &'static str {
    "orrery-common v0.1.0"
}
