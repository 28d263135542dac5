//! Bubbles: the spatial partition that decides which entities can see
//! each other.
//!
//! # Invariants
//! - Every entity in the scene is in exactly one bubble after a rebuild.
//! - A bubble keeps its id for as long as the partition lives, so handles
//!   stored on entities stay meaningful across rebuilds.
//!
//! # Workaround
//! Bubbles are fixed cubes of `bubble_size` metres instead of the
//! dynamically sized, entity-centred bubbles a live server would grow.

mod partition;

pub use partition::{
    BubbleConfig, BubbleCoord, BubbleError, BubblePartition, DEFAULT_BUBBLE_SIZE,
};

pub fn crate_info() -> &'static str {
    "orrery-bubble v0.1.0"
}
