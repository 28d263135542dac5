//! Destiny: the binary "ball" protocol used to introduce and refresh
//! spatial entities on clients.
//!
//! An add-ball update is two composable layers:
//! 1. [`Envelope`]: continuation flag + per-recipient sequence number.
//! 2. Ball body ([`encode_ball`]): header, mass sector, ship sector,
//!    movement-mode body, and the length-prefixed name.
//!
//! # Invariants
//! - All fields are little-endian and packed with no padding.
//! - The exact output length is known before any byte is written.
//! - Movement modes without their own body are sent with the stop layout.

mod ball;
mod decode;
mod envelope;
mod mode;

pub use ball::{
    BallState, HEADER_LEN, MASS_SECTOR_LEN, MAX_NAME_CHARS, SHIP_SECTOR_LEN, STOP_BODY_LEN,
    WARP_BODY_LEN, WARP_HEADING_SCALE, body_len, encode_ball, encode_name, encoded_len,
    name_len, wire_mode,
};
pub use decode::{DecodeError, DecodedBall, DecodedWarp, decode_ball, decode_update, hex_dump};
pub use envelope::{ENVELOPE_LEN, Envelope, write_envelope};
pub use mode::{BallMode, MovementMode, sub_type};

/// Opaque protocol constants. Clients compare them byte for byte.
pub mod sentinel {
    /// Mass-sector field of unknown meaning, always all ones.
    pub const MASS_UNKNOWN: u64 = 0xFFFF_FFFF_FFFF_FFFF;
    /// "No formation".
    pub const FORMATION_NONE: u8 = 0xFF;
    /// Warp body effect stamp.
    pub const WARP_EFFECT_STAMP: u32 = 0xFFFF_FFFF;
    /// Warp body follow range.
    pub const WARP_FOLLOW_RANGE: f64 = 1000.0;
    /// Warp body follow id.
    pub const WARP_FOLLOW_ID: u32 = 0;
    /// Warp body owner id.
    pub const WARP_OWNER_ID: u32 = 0x1E;
    /// Speed fraction until throttle is modelled.
    pub const FULL_SPEED_FRACTION: f64 = 1.0;
}

pub fn crate_info() -> &'static str {
    "orrery-destiny v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("destiny"));
    }
}
