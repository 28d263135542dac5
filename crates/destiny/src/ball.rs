//! Add-ball body encoder.
//!
//! Layout (little-endian, packed):
//! ```text
//! header  u32 id | u8 mode | f64 radius | f64 x,y,z | u8 sub_type        38
//! mass    f64 mass | u8 cloak | u64 0xFF.. | u32 corp | u32 alliance    25
//! ship    f64 max_speed | f64 vx,vy,vz | f64 agility | f64 speed_frac  48
//! stop    u8 formation                                                  1
//! warp    u8 formation | f64 tx,ty,tz | u32 stamp | f64 range
//!         | u32 follow_id | u32 owner_id                               45
//! name    u8 len (chars) | u16 * len                               1 + 2n
//! ```
//!
//! Warp is the only movement mode with its own body. Every other mode
//! (goto, follow, orbit) goes out with the stop tag and stop body.

use glam::DVec3;
use orrery_common::{Point, Vector, geom};

use crate::mode::{BallMode, MovementMode};
use crate::sentinel;

pub const HEADER_LEN: usize = 38;
pub const MASS_SECTOR_LEN: usize = 25;
pub const SHIP_SECTOR_LEN: usize = 48;
pub const STOP_BODY_LEN: usize = 1;
pub const WARP_BODY_LEN: usize = 45;

/// Longest name the u8 length prefix can describe.
pub const MAX_NAME_CHARS: usize = u8::MAX as usize;

/// Magnitude of the heading vector written for a warping ball.
pub const WARP_HEADING_SCALE: f64 = 45.0;

const REPLACEMENT_UNIT: u16 = 0xFFFD;

/// Everything the encoder needs to describe one ball.
///
/// Built by the entity layer from its item, physics controller and
/// ownership data; the encoder itself never reaches into those.
#[derive(Debug, Clone, PartialEq)]
pub struct BallState<'a> {
    pub id: u32,
    pub radius: f64,
    pub position: Point,
    pub sub_type: u8,
    pub mass: f64,
    pub cloaked: bool,
    pub corporation_id: u32,
    pub alliance_id: u32,
    pub max_velocity: f64,
    pub velocity: Vector,
    pub agility: f64,
    pub speed_fraction: f64,
    pub mode: MovementMode,
    pub name: &'a str,
}

/// Movement-mode bodies that have a wire layout.
#[derive(Debug, Clone, Copy)]
enum Body {
    Stop,
    Warp { target: Point },
}

impl Body {
    fn for_mode(mode: &MovementMode) -> Self {
        match *mode {
            MovementMode::Warping { target } => Body::Warp { target },
            _ => Body::Stop,
        }
    }

    fn ball_mode(self) -> BallMode {
        match self {
            Body::Stop => BallMode::Stop,
            Body::Warp { .. } => BallMode::Warp,
        }
    }

    fn len(self) -> usize {
        match self {
            Body::Stop => STOP_BODY_LEN,
            Body::Warp { .. } => WARP_BODY_LEN,
        }
    }
}

/// Size of the movement-mode body for `mode`.
pub fn body_len(mode: &MovementMode) -> usize {
    Body::for_mode(mode).len()
}

/// Mode tag written in the header for `mode`.
pub fn wire_mode(mode: &MovementMode) -> BallMode {
    Body::for_mode(mode).ball_mode()
}

/// Number of characters the name field will carry.
pub fn name_len(name: &str) -> usize {
    name.chars().count().min(MAX_NAME_CHARS)
}

/// Exact size of the encoded ball body, excluding the envelope.
pub fn encoded_len(state: &BallState<'_>) -> usize {
    HEADER_LEN
        + MASS_SECTOR_LEN
        + SHIP_SECTOR_LEN
        + body_len(&state.mode)
        + 1
        + 2 * name_len(state.name)
}

/// Append the ball body for `state` to `out`.
pub fn encode_ball(state: &BallState<'_>, out: &mut Vec<u8>) {
    let body = Body::for_mode(&state.mode);
    let len = encoded_len(state);
    out.reserve_exact(len);
    let start = out.len();

    // header
    put_u32(out, state.id);
    out.push(body.ball_mode().tag());
    put_f64(out, state.radius);
    put_vec3(out, state.position);
    out.push(state.sub_type);

    // mass sector
    put_f64(out, state.mass);
    out.push(u8::from(state.cloaked));
    put_u64(out, sentinel::MASS_UNKNOWN);
    put_u32(out, state.corporation_id);
    put_u32(out, state.alliance_id);

    // ship sector
    let velocity = match body {
        Body::Warp { target } => geom::heading(state.position, target) * WARP_HEADING_SCALE,
        Body::Stop => state.velocity,
    };
    put_f64(out, state.max_velocity);
    put_vec3(out, velocity);
    put_f64(out, state.agility);
    put_f64(out, state.speed_fraction);

    match body {
        Body::Stop => {
            out.push(sentinel::FORMATION_NONE);
        }
        Body::Warp { target } => {
            out.push(sentinel::FORMATION_NONE);
            put_vec3(out, target);
            put_u32(out, sentinel::WARP_EFFECT_STAMP);
            put_f64(out, sentinel::WARP_FOLLOW_RANGE);
            put_u32(out, sentinel::WARP_FOLLOW_ID);
            put_u32(out, sentinel::WARP_OWNER_ID);
        }
    }

    encode_name(state.name, out);
    debug_assert_eq!(out.len() - start, len);
}

/// Append a length-prefixed name where every character is widened to one
/// 16-bit unit.
///
/// Characters outside the Basic Multilingual Plane become U+FFFD; names
/// longer than [`MAX_NAME_CHARS`] are truncated.
pub fn encode_name(name: &str, out: &mut Vec<u8>) {
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        tracing::warn!(chars, max = MAX_NAME_CHARS, "ball name truncated");
    }
    let len = name_len(name);
    out.push(len as u8);
    for c in name.chars().take(len) {
        let unit = u16::try_from(u32::from(c)).unwrap_or(REPLACEMENT_UNIT);
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_vec3(out: &mut Vec<u8>, v: DVec3) {
    put_f64(out, v.x);
    put_f64(out, v.y);
    put_f64(out, v.z);
}
