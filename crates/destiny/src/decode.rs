//! Add-ball decoder, used to dump outgoing updates in trace logs and to
//! verify the encoder.

use glam::DVec3;
use serde::Serialize;

use crate::ball::{HEADER_LEN, MASS_SECTOR_LEN, SHIP_SECTOR_LEN};
use crate::envelope::{ENVELOPE_LEN, Envelope};
use crate::mode::BallMode;

/// Errors from decoding a ball update.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("short read: needed {needed} bytes, {remaining} remaining")]
    ShortRead { needed: usize, remaining: usize },
    #[error("unknown ball mode tag {0}")]
    UnknownMode(u8),
    #[error("no ball body layout for movement mode {0:?}")]
    UnsupportedMode(BallMode),
    #[error("{0} trailing bytes after ball")]
    TrailingBytes(usize),
}

/// Warp-specific body fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedWarp {
    pub target: DVec3,
    pub effect_stamp: u32,
    pub follow_range: f64,
    pub follow_id: u32,
    pub owner_id: u32,
}

/// A ball body read back field by field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedBall {
    pub id: u32,
    pub mode: BallMode,
    pub radius: f64,
    pub position: DVec3,
    pub sub_type: u8,
    pub mass: f64,
    pub cloak: u8,
    pub mass_unknown: u64,
    pub corporation_id: u32,
    pub alliance_id: u32,
    pub max_velocity: f64,
    pub velocity: DVec3,
    pub agility: f64,
    pub speed_fraction: f64,
    pub formation_id: u8,
    pub warp: Option<DecodedWarp>,
    pub name: String,
}

fn take<const N: usize>(inp: &mut &[u8]) -> Result<[u8; N], DecodeError> {
    if inp.len() < N {
        return Err(DecodeError::ShortRead {
            needed: N,
            remaining: inp.len(),
        });
    }
    let (a, b) = inp.split_at(N);
    *inp = b;
    let mut buf = [0u8; N];
    buf.copy_from_slice(a);
    Ok(buf)
}

fn u8_(inp: &mut &[u8]) -> Result<u8, DecodeError> {
    Ok(take::<1>(inp)?[0])
}

fn u32_(inp: &mut &[u8]) -> Result<u32, DecodeError> {
    Ok(u32::from_le_bytes(take::<4>(inp)?))
}

fn u64_(inp: &mut &[u8]) -> Result<u64, DecodeError> {
    Ok(u64::from_le_bytes(take::<8>(inp)?))
}

fn f64_(inp: &mut &[u8]) -> Result<f64, DecodeError> {
    Ok(f64::from_le_bytes(take::<8>(inp)?))
}

fn vec3(inp: &mut &[u8]) -> Result<DVec3, DecodeError> {
    Ok(DVec3::new(f64_(inp)?, f64_(inp)?, f64_(inp)?))
}

/// Decode one ball body from the front of `inp`, advancing it.
pub fn decode_ball(inp: &mut &[u8]) -> Result<DecodedBall, DecodeError> {
    let fixed = HEADER_LEN + MASS_SECTOR_LEN + SHIP_SECTOR_LEN;
    if inp.len() < fixed {
        return Err(DecodeError::ShortRead {
            needed: fixed,
            remaining: inp.len(),
        });
    }

    let id = u32_(inp)?;
    let tag = u8_(inp)?;
    let mode = BallMode::from_tag(tag).ok_or(DecodeError::UnknownMode(tag))?;
    let radius = f64_(inp)?;
    let position = vec3(inp)?;
    let sub_type = u8_(inp)?;

    let mass = f64_(inp)?;
    let cloak = u8_(inp)?;
    let mass_unknown = u64_(inp)?;
    let corporation_id = u32_(inp)?;
    let alliance_id = u32_(inp)?;

    let max_velocity = f64_(inp)?;
    let velocity = vec3(inp)?;
    let agility = f64_(inp)?;
    let speed_fraction = f64_(inp)?;

    let (formation_id, warp) = match mode {
        BallMode::Stop => (u8_(inp)?, None),
        BallMode::Warp => {
            let formation_id = u8_(inp)?;
            let warp = DecodedWarp {
                target: vec3(inp)?,
                effect_stamp: u32_(inp)?,
                follow_range: f64_(inp)?,
                follow_id: u32_(inp)?,
                owner_id: u32_(inp)?,
            };
            (formation_id, Some(warp))
        }
        other => return Err(DecodeError::UnsupportedMode(other)),
    };

    let name_len = usize::from(u8_(inp)?);
    let mut name = String::with_capacity(name_len);
    for _ in 0..name_len {
        let unit = u16::from_le_bytes(take::<2>(inp)?);
        name.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    Ok(DecodedBall {
        id,
        mode,
        radius,
        position,
        sub_type,
        mass,
        cloak,
        mass_unknown,
        corporation_id,
        alliance_id,
        max_velocity,
        velocity,
        agility,
        speed_fraction,
        formation_id,
        warp,
        name,
    })
}

/// Decode a complete add-ball update: envelope followed by exactly one ball.
pub fn decode_update(bytes: &[u8]) -> Result<(Envelope, DecodedBall), DecodeError> {
    if bytes.len() < ENVELOPE_LEN {
        return Err(DecodeError::ShortRead {
            needed: ENVELOPE_LEN,
            remaining: bytes.len(),
        });
    }
    let mut inp = bytes;
    let more = u8_(&mut inp)? != 0;
    let sequence = u32_(&mut inp)?;
    let ball = decode_ball(&mut inp)?;
    if !inp.is_empty() {
        return Err(DecodeError::TrailingBytes(inp.len()));
    }
    Ok((Envelope { more, sequence }, ball))
}

/// Render bytes as hex, 16 per line, each line prefixed with its offset.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, row)| {
            let hex: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
            format!("{:04x}: {}", i * 16, hex.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::{BallState, encode_ball};
    use crate::envelope::write_envelope;
    use crate::mode::{MovementMode, sub_type};

    fn state(mode: MovementMode) -> BallState<'static> {
        BallState {
            id: 9,
            radius: 12.5,
            position: DVec3::new(-1.0, 2.0, -3.0),
            sub_type: sub_type::PLAYER,
            mass: 2.5e6,
            cloaked: true,
            corporation_id: 77,
            alliance_id: 88,
            max_velocity: 210.0,
            velocity: DVec3::ZERO,
            agility: 0.7,
            speed_fraction: 1.0,
            mode,
            name: "Kestrel",
        }
    }

    fn framed(mode: MovementMode, sequence: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_envelope(&mut buf, Envelope::add_ball(sequence));
        encode_ball(&state(mode), &mut buf);
        buf
    }

    #[test]
    fn stopped_update_decodes() {
        let (env, ball) = decode_update(&framed(MovementMode::Stopped, 31)).unwrap();
        assert_eq!(env, Envelope::add_ball(31));
        assert_eq!(ball.id, 9);
        assert_eq!(ball.mode, BallMode::Stop);
        assert_eq!(ball.position, DVec3::new(-1.0, 2.0, -3.0));
        assert_eq!(ball.cloak, 1);
        assert_eq!(ball.mass_unknown, u64::MAX);
        assert_eq!((ball.corporation_id, ball.alliance_id), (77, 88));
        assert_eq!(ball.formation_id, 0xFF);
        assert!(ball.warp.is_none());
        assert_eq!(ball.name, "Kestrel");
    }

    #[test]
    fn warp_update_decodes_sentinels() {
        let target = DVec3::new(1.0e10, 0.0, 0.0);
        let (_, ball) = decode_update(&framed(MovementMode::Warping { target }, 1)).unwrap();
        assert_eq!(ball.mode, BallMode::Warp);
        let warp = ball.warp.unwrap();
        assert_eq!(warp.target, target);
        assert_eq!(warp.effect_stamp, u32::MAX);
        assert_eq!(warp.follow_range, 1000.0);
        assert_eq!(warp.follow_id, 0);
        assert_eq!(warp.owner_id, 0x1E);
    }

    #[test]
    fn goto_update_decodes_as_stop() {
        let target = DVec3::new(0.0, 0.0, 900.0);
        let (_, ball) = decode_update(&framed(MovementMode::Goto { target }, 2)).unwrap();
        assert_eq!(ball.mode, BallMode::Stop);
        assert_eq!(ball.formation_id, 0xFF);
        assert!(ball.warp.is_none());
    }

    #[test]
    fn truncated_update_is_short_read() {
        let buf = framed(MovementMode::Stopped, 1);
        let err = decode_update(&buf[..buf.len() - 1]).unwrap_err();
        assert!(matches!(err, DecodeError::ShortRead { .. }));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut buf = framed(MovementMode::Stopped, 1);
        buf.push(0);
        assert_eq!(decode_update(&buf), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn unknown_mode_tag_is_rejected() {
        let mut buf = framed(MovementMode::Stopped, 1);
        buf[ENVELOPE_LEN + 4] = 200;
        assert_eq!(decode_update(&buf), Err(DecodeError::UnknownMode(200)));
    }

    #[test]
    fn hex_dump_wraps_at_sixteen_bytes() {
        let dump = hex_dump(&[0xAB; 20]);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000: ab ab"));
        assert_eq!(lines[1], "0010: ab ab ab ab");
    }
}
