use orrery_common::{EntityId, Point};
use serde::{Deserialize, Serialize};

/// Movement-mode tag as carried in the ball header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BallMode {
    Goto = 0,
    Follow = 1,
    Stop = 2,
    Warp = 3,
    Orbit = 4,
    Missile = 5,
    Mushroom = 6,
    Bounce = 7,
    Troll = 8,
    MiniOrbit = 9,
    Field = 10,
    Rigid = 11,
    Formation = 12,
}

impl BallMode {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        use BallMode::*;
        Some(match tag {
            0 => Goto,
            1 => Follow,
            2 => Stop,
            3 => Warp,
            4 => Orbit,
            5 => Missile,
            6 => Mushroom,
            7 => Bounce,
            8 => Troll,
            9 => MiniOrbit,
            10 => Field,
            11 => Rigid,
            12 => Formation,
            _ => return None,
        })
    }
}

/// Movement state reported by a physics controller.
///
/// Transitions are owned by the controller; the encoder only reads the
/// current value to pick a body layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    Stopped,
    Goto {
        target: Point,
    },
    Follow {
        target: EntityId,
        range: f64,
    },
    Warping {
        target: Point,
    },
    Orbit {
        target: EntityId,
        range: f64,
    },
}

impl MovementMode {
    /// Header tag for this mode.
    pub fn ball_mode(&self) -> BallMode {
        match self {
            MovementMode::Stopped => BallMode::Stop,
            MovementMode::Goto { .. } => BallMode::Goto,
            MovementMode::Follow { .. } => BallMode::Follow,
            MovementMode::Warping { .. } => BallMode::Warp,
            MovementMode::Orbit { .. } => BallMode::Orbit,
        }
    }
}

/// Header sub-type flag bits.
pub mod sub_type {
    pub const FREE: u8 = 0x01;
    pub const GLOBAL: u8 = 0x02;
    pub const MASSIVE: u8 = 0x04;
    pub const INTERACTIVE: u8 = 0x08;
    pub const MORIBUND: u8 = 0x10;

    /// Player-controlled ship.
    pub const PLAYER: u8 = FREE | MASSIVE | INTERACTIVE;
}
