//! # Pan and tilt
use crate::drive::AxisDirection;
use binrw::binrw;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `06 01`: pan/tilt drive (`Pan-tiltDrive`)
///
/// Starts (or stops) continuous movement on both axes at once. Each axis is
/// independent; a [`Stop`][PanDirection::Stop] with a non-zero speed is valid.
///
/// ## Packet format
///
/// * `u8`: pan speed, `0x01` to `0x18`
/// * `u8`: tilt speed, `0x01` to `0x18`
/// * `u8`: [PanDirection]
/// * `u8`: [TiltDirection]
///
/// Speeds aren't validated here: callers need to clamp them to
/// [`MIN_SPEED`][Self::MIN_SPEED]..=[`MAX_SPEED`][Self::MAX_SPEED].
#[binrw]
#[brw(big)]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct PanTiltDrive {
    pub pan_speed: u8,
    pub tilt_speed: u8,
    pub pan: PanDirection,
    pub tilt: TiltDirection,
}

impl PanTiltDrive {
    pub const MIN_SPEED: u8 = 0x01;
    pub const MAX_SPEED: u8 = 0x18;

    /// Stops both axes, using `speed` for both speed bytes.
    pub fn stop(speed: u8) -> Self {
        Self {
            pan_speed: speed,
            tilt_speed: speed,
            pan: PanDirection::Stop,
            tilt: TiltDirection::Stop,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.pan == PanDirection::Stop && self.tilt == TiltDirection::Stop
    }
}

/// Pan direction code.
#[binrw]
#[brw(big, repr = u8)]
#[derive(Default, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum PanDirection {
    Left = 0x01,
    Right = 0x02,
    #[default]
    Stop = 0x03,
}

/// Tilt direction code.
#[binrw]
#[brw(big, repr = u8)]
#[derive(Default, Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TiltDirection {
    Up = 0x01,
    Down = 0x02,
    #[default]
    Stop = 0x03,
}

/// Positive pan offsets are to the right.
impl From<AxisDirection> for PanDirection {
    fn from(value: AxisDirection) -> Self {
        match value {
            AxisDirection::Stop => Self::Stop,
            AxisDirection::Positive => Self::Right,
            AxisDirection::Negative => Self::Left,
        }
    }
}

/// Positive tilt offsets are downwards, following screen coordinates.
impl From<AxisDirection> for TiltDirection {
    fn from(value: AxisDirection) -> Self {
        match value {
            AxisDirection::Stop => Self::Stop,
            AxisDirection::Positive => Self::Down,
            AxisDirection::Negative => Self::Up,
        }
    }
}
