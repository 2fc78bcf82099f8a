//! # Diagnostic decoder
//!
//! [decode] classifies any byte sequence as a [DecodedCommand], for display
//! to someone watching what a controller sends. It never fails: malformed and
//! unknown input are classifications too, and keep their raw bytes.
//!
//! This is deliberately more lenient than [Packet::parse][crate::Packet::parse]:
//! lengths are lower bounds, the terminator isn't checked, and unknown
//! parameter values are reported rather than rejected.
//!
//! ## Pan/tilt directions
//!
//! Pan/tilt drive direction bytes are read as [DirectionFlags]. Some senders
//! set independent bits per direction (`0x04` left, `0x08` right on the pan
//! byte; `0x01` up, `0x02` down on the tilt byte), while standard VISCA uses
//! the single codes in [PanDirection] and [TiltDirection]. Direction bytes
//! holding one of those codes (`0x01..=0x03`) are read as codes; anything else
//! is bit-tested.
use crate::{
    command::{FocusMode, Packet, PanDirection, PresetAction, TiltDirection},
    drive::{DriveDirection, DriveValue, FocusDirection, ZoomDirection},
    util::HexBytes,
};
use bitflags::bitflags;
use num_traits::FromPrimitive;
use std::fmt::{Display, Formatter};

bitflags! {
    /// Active pan/tilt directions, as decoded from a pan/tilt drive.
    ///
    /// Bits are defined relative to the byte they're read from: pan bits come
    /// from the pan direction byte, and tilt bits from the tilt direction byte.
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct DirectionFlags: u8 {
        const TILT_UP   = 0x01;
        const TILT_DOWN = 0x02;
        const PAN_LEFT  = 0x04;
        const PAN_RIGHT = 0x08;

        const PAN = Self::PAN_LEFT.bits() | Self::PAN_RIGHT.bits();
        const TILT = Self::TILT_UP.bits() | Self::TILT_DOWN.bits();
    }
}

impl DirectionFlags {
    const LABELS: [(Self, &'static str); 4] = [
        (Self::PAN_LEFT, "pan left"),
        (Self::PAN_RIGHT, "pan right"),
        (Self::TILT_UP, "tilt up"),
        (Self::TILT_DOWN, "tilt down"),
    ];

    /// Reads the pan direction byte of a pan/tilt drive.
    pub fn from_pan_byte(b: u8) -> Self {
        match PanDirection::from_u8(b) {
            Some(PanDirection::Left) => Self::PAN_LEFT,
            Some(PanDirection::Right) => Self::PAN_RIGHT,
            Some(PanDirection::Stop) => Self::empty(),
            None => Self::from_bits_truncate(b) & Self::PAN,
        }
    }

    /// Reads the tilt direction byte of a pan/tilt drive.
    pub fn from_tilt_byte(b: u8) -> Self {
        match TiltDirection::from_u8(b) {
            Some(TiltDirection::Up) => Self::TILT_UP,
            Some(TiltDirection::Down) => Self::TILT_DOWN,
            Some(TiltDirection::Stop) => Self::empty(),
            None => Self::from_bits_truncate(b) & Self::TILT,
        }
    }

    /// Human readable labels for each active direction.
    pub fn labels(&self) -> Vec<&'static str> {
        Self::LABELS
            .iter()
            .filter(|(f, _)| self.contains(*f))
            .map(|(_, l)| *l)
            .collect()
    }
}

/// A decoded zoom or focus drive value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DriveReport<D> {
    Stop,
    Drive { direction: D, speed: u8 },
    /// The action nibble isn't one we know; holds the whole value byte.
    Unknown(u8),
}

impl<D: DriveDirection> From<DriveValue> for DriveReport<D> {
    fn from(value: DriveValue) -> Self {
        if value.is_stop() {
            return Self::Stop;
        }
        match value.direction() {
            Some(direction) => Self::Drive {
                direction,
                speed: value.speed(),
            },
            None => Self::Unknown(value.into()),
        }
    }
}

/// Classification of a (possibly malformed) command.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DecodedCommand {
    /// Empty, or doesn't start with the `0x81` address byte.
    Unknown(Vec<u8>),
    /// Starts with `0x81`, but is too short to hold a command identifier.
    TooShort(Vec<u8>),
    PanTiltDrive {
        pan_speed: u8,
        tilt_speed: u8,
        directions: DirectionFlags,
    },
    Zoom(DriveReport<ZoomDirection>),
    FocusDrive(DriveReport<FocusDirection>),
    FocusMode(FocusMode),
    UnknownFocusMode(u8),
    Preset {
        action: PresetAction,
        /// One based preset number.
        number: u16,
    },
    UnknownPresetAction {
        action: u8,
        /// One based preset number.
        number: u16,
    },
    GoHome,
    SetHome,
    /// Direct zoom (`04 47`), which only some cameras accept.
    ZoomReset,
    /// Well-framed, but not a command we recognise.
    UnknownVisca(Vec<u8>),
}

impl DecodedCommand {
    /// `true` for anything which isn't a recognised command.
    pub fn is_unrecognised(&self) -> bool {
        matches!(
            self,
            Self::Unknown(_)
                | Self::TooShort(_)
                | Self::UnknownVisca(_)
                | Self::UnknownFocusMode(_)
                | Self::UnknownPresetAction { .. }
                | Self::Zoom(DriveReport::Unknown(_))
                | Self::FocusDrive(DriveReport::Unknown(_))
        )
    }
}

/// Classifies a command.
pub fn decode(b: &[u8]) -> DecodedCommand {
    if b.first() != Some(&Packet::ADDRESS) {
        return DecodedCommand::Unknown(b.to_vec());
    }

    if b.len() < 3 {
        return DecodedCommand::TooShort(b.to_vec());
    }

    let (Some(&category), Some(&id)) = (b.get(2), b.get(3)) else {
        return DecodedCommand::UnknownVisca(b.to_vec());
    };

    match (category, id) {
        (0x06, 0x01) if b.len() >= 8 => {
            let directions =
                DirectionFlags::from_pan_byte(b[6]) | DirectionFlags::from_tilt_byte(b[7]);
            DecodedCommand::PanTiltDrive {
                pan_speed: b[4],
                tilt_speed: b[5],
                directions,
            }
        }

        (0x04, 0x07) if b.len() >= 5 => DecodedCommand::Zoom(DriveValue::from(b[4]).into()),

        (0x04, 0x38) if b.len() >= 5 => match FocusMode::from_u8(b[4]) {
            Some(mode) => DecodedCommand::FocusMode(mode),
            None => DecodedCommand::UnknownFocusMode(b[4]),
        },

        (0x04, 0x08) if b.len() >= 5 => DecodedCommand::FocusDrive(DriveValue::from(b[4]).into()),

        (0x04, 0x3f) if b.len() >= 6 => {
            let number = u16::from(b[5]) + 1;
            match PresetAction::from_u8(b[4]) {
                Some(action) => DecodedCommand::Preset { action, number },
                None => DecodedCommand::UnknownPresetAction {
                    action: b[4],
                    number,
                },
            }
        }

        (0x06, 0x04) if b.len() == 5 => DecodedCommand::GoHome,
        (0x06, 0x05) if b.len() == 5 => DecodedCommand::SetHome,
        (0x04, 0x47) if b.len() >= 5 => DecodedCommand::ZoomReset,

        _ => {
            trace!("unrecognised command: {}", HexBytes(b));
            DecodedCommand::UnknownVisca(b.to_vec())
        }
    }
}

impl Display for DecodedCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(b) => write!(f, "unknown: {}", HexBytes(b)),
            Self::TooShort(b) => write!(f, "too short: {}", HexBytes(b)),
            Self::PanTiltDrive {
                pan_speed,
                tilt_speed,
                directions,
            } => {
                if directions.is_empty() {
                    f.write_str("pan/tilt stop")
                } else {
                    write!(
                        f,
                        "pan/tilt {}: pan speed {pan_speed}, tilt speed {tilt_speed}",
                        directions.labels().join(" + ")
                    )
                }
            }
            Self::Zoom(DriveReport::Stop) => f.write_str("zoom stop"),
            Self::Zoom(DriveReport::Drive { direction, speed }) => match direction {
                ZoomDirection::Tele => write!(f, "zoom in, speed {speed}"),
                ZoomDirection::Wide => write!(f, "zoom out, speed {speed}"),
            },
            Self::Zoom(DriveReport::Unknown(v)) => write!(f, "zoom unknown: {v:#04x}"),
            Self::FocusDrive(DriveReport::Stop) => f.write_str("focus stop"),
            Self::FocusDrive(DriveReport::Drive { direction, speed }) => match direction {
                FocusDirection::Far => write!(f, "focus far, speed {speed}"),
                FocusDirection::Near => write!(f, "focus near, speed {speed}"),
            },
            Self::FocusDrive(DriveReport::Unknown(v)) => write!(f, "focus unknown: {v:#04x}"),
            Self::FocusMode(FocusMode::Auto) => f.write_str("focus mode auto"),
            Self::FocusMode(FocusMode::Manual) => f.write_str("focus mode manual"),
            Self::UnknownFocusMode(m) => write!(f, "focus mode unknown: {m:#04x}"),
            Self::Preset { action, number } => match action {
                PresetAction::Set => write!(f, "preset set slot {number}"),
                PresetAction::Recall => write!(f, "preset recall slot {number}"),
                PresetAction::Clear => write!(f, "preset clear slot {number}"),
            },
            Self::UnknownPresetAction { action, number } => {
                write!(f, "preset unknown action {action:#04x}, slot {number}")
            }
            Self::GoHome => f.write_str("go home"),
            Self::SetHome => f.write_str("set home"),
            Self::ZoomReset => f.write_str("zoom reset (04 47), not standard"),
            Self::UnknownVisca(b) => write!(f, "unknown VISCA: {}", HexBytes(b)),
        }
    }
}
