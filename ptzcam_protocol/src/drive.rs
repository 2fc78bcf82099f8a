//! Direction and speed values for axes that are driven by repeated commands.
//!
//! Zoom (`04 07`) and focus (`04 08`) share a single byte format:
//!
//! * high nibble: action; `0` stops, `2` and `3` select a direction
//! * low nibble: speed, `0` (slowest) to `7` (fastest)
//!
//! Pan and tilt are signed axes which use [AxisDirection] before being mapped
//! onto their own wire codes.
use binrw::{BinRead, BinWrite};
#[cfg(feature = "clap")]
use clap::ValueEnum;
use modular_bitfield::{bitfield, specifiers::B4, Specifier};
use num_traits::{FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of travel along a single signed axis.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AxisDirection {
    #[default]
    Stop,
    Positive,
    Negative,
}

impl AxisDirection {
    /// Picks a direction from the sign of an offset. Zero (of either sign) is
    /// [AxisDirection::Stop].
    pub fn from_offset(offset: f32) -> Self {
        if offset > 0. {
            Self::Positive
        } else if offset < 0. {
            Self::Negative
        } else {
            Self::Stop
        }
    }
}

/// Zoom and focus value byte.
#[bitfield(bits = 8)]
#[repr(u8)]
#[derive(Specifier, BinRead, BinWrite, Debug, Default, PartialEq, Eq, Clone, Copy)]
#[br(map = From::<u8>::from)]
#[bw(map = |&x| Into::<u8>::into(x))]
pub struct DriveValue {
    speed_nibble: B4,
    action_nibble: B4,
}

impl DriveValue {
    /// Fastest speed accepted by zoom and focus drives.
    pub const MAX_SPEED: u8 = 7;

    /// A value which stops the axis (`0x00`).
    pub fn stop() -> Self {
        Self::new()
    }

    /// A value which drives the axis in `direction`.
    ///
    /// `speed` is clamped to [`MAX_SPEED`][Self::MAX_SPEED].
    pub fn drive<D: DriveDirection>(direction: D, speed: u8) -> Self {
        Self::new()
            .with_action_nibble(direction.action())
            .with_speed_nibble(speed.min(Self::MAX_SPEED))
    }

    /// Drive speed, low nibble.
    pub fn speed(&self) -> u8 {
        self.speed_nibble()
    }

    /// Drive action, high nibble; see [DriveDirection::action].
    pub fn action(&self) -> u8 {
        self.action_nibble()
    }

    pub fn is_stop(&self) -> bool {
        self.action() == 0
    }

    /// The direction this value drives in, if the action is known for `D`.
    pub fn direction<D: DriveDirection>(&self) -> Option<D> {
        D::from_action(self.action())
    }
}

/// Direction of a zoom or focus drive, mapped onto [DriveValue::action].
pub trait DriveDirection: Copy {
    fn action(self) -> u8;
    fn from_action(action: u8) -> Option<Self>;
}

/// Zoom direction.
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ZoomDirection {
    /// Zoom in.
    Tele = 0x2,
    /// Zoom out.
    Wide = 0x3,
}

/// Focus direction.
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FocusDirection {
    Far = 0x2,
    Near = 0x3,
}

macro_rules! drive_directions {
    (
        $($type:ty)*
    ) => {
        $(
            impl DriveDirection for $type {
                fn action(self) -> u8 {
                    self.to_u8().unwrap_or_default()
                }

                fn from_action(action: u8) -> Option<Self> {
                    Self::from_u8(action)
                }
            }
        )*
    };
}

drive_directions!(ZoomDirection FocusDirection);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn drive_value_bytes() {
        assert_eq!(0x00, u8::from(DriveValue::stop()));
        assert_eq!(0x25, u8::from(DriveValue::drive(ZoomDirection::Tele, 5)));
        assert_eq!(0x37, u8::from(DriveValue::drive(ZoomDirection::Wide, 7)));
        assert_eq!(0x20, u8::from(DriveValue::drive(FocusDirection::Far, 0)));
        assert_eq!(0x33, u8::from(DriveValue::drive(FocusDirection::Near, 3)));

        // Speeds above the maximum are clamped rather than spilling into the
        // action nibble.
        assert_eq!(0x27, u8::from(DriveValue::drive(ZoomDirection::Tele, 0x1f)));
    }

    #[test]
    fn drive_value_fields() {
        let v = DriveValue::from(0x34);
        assert_eq!(4, v.speed());
        assert_eq!(3, v.action());
        assert!(!v.is_stop());
        assert_eq!(Some(ZoomDirection::Wide), v.direction());
        assert_eq!(Some(FocusDirection::Near), v.direction());

        let v = DriveValue::from(0x45);
        assert_eq!(None, v.direction::<ZoomDirection>());

        assert!(DriveValue::from(0x07).is_stop());
    }

    #[test]
    fn axis_direction() {
        assert_eq!(AxisDirection::Positive, AxisDirection::from_offset(30.));
        assert_eq!(AxisDirection::Negative, AxisDirection::from_offset(-0.5));
        assert_eq!(AxisDirection::Stop, AxisDirection::from_offset(0.));
        assert_eq!(AxisDirection::Stop, AxisDirection::from_offset(-0.));
    }
}
