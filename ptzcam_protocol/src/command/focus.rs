//! # Focus
use crate::drive::DriveValue;
use binrw::binrw;
#[cfg(feature = "clap")]
use clap::ValueEnum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `04 08`: variable speed focus (`CAM_Focus`)
///
/// Only has an effect in [manual focus mode][FocusMode::Manual].
///
/// ## Packet format
///
/// * `u8`: [DriveValue]; `0x2p` far, `0x3p` near, `0x00` stop
#[binrw]
#[brw(big)]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct FocusDrive {
    pub value: DriveValue,
}

impl FocusDrive {
    pub fn stop() -> Self {
        Self {
            value: DriveValue::stop(),
        }
    }
}

/// `04 38`: set focus mode (`CAM_Focus` auto/manual)
///
/// ## Packet format
///
/// * `u8`: [FocusMode]
#[binrw]
#[brw(big)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SetFocusMode {
    pub mode: FocusMode,
}

/// Focus mode.
#[binrw]
#[brw(big, repr = u8)]
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FocusMode {
    Auto = 0x02,
    Manual = 0x03,
}
