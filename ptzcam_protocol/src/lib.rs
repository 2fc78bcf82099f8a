#![doc = include_str!("../README.md")]

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate tracing;

pub mod command;
mod decode;
mod drive;
mod error;
mod util;

pub use crate::{
    command::{
        Command, FocusDrive, FocusMode, Packet, PanDirection, PanTiltDrive, Payload, PresetAction,
        PresetCommand, PresetSlot, SetFocusMode, TiltDirection, Zoom, ZoomReset, HOME, SET_HOME,
    },
    decode::{decode, DecodedCommand, DirectionFlags, DriveReport},
    drive::{AxisDirection, DriveDirection, DriveValue, FocusDirection, ZoomDirection},
    error::Error,
    util::HexBytes,
};

/// Result type.
pub type Result<T = ()> = std::result::Result<T, Error>;
