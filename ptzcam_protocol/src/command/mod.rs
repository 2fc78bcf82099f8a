//! # VISCA commands
//!
//! Every command sent to the camera has the same framing:
//!
//! * `0x81`: address (camera 1, from controller 0)
//! * `0x01`: command message type
//! * 2 bytes: command category and command identifier
//! * 0 or more bytes: parameters
//! * `0xff`: terminator
//!
//! The command identifier is parsed as `magic` in [Payload], and commands are
//! grouped into modules by the axis they control.
//!
//! Command                | Identifier | Length
//! ---------------------- | ---------- | ------
//! [PanTiltDrive]         | `06 01`    | 9
//! `Home`                 | `06 04`    | 5
//! `SetHome`              | `06 05`    | 5
//! [Zoom]                 | `04 07`    | 6
//! [FocusDrive]           | `04 08`    | 6
//! [SetFocusMode]         | `04 38`    | 6
//! [PresetCommand]        | `04 3f`    | 7
//! [ZoomReset]            | `04 47`    | 9
//!
//! ## Unimplemented commands
//!
//! Inquiries (`81 09 ...`) and their replies are not implemented; the camera is
//! driven open-loop.

mod focus;
mod home;
mod pan_tilt;
mod preset;
mod zoom;

use crate::{decode::DecodedCommand, util::HexBytes, Error, Result};
use binrw::{binrw, BinRead, BinWrite};
use std::{
    fmt::{Debug, Display},
    io::Cursor,
    ops::Deref,
};

pub use self::{
    focus::{FocusDrive, FocusMode, SetFocusMode},
    home::{HOME, SET_HOME},
    pan_tilt::{PanDirection, PanTiltDrive, TiltDirection},
    preset::{PresetAction, PresetCommand, PresetSlot},
    zoom::{Zoom, ZoomReset},
};

/// A single framed VISCA command.
///
/// ## Packet format
///
/// * `0x81 0x01`: header
/// * [payload][Payload], including its 2 byte identifier
/// * `0xff`: terminator
#[binrw]
#[brw(big, magic = b"\x81\x01")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub payload: Payload,

    #[br(temp, assert(terminator == Packet::TERMINATOR))]
    #[bw(calc = Packet::TERMINATOR)]
    terminator: u8,
}

impl Packet {
    /// Address byte of a command sent from a controller to the first camera.
    pub const ADDRESS: u8 = 0x81;

    /// Terminator byte which ends every command.
    pub const TERMINATOR: u8 = 0xff;

    /// Longest packet we know how to build.
    pub const MAX_LENGTH: usize = 16;

    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Strictly parses a complete packet.
    ///
    /// Unlike [decode][crate::decode], this fails on anything which isn't
    /// exactly one well-formed command that this crate could have built.
    pub fn parse(b: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(b);
        let pkt = Self::read(&mut cursor)?;
        if cursor.position() != b.len() as u64 {
            warn!(
                "{} trailing byte(s) after packet: {}",
                b.len() as u64 - cursor.position(),
                HexBytes(b)
            );
            return Err(Error::InvalidLength);
        }
        Ok(pkt)
    }
}

/// Command payload, identified by its category and command bytes.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    #[brw(magic = b"\x06\x01")]
    PanTiltDrive(PanTiltDrive),
    #[brw(magic = b"\x06\x04")]
    Home,
    #[brw(magic = b"\x06\x05")]
    SetHome,
    #[brw(magic = b"\x04\x07")]
    Zoom(Zoom),
    #[brw(magic = b"\x04\x08")]
    FocusDrive(FocusDrive),
    #[brw(magic = b"\x04\x38")]
    SetFocusMode(SetFocusMode),
    #[brw(magic = b"\x04\x3f")]
    Preset(PresetCommand),
    #[brw(magic = b"\x04\x47")]
    ZoomReset(ZoomReset),
}

macro_rules! command_payloads {
    (
        $($variant:ident($type:ty),)*
    ) => {
        $(
            impl From<$type> for Payload {
                fn from(p: $type) -> Payload {
                    Payload::$variant(p)
                }
            }
        )*
    }
}

command_payloads!(
    PanTiltDrive(PanTiltDrive),
    Zoom(Zoom),
    FocusDrive(FocusDrive),
    SetFocusMode(SetFocusMode),
    Preset(PresetCommand),
    ZoomReset(ZoomReset),
);

/// An encoded, immutable VISCA command, ready to be put on the wire.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Command(Box<[u8]>);

impl Command {
    /// Encodes a [Payload] as a complete framed command.
    pub fn new(payload: impl Into<Payload>) -> Result<Self> {
        let pkt = Packet::new(payload);
        let mut out = Cursor::new(Vec::with_capacity(Packet::MAX_LENGTH));
        pkt.write(&mut out)?;
        Ok(Self(out.into_inner().into_boxed_slice()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Classifies this command the same way an inbound packet would be.
    pub fn decode(&self) -> DecodedCommand {
        crate::decode(&self.0)
    }
}

impl Deref for Command {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Command").field(&hex::encode(&self.0)).finish()
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&HexBytes(&self.0), f)
    }
}
