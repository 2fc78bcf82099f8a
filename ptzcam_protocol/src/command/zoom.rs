//! # Zoom
use crate::drive::DriveValue;
use binrw::binrw;

/// `04 07`: variable speed zoom (`CAM_Zoom`)
///
/// This has no "hold" semantics: the camera keeps zooming until told to stop,
/// but some models stop on their own if the command isn't repeated.
///
/// ## Packet format
///
/// * `u8`: [DriveValue]; `0x2p` tele, `0x3p` wide, `0x00` stop
#[binrw]
#[brw(big)]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Zoom {
    pub value: DriveValue,
}

impl Zoom {
    pub fn stop() -> Self {
        Self {
            value: DriveValue::stop(),
        }
    }
}

/// `04 47`: zoom to the widest position
///
/// This is a direct zoom to position `0000`. Not every camera accepts it, so
/// it is usually followed by a fast [Zoom] wide.
///
/// ## Packet format
///
/// * 4 bytes: zoom position nibbles, always `00 00 00 00`
#[binrw]
#[brw(big, magic = b"\x00\x00\x00\x00")]
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct ZoomReset;

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Command, Packet, Payload, Result, ZoomDirection};

    #[test]
    fn zoom() -> Result {
        let cmd = Command::new(Zoom {
            value: DriveValue::drive(ZoomDirection::Tele, 2),
        })?;
        assert_eq!(hex::decode("8101040722ff")?, cmd.as_bytes());

        let cmd = Command::new(Zoom {
            value: DriveValue::drive(ZoomDirection::Wide, 7),
        })?;
        assert_eq!(hex::decode("8101040737ff")?, cmd.as_bytes());
        let Payload::Zoom(zoom) = Packet::parse(&cmd)?.payload else {
            panic!("wrong command type");
        };
        assert_eq!(Some(ZoomDirection::Wide), zoom.value.direction());
        assert_eq!(7, zoom.value.speed());

        let cmd = Command::new(Zoom::stop())?;
        assert_eq!(hex::decode("8101040700ff")?, cmd.as_bytes());
        Ok(())
    }

    #[test]
    fn zoom_reset() -> Result {
        let cmd = Command::new(ZoomReset)?;
        assert_eq!(hex::decode("8101044700000000ff")?, cmd.as_bytes());
        assert_eq!(Payload::ZoomReset(ZoomReset), Packet::parse(&cmd)?.payload);

        // Any other position is not a reset.
        assert!(Packet::parse(&hex::decode("8101044700010203ff")?).is_err());
        Ok(())
    }
}
