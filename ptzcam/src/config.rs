//! Camera session configuration.
use crate::protocol::{DriveValue, PanTiltDrive};
use concread::cowcell::asynch::CowCell;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration shared between [PtzController][crate::PtzController] and its
/// tasks.
///
/// Writers commit whole snapshots; tasks read the last committed snapshot
/// when they build a command.
pub(crate) type SharedConfig = Arc<CowCell<CameraConfig>>;

/// Where the camera is, and how fast to drive it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Camera host name or IP address.
    pub host: String,
    /// Camera's VISCA-over-UDP port.
    pub port: u16,
    /// Pan/tilt speed dial, `1..=24`.
    pub pan_tilt_speed: u8,
    /// Zoom speed, `0..=7`.
    pub zoom_speed: u8,
    /// Focus speed, `0..=7`.
    pub focus_speed: u8,
}

impl CameraConfig {
    pub const DEFAULT_HOST: &'static str = "192.168.1.98";
    pub const DEFAULT_PORT: u16 = 52381;
    pub const DEFAULT_PAN_TILT_SPEED: u8 = 5;

    /// Default configuration for a camera at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Brings every speed into the range the camera accepts.
    pub fn clamped(mut self) -> Self {
        self.pan_tilt_speed = clamp_pan_tilt_speed(self.pan_tilt_speed);
        self.zoom_speed = clamp_drive_speed(self.zoom_speed);
        self.focus_speed = clamp_drive_speed(self.focus_speed);
        self
    }

    pub(crate) fn into_shared(self) -> SharedConfig {
        Arc::new(CowCell::new(self.clamped()))
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            pan_tilt_speed: Self::DEFAULT_PAN_TILT_SPEED,
            zoom_speed: DriveValue::MAX_SPEED,
            focus_speed: DriveValue::MAX_SPEED,
        }
    }
}

pub(crate) fn clamp_pan_tilt_speed(speed: u8) -> u8 {
    speed.clamp(PanTiltDrive::MIN_SPEED, PanTiltDrive::MAX_SPEED)
}

pub(crate) fn clamp_drive_speed(speed: u8) -> u8 {
    speed.min(DriveValue::MAX_SPEED)
}
