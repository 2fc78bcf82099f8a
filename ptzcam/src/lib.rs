#![doc = include_str!("../README.md")]

#[macro_use]
extern crate tracing;

mod config;
mod controller;
mod driver;
mod error;
mod sampler;
mod udp;

pub use {
    crate::{
        config::CameraConfig,
        controller::PtzController,
        driver::{AxisGroup, ContinuousDriver},
        error::Error,
        sampler::{plan_pan_tilt, MotionIntent, SAMPLE_PERIOD},
        udp::{send_command, ReceivedCommand, ViscaReceiver, VISCA_PORT},
    },
    ptzcam_protocol as protocol,
};
pub type Result<T = ()> = std::result::Result<T, Error>;
