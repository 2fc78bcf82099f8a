//! Joystick and button input to pan/tilt drive commands.
//!
//! Input arrives far faster than a camera wants to be driven, so only the
//! latest [MotionIntent] is kept, and it is turned into a command at most once
//! per [SAMPLE_PERIOD].
use crate::{
    config::SharedConfig,
    protocol::{AxisDirection, Command, PanTiltDrive},
};
use futures::{pin_mut, StreamExt};
use std::time::Duration;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_stream::wrappers::IntervalStream;

/// How often the latest intent is turned into a command.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(50);

/// Analog deflection on the minor axis below which it is ignored, so that a
/// mostly-horizontal push doesn't also tilt.
pub const SNAP_THRESHOLD: f32 = 24.;

/// Deflection which maps to the full speed dial.
pub const MAX_JOYSTICK_RADIUS: f32 = 100.;

/// Where the user wants the camera to move.
///
/// Offsets are in screen coordinates: positive `offset_x` is right, positive
/// `offset_y` is down.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MotionIntent {
    pub offset_x: f32,
    pub offset_y: f32,
    /// Joystick input, scaled by deflection. Digital (button) input always
    /// drives at the speed dial.
    pub is_analog: bool,
}

impl MotionIntent {
    pub const STOP: Self = Self {
        offset_x: 0.,
        offset_y: 0.,
        is_analog: false,
    };

    pub fn analog(offset_x: f32, offset_y: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            is_analog: true,
        }
    }

    pub fn digital(offset_x: f32, offset_y: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            is_analog: false,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.offset_x == 0. && self.offset_y == 0.
    }
}

/// Plans the pan/tilt drive for an intent, at speed dial `speed` (`1..=24`).
///
/// Both axes always get the same speed.
pub fn plan_pan_tilt(intent: MotionIntent, speed: u8) -> PanTiltDrive {
    let dial = speed.clamp(PanTiltDrive::MIN_SPEED, PanTiltDrive::MAX_SPEED);
    if intent.is_stop() {
        return PanTiltDrive::stop(dial);
    }

    let MotionIntent {
        mut offset_x,
        mut offset_y,
        is_analog,
    } = intent;

    let speed = if is_analog {
        if offset_x.abs() > offset_y.abs() && offset_y.abs() < SNAP_THRESHOLD {
            offset_y = 0.;
        } else if offset_x.abs() < SNAP_THRESHOLD {
            offset_x = 0.;
        }

        let normalised = (offset_x.hypot(offset_y) / MAX_JOYSTICK_RADIUS).min(1.);
        (normalised * f32::from(dial - 1) + 1.).round() as u8
    } else {
        dial
    };
    let speed = speed.clamp(PanTiltDrive::MIN_SPEED, PanTiltDrive::MAX_SPEED);

    PanTiltDrive {
        pan_speed: speed,
        tilt_speed: speed,
        pan: AxisDirection::from_offset(offset_x).into(),
        tilt: AxisDirection::from_offset(offset_y).into(),
    }
}

/// Samples the latest [MotionIntent] on a fixed period, and sends a pan/tilt
/// drive whenever it has changed.
///
/// The task is aborted when this is dropped.
pub struct MotionSampler {
    intent_tx: watch::Sender<MotionIntent>,
    task: JoinHandle<()>,
}

impl MotionSampler {
    /// Starts sampling, sending commands to `outbound`.
    pub(crate) fn spawn(config: SharedConfig, outbound: mpsc::Sender<Command>) -> Self {
        let (intent_tx, intent_rx) = watch::channel(MotionIntent::STOP);
        let task = tokio::task::spawn(sample(intent_rx, config, outbound));
        Self { intent_tx, task }
    }

    /// Replaces the pending intent. Only the latest intent before each tick
    /// is acted on.
    pub fn update(&self, intent: MotionIntent) {
        self.intent_tx.send_if_modified(|current| {
            if *current == intent {
                return false;
            }
            *current = intent;
            true
        });
    }

    pub fn stop(&self) {
        self.update(MotionIntent::STOP);
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for MotionSampler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn sample(
    mut intent_rx: watch::Receiver<MotionIntent>,
    config: SharedConfig,
    outbound: mpsc::Sender<Command>,
) {
    let mut ticker = interval(SAMPLE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ticks = IntervalStream::new(ticker);
    pin_mut!(ticks);

    debug!("motion sampler started");
    while ticks.next().await.is_some() {
        match intent_rx.has_changed() {
            Ok(true) => (),
            Ok(false) => continue,
            Err(_) => break,
        }

        let intent = *intent_rx.borrow_and_update();
        let speed = config.read().await.pan_tilt_speed;
        let drive = plan_pan_tilt(intent, speed);
        let cmd = match Command::new(drive) {
            Ok(cmd) => cmd,
            Err(e) => {
                error!("cannot encode {drive:?}: {e}");
                continue;
            }
        };

        debug!("{intent:?} => {cmd}");
        if outbound.send(cmd).await.is_err() {
            break;
        }
    }
    debug!("motion sampler stopped");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        protocol::{PanDirection, TiltDirection},
        CameraConfig, Error, Result,
    };
    use tokio::time::sleep;

    fn planned(intent: MotionIntent, speed: u8) -> (u8, PanDirection, TiltDirection) {
        let d = plan_pan_tilt(intent, speed);
        assert_eq!(d.pan_speed, d.tilt_speed);
        (d.pan_speed, d.pan, d.tilt)
    }

    #[test]
    fn stop() {
        assert_eq!(PanTiltDrive::stop(5), plan_pan_tilt(MotionIntent::STOP, 5));
        assert_eq!(
            PanTiltDrive::stop(24),
            plan_pan_tilt(MotionIntent::analog(0., 0.), 24)
        );
    }

    #[test]
    fn analog_snap() {
        // Mostly horizontal: tilt snaps to zero.
        assert_eq!(
            (2, PanDirection::Right, TiltDirection::Stop),
            planned(MotionIntent::analog(30., 5.), 5)
        );
        // Mostly vertical: pan snaps to zero.
        assert_eq!(
            (6, PanDirection::Stop, TiltDirection::Up),
            planned(MotionIntent::analog(-10., -60.), 10)
        );
        // Diagonal, both beyond the threshold.
        assert_eq!(
            (24, PanDirection::Left, TiltDirection::Down),
            planned(MotionIntent::analog(-100., 80.), 24)
        );
    }

    #[test]
    fn analog_speed() {
        // Deflection beyond the radius is full speed.
        assert_eq!(
            (10, PanDirection::Right, TiltDirection::Stop),
            planned(MotionIntent::analog(250., 0.), 10)
        );
        // A tiny deflection is the minimum speed.
        assert_eq!(
            (1, PanDirection::Stop, TiltDirection::Down),
            planned(MotionIntent::analog(0., 1.), 24)
        );
        // Dial of 1 is always speed 1.
        assert_eq!(
            (1, PanDirection::Left, TiltDirection::Stop),
            planned(MotionIntent::analog(-90., 0.), 1)
        );
    }

    #[test]
    fn digital() {
        assert_eq!(
            (5, PanDirection::Left, TiltDirection::Up),
            planned(MotionIntent::digital(-1., -1.), 5)
        );
        // Digital input never snaps.
        assert_eq!(
            (5, PanDirection::Right, TiltDirection::Down),
            planned(MotionIntent::digital(30., 5.), 5)
        );
        // Out of range dials are clamped.
        assert_eq!(
            (24, PanDirection::Stop, TiltDirection::Down),
            planned(MotionIntent::digital(0., 1.), 99)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn samples_latest_intent() -> Result {
        let (tx, mut rx) = mpsc::channel(16);
        let sampler = MotionSampler::spawn(CameraConfig::default().into_shared(), tx);

        // Many updates between ticks collapse to the last one.
        sampler.update(MotionIntent::analog(10., 0.));
        sampler.update(MotionIntent::analog(100., 0.));
        sampler.update(MotionIntent::analog(30., 5.));
        let cmd = rx.recv().await.ok_or(Error::ChannelUnavailable)?;
        assert_eq!(hex::decode("8101060102020203ff")?, cmd.as_bytes());

        // Nothing is sent while the intent is unchanged.
        sampler.update(MotionIntent::analog(30., 5.));
        sleep(SAMPLE_PERIOD * 4).await;
        assert!(rx.try_recv().is_err());

        // Release is picked up by the next tick.
        sampler.stop();
        let cmd = rx.recv().await.ok_or(Error::ChannelUnavailable)?;
        assert_eq!(hex::decode("8101060105050303ff")?, cmd.as_bytes());

        assert!(sampler.is_running());
        drop(sampler);
        assert!(rx.recv().await.is_none());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn reads_speed_at_tick() -> Result {
        let (tx, mut rx) = mpsc::channel(16);
        let config = CameraConfig::default().into_shared();
        let sampler = MotionSampler::spawn(config.clone(), tx);

        let mut w = config.write().await;
        w.pan_tilt_speed = 0x18;
        w.commit().await;

        sampler.update(MotionIntent::digital(0., 1.));
        let cmd = rx.recv().await.ok_or(Error::ChannelUnavailable)?;
        assert_eq!(hex::decode("8101060118180302ff")?, cmd.as_bytes());
        Ok(())
    }
}
