use crate::{
    config::{clamp_drive_speed, clamp_pan_tilt_speed, SharedConfig},
    driver::{AxisGroup, ContinuousDriver},
    protocol::{
        Command, DriveValue, FocusDirection, FocusDrive, FocusMode, Payload, PresetCommand,
        PresetSlot, SetFocusMode, Zoom, ZoomDirection, ZoomReset, HOME, SET_HOME,
    },
    sampler::{MotionIntent, MotionSampler},
    udp::send_command,
    CameraConfig, Error, Result,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch, Mutex},
    task::JoinHandle,
};

#[allow(rustdoc::private_intra_doc_links)]
/// [PtzController] owns a session with a single camera.
///
/// ## General design
///
/// Every command goes through one `mpsc` channel to a dispatcher task, which
/// spawns a short-lived task per command to resolve the camera's address and
/// send it from a fresh socket. A slow or failing send only holds up itself.
///
/// Commands get to that channel from:
///
/// * [MotionSampler]: pan/tilt, from the latest [MotionIntent].
/// * Two [ContinuousDriver]s: zoom and focus, repeated while held.
/// * One-shot operations (presets, home, focus mode), sent directly.
///
/// Every operation reports what it did through [`status_events`][Self::status_events].
/// Nothing waits for a reply from the camera.
pub struct PtzController {
    config: SharedConfig,
    cmd_tx: mpsc::Sender<Command>,
    status_tx: Arc<watch::Sender<String>>,
    sampler: MotionSampler,
    zoom: Mutex<ContinuousDriver>,
    focus: Mutex<ContinuousDriver>,
    dispatch_task: Option<JoinHandle<()>>,
}

impl PtzController {
    /// How long [reset_zoom][Self::reset_zoom] zooms out for.
    pub const ZOOM_RESET_TIME: Duration = Duration::from_millis(2500);
    const COMMAND_QUEUE_SIZE: usize = 32;

    /// Starts a session with the camera in `config`.
    ///
    /// This must be called from within a tokio runtime. Nothing is sent until
    /// an operation is called.
    pub fn new(config: CameraConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(Self::COMMAND_QUEUE_SIZE);
        let mut controller = Self::with_command_sink(config, cmd_tx);

        debug!("Spawning dispatcher task...");
        controller.dispatch_task = Some(tokio::task::spawn(dispatch(
            cmd_rx,
            controller.config.clone(),
            controller.status_tx.clone(),
        )));
        controller
    }

    /// Starts a session which hands every command to `sink` instead of
    /// sending it.
    pub fn with_command_sink(config: CameraConfig, sink: mpsc::Sender<Command>) -> Self {
        let config = config.into_shared();
        let (status_tx, _) = watch::channel(String::new());
        Self {
            sampler: MotionSampler::spawn(config.clone(), sink.clone()),
            zoom: Mutex::new(ContinuousDriver::new(AxisGroup::Zoom, sink.clone())),
            focus: Mutex::new(ContinuousDriver::new(AxisGroup::Focus, sink.clone())),
            cmd_tx: sink,
            status_tx: Arc::new(status_tx),
            config,
            dispatch_task: None,
        }
    }

    fn report(&self, status: impl Into<String>) {
        self.status_tx.send_replace(status.into());
    }

    /// Queues a one-shot command.
    async fn send(&self, payload: impl Into<Payload>) -> Result {
        let cmd = Command::new(payload)?;
        debug!("queueing {cmd}");
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| Error::ChannelUnavailable)
    }

    /// Sets where the camera should move. Takes effect on the next sampling
    /// tick, unless replaced before then.
    pub fn update_motion(&self, intent: MotionIntent) {
        self.sampler.update(intent);
    }

    /// Stops panning and tilting on the next sampling tick.
    pub fn stop_pan_tilt(&self) {
        self.sampler.stop();
    }

    /// Zooms in or out at the configured zoom speed until
    /// [stop_zoom][Self::stop_zoom].
    pub async fn start_zoom(&self, direction: ZoomDirection) -> Result {
        let speed = self.config.read().await.zoom_speed;
        let cmd = Command::new(Zoom {
            value: DriveValue::drive(direction, speed),
        })?;
        self.report(match direction {
            ZoomDirection::Tele => "Zooming in",
            ZoomDirection::Wide => "Zooming out",
        });
        self.zoom.lock().await.start(cmd).await;
        Ok(())
    }

    pub async fn stop_zoom(&self) -> Result {
        self.report("Stopping zoom");
        self.zoom
            .lock()
            .await
            .stop(Command::new(Zoom::stop())?)
            .await
    }

    /// Sends the zoom reset command, then zooms fully out for
    /// [`ZOOM_RESET_TIME`][Self::ZOOM_RESET_TIME].
    ///
    /// Cameras which don't support zoom reset still end up zoomed out.
    pub async fn reset_zoom(&self) -> Result {
        let wide = Command::new(Zoom {
            value: DriveValue::drive(ZoomDirection::Wide, DriveValue::MAX_SPEED),
        })?;
        let stop = Command::new(Zoom::stop())?;

        self.report("Resetting zoom");
        let mut zoom = self.zoom.lock().await;
        zoom.cancel().await;
        self.send(ZoomReset).await?;
        zoom.pulse(wide, Self::ZOOM_RESET_TIME, stop).await;
        Ok(())
    }

    async fn set_focus_mode(&self, mode: FocusMode) -> Result {
        self.report(match mode {
            FocusMode::Auto => "Auto focus",
            FocusMode::Manual => "Manual focus",
        });
        self.send(SetFocusMode { mode }).await
    }

    pub async fn set_auto_focus(&self) -> Result {
        self.set_focus_mode(FocusMode::Auto).await
    }

    pub async fn set_manual_focus(&self) -> Result {
        self.set_focus_mode(FocusMode::Manual).await
    }

    /// Focuses far or near at the configured focus speed until
    /// [stop_focus][Self::stop_focus].
    ///
    /// Only has an effect in manual focus mode.
    pub async fn start_focus(&self, direction: FocusDirection) -> Result {
        let speed = self.config.read().await.focus_speed;
        let cmd = Command::new(FocusDrive {
            value: DriveValue::drive(direction, speed),
        })?;
        self.report(match direction {
            FocusDirection::Far => "Focusing far",
            FocusDirection::Near => "Focusing near",
        });
        self.focus.lock().await.start(cmd).await;
        Ok(())
    }

    /// Stops focusing. A stop command is always sent, even when idle.
    pub async fn stop_focus(&self) -> Result {
        self.report("Stopping focus");
        self.focus
            .lock()
            .await
            .stop(Command::new(FocusDrive::stop())?)
            .await
    }

    fn preset_slot(&self, index: u8) -> Result<PresetSlot> {
        PresetSlot::new(index).map_err(|_| {
            warn!("preset index {index} out of range");
            self.report(format!(
                "Preset number must be between 1 and {}",
                PresetSlot::COUNT
            ));
            Error::ParameterOutOfRange
        })
    }

    /// Stores the current position in a preset.
    ///
    /// ## Errors
    ///
    /// * [`Error::ParameterOutOfRange`] if `index` (zero based) is greater than
    ///   [`PresetSlot::MAX_INDEX`]. Nothing is sent.
    pub async fn set_preset(&self, index: u8) -> Result {
        let slot = self.preset_slot(index)?;
        self.report(format!("Setting preset {}", slot.number()));
        self.send(PresetCommand::set(slot)).await
    }

    /// Moves to a stored preset.
    ///
    /// ## Errors
    ///
    /// * [`Error::ParameterOutOfRange`] if `index` (zero based) is greater than
    ///   [`PresetSlot::MAX_INDEX`]. Nothing is sent.
    pub async fn recall_preset(&self, index: u8) -> Result {
        let slot = self.preset_slot(index)?;
        self.report(format!("Recalling preset {}", slot.number()));
        self.send(PresetCommand::recall(slot)).await
    }

    /// Forgets a stored preset.
    pub async fn clear_preset(&self, index: u8) -> Result {
        let slot = self.preset_slot(index)?;
        self.report(format!("Clearing preset {}", slot.number()));
        self.send(PresetCommand::clear(slot)).await
    }

    pub async fn go_home(&self) -> Result {
        self.report("Moving to home position");
        self.send(HOME).await
    }

    /// Makes the current position the home position. Not all cameras support
    /// this.
    pub async fn set_home(&self) -> Result {
        self.report("Setting home position");
        self.send(SET_HOME).await
    }

    async fn update_config(&self, f: impl FnOnce(&mut CameraConfig)) {
        let mut w = self.config.write().await;
        f(&mut w);
        w.commit().await;
    }

    /// Changes the camera address. Commands already queued are sent to the
    /// new address.
    pub async fn set_host(&self, host: impl Into<String>) {
        let host = host.into();
        info!("camera host is now {host}");
        self.update_config(|c| c.host = host).await;
    }

    pub async fn set_port(&self, port: u16) {
        self.update_config(|c| c.port = port).await;
    }

    /// Sets the pan/tilt speed dial, clamped to `1..=24`. Used from the next
    /// sampling tick.
    pub async fn set_pan_tilt_speed(&self, speed: u8) {
        self.update_config(|c| c.pan_tilt_speed = clamp_pan_tilt_speed(speed))
            .await;
    }

    /// Sets the zoom speed, clamped to `0..=7`. A running zoom keeps its
    /// speed.
    pub async fn set_zoom_speed(&self, speed: u8) {
        self.update_config(|c| c.zoom_speed = clamp_drive_speed(speed))
            .await;
    }

    /// Sets the focus speed, clamped to `0..=7`. A running focus keeps its
    /// speed.
    pub async fn set_focus_speed(&self, speed: u8) {
        self.update_config(|c| c.focus_speed = clamp_drive_speed(speed))
            .await;
    }

    /// Snapshot of the current configuration.
    pub async fn config(&self) -> CameraConfig {
        (*self.config.read().await).clone()
    }

    /// The most recent status message.
    pub fn status(&self) -> String {
        self.status_tx.borrow().clone()
    }

    /// Subscribes to status messages.
    pub fn status_events(&self) -> watch::Receiver<String> {
        self.status_tx.subscribe()
    }

    /// Stops all jobs and tasks.
    ///
    /// Zoom and focus jobs are cancelled without sending stop commands, and
    /// any pan/tilt intent is abandoned. Commands already queued are still
    /// sent.
    pub async fn shutdown(mut self) {
        info!("shutting down camera session");
        self.zoom.get_mut().cancel().await;
        self.focus.get_mut().cancel().await;

        let dispatch_task = self.dispatch_task.take();
        drop(self);

        // The dispatcher exits once every command sender is gone.
        if let Some(dispatch_task) = dispatch_task {
            if let Err(join_error) = dispatch_task.await {
                if join_error.is_panic() {
                    error!("dispatch_task panicked: {join_error}");
                }
            }
        }
    }
}

/// Sends every queued command, each from its own task.
async fn dispatch(
    mut cmd_rx: mpsc::Receiver<Command>,
    config: SharedConfig,
    status_tx: Arc<watch::Sender<String>>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let (host, port) = {
            let c = config.read().await;
            (c.host.clone(), c.port)
        };
        let status_tx = status_tx.clone();

        tokio::task::spawn(async move {
            debug!("sending {cmd} to {host}:{port}");
            match send_command(&host, port, &cmd).await {
                Ok(()) => status_tx.send_replace(format!("Command sent to {host}")),
                Err(e) => {
                    error!("error sending {cmd} to {host}:{port}: {e}");
                    status_tx.send_replace(format!("Error sending command: {e}"))
                }
            };
        });
    }
    debug!("dispatcher stopped");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        protocol::{DecodedCommand, DriveReport},
        udp::ViscaReceiver,
    };
    use std::net::Ipv4Addr;
    use tokio::time::{sleep, timeout};

    fn controller() -> (PtzController, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(64);
        (PtzController::with_command_sink(CameraConfig::default(), tx), rx)
    }

    async fn next(rx: &mut mpsc::Receiver<Command>) -> Result<Vec<u8>> {
        let cmd = rx.recv().await.ok_or(Error::ChannelUnavailable)?;
        Ok(cmd.as_bytes().to_vec())
    }

    #[tokio::test(start_paused = true)]
    async fn presets() -> Result {
        let (camera, mut rx) = controller();

        camera.recall_preset(14).await?;
        assert_eq!(hex::decode("8101043f020eff")?, next(&mut rx).await?);
        assert_eq!("Recalling preset 15", camera.status());

        camera.set_preset(0).await?;
        assert_eq!(hex::decode("8101043f0100ff")?, next(&mut rx).await?);
        assert_eq!("Setting preset 1", camera.status());

        camera.clear_preset(4).await?;
        assert_eq!(hex::decode("8101043f0504ff")?, next(&mut rx).await?);

        assert!(matches!(
            camera.recall_preset(15).await,
            Err(Error::ParameterOutOfRange)
        ));
        assert_eq!("Preset number must be between 1 and 15", camera.status());
        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn home_and_focus_mode() -> Result {
        let (camera, mut rx) = controller();
        let mut status = camera.status_events();

        camera.go_home().await?;
        assert_eq!(hex::decode("81010604ff")?, next(&mut rx).await?);
        assert!(status.has_changed().unwrap_or_default());
        assert_eq!("Moving to home position", *status.borrow_and_update());

        camera.set_home().await?;
        assert_eq!(hex::decode("81010605ff")?, next(&mut rx).await?);

        camera.set_auto_focus().await?;
        assert_eq!(hex::decode("8101043802ff")?, next(&mut rx).await?);
        camera.set_manual_focus().await?;
        assert_eq!(hex::decode("8101043803ff")?, next(&mut rx).await?);
        assert_eq!("Manual focus", camera.status());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn zoom_hold_and_release() -> Result {
        let (camera, mut rx) = controller();
        camera.set_zoom_speed(3).await;

        camera.start_zoom(ZoomDirection::Tele).await?;
        sleep(Duration::from_millis(350)).await;
        camera.stop_zoom().await?;

        let mut sent = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            sent.push(cmd.decode());
        }
        let (stop, repeats) = sent.split_last().ok_or(Error::Internal)?;
        assert_eq!(4, repeats.len());
        for cmd in repeats {
            assert_eq!(
                &DecodedCommand::Zoom(DriveReport::Drive {
                    direction: ZoomDirection::Tele,
                    speed: 3,
                }),
                cmd
            );
        }
        assert_eq!(&DecodedCommand::Zoom(DriveReport::Stop), stop);
        assert_eq!("Stopping zoom", camera.status());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn focus_stop_when_idle() -> Result {
        let (camera, mut rx) = controller();
        camera.stop_focus().await?;
        assert_eq!(hex::decode("8101040800ff")?, next(&mut rx).await?);

        camera.start_focus(FocusDirection::Near).await?;
        assert_eq!(hex::decode("8101040837ff")?, next(&mut rx).await?);
        camera.stop_focus().await?;
        assert_eq!(hex::decode("8101040800ff")?, next(&mut rx).await?);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn reset_zoom() -> Result {
        let (camera, mut rx) = controller();
        camera.reset_zoom().await?;
        assert_eq!(hex::decode("8101044700000000ff")?, next(&mut rx).await?);
        assert_eq!(hex::decode("8101040737ff")?, next(&mut rx).await?);

        sleep(Duration::from_millis(2000)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(hex::decode("8101040700ff")?, next(&mut rx).await?);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn motion() -> Result {
        let (camera, mut rx) = controller();

        camera.update_motion(MotionIntent::digital(-1., 0.));
        assert_eq!(hex::decode("8101060105050103ff")?, next(&mut rx).await?);

        camera.set_pan_tilt_speed(0).await;
        camera.stop_pan_tilt();
        assert_eq!(hex::decode("8101060101010303ff")?, next(&mut rx).await?);
        Ok(())
    }

    #[tokio::test]
    async fn config_setters() -> Result {
        let (camera, _rx) = controller();
        camera.set_host("10.1.2.3").await;
        camera.set_port(1259).await;
        camera.set_pan_tilt_speed(30).await;
        camera.set_zoom_speed(9).await;
        camera.set_focus_speed(2).await;

        assert_eq!(
            CameraConfig {
                host: "10.1.2.3".to_string(),
                port: 1259,
                pan_tilt_speed: 24,
                zoom_speed: 7,
                focus_speed: 2,
            },
            camera.config().await
        );
        Ok(())
    }

    #[tokio::test]
    async fn end_to_end() -> Result {
        let receiver = ViscaReceiver::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = receiver.local_addr()?.port();
        let (tx, mut rx) = mpsc::channel(4);
        let recv_task = tokio::task::spawn(receiver.run(tx));

        let camera = PtzController::new(CameraConfig {
            port,
            ..CameraConfig::new("127.0.0.1")
        });
        let mut status = camera.status_events();
        camera.go_home().await?;

        let received = timeout(Duration::from_secs(5), rx.recv())
            .await
            .map_err(|_| Error::Internal)?
            .ok_or(Error::ChannelUnavailable)?;
        assert_eq!(DecodedCommand::GoHome, received.decoded);

        timeout(
            Duration::from_secs(5),
            status.wait_for(|s| s == "Command sent to 127.0.0.1"),
        )
        .await
        .map_err(|_| Error::Internal)?
        .map_err(|_| Error::ChannelUnavailable)?;

        camera.shutdown().await;
        recv_task.abort();
        Ok(())
    }

    #[tokio::test]
    async fn send_failure_is_reported() -> Result {
        let camera = PtzController::new(CameraConfig::new("no-such-host.invalid"));
        let mut status = camera.status_events();
        camera.go_home().await?;

        let reported = timeout(
            Duration::from_secs(30),
            status.wait_for(|s| s.starts_with("Error sending command")),
        )
        .await
        .map_err(|_| Error::Internal)?
        .map_err(|_| Error::ChannelUnavailable)?
        .clone();
        assert!(reported.len() > "Error sending command: ".len());

        camera.shutdown().await;
        Ok(())
    }
}
