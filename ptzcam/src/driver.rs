//! Repeating commands while a button is held.
//!
//! Zoom and focus drive commands only move the camera for a short time, so
//! they are re-sent every [ContinuousDriver::REPEAT_INTERVAL] until released.
//! Each axis group has its own [ContinuousDriver], running at most one job at
//! a time.
use crate::protocol::Command;
use std::{fmt::Display, time::Duration};
use tokio::{
    select,
    sync::{
        mpsc,
        oneshot::{self, error::TryRecvError},
    },
    task::JoinHandle,
    time::sleep,
};

/// Commands which share a [ContinuousDriver].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisGroup {
    Zoom,
    Focus,
}

impl Display for AxisGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Zoom => "zoom",
            Self::Focus => "focus",
        })
    }
}

/// A running job, and the means to stop it.
struct ContinuousJob {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ContinuousJob {
    /// Signals the job to stop, and waits until it has.
    async fn cancel(self, group: AxisGroup) {
        // The job may have already finished, and dropped its receiver.
        let _ = self.cancel.send(());
        if let Err(join_error) = self.task.await {
            if join_error.is_panic() {
                error!("{group} job panicked: {join_error}");
            }
        }
        debug!("{group} job cancelled");
    }
}

/// Runs at most one repeating (or timed) command job for an [AxisGroup].
///
/// ## State
///
/// * Idle: no job.
/// * Active: a job task is sending commands to `outbound`.
///
/// Starting a job always cancels, and waits for, the previous one, so sends
/// from two jobs never interleave.
///
/// Dropping the driver cancels any job without sending a stop command.
pub struct ContinuousDriver {
    group: AxisGroup,
    outbound: mpsc::Sender<Command>,
    interval: Duration,
    job: Option<ContinuousJob>,
}

impl ContinuousDriver {
    pub const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(group: AxisGroup, outbound: mpsc::Sender<Command>) -> Self {
        Self {
            group,
            outbound,
            interval: Self::REPEAT_INTERVAL,
            job: None,
        }
    }

    pub fn group(&self) -> AxisGroup {
        self.group
    }

    /// `true` if a job is still sending.
    pub fn is_active(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.task.is_finished())
    }

    /// Sends `cmd` every [`REPEAT_INTERVAL`][Self::REPEAT_INTERVAL] until
    /// cancelled.
    pub async fn start(&mut self, cmd: Command) {
        self.cancel().await;
        debug!("{} job: repeating {cmd}", self.group);
        let (cancel, cancel_rx) = oneshot::channel();
        let task = tokio::task::spawn(repeat(
            cmd,
            self.outbound.clone(),
            self.interval,
            cancel_rx,
        ));
        self.job = Some(ContinuousJob { cancel, task });
    }

    /// Sends `cmd` once, then `stop_cmd` after `hold`.
    ///
    /// This is a job like any other: starting another job (or stopping)
    /// during `hold` supersedes it, and `stop_cmd` is not sent.
    pub async fn pulse(&mut self, cmd: Command, hold: Duration, stop_cmd: Command) {
        self.cancel().await;
        debug!("{} job: {cmd} for {hold:?}, then {stop_cmd}", self.group);
        let (cancel, cancel_rx) = oneshot::channel();
        let task = tokio::task::spawn(pulse(
            cmd,
            hold,
            stop_cmd,
            self.outbound.clone(),
            cancel_rx,
        ));
        self.job = Some(ContinuousJob { cancel, task });
    }

    /// Cancels any job, then sends `stop_cmd` once.
    pub async fn stop(&mut self, stop_cmd: Command) -> crate::Result {
        self.cancel().await;
        debug!("{} stop: {stop_cmd}", self.group);
        self.outbound
            .send(stop_cmd)
            .await
            .map_err(|_| crate::Error::ChannelUnavailable)
    }

    /// Cancels any job, without sending anything. Does nothing when idle.
    pub async fn cancel(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel(self.group).await;
        }
    }
}

/// `true` if the job has been cancelled, or its owner has gone away.
fn is_cancelled(cancel_rx: &mut oneshot::Receiver<()>) -> bool {
    !matches!(cancel_rx.try_recv(), Err(TryRecvError::Empty))
}

async fn repeat(
    cmd: Command,
    outbound: mpsc::Sender<Command>,
    interval: Duration,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    loop {
        if is_cancelled(&mut cancel_rx) {
            return;
        }
        select! {
            biased;
            _ = &mut cancel_rx => return,
            r = outbound.send(cmd.clone()) => if r.is_err() {
                return;
            },
        }

        if is_cancelled(&mut cancel_rx) {
            return;
        }
        select! {
            biased;
            _ = &mut cancel_rx => return,
            () = sleep(interval) => (),
        }
    }
}

async fn pulse(
    cmd: Command,
    hold: Duration,
    stop_cmd: Command,
    outbound: mpsc::Sender<Command>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    if is_cancelled(&mut cancel_rx) {
        return;
    }
    select! {
        biased;
        _ = &mut cancel_rx => return,
        r = outbound.send(cmd) => if r.is_err() {
            return;
        },
    }

    select! {
        biased;
        _ = &mut cancel_rx => return,
        () = sleep(hold) => (),
    }
    let _ = outbound.send(stop_cmd).await;
}
