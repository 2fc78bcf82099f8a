use clap::{Parser, Subcommand};
use ptzcam::{
    protocol::{FocusDirection, ZoomDirection},
    CameraConfig, MotionIntent, PtzController, Result, SAMPLE_PERIOD, VISCA_PORT,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

/// Drives a VISCA-over-UDP PTZ camera.
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
struct CliParser {
    /// IP address or host name of the camera.
    #[clap(short, long, default_value = CameraConfig::DEFAULT_HOST)]
    pub ip: String,

    /// VISCA port of the camera.
    #[clap(short, long, default_value_t = VISCA_PORT)]
    pub port: u16,

    /// Pan/tilt speed, 1 to 24.
    #[clap(long, default_value_t = CameraConfig::DEFAULT_PAN_TILT_SPEED)]
    pub pan_tilt_speed: u8,

    /// Zoom and focus speed, 0 to 7.
    #[clap(long, default_value_t = 7)]
    pub speed: u8,

    #[clap(subcommand)]
    pub command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Move to the home position.
    Home,
    /// Make the current position the home position.
    SetHome,
    /// Recall a preset, numbered from 1.
    Recall { number: u8 },
    /// Store the current position in a preset, numbered from 1.
    Store { number: u8 },
    /// Pan and tilt for a while, as if a joystick were held.
    Move {
        /// Horizontal deflection, -100 (left) to 100 (right).
        #[clap(allow_hyphen_values = true)]
        x: f32,
        /// Vertical deflection, -100 (up) to 100 (down).
        #[clap(allow_hyphen_values = true)]
        y: f32,
        /// How long to move for, in milliseconds.
        #[clap(long, default_value_t = 1000)]
        ms: u64,
    },
    /// Zoom for a while.
    Zoom {
        direction: ZoomDirection,
        #[clap(long, default_value_t = 1000)]
        ms: u64,
    },
    /// Zoom all the way out.
    ResetZoom,
    /// Switch to manual focus, and focus for a while.
    Focus {
        direction: FocusDirection,
        #[clap(long, default_value_t = 500)]
        ms: u64,
    },
    /// Switch to auto focus.
    AutoFocus,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .compact()
        .init();
    let opts = CliParser::parse();
    let camera = PtzController::new(CameraConfig {
        host: opts.ip,
        port: opts.port,
        pan_tilt_speed: opts.pan_tilt_speed,
        zoom_speed: opts.speed,
        focus_speed: opts.speed,
    });

    let mut status = camera.status_events();
    tokio::task::spawn(async move {
        while status.changed().await.is_ok() {
            info!("{}", *status.borrow_and_update());
        }
    });

    match opts.command {
        Action::Home => camera.go_home().await?,
        Action::SetHome => camera.set_home().await?,
        Action::Recall { number } => camera.recall_preset(number.saturating_sub(1)).await?,
        Action::Store { number } => camera.set_preset(number.saturating_sub(1)).await?,
        Action::Move { x, y, ms } => {
            camera.update_motion(MotionIntent::analog(x, y));
            sleep(Duration::from_millis(ms)).await;
            camera.stop_pan_tilt();
            sleep(SAMPLE_PERIOD * 2).await;
        }
        Action::Zoom { direction, ms } => {
            camera.start_zoom(direction).await?;
            sleep(Duration::from_millis(ms)).await;
            camera.stop_zoom().await?;
        }
        Action::ResetZoom => {
            camera.reset_zoom().await?;
            sleep(PtzController::ZOOM_RESET_TIME + SAMPLE_PERIOD).await;
        }
        Action::Focus { direction, ms } => {
            camera.set_manual_focus().await?;
            camera.start_focus(direction).await?;
            sleep(Duration::from_millis(ms)).await;
            camera.stop_focus().await?;
        }
        Action::AutoFocus => camera.set_auto_focus().await?,
    }

    camera.shutdown().await;
    // Give the last sends a moment to leave.
    sleep(Duration::from_millis(100)).await;
    Ok(())
}
