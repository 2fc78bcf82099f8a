use clap::Parser;
use ptzcam::{Result, ViscaReceiver, VISCA_PORT};
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

/// Prints every VISCA command sent to this machine.
///
/// Point a PTZ controller (or the `drive` example) at this host to see what it
/// sends.
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
struct CliParser {
    /// UDP port to listen on.
    #[clap(short, long, default_value_t = VISCA_PORT)]
    pub port: u16,
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
    let receiver = ViscaReceiver::bind((Ipv4Addr::UNSPECIFIED, opts.port)).await?;

    let (tx, mut rx) = mpsc::channel(16);
    let recv_task = tokio::task::spawn(receiver.run(tx));
    while let Some(cmd) = rx.recv().await {
        if cmd.decoded.is_unrecognised() {
            warn!("{cmd}");
        } else {
            info!("{cmd}");
        }
    }

    recv_task.await.map_err(|_| ptzcam::Error::Internal)?
}
