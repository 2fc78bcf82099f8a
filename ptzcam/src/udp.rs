//! VISCA over UDP.
//!
//! Sony's "VISCA over IP" wraps each command in an 8 byte header. Most PTZ
//! cameras also accept a bare VISCA command as the entire datagram, which is
//! all this module sends or expects. Nothing here waits for an ACK or a
//! completion reply.
//!
//! This typically operates over port 52381.
use crate::{
    protocol::{decode, Command, DecodedCommand, HexBytes},
    Error, Result,
};
use chrono::{DateTime, Local};
use std::{
    fmt::Display,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};
use tokio::{
    net::{lookup_host, ToSocketAddrs, UdpSocket},
    select,
    sync::mpsc,
};

/// Default VISCA-over-UDP port, for both cameras and our receiver.
pub const VISCA_PORT: u16 = 52381;

/// Sends one command to `host:port` from a fresh socket.
///
/// The socket is bound to an ephemeral port and dropped as soon as the
/// datagram has been handed to the OS.
pub async fn send_command(host: &str, port: u16, cmd: &Command) -> Result {
    let addr = lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| Error::Unresolved(host.to_string()))?;

    let bind_addr: SocketAddr = match addr {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let sock = UdpSocket::bind(bind_addr).await?;
    sock.send_to(cmd.as_bytes(), addr).await?;
    trace!("sent {cmd} to {addr}");
    Ok(())
}

/// A command received by [ViscaReceiver].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCommand {
    /// Sender of the datagram.
    pub from: SocketAddr,
    /// Local time the datagram was received.
    pub received_at: DateTime<Local>,
    /// Exactly the bytes of the datagram.
    pub raw: Vec<u8>,
    pub decoded: DecodedCommand,
}

impl Display for ReceivedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.received_at.format("%H:%M:%S%.3f"),
            self.from,
            self.decoded
        )
    }
}

/// Listens for VISCA commands, for diagnosing controllers or testing this
/// crate against itself.
pub struct ViscaReceiver {
    sock: UdpSocket,
}

impl ViscaReceiver {
    /// Largest datagram we accept. Longer datagrams are truncated by the OS.
    pub const MAX_PACKET_LENGTH: usize = 1024;

    /// Binds the receiver to a local address, usually
    /// `(Ipv4Addr::UNSPECIFIED, VISCA_PORT)`.
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let sock = UdpSocket::bind(addr).await?;
        info!("listening for VISCA commands on {}", sock.local_addr()?);
        Ok(Self { sock })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.sock.local_addr()?)
    }

    /// Receives and classifies a single datagram.
    ///
    /// `buf` is reused between calls; only the received length is decoded.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<ReceivedCommand> {
        let (l, from) = self.sock.recv_from(buf).await?;
        let raw = &buf[..l];
        let decoded = decode(raw);
        debug!("{from}: {} => {decoded}", HexBytes(raw));

        Ok(ReceivedCommand {
            from,
            received_at: Local::now(),
            raw: raw.to_vec(),
            decoded,
        })
    }

    /// Forwards every received command to `tx`.
    ///
    /// Returns `Ok` when `tx`'s receiver is dropped, or the receive error
    /// which ended the loop. The socket is released either way.
    pub async fn run(self, tx: mpsc::Sender<ReceivedCommand>) -> Result {
        let mut buf = vec![0; Self::MAX_PACKET_LENGTH];
        loop {
            select! {
                () = tx.closed() => {
                    debug!("receiver consumer went away, stopping");
                    return Ok(());
                }

                r = self.recv(&mut buf) => {
                    let cmd = r.inspect_err(|e| error!("receive error: {e}"))?;
                    if tx.send(cmd).await.is_err() {
                        debug!("receiver consumer went away, stopping");
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::{PresetCommand, PresetSlot, ZoomDirection, HOME};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn send_over_loopback() -> Result {
        let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = sock.local_addr()?.port();

        let cmd = Command::new(HOME)?;
        send_command("127.0.0.1", port, &cmd).await?;

        let mut buf = [0; 64];
        let (l, _) = timeout(Duration::from_secs(5), sock.recv_from(&mut buf))
            .await
            .map_err(|_| Error::Internal)??;
        assert_eq!(hex::decode("81010604ff")?, &buf[..l]);
        Ok(())
    }

    #[tokio::test]
    async fn unresolvable_host() -> Result {
        let cmd = Command::new(HOME)?;
        assert!(send_command("", VISCA_PORT, &cmd).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn receive_over_loopback() -> Result {
        let receiver = ViscaReceiver::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = receiver.local_addr()?.port();
        let (tx, mut rx) = mpsc::channel(4);
        let task = tokio::task::spawn(receiver.run(tx));

        let recall = Command::new(PresetCommand::recall(PresetSlot::new(2)?))?;
        send_command("127.0.0.1", port, &recall).await?;
        let zoom = Command::new(crate::protocol::Zoom {
            value: crate::protocol::DriveValue::drive(ZoomDirection::Tele, 2),
        })?;
        send_command("127.0.0.1", port, &zoom).await?;

        let first = timeout(Duration::from_secs(5), rx.recv())
            .await
            .map_err(|_| Error::Internal)?
            .ok_or(Error::ChannelUnavailable)?;
        assert_eq!(recall.as_bytes(), first.raw);
        assert_eq!("preset recall slot 3", first.decoded.to_string());
        assert!(first.from.ip().is_loopback());

        // The buffer is reused; only the shorter datagram's bytes are decoded.
        let second = timeout(Duration::from_secs(5), rx.recv())
            .await
            .map_err(|_| Error::Internal)?
            .ok_or(Error::ChannelUnavailable)?;
        assert_eq!(hex::decode("8101040722ff")?, second.raw);
        assert_eq!("zoom in, speed 2", second.decoded.to_string());
        assert!(second.to_string().ends_with("zoom in, speed 2"));

        // Dropping the consumer stops the loop.
        drop(rx);
        timeout(Duration::from_secs(5), task)
            .await
            .map_err(|_| Error::Internal)?
            .map_err(|_| Error::Internal)??;
        Ok(())
    }

    #[tokio::test]
    async fn receive_garbage() -> Result {
        let receiver = ViscaReceiver::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = receiver.local_addr()?;
        let sock = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        sock.send_to(&[0x81], addr).await?;

        let mut buf = [0; ViscaReceiver::MAX_PACKET_LENGTH];
        let cmd = timeout(Duration::from_secs(5), receiver.recv(&mut buf))
            .await
            .map_err(|_| Error::Internal)??;
        assert_eq!(DecodedCommand::TooShort(vec![0x81]), cmd.decoded);
        Ok(())
    }
}
