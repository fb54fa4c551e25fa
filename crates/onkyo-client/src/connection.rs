//! Connection lifecycle.
//!
//! A [`Link`] is the single owner of whatever keeps the client trying to
//! talk to the daemon: either a live, greeted line stream (whose readability
//! is the read watch) or, while disconnected, at most one pending retry
//! timer. The two can never be armed at the same time because they live in
//! different variants.

use std::fmt;
use std::net::SocketAddr;
use std::pin::Pin;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::{Sleep, timeout};
use tokio_util::codec::Framed;
use tracing::debug;

use onkyo_core::{Command, Zone};

use crate::codec::LineCodec;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, FramingError};
use crate::protocol;

/// Line-framed connection to the daemon.
pub type LineStream = Framed<TcpStream, LineCodec>;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection; a retry may be pending.
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Greeted and reading status lines.
    Connected,
}

/// Why a live connection ended.
#[derive(Debug)]
pub enum Disconnect {
    /// The daemon closed the connection between lines.
    Hangup,
    /// The stream failed or closed mid-line.
    Failed(FramingError),
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hangup => f.write_str("hangup"),
            Self::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// Something the client has to react to.
#[derive(Debug)]
pub enum ClientEvent {
    /// A complete line arrived on the live connection.
    Line(String),
    /// The live connection ended.
    Lost(Disconnect),
    /// The retry timer fired.
    RetryDue,
}

/// What is currently armed.
pub(crate) enum Link {
    /// No socket. Holds the retry timer, if one is pending.
    Disconnected { retry: Option<Pin<Box<Sleep>>> },
    /// Live connection.
    Connected { lines: LineStream, peer: SocketAddr },
    /// Shut down for good.
    Closed,
}

impl Link {
    pub(crate) fn retry_pending(&self) -> bool {
        matches!(self, Self::Disconnected { retry: Some(_) })
    }

    /// Wait for whichever armed source fires next.
    ///
    /// Never completes when nothing is armed. Cancel safe.
    pub(crate) async fn next_event(&mut self) -> ClientEvent {
        match self {
            Self::Connected { lines, .. } => match lines.next().await {
                Some(Ok(line)) => ClientEvent::Line(line),
                Some(Err(e)) => ClientEvent::Lost(Disconnect::Failed(e)),
                None => ClientEvent::Lost(Disconnect::Hangup),
            },
            Self::Disconnected { retry: Some(timer) } => {
                timer.as_mut().await;
                ClientEvent::RetryDue
            }
            Self::Disconnected { retry: None } | Self::Closed => std::future::pending().await,
        }
    }
}

/// Resolve the daemon address and open a greeted connection.
///
/// Candidates are tried in resolution order and the first one that accepts
/// wins. Once a candidate accepts, its greeting decides the attempt.
pub(crate) async fn open(config: &ClientConfig) -> ClientResult<(LineStream, SocketAddr)> {
    let candidates: Vec<SocketAddr> = lookup_host((config.host.as_str(), config.port))
        .await
        .map_err(|source| ClientError::Resolve { host: config.host.clone(), source })?
        .collect();

    let mut last_error = None;
    for addr in candidates {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                let mut lines = Framed::new(stream, LineCodec::new());
                let hello = timeout(config.handshake_timeout(), greet(&mut lines))
                    .await
                    .map_err(|_| ClientError::HandshakeTimeout)??;
                debug!(%addr, hello = %hello, "Daemon greeted");
                return Ok((lines, addr));
            }
            Err(e) => {
                debug!(%addr, error = %e, "Connect failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.map_or_else(|| ClientError::NoAddress(config.host.clone()), ClientError::Io))
}

/// Read and check the daemon's hello line.
pub(crate) async fn greet<S>(lines: &mut Framed<S, LineCodec>) -> ClientResult<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match lines.next().await {
        Some(Ok(line)) => {
            protocol::check_greeting(&line)?;
            Ok(line)
        }
        Some(Err(e)) => Err(e.into()),
        None => Err(FramingError::Truncated(0).into()),
    }
}

/// Send the queries that follow every successful connect.
pub(crate) async fn send_initial_queries<S>(
    lines: &mut Framed<S, LineCodec>,
    query_zone2: bool,
) -> Result<(), FramingError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    lines.feed(Command::QueryPower(Zone::Main).to_string()).await?;
    if query_zone2 {
        lines.feed(Command::QueryPower(Zone::Zone2).to_string()).await?;
    }
    SinkExt::<String>::flush(lines).await
}
