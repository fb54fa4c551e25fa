//! Receiver client.
//!
//! [`ReceiverClient`] owns the connection to the daemon and the receiver
//! status built from its reports. It never spawns tasks: the host loop
//! awaits [`ReceiverClient::next_event`] (the connection becoming readable or
//! the retry timer firing) and hands the result back to
//! [`ReceiverClient::handle_event`], so every state change happens on the
//! caller's task in arrival order.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::SinkExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use onkyo_core::validate::{self, LISTENING_MODES, MAIN_INPUTS, ZONE2_INPUTS};
use onkyo_core::{Command, Facet, FacetValue, ReceiverStatus, ValidationError, Zone};

use crate::config::{ClientConfig, ErrorPolicy};
use crate::connection::{self, ClientEvent, ConnectionState, LineStream, Link};
use crate::error::{ClientError, ClientResult};
use crate::notify::{self, Notifier, NotifyReceiver};
use crate::protocol::{self, Inbound};

/// Outcome of writing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The line was written to the daemon.
    Sent,
    /// There was no usable connection. The command is lost and a
    /// connection attempt has been made.
    Dropped,
}

/// Read-only view of the latest published status, shareable across threads.
#[derive(Clone)]
pub struct StatusHandle {
    inner: Arc<ArcSwap<ReceiverStatus>>,
}

impl StatusHandle {
    /// Current status snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<ReceiverStatus> {
        self.inner.load_full()
    }
}

impl fmt::Debug for StatusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusHandle").field("status", &self.inner.load()).finish()
    }
}

/// Client for the receiver control daemon.
pub struct ReceiverClient {
    config: ClientConfig,
    status: ReceiverStatus,
    published: Arc<ArcSwap<ReceiverStatus>>,
    link: Link,
    notifier: Notifier,
    state_tx: watch::Sender<ConnectionState>,
}

impl fmt::Debug for ReceiverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverClient")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("state", &self.state())
            .field("retry_pending", &self.link.retry_pending())
            .finish_non_exhaustive()
    }
}

impl ReceiverClient {
    /// Create a client and the receiver for its change notifications.
    ///
    /// Does not connect; call [`establish_connection`](Self::establish_connection).
    #[must_use]
    pub fn new(config: ClientConfig) -> (Self, NotifyReceiver) {
        let (notifier, notify_rx) = notify::channel();
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let status = ReceiverStatus::new();

        let client = Self {
            config,
            published: Arc::new(ArcSwap::from_pointee(status.clone())),
            status,
            link: Link::Disconnected { retry: None },
            notifier,
            state_tx,
        };
        (client, notify_rx)
    }

    /// Connection settings.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Last-known receiver status.
    #[must_use]
    pub fn status(&self) -> &ReceiverStatus {
        &self.status
    }

    /// A shareable handle to the status, updated on every change.
    #[must_use]
    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle { inner: Arc::clone(&self.published) }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Connect to the daemon unless already connected.
    ///
    /// On failure a retry is scheduled after the configured interval, unless
    /// one is already pending. Returns whether the client is connected.
    pub async fn establish_connection(&mut self) -> bool {
        self.connect(false).await
    }

    /// Wait for the next thing the client must react to.
    ///
    /// Pends forever while there is neither a connection nor a pending
    /// retry. Cancel safe, so it can sit in a `tokio::select!` next to the
    /// host's other event sources.
    pub async fn next_event(&mut self) -> ClientEvent {
        self.link.next_event().await
    }

    /// React to an event from [`next_event`](Self::next_event).
    ///
    /// Status lines are applied and signalled; a lost connection is
    /// re-established immediately; a due retry makes a new attempt.
    ///
    /// # Errors
    /// Returns [`ClientError::Daemon`] when the daemon reports an error and
    /// the error policy is [`ErrorPolicy::Disconnect`]. The client has
    /// already scheduled its reconnect by then.
    pub async fn handle_event(&mut self, event: ClientEvent) -> ClientResult<()> {
        match event {
            ClientEvent::Line(line) => self.apply_line(&line),
            ClientEvent::Lost(reason) => {
                info!(%reason, "Connection to daemon lost, reconnecting");
                self.connect(true).await;
                Ok(())
            }
            ClientEvent::RetryDue => {
                if let Link::Disconnected { retry } = &mut self.link {
                    *retry = None;
                }
                self.connect(false).await;
                Ok(())
            }
        }
    }

    /// Close the connection and cancel any pending retry.
    ///
    /// The client stays closed afterwards; calling this again does nothing.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.link, Link::Closed) {
            Link::Closed => return,
            Link::Connected { peer, .. } => info!(%peer, "Disconnected from daemon"),
            Link::Disconnected { retry: Some(_) } => debug!("Cancelled pending reconnect"),
            Link::Disconnected { retry: None } => {}
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }

    // Queries

    /// Ask for a full main zone status report.
    pub async fn query_status(&mut self) -> Delivery {
        self.write_command(Command::Status(Zone::Main)).await
    }

    /// Ask for a full zone 2 status report.
    pub async fn query_zone2_status(&mut self) -> Delivery {
        self.write_command(Command::Status(Zone::Zone2)).await
    }

    /// Ask for the sleep timer.
    pub async fn query_sleep(&mut self) -> Delivery {
        self.write_command(Command::QuerySleep).await
    }

    /// Ask for the power state of both zones.
    pub async fn query_power(&mut self) -> Delivery {
        match self.write_command(Command::QueryPower(Zone::Main)).await {
            Delivery::Sent => self.write_command(Command::QueryPower(Zone::Zone2)).await,
            Delivery::Dropped => Delivery::Dropped,
        }
    }

    // Main zone

    pub async fn set_power(&mut self, on: bool) -> Delivery {
        self.power(Zone::Main, on).await
    }

    pub async fn set_mute(&mut self, on: bool) -> Delivery {
        self.mute(Zone::Main, on).await
    }

    /// # Errors
    /// Rejects volumes outside `0..=100` without sending anything.
    pub async fn set_volume(&mut self, volume: i64) -> Result<Delivery, ValidationError> {
        self.volume(Zone::Main, volume).await
    }

    /// # Errors
    /// Rejects names not in the main zone input list.
    pub async fn set_input(&mut self, name: &str) -> Result<Delivery, ValidationError> {
        self.input(Zone::Main, name).await
    }

    /// # Errors
    /// Rejects unknown listening modes.
    pub async fn set_mode(&mut self, name: &str) -> Result<Delivery, ValidationError> {
        let mode = validate::validate_mode(name, LISTENING_MODES)?;
        self.store(Facet::Mode, FacetValue::Text(mode.to_string()));
        Ok(self.write_command(Command::Mode(mode.to_string())).await)
    }

    /// # Errors
    /// Rejects frequencies outside the FM and AM bands.
    pub async fn set_tune(&mut self, frequency: &str) -> Result<Delivery, ValidationError> {
        self.tune(Zone::Main, frequency).await
    }

    /// # Errors
    /// Rejects timers outside `0..=90` minutes.
    pub async fn set_sleep(&mut self, minutes: i64) -> Result<Delivery, ValidationError> {
        let minutes = validate::check_sleep(minutes)?;
        self.store(Facet::Sleep, FacetValue::Int(minutes.into()));
        Ok(self.write_command(Command::Sleep(minutes)).await)
    }

    // Zone 2

    pub async fn set_zone2_power(&mut self, on: bool) -> Delivery {
        self.power(Zone::Zone2, on).await
    }

    pub async fn set_zone2_mute(&mut self, on: bool) -> Delivery {
        self.mute(Zone::Zone2, on).await
    }

    /// # Errors
    /// Rejects volumes outside `0..=100` without sending anything.
    pub async fn set_zone2_volume(&mut self, volume: i64) -> Result<Delivery, ValidationError> {
        self.volume(Zone::Zone2, volume).await
    }

    /// # Errors
    /// Rejects names not in the zone 2 input list.
    pub async fn set_zone2_input(&mut self, name: &str) -> Result<Delivery, ValidationError> {
        self.input(Zone::Zone2, name).await
    }

    /// # Errors
    /// Rejects frequencies outside the FM and AM bands.
    pub async fn set_zone2_tune(&mut self, frequency: &str) -> Result<Delivery, ValidationError> {
        self.tune(Zone::Zone2, frequency).await
    }

    async fn power(&mut self, zone: Zone, on: bool) -> Delivery {
        self.store(zoned(zone, Facet::Power, Facet::Zone2Power), FacetValue::Bool(on));
        self.write_command(Command::Power(zone, on)).await
    }

    async fn mute(&mut self, zone: Zone, on: bool) -> Delivery {
        self.store(zoned(zone, Facet::Mute, Facet::Zone2Mute), FacetValue::Bool(on));
        self.write_command(Command::Mute(zone, on)).await
    }

    async fn volume(&mut self, zone: Zone, volume: i64) -> Result<Delivery, ValidationError> {
        let volume = validate::check_volume(volume)?;
        self.store(zoned(zone, Facet::Volume, Facet::Zone2Volume), FacetValue::Int(volume.into()));
        Ok(self.write_command(Command::Volume(zone, volume)).await)
    }

    async fn input(&mut self, zone: Zone, name: &str) -> Result<Delivery, ValidationError> {
        let allowed = match zone {
            Zone::Main => MAIN_INPUTS,
            Zone::Zone2 => ZONE2_INPUTS,
        };
        let input = validate::validate_input(name, allowed)?;
        self.store(zoned(zone, Facet::Input, Facet::Zone2Input), FacetValue::Text(input.into()));
        Ok(self.write_command(Command::Input(zone, input.to_string())).await)
    }

    async fn tune(&mut self, zone: Zone, frequency: &str) -> Result<Delivery, ValidationError> {
        let frequency = validate::validate_frequency(frequency)?;
        let facet = zoned(zone, Facet::Tune, Facet::Zone2Tune);
        self.store(facet, FacetValue::Text(frequency.status_text()));
        Ok(self.write_command(Command::Tune(zone, frequency)).await)
    }

    /// Write a facet locally ahead of the daemon's confirmation.
    fn store(&mut self, facet: Facet, value: FacetValue) {
        self.status.set(facet, value);
        self.publish();
    }

    fn publish(&self) {
        self.published.store(Arc::new(self.status.clone()));
    }

    fn apply_line(&mut self, line: &str) -> ClientResult<()> {
        debug!(line, "Received line");
        match protocol::decode_line(line) {
            Ok(Inbound::Update { facet, value }) => {
                self.status.set(facet, value);
                self.publish();
                self.notifier.notify(line);
                Ok(())
            }
            Ok(Inbound::DaemonError(reason)) => {
                warn!(%reason, "Daemon reported an error");
                match self.config.error_policy {
                    ErrorPolicy::Log => Ok(()),
                    ErrorPolicy::Disconnect => {
                        if matches!(self.link, Link::Connected { .. }) {
                            self.teardown();
                            self.schedule_retry();
                        }
                        Err(ClientError::Daemon(reason))
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Discarding line");
                Ok(())
            }
        }
    }

    async fn write_command(&mut self, command: Command) -> Delivery {
        let line = command.to_string();
        let Link::Connected { lines, .. } = &mut self.link else {
            debug!(%line, "Not connected, dropping command");
            self.connect(false).await;
            return Delivery::Dropped;
        };

        debug!(%line, "Sending line");
        if let Err(e) = lines.send(line.as_str()).await {
            warn!(error = %e, "Write failed, reconnecting");
            self.connect(true).await;
            return Delivery::Dropped;
        }
        Delivery::Sent
    }

    async fn connect(&mut self, force: bool) -> bool {
        if matches!(self.link, Link::Closed) {
            debug!("Client is shut down, not connecting");
            return false;
        }
        if matches!(self.link, Link::Connected { .. }) {
            if !force {
                return true;
            }
            self.teardown();
        }

        self.state_tx.send_replace(ConnectionState::Connecting);
        match self.open().await {
            Ok((lines, peer)) => {
                // Replacing the Disconnected link also cancels its retry timer.
                self.link = Link::Connected { lines, peer };
                self.status.epoch += 1;
                self.publish();
                self.state_tx.send_replace(ConnectionState::Connected);
                info!(%peer, epoch = self.status.epoch, "Connected to daemon");
                true
            }
            Err(e) => {
                debug!(error = %e, retry_in = ?self.config.retry_interval(), "Failed to connect to daemon");
                self.state_tx.send_replace(ConnectionState::Disconnected);
                self.schedule_retry();
                false
            }
        }
    }

    async fn open(&self) -> ClientResult<(LineStream, SocketAddr)> {
        let (mut lines, peer) = connection::open(&self.config).await?;
        connection::send_initial_queries(&mut lines, self.config.query_zone2).await?;
        Ok((lines, peer))
    }

    /// Arm the retry timer unless one is already pending.
    fn schedule_retry(&mut self) {
        let delay = self.config.retry_interval();
        if let Link::Disconnected { retry } = &mut self.link
            && retry.is_none()
        {
            *retry = Some(Box::pin(tokio::time::sleep(delay)));
        }
    }

    fn teardown(&mut self) {
        let old = std::mem::replace(&mut self.link, Link::Disconnected { retry: None });
        if let Link::Connected { peer, .. } = old {
            debug!(%peer, "Closed connection");
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }
}

fn zoned(zone: Zone, main: Facet, zone2: Facet) -> Facet {
    match zone {
        Zone::Main => main,
        Zone::Zone2 => zone2,
    }
}
