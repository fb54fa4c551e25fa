//! Onkyo Client - Line protocol and connection to the receiver daemon.
//!
//! This crate speaks the onkyocontrol daemon's text protocol over TCP. It
//! keeps a [`ReceiverStatus`](onkyo_core::ReceiverStatus) up to date from the
//! daemon's status lines, reconnects when the connection is lost, and signals
//! a [`NotifyReceiver`] whenever new state is available.

pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod notify;
pub mod protocol;

pub use client::{Delivery, ReceiverClient, StatusHandle};
pub use codec::LineCodec;
pub use config::{ClientConfig, ErrorPolicy};
pub use connection::{ClientEvent, ConnectionState, Disconnect};
pub use error::{ClientError, ClientResult, FramingError, ProtocolError};
pub use notify::{Notification, NotifyReceiver, Notifier};
