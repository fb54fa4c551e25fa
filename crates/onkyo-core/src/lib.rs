//! Onkyo Core - Receiver status model, commands, and input validation.
//!
//! This crate contains the domain types shared by the client library and
//! frontends: the last-known state of the receiver, the commands that can be
//! sent to the control daemon, and the validators that turn user input into
//! values safe to put on the wire.

pub mod command;
pub mod error;
pub mod status;
pub mod validate;

pub use command::{Command, Zone};
pub use error::{Result, ValidationError};
pub use status::{Facet, FacetKind, FacetValue, ReceiverStatus};
pub use validate::{Band, Frequency};
