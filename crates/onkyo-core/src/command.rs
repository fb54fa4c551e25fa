//! Commands sent to the receiver daemon.
//!
//! A command displays as the exact line the daemon expects, without the
//! trailing newline. Values inside a command have already been validated.

use std::fmt;

use crate::validate::Frequency;

/// Receiver output zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Main,
    Zone2,
}

impl Zone {
    /// Prefix the daemon puts in front of zone-2 command names.
    const fn prefix(self) -> &'static str {
        match self {
            Self::Main => "",
            Self::Zone2 => "z2",
        }
    }
}

/// A command line for the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask for a full status report of a zone
    Status(Zone),
    /// Ask for the power state of a zone
    QueryPower(Zone),
    /// Ask for the sleep timer
    QuerySleep,
    /// Switch a zone on or off
    Power(Zone, bool),
    /// Mute or unmute a zone
    Mute(Zone, bool),
    /// Set a zone's volume
    Volume(Zone, u8),
    /// Select a zone's input by allow-list name
    Input(Zone, String),
    /// Select the main zone listening mode
    Mode(String),
    /// Tune a zone's tuner
    Tune(Zone, Frequency),
    /// Set the sleep timer in minutes
    Sleep(u8),
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(Zone::Main) => f.write_str("status"),
            Self::Status(Zone::Zone2) => f.write_str("status zone2"),
            Self::QueryPower(zone) => write!(f, "{}power", zone.prefix()),
            Self::QuerySleep => f.write_str("sleep"),
            Self::Power(zone, on) => write!(f, "{}power {}", zone.prefix(), on_off(*on)),
            Self::Mute(zone, on) => write!(f, "{}mute {}", zone.prefix(), on_off(*on)),
            Self::Volume(zone, level) => write!(f, "{}volume {level}", zone.prefix()),
            Self::Input(zone, name) => write!(f, "{}input {name}", zone.prefix()),
            Self::Mode(name) => write!(f, "mode {name}"),
            Self::Tune(zone, freq) => write!(f, "{}tune {freq}", zone.prefix()),
            Self::Sleep(minutes) => write!(f, "sleep {minutes}"),
        }
    }
}
