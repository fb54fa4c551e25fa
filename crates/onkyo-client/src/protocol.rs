//! Decoding of daemon lines.
//!
//! Inbound status lines have the shape `<category>:<field>:<value>`. Values
//! are not escaped, so a text value may itself contain colons and is taken
//! as everything after the second colon.

use onkyo_core::{Facet, FacetKind, FacetValue};

use crate::error::{ClientError, ProtocolError};

/// Prefix of the line the daemon sends right after accepting a connection.
pub const HELLO: &str = "OK:onkyocontrol";

const OK: &str = "OK";
const ERROR: &str = "ERROR";

/// A decoded inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The daemon reported the value of a facet.
    Update { facet: Facet, value: FacetValue },
    /// The daemon reported an error.
    DaemonError(String),
}

/// Check the first line received on a new connection.
///
/// # Errors
/// Returns [`ClientError::Handshake`] unless the line starts with [`HELLO`].
pub fn check_greeting(line: &str) -> Result<(), ClientError> {
    if line.starts_with(HELLO) { Ok(()) } else { Err(ClientError::Handshake(line.to_string())) }
}

/// Decode one inbound line (without its newline).
///
/// # Errors
/// Returns a [`ProtocolError`] for lines that cannot be applied: an unknown
/// category or field, a missing value, or a non-integer value for an
/// integer facet.
pub fn decode_line(line: &str) -> Result<Inbound, ProtocolError> {
    let (category, rest) =
        line.split_once(':').ok_or_else(|| ProtocolError::UnknownCategory(line.to_string()))?;

    match category {
        ERROR => Ok(Inbound::DaemonError(rest.to_string())),
        OK => {
            let (field, raw) =
                rest.split_once(':').ok_or_else(|| ProtocolError::MissingValue(line.to_string()))?;
            let facet =
                Facet::from_name(field).ok_or_else(|| ProtocolError::UnknownField(field.to_string()))?;
            let value = decode_value(facet, raw)?;
            Ok(Inbound::Update { facet, value })
        }
        _ => Err(ProtocolError::UnknownCategory(line.to_string())),
    }
}

fn decode_value(facet: Facet, raw: &str) -> Result<FacetValue, ProtocolError> {
    match facet.kind() {
        FacetKind::Bool => Ok(FacetValue::Bool(raw == "on")),
        FacetKind::Int => raw.trim().parse().map(FacetValue::Int).map_err(|_| {
            ProtocolError::InvalidInteger { field: facet.name(), value: raw.to_string() }
        }),
        FacetKind::Text => Ok(FacetValue::Text(raw.to_string())),
    }
}
