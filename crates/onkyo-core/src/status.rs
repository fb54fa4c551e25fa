//! Last-known receiver state.

use std::fmt;

use serde::Serialize;

/// One named field of receiver state.
///
/// The name of each facet is also the field name the daemon uses in its
/// `OK:<field>:<value>` status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Power,
    Mute,
    Mode,
    Volume,
    Input,
    Tune,
    Sleep,
    Zone2Power,
    Zone2Mute,
    Zone2Volume,
    Zone2Input,
    Zone2Tune,
    Zone2Mode,
}

/// How a facet's wire value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    /// `on` is true, anything else false.
    Bool,
    /// A decimal integer.
    Int,
    /// The literal remainder of the line.
    Text,
}

impl Facet {
    /// Every facet, in display order.
    pub const ALL: [Self; 13] = [
        Self::Power,
        Self::Mute,
        Self::Mode,
        Self::Volume,
        Self::Input,
        Self::Tune,
        Self::Sleep,
        Self::Zone2Power,
        Self::Zone2Mute,
        Self::Zone2Volume,
        Self::Zone2Input,
        Self::Zone2Tune,
        Self::Zone2Mode,
    ];

    /// Wire name of this facet.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Mute => "mute",
            Self::Mode => "mode",
            Self::Volume => "volume",
            Self::Input => "input",
            Self::Tune => "tune",
            Self::Sleep => "sleep",
            Self::Zone2Power => "zone2power",
            Self::Zone2Mute => "zone2mute",
            Self::Zone2Volume => "zone2volume",
            Self::Zone2Input => "zone2input",
            Self::Zone2Tune => "zone2tune",
            Self::Zone2Mode => "zone2mode",
        }
    }

    /// How values for this facet are decoded.
    #[must_use]
    pub const fn kind(self) -> FacetKind {
        match self {
            Self::Power | Self::Mute | Self::Zone2Power | Self::Zone2Mute => FacetKind::Bool,
            Self::Volume | Self::Sleep | Self::Zone2Volume => FacetKind::Int,
            Self::Mode
            | Self::Input
            | Self::Tune
            | Self::Zone2Input
            | Self::Zone2Tune
            | Self::Zone2Mode => FacetKind::Text,
        }
    }

    /// Find the facet with the given wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|facet| facet.name() == name)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A known facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FacetValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("on"),
            Self::Bool(false) => f.write_str("off"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Last-known state of the receiver.
///
/// Every facet starts out `None` ("unknown") and stays that way until the
/// daemon reports it or a command sets it. Consumers must not render or act
/// on an unknown facet. `epoch` counts successful (re)connections; when it
/// changes, every known value may be stale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverStatus {
    pub power: Option<bool>,
    pub mute: Option<bool>,
    pub mode: Option<String>,
    pub volume: Option<i64>,
    pub input: Option<String>,
    pub tune: Option<String>,
    pub sleep: Option<i64>,
    pub zone2power: Option<bool>,
    pub zone2mute: Option<bool>,
    pub zone2volume: Option<i64>,
    pub zone2input: Option<String>,
    pub zone2tune: Option<String>,
    pub zone2mode: Option<String>,
    pub epoch: u64,
}

impl ReceiverStatus {
    /// Create a status with every facet unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a facet, or `None` if unknown.
    #[must_use]
    pub fn get(&self, facet: Facet) -> Option<FacetValue> {
        match facet.kind() {
            FacetKind::Bool => self.bool_slot(facet).map(FacetValue::Bool),
            FacetKind::Int => self.int_slot(facet).map(FacetValue::Int),
            FacetKind::Text => self.text_slot(facet).map(|s| FacetValue::Text(s.to_string())),
        }
    }

    /// Store a facet value.
    ///
    /// Returns `false` without changing anything if the value's kind does
    /// not match the facet.
    pub fn set(&mut self, facet: Facet, value: FacetValue) -> bool {
        match (facet, value) {
            (Facet::Power, FacetValue::Bool(b)) => self.power = Some(b),
            (Facet::Mute, FacetValue::Bool(b)) => self.mute = Some(b),
            (Facet::Zone2Power, FacetValue::Bool(b)) => self.zone2power = Some(b),
            (Facet::Zone2Mute, FacetValue::Bool(b)) => self.zone2mute = Some(b),
            (Facet::Volume, FacetValue::Int(n)) => self.volume = Some(n),
            (Facet::Sleep, FacetValue::Int(n)) => self.sleep = Some(n),
            (Facet::Zone2Volume, FacetValue::Int(n)) => self.zone2volume = Some(n),
            (Facet::Mode, FacetValue::Text(s)) => self.mode = Some(s),
            (Facet::Input, FacetValue::Text(s)) => self.input = Some(s),
            (Facet::Tune, FacetValue::Text(s)) => self.tune = Some(s),
            (Facet::Zone2Input, FacetValue::Text(s)) => self.zone2input = Some(s),
            (Facet::Zone2Tune, FacetValue::Text(s)) => self.zone2tune = Some(s),
            (Facet::Zone2Mode, FacetValue::Text(s)) => self.zone2mode = Some(s),
            _ => return false,
        }
        true
    }

    /// Facets whose value differs between `self` and `other`.
    #[must_use]
    pub fn changed_facets(&self, other: &Self) -> Vec<Facet> {
        Facet::ALL.into_iter().filter(|facet| self.get(*facet) != other.get(*facet)).collect()
    }

    /// Iterate over every facet and its value, unknown ones included.
    pub fn iter(&self) -> impl Iterator<Item = (Facet, Option<FacetValue>)> + '_ {
        Facet::ALL.into_iter().map(|facet| (facet, self.get(facet)))
    }

    fn bool_slot(&self, facet: Facet) -> Option<bool> {
        match facet {
            Facet::Power => self.power,
            Facet::Mute => self.mute,
            Facet::Zone2Power => self.zone2power,
            Facet::Zone2Mute => self.zone2mute,
            _ => None,
        }
    }

    fn int_slot(&self, facet: Facet) -> Option<i64> {
        match facet {
            Facet::Volume => self.volume,
            Facet::Sleep => self.sleep,
            Facet::Zone2Volume => self.zone2volume,
            _ => None,
        }
    }

    fn text_slot(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Mode => self.mode.as_deref(),
            Facet::Input => self.input.as_deref(),
            Facet::Tune => self.tune.as_deref(),
            Facet::Zone2Input => self.zone2input.as_deref(),
            Facet::Zone2Tune => self.zone2tune.as_deref(),
            Facet::Zone2Mode => self.zone2mode.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_is_all_unknown() {
        let status = ReceiverStatus::new();

        assert!(status.iter().all(|(_, value)| value.is_none()));
        assert_eq!(status.epoch, 0);
    }

    #[test]
    fn test_facet_names_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_name(facet.name()), Some(facet));
        }
        assert_eq!(Facet::from_name("Dimmer"), None);
        assert_eq!(Facet::from_name("Power"), None); // Wire names are lowercase
    }

    #[test]
    fn test_set_and_get_each_kind() {
        let mut status = ReceiverStatus::new();

        assert!(status.set(Facet::Zone2Power, FacetValue::Bool(true)));
        assert!(status.set(Facet::Volume, FacetValue::Int(45)));
        assert!(status.set(Facet::Tune, FacetValue::Text("101.5 FM".into())));

        assert_eq!(status.zone2power, Some(true));
        assert_eq!(status.get(Facet::Volume), Some(FacetValue::Int(45)));
        assert_eq!(status.get(Facet::Tune), Some(FacetValue::Text("101.5 FM".into())));
        assert_eq!(status.get(Facet::Mute), None);
    }

    #[test]
    fn test_set_rejects_mismatched_kind() {
        let mut status = ReceiverStatus::new();

        assert!(!status.set(Facet::Power, FacetValue::Int(1)));
        assert!(!status.set(Facet::Volume, FacetValue::Text("45".into())));
        assert_eq!(status, ReceiverStatus::new());
    }

    #[test]
    fn test_changed_facets() {
        let before = ReceiverStatus::new();
        let mut after = before.clone();
        after.power = Some(false);
        after.zone2mode = Some("Stereo".into());
        after.epoch = 3; // Not a facet

        assert_eq!(after.changed_facets(&before), vec![Facet::Power, Facet::Zone2Mode]);
        assert!(after.changed_facets(&after).is_empty());
    }

    #[test]
    fn test_facet_value_display() {
        assert_eq!(FacetValue::Bool(true).to_string(), "on");
        assert_eq!(FacetValue::Bool(false).to_string(), "off");
        assert_eq!(FacetValue::Int(30).to_string(), "30");
        assert_eq!(FacetValue::Text("Neo:6 Cinema".into()).to_string(), "Neo:6 Cinema");
    }

    #[test]
    fn test_status_serializes_unknown_as_null() {
        let mut status = ReceiverStatus::new();
        status.volume = Some(20);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["volume"], 20);
        assert!(json["power"].is_null());
        assert_eq!(json["epoch"], 0);
    }
}
