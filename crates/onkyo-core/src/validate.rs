//! Validation of user-supplied receiver values.
//!
//! Every value typed or picked in a frontend passes through one of these
//! functions before it is turned into a [`Command`](crate::Command). They have
//! no side effects; a rejection carries a message suitable for showing to the
//! user as-is.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Result, ValidationError};

/// Tunable FM band in MHz.
pub const FM_MHZ: RangeInclusive<f64> = 87.4..=108.0;

/// Tunable AM band in kHz.
pub const AM_KHZ: RangeInclusive<f64> = 530.0..=1710.0;

/// Highest master volume step.
pub const MAX_VOLUME: u8 = 100;

/// Longest sleep timer in minutes. Zero turns the timer off.
pub const MAX_SLEEP: u8 = 90;

/// Inputs selectable in the main zone.
pub const MAIN_INPUTS: &[&str] = &[
    "dvr", "vcr", "cable", "sat", "tv", "aux", "dvd", "tape", "phono", "cd", "fm", "fm tuner",
    "am", "am tuner", "tuner", "multich", "xm", "sirius",
];

/// Inputs selectable in zone 2, which can also follow the main zone or be off.
pub const ZONE2_INPUTS: &[&str] = &[
    "dvr", "vcr", "cable", "sat", "tv", "aux", "dvd", "tape", "phono", "cd", "fm", "fm tuner",
    "am", "am tuner", "tuner", "multich", "xm", "sirius", "source", "off",
];

/// Listening mode identifiers understood by the daemon.
pub const LISTENING_MODES: &[&str] = &[
    "stereo",
    "direct",
    "acstereo",
    "fullmono",
    "pure",
    "straight",
    "thx",
    "pliimovie",
    "pliimusic",
    "pliigame",
    "neo6cinema",
    "neo6music",
    "pliithx",
    "neo6thx",
    "neuralthx",
];

/// Tuner band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Fm,
    Am,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fm => f.write_str("FM"),
            Self::Am => f.write_str("AM"),
        }
    }
}

/// A validated tuner frequency.
///
/// Displays in the form the daemon expects on a `tune` command: `101.5` for
/// FM, `1010` for AM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// FM station in tenths of a MHz (`1015` is 101.5 MHz).
    Fm(u16),
    /// AM station in kHz.
    Am(u16),
}

impl Frequency {
    /// The band this frequency belongs to.
    #[must_use]
    pub fn band(self) -> Band {
        match self {
            Self::Fm(_) => Band::Fm,
            Self::Am(_) => Band::Am,
        }
    }

    /// Frequency in the band's natural unit (MHz for FM, kHz for AM).
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Fm(tenths) => f64::from(tenths) / 10.0,
            Self::Am(khz) => f64::from(khz),
        }
    }

    /// The frequency as the daemon reports it in a `tune` status line.
    #[must_use]
    pub fn status_text(self) -> String {
        format!("{self} {}", self.band())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fm(tenths) => write!(f, "{}.{}", tenths / 10, tenths % 10),
            Self::Am(khz) => write!(f, "{khz}"),
        }
    }
}

/// Map a user-entered frequency onto the FM or AM band.
///
/// FM keeps one decimal digit, AM is truncated to whole kHz.
///
/// # Errors
/// Returns [`ValidationError::Frequency`] if the input is not a number or
/// falls outside both bands.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn validate_frequency(input: &str) -> Result<Frequency> {
    let rejected = || ValidationError::Frequency(input.to_string());
    let value: f64 = input.trim().parse().map_err(|_| rejected())?;

    // Both bands are range checked first, so the casts cannot overflow.
    if FM_MHZ.contains(&value) {
        Ok(Frequency::Fm((value * 10.0).round() as u16))
    } else if AM_KHZ.contains(&value) {
        Ok(Frequency::Am(value.trunc() as u16))
    } else {
        Err(rejected())
    }
}

/// Check a volume level.
///
/// # Errors
/// Returns [`ValidationError::VolumeOutOfRange`] outside `0..=100`.
pub fn check_volume(volume: i64) -> Result<u8> {
    u8::try_from(volume)
        .ok()
        .filter(|v| *v <= MAX_VOLUME)
        .ok_or(ValidationError::VolumeOutOfRange(volume))
}

/// Parse and check a volume level typed by the user.
///
/// # Errors
/// Returns [`ValidationError::VolumeNotInteger`] for non-integer input, or
/// [`ValidationError::VolumeOutOfRange`] outside `0..=100`.
pub fn validate_volume(input: &str) -> Result<u8> {
    let volume: i64 =
        input.trim().parse().map_err(|_| ValidationError::VolumeNotInteger(input.to_string()))?;
    check_volume(volume)
}

/// Check a sleep timer length in minutes.
///
/// # Errors
/// Returns [`ValidationError::SleepOutOfRange`] outside `0..=90`.
pub fn check_sleep(minutes: i64) -> Result<u8> {
    u8::try_from(minutes)
        .ok()
        .filter(|m| *m <= MAX_SLEEP)
        .ok_or(ValidationError::SleepOutOfRange(minutes))
}

/// Parse and check a sleep timer length typed by the user.
///
/// # Errors
/// Returns [`ValidationError::SleepNotInteger`] for non-integer input, or
/// [`ValidationError::SleepOutOfRange`] outside `0..=90`.
pub fn validate_sleep(input: &str) -> Result<u8> {
    let minutes: i64 =
        input.trim().parse().map_err(|_| ValidationError::SleepNotInteger(input.to_string()))?;
    check_sleep(minutes)
}

/// Look up an input name in a zone's allow-list, ignoring case.
///
/// Pass [`MAIN_INPUTS`] or [`ZONE2_INPUTS`]. Returns the allow-list spelling.
///
/// # Errors
/// Returns [`ValidationError::Input`] if the name is not in `allowed`.
pub fn validate_input(name: &str, allowed: &[&'static str]) -> Result<&'static str> {
    find_ignore_case(name, allowed).ok_or_else(|| ValidationError::Input(name.to_string()))
}

/// Look up a listening mode, ignoring case. Returns the allow-list spelling.
///
/// # Errors
/// Returns [`ValidationError::Mode`] if the name is not in `allowed`.
pub fn validate_mode(name: &str, allowed: &[&'static str]) -> Result<&'static str> {
    find_ignore_case(name, allowed).ok_or_else(|| ValidationError::Mode(name.to_string()))
}

fn find_ignore_case(name: &str, allowed: &[&'static str]) -> Option<&'static str> {
    let name = name.trim();
    allowed.iter().copied().find(|candidate| candidate.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_fm_frequency_keeps_one_decimal() {
        assert_eq!(validate_frequency("101.5"), Ok(Frequency::Fm(1015)));
        assert_eq!(validate_frequency("101.56"), Ok(Frequency::Fm(1016)));
        assert_eq!(validate_frequency(" 88 "), Ok(Frequency::Fm(880)));
    }

    #[test]
    fn test_fm_band_edges() {
        assert_eq!(validate_frequency("87.4"), Ok(Frequency::Fm(874)));
        assert_eq!(validate_frequency("108.0"), Ok(Frequency::Fm(1080)));
        assert_matches!(validate_frequency("87.3"), Err(ValidationError::Frequency(_)));
        assert_matches!(validate_frequency("108.1"), Err(ValidationError::Frequency(_)));
    }

    #[test]
    fn test_am_frequency_truncates() {
        assert_eq!(validate_frequency("1010"), Ok(Frequency::Am(1010)));
        assert_eq!(validate_frequency("530"), Ok(Frequency::Am(530)));
        assert_eq!(validate_frequency("1709.9"), Ok(Frequency::Am(1709)));
        assert_eq!(validate_frequency("1710"), Ok(Frequency::Am(1710)));
    }

    #[test]
    fn test_frequency_rejections_name_the_input() {
        let err = validate_frequency("abc").unwrap_err();
        assert_eq!(err.to_string(), "Frequency not valid: abc");

        assert_matches!(validate_frequency("200"), Err(ValidationError::Frequency(s)) if s == "200");
        assert_matches!(validate_frequency(""), Err(ValidationError::Frequency(_)));
        assert_matches!(validate_frequency("nan"), Err(ValidationError::Frequency(_)));
        assert_matches!(validate_frequency("inf"), Err(ValidationError::Frequency(_)));
    }

    #[test]
    fn test_frequency_display_forms() {
        assert_eq!(Frequency::Fm(1015).to_string(), "101.5");
        assert_eq!(Frequency::Fm(880).to_string(), "88.0");
        assert_eq!(Frequency::Am(1010).to_string(), "1010");
        assert_eq!(Frequency::Fm(1015).status_text(), "101.5 FM");
        assert_eq!(Frequency::Am(1010).status_text(), "1010 AM");
        assert_eq!(Frequency::Am(1010).band(), Band::Am);
    }

    #[test]
    fn test_volume_bounds() {
        assert_eq!(validate_volume("0"), Ok(0));
        assert_eq!(validate_volume("100"), Ok(100));
        assert_eq!(validate_volume("150"), Err(ValidationError::VolumeOutOfRange(150)));
        assert_eq!(validate_volume("-1"), Err(ValidationError::VolumeOutOfRange(-1)));
        assert_matches!(validate_volume("45.5"), Err(ValidationError::VolumeNotInteger(_)));
        assert_eq!(
            validate_volume("loud").unwrap_err().to_string(),
            "Volume not an integer: loud"
        );
    }

    #[test]
    fn test_sleep_bounds() {
        assert_eq!(validate_sleep("0"), Ok(0));
        assert_eq!(validate_sleep("90"), Ok(90));
        assert_eq!(validate_sleep("91"), Err(ValidationError::SleepOutOfRange(91)));
        assert_matches!(validate_sleep("soon"), Err(ValidationError::SleepNotInteger(_)));
        assert_eq!(check_sleep(-5), Err(ValidationError::SleepOutOfRange(-5)));
    }

    #[test]
    fn test_input_is_case_insensitive() {
        assert_eq!(validate_input("DVD", MAIN_INPUTS), Ok("dvd"));
        assert_eq!(validate_input("FM Tuner", MAIN_INPUTS), Ok("fm tuner"));
        assert_eq!(
            validate_input("xyz", MAIN_INPUTS).unwrap_err().to_string(),
            "Input not valid: xyz"
        );
    }

    #[test]
    fn test_zone2_inputs_allow_source_and_off() {
        assert_eq!(validate_input("Source", ZONE2_INPUTS), Ok("source"));
        assert_eq!(validate_input("off", ZONE2_INPUTS), Ok("off"));
        assert_matches!(validate_input("source", MAIN_INPUTS), Err(ValidationError::Input(_)));
        assert_matches!(validate_input("off", MAIN_INPUTS), Err(ValidationError::Input(_)));
    }

    #[test]
    fn test_mode_lookup() {
        assert_eq!(validate_mode("PLIIMovie", LISTENING_MODES), Ok("pliimovie"));
        assert_eq!(
            validate_mode("karaoke", LISTENING_MODES).unwrap_err().to_string(),
            "Listening mode not valid: karaoke"
        );
    }

    proptest! {
        #[test]
        fn prop_fm_band_accepted(f in 87.4f64..=108.0) {
            let freq = validate_frequency(&f.to_string()).unwrap();
            prop_assert_eq!(freq.band(), Band::Fm);
            prop_assert!((freq.value() - f).abs() <= 0.05 + f64::EPSILON * 1000.0);
        }

        #[test]
        fn prop_am_band_truncated(f in 530.0f64..=1710.0) {
            let freq = validate_frequency(&f.to_string()).unwrap();
            prop_assert_eq!(freq.band(), Band::Am);
            prop_assert!((freq.value() - f.floor()).abs() < f64::EPSILON);
        }

        #[test]
        fn prop_out_of_band_rejected(
            f in prop_oneof![-1.0e6f64..87.39, 108.01f64..529.99, 1710.01f64..1.0e6]
        ) {
            prop_assert!(validate_frequency(&f.to_string()).is_err());
        }

        #[test]
        fn prop_non_numeric_frequency_rejected(s in "[a-zA-Z ]{1,12}") {
            // "inf" and "nan" parse as floats but still land outside both bands.
            prop_assert!(validate_frequency(&s).is_err());
        }

        #[test]
        fn prop_volume_in_range_round_trips(v in 0i64..=100) {
            prop_assert_eq!(validate_volume(&v.to_string()).map(i64::from), Ok(v));
        }

        #[test]
        fn prop_volume_out_of_range_rejected(
            v in prop_oneof![i64::MIN..0i64, 101i64..=i64::MAX]
        ) {
            prop_assert_eq!(validate_volume(&v.to_string()), Err(ValidationError::VolumeOutOfRange(v)));
        }
    }
}
