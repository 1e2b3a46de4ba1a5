//! Month keys as the original data files spell them.
//!
//! Two spellings are historical accidents that live in user data forever:
//! `"FEBURARY"` (sic) and `"AUGUST "` (trailing space). The enum round-trips
//! those spellings on the wire while [`MonthKey::parse_lenient`] also accepts
//! the corrected forms.

use serde::{Deserialize, Serialize};

/// A calendar month keyed the way expense rows store it.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MonthKey {
    #[default]
    #[serde(rename = "JANUARY")]
    January,
    #[serde(rename = "FEBURARY")]
    February,
    #[serde(rename = "MARCH")]
    March,
    #[serde(rename = "APRIL")]
    April,
    #[serde(rename = "MAY")]
    May,
    #[serde(rename = "JUNE")]
    June,
    #[serde(rename = "JULY")]
    July,
    #[serde(rename = "AUGUST ")]
    August,
    #[serde(rename = "SEPTEMBER")]
    September,
    #[serde(rename = "OCTOBER")]
    October,
    #[serde(rename = "NOVEMBER")]
    November,
    #[serde(rename = "DECEMBER")]
    December,
}

serde_plain::derive_display_from_serialize!(MonthKey);
serde_plain::derive_fromstr_from_deserialize!(MonthKey);

impl MonthKey {
    /// Converts a month number (1-12) into a `MonthKey`.
    pub fn from_number(n: u32) -> Option<MonthKey> {
        match n {
            1 => Some(MonthKey::January),
            2 => Some(MonthKey::February),
            3 => Some(MonthKey::March),
            4 => Some(MonthKey::April),
            5 => Some(MonthKey::May),
            6 => Some(MonthKey::June),
            7 => Some(MonthKey::July),
            8 => Some(MonthKey::August),
            9 => Some(MonthKey::September),
            10 => Some(MonthKey::October),
            11 => Some(MonthKey::November),
            12 => Some(MonthKey::December),
            _ => None,
        }
    }

    /// The month number, 1-12.
    pub fn number(&self) -> u32 {
        match self {
            MonthKey::January => 1,
            MonthKey::February => 2,
            MonthKey::March => 3,
            MonthKey::April => 4,
            MonthKey::May => 5,
            MonthKey::June => 6,
            MonthKey::July => 7,
            MonthKey::August => 8,
            MonthKey::September => 9,
            MonthKey::October => 10,
            MonthKey::November => 11,
            MonthKey::December => 12,
        }
    }

    /// Parses a month key, accepting both the stored spellings and the
    /// corrected ones (`"FEBRUARY"`, `"AUGUST"` without the trailing space).
    pub fn parse_lenient(value: &str) -> Option<MonthKey> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed {
            "FEBRUARY" => Some(MonthKey::February),
            "AUGUST" => Some(MonthKey::August),
            other => other.parse().ok(),
        }
    }

    /// Human-readable month name, e.g. `"February"`.
    pub fn label(&self) -> &'static str {
        match self {
            MonthKey::January => "January",
            MonthKey::February => "February",
            MonthKey::March => "March",
            MonthKey::April => "April",
            MonthKey::May => "May",
            MonthKey::June => "June",
            MonthKey::July => "July",
            MonthKey::August => "August",
            MonthKey::September => "September",
            MonthKey::October => "October",
            MonthKey::November => "November",
            MonthKey::December => "December",
        }
    }

    /// Three-letter month name, e.g. `"Feb"`.
    pub fn short_label(&self) -> &'static str {
        &self.label()[..3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_spellings_round_trip() {
        assert_eq!(MonthKey::February.to_string(), "FEBURARY");
        assert_eq!(MonthKey::August.to_string(), "AUGUST ");
        assert_eq!("FEBURARY".parse::<MonthKey>().unwrap(), MonthKey::February);
        assert_eq!("AUGUST ".parse::<MonthKey>().unwrap(), MonthKey::August);
    }

    #[test]
    fn test_parse_lenient_accepts_corrected_spellings() {
        assert_eq!(MonthKey::parse_lenient("FEBRUARY"), Some(MonthKey::February));
        assert_eq!(MonthKey::parse_lenient("AUGUST"), Some(MonthKey::August));
        assert_eq!(MonthKey::parse_lenient(" MARCH "), Some(MonthKey::March));
        assert_eq!(MonthKey::parse_lenient(""), None);
        assert_eq!(MonthKey::parse_lenient("SMARCH"), None);
    }

    #[test]
    fn test_number_round_trip() {
        for n in 1..=12 {
            let key = MonthKey::from_number(n).unwrap();
            assert_eq!(key.number(), n);
        }
        assert_eq!(MonthKey::from_number(0), None);
        assert_eq!(MonthKey::from_number(13), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(MonthKey::February.label(), "February");
        assert_eq!(MonthKey::August.short_label(), "Aug");
    }
}
