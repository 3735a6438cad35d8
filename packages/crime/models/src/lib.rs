#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime record types and the fixed categorical domains they are built from.
//!
//! The source datasets encode the report weekday and hour as text labels.
//! Both domains are closed: exactly the 7 Spanish day names and the 24 hour
//! labels `"0"`..`"23"`. Anything outside those sets is rejected with a
//! [`ValidationError`] at ingestion time instead of being coerced or dropped,
//! and the calendar/clock ordering lives on the types themselves rather than
//! on whatever order the labels happen to sort in.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Day of the week, ordered Monday through Sunday.
///
/// Labels match the uppercase Spanish day names used by the source data.
/// The accented names (`MIÉRCOLES`, `SÁBADO`) are canonical; the accent-less
/// spellings are accepted on input and normalized.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    /// Monday
    Lunes,
    /// Tuesday
    Martes,
    /// Wednesday
    #[serde(rename = "MIÉRCOLES", alias = "MIERCOLES")]
    #[strum(to_string = "MIÉRCOLES", serialize = "MIERCOLES")]
    Miercoles,
    /// Thursday
    Jueves,
    /// Friday
    Viernes,
    /// Saturday
    #[serde(rename = "SÁBADO", alias = "SABADO")]
    #[strum(to_string = "SÁBADO", serialize = "SABADO")]
    Sabado,
    /// Sunday
    Domingo,
}

impl Weekday {
    /// Number of weekdays.
    pub const COUNT: usize = 7;

    /// Returns all weekdays in calendar order, Monday first.
    #[must_use]
    pub const fn all() -> &'static [Self; Self::COUNT] {
        &[
            Self::Lunes,
            Self::Martes,
            Self::Miercoles,
            Self::Jueves,
            Self::Viernes,
            Self::Sabado,
            Self::Domingo,
        ]
    }

    /// Returns this weekday's position in calendar order (Monday = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parses a weekday from a source data label.
    ///
    /// Labels are trimmed and uppercased before matching, so `"lunes"` and
    /// `"MIERCOLES"` both parse.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Weekday`] if the label is not one of the
    /// 7 day names.
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        label
            .trim()
            .to_uppercase()
            .parse()
            .map_err(|_| ValidationError::Weekday {
                label: label.to_owned(),
            })
    }
}

/// Hour of the day, validated to the 0..=23 range.
///
/// The source data carries hours as the labels `"0"`..`"23"`; this type is
/// the parsed, range-checked form. Values serialize as plain numbers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8")]
#[serde(into = "u8")]
pub struct Hour(u8);

impl Hour {
    /// Number of hours in a day.
    pub const COUNT: usize = 24;

    /// Creates an hour from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Hour`] if the value is not in 0..=23.
    pub fn from_value(value: u8) -> Result<Self, ValidationError> {
        if value < 24 {
            Ok(Self(value))
        } else {
            Err(ValidationError::Hour {
                label: value.to_string(),
            })
        }
    }

    /// Parses an hour from a source data label (`"0"`..`"23"`).
    ///
    /// The domain check is on the value, not the spelling: `"07"` parses as
    /// hour 7, while `"24"`, `"-1"`, and non-numeric labels are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Hour`] if the label does not parse to a
    /// value in 0..=23.
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        label
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|value| Self::from_value(value).ok())
            .ok_or_else(|| ValidationError::Hour {
                label: label.to_owned(),
            })
    }

    /// Returns the numeric hour value (0..=23).
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns this hour's position in clock order (same as its value).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns all hours in clock order, 0 first.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl TryFrom<u8> for Hour {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Hour> for u8 {
    fn from(hour: Hour) -> Self {
        hour.0
    }
}

impl std::fmt::Display for Hour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Hour {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Error returned when a source label falls outside a fixed categorical
/// domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Weekday label is not one of the 7 Spanish day names.
    #[error("invalid weekday label {label:?}: expected one of LUNES..DOMINGO")]
    Weekday {
        /// The rejected label.
        label: String,
    },

    /// Hour label is not in the `"0"`..`"23"` domain.
    #[error("invalid hour label {label:?}: expected \"0\"..\"23\"")]
    Hour {
        /// The rejected label.
        label: String,
    },
}

/// One reported incident, aggregated to a count.
///
/// Immutable once loaded; every derived view is recomputed from these
/// records rather than mutating them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeRecord {
    /// Neighborhood identifier, matching the boundary dataset's key.
    pub neighborhood: String,
    /// Crime type label (open domain, taken from the source as-is).
    pub crime_type: String,
    /// Year the incident was reported.
    pub year: i32,
    /// Day of week the incident was reported.
    pub weekday: Weekday,
    /// Hour of day the incident was reported.
    pub hour: Hour,
    /// Number of incidents this row aggregates.
    pub count: u64,
}
