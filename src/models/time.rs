use chrono::{NaiveTime, Timelike};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Time-of-day canonicalized to `HH:MM:SS`.
///
/// Slot times arrive from clients and stored rows in mixed granularities
/// (`"09:00"` vs `"09:00:00"`); equality and cell-key derivation must always
/// use the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

/// Error produced when a time string cannot be canonicalized.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid time of day '{value}': expected HH:MM or HH:MM:SS")]
pub struct TimeParseError {
    pub value: String,
}

impl TimeOfDay {
    /// Parse a time string in `HH:MM` or `HH:MM:SS` form.
    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(Self)
            .map_err(|_| TimeParseError {
                value: value.to_string(),
            })
    }

    /// Build from an hour/minute/second triple.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(Self)
    }

    /// Underlying chrono value.
    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Seconds since midnight.
    pub fn seconds_from_midnight(&self) -> u32 {
        self.0.num_seconds_from_midnight()
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(value: NaiveTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw).map_err(D::Error::custom)
    }
}
