//! Relative time windows.
//!
//! A [`Timeframe`] is the canonical `<number><unit>` form ("2h", "30m", "7d",
//! "1w") used throughout the system: parsed from user text, carried on
//! intents, sent to the monitoring API as an absolute range, and rendered
//! back as human-readable text.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]+)([mhdw])$").expect("valid timeframe regex"));

/// Error returned when a timeframe string is not in canonical form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeframeError {
    #[error("invalid timeframe format: '{0}' (expected <number><unit>, e.g. \"2h\", \"30m\", \"7d\", \"1w\")")]
    InvalidFormat(String),
}

/// Unit of a relative time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'm' => Some(TimeUnit::Minutes),
            'h' => Some(TimeUnit::Hours),
            'd' => Some(TimeUnit::Days),
            'w' => Some(TimeUnit::Weeks),
            _ => None,
        }
    }

    /// Canonical single-letter suffix.
    pub fn suffix(self) -> char {
        match self {
            TimeUnit::Minutes => 'm',
            TimeUnit::Hours => 'h',
            TimeUnit::Days => 'd',
            TimeUnit::Weeks => 'w',
        }
    }

    /// Singular unit word for human-readable rendering.
    pub fn word(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minute",
            TimeUnit::Hours => "hour",
            TimeUnit::Days => "day",
            TimeUnit::Weeks => "week",
        }
    }
}

/// A relative time window such as "2h" or "30m".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe {
    value: u32,
    unit: TimeUnit,
}

impl Timeframe {
    /// The system-wide default window: the last two hours.
    pub const DEFAULT: Timeframe = Timeframe {
        value: 2,
        unit: TimeUnit::Hours,
    };

    pub fn new(value: u32, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// Parse a canonical `<number><unit>` string (unit is case-insensitive).
    pub fn parse(s: &str) -> Result<Self, TimeframeError> {
        let caps = CANONICAL_RE
            .captures(s.trim())
            .ok_or_else(|| TimeframeError::InvalidFormat(s.to_string()))?;
        let value: u32 = caps[1]
            .parse()
            .map_err(|_| TimeframeError::InvalidFormat(s.to_string()))?;
        let unit = caps[2]
            .chars()
            .next()
            .and_then(TimeUnit::from_char)
            .ok_or_else(|| TimeframeError::InvalidFormat(s.to_string()))?;
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The window length as a chrono duration.
    pub fn duration(&self) -> Duration {
        let n = i64::from(self.value);
        match self.unit {
            TimeUnit::Minutes => Duration::minutes(n),
            TimeUnit::Hours => Duration::hours(n),
            TimeUnit::Days => Duration::days(n),
            TimeUnit::Weeks => Duration::weeks(n),
        }
    }

    /// Absolute `(from, to)` instants for a window ending at `now`.
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.duration(), now)
    }

    /// Human-readable rendering, e.g. "Last 2 hours" or "Last 1 week".
    ///
    /// Lossy by design: the canonical form is not recoverable from it.
    pub fn humanize(&self) -> String {
        if self.value == 1 {
            format!("Last 1 {}", self.unit.word())
        } else {
            format!("Last {} {}s", self.value, self.unit.word())
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::parse(s)
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
