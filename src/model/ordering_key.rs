//! Ordering keys for the log store.
//!
//! Remote timestamps arrive as fixed-point strings (`"1712345678.000200"`).
//! They are parsed into integer microseconds so that ordering never depends
//! on floating-point precision.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// A fixed-point event timestamp with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Build a timestamp from whole microseconds since the Unix epoch.
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Microseconds since the Unix epoch.
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Convert from a UTC datetime, truncating below microseconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_micros())
    }

    /// Convert to a UTC datetime.
    pub fn to_datetime(self) -> DateTime<Utc> {
        let secs = self.0.div_euclid(MICROS_PER_SECOND);
        let nanos = (self.0.rem_euclid(MICROS_PER_SECOND) * 1_000) as u32;
        Utc.timestamp_opt(secs, nanos)
            .single()
            .unwrap_or_default()
    }

    /// The timestamp one microsecond later.
    pub fn next_micro(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.0.div_euclid(MICROS_PER_SECOND),
            self.0.rem_euclid(MICROS_PER_SECOND)
        )
    }
}

/// Error for timestamp strings that are not `<secs>[.<fraction>]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp: {0:?}")]
pub struct InvalidTimestamp(pub String);

impl FromStr for Timestamp {
    type Err = InvalidTimestamp;

    /// Parse `"<secs>"` or `"<secs>.<fraction>"`.
    ///
    /// Fractions longer than six digits are truncated, shorter ones are
    /// right-padded, so `"1.5"` is 1.500000 seconds.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTimestamp(raw.to_string());
        let (secs, frac) = raw.split_once('.').unwrap_or((raw, ""));

        if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let secs: i64 = secs.parse().map_err(|_| invalid())?;
        let mut micros: i64 = 0;
        for digit in frac.bytes().chain(std::iter::repeat(b'0')).take(6) {
            micros = micros * 10 + i64::from(digit - b'0');
        }

        secs.checked_mul(MICROS_PER_SECOND)
            .and_then(|s| s.checked_add(micros))
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// First sequence number of the range reserved for client status lines.
///
/// Remote messages use sequences below it, so a status line never shares a
/// key with a remote message and sorts after any message at the same
/// timestamp.
pub const SYSTEM_SEQUENCE_BASE: u32 = 1 << 31;

/// Sort key for one physical log line.
///
/// Ordered lexicographically by `(primary, sequence)`. A logical event that
/// reflows into N lines gets N keys sharing `primary` with sequences
/// `0..N`, so its lines stay contiguous and in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderingKey {
    primary: Timestamp,
    sequence: u32,
}

impl OrderingKey {
    /// Key of the first physical line of an event.
    pub fn first(primary: Timestamp) -> Self {
        Self {
            primary,
            sequence: 0,
        }
    }

    /// Key of the following physical line of the same event.
    pub fn next(self) -> Self {
        Self {
            primary: self.primary,
            sequence: self.sequence + 1,
        }
    }

    /// Key of the first physical line of a client status line at `primary`.
    pub fn system(primary: Timestamp) -> Self {
        Self {
            primary,
            sequence: SYSTEM_SEQUENCE_BASE,
        }
    }

    /// Whether this key lies in the status-line range.
    pub fn is_system(self) -> bool {
        self.sequence >= SYSTEM_SEQUENCE_BASE
    }

    /// The event timestamp this key belongs to.
    pub fn primary(self) -> Timestamp {
        self.primary
    }

    /// Position of the line within its event.
    pub fn sequence(self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.primary, self.sequence)
    }
}
