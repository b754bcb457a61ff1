//! Timezone used for rendered timestamps.

use super::loader::ConfigError;
use crate::model::Timestamp;
use chrono::{FixedOffset, Local, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// `Mon 03:04pm`
const PREFIX_FORMAT: &str = "%a %I:%M%P";

/// Where rendered timestamps are localized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneSetting {
    /// The machine's local timezone.
    Local,
    /// Coordinated Universal Time.
    Utc,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
    /// A named IANA zone such as `America/New_York`, following its
    /// daylight-saving rules.
    Named(Tz),
}

impl TimeZoneSetting {
    /// Format `ts` as `"<Weekday> <hh:mm><am|pm>"` in this timezone.
    pub fn format_prefix(self, ts: Timestamp) -> String {
        let utc = ts.to_datetime();
        match self {
            TimeZoneSetting::Local => utc.with_timezone(&Local).format(PREFIX_FORMAT).to_string(),
            TimeZoneSetting::Utc => utc.with_timezone(&Utc).format(PREFIX_FORMAT).to_string(),
            TimeZoneSetting::Fixed(offset) => {
                utc.with_timezone(&offset).format(PREFIX_FORMAT).to_string()
            }
            TimeZoneSetting::Named(zone) => {
                utc.with_timezone(&zone).format(PREFIX_FORMAT).to_string()
            }
        }
    }
}

impl FromStr for TimeZoneSetting {
    type Err = ConfigError;

    /// Accepts `local`, `UTC`/`Z`, an IANA name like `Europe/Paris`, or an
    /// offset: `+05:30`, `-0800`, `+02`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTimezone(raw.to_string());
        let trimmed = raw.trim();

        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(TimeZoneSetting::Local),
            "utc" | "z" | "gmt" => return Ok(TimeZoneSetting::Utc),
            _ => {}
        }

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => {
                return trimmed
                    .parse::<Tz>()
                    .map(TimeZoneSetting::Named)
                    .map_err(|_| invalid());
            }
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let (hours, minutes) = match digits.len() {
            1 | 2 => (digits.as_str(), "0"),
            4 => digits.split_at(2),
            _ => return Err(invalid()),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(TimeZoneSetting::Fixed)
            .ok_or_else(invalid)
    }
}
