use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::error::{NormalizeError, Result};

const UTC_INPUT_FORMAT: &str = "%Y.%m.%d %H:%M:%S";
const LOCAL_DATE_FORMAT: &str = "%Y/%m/%d";
const LOCAL_TIME_FORMAT: &str = "%H:%M:%S";

/// The zone local date/time fields are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    /// Whatever zone the host system is configured with
    #[default]
    System,
    /// An IANA zone, e.g. `America/New_York`
    Named(Tz),
}

impl LocalZone {
    pub fn parse(name: &str) -> Result<Self> {
        name.trim()
            .parse::<Tz>()
            .map(LocalZone::Named)
            .map_err(|e| NormalizeError::Config(format!("Unknown time zone '{}': {}", name, e)))
    }

    /// Render a UTC instant as (local date, local time) using the zone rules in
    /// force at that instant.
    pub fn render(&self, instant: &DateTime<Utc>) -> (String, String) {
        match self {
            LocalZone::System => split_local(instant.with_timezone(&Local)),
            LocalZone::Named(tz) => split_local(instant.with_timezone(tz)),
        }
    }
}

impl fmt::Display for LocalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalZone::System => f.write_str("system"),
            LocalZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

fn split_local<Z: TimeZone>(local: DateTime<Z>) -> (String, String)
where
    Z::Offset: fmt::Display,
{
    (
        local.format(LOCAL_DATE_FORMAT).to_string(),
        local.format(LOCAL_TIME_FORMAT).to_string(),
    )
}

/// Parse a PGN `UTCDate`/`UTCTime` pair (`YYYY.MM.DD`, `HH:MM:SS`) into a UTC instant
pub fn parse_utc(date: &str, time: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date.trim(), time.trim()), UTC_INPUT_FORMAT)
        .map_err(|e| NormalizeError::InvalidDateTime {
            date: date.to_string(),
            time: time.to_string(),
            reason: e.to_string(),
        })?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Convert a UTC date/time pair into `(YYYY/MM/DD, HH:MM:SS)` in the given zone
pub fn utc_to_local(date: &str, time: &str, zone: &LocalZone) -> Result<(String, String)> {
    let instant = parse_utc(date, time)?;
    Ok(zone.render(&instant))
}
