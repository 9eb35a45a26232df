//! Time formatting in the fixed reference zone (America/Phoenix, UTC-07:00 all year).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

pub const ZONE_LABEL: &str = "MST";
pub const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static REFERENCE_ZONE: Lazy<FixedOffset> = Lazy::new(|| FixedOffset::west_opt(7 * 3600).unwrap());

/// Formats an epoch second as `YYYY-MM-DD HH:MM:SS MST`.
pub fn format_datetime(epoch_second: i64) -> String {
    REFERENCE_ZONE
        .timestamp_opt(epoch_second, 0)
        .earliest()
        .map(|datetime| format!("{} {}", datetime.format(DATETIME_FORMAT), ZONE_LABEL))
        .unwrap_or(format!("1970-01-01 00:00:00 {}", ZONE_LABEL))
}

/// Compact stamp embedded in ledger file names.
pub fn file_stamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&*REFERENCE_ZONE)
        .format(STAMP_FORMAT)
        .to_string()
}

fn parse_naive_stamp(stamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}

/// Epoch second of a file stamp, read in the same zone it was written in.
pub fn stamp_to_epoch(stamp: &str) -> Option<i64> {
    parse_naive_stamp(stamp)
        .and_then(|naive| REFERENCE_ZONE.from_local_datetime(&naive).single())
        .map(|datetime| datetime.timestamp())
}

/// Human readable form of a file stamp, e.g. `2026-02-01 09:30:00 MST`.
pub fn stamp_label(stamp: &str) -> Option<String> {
    parse_naive_stamp(stamp)
        .map(|naive| format!("{} {}", naive.format(DATETIME_FORMAT), ZONE_LABEL))
}

/// Epoch second of midnight UTC on the given date.
pub fn utc_day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().timestamp())
        .unwrap_or(0)
}
