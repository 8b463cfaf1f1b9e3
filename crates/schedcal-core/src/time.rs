//! Date/time parsing and formatting for scraped event times.
//!
//! Start times go through a cascade, first match wins:
//!
//! 1. bare date (`2024-06-15`, `20240615`) - all-day
//! 2. ISO-like `2024-06-15T19:00:00Z` - read as wall-clock time in the
//!    resolved zone, the trailing `Z` is not honoured
//! 3. any other shape from [`parse_wall_clock`]
//! 4. a number - Unix timestamp
//!
//! End times are preceded by the duration rule and followed by a "now"
//! fallback. A bare end date is read as midnight, before the numeric step, so
//! `20240616` is a date and not a timestamp.

use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use tracing::{debug, warn};

use crate::zone::Zone;

static BARE_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})$").expect("Invalid bare date regex"));

static ISO_LIKE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("Invalid ISO-like regex")
});

static NUMERIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("Invalid numeric regex"));

static ORDINAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("Invalid ordinal regex"));

static DOTTED_MERIDIEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([ap])\.m\.?").expect("Invalid meridiem regex"));

static AT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:at|@)\s+").expect("Invalid 'at' regex"));

static DURATION_TERM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([+-])?\s*(\d+)\s*(weeks?|days?|hours?|hrs?|minutes?|mins?|seconds?|secs?)\b")
        .expect("Invalid duration regex")
});

/// Full date and time, after commas have been folded into spaces.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M%p",
    "%m/%d/%Y %H:%M",
    "%A %B %d %Y %I:%M %p",
    "%A %B %d %Y %I:%M%p",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %I:%M%p",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M",
    "%a %d %b %Y %H:%M:%S",
];

/// Date only, interpreted as midnight wall-clock time.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%A %B %d %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Date and time without a year; the current year in the zone is appended.
const YEARLESS_FORMATS: &[&str] = &[
    "%A %B %d %I:%M %p",
    "%A %B %d %I:%M%p",
    "%B %d %I:%M %p",
    "%B %d %I:%M%p",
    "%m/%d %I:%M %p",
];

/// Time of day only; today's date in the zone is used.
const TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M:%S", "%H:%M"];

/// A successfully parsed start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedStart {
    /// A bare date, midnight in the resolved zone.
    Date(DateTime<Tz>),
    /// A specific wall-clock time in the resolved zone.
    DateTime(DateTime<Tz>),
}

impl ParsedStart {
    /// Returns the instant regardless of variant.
    pub fn instant(&self) -> DateTime<Tz> {
        match self {
            Self::Date(dt) | Self::DateTime(dt) => *dt,
        }
    }

    /// Returns true for a bare date.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// Parses a start time in `zone`.
///
/// Returns `None` when no shape matches; the caller marks the event invalid.
pub fn parse_start(raw: &str, zone: &Zone, now: DateTime<Utc>) -> Option<ParsedStart> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_bare_date(value) {
        return localize(zone.tz(), date.and_time(NaiveTime::MIN)).map(ParsedStart::Date);
    }

    parse_zoned(value, zone.tz(), now).map(ParsedStart::DateTime)
}

/// Parses an end time in `zone`.
///
/// An empty `raw` with a configured `duration` and a known `start` yields
/// `start + duration` unless the sum overflows. Otherwise the start cascade
/// applies (a bare date is midnight, not all-day), and anything unparseable
/// becomes `now` in the zone.
pub fn parse_end(
    raw: &str,
    zone: &Zone,
    start: Option<DateTime<Tz>>,
    duration: Option<&str>,
    now: DateTime<Utc>,
) -> DateTime<Tz> {
    let value = raw.trim();

    if value.is_empty()
        && let (Some(start), Some(expr)) = (start, duration)
    {
        match parse_duration(expr) {
            Some(offset) => match start.checked_add_signed(offset) {
                Some(end) => return end,
                None => warn!(duration = %expr, "Duration overflows the start time"),
            },
            None => warn!(duration = %expr, "Unparseable duration expression"),
        }
    }

    if !value.is_empty()
        && let Some(end) = parse_zoned(value, zone.tz(), now)
    {
        return end;
    }

    debug!(endtime = %value, zone = %zone, "No usable end time, using current time");
    now.with_timezone(&zone.tz())
}

/// Formats an instant as `<zone>:<YYYYMMDD>` or `<zone>:<YYYYMMDDTHHMMSS>`.
pub fn format_instant(zone: &Zone, instant: &DateTime<Tz>, all_day: bool) -> String {
    let local = instant.with_timezone(&zone.tz());
    let stamp = if all_day {
        local.format("%Y%m%d")
    } else {
        local.format("%Y%m%dT%H%M%S")
    };
    format!("{}:{}", zone.name(), stamp)
}

/// Parses a human-readable offset such as `"2 hours"` or
/// `"1 hour 30 minutes"`.
///
/// Returns `None` when the expression contains no recognised term, has
/// leftover words other than `and`, or is out of range.
pub fn parse_duration(expr: &str) -> Option<Duration> {
    let mut total = Duration::zero();
    let mut matched = false;

    for caps in DURATION_TERM_REGEX.captures_iter(expr) {
        let amount: i64 = caps[2].parse().ok()?;
        let amount = if caps.get(1).is_some_and(|m| m.as_str() == "-") {
            -amount
        } else {
            amount
        };
        let unit = caps[3].to_ascii_lowercase();
        let term = if unit.starts_with('w') {
            Duration::try_weeks(amount)
        } else if unit.starts_with('d') {
            Duration::try_days(amount)
        } else if unit.starts_with('h') {
            Duration::try_hours(amount)
        } else if unit.starts_with('m') {
            Duration::try_minutes(amount)
        } else {
            Duration::try_seconds(amount)
        }?;
        total = total.checked_add(&term)?;
        matched = true;
    }

    let rest = DURATION_TERM_REGEX.replace_all(expr, "");
    let clean = rest
        .split(|c: char| c.is_whitespace() || c == ',')
        .all(|word| word.is_empty() || word.eq_ignore_ascii_case("and"));

    (matched && clean).then_some(total)
}

/// Parses wall-clock shapes that carry no zone of their own, plus RFC 3339 /
/// RFC 2822 strings whose explicit offset is honoured.
pub fn parse_wall_clock(raw: &str, tz: Tz, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&tz));
    }

    let normalized = normalize(raw);

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return localize(tz, naive);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, fmt) {
            return localize(tz, date.and_time(NaiveTime::MIN));
        }
    }

    let local_now = now.with_timezone(&tz);

    let with_year = format!("{} {}", normalized, local_now.year());
    for fmt in YEARLESS_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&with_year, &format!("{} %Y", fmt)) {
            return localize(tz, naive);
        }
    }

    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&normalized, fmt) {
            return localize(tz, local_now.date_naive().and_time(time));
        }
    }

    None
}

/// ISO-like, generic, bare date, then numeric.
fn parse_zoned(value: &str, tz: Tz, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
    if ISO_LIKE_REGEX.is_match(value) {
        return NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
            .ok()
            .and_then(|naive| localize(tz, naive));
    }

    if let Some(dt) = parse_wall_clock(value, tz, now) {
        return Some(dt);
    }

    if let Some(date) = parse_bare_date(value) {
        return localize(tz, date.and_time(NaiveTime::MIN));
    }

    if NUMERIC_REGEX.is_match(value) {
        return parse_timestamp(value).map(|dt| dt.with_timezone(&tz));
    }

    None
}

fn parse_bare_date(value: &str) -> Option<NaiveDate> {
    let caps = BARE_DATE_REGEX.captures(value)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match value.split_once('.') {
        None => DateTime::from_timestamp(value.parse().ok()?, 0),
        Some((whole, frac)) => {
            let secs: i64 = whole.parse().ok()?;
            let frac: f64 = format!("0.{}", frac).parse().ok()?;
            let nanos = ((frac * 1_000_000_000.0).round() as u32).min(999_999_999);
            // The fraction extends away from zero: -1.5 is 1.5s before the epoch.
            if whole.starts_with('-') && nanos > 0 {
                DateTime::from_timestamp(secs.checked_sub(1)?, 1_000_000_000 - nanos)
            } else {
                DateTime::from_timestamp(secs, nanos)
            }
        }
    }
}

/// Maps a wall-clock time onto `tz`. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward one hour.
fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

/// Folds commas, `at`, ordinals and dotted meridiems so the format tables
/// stay small.
fn normalize(raw: &str) -> String {
    let s = raw.replace(',', " ");
    let s = AT_REGEX.replace_all(&s, " ");
    let s = ORDINAL_REGEX.replace_all(&s, "$1");
    let s = DOTTED_MERIDIEM_REGEX.replace_all(&s, "${1}M");
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::{resolve_timezone, AbbreviationTable};

    fn zone(raw: &str) -> Zone {
        resolve_timezone(raw, &AbbreviationTable::default()).zone
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn local(zone: &Zone, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        zone.tz().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    mod start {
        use super::*;

        #[test]
        fn bare_date_is_all_day() {
            let z = zone("ET");
            for raw in ["2024-06-15", "20240615"] {
                let parsed = parse_start(raw, &z, now()).unwrap();
                assert!(parsed.is_all_day(), "raw = {}", raw);
                assert_eq!(parsed.instant(), local(&z, 2024, 6, 15, 0, 0));
            }
        }

        #[test]
        fn iso_like_ignores_utc_marker() {
            let z = zone("ET");
            let parsed = parse_start("2024-06-15T19:00:00Z", &z, now()).unwrap();
            assert!(!parsed.is_all_day());
            assert_eq!(parsed.instant(), local(&z, 2024, 6, 15, 19, 0));
            assert_eq!(
                format_instant(&z, &parsed.instant(), false),
                "EST:20240615T190000"
            );
        }

        #[test]
        fn generic_shapes() {
            let z = zone("CT");
            let expected = local(&z, 2024, 6, 15, 19, 0);
            for raw in [
                "2024-06-15 19:00",
                "2024-06-15 19:00:00",
                "6/15/2024 7:00 PM",
                "06/15/2024 7:00pm",
                "June 15, 2024 7:00 PM",
                "Saturday, June 15, 2024 at 7:00 PM",
                "Jun 15th, 2024 7:00 p.m.",
            ] {
                let parsed = parse_start(raw, &z, now());
                assert_eq!(
                    parsed,
                    Some(ParsedStart::DateTime(expected)),
                    "raw = {}",
                    raw
                );
            }
        }

        #[test]
        fn rfc3339_offset_is_honoured() {
            let z = zone("PT");
            let parsed = parse_start("2024-06-15T19:00:00-04:00", &z, now()).unwrap();
            assert_eq!(parsed.instant(), local(&z, 2024, 6, 15, 16, 0));
        }

        #[test]
        fn yearless_uses_current_year() {
            let z = zone("ET");
            let parsed = parse_start("June 15 7:30 PM", &z, now()).unwrap();
            assert_eq!(parsed.instant(), local(&z, 2024, 6, 15, 19, 30));
        }

        #[test]
        fn time_only_uses_today_in_zone() {
            let z = zone("ET");
            let parsed = parse_start("7:30 PM", &z, now()).unwrap();
            assert_eq!(parsed.instant(), local(&z, 2024, 3, 1, 19, 30));
        }

        #[test]
        fn prose_date_is_midnight_not_all_day() {
            let z = zone("ET");
            let parsed = parse_start("June 15, 2024", &z, now()).unwrap();
            assert!(!parsed.is_all_day());
            assert_eq!(parsed.instant(), local(&z, 2024, 6, 15, 0, 0));
        }

        #[test]
        fn numeric_is_unix_timestamp() {
            let z = zone("ET");
            // 2024-06-15T23:00:00Z == 19:00 EDT
            let parsed = parse_start("1718492400", &z, now()).unwrap();
            assert_eq!(parsed.instant(), local(&z, 2024, 6, 15, 19, 0));
        }

        #[test]
        fn fractional_timestamps() {
            let z = zone("ET");
            let parsed = parse_start("1718492400.25", &z, now()).unwrap();
            assert_eq!(
                parsed.instant(),
                local(&z, 2024, 6, 15, 19, 0) + Duration::milliseconds(250)
            );

            let before_epoch = parse_start("-1.5", &z, now()).unwrap();
            assert_eq!(
                before_epoch.instant().with_timezone(&Utc),
                DateTime::from_timestamp(0, 0).unwrap() - Duration::milliseconds(1500)
            );
            let just_before = parse_start("-0.5", &z, now()).unwrap();
            assert_eq!(just_before.instant().timestamp_millis(), -500);
        }

        #[test]
        fn spring_forward_gap_moves_ahead_one_hour() {
            let z = zone("ET");
            // 02:30 does not exist on 2024-03-10 in New York.
            let parsed = parse_start("2024-03-10 02:30", &z, now()).unwrap();
            assert_eq!(
                parsed.instant().with_timezone(&Utc),
                Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap()
            );
            assert_eq!(
                format_instant(&z, &parsed.instant(), false),
                "EST:20240310T033000"
            );
        }

        #[test]
        fn fall_back_overlap_takes_earlier_instant() {
            let z = zone("ET");
            // 01:30 happens twice on 2024-11-03; the EDT one comes first.
            let parsed = parse_start("2024-11-03 01:30", &z, now()).unwrap();
            assert_eq!(
                parsed.instant().with_timezone(&Utc),
                Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap()
            );
        }

        #[test]
        fn garbage_is_none() {
            let z = zone("ET");
            assert_eq!(parse_start("", &z, now()), None);
            assert_eq!(parse_start("sometime soon", &z, now()), None);
            assert_eq!(parse_start("7:00 PM ET", &z, now()), None);
        }
    }

    mod end {
        use super::*;

        #[test]
        fn duration_from_start() {
            let z = zone("ET");
            let start = local(&z, 2024, 6, 15, 19, 0);
            let end = parse_end("", &z, Some(start), Some("2 hours"), now());
            assert_eq!(end, start + Duration::hours(2));
        }

        #[test]
        fn explicit_value_wins_over_duration() {
            let z = zone("ET");
            let start = local(&z, 2024, 6, 15, 19, 0);
            let end = parse_end("2024-06-15 21:30", &z, Some(start), Some("2 hours"), now());
            assert_eq!(end, local(&z, 2024, 6, 15, 21, 30));
        }

        #[test]
        fn iso_like_end() {
            let z = zone("ET");
            let end = parse_end("2024-06-15T22:00:00Z", &z, None, None, now());
            assert_eq!(end, local(&z, 2024, 6, 15, 22, 0));
        }

        #[test]
        fn falls_back_to_now() {
            let z = zone("ET");
            let end = parse_end("", &z, None, Some("2 hours"), now());
            assert_eq!(end, now().with_timezone(&z.tz()));

            let end = parse_end("whenever", &z, None, None, now());
            assert_eq!(end, now().with_timezone(&z.tz()));
        }

        #[test]
        fn compact_date_end_is_not_a_timestamp() {
            let z = zone("ET");
            let start = parse_start("20240615", &z, now()).unwrap();
            assert!(start.is_all_day());

            let end = parse_end("20240616", &z, Some(start.instant()), None, now());
            assert_eq!(end, local(&z, 2024, 6, 16, 0, 0));
            assert!(end > start.instant());
            assert_eq!(format_instant(&z, &end, true), "EST:20240616");
        }

        #[test]
        fn overflowing_duration_falls_back_to_now() {
            let z = zone("ET");
            let start = local(&z, 2024, 6, 15, 0, 0);
            let end = parse_end("", &z, Some(start), Some("100000000 days"), now());
            assert_eq!(end, now().with_timezone(&z.tz()));

            let end = parse_end("", &z, Some(start), Some("99999999999 weeks"), now());
            assert_eq!(end, now().with_timezone(&z.tz()));
        }

        #[test]
        fn bad_duration_falls_back_to_now() {
            let z = zone("ET");
            let start = local(&z, 2024, 6, 15, 19, 0);
            let end = parse_end("", &z, Some(start), Some("a while"), now());
            assert_eq!(end, now().with_timezone(&z.tz()));
        }
    }

    mod duration {
        use super::*;

        #[test]
        fn simple_terms() {
            assert_eq!(parse_duration("2 hours"), Some(Duration::hours(2)));
            assert_eq!(parse_duration("1 hour"), Some(Duration::hours(1)));
            assert_eq!(parse_duration("90 mins"), Some(Duration::minutes(90)));
            assert_eq!(parse_duration("+3 days"), Some(Duration::days(3)));
            assert_eq!(parse_duration("1 week"), Some(Duration::weeks(1)));
        }

        #[test]
        fn compound_terms() {
            assert_eq!(
                parse_duration("1 hour 30 minutes"),
                Some(Duration::minutes(90))
            );
            assert_eq!(
                parse_duration("2 hours and 15 minutes"),
                Some(Duration::minutes(135))
            );
            assert_eq!(
                parse_duration("3 hours -30 minutes"),
                Some(Duration::minutes(150))
            );
        }

        #[test]
        fn rejects_noise() {
            assert_eq!(parse_duration(""), None);
            assert_eq!(parse_duration("soon"), None);
            assert_eq!(parse_duration("2 hours maybe"), None);
        }

        #[test]
        fn out_of_range_is_none() {
            assert_eq!(parse_duration("99999999999 weeks"), None);
            assert_eq!(parse_duration("99999999999999999999 seconds"), None);
            assert_eq!(parse_duration("100000000 days 100000000 days"), None);
            assert_eq!(parse_duration("100000000 days"), Some(Duration::days(100_000_000)));
        }
    }

    mod format {
        use super::*;

        #[test]
        fn all_day_uses_date_only() {
            let z = zone("PT");
            let dt = local(&z, 2024, 12, 31, 0, 0);
            assert_eq!(format_instant(&z, &dt, true), "PST:20241231");
            assert_eq!(format_instant(&z, &dt, false), "PST:20241231T000000");
        }

        #[test]
        fn iana_name_when_no_abbreviation() {
            let z = zone("Europe/Berlin");
            let dt = local(&z, 2024, 6, 15, 9, 5);
            assert_eq!(format_instant(&z, &dt, false), "Europe/Berlin:20240615T090500");
        }
    }
}
