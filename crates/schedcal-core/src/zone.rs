//! Timezone resolution.
//!
//! Schedule pages announce zones in many shapes: `ET`, `EST`, `America/New_York`,
//! or `TBD` when the start time has not been fixed yet. [`resolve_timezone`]
//! maps any of these onto a [`Zone`] and never fails; unknown input falls back
//! to [`DEFAULT_TZ`].
//!
//! Abbreviation lookup goes through the [`ZoneResolver`] trait so tests and
//! callers can supply their own table instead of relying on the host's
//! timezone database.

use std::fmt;
use std::sync::LazyLock;

use chrono_tz::Tz;
use regex::Regex;
use tracing::debug;

/// Zone used when nothing else matches.
pub const DEFAULT_TZ: Tz = chrono_tz::America::New_York;

/// Raw timezone value that marks an event whose time is not known yet.
pub const TBD: &str = "TBD";

static REGION_CITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_]+(?:/[A-Za-z0-9_+\-]+)+$").expect("Invalid region/city regex")
});

/// Maps timezone abbreviations to canonical zones and back.
pub trait ZoneResolver: Send + Sync {
    /// Returns the first canonical zone for an abbreviation such as `EST`.
    fn lookup(&self, abbreviation: &str) -> Option<Tz>;

    /// Returns the preferred abbreviation used to label `tz`, if the table
    /// knows one.
    fn abbreviation(&self, tz: Tz) -> Option<&'static str>;
}

/// Abbreviation table with an ordered list of candidate zones per entry.
///
/// Lookups return the first zone of the first matching entry. Reverse
/// lookups return the first entry whose primary zone is `tz`, so standard-time
/// abbreviations are listed before their daylight counterparts.
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    entries: Vec<(&'static str, Vec<Tz>)>,
}

impl AbbreviationTable {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder method to append an entry.
    pub fn with_entry(mut self, abbreviation: &'static str, zones: Vec<Tz>) -> Self {
        self.entries.push((abbreviation, zones));
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AbbreviationTable {
    /// US abbreviations plus UTC/GMT.
    fn default() -> Self {
        use chrono_tz::America;
        use chrono_tz::Etc;
        use chrono_tz::Pacific;

        Self::empty()
            .with_entry(
                "EST",
                vec![
                    America::New_York,
                    America::Detroit,
                    America::Indiana::Indianapolis,
                    America::Toronto,
                ],
            )
            .with_entry("EDT", vec![America::New_York, America::Detroit, America::Toronto])
            .with_entry("CST", vec![America::Chicago, America::Winnipeg, America::Mexico_City])
            .with_entry("CDT", vec![America::Chicago, America::Winnipeg])
            .with_entry("MST", vec![America::Denver, America::Phoenix, America::Edmonton])
            .with_entry("MDT", vec![America::Denver, America::Edmonton])
            .with_entry("PST", vec![America::Los_Angeles, America::Vancouver])
            .with_entry("PDT", vec![America::Los_Angeles, America::Vancouver])
            .with_entry("AKST", vec![America::Anchorage])
            .with_entry("AKDT", vec![America::Anchorage])
            .with_entry("HST", vec![Pacific::Honolulu])
            .with_entry("UTC", vec![Etc::UTC])
            .with_entry("GMT", vec![Etc::GMT])
    }
}

impl ZoneResolver for AbbreviationTable {
    fn lookup(&self, abbreviation: &str) -> Option<Tz> {
        self.entries
            .iter()
            .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation))
            .and_then(|(_, zones)| zones.first().copied())
    }

    fn abbreviation(&self, tz: Tz) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, zones)| zones.first() == Some(&tz))
            .map(|(abbr, _)| *abbr)
    }
}

/// A resolved zone together with the name used in formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    tz: Tz,
    name: &'static str,
}

impl Zone {
    /// Creates a zone labelled through `resolver`, falling back to the IANA
    /// identifier.
    pub fn new(tz: Tz, resolver: &dyn ZoneResolver) -> Self {
        let name = resolver.abbreviation(tz).unwrap_or_else(|| tz.name());
        Self { tz, name }
    }

    /// Returns the default zone.
    pub fn default_zone(resolver: &dyn ZoneResolver) -> Self {
        Self::new(DEFAULT_TZ, resolver)
    }

    /// The underlying IANA zone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Canonical name used when formatting instants in this zone.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Result of [`resolve_timezone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneResolution {
    /// The zone to interpret time fields in.
    pub zone: Zone,
    /// Set when the raw value was `TBD`.
    pub all_day: bool,
}

/// Expands the two-letter US codes `ET`, `CT`, `MT`, `PT` to their
/// three-letter standard-time form. Other values are returned unchanged.
pub fn expand_us_code(value: &str) -> String {
    let upper = value.to_ascii_uppercase();
    match upper.as_str() {
        "ET" | "CT" | "MT" | "PT" => format!("{}S{}", &upper[..1], &upper[1..]),
        _ => value.to_string(),
    }
}

/// Resolves a raw timezone value to a zone.
///
/// Never fails: `TBD` marks the event all-day and resolves to the default
/// zone, two-letter US codes are expanded, abbreviations go through
/// `resolver`, `Region/City` identifiers are used directly, and everything
/// else lands on [`DEFAULT_TZ`].
pub fn resolve_timezone(raw: &str, resolver: &dyn ZoneResolver) -> ZoneResolution {
    let value = raw.trim();
    let all_day = value.eq_ignore_ascii_case(TBD);

    let expanded = expand_us_code(value);
    let tz = if all_day || expanded.is_empty() {
        None
    } else if let Some(tz) = resolver.lookup(&expanded) {
        Some(tz)
    } else if REGION_CITY_REGEX.is_match(&expanded) {
        match expanded.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                debug!(timezone = %expanded, "Unknown zone identifier, using default");
                None
            }
        }
    } else {
        None
    };

    if tz.is_none() && !value.is_empty() && !all_day {
        debug!(timezone = %value, default = %DEFAULT_TZ, "Unrecognised timezone, using default");
    }

    ZoneResolution {
        zone: Zone::new(tz.unwrap_or(DEFAULT_TZ), resolver),
        all_day,
    }
}
