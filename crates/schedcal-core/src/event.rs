//! Event types.
//!
//! - [`Event`]: one normalized event, built once per matched fragment
//! - [`EventBuilder`]: the typed setters applied in field order
//! - [`EventStatus`]: whether and how an event can be rendered
//! - [`EventContext`]: the per-event map handed to the template

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::links::resolve_url;
use crate::markup::{clean_text, split_description};
use crate::time::{ParsedStart, format_instant, parse_end, parse_start};
use crate::zone::{Zone, ZoneResolver, resolve_timezone};

/// Render eligibility of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// No start instant could be produced.
    #[default]
    Invalid,
    /// Only the date is known (bare start date or `TBD` timezone).
    AllDay,
    /// A specific start time was parsed.
    Scheduled,
}

impl EventStatus {
    /// Returns true for statuses that may be rendered.
    pub fn is_renderable(&self) -> bool {
        matches!(self, Self::AllDay | Self::Scheduled)
    }
}

/// A normalized event. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    title: String,
    description: String,
    location: String,
    zone: Zone,
    start: Option<DateTime<Tz>>,
    end: Option<DateTime<Tz>>,
    url: String,
    status: EventStatus,
}

impl Event {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn start(&self) -> Option<DateTime<Tz>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Tz>> {
        self.end
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Returns true if the event may be rendered.
    pub fn is_valid(&self) -> bool {
        self.status.is_renderable()
    }

    /// Returns true if the event is all-day.
    pub fn is_all_day(&self) -> bool {
        self.status == EventStatus::AllDay
    }

    /// Formatted start, `<zone>:<stamp>`.
    pub fn formatted_start(&self) -> Option<String> {
        self.start
            .map(|dt| format_instant(&self.zone, &dt, self.is_all_day()))
    }

    /// Formatted end, `<zone>:<stamp>`.
    pub fn formatted_end(&self) -> Option<String> {
        self.end
            .map(|dt| format_instant(&self.zone, &dt, self.is_all_day()))
    }

    /// Builds the template context for this event.
    ///
    /// The UID is `<calendar_name>-<formatted start>`.
    pub fn render(&self, calendar_name: &str) -> EventContext {
        let start_time = self.formatted_start().unwrap_or_default();
        EventContext {
            uid: format!("{}-{}", calendar_name, start_time),
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            url: self.url.clone(),
            start_time,
            end_time: self.formatted_end().unwrap_or_default(),
        }
    }
}

/// Per-event template context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub uid: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub url: String,
    pub start_time: String,
    pub end_time: String,
}

/// Typed setters for one event.
///
/// Setters are infallible: unusable input leaves the field empty or, for the
/// start time, leaves the event [`EventStatus::Invalid`]. The time setters
/// read the zone set by [`EventBuilder::set_timezone`], so callers apply
/// fields in [`FieldName::ORDERED`](crate::field::FieldName::ORDERED).
pub struct EventBuilder<'a> {
    resolver: &'a dyn ZoneResolver,
    base_url: Option<&'a str>,
    now: DateTime<Utc>,
    title: String,
    description: String,
    location: String,
    zone: Zone,
    tbd: bool,
    start: Option<ParsedStart>,
    end: Option<DateTime<Tz>>,
    url: String,
}

impl<'a> EventBuilder<'a> {
    /// Creates a builder. `now` is the fallback end time.
    pub fn new(resolver: &'a dyn ZoneResolver, base_url: Option<&'a str>, now: DateTime<Utc>) -> Self {
        Self {
            resolver,
            base_url,
            now,
            title: String::new(),
            description: String::new(),
            location: String::new(),
            zone: Zone::default_zone(resolver),
            tbd: false,
            start: None,
            end: None,
            url: String::new(),
        }
    }

    pub fn set_title(&mut self, value: &str) {
        self.title = clean_text(value);
    }

    /// Stores the body text followed by the lifted links.
    pub fn set_description(&mut self, value: &str) {
        self.description = split_description(value, self.base_url).render();
    }

    pub fn set_timezone(&mut self, value: &str) {
        let resolution = resolve_timezone(&clean_text(value), self.resolver);
        self.zone = resolution.zone;
        self.tbd = resolution.all_day;
    }

    pub fn set_start_time(&mut self, value: &str) {
        self.start = parse_start(&clean_text(value), &self.zone, self.now);
    }

    /// `duration` comes from the endtime field spec.
    pub fn set_end_time(&mut self, value: &str, duration: Option<&str>) {
        let start = self.start.as_ref().map(ParsedStart::instant);
        self.end = Some(parse_end(
            &clean_text(value),
            &self.zone,
            start,
            duration,
            self.now,
        ));
    }

    pub fn set_location(&mut self, value: &str) {
        self.location = clean_text(value);
    }

    pub fn set_url(&mut self, value: &str) {
        let raw = if value.contains('<') {
            clean_text(value)
        } else {
            value.trim().to_string()
        };
        self.url = resolve_url(&raw, self.base_url);
    }

    /// Computes the status and freezes the event.
    ///
    /// No start instant means [`EventStatus::Invalid`]. A bare start date or a
    /// `TBD` timezone means [`EventStatus::AllDay`]. Any other parsed start is
    /// [`EventStatus::Scheduled`].
    pub fn build(self) -> Event {
        let status = match self.start {
            None => EventStatus::Invalid,
            Some(start) if start.is_all_day() || self.tbd => EventStatus::AllDay,
            Some(_) => EventStatus::Scheduled,
        };

        Event {
            title: self.title,
            description: self.description,
            location: self.location,
            zone: self.zone,
            start: self.start.map(|s| s.instant()),
            end: self.end,
            url: self.url,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::AbbreviationTable;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn build(
        timezone: &str,
        start: &str,
        end: &str,
        duration: Option<&str>,
    ) -> Event {
        let table = AbbreviationTable::default();
        let mut b = EventBuilder::new(&table, Some("http://example.com"), now());
        b.set_title("<b>Opening Night</b>");
        b.set_description("");
        b.set_timezone(timezone);
        b.set_start_time(start);
        b.set_end_time(end, duration);
        b.set_location("Main &amp; 5th");
        b.set_url("/schedule/42");
        b.build()
    }

    mod status {
        use super::*;

        #[test]
        fn parsed_start_is_scheduled() {
            let event = build("ET", "2024-06-15T19:00:00Z", "", Some("2 hours"));
            assert_eq!(event.status(), EventStatus::Scheduled);
            assert!(event.is_valid());
            assert!(!event.is_all_day());
        }

        #[test]
        fn bare_date_is_all_day() {
            let event = build("ET", "2024-06-15", "", None);
            assert_eq!(event.status(), EventStatus::AllDay);
            assert_eq!(event.formatted_start().as_deref(), Some("EST:20240615"));
        }

        #[test]
        fn tbd_is_all_day_even_with_time() {
            let event = build("TBD", "2024-06-15 19:00", "2024-06-15 21:00", None);
            assert_eq!(event.status(), EventStatus::AllDay);
            assert_eq!(event.formatted_start().as_deref(), Some("EST:20240615"));
            assert_eq!(event.formatted_end().as_deref(), Some("EST:20240615"));
        }

        #[test]
        fn unparseable_start_is_invalid() {
            let event = build("ET", "whenever", "", Some("2 hours"));
            assert_eq!(event.status(), EventStatus::Invalid);
            assert!(!event.is_valid());
            assert!(event.start().is_none());
        }

        #[test]
        fn tbd_without_start_stays_invalid() {
            let event = build("TBD", "", "", None);
            assert_eq!(event.status(), EventStatus::Invalid);
        }
    }

    mod fields {
        use super::*;

        #[test]
        fn duration_end_is_exact() {
            let event = build("ET", "2024-06-15T19:00:00Z", "", Some("2 hours"));
            assert_eq!(event.end().unwrap(), event.start().unwrap() + Duration::hours(2));
            assert_eq!(event.formatted_end().as_deref(), Some("EST:20240615T210000"));
        }

        #[test]
        fn text_fields_are_cleaned() {
            let event = build("ET", "2024-06-15", "", None);
            assert_eq!(event.title(), "Opening Night");
            assert_eq!(event.location(), "Main & 5th");
            assert_eq!(event.url(), "http://example.com/schedule/42");
            assert_eq!(event.description(), "");
        }

        #[test]
        fn url_from_inner_markup() {
            let table = AbbreviationTable::default();
            let mut b = EventBuilder::new(&table, None, now());
            b.set_url("<span> https://example.org/a?x=1&y=2 </span>");
            assert_eq!(b.build().url(), "https://example.org/a?x=1&y=2");
        }

        #[test]
        fn setters_accept_empty_values() {
            let table = AbbreviationTable::default();
            let mut b = EventBuilder::new(&table, None, now());
            b.set_title("");
            b.set_description("");
            b.set_timezone("");
            b.set_start_time("");
            b.set_end_time("", None);
            b.set_location("");
            b.set_url("");
            let event = b.build();
            assert_eq!(event.title(), "");
            assert_eq!(event.url(), "");
            assert_eq!(event.status(), EventStatus::Invalid);
            assert_eq!(event.end(), Some(now().with_timezone(&event.zone().tz())));
        }
    }

    mod render {
        use super::*;

        #[test]
        fn context_uses_formatted_times() {
            let event = build("ET", "2024-06-15T19:00:00Z", "", Some("2 hours"));
            insta::assert_json_snapshot!(event.render("rangers"), @r###"
            {
              "uid": "rangers-EST:20240615T190000",
              "title": "Opening Night",
              "description": "",
              "location": "Main & 5th",
              "url": "http://example.com/schedule/42",
              "startTime": "EST:20240615T190000",
              "endTime": "EST:20240615T210000"
            }
            "###);
        }

        #[test]
        fn status_serializes_snake_case() {
            let json = serde_json::to_string(&EventStatus::AllDay).unwrap();
            assert_eq!(json, "\"all_day\"");
        }
    }
}
